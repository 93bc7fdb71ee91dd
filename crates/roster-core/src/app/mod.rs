//! App - アプリケーション層
//!
//! このモジュールは、ports を組み合わせてアプリケーションロジックを実装します。
//!
//! # 主要コンポーネント
//! - **RecordService**: Record のライフサイクル（監査フィールドのスタンプ）
//! - **seed**: 起動時のデモデータ投入
//! - **AppBuilder**: アプリケーションの構築とワイヤリング

pub mod builder;
pub mod seed;
pub mod service;

// 主要な型を再エクスポート
pub use self::builder::{App, AppBuilder};
pub use self::seed::{default_seed, seed};
pub use self::service::RecordService;
