//! Impls - 実装（開発用・テスト用）
//!
//! このモジュールには ports の実装を含めます。
//!
//! # 含まれる実装
//! - **InMemoryRecordStore**: 開発用のドキュメントストア
//!
//! 本番用のストア実装（MongoDB など）は別クレートに配置する想定です。

pub mod inmem_store;

pub use self::inmem_store::InMemoryRecordStore;
