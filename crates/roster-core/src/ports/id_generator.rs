//! IdGenerator port - ID 生成の抽象化
//!
//! IdGenerator は store が新しい Record を保存するときに使う ID を生成します。
//! テスト容易性のために、trait として抽象化しています。
//!
//! # 実装
//! - **UlidGenerator**: ULID ベース（本番用）

use crate::domain::RecordId;
use crate::ports::Clock;
use ulid::Ulid;

/// IdGenerator は分散システムで使える ID を生成
///
/// # Thread Safety
/// - `Send + Sync` を要求（複数スレッドから使える）
pub trait IdGenerator: Send + Sync {
    /// Record ID を生成
    fn generate_record_id(&self) -> RecordId;
}

/// UlidGenerator は ULID ベースの ID 生成器
///
/// Clock を使って現在時刻ベースの ULID を生成します。
/// テスト時に FixedClock を使うと timestamp 部分が決定的になります。
pub struct UlidGenerator<C> {
    clock: C,
}

impl<C: Clock> UlidGenerator<C> {
    pub fn new(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for UlidGenerator<C> {
    fn generate_record_id(&self) -> RecordId {
        let timestamp_ms = self.clock.now().timestamp_millis() as u64;
        RecordId::from(Ulid::from_parts(timestamp_ms, rand::random()))
    }
}
