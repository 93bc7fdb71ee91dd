//! RecordStore port - ドキュメントストアへの抽象化
//!
//! service が必要とする操作だけを定義します。
//! 開発用・テスト用の実装は `impls::InMemoryRecordStore`。
//!
//! # 設計原則
//! - `save` は id による insert-or-replace（id がなければ採番）
//! - 検索は完全一致のみ（部分一致・前方一致はしない）
//! - 1 操作ごとの原子性だけを持つ。read-modify-write の原子性は持たない

use async_trait::async_trait;

use crate::domain::{Record, RecordField, RecordId};

/// Persistence failures. The service never catches these.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),

    #[error("store operation failed: {0}")]
    OperationFailed(String),
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert or replace by id. Assigns an id when the record has none and
    /// returns the stored form.
    async fn save(&self, record: Record) -> Result<Record, StoreError>;

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, StoreError>;

    async fn find_all(&self) -> Result<Vec<Record>, StoreError>;

    /// Exact, case-sensitive match on one field.
    async fn find_by_field(
        &self,
        field: RecordField,
        value: &str,
    ) -> Result<Vec<Record>, StoreError>;

    /// Deleting an unknown id is a no-op.
    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError>;

    async fn delete_all(&self) -> Result<(), StoreError>;
}
