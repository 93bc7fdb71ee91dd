//! InMemoryRecordStore - 開発用のドキュメントストア
//!
//! # 学習ポイント
//! - tokio::sync::Mutex による async での排他制御
//! - HashMap（正本）+ Vec（挿入順）で find_all の順序を安定させる
//! - ID 採番を IdGenerator に委譲

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::domain::{Record, RecordField, RecordId};
use crate::ports::{IdGenerator, RecordStore, StoreError, SystemClock, UlidGenerator};

#[derive(Default)]
struct InMemoryStoreState {
    /// All records (single source of truth).
    records: HashMap<RecordId, Record>,

    /// Insertion order. Replacing a record keeps its position.
    order: Vec<RecordId>,
}

impl InMemoryStoreState {
    fn ordered(&self) -> impl Iterator<Item = &Record> {
        self.order.iter().filter_map(|id| self.records.get(id))
    }
}

/// InMemoryRecordStore は開発用・テスト用のストア
///
/// # 使用例
/// ```ignore
/// let store = InMemoryRecordStore::new();
/// let saved = store.save(Record::new("Freddie Mercury", "Queen", "vocal, piano")).await?;
/// assert!(saved.id.is_some());
/// ```
pub struct InMemoryRecordStore {
    state: Mutex<InMemoryStoreState>,
    id_generator: Arc<dyn IdGenerator>,
}

impl InMemoryRecordStore {
    pub fn new() -> Self {
        Self::with_id_generator(Arc::new(UlidGenerator::new(SystemClock)))
    }

    pub fn with_id_generator(id_generator: Arc<dyn IdGenerator>) -> Self {
        Self {
            state: Mutex::new(InMemoryStoreState::default()),
            id_generator,
        }
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for InMemoryRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn save(&self, mut record: Record) -> Result<Record, StoreError> {
        let id = match record.id {
            Some(id) => id,
            None => {
                let id = self.id_generator.generate_record_id();
                record.id = Some(id);
                id
            }
        };

        let mut state = self.state.lock().await;
        if state.records.insert(id, record.clone()).is_none() {
            state.order.push(id);
        }
        Ok(record)
    }

    async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.records.get(id).cloned())
    }

    async fn find_all(&self) -> Result<Vec<Record>, StoreError> {
        let state = self.state.lock().await;
        Ok(state.ordered().cloned().collect())
    }

    async fn find_by_field(
        &self,
        field: RecordField,
        value: &str,
    ) -> Result<Vec<Record>, StoreError> {
        let state = self.state.lock().await;
        Ok(state
            .ordered()
            .filter(|record| record.field(field) == value)
            .cloned()
            .collect())
    }

    async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        if state.records.remove(id).is_some() {
            state.order.retain(|kept| kept != id);
        }
        Ok(())
    }

    async fn delete_all(&self) -> Result<(), StoreError> {
        let mut state = self.state.lock().await;
        state.records.clear();
        state.order.clear();
        Ok(())
    }
}
