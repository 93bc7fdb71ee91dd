//! RecordService - Record のライフサイクル
//!
//! store はほぼ素通しで、service が持つルールは次の 3 つだけです。
//! - create: `created_at` は今、`update_history` は空。入力の値は使わない
//!   （id も捨てて、必ず store に新しく振らせる）
//! - update: `created_at` は既存から引き継ぎ、`update_history` は既存 + 今
//! - update の対象は id で先に解決する。なければ書き込まずに `Lookup::NotFound`
//!
//! create / update はどれも store への書き込みがちょうど 1 回です。
//!
//! # 既知の制約
//! update は read → write の 2 操作で、原子的ではありません。
//! 同じ id に同時に update すると両方が同じ履歴を読んで 1 件ずつ足し、
//! 後から書いた方が残ります（lost update）。

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::domain::{Lookup, NewRecord, Record, RecordField, RecordId, RecordUpdate};
use crate::error::RosterError;
use crate::ports::{Clock, RecordStore};

#[derive(Clone)]
pub struct RecordService {
    store: Arc<dyn RecordStore>,
    clock: Arc<dyn Clock>,
}

impl RecordService {
    pub fn new(store: Arc<dyn RecordStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    pub fn store(&self) -> &Arc<dyn RecordStore> {
        &self.store
    }

    pub async fn get_all(&self) -> Result<Vec<Record>, RosterError> {
        let records = self.store.find_all().await?;
        debug!(count = records.len(), "loaded all records");
        Ok(records)
    }

    pub async fn get_by_id(&self, id: &RecordId) -> Result<Lookup<Record>, RosterError> {
        let found = self.store.find_by_id(id).await?;
        debug!(record_id = %id, found = found.is_some(), "looked up record");
        Ok(found.into())
    }

    /// Persist `candidate` as a new record. Any id or audit fields it carries
    /// are replaced, so a create never overwrites a stored record.
    pub async fn create(&self, mut candidate: Record) -> Result<Record, RosterError> {
        candidate.id = None;
        candidate.stamp_created(self.clock.now());
        let saved = self.store.save(candidate).await?;
        info!(record_id = ?saved.id, name = %saved.name, "created record");
        Ok(saved)
    }

    pub async fn create_from(&self, request: NewRecord) -> Result<Record, RosterError> {
        self.create(Record::from(request)).await
    }

    /// Overwrite the stored record with `candidate`'s name, code and
    /// description, keeping `created_at` and appending to `update_history`.
    pub async fn update(&self, mut candidate: Record) -> Result<Lookup<Record>, RosterError> {
        let Some(id) = candidate.id else {
            warn!("update without record id");
            return Ok(Lookup::NotFound);
        };
        let Some(existing) = self.store.find_by_id(&id).await? else {
            warn!(record_id = %id, "update target not found");
            return Ok(Lookup::NotFound);
        };

        candidate.stamp_updated(&existing, self.clock.now());
        let saved = self.store.save(candidate).await?;
        info!(
            record_id = %id,
            updates = saved.update_history.len(),
            "updated record"
        );
        Ok(Lookup::Found(saved))
    }

    pub async fn update_from(&self, request: RecordUpdate) -> Result<Lookup<Record>, RosterError> {
        self.update(Record::from(request)).await
    }

    pub async fn delete(&self, id: &RecordId) -> Result<(), RosterError> {
        self.store.delete_by_id(id).await?;
        info!(record_id = %id, "deleted record");
        Ok(())
    }

    pub async fn find_by_name(&self, name: &str) -> Result<Vec<Record>, RosterError> {
        self.find_by(RecordField::Name, name).await
    }

    pub async fn find_by_code(&self, code: &str) -> Result<Vec<Record>, RosterError> {
        self.find_by(RecordField::Code, code).await
    }

    async fn find_by(&self, field: RecordField, value: &str) -> Result<Vec<Record>, RosterError> {
        let records = self.store.find_by_field(field, value).await?;
        debug!(%field, value, count = records.len(), "searched records");
        Ok(records)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::impls::InMemoryRecordStore;
    use crate::ports::{FixedClock, StoreError};
    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use rstest::rstest;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Barrier;
    use ulid::Ulid;

    fn created_at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 16, 15, 45, 0).unwrap()
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 9, 0, 0).unwrap()
    }

    /// Counts writes on top of the in-memory store.
    #[derive(Default)]
    struct CountingStore {
        inner: InMemoryRecordStore,
        saves: AtomicUsize,
        deletes: AtomicUsize,
    }

    impl CountingStore {
        fn saves(&self) -> usize {
            self.saves.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl RecordStore for CountingStore {
        async fn save(&self, record: Record) -> Result<Record, StoreError> {
            self.saves.fetch_add(1, Ordering::SeqCst);
            self.inner.save(record).await
        }

        async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
            self.inner.find_by_id(id).await
        }

        async fn find_all(&self) -> Result<Vec<Record>, StoreError> {
            self.inner.find_all().await
        }

        async fn find_by_field(
            &self,
            field: RecordField,
            value: &str,
        ) -> Result<Vec<Record>, StoreError> {
            self.inner.find_by_field(field, value).await
        }

        async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
            self.deletes.fetch_add(1, Ordering::SeqCst);
            self.inner.delete_by_id(id).await
        }

        async fn delete_all(&self) -> Result<(), StoreError> {
            self.inner.delete_all().await
        }
    }

    /// Holds every `find_by_id` until two callers have arrived, so both
    /// updates read the same existing record before either writes.
    struct InterleavingStore {
        inner: Arc<InMemoryRecordStore>,
        barrier: Barrier,
    }

    #[async_trait]
    impl RecordStore for InterleavingStore {
        async fn save(&self, record: Record) -> Result<Record, StoreError> {
            self.inner.save(record).await
        }

        async fn find_by_id(&self, id: &RecordId) -> Result<Option<Record>, StoreError> {
            let found = self.inner.find_by_id(id).await;
            self.barrier.wait().await;
            found
        }

        async fn find_all(&self) -> Result<Vec<Record>, StoreError> {
            self.inner.find_all().await
        }

        async fn find_by_field(
            &self,
            field: RecordField,
            value: &str,
        ) -> Result<Vec<Record>, StoreError> {
            self.inner.find_by_field(field, value).await
        }

        async fn delete_by_id(&self, id: &RecordId) -> Result<(), StoreError> {
            self.inner.delete_by_id(id).await
        }

        async fn delete_all(&self) -> Result<(), StoreError> {
            self.inner.delete_all().await
        }
    }

    fn service_with(store: Arc<CountingStore>) -> RecordService {
        RecordService::new(store, Arc::new(FixedClock::new(now())))
    }

    /// Stores "David Gilmour" directly (bypassing the service) with a known
    /// creation time and empty history.
    async fn stored_gilmour(store: &CountingStore) -> Record {
        let record = Record {
            created_at: Some(created_at()),
            ..Record::new("David Gilmour", "Pink Floyd", "guitar, vocal")
        };
        let saved = store.inner.save(record).await.unwrap();
        store
            .inner
            .save(Record {
                created_at: Some(created_at()),
                ..Record::new("Roger Waters", "Pink Floyd", "bass, vocal")
            })
            .await
            .unwrap();
        saved
    }

    #[tokio::test]
    async fn create_stamps_time_and_empty_history() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());

        let created = service
            .create(Record::new("New User", "New Band", "new instrument, new vocal"))
            .await
            .unwrap();

        assert!(created.id.is_some());
        assert_eq!(created.created_at, Some(now()));
        assert!(created.update_history.is_empty());
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn create_ignores_supplied_audit_fields() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let candidate = Record {
            created_at: Some(created_at()),
            update_history: vec![created_at(), created_at()],
            ..Record::new("David Gilmour", "Pink Floyd", "guitar, vocal")
        };

        let created = service.create(candidate).await.unwrap();

        assert_eq!(created.created_at, Some(now()));
        assert!(created.update_history.is_empty());
        assert_eq!(created.name, "David Gilmour");
    }

    #[tokio::test]
    async fn create_with_existing_id_leaves_stored_record_alone() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let existing = stored_gilmour(&store).await;
        let id = existing.id.unwrap();
        let updated = service
            .update(Record::new("David Gilmour", "Pink Floyd", "guitar").with_id(id))
            .await
            .unwrap()
            .into_option()
            .unwrap();

        let created = service
            .create(Record::new("x", "y", "z").with_id(id))
            .await
            .unwrap();

        assert_ne!(created.id, Some(id));
        let stored = service.get_by_id(&id).await.unwrap().into_option().unwrap();
        assert_eq!(stored, updated);
        assert_eq!(stored.created_at, Some(created_at()));
        assert_eq!(stored.update_history, vec![now()]);
        assert_eq!(service.get_all().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn create_from_request_maps_fields() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());

        let created = service
            .create_from(NewRecord::new("John Lennon", "Beatles", "rhythm guitar, vocal"))
            .await
            .unwrap();

        assert_eq!(created.name, "John Lennon");
        assert_eq!(created.code, "Beatles");
        assert_eq!(created.description, "rhythm guitar, vocal");
        assert_eq!(created.created_at, Some(now()));
        assert!(created.update_history.is_empty());
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn update_preserves_created_at_and_appends_history() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let existing = stored_gilmour(&store).await;
        let candidate = Record {
            created_at: Some(now()),
            description: "guitar".to_string(),
            ..existing.clone()
        };

        let updated = service.update(candidate).await.unwrap();

        let Lookup::Found(updated) = updated else {
            panic!("expected update to find the record");
        };
        assert_eq!(updated.id, existing.id);
        assert_eq!(updated.created_at, Some(created_at()));
        assert_eq!(updated.update_history, vec![now()]);
        assert_eq!(updated.description, "guitar");
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn update_overwrites_fields_instead_of_merging() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let existing = stored_gilmour(&store).await;
        let candidate = Record::new("David Gilmour", "", "").with_id(existing.id.unwrap());

        let updated = service.update(candidate).await.unwrap().into_option().unwrap();

        assert_eq!(updated.code, "");
        assert_eq!(updated.description, "");
    }

    #[tokio::test]
    async fn update_from_request_keeps_audit_fields() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let existing = stored_gilmour(&store).await;
        let request = RecordUpdate::new(
            existing.id.unwrap(),
            "John Lennon",
            "Beatles",
            "updated description",
        );

        let updated = service.update_from(request).await.unwrap();

        let Lookup::Found(updated) = updated else {
            panic!("expected update to find the record");
        };
        assert_eq!(updated.description, "updated description");
        assert_eq!(updated.created_at, existing.created_at);
        assert_eq!(updated.update_history.len(), 1);
        assert_eq!(store.saves(), 1);
    }

    #[tokio::test]
    async fn repeated_updates_track_every_modification() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let existing = stored_gilmour(&store).await;

        let first = service.update(existing).await.unwrap().into_option().unwrap();
        let second = service.update(first).await.unwrap().into_option().unwrap();

        assert_eq!(second.update_history.len(), 2);
        assert_eq!(second.created_at, Some(created_at()));
        assert_eq!(store.saves(), 2);
    }

    #[tokio::test]
    async fn update_of_missing_record_does_not_write() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let ghost = Record::new("David Gilmour", "Pink Floyd", "guitar, vocal")
            .with_id(RecordId::from_ulid(Ulid::new()));

        let result = service.update(ghost).await.unwrap();

        assert_eq!(result, Lookup::NotFound);
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn update_without_id_does_not_write() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        stored_gilmour(&store).await;

        let result = service
            .update(Record::new("David Gilmour", "Pink Floyd", ""))
            .await
            .unwrap();

        assert_eq!(result, Lookup::NotFound);
        assert_eq!(store.saves(), 0);
    }

    #[tokio::test]
    async fn update_from_missing_record_does_not_write() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let request = RecordUpdate::new(RecordId::from_ulid(Ulid::new()), "x", "y", "z");

        let result = service.update_from(request).await.unwrap();

        assert!(!result.is_found());
        assert_eq!(store.saves(), 0);
    }

    #[rstest]
    #[case::exact("David Gilmour", 1)]
    #[case::partial("Gilmour", 0)]
    #[case::different_case("DAVID GILMOUR", 0)]
    #[case::absent("Non Existent", 0)]
    #[tokio::test]
    async fn find_by_name_matches_exactly(#[case] name: &str, #[case] expected: usize) {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        stored_gilmour(&store).await;

        let found = service.find_by_name(name).await.unwrap();

        assert_eq!(found.len(), expected);
        assert!(found.iter().all(|r| r.name == name));
    }

    #[tokio::test]
    async fn find_by_name_handles_special_characters() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        service
            .create(Record::new("O'Connor", "Solo", ""))
            .await
            .unwrap();

        let found = service.find_by_name("O'Connor").await.unwrap();

        assert_eq!(found.len(), 1);
        assert_eq!(found[0].name, "O'Connor");
    }

    #[tokio::test]
    async fn find_by_code_returns_all_members() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        stored_gilmour(&store).await;

        let found = service.find_by_code("Pink Floyd").await.unwrap();

        assert_eq!(found.len(), 2);
    }

    #[tokio::test]
    async fn get_all_returns_every_record() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        stored_gilmour(&store).await;

        assert_eq!(service.get_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn delete_then_get_is_not_found() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        let existing = stored_gilmour(&store).await;
        let id = existing.id.unwrap();

        service.delete(&id).await.unwrap();

        assert_eq!(service.get_by_id(&id).await.unwrap(), Lookup::NotFound);
    }

    #[tokio::test]
    async fn deleting_several_ids_delegates_each() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());
        stored_gilmour(&store).await;
        let ids: Vec<RecordId> = service
            .get_all()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|r| r.id)
            .collect();

        for id in &ids {
            service.delete(id).await.unwrap();
        }
        // 存在しない id の削除もエラーにならない
        service.delete(&ids[0]).await.unwrap();

        assert_eq!(store.deletes.load(Ordering::SeqCst), 3);
        assert!(service.get_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn freddie_mercury_lifecycle() {
        let store = Arc::new(CountingStore::default());
        let service = service_with(store.clone());

        let created = service
            .create_from(NewRecord::new("Freddie Mercury", "Queen", "vocal, piano"))
            .await
            .unwrap();
        let id = created.id.expect("store assigns an id");
        assert!(created.created_at.is_some());
        assert!(created.update_history.is_empty());

        let updated = service
            .update_from(RecordUpdate::new(id, "Freddie Mercury", "Queen", "lead vocal"))
            .await
            .unwrap()
            .into_option()
            .unwrap();

        assert_eq!(updated.id, Some(id));
        assert_eq!(updated.created_at, created.created_at);
        assert_eq!(updated.update_history.len(), 1);
        assert_eq!(updated.description, "lead vocal");
    }

    #[tokio::test]
    async fn concurrent_updates_lose_one_history_entry() {
        let inner = Arc::new(InMemoryRecordStore::new());
        let existing = inner
            .save(Record {
                created_at: Some(created_at()),
                ..Record::new("David Gilmour", "Pink Floyd", "guitar, vocal")
            })
            .await
            .unwrap();
        let store = Arc::new(InterleavingStore {
            inner: inner.clone(),
            barrier: Barrier::new(2),
        });
        let service = RecordService::new(store, Arc::new(FixedClock::new(now())));

        let left = Record {
            description: "left".to_string(),
            ..existing.clone()
        };
        let right = Record {
            description: "right".to_string(),
            ..existing.clone()
        };
        let (a, b) = tokio::join!(service.update(left), service.update(right));

        // 両方とも「成功」し、それぞれ履歴 1 件で書き込む
        assert_eq!(a.unwrap().into_option().unwrap().update_history.len(), 1);
        assert_eq!(b.unwrap().into_option().unwrap().update_history.len(), 1);

        // 2 回 update したのに、残る履歴は 1 件だけ（後勝ち）
        let stored = inner
            .find_by_id(&existing.id.unwrap())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(stored.update_history.len(), 1);
    }
}
