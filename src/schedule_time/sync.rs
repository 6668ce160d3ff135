//! Optimistic synchronization between the local list and the backend.
//!
//! Every mutation follows the same lifecycle: validate, snapshot, patch the
//! local list, dispatch, then commit the server row or roll the snapshot
//! back. Mutations on the same record are serialized through a per-id lock,
//! so a second edit queues behind the in-flight one instead of racing its
//! snapshot. Validation failures never patch anything and never reach the
//! network.

use super::cache::{ListCache, MutationGuards};
use super::error::ScheduleTimeError;
use super::order;
use super::repository::ScheduleTimeRepository;
use super::types::{ListQuery, NewScheduleTime, ScheduleTime, ScheduleTimePatch};
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Lifecycle of one optimistic mutation, used in structured logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationPhase {
    /// Local list patched, request in flight
    Pending,
    /// Server row replaced the speculative patch
    Committed,
    /// Snapshot restored after a failure
    RolledBack,
}

/// Keeps a locally cached page of schedule times consistent with server
/// state across optimistic creates, edits, and deletes.
pub struct ScheduleTimeSync {
    repo: Arc<dyn ScheduleTimeRepository>,
    cache: ListCache,
    guards: MutationGuards,
    last_query: RwLock<ListQuery>,
}

impl ScheduleTimeSync {
    pub fn new(repo: Arc<dyn ScheduleTimeRepository>) -> Self {
        Self {
            repo,
            cache: ListCache::new(),
            guards: MutationGuards::new(),
            last_query: RwLock::new(ListQuery::default()),
        }
    }

    /// Replaces the local list with fresh server data and remembers the
    /// query so later refetches reuse it.
    pub async fn refresh(&self, query: ListQuery) -> Result<Vec<ScheduleTime>, ScheduleTimeError> {
        let page = self.repo.list(&query).await?;
        self.cache.replace_all(page.items).await;
        *self.last_query.write().await = query;
        Ok(self.cache.visible().await)
    }

    /// Visible records in canonical display order.
    pub async fn records(&self) -> Vec<ScheduleTime> {
        self.cache.visible().await
    }

    /// Soft-deleted records, for the recycle bin view.
    pub async fn recycle_bin(&self) -> Vec<ScheduleTime> {
        self.cache.recycle_bin().await
    }

    /// Visible records partitioned by day-group label, for the grouped view.
    pub async fn grouped(&self) -> Vec<(String, Vec<ScheduleTime>)> {
        order::group_by_day_label(self.cache.visible().await)
    }

    /// Creates a record optimistically: a placeholder with a temp id shows
    /// up immediately and is swapped for the server row on commit.
    pub async fn create(&self, new: NewScheduleTime) -> Result<ScheduleTime, ScheduleTimeError> {
        // Validation failure means no placeholder and no network call.
        let new = new.prepared()?;

        let temp_id = self.cache.allocate_temp_id();
        self.cache.insert(new.as_record(temp_id)).await;
        info!(temp_id = temp_id, phase = ?MutationPhase::Pending, "Create dispatched");

        match self.repo.create(&new).await {
            Ok(server_row) => {
                self.cache.replace(temp_id, server_row.clone()).await;
                info!(id = server_row.id, phase = ?MutationPhase::Committed, "Create settled");
                Ok(server_row)
            }
            Err(e) => {
                self.cache.remove(temp_id).await;
                warn!(temp_id = temp_id, phase = ?MutationPhase::RolledBack, error = %e, "Create failed");
                self.refetch_after(&e).await;
                Err(e)
            }
        }
    }

    /// Applies a field-level patch optimistically, committing the server row
    /// or restoring the snapshot.
    pub async fn update(
        &self,
        id: i64,
        patch: ScheduleTimePatch,
    ) -> Result<ScheduleTime, ScheduleTimeError> {
        let guard = self.guards.guard(id);
        let result = {
            let _held = guard.lock().await;
            self.update_locked(id, patch).await
        };
        drop(guard);
        self.guards.release(id);
        result
    }

    async fn update_locked(
        &self,
        id: i64,
        patch: ScheduleTimePatch,
    ) -> Result<ScheduleTime, ScheduleTimeError> {
        let snapshot = self
            .cache
            .get(id)
            .await
            .ok_or(ScheduleTimeError::NotFound { id })?;

        // Rejected edits must leave the list untouched with zero requests.
        let applied = patch.apply(&snapshot)?;
        let outbound = patch.with_derived(&applied);

        self.cache.replace(id, applied).await;
        info!(id = id, phase = ?MutationPhase::Pending, "Update dispatched");

        match self.repo.update(id, &outbound).await {
            Ok(server_row) => {
                self.cache.replace(id, server_row.clone()).await;
                info!(id = id, phase = ?MutationPhase::Committed, "Update settled");
                Ok(server_row)
            }
            Err(e) => {
                self.cache.replace(id, snapshot).await;
                warn!(id = id, phase = ?MutationPhase::RolledBack, error = %e, "Update failed");
                self.refetch_after(&e).await;
                Err(e)
            }
        }
    }

    /// Toggles the active flag.
    pub async fn set_active(
        &self,
        id: i64,
        is_active: bool,
    ) -> Result<ScheduleTime, ScheduleTimeError> {
        self.update(id, ScheduleTimePatch::active(is_active)).await
    }

    /// Sends a record to the recycle bin.
    pub async fn soft_delete(&self, id: i64) -> Result<ScheduleTime, ScheduleTimeError> {
        self.update(id, ScheduleTimePatch::deleted(true)).await
    }

    /// Recovers a record from the recycle bin.
    pub async fn restore(&self, id: i64) -> Result<ScheduleTime, ScheduleTimeError> {
        self.update(id, ScheduleTimePatch::deleted(false)).await
    }

    /// Physically deletes a record (the legacy list variant). The record is
    /// removed optimistically and reinserted at its old position on failure.
    pub async fn hard_delete(&self, id: i64) -> Result<(), ScheduleTimeError> {
        let guard = self.guards.guard(id);
        let result = {
            let _held = guard.lock().await;
            self.hard_delete_locked(id).await
        };
        drop(guard);
        self.guards.release(id);
        result
    }

    async fn hard_delete_locked(&self, id: i64) -> Result<(), ScheduleTimeError> {
        let (index, snapshot) = self
            .cache
            .remove(id)
            .await
            .ok_or(ScheduleTimeError::NotFound { id })?;
        info!(id = id, phase = ?MutationPhase::Pending, "Delete dispatched");

        match self.repo.delete(id).await {
            Ok(()) => {
                info!(id = id, phase = ?MutationPhase::Committed, "Delete settled");
                Ok(())
            }
            Err(e) => {
                self.cache.restore_at(index, snapshot).await;
                warn!(id = id, phase = ?MutationPhase::RolledBack, error = %e, "Delete failed");
                self.refetch_after(&e).await;
                Err(e)
            }
        }
    }

    /// After a failure whose response could not be decoded, the rolled-back
    /// list may still disagree with the server, so refetch it wholesale.
    async fn refetch_after(&self, err: &ScheduleTimeError) {
        if !err.needs_refetch() {
            return;
        }

        let query = self.last_query.read().await.clone();
        match self.repo.list(&query).await {
            Ok(page) => {
                self.cache.replace_all(page.items).await;
                info!("List refetched after undecodable response");
            }
            Err(refetch_err) => {
                warn!(error = %refetch_err, "Refetch after undecodable response failed");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schedule_time::types::Page;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicI64, AtomicU32, Ordering};
    use std::sync::Mutex as StdMutex;
    use std::time::Duration;

    /// In-memory repository for exercising the synchronizer without a
    /// network. Counts calls so tests can assert the zero-network property.
    struct MockRepo {
        rows: StdMutex<Vec<ScheduleTime>>,
        next_id: AtomicI64,
        list_calls: AtomicU32,
        mutation_calls: AtomicU32,
        fail_mutations: AtomicBool,
        undecodable_mutations: AtomicBool,
        settle_delay: Option<Duration>,
    }

    impl MockRepo {
        fn seeded(rows: Vec<ScheduleTime>) -> Arc<Self> {
            let next = rows.iter().map(|r| r.id).max().unwrap_or(0) + 1;
            Arc::new(Self {
                rows: StdMutex::new(rows),
                next_id: AtomicI64::new(next),
                list_calls: AtomicU32::new(0),
                mutation_calls: AtomicU32::new(0),
                fail_mutations: AtomicBool::new(false),
                undecodable_mutations: AtomicBool::new(false),
                settle_delay: None,
            })
        }

        fn mutation_error(&self) -> Option<ScheduleTimeError> {
            if self.fail_mutations.load(Ordering::Relaxed) {
                return Some(ScheduleTimeError::Network {
                    message: "connection refused".to_string(),
                });
            }
            if self.undecodable_mutations.load(Ordering::Relaxed) {
                return Some(ScheduleTimeError::Decode {
                    message: "expected value at line 1".to_string(),
                });
            }
            None
        }

        async fn settle(&self) {
            self.mutation_calls.fetch_add(1, Ordering::Relaxed);
            if let Some(delay) = self.settle_delay {
                tokio::time::sleep(delay).await;
            }
        }
    }

    #[async_trait]
    impl ScheduleTimeRepository for MockRepo {
        async fn list(&self, _query: &ListQuery) -> Result<Page<ScheduleTime>, ScheduleTimeError> {
            self.list_calls.fetch_add(1, Ordering::Relaxed);
            let items = self.rows.lock().unwrap().clone();
            let total = items.len() as u64;
            Ok(Page { items, total })
        }

        async fn create(&self, new: &NewScheduleTime) -> Result<ScheduleTime, ScheduleTimeError> {
            self.settle().await;
            if let Some(err) = self.mutation_error() {
                return Err(err);
            }

            let id = self.next_id.fetch_add(1, Ordering::Relaxed);
            let mut row = new.as_record(id);
            // Stand-in for the server-side duration computation.
            row.duration_min = 111;
            self.rows.lock().unwrap().push(row.clone());
            Ok(row)
        }

        async fn update(
            &self,
            id: i64,
            patch: &ScheduleTimePatch,
        ) -> Result<ScheduleTime, ScheduleTimeError> {
            self.settle().await;
            if let Some(err) = self.mutation_error() {
                return Err(err);
            }

            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|r| r.id == id)
                .ok_or(ScheduleTimeError::NotFound { id })?;
            let mut updated = patch.apply(row)?;
            updated.duration_min = 111;
            *row = updated.clone();
            Ok(updated)
        }

        async fn delete(&self, id: i64) -> Result<(), ScheduleTimeError> {
            self.settle().await;
            if let Some(err) = self.mutation_error() {
                return Err(err);
            }

            let mut rows = self.rows.lock().unwrap();
            let index = rows
                .iter()
                .position(|r| r.id == id)
                .ok_or(ScheduleTimeError::NotFound { id })?;
            rows.remove(index);
            Ok(())
        }
    }

    fn row(id: i64, days: &[u8], start: &str, end: &str) -> ScheduleTime {
        let mut rec = ScheduleTime {
            id,
            days_array: days.to_vec(),
            day_group_name: String::new(),
            start_time: start.to_string(),
            end_time: end.to_string(),
            start_time_ext: None,
            end_time_ext: None,
            range_text: String::new(),
            duration_min: 60,
            is_active: true,
            is_deleted: false,
        };
        rec.recompute_derived().unwrap();
        rec
    }

    async fn synced(repo: Arc<MockRepo>) -> ScheduleTimeSync {
        let sync = ScheduleTimeSync::new(repo);
        sync.refresh(ListQuery::default()).await.unwrap();
        sync
    }

    #[tokio::test]
    async fn test_invalid_edit_issues_zero_requests() {
        let repo = MockRepo::seeded(vec![row(1, &[0, 4], "07:00", "08:30")]);
        let sync = synced(repo.clone()).await;
        let before = sync.records().await;

        let err = sync
            .update(1, ScheduleTimePatch::times("10:00", "09:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScheduleTimeError::Validation { .. }));
        assert_eq!(repo.mutation_calls.load(Ordering::Relaxed), 0);
        assert_eq!(sync.records().await, before);
    }

    #[tokio::test]
    async fn test_failed_update_rolls_back_to_prior_state() {
        let repo = MockRepo::seeded(vec![
            row(1, &[0, 4], "07:00", "08:30"),
            row(2, &[1], "09:00", "10:00"),
        ]);
        let sync = synced(repo.clone()).await;
        let before = sync.records().await;

        repo.fail_mutations.store(true, Ordering::Relaxed);
        let err = sync
            .update(1, ScheduleTimePatch::times("13:00", "14:30"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScheduleTimeError::Network { .. }));
        assert_eq!(sync.records().await, before);
        assert_eq!(repo.mutation_calls.load(Ordering::Relaxed), 1);
    }

    #[tokio::test]
    async fn test_committed_update_holds_server_row() {
        let repo = MockRepo::seeded(vec![row(1, &[0, 4], "07:00", "08:30")]);
        let sync = synced(repo.clone()).await;

        let settled = sync
            .update(1, ScheduleTimePatch::times("13:00", "14:30"))
            .await
            .unwrap();

        assert_eq!(settled.range_text, "1:00 p.m. a 2:30 p.m.");
        // The cache holds the authoritative row, including server-computed
        // fields the client never derives.
        let cached = sync.records().await;
        assert_eq!(cached.len(), 1);
        assert_eq!(cached[0].duration_min, 111);
        assert_eq!(cached[0].start_time, "13:00");

        // The settled mutation leaves no per-record lock behind.
        assert_eq!(sync.guards.len(), 0);
    }

    #[tokio::test]
    async fn test_create_swaps_temp_id_for_server_row() {
        let repo = MockRepo::seeded(vec![]);
        let sync = synced(repo.clone()).await;

        let created = sync
            .create(NewScheduleTime::new(vec![4, 0], "07:00", "08:30"))
            .await
            .unwrap();

        assert!(created.id > 0);
        let records = sync.records().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, created.id);
        assert_eq!(records[0].day_group_name, "Lu-Vi");
    }

    #[tokio::test]
    async fn test_failed_create_removes_placeholder() {
        let repo = MockRepo::seeded(vec![row(1, &[0], "07:00", "08:00")]);
        let sync = synced(repo.clone()).await;
        let before = sync.records().await;

        repo.fail_mutations.store(true, Ordering::Relaxed);
        let err = sync
            .create(NewScheduleTime::new(vec![1], "09:00", "10:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScheduleTimeError::Network { .. }));
        assert_eq!(sync.records().await, before);
    }

    #[tokio::test]
    async fn test_invalid_create_issues_zero_requests() {
        let repo = MockRepo::seeded(vec![]);
        let sync = synced(repo.clone()).await;

        let err = sync
            .create(NewScheduleTime::new(vec![], "07:00", "08:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScheduleTimeError::Validation { .. }));
        assert_eq!(repo.mutation_calls.load(Ordering::Relaxed), 0);
        assert!(sync.records().await.is_empty());
    }

    #[tokio::test]
    async fn test_failed_hard_delete_reinserts_record() {
        let repo = MockRepo::seeded(vec![
            row(1, &[0], "07:00", "08:00"),
            row(2, &[1], "09:00", "10:00"),
        ]);
        let sync = synced(repo.clone()).await;
        let before = sync.records().await;

        repo.fail_mutations.store(true, Ordering::Relaxed);
        assert!(sync.hard_delete(2).await.is_err());
        assert_eq!(sync.records().await, before);
    }

    #[tokio::test]
    async fn test_soft_delete_moves_record_to_recycle_bin() {
        let repo = MockRepo::seeded(vec![
            row(1, &[0], "07:00", "08:00"),
            row(2, &[1], "09:00", "10:00"),
        ]);
        let sync = synced(repo.clone()).await;

        sync.soft_delete(2).await.unwrap();
        assert_eq!(sync.records().await.len(), 1);
        let binned = sync.recycle_bin().await;
        assert_eq!(binned.len(), 1);
        assert_eq!(binned[0].id, 2);

        sync.restore(2).await.unwrap();
        assert_eq!(sync.records().await.len(), 2);
        assert!(sync.recycle_bin().await.is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_response_triggers_refetch() {
        let repo = MockRepo::seeded(vec![row(1, &[0], "07:00", "08:00")]);
        let sync = synced(repo.clone()).await;
        assert_eq!(repo.list_calls.load(Ordering::Relaxed), 1);

        repo.undecodable_mutations.store(true, Ordering::Relaxed);
        let err = sync
            .update(1, ScheduleTimePatch::times("09:00", "10:00"))
            .await
            .unwrap_err();

        assert!(matches!(err, ScheduleTimeError::Decode { .. }));
        assert_eq!(repo.list_calls.load(Ordering::Relaxed), 2);
        // The refetched list matches the untouched server state.
        assert_eq!(sync.records().await[0].start_time, "07:00");
    }

    #[tokio::test]
    async fn test_concurrent_edits_on_one_record_serialize() {
        let repo = MockRepo::seeded(vec![row(1, &[0], "07:00", "08:00")]);
        let mut inner = Arc::try_unwrap(repo).ok().unwrap();
        inner.settle_delay = Some(Duration::from_millis(20));
        let repo = Arc::new(inner);

        let sync = Arc::new(ScheduleTimeSync::new(repo.clone() as Arc<dyn ScheduleTimeRepository>));
        sync.refresh(ListQuery::default()).await.unwrap();

        let a = {
            let sync = sync.clone();
            tokio::spawn(
                async move { sync.update(1, ScheduleTimePatch::times("09:00", "10:00")).await },
            )
        };
        let b = {
            let sync = sync.clone();
            tokio::spawn(
                async move { sync.update(1, ScheduleTimePatch::times("11:00", "12:00")).await },
            )
        };

        a.await.unwrap().unwrap();
        b.await.unwrap().unwrap();

        // Both edits ran, one after the other, and the surviving record is a
        // consistent commit of whichever settled last.
        assert_eq!(repo.mutation_calls.load(Ordering::Relaxed), 2);
        let records = sync.records().await;
        assert_eq!(records.len(), 1);
        assert!(records[0].start_time == "09:00" || records[0].start_time == "11:00");
        records[0].validate().unwrap();
        assert_eq!(
            records[0].range_text,
            if records[0].start_time == "09:00" {
                "9:00 a.m. a 10:00 a.m."
            } else {
                "11:00 a.m. a 12:00 p.m."
            }
        );

        // Queued edits release the shared lock entry once both settle.
        assert_eq!(sync.guards.len(), 0);
    }
}
