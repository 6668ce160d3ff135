//! Locally held schedule list with snapshot support and per-record guards.

use super::order;
use super::types::ScheduleTime;
use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use tokio::sync::{Mutex, RwLock};

/// The locally cached list of schedule-time records.
///
/// All reads return clones; the list itself is only touched under the lock.
/// Rollback works by restoring a whole-record snapshot at its exact id.
pub(crate) struct ListCache {
    records: RwLock<Vec<ScheduleTime>>,
    /// Negative, strictly decreasing ids for optimistic creates
    next_temp_id: AtomicI64,
}

impl ListCache {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(Vec::new()),
            next_temp_id: AtomicI64::new(-1),
        }
    }

    pub async fn replace_all(&self, records: Vec<ScheduleTime>) {
        *self.records.write().await = records;
    }

    /// Visible records (not soft-deleted), in canonical display order.
    pub async fn visible(&self) -> Vec<ScheduleTime> {
        let mut visible: Vec<ScheduleTime> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| !r.is_deleted)
            .cloned()
            .collect();
        order::sort_records(&mut visible);
        visible
    }

    /// Soft-deleted records (the recycle bin), in canonical display order.
    pub async fn recycle_bin(&self) -> Vec<ScheduleTime> {
        let mut deleted: Vec<ScheduleTime> = self
            .records
            .read()
            .await
            .iter()
            .filter(|r| r.is_deleted)
            .cloned()
            .collect();
        order::sort_records(&mut deleted);
        deleted
    }

    pub async fn get(&self, id: i64) -> Option<ScheduleTime> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
    }

    pub fn allocate_temp_id(&self) -> i64 {
        self.next_temp_id.fetch_sub(1, Ordering::Relaxed)
    }

    pub async fn insert(&self, record: ScheduleTime) {
        self.records.write().await.push(record);
    }

    /// Replaces the record with id `id` by `record` (which may carry a new
    /// id, e.g. when a server row replaces a temp placeholder). Returns false
    /// if no record matched.
    pub async fn replace(&self, id: i64, record: ScheduleTime) -> bool {
        let mut records = self.records.write().await;
        match records.iter_mut().find(|r| r.id == id) {
            Some(slot) => {
                *slot = record;
                true
            }
            None => false,
        }
    }

    /// Removes a record, returning its position and contents so a failed
    /// delete can put it back where it was.
    pub async fn remove(&self, id: i64) -> Option<(usize, ScheduleTime)> {
        let mut records = self.records.write().await;
        let index = records.iter().position(|r| r.id == id)?;
        Some((index, records.remove(index)))
    }

    pub async fn restore_at(&self, index: usize, record: ScheduleTime) {
        let mut records = self.records.write().await;
        let index = index.min(records.len());
        records.insert(index, record);
    }
}

/// Per-record mutation locks.
///
/// Each record id gets one async mutex; holding it for the whole
/// snapshot-patch-dispatch-settle cycle serializes concurrent edits of the
/// same record instead of letting them race their snapshots.
pub(crate) struct MutationGuards {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl MutationGuards {
    pub fn new() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }

    pub fn guard(&self, id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }

    /// Drops the lock entry for `id` once nobody holds it, so the map does
    /// not grow with every record ever mutated. A strong count above 1
    /// means some task still owns a clone (held or queued) and the entry
    /// stays.
    pub fn release(&self, id: i64) {
        self.locks
            .remove_if(&id, |_, lock| Arc::strong_count(lock) == 1);
    }

    #[cfg(test)]
    pub fn len(&self) -> usize {
        self.locks.len()
    }
}
