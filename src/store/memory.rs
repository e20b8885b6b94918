use dashmap::DashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::error::StoreError;
use crate::store::WorkoutStore;
use crate::types::workout::{StoredWorkout, WorkoutSummary};

/// In-process store; contents are lost on restart.
#[derive(Clone, Default)]
pub struct MemoryStore {
    workouts: Arc<DashMap<i64, WorkoutSummary>>,
    last_id: Arc<AtomicI64>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.workouts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workouts.is_empty()
    }
}

impl WorkoutStore for MemoryStore {
    async fn create(&self, summary: &WorkoutSummary) -> Result<i64, StoreError> {
        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        self.workouts.insert(id, summary.clone());
        Ok(id)
    }

    async fn list_all(&self) -> Result<Vec<StoredWorkout>, StoreError> {
        let mut workouts: Vec<StoredWorkout> = self
            .workouts
            .iter()
            .map(|entry| StoredWorkout {
                id: *entry.key(),
                summary: entry.value().clone(),
            })
            .collect();

        workouts.sort_by(|a, b| {
            b.summary
                .uploaded_at
                .cmp(&a.summary.uploaded_at)
                .then(b.id.cmp(&a.id))
        });
        Ok(workouts)
    }

    async fn get(&self, id: i64) -> Result<Option<StoredWorkout>, StoreError> {
        Ok(self.workouts.get(&id).map(|entry| StoredWorkout {
            id,
            summary: entry.value().clone(),
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.workouts.remove(&id).is_some())
    }
}
