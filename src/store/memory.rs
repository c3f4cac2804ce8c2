//! In-memory closed-position store.

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::Mutex;

use super::{normalize_id, ClosedPositionStore, StoreError};

/// HashSet-backed store for tests and sessions that do not persist.
#[derive(Debug, Default)]
pub struct MemoryClosedPositionStore {
    ids: Mutex<HashSet<String>>,
}

impl MemoryClosedPositionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-populate an id (builder style, for tests).
    pub fn with_id(self, position_id: &str) -> Self {
        self.ids
            .lock()
            .unwrap()
            .insert(normalize_id(position_id).to_string());
        self
    }

    /// Number of ids recorded.
    pub fn len(&self) -> usize {
        self.ids.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl ClosedPositionStore for MemoryClosedPositionStore {
    async fn contains(&self, position_id: &str) -> Result<bool, StoreError> {
        Ok(self.ids.lock().unwrap().contains(normalize_id(position_id)))
    }

    async fn insert(&self, position_id: &str) -> Result<(), StoreError> {
        self.ids
            .lock()
            .unwrap()
            .insert(normalize_id(position_id).to_string());
        Ok(())
    }
}
