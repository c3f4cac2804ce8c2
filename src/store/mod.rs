//! Client-local record of position ids already observed as closed.
//!
//! Closed positions stay decryptable in the wallet, so without this set a
//! refresh would resurrect every spent position. The set is append-only and
//! deduplicated; removal is an external housekeeping concern the engine
//! never performs.

use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

pub mod memory;
pub mod sqlite;

pub use memory::MemoryClosedPositionStore;
pub use sqlite::SqliteClosedPositionStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("store backend error: {0}")]
    Backend(String),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        StoreError::Backend(err.to_string())
    }
}

/// Persistence capability for the closed-position set. Implementations
/// normalize ids before storing or comparing.
#[async_trait]
pub trait ClosedPositionStore: Send + Sync + fmt::Debug {
    async fn contains(&self, position_id: &str) -> Result<bool, StoreError>;

    /// Record an id as closed. Inserting an id twice is a no-op.
    async fn insert(&self, position_id: &str) -> Result<(), StoreError>;
}

/// Canonical form of a position id: the visibility suffix a record
/// plaintext carries is not part of the identity.
pub fn normalize_id(position_id: &str) -> &str {
    position_id
        .strip_suffix(".private")
        .or_else(|| position_id.strip_suffix(".public"))
        .unwrap_or(position_id)
}
