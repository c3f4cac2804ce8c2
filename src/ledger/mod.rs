//! Capability traits for the wallet and chain adapters the engine consumes.
//!
//! The surrounding application injects implementations of these traits
//! (browser wallet bridge, explorer HTTP API); the engine never talks to a
//! concrete adapter directly. Mock implementations live in [`mock`].

use async_trait::async_trait;
use std::fmt;

use crate::domain::Address;
use crate::protocol::SubmitRequest;

pub mod explorer;
pub mod mock;

pub use explorer::ExplorerChainReader;
pub use mock::{MockChainReader, MockWalletClient};

/// Outcome of one status poll for a tracked transaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusResponse {
    /// One of `pending | accepted | finalized | rejected | failed`, or any
    /// other string the adapter reports (treated as unknown).
    pub status: String,
    /// Ledger-confirmed transaction id, when known.
    pub ledger_id: Option<String>,
    /// Error message accompanying a negative terminal status.
    pub error: Option<String>,
}

impl StatusResponse {
    pub fn pending() -> Self {
        Self::with_status("pending")
    }

    pub fn accepted(ledger_id: &str) -> Self {
        StatusResponse {
            status: "accepted".to_string(),
            ledger_id: Some(ledger_id.to_string()),
            error: None,
        }
    }

    pub fn rejected(error: &str) -> Self {
        StatusResponse {
            status: "rejected".to_string(),
            ledger_id: None,
            error: Some(error.to_string()),
        }
    }

    pub fn failed(error: &str) -> Self {
        StatusResponse {
            status: "failed".to_string(),
            ledger_id: None,
            error: Some(error.to_string()),
        }
    }

    pub fn with_status(status: &str) -> Self {
        StatusResponse {
            status: status.to_string(),
            ledger_id: None,
            error: None,
        }
    }
}

/// Wallet capability: identity, transaction submission, status polling and
/// record decryption. Every call may fail; the engine decides per call site
/// whether a failure is fatal or per-record.
#[async_trait]
pub trait WalletClient: Send + Sync + fmt::Debug {
    /// The connected identity, or None when no wallet session exists.
    fn connected_address(&self) -> Option<Address>;

    /// Submit an opaque protocol call, returning the client-assigned
    /// tracking id used to poll for the outcome.
    async fn submit(&self, request: &SubmitRequest) -> Result<String, LedgerError>;

    /// Poll the status of a previously submitted call.
    async fn poll_status(&self, tracking_id: &str) -> Result<StatusResponse, LedgerError>;

    /// Decrypt a record ciphertext owned by the connected identity.
    async fn decrypt(&self, ciphertext: &str) -> Result<String, LedgerError>;
}

/// Read-only lookup against a program's published key-value mappings.
#[async_trait]
pub trait ChainReader: Send + Sync + fmt::Debug {
    /// Fetch a mapping value. `Ok(None)` means the key is unset, which is a
    /// valid non-error outcome (callers map it to zero/default).
    async fn read_mapping(
        &self,
        program: &str,
        mapping: &str,
        key: &str,
    ) -> Result<Option<String>, LedgerError>;
}

/// Error type for wallet and chain adapter operations.
#[derive(Debug, Clone)]
pub enum LedgerError {
    /// Network error (e.g., connection timeout, DNS failure)
    NetworkError(String),
    /// HTTP error (e.g., 429 rate limit, 5xx server error)
    HttpError { status: u16, message: String },
    /// Rate limit exceeded (caller should implement backoff)
    RateLimited,
    /// The adapter does not implement this operation
    NotSupported(String),
    /// Other error
    Other(String),
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LedgerError::NetworkError(msg) => write!(f, "Network error: {}", msg),
            LedgerError::HttpError { status, message } => {
                write!(f, "HTTP error {}: {}", status, message)
            }
            LedgerError::RateLimited => write!(f, "Rate limited"),
            LedgerError::NotSupported(msg) => write!(f, "Not supported: {}", msg),
            LedgerError::Other(msg) => write!(f, "Error: {}", msg),
        }
    }
}

impl std::error::Error for LedgerError {}
