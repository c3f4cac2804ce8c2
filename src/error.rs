use thiserror::Error;

use crate::ledger::LedgerError;
use crate::parser::ParseError;
use crate::store::StoreError;

/// Engine-wide error taxonomy.
///
/// Position-model errors are returned to the caller directly and must be
/// handled before any transaction is built. Executor failures are not
/// surfaced through this type at all: they end up as a terminal
/// `TransactionState` carrying a human-readable message. Parser and decrypt
/// failures are per-record and never abort a batch scan.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("wallet not connected")]
    NotConnected,
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("submission failed: {0}")]
    SubmissionFailed(String),
    #[error("status polling not supported or failed: {0}")]
    PollingUnsupported(String),
    #[error("transaction status polling timed out")]
    PollingTimedOut,
    #[error("transaction rejected: {0}")]
    LedgerRejected(String),
    #[error("transaction failed: {0}")]
    LedgerFailed(String),
    #[error("decrypt failed: {0}")]
    DecryptFailed(String),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    Ledger(#[from] LedgerError),
    #[error(transparent)]
    Store(#[from] StoreError),
}
