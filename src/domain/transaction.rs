//! Transaction lifecycle state observed by callers of the executor.

use serde::{Deserialize, Serialize};

/// Status of one in-flight protocol call.
///
/// `Accepted`, `Rejected`, `Failed` and `Error` are terminal: no further
/// transition happens without a fresh submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxStatus {
    Idle,
    Submitting,
    Pending,
    Accepted,
    Rejected,
    Failed,
    Error,
}

impl TxStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TxStatus::Accepted | TxStatus::Rejected | TxStatus::Failed | TxStatus::Error
        )
    }
}

impl std::fmt::Display for TxStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            TxStatus::Idle => "idle",
            TxStatus::Submitting => "submitting",
            TxStatus::Pending => "pending",
            TxStatus::Accepted => "accepted",
            TxStatus::Rejected => "rejected",
            TxStatus::Failed => "failed",
            TxStatus::Error => "error",
        };
        write!(f, "{}", s)
    }
}

/// Caller-visible state of one protocol call, mutated only by the executor.
/// A new submission always starts from a fresh instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionState {
    pub status: TxStatus,
    /// Client-assigned id used to poll the ledger for the outcome.
    pub tracking_id: Option<String>,
    /// Ledger-confirmed transaction id, set once the call is accepted
    /// (or reported alongside a rejection when the ledger provides one).
    pub ledger_id: Option<String>,
    pub error: Option<String>,
    /// Number of status polls performed so far.
    pub attempts: u32,
}

impl TransactionState {
    pub fn idle() -> Self {
        TransactionState {
            status: TxStatus::Idle,
            tracking_id: None,
            ledger_id: None,
            error: None,
            attempts: 0,
        }
    }
}

impl Default for TransactionState {
    fn default() -> Self {
        Self::idle()
    }
}
