//! Transaction lifecycle state machine: submit, poll, resolve.
//!
//! One executor owns at most one in-flight call. The ledger confirms
//! transactions asynchronously and the only observable signal is a status
//! string keyed by a client-assigned tracking id, so the executor polls on a
//! fixed interval under two budgets: a hard ceiling on total polls (stalled
//! ledger) and a ceiling on consecutive poll failures (adapter that never
//! implemented status queries). Either exhausting budget or reaching a
//! terminal status stops the loop; failures always surface as a terminal
//! state with a message, never as a panic or a silent stall.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::domain::{TransactionState, TxStatus};
use crate::error::EngineError;
use crate::ledger::WalletClient;
use crate::protocol::SubmitRequest;

pub mod clock;

pub use clock::{Clock, InstantClock, SystemClock};

/// State machine driving one protocol call from submission to a terminal
/// status. State transitions are observable through a `watch` channel;
/// only the executor's own poll task ever mutates the state.
pub struct TransactionExecutor {
    wallet: Arc<dyn WalletClient>,
    clock: Arc<dyn Clock>,
    initial_delay: Duration,
    interval: Duration,
    max_polls: u32,
    max_poll_failures: u32,
    state: Arc<watch::Sender<TransactionState>>,
    poll_task: Mutex<Option<JoinHandle<()>>>,
}

impl TransactionExecutor {
    pub fn new(wallet: Arc<dyn WalletClient>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        let (state, _) = watch::channel(TransactionState::idle());
        Self {
            wallet,
            clock,
            initial_delay: Duration::from_millis(config.poll_initial_delay_ms),
            interval: Duration::from_millis(config.poll_interval_ms),
            max_polls: config.max_polls,
            max_poll_failures: config.max_poll_failures,
            state: Arc::new(state),
            poll_task: Mutex::new(None),
        }
    }

    /// Snapshot of the current transaction state.
    pub fn state(&self) -> TransactionState {
        self.state.borrow().clone()
    }

    /// Subscribe to state transitions.
    pub fn subscribe(&self) -> watch::Receiver<TransactionState> {
        self.state.subscribe()
    }

    /// Submit a protocol call and start tracking it.
    ///
    /// Any prior poll task is cancelled first: no two pollers may ever run
    /// for the same executor. Without a connected identity this goes
    /// straight to a terminal `Error` without touching the ledger. Returns
    /// the tracking id when submission succeeded.
    pub async fn execute(&self, request: SubmitRequest) -> Option<String> {
        self.stop_polling();

        if self.wallet.connected_address().is_none() {
            self.state.send_replace(TransactionState {
                status: TxStatus::Error,
                error: Some(EngineError::NotConnected.to_string()),
                ..TransactionState::idle()
            });
            return None;
        }

        self.state.send_replace(TransactionState {
            status: TxStatus::Submitting,
            ..TransactionState::idle()
        });

        debug!(
            "Submitting {}/{} with {} inputs",
            request.program,
            request.function,
            request.inputs.len()
        );

        let tracking_id = match self.wallet.submit(&request).await {
            Ok(id) => id,
            Err(err) => {
                warn!("Submission failed: {}", err);
                self.state.send_replace(TransactionState {
                    status: TxStatus::Error,
                    error: Some(EngineError::SubmissionFailed(err.to_string()).to_string()),
                    ..TransactionState::idle()
                });
                return None;
            }
        };

        self.state.send_replace(TransactionState {
            status: TxStatus::Pending,
            tracking_id: Some(tracking_id.clone()),
            ..TransactionState::idle()
        });

        self.spawn_poll_task(tracking_id.clone());
        Some(tracking_id)
    }

    /// Cancel any active polling and return to `Idle`.
    pub fn reset(&self) {
        self.stop_polling();
        self.state.send_replace(TransactionState::idle());
    }

    fn stop_polling(&self) {
        if let Some(task) = self.poll_task.lock().unwrap().take() {
            task.abort();
        }
    }

    fn spawn_poll_task(&self, tracking_id: String) {
        let wallet = Arc::clone(&self.wallet);
        let clock = Arc::clone(&self.clock);
        let state = Arc::clone(&self.state);
        let initial_delay = self.initial_delay;
        let interval = self.interval;
        let max_polls = self.max_polls;
        let max_poll_failures = self.max_poll_failures;

        let task = tokio::spawn(async move {
            clock.sleep(initial_delay).await;

            let mut attempts = 0u32;
            let mut consecutive_failures = 0u32;
            loop {
                if attempts >= max_polls {
                    warn!(
                        "Giving up on {} after {} status polls",
                        tracking_id, attempts
                    );
                    state.send_modify(|s| {
                        s.status = TxStatus::Error;
                        s.error = Some(EngineError::PollingTimedOut.to_string());
                    });
                    return;
                }

                attempts += 1;
                state.send_modify(|s| s.attempts = attempts);

                match wallet.poll_status(&tracking_id).await {
                    Ok(response) => {
                        consecutive_failures = 0;
                        let status = response.status.to_lowercase();
                        debug!("Poll #{} for {}: {}", attempts, tracking_id, status);

                        match status.as_str() {
                            "pending" => {}
                            "accepted" | "finalized" => {
                                state.send_modify(|s| {
                                    s.status = TxStatus::Accepted;
                                    s.ledger_id = response.ledger_id.clone();
                                    s.error = None;
                                });
                                return;
                            }
                            "rejected" | "failed" => {
                                let terminal = if status == "rejected" {
                                    TxStatus::Rejected
                                } else {
                                    TxStatus::Failed
                                };
                                let message = response.error.clone().unwrap_or_else(|| {
                                    let reason = "no reason given".to_string();
                                    match terminal {
                                        TxStatus::Rejected => {
                                            EngineError::LedgerRejected(reason).to_string()
                                        }
                                        _ => EngineError::LedgerFailed(reason).to_string(),
                                    }
                                });
                                state.send_modify(|s| {
                                    s.status = terminal;
                                    s.ledger_id = response.ledger_id.clone();
                                    s.error = Some(message);
                                });
                                return;
                            }
                            _ => {
                                state.send_modify(|s| {
                                    s.status = TxStatus::Error;
                                    s.error =
                                        Some(format!("unknown status: {}", response.status));
                                });
                                return;
                            }
                        }
                    }
                    Err(err) => {
                        consecutive_failures += 1;
                        warn!(
                            "Poll #{} for {} failed ({} consecutive): {}",
                            attempts, tracking_id, consecutive_failures, err
                        );
                        if consecutive_failures >= max_poll_failures {
                            state.send_modify(|s| {
                                s.status = TxStatus::Error;
                                s.error = Some(
                                    EngineError::PollingUnsupported(err.to_string()).to_string(),
                                );
                            });
                            return;
                        }
                    }
                }

                clock.sleep(interval).await;
            }
        });

        *self.poll_task.lock().unwrap() = Some(task);
    }
}

impl Drop for TransactionExecutor {
    fn drop(&mut self) {
        self.stop_polling();
    }
}
