//! Mock wallet and chain reader for testing without a wallet bridge or
//! network calls.

use async_trait::async_trait;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Mutex;

use super::{ChainReader, LedgerError, StatusResponse, WalletClient};
use crate::domain::Address;
use crate::protocol::SubmitRequest;

/// Mock wallet returning scripted results.
///
/// Poll responses are consumed from a queue in order; once the queue is
/// empty the `default_status` response repeats, so "pending forever" and
/// "N pendings then accepted" scenarios are both one-liners.
#[derive(Debug)]
pub struct MockWalletClient {
    address: Option<Address>,
    submit_result: Result<String, LedgerError>,
    statuses: Mutex<VecDeque<Result<StatusResponse, LedgerError>>>,
    default_status: Result<StatusResponse, LedgerError>,
    records: HashMap<String, String>,
    submit_calls: AtomicU32,
    poll_calls: AtomicU32,
}

impl MockWalletClient {
    /// Create a disconnected mock (no identity, submissions fail).
    pub fn new() -> Self {
        Self {
            address: None,
            submit_result: Ok("at1mock".to_string()),
            statuses: Mutex::new(VecDeque::new()),
            default_status: Ok(StatusResponse::pending()),
            records: HashMap::new(),
            submit_calls: AtomicU32::new(0),
            poll_calls: AtomicU32::new(0),
        }
    }

    /// Set the connected identity.
    pub fn with_address(mut self, address: &str) -> Self {
        self.address = Some(Address::new(address.to_string()));
        self
    }

    /// Make submissions return the given tracking id.
    pub fn with_submit_ok(mut self, tracking_id: &str) -> Self {
        self.submit_result = Ok(tracking_id.to_string());
        self
    }

    /// Make submissions fail.
    pub fn with_submit_err(mut self, message: &str) -> Self {
        self.submit_result = Err(LedgerError::Other(message.to_string()));
        self
    }

    /// Queue one poll response.
    pub fn with_status(self, status: StatusResponse) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(status));
        self
    }

    /// Queue `count` identical poll responses.
    pub fn with_repeated_status(self, status: StatusResponse, count: usize) -> Self {
        {
            let mut queue = self.statuses.lock().unwrap();
            for _ in 0..count {
                queue.push_back(Ok(status.clone()));
            }
        }
        self
    }

    /// Queue `count` poll failures.
    pub fn with_poll_errors(self, message: &str, count: usize) -> Self {
        {
            let mut queue = self.statuses.lock().unwrap();
            for _ in 0..count {
                queue.push_back(Err(LedgerError::NotSupported(message.to_string())));
            }
        }
        self
    }

    /// Response repeated once the queue is exhausted (pending by default).
    pub fn with_default_status(mut self, status: Result<StatusResponse, LedgerError>) -> Self {
        self.default_status = status;
        self
    }

    /// Register a decryptable record. Unknown ciphertexts fail to decrypt.
    pub fn with_record(mut self, ciphertext: &str, plaintext: &str) -> Self {
        self.records
            .insert(ciphertext.to_string(), plaintext.to_string());
        self
    }

    /// Number of submit calls made so far.
    pub fn submit_calls(&self) -> u32 {
        self.submit_calls.load(Ordering::SeqCst)
    }

    /// Number of poll calls made so far.
    pub fn poll_calls(&self) -> u32 {
        self.poll_calls.load(Ordering::SeqCst)
    }
}

impl Default for MockWalletClient {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl WalletClient for MockWalletClient {
    fn connected_address(&self) -> Option<Address> {
        self.address.clone()
    }

    async fn submit(&self, _request: &SubmitRequest) -> Result<String, LedgerError> {
        self.submit_calls.fetch_add(1, Ordering::SeqCst);
        self.submit_result.clone()
    }

    async fn poll_status(&self, _tracking_id: &str) -> Result<StatusResponse, LedgerError> {
        self.poll_calls.fetch_add(1, Ordering::SeqCst);
        match self.statuses.lock().unwrap().pop_front() {
            Some(response) => response,
            None => self.default_status.clone(),
        }
    }

    async fn decrypt(&self, ciphertext: &str) -> Result<String, LedgerError> {
        self.records
            .get(ciphertext)
            .cloned()
            .ok_or_else(|| LedgerError::Other("could not decrypt record".to_string()))
    }
}

/// Mock chain reader returning predefined mapping entries.
#[derive(Debug, Clone, Default)]
pub struct MockChainReader {
    entries: HashMap<String, String>,
    fail: bool,
}

impl MockChainReader {
    /// Create a reader with no entries (every key reads as unset).
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a mapping entry.
    pub fn with_entry(mut self, mapping: &str, key: &str, value: &str) -> Self {
        self.entries
            .insert(format!("{}/{}", mapping, key), value.to_string());
        self
    }

    /// Make every read fail with a network error.
    pub fn with_failure(mut self) -> Self {
        self.fail = true;
        self
    }
}

#[async_trait]
impl ChainReader for MockChainReader {
    async fn read_mapping(
        &self,
        _program: &str,
        mapping: &str,
        key: &str,
    ) -> Result<Option<String>, LedgerError> {
        if self.fail {
            return Err(LedgerError::NetworkError("mock failure".to_string()));
        }
        Ok(self.entries.get(&format!("{}/{}", mapping, key)).cloned())
    }
}
