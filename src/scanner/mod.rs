//! Batch pipeline rebuilding the open-position set from record ciphertexts.
//!
//! Each refresh starts from scratch (no shared mutable position store, so a
//! stale entry cannot survive a refresh): decrypt every ciphertext with
//! bounded concurrency, parse the plaintexts, then drop dust, locally-known
//! closed positions, and positions the chain reports as closed. A failure
//! on one record never aborts the batch; it is logged and skipped.

use std::sync::Arc;

use futures::stream::{self, StreamExt};
use tracing::{debug, warn};

use crate::config::EngineConfig;
use crate::domain::{Address, Position};
use crate::error::EngineError;
use crate::ledger::{ChainReader, WalletClient};
use crate::parser::{parse_bool_mapping, parse_position};
use crate::store::{normalize_id, ClosedPositionStore};

const CLOSED_POSITIONS_MAPPING: &str = "closed_positions";

/// Rebuilds the caller's open positions from raw record ciphertexts.
pub struct PositionScanner {
    wallet: Arc<dyn WalletClient>,
    reader: Arc<dyn ChainReader>,
    store: Arc<dyn ClosedPositionStore>,
    config: EngineConfig,
}

impl PositionScanner {
    pub fn new(
        wallet: Arc<dyn WalletClient>,
        reader: Arc<dyn ChainReader>,
        store: Arc<dyn ClosedPositionStore>,
        config: EngineConfig,
    ) -> Self {
        Self {
            wallet,
            reader,
            store,
            config,
        }
    }

    /// Decrypt and filter the given ciphertexts into open positions, in
    /// input order. Per-record decrypt/parse failures are skipped; only a
    /// store failure aborts the scan.
    pub async fn scan(
        &self,
        owner: &Address,
        ciphertexts: &[String],
    ) -> Result<Vec<Position>, EngineError> {
        let decrypted: Vec<Result<Position, EngineError>> = stream::iter(ciphertexts)
            .map(|ciphertext| self.decrypt_and_parse(owner, ciphertext))
            .buffered(self.config.decrypt_concurrency)
            .collect()
            .await;

        let mut open = Vec::new();
        for result in decrypted {
            let position = match result {
                Ok(position) => position,
                Err(err) => {
                    warn!("Skipping record: {}", err);
                    continue;
                }
            };
            if position.size < self.config.min_position_size {
                debug!("Skipping dust position {} (size {})", position.id, position.size);
                continue;
            }

            let id = position.id.as_str();
            if self.store.contains(id).await? {
                debug!("Skipping locally closed position {}", position.id);
                continue;
            }

            if self.closed_on_chain(id).await {
                // Remember the on-chain verdict so the next refresh skips
                // the mapping lookup.
                self.store.insert(id).await?;
                continue;
            }

            open.push(position);
        }

        debug!(
            "Scan resolved {} open position(s) from {} ciphertext(s)",
            open.len(),
            ciphertexts.len()
        );
        Ok(open)
    }

    async fn decrypt_and_parse(
        &self,
        owner: &Address,
        ciphertext: &str,
    ) -> Result<Position, EngineError> {
        let plaintext = self
            .wallet
            .decrypt(ciphertext)
            .await
            .map_err(|err| EngineError::DecryptFailed(err.to_string()))?;

        Ok(parse_position(&plaintext, owner)?)
    }

    /// Whether the chain's `closed_positions` mapping marks this id as
    /// closed. Read errors count as "not closed": the local store and the
    /// next refresh will catch up.
    async fn closed_on_chain(&self, position_id: &str) -> bool {
        let result = self
            .reader
            .read_mapping(
                &self.config.program_id,
                CLOSED_POSITIONS_MAPPING,
                normalize_id(position_id),
            )
            .await;

        match result {
            Ok(Some(raw)) => parse_bool_mapping(&raw),
            Ok(None) => false,
            Err(err) => {
                warn!("Closed-position lookup failed for {}: {}", position_id, err);
                false
            }
        }
    }
}
