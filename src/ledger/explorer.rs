//! Explorer HTTP implementation of the chain-reader capability.

use async_trait::async_trait;
use backoff::future::retry;
use backoff::ExponentialBackoff;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

use super::{ChainReader, LedgerError};

/// Chain reader backed by a public explorer REST API
/// (`GET {base}/program/{program}/mapping/{mapping}/{key}`).
#[derive(Debug, Clone)]
pub struct ExplorerChainReader {
    client: Client,
    base_url: String,
}

impl ExplorerChainReader {
    /// Create a new explorer reader.
    pub fn new(base_url: String) -> Self {
        Self {
            client: Client::new(),
            base_url,
        }
    }

    /// Create with the default testnet explorer URL.
    pub fn default_url() -> Self {
        Self::new("https://api.explorer.provable.com/v1/testnet".to_string())
    }

    async fn get_mapping_value(&self, url: &str) -> Result<Option<String>, LedgerError> {
        let backoff = ExponentialBackoff {
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        };

        retry(backoff, || async {
            let response = self.client.get(url).send().await.map_err(|e| {
                backoff::Error::transient(LedgerError::NetworkError(e.to_string()))
            })?;

            let status = response.status();
            // An unset mapping key is reported as 404 and is not an error.
            if status == 404 {
                return Ok(None);
            }
            if status == 429 {
                return Err(backoff::Error::transient(LedgerError::RateLimited));
            }
            if status.is_server_error() {
                return Err(backoff::Error::transient(LedgerError::HttpError {
                    status: status.as_u16(),
                    message: "Server error".to_string(),
                }));
            }
            if !status.is_success() {
                return Err(backoff::Error::permanent(LedgerError::HttpError {
                    status: status.as_u16(),
                    message: "Client error".to_string(),
                }));
            }

            let body = response.text().await.map_err(|e| {
                backoff::Error::permanent(LedgerError::NetworkError(e.to_string()))
            })?;
            Ok(Some(decode_body(&body)))
        })
        .await
    }
}

/// The explorer wraps plaintext values in a JSON string; the endpoint also
/// reports unset keys as a JSON `null` body on some deployments.
fn decode_body(body: &str) -> String {
    if let Ok(inner) = serde_json::from_str::<String>(body) {
        return inner;
    }
    body.trim().to_string()
}

#[async_trait]
impl ChainReader for ExplorerChainReader {
    async fn read_mapping(
        &self,
        program: &str,
        mapping: &str,
        key: &str,
    ) -> Result<Option<String>, LedgerError> {
        debug!(
            "Reading mapping {}/{} key={} from explorer",
            program, mapping, key
        );

        let url = format!(
            "{}/program/{}/mapping/{}/{}",
            self.base_url, program, mapping, key
        );
        let value = self.get_mapping_value(&url).await?;
        Ok(value.filter(|v| v != "null"))
    }
}
