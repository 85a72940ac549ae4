/// Explorer / node HTTP client
///
/// Network boundary of the pipeline. Two operations: list all current
/// entries of a program mapping (explorer API) and broadcast a serialized
/// transaction (node API). Everything else in the crate talks to this
/// through the `ChainClient` trait so tests can substitute fakes.

use crate::models::{BuiltTransaction, MappingEntry};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Default timeout for explorer and node calls
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default explorer API base (mapping snapshots)
pub const DEFAULT_EXPLORER_BASE: &str = "https://api.testnet.aleoscan.io";

/// Default node API base (transaction broadcast)
pub const DEFAULT_NODE_BASE: &str = "https://api.explorer.provable.com/v1";

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    /// The mapping does not exist yet; callers treat this as empty, not
    /// as a failure
    MappingAbsent { program_id: String, mapping: String },
    /// HTTP request failed (connection refused, DNS, timeout, ...)
    RequestFailed(String),
    /// The endpoint answered but the body was not what we expect
    InvalidResponse(String),
    /// The node refused the transaction outright
    Rejected(String),
}

impl std::fmt::Display for ChainError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ChainError::MappingAbsent { program_id, mapping } => {
                write!(f, "mapping {}/{} not found", program_id, mapping)
            }
            ChainError::RequestFailed(msg) => write!(f, "request failed: {}", msg),
            ChainError::InvalidResponse(msg) => write!(f, "invalid response: {}", msg),
            ChainError::Rejected(msg) => write!(f, "transaction rejected: {}", msg),
        }
    }
}

impl std::error::Error for ChainError {}

// ============================================================================
// CHAIN CLIENT TRAIT
// ============================================================================

/// The ledger network as seen by this pipeline. Both operations are
/// stateless, independent requests; a shared handle needs no locking.
#[async_trait]
pub trait ChainClient: Send + Sync {
    /// List every current entry of `mapping` under `program_id`.
    async fn fetch_mapping_entries(
        &self,
        program_id: &str,
        mapping: &str,
    ) -> Result<Vec<MappingEntry>, ChainError>;

    /// Broadcast a serialized transaction; returns the acknowledged
    /// transaction id. Safe to call repeatedly with the identical payload,
    /// the ledger rejects duplicates.
    async fn submit_transaction(&self, tx: &BuiltTransaction) -> Result<String, ChainError>;
}

// ============================================================================
// RESPONSE TYPES
// ============================================================================

/// Explorer response for a mapping listing. The explorer reports an absent
/// mapping through the `error` field rather than an empty `result`.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct MappingListResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    result: Option<Vec<MappingEntry>>,
}

// ============================================================================
// EXPLORER CLIENT
// ============================================================================

/// Production `ChainClient` speaking the explorer/node HTTP API.
#[derive(Debug, Clone)]
pub struct ExplorerClient {
    /// Explorer API base URL (mapping queries)
    explorer_base: String,
    /// Node API base URL (broadcast)
    node_base: String,
    client: Client,
}

impl ExplorerClient {
    pub fn new(explorer_base: impl Into<String>, node_base: impl Into<String>) -> Self {
        Self::with_timeout(
            explorer_base,
            node_base,
            Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        )
    }

    pub fn with_timeout(
        explorer_base: impl Into<String>,
        node_base: impl Into<String>,
        timeout: Duration,
    ) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            explorer_base: explorer_base.into(),
            node_base: node_base.into(),
            client,
        }
    }

    fn mapping_url(&self, program_id: &str, mapping: &str) -> String {
        format!(
            "{}/v2/mapping/list_program_mapping_values/{}/{}",
            self.explorer_base, program_id, mapping
        )
    }

    fn broadcast_url(&self) -> String {
        format!("{}/testnet/transaction/broadcast", self.node_base)
    }
}

#[async_trait]
impl ChainClient for ExplorerClient {
    async fn fetch_mapping_entries(
        &self,
        program_id: &str,
        mapping: &str,
    ) -> Result<Vec<MappingEntry>, ChainError> {
        let url = self.mapping_url(program_id, mapping);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ChainError::RequestFailed(e.to_string()))?;

        if response.status().as_u16() == 404 {
            return Err(ChainError::MappingAbsent {
                program_id: program_id.to_string(),
                mapping: mapping.to_string(),
            });
        }

        if !response.status().is_success() {
            return Err(ChainError::RequestFailed(format!(
                "explorer returned status {}",
                response.status()
            )));
        }

        let body: MappingListResponse = response
            .json()
            .await
            .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

        if let Some(err) = body.error {
            // A "not found" style error means the mapping has no entries yet
            let lowered = err.to_lowercase();
            if lowered.contains("not found") || lowered.contains("does not exist") {
                return Err(ChainError::MappingAbsent {
                    program_id: program_id.to_string(),
                    mapping: mapping.to_string(),
                });
            }
            return Err(ChainError::InvalidResponse(err));
        }

        let entries = body.result.unwrap_or_default();
        debug!(program = program_id, mapping = mapping, entries = entries.len(), "fetched mapping");
        Ok(entries)
    }

    async fn submit_transaction(&self, tx: &BuiltTransaction) -> Result<String, ChainError> {
        let url = self.broadcast_url();

        let response = self
            .client
            .post(&url)
            .header("Content-Type", "application/json")
            .body(tx.as_str().to_string())
            .send()
            .await
            .map_err(|e| ChainError::RequestFailed(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ChainError::InvalidResponse(e.to_string()))?;

        if !status.is_success() {
            return Err(ChainError::Rejected(format!(
                "node returned status {}: {}",
                status,
                body.trim()
            )));
        }

        // The node answers with the transaction id, possibly JSON-quoted
        let tx_id = body.trim().trim_matches('"').to_string();
        if tx_id.is_empty() {
            return Err(ChainError::InvalidResponse(
                "node acknowledged with an empty transaction id".to_string(),
            ));
        }

        Ok(tx_id)
    }
}

// ============================================================================
// TESTS
// ============================================================================
