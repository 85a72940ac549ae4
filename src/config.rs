/// Pipeline configuration
///
/// Everything tunable comes from environment variables with documented
/// defaults. Defaults target the public testnet deployment of the
/// PriceProof market program.

use crate::chain_client::{DEFAULT_EXPLORER_BASE, DEFAULT_NODE_BASE};
use crate::models::{FeePolicy, ProgramDescriptor};
use crate::stats::DEFAULT_POLL_INTERVAL_SECS;
use crate::submission::{DEFAULT_INITIAL_BACKOFF_MS, DEFAULT_MAX_ATTEMPTS};
use std::time::Duration;
use tracing::warn;

// ============================================================================
// CONSTANTS
// ============================================================================

/// Program the pipeline executes against
pub const DEFAULT_PROGRAM_NAME: &str = "price_proof_test_11.aleo";

/// Execution priority fee (microcredits); executions pay a public fee
pub const DEFAULT_EXECUTION_FEE_MICROCREDITS: u64 = 0;

/// Deployment fee: 1.9 credits
pub const DEFAULT_DEPLOYMENT_FEE_MICROCREDITS: u64 = 1_900_000;

/// Default HTTP bind address for the UI boundary
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";

// ============================================================================
// CONFIG
// ============================================================================

#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Explorer API base URL (mapping snapshots)
    pub explorer_base: String,
    /// Node API base URL (transaction broadcast)
    pub node_base: String,
    /// Program identifier the market lives under
    pub program_name: String,
    /// Optional path to the program source (required for real deployments)
    pub program_source_path: Option<String>,
    /// Stats polling cadence
    pub poll_interval: Duration,
    /// Submission attempt ceiling
    pub max_submit_attempts: u32,
    /// First inter-attempt backoff delay; doubles per attempt up to the
    /// retrier's ceiling
    pub submit_backoff: Duration,
    /// Fee attached to function executions
    pub execution_fee: FeePolicy,
    /// Fee attached to program deployments
    pub deployment_fee: FeePolicy,
    /// HTTP bind address for the UI boundary
    pub bind_addr: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            explorer_base: DEFAULT_EXPLORER_BASE.to_string(),
            node_base: DEFAULT_NODE_BASE.to_string(),
            program_name: DEFAULT_PROGRAM_NAME.to_string(),
            program_source_path: None,
            poll_interval: Duration::from_secs(DEFAULT_POLL_INTERVAL_SECS),
            max_submit_attempts: DEFAULT_MAX_ATTEMPTS,
            submit_backoff: Duration::from_millis(DEFAULT_INITIAL_BACKOFF_MS),
            execution_fee: FeePolicy::public(DEFAULT_EXECUTION_FEE_MICROCREDITS),
            deployment_fee: FeePolicy::public(DEFAULT_DEPLOYMENT_FEE_MICROCREDITS),
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
        }
    }
}

impl PipelineConfig {
    /// Build configuration from the environment, falling back to defaults
    /// for anything unset or unparseable.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        Self {
            explorer_base: env_or("EXPLORER_BASE_URL", defaults.explorer_base),
            node_base: env_or("NODE_BASE_URL", defaults.node_base),
            program_name: env_or("PROGRAM_NAME", defaults.program_name),
            program_source_path: std::env::var("PROGRAM_SOURCE_PATH").ok(),
            poll_interval: Duration::from_secs(env_parsed(
                "POLL_INTERVAL_SECS",
                DEFAULT_POLL_INTERVAL_SECS,
            )),
            max_submit_attempts: env_parsed("MAX_SUBMIT_ATTEMPTS", DEFAULT_MAX_ATTEMPTS),
            submit_backoff: Duration::from_millis(env_parsed(
                "SUBMIT_BACKOFF_MS",
                DEFAULT_INITIAL_BACKOFF_MS,
            )),
            execution_fee: FeePolicy::public(env_parsed(
                "EXECUTION_FEE_MICROCREDITS",
                DEFAULT_EXECUTION_FEE_MICROCREDITS,
            )),
            deployment_fee: FeePolicy::public(env_parsed(
                "DEPLOYMENT_FEE_MICROCREDITS",
                DEFAULT_DEPLOYMENT_FEE_MICROCREDITS,
            )),
            bind_addr: env_or("BIND_ADDR", defaults.bind_addr),
        }
    }

    /// Load the program descriptor. Without a source path the descriptor
    /// carries an empty source, which is fine for executions and stats but
    /// makes deployments fail at build time.
    pub fn load_program(&self) -> ProgramDescriptor {
        let source = match &self.program_source_path {
            Some(path) => match std::fs::read_to_string(path) {
                Ok(source) => source,
                Err(e) => {
                    warn!(path = %path, error = %e, "could not read program source, deployments will fail");
                    String::new()
                }
            },
            None => String::new(),
        };

        ProgramDescriptor::new(self.program_name.clone(), source)
    }
}

fn env_or(key: &str, default: String) -> String {
    std::env::var(key).unwrap_or(default)
}

fn env_parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// ============================================================================
// TESTS
// ============================================================================
