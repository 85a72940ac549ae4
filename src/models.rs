// Data models for the PriceProof client pipeline

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// SIGNING CREDENTIAL
// ============================================================================

/// Opaque private key supplied by the caller.
///
/// This layer performs no validation beyond passing it through to the
/// transaction builder. The raw material is deliberately excluded from
/// `Debug` output so it can never leak through logging.
#[derive(Clone)]
pub struct SigningCredential(String);

impl SigningCredential {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Access the raw key. Only the transaction builder should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Debug for SigningCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SigningCredential(<redacted>)")
    }
}

// ============================================================================
// PROGRAM & EXECUTION TYPES
// ============================================================================

/// A deployed (or deployable) program: identifier plus source text.
/// Immutable once loaded.
#[derive(Debug, Clone)]
pub struct ProgramDescriptor {
    /// Program identifier, e.g. "price_proof_test_11.aleo"
    pub name: String,
    /// Full program source text (needed for deployment and local synthesis)
    pub source: String,
}

impl ProgramDescriptor {
    pub fn new(name: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Fee configuration attached to a build request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct FeePolicy {
    /// Fixed fee amount in microcredits
    pub fee_microcredits: u64,
    /// Whether the fee is paid from a private record instead of public balance
    pub private_fee: bool,
}

impl FeePolicy {
    pub fn public(fee_microcredits: u64) -> Self {
        Self {
            fee_microcredits,
            private_fee: false,
        }
    }
}

/// Everything the proof/transaction builder needs for one function
/// execution. Constructed fresh per user action, never reused.
#[derive(Debug, Clone)]
pub struct ExecutionRequest {
    pub program: ProgramDescriptor,
    pub function_name: String,
    /// Ordered typed-literal inputs, e.g. ["10u64", "true"]
    pub inputs: Vec<String>,
    pub credential: SigningCredential,
    pub fee: FeePolicy,
}

/// Opaque serialized transaction produced by the proof builder.
///
/// Never mutated after creation; the submission retrier may send the
/// identical payload multiple times and relies on the ledger rejecting
/// duplicates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuiltTransaction(String);

impl BuiltTransaction {
    pub fn new(serialized: impl Into<String>) -> Self {
        Self(serialized.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

// ============================================================================
// SUBMISSION OUTCOME
// ============================================================================

/// Result of pushing one built transaction through the retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The node acknowledged the transaction
    Confirmed {
        transaction_id: String,
        /// Total attempts made, including the successful one
        attempts: u32,
    },
    /// Every attempt failed; carries the last observed error
    Exhausted { attempts: u32, last_error: String },
    /// The caller cancelled between attempts
    Cancelled { attempts: u32 },
}

// ============================================================================
// MARKET ACTIONS
// ============================================================================

/// A user action routed through the orchestrator. One exhaustive dispatch
/// replaces the ad hoc per-button branching of the original webapp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketAction {
    /// Create the market with its price threshold
    InitializeMarket { threshold: u64 },
    /// Stake `amount` on the bull (true) or bear (false) side
    PlaceBet { amount: u64, is_bull: bool },
    /// Deploy the market program itself
    DeployProgram,
}

impl MarketAction {
    /// Short label for logs and outcome reporting
    pub fn kind(&self) -> &'static str {
        match self {
            MarketAction::InitializeMarket { .. } => "initialize_market",
            MarketAction::PlaceBet { .. } => "place_bet",
            MarketAction::DeployProgram => "deploy_program",
        }
    }
}

/// Final, UI-facing result of `run_action`. Fatal errors are values here,
/// never panics or bubbled `Err`s, so the UI can render a message and
/// re-enable its controls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ActionOutcome {
    /// Built, submitted, and acknowledged by the node
    Submitted {
        transaction_id: String,
        attempts: u32,
    },
    /// Proof synthesis / transaction construction failed; nothing was sent
    BuildFailed { reason: String },
    /// Built fine but every submission attempt failed
    SubmissionFailed { attempts: u32, last_error: String },
    /// Submission was cancelled between attempts
    Cancelled { attempts: u32 },
}

// ============================================================================
// MARKET STATS
// ============================================================================

/// One key-value pair from an on-chain mapping snapshot.
/// Keys are bettor addresses, values are typed literals like "10u64".
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MappingEntry {
    pub key: String,
    pub value: String,
}

/// Aggregate stats for one side of the market.
///
/// `unique_participants` counts every mapping entry; `volume` sums only the
/// values that decode. The asymmetry is inherited from the original and kept
/// on purpose (see DESIGN.md).
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketSide {
    pub unique_participants: u64,
    pub volume: u64,
}

/// Full market picture from one poll tick. Replaced wholesale every cycle;
/// consumers must treat it as the authoritative current state, not a delta.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MarketStatsSnapshot {
    pub bull: MarketSide,
    pub bear: MarketSide,
    pub as_of: DateTime<Utc>,
    /// Non-fatal per-side fetch failures observed this tick
    pub warnings: Vec<String>,
}

impl MarketStatsSnapshot {
    pub fn empty() -> Self {
        Self {
            bull: MarketSide::default(),
            bear: MarketSide::default(),
            as_of: Utc::now(),
            warnings: Vec::new(),
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================
