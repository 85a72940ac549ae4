/// Proof / transaction builder boundary
///
/// The actual proving system lives outside this crate. This module defines
/// the interface the orchestration layer depends on, plus a mock builder
/// for local development and tests, in the same spirit as running the
/// chain client against a mock backend when no live endpoint is configured.
///
/// Builds are CPU-heavy and may take seconds; implementations are called
/// exclusively through `ProofComputeWorker`, never on the async loop.

use crate::models::{BuiltTransaction, ExecutionRequest, FeePolicy, ProgramDescriptor, SigningCredential};
use serde_json::json;

// ============================================================================
// ERROR TYPES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProofBuildError {
    /// A request input was malformed before synthesis even started
    InvalidInput(String),
    /// The program failed to compile or the proof failed to synthesize
    Synthesis(String),
    /// The builder could not resolve fee/records for the credential
    RecordResolution(String),
}

impl std::fmt::Display for ProofBuildError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProofBuildError::InvalidInput(msg) => write!(f, "invalid input: {}", msg),
            ProofBuildError::Synthesis(msg) => write!(f, "proof synthesis failed: {}", msg),
            ProofBuildError::RecordResolution(msg) => {
                write!(f, "record resolution failed: {}", msg)
            }
        }
    }
}

impl std::error::Error for ProofBuildError {}

// ============================================================================
// TRANSACTION BUILDER TRAIT
// ============================================================================

/// External proof/transaction builder. Implementations resolve any record
/// lookups internally using the supplied credential and must not share
/// mutable state between in-flight builds.
pub trait TransactionBuilder: Send + Sync {
    /// Synthesize a proof for one function execution and package it as a
    /// submittable transaction.
    fn build_execution(&self, request: &ExecutionRequest)
        -> Result<BuiltTransaction, ProofBuildError>;

    /// Package a program deployment as a submittable transaction.
    fn build_deployment(
        &self,
        program: &ProgramDescriptor,
        credential: &SigningCredential,
        fee: &FeePolicy,
    ) -> Result<BuiltTransaction, ProofBuildError>;
}

// ============================================================================
// MOCK PROVER
// ============================================================================

/// Stand-in builder used when no real prover is wired up. Produces
/// structurally plausible payloads without any cryptography so the rest of
/// the pipeline can run end to end locally. Transactions it emits will be
/// rejected by a real node.
#[derive(Debug, Clone, Default)]
pub struct MockProver;

impl MockProver {
    pub fn new() -> Self {
        Self
    }

    fn check_credential(credential: &SigningCredential) -> Result<(), ProofBuildError> {
        if credential.is_empty() {
            return Err(ProofBuildError::RecordResolution(
                "no signing credential supplied".to_string(),
            ));
        }
        Ok(())
    }
}

impl TransactionBuilder for MockProver {
    fn build_execution(
        &self,
        request: &ExecutionRequest,
    ) -> Result<BuiltTransaction, ProofBuildError> {
        Self::check_credential(&request.credential)?;

        if request.function_name.is_empty() {
            return Err(ProofBuildError::InvalidInput(
                "empty function name".to_string(),
            ));
        }
        if request.inputs.iter().any(|i| i.is_empty()) {
            return Err(ProofBuildError::InvalidInput(
                "empty execution input".to_string(),
            ));
        }

        let payload = json!({
            "type": "execute",
            "program": request.program.name,
            "function": request.function_name,
            "inputs": request.inputs,
            "fee_microcredits": request.fee.fee_microcredits,
            "private_fee": request.fee.private_fee,
        });

        Ok(BuiltTransaction::new(payload.to_string()))
    }

    fn build_deployment(
        &self,
        program: &ProgramDescriptor,
        credential: &SigningCredential,
        fee: &FeePolicy,
    ) -> Result<BuiltTransaction, ProofBuildError> {
        Self::check_credential(credential)?;

        if program.source.is_empty() {
            return Err(ProofBuildError::Synthesis(
                "program source is empty, nothing to deploy".to_string(),
            ));
        }

        let payload = json!({
            "type": "deploy",
            "program": program.name,
            "source_len": program.source.len(),
            "fee_microcredits": fee.fee_microcredits,
            "private_fee": fee.private_fee,
        });

        Ok(BuiltTransaction::new(payload.to_string()))
    }
}

// ============================================================================
// TESTS
// ============================================================================
