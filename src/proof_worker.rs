/// Proof compute worker
///
/// Proof synthesis blocks for seconds. The worker moves every build onto
/// tokio's blocking pool so the UI-facing loop stays responsive, and hands
/// back the builder's result untouched. Each call is independent; no
/// mutable state is shared between in-flight builds.

use crate::models::{BuiltTransaction, ExecutionRequest, FeePolicy, ProgramDescriptor, SigningCredential};
use crate::prover::{ProofBuildError, TransactionBuilder};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

pub struct ProofComputeWorker {
    builder: Arc<dyn TransactionBuilder>,
}

impl ProofComputeWorker {
    /// Explicitly constructed and owned by the orchestrator; no process-wide
    /// singleton handle.
    pub fn new(builder: Arc<dyn TransactionBuilder>) -> Self {
        Self { builder }
    }

    /// Build a proved execution transaction off the async loop.
    pub async fn build_execution(
        &self,
        request: ExecutionRequest,
    ) -> Result<BuiltTransaction, ProofBuildError> {
        let builder = Arc::clone(&self.builder);
        let function = request.function_name.clone();
        let started = Instant::now();
        debug!(function = %function, "starting execution build");

        let result = tokio::task::spawn_blocking(move || builder.build_execution(&request))
            .await
            .map_err(|e| ProofBuildError::Synthesis(format!("build task failed: {}", e)))?;

        info!(
            function = %function,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "execution build finished"
        );
        result
    }

    /// Build a deployment transaction off the async loop.
    pub async fn build_deployment(
        &self,
        program: ProgramDescriptor,
        credential: SigningCredential,
        fee: FeePolicy,
    ) -> Result<BuiltTransaction, ProofBuildError> {
        let builder = Arc::clone(&self.builder);
        let program_name = program.name.clone();
        let started = Instant::now();
        debug!(program = %program_name, "starting deployment build");

        let result =
            tokio::task::spawn_blocking(move || builder.build_deployment(&program, &credential, &fee))
                .await
                .map_err(|e| ProofBuildError::Synthesis(format!("build task failed: {}", e)))?;

        info!(
            program = %program_name,
            elapsed_ms = started.elapsed().as_millis() as u64,
            ok = result.is_ok(),
            "deployment build finished"
        );
        result
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::prover::MockProver;

    fn worker() -> ProofComputeWorker {
        ProofComputeWorker::new(Arc::new(MockProver::new()))
    }

    #[tokio::test]
    async fn test_build_execution_off_loop() {
        let request = ExecutionRequest {
            program: ProgramDescriptor::new("price_proof_test_11.aleo", "src"),
            function_name: "initialize_market".to_string(),
            inputs: vec!["2500u64".to_string()],
            credential: SigningCredential::new("APrivateKey1test"),
            fee: FeePolicy::public(0),
        };

        let tx = worker().build_execution(request).await.unwrap();
        assert!(tx.as_str().contains("initialize_market"));
    }

    #[tokio::test]
    async fn test_build_failure_propagates_as_error() {
        let request = ExecutionRequest {
            program: ProgramDescriptor::new("price_proof_test_11.aleo", "src"),
            function_name: String::new(),
            inputs: vec![],
            credential: SigningCredential::new("APrivateKey1test"),
            fee: FeePolicy::public(0),
        };

        let err = worker().build_execution(request).await.unwrap_err();
        assert!(matches!(err, ProofBuildError::InvalidInput(_)));
    }

    #[tokio::test]
    async fn test_build_deployment_off_loop() {
        let tx = worker()
            .build_deployment(
                ProgramDescriptor::new("price_proof_test_11.aleo", "program src"),
                SigningCredential::new("APrivateKey1test"),
                FeePolicy::public(1_900_000),
            )
            .await
            .unwrap();
        assert!(tx.as_str().contains("deploy"));
    }
}
