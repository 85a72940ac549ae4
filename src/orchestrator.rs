/// Execution orchestrator
///
/// Top-level façade for user actions. Routes a `MarketAction` through the
/// proof worker and then the submission retrier, and folds every failure
/// mode into an `ActionOutcome` value. Nothing here panics or returns
/// `Err` to the UI boundary.
///
/// The orchestrator is stateless per call and holds no locks; single-flight
/// per action class is the caller's concern (the UI disables its controls
/// while an action is in flight).

use crate::chain_client::ChainClient;
use crate::models::{
    ActionOutcome, ExecutionRequest, FeePolicy, MarketAction, ProgramDescriptor,
    SigningCredential, SubmissionOutcome,
};
use crate::proof_worker::ProofComputeWorker;
use crate::submission::{CancelHandle, SubmissionRetrier};
use crate::value_codec;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

// ============================================================================
// FUNCTION NAMES
// ============================================================================

/// On-chain transition that creates the market
pub const INITIALIZE_FUNCTION: &str = "initialize_market";

/// On-chain transition that stakes a bet
pub const PLACE_BET_FUNCTION: &str = "place_bet";

// ============================================================================
// ORCHESTRATOR
// ============================================================================

pub struct ExecutionOrchestrator {
    program: ProgramDescriptor,
    execution_fee: FeePolicy,
    deployment_fee: FeePolicy,
    worker: ProofComputeWorker,
    retrier: SubmissionRetrier,
    client: Arc<dyn ChainClient>,
}

impl ExecutionOrchestrator {
    pub fn new(
        program: ProgramDescriptor,
        execution_fee: FeePolicy,
        deployment_fee: FeePolicy,
        worker: ProofComputeWorker,
        retrier: SubmissionRetrier,
        client: Arc<dyn ChainClient>,
    ) -> Self {
        Self {
            program,
            execution_fee,
            deployment_fee,
            worker,
            retrier,
            client,
        }
    }

    /// Build and submit one user action. Build failures return immediately;
    /// the submit phase is never entered without a built transaction.
    pub async fn run_action(
        &self,
        action: MarketAction,
        credential: SigningCredential,
        cancel: &CancelHandle,
    ) -> ActionOutcome {
        let action_id = Uuid::new_v4();
        info!(action_id = %action_id, kind = action.kind(), "running market action");

        let built = match &action {
            MarketAction::InitializeMarket { threshold } => {
                self.worker
                    .build_execution(self.execution_request(
                        INITIALIZE_FUNCTION,
                        vec![value_codec::encode_u64(*threshold)],
                        credential,
                    ))
                    .await
            }
            MarketAction::PlaceBet { amount, is_bull } => {
                self.worker
                    .build_execution(self.execution_request(
                        PLACE_BET_FUNCTION,
                        vec![value_codec::encode_u64(*amount), is_bull.to_string()],
                        credential,
                    ))
                    .await
            }
            MarketAction::DeployProgram => {
                self.worker
                    .build_deployment(self.program.clone(), credential, self.deployment_fee)
                    .await
            }
        };

        let tx = match built {
            Ok(tx) => tx,
            Err(e) => {
                warn!(action_id = %action_id, kind = action.kind(), error = %e, "build failed");
                return ActionOutcome::BuildFailed {
                    reason: e.to_string(),
                };
            }
        };

        match self.retrier.submit(self.client.as_ref(), &tx, cancel).await {
            SubmissionOutcome::Confirmed {
                transaction_id,
                attempts,
            } => {
                info!(action_id = %action_id, tx_id = %transaction_id, attempts, "action submitted");
                ActionOutcome::Submitted {
                    transaction_id,
                    attempts,
                }
            }
            SubmissionOutcome::Exhausted {
                attempts,
                last_error,
            } => {
                warn!(action_id = %action_id, attempts, last_error = %last_error, "submission exhausted");
                ActionOutcome::SubmissionFailed {
                    attempts,
                    last_error,
                }
            }
            SubmissionOutcome::Cancelled { attempts } => {
                info!(action_id = %action_id, attempts, "action cancelled");
                ActionOutcome::Cancelled { attempts }
            }
        }
    }

    fn execution_request(
        &self,
        function_name: &str,
        inputs: Vec<String>,
        credential: SigningCredential,
    ) -> ExecutionRequest {
        ExecutionRequest {
            program: self.program.clone(),
            function_name: function_name.to_string(),
            inputs,
            credential,
            fee: self.execution_fee,
        }
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain_client::ChainError;
    use crate::models::{BuiltTransaction, MappingEntry};
    use crate::prover::{MockProver, ProofBuildError, TransactionBuilder};
    use crate::submission::RetryPolicy;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicU32, Ordering};

    /// Counts submissions; acknowledges everything.
    struct CountingClient {
        submits: AtomicU32,
    }

    impl CountingClient {
        fn new() -> Self {
            Self {
                submits: AtomicU32::new(0),
            }
        }
    }

    #[async_trait]
    impl ChainClient for CountingClient {
        async fn fetch_mapping_entries(
            &self,
            _program_id: &str,
            _mapping: &str,
        ) -> Result<Vec<MappingEntry>, ChainError> {
            Ok(vec![])
        }

        async fn submit_transaction(&self, _tx: &BuiltTransaction) -> Result<String, ChainError> {
            self.submits.fetch_add(1, Ordering::SeqCst);
            Ok("at1txid".to_string())
        }
    }

    /// Builder that always fails synthesis.
    struct FailingBuilder;

    impl TransactionBuilder for FailingBuilder {
        fn build_execution(
            &self,
            _request: &ExecutionRequest,
        ) -> Result<BuiltTransaction, ProofBuildError> {
            Err(ProofBuildError::Synthesis("circuit unsatisfied".to_string()))
        }

        fn build_deployment(
            &self,
            _program: &ProgramDescriptor,
            _credential: &SigningCredential,
            _fee: &FeePolicy,
        ) -> Result<BuiltTransaction, ProofBuildError> {
            Err(ProofBuildError::Synthesis("circuit unsatisfied".to_string()))
        }
    }

    fn orchestrator(
        builder: Arc<dyn TransactionBuilder>,
        client: Arc<CountingClient>,
    ) -> ExecutionOrchestrator {
        ExecutionOrchestrator::new(
            ProgramDescriptor::new("price_proof_test_11.aleo", "program src"),
            FeePolicy::public(0),
            FeePolicy::public(1_900_000),
            ProofComputeWorker::new(builder),
            SubmissionRetrier::new(RetryPolicy::no_backoff(50)),
            client,
        )
    }

    #[tokio::test]
    async fn test_place_bet_composes_build_and_submit() {
        let client = Arc::new(CountingClient::new());
        let orch = orchestrator(Arc::new(MockProver::new()), client.clone());

        let outcome = orch
            .run_action(
                MarketAction::PlaceBet {
                    amount: 10,
                    is_bull: true,
                },
                SigningCredential::new("APrivateKey1test"),
                &CancelHandle::new(),
            )
            .await;

        assert!(matches!(outcome, ActionOutcome::Submitted { attempts: 1, .. }));
        assert_eq!(client.submits.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_build_failure_never_submits() {
        let client = Arc::new(CountingClient::new());
        let orch = orchestrator(Arc::new(FailingBuilder), client.clone());

        let outcome = orch
            .run_action(
                MarketAction::PlaceBet {
                    amount: 10,
                    is_bull: true,
                },
                SigningCredential::new("APrivateKey1test"),
                &CancelHandle::new(),
            )
            .await;

        match outcome {
            ActionOutcome::BuildFailed { reason } => {
                assert!(reason.contains("circuit unsatisfied"));
            }
            other => panic!("expected build failure, got {:?}", other),
        }
        assert_eq!(client.submits.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_initialize_market_encodes_threshold() {
        let client = Arc::new(CountingClient::new());
        let orch = orchestrator(Arc::new(MockProver::new()), client.clone());

        let outcome = orch
            .run_action(
                MarketAction::InitializeMarket { threshold: 2500 },
                SigningCredential::new("APrivateKey1test"),
                &CancelHandle::new(),
            )
            .await;

        assert!(matches!(outcome, ActionOutcome::Submitted { .. }));
    }

    #[tokio::test]
    async fn test_deploy_uses_deployment_path() {
        let client = Arc::new(CountingClient::new());
        let orch = orchestrator(Arc::new(MockProver::new()), client.clone());

        let outcome = orch
            .run_action(
                MarketAction::DeployProgram,
                SigningCredential::new("APrivateKey1test"),
                &CancelHandle::new(),
            )
            .await;

        assert!(matches!(outcome, ActionOutcome::Submitted { .. }));
        assert_eq!(client.submits.load(Ordering::SeqCst), 1);
    }
}
