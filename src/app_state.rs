// Application state for the HTTP boundary

use crate::chain_client::{ChainClient, ExplorerClient};
use crate::config::PipelineConfig;
use crate::models::MarketStatsSnapshot;
use crate::orchestrator::ExecutionOrchestrator;
use crate::proof_worker::ProofComputeWorker;
use crate::prover::TransactionBuilder;
use crate::stats::MarketStatsAggregator;
use crate::submission::{RetryPolicy, SubmissionRetrier};

use std::sync::Arc;
use tokio::sync::watch;

/// Shared handle for axum handlers. The orchestrator is stateless per call,
/// so plain `Arc` sharing is enough; no interior locking.
pub type SharedState = Arc<AppState>;

pub struct AppState {
    pub orchestrator: ExecutionOrchestrator,
    /// Latest market snapshot, replaced wholesale every poll tick
    pub stats_rx: watch::Receiver<MarketStatsSnapshot>,
}

impl AppState {
    /// Wire the full pipeline: chain client, proof worker, retrier,
    /// orchestrator, and the background stats poller.
    pub fn start(
        config: &PipelineConfig,
        builder: Arc<dyn TransactionBuilder>,
    ) -> (SharedState, tokio::task::JoinHandle<()>) {
        let client: Arc<dyn ChainClient> = Arc::new(ExplorerClient::new(
            config.explorer_base.clone(),
            config.node_base.clone(),
        ));
        Self::start_with_client(config, builder, client)
    }

    /// Same wiring with an injected chain client; tests use this to run the
    /// whole surface against fakes.
    pub fn start_with_client(
        config: &PipelineConfig,
        builder: Arc<dyn TransactionBuilder>,
        client: Arc<dyn ChainClient>,
    ) -> (SharedState, tokio::task::JoinHandle<()>) {
        let orchestrator = ExecutionOrchestrator::new(
            config.load_program(),
            config.execution_fee,
            config.deployment_fee,
            ProofComputeWorker::new(builder),
            SubmissionRetrier::new(RetryPolicy {
                max_attempts: config.max_submit_attempts,
                initial_backoff: config.submit_backoff,
                ..Default::default()
            }),
            Arc::clone(&client),
        );

        let aggregator = Arc::new(MarketStatsAggregator::new(
            config.program_name.clone(),
            client,
            config.poll_interval,
        ));
        let (stats_rx, poller) = aggregator.start();

        let state = Arc::new(AppState {
            orchestrator,
            stats_rx,
        });

        (state, poller)
    }
}
