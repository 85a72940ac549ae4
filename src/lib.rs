/// PriceProof client pipeline
/// Builds proved market transactions, submits them with bounded retry, and
/// aggregates on-chain bet mappings into market statistics.

pub mod app_state;
pub mod chain_client;
pub mod config;
pub mod handlers;
pub mod models;
pub mod orchestrator;
pub mod proof_worker;
pub mod prover;
pub mod routes;
pub mod stats;
pub mod submission;
pub mod value_codec;

pub use chain_client::{ChainClient, ChainError, ExplorerClient};
pub use config::PipelineConfig;
pub use models::{
    ActionOutcome, BuiltTransaction, ExecutionRequest, FeePolicy, MappingEntry, MarketAction,
    MarketSide, MarketStatsSnapshot, ProgramDescriptor, SigningCredential, SubmissionOutcome,
};
pub use orchestrator::ExecutionOrchestrator;
pub use proof_worker::ProofComputeWorker;
pub use prover::{MockProver, ProofBuildError, TransactionBuilder};
pub use stats::MarketStatsAggregator;
pub use submission::{CancelHandle, RetryPolicy, SubmissionRetrier};
