// PriceProof client pipeline - Main Entry Point

use priceproof_client::app_state::AppState;
use priceproof_client::config::PipelineConfig;
use priceproof_client::prover::MockProver;
use priceproof_client::routes::build_router;
use std::sync::Arc;
use tracing::{info, warn};

#[tokio::main]
async fn main() {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    println!("\n═══════════════════════════════════════════════");
    println!("       📈 PriceProof Client Pipeline");
    println!("═══════════════════════════════════════════════\n");

    let config = PipelineConfig::from_env();
    info!(
        program = %config.program_name,
        explorer = %config.explorer_base,
        node = %config.node_base,
        poll_secs = config.poll_interval.as_secs(),
        max_attempts = config.max_submit_attempts,
        "pipeline configuration loaded"
    );

    // No real prover is linked into this binary; transactions carry mock
    // payloads until a snarkVM-backed builder is wired in.
    warn!("using mock transaction builder, submitted payloads will be rejected by a live node");
    let builder = Arc::new(MockProver::new());

    let (state, _poller) = AppState::start(&config, builder);
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", config.bind_addr, e));

    println!("🚀 Listening on http://{}", config.bind_addr);
    println!("   POST /action/bet         place a bull/bear bet");
    println!("   POST /action/initialize  initialize the market");
    println!("   POST /action/deploy      deploy the market program");
    println!("   GET  /stats              latest market snapshot\n");

    if let Err(e) = axum::serve(listener, app).await {
        eprintln!("server error: {}", e);
    }
}
