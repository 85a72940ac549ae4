// End-to-end tests for the PriceProof client pipeline: full wiring from
// the HTTP surface down to fake chain/prover collaborators.

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use priceproof_client::app_state::AppState;
use priceproof_client::chain_client::{ChainClient, ChainError};
use priceproof_client::config::PipelineConfig;
use priceproof_client::models::{BuiltTransaction, MappingEntry};
use priceproof_client::prover::MockProver;
use priceproof_client::routes::build_router;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

// ============================================================================
// FAKE CHAIN CLIENT
// ============================================================================

/// Serves fixed mapping data and accepts submissions after a configurable
/// number of transient failures.
struct FakeChain {
    bull: Vec<MappingEntry>,
    bear: Vec<MappingEntry>,
    submit_failures: u32,
    submit_calls: AtomicU32,
}

impl FakeChain {
    fn new(submit_failures: u32) -> Self {
        Self {
            bull: vec![
                entry("aleo1alice", "10u64"),
                entry("aleo1bob", "20u64"),
            ],
            bear: vec![entry("aleo1carol", "5u64")],
            submit_failures,
            submit_calls: AtomicU32::new(0),
        }
    }
}

fn entry(key: &str, value: &str) -> MappingEntry {
    MappingEntry {
        key: key.to_string(),
        value: value.to_string(),
    }
}

#[async_trait]
impl ChainClient for FakeChain {
    async fn fetch_mapping_entries(
        &self,
        _program_id: &str,
        mapping: &str,
    ) -> Result<Vec<MappingEntry>, ChainError> {
        match mapping {
            "bull_bets" => Ok(self.bull.clone()),
            "bear_bets" => Ok(self.bear.clone()),
            other => Err(ChainError::MappingAbsent {
                program_id: "price_proof_test_11.aleo".to_string(),
                mapping: other.to_string(),
            }),
        }
    }

    async fn submit_transaction(&self, _tx: &BuiltTransaction) -> Result<String, ChainError> {
        let n = self.submit_calls.fetch_add(1, Ordering::SeqCst);
        if n < self.submit_failures {
            Err(ChainError::RequestFailed("node busy".to_string()))
        } else {
            Ok(format!("at1confirmed{}", n))
        }
    }
}

fn test_config() -> PipelineConfig {
    PipelineConfig {
        poll_interval: Duration::from_millis(20),
        max_submit_attempts: 10,
        submit_backoff: Duration::ZERO,
        ..PipelineConfig::default()
    }
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .expect("failed to read body");
    serde_json::from_slice(&bytes).expect("body is not JSON")
}

// ============================================================================
// TESTS
// ============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let chain = Arc::new(FakeChain::new(0));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain);
    let app = build_router(state);

    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn test_stats_reflect_on_chain_mappings() {
    let chain = Arc::new(FakeChain::new(0));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain);

    // Wait for the first real poll tick to land
    let mut rx = state.stats_rx.clone();
    rx.changed().await.unwrap();

    let app = build_router(state);
    let response = app
        .oneshot(Request::get("/stats").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["bull"]["unique_participants"], 2);
    assert_eq!(body["bull"]["volume"], 30);
    assert_eq!(body["bear"]["unique_participants"], 1);
    assert_eq!(body["bear"]["volume"], 5);
    assert_eq!(body["warnings"].as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_place_bet_end_to_end_with_transient_failures() {
    // First two broadcasts fail; the retrier should push through
    let chain = Arc::new(FakeChain::new(2));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain.clone());
    let app = build_router(state);

    let request = Request::post("/action/bet")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "private_key": "APrivateKey1zkptest",
                "amount": 10,
                "is_bull": true,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["attempts"], 3);
    assert!(body["transaction_id"].as_str().unwrap().starts_with("at1confirmed"));
    assert_eq!(chain.submit_calls.load(Ordering::SeqCst), 3);
    // The credential must never round-trip through the response
    assert!(!body.to_string().contains("APrivateKey1zkptest"));
}

#[tokio::test]
async fn test_initialize_market_endpoint() {
    let chain = Arc::new(FakeChain::new(0));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain);
    let app = build_router(state);

    let request = Request::post("/action/initialize")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "private_key": "APrivateKey1zkptest",
                "threshold": 2500,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["attempts"], 1);
}

#[tokio::test]
async fn test_build_failure_surfaces_without_submission() {
    let chain = Arc::new(FakeChain::new(0));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain.clone());
    let app = build_router(state);

    // Empty credential makes the mock prover fail record resolution
    let request = Request::post("/action/bet")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "private_key": "",
                "amount": 10,
                "is_bull": false,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert!(body["error"]
        .as_str()
        .unwrap()
        .contains("transaction build failed"));
    // Build failed, so nothing was ever broadcast
    assert_eq!(chain.submit_calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_submission_exhaustion_reports_last_error() {
    // Node never accepts; the 10-attempt ceiling applies
    let chain = Arc::new(FakeChain::new(u32::MAX));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain.clone());
    let app = build_router(state);

    let request = Request::post("/action/bet")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({
                "private_key": "APrivateKey1zkptest",
                "amount": 10,
                "is_bull": true,
            })
            .to_string(),
        ))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["attempts"], 10);
    assert!(body["error"].as_str().unwrap().contains("node busy"));
    assert_eq!(chain.submit_calls.load(Ordering::SeqCst), 10);
}

#[tokio::test]
async fn test_deploy_without_program_source_fails_at_build() {
    let chain = Arc::new(FakeChain::new(0));
    let (state, _poller) =
        AppState::start_with_client(&test_config(), Arc::new(MockProver::new()), chain.clone());
    let app = build_router(state);

    let request = Request::post("/action/deploy")
        .header("Content-Type", "application/json")
        .body(Body::from(
            json!({ "private_key": "APrivateKey1zkptest" }).to_string(),
        ))
        .unwrap();

    // No PROGRAM_SOURCE_PATH configured, so the descriptor has no source
    // and the builder refuses the deployment before anything is broadcast.
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(chain.submit_calls.load(Ordering::SeqCst), 0);
}
