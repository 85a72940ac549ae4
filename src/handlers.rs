// HTTP request handlers for the PriceProof client API

use crate::app_state::SharedState;
use crate::models::{ActionOutcome, MarketAction, MarketStatsSnapshot, SigningCredential};
use crate::submission::CancelHandle;
use axum::{extract::State, http::StatusCode, response::Json};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

// ============================================================================
// REQUEST / RESPONSE TYPES
// ============================================================================

/// Caller-supplied credential plus bet parameters. The private key is
/// accepted as a plain string and never echoed back or logged.
#[derive(Debug, Deserialize)]
pub struct PlaceBetRequest {
    pub private_key: String,
    pub amount: u64,
    pub is_bull: bool,
}

#[derive(Debug, Deserialize)]
pub struct InitializeMarketRequest {
    pub private_key: String,
    pub threshold: u64,
}

#[derive(Debug, Deserialize)]
pub struct DeployProgramRequest {
    pub private_key: String,
}

#[derive(Debug, Serialize)]
pub struct ActionResponse {
    pub success: bool,
    pub transaction_id: Option<String>,
    pub attempts: Option<u32>,
    pub error: Option<String>,
}

impl From<ActionOutcome> for ActionResponse {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::Submitted {
                transaction_id,
                attempts,
            } => Self {
                success: true,
                transaction_id: Some(transaction_id),
                attempts: Some(attempts),
                error: None,
            },
            ActionOutcome::BuildFailed { reason } => Self {
                success: false,
                transaction_id: None,
                attempts: None,
                error: Some(format!("transaction build failed: {}", reason)),
            },
            ActionOutcome::SubmissionFailed {
                attempts,
                last_error,
            } => Self {
                success: false,
                transaction_id: None,
                attempts: Some(attempts),
                error: Some(format!("submission failed: {}", last_error)),
            },
            ActionOutcome::Cancelled { attempts } => Self {
                success: false,
                transaction_id: None,
                attempts: Some(attempts),
                error: Some("submission cancelled".to_string()),
            },
        }
    }
}

// ============================================================================
// ACTION ENDPOINTS
// ============================================================================

pub async fn place_bet(
    State(state): State<SharedState>,
    Json(request): Json<PlaceBetRequest>,
) -> (StatusCode, Json<ActionResponse>) {
    run_action(
        &state,
        MarketAction::PlaceBet {
            amount: request.amount,
            is_bull: request.is_bull,
        },
        request.private_key,
    )
    .await
}

pub async fn initialize_market(
    State(state): State<SharedState>,
    Json(request): Json<InitializeMarketRequest>,
) -> (StatusCode, Json<ActionResponse>) {
    run_action(
        &state,
        MarketAction::InitializeMarket {
            threshold: request.threshold,
        },
        request.private_key,
    )
    .await
}

pub async fn deploy_program(
    State(state): State<SharedState>,
    Json(request): Json<DeployProgramRequest>,
) -> (StatusCode, Json<ActionResponse>) {
    run_action(&state, MarketAction::DeployProgram, request.private_key).await
}

async fn run_action(
    state: &SharedState,
    action: MarketAction,
    private_key: String,
) -> (StatusCode, Json<ActionResponse>) {
    let outcome = state
        .orchestrator
        .run_action(
            action,
            SigningCredential::new(private_key),
            &CancelHandle::new(),
        )
        .await;

    let status = match &outcome {
        ActionOutcome::Submitted { .. } => StatusCode::OK,
        ActionOutcome::BuildFailed { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        ActionOutcome::SubmissionFailed { .. } => StatusCode::BAD_GATEWAY,
        ActionOutcome::Cancelled { .. } => StatusCode::OK,
    };

    (status, Json(outcome.into()))
}

// ============================================================================
// STATS & HEALTH
// ============================================================================

pub async fn get_stats(State(state): State<SharedState>) -> Json<MarketStatsSnapshot> {
    Json(state.stats_rx.borrow().clone())
}

pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "priceproof-client",
    }))
}
