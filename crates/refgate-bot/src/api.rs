//! HTTP API: health probes and per-user referral status.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use refgate_ledger::{ReferralLedger, ReferralStore, UserId};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Build the API router.
pub fn build_router<S>(ledger: Arc<ReferralLedger<S>>) -> Router
where
    S: ReferralStore + 'static,
{
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/ready", get(ready::<S>))
        .route("/api/v1/referrals/:user_id", get(get_referrals::<S>))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(ledger)
}

// --- Health endpoints ---

async fn health() -> &'static str {
    "OK"
}

/// Ready once the store answers reads.
async fn ready<S: ReferralStore>(
    State(ledger): State<Arc<ReferralLedger<S>>>,
) -> (StatusCode, &'static str) {
    match ledger.has_record(UserId::new(0)) {
        Ok(_) => (StatusCode::OK, "OK"),
        Err(e) => {
            tracing::error!("Readiness check failed: {}", e);
            (StatusCode::SERVICE_UNAVAILABLE, "store unavailable")
        }
    }
}

// --- Referral endpoints ---

#[derive(Debug, Serialize)]
struct ReferralStatus {
    user_id: i64,
    count: usize,
    target: usize,
    rewarded: bool,
}

async fn get_referrals<S: ReferralStore>(
    State(ledger): State<Arc<ReferralLedger<S>>>,
    Path(user_id): Path<i64>,
) -> Result<Json<ReferralStatus>, StatusCode> {
    let record = ledger
        .record(UserId::new(user_id))
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(ReferralStatus {
        user_id,
        count: record.as_ref().map_or(0, |r| r.count()),
        target: ledger.target(),
        rewarded: record.is_some_and(|r| r.rewarded),
    }))
}
