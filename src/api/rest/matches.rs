use std::sync::Arc;
use std::time::Instant;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use serde::Deserialize;
use tracing::error;
use uuid::Uuid;

use crate::engine::find_matches;
use crate::error::AppError;
use crate::models::history::MatchHistory;
use crate::models::matching::{MatchRequest, RideMatch};
use crate::state::AppState;
use crate::store::MatchStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/matches", post(create_matches))
        .route("/users/:id/match-history", get(list_match_history))
        .route("/match-history/:id/accept", post(accept_match))
        .route("/match-history/:id/feedback", post(leave_feedback))
}

fn accepted_by_default() -> bool {
    true
}

#[derive(Deserialize)]
pub struct AcceptMatchRequest {
    #[serde(default = "accepted_by_default")]
    pub accepted: bool,
}

#[derive(Deserialize)]
pub struct FeedbackRequest {
    pub rating: u8,
    pub comment: Option<String>,
}

async fn create_matches(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<MatchRequest>,
) -> Result<Json<Vec<RideMatch>>, AppError> {
    let start = Instant::now();
    let result = find_matches(state.store.as_ref(), &payload);
    let elapsed = start.elapsed().as_secs_f64();

    match result {
        Ok(outcome) => {
            let label = if outcome.matches.is_empty() {
                "empty"
            } else {
                "success"
            };
            state
                .metrics
                .match_latency_seconds
                .with_label_values(&[label])
                .observe(elapsed);
            state
                .metrics
                .match_requests_total
                .with_label_values(&[label])
                .inc();
            state
                .metrics
                .match_candidates_scored_total
                .inc_by(outcome.candidates_scored as u64);
            state
                .metrics
                .match_history_write_failures_total
                .inc_by(outcome.history_failures as u64);
            state
                .metrics
                .matches_returned
                .observe(outcome.matches.len() as f64);

            Ok(Json(outcome.matches))
        }
        Err(err) => {
            state
                .metrics
                .match_latency_seconds
                .with_label_values(&["error"])
                .observe(elapsed);
            state
                .metrics
                .match_requests_total
                .with_label_values(&["error"])
                .inc();
            error!(error = %err, requester_id = %payload.requester_id, "match request failed");
            Err(err)
        }
    }
}

async fn list_match_history(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Vec<MatchHistory>>, AppError> {
    if state.store.user(&id)?.is_none() {
        return Err(AppError::NotFound(format!("user {} not found", id)));
    }

    Ok(Json(state.store.history_for_user(&id)))
}

async fn accept_match(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<AcceptMatchRequest>,
) -> Result<Json<MatchHistory>, AppError> {
    let row = state.store.accept_match(&id, payload.accepted)?;
    Ok(Json(row))
}

async fn leave_feedback(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<FeedbackRequest>,
) -> Result<Json<MatchHistory>, AppError> {
    let row = state
        .store
        .record_feedback(&id, payload.rating, payload.comment)?;
    Ok(Json(row))
}
