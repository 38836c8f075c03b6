use std::sync::Arc;

use axum::extract::State;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::validate_point;
use crate::error::AppError;
use crate::models::hub::{GeoPoint, Hub};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/hubs", post(create_hub).get(list_hubs))
}

#[derive(Deserialize)]
pub struct CreateHubRequest {
    pub name: String,
    pub location: GeoPoint,
}

async fn create_hub(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateHubRequest>,
) -> Result<Json<Hub>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    validate_point(&payload.location, "location")?;

    let hub = state.store.insert_hub(Hub {
        id: Uuid::new_v4(),
        name: payload.name,
        location: payload.location,
    });

    Ok(Json(hub))
}

async fn list_hubs(State(state): State<Arc<AppState>>) -> Json<Vec<Hub>> {
    let mut hubs = state.store.list_hubs();
    hubs.sort_by(|a, b| a.name.cmp(&b.name));
    Json(hubs)
}
