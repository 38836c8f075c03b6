use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, post};
use axum::Json;
use axum::Router;
use chrono::{NaiveDate, Weekday};
use serde::Deserialize;
use uuid::Uuid;

use crate::api::rest::validate_point;
use crate::error::AppError;
use crate::models::hub::GeoPoint;
use crate::models::preference::{MatchingPreference, TravelPattern};
use crate::models::user::{Driver, User, VehicleType};
use crate::state::AppState;
use crate::store::MatchStore;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/users", post(create_user))
        .route("/users/:id", get(get_user))
        .route(
            "/users/:id/preferences",
            get(get_preferences).put(update_preferences),
        )
        .route("/users/:id/travel-patterns", post(create_travel_pattern))
        .route("/drivers", post(create_driver))
        .route("/vehicle-types", post(create_vehicle_type))
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub name: String,
    pub home_location: Option<GeoPoint>,
    pub preferred_hub_id: Option<Uuid>,
    pub preferred_vehicle_type_id: Option<Uuid>,
    pub enterprise_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct UpdatePreferencesRequest {
    pub max_walking_distance_m: Option<f64>,
    pub min_driver_rating: Option<f64>,
    pub prefer_same_enterprise: Option<bool>,
    pub prefer_same_destination: Option<bool>,
    pub prefer_recurring_rides: Option<bool>,
}

#[derive(Deserialize)]
pub struct CreateTravelPatternRequest {
    pub day_of_week: Weekday,
    pub origin_hub_id: Uuid,
    pub destination_hub_id: Option<Uuid>,
    pub destination_location: Option<GeoPoint>,
    #[serde(default)]
    pub frequency: u32,
    pub last_traveled: Option<NaiveDate>,
}

#[derive(Deserialize)]
pub struct CreateDriverRequest {
    pub name: String,
    pub rating: Option<f64>,
    pub enterprise_id: Option<Uuid>,
}

#[derive(Deserialize)]
pub struct CreateVehicleTypeRequest {
    pub name: String,
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateUserRequest>,
) -> Result<Json<User>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if let Some(home) = &payload.home_location {
        validate_point(home, "home_location")?;
    }

    let user = state.store.insert_user(User {
        id: Uuid::new_v4(),
        name: payload.name,
        home_location: payload.home_location,
        preferred_hub_id: payload.preferred_hub_id,
        preferred_vehicle_type_id: payload.preferred_vehicle_type_id,
        enterprise_id: payload.enterprise_id,
    });

    Ok(Json(user))
}

async fn get_user(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<User>, AppError> {
    let user = state
        .store
        .user(&id)?
        .ok_or_else(|| AppError::NotFound(format!("user {} not found", id)))?;

    Ok(Json(user))
}

async fn get_preferences(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchingPreference>, AppError> {
    if state.store.user(&id)?.is_none() {
        return Err(AppError::NotFound(format!("user {} not found", id)));
    }

    let preference = state
        .store
        .matching_preference(&id)?
        .unwrap_or_else(|| MatchingPreference::defaults_for(id));

    Ok(Json(preference))
}

/// Partial update: omitted fields keep their current (or default) value.
async fn update_preferences(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePreferencesRequest>,
) -> Result<Json<MatchingPreference>, AppError> {
    let mut preference = state
        .store
        .matching_preference(&id)?
        .unwrap_or_else(|| MatchingPreference::defaults_for(id));

    if let Some(distance) = payload.max_walking_distance_m {
        if !distance.is_finite() || distance <= 0.0 {
            return Err(AppError::BadRequest(
                "max_walking_distance_m must be > 0".to_string(),
            ));
        }
        preference.max_walking_distance_m = distance;
    }
    if let Some(rating) = payload.min_driver_rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(AppError::BadRequest(
                "min_driver_rating must be within 0..=5".to_string(),
            ));
        }
        preference.min_driver_rating = rating;
    }
    if let Some(flag) = payload.prefer_same_enterprise {
        preference.prefer_same_enterprise = flag;
    }
    if let Some(flag) = payload.prefer_same_destination {
        preference.prefer_same_destination = flag;
    }
    if let Some(flag) = payload.prefer_recurring_rides {
        preference.prefer_recurring_rides = flag;
    }

    Ok(Json(state.store.set_preference(preference)?))
}

async fn create_travel_pattern(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateTravelPatternRequest>,
) -> Result<Json<TravelPattern>, AppError> {
    if payload.destination_hub_id.is_none() && payload.destination_location.is_none() {
        return Err(AppError::BadRequest(
            "destination_hub_id or destination_location is required".to_string(),
        ));
    }
    if let Some(point) = &payload.destination_location {
        validate_point(point, "destination_location")?;
    }

    let pattern = state.store.add_travel_pattern(TravelPattern {
        id: Uuid::new_v4(),
        user_id: id,
        day_of_week: payload.day_of_week,
        origin_hub_id: payload.origin_hub_id,
        destination_hub_id: payload.destination_hub_id,
        destination_location: payload.destination_location,
        frequency: payload.frequency,
        last_traveled: payload.last_traveled,
    })?;

    Ok(Json(pattern))
}

async fn create_driver(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateDriverRequest>,
) -> Result<Json<Driver>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }
    if let Some(rating) = payload.rating {
        if !(0.0..=5.0).contains(&rating) {
            return Err(AppError::BadRequest(
                "rating must be within 0..=5".to_string(),
            ));
        }
    }

    let driver = state.store.insert_driver(Driver {
        id: Uuid::new_v4(),
        name: payload.name,
        rating: payload.rating,
        enterprise_id: payload.enterprise_id,
    });

    Ok(Json(driver))
}

async fn create_vehicle_type(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateVehicleTypeRequest>,
) -> Result<Json<VehicleType>, AppError> {
    if payload.name.trim().is_empty() {
        return Err(AppError::BadRequest("name cannot be empty".to_string()));
    }

    let vehicle_type = state.store.insert_vehicle_type(VehicleType {
        id: Uuid::new_v4(),
        name: payload.name,
    });

    Ok(Json(vehicle_type))
}
