use std::sync::Arc;

use axum::extract::{Path, State};
use axum::routing::{get, patch, post};
use axum::Json;
use axum::Router;
use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::api::rest::validate_point;
use crate::error::AppError;
use crate::models::hub::GeoPoint;
use crate::models::ride::{Booking, Ride, RideStatus};
use crate::state::AppState;

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/rides", post(create_ride))
        .route("/rides/:id", get(get_ride))
        .route("/rides/:id/status", patch(update_ride_status))
        .route("/rides/:id/bookings", post(create_booking))
}

#[derive(Deserialize)]
pub struct CreateRideRequest {
    pub starting_hub_id: Uuid,
    pub destination_hub_id: Option<Uuid>,
    pub destination_location: Option<GeoPoint>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub capacity: u32,
    pub available_seats: Option<u32>,
    pub driver_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    pub price_per_seat: Option<f64>,
}

#[derive(Deserialize)]
pub struct UpdateStatusRequest {
    pub status: RideStatus,
}

fn one_seat() -> u32 {
    1
}

#[derive(Deserialize)]
pub struct CreateBookingRequest {
    pub user_id: Uuid,
    #[serde(default = "one_seat")]
    pub seats: u32,
}

async fn create_ride(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<CreateRideRequest>,
) -> Result<Json<Ride>, AppError> {
    if payload.destination_hub_id.is_none() && payload.destination_location.is_none() {
        return Err(AppError::BadRequest(
            "destination_hub_id or destination_location is required".to_string(),
        ));
    }
    if let Some(point) = &payload.destination_location {
        validate_point(point, "destination_location")?;
    }
    if payload
        .arrival_time
        .is_some_and(|arrival| arrival < payload.departure_time)
    {
        return Err(AppError::BadRequest(
            "arrival_time cannot be before departure_time".to_string(),
        ));
    }
    if payload.price_per_seat.is_some_and(|price| price < 0.0) {
        return Err(AppError::BadRequest(
            "price_per_seat cannot be negative".to_string(),
        ));
    }

    let ride = state.store.insert_ride(Ride {
        id: Uuid::new_v4(),
        starting_hub_id: payload.starting_hub_id,
        destination_hub_id: payload.destination_hub_id,
        destination_location: payload.destination_location,
        departure_time: payload.departure_time,
        arrival_time: payload.arrival_time,
        capacity: payload.capacity,
        available_seats: payload.available_seats.unwrap_or(payload.capacity),
        status: RideStatus::Scheduled,
        driver_id: payload.driver_id,
        vehicle_type_id: payload.vehicle_type_id,
        price_per_seat: payload.price_per_seat,
    })?;

    info!(ride_id = %ride.id, hub_id = %ride.starting_hub_id, "ride scheduled");
    Ok(Json(ride))
}

async fn get_ride(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<Ride>, AppError> {
    let ride = state
        .store
        .ride(&id)
        .ok_or_else(|| AppError::NotFound(format!("ride {} not found", id)))?;

    Ok(Json(ride))
}

async fn update_ride_status(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateStatusRequest>,
) -> Result<Json<Ride>, AppError> {
    let ride = state.store.update_ride_status(&id, payload.status)?;
    Ok(Json(ride))
}

async fn create_booking(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let booking = state.store.book_seats(&id, payload.user_id, payload.seats)?;

    info!(
        ride_id = %id,
        user_id = %payload.user_id,
        seats = payload.seats,
        "seats booked"
    );
    Ok(Json(booking))
}
