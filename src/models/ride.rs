use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::hub::GeoPoint;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum RideStatus {
    Scheduled,
    InProgress,
    Completed,
    Cancelled,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Ride {
    pub id: Uuid,
    pub starting_hub_id: Uuid,
    pub destination_hub_id: Option<Uuid>,
    pub destination_location: Option<GeoPoint>,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub capacity: u32,
    pub available_seats: u32,
    pub status: RideStatus,
    pub driver_id: Option<Uuid>,
    pub vehicle_type_id: Option<Uuid>,
    pub price_per_seat: Option<f64>,
}

impl Ride {
    pub fn is_bookable(&self) -> bool {
        self.status == RideStatus::Scheduled && self.available_seats > 0
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Booking {
    pub id: Uuid,
    pub ride_id: Uuid,
    pub user_id: Uuid,
    pub seats: u32,
    pub created_at: DateTime<Utc>,
}

impl RideStatus {
    pub fn can_transition_to(self, next: RideStatus) -> bool {
        matches!(
            (self, next),
            (RideStatus::Scheduled, RideStatus::InProgress)
                | (RideStatus::Scheduled, RideStatus::Completed)
                | (RideStatus::Scheduled, RideStatus::Cancelled)
                | (RideStatus::InProgress, RideStatus::Completed)
                | (RideStatus::InProgress, RideStatus::Cancelled)
        )
    }
}
