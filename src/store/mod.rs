pub mod memory;
pub mod seed;

use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::history::{MatchHistory, MatchKey};
use crate::models::hub::{GeoPoint, NearbyHub};
use crate::models::preference::{MatchingPreference, TravelPattern};
use crate::models::ride::Ride;
use crate::models::user::{Driver, User, VehicleType};

pub use memory::MemoryStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Invalid(String),

    #[error("{0}")]
    Unavailable(String),
}

/// Filter for scheduled rides with free seats. The departure window is
/// inclusive on both ends.
#[derive(Debug, Clone)]
pub struct RideQuery {
    pub destination_hub_id: Uuid,
    pub hub_ids: Vec<Uuid>,
    pub window_start: DateTime<Utc>,
    pub window_end: DateTime<Utc>,
}

impl RideQuery {
    pub fn matches(&self, ride: &Ride) -> bool {
        ride.destination_hub_id == Some(self.destination_hub_id)
            && self.hub_ids.contains(&ride.starting_hub_id)
            && ride.departure_time >= self.window_start
            && ride.departure_time <= self.window_end
            && ride.is_bookable()
    }
}

/// Persistence capabilities the matching engine reads from and writes to.
pub trait MatchStore: Send + Sync {
    fn user(&self, id: &Uuid) -> Result<Option<User>, StoreError>;

    /// Hubs within `radius_km` of `center`, nearest first.
    fn hubs_within(&self, center: &GeoPoint, radius_km: f64) -> Result<Vec<NearbyHub>, StoreError>;

    fn scheduled_rides(&self, query: &RideQuery) -> Result<Vec<Ride>, StoreError>;

    fn driver(&self, id: &Uuid) -> Result<Option<Driver>, StoreError>;

    fn vehicle_type(&self, id: &Uuid) -> Result<Option<VehicleType>, StoreError>;

    fn matching_preference(&self, user_id: &Uuid) -> Result<Option<MatchingPreference>, StoreError>;

    fn travel_patterns(&self, user_id: &Uuid) -> Result<Vec<TravelPattern>, StoreError>;

    /// Completed rides the user booked with this driver.
    fn completed_rides_with_driver(&self, user_id: &Uuid, driver_id: &Uuid)
    -> Result<u32, StoreError>;

    /// Match history rows for the pair rated 4 or better.
    fn positive_feedback_count(&self, user_id: &Uuid, driver_id: &Uuid) -> Result<u32, StoreError>;

    /// Inserts the row for `key`, or overwrites score and reason in place.
    fn upsert_match_history(
        &self,
        key: MatchKey,
        score: f64,
        reason: Option<String>,
    ) -> Result<MatchHistory, StoreError>;
}
