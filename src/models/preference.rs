use chrono::{NaiveDate, Weekday};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::hub::GeoPoint;

pub const DEFAULT_MAX_WALKING_DISTANCE_M: f64 = 1_000.0;

/// Soft constraints a user has set for matching. Absent rows fall back to
/// [`MatchingPreference::defaults_for`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchingPreference {
    pub user_id: Uuid,
    pub max_walking_distance_m: f64,
    pub min_driver_rating: f64,
    pub prefer_same_enterprise: bool,
    pub prefer_same_destination: bool,
    pub prefer_recurring_rides: bool,
}

impl MatchingPreference {
    pub fn defaults_for(user_id: Uuid) -> Self {
        Self {
            user_id,
            max_walking_distance_m: DEFAULT_MAX_WALKING_DISTANCE_M,
            min_driver_rating: 0.0,
            prefer_same_enterprise: true,
            prefer_same_destination: true,
            prefer_recurring_rides: true,
        }
    }
}

/// A habitual trip a user makes on a given weekday.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TravelPattern {
    pub id: Uuid,
    pub user_id: Uuid,
    pub day_of_week: Weekday,
    pub origin_hub_id: Uuid,
    pub destination_hub_id: Option<Uuid>,
    pub destination_location: Option<GeoPoint>,
    pub frequency: u32,
    pub last_traveled: Option<NaiveDate>,
}
