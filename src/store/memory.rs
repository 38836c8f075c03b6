use std::collections::HashSet;

use chrono::Utc;
use dashmap::DashMap;
use tracing::debug;
use uuid::Uuid;

use crate::geo::{bounding_box, haversine_km};
use crate::models::history::{MatchHistory, MatchKey};
use crate::models::hub::{GeoPoint, Hub, NearbyHub};
use crate::models::preference::{MatchingPreference, TravelPattern};
use crate::models::ride::{Booking, Ride, RideStatus};
use crate::models::user::{Driver, User, VehicleType};
use crate::store::{MatchStore, RideQuery, StoreError};

const POSITIVE_FEEDBACK_RATING: u8 = 4;

/// In-process store backed by concurrent maps. Match history is keyed by
/// [`MatchKey`] so the map entry lock serializes writers of the same triple;
/// `history_ids` resolves a row id back to its key.
#[derive(Default)]
pub struct MemoryStore {
    users: DashMap<Uuid, User>,
    drivers: DashMap<Uuid, Driver>,
    vehicle_types: DashMap<Uuid, VehicleType>,
    hubs: DashMap<Uuid, Hub>,
    rides: DashMap<Uuid, Ride>,
    bookings: DashMap<Uuid, Booking>,
    preferences: DashMap<Uuid, MatchingPreference>,
    travel_patterns: DashMap<Uuid, TravelPattern>,
    match_history: DashMap<MatchKey, MatchHistory>,
    history_ids: DashMap<Uuid, MatchKey>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert_hub(&self, hub: Hub) -> Hub {
        self.hubs.insert(hub.id, hub.clone());
        hub
    }

    pub fn list_hubs(&self) -> Vec<Hub> {
        self.hubs.iter().map(|entry| entry.value().clone()).collect()
    }

    pub fn hub(&self, id: &Uuid) -> Option<Hub> {
        self.hubs.get(id).map(|entry| entry.value().clone())
    }

    pub fn insert_user(&self, user: User) -> User {
        self.users.insert(user.id, user.clone());
        user
    }

    pub fn insert_driver(&self, driver: Driver) -> Driver {
        self.drivers.insert(driver.id, driver.clone());
        driver
    }

    pub fn insert_vehicle_type(&self, vehicle_type: VehicleType) -> VehicleType {
        self.vehicle_types
            .insert(vehicle_type.id, vehicle_type.clone());
        vehicle_type
    }

    pub fn insert_ride(&self, ride: Ride) -> Result<Ride, StoreError> {
        if ride.capacity == 0 {
            return Err(StoreError::Invalid("capacity must be > 0".to_string()));
        }
        if ride.available_seats > ride.capacity {
            return Err(StoreError::Invalid(
                "available_seats cannot exceed capacity".to_string(),
            ));
        }
        if !self.hubs.contains_key(&ride.starting_hub_id) {
            return Err(StoreError::NotFound(format!(
                "hub {} not found",
                ride.starting_hub_id
            )));
        }

        self.rides.insert(ride.id, ride.clone());
        Ok(ride)
    }

    pub fn ride(&self, id: &Uuid) -> Option<Ride> {
        self.rides.get(id).map(|entry| entry.value().clone())
    }

    pub fn update_ride_status(&self, id: &Uuid, status: RideStatus) -> Result<Ride, StoreError> {
        let mut ride = self
            .rides
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound(format!("ride {id} not found")))?;

        if ride.status != status && !ride.status.can_transition_to(status) {
            return Err(StoreError::Conflict(format!(
                "ride {id} cannot move from {:?} to {status:?}",
                ride.status
            )));
        }

        ride.status = status;
        Ok(ride.clone())
    }

    /// Reserves seats on a scheduled ride for a user.
    pub fn book_seats(&self, ride_id: &Uuid, user_id: Uuid, seats: u32) -> Result<Booking, StoreError> {
        if seats == 0 {
            return Err(StoreError::Invalid("seats must be > 0".to_string()));
        }
        if !self.users.contains_key(&user_id) {
            return Err(StoreError::NotFound(format!("user {user_id} not found")));
        }

        let mut ride = self
            .rides
            .get_mut(ride_id)
            .ok_or_else(|| StoreError::NotFound(format!("ride {ride_id} not found")))?;

        if ride.status != RideStatus::Scheduled {
            return Err(StoreError::Conflict(format!(
                "ride {ride_id} is not scheduled"
            )));
        }
        if seats > ride.available_seats {
            return Err(StoreError::Conflict(format!(
                "ride {ride_id} has only {} seats left",
                ride.available_seats
            )));
        }

        ride.available_seats -= seats;

        let booking = Booking {
            id: Uuid::new_v4(),
            ride_id: *ride_id,
            user_id,
            seats,
            created_at: Utc::now(),
        };
        self.bookings.insert(booking.id, booking.clone());

        Ok(booking)
    }

    pub fn set_preference(&self, preference: MatchingPreference) -> Result<MatchingPreference, StoreError> {
        if !self.users.contains_key(&preference.user_id) {
            return Err(StoreError::NotFound(format!(
                "user {} not found",
                preference.user_id
            )));
        }

        self.preferences
            .insert(preference.user_id, preference.clone());
        Ok(preference)
    }

    pub fn add_travel_pattern(&self, pattern: TravelPattern) -> Result<TravelPattern, StoreError> {
        if !self.users.contains_key(&pattern.user_id) {
            return Err(StoreError::NotFound(format!(
                "user {} not found",
                pattern.user_id
            )));
        }

        self.travel_patterns.insert(pattern.id, pattern.clone());
        Ok(pattern)
    }

    pub fn history_for_user(&self, user_id: &Uuid) -> Vec<MatchHistory> {
        let mut rows: Vec<MatchHistory> = self
            .match_history
            .iter()
            .filter(|entry| entry.value().requester_id == *user_id)
            .map(|entry| entry.value().clone())
            .collect();
        rows.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        rows
    }

    pub fn accept_match(&self, history_id: &Uuid, accepted: bool) -> Result<MatchHistory, StoreError> {
        self.update_history(history_id, |row| row.was_accepted = Some(accepted))
    }

    pub fn record_feedback(
        &self,
        history_id: &Uuid,
        rating: u8,
        comment: Option<String>,
    ) -> Result<MatchHistory, StoreError> {
        if !(1..=5).contains(&rating) {
            return Err(StoreError::Invalid("rating must be within 1..=5".to_string()));
        }

        self.update_history(history_id, |row| {
            row.feedback_rating = Some(rating);
            row.feedback_comment = comment;
        })
    }

    pub fn hub_count(&self) -> usize {
        self.hubs.len()
    }

    pub fn ride_count(&self) -> usize {
        self.rides.len()
    }

    pub fn match_history_count(&self) -> usize {
        self.match_history.len()
    }

    fn update_history<F>(&self, history_id: &Uuid, apply: F) -> Result<MatchHistory, StoreError>
    where
        F: FnOnce(&mut MatchHistory),
    {
        let not_found = || StoreError::NotFound(format!("match history {history_id} not found"));

        // copy the key out so the index guard is released before the row lock
        let key = *self.history_ids.get(history_id).ok_or_else(not_found)?;
        let mut row = self.match_history.get_mut(&key).ok_or_else(not_found)?;

        apply(row.value_mut());
        row.updated_at = Utc::now();
        Ok(row.value().clone())
    }
}

impl MatchStore for MemoryStore {
    fn user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
        Ok(self.users.get(id).map(|entry| entry.value().clone()))
    }

    fn hubs_within(&self, center: &GeoPoint, radius_km: f64) -> Result<Vec<NearbyHub>, StoreError> {
        let bbox = bounding_box(center, radius_km);

        let mut nearby: Vec<NearbyHub> = self
            .hubs
            .iter()
            .filter(|entry| bbox.contains(&entry.value().location))
            .filter_map(|entry| {
                let hub = entry.value();
                let distance_km = haversine_km(center, &hub.location);
                (distance_km <= radius_km).then(|| NearbyHub {
                    hub: hub.clone(),
                    distance_km,
                })
            })
            .collect();

        nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
        Ok(nearby)
    }

    fn scheduled_rides(&self, query: &RideQuery) -> Result<Vec<Ride>, StoreError> {
        let mut rides: Vec<Ride> = self
            .rides
            .iter()
            .filter(|entry| query.matches(entry.value()))
            .map(|entry| entry.value().clone())
            .collect();

        rides.sort_by(|a, b| a.departure_time.cmp(&b.departure_time));
        debug!(count = rides.len(), "scheduled rides selected");
        Ok(rides)
    }

    fn driver(&self, id: &Uuid) -> Result<Option<Driver>, StoreError> {
        Ok(self.drivers.get(id).map(|entry| entry.value().clone()))
    }

    fn vehicle_type(&self, id: &Uuid) -> Result<Option<VehicleType>, StoreError> {
        Ok(self.vehicle_types.get(id).map(|entry| entry.value().clone()))
    }

    fn matching_preference(&self, user_id: &Uuid) -> Result<Option<MatchingPreference>, StoreError> {
        Ok(self.preferences.get(user_id).map(|entry| entry.value().clone()))
    }

    fn travel_patterns(&self, user_id: &Uuid) -> Result<Vec<TravelPattern>, StoreError> {
        Ok(self
            .travel_patterns
            .iter()
            .filter(|entry| entry.value().user_id == *user_id)
            .map(|entry| entry.value().clone())
            .collect())
    }

    fn completed_rides_with_driver(
        &self,
        user_id: &Uuid,
        driver_id: &Uuid,
    ) -> Result<u32, StoreError> {
        let ride_ids: HashSet<Uuid> = self
            .bookings
            .iter()
            .filter(|entry| entry.value().user_id == *user_id)
            .map(|entry| entry.value().ride_id)
            .collect();

        let count = ride_ids
            .iter()
            .filter(|ride_id| {
                self.rides.get(*ride_id).is_some_and(|ride| {
                    ride.driver_id == Some(*driver_id) && ride.status == RideStatus::Completed
                })
            })
            .count();

        Ok(count as u32)
    }

    fn positive_feedback_count(&self, user_id: &Uuid, driver_id: &Uuid) -> Result<u32, StoreError> {
        let count = self
            .match_history
            .iter()
            .filter(|entry| {
                let row = entry.value();
                row.requester_id == *user_id
                    && row.driver_id == *driver_id
                    && row
                        .feedback_rating
                        .is_some_and(|rating| rating >= POSITIVE_FEEDBACK_RATING)
            })
            .count();

        Ok(count as u32)
    }

    fn upsert_match_history(
        &self,
        key: MatchKey,
        score: f64,
        reason: Option<String>,
    ) -> Result<MatchHistory, StoreError> {
        let now = Utc::now();

        let entry = self
            .match_history
            .entry(key)
            .and_modify(|row| {
                row.score = score;
                row.reason = reason.clone();
                row.updated_at = now;
            })
            .or_insert_with(|| MatchHistory {
                id: Uuid::new_v4(),
                requester_id: key.requester_id,
                driver_id: key.driver_id,
                ride_id: key.ride_id,
                score,
                reason: reason.clone(),
                was_accepted: None,
                feedback_rating: None,
                feedback_comment: None,
                created_at: now,
                updated_at: now,
            });

        let row = entry.value().clone();
        drop(entry);
        self.history_ids.entry(row.id).or_insert(key);
        Ok(row)
    }
}
