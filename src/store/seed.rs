use std::fs;
use std::path::Path;

use serde::Deserialize;
use tracing::info;

use crate::error::AppError;
use crate::models::hub::Hub;
use crate::models::preference::{MatchingPreference, TravelPattern};
use crate::models::ride::Ride;
use crate::models::user::{Driver, User, VehicleType};
use crate::store::MemoryStore;

/// Records loaded at startup for local runs and demos.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SeedData {
    pub hubs: Vec<Hub>,
    pub users: Vec<User>,
    pub drivers: Vec<Driver>,
    pub vehicle_types: Vec<VehicleType>,
    pub rides: Vec<Ride>,
    pub preferences: Vec<MatchingPreference>,
    pub travel_patterns: Vec<TravelPattern>,
}

pub fn load_file(store: &MemoryStore, path: &Path) -> Result<(), AppError> {
    let raw = fs::read_to_string(path).map_err(|err| {
        AppError::Internal(format!("failed to read seed file {}: {err}", path.display()))
    })?;
    let data: SeedData = serde_json::from_str(&raw).map_err(|err| {
        AppError::Internal(format!("invalid seed file {}: {err}", path.display()))
    })?;

    apply(store, data)
}

/// Hubs and users go in first so rides, preferences and patterns can refer
/// to them.
pub fn apply(store: &MemoryStore, data: SeedData) -> Result<(), AppError> {
    let hubs = data.hubs.len();
    let rides = data.rides.len();

    for hub in data.hubs {
        store.insert_hub(hub);
    }
    for user in data.users {
        store.insert_user(user);
    }
    for driver in data.drivers {
        store.insert_driver(driver);
    }
    for vehicle_type in data.vehicle_types {
        store.insert_vehicle_type(vehicle_type);
    }
    for ride in data.rides {
        store.insert_ride(ride)?;
    }
    for preference in data.preferences {
        store.set_preference(preference)?;
    }
    for pattern in data.travel_patterns {
        store.add_travel_pattern(pattern)?;
    }

    info!(hubs, rides, "seed data loaded");
    Ok(())
}

#[cfg(test)]
mod tests {
    use serde_json::json;
    use uuid::Uuid;

    use super::{apply, SeedData};
    use crate::store::MemoryStore;

    #[test]
    fn seeds_hubs_users_and_rides() {
        let hub_id = Uuid::new_v4();
        let user_id = Uuid::new_v4();
        let raw = json!({
            "hubs": [{ "id": hub_id, "name": "Central", "location": { "lat": 52.52, "lng": 13.405 } }],
            "users": [{
                "id": user_id,
                "name": "Ada",
                "home_location": { "lat": 52.521, "lng": 13.405 },
                "preferred_hub_id": hub_id,
                "preferred_vehicle_type_id": null,
                "enterprise_id": null
            }],
            "rides": [{
                "id": Uuid::new_v4(),
                "starting_hub_id": hub_id,
                "destination_hub_id": Uuid::new_v4(),
                "destination_location": null,
                "departure_time": "2026-03-02T08:00:00Z",
                "arrival_time": null,
                "capacity": 4,
                "available_seats": 2,
                "status": "Scheduled",
                "driver_id": null,
                "vehicle_type_id": null,
                "price_per_seat": 3.5
            }]
        });

        let data: SeedData = serde_json::from_value(raw).unwrap();
        let store = MemoryStore::new();
        apply(&store, data).unwrap();

        assert_eq!(store.hub_count(), 1);
        assert_eq!(store.ride_count(), 1);
    }

    #[test]
    fn rejects_preferences_for_unknown_users() {
        let raw = json!({
            "preferences": [{
                "user_id": Uuid::new_v4(),
                "max_walking_distance_m": 800.0,
                "min_driver_rating": 4.0,
                "prefer_same_enterprise": true,
                "prefer_same_destination": false,
                "prefer_recurring_rides": true
            }]
        });

        let data: SeedData = serde_json::from_value(raw).unwrap();
        assert!(apply(&MemoryStore::new(), data).is_err());
    }
}
