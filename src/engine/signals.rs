use std::collections::HashMap;

use chrono::{DateTime, Datelike, Utc};
use uuid::Uuid;

use crate::engine::candidates::SEARCH_RADIUS_KM;
use crate::geo::haversine_km;
use crate::models::matching::MatchRequest;
use crate::models::preference::{MatchingPreference, TravelPattern};
use crate::models::ride::Ride;
use crate::models::user::{Driver, User};
use crate::store::{MatchStore, StoreError};

const PATTERN_DESTINATION_RADIUS_KM: f64 = 1.0;
const PATTERN_FREQUENT_AFTER: u32 = 5;
const PATTERN_RECENT_DAYS: i64 = 14;

/// Per-request inputs shared by every candidate.
#[derive(Debug)]
pub struct MatchContext<'a> {
    pub requester: &'a User,
    pub request: &'a MatchRequest,
    pub preference: MatchingPreference,
    pub patterns: Vec<TravelPattern>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VehicleFit {
    /// Either side has no vehicle type to compare.
    Unknown,
    Match,
    Mismatch,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PatternFit {
    pub matched: bool,
    pub frequent: bool,
    pub recent: bool,
}

/// Facts about one candidate ride. Both the scorer and the reason generator
/// derive from these, so reasons can be produced without rescoring.
#[derive(Debug, Clone)]
pub struct RideSignals {
    pub time_delta_minutes: f64,
    pub flexibility_minutes: f64,
    pub at_preferred_hub: bool,
    pub hub_distance_m: f64,
    pub max_walking_distance_m: f64,
    pub capacity: u32,
    pub available_seats: u32,
    pub vehicle_fit: VehicleFit,
    pub same_enterprise: bool,
    pub prefer_same_enterprise: bool,
    pub rides_with_driver: u32,
    pub positive_feedback: u32,
    pub pattern_fit: PatternFit,
}

pub fn collect_signals<S>(
    store: &S,
    context: &MatchContext<'_>,
    ride: &Ride,
    hub_distances_m: &HashMap<Uuid, f64>,
    driver: Option<&Driver>,
) -> Result<RideSignals, StoreError>
where
    S: MatchStore + ?Sized,
{
    let requester = context.requester;

    let (rides_with_driver, positive_feedback) = match ride.driver_id {
        Some(driver_id) => (
            store.completed_rides_with_driver(&requester.id, &driver_id)?,
            store.positive_feedback_count(&requester.id, &driver_id)?,
        ),
        None => (0, 0),
    };

    let same_enterprise = match (requester.enterprise_id, driver.and_then(|d| d.enterprise_id)) {
        (Some(mine), Some(theirs)) => mine == theirs,
        _ => false,
    };

    Ok(RideSignals {
        time_delta_minutes: minutes_between(context.request.departure_time, ride.departure_time),
        flexibility_minutes: f64::from(context.request.time_flexibility_minutes),
        at_preferred_hub: requester.preferred_hub_id == Some(ride.starting_hub_id),
        hub_distance_m: hub_distances_m
            .get(&ride.starting_hub_id)
            .copied()
            .unwrap_or(SEARCH_RADIUS_KM * 1_000.0),
        max_walking_distance_m: context.preference.max_walking_distance_m,
        capacity: ride.capacity,
        available_seats: ride.available_seats,
        vehicle_fit: vehicle_fit(requester.preferred_vehicle_type_id, ride.vehicle_type_id),
        same_enterprise,
        prefer_same_enterprise: context.preference.prefer_same_enterprise,
        rides_with_driver,
        positive_feedback,
        pattern_fit: pattern_fit(&context.patterns, ride, context.request.departure_time),
    })
}

/// Signed minutes from the requested departure to the ride's departure.
pub fn minutes_between(requested: DateTime<Utc>, departure: DateTime<Utc>) -> f64 {
    (departure - requested).num_seconds() as f64 / 60.0
}

pub fn vehicle_fit(preferred: Option<Uuid>, offered: Option<Uuid>) -> VehicleFit {
    match (preferred, offered) {
        (Some(preferred), Some(offered)) if preferred == offered => VehicleFit::Match,
        (Some(_), Some(_)) => VehicleFit::Mismatch,
        _ => VehicleFit::Unknown,
    }
}

pub fn pattern_matches_ride(pattern: &TravelPattern, ride: &Ride) -> bool {
    if pattern.day_of_week != ride.departure_time.weekday()
        || pattern.origin_hub_id != ride.starting_hub_id
    {
        return false;
    }

    let same_hub = pattern.destination_hub_id.is_some()
        && pattern.destination_hub_id == ride.destination_hub_id;

    let near_point = match (ride.destination_location, pattern.destination_location) {
        (Some(ride_point), Some(pattern_point)) => {
            haversine_km(&ride_point, &pattern_point) < PATTERN_DESTINATION_RADIUS_KM
        }
        _ => false,
    };

    same_hub || near_point
}

pub fn pattern_fit(patterns: &[TravelPattern], ride: &Ride, requested: DateTime<Utc>) -> PatternFit {
    let requested_date = requested.date_naive();

    patterns
        .iter()
        .filter(|pattern| pattern_matches_ride(pattern, ride))
        .fold(PatternFit::default(), |mut fit, pattern| {
            fit.matched = true;
            fit.frequent |= pattern.frequency > PATTERN_FREQUENT_AFTER;
            fit.recent |= pattern.last_traveled.is_some_and(|last| {
                (requested_date - last).num_days().abs() <= PATTERN_RECENT_DAYS
            });
            fit
        })
}
