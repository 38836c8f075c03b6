use tracing::{debug, info};

use crate::engine::candidates::select_candidates;
use crate::engine::history::{record_match, HistoryWrite};
use crate::engine::reasons::{generate_reasons, top_reasons};
use crate::engine::scoring::{score_ride, RideScore, MIN_MATCH_SCORE};
use crate::engine::signals::{collect_signals, MatchContext};
use crate::error::AppError;
use crate::models::matching::{MatchRequest, RideMatch};
use crate::models::preference::MatchingPreference;
use crate::models::ride::Ride;
use crate::models::user::Driver;
use crate::store::MatchStore;

#[derive(Debug, Default)]
pub struct MatchOutcome {
    pub matches: Vec<RideMatch>,
    pub candidates_scored: usize,
    pub history_failures: usize,
}

struct ScoredRide<'a> {
    ride: &'a Ride,
    driver: Option<Driver>,
    score: RideScore,
    reasons: Vec<String>,
}

/// Ranks scheduled rides for a requester, best first.
///
/// A missing requester, a requester without a home location, no nearby hubs
/// and no rides in the window all produce an empty result. Every scored
/// candidate with a driver gets a match history write, including those later
/// dropped by the score threshold.
pub fn find_matches<S>(store: &S, request: &MatchRequest) -> Result<MatchOutcome, AppError>
where
    S: MatchStore + ?Sized,
{
    request.validate()?;

    let Some(requester) = store.user(&request.requester_id)? else {
        info!(requester_id = %request.requester_id, "unknown requester; no matches");
        return Ok(MatchOutcome::default());
    };

    let candidates = select_candidates(store, &requester, request)?;
    if candidates.is_empty() {
        return Ok(MatchOutcome::default());
    }

    let preference = store
        .matching_preference(&requester.id)?
        .unwrap_or_else(|| MatchingPreference::defaults_for(requester.id));
    let context = MatchContext {
        requester: &requester,
        request,
        preference,
        patterns: store.travel_patterns(&requester.id)?,
    };

    let mut outcome = MatchOutcome::default();
    let mut kept = Vec::with_capacity(candidates.rides.len());

    for ride in &candidates.rides {
        let driver = match ride.driver_id {
            Some(driver_id) => store.driver(&driver_id)?,
            None => None,
        };

        let signals = collect_signals(
            store,
            &context,
            ride,
            &candidates.hub_distances_m,
            driver.as_ref(),
        )?;
        let score = score_ride(&signals);
        let reasons = generate_reasons(&signals, score.overall);
        outcome.candidates_scored += 1;

        let write = record_match(store, requester.id, ride, score.overall, reasons.first().cloned());
        if write == HistoryWrite::Failed {
            outcome.history_failures += 1;
        }

        if score.overall <= MIN_MATCH_SCORE {
            debug!(ride_id = %ride.id, score = score.overall, "candidate below threshold");
            continue;
        }

        kept.push(ScoredRide {
            ride,
            driver,
            score,
            reasons,
        });
    }

    kept.sort_by(|a, b| b.score.overall.total_cmp(&a.score.overall));
    kept.truncate(request.max_results);

    for scored in kept {
        let vehicle_type = match scored.ride.vehicle_type_id {
            Some(id) => store.vehicle_type(&id)?.map(|vehicle| vehicle.name),
            None => None,
        };
        let hub_name = candidates
            .hubs
            .get(&scored.ride.starting_hub_id)
            .map(|hub| hub.name.clone())
            .unwrap_or_default();

        outcome.matches.push(RideMatch {
            ride_id: scored.ride.id,
            departure_time: scored.ride.departure_time,
            arrival_time: scored.ride.arrival_time,
            hub_id: scored.ride.starting_hub_id,
            hub_name,
            vehicle_type,
            available_seats: scored.ride.available_seats,
            total_capacity: scored.ride.capacity,
            overall_score: scored.score.overall,
            match_reasons: top_reasons(scored.reasons),
            driver_name: scored.driver.as_ref().map(|driver| driver.name.clone()),
            driver_rating: scored.driver.as_ref().and_then(|driver| driver.rating),
            estimated_price: scored.ride.price_per_seat,
            score_breakdown: scored.score.breakdown,
        });
    }

    info!(
        requester_id = %requester.id,
        candidates = outcome.candidates_scored,
        matches = outcome.matches.len(),
        "matches ranked"
    );

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc, Weekday};
    use uuid::Uuid;

    use super::find_matches;
    use crate::models::history::{MatchHistory, MatchKey};
    use crate::models::hub::{GeoPoint, Hub, NearbyHub};
    use crate::models::matching::MatchRequest;
    use crate::models::preference::{MatchingPreference, TravelPattern};
    use crate::models::ride::{Ride, RideStatus};
    use crate::models::user::{Driver, User, VehicleType};
    use crate::store::{MatchStore, MemoryStore, RideQuery, StoreError};

    struct World {
        store: MemoryStore,
        requester: User,
        hub: Hub,
        destination: Uuid,
        driver: Driver,
    }

    fn requested_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 8, 0, 0).unwrap()
    }

    fn world() -> World {
        let store = MemoryStore::new();
        let hub = store.insert_hub(Hub {
            id: Uuid::new_v4(),
            name: "Central Station".to_string(),
            location: GeoPoint {
                lat: 52.5251,
                lng: 13.3694,
            },
        });
        let destination = store.insert_hub(Hub {
            id: Uuid::new_v4(),
            name: "Tech Park".to_string(),
            location: GeoPoint {
                lat: 52.4300,
                lng: 13.5300,
            },
        });
        let requester = store.insert_user(User {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            home_location: Some(GeoPoint {
                lat: 52.5255,
                lng: 13.3694,
            }),
            preferred_hub_id: Some(hub.id),
            preferred_vehicle_type_id: None,
            enterprise_id: None,
        });
        let driver = store.insert_driver(Driver {
            id: Uuid::new_v4(),
            name: "Grace".to_string(),
            rating: Some(4.9),
            enterprise_id: None,
        });

        World {
            store,
            requester,
            hub,
            destination: destination.id,
            driver,
        }
    }

    fn ride(w: &World, offset_minutes: i64, available_seats: u32) -> Ride {
        w.store
            .insert_ride(Ride {
                id: Uuid::new_v4(),
                starting_hub_id: w.hub.id,
                destination_hub_id: Some(w.destination),
                destination_location: None,
                departure_time: requested_time() + Duration::minutes(offset_minutes),
                arrival_time: Some(requested_time() + Duration::minutes(offset_minutes + 40)),
                capacity: 4,
                available_seats,
                status: RideStatus::Scheduled,
                driver_id: Some(w.driver.id),
                vehicle_type_id: None,
                price_per_seat: Some(4.5),
            })
            .unwrap()
    }

    fn request(w: &World, flexibility: u32) -> MatchRequest {
        MatchRequest {
            requester_id: w.requester.id,
            destination_hub_id: w.destination,
            departure_time: requested_time(),
            time_flexibility_minutes: flexibility,
            max_results: 10,
        }
    }

    #[test]
    fn perfect_ride_scores_above_ninety() {
        let w = world();
        let enterprise = Uuid::new_v4();
        let sedan = w.store.insert_vehicle_type(VehicleType {
            id: Uuid::new_v4(),
            name: "Sedan".to_string(),
        });

        let mut requester = w.requester.clone();
        requester.enterprise_id = Some(enterprise);
        requester.preferred_vehicle_type_id = Some(sedan.id);
        w.store.insert_user(requester);
        let mut driver = w.driver.clone();
        driver.enterprise_id = Some(enterprise);
        w.store.insert_driver(driver);

        w.store
            .add_travel_pattern(TravelPattern {
                id: Uuid::new_v4(),
                user_id: w.requester.id,
                day_of_week: Weekday::Mon,
                origin_hub_id: w.hub.id,
                destination_hub_id: Some(w.destination),
                destination_location: None,
                frequency: 12,
                last_traveled: NaiveDate::from_ymd_opt(2026, 2, 23),
            })
            .unwrap();

        for _ in 0..3 {
            let past = ride(&w, -7 * 24 * 60, 3);
            w.store.book_seats(&past.id, w.requester.id, 1).unwrap();
            w.store
                .update_ride_status(&past.id, RideStatus::Completed)
                .unwrap();
        }

        let mut perfect = ride(&w, 0, 2);
        perfect.vehicle_type_id = Some(sedan.id);
        let perfect = w.store.insert_ride(perfect).unwrap();

        let outcome = find_matches(&w.store, &request(&w, 30)).unwrap();
        assert_eq!(outcome.matches.len(), 1);

        let top = &outcome.matches[0];
        assert_eq!(top.ride_id, perfect.id);
        assert!(top.overall_score >= 90.0, "score was {}", top.overall_score);
        assert_eq!(top.score_breakdown.time_score, 100.0);
        assert_eq!(top.score_breakdown.proximity_score, 100.0);
        assert_eq!(top.score_breakdown.occupancy_score, 100.0);
        assert!(top.match_reasons.contains(&"Exact time match".to_string()));
        assert!(top.match_reasons.contains(&"Preferred starting hub".to_string()));
        assert!(top.match_reasons.len() <= 3);
        assert_eq!(top.hub_name, "Central Station");
        assert_eq!(top.vehicle_type.as_deref(), Some("Sedan"));
        assert_eq!(top.driver_name.as_deref(), Some("Grace"));
        assert_eq!(top.estimated_price, Some(4.5));
    }

    #[test]
    fn nearer_departure_ranks_first() {
        let w = world();
        let late = ride(&w, 20, 2);
        let close = ride(&w, 5, 2);

        let outcome = find_matches(&w.store, &request(&w, 30)).unwrap();
        let ids: Vec<Uuid> = outcome.matches.iter().map(|m| m.ride_id).collect();

        assert_eq!(ids, vec![close.id, late.id]);
        assert!(outcome.matches[0].overall_score > outcome.matches[1].overall_score);
    }

    #[test]
    fn results_are_sorted_and_truncated() {
        let w = world();
        for offset in [-25, 15, 0, 10, -5] {
            ride(&w, offset, 2);
        }

        let mut req = request(&w, 30);
        req.max_results = 3;
        let outcome = find_matches(&w.store, &req).unwrap();

        assert_eq!(outcome.matches.len(), 3);
        assert_eq!(outcome.candidates_scored, 5);
        for pair in outcome.matches.windows(2) {
            assert!(pair[0].overall_score >= pair[1].overall_score);
        }
    }

    #[test]
    fn low_scores_are_dropped_but_still_recorded() {
        let w = world();
        let mut requester = w.requester.clone();
        requester.preferred_hub_id = None;
        requester.home_location = Some(GeoPoint {
            lat: 52.5500,
            lng: 13.3694,
        });
        w.store.insert_user(requester);
        w.store
            .set_preference(MatchingPreference {
                max_walking_distance_m: 100.0,
                ..MatchingPreference::defaults_for(w.requester.id)
            })
            .unwrap();
        ride(&w, 300, 4);

        let store = TestStore {
            inner: w.store,
            fail_history: false,
            ignore_window: true,
        };
        let outcome = find_matches(&store, &request_for(w.requester.id, w.destination)).unwrap();

        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.candidates_scored, 1);
        let rows = store.inner.history_for_user(&w.requester.id);
        assert_eq!(rows.len(), 1);
        assert!(rows[0].score <= 20.0);
    }

    #[test]
    fn repeated_requests_update_one_history_row() {
        let w = world();
        ride(&w, 5, 2);

        find_matches(&w.store, &request(&w, 30)).unwrap();
        find_matches(&w.store, &request(&w, 60)).unwrap();

        let rows = w.store.history_for_user(&w.requester.id);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].reason.as_deref(), Some("Exact time match"));
    }

    #[test]
    fn unknown_requester_or_missing_home_is_empty() {
        let w = world();
        ride(&w, 0, 2);

        let mut unknown = request(&w, 30);
        unknown.requester_id = Uuid::new_v4();
        assert!(find_matches(&w.store, &unknown).unwrap().matches.is_empty());

        let mut homeless = w.requester.clone();
        homeless.home_location = None;
        w.store.insert_user(homeless);
        assert!(find_matches(&w.store, &request(&w, 30)).unwrap().matches.is_empty());
    }

    #[test]
    fn invalid_request_is_rejected() {
        let w = world();
        let mut req = request(&w, 121);
        assert!(find_matches(&w.store, &req).is_err());

        req.time_flexibility_minutes = 30;
        req.max_results = 0;
        assert!(find_matches(&w.store, &req).is_err());
    }

    #[test]
    fn history_failure_does_not_abort_matching() {
        let w = world();
        ride(&w, 0, 2);
        let store = TestStore {
            inner: w.store,
            fail_history: true,
            ignore_window: false,
        };

        let outcome = find_matches(&store, &request_for(w.requester.id, w.destination)).unwrap();

        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.history_failures, 1);
    }

    fn request_for(requester_id: Uuid, destination: Uuid) -> MatchRequest {
        MatchRequest {
            requester_id,
            destination_hub_id: destination,
            departure_time: requested_time(),
            time_flexibility_minutes: 30,
            max_results: 5,
        }
    }

    /// Delegates to a [`MemoryStore`], optionally failing history writes or
    /// returning rides regardless of departure time.
    struct TestStore {
        inner: MemoryStore,
        fail_history: bool,
        ignore_window: bool,
    }

    impl MatchStore for TestStore {
        fn user(&self, id: &Uuid) -> Result<Option<User>, StoreError> {
            self.inner.user(id)
        }

        fn hubs_within(&self, center: &GeoPoint, radius_km: f64) -> Result<Vec<NearbyHub>, StoreError> {
            self.inner.hubs_within(center, radius_km)
        }

        fn scheduled_rides(&self, query: &RideQuery) -> Result<Vec<Ride>, StoreError> {
            if !self.ignore_window {
                return self.inner.scheduled_rides(query);
            }

            let mut wide = query.clone();
            wide.window_start = DateTime::<Utc>::MIN_UTC;
            wide.window_end = DateTime::<Utc>::MAX_UTC;
            self.inner.scheduled_rides(&wide)
        }

        fn driver(&self, id: &Uuid) -> Result<Option<Driver>, StoreError> {
            self.inner.driver(id)
        }

        fn vehicle_type(&self, id: &Uuid) -> Result<Option<VehicleType>, StoreError> {
            self.inner.vehicle_type(id)
        }

        fn matching_preference(&self, user_id: &Uuid) -> Result<Option<MatchingPreference>, StoreError> {
            self.inner.matching_preference(user_id)
        }

        fn travel_patterns(&self, user_id: &Uuid) -> Result<Vec<TravelPattern>, StoreError> {
            self.inner.travel_patterns(user_id)
        }

        fn completed_rides_with_driver(
            &self,
            user_id: &Uuid,
            driver_id: &Uuid,
        ) -> Result<u32, StoreError> {
            self.inner.completed_rides_with_driver(user_id, driver_id)
        }

        fn positive_feedback_count(&self, user_id: &Uuid, driver_id: &Uuid) -> Result<u32, StoreError> {
            self.inner.positive_feedback_count(user_id, driver_id)
        }

        fn upsert_match_history(
            &self,
            key: MatchKey,
            score: f64,
            reason: Option<String>,
        ) -> Result<MatchHistory, StoreError> {
            if self.fail_history {
                return Err(StoreError::Unavailable("history table locked".to_string()));
            }
            self.inner.upsert_match_history(key, score, reason)
        }
    }
}
