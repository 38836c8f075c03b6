use std::collections::HashMap;

use tracing::debug;
use uuid::Uuid;

use crate::models::hub::Hub;
use crate::models::matching::MatchRequest;
use crate::models::ride::Ride;
use crate::models::user::User;
use crate::store::{MatchStore, RideQuery, StoreError};

/// Hard cutoff for hubs considered around the requester's home.
pub const SEARCH_RADIUS_KM: f64 = 5.0;

/// Rides eligible for scoring, together with the nearby hubs they start
/// from. Proximity scoring needs the per-hub distances, so they travel with
/// the rides.
#[derive(Debug, Default)]
pub struct CandidateSet {
    pub rides: Vec<Ride>,
    pub hub_distances_m: HashMap<Uuid, f64>,
    pub hubs: HashMap<Uuid, Hub>,
}

impl CandidateSet {
    pub fn is_empty(&self) -> bool {
        self.rides.is_empty()
    }
}

pub fn select_candidates<S>(
    store: &S,
    requester: &User,
    request: &MatchRequest,
) -> Result<CandidateSet, StoreError>
where
    S: MatchStore + ?Sized,
{
    let Some(home) = requester.home_location else {
        debug!(requester_id = %requester.id, "requester has no home location");
        return Ok(CandidateSet::default());
    };

    let Some((window_start, window_end)) = request.departure_window() else {
        debug!(requester_id = %requester.id, "departure window out of range");
        return Ok(CandidateSet::default());
    };

    let nearby = store.hubs_within(&home, SEARCH_RADIUS_KM)?;
    if nearby.is_empty() {
        debug!(requester_id = %requester.id, "no hubs within search radius");
        return Ok(CandidateSet::default());
    }

    let hub_ids: Vec<Uuid> = nearby.iter().map(|n| n.hub.id).collect();
    let rides = store.scheduled_rides(&RideQuery {
        destination_hub_id: request.destination_hub_id,
        hub_ids,
        window_start,
        window_end,
    })?;

    debug!(
        requester_id = %requester.id,
        hubs = nearby.len(),
        rides = rides.len(),
        "candidates selected"
    );

    let mut hub_distances_m = HashMap::with_capacity(nearby.len());
    let mut hubs = HashMap::with_capacity(nearby.len());
    for entry in nearby {
        hub_distances_m.insert(entry.hub.id, entry.distance_km * 1_000.0);
        hubs.insert(entry.hub.id, entry.hub);
    }

    Ok(CandidateSet {
        rides,
        hub_distances_m,
        hubs,
    })
}
