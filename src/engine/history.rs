use tracing::{debug, warn};
use uuid::Uuid;

use crate::models::history::MatchKey;
use crate::models::ride::Ride;
use crate::store::MatchStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistoryWrite {
    Recorded,
    /// The ride has no driver, so there is no triple to record.
    Skipped,
    Failed,
}

/// Upserts the (requester, driver, ride) history row. Failures are logged
/// and reported, never propagated: history is auxiliary to the match result.
pub fn record_match<S>(
    store: &S,
    requester_id: Uuid,
    ride: &Ride,
    score: f64,
    reason: Option<String>,
) -> HistoryWrite
where
    S: MatchStore + ?Sized,
{
    let Some(driver_id) = ride.driver_id else {
        return HistoryWrite::Skipped;
    };

    let key = MatchKey {
        requester_id,
        driver_id,
        ride_id: ride.id,
    };

    match store.upsert_match_history(key, score, reason) {
        Ok(row) => {
            debug!(history_id = %row.id, ride_id = %ride.id, score, "match history recorded");
            HistoryWrite::Recorded
        }
        Err(err) => {
            warn!(
                error = %err,
                requester_id = %requester_id,
                ride_id = %ride.id,
                "failed to record match history"
            );
            HistoryWrite::Failed
        }
    }
}
