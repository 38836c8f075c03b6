use crate::engine::signals::{RideSignals, VehicleFit};

/// Number of reasons attached to a returned match.
pub const MAX_REASONS: usize = 3;

const EXACT_TIME_MINUTES: f64 = 5.0;
const CLOSE_TIME_MINUTES: f64 = 15.0;
const VERY_CLOSE_HUB_M: f64 = 200.0;
const WALKING_HUB_M: f64 = 500.0;

/// Human-readable justifications, most specific first. Falls back to a
/// generic line based on `overall` when fewer than two apply.
pub fn generate_reasons(signals: &RideSignals, overall: f64) -> Vec<String> {
    let mut reasons = Vec::new();

    let delta = signals.time_delta_minutes.abs();
    if delta <= EXACT_TIME_MINUTES {
        reasons.push("Exact time match".to_string());
    } else if delta <= CLOSE_TIME_MINUTES {
        reasons.push(format!(
            "Close departure time ({} min difference)",
            delta as i64
        ));
    }

    if signals.at_preferred_hub {
        reasons.push("Preferred starting hub".to_string());
    } else if signals.hub_distance_m <= VERY_CLOSE_HUB_M {
        reasons.push("Very close to starting hub".to_string());
    } else if signals.hub_distance_m <= WALKING_HUB_M {
        reasons.push("Walking distance to starting hub".to_string());
    }

    if signals.same_enterprise {
        reasons.push("Same enterprise".to_string());
    }

    if signals.vehicle_fit == VehicleFit::Match {
        reasons.push("Preferred vehicle type".to_string());
    }

    match signals.rides_with_driver {
        0 => {}
        1 => reasons.push("Rode together once before".to_string()),
        n => reasons.push(format!("Rode together {n} times before")),
    }

    if signals.pattern_fit.matched {
        reasons.push("Matches your regular travel pattern".to_string());
    }

    if reasons.len() < 2 {
        if overall > 80.0 {
            reasons.push("Excellent overall match".to_string());
        } else if overall > 60.0 {
            reasons.push("Good overall match".to_string());
        }
    }

    reasons
}

/// The reasons surfaced to the caller for one ride.
pub fn top_reasons(mut reasons: Vec<String>) -> Vec<String> {
    reasons.truncate(MAX_REASONS);
    reasons
}
