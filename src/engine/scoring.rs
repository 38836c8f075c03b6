use crate::engine::signals::{RideSignals, VehicleFit};
use crate::models::matching::ScoreBreakdown;

const TIME_WEIGHT: f64 = 0.25;
const PROXIMITY_WEIGHT: f64 = 0.25;
const OCCUPANCY_WEIGHT: f64 = 0.05;
const PREFERENCE_WEIGHT: f64 = 0.15;
const HISTORY_WEIGHT: f64 = 0.15;
const PATTERN_WEIGHT: f64 = 0.15;

pub const WEIGHTS: [f64; 6] = [
    TIME_WEIGHT,
    PROXIMITY_WEIGHT,
    OCCUPANCY_WEIGHT,
    PREFERENCE_WEIGHT,
    HISTORY_WEIGHT,
    PATTERN_WEIGHT,
];

/// Rides at or below this overall score are never returned.
pub const MIN_MATCH_SCORE: f64 = 20.0;

const MAX_SCORE: f64 = 100.0;

#[derive(Debug, Clone, Copy)]
pub struct RideScore {
    pub overall: f64,
    pub breakdown: ScoreBreakdown,
}

pub fn score_ride(signals: &RideSignals) -> RideScore {
    let breakdown = ScoreBreakdown {
        time_score: time_score(signals.time_delta_minutes, signals.flexibility_minutes),
        proximity_score: proximity_score(
            signals.at_preferred_hub,
            signals.hub_distance_m,
            signals.max_walking_distance_m,
        ),
        occupancy_score: occupancy_score(signals.capacity, signals.available_seats),
        preference_score: preference_score(
            signals.vehicle_fit,
            signals.same_enterprise && signals.prefer_same_enterprise,
        ),
        history_score: history_score(signals.rides_with_driver, signals.positive_feedback),
        pattern_score: pattern_score(signals),
    };

    RideScore {
        overall: weighted_score(&breakdown),
        breakdown,
    }
}

pub fn weighted_score(breakdown: &ScoreBreakdown) -> f64 {
    let total = (breakdown.time_score * TIME_WEIGHT)
        + (breakdown.proximity_score * PROXIMITY_WEIGHT)
        + (breakdown.occupancy_score * OCCUPANCY_WEIGHT)
        + (breakdown.preference_score * PREFERENCE_WEIGHT)
        + (breakdown.history_score * HISTORY_WEIGHT)
        + (breakdown.pattern_score * PATTERN_WEIGHT);

    bounded(total)
}

fn bounded(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, MAX_SCORE)
}

fn time_score(delta_minutes: f64, flexibility_minutes: f64) -> f64 {
    let flexibility = flexibility_minutes.max(1.0);
    bounded(MAX_SCORE - (delta_minutes.abs() / flexibility) * 50.0)
}

fn proximity_score(at_preferred_hub: bool, distance_m: f64, max_walking_distance_m: f64) -> f64 {
    if at_preferred_hub {
        return MAX_SCORE;
    }

    let max_walking = max_walking_distance_m.max(1.0);
    bounded(MAX_SCORE - (distance_m / max_walking) * 100.0)
}

/// Peaks when the ride is half full.
fn occupancy_score(capacity: u32, available_seats: u32) -> f64 {
    if capacity == 0 {
        return 0.0;
    }

    let occupied = capacity.saturating_sub(available_seats);
    let ratio = f64::from(occupied) / f64::from(capacity);
    bounded(MAX_SCORE - (0.5 - ratio).abs() * 100.0)
}

fn preference_score(vehicle_fit: VehicleFit, enterprise_bonus: bool) -> f64 {
    let mut score = 50.0;

    match vehicle_fit {
        VehicleFit::Match => score += 30.0,
        VehicleFit::Mismatch => score -= 10.0,
        VehicleFit::Unknown => {}
    }

    if enterprise_bonus {
        score += 20.0;
    }

    bounded(score)
}

fn history_score(rides_with_driver: u32, positive_feedback: u32) -> f64 {
    let rides = (f64::from(rides_with_driver) * 15.0).min(60.0);
    let feedback = (f64::from(positive_feedback) * 10.0).min(40.0);
    bounded(rides + feedback)
}

fn pattern_score(signals: &RideSignals) -> f64 {
    let fit = signals.pattern_fit;
    if !fit.matched {
        return 0.0;
    }

    let mut score = 50.0;
    if fit.frequent {
        score += 30.0;
    }
    if fit.recent {
        score += 20.0;
    }
    bounded(score)
}

#[cfg(test)]
pub(crate) mod tests {
    use super::{
        history_score, occupancy_score, preference_score, proximity_score, score_ride, time_score,
        MIN_MATCH_SCORE, WEIGHTS,
    };
    use crate::engine::signals::{PatternFit, RideSignals, VehicleFit};

    pub(crate) fn neutral_signals() -> RideSignals {
        RideSignals {
            time_delta_minutes: 0.0,
            flexibility_minutes: 30.0,
            at_preferred_hub: false,
            hub_distance_m: 0.0,
            max_walking_distance_m: 1_000.0,
            capacity: 4,
            available_seats: 2,
            vehicle_fit: VehicleFit::Unknown,
            same_enterprise: false,
            prefer_same_enterprise: true,
            rides_with_driver: 0,
            positive_feedback: 0,
            pattern_fit: PatternFit::default(),
        }
    }

    #[test]
    fn weights_sum_to_one() {
        let sum: f64 = WEIGHTS.iter().sum();
        assert!((sum - 1.0).abs() < 1e-12);
    }

    #[test]
    fn time_score_halves_at_the_window_edge() {
        assert_eq!(time_score(0.0, 30.0), 100.0);
        assert_eq!(time_score(-30.0, 30.0), 50.0);
        assert_eq!(time_score(90.0, 30.0), 0.0);
        // zero flexibility is floored at one minute
        assert_eq!(time_score(1.0, 0.0), 50.0);
    }

    #[test]
    fn proximity_prefers_the_preferred_hub() {
        assert_eq!(proximity_score(true, 4_000.0, 1_000.0), 100.0);
        assert_eq!(proximity_score(false, 250.0, 1_000.0), 75.0);
        assert_eq!(proximity_score(false, 2_000.0, 1_000.0), 0.0);
        assert!(proximity_score(false, 10.0, -5.0) >= 0.0);
    }

    #[test]
    fn occupancy_peaks_at_half_full() {
        assert_eq!(occupancy_score(4, 2), 100.0);
        assert_eq!(occupancy_score(4, 4), 50.0);
        assert_eq!(occupancy_score(4, 0), 50.0);
        assert_eq!(occupancy_score(0, 0), 0.0);
    }

    #[test]
    fn preference_adjustments() {
        assert_eq!(preference_score(VehicleFit::Unknown, false), 50.0);
        assert_eq!(preference_score(VehicleFit::Match, true), 100.0);
        assert_eq!(preference_score(VehicleFit::Mismatch, false), 40.0);
    }

    #[test]
    fn history_is_capped_per_component() {
        assert_eq!(history_score(0, 0), 0.0);
        assert_eq!(history_score(2, 1), 40.0);
        assert_eq!(history_score(10, 10), 100.0);
    }

    #[test]
    fn enterprise_bonus_requires_the_preference_flag() {
        let mut signals = neutral_signals();
        signals.same_enterprise = true;
        signals.prefer_same_enterprise = false;
        assert_eq!(score_ride(&signals).breakdown.preference_score, 50.0);

        signals.prefer_same_enterprise = true;
        assert_eq!(score_ride(&signals).breakdown.preference_score, 70.0);
    }

    #[test]
    fn pattern_score_stacks_bonuses() {
        let mut signals = neutral_signals();
        assert_eq!(score_ride(&signals).breakdown.pattern_score, 0.0);

        signals.pattern_fit = PatternFit {
            matched: true,
            frequent: true,
            recent: false,
        };
        assert_eq!(score_ride(&signals).breakdown.pattern_score, 80.0);

        signals.pattern_fit.recent = true;
        assert_eq!(score_ride(&signals).breakdown.pattern_score, 100.0);
    }

    #[test]
    fn scores_stay_within_bounds_for_extreme_inputs() {
        let extremes = [
            (f64::MAX, 0.0, f64::MAX, 0.0, 0, 0, u32::MAX),
            (-1e9, 120.0, -50.0, 1e-9, 1, 5, 0),
            (0.0, 1.0, 0.0, 1_000.0, 10, 0, 3),
        ];

        for (delta, flex, distance, walking, capacity, seats, history) in extremes {
            let mut signals = neutral_signals();
            signals.time_delta_minutes = delta;
            signals.flexibility_minutes = flex;
            signals.hub_distance_m = distance;
            signals.max_walking_distance_m = walking;
            signals.capacity = capacity;
            signals.available_seats = seats;
            signals.rides_with_driver = history;
            signals.positive_feedback = history;

            let score = score_ride(&signals);
            let b = score.breakdown;
            for part in [
                b.time_score,
                b.proximity_score,
                b.occupancy_score,
                b.preference_score,
                b.history_score,
                b.pattern_score,
                score.overall,
            ] {
                assert!((0.0..=100.0).contains(&part), "{part} out of range");
            }
        }
    }

    #[test]
    fn closer_departure_ranks_higher() {
        let mut five = neutral_signals();
        five.time_delta_minutes = 5.0;
        let mut twenty = neutral_signals();
        twenty.time_delta_minutes = -20.0;

        assert!(score_ride(&five).overall > score_ride(&twenty).overall);
    }

    #[test]
    fn neutral_ride_clears_the_threshold() {
        assert!(score_ride(&neutral_signals()).overall > MIN_MATCH_SCORE);
    }
}
