use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

pub const MAX_TIME_FLEXIBILITY_MINUTES: u32 = 120;
pub const MIN_RESULTS: usize = 1;
pub const MAX_RESULTS: usize = 20;

fn default_flexibility() -> u32 {
    30
}

fn default_max_results() -> usize {
    5
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchRequest {
    pub requester_id: Uuid,
    pub destination_hub_id: Uuid,
    pub departure_time: DateTime<Utc>,
    #[serde(default = "default_flexibility")]
    pub time_flexibility_minutes: u32,
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

impl MatchRequest {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.time_flexibility_minutes > MAX_TIME_FLEXIBILITY_MINUTES {
            return Err(AppError::BadRequest(format!(
                "time_flexibility_minutes must be within 0..={MAX_TIME_FLEXIBILITY_MINUTES}"
            )));
        }

        if !(MIN_RESULTS..=MAX_RESULTS).contains(&self.max_results) {
            return Err(AppError::BadRequest(format!(
                "max_results must be within {MIN_RESULTS}..={MAX_RESULTS}"
            )));
        }

        if self.departure_window().is_none() {
            return Err(AppError::BadRequest(
                "departure_time is out of range".to_string(),
            ));
        }

        Ok(())
    }

    /// Inclusive `[departure - flexibility, departure + flexibility]`, or
    /// `None` when either end falls outside the representable time range.
    pub fn departure_window(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let flexibility = Duration::minutes(i64::from(self.time_flexibility_minutes));
        let start = self.departure_time.checked_sub_signed(flexibility)?;
        let end = self.departure_time.checked_add_signed(flexibility)?;
        Some((start, end))
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub time_score: f64,
    pub proximity_score: f64,
    pub occupancy_score: f64,
    pub preference_score: f64,
    pub history_score: f64,
    pub pattern_score: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RideMatch {
    pub ride_id: Uuid,
    pub departure_time: DateTime<Utc>,
    pub arrival_time: Option<DateTime<Utc>>,
    pub hub_id: Uuid,
    pub hub_name: String,
    pub vehicle_type: Option<String>,
    pub available_seats: u32,
    pub total_capacity: u32,
    pub overall_score: f64,
    pub match_reasons: Vec<String>,
    pub driver_name: Option<String>,
    pub driver_rating: Option<f64>,
    pub estimated_price: Option<f64>,
    pub score_breakdown: ScoreBreakdown,
}
