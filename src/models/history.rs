use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique key of a match history row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MatchKey {
    pub requester_id: Uuid,
    pub driver_id: Uuid,
    pub ride_id: Uuid,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchHistory {
    pub id: Uuid,
    pub requester_id: Uuid,
    pub driver_id: Uuid,
    pub ride_id: Uuid,
    pub score: f64,
    pub reason: Option<String>,
    pub was_accepted: Option<bool>,
    pub feedback_rating: Option<u8>,
    pub feedback_comment: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
