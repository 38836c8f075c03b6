use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Hub {
    pub id: Uuid,
    pub name: String,
    pub location: GeoPoint,
}

/// A hub found by a radius search, with its distance from the search center.
#[derive(Debug, Clone)]
pub struct NearbyHub {
    pub hub: Hub,
    pub distance_km: f64,
}
