use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::hub::GeoPoint;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub home_location: Option<GeoPoint>,
    pub preferred_hub_id: Option<Uuid>,
    pub preferred_vehicle_type_id: Option<Uuid>,
    pub enterprise_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Driver {
    pub id: Uuid,
    pub name: String,
    pub rating: Option<f64>,
    pub enterprise_id: Option<Uuid>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VehicleType {
    pub id: Uuid,
    pub name: String,
}
