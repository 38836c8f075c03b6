use crate::models::hub::GeoPoint;

const EARTH_RADIUS_KM: f64 = 6_371.0;
const KM_PER_DEGREE_LAT: f64 = 111.32;

pub fn haversine_km(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let delta_lat = (b.lat - a.lat).to_radians();
    let delta_lng = (b.lng - a.lng).to_radians();

    let sin_lat = (delta_lat / 2.0).sin();
    let sin_lng = (delta_lng / 2.0).sin();

    let haversine = sin_lat * sin_lat + lat1.cos() * lat2.cos() * sin_lng * sin_lng;
    let central_angle = 2.0 * haversine.min(1.0).sqrt().asin();

    EARTH_RADIUS_KM * central_angle
}

/// Lat/lng rectangle enclosing a circle. Only used to narrow a search before
/// the exact haversine check; it never decides membership on its own.
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl BoundingBox {
    /// Longitudes are compared modulo 360 so a box spilling over the
    /// antimeridian still holds points on the other side of it.
    pub fn contains(&self, point: &GeoPoint) -> bool {
        if !(self.min_lat..=self.max_lat).contains(&point.lat) {
            return false;
        }

        let lngs = self.min_lng..=self.max_lng;
        lngs.contains(&point.lng)
            || lngs.contains(&(point.lng + 360.0))
            || lngs.contains(&(point.lng - 360.0))
    }
}

pub fn bounding_box(center: &GeoPoint, radius_km: f64) -> BoundingBox {
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;
    let min_lat = center.lat - lat_delta;
    let max_lat = center.lat + lat_delta;
    let cos_lat = center.lat.to_radians().cos().abs();

    // a circle reaching over a pole covers every longitude
    let lng_delta = if cos_lat < 1e-6 || min_lat <= -90.0 || max_lat >= 90.0 {
        180.0
    } else {
        (radius_km / (KM_PER_DEGREE_LAT * cos_lat)).min(180.0)
    };

    BoundingBox {
        min_lat: min_lat.max(-90.0),
        max_lat: max_lat.min(90.0),
        min_lng: center.lng - lng_delta,
        max_lng: center.lng + lng_delta,
    }
}
