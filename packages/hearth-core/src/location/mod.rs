//! # Location Module
//!
//! Alerting on shared locations: speeding and geofence crossings.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       LOCATION ALERTING                                 │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  location sample (subject, speed, point)                                │
//! │        │                                                                │
//! │        ├──► SpeedMonitor                                                │
//! │        │      ├── SpeedLimitProvider (cached, FIFO)  ─ default 50 km/h  │
//! │        │      ├── overage ≥ threshold?                                  │
//! │        │      └── AlertThrottle: cooldown per subject ──► SpeedAlert    │
//! │        │                                                                │
//! │        └──► GeofenceMonitor                                             │
//! │               ├── haversine containment per zone                        │
//! │               └── evaluate_transition(prev, curr) ──► GeofenceEvent     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod cache;
mod geofence;
mod limits;
mod speed;
mod throttle;

pub use cache::{CoordinateCache, CoordinateKey};
pub use geofence::{
    evaluate_transition, GeofenceEvent, GeofenceMonitor, GeofenceZone, ZoneTransition,
};
pub use limits::{CachedSpeedLimitProvider, NoSpeedLimitData, SpeedLimitProvider};
pub use speed::{SpeedAlert, SpeedMonitor, SpeedSample, SpeedSettings};
pub use throttle::AlertThrottle;

use serde::{Deserialize, Serialize};

/// Mean Earth radius used for great-circle distances
pub const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// A WGS84 coordinate in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    /// Latitude, -90 to 90
    pub lat: f64,
    /// Longitude, -180 to 180
    pub lng: f64,
}

impl GeoPoint {
    /// Create a point
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Whether both coordinates are finite and in range
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }

    /// Great-circle distance to `other` in meters
    pub fn distance_to(&self, other: &GeoPoint) -> f64 {
        haversine_distance(self, other)
    }
}

/// Haversine great-circle distance in meters
pub fn haversine_distance(a: &GeoPoint, b: &GeoPoint) -> f64 {
    let lat1 = a.lat.to_radians();
    let lat2 = b.lat.to_radians();
    let d_lat = (b.lat - a.lat).to_radians();
    let d_lng = (b.lng - a.lng).to_radians();

    let h = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lng / 2.0).sin().powi(2);
    // Rounding can push h a hair past 1.0 for antipodal points
    let c = 2.0 * h.sqrt().min(1.0).asin();

    EARTH_RADIUS_METERS * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_distance() {
        let p = GeoPoint::new(51.5074, -0.1278);
        assert_eq!(haversine_distance(&p, &p), 0.0);
    }

    #[test]
    fn test_known_distance() {
        // London to Paris, roughly 343.5 km
        let london = GeoPoint::new(51.5074, -0.1278);
        let paris = GeoPoint::new(48.8566, 2.3522);

        let d = london.distance_to(&paris);
        assert!((d - 343_500.0).abs() < 1_000.0, "got {}", d);
    }

    #[test]
    fn test_symmetric() {
        let a = GeoPoint::new(40.0, -74.0);
        let b = GeoPoint::new(40.001, -74.002);
        assert!((haversine_distance(&a, &b) - haversine_distance(&b, &a)).abs() < 1e-9);
    }

    #[test]
    fn test_antipodal_is_half_circumference() {
        let a = GeoPoint::new(0.0, 0.0);
        let b = GeoPoint::new(0.0, 180.0);
        let expected = std::f64::consts::PI * EARTH_RADIUS_METERS;
        assert!((haversine_distance(&a, &b) - expected).abs() < 1e-6);
    }

    #[test]
    fn test_validity() {
        assert!(GeoPoint::new(45.0, 90.0).is_valid());
        assert!(!GeoPoint::new(91.0, 0.0).is_valid());
        assert!(!GeoPoint::new(0.0, f64::NAN).is_valid());
    }

    #[test]
    fn test_serialized_shape() {
        let json = serde_json::to_value(GeoPoint::new(1.5, 2.5)).unwrap();
        assert_eq!(json, serde_json::json!({ "lat": 1.5, "lng": 2.5 }));
    }
}
