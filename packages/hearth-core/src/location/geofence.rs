//! # Geofences
//!
//! Circular zones and entry/exit detection.
//!
//! [`evaluate_transition`] is a pure function of two containment flags.
//! [`GeofenceMonitor`] is the stateful layer on top: it remembers the last
//! containment per `(subject, zone)` pair and feeds it back in.
//!
//! ```text
//!   previous   current   alert_on_entry   alert_on_exit   result
//!   ────────   ───────   ──────────────   ─────────────   ────────
//!   outside    inside          yes              -          Entered
//!   inside     outside          -              yes         Exited
//!   anything else                                          Unchanged
//! ```

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use super::GeoPoint;
use crate::error::{Error, Result};
use crate::time::Clock;

/// A named circular region owned by a hub
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceZone {
    /// Unique zone id
    pub id: String,
    /// Owning hub
    pub hub_id: String,
    /// Display name
    pub name: String,
    /// Center of the circle
    pub center: GeoPoint,
    /// Radius in meters, always > 0
    #[serde(rename = "radius")]
    pub radius_meters: f64,
    /// Inactive zones produce no events
    pub active: bool,
    /// Emit [`ZoneTransition::Entered`]
    pub alert_on_entry: bool,
    /// Emit [`ZoneTransition::Exited`]
    pub alert_on_exit: bool,
    /// Creation time (Unix millis)
    pub created_at: i64,
    /// Last update time (Unix millis)
    pub updated_at: i64,
}

impl GeofenceZone {
    /// Create an active zone that alerts on both entry and exit
    pub fn new(
        hub_id: impl Into<String>,
        name: impl Into<String>,
        center: GeoPoint,
        radius_meters: f64,
        now: i64,
    ) -> Result<Self> {
        let zone = Self {
            id: uuid::Uuid::new_v4().to_string(),
            hub_id: hub_id.into(),
            name: name.into(),
            center,
            radius_meters,
            active: true,
            alert_on_entry: true,
            alert_on_exit: true,
            created_at: now,
            updated_at: now,
        };
        zone.validate()?;
        Ok(zone)
    }

    /// Check the zone's invariants
    pub fn validate(&self) -> Result<()> {
        if !self.radius_meters.is_finite() || self.radius_meters <= 0.0 {
            return Err(Error::InvalidZone(format!(
                "radius must be a positive number of meters, got {}",
                self.radius_meters
            )));
        }
        if !self.center.is_valid() {
            return Err(Error::InvalidZone("center is not a valid coordinate".into()));
        }
        if self.name.trim().is_empty() {
            return Err(Error::InvalidZone("name is empty".into()));
        }
        Ok(())
    }

    /// Distance from the center in meters
    pub fn distance_to(&self, point: &GeoPoint) -> f64 {
        self.center.distance_to(point)
    }

    /// Whether `point` lies inside the zone; the boundary counts as inside
    pub fn contains(&self, point: &GeoPoint) -> bool {
        self.distance_to(point) <= self.radius_meters
    }
}

/// Result of comparing two containment observations
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ZoneTransition {
    /// Outside, now inside
    Entered,
    /// Inside, now outside
    Exited,
    /// No reportable change
    #[serde(rename = "none")]
    Unchanged,
}

/// Classify a containment change, honoring the zone's alert flags
pub fn evaluate_transition(zone: &GeofenceZone, previous: bool, current: bool) -> ZoneTransition {
    match (previous, current) {
        (false, true) if zone.alert_on_entry => ZoneTransition::Entered,
        (true, false) if zone.alert_on_exit => ZoneTransition::Exited,
        _ => ZoneTransition::Unchanged,
    }
}

/// An entry or exit, ready for the caller to persist or notify
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GeofenceEvent {
    /// Who crossed
    pub subject_id: String,
    /// Zone crossed
    pub zone_id: String,
    /// Zone display name
    pub zone_name: String,
    /// Zone's hub
    pub hub_id: String,
    /// Entered or exited
    pub transition: ZoneTransition,
    /// Where the subject was
    pub point: GeoPoint,
    /// When (Unix millis)
    pub timestamp: i64,
}

/// Per-subject containment memory
pub struct GeofenceMonitor {
    clock: Arc<dyn Clock>,
    /// (subject id, zone id) -> last containment
    containment: Mutex<HashMap<(String, String), bool>>,
}

impl GeofenceMonitor {
    /// Create a monitor with no history
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            containment: Mutex::new(HashMap::new()),
        }
    }

    /// Record `subject_id` at `point` and return the crossings it caused
    ///
    /// The first observation of a subject for a zone only sets the baseline.
    pub fn update(
        &self,
        subject_id: &str,
        point: GeoPoint,
        zones: &[GeofenceZone],
    ) -> Vec<GeofenceEvent> {
        if !point.is_valid() {
            tracing::debug!(subject_id, "Ignoring invalid location for geofences");
            return Vec::new();
        }

        let now = self.clock.now_millis();
        let mut containment = self.containment.lock();
        let mut events = Vec::new();

        for zone in zones.iter().filter(|z| z.active) {
            let current = zone.contains(&point);
            let key = (subject_id.to_string(), zone.id.clone());

            let Some(previous) = containment.insert(key, current) else {
                continue;
            };

            let transition = evaluate_transition(zone, previous, current);
            if transition == ZoneTransition::Unchanged {
                continue;
            }

            tracing::info!(
                subject_id,
                zone_id = %zone.id,
                ?transition,
                "Geofence transition"
            );

            events.push(GeofenceEvent {
                subject_id: subject_id.to_string(),
                zone_id: zone.id.clone(),
                zone_name: zone.name.clone(),
                hub_id: zone.hub_id.clone(),
                transition,
                point,
                timestamp: now,
            });
        }

        events
    }

    /// Last known containment of a subject in a zone
    pub fn is_inside(&self, subject_id: &str, zone_id: &str) -> Option<bool> {
        self.containment
            .lock()
            .get(&(subject_id.to_string(), zone_id.to_string()))
            .copied()
    }

    /// Drop all history for a subject
    pub fn forget_subject(&self, subject_id: &str) {
        self.containment.lock().retain(|(s, _), _| s != subject_id);
    }

    /// Drop all history for a zone, e.g. after it was deleted
    pub fn forget_zone(&self, zone_id: &str) {
        self.containment.lock().retain(|(_, z), _| z != zone_id);
    }

    /// Drop everything
    pub fn clear(&self) {
        self.containment.lock().clear();
    }
}
