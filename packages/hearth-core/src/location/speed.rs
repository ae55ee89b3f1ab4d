//! # Speed Monitoring
//!
//! Converts a stream of speed samples into a rate-limited stream of
//! [`SpeedAlert`]s.
//!
//! ## Decision Flow
//!
//! ```text
//! check_speed(subject, speed, point)
//!        │
//!        ▼
//!  limit = provider(point)  ── none / error ──► default limit
//!        │
//!        ▼
//!  overage = speed - limit  ── overage < threshold ──► None
//!        │
//!        ▼
//!  throttle(subject, now)   ── within cooldown ──► None
//!        │
//!        ▼
//!  SpeedAlert { overLimit: round(overage) }
//! ```
//!
//! The lookup never blocks alerting: any failure falls back to the default
//! limit, trading precision of the limit for availability of the alert.

use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{AlertThrottle, GeoPoint, SpeedLimitProvider};
use crate::config::{SpeedConfig, MAX_DURATION_SECS};
use crate::error::{Error, Result};
use crate::time::Clock;

/// One location report with instantaneous speed
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedSample {
    /// Whose device reported it
    pub subject_id: String,
    /// Speed in km/h
    pub speed: f64,
    /// Where
    pub point: GeoPoint,
    /// When (Unix millis)
    pub timestamp: i64,
}

/// A speeding alert, persisted by the caller
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeedAlert {
    /// Who was speeding
    pub subject_id: String,
    /// Measured speed in km/h
    pub speed: f64,
    /// Limit the speed was compared against
    pub speed_limit: f64,
    /// Where
    pub point: GeoPoint,
    /// When the alert was emitted (Unix millis)
    pub timestamp: i64,
    /// Amount over the limit, rounded to whole km/h
    pub over_limit: i64,
}

/// Live alerting parameters
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpeedSettings {
    /// Limit used when the lookup has nothing
    pub default_limit_kmh: f64,
    /// Overage at or above which an alert fires
    pub threshold_kmh: f64,
    /// Minimum spacing between alerts per subject
    pub cooldown_millis: i64,
}

impl From<&SpeedConfig> for SpeedSettings {
    fn from(config: &SpeedConfig) -> Self {
        Self {
            default_limit_kmh: config.default_limit_kmh,
            threshold_kmh: config.threshold_kmh,
            cooldown_millis: config.cooldown_millis(),
        }
    }
}

/// Speeding detector with per-subject cooldown
pub struct SpeedMonitor {
    provider: Arc<dyn SpeedLimitProvider>,
    clock: Arc<dyn Clock>,
    settings: RwLock<SpeedSettings>,
    throttle: Mutex<AlertThrottle>,
}

impl SpeedMonitor {
    /// Create a monitor with empty alert history
    pub fn new(
        config: &SpeedConfig,
        provider: Arc<dyn SpeedLimitProvider>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            provider,
            clock,
            settings: RwLock::new(SpeedSettings::from(config)),
            throttle: Mutex::new(AlertThrottle::new(config.sweep_threshold)),
        }
    }

    /// Limit that applies at `point`
    ///
    /// Falls back to the default limit when the provider has no usable
    /// answer or fails. Never errors.
    pub async fn resolve_limit(&self, point: &GeoPoint) -> f64 {
        let default_limit = self.settings.read().default_limit_kmh;

        match self.provider.speed_limit(point).await {
            Ok(Some(limit)) if limit.is_finite() && limit > 0.0 => limit,
            Ok(Some(limit)) => {
                tracing::debug!(limit, "Ignoring unusable speed limit, using default");
                default_limit
            }
            Ok(None) => default_limit,
            Err(e) => {
                tracing::warn!("Speed-limit lookup failed, using default: {}", e);
                default_limit
            }
        }
    }

    /// Decide whether `speed` at `point` warrants an alert for `subject_id`
    ///
    /// Returns `None` when under the threshold or inside the subject's
    /// cooldown.
    pub async fn check_speed(
        &self,
        subject_id: &str,
        speed: f64,
        point: GeoPoint,
    ) -> Option<SpeedAlert> {
        if !speed.is_finite() || speed < 0.0 {
            tracing::debug!(subject_id, speed, "Ignoring invalid speed sample");
            return None;
        }

        let limit = self.resolve_limit(&point).await;
        let settings = *self.settings.read();

        let overage = speed - limit;
        if overage < settings.threshold_kmh {
            return None;
        }

        let now = self.clock.now_millis();
        if !self
            .throttle
            .lock()
            .try_acquire(subject_id, now, settings.cooldown_millis)
        {
            tracing::debug!(subject_id, "Speed alert suppressed by cooldown");
            return None;
        }

        let alert = SpeedAlert {
            subject_id: subject_id.to_string(),
            speed,
            speed_limit: limit,
            point,
            timestamp: now,
            over_limit: overage.round() as i64,
        };

        tracing::info!(
            subject_id,
            speed,
            limit,
            over_limit = alert.over_limit,
            "Speed alert"
        );
        Some(alert)
    }

    /// [`check_speed`](Self::check_speed) for a whole sample
    pub async fn process_sample(&self, sample: &SpeedSample) -> Option<SpeedAlert> {
        self.check_speed(&sample.subject_id, sample.speed, sample.point)
            .await
    }

    /// Current parameters
    pub fn settings(&self) -> SpeedSettings {
        *self.settings.read()
    }

    /// Change the alert threshold; recorded alert times are untouched
    pub fn set_threshold(&self, threshold_kmh: f64) -> Result<()> {
        if !threshold_kmh.is_finite() || threshold_kmh < 0.0 {
            return Err(Error::InvalidConfig(
                "speed threshold must not be negative".into(),
            ));
        }
        self.settings.write().threshold_kmh = threshold_kmh;
        Ok(())
    }

    /// Change the cooldown; recorded alert times are untouched
    pub fn set_cooldown_secs(&self, cooldown_secs: i64) -> Result<()> {
        if !(0..=MAX_DURATION_SECS).contains(&cooldown_secs) {
            return Err(Error::InvalidConfig(format!(
                "alert cooldown must be between 0 and {} seconds",
                MAX_DURATION_SECS
            )));
        }
        self.settings.write().cooldown_millis = cooldown_secs * 1000;
        Ok(())
    }

    /// Forget one subject's last alert
    pub fn clear_subject_history(&self, subject_id: &str) -> bool {
        self.throttle.lock().clear_subject(subject_id)
    }

    /// Forget all alert history
    pub fn clear_all_history(&self) {
        self.throttle.lock().clear();
    }

    /// Drop history entries already past their cooldown
    pub fn sweep_history(&self) -> usize {
        let cooldown = self.settings.read().cooldown_millis;
        let now = self.clock.now_millis();
        self.throttle.lock().sweep(now, cooldown)
    }

    /// Number of subjects with recorded alerts
    pub fn tracked_subjects(&self) -> usize {
        self.throttle.lock().len()
    }
}

// ============================================================================
// TESTS
// ============================================================================
