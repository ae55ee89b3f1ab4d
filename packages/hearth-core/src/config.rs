//! # Configuration
//!
//! Runtime configuration for Hearth Core. Hosts usually hand it over as
//! JSON; every field has a default, so `{}` is a valid configuration.
//!
//! ```json
//! {
//!   "vault": { "kdfIterations": 100000, "sessionTtlSecs": 900 },
//!   "speed": { "defaultLimitKmh": 50, "thresholdKmh": 10, "cooldownSecs": 300 },
//!   "cache": { "capacity": 100, "precision": 3 }
//! }
//! ```

use serde::{Deserialize, Serialize};

use crate::crypto::MIN_KDF_ITERATIONS;
use crate::error::{Error, Result};

/// Default vault session lifetime (15 minutes).
pub const DEFAULT_SESSION_TTL_SECS: i64 = 15 * 60;

/// Limit used when no speed-limit data is available for a point.
pub const DEFAULT_SPEED_LIMIT_KMH: f64 = 50.0;

/// Amount over the limit at which an alert fires.
pub const DEFAULT_SPEED_THRESHOLD_KMH: f64 = 10.0;

/// Minimum spacing between two alerts for the same subject (5 minutes).
pub const DEFAULT_ALERT_COOLDOWN_SECS: i64 = 5 * 60;

/// Throttle map size past which stale entries are swept.
pub const DEFAULT_SWEEP_THRESHOLD: usize = 1024;

/// Default number of cached coordinate lookups.
pub const DEFAULT_CACHE_CAPACITY: usize = 100;

/// Default number of decimal places kept in cache keys (~110 m).
pub const DEFAULT_CACHE_PRECISION: u32 = 3;

/// Longest duration, in seconds, that still fits in `i64` milliseconds.
pub const MAX_DURATION_SECS: i64 = i64::MAX / 1000;

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CoreConfig {
    /// Vault cipher and session settings
    pub vault: VaultConfig,
    /// Speed alerting settings
    pub speed: SpeedConfig,
    /// Coordinate cache settings
    pub cache: CacheConfig,
}

impl CoreConfig {
    /// Parse and validate a JSON configuration
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Check every section for out-of-range values
    pub fn validate(&self) -> Result<()> {
        self.vault.validate()?;
        self.speed.validate()?;
        self.cache.validate()
    }
}

/// Vault cipher and session settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VaultConfig {
    /// PBKDF2 rounds; may only be raised above the minimum
    pub kdf_iterations: u32,
    /// Session lifetime after unlock or extend
    pub session_ttl_secs: i64,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            kdf_iterations: MIN_KDF_ITERATIONS,
            session_ttl_secs: DEFAULT_SESSION_TTL_SECS,
        }
    }
}

impl VaultConfig {
    fn validate(&self) -> Result<()> {
        if self.kdf_iterations < MIN_KDF_ITERATIONS {
            return Err(Error::InvalidConfig(format!(
                "vault.kdfIterations must be at least {}, got {}",
                MIN_KDF_ITERATIONS, self.kdf_iterations
            )));
        }
        if self.session_ttl_secs <= 0 || self.session_ttl_secs > MAX_DURATION_SECS {
            return Err(Error::InvalidConfig(format!(
                "vault.sessionTtlSecs must be between 1 and {}",
                MAX_DURATION_SECS
            )));
        }
        Ok(())
    }

    /// Session lifetime in milliseconds
    pub fn session_ttl_millis(&self) -> i64 {
        self.session_ttl_secs.saturating_mul(1000)
    }
}

/// Speed alerting settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpeedConfig {
    /// Fallback limit when the lookup has no data or fails
    pub default_limit_kmh: f64,
    /// Minimum overage that triggers an alert (inclusive)
    pub threshold_kmh: f64,
    /// Minimum spacing between alerts per subject
    pub cooldown_secs: i64,
    /// Throttle map size that triggers a sweep of stale entries
    pub sweep_threshold: usize,
}

impl Default for SpeedConfig {
    fn default() -> Self {
        Self {
            default_limit_kmh: DEFAULT_SPEED_LIMIT_KMH,
            threshold_kmh: DEFAULT_SPEED_THRESHOLD_KMH,
            cooldown_secs: DEFAULT_ALERT_COOLDOWN_SECS,
            sweep_threshold: DEFAULT_SWEEP_THRESHOLD,
        }
    }
}

impl SpeedConfig {
    fn validate(&self) -> Result<()> {
        if !self.default_limit_kmh.is_finite() || self.default_limit_kmh <= 0.0 {
            return Err(Error::InvalidConfig(
                "speed.defaultLimitKmh must be a positive number".into(),
            ));
        }
        if !self.threshold_kmh.is_finite() || self.threshold_kmh < 0.0 {
            return Err(Error::InvalidConfig(
                "speed.thresholdKmh must not be negative".into(),
            ));
        }
        if !(0..=MAX_DURATION_SECS).contains(&self.cooldown_secs) {
            return Err(Error::InvalidConfig(format!(
                "speed.cooldownSecs must be between 0 and {}",
                MAX_DURATION_SECS
            )));
        }
        if self.sweep_threshold == 0 {
            return Err(Error::InvalidConfig(
                "speed.sweepThreshold must be positive".into(),
            ));
        }
        Ok(())
    }

    /// Cooldown in milliseconds
    pub fn cooldown_millis(&self) -> i64 {
        self.cooldown_secs.saturating_mul(1000)
    }
}

/// Coordinate cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheConfig {
    /// Maximum number of cached entries (FIFO eviction)
    pub capacity: usize,
    /// Decimal places kept when truncating coordinates into keys
    pub precision: u32,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CACHE_CAPACITY,
            precision: DEFAULT_CACHE_PRECISION,
        }
    }
}

impl CacheConfig {
    fn validate(&self) -> Result<()> {
        if self.capacity == 0 {
            return Err(Error::InvalidConfig("cache.capacity must be positive".into()));
        }
        if self.precision > 7 {
            return Err(Error::InvalidConfig(
                "cache.precision must be at most 7 decimal places".into(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// TESTS
// ============================================================================
