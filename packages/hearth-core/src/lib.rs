//! # Hearth Core
//!
//! The client-side core of Hearth, a shared household hub: an encrypted
//! PIN-gated vault and alerting on shared locations.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         HEARTH CORE MODULES                             │
//! ├─────────────────────────────────────────────────────────────────────────┤
//! │                                                                         │
//! │  ┌──────────────────────────────┐   ┌──────────────────────────────┐   │
//! │  │           Vault              │   │          Location            │   │
//! │  │                              │   │                              │   │
//! │  │ - PIN hash + session gate    │   │ - Speed monitor + cooldown   │   │
//! │  │ - Encrypt before persisting  │   │ - Speed-limit cache (FIFO)   │   │
//! │  │ - Reveal extends the session │   │ - Geofence entry / exit      │   │
//! │  └──────────────┬───────────────┘   └──────────────┬───────────────┘   │
//! │                 │                                  │                   │
//! │  ┌──────────────▼───────────────┐   ┌──────────────▼───────────────┐   │
//! │  │          Crypto              │   │      Host collaborators       │   │
//! │  │                              │   │                              │   │
//! │  │ - PBKDF2-HMAC-SHA256         │   │ - VaultStore (documents)     │   │
//! │  │ - AES-256-GCM                │   │ - SpeedLimitProvider (async) │   │
//! │  │ - SHA-256 PIN digest         │   │ - Clock                      │   │
//! │  └──────────────────────────────┘   └──────────────────────────────┘   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Hierarchy
//!
//! - [`error`] - Error types for the entire library
//! - [`config`] - Runtime configuration
//! - [`crypto`] - Key derivation and vault encryption
//! - [`vault`] - Vault items, PIN session and the vault service
//! - [`storage`] - Persistence boundary for vault items
//! - [`location`] - Speed alerts and geofences
//! - [`time`] - Timestamps and the injectable clock
//!
//! ## Lifecycle
//!
//! There are no globals. The host builds one [`HearthCore`] from a
//! [`CoreConfig`] and its [`CoreServices`], and calls
//! [`HearthCore::dispose`] when the signed-in user goes away. Tests build as
//! many isolated instances as they like.

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]
#![cfg_attr(docsrs, feature(doc_cfg))]

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================

pub mod config;
pub mod crypto;
pub mod error;
pub mod location;
pub mod storage;
pub mod time;
pub mod vault;

// ============================================================================
// RE-EXPORTS
// ============================================================================

pub use config::CoreConfig;
pub use error::{Error, Result};
pub use location::{
    GeoPoint, GeofenceEvent, GeofenceMonitor, GeofenceZone, SpeedAlert, SpeedLimitProvider,
    SpeedMonitor, SpeedSample, ZoneTransition,
};
pub use storage::VaultStore;
pub use time::Clock;
pub use vault::{NewVaultItem, VaultItem, VaultItemKind, VaultItemUpdate, VaultService};

// ============================================================================
// CORE INSTANCE
// ============================================================================

use std::sync::Arc;

use location::{CachedSpeedLimitProvider, NoSpeedLimitData};
use storage::MemoryVaultStore;
use time::SystemClock;

/// Host-provided collaborators
#[derive(Clone)]
pub struct CoreServices {
    /// Where vault item documents live
    pub vault_store: Arc<dyn VaultStore>,
    /// Posted speed-limit lookup
    pub speed_limits: Arc<dyn SpeedLimitProvider>,
    /// Time source for sessions, cooldowns and event timestamps
    pub clock: Arc<dyn Clock>,
}

impl CoreServices {
    /// In-memory store, no speed-limit data, wall-clock time
    pub fn in_memory() -> Self {
        Self {
            vault_store: Arc::new(MemoryVaultStore::new()),
            speed_limits: Arc::new(NoSpeedLimitData),
            clock: Arc::new(SystemClock),
        }
    }
}

/// One signed-in user's services
///
/// ## Lifecycle
///
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                        HEARTH CORE LIFECYCLE                            │
/// ├─────────────────────────────────────────────────────────────────────────┤
/// │                                                                         │
/// │  1. init(config, services)                                              │
/// │       ├── validate config                                               │
/// │       ├── VaultService     (store, clock)          vault locked         │
/// │       ├── SpeedMonitor     (cached provider, clock) no alert history    │
/// │       └── GeofenceMonitor  (clock)                 no containment       │
/// │            │                                                            │
/// │            ▼                                                            │
/// │  2. Active: unlock / reveal / check_speed / geofence updates            │
/// │            │                                                            │
/// │            ▼                                                            │
/// │  3. dispose()                                                           │
/// │       ├── lock the vault                                                │
/// │       └── clear alert history, geofence history and lookup cache        │
/// │                                                                         │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub struct HearthCore {
    config: CoreConfig,
    vault: VaultService,
    speed: SpeedMonitor,
    speed_limit_cache: Arc<CachedSpeedLimitProvider>,
    geofences: GeofenceMonitor,
}

impl HearthCore {
    /// Validate `config` and wire up every service
    pub fn init(config: CoreConfig, services: CoreServices) -> Result<Self> {
        tracing::info!("Initializing Hearth Core v{}", version());
        config.validate()?;

        let vault = VaultService::new(
            &config.vault,
            services.vault_store,
            services.clock.clone(),
        )?;

        let speed_limit_cache = Arc::new(CachedSpeedLimitProvider::new(
            services.speed_limits,
            &config.cache,
        ));
        let speed = SpeedMonitor::new(
            &config.speed,
            speed_limit_cache.clone(),
            services.clock.clone(),
        );

        let geofences = GeofenceMonitor::new(services.clock);

        tracing::info!("Hearth Core initialized successfully");
        Ok(Self {
            config,
            vault,
            speed,
            speed_limit_cache,
            geofences,
        })
    }

    /// Configuration this instance was built with
    pub fn config(&self) -> &CoreConfig {
        &self.config
    }

    /// The vault
    pub fn vault(&self) -> &VaultService {
        &self.vault
    }

    /// The speed monitor
    pub fn speed(&self) -> &SpeedMonitor {
        &self.speed
    }

    /// The geofence monitor
    pub fn geofences(&self) -> &GeofenceMonitor {
        &self.geofences
    }

    /// Lock the vault and drop all in-memory history
    pub fn dispose(self) {
        tracing::info!("Disposing Hearth Core");
        self.vault.lock();
        self.speed.clear_all_history();
        self.geofences.clear();
        self.speed_limit_cache.clear();
    }
}

/// Library version
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
