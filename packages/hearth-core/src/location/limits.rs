//! Speed-limit lookup boundary.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::Arc;

use super::{CoordinateCache, GeoPoint};
use crate::config::CacheConfig;
use crate::error::Result;

/// Source of posted speed limits
///
/// Implemented by the host, usually over a roads API. `Ok(None)` means the
/// service answered but has no limit for the point; `Err(_)` (normally
/// [`Error::LookupUnavailable`](crate::Error::LookupUnavailable)) means it
/// could not answer. The speed monitor treats both the same way.
#[async_trait]
pub trait SpeedLimitProvider: Send + Sync {
    /// Posted limit in km/h at `point`
    async fn speed_limit(&self, point: &GeoPoint) -> Result<Option<f64>>;
}

/// Provider with no data, so the default limit always applies
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSpeedLimitData;

#[async_trait]
impl SpeedLimitProvider for NoSpeedLimitData {
    async fn speed_limit(&self, _point: &GeoPoint) -> Result<Option<f64>> {
        Ok(None)
    }
}

/// Caches another provider's answers per coordinate area
///
/// Answers, including "no data", are cached in a FIFO [`CoordinateCache`].
/// Failures are not cached, so the next sample retries the lookup.
pub struct CachedSpeedLimitProvider {
    inner: Arc<dyn SpeedLimitProvider>,
    cache: Mutex<CoordinateCache<Option<f64>>>,
}

impl CachedSpeedLimitProvider {
    /// Wrap `inner` with a cache sized by `config`
    pub fn new(inner: Arc<dyn SpeedLimitProvider>, config: &CacheConfig) -> Self {
        Self {
            inner,
            cache: Mutex::new(CoordinateCache::new(config.capacity, config.precision)),
        }
    }

    /// Number of cached areas
    pub fn cached_areas(&self) -> usize {
        self.cache.lock().len()
    }

    /// Drop every cached answer
    pub fn clear(&self) {
        self.cache.lock().clear();
    }
}

#[async_trait]
impl SpeedLimitProvider for CachedSpeedLimitProvider {
    async fn speed_limit(&self, point: &GeoPoint) -> Result<Option<f64>> {
        let cached = self.cache.lock().get(point);
        if let Some(limit) = cached {
            return Ok(limit);
        }

        let limit = self.inner.speed_limit(point).await?;
        self.cache.lock().insert(point, limit);
        Ok(limit)
    }
}
