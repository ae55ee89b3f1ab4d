//! Bounded cache keyed by truncated coordinates.
//!
//! Eviction is **FIFO**: on overflow the key inserted first is dropped,
//! regardless of how recently it was read. Overwriting an existing key keeps
//! its original position in the queue.

use std::collections::{HashMap, VecDeque};

use super::GeoPoint;

/// Coordinates truncated toward zero to a fixed number of decimals
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct CoordinateKey {
    lat: i64,
    lng: i64,
}

impl CoordinateKey {
    /// Build the key for `point` at `precision` decimal places
    pub fn new(point: &GeoPoint, precision: u32) -> Self {
        let scale = 10f64.powi(precision as i32);
        Self {
            lat: (point.lat * scale).trunc() as i64,
            lng: (point.lng * scale).trunc() as i64,
        }
    }
}

/// FIFO cache of per-area values
#[derive(Debug)]
pub struct CoordinateCache<V> {
    entries: HashMap<CoordinateKey, V>,
    order: VecDeque<CoordinateKey>,
    capacity: usize,
    precision: u32,
}

impl<V: Clone> CoordinateCache<V> {
    /// Create a cache holding at most `capacity` areas
    pub fn new(capacity: usize, precision: u32) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: HashMap::with_capacity(capacity),
            order: VecDeque::with_capacity(capacity),
            capacity,
            precision,
        }
    }

    /// Key for `point` under this cache's precision
    pub fn key_for(&self, point: &GeoPoint) -> CoordinateKey {
        CoordinateKey::new(point, self.precision)
    }

    /// Cached value for the area containing `point`
    pub fn get(&self, point: &GeoPoint) -> Option<V> {
        self.entries.get(&self.key_for(point)).cloned()
    }

    /// Store a value, evicting the oldest entry if full
    pub fn insert(&mut self, point: &GeoPoint, value: V) {
        let key = self.key_for(point);
        if let Some(existing) = self.entries.get_mut(&key) {
            *existing = value;
            return;
        }

        if self.entries.len() >= self.capacity {
            if let Some(oldest) = self.order.pop_front() {
                self.entries.remove(&oldest);
                tracing::trace!(?oldest, "Evicted coordinate cache entry");
            }
        }

        self.order.push_back(key);
        self.entries.insert(key, value);
    }

    /// Number of cached areas
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing is cached
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncation_groups_nearby_points() {
        let a = GeoPoint::new(37.77491, -122.41941);
        let b = GeoPoint::new(37.77499, -122.41949);
        let c = GeoPoint::new(37.77501, -122.41941);

        assert_eq!(CoordinateKey::new(&a, 4), CoordinateKey::new(&b, 4));
        assert_ne!(CoordinateKey::new(&a, 4), CoordinateKey::new(&c, 4));
    }

    #[test]
    fn test_truncates_toward_zero() {
        let key = CoordinateKey::new(&GeoPoint::new(-1.29, 1.29), 1);
        assert_eq!(key, CoordinateKey { lat: -12, lng: 12 });
    }

    #[test]
    fn test_get_insert() {
        let mut cache = CoordinateCache::new(10, 3);
        let p = GeoPoint::new(10.0, 20.0);

        assert!(cache.get(&p).is_none());
        cache.insert(&p, 42);
        assert_eq!(cache.get(&p), Some(42));
        assert_eq!(cache.get(&GeoPoint::new(10.0004, 20.0004)), Some(42));
    }

    #[test]
    fn test_fifo_eviction_ignores_reads() {
        let mut cache = CoordinateCache::new(2, 0);
        let p1 = GeoPoint::new(1.0, 1.0);
        let p2 = GeoPoint::new(2.0, 2.0);
        let p3 = GeoPoint::new(3.0, 3.0);

        cache.insert(&p1, "one");
        cache.insert(&p2, "two");
        // A read does not refresh p1: this is FIFO, not LRU
        assert_eq!(cache.get(&p1), Some("one"));

        cache.insert(&p3, "three");
        assert_eq!(cache.len(), 2);
        assert!(cache.get(&p1).is_none());
        assert_eq!(cache.get(&p2), Some("two"));
        assert_eq!(cache.get(&p3), Some("three"));
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut cache = CoordinateCache::new(2, 0);
        let p1 = GeoPoint::new(1.0, 1.0);
        let p2 = GeoPoint::new(2.0, 2.0);

        cache.insert(&p1, 1);
        cache.insert(&p2, 2);
        cache.insert(&p1, 10);
        cache.insert(&GeoPoint::new(3.0, 3.0), 3);

        assert!(cache.get(&p1).is_none());
        assert_eq!(cache.get(&p2), Some(2));
    }

    #[test]
    fn test_clear() {
        let mut cache = CoordinateCache::new(2, 0);
        cache.insert(&GeoPoint::new(1.0, 1.0), 1);
        cache.clear();
        assert!(cache.is_empty());
    }
}
