//! Per-observer memo of computed visibility masks.
//!
//! An entry is reusable only while its observer stands on exactly the same
//! position it was computed for. Structural scene changes evict everything.
//! Eviction hands each mask to a release callback before it is dropped.

use crate::algorithms::boolean::VisibilityMask;
use crate::geometry::math::same_position;
use crate::model::{Observer, ObserverId, Point};
use std::collections::{HashMap, HashSet};

#[derive(Clone, Debug, PartialEq)]
pub struct CacheEntry {
    pub position: Point,
    pub mask: VisibilityMask,
}

#[derive(Debug, Default)]
pub struct ObserverCache {
    entries: HashMap<ObserverId, CacheEntry>,
}

impl ObserverCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &str) -> Option<&CacheEntry> {
        self.entries.get(id)
    }

    /// Stores `entry`, returning the one it supersedes.
    pub fn put(&mut self, id: ObserverId, entry: CacheEntry) -> Option<CacheEntry> {
        self.entries.insert(id, entry)
    }

    /// Cached mask of `observer` if it has not moved since it was stored.
    pub fn hit(&self, observer: &Observer) -> Option<&VisibilityMask> {
        self.entries
            .get(&observer.id)
            .filter(|e| same_position(e.position, observer.position))
            .map(|e| &e.mask)
    }

    pub fn invalidate_all<F>(&mut self, mut release: F) -> usize
    where
        F: FnMut(&ObserverId, VisibilityMask),
    {
        let n = self.entries.len();
        for (id, entry) in self.entries.drain() {
            release(&id, entry.mask);
        }
        n
    }

    pub fn invalidate_one<F>(&mut self, id: &str, release: F) -> bool
    where
        F: FnOnce(&ObserverId, VisibilityMask),
    {
        match self.entries.remove_entry(id) {
            Some((id, entry)) => {
                release(&id, entry.mask);
                true
            }
            None => false,
        }
    }

    /// Evicts entries whose observer is no longer in the scene.
    pub fn retain_observers<F>(&mut self, observers: &[Observer], mut release: F) -> usize
    where
        F: FnMut(&ObserverId, VisibilityMask),
    {
        let live: HashSet<&str> = observers.iter().map(|o| o.id.as_str()).collect();
        let stale: Vec<ObserverId> = self
            .entries
            .keys()
            .filter(|id| !live.contains(id.as_str()))
            .cloned()
            .collect();
        for id in &stale {
            self.invalidate_one(id, &mut release);
        }
        stale.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::boolean::Region;
    use crate::model::BoundingRect;

    fn mask() -> VisibilityMask {
        Region::from_rect(&BoundingRect { x: 0.0, y: 0.0, width: 10.0, height: 10.0 })
    }

    fn observer(id: &str, x: f64, y: f64) -> Observer {
        Observer { id: id.to_string(), position: Point::new(x, y), vision_radius: None }
    }

    #[test]
    fn hit_requires_exact_position() {
        let mut cache = ObserverCache::new();
        cache.put("a".into(), CacheEntry { position: Point::new(1.0, 2.0), mask: mask() });
        assert!(cache.hit(&observer("a", 1.0, 2.0)).is_some());
        assert!(cache.hit(&observer("a", 1.0, 2.000_001)).is_none());
        assert!(cache.hit(&observer("b", 1.0, 2.0)).is_none());
    }

    #[test]
    fn put_returns_superseded_entry() {
        let mut cache = ObserverCache::new();
        assert!(cache.put("a".into(), CacheEntry { position: Point::new(0.0, 0.0), mask: mask() }).is_none());
        let old = cache.put("a".into(), CacheEntry { position: Point::new(5.0, 5.0), mask: mask() });
        assert_eq!(old.map(|e| e.position), Some(Point::new(0.0, 0.0)));
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn invalidation_releases_every_mask() {
        let mut cache = ObserverCache::new();
        for id in ["a", "b", "c"] {
            cache.put(id.into(), CacheEntry { position: Point::new(0.0, 0.0), mask: mask() });
        }
        let mut released = Vec::new();
        assert!(cache.invalidate_one("b", |id, _| released.push(id.clone())));
        assert!(!cache.invalidate_one("b", |id, _| released.push(id.clone())));
        assert_eq!(cache.invalidate_all(|id, _| released.push(id.clone())), 2);
        released.sort();
        assert_eq!(released, vec!["a", "b", "c"]);
        assert!(cache.is_empty());
    }

    #[test]
    fn retain_drops_departed_observers() {
        let mut cache = ObserverCache::new();
        for id in ["a", "b"] {
            cache.put(id.into(), CacheEntry { position: Point::new(0.0, 0.0), mask: mask() });
        }
        let mut released = 0;
        let n = cache.retain_observers(&[observer("a", 0.0, 0.0)], |_, _| released += 1);
        assert_eq!((n, released), (1, 1));
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
    }
}
