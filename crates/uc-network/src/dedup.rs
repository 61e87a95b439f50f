//! Inbound de-duplication: the publisher callback fires at most once per
//! distinct `(group, hash)` within a 30-second window.

use std::collections::HashMap;
use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(30);

#[derive(Debug, Default)]
pub struct DedupCache {
    seen: HashMap<(String, String), Instant>,
}

impl DedupCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if this `(group, hash)` was not seen within the last
    /// 30 seconds (i.e. the caller should deliver it), recording it either
    /// way. Sweeps stale entries opportunistically so the map doesn't grow
    /// unbounded under steady inbound traffic.
    pub fn admit(&mut self, group: &str, hash: &str, now: Instant) -> bool {
        self.seen.retain(|_, seen_at| now.duration_since(*seen_at) < WINDOW);

        let key = (group.to_string(), hash.to_string());
        match self.seen.get(&key) {
            Some(seen_at) if now.duration_since(*seen_at) < WINDOW => false,
            _ => {
                self.seen.insert(key, now);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn admits_first_occurrence_and_rejects_within_window() {
        let mut cache = DedupCache::new();
        let t0 = Instant::now();
        assert!(cache.admit("g", "h1", t0));
        assert!(!cache.admit("g", "h1", t0 + Duration::from_secs(1)));
    }

    #[test]
    fn readmits_after_window_elapses() {
        let mut cache = DedupCache::new();
        let t0 = Instant::now();
        assert!(cache.admit("g", "h1", t0));
        assert!(cache.admit("g", "h1", t0 + Duration::from_secs(31)));
    }

    #[test]
    fn distinct_groups_are_independent() {
        let mut cache = DedupCache::new();
        let t0 = Instant::now();
        assert!(cache.admit("g1", "h1", t0));
        assert!(cache.admit("g2", "h1", t0));
    }
}
