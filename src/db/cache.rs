use std::collections::HashMap;
use std::time::{Duration, Instant};

use crate::models::profile::Profile;

struct Snapshot<T> {
    loaded_at: Instant,
    records: Vec<T>,
}

/// Read-through snapshots of one table, keyed by profile.
///
/// A snapshot older than `ttl` is treated as missing. A zero TTL disables
/// caching entirely.
pub struct SnapshotCache<T> {
    ttl: Duration,
    entries: HashMap<Profile, Snapshot<T>>,
}

impl<T: Clone> SnapshotCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: HashMap::new(),
        }
    }

    pub fn get(&self, profile: Profile) -> Option<Vec<T>> {
        let snapshot = self.entries.get(&profile)?;
        if snapshot.loaded_at.elapsed() < self.ttl {
            Some(snapshot.records.clone())
        } else {
            None
        }
    }

    pub fn put(&mut self, profile: Profile, records: Vec<T>) {
        if self.ttl.is_zero() {
            return;
        }
        self.entries.insert(
            profile,
            Snapshot {
                loaded_at: Instant::now(),
                records,
            },
        );
    }

    pub fn invalidate(&mut self, profile: Profile) {
        self.entries.remove(&profile);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_put_then_get() {
        let mut cache = SnapshotCache::new(Duration::from_secs(30));
        cache.put(Profile::Bride, vec![1, 2, 3]);
        assert_eq!(cache.get(Profile::Bride), Some(vec![1, 2, 3]));
        assert_eq!(cache.get(Profile::Groom), None);
    }

    #[test]
    fn test_invalidate_drops_only_that_profile() {
        let mut cache = SnapshotCache::new(Duration::from_secs(30));
        cache.put(Profile::Bride, vec![1]);
        cache.put(Profile::Groom, vec![2]);
        cache.invalidate(Profile::Bride);
        assert_eq!(cache.get(Profile::Bride), None);
        assert_eq!(cache.get(Profile::Groom), Some(vec![2]));
    }

    #[test]
    fn test_zero_ttl_never_caches() {
        let mut cache = SnapshotCache::new(Duration::ZERO);
        cache.put(Profile::Bride, vec![1]);
        assert_eq!(cache.get(Profile::Bride), None);
    }

    #[test]
    fn test_expired_snapshot_is_ignored() {
        let mut cache = SnapshotCache::new(Duration::from_millis(5));
        cache.put(Profile::Groom, vec![7]);
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(cache.get(Profile::Groom), None);
    }
}
