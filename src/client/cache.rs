//! Short-lived cache of GET envelopes, invalidated by path prefix after writes.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

use serde_json::Value;

pub const DEFAULT_TTL: Duration = Duration::from_secs(30);

#[derive(Debug)]
pub struct QueryCache {
    ttl: Duration,
    entries: Mutex<HashMap<String, (Instant, Value)>>,
}

impl Default for QueryCache {
    fn default() -> Self {
        Self::new(DEFAULT_TTL)
    }
}

/// `path` equals `prefix` or continues it with `/` or `?`.
fn under_prefix(path: &str, prefix: &str) -> bool {
    match path.strip_prefix(prefix) {
        Some(rest) => rest.is_empty() || rest.starts_with('/') || rest.starts_with('?'),
        None => false,
    }
}

impl QueryCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            entries: Mutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, HashMap<String, (Instant, Value)>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Cached value for `path` if still fresh.
    pub fn get(&self, path: &str) -> Option<Value> {
        let mut entries = self.entries();
        match entries.get(path) {
            Some((stored_at, value)) if stored_at.elapsed() < self.ttl => Some(value.clone()),
            Some(_) => {
                entries.remove(path);
                None
            }
            None => None,
        }
    }

    pub fn insert(&self, path: &str, value: Value) {
        self.entries().insert(path.to_string(), (Instant::now(), value));
    }

    /// Drop every entry at or below each prefix.
    pub fn invalidate(&self, prefixes: &[&str]) {
        self.entries()
            .retain(|path, _| !prefixes.iter().any(|prefix| under_prefix(path, prefix)));
    }

    pub fn clear(&self) {
        self.entries().clear();
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_fresh_and_stale() {
        let cache = QueryCache::default();
        cache.insert("/employees", json!({"n": 1}));
        assert_eq!(cache.get("/employees"), Some(json!({"n": 1})));
        assert_eq!(cache.get("/admins"), None);

        let expired = QueryCache::new(Duration::ZERO);
        expired.insert("/employees", json!(1));
        assert_eq!(expired.get("/employees"), None);
        assert!(expired.is_empty());
    }

    #[test]
    fn test_prefix_invalidation() {
        let cache = QueryCache::default();
        for path in [
            "/employees?limit=20&offset=0",
            "/employees/3",
            "/employees/3/attendance",
            "/employees/30",
            "/attendance/stats",
            "/stats/overview",
            "/admins",
        ] {
            cache.insert(path, json!(null));
        }

        cache.invalidate(&["/employees/3", "/attendance"]);
        assert!(cache.get("/employees/3").is_none());
        assert!(cache.get("/employees/3/attendance").is_none());
        assert!(cache.get("/attendance/stats").is_none());
        assert!(cache.get("/employees/30").is_some());
        assert!(cache.get("/employees?limit=20&offset=0").is_some());

        cache.invalidate(&["/employees"]);
        assert!(cache.get("/employees?limit=20&offset=0").is_none());
        assert!(cache.get("/employees/30").is_none());
        assert_eq!(cache.len(), 2);

        cache.clear();
        assert!(cache.is_empty());
    }
}
