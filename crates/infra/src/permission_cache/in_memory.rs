use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

use stockroom_auth::{CacheError, PermissionCache, PermissionSet, SubjectId};
use stockroom_auth::cache::cache_key;

#[derive(Debug, Clone)]
struct Entry {
    permissions: PermissionSet,
    expires_at: Instant,
}

/// Process-local permission cache.
///
/// Expired entries are treated as absent and dropped lazily on the next write.
#[derive(Debug)]
pub struct InMemoryPermissionCache {
    ttl: Duration,
    inner: RwLock<HashMap<String, Entry>>,
}

impl InMemoryPermissionCache {
    pub fn new(ttl: Duration) -> Self {
        Self {
            ttl,
            inner: RwLock::new(HashMap::new()),
        }
    }
}

impl Default for InMemoryPermissionCache {
    fn default() -> Self {
        Self::new(stockroom_auth::DEFAULT_PERMISSION_CACHE_TTL)
    }
}

fn poisoned() -> CacheError {
    CacheError::Unavailable("permission cache lock poisoned".to_string())
}

impl PermissionCache for InMemoryPermissionCache {
    fn get(&self, subject: &SubjectId) -> Result<Option<PermissionSet>, CacheError> {
        let map = self.inner.read().map_err(|_| poisoned())?;
        let now = Instant::now();
        Ok(map
            .get(&cache_key(subject))
            .filter(|e| e.expires_at > now)
            .map(|e| e.permissions.clone()))
    }

    fn put(&self, subject: &SubjectId, permissions: &PermissionSet) -> Result<(), CacheError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        let now = Instant::now();
        map.retain(|_, e| e.expires_at > now);
        map.insert(
            cache_key(subject),
            Entry {
                permissions: permissions.clone(),
                expires_at: now + self.ttl,
            },
        );
        Ok(())
    }

    fn invalidate(&self, subject: &SubjectId) -> Result<(), CacheError> {
        let mut map = self.inner.write().map_err(|_| poisoned())?;
        map.remove(&cache_key(subject));
        Ok(())
    }

    fn ttl(&self) -> Duration {
        self.ttl
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn perms(names: &[&'static str]) -> PermissionSet {
        names.iter().copied().collect()
    }

    #[test]
    fn put_then_get_returns_the_set() {
        let cache = InMemoryPermissionCache::default();
        let subject = SubjectId::Number(42);

        assert_eq!(cache.get(&subject).unwrap(), None);
        cache.put(&subject, &perms(&["view order"])).unwrap();
        assert_eq!(cache.get(&subject).unwrap(), Some(perms(&["view order"])));
        assert_eq!(cache.ttl(), Duration::from_secs(3600));
    }

    #[test]
    fn invalidate_drops_only_that_subject() {
        let cache = InMemoryPermissionCache::default();
        let a = SubjectId::Number(1);
        let b = SubjectId::Text("svc-reporting".to_string());
        cache.put(&a, &perms(&["view order"])).unwrap();
        cache.put(&b, &perms(&["view report"])).unwrap();

        cache.invalidate(&a).unwrap();
        assert_eq!(cache.get(&a).unwrap(), None);
        assert_eq!(cache.get(&b).unwrap(), Some(perms(&["view report"])));

        // absent entry is a no-op
        cache.invalidate(&a).unwrap();
    }

    #[test]
    fn zero_ttl_entries_are_never_served() {
        let cache = InMemoryPermissionCache::new(Duration::ZERO);
        let subject = SubjectId::Number(7);
        cache.put(&subject, &perms(&["create order"])).unwrap();
        assert_eq!(cache.get(&subject).unwrap(), None);
    }
}
