//! Caching layer for schema inspection
//!
//! Schemas are pure functions of their type, so the cache only bounds how
//! often they are recomputed. Entries expire after a time-to-live and the least
//! recently used entry is evicted once capacity is reached.
//!
//! Copyright (c) 2025 Fieldwise Team
//! Licensed under the Apache-2.0 license

use super::descriptor::TypeDescriptor;
use super::inspector::{inspect, Schema};
use crate::config::SchemaCacheConfig;
use lru::LruCache;
use std::any::TypeId;
use std::fmt;
use std::num::NonZeroUsize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::{Duration, Instant};

/// Cache entry containing a schema and when it was computed
#[derive(Debug, Clone)]
struct CacheEntry {
    schema: Arc<Schema>,
    cached_at: Instant,
}

impl CacheEntry {
    fn new(schema: Arc<Schema>) -> Self {
        Self {
            schema,
            cached_at: Instant::now(),
        }
    }

    fn is_valid(&self, max_age: Option<Duration>) -> bool {
        match max_age {
            Some(max_age) => self.cached_at.elapsed() <= max_age,
            None => true,
        }
    }
}

/// Shared, bounded schema cache keyed by type
pub struct SchemaCache {
    entries: Option<Mutex<LruCache<TypeId, CacheEntry>>>,
    max_entries: usize,
    ttl: Option<Duration>,
    hits: AtomicU64,
    misses: AtomicU64,
    evictions: AtomicU64,
}

impl SchemaCache {
    /// Create a cache with default configuration
    pub fn new() -> Self {
        Self::with_config(&SchemaCacheConfig::default())
    }

    /// Create a cache with custom configuration
    ///
    /// A disabled cache, or one with zero capacity, recomputes every schema.
    pub fn with_config(config: &SchemaCacheConfig) -> Self {
        let entries = NonZeroUsize::new(config.max_entries)
            .filter(|_| config.enabled)
            .map(|capacity| Mutex::new(LruCache::new(capacity)));

        Self {
            entries,
            max_entries: config.max_entries,
            ttl: config.ttl(),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
            evictions: AtomicU64::new(0),
        }
    }

    /// Return the cached schema for `ty`, computing it on a miss
    ///
    /// Racing misses may both compute the schema; only the first inserted
    /// live entry is kept and returned to both callers.
    pub fn get_or_inspect(&self, ty: &TypeDescriptor) -> Arc<Schema> {
        let Some(entries) = &self.entries else {
            self.misses.fetch_add(1, Ordering::Relaxed);
            return Arc::new(inspect(ty));
        };

        let key = ty.id();
        if let Some(schema) = self.lookup(&mut lock(entries), key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            return schema;
        }

        self.misses.fetch_add(1, Ordering::Relaxed);
        tracing::debug!(type_name = ty.name(), "schema cache miss");

        // Inspection runs outside the lock; it may resolve other descriptors.
        let computed = Arc::new(inspect(ty));

        let mut guard = lock(entries);
        if let Some(existing) = self.lookup(&mut guard, key) {
            return existing;
        }
        if let Some((evicted, _)) = guard.push(key, CacheEntry::new(Arc::clone(&computed))) {
            if evicted != key {
                self.evictions.fetch_add(1, Ordering::Relaxed);
                tracing::debug!("evicted least recently used schema");
            }
        }

        computed
    }

    /// Drop the entry for `ty`, if cached
    pub fn invalidate(&self, ty: &TypeDescriptor) -> bool {
        self.entries
            .as_ref()
            .map(|entries| lock(entries).pop(&ty.id()).is_some())
            .unwrap_or(false)
    }

    /// Whether a live entry for `ty` is cached, without touching recency
    pub fn contains(&self, ty: &TypeDescriptor) -> bool {
        self.entries
            .as_ref()
            .and_then(|entries| {
                lock(entries)
                    .peek(&ty.id())
                    .map(|entry| entry.is_valid(self.ttl))
            })
            .unwrap_or(false)
    }

    /// Clear all cache entries
    pub fn clear(&self) {
        if let Some(entries) = &self.entries {
            lock(entries).clear();
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .as_ref()
            .map(|entries| lock(entries).len())
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get cache statistics
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.len(),
            max_entries: self.max_entries,
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            enabled: self.entries.is_some(),
        }
    }

    fn lookup(
        &self,
        entries: &mut LruCache<TypeId, CacheEntry>,
        key: TypeId,
    ) -> Option<Arc<Schema>> {
        let expired = match entries.get(&key) {
            Some(entry) if entry.is_valid(self.ttl) => return Some(Arc::clone(&entry.schema)),
            Some(_) => true,
            None => false,
        };

        if expired {
            entries.pop(&key);
            self.evictions.fetch_add(1, Ordering::Relaxed);
        }
        None
    }
}

impl Default for SchemaCache {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for SchemaCache {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaCache")
            .field("stats", &self.stats())
            .field("ttl", &self.ttl)
            .finish()
    }
}

// Entries are recomputable, so a poisoned lock is still safe to use.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Cache statistics for monitoring and debugging
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_entries: usize,
    pub max_entries: usize,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub enabled: bool,
}

impl CacheStats {
    /// Fraction of lookups served from the cache
    pub fn hit_ratio(&self) -> f64 {
        let lookups = self.hits + self.misses;
        if lookups == 0 {
            0.0
        } else {
            self.hits as f64 / lookups as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::descriptor::Described;

    struct Alpha;
    struct Beta;
    struct Gamma;

    impl Described for Alpha {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::record::<Self>().field::<String>("a").build()
        }
    }

    impl Described for Beta {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::record::<Self>().field::<String>("b").build()
        }
    }

    impl Described for Gamma {
        fn describe() -> TypeDescriptor {
            TypeDescriptor::record::<Self>().field::<String>("c").build()
        }
    }

    fn config(max_entries: usize, ttl_secs: Option<u64>) -> SchemaCacheConfig {
        SchemaCacheConfig {
            enabled: true,
            max_entries,
            ttl_secs,
        }
    }

    #[test]
    fn test_miss_then_hit() {
        let cache = SchemaCache::new();
        let ty = Alpha::describe();

        let first = cache.get_or_inspect(&ty);
        let second = cache.get_or_inspect(&ty);

        assert!(Arc::ptr_eq(&first, &second));
        assert!(first.contains("a"));

        let stats = cache.stats();
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.hit_ratio(), 0.5);
    }

    #[test]
    fn test_lru_eviction() {
        let cache = SchemaCache::with_config(&config(2, None));

        cache.get_or_inspect(&Alpha::describe());
        cache.get_or_inspect(&Beta::describe());
        // Touch Alpha so Beta becomes least recently used
        cache.get_or_inspect(&Alpha::describe());
        cache.get_or_inspect(&Gamma::describe());

        assert!(cache.contains(&Alpha::describe()));
        assert!(!cache.contains(&Beta::describe()));
        assert!(cache.contains(&Gamma::describe()));
        assert_eq!(cache.stats().evictions, 1);
    }

    #[test]
    fn test_expired_entries_are_recomputed() {
        let cache = SchemaCache::with_config(&config(10, Some(0)));
        let ty = Alpha::describe();

        let first = cache.get_or_inspect(&ty);
        std::thread::sleep(Duration::from_millis(5));
        let second = cache.get_or_inspect(&ty);

        assert!(!Arc::ptr_eq(&first, &second));
        assert_eq!(cache.stats().misses, 2);
    }

    #[test]
    fn test_disabled_cache() {
        let cache = SchemaCache::with_config(&SchemaCacheConfig {
            enabled: false,
            ..SchemaCacheConfig::default()
        });
        let ty = Alpha::describe();

        cache.get_or_inspect(&ty);
        cache.get_or_inspect(&ty);

        let stats = cache.stats();
        assert!(!stats.enabled);
        assert_eq!(stats.total_entries, 0);
        assert_eq!(stats.misses, 2);
        assert!(!cache.contains(&ty));
    }

    #[test]
    fn test_invalidate_and_clear() {
        let cache = SchemaCache::new();
        cache.get_or_inspect(&Alpha::describe());
        cache.get_or_inspect(&Beta::describe());

        assert!(cache.invalidate(&Alpha::describe()));
        assert!(!cache.invalidate(&Alpha::describe()));
        assert_eq!(cache.len(), 1);

        cache.clear();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_concurrent_misses_keep_one_entry() {
        let cache = SchemaCache::new();
        let ty = Alpha::describe();

        let schemas: Vec<Arc<Schema>> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| cache.get_or_inspect(&ty)))
                .collect();
            handles
                .into_iter()
                .map(|handle| handle.join().expect("worker panicked"))
                .collect()
        });

        assert_eq!(cache.len(), 1);
        let cached = cache.get_or_inspect(&ty);
        assert!(schemas.iter().all(|schema| schema.contains("a")));
        assert!(schemas.iter().any(|schema| Arc::ptr_eq(schema, &cached)));
    }
}
