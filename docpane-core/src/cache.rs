//! Memoization of compiled section output

use anyhow::Result;
use lru::LruCache;
use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::num::NonZeroUsize;

/// Hit/miss counters for a [`CompileCache`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub entries: usize,
    pub capacity: usize,
}

/// LRU cache of compiled output keyed by a caller-supplied key.
///
/// Entries may be evicted at any time; a miss just recompiles.
pub struct CompileCache<T> {
    cache: LruCache<String, T>,
    hits: u64,
    misses: u64,
}

impl<T: Clone> CompileCache<T> {
    /// Create a cache holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            cache: LruCache::new(capacity),
            hits: 0,
            misses: 0,
        }
    }

    /// Get cached output for `key` or compile and cache it.
    ///
    /// Failed compilations are not cached.
    pub fn get_or_compile<F>(&mut self, key: &str, compile: F) -> Result<T>
    where
        F: FnOnce() -> Result<T>,
    {
        if let Some(cached) = self.cache.get(key) {
            self.hits += 1;
            return Ok(cached.clone());
        }

        self.misses += 1;
        let compiled = compile()?;
        self.cache.put(key.to_string(), compiled.clone());
        Ok(compiled)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.cache.contains(key)
    }

    /// Drop all entries and reset counters
    pub fn clear(&mut self) {
        self.cache.clear();
        self.hits = 0;
        self.misses = 0;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            entries: self.cache.len(),
            capacity: self.cache.cap().get(),
        }
    }
}

/// Cache key for a section's source: `<scope>:<hash of source>`
pub fn cache_key(scope: &str, source: &str) -> String {
    let mut hasher = DefaultHasher::new();
    source.hash(&mut hasher);
    format!("{scope}:{:016x}", hasher.finish())
}
