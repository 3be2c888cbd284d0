use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Counters describing how a [`DecodeCache`] has been used.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Decodes answered from the cache.
    pub hits: u64,
    /// Lookups that found nothing.
    pub misses: u64,
    /// Entries stored.
    pub inserts: u64,
}

/// Memoizes successful numeric decodes, keyed by the encoded string.
///
/// A cache is shared between codecs (and threads) through an `Arc`.  Entries are never
/// invalidated: an encoded string always decodes to the same number.  With a capacity
/// set, the cache stops memoizing new strings once it is full and keeps serving the
/// entries it already holds.
///
/// # Examples
///
/// ```
/// use std::sync::Arc;
/// use b58id::{Codec, Config, DecodeCache};
///
/// let cache = Arc::new(DecodeCache::bounded(10_000));
/// let codec = Codec::with_cache(&Config::new(), cache.clone());
///
/// assert_eq!(codec.decode("MpBACvB"), 123);
/// assert_eq!(codec.decode("MpBACvB"), 123);
/// assert_eq!(cache.stats().hits, 1);
/// ```
#[derive(Debug, Default)]
pub struct DecodeCache {
    entries: Mutex<HashMap<String, u64>>,
    capacity: Option<usize>,
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
}

impl DecodeCache {
    /// Creates a cache without a size limit.
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Creates a cache holding at most `capacity` entries.
    pub fn bounded(capacity: usize) -> Self {
        DecodeCache {
            capacity: Some(capacity),
            ..Self::default()
        }
    }

    pub(crate) fn with_capacity(capacity: Option<usize>) -> Self {
        match capacity {
            Some(capacity) => Self::bounded(capacity),
            None => Self::unbounded(),
        }
    }

    /// Looks up a previously decoded string.
    pub fn get(&self, encoded: &str) -> Option<u64> {
        let found = self.lock().get(encoded).copied();
        let counter = if found.is_some() {
            &self.hits
        } else {
            &self.misses
        };
        counter.fetch_add(1, Ordering::Relaxed);
        found
    }

    /// Remembers the decoded value of `encoded`.  Returns `false` if the cache is full
    /// and the entry was not stored.
    pub fn insert(&self, encoded: &str, value: u64) -> bool {
        let mut entries = self.lock();
        if let Some(capacity) = self.capacity {
            if entries.len() >= capacity && !entries.contains_key(encoded) {
                return false;
            }
        }
        // Racing decoders of the same string store the same value.
        entries.insert(encoded.to_string(), value);
        self.inserts.fetch_add(1, Ordering::Relaxed);
        true
    }

    /// Drops all entries and resets the counters.
    pub fn clear(&self) {
        self.lock().clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        self.inserts.store(0, Ordering::Relaxed);
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> Option<usize> {
        self.capacity
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
        }
    }

    // A panic while holding the lock cannot leave the map half-updated, so a poisoned
    // lock is still usable.
    fn lock(&self) -> MutexGuard<'_, HashMap<String, u64>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
