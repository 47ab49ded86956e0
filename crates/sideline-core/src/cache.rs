//! In-memory TTL cache for resolved resources.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use regex::Regex;
use tokio::time::Instant;

use crate::ValidationError;

/// Defines how a fetch interacts with the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CacheMode {
    /// Read from the cache if a non-expired entry is present;
    /// otherwise, resolve upstream and write the result to the cache. (Default)
    #[default]
    Use,
    /// Always resolve upstream, bypassing any cached entry,
    /// and write the new result to the cache.
    Refresh,
    /// Always resolve upstream and do not read from or write to the cache.
    Bypass,
}

impl CacheMode {
    pub const fn reads(self) -> bool {
        matches!(self, Self::Use)
    }

    pub const fn writes(self) -> bool {
        !matches!(self, Self::Bypass)
    }
}

/// Key matcher for bulk invalidation.
#[derive(Debug, Clone)]
pub struct CachePattern {
    source: String,
    regex: Regex,
}

impl CachePattern {
    /// Compiles a glob where `*` matches any run of characters and `?` a single
    /// character. The whole key must match.
    pub fn glob(pattern: &str) -> Result<Self, ValidationError> {
        if pattern.is_empty() {
            return Err(ValidationError::EmptyPattern);
        }

        let mut expression = String::with_capacity(pattern.len() + 8);
        expression.push('^');
        let mut literal = [0_u8; 4];
        for ch in pattern.chars() {
            match ch {
                '*' => expression.push_str(".*"),
                '?' => expression.push('.'),
                other => expression.push_str(&regex::escape(other.encode_utf8(&mut literal))),
            }
        }
        expression.push('$');

        Self::compile(pattern, &expression)
    }

    /// Uses `pattern` as a regular expression, unanchored.
    pub fn regex(pattern: &str) -> Result<Self, ValidationError> {
        if pattern.is_empty() {
            return Err(ValidationError::EmptyPattern);
        }
        Self::compile(pattern, pattern)
    }

    fn compile(source: &str, expression: &str) -> Result<Self, ValidationError> {
        let regex = Regex::new(expression).map_err(|error| ValidationError::InvalidPattern {
            pattern: source.to_owned(),
            reason: error.to_string(),
        })?;
        Ok(Self {
            source: source.to_owned(),
            regex,
        })
    }

    pub fn matches(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }

    pub fn as_str(&self) -> &str {
        &self.source
    }
}

#[derive(Debug, Clone)]
struct CacheEntry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> CacheEntry<V> {
    fn is_fresh(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

#[derive(Debug)]
struct CacheInner<V> {
    map: HashMap<String, CacheEntry<V>>,
}

impl<V: Clone> CacheInner<V> {
    fn new() -> Self {
        Self {
            map: HashMap::new(),
        }
    }

    fn get(&self, key: &str, now: Instant) -> Option<V> {
        self.map
            .get(key)
            .filter(|entry| entry.is_fresh(now))
            .map(|entry| entry.value.clone())
    }

    fn set(&mut self, key: String, value: V, ttl: Duration, now: Instant) {
        self.map.insert(
            key,
            CacheEntry {
                value,
                stored_at: now,
                ttl,
            },
        );
    }

    fn invalidate(&mut self, pattern: &CachePattern) -> usize {
        let before = self.map.len();
        self.map.retain(|key, _| !pattern.matches(key));
        before - self.map.len()
    }

    fn clear_expired(&mut self, now: Instant) -> usize {
        let before = self.map.len();
        self.map.retain(|_, entry| entry.is_fresh(now));
        before - self.map.len()
    }
}

/// Thread-safe TTL cache shared by every aggregate branch.
///
/// Cloning yields another handle to the same store; construct one at startup
/// and hand clones to whoever needs it.
///
/// Expiry is lazy: an entry stored at `t` with `ttl` is returned while
/// `now < t + ttl` and never after, whether or not it has been swept.
#[derive(Debug)]
pub struct TtlCache<V> {
    inner: Arc<tokio::sync::RwLock<CacheInner<V>>>,
}

impl<V> Clone for TtlCache<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<V: Clone> Default for TtlCache<V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<V: Clone> TtlCache<V> {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(tokio::sync::RwLock::new(CacheInner::new())),
        }
    }

    /// Returns the cached value if present and not expired.
    pub async fn get(&self, key: &str) -> Option<V> {
        let store = self.inner.read().await;
        store.get(key, Instant::now())
    }

    /// Stores or replaces `key`, stamping it with the current instant.
    ///
    /// A zero `ttl` stores an entry that is already expired.
    pub async fn set(&self, key: impl Into<String>, value: V, ttl: Duration) {
        let mut store = self.inner.write().await;
        store.set(key.into(), value, ttl, Instant::now());
    }

    /// Removes every key matching `pattern` and returns how many were removed.
    pub async fn invalidate(&self, pattern: &CachePattern) -> usize {
        let mut store = self.inner.write().await;
        store.invalidate(pattern)
    }

    /// Glob convenience over [`TtlCache::invalidate`], e.g. `"nba_*"`.
    pub async fn invalidate_glob(&self, pattern: &str) -> Result<usize, ValidationError> {
        let pattern = CachePattern::glob(pattern)?;
        Ok(self.invalidate(&pattern).await)
    }

    /// Remove expired entries from the cache.
    pub async fn clear_expired(&self) -> usize {
        let mut store = self.inner.write().await;
        store.clear_expired(Instant::now())
    }

    /// Clear all entries from the cache.
    pub async fn clear(&self) {
        let mut store = self.inner.write().await;
        store.map.clear();
    }

    /// Get the number of entries in the cache (including expired entries).
    pub async fn len(&self) -> usize {
        let store = self.inner.read().await;
        store.map.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Keys currently stored, expired ones included, sorted.
    pub async fn keys(&self) -> Vec<String> {
        let store = self.inner.read().await;
        let mut keys = store.map.keys().cloned().collect::<Vec<_>>();
        keys.sort();
        keys
    }
}
