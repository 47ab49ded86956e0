//! Cache-first fan-out over the registered fallback chains.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use futures_util::future::join_all;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};

use crate::cache::{CacheMode, TtlCache};
use crate::chain::{duration_ms, elapsed_ms, FallbackChain, FetchResult};
use crate::config::TtlPolicy;
use crate::{CoreError, ResourceId, ResourceKey, ValidationError};

/// Outcome of one [`Aggregator::aggregate`] call.
///
/// Every distinct requested key has exactly one entry.
#[derive(Debug)]
pub struct AggregateResult {
    results: HashMap<ResourceKey, Result<FetchResult, CoreError>>,
    partial_failure: bool,
    latency_ms: u64,
}

impl AggregateResult {
    pub fn new(results: HashMap<ResourceKey, Result<FetchResult, CoreError>>, latency_ms: u64) -> Self {
        let partial_failure = results
            .values()
            .any(|result| result.as_ref().map_or(true, FetchResult::degraded));
        Self {
            results,
            partial_failure,
            latency_ms,
        }
    }

    /// True iff at least one entry is degraded or an error.
    pub const fn partial_failure(&self) -> bool {
        self.partial_failure
    }

    pub const fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn get(&self, key: &ResourceKey) -> Option<&Result<FetchResult, CoreError>> {
        self.results.get(key)
    }

    pub fn results(&self) -> &HashMap<ResourceKey, Result<FetchResult, CoreError>> {
        &self.results
    }

    /// Entries in key order, for stable output.
    pub fn sorted(&self) -> Vec<(&ResourceKey, &Result<FetchResult, CoreError>)> {
        let mut entries = self.results.iter().collect::<Vec<_>>();
        entries.sort_by(|left, right| left.0.cmp(right.0));
        entries
    }

    pub fn into_results(self) -> HashMap<ResourceKey, Result<FetchResult, CoreError>> {
        self.results
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }
}

/// Placeholder now, real data later.
#[derive(Debug)]
pub struct OptimisticFetch {
    pub placeholder: FetchResult,
    resource: String,
    live: JoinHandle<Result<FetchResult, CoreError>>,
}

impl OptimisticFetch {
    /// Waits for the background resolve.
    pub async fn resolved(self) -> Result<FetchResult, CoreError> {
        match self.live.await {
            Ok(result) => result,
            Err(error) => Err(CoreError::Join {
                resource: self.resource,
                message: error.to_string(),
            }),
        }
    }

    pub fn is_finished(&self) -> bool {
        self.live.is_finished()
    }
}

/// Entry point for callers: consults the cache, then the resource's chain.
///
/// Cloning is cheap and every clone shares the same cache and chains.
#[derive(Debug, Clone)]
pub struct Aggregator {
    cache: TtlCache<FetchResult>,
    chains: Arc<HashMap<ResourceId, FallbackChain>>,
    ttl: TtlPolicy,
}

impl Aggregator {
    pub fn new(
        chains: impl IntoIterator<Item = (ResourceId, FallbackChain)>,
        cache: TtlCache<FetchResult>,
        ttl: TtlPolicy,
    ) -> Self {
        Self {
            cache,
            chains: Arc::new(chains.into_iter().collect()),
            ttl,
        }
    }

    pub fn cache(&self) -> &TtlCache<FetchResult> {
        &self.cache
    }

    pub const fn ttl_policy(&self) -> &TtlPolicy {
        &self.ttl
    }

    pub fn chain(&self, resource: ResourceId) -> Option<&FallbackChain> {
        self.chains.get(&resource)
    }

    /// Registered chains ordered by resource.
    pub fn chains(&self) -> Vec<(ResourceId, &FallbackChain)> {
        let mut chains = self
            .chains
            .iter()
            .map(|(resource, chain)| (*resource, chain))
            .collect::<Vec<_>>();
        chains.sort_by_key(|(resource, _)| *resource);
        chains
    }

    fn chain_for(&self, key: &ResourceKey) -> Result<&FallbackChain, CoreError> {
        let resource = key.resource_id();
        self.chains
            .get(&resource)
            .ok_or_else(|| CoreError::configuration(resource.to_string()))
    }

    /// Resolves one resource, honoring `mode` for cache reads and writes.
    pub async fn fetch(&self, key: &ResourceKey, mode: CacheMode) -> Result<FetchResult, CoreError> {
        let cache_key = key.cache_key();

        if mode.reads() {
            if let Some(cached) = self.cache.get(&cache_key).await {
                debug!(resource = %cache_key, source = cached.source_name(), "cache hit");
                return Ok(cached.with_cache_hit());
            }
        }

        let result = self.chain_for(key)?.resolve(key).await?;

        if mode.writes() {
            let ttl = self.ttl.for_result(key.kind, result.degraded());
            debug!(resource = %cache_key, ttl_ms = duration_ms(ttl), "caching result");
            self.cache.set(cache_key, result.clone(), ttl).await;
        }
        Ok(result)
    }

    /// Resolves every distinct key concurrently and waits for all of them.
    pub async fn aggregate(&self, keys: impl IntoIterator<Item = ResourceKey>) -> AggregateResult {
        self.aggregate_with_mode(keys, CacheMode::Use).await
    }

    pub async fn aggregate_with_mode(
        &self,
        keys: impl IntoIterator<Item = ResourceKey>,
        mode: CacheMode,
    ) -> AggregateResult {
        let started = Instant::now();

        let mut seen = HashSet::new();
        let unique = keys
            .into_iter()
            .filter(|key| seen.insert(key.clone()))
            .collect::<Vec<_>>();

        let outcomes = join_all(unique.iter().map(|key| self.fetch(key, mode))).await;
        let aggregate = AggregateResult::new(
            unique.into_iter().zip(outcomes).collect(),
            elapsed_ms(started),
        );

        debug!(
            resources = aggregate.len(),
            partial_failure = aggregate.partial_failure(),
            latency_ms = aggregate.latency_ms(),
            "aggregate complete"
        );
        aggregate
    }

    /// The resource's mock payload, tagged as a placeholder. Touches neither
    /// the cache nor any source.
    pub fn placeholder(&self, key: &ResourceKey) -> Result<FetchResult, CoreError> {
        let chain = self.chain_for(key)?;
        let mock = chain
            .mock()
            .ok_or_else(|| CoreError::configuration(chain.resource()))?;

        let mut payload = mock.resolve();
        if let Some(limit) = key.limit {
            payload.truncate(limit);
        }
        Ok(FetchResult::placeholder(payload))
    }

    /// Returns a placeholder immediately and resolves the real chain on a
    /// background task.
    ///
    /// Must be called from within a tokio runtime.
    pub fn fetch_optimistic(&self, key: ResourceKey) -> Result<OptimisticFetch, CoreError> {
        let placeholder = self.placeholder(&key)?;
        let resource = key.cache_key();
        let aggregator = self.clone();
        let live = tokio::spawn(async move { aggregator.fetch(&key, CacheMode::Use).await });

        Ok(OptimisticFetch {
            placeholder,
            resource,
            live,
        })
    }

    /// Drops cached entries whose key matches `pattern`, e.g. `"nba_*"`.
    pub async fn invalidate(&self, pattern: &str) -> Result<usize, ValidationError> {
        let removed = self.cache.invalidate_glob(pattern).await?;
        info!(pattern, removed, "cache invalidated");
        Ok(removed)
    }
}
