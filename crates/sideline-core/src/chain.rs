//! Ordered fallback over the sources registered for one logical resource.
//!
//! ```text
//! Pending ──start──▶ Trying(0) ──fail──▶ Trying(1) ──fail──▶ ... ──▶ Mocked
//!                        │                   │                      (or Exhausted
//!                        └──────ok───────────┴──▶ Succeeded          without a mock)
//! ```

use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::mock::MockProvider;
use crate::source::{FetchError, SourceClient, SourceDescriptor};
use crate::{CoreError, Payload, ResourceKey, UtcDateTime};

/// Position of a chain walk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Pending,
    /// Attempting the source at this index.
    Trying(usize),
    Succeeded,
    Mocked,
    /// Every source failed and no mock is configured.
    Exhausted,
}

impl ChainState {
    pub const fn start(self, source_count: usize, has_mock: bool) -> Self {
        match self {
            Self::Pending => Self::advance(0, source_count, has_mock),
            other => other,
        }
    }

    pub const fn on_success(self) -> Self {
        match self {
            Self::Trying(_) => Self::Succeeded,
            other => other,
        }
    }

    pub const fn on_failure(self, source_count: usize, has_mock: bool) -> Self {
        match self {
            Self::Trying(index) => Self::advance(index + 1, source_count, has_mock),
            other => other,
        }
    }

    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Succeeded | Self::Mocked | Self::Exhausted)
    }

    const fn advance(next: usize, source_count: usize, has_mock: bool) -> Self {
        if next < source_count {
            Self::Trying(next)
        } else if has_mock {
            Self::Mocked
        } else {
            Self::Exhausted
        }
    }
}

/// One failed attempt, kept on the result for diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceFailure {
    pub source: String,
    pub code: String,
    pub message: String,
}

impl SourceFailure {
    pub fn new(source: impl Into<String>, error: &FetchError) -> Self {
        Self {
            source: source.into(),
            code: error.code().to_owned(),
            message: error.message().to_owned(),
        }
    }
}

/// A resolved resource plus its provenance.
///
/// `degraded` is true exactly when the payload came from a [`MockProvider`];
/// the constructors are the only way to build one, so that cannot drift.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FetchResult {
    payload: Payload,
    source: String,
    is_real_data: bool,
    fetched_at: UtcDateTime,
    degraded: bool,
    cache_hit: bool,
    placeholder: bool,
    latency_ms: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    failures: Vec<SourceFailure>,
}

impl FetchResult {
    /// Payload served by a real upstream.
    pub fn live(
        payload: Payload,
        source: impl Into<String>,
        failures: Vec<SourceFailure>,
        latency_ms: u64,
    ) -> Self {
        Self {
            payload,
            source: source.into(),
            is_real_data: true,
            fetched_at: UtcDateTime::now(),
            degraded: false,
            cache_hit: false,
            placeholder: false,
            latency_ms,
            failures,
        }
    }

    /// Terminal fallback after every real source failed.
    pub fn mocked(payload: Payload, failures: Vec<SourceFailure>, latency_ms: u64) -> Self {
        Self {
            payload,
            source: String::from(MockProvider::SOURCE_NAME),
            is_real_data: false,
            fetched_at: UtcDateTime::now(),
            degraded: true,
            cache_hit: false,
            placeholder: false,
            latency_ms,
            failures,
        }
    }

    /// Mock payload shown before any source has been tried.
    pub fn placeholder(payload: Payload) -> Self {
        Self {
            placeholder: true,
            ..Self::mocked(payload, Vec::new(), 0)
        }
    }

    /// Marks a result served from the cache.
    pub fn with_cache_hit(mut self) -> Self {
        self.cache_hit = true;
        self
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    pub fn into_payload(self) -> Payload {
        self.payload
    }

    pub fn source_name(&self) -> &str {
        &self.source
    }

    pub const fn is_real_data(&self) -> bool {
        self.is_real_data
    }

    pub const fn fetched_at(&self) -> UtcDateTime {
        self.fetched_at
    }

    pub const fn degraded(&self) -> bool {
        self.degraded
    }

    pub const fn cache_hit(&self) -> bool {
        self.cache_hit
    }

    pub const fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    pub const fn latency_ms(&self) -> u64 {
        self.latency_ms
    }

    pub fn failures(&self) -> &[SourceFailure] {
        &self.failures
    }
}

/// Sources for one logical resource, walked in ascending priority.
#[derive(Clone)]
pub struct FallbackChain {
    resource: String,
    sources: Vec<Arc<dyn SourceClient>>,
    mock: Option<MockProvider>,
}

impl Debug for FallbackChain {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FallbackChain")
            .field("resource", &self.resource)
            .field(
                "sources",
                &self.sources.iter().map(|s| s.name()).collect::<Vec<_>>(),
            )
            .field("has_mock", &self.mock.is_some())
            .finish()
    }
}

impl FallbackChain {
    /// Sorts `sources` by priority once; equal priorities keep their given order.
    pub fn new(resource: impl Into<String>, mut sources: Vec<Arc<dyn SourceClient>>) -> Self {
        sources.sort_by_key(|source| source.descriptor().priority);
        Self {
            resource: resource.into(),
            sources,
            mock: None,
        }
    }

    pub fn with_mock(mut self, mock: MockProvider) -> Self {
        self.mock = Some(mock);
        self
    }

    pub fn resource(&self) -> &str {
        &self.resource
    }

    pub fn sources(&self) -> &[Arc<dyn SourceClient>] {
        &self.sources
    }

    pub fn descriptors(&self) -> Vec<&SourceDescriptor> {
        self.sources.iter().map(|source| source.descriptor()).collect()
    }

    pub fn mock(&self) -> Option<&MockProvider> {
        self.mock.as_ref()
    }

    pub fn has_mock(&self) -> bool {
        self.mock.is_some()
    }

    /// Walks the chain until a source succeeds.
    ///
    /// Never fails while a mock is configured. Without one, an exhausted chain
    /// is a [`CoreError::Configuration`].
    pub async fn resolve(&self, key: &ResourceKey) -> Result<FetchResult, CoreError> {
        let started = Instant::now();
        let count = self.sources.len();
        let has_mock = self.has_mock();
        let mut failures = Vec::new();
        let mut state = ChainState::Pending.start(count, has_mock);

        loop {
            match state {
                ChainState::Trying(index) => {
                    let Some(source) = self.sources.get(index) else {
                        state = state.on_failure(count, has_mock);
                        continue;
                    };
                    debug!(
                        resource = %key,
                        source = source.name(),
                        attempt = index + 1,
                        of = count,
                        "trying source"
                    );

                    match source.fetch(key).await {
                        Ok(payload) => {
                            state = state.on_success();
                            debug!(
                                resource = %key,
                                source = source.name(),
                                items = payload.len(),
                                ?state,
                                "source succeeded"
                            );
                            return Ok(FetchResult::live(
                                payload,
                                source.name(),
                                failures,
                                elapsed_ms(started),
                            ));
                        }
                        Err(error) => {
                            warn!(
                                resource = %key,
                                source = source.name(),
                                code = error.code(),
                                error = error.message(),
                                "source failed"
                            );
                            failures.push(SourceFailure::new(source.name(), &error));
                            state = state.on_failure(count, has_mock);
                        }
                    }
                }
                ChainState::Mocked => {
                    let Some(mock) = &self.mock else {
                        return Err(CoreError::configuration(self.resource.as_str()));
                    };
                    info!(
                        resource = %key,
                        failed_sources = failures.len(),
                        "all sources failed, serving mock data"
                    );
                    let mut payload = mock.resolve();
                    if let Some(limit) = key.limit {
                        payload.truncate(limit);
                    }
                    return Ok(FetchResult::mocked(payload, failures, elapsed_ms(started)));
                }
                ChainState::Pending | ChainState::Succeeded | ChainState::Exhausted => {
                    warn!(resource = %key, "chain exhausted without a mock");
                    return Err(CoreError::configuration(self.resource.as_str()));
                }
            }
        }
    }
}

/// Whole milliseconds, saturating at `u64::MAX`.
pub(crate) fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

pub(crate) fn elapsed_ms(started: Instant) -> u64 {
    duration_ms(started.elapsed())
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::source::{FetchFuture, ReliabilityClass};
    use crate::{ResourceKind, Sport, Team};

    struct Scripted {
        descriptor: SourceDescriptor,
        outcome: Result<Payload, FetchError>,
        calls: AtomicUsize,
    }

    impl Scripted {
        fn new(name: &str, priority: u32, outcome: Result<Payload, FetchError>) -> Arc<Self> {
            Arc::new(Self {
                descriptor: SourceDescriptor::new(
                    name,
                    priority,
                    ReliabilityClass::Secondary,
                    Duration::from_secs(1),
                ),
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    impl SourceClient for Scripted {
        fn descriptor(&self) -> &SourceDescriptor {
            &self.descriptor
        }

        fn supports(&self, _kind: ResourceKind) -> bool {
            true
        }

        fn fetch<'a>(&'a self, _key: &'a ResourceKey) -> FetchFuture<'a> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let outcome = self.outcome.clone();
            Box::pin(async move { outcome })
        }
    }

    fn teams(names: &[&str]) -> Payload {
        Payload::Teams(
            names
                .iter()
                .map(|name| Team {
                    id: (*name).to_owned(),
                    name: (*name).to_owned(),
                    abbreviation: String::new(),
                    city: String::new(),
                    conference: String::new(),
                })
                .collect(),
        )
    }

    fn key() -> ResourceKey {
        ResourceKey::for_sport(ResourceKind::Teams, Sport::Nba)
    }

    #[test]
    fn state_machine_walks_sources_then_mock() {
        let state = ChainState::Pending.start(2, true);
        assert_eq!(state, ChainState::Trying(0));

        let state = state.on_failure(2, true);
        assert_eq!(state, ChainState::Trying(1));
        assert_eq!(state.on_success(), ChainState::Succeeded);

        let state = state.on_failure(2, true);
        assert_eq!(state, ChainState::Mocked);
        assert!(state.is_terminal());
        assert_eq!(state.on_failure(2, true), ChainState::Mocked);
    }

    #[test]
    fn state_machine_without_mock_exhausts() {
        assert_eq!(ChainState::Pending.start(0, false), ChainState::Exhausted);
        assert_eq!(ChainState::Pending.start(0, true), ChainState::Mocked);
        assert_eq!(
            ChainState::Trying(0).on_failure(1, false),
            ChainState::Exhausted
        );
    }

    #[tokio::test]
    async fn stops_at_first_success_in_priority_order() {
        let tertiary = Scripted::new("tertiary", 20, Ok(teams(&["c"])));
        let primary = Scripted::new("primary", 0, Err(FetchError::http(500)));
        let secondary = Scripted::new("secondary", 10, Ok(teams(&["b"])));

        let sources: Vec<Arc<dyn SourceClient>> =
            vec![tertiary.clone(), primary.clone(), secondary.clone()];
        let chain = FallbackChain::new("nba_teams", sources);
        let result = chain.resolve(&key()).await.expect("resolves");

        assert_eq!(result.source_name(), "secondary");
        assert!(result.is_real_data());
        assert!(!result.degraded());
        assert_eq!(result.failures().len(), 1);
        assert_eq!(result.failures()[0].code, "source.http_error");
        assert_eq!(primary.calls.load(Ordering::SeqCst), 1);
        assert_eq!(tertiary.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn equal_priorities_keep_registration_order() {
        let first = Scripted::new("sportsdata", 10, Ok(teams(&[])));
        let second = Scripted::new("odds_api", 10, Ok(teams(&[])));
        let sources: Vec<Arc<dyn SourceClient>> = vec![first, second];
        let chain = FallbackChain::new("nba_teams", sources);

        let names = chain
            .descriptors()
            .into_iter()
            .map(|descriptor| descriptor.name.as_str())
            .collect::<Vec<_>>();
        assert_eq!(names, ["sportsdata", "odds_api"]);
    }

    #[tokio::test]
    async fn mock_is_served_after_every_source_fails() {
        let chain = FallbackChain::new(
            "nba_teams",
            vec![
                Scripted::new("a", 0, Err(FetchError::parse("bad body")))
                    as Arc<dyn SourceClient>,
                Scripted::new("b", 1, Err(FetchError::timeout(Duration::from_secs(5)))),
            ],
        )
        .with_mock(MockProvider::new(teams(&["x", "y", "z"])));

        let key = key().with_limit(2).expect("non-zero");
        let result = chain.resolve(&key).await.expect("mock never fails");

        assert_eq!(result.source_name(), "mock");
        assert!(result.degraded());
        assert!(!result.is_real_data());
        assert!(!result.is_placeholder());
        assert_eq!(result.payload().len(), 2);
        assert_eq!(result.failures().len(), 2);
    }

    #[tokio::test]
    async fn exhausted_chain_without_mock_is_a_configuration_error() {
        let chain = FallbackChain::new(
            "nba_teams",
            vec![Scripted::new("a", 0, Err(FetchError::http(404))) as Arc<dyn SourceClient>],
        );

        let error = chain.resolve(&key()).await.expect_err("no mock");
        assert!(matches!(error, CoreError::Configuration { ref resource } if resource == "nba_teams"));
    }

    #[test]
    fn placeholder_is_degraded_mock_data() {
        let result = FetchResult::placeholder(teams(&["a"]));
        assert!(result.is_placeholder());
        assert!(result.degraded());
        assert_eq!(result.source_name(), MockProvider::SOURCE_NAME);

        let hit = result.with_cache_hit();
        assert!(hit.cache_hit());
        assert!(hit.is_placeholder());
    }

    #[test]
    fn durations_beyond_u64_millis_saturate() {
        assert_eq!(duration_ms(Duration::from_millis(1_500)), 1_500);
        assert_eq!(duration_ms(Duration::MAX), u64::MAX);
    }
}
