//! Default wiring from configuration to fallback chains.
//!
//! [`AggregatorBuilder`] reads endpoints and vendor keys (usually from the
//! environment) and registers one chain per [`default_resources`] entry,
//! ordered backend, keyed vendors, ESPN, then the mock.

use std::env;
use std::fmt::{Debug, Formatter};
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::aggregator::Aggregator;
use crate::cache::TtlCache;
use crate::chain::{FallbackChain, FetchResult};
use crate::config::{QuotaPolicy, SourceTimeouts, TtlPolicy};
use crate::http_client::{HttpAuth, HttpClient, ReqwestHttpClient};
use crate::mock::MockProvider;
use crate::providers::{
    odds_api, sportsdata, BackendUpstream, EspnUpstream, OddsApiUpstream, SportsDataUpstream,
};
use crate::source::{HttpSource, ReliabilityClass, SourceClient, SourceDescriptor};
use crate::throttling::QuotaGuard;
use crate::{ResourceId, ResourceKind, Sport};

/// Every logical resource the default registry wires a chain for: each kind
/// per league, plus league-wide news.
pub fn default_resources() -> Vec<ResourceId> {
    let mut resources = ResourceKind::ALL
        .into_iter()
        .flat_map(|kind| {
            Sport::ALL
                .into_iter()
                .map(move |sport| ResourceId::new(kind, Some(sport)))
        })
        .collect::<Vec<_>>();
    resources.push(ResourceId::new(ResourceKind::News, None));
    resources
}

/// Builder for an [`Aggregator`] with the default upstream chains.
///
/// Upstreams are enabled by configuration: the backend by its URL, the
/// metered vendors by their keys. ESPN needs no key and is on unless
/// disabled. Every chain ends in a [`MockProvider`].
///
/// # Environment Variables
///
/// | Setting | Primary Env Var | Fallback Env Var |
/// |---------|----------------|------------------|
/// | Backend URL | `SIDELINE_BACKEND_URL` | - |
/// | Backend token | `SIDELINE_BACKEND_TOKEN` | - |
/// | SportsDataIO | `SIDELINE_SPORTSDATA_API_KEY` | `SPORTSDATA_API_KEY` |
/// | The Odds API | `SIDELINE_ODDS_API_KEY` | `ODDS_API_KEY` |
/// | ESPN | `SIDELINE_DISABLE_ESPN` to turn off | - |
///
/// # Example
///
/// ```rust,ignore
/// use sideline_core::AggregatorBuilder;
///
/// // Real upstreams, keys from the environment
/// let aggregator = AggregatorBuilder::from_env().build();
///
/// // Canned data only
/// let offline = AggregatorBuilder::new().with_mock_mode().build();
/// ```
pub struct AggregatorBuilder {
    use_mock: bool,
    backend_url: Option<String>,
    backend_token: Option<String>,
    sportsdata_api_key: Option<String>,
    sportsdata_base_url: Option<String>,
    odds_api_key: Option<String>,
    odds_api_base_url: Option<String>,
    enable_espn: bool,
    espn_base_url: Option<String>,
    http_client: Option<Arc<dyn HttpClient>>,
    cache: Option<TtlCache<FetchResult>>,
    ttl: TtlPolicy,
    timeouts: SourceTimeouts,
    sportsdata_quota: QuotaPolicy,
    odds_api_quota: QuotaPolicy,
    custom_chains: Vec<(ResourceId, FallbackChain)>,
}

impl Debug for AggregatorBuilder {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AggregatorBuilder")
            .field("use_mock", &self.use_mock)
            .field("backend_url", &self.backend_url)
            .field("backend_token", &self.backend_token.as_ref().map(|_| "<redacted>"))
            .field("sportsdata", &self.sportsdata_api_key.is_some())
            .field("odds_api", &self.odds_api_key.is_some())
            .field("enable_espn", &self.enable_espn)
            .field("ttl", &self.ttl)
            .field("timeouts", &self.timeouts)
            .field("custom_chains", &self.custom_chains.len())
            .finish_non_exhaustive()
    }
}

impl Default for AggregatorBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl AggregatorBuilder {
    pub fn new() -> Self {
        Self {
            use_mock: false,
            backend_url: None,
            backend_token: None,
            sportsdata_api_key: None,
            sportsdata_base_url: None,
            odds_api_key: None,
            odds_api_base_url: None,
            enable_espn: true,
            espn_base_url: None,
            http_client: None,
            cache: None,
            ttl: TtlPolicy::default(),
            timeouts: SourceTimeouts::default(),
            sportsdata_quota: QuotaPolicy::sportsdata_default(),
            odds_api_quota: QuotaPolicy::odds_api_default(),
            custom_chains: Vec::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new().with_env_keys()
    }

    /// Reads URLs and keys from the environment. Unset variables leave the
    /// current value untouched.
    pub fn with_env_keys(mut self) -> Self {
        if let Some(url) = env_value(&["SIDELINE_BACKEND_URL"]) {
            self.backend_url = Some(url);
        }
        if let Some(token) = env_value(&["SIDELINE_BACKEND_TOKEN"]) {
            self.backend_token = Some(token);
        }
        if let Some(key) = env_value(&["SIDELINE_SPORTSDATA_API_KEY", "SPORTSDATA_API_KEY"]) {
            self.sportsdata_api_key = Some(key);
        }
        if let Some(key) = env_value(&["SIDELINE_ODDS_API_KEY", "ODDS_API_KEY"]) {
            self.odds_api_key = Some(key);
        }
        if env_value(&["SIDELINE_DISABLE_ESPN"]).is_some_and(|flag| is_truthy(&flag)) {
            self.enable_espn = false;
        }
        self
    }

    /// Mock-only chains: no upstream is contacted.
    pub fn with_mock_mode(mut self) -> Self {
        self.use_mock = true;
        self
    }

    pub fn with_backend_url(mut self, url: impl Into<String>) -> Self {
        self.backend_url = Some(url.into());
        self
    }

    pub fn with_backend_token(mut self, token: impl Into<String>) -> Self {
        self.backend_token = Some(token.into());
        self
    }

    pub fn with_sportsdata_key(mut self, key: impl Into<String>) -> Self {
        self.sportsdata_api_key = Some(key.into());
        self
    }

    pub fn with_sportsdata_base_url(mut self, url: impl Into<String>) -> Self {
        self.sportsdata_base_url = Some(url.into());
        self
    }

    pub fn with_odds_api_key(mut self, key: impl Into<String>) -> Self {
        self.odds_api_key = Some(key.into());
        self
    }

    pub fn with_odds_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.odds_api_base_url = Some(url.into());
        self
    }

    pub fn with_espn_enabled(mut self, enabled: bool) -> Self {
        self.enable_espn = enabled;
        self
    }

    pub fn with_espn_base_url(mut self, url: impl Into<String>) -> Self {
        self.espn_base_url = Some(url.into());
        self
    }

    /// Transport shared by every HTTP source. Defaults to [`ReqwestHttpClient`].
    pub fn with_http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Shares an existing cache instead of creating a fresh one.
    pub fn with_cache(mut self, cache: TtlCache<FetchResult>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn with_ttl_policy(mut self, ttl: TtlPolicy) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_timeouts(mut self, timeouts: SourceTimeouts) -> Self {
        self.timeouts = timeouts;
        self
    }

    pub fn with_sportsdata_quota(mut self, quota: QuotaPolicy) -> Self {
        self.sportsdata_quota = quota;
        self
    }

    pub fn with_odds_api_quota(mut self, quota: QuotaPolicy) -> Self {
        self.odds_api_quota = quota;
        self
    }

    /// Replaces the default chain for `resource`, or registers a new one.
    pub fn with_chain(mut self, resource: ResourceId, chain: FallbackChain) -> Self {
        self.custom_chains.push((resource, chain));
        self
    }

    pub fn build(self) -> Aggregator {
        let candidates = if self.use_mock {
            Vec::new()
        } else {
            self.candidates()
        };

        let mut chains = default_resources()
            .into_iter()
            .map(|resource| {
                let sources = candidates
                    .iter()
                    .filter(|candidate| candidate.serves(resource))
                    .map(|candidate| Arc::clone(&candidate.source))
                    .collect();
                let chain = FallbackChain::new(resource.to_string(), sources)
                    .with_mock(MockProvider::for_resource(resource));
                (resource, chain)
            })
            .collect::<std::collections::HashMap<_, _>>();

        for (resource, chain) in self.custom_chains {
            chains.insert(resource, chain);
        }

        let source_names = candidates
            .iter()
            .map(|candidate| candidate.source.name())
            .collect::<Vec<_>>();
        info!(
            chains = chains.len(),
            sources = ?source_names,
            mock_mode = self.use_mock,
            "aggregator built"
        );

        Aggregator::new(chains, self.cache.unwrap_or_default(), self.ttl)
    }

    fn candidates(&self) -> Vec<Candidate> {
        let http_client = self
            .http_client
            .clone()
            .unwrap_or_else(|| Arc::new(ReqwestHttpClient::new()));
        let timeouts = self.timeouts;
        let descriptor = |name: &str, priority: u32, class: ReliabilityClass, latency_ms: u64| {
            SourceDescriptor::new(name, priority, class, timeouts.for_class(class))
                .with_expected_latency(Duration::from_millis(latency_ms))
        };

        let mut candidates = Vec::new();

        if let Some(url) = &self.backend_url {
            let auth = self
                .backend_token
                .clone()
                .map_or(HttpAuth::None, HttpAuth::BearerToken);
            let source = HttpSource::new(
                descriptor("backend", 0, ReliabilityClass::Primary, 250),
                BackendUpstream::new(url.as_str()),
                Arc::clone(&http_client),
            )
            .with_auth(auth);
            candidates.push(Candidate::new(Arc::new(source), true));
        }

        if let Some(key) = &self.sportsdata_api_key {
            let upstream = self
                .sportsdata_base_url
                .as_deref()
                .map_or_else(SportsDataUpstream::default, SportsDataUpstream::new);
            let source = HttpSource::new(
                descriptor("sportsdata", 10, ReliabilityClass::Secondary, 400),
                upstream,
                Arc::clone(&http_client),
            )
            .with_auth(HttpAuth::Header {
                name: String::from(sportsdata::AUTH_HEADER),
                value: key.clone(),
            })
            .with_quota(QuotaGuard::new(self.sportsdata_quota));
            candidates.push(Candidate::new(Arc::new(source), false));
        }

        if let Some(key) = &self.odds_api_key {
            let upstream = self
                .odds_api_base_url
                .as_deref()
                .map_or_else(OddsApiUpstream::default, OddsApiUpstream::new);
            let source = HttpSource::new(
                descriptor("odds_api", 10, ReliabilityClass::Secondary, 400),
                upstream,
                Arc::clone(&http_client),
            )
            .with_auth(HttpAuth::QueryParam {
                name: String::from(odds_api::AUTH_PARAM),
                value: key.clone(),
            })
            .with_quota(QuotaGuard::new(self.odds_api_quota));
            candidates.push(Candidate::new(Arc::new(source), false));
        }

        if self.enable_espn {
            let upstream = self
                .espn_base_url
                .as_deref()
                .map_or_else(EspnUpstream::default, EspnUpstream::new);
            let source = HttpSource::new(
                descriptor("espn", 20, ReliabilityClass::Tertiary, 600),
                upstream,
                Arc::clone(&http_client),
            );
            candidates.push(Candidate::new(Arc::new(source), false));
        }

        candidates
    }
}

/// A built source plus what it can be chained for.
struct Candidate {
    source: Arc<dyn SourceClient>,
    league_wide: bool,
}

impl Candidate {
    fn new(source: Arc<dyn SourceClient>, league_wide: bool) -> Self {
        Self {
            source,
            league_wide,
        }
    }

    fn serves(&self, resource: ResourceId) -> bool {
        self.source.supports(resource.kind) && (resource.sport.is_some() || self.league_wide)
    }
}

fn env_value(names: &[&str]) -> Option<String> {
    names
        .iter()
        .filter_map(|name| env::var(name).ok())
        .map(|value| value.trim().to_owned())
        .find(|value| !value.is_empty())
}

fn is_truthy(flag: &str) -> bool {
    !matches!(
        flag.to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}
