//! Upstream source contract and the generic HTTP-backed implementation.
//!
//! A [`SourceClient`] makes at most one attempt per call. Retrying is the
//! fallback chain's job: it moves on to the next source instead.

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::chain::duration_ms;
use crate::http_client::{HttpAuth, HttpClient, HttpErrorKind, HttpRequest};
use crate::throttling::QuotaGuard;
use crate::transform::{RawResponse, Transformer};
use crate::{Payload, ResourceKey, ResourceKind};

/// Declared reliability of an upstream, which also selects its timeout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityClass {
    Primary,
    Secondary,
    Tertiary,
}

impl ReliabilityClass {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Primary => "primary",
            Self::Secondary => "secondary",
            Self::Tertiary => "tertiary",
        }
    }
}

/// Static description of a source. Not mutated once a chain is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SourceDescriptor {
    pub name: String,
    /// Lower runs first.
    pub priority: u32,
    #[serde(serialize_with = "serialize_millis")]
    pub timeout: Duration,
    pub reliability: ReliabilityClass,
    #[serde(serialize_with = "serialize_millis")]
    pub expected_latency: Duration,
}

impl SourceDescriptor {
    pub fn new(
        name: impl Into<String>,
        priority: u32,
        reliability: ReliabilityClass,
        timeout: Duration,
    ) -> Self {
        Self {
            name: name.into(),
            priority,
            timeout,
            reliability,
            expected_latency: Duration::from_millis(500),
        }
    }

    pub fn with_expected_latency(mut self, latency: Duration) -> Self {
        self.expected_latency = latency;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

fn serialize_millis<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    serializer.serialize_u64(duration_ms(*value))
}

/// Why a single source attempt failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchErrorKind {
    Timeout,
    HttpError(u16),
    ParseError,
    Transport,
    RateLimited,
    Unsupported,
}

/// Failure of one source attempt. Always recovered by the fallback chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchError {
    kind: FetchErrorKind,
    message: String,
}

impl FetchError {
    pub fn timeout(after: Duration) -> Self {
        Self {
            kind: FetchErrorKind::Timeout,
            message: format!("no response within {}ms", after.as_millis()),
        }
    }

    pub fn http(status: u16) -> Self {
        Self {
            kind: FetchErrorKind::HttpError(status),
            message: format!("upstream returned status {status}"),
        }
    }

    pub fn parse(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::ParseError,
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Transport,
            message: message.into(),
        }
    }

    pub fn rate_limited(retry_after: Duration) -> Self {
        Self {
            kind: FetchErrorKind::RateLimited,
            message: format!(
                "request budget exhausted; next slot in {}ms",
                retry_after.as_millis()
            ),
        }
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self {
            kind: FetchErrorKind::Unsupported,
            message: message.into(),
        }
    }

    pub const fn kind(&self) -> FetchErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            FetchErrorKind::Timeout => "source.timeout",
            FetchErrorKind::HttpError(_) => "source.http_error",
            FetchErrorKind::ParseError => "source.parse_error",
            FetchErrorKind::Transport => "source.transport",
            FetchErrorKind::RateLimited => "source.rate_limited",
            FetchErrorKind::Unsupported => "source.unsupported",
        }
    }
}

impl Display for FetchError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for FetchError {}

pub type FetchFuture<'a> = Pin<Box<dyn Future<Output = Result<Payload, FetchError>> + Send + 'a>>;

/// A single upstream data source.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; one instance is shared by every
/// concurrent resolve of the chains it belongs to.
pub trait SourceClient: Send + Sync {
    fn descriptor(&self) -> &SourceDescriptor;

    /// Whether this source can serve `kind` at all. Chains only include
    /// sources that support their resource.
    fn supports(&self, kind: ResourceKind) -> bool;

    /// One attempt, bounded by the descriptor's timeout.
    fn fetch<'a>(&'a self, key: &'a ResourceKey) -> FetchFuture<'a>;

    fn name(&self) -> &str {
        &self.descriptor().name
    }
}

/// HTTP specifics of an upstream: how to address it and how to read it.
pub trait Upstream: Transformer {
    fn supports(&self, kind: ResourceKind) -> bool;

    /// Builds the request for `key`, without auth or timeout.
    fn request(&self, key: &ResourceKey) -> Result<HttpRequest, FetchError>;

    /// Tags a decoded body with this upstream's family.
    fn wrap(&self, body: serde_json::Value) -> RawResponse;
}

/// [`SourceClient`] that talks to an [`Upstream`] over an [`HttpClient`].
pub struct HttpSource<U> {
    descriptor: SourceDescriptor,
    upstream: U,
    http_client: Arc<dyn HttpClient>,
    auth: HttpAuth,
    quota: Option<QuotaGuard>,
}

impl<U: Upstream> HttpSource<U> {
    pub fn new(descriptor: SourceDescriptor, upstream: U, http_client: Arc<dyn HttpClient>) -> Self {
        Self {
            descriptor,
            upstream,
            http_client,
            auth: HttpAuth::None,
            quota: None,
        }
    }

    pub fn with_auth(mut self, auth: HttpAuth) -> Self {
        self.auth = auth;
        self
    }

    pub fn with_quota(mut self, quota: QuotaGuard) -> Self {
        self.quota = Some(quota);
        self
    }

    pub fn upstream(&self) -> &U {
        &self.upstream
    }

    async fn attempt(&self, key: &ResourceKey) -> Result<Payload, FetchError> {
        if let Some(quota) = &self.quota {
            quota.acquire().map_err(FetchError::rate_limited)?;
        }

        let timeout = self.descriptor.timeout;
        let request = self
            .upstream
            .request(key)?
            .with_auth(&self.auth)
            .with_timeout(timeout);

        let response = tokio::time::timeout(timeout, self.http_client.execute(request))
            .await
            .map_err(|_| FetchError::timeout(timeout))?
            .map_err(|error| match error.kind() {
                HttpErrorKind::Timeout => FetchError::timeout(timeout),
                HttpErrorKind::Connect | HttpErrorKind::Other => {
                    FetchError::transport(error.message())
                }
            })?;

        if !response.is_success() {
            return Err(FetchError::http(response.status));
        }

        let body: serde_json::Value = serde_json::from_str(&response.body)
            .map_err(|error| FetchError::parse(format!("response is not JSON: {error}")))?;
        let raw = self.upstream.wrap(body);

        let mut payload = self
            .upstream
            .transform(key.kind, key.sport, &raw)
            .ok_or_else(|| {
                FetchError::parse(format!(
                    "{} response has no {} container",
                    raw.family(),
                    key.kind
                ))
            })?;

        if let Some(limit) = key.limit {
            payload.truncate(limit);
        }
        Ok(payload)
    }
}

impl<U: Upstream> SourceClient for HttpSource<U> {
    fn descriptor(&self) -> &SourceDescriptor {
        &self.descriptor
    }

    fn supports(&self, kind: ResourceKind) -> bool {
        self.upstream.supports(kind)
    }

    fn fetch<'a>(&'a self, key: &'a ResourceKey) -> FetchFuture<'a> {
        Box::pin(self.attempt(key))
    }
}
