//! # Sideline Core
//!
//! Resilient data access for a sports dashboard: caching, fallback chaining
//! and partial-failure-tolerant aggregation over unreliable upstreams.
//!
//! ## Overview
//!
//! Callers ask for logical resources ("NBA games", "NFL standings") and
//! always get an answer:
//!
//! - **TTL cache** in front of every upstream, one instance shared by all callers
//! - **Fallback chains** walking backend → vendor APIs → public APIs by priority
//! - **Mock payloads** as the terminal fallback, flagged `degraded`
//! - **Concurrent aggregation** that tolerates individual failures
//! - **Provenance** on every result: which source served it and whether it is real
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`aggregator`] | Cache-first fan-out, placeholders and optimistic fetches |
//! | [`cache`] | Generic TTL cache with glob invalidation |
//! | [`chain`] | Fallback chain state machine and `FetchResult` |
//! | [`config`] | TTL, timeout and quota policies |
//! | [`domain`] | Sports models and resource keys |
//! | [`error`] | Core error types |
//! | [`http_client`] | HTTP transport abstraction |
//! | [`mock`] | Terminal mock provider and fixtures |
//! | [`providers`] | Backend, SportsDataIO, The Odds API and ESPN upstreams |
//! | [`registry`] | Environment-driven `AggregatorBuilder` |
//! | [`source`] | Source trait, descriptors and the generic HTTP source |
//! | [`throttling`] | Per-source request budgets |
//! | [`transform`] | Raw responses and transformers |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sideline_core::{AggregatorBuilder, ResourceKey, ResourceKind, Sport};
//!
//! #[tokio::main]
//! async fn main() {
//!     let aggregator = AggregatorBuilder::from_env().build();
//!
//!     let result = aggregator
//!         .aggregate([
//!             ResourceKey::for_sport(ResourceKind::Games, Sport::Nba),
//!             ResourceKey::new(ResourceKind::News),
//!         ])
//!         .await;
//!
//!     if result.partial_failure() {
//!         eprintln!("some panels are showing simulated data");
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  CLI / UI       │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │  Aggregator     │────▶│ TTL Cache        │
//! └────────┬────────┘     └──────────────────┘
//!          │ miss
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Fallback Chain  │────▶│ Mock Provider    │
//! │ (per resource)  │     │ (all failed)     │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Source Client   │────▶│ HTTP Client      │
//! │ + Transformer   │     │ (reqwest)        │
//! └─────────────────┘     └──────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Upstream failures never reach callers; they are recorded on the result:
//!
//! ```rust,ignore
//! use sideline_core::{CacheMode, CoreError};
//!
//! match aggregator.fetch(&key, CacheMode::Use).await {
//!     Ok(result) if result.degraded() => {
//!         // Simulated data; `result.failures()` says why
//!     }
//!     Ok(result) => {
//!         // Live data from `result.source_name()`
//!     }
//!     Err(CoreError::Configuration { resource }) => {
//!         // No chain registered, or no mock to fall back to
//!     }
//!     Err(other) => eprintln!("{other}"),
//! }
//! ```
//!
//! ## Security
//!
//! - API keys are read from the environment or passed to the builder, never logged
//! - All HTTP requests use TLS via reqwest's default backend

pub mod aggregator;
pub mod cache;
pub mod chain;
pub mod config;
pub mod domain;
pub mod error;
pub mod http_client;
pub mod mock;
pub mod providers;
pub mod registry;
pub mod source;
pub mod throttling;
pub mod transform;

// Aggregation
pub use aggregator::{AggregateResult, Aggregator, OptimisticFetch};

// Caching
pub use cache::{CacheMode, CachePattern, TtlCache};

// Fallback chains
pub use chain::{ChainState, FallbackChain, FetchResult, SourceFailure};

// Policies
pub use config::{QuotaPolicy, SourceTimeouts, TtlPolicy};

// Domain models
pub use domain::{
    BookLine, Game, GameDate, GameOdds, GameStatus, NewsArticle, Payload, Player, ResourceId,
    ResourceKey, ResourceKind, Sport, Standing, Team, UtcDateTime, UNKNOWN,
};

// Error types
pub use error::{CoreError, ValidationError};

// HTTP client types
pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpErrorKind, HttpRequest, HttpResponse,
    ReqwestHttpClient,
};

// Mock data
pub use mock::MockProvider;

// Upstreams
pub use providers::{BackendUpstream, EspnUpstream, OddsApiUpstream, SportsDataUpstream};

// Registry
pub use registry::{default_resources, AggregatorBuilder};

// Sources
pub use source::{
    FetchError, FetchErrorKind, FetchFuture, HttpSource, ReliabilityClass, SourceClient,
    SourceDescriptor, Upstream,
};

// Throttling
pub use throttling::QuotaGuard;

// Transformers
pub use transform::{RawResponse, Transformer};
