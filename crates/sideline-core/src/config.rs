//! Freshness, timeout and quota settings.
//!
//! None of these live inside the cache or the sources themselves: the
//! aggregator passes a TTL on every write and the registry stamps timeouts
//! onto each source descriptor when it builds the chains.

use std::time::Duration;

use crate::source::ReliabilityClass;
use crate::ResourceKind;

/// How long a resolved resource stays fresh in the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TtlPolicy {
    pub games: Duration,
    pub odds: Duration,
    pub news: Duration,
    pub standings: Duration,
    pub teams: Duration,
    pub players: Duration,
    /// Applied to mock results so a recovering upstream is retried soon.
    pub degraded: Duration,
}

impl Default for TtlPolicy {
    fn default() -> Self {
        Self {
            games: Duration::from_secs(30),
            odds: Duration::from_secs(10),
            news: Duration::from_secs(5 * 60),
            standings: Duration::from_secs(60 * 60),
            teams: Duration::from_secs(24 * 60 * 60),
            players: Duration::from_secs(24 * 60 * 60),
            degraded: Duration::from_secs(15),
        }
    }
}

impl TtlPolicy {
    pub const fn for_kind(&self, kind: ResourceKind) -> Duration {
        match kind {
            ResourceKind::Games => self.games,
            ResourceKind::Odds => self.odds,
            ResourceKind::News => self.news,
            ResourceKind::Standings => self.standings,
            ResourceKind::Teams => self.teams,
            ResourceKind::Players => self.players,
        }
    }

    /// TTL for a result, taking degradation into account.
    pub fn for_result(&self, kind: ResourceKind, degraded: bool) -> Duration {
        if degraded {
            self.degraded.min(self.for_kind(kind))
        } else {
            self.for_kind(kind)
        }
    }

    /// Same TTL for every kind; handy in tests.
    pub const fn uniform(ttl: Duration) -> Self {
        Self {
            games: ttl,
            odds: ttl,
            news: ttl,
            standings: ttl,
            teams: ttl,
            players: ttl,
            degraded: ttl,
        }
    }
}

/// Per-attempt timeout by reliability class.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceTimeouts {
    pub primary: Duration,
    pub secondary: Duration,
    pub tertiary: Duration,
}

impl Default for SourceTimeouts {
    fn default() -> Self {
        Self {
            primary: Duration::from_secs(10),
            secondary: Duration::from_secs(5),
            tertiary: Duration::from_secs(5),
        }
    }
}

impl SourceTimeouts {
    pub const fn for_class(&self, class: ReliabilityClass) -> Duration {
        match class {
            ReliabilityClass::Primary => self.primary,
            ReliabilityClass::Secondary => self.secondary,
            ReliabilityClass::Tertiary => self.tertiary,
        }
    }
}

/// Request budget for a metered vendor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuotaPolicy {
    pub window: Duration,
    pub limit: u32,
}

impl QuotaPolicy {
    pub const fn per_minute(limit: u32) -> Self {
        Self {
            window: Duration::from_secs(60),
            limit,
        }
    }

    pub const fn sportsdata_default() -> Self {
        Self::per_minute(60)
    }

    pub const fn odds_api_default() -> Self {
        Self::per_minute(10)
    }
}
