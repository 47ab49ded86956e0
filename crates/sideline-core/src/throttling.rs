//! Client-side request budgets for metered vendors.
//!
//! Each keyed source gets its own [`QuotaGuard`], a governor direct limiter
//! sized from a [`QuotaPolicy`].

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::{Clock, DefaultClock};
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

use crate::config::QuotaPolicy;

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Per-source request budget.
///
/// Sources never wait for budget: an exhausted guard fails the attempt so the
/// chain moves on to the next source instead of burning vendor quota.
#[derive(Clone)]
pub struct QuotaGuard {
    limiter: Arc<DirectRateLimiter>,
    policy: QuotaPolicy,
}

impl std::fmt::Debug for QuotaGuard {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QuotaGuard")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl QuotaGuard {
    pub fn new(policy: QuotaPolicy) -> Self {
        Self {
            limiter: Arc::new(RateLimiter::direct(quota_from_policy(&policy))),
            policy,
        }
    }

    /// Takes one unit of budget, or reports how long until one frees up.
    pub fn acquire(&self) -> Result<(), Duration> {
        self.limiter.check().map_err(|not_until| {
            not_until.wait_time_from(DefaultClock::default().now())
        })
    }

    pub const fn policy(&self) -> &QuotaPolicy {
        &self.policy
    }
}

fn quota_from_policy(policy: &QuotaPolicy) -> Quota {
    let safe_limit = policy.limit.max(1);
    let burst = NonZeroU32::new(safe_limit).unwrap_or(NonZeroU32::MIN);

    let seconds_per_cell = (policy.window.as_secs_f64() / f64::from(safe_limit)).max(0.001);
    let period = Duration::from_secs_f64(seconds_per_cell);

    Quota::with_period(period)
        .unwrap_or_else(|| Quota::per_second(burst))
        .allow_burst(burst)
}
