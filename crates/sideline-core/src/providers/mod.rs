//! Concrete upstreams.
//!
//! Each provider is an [`Upstream`](crate::source::Upstream): it knows how to
//! address its vendor and how to normalize the vendor's JSON. Wrap one in
//! [`HttpSource`](crate::source::HttpSource) to get a chainable source.

pub mod backend;
pub mod espn;
pub mod odds_api;
pub mod sportsdata;

pub use backend::BackendUpstream;
pub use espn::EspnUpstream;
pub use odds_api::OddsApiUpstream;
pub use sportsdata::SportsDataUpstream;

use crate::source::FetchError;
use crate::{ResourceKey, Sport};

/// Sport of `key`, or an `Unsupported` failure naming `source`.
pub(crate) fn require_sport(source: &str, key: &ResourceKey) -> Result<Sport, FetchError> {
    key.sport.ok_or_else(|| {
        FetchError::unsupported(format!("{source} needs a sport to serve {}", key.kind))
    })
}

/// Trims a configured base URL so paths can be appended with `/`.
pub(crate) fn normalize_base(base_url: impl Into<String>) -> String {
    let mut base = base_url.into();
    while base.ends_with('/') {
        base.pop();
    }
    base
}
