//! # Domain Models
//!
//! Canonical sports types shared by every upstream source.
//!
//! ## Models
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Payload`] | Canonical payload, one variant per resource kind |
//! | [`Game`] | Scoreboard entry with teams, score and status |
//! | [`Standing`] | Team record row |
//! | [`Team`] | Team reference data |
//! | [`Player`] | Roster entry |
//! | [`NewsArticle`] | Headline with link |
//! | [`GameOdds`] | Per-bookmaker lines for one game |
//! | [`ResourceKey`] | Logical resource plus query parameters |
//! | [`GameDate`] | `YYYY-MM-DD` calendar date |
//! | [`UtcDateTime`] | UTC timestamp; normalizes vendor kickoff and publish times |
//!
//! Transformers fill missing upstream fields with defaults (`0`, `"Unknown"`,
//! empty lists), so every model here is constructible from a partial response.

mod models;
mod resource;
mod timestamp;

pub use models::{
    BookLine, Game, GameOdds, GameStatus, NewsArticle, Payload, Player, Standing, Team, UNKNOWN,
};
pub use resource::{GameDate, ResourceId, ResourceKey, ResourceKind, Sport};
pub use timestamp::UtcDateTime;
