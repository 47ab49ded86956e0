use serde::{Deserialize, Serialize};

use crate::{ResourceKind, Sport};

/// Placeholder used wherever an upstream omits a display name.
pub const UNKNOWN: &str = "Unknown";

/// Canonical game state across leagues and vendors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Scheduled,
    InProgress,
    Final,
    Postponed,
    Unknown,
}

impl GameStatus {
    /// Maps the assorted vendor spellings ("STATUS_FINAL", "InProgress",
    /// "F/OT", "live", ...) onto the canonical state.
    pub fn from_label(label: &str) -> Self {
        let normalized = label
            .trim()
            .to_ascii_lowercase()
            .replace(['_', '-', ' '], "");
        let normalized = normalized.strip_prefix("status").unwrap_or(&normalized);

        match normalized {
            "scheduled" | "pre" | "pregame" | "notstarted" | "upcoming" => Self::Scheduled,
            "inprogress" | "in" | "live" | "halftime" | "endperiod" | "delayed" => {
                Self::InProgress
            }
            "final" | "post" | "closed" | "complete" | "completed" | "f" | "f/ot" | "finalot" => {
                Self::Final
            }
            "postponed" | "canceled" | "cancelled" | "suspended" => Self::Postponed,
            _ => Self::Unknown,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Team {
    pub id: String,
    pub name: String,
    pub abbreviation: String,
    pub city: String,
    pub conference: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Game {
    pub id: String,
    pub sport: Option<Sport>,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: GameStatus,
    /// RFC3339 UTC when the vendor spelling is recognized, verbatim otherwise.
    pub start_time: Option<String>,
    pub venue: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    pub team: String,
    pub abbreviation: String,
    pub conference: String,
    pub wins: u32,
    pub losses: u32,
    pub ties: u32,
    pub win_pct: f64,
}

impl Standing {
    /// Win percentage derived from the record, used when upstream omits it.
    pub fn computed_win_pct(wins: u32, losses: u32, ties: u32) -> f64 {
        let played = u64::from(wins) + u64::from(losses) + u64::from(ties);
        if played == 0 {
            return 0.0;
        }
        (f64::from(wins) + f64::from(ties) / 2.0) / played as f64
    }

    /// Keeps an upstream-reported percentage only when it is a fraction in
    /// `0..=1`; anything else is recomputed from the record.
    pub fn reported_or_computed_win_pct(
        reported: Option<f64>,
        wins: u32,
        losses: u32,
        ties: u32,
    ) -> f64 {
        reported
            .filter(|pct| (0.0..=1.0).contains(pct))
            .unwrap_or_else(|| Self::computed_win_pct(wins, losses, ties))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    pub team: String,
    pub position: String,
    pub jersey: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub id: String,
    pub headline: String,
    pub summary: String,
    pub url: Option<String>,
    pub published: Option<String>,
    pub author: String,
}

/// One bookmaker's lines for a game. Moneylines are American odds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BookLine {
    pub bookmaker: String,
    pub home_moneyline: Option<i32>,
    pub away_moneyline: Option<i32>,
    /// Home spread, e.g. `-4.5`.
    pub spread: Option<f64>,
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameOdds {
    pub game_id: String,
    pub sport: Option<Sport>,
    pub home_team: String,
    pub away_team: String,
    pub commence_time: Option<String>,
    pub lines: Vec<BookLine>,
}

/// Canonical payload produced by transformers and served to callers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "items", rename_all = "snake_case")]
pub enum Payload {
    Games(Vec<Game>),
    Standings(Vec<Standing>),
    Teams(Vec<Team>),
    Players(Vec<Player>),
    News(Vec<NewsArticle>),
    Odds(Vec<GameOdds>),
}

impl Payload {
    pub fn empty(kind: ResourceKind) -> Self {
        match kind {
            ResourceKind::Games => Self::Games(Vec::new()),
            ResourceKind::Standings => Self::Standings(Vec::new()),
            ResourceKind::Teams => Self::Teams(Vec::new()),
            ResourceKind::Players => Self::Players(Vec::new()),
            ResourceKind::News => Self::News(Vec::new()),
            ResourceKind::Odds => Self::Odds(Vec::new()),
        }
    }

    pub const fn kind(&self) -> ResourceKind {
        match self {
            Self::Games(_) => ResourceKind::Games,
            Self::Standings(_) => ResourceKind::Standings,
            Self::Teams(_) => ResourceKind::Teams,
            Self::Players(_) => ResourceKind::Players,
            Self::News(_) => ResourceKind::News,
            Self::Odds(_) => ResourceKind::Odds,
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Games(items) => items.len(),
            Self::Standings(items) => items.len(),
            Self::Teams(items) => items.len(),
            Self::Players(items) => items.len(),
            Self::News(items) => items.len(),
            Self::Odds(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keeps at most `limit` items.
    pub fn truncate(&mut self, limit: usize) {
        match self {
            Self::Games(items) => items.truncate(limit),
            Self::Standings(items) => items.truncate(limit),
            Self::Teams(items) => items.truncate(limit),
            Self::Players(items) => items.truncate(limit),
            Self::News(items) => items.truncate(limit),
            Self::Odds(items) => items.truncate(limit),
        }
    }
}
