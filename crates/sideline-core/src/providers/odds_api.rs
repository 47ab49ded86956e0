//! The Odds API, the secondary vendor for betting lines.
//!
//! One request returns every upcoming game in a league with each bookmaker's
//! moneyline, spread and total markets. The key travels as the `apiKey`
//! query parameter.

use serde_json::Value;

use super::{normalize_base, require_sport};
use crate::http_client::HttpRequest;
use crate::source::{FetchError, Upstream};
use crate::transform::fields::{
    items, name, opt_f64, opt_i32, opt_string, opt_timestamp, string_or,
};
use crate::transform::{list_container, RawResponse, Transformer};
use crate::{BookLine, GameOdds, Payload, ResourceKey, ResourceKind, Sport};

pub const DEFAULT_BASE_URL: &str = "https://api.the-odds-api.com/v4";

/// Query parameter carrying the key.
pub const AUTH_PARAM: &str = "apiKey";

/// Bookmaker region whose lines are requested.
const REGIONS: &str = "us";

#[derive(Debug, Clone)]
pub struct OddsApiUpstream {
    base_url: String,
}

impl Default for OddsApiUpstream {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl OddsApiUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }
}

const fn sport_key(sport: Sport) -> &'static str {
    match sport {
        Sport::Nba => "basketball_nba",
        Sport::Nfl => "americanfootball_nfl",
        Sport::Nhl => "icehockey_nhl",
    }
}

impl Upstream for OddsApiUpstream {
    fn supports(&self, kind: ResourceKind) -> bool {
        kind == ResourceKind::Odds
    }

    fn request(&self, key: &ResourceKey) -> Result<HttpRequest, FetchError> {
        if key.kind != ResourceKind::Odds {
            return Err(FetchError::unsupported(format!(
                "odds_api does not serve {}",
                key.kind
            )));
        }
        let sport = require_sport("odds_api", key)?;

        Ok(HttpRequest::get(format!(
            "{}/sports/{}/odds",
            self.base_url,
            sport_key(sport)
        ))
        .with_query("regions", REGIONS)
        .with_query("markets", "h2h,spreads,totals")
        .with_query("oddsFormat", "american"))
    }

    fn wrap(&self, body: Value) -> RawResponse {
        RawResponse::OddsApi(body)
    }
}

impl Transformer for OddsApiUpstream {
    fn transform(
        &self,
        kind: ResourceKind,
        sport: Option<Sport>,
        raw: &RawResponse,
    ) -> Option<Payload> {
        let RawResponse::OddsApi(body) = raw else {
            return None;
        };
        if kind != ResourceKind::Odds {
            return None;
        }
        let events = list_container(body, &[])?;
        Some(Payload::Odds(
            events.iter().map(|event| game_odds(event, sport)).collect(),
        ))
    }
}

fn game_odds(event: &Value, sport: Option<Sport>) -> GameOdds {
    let home_team = name(event, &["home_team"]);
    let away_team = name(event, &["away_team"]);
    let lines = items(event, &["bookmakers"])
        .iter()
        .map(|bookmaker| book_line(bookmaker, &home_team, &away_team))
        .collect();

    GameOdds {
        game_id: string_or(event, &["id"], ""),
        sport,
        commence_time: opt_timestamp(event, &["commence_time"]),
        home_team,
        away_team,
        lines,
    }
}

fn book_line(bookmaker: &Value, home_team: &str, away_team: &str) -> BookLine {
    let mut line = BookLine {
        bookmaker: name(bookmaker, &["title", "key"]),
        home_moneyline: None,
        away_moneyline: None,
        spread: None,
        total: None,
    };

    for market in items(bookmaker, &["markets"]) {
        let outcomes = items(market, &["outcomes"]);
        let outcome_for = |team: &str| {
            outcomes
                .iter()
                .find(|outcome| opt_string(outcome, &["name"]).as_deref() == Some(team))
        };

        match opt_string(market, &["key"]).as_deref() {
            Some("h2h") => {
                line.home_moneyline = outcome_for(home_team).and_then(|o| opt_i32(o, &["price"]));
                line.away_moneyline = outcome_for(away_team).and_then(|o| opt_i32(o, &["price"]));
            }
            Some("spreads") => {
                line.spread = outcome_for(home_team).and_then(|o| opt_f64(o, &["point"]));
            }
            Some("totals") => {
                line.total = outcomes.first().and_then(|o| opt_f64(o, &["point"]));
            }
            _ => {}
        }
    }
    line
}
