//! SportsDataIO, the metered secondary vendor for scores and reference data.
//!
//! Responses are bare PascalCase arrays. Requests authenticate with the
//! `Ocp-Apim-Subscription-Key` header, attached by the registry.

use serde_json::Value;
use time::Month;

use super::{normalize_base, require_sport};
use crate::http_client::HttpRequest;
use crate::source::{FetchError, Upstream};
use crate::transform::fields::{
    name, opt_f64, opt_string, opt_timestamp, opt_u32, string_or, u32_or_zero,
};
use crate::transform::{list_container, RawResponse, Transformer};
use crate::{
    Game, GameDate, GameStatus, Payload, Player, ResourceKey, ResourceKind, Sport, Standing, Team,
};

pub const DEFAULT_BASE_URL: &str = "https://api.sportsdata.io/v3";

/// Header carrying the subscription key.
pub const AUTH_HEADER: &str = "Ocp-Apim-Subscription-Key";

#[derive(Debug, Clone)]
pub struct SportsDataUpstream {
    base_url: String,
}

impl Default for SportsDataUpstream {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl SportsDataUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }

    fn endpoint(&self, sport: Sport, kind: ResourceKind, date: GameDate) -> Option<String> {
        let path = match kind {
            // NFL exposes per-day results under a different name.
            ResourceKind::Games if sport == Sport::Nfl => {
                format!("ScoresByDate/{}", vendor_date(date))
            }
            ResourceKind::Games => format!("GamesByDate/{}", vendor_date(date)),
            ResourceKind::Standings => format!("Standings/{}", date.year()),
            ResourceKind::Teams => String::from("teams"),
            ResourceKind::Players => String::from("Players"),
            ResourceKind::News | ResourceKind::Odds => return None,
        };
        Some(format!("{}/{sport}/scores/json/{path}", self.base_url))
    }
}

/// `2024-JAN-05`, the date form every SportsDataIO league endpoint takes.
fn vendor_date(date: GameDate) -> String {
    let inner = date.into_inner();
    let month = match inner.month() {
        Month::January => "JAN",
        Month::February => "FEB",
        Month::March => "MAR",
        Month::April => "APR",
        Month::May => "MAY",
        Month::June => "JUN",
        Month::July => "JUL",
        Month::August => "AUG",
        Month::September => "SEP",
        Month::October => "OCT",
        Month::November => "NOV",
        Month::December => "DEC",
    };
    format!("{:04}-{month}-{:02}", inner.year(), inner.day())
}

impl Upstream for SportsDataUpstream {
    fn supports(&self, kind: ResourceKind) -> bool {
        matches!(
            kind,
            ResourceKind::Games | ResourceKind::Standings | ResourceKind::Teams | ResourceKind::Players
        )
    }

    fn request(&self, key: &ResourceKey) -> Result<HttpRequest, FetchError> {
        let sport = require_sport("sportsdata", key)?;
        let date = key.date.unwrap_or_else(GameDate::today);
        let url = self.endpoint(sport, key.kind, date).ok_or_else(|| {
            FetchError::unsupported(format!("sportsdata does not serve {}", key.kind))
        })?;
        Ok(HttpRequest::get(url))
    }

    fn wrap(&self, body: Value) -> RawResponse {
        RawResponse::SportsData(body)
    }
}

impl Transformer for SportsDataUpstream {
    fn transform(
        &self,
        kind: ResourceKind,
        sport: Option<Sport>,
        raw: &RawResponse,
    ) -> Option<Payload> {
        let RawResponse::SportsData(body) = raw else {
            return None;
        };
        let rows = list_container(body, &[])?;

        match kind {
            ResourceKind::Games => Some(Payload::Games(
                rows.iter().map(|row| game(row, sport)).collect(),
            )),
            ResourceKind::Standings => Some(Payload::Standings(rows.iter().map(standing).collect())),
            ResourceKind::Teams => Some(Payload::Teams(rows.iter().map(team).collect())),
            ResourceKind::Players => Some(Payload::Players(rows.iter().map(player).collect())),
            ResourceKind::News | ResourceKind::Odds => None,
        }
    }
}

fn game(row: &Value, sport: Option<Sport>) -> Game {
    Game {
        id: string_or(row, &["GameID", "GameKey", "ScoreID"], ""),
        sport,
        home_team: name(row, &["HomeTeam"]),
        away_team: name(row, &["AwayTeam"]),
        home_score: u32_or_zero(row, &["HomeTeamScore", "HomeScore"]),
        away_score: u32_or_zero(row, &["AwayTeamScore", "AwayScore"]),
        status: opt_string(row, &["Status"])
            .map_or(GameStatus::Unknown, |label| GameStatus::from_label(&label)),
        start_time: opt_timestamp(row, &["DateTimeUTC", "DateTime", "Day"]),
        venue: opt_string(row, &["StadiumDetails/Name", "Stadium"]),
    }
}

fn full_name(row: &Value) -> String {
    match (opt_string(row, &["City"]), opt_string(row, &["Name"])) {
        (Some(city), Some(team)) => format!("{city} {team}"),
        (None, Some(team)) => team,
        _ => name(row, &["FullName", "Key"]),
    }
}

fn team(row: &Value) -> Team {
    Team {
        id: string_or(row, &["TeamID", "GlobalTeamID"], ""),
        name: full_name(row),
        abbreviation: string_or(row, &["Key"], ""),
        city: string_or(row, &["City"], ""),
        conference: string_or(row, &["Conference"], ""),
    }
}

fn standing(row: &Value) -> Standing {
    let wins = u32_or_zero(row, &["Wins"]);
    let losses = u32_or_zero(row, &["Losses"]);
    let ties = u32_or_zero(row, &["Ties", "OvertimeLosses"]);
    Standing {
        team: full_name(row),
        abbreviation: string_or(row, &["Key", "Team"], ""),
        conference: string_or(row, &["Conference"], ""),
        wins,
        losses,
        ties,
        win_pct: Standing::reported_or_computed_win_pct(
            opt_f64(row, &["Percentage"]),
            wins,
            losses,
            ties,
        ),
    }
}

fn player(row: &Value) -> Player {
    let full = match (opt_string(row, &["FirstName"]), opt_string(row, &["LastName"])) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        (Some(single), None) | (None, Some(single)) => single,
        (None, None) => name(row, &["Name"]),
    };
    Player {
        id: string_or(row, &["PlayerID"], ""),
        name: full,
        team: string_or(row, &["Team"], ""),
        position: string_or(row, &["Position"], ""),
        jersey: opt_u32(row, &["Jersey", "Number"]),
    }
}
