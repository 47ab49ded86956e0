//! The dashboard's own backend, first in every chain.
//!
//! Serves every resource at `{base}/api/{sport}/{kind}` (news also without a
//! sport at `{base}/api/news`). Bodies are either `{"data": [...]}` or a bare
//! array; item fields come in camelCase or snake_case depending on the
//! endpoint's vintage, so both spellings are read.

use serde_json::Value;

use super::normalize_base;
use crate::http_client::HttpRequest;
use crate::source::{FetchError, Upstream};
use crate::transform::fields::{
    items, name, opt_f64, opt_i32, opt_string, opt_timestamp, opt_u32, string_or, u32_or_zero,
};
use crate::transform::{list_container, RawResponse, Transformer};
use crate::{
    BookLine, Game, GameOdds, GameStatus, NewsArticle, Payload, Player, ResourceKey, ResourceKind,
    Sport, Standing, Team,
};

#[derive(Debug, Clone)]
pub struct BackendUpstream {
    base_url: String,
}

impl BackendUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

impl Upstream for BackendUpstream {
    fn supports(&self, _kind: ResourceKind) -> bool {
        true
    }

    fn request(&self, key: &ResourceKey) -> Result<HttpRequest, FetchError> {
        let url = match (key.sport, key.kind) {
            (Some(sport), kind) => format!("{}/api/{sport}/{kind}", self.base_url),
            (None, ResourceKind::News) => format!("{}/api/news", self.base_url),
            (None, kind) => {
                return Err(FetchError::unsupported(format!(
                    "backend has no league-wide {kind} endpoint"
                )))
            }
        };

        let mut request = HttpRequest::get(url).with_header("Accept", "application/json");
        if let Some(date) = key.date {
            request = request.with_query("date", date.to_string());
        }
        if let Some(limit) = key.limit {
            request = request.with_query("limit", limit.to_string());
        }
        Ok(request)
    }

    fn wrap(&self, body: Value) -> RawResponse {
        RawResponse::Backend(body)
    }
}

impl Transformer for BackendUpstream {
    fn transform(
        &self,
        kind: ResourceKind,
        sport: Option<Sport>,
        raw: &RawResponse,
    ) -> Option<Payload> {
        let RawResponse::Backend(body) = raw else {
            return None;
        };
        let rows = list_container(body, &["data"])?;

        Some(match kind {
            ResourceKind::Games => Payload::Games(rows.iter().map(|row| game(row, sport)).collect()),
            ResourceKind::Standings => Payload::Standings(rows.iter().map(standing).collect()),
            ResourceKind::Teams => Payload::Teams(rows.iter().map(team).collect()),
            ResourceKind::Players => Payload::Players(rows.iter().map(player).collect()),
            ResourceKind::News => Payload::News(rows.iter().map(article).collect()),
            ResourceKind::Odds => Payload::Odds(rows.iter().map(|row| odds(row, sport)).collect()),
        })
    }
}

fn game(row: &Value, sport: Option<Sport>) -> Game {
    Game {
        id: string_or(row, &["id", "gameId", "game_id"], ""),
        sport: opt_string(row, &["sport"])
            .and_then(|label| label.parse().ok())
            .or(sport),
        home_team: name(row, &["homeTeam/name", "homeTeam", "home_team"]),
        away_team: name(row, &["awayTeam/name", "awayTeam", "away_team"]),
        home_score: u32_or_zero(row, &["homeScore", "home_score"]),
        away_score: u32_or_zero(row, &["awayScore", "away_score"]),
        status: opt_string(row, &["status"])
            .map_or(GameStatus::Unknown, |label| GameStatus::from_label(&label)),
        start_time: opt_timestamp(row, &["startTime", "start_time", "date"]),
        venue: opt_string(row, &["venue/name", "venue"]),
    }
}

fn team(row: &Value) -> Team {
    Team {
        id: string_or(row, &["id", "teamId", "team_id"], ""),
        name: name(row, &["name", "displayName", "display_name"]),
        abbreviation: string_or(row, &["abbreviation", "abbr"], ""),
        city: string_or(row, &["city", "location"], ""),
        conference: string_or(row, &["conference"], ""),
    }
}

fn standing(row: &Value) -> Standing {
    let wins = u32_or_zero(row, &["wins"]);
    let losses = u32_or_zero(row, &["losses"]);
    let ties = u32_or_zero(row, &["ties", "otLosses", "ot_losses"]);
    Standing {
        team: name(row, &["team/name", "teamName", "team_name", "team"]),
        abbreviation: string_or(row, &["team/abbreviation", "abbreviation"], ""),
        conference: string_or(row, &["conference"], ""),
        wins,
        losses,
        ties,
        win_pct: Standing::reported_or_computed_win_pct(
            opt_f64(row, &["winPct", "win_pct", "winPercentage"]),
            wins,
            losses,
            ties,
        ),
    }
}

fn player(row: &Value) -> Player {
    Player {
        id: string_or(row, &["id", "playerId", "player_id"], ""),
        name: name(row, &["name", "fullName", "full_name"]),
        team: string_or(row, &["team/abbreviation", "team"], ""),
        position: string_or(row, &["position"], ""),
        jersey: opt_u32(row, &["jersey", "jerseyNumber", "jersey_number"]),
    }
}

fn article(row: &Value) -> NewsArticle {
    NewsArticle {
        id: string_or(row, &["id"], ""),
        headline: name(row, &["headline", "title"]),
        summary: string_or(row, &["summary", "description"], ""),
        url: opt_string(row, &["url", "link"]),
        published: opt_timestamp(row, &["publishedAt", "published_at", "published"]),
        author: name(row, &["author", "source"]),
    }
}

fn odds(row: &Value, sport: Option<Sport>) -> GameOdds {
    GameOdds {
        game_id: string_or(row, &["gameId", "game_id", "id"], ""),
        sport: opt_string(row, &["sport"])
            .and_then(|label| label.parse().ok())
            .or(sport),
        home_team: name(row, &["homeTeam", "home_team"]),
        away_team: name(row, &["awayTeam", "away_team"]),
        commence_time: opt_timestamp(row, &["commenceTime", "commence_time", "startTime"]),
        lines: items(row, &["lines", "bookmakers"])
            .iter()
            .map(|line| BookLine {
                bookmaker: name(line, &["bookmaker", "name"]),
                home_moneyline: opt_i32(line, &["homeMoneyline", "home_moneyline"]),
                away_moneyline: opt_i32(line, &["awayMoneyline", "away_moneyline"]),
                spread: opt_f64(line, &["spread"]),
                total: opt_f64(line, &["total", "overUnder"]).filter(|total| *total > 0.0),
            })
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn builds_sport_scoped_and_league_wide_urls() {
        let upstream = BackendUpstream::new("https://api.sideline.test/");

        let games = ResourceKey::for_sport(ResourceKind::Games, Sport::Nba)
            .with_limit(5)
            .expect("non-zero");
        let request = upstream.request(&games).expect("supported");
        assert_eq!(request.url, "https://api.sideline.test/api/nba/games?limit=5");

        let news = upstream
            .request(&ResourceKey::new(ResourceKind::News))
            .expect("supported");
        assert_eq!(news.url, "https://api.sideline.test/api/news");

        assert!(upstream.request(&ResourceKey::new(ResourceKind::Teams)).is_err());
    }

    #[test]
    fn reads_camel_and_snake_case_rows() {
        let upstream = BackendUpstream::new("http://localhost");
        let raw = RawResponse::Backend(json!({
            "data": [
                { "id": 1, "homeTeam": "Celtics", "awayTeam": "Heat", "homeScore": 101, "awayScore": "99", "status": "final" },
                { "game_id": "2", "home_team": "Lakers", "status": "scheduled" }
            ]
        }));

        let Some(Payload::Games(games)) =
            upstream.transform(ResourceKind::Games, Some(Sport::Nba), &raw)
        else {
            panic!("games payload");
        };

        assert_eq!(games[0].id, "1");
        assert_eq!(games[0].away_score, 99);
        assert_eq!(games[0].status, GameStatus::Final);
        assert_eq!(games[1].away_team, crate::UNKNOWN);
        assert_eq!(games[1].sport, Some(Sport::Nba));
    }

    #[test]
    fn standings_fall_back_to_computed_win_pct() {
        let upstream = BackendUpstream::new("http://localhost");
        let raw = RawResponse::Backend(json!([{ "team": "Bruins", "wins": 3, "losses": 1 }]));

        let Some(Payload::Standings(rows)) =
            upstream.transform(ResourceKind::Standings, Some(Sport::Nhl), &raw)
        else {
            panic!("standings payload");
        };
        assert_eq!(rows[0].win_pct, 0.75);
    }

    #[test]
    fn standings_with_records_near_u32_max_stay_in_range() {
        let upstream = BackendUpstream::new("http://localhost");
        let raw = RawResponse::Backend(json!([
            { "team": "X", "wins": 4_000_000_000_u64, "losses": 4_000_000_000_u64 },
            { "team": "Y", "wins": 1e300, "losses": -3, "ties": 2, "winPct": 12.5 }
        ]));

        let Some(Payload::Standings(rows)) =
            upstream.transform(ResourceKind::Standings, Some(Sport::Nba), &raw)
        else {
            panic!("standings payload");
        };

        assert_eq!(rows[0].wins, 4_000_000_000);
        assert_eq!(rows[0].win_pct, 0.5);
        assert_eq!((rows[1].wins, rows[1].losses, rows[1].ties), (0, 0, 2));
        assert_eq!(rows[1].win_pct, 0.5);
    }

    #[test]
    fn rejects_bodies_without_a_list() {
        let upstream = BackendUpstream::new("http://localhost");
        let raw = RawResponse::Backend(json!({ "error": "maintenance" }));
        assert!(upstream.transform(ResourceKind::News, None, &raw).is_none());

        let foreign = RawResponse::Espn(json!([]));
        assert!(upstream.transform(ResourceKind::News, None, &foreign).is_none());
    }
}
