//! ESPN's public site API: keyless, rate-unlimited in practice, last real
//! source before the mock.

use serde_json::Value;

use super::{normalize_base, require_sport};
use crate::http_client::HttpRequest;
use crate::source::{FetchError, Upstream};
use crate::transform::fields::{
    first, items, name, opt_f64, opt_string, opt_timestamp, string_or, u32_or_zero,
};
use crate::transform::{list_container, RawResponse, Transformer};
use crate::{
    Game, GameStatus, NewsArticle, Payload, ResourceKey, ResourceKind, Sport, Standing, Team,
};

pub const DEFAULT_BASE_URL: &str = "https://site.api.espn.com";

#[derive(Debug, Clone)]
pub struct EspnUpstream {
    base_url: String,
}

impl Default for EspnUpstream {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl EspnUpstream {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base(base_url),
        }
    }
}

const fn league_path(sport: Sport) -> &'static str {
    match sport {
        Sport::Nba => "basketball/nba",
        Sport::Nfl => "football/nfl",
        Sport::Nhl => "hockey/nhl",
    }
}

impl Upstream for EspnUpstream {
    fn supports(&self, kind: ResourceKind) -> bool {
        matches!(
            kind,
            ResourceKind::Games | ResourceKind::Standings | ResourceKind::Teams | ResourceKind::News
        )
    }

    fn request(&self, key: &ResourceKey) -> Result<HttpRequest, FetchError> {
        let league = league_path(require_sport("espn", key)?);
        let site = format!("{}/apis/site/v2/sports/{league}", self.base_url);

        let request = match key.kind {
            ResourceKind::Games => {
                let request = HttpRequest::get(format!("{site}/scoreboard"));
                match key.date {
                    Some(date) => request.with_query("dates", date.compact()),
                    None => request,
                }
            }
            ResourceKind::Teams => HttpRequest::get(format!("{site}/teams")),
            ResourceKind::News => {
                let request = HttpRequest::get(format!("{site}/news"));
                match key.limit {
                    Some(limit) => request.with_query("limit", limit.to_string()),
                    None => request,
                }
            }
            // Standings live outside the `site` tree.
            ResourceKind::Standings => HttpRequest::get(format!(
                "{}/apis/v2/sports/{league}/standings",
                self.base_url
            )),
            ResourceKind::Players | ResourceKind::Odds => {
                return Err(FetchError::unsupported(format!(
                    "espn does not serve {}",
                    key.kind
                )))
            }
        };
        Ok(request)
    }

    fn wrap(&self, body: Value) -> RawResponse {
        RawResponse::Espn(body)
    }
}

impl Transformer for EspnUpstream {
    fn transform(
        &self,
        kind: ResourceKind,
        sport: Option<Sport>,
        raw: &RawResponse,
    ) -> Option<Payload> {
        let RawResponse::Espn(body) = raw else {
            return None;
        };

        match kind {
            ResourceKind::Games => {
                let events = list_container(body, &["events"])?;
                Some(Payload::Games(
                    events.iter().map(|event| game(event, sport)).collect(),
                ))
            }
            ResourceKind::Teams => {
                let teams = list_container(body, &["sports/0/leagues/0/teams"])?;
                Some(Payload::Teams(teams.iter().map(team).collect()))
            }
            ResourceKind::News => {
                let articles = list_container(body, &["articles"])?;
                Some(Payload::News(articles.iter().map(article).collect()))
            }
            ResourceKind::Standings => {
                let groups = list_container(body, &["children"])?;
                Some(Payload::Standings(standings(groups)))
            }
            ResourceKind::Players | ResourceKind::Odds => None,
        }
    }
}

fn competitor<'a>(event: &'a Value, side: &str) -> Option<&'a Value> {
    items(event, &["competitions/0/competitors"])
        .iter()
        .find(|entry| opt_string(entry, &["homeAway"]).as_deref() == Some(side))
}

fn game(event: &Value, sport: Option<Sport>) -> Game {
    let home = competitor(event, "home");
    let away = competitor(event, "away");
    let team_name = |side: Option<&Value>| {
        side.map_or_else(
            || String::from(crate::UNKNOWN),
            |c| name(c, &["team/displayName", "team/name"]),
        )
    };
    let score = |side: Option<&Value>| side.map_or(0, |c| u32_or_zero(c, &["score"]));

    Game {
        id: string_or(event, &["id"], ""),
        sport,
        home_team: team_name(home),
        away_team: team_name(away),
        home_score: score(home),
        away_score: score(away),
        status: opt_string(event, &["status/type/name", "status/type/state"])
            .map_or(GameStatus::Unknown, |label| GameStatus::from_label(&label)),
        start_time: opt_timestamp(event, &["date"]),
        venue: opt_string(event, &["competitions/0/venue/fullName"]),
    }
}

fn team(entry: &Value) -> Team {
    // Entries are `{ "team": { ... } }`; accept the bare object too.
    let team = first(entry, &["team"]).unwrap_or(entry);
    Team {
        id: string_or(team, &["id"], ""),
        name: name(team, &["displayName", "name"]),
        abbreviation: string_or(team, &["abbreviation"], ""),
        city: string_or(team, &["location"], ""),
        conference: String::new(),
    }
}

fn article(entry: &Value) -> NewsArticle {
    NewsArticle {
        id: string_or(entry, &["id", "dataSourceIdentifier"], ""),
        headline: name(entry, &["headline"]),
        summary: string_or(entry, &["description"], ""),
        url: opt_string(entry, &["links/web/href"]),
        published: opt_timestamp(entry, &["published", "lastModified"]),
        author: string_or(entry, &["byline"], "ESPN"),
    }
}

/// Looks up a named entry in an ESPN `stats` array.
fn stat(entry: &Value, stat_name: &str) -> Option<f64> {
    items(entry, &["stats"])
        .iter()
        .find(|stat| {
            opt_string(stat, &["name"]).as_deref() == Some(stat_name)
                || opt_string(stat, &["type"]).as_deref() == Some(stat_name)
        })
        .and_then(|stat| opt_f64(stat, &["value"]))
}

fn standings(groups: &[Value]) -> Vec<Standing> {
    groups
        .iter()
        .flat_map(|group| {
            let conference = string_or(group, &["name", "abbreviation"], "");
            items(group, &["standings/entries"])
                .iter()
                .map(move |entry| {
                    let count = |stat_name: &str| {
                        stat(entry, stat_name)
                            .filter(|value| (0.0..=f64::from(u32::MAX)).contains(value))
                            .map_or(0, |value| value as u32)
                    };
                    let wins = count("wins");
                    let losses = count("losses");
                    let ties = match count("ties") {
                        0 => count("otLosses"),
                        ties => ties,
                    };
                    Standing {
                        team: name(entry, &["team/displayName", "team/name"]),
                        abbreviation: string_or(entry, &["team/abbreviation"], ""),
                        conference: conference.clone(),
                        wins,
                        losses,
                        ties,
                        win_pct: Standing::reported_or_computed_win_pct(
                            stat(entry, "winPercent"),
                            wins,
                            losses,
                            ties,
                        ),
                    }
                })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::GameDate;

    #[test]
    fn scoreboard_request_uses_compact_date() {
        let key = ResourceKey::for_sport(ResourceKind::Games, Sport::Nhl)
            .with_date(GameDate::parse("2024-01-05").expect("valid date"));
        let request = EspnUpstream::default().request(&key).expect("supported");

        assert_eq!(
            request.url,
            "https://site.api.espn.com/apis/site/v2/sports/hockey/nhl/scoreboard?dates=20240105"
        );
    }

    #[test]
    fn standings_use_the_core_api_tree() {
        let key = ResourceKey::for_sport(ResourceKind::Standings, Sport::Nfl);
        let request = EspnUpstream::new("http://espn.test/")
            .request(&key)
            .expect("supported");
        assert_eq!(request.url, "http://espn.test/apis/v2/sports/football/nfl/standings");
    }

    #[test]
    fn scoreboard_events_become_games() {
        let raw = RawResponse::Espn(json!({
            "events": [{
                "id": "401585601",
                "date": "2024-01-06T00:30Z",
                "status": { "type": { "name": "STATUS_FINAL", "state": "post" } },
                "competitions": [{
                    "venue": { "fullName": "TD Garden" },
                    "competitors": [
                        { "homeAway": "away", "score": "108", "team": { "displayName": "Milwaukee Bucks" } },
                        { "homeAway": "home", "score": "115", "team": { "displayName": "Boston Celtics" } }
                    ]
                }]
            }]
        }));

        let Some(Payload::Games(games)) =
            EspnUpstream::default().transform(ResourceKind::Games, Some(Sport::Nba), &raw)
        else {
            panic!("games payload");
        };

        let game = &games[0];
        assert_eq!(game.home_team, "Boston Celtics");
        assert_eq!(game.home_score, 115);
        assert_eq!(game.away_score, 108);
        assert_eq!(game.status, GameStatus::Final);
        assert_eq!(game.venue.as_deref(), Some("TD Garden"));
        assert_eq!(game.start_time.as_deref(), Some("2024-01-06T00:30:00Z"));
    }

    #[test]
    fn standings_read_named_stats() {
        let raw = RawResponse::Espn(json!({
            "children": [{
                "name": "Eastern Conference",
                "standings": { "entries": [{
                    "team": { "displayName": "Boston Bruins", "abbreviation": "BOS" },
                    "stats": [
                        { "name": "wins", "value": 30 },
                        { "name": "losses", "value": 10 },
                        { "name": "otLosses", "value": 9 }
                    ]
                }]}
            }]
        }));

        let Some(Payload::Standings(rows)) =
            EspnUpstream::default().transform(ResourceKind::Standings, Some(Sport::Nhl), &raw)
        else {
            panic!("standings payload");
        };

        assert_eq!(rows[0].conference, "Eastern Conference");
        assert_eq!(rows[0].ties, 9);
        assert_eq!(rows[0].win_pct, Standing::computed_win_pct(30, 10, 9));
    }

    #[test]
    fn events_without_competitions_degrade_to_defaults() {
        let raw = RawResponse::Espn(json!({ "events": [{ "id": "1" }] }));
        let Some(Payload::Games(games)) =
            EspnUpstream::default().transform(ResourceKind::Games, None, &raw)
        else {
            panic!("games payload");
        };

        assert_eq!(games[0].home_team, crate::UNKNOWN);
        assert_eq!(games[0].home_score, 0);
        assert_eq!(games[0].status, GameStatus::Unknown);
    }

    #[test]
    fn news_without_articles_is_rejected() {
        let raw = RawResponse::Espn(json!({ "header": "News" }));
        assert!(EspnUpstream::default()
            .transform(ResourceKind::News, Some(Sport::Nba), &raw)
            .is_none());
    }
}
