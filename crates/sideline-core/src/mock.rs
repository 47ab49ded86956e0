//! Terminal fallback: canned payloads that cannot fail.

use crate::{Payload, ResourceId};

/// Static payload served when every real source in a chain has failed, or
/// up front as a placeholder while a real fetch is in flight.
#[derive(Debug, Clone, PartialEq)]
pub struct MockProvider {
    payload: Payload,
}

impl MockProvider {
    /// Source name attached to every mocked result.
    pub const SOURCE_NAME: &'static str = "mock";

    pub fn new(payload: Payload) -> Self {
        Self { payload }
    }

    /// Canned fixture for a logical resource.
    pub fn for_resource(resource: ResourceId) -> Self {
        Self::new(fixtures::payload_for(resource.kind, resource.sport))
    }

    pub fn resolve(&self) -> Payload {
        self.payload.clone()
    }
}

pub mod fixtures {
    //! Deterministic sample data, one set per league.

    use crate::{
        BookLine, Game, GameOdds, GameStatus, NewsArticle, Payload, Player, ResourceKind, Sport,
        Standing, Team,
    };

    struct TeamSeed {
        id: &'static str,
        city: &'static str,
        name: &'static str,
        abbreviation: &'static str,
        conference: &'static str,
        wins: u32,
        losses: u32,
        ties: u32,
    }

    const NBA: [TeamSeed; 4] = [
        TeamSeed { id: "2", city: "Boston", name: "Celtics", abbreviation: "BOS", conference: "Eastern", wins: 37, losses: 10, ties: 0 },
        TeamSeed { id: "20", city: "Philadelphia", name: "76ers", abbreviation: "PHI", conference: "Eastern", wins: 29, losses: 17, ties: 0 },
        TeamSeed { id: "25", city: "Oklahoma City", name: "Thunder", abbreviation: "OKC", conference: "Western", wins: 33, losses: 14, ties: 0 },
        TeamSeed { id: "13", city: "Los Angeles", name: "Lakers", abbreviation: "LAL", conference: "Western", wins: 25, losses: 24, ties: 0 },
    ];

    const NFL: [TeamSeed; 4] = [
        TeamSeed { id: "12", city: "Kansas City", name: "Chiefs", abbreviation: "KC", conference: "AFC", wins: 11, losses: 6, ties: 0 },
        TeamSeed { id: "33", city: "Baltimore", name: "Ravens", abbreviation: "BAL", conference: "AFC", wins: 13, losses: 4, ties: 0 },
        TeamSeed { id: "25", city: "San Francisco", name: "49ers", abbreviation: "SF", conference: "NFC", wins: 12, losses: 5, ties: 0 },
        TeamSeed { id: "8", city: "Detroit", name: "Lions", abbreviation: "DET", conference: "NFC", wins: 12, losses: 5, ties: 0 },
    ];

    const NHL: [TeamSeed; 4] = [
        TeamSeed { id: "6", city: "Boston", name: "Bruins", abbreviation: "BOS", conference: "Eastern", wins: 30, losses: 10, ties: 9 },
        TeamSeed { id: "13", city: "Florida", name: "Panthers", abbreviation: "FLA", conference: "Eastern", wins: 32, losses: 15, ties: 3 },
        TeamSeed { id: "21", city: "Vancouver", name: "Canucks", abbreviation: "VAN", conference: "Western", wins: 33, losses: 12, ties: 5 },
        TeamSeed { id: "25", city: "Dallas", name: "Stars", abbreviation: "DAL", conference: "Western", wins: 30, losses: 13, ties: 6 },
    ];

    struct PlayerSeed {
        id: &'static str,
        name: &'static str,
        team: &'static str,
        position: &'static str,
        jersey: u32,
    }

    const NBA_PLAYERS: [PlayerSeed; 3] = [
        PlayerSeed { id: "nba-1", name: "Jayson Tatum", team: "BOS", position: "SF", jersey: 0 },
        PlayerSeed { id: "nba-2", name: "Shai Gilgeous-Alexander", team: "OKC", position: "PG", jersey: 2 },
        PlayerSeed { id: "nba-3", name: "LeBron James", team: "LAL", position: "SF", jersey: 23 },
    ];

    const NFL_PLAYERS: [PlayerSeed; 3] = [
        PlayerSeed { id: "nfl-1", name: "Patrick Mahomes", team: "KC", position: "QB", jersey: 15 },
        PlayerSeed { id: "nfl-2", name: "Lamar Jackson", team: "BAL", position: "QB", jersey: 8 },
        PlayerSeed { id: "nfl-3", name: "Christian McCaffrey", team: "SF", position: "RB", jersey: 23 },
    ];

    const NHL_PLAYERS: [PlayerSeed; 3] = [
        PlayerSeed { id: "nhl-1", name: "David Pastrnak", team: "BOS", position: "RW", jersey: 88 },
        PlayerSeed { id: "nhl-2", name: "Quinn Hughes", team: "VAN", position: "D", jersey: 43 },
        PlayerSeed { id: "nhl-3", name: "Jason Robertson", team: "DAL", position: "LW", jersey: 21 },
    ];

    fn teams_of(sport: Sport) -> &'static [TeamSeed; 4] {
        match sport {
            Sport::Nba => &NBA,
            Sport::Nfl => &NFL,
            Sport::Nhl => &NHL,
        }
    }

    fn players_of(sport: Sport) -> &'static [PlayerSeed; 3] {
        match sport {
            Sport::Nba => &NBA_PLAYERS,
            Sport::Nfl => &NFL_PLAYERS,
            Sport::Nhl => &NHL_PLAYERS,
        }
    }

    fn full_name(seed: &TeamSeed) -> String {
        format!("{} {}", seed.city, seed.name)
    }

    /// Canned payload for a resource. Resources without a sport use the NBA set.
    pub fn payload_for(kind: ResourceKind, sport: Option<Sport>) -> Payload {
        let league = sport.unwrap_or(Sport::Nba);
        match kind {
            ResourceKind::Games => Payload::Games(games(league)),
            ResourceKind::Standings => Payload::Standings(standings(league)),
            ResourceKind::Teams => Payload::Teams(teams(league)),
            ResourceKind::Players => Payload::Players(players(league)),
            ResourceKind::News => Payload::News(news(sport)),
            ResourceKind::Odds => Payload::Odds(odds(league)),
        }
    }

    pub fn teams(sport: Sport) -> Vec<Team> {
        teams_of(sport)
            .iter()
            .map(|seed| Team {
                id: seed.id.to_owned(),
                name: full_name(seed),
                abbreviation: seed.abbreviation.to_owned(),
                city: seed.city.to_owned(),
                conference: seed.conference.to_owned(),
            })
            .collect()
    }

    pub fn games(sport: Sport) -> Vec<Game> {
        let [a, b, c, d] = teams_of(sport);
        let scores = match sport {
            Sport::Nba => (112, 104),
            Sport::Nfl => (27, 24),
            Sport::Nhl => (4, 2),
        };
        vec![
            Game {
                id: format!("{sport}-mock-1"),
                sport: Some(sport),
                home_team: full_name(a),
                away_team: full_name(b),
                home_score: scores.0,
                away_score: scores.1,
                status: GameStatus::Final,
                start_time: Some(String::from("2024-01-05T00:00:00Z")),
                venue: None,
            },
            Game {
                id: format!("{sport}-mock-2"),
                sport: Some(sport),
                home_team: full_name(c),
                away_team: full_name(d),
                home_score: 0,
                away_score: 0,
                status: GameStatus::Scheduled,
                start_time: Some(String::from("2024-01-05T02:30:00Z")),
                venue: None,
            },
        ]
    }

    pub fn standings(sport: Sport) -> Vec<Standing> {
        let mut rows = teams_of(sport)
            .iter()
            .map(|seed| Standing {
                team: full_name(seed),
                abbreviation: seed.abbreviation.to_owned(),
                conference: seed.conference.to_owned(),
                wins: seed.wins,
                losses: seed.losses,
                ties: seed.ties,
                win_pct: Standing::computed_win_pct(seed.wins, seed.losses, seed.ties),
            })
            .collect::<Vec<_>>();
        rows.sort_by(|left, right| right.win_pct.total_cmp(&left.win_pct));
        rows
    }

    pub fn players(sport: Sport) -> Vec<Player> {
        players_of(sport)
            .iter()
            .map(|seed| Player {
                id: seed.id.to_owned(),
                name: seed.name.to_owned(),
                team: seed.team.to_owned(),
                position: seed.position.to_owned(),
                jersey: Some(seed.jersey),
            })
            .collect()
    }

    pub fn news(sport: Option<Sport>) -> Vec<NewsArticle> {
        let label = sport.map_or("League", |sport| match sport {
            Sport::Nba => "NBA",
            Sport::Nfl => "NFL",
            Sport::Nhl => "NHL",
        });
        vec![
            NewsArticle {
                id: format!("{}-news-1", label.to_ascii_lowercase()),
                headline: format!("{label} roundup: live data is temporarily unavailable"),
                summary: String::from("Scores and headlines will refresh automatically."),
                url: None,
                published: None,
                author: String::from("Sideline"),
            },
            NewsArticle {
                id: format!("{}-news-2", label.to_ascii_lowercase()),
                headline: format!("{label} power rankings"),
                summary: String::from("Where every contender stands heading into the weekend."),
                url: None,
                published: None,
                author: String::from("Sideline"),
            },
        ]
    }

    pub fn odds(sport: Sport) -> Vec<GameOdds> {
        games(sport)
            .into_iter()
            .filter(|game| game.status == GameStatus::Scheduled)
            .map(|game| GameOdds {
                game_id: game.id,
                sport: Some(sport),
                home_team: game.home_team,
                away_team: game.away_team,
                commence_time: game.start_time,
                lines: vec![BookLine {
                    bookmaker: String::from("consensus"),
                    home_moneyline: Some(-150),
                    away_moneyline: Some(130),
                    spread: Some(-3.5),
                    total: Some(match sport {
                        Sport::Nba => 221.5,
                        Sport::Nfl => 44.5,
                        Sport::Nhl => 6.0,
                    }),
                }],
            })
            .collect()
    }
}
