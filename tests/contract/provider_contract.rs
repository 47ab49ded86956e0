use serde_json::json;
use sideline_core::{
    BackendUpstream, EspnUpstream, FetchErrorKind, OddsApiUpstream, Payload, RawResponse,
    ResourceKey, ResourceKind, Sport, SportsDataUpstream, Transformer, Upstream,
};

struct UpstreamCase {
    name: &'static str,
    base_url: &'static str,
    upstream: Box<dyn Upstream>,
    kinds: &'static [ResourceKind],
    league_wide: bool,
}

fn upstream_cases() -> Vec<UpstreamCase> {
    vec![
        UpstreamCase {
            name: "backend",
            base_url: "http://backend.test",
            upstream: Box::new(BackendUpstream::new("http://backend.test/")),
            kinds: &ResourceKind::ALL,
            league_wide: true,
        },
        UpstreamCase {
            name: "sportsdata",
            base_url: "https://api.sportsdata.io/v3",
            upstream: Box::new(SportsDataUpstream::default()),
            kinds: &[
                ResourceKind::Games,
                ResourceKind::Standings,
                ResourceKind::Teams,
                ResourceKind::Players,
            ],
            league_wide: false,
        },
        UpstreamCase {
            name: "odds_api",
            base_url: "https://api.the-odds-api.com/v4",
            upstream: Box::new(OddsApiUpstream::default()),
            kinds: &[ResourceKind::Odds],
            league_wide: false,
        },
        UpstreamCase {
            name: "espn",
            base_url: "https://site.api.espn.com",
            upstream: Box::new(EspnUpstream::default()),
            kinds: &[
                ResourceKind::Games,
                ResourceKind::Standings,
                ResourceKind::Teams,
                ResourceKind::News,
            ],
            league_wide: false,
        },
    ]
}

#[test]
fn supported_kinds_match_declared_capabilities() {
    for case in upstream_cases() {
        for kind in ResourceKind::ALL {
            assert_eq!(
                case.upstream.supports(kind),
                case.kinds.contains(&kind),
                "upstream '{}': supports({kind})",
                case.name
            );
        }
    }
}

#[test]
fn requests_for_every_league_target_the_upstream_base() {
    for case in upstream_cases() {
        for &kind in case.kinds {
            for sport in Sport::ALL {
                let key = ResourceKey::for_sport(kind, sport);
                let request = case.upstream.request(&key).unwrap_or_else(|error| {
                    panic!("upstream '{}' rejected {key}: {error}", case.name)
                });
                assert!(
                    request.url.starts_with(case.base_url),
                    "upstream '{}': {} does not start with {}",
                    case.name,
                    request.url,
                    case.base_url
                );
                assert!(
                    !request.url.contains("//api/"),
                    "upstream '{}': doubled slash in {}",
                    case.name,
                    request.url
                );
            }
        }
    }
}

#[test]
fn league_wide_requests_are_only_served_by_league_wide_upstreams() {
    let key = ResourceKey::new(ResourceKind::News);

    for case in upstream_cases() {
        let outcome = case.upstream.request(&key);
        if case.league_wide {
            assert!(outcome.is_ok(), "upstream '{}': league-wide news", case.name);
        } else {
            let error = outcome.expect_err("sport is required");
            assert_eq!(
                error.kind(),
                FetchErrorKind::Unsupported,
                "upstream '{}': error kind",
                case.name
            );
        }
    }
}

#[test]
fn empty_lists_transform_into_empty_payloads_of_the_requested_kind() {
    for case in upstream_cases() {
        let raw = case.upstream.wrap(json!([]));
        for &kind in case.kinds {
            let payload = case
                .upstream
                .transform(kind, Some(Sport::Nba), &raw)
                .unwrap_or_else(|| panic!("upstream '{}': {kind} from []", case.name));
            assert_eq!(payload.kind(), kind, "upstream '{}': payload kind", case.name);
            assert!(payload.is_empty(), "upstream '{}': {kind} not empty", case.name);
        }
    }
}

#[test]
fn bodies_without_a_list_container_are_rejected() {
    for case in upstream_cases() {
        let raw = case.upstream.wrap(json!({ "message": "Service Unavailable" }));
        for &kind in case.kinds {
            assert!(
                case.upstream.transform(kind, Some(Sport::Nba), &raw).is_none(),
                "upstream '{}': {kind} accepted a body with no list",
                case.name
            );
        }
    }
}

#[test]
fn responses_from_another_family_are_rejected() {
    let foreign = [
        RawResponse::Backend(json!([])),
        RawResponse::SportsData(json!([])),
        RawResponse::OddsApi(json!([])),
        RawResponse::Espn(json!([])),
        RawResponse::Fixture(json!([])),
    ];

    for case in upstream_cases() {
        let own = case.upstream.wrap(json!([]));
        for raw in foreign
            .iter()
            .filter(|raw| std::mem::discriminant(*raw) != std::mem::discriminant(&own))
        {
            for &kind in case.kinds {
                assert!(
                    case.upstream.transform(kind, Some(Sport::Nba), raw).is_none(),
                    "upstream '{}': accepted a {} response",
                    case.name,
                    raw.family()
                );
            }
        }
    }
}

/// One row carrying every vendor's field spellings with out-of-range,
/// negative or mistyped values.
fn hostile_row() -> serde_json::Value {
    let huge = json!(4_000_000_000_u64);
    let stats = json!([
        { "name": "wins", "value": 1e300 },
        { "name": "losses", "value": huge },
        { "name": "ties", "value": -4 },
        { "name": "winPercent", "value": 250.0 }
    ]);
    json!({
        "id": { "nested": true },
        "team": { "displayName": null, "abbreviation": 7 },
        "status": 42,
        "wins": huge, "losses": huge, "ties": huge,
        "Wins": 1e300, "Losses": -12, "Ties": "many", "Percentage": "abc",
        "winPct": -0.5,
        "homeScore": 1e300, "awayScore": "-12",
        "HomeTeamScore": huge, "AwayTeamScore": [1, 2],
        "jersey": 1e12, "Jersey": -1,
        "headline": ["not", "text"],
        "home_team": 5, "away_team": null,
        "stats": stats,
        "standings": { "entries": [{ "team": { "displayName": "X" }, "stats": stats }] },
        "competitions": [{ "competitors": [
            { "homeAway": "home", "score": 1e300, "team": { "displayName": 3 } },
            { "homeAway": "away", "score": "NaN" }
        ]}],
        "lines": [{ "homeMoneyline": 1e300, "awayMoneyline": "-1e12", "spread": "wide", "total": -4 }],
        "bookmakers": [{ "title": null, "markets": [
            { "key": "h2h", "outcomes": [{ "name": "5", "price": 1e300 }] },
            { "key": "totals", "outcomes": [{ "point": "inf" }] }
        ]}]
    })
}

#[test]
fn hostile_rows_transform_into_bounded_defaults() {
    for case in upstream_cases() {
        let raw = case.upstream.wrap(json!([hostile_row()]));
        for &kind in case.kinds {
            let payload = case
                .upstream
                .transform(kind, Some(Sport::Nhl), &raw)
                .unwrap_or_else(|| panic!("upstream '{}': {kind} from a hostile row", case.name));
            assert_eq!(payload.kind(), kind, "upstream '{}': payload kind", case.name);
            assert!(!payload.is_empty(), "upstream '{}': {kind} dropped the row", case.name);

            match &payload {
                Payload::Standings(rows) => {
                    for row in rows {
                        assert!(
                            (0.0..=1.0).contains(&row.win_pct),
                            "upstream '{}': win_pct {} out of range",
                            case.name,
                            row.win_pct
                        );
                        assert!(!row.team.is_empty(), "upstream '{}': empty team", case.name);
                    }
                }
                Payload::Odds(games) => {
                    for line in games.iter().flat_map(|game| &game.lines) {
                        assert!(line.spread.map_or(true, f64::is_finite), "upstream '{}'", case.name);
                        assert!(line.total.map_or(true, f64::is_finite), "upstream '{}'", case.name);
                        assert_eq!(line.home_moneyline, None, "upstream '{}'", case.name);
                    }
                }
                Payload::Games(games) => {
                    for game in games {
                        assert!(!game.home_team.is_empty(), "upstream '{}'", case.name);
                    }
                }
                Payload::Teams(_) | Payload::Players(_) | Payload::News(_) => {}
            }

            serde_json::to_string(&payload)
                .unwrap_or_else(|error| panic!("upstream '{}': {kind} serializes: {error}", case.name));
        }
    }
}
