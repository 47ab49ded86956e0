//! Behavior-driven tests for HTTP-backed sources against a local server.
//!
//! These tests verify HOW requests are authenticated, how upstream bodies are
//! normalized and how HTTP failures move a chain on to the next source.

use std::io::Write;
use std::sync::Arc;
use std::time::Duration;

use mockito::{Matcher, Server};
use serde_json::json;
use sideline_core::{
    AggregatorBuilder, BackendUpstream, CacheMode, FetchErrorKind, GameStatus, HttpAuth,
    HttpSource, Payload, ReliabilityClass, ReqwestHttpClient, ResourceKey, ResourceKind,
    SourceClient, SourceDescriptor, SourceTimeouts, Sport,
};

fn backend_source(base_url: &str, token: &str) -> HttpSource<BackendUpstream> {
    HttpSource::new(
        SourceDescriptor::new("backend", 0, ReliabilityClass::Primary, Duration::from_secs(5)),
        BackendUpstream::new(base_url),
        Arc::new(ReqwestHttpClient::new()),
    )
    .with_auth(HttpAuth::BearerToken(token.to_owned()))
}

fn espn_scoreboard() -> String {
    json!({
        "events": [{
            "id": "401585601",
            "date": "2024-01-05T00:30Z",
            "status": { "type": { "name": "STATUS_FINAL" } },
            "competitions": [{
                "venue": { "fullName": "TD Garden" },
                "competitors": [
                    { "homeAway": "home", "score": "120", "team": { "displayName": "Boston Celtics" } },
                    { "homeAway": "away", "score": "112", "team": { "displayName": "Miami Heat" } }
                ]
            }]
        }]
    })
    .to_string()
}

// =============================================================================
// Single source
// =============================================================================

#[tokio::test]
async fn when_backend_answers_with_a_data_envelope_games_are_normalized() {
    // Given: A backend that requires a bearer token
    let mut server = Server::new_async().await;
    let mock = server
        .mock("GET", "/api/nba/games")
        .match_header("authorization", "Bearer secret-token")
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "data": [{
                    "id": "g1",
                    "homeTeam": { "name": "Boston Celtics" },
                    "awayTeam": { "name": "Miami Heat" },
                    "homeScore": 120,
                    "awayScore": 112,
                    "status": "Final"
                }]
            })
            .to_string(),
        )
        .create_async()
        .await;
    let source = backend_source(&server.url(), "secret-token");

    // When: NBA games are fetched
    let key = ResourceKey::for_sport(ResourceKind::Games, Sport::Nba);
    let payload = source.fetch(&key).await.expect("backend answers");

    // Then: The token was sent and the row is normalized
    mock.assert_async().await;
    let Payload::Games(games) = payload else {
        panic!("expected games payload");
    };
    assert_eq!(games.len(), 1);
    assert_eq!(games[0].home_team, "Boston Celtics");
    assert_eq!(games[0].away_score, 112);
    assert_eq!(games[0].status, GameStatus::Final);
}

#[tokio::test]
async fn when_backend_returns_an_error_status_the_attempt_fails_with_that_status() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/nhl/standings")
        .with_status(503)
        .create_async()
        .await;
    let source = backend_source(&server.url(), "t");

    let key = ResourceKey::for_sport(ResourceKind::Standings, Sport::Nhl);
    let error = source.fetch(&key).await.expect_err("503 is a failure");

    assert_eq!(error.kind(), FetchErrorKind::HttpError(503));
}

#[tokio::test]
async fn when_backend_returns_html_the_attempt_fails_as_a_parse_error() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/news")
        .with_status(200)
        .with_body("<html>maintenance</html>")
        .create_async()
        .await;
    let source = backend_source(&server.url(), "t");

    let error = source
        .fetch(&ResourceKey::new(ResourceKind::News))
        .await
        .expect_err("not JSON");

    assert_eq!(error.kind(), FetchErrorKind::ParseError);
}

// =============================================================================
// Chains built from configuration
// =============================================================================

#[tokio::test]
async fn when_backend_fails_espn_serves_the_scoreboard() {
    // Given: Backend and ESPN both pointed at the local server
    let mut server = Server::new_async().await;
    let backend = server
        .mock("GET", "/api/nba/games")
        .with_status(500)
        .create_async()
        .await;
    let espn = server
        .mock("GET", "/apis/site/v2/sports/basketball/nba/scoreboard")
        .match_query(Matcher::UrlEncoded("dates".into(), "20240105".into()))
        .with_status(200)
        .with_body(espn_scoreboard())
        .create_async()
        .await;
    let aggregator = AggregatorBuilder::new()
        .with_backend_url(server.url())
        .with_espn_base_url(server.url())
        .build();

    // When: NBA games for a date are fetched
    let date = sideline_core::GameDate::parse("2024-01-05").expect("valid date");
    let key = ResourceKey::for_sport(ResourceKind::Games, Sport::Nba).with_date(date);
    let result = aggregator
        .fetch(&key, CacheMode::Use)
        .await
        .expect("espn answers");

    // Then: ESPN served real data and the backend failure is recorded
    backend.assert_async().await;
    espn.assert_async().await;
    assert_eq!(result.source_name(), "espn");
    assert!(result.is_real_data());
    assert_eq!(result.failures().len(), 1);
    assert_eq!(result.failures()[0].source, "backend");

    let Payload::Games(games) = result.payload() else {
        panic!("expected games payload");
    };
    assert_eq!(games[0].home_team, "Boston Celtics");
    assert_eq!(games[0].home_score, 120);
}

#[tokio::test]
async fn when_vendor_keys_are_configured_they_are_sent_the_way_each_vendor_expects() {
    // Given: SportsDataIO (header key) and The Odds API (query key)
    let mut server = Server::new_async().await;
    let sportsdata = server
        .mock("GET", "/nfl/scores/json/teams")
        .match_header("ocp-apim-subscription-key", "sd-key")
        .with_status(200)
        .with_body(json!([{ "TeamID": 1, "Key": "KC", "City": "Kansas City", "Name": "Chiefs" }]).to_string())
        .create_async()
        .await;
    let odds = server
        .mock("GET", "/sports/americanfootball_nfl/odds")
        .match_query(Matcher::UrlEncoded("apiKey".into(), "odds-key".into()))
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;
    let aggregator = AggregatorBuilder::new()
        .with_sportsdata_key("sd-key")
        .with_sportsdata_base_url(server.url())
        .with_odds_api_key("odds-key")
        .with_odds_api_base_url(server.url())
        .with_espn_enabled(false)
        .build();

    // When: Teams and odds are aggregated
    let teams_key = ResourceKey::for_sport(ResourceKind::Teams, Sport::Nfl);
    let odds_key = ResourceKey::for_sport(ResourceKind::Odds, Sport::Nfl);
    let result = aggregator.aggregate([teams_key.clone(), odds_key.clone()]).await;

    // Then: Both vendors answered with live data
    sportsdata.assert_async().await;
    odds.assert_async().await;
    assert!(!result.partial_failure());

    let teams = result
        .get(&teams_key)
        .and_then(|outcome| outcome.as_ref().ok())
        .expect("teams resolved");
    assert_eq!(teams.source_name(), "sportsdata");
    assert_eq!(teams.payload().len(), 1);

    let lines = result
        .get(&odds_key)
        .and_then(|outcome| outcome.as_ref().ok())
        .expect("odds resolved");
    assert_eq!(lines.source_name(), "odds_api");
}

#[tokio::test]
async fn when_a_source_is_slower_than_its_timeout_the_chain_falls_back_to_mock() {
    // Given: A backend that takes longer than the primary timeout
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api/nba/teams")
        .with_status(200)
        .with_chunked_body(|writer| {
            std::thread::sleep(Duration::from_millis(500));
            writer.write_all(b"{\"data\":[]}")
        })
        .create_async()
        .await;
    let aggregator = AggregatorBuilder::new()
        .with_backend_url(server.url())
        .with_espn_enabled(false)
        .with_timeouts(SourceTimeouts {
            primary: Duration::from_millis(100),
            ..SourceTimeouts::default()
        })
        .build();

    // When: NBA teams are fetched
    let key = ResourceKey::for_sport(ResourceKind::Teams, Sport::Nba);
    let result = aggregator
        .fetch(&key, CacheMode::Bypass)
        .await
        .expect("mock answers");

    // Then: The mock is served and the timeout is recorded
    assert!(result.degraded());
    assert_eq!(result.failures()[0].code, "source.timeout");
}
