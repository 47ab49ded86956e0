//! CLI argument definitions for sideline.
//!
//! # Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `fetch` | Resolve one resource through its fallback chain |
//! | `home` | Games for every league plus news, fetched concurrently |
//! | `sources` | Show the fallback chain registered for a resource |
//!
//! # Global Options
//!
//! | Option | Default | Description |
//! |--------|---------|-------------|
//! | `--format` | `json` | Output format (json, table) |
//! | `--pretty` | `false` | Pretty-print JSON output |
//! | `--strict` | `false` | Fail (exit 5) when any result is simulated |
//! | `--offline` | `false` | Serve canned data only |
//!
//! # Examples
//!
//! ```bash
//! sideline fetch games --sport nba --date 2024-01-05
//! sideline fetch news --limit 5 --pretty
//! sideline home --format table
//! sideline sources odds --sport nfl
//! ```

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Sports data with graceful degradation.
///
/// Every request walks backend → vendor APIs → public APIs and falls back to
/// simulated data when all of them fail.
#[derive(Debug, Parser)]
#[command(
    name = "sideline",
    author,
    version,
    about = "Resilient sports data CLI",
    long_about = "sideline resolves scores, standings, rosters, news and odds through \
a cached fallback chain of upstream providers.\n\
\n\
Upstreams are enabled through environment variables:\n\
  SIDELINE_BACKEND_URL, SIDELINE_BACKEND_TOKEN,\n\
  SIDELINE_SPORTSDATA_API_KEY, SIDELINE_ODDS_API_KEY,\n\
  SIDELINE_DISABLE_ESPN\n\
\n\
Set SIDELINE_LOG (e.g. 'debug') to see each source attempt on stderr."
)]
pub struct Cli {
    /// Output format for results.
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Pretty-print JSON output with indentation.
    #[arg(long, global = true, default_value_t = false)]
    pub pretty: bool,

    /// Exit with code 5 if any result is simulated or failed.
    #[arg(long, global = true, default_value_t = false)]
    pub strict: bool,

    /// Skip every upstream and serve canned data.
    #[arg(long, global = true, default_value_t = false)]
    pub offline: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Output format options.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object output.
    Json,
    /// Human-readable summary.
    Table,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Fetch one resource.
    ///
    /// # Examples
    ///
    ///   sideline fetch games --sport nba
    ///   sideline fetch standings --sport nhl --refresh
    Fetch(FetchArgs),

    /// Fetch the home screen: games for every league plus news.
    Home(HomeArgs),

    /// Show the sources a resource falls back through.
    Sources(SourcesArgs),
}

#[derive(Debug, Args)]
pub struct FetchArgs {
    /// Resource kind: games, standings, teams, players, news, odds.
    pub resource: String,

    /// League: nba, nfl, nhl. Only news may omit it.
    #[arg(long)]
    pub sport: Option<String>,

    /// Date as YYYY-MM-DD.
    #[arg(long)]
    pub date: Option<String>,

    /// Maximum number of items to return.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Ignore any cached value and query upstream.
    #[arg(long, default_value_t = false)]
    pub refresh: bool,
}

#[derive(Debug, Args)]
pub struct HomeArgs {
    /// Scoreboard date as YYYY-MM-DD (default: today, UTC).
    #[arg(long)]
    pub date: Option<String>,

    /// Number of headlines to include.
    #[arg(long, default_value_t = 10)]
    pub news_limit: usize,
}

#[derive(Debug, Args)]
pub struct SourcesArgs {
    /// Resource kind.
    pub resource: String,

    /// League; omit for league-wide news.
    #[arg(long)]
    pub sport: Option<String>,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_fetch_with_global_flags_after_subcommand() {
        let cli = Cli::try_parse_from([
            "sideline", "fetch", "games", "--sport", "nba", "--limit", "3", "--strict", "--offline",
        ])
        .expect("valid arguments");

        assert!(cli.strict);
        assert!(cli.offline);
        let Command::Fetch(args) = cli.command else {
            panic!("fetch command");
        };
        assert_eq!(args.resource, "games");
        assert_eq!(args.limit, Some(3));
        assert!(!args.refresh);
    }
}
