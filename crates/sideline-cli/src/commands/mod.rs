mod fetch;
mod home;
mod sources;

use serde_json::Value;
use sideline_core::{Aggregator, AggregatorBuilder, FetchResult};
use tracing::debug;

use crate::cli::{Cli, Command};
use crate::error::CliError;
use crate::metadata::Metadata;
use crate::output::{Envelope, ErrorDetail};

pub const SIMULATED_DATA_WARNING: &str = "Using simulated data";

pub struct CommandResult {
    pub data: Value,
    pub warnings: Vec<String>,
    pub errors: Vec<ErrorDetail>,
    pub latency_ms: u64,
    pub cache_hit: bool,
    pub degraded: bool,
    pub sources: Vec<String>,
}

impl CommandResult {
    pub fn ok(data: Value) -> Self {
        Self {
            data,
            warnings: Vec::new(),
            errors: Vec::new(),
            latency_ms: 0,
            cache_hit: false,
            degraded: false,
            sources: Vec::new(),
        }
    }

    pub fn with_warning(mut self, warning: impl Into<String>) -> Self {
        self.warnings.push(warning.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ErrorDetail>) -> Self {
        self.errors.extend(errors);
        self
    }

    pub fn with_latency(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    /// Folds one resolved resource into the result: source, cache flag,
    /// degradation and per-source failures.
    pub fn absorb(&mut self, label: &str, result: &FetchResult) {
        self.sources.push(result.source_name().to_owned());
        self.cache_hit |= result.cache_hit();
        if result.degraded() {
            self.degraded = true;
            self.warnings
                .push(format!("{label}: {SIMULATED_DATA_WARNING}"));
        }
        for failure in result.failures() {
            self.warnings.push(format!(
                "{label}: {} failed ({}): {}",
                failure.source, failure.code, failure.message
            ));
        }
    }
}

pub fn build_aggregator(offline: bool) -> Aggregator {
    let builder = AggregatorBuilder::from_env();
    if offline {
        builder.with_mock_mode().build()
    } else {
        builder.build()
    }
}

pub async fn run(cli: &Cli) -> Result<Envelope, CliError> {
    let aggregator = build_aggregator(cli.offline);

    let command_result = match &cli.command {
        Command::Fetch(args) => fetch::run(args, &aggregator).await?,
        Command::Home(args) => home::run(args, &aggregator).await?,
        Command::Sources(args) => sources::run(args, &aggregator)?,
    };

    let CommandResult {
        data,
        warnings,
        errors,
        latency_ms,
        cache_hit,
        degraded,
        sources,
    } = command_result;

    debug!(
        latency_ms,
        cache_hit,
        degraded,
        sources = ?sources,
        errors = errors.len(),
        "command complete"
    );

    let mut meta = Metadata::new(sources, latency_ms, cache_hit, degraded);
    if cli.offline {
        meta.push_warning("offline mode: every upstream is skipped");
    }
    for warning in warnings {
        meta.push_warning(warning);
    }

    Ok(Envelope { meta, data, errors })
}
