use serde::Serialize;
use sideline_core::{
    Aggregator, CacheMode, FetchResult, GameDate, ResourceKey, ResourceKind, Sport,
    ValidationError,
};

use crate::cli::FetchArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct FetchResponseData<'a> {
    resource: &'a ResourceKey,
    result: &'a FetchResult,
}

pub async fn run(args: &FetchArgs, aggregator: &Aggregator) -> Result<CommandResult, CliError> {
    let key = parse_key(
        &args.resource,
        args.sport.as_deref(),
        args.date.as_deref(),
        args.limit,
    )?;
    let mode = if args.refresh {
        CacheMode::Refresh
    } else {
        CacheMode::Use
    };

    let result = aggregator.fetch(&key, mode).await?;

    let data = serde_json::to_value(FetchResponseData {
        resource: &key,
        result: &result,
    })?;
    let mut command_result = CommandResult::ok(data).with_latency(result.latency_ms());
    command_result.absorb(&key.cache_key(), &result);
    Ok(command_result)
}

/// Builds a resource key from raw CLI input.
pub(super) fn parse_key(
    resource: &str,
    sport: Option<&str>,
    date: Option<&str>,
    limit: Option<usize>,
) -> Result<ResourceKey, ValidationError> {
    let kind = resource.parse::<ResourceKind>()?;
    let mut key = match sport {
        Some(sport) => ResourceKey::for_sport(kind, sport.parse::<Sport>()?),
        None => ResourceKey::new(kind),
    };
    if let Some(date) = date {
        key = key.with_date(GameDate::parse(date)?);
    }
    if let Some(limit) = limit {
        key = key.with_limit(limit)?;
    }
    Ok(key)
}
