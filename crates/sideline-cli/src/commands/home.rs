use std::collections::BTreeMap;

use serde_json::Value;
use sideline_core::{Aggregator, GameDate, ResourceKey, ResourceKind, Sport};

use crate::cli::HomeArgs;
use crate::error::CliError;
use crate::output::ErrorDetail;

use super::CommandResult;

/// Keys behind the home screen: each league's scoreboard plus headlines.
pub(super) fn home_keys(
    date: Option<GameDate>,
    news_limit: usize,
) -> Result<Vec<ResourceKey>, CliError> {
    let mut keys = Sport::ALL
        .into_iter()
        .map(|sport| {
            let key = ResourceKey::for_sport(ResourceKind::Games, sport);
            match date {
                Some(date) => key.with_date(date),
                None => key,
            }
        })
        .collect::<Vec<_>>();
    keys.push(ResourceKey::new(ResourceKind::News).with_limit(news_limit)?);
    Ok(keys)
}

pub async fn run(args: &HomeArgs, aggregator: &Aggregator) -> Result<CommandResult, CliError> {
    let date = args.date.as_deref().map(GameDate::parse).transpose()?;
    let keys = home_keys(date, args.news_limit)?;

    let aggregate = aggregator.aggregate(keys).await;

    let mut panels = BTreeMap::new();
    let mut errors = Vec::new();
    let mut command_result = CommandResult::ok(Value::Null).with_latency(aggregate.latency_ms());

    for (key, outcome) in aggregate.sorted() {
        let label = key.cache_key();
        match outcome {
            Ok(result) => {
                command_result.absorb(&label, result);
                panels.insert(label, serde_json::to_value(result)?);
            }
            Err(error) => {
                errors.push(ErrorDetail::from_core(label.clone(), error));
                panels.insert(label, Value::Null);
            }
        }
    }

    command_result.data = serde_json::json!({
        "partial_failure": aggregate.partial_failure(),
        "panels": panels,
    });
    Ok(command_result.with_errors(errors))
}
