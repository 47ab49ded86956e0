use serde::Serialize;
use sideline_core::{Aggregator, CoreError, ResourceId, ResourceKind, SourceDescriptor, Sport};

use crate::cli::SourcesArgs;
use crate::error::CliError;

use super::CommandResult;

#[derive(Debug, Serialize)]
struct SourcesResponseData<'a> {
    resource: String,
    chain: Vec<&'a SourceDescriptor>,
    mock_fallback: bool,
}

pub fn run(args: &SourcesArgs, aggregator: &Aggregator) -> Result<CommandResult, CliError> {
    let kind = args.resource.parse::<ResourceKind>()?;
    let sport = args.sport.as_deref().map(str::parse::<Sport>).transpose()?;
    let resource = ResourceId::new(kind, sport);

    let chain = aggregator
        .chain(resource)
        .ok_or_else(|| CoreError::configuration(resource.to_string()))?;

    let data = serde_json::to_value(SourcesResponseData {
        resource: resource.to_string(),
        chain: chain.descriptors(),
        mock_fallback: chain.has_mock(),
    })?;

    let mut result = CommandResult::ok(data);
    result.sources = chain
        .descriptors()
        .into_iter()
        .map(|descriptor| descriptor.name.clone())
        .collect();
    if chain.sources().is_empty() {
        result = result.with_warning(format!(
            "{resource}: no upstream configured, every request is simulated"
        ));
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn offline_chain_has_only_the_mock() {
        let aggregator = super::super::build_aggregator(true);
        let args = SourcesArgs {
            resource: String::from("odds"),
            sport: Some(String::from("nfl")),
        };

        let result = run(&args, &aggregator).expect("chain exists");

        assert!(result.sources.is_empty());
        assert_eq!(result.data["resource"], "nfl_odds");
        assert_eq!(result.data["mock_fallback"], true);
        assert_eq!(result.warnings.len(), 1);
    }

    #[test]
    fn sport_less_games_has_no_chain() {
        let aggregator = super::super::build_aggregator(true);
        let args = SourcesArgs {
            resource: String::from("games"),
            sport: None,
        };

        let error = run(&args, &aggregator).err().expect("no league-wide games chain");
        assert_eq!(error.exit_code(), 3);
    }
}
