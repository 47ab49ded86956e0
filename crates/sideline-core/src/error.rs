use thiserror::Error;

/// Validation errors for keys, dates and cache patterns.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("invalid sport '{value}', expected one of nba, nfl, nhl")]
    InvalidSport { value: String },
    #[error(
        "invalid resource '{value}', expected one of games, standings, teams, players, news, odds"
    )]
    InvalidResource { value: String },

    #[error("date must be YYYY-MM-DD: '{value}'")]
    InvalidDate { value: String },

    #[error("limit must be greater than zero")]
    ZeroLimit,

    #[error("cache pattern cannot be empty")]
    EmptyPattern,
    #[error("invalid cache pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },
}

/// Top-level error type for core operations.
///
/// Upstream failures never show up here: the fallback chain absorbs them.
/// What remains are configuration defects and bad caller input.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("no fallback configured for resource '{resource}'")]
    Configuration { resource: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("background fetch for '{resource}' did not complete: {message}")]
    Join { resource: String, message: String },
}

impl CoreError {
    pub fn configuration(resource: impl Into<String>) -> Self {
        Self::Configuration {
            resource: resource.into(),
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "core.configuration",
            Self::Validation(_) => "core.validation",
            Self::Join { .. } => "core.join",
        }
    }
}
