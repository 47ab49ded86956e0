use thiserror::Error;

/// CLI-level error categories mapped to exit codes.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Validation(#[from] sideline_core::ValidationError),

    #[error(transparent)]
    Core(#[from] sideline_core::CoreError),

    #[error("strict mode failed: degraded={degraded_count}, errors={error_count}")]
    StrictModeViolation {
        degraded_count: usize,
        error_count: usize,
    },

    #[error(transparent)]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub const fn exit_code(&self) -> u8 {
        match self {
            Self::Validation(_) => 2,
            Self::Core(sideline_core::CoreError::Validation(_)) => 2,
            Self::Core(_) => 3,
            Self::StrictModeViolation { .. } => 5,
            Self::Serialization(_) => 4,
            Self::Io(_) => 10,
        }
    }
}
