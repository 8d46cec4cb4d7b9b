use thiserror::Error;

pub type CliResult<T> = Result<T, CliError>;

/// Main error type for the marionette CLI.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },

    #[error("Invalid input: {field} = '{value}'. {suggestion}")]
    InvalidInput {
        field: String,
        value: String,
        suggestion: String,
    },

    /// An envelope execution came back unsuccessful. The code and message
    /// are surfaced verbatim from the operation result.
    #[error("Operation failed ({code}): {message}")]
    OperationFailed { code: String, message: String },

    /// Resolution, timeout and transport failures from the library.
    #[error(transparent)]
    Engine(#[from] marionette::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl CliError {
    pub fn config(reason: impl Into<String>) -> Self {
        Self::ConfigError {
            reason: reason.into(),
        }
    }

    pub fn invalid_input(
        field: impl Into<String>,
        value: impl Into<String>,
        suggestion: impl Into<String>,
    ) -> Self {
        Self::InvalidInput {
            field: field.into(),
            value: value.into(),
            suggestion: suggestion.into(),
        }
    }
}
