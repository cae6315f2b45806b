//! Error types for the intake receptionist.
//!
//! Nothing a patient types is ever an error: validation misses become
//! re-prompts inside the controller. These types cover the plumbing around
//! the conversation (configuration, channels, misuse of the stage machine).

use crate::intake::Stage;

/// Top-level error type.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),
}

/// Configuration-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Invalid configuration value for {key}: {message}")]
    InvalidValue { key: String, message: String },
}

/// Channel-related errors.
#[derive(Debug, thiserror::Error)]
pub enum ChannelError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Stage machine misuse.
#[derive(Debug, thiserror::Error)]
pub enum TransitionError {
    #[error("Already at terminal stage {stage}")]
    Terminal { stage: Stage },

    #[error("Cannot transition from {from} to {to}")]
    Invalid { from: Stage, to: Stage },
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_converts_into_top_level_error() {
        let err: Error = ConfigError::InvalidValue {
            key: "INTAKE_PACING".to_string(),
            message: "expected on/off".to_string(),
        }
        .into();
        assert!(matches!(err, Error::Config(_)));
        assert_eq!(
            err.to_string(),
            "Configuration error: Invalid configuration value for INTAKE_PACING: expected on/off"
        );
    }

    #[test]
    fn terminal_transition_names_the_stage() {
        let err = TransitionError::Terminal { stage: Stage::Done };
        assert_eq!(err.to_string(), "Already at terminal stage done");
    }
}
