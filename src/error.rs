//! Failure taxonomy for plugin operations.

use thiserror::Error;

pub type PluginResult<T> = Result<T, PluginError>;

/// Coarse cause of a plugin failure, for callers that pick a fallback plugin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    NotConfigured,
    ConfigurationIncomplete,
    UnsupportedCapability,
    CommandFailure,
    CommandFault,
}

#[derive(Error, Debug)]
pub enum PluginError {
    #[error("{plugin}: plugin is not configured")]
    NotConfigured { plugin: String },
    #[error("{plugin}: capability '{capability}' is not supported")]
    Unsupported { plugin: String, capability: String },
    #[error("{plugin}: parameter '{parameter}' missing for capability '{capability}'")]
    MissingParameter {
        plugin: String,
        capability: String,
        parameter: String,
    },
    #[error("{plugin}: invalid value for '{parameter}': {reason}")]
    InvalidParameter {
        plugin: String,
        parameter: String,
        reason: String,
    },
    #[error("command exited with {}: {command}", display_code(.code))]
    CommandFailed { command: String, code: Option<i32> },
    #[error("command could not be run: {command}: {source}")]
    CommandFault {
        command: String,
        #[source]
        source: std::io::Error,
    },
}

impl PluginError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::NotConfigured { .. } => FailureKind::NotConfigured,
            Self::Unsupported { .. } => FailureKind::UnsupportedCapability,
            Self::MissingParameter { .. } | Self::InvalidParameter { .. } => {
                FailureKind::ConfigurationIncomplete
            }
            Self::CommandFailed { .. } => FailureKind::CommandFailure,
            Self::CommandFault { .. } => FailureKind::CommandFault,
        }
    }
}

/// Render an exit code for diagnostics; signal terminations and launch faults have none.
pub fn display_code(code: &Option<i32>) -> String {
    match code {
        Some(code) => code.to_string(),
        None => "none".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = PluginError::CommandFailed {
            command: "exit 7".into(),
            code: Some(7),
        };
        assert_eq!(err.to_string(), "command exited with 7: exit 7");

        let err = PluginError::CommandFailed {
            command: "sleep 5".into(),
            code: None,
        };
        assert!(err.to_string().contains("with none"));
    }

    #[test]
    fn test_error_kinds() {
        let missing = PluginError::MissingParameter {
            plugin: "p".into(),
            capability: "reset".into(),
            parameter: "baud".into(),
        };
        assert_eq!(missing.kind(), FailureKind::ConfigurationIncomplete);

        let fault = PluginError::CommandFault {
            command: "nope".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert_eq!(fault.kind(), FailureKind::CommandFault);

        let unsupported = PluginError::Unsupported {
            plugin: "p".into(),
            capability: "x".into(),
        };
        assert_eq!(unsupported.kind(), FailureKind::UnsupportedCapability);
    }
}
