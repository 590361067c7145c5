//! Provider error type and probe trait.

use std::fmt;

use async_trait::async_trait;
#[cfg(test)]
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

/// Errors that can occur while resolving credentials or building clients.
#[derive(Error, Debug)]
pub enum CloudError {
    /// No credentials in the configuration, the session defaults, or an IAM role.
    #[error(
        "Missing AWS security credentials -- Provide access/security keys pair or define an IAM instance profile (suggested)"
    )]
    MissingCredentials,

    /// No region in the configuration, the session defaults, or instance metadata.
    #[error(
        "Missing AWS region -- Make sure to define in your system environment the variable `AWS_DEFAULT_REGION`"
    )]
    MissingRegion,

    /// The region string is not a known AWS region.
    #[error("Not a valid AWS region name: `{0}`")]
    InvalidRegion(String),

    /// Configuration file could not be read.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration file could not be parsed.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Shared profile file could not be read or parsed.
    #[error("Invalid AWS profile file: {0}")]
    Profile(#[from] aws_config::profile::ProfileFileLoadError),
}

/// Result alias for this crate.
pub type Result<T> = std::result::Result<T, CloudError>;

/// Where the credentials of a client factory came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CredentialsSource {
    /// Access and secret keys from the explicit configuration.
    Config,
    /// Credentials from the session defaults (environment or profile files).
    Session,
    /// SDK default chain, backed by an IAM instance role.
    InstanceRole,
}

impl fmt::Display for CredentialsSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config => write!(f, "config"),
            Self::Session => write!(f, "session"),
            Self::InstanceRole => write!(f, "instance_role"),
        }
    }
}

/// Best-effort lookups against the environment the process runs in.
///
/// Implementations swallow every failure and return `None`.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait CloudProbe: Send + Sync {
    /// ARN of the IAM identity available without explicit keys, if any.
    async fn iam_role(&self) -> Option<String>;

    /// Region reported by the instance metadata service, if any.
    async fn region(&self) -> Option<String>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages_name_the_remedy() {
        assert!(CloudError::MissingCredentials
            .to_string()
            .contains("IAM instance profile"));
        assert!(CloudError::MissingRegion
            .to_string()
            .contains("AWS_DEFAULT_REGION"));
        assert_eq!(
            CloudError::InvalidRegion("mars-1".to_string()).to_string(),
            "Not a valid AWS region name: `mars-1`"
        );
    }

    #[test]
    fn test_credentials_source_display() {
        assert_eq!(CredentialsSource::Config.to_string(), "config");
        assert_eq!(CredentialsSource::InstanceRole.to_string(), "instance_role");
        assert_eq!(
            serde_json::to_string(&CredentialsSource::Session).unwrap(),
            "\"session\""
        );
    }
}
