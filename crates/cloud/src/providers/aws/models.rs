//! AWS credential values and configuration models.

use std::fmt;
use std::path::Path;

use serde::Deserialize;

use super::profile::ProfileFiles;
use crate::providers::traits::Result;

// ============================================================================
// Credential values
// ============================================================================

/// A credential value that can be turned into an SDK credentials provider.
#[derive(Clone, PartialEq, Eq)]
pub enum AwsCredentials {
    /// Long-lived access key pair.
    Static {
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
    },
    /// Temporary access key pair with its session token.
    Session {
        /// Access key ID.
        access_key_id: String,
        /// Secret access key.
        secret_access_key: String,
        /// Session token.
        session_token: String,
    },
    /// Command whose stdout is a `credential_process` JSON document.
    Process {
        /// Shell command to run.
        command: String,
    },
}

impl AwsCredentials {
    /// Build `Static` or `Session` credentials depending on whether a token is given.
    #[must_use]
    pub fn from_keys(
        access_key_id: impl Into<String>,
        secret_access_key: impl Into<String>,
        session_token: Option<String>,
    ) -> Self {
        let access_key_id = access_key_id.into();
        let secret_access_key = secret_access_key.into();
        match session_token.filter(|token| !token.is_empty()) {
            Some(session_token) => Self::Session {
                access_key_id,
                secret_access_key,
                session_token,
            },
            None => Self::Static {
                access_key_id,
                secret_access_key,
            },
        }
    }

    /// Credentials produced on demand by an external command.
    #[must_use]
    pub fn process(command: impl Into<String>) -> Self {
        Self::Process {
            command: command.into(),
        }
    }

    /// Access key ID, when the value carries one.
    #[must_use]
    pub fn access_key_id(&self) -> Option<&str> {
        match self {
            Self::Static { access_key_id, .. } | Self::Session { access_key_id, .. } => {
                Some(access_key_id)
            }
            Self::Process { .. } => None,
        }
    }

    /// Identity used by the provider cache.
    ///
    /// Key-based values are identified by their access key ID alone, so a
    /// `Static` and a `Session` value sharing an access key map to one entry
    /// regardless of secret or token.
    #[must_use]
    pub fn cache_key(&self) -> CredentialsKey {
        match self {
            Self::Static { access_key_id, .. } | Self::Session { access_key_id, .. } => {
                CredentialsKey::AccessKey(access_key_id.clone())
            }
            Self::Process { command } => CredentialsKey::Command(command.clone()),
        }
    }

    /// Short name of the variant, safe to log.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Static { .. } => "static",
            Self::Session { .. } => "session",
            Self::Process { .. } => "process",
        }
    }
}

impl fmt::Debug for AwsCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static { access_key_id, .. } => f
                .debug_struct("Static")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"** redacted **")
                .finish(),
            Self::Session { access_key_id, .. } => f
                .debug_struct("Session")
                .field("access_key_id", access_key_id)
                .field("secret_access_key", &"** redacted **")
                .field("session_token", &"** redacted **")
                .finish(),
            Self::Process { command } => {
                f.debug_struct("Process").field("command", command).finish()
            }
        }
    }
}

/// Provider cache key derived from [`AwsCredentials::cache_key`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CredentialsKey {
    /// Access key ID of a `Static` or `Session` value.
    AccessKey(String),
    /// Command of a `Process` value.
    Command(String),
}

// ============================================================================
// Configuration
// ============================================================================

/// The `aws` configuration section.
///
/// Every field is optional; missing values fall back to [`SessionDefaults`].
#[derive(Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AwsConfig {
    /// Access key ID.
    #[serde(default)]
    pub access_key: Option<String>,
    /// Secret access key.
    #[serde(default)]
    pub secret_key: Option<String>,
    /// Session token for temporary credentials.
    #[serde(default)]
    pub session_token: Option<String>,
    /// Region, e.g. `eu-west-1`.
    #[serde(default)]
    pub region: Option<String>,
    /// Shared profile used when loading [`SessionDefaults`].
    #[serde(default)]
    pub profile: Option<String>,
}

#[derive(Deserialize)]
struct ConfigDocument {
    #[serde(default)]
    aws: AwsConfig,
}

impl AwsConfig {
    /// Create an empty configuration.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse the `[aws]` table of a TOML document.
    ///
    /// # Errors
    /// Returns error if the document is not valid TOML or has mistyped keys.
    pub fn from_toml_str(input: &str) -> Result<Self> {
        let document: ConfigDocument = toml::from_str(input)?;
        Ok(document.aws)
    }

    /// Read and parse a TOML configuration file.
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Set the access key pair.
    #[must_use]
    pub fn with_keys(
        mut self,
        access_key: impl Into<String>,
        secret_key: impl Into<String>,
    ) -> Self {
        self.access_key = Some(access_key.into());
        self.secret_key = Some(secret_key.into());
        self
    }

    /// Set the session token.
    #[must_use]
    pub fn with_session_token(mut self, session_token: impl Into<String>) -> Self {
        self.session_token = Some(session_token.into());
        self
    }

    /// Set the region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Set the shared profile name.
    #[must_use]
    pub fn with_profile(mut self, profile: impl Into<String>) -> Self {
        self.profile = Some(profile.into());
        self
    }

    /// Overlay the values set in `other` on top of this configuration.
    #[must_use]
    pub fn merge(mut self, other: Self) -> Self {
        self.access_key = other.access_key.or(self.access_key);
        self.secret_key = other.secret_key.or(self.secret_key);
        self.session_token = other.session_token.or(self.session_token);
        self.region = other.region.or(self.region);
        self.profile = other.profile.or(self.profile);
        self
    }

    /// Credentials from this section, if both keys are present.
    #[must_use]
    pub fn credentials(&self) -> Option<AwsCredentials> {
        let access_key = non_empty(self.access_key.as_deref())?;
        let secret_key = non_empty(self.secret_key.as_deref())?;
        Some(AwsCredentials::from_keys(
            access_key,
            secret_key,
            non_empty(self.session_token.as_deref()).map(str::to_string),
        ))
    }

    /// Region from this section, if present.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        non_empty(self.region.as_deref())
    }
}

impl fmt::Debug for AwsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AwsConfig")
            .field("access_key", &self.access_key)
            .field("secret_key", &self.secret_key.as_ref().map(|_| "** redacted **"))
            .field(
                "session_token",
                &self.session_token.as_ref().map(|_| "** redacted **"),
            )
            .field("region", &self.region)
            .field("profile", &self.profile)
            .finish()
    }
}

// ============================================================================
// Session defaults
// ============================================================================

/// Credentials and region already known to the session, used when the
/// configuration does not provide them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SessionDefaults {
    /// Session-wide credentials.
    pub credentials: Option<AwsCredentials>,
    /// Session-wide region.
    pub region: Option<String>,
}

impl SessionDefaults {
    /// Defaults with nothing set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the session credentials.
    #[must_use]
    pub fn with_credentials(mut self, credentials: AwsCredentials) -> Self {
        self.credentials = Some(credentials);
        self
    }

    /// Set the session region.
    #[must_use]
    pub fn with_region(mut self, region: impl Into<String>) -> Self {
        self.region = Some(region.into());
        self
    }

    /// Load defaults from the process environment and the shared profile files.
    ///
    /// `profile` overrides `AWS_PROFILE`; `default` is used when neither is set.
    ///
    /// # Errors
    /// Returns error if a profile file exists but cannot be read or parsed.
    pub async fn load(profile: Option<&str>) -> Result<Self> {
        let env = |name: &str| std::env::var(name).ok();
        let files = ProfileFiles::locate(&env);
        Self::from_sources(&env, &files, profile).await
    }

    /// Resolve defaults from an environment lookup and a set of profile files.
    ///
    /// Environment values win over profile file values.
    ///
    /// # Errors
    /// Returns error if a profile file exists but cannot be read or parsed.
    pub async fn from_sources(
        env: &(dyn Fn(&str) -> Option<String> + Sync),
        files: &ProfileFiles,
        profile: Option<&str>,
    ) -> Result<Self> {
        let profile_name = profile
            .map(str::to_string)
            .or_else(|| env("AWS_PROFILE"))
            .unwrap_or_else(|| "default".to_string());
        let profile = files.load(&profile_name).await?;

        let credentials = credentials_from_env(env).or_else(|| profile.credentials());
        let region = ["AWS_REGION", "AWS_DEFAULT_REGION"]
            .iter()
            .find_map(|name| env(name).filter(|value| !value.trim().is_empty()))
            .or_else(|| profile.region().map(str::to_string));

        Ok(Self {
            credentials,
            region,
        })
    }
}

fn credentials_from_env(env: &dyn Fn(&str) -> Option<String>) -> Option<AwsCredentials> {
    let first = |names: &[&str]| {
        names
            .iter()
            .find_map(|name| env(name).filter(|value| !value.trim().is_empty()))
    };

    let access_key = first(&["AWS_ACCESS_KEY_ID", "AWS_ACCESS_KEY"])?;
    let secret_key = first(&["AWS_SECRET_ACCESS_KEY", "AWS_SECRET_KEY"])?;
    Some(AwsCredentials::from_keys(
        access_key,
        secret_key,
        first(&["AWS_SESSION_TOKEN"]),
    ))
}

/// `value` unless it is absent or blank.
pub(crate) fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|value| !value.trim().is_empty())
}
