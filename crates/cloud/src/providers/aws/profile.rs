//! Shared `credentials` and `config` profile files.
//!
//! Files are located here and parsed by the SDK's profile loader, so the
//! comment, continuation and section rules match the AWS CLI.

use std::borrow::Cow;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use aws_config::profile::profile_file::{ProfileFileKind, ProfileFiles as SdkProfileFiles};
use aws_types::os_shim_internal::{Env, Fs};
use tracing::debug;

use super::models::AwsCredentials;
use crate::providers::traits::Result;

/// Profile properties read into a [`Profile`].
const PROFILE_KEYS: &[&str] = &[
    "aws_access_key_id",
    "aws_secret_access_key",
    "aws_session_token",
    "credential_process",
    "region",
];

/// Locations of the shared profile files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileFiles {
    /// Shared credentials file, usually `~/.aws/credentials`.
    pub credentials: Option<PathBuf>,
    /// Shared config file, usually `~/.aws/config`.
    pub config: Option<PathBuf>,
}

impl ProfileFiles {
    /// Explicit file locations.
    #[must_use]
    pub fn new(credentials: Option<PathBuf>, config: Option<PathBuf>) -> Self {
        Self {
            credentials,
            config,
        }
    }

    /// Standard locations, honouring `AWS_SHARED_CREDENTIALS_FILE` and `AWS_CONFIG_FILE`.
    #[must_use]
    pub fn locate(env: &dyn Fn(&str) -> Option<String>) -> Self {
        let aws_dir = dirs::home_dir().map(|home| home.join(".aws"));
        let credentials = env("AWS_SHARED_CREDENTIALS_FILE")
            .map(PathBuf::from)
            .or_else(|| aws_dir.as_ref().map(|dir| dir.join("credentials")));
        let config = env("AWS_CONFIG_FILE")
            .map(PathBuf::from)
            .or_else(|| aws_dir.as_ref().map(|dir| dir.join("config")));

        Self {
            credentials,
            config,
        }
    }

    /// Merge the named profile from both files.
    ///
    /// Values from the credentials file win over the config file. Missing
    /// files are skipped.
    ///
    /// # Errors
    /// Returns error if an existing file cannot be read or parsed.
    pub async fn load(&self, name: &str) -> Result<Profile> {
        let Some(files) = self.existing_files() else {
            debug!(profile = %name, "No shared profile files found");
            return Ok(Profile::empty(name));
        };

        let profiles = aws_config::profile::load(
            &Fs::real(),
            &Env::real(),
            &files,
            Some(Cow::Owned(name.to_string())),
        )
        .await?;

        let properties: HashMap<String, String> = profiles
            .get_profile(name)
            .map(|profile| {
                PROFILE_KEYS
                    .iter()
                    .filter_map(|key| {
                        profile
                            .get(key)
                            .map(|value| ((*key).to_string(), value.to_string()))
                    })
                    .collect()
            })
            .unwrap_or_default();

        debug!(
            profile = %name,
            keys = properties.len(),
            "Loaded shared profile"
        );

        Ok(Profile {
            name: name.to_string(),
            properties,
        })
    }

    /// SDK file set over the files that exist, config first so the
    /// credentials file overrides it.
    fn existing_files(&self) -> Option<SdkProfileFiles> {
        let present = |path: &Option<PathBuf>| {
            path.as_deref()
                .filter(|path| path.is_file())
                .map(Path::to_path_buf)
        };
        let config = present(&self.config);
        let credentials = present(&self.credentials);
        if config.is_none() && credentials.is_none() {
            return None;
        }

        let mut builder = SdkProfileFiles::builder();
        if let Some(config) = config {
            builder = builder.with_file(ProfileFileKind::Config, config);
        }
        if let Some(credentials) = credentials {
            builder = builder.with_file(ProfileFileKind::Credentials, credentials);
        }
        Some(builder.build())
    }
}

/// One named profile merged from the shared files.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Profile {
    name: String,
    properties: HashMap<String, String>,
}

impl Profile {
    fn empty(name: &str) -> Self {
        Self {
            name: name.to_string(),
            properties: HashMap::new(),
        }
    }

    /// Profile name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Property value, `None` when absent or blank.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.properties
            .get(key)
            .map(String::as_str)
            .filter(|value| !value.trim().is_empty())
    }

    /// Static keys when present, else `credential_process`.
    #[must_use]
    pub fn credentials(&self) -> Option<AwsCredentials> {
        match (
            self.get("aws_access_key_id"),
            self.get("aws_secret_access_key"),
        ) {
            (Some(access_key), Some(secret_key)) => Some(AwsCredentials::from_keys(
                access_key,
                secret_key,
                self.get("aws_session_token").map(str::to_string),
            )),
            _ => self.get("credential_process").map(AwsCredentials::process),
        }
    }

    /// Region property.
    #[must_use]
    pub fn region(&self) -> Option<&str> {
        self.get("region")
    }
}
