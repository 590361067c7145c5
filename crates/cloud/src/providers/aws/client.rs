//! AWS client factory.
//!
//! Resolves credentials and region once, then builds each service client on
//! first use and hands out the same client afterwards.

use aws_config::{BehaviorVersion, SdkConfig};
use aws_credential_types::provider::SharedCredentialsProvider;
use tokio::sync::OnceCell;
use tracing::{debug, info};

use super::credentials::{global_cache, ProviderCache};
use super::models::{non_empty, AwsConfig, AwsCredentials, SessionDefaults};
use super::probe::SdkProbe;
use super::region::validate_region;
use crate::providers::traits::{CloudError, CloudProbe, CredentialsSource, Result};

/// Factory for AWS service clients bound to one set of credentials and region.
#[derive(Debug)]
pub struct AwsClientFactory {
    /// Resolved region name, validated when a client is requested.
    region: String,
    /// Where the credentials came from.
    credentials_source: CredentialsSource,
    /// IAM identity ARN, when the credentials come from an instance role.
    iam_role: Option<String>,
    /// Provider shared by every client of this factory.
    credentials_provider: SharedCredentialsProvider,
    sdk_config: OnceCell<SdkConfig>,
    ec2: OnceCell<aws_sdk_ec2::Client>,
    batch: OnceCell<aws_sdk_batch::Client>,
    ecs: OnceCell<aws_sdk_ecs::Client>,
    logs: OnceCell<aws_sdk_cloudwatchlogs::Client>,
}

impl AwsClientFactory {
    /// Create a factory using the SDK probes and the process-wide provider cache.
    ///
    /// # Errors
    /// Returns [`CloudError::MissingCredentials`] or [`CloudError::MissingRegion`]
    /// when no source provides them.
    pub async fn new(config: &AwsConfig, session: &SessionDefaults) -> Result<Self> {
        Self::with_probe(config, session, &SdkProbe, global_cache()).await
    }

    /// Create a factory with an explicit probe and provider cache.
    ///
    /// # Errors
    /// Returns [`CloudError::MissingCredentials`] or [`CloudError::MissingRegion`]
    /// when no source provides them.
    pub async fn with_probe(
        config: &AwsConfig,
        session: &SessionDefaults,
        probe: &dyn CloudProbe,
        cache: &ProviderCache,
    ) -> Result<Self> {
        let (credentials, credentials_source, iam_role) =
            resolve_credentials(config, session, probe).await?;
        let region = resolve_region(config, session, probe).await?;
        let credentials_provider = cache
            .provider_for(credentials.as_ref(), Some(region.as_str()))
            .await;

        info!(
            region = %region,
            source = %credentials_source,
            kind = credentials.as_ref().map_or("default_chain", AwsCredentials::kind),
            "Resolved AWS client configuration"
        );

        Ok(Self {
            region,
            credentials_source,
            iam_role,
            credentials_provider,
            sdk_config: OnceCell::new(),
            ec2: OnceCell::new(),
            batch: OnceCell::new(),
            ecs: OnceCell::new(),
            logs: OnceCell::new(),
        })
    }

    /// Resolved region name.
    #[must_use]
    pub fn region(&self) -> &str {
        &self.region
    }

    /// Where the credentials came from.
    #[must_use]
    pub fn credentials_source(&self) -> CredentialsSource {
        self.credentials_source
    }

    /// IAM identity ARN found by the role probe.
    #[must_use]
    pub fn iam_role(&self) -> Option<&str> {
        self.iam_role.as_deref()
    }

    /// Credentials provider used by every client of this factory.
    #[must_use]
    pub fn credentials_provider(&self) -> &SharedCredentialsProvider {
        &self.credentials_provider
    }

    /// EC2 client.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidRegion`] if the region is not a known region.
    pub async fn ec2_client(&self) -> Result<&aws_sdk_ec2::Client> {
        self.client(&self.ec2, "ec2", aws_sdk_ec2::Client::new).await
    }

    /// Batch client.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidRegion`] if the region is not a known region.
    pub async fn batch_client(&self) -> Result<&aws_sdk_batch::Client> {
        self.client(&self.batch, "batch", aws_sdk_batch::Client::new)
            .await
    }

    /// ECS client.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidRegion`] if the region is not a known region.
    pub async fn ecs_client(&self) -> Result<&aws_sdk_ecs::Client> {
        self.client(&self.ecs, "ecs", aws_sdk_ecs::Client::new).await
    }

    /// CloudWatch Logs client.
    ///
    /// # Errors
    /// Returns [`CloudError::InvalidRegion`] if the region is not a known region.
    pub async fn logs_client(&self) -> Result<&aws_sdk_cloudwatchlogs::Client> {
        self.client(&self.logs, "logs", aws_sdk_cloudwatchlogs::Client::new)
            .await
    }

    async fn client<'a, C>(
        &'a self,
        cell: &'a OnceCell<C>,
        service: &'static str,
        build: fn(&SdkConfig) -> C,
    ) -> Result<&'a C> {
        cell.get_or_try_init(|| async {
            let sdk_config = self.sdk_config().await?;
            debug!(service, region = %self.region, "Creating AWS client");
            Ok::<_, CloudError>(build(sdk_config))
        })
        .await
    }

    async fn sdk_config(&self) -> Result<&SdkConfig> {
        self.sdk_config
            .get_or_try_init(|| async {
                let region = validate_region(&self.region)?;
                let sdk_config = aws_config::defaults(BehaviorVersion::latest())
                    .region(region)
                    .credentials_provider(self.credentials_provider.clone())
                    .load()
                    .await;
                Ok::<_, CloudError>(sdk_config)
            })
            .await
    }
}

/// Pick credentials: configuration, then session defaults, then IAM role.
async fn resolve_credentials(
    config: &AwsConfig,
    session: &SessionDefaults,
    probe: &dyn CloudProbe,
) -> Result<(Option<AwsCredentials>, CredentialsSource, Option<String>)> {
    if let Some(credentials) = config.credentials() {
        return Ok((Some(credentials), CredentialsSource::Config, None));
    }

    if let Some(credentials) = session.credentials.clone() {
        return Ok((Some(credentials), CredentialsSource::Session, None));
    }

    match probe.iam_role().await {
        Some(role) => {
            debug!(role = %role, "Using IAM instance role credentials");
            Ok((None, CredentialsSource::InstanceRole, Some(role)))
        }
        None => Err(CloudError::MissingCredentials),
    }
}

/// Pick region: configuration, then session defaults, then instance metadata.
async fn resolve_region(
    config: &AwsConfig,
    session: &SessionDefaults,
    probe: &dyn CloudProbe,
) -> Result<String> {
    if let Some(region) = config.region() {
        return Ok(region.to_string());
    }

    if let Some(region) = non_empty(session.region.as_deref()) {
        return Ok(region.to_string());
    }

    let region = probe.region().await;
    non_empty(region.as_deref())
        .map(str::to_string)
        .ok_or(CloudError::MissingRegion)
}
