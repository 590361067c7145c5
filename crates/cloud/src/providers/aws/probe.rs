//! SDK-backed probes for IAM identity and instance region.

use async_trait::async_trait;
use aws_config::imds::region::ImdsRegionProvider;
use aws_config::meta::region::RegionProviderChain;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_sts::error::DisplayErrorContext;
use tracing::{debug, trace};

use crate::providers::traits::CloudProbe;

/// Region used for the STS call when none can be discovered.
const STS_FALLBACK_REGION: &str = "us-east-1";

/// Probe that asks STS and the instance metadata service.
#[derive(Debug, Clone, Copy, Default)]
pub struct SdkProbe;

impl SdkProbe {
    /// Create a new probe.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl CloudProbe for SdkProbe {
    async fn iam_role(&self) -> Option<String> {
        let region = RegionProviderChain::default_provider()
            .or_else(Region::new(STS_FALLBACK_REGION));
        let config = aws_config::defaults(BehaviorVersion::latest())
            .region(region)
            .load()
            .await;

        match aws_sdk_sts::Client::new(&config)
            .get_caller_identity()
            .send()
            .await
        {
            Ok(identity) => {
                let arn = identity.arn().map(str::to_string);
                debug!(arn = ?arn, "Resolved IAM identity");
                arn
            }
            Err(e) => {
                trace!(error = %DisplayErrorContext(&e), "Unable to fetch IAM credentials");
                None
            }
        }
    }

    async fn region(&self) -> Option<String> {
        let region = ImdsRegionProvider::builder().build().region().await;
        if region.is_none() {
            debug!("Cannot fetch AWS region from instance metadata");
        }
        region.map(|region| region.as_ref().to_string())
    }
}
