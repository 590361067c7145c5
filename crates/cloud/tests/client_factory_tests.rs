//! Client factory integration tests.
//!
//! Exercise credential and region resolution through the public API with a
//! fixed probe, so no test touches STS or the instance metadata service.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use aws_credential_types::provider::ProvideCredentials;
use batch_cloud::aws::ProviderCache;
use batch_cloud::{
    AwsClientFactory, AwsConfig, AwsCredentials, CloudError, CloudProbe, CredentialsSource,
    SessionDefaults,
};

/// Probe returning fixed answers and counting calls.
#[derive(Default)]
struct FixedProbe {
    role: Option<String>,
    region: Option<String>,
    calls: AtomicUsize,
}

impl FixedProbe {
    fn empty() -> Self {
        Self::default()
    }

    fn with_role(role: &str) -> Self {
        Self {
            role: Some(role.to_string()),
            ..Self::default()
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl CloudProbe for FixedProbe {
    async fn iam_role(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.role.clone()
    }

    async fn region(&self) -> Option<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.region.clone()
    }
}

#[tokio::test]
async fn test_static_keys_reach_the_provider() {
    let probe = FixedProbe::empty();
    let config = AwsConfig::new()
        .with_keys("AKIAINTEGRATION1", "integration-secret")
        .with_region("eu-west-1");

    let factory = AwsClientFactory::with_probe(
        &config,
        &SessionDefaults::new(),
        &probe,
        &ProviderCache::new(),
    )
    .await
    .unwrap();

    assert_eq!(probe.calls(), 0);
    assert_eq!(factory.credentials_source(), CredentialsSource::Config);

    let credentials = factory
        .credentials_provider()
        .provide_credentials()
        .await
        .unwrap();
    assert_eq!(credentials.access_key_id(), "AKIAINTEGRATION1");
    assert_eq!(credentials.secret_access_key(), "integration-secret");
    assert_eq!(credentials.session_token(), None);
}

#[tokio::test]
async fn test_session_keys_with_same_access_key_share_cache_entry() {
    let cache = ProviderCache::new();
    let probe = FixedProbe::empty();

    let first = AwsConfig::new()
        .with_keys("AKIASHARED", "secret-one")
        .with_session_token("token-one")
        .with_region("us-east-1");
    let second = AwsConfig::new()
        .with_keys("AKIASHARED", "secret-two")
        .with_session_token("token-two")
        .with_region("us-east-1");

    let a = AwsClientFactory::with_probe(&first, &SessionDefaults::new(), &probe, &cache)
        .await
        .unwrap();
    let b = AwsClientFactory::with_probe(&second, &SessionDefaults::new(), &probe, &cache)
        .await
        .unwrap();

    assert_eq!(cache.len(), 1);
    let from_b = b.credentials_provider().provide_credentials().await.unwrap();
    let from_a = a.credentials_provider().provide_credentials().await.unwrap();
    assert_eq!(from_b.secret_access_key(), "secret-one");
    assert_eq!(from_b.session_token(), from_a.session_token());
}

#[tokio::test]
async fn test_instance_role_fallback() {
    let probe = FixedProbe::with_role("arn:aws:sts::123456789012:assumed-role/batch-node/i-1");
    let config = AwsConfig::new().with_region("eu-central-1");

    let factory = AwsClientFactory::with_probe(
        &config,
        &SessionDefaults::new(),
        &probe,
        &ProviderCache::new(),
    )
    .await
    .unwrap();

    assert_eq!(factory.credentials_source(), CredentialsSource::InstanceRole);
    assert_eq!(
        factory.iam_role(),
        Some("arn:aws:sts::123456789012:assumed-role/batch-node/i-1")
    );
    assert_eq!(probe.calls(), 1);
}

#[tokio::test]
async fn test_nothing_resolvable_fails_with_credentials_error() {
    let error = AwsClientFactory::with_probe(
        &AwsConfig::new(),
        &SessionDefaults::new(),
        &FixedProbe::empty(),
        &ProviderCache::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(error, CloudError::MissingCredentials));
    assert!(error.to_string().starts_with("Missing AWS security credentials"));
}

#[tokio::test]
async fn test_no_region_fails_with_region_error() {
    let session = SessionDefaults::new()
        .with_credentials(AwsCredentials::from_keys("AKIASESSIONONLY", "s", None));

    let error = AwsClientFactory::with_probe(
        &AwsConfig::new(),
        &session,
        &FixedProbe::empty(),
        &ProviderCache::new(),
    )
    .await
    .unwrap_err();

    assert!(matches!(error, CloudError::MissingRegion));
    assert!(error.to_string().contains("AWS_DEFAULT_REGION"));
}

#[tokio::test]
async fn test_invalid_region_surfaces_at_request_time() {
    let config = AwsConfig::new()
        .with_keys("AKIABADREGION2", "s")
        .with_region("not-a-region");

    let factory = AwsClientFactory::with_probe(
        &config,
        &SessionDefaults::new(),
        &FixedProbe::empty(),
        &ProviderCache::new(),
    )
    .await
    .unwrap();
    assert_eq!(factory.region(), "not-a-region");

    let error = factory.logs_client().await.unwrap_err();
    assert_eq!(error.to_string(), "Not a valid AWS region name: `not-a-region`");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_callers_share_one_client_per_service() {
    let config = AwsConfig::new()
        .with_keys("AKIARACE2", "s")
        .with_region("us-west-2");
    let factory = Arc::new(
        AwsClientFactory::with_probe(
            &config,
            &SessionDefaults::new(),
            &FixedProbe::empty(),
            &ProviderCache::new(),
        )
        .await
        .unwrap(),
    );

    let tasks: Vec<_> = (0..16)
        .map(|_| {
            let factory = Arc::clone(&factory);
            tokio::spawn(async move {
                let ecs = std::ptr::from_ref(factory.ecs_client().await.unwrap()) as usize;
                let logs = std::ptr::from_ref(factory.logs_client().await.unwrap()) as usize;
                (ecs, logs)
            })
        })
        .collect();

    let mut results = Vec::new();
    for task in tasks {
        results.push(task.await.unwrap());
    }

    let first = results[0];
    assert!(results.iter().all(|r| *r == first));
}

#[cfg(unix)]
#[tokio::test]
async fn test_process_credentials_run_only_when_requested() {
    let dir = tempfile::TempDir::new().unwrap();
    let marker = dir.path().join("ran");
    let session = SessionDefaults::new()
        .with_credentials(AwsCredentials::process(format!("touch {}", marker.display())))
        .with_region("eu-west-1");

    let factory = AwsClientFactory::with_probe(
        &AwsConfig::new(),
        &session,
        &FixedProbe::empty(),
        &ProviderCache::new(),
    )
    .await
    .unwrap();
    factory.ec2_client().await.unwrap();
    assert!(!marker.exists());

    let result = factory.credentials_provider().provide_credentials().await;
    assert!(result.is_err());
    assert!(marker.exists());
}
