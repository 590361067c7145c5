//! Credentials provider cache.
//!
//! Maps [`AwsCredentials`] values to SDK credentials providers and keeps one
//! provider per [`CredentialsKey`] for the life of the process.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock, PoisonError};

use aws_config::credential_process::CredentialProcessProvider;
use aws_config::default_provider::credentials::DefaultCredentialsChain;
use aws_config::Region;
use aws_credential_types::provider::SharedCredentialsProvider;
use aws_credential_types::Credentials;
use tracing::debug;

use super::models::{AwsCredentials, CredentialsKey};

/// Provider name reported by the SDK for key-based credentials.
const STATIC_PROVIDER_NAME: &str = "BatchCloudStatic";

/// Cache of credentials providers keyed by credential identity.
#[derive(Debug, Default)]
pub struct ProviderCache {
    providers: Mutex<HashMap<CredentialsKey, SharedCredentialsProvider>>,
}

impl ProviderCache {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Provider for `credentials`, or the SDK default chain when `None`.
    ///
    /// The default chain is built fresh on every call and never cached. It
    /// uses `region` for its STS and SSO lookups when given.
    pub async fn provider_for(
        &self,
        credentials: Option<&AwsCredentials>,
        region: Option<&str>,
    ) -> SharedCredentialsProvider {
        if let Some(credentials) = credentials {
            return self.get_or_create(credentials);
        }

        debug!(region = ?region, "Using default credentials provider chain");
        let mut builder = DefaultCredentialsChain::builder();
        if let Some(region) = region {
            builder = builder.region(Region::new(region.to_string()));
        }
        SharedCredentialsProvider::new(builder.build().await)
    }

    /// Cached provider for `credentials`, creating it on first use.
    ///
    /// Lookup and insertion happen under one lock, so concurrent callers with
    /// the same key always receive the provider created first.
    pub fn get_or_create(&self, credentials: &AwsCredentials) -> SharedCredentialsProvider {
        let key = credentials.cache_key();
        let mut providers = self.providers.lock().unwrap_or_else(PoisonError::into_inner);

        if let Some(provider) = providers.get(&key) {
            debug!(kind = credentials.kind(), "Credentials provider cache hit");
            return provider.clone();
        }

        debug!(kind = credentials.kind(), "Creating credentials provider");
        let provider = build_provider(credentials);
        providers.insert(key, provider.clone());
        provider
    }

    /// Whether a provider is cached for the identity of `credentials`.
    #[must_use]
    pub fn contains(&self, credentials: &AwsCredentials) -> bool {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&credentials.cache_key())
    }

    /// Number of cached providers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Whether the cache is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every cached provider.
    pub fn clear(&self) {
        self.providers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

fn build_provider(credentials: &AwsCredentials) -> SharedCredentialsProvider {
    match credentials {
        AwsCredentials::Session {
            access_key_id,
            secret_access_key,
            session_token,
        } => SharedCredentialsProvider::new(Credentials::new(
            access_key_id,
            secret_access_key,
            Some(session_token.clone()),
            None,
            STATIC_PROVIDER_NAME,
        )),
        AwsCredentials::Static {
            access_key_id,
            secret_access_key,
        } => SharedCredentialsProvider::new(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            STATIC_PROVIDER_NAME,
        )),
        AwsCredentials::Process { command } => {
            SharedCredentialsProvider::new(CredentialProcessProvider::new(command.clone()))
        }
    }
}

/// Process-wide provider cache.
static GLOBAL_CACHE: OnceLock<ProviderCache> = OnceLock::new();

/// Get the process-wide provider cache.
#[must_use]
pub fn global_cache() -> &'static ProviderCache {
    GLOBAL_CACHE.get_or_init(ProviderCache::new)
}
