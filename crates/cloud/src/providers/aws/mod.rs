//! AWS (Amazon Web Services) cloud provider.
//!
//! Resolves credentials and region for a batch session and builds SDK clients.
//!
//! ## Services
//!
//! - **EC2** (Elastic Compute Cloud) - Virtual machines
//! - **Batch** - Managed job queues and compute environments
//! - **ECS** (Elastic Container Service) - Container orchestration
//! - **CloudWatch Logs** - Job output
//!
//! ## Credential Sources
//!
//! 1. `accessKey` / `secretKey` (and optionally `sessionToken`) in [`AwsConfig`]
//! 2. [`SessionDefaults`]: `AWS_*` environment variables, then the shared
//!    `credentials` / `config` profile files (including `credential_process`)
//! 3. The SDK default chain, when an IAM instance role is detected

mod client;
mod credentials;
mod models;
mod probe;
mod profile;
mod region;

pub use client::AwsClientFactory;
pub use credentials::{global_cache, ProviderCache};
pub use models::*;
pub use probe::SdkProbe;
pub use profile::{Profile, ProfileFiles};
pub use region::{is_known_region, validate_region, KNOWN_REGIONS};
