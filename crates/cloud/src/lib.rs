//! AWS credential resolution and service clients for batch compute.
//!
//! This crate decides which AWS credentials and region a batch session should
//! use, then hands out SDK clients bound to them:
//!
//! - **EC2** - compute instances
//! - **Batch** - job queues and job submission
//! - **ECS** - container orchestration
//! - **CloudWatch Logs** - job log retrieval
//!
//! ## Resolution Order
//!
//! Credentials come from the explicit configuration, then the session defaults
//! (environment and shared profile files), then an IAM instance role. The
//! region follows the same order, ending with the instance metadata service.
//!
//! Clients are built lazily, once per factory, and shared afterwards.

pub mod providers;

pub use providers::aws::{AwsClientFactory, AwsConfig, AwsCredentials, SessionDefaults};
pub use providers::{aws, CloudError, CloudProbe, CredentialsSource, Result};
