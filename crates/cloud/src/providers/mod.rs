//! Cloud provider abstractions.
//!
//! This module defines the error type and the probe seam shared by providers.

pub mod aws;
mod traits;

#[cfg(test)]
pub use traits::MockCloudProbe;
pub use traits::{CloudError, CloudProbe, CredentialsSource, Result};
