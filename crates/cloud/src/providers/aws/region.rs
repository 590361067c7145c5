//! Known AWS region identifiers.

use aws_config::Region;

use crate::providers::traits::{CloudError, Result};

/// Region identifiers accepted by [`validate_region`].
pub const KNOWN_REGIONS: &[&str] = &[
    // Commercial
    "af-south-1",
    "ap-east-1",
    "ap-east-2",
    "ap-northeast-1",
    "ap-northeast-2",
    "ap-northeast-3",
    "ap-south-1",
    "ap-south-2",
    "ap-southeast-1",
    "ap-southeast-2",
    "ap-southeast-3",
    "ap-southeast-4",
    "ap-southeast-5",
    "ap-southeast-7",
    "ca-central-1",
    "ca-west-1",
    "eu-central-1",
    "eu-central-2",
    "eu-north-1",
    "eu-south-1",
    "eu-south-2",
    "eu-west-1",
    "eu-west-2",
    "eu-west-3",
    "il-central-1",
    "me-central-1",
    "me-south-1",
    "mx-central-1",
    "sa-east-1",
    "us-east-1",
    "us-east-2",
    "us-west-1",
    "us-west-2",
    // China
    "cn-north-1",
    "cn-northwest-1",
    // GovCloud
    "us-gov-east-1",
    "us-gov-west-1",
    // Isolated
    "us-iso-east-1",
    "us-iso-west-1",
    "us-isob-east-1",
];

/// Whether `name` is a known region identifier.
#[must_use]
pub fn is_known_region(name: &str) -> bool {
    KNOWN_REGIONS.contains(&name)
}

/// Convert a region name into an SDK [`Region`].
///
/// # Errors
/// Returns [`CloudError::InvalidRegion`] for names outside [`KNOWN_REGIONS`].
pub fn validate_region(name: &str) -> Result<Region> {
    if is_known_region(name) {
        Ok(Region::new(name.to_string()))
    } else {
        Err(CloudError::InvalidRegion(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_regions_validate() {
        for name in ["eu-west-1", "us-east-1", "cn-north-1", "us-gov-west-1"] {
            let region = validate_region(name).unwrap();
            assert_eq!(region.as_ref(), name);
        }
    }

    #[test]
    fn test_unknown_regions_are_rejected() {
        for name in ["not-a-region", "", "EU-WEST-1", " eu-west-1", "eu-west-99"] {
            assert!(
                matches!(validate_region(name), Err(CloudError::InvalidRegion(ref n)) if n == name),
                "{name:?} should be rejected"
            );
        }
    }

    #[test]
    fn test_region_table_has_no_duplicates() {
        let mut names = KNOWN_REGIONS.to_vec();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), KNOWN_REGIONS.len());
    }
}
