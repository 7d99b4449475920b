// ABOUTME: Immutable table of region codes and their display names.
// ABOUTME: Built once on first use and queried through pure lookup functions.

use std::collections::BTreeMap;
use std::sync::LazyLock;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegionError {
    #[error("unknown region: {0}")]
    Unknown(String),
}

static REGIONS: LazyLock<BTreeMap<&'static str, &'static str>> = LazyLock::new(|| {
    BTreeMap::from([
        ("us-east-1", "US East (N. Virginia)"),
        ("us-east-2", "US East (Ohio)"),
        ("us-west-1", "US West (N. California)"),
        ("us-west-2", "US West (Oregon)"),
        ("ca-central-1", "Canada (Central)"),
        ("sa-east-1", "South America (Sao Paulo)"),
        ("eu-west-1", "EU (Ireland)"),
        ("eu-west-2", "EU (London)"),
        ("eu-west-3", "EU (Paris)"),
        ("eu-central-1", "EU (Frankfurt)"),
        ("eu-north-1", "EU (Stockholm)"),
        ("eu-south-1", "EU (Milan)"),
        ("ap-south-1", "Asia Pacific (Mumbai)"),
        ("ap-northeast-1", "Asia Pacific (Tokyo)"),
        ("ap-northeast-2", "Asia Pacific (Seoul)"),
        ("ap-northeast-3", "Asia Pacific (Osaka)"),
        ("ap-southeast-1", "Asia Pacific (Singapore)"),
        ("ap-southeast-2", "Asia Pacific (Sydney)"),
        ("ap-east-1", "Asia Pacific (Hong Kong)"),
        ("me-south-1", "Middle East (Bahrain)"),
        ("af-south-1", "Africa (Cape Town)"),
        ("cn-north-1", "China (Beijing)"),
        ("cn-northwest-1", "China (Ningxia)"),
        ("us-gov-west-1", "AWS GovCloud (US-West)"),
        ("us-gov-east-1", "AWS GovCloud (US-East)"),
    ])
});

/// Display name for a region code.
pub fn region_name(code: &str) -> Result<&'static str, RegionError> {
    REGIONS
        .get(code)
        .copied()
        .ok_or_else(|| RegionError::Unknown(code.to_string()))
}

/// All known regions, ordered by code.
pub fn all_regions() -> impl Iterator<Item = (&'static str, &'static str)> {
    REGIONS.iter().map(|(code, name)| (*code, *name))
}
