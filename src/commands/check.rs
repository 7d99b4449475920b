// ABOUTME: Check command implementation.
// ABOUTME: Validates the resolved configuration and summarizes the planned run.

use revdeploy::config::Config;
use revdeploy::error::Result;
use revdeploy::output::Output;
use revdeploy::revision::RuleSet;
use revdeploy::types::{BundleType, region_name};

/// Validate configuration without building or contacting anything.
pub fn check(config: Config, output: Output) -> Result<()> {
    config.validate()?;

    let bundle_type = BundleType::from_key(&config.key)?;
    let rules = RuleSet::parse(&config.paths);

    output.progress(&format!("Application: {}", config.application));
    if config.steps.deploys() {
        output.progress(&format!("Deployment group: {}", config.deployment_group));
    }
    if let Some(region) = &config.region {
        output.progress(&format!("Region: {region} ({})", region_name(region)?));
    }
    output.progress(&format!(
        "Revision: s3://{}/{} ({bundle_type})",
        config.bucket, config.key
    ));
    output.progress(&format!(
        "Rules: {} include, {} exclude",
        rules.includes().count(),
        rules.excludes().count()
    ));

    output.success("Configuration is valid");
    Ok(())
}
