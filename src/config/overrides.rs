// ABOUTME: Environment overrides for configuration fields, driven by one lookup table.
// ABOUTME: Each field lists its variables in priority order; current names precede legacy ones.

use std::path::PathBuf;
use std::time::Duration;

use crate::error::{Error, Result};
use crate::pipeline::DeploymentSteps;

use super::Config;

type Apply = fn(&mut Config, String) -> Result<()>;

/// One overridable field and the environment variables that can set it.
pub struct EnvOverride {
    pub field: &'static str,
    /// Checked in order; the first one set to a non-empty value wins.
    pub keys: &'static [&'static str],
    apply: Apply,
}

impl EnvOverride {
    /// First non-empty value among this field's keys, with the key it came from.
    pub fn resolve(
        &self,
        lookup: &dyn Fn(&str) -> Option<String>,
    ) -> Option<(&'static str, String)> {
        self.keys.iter().find_map(|key| {
            lookup(key)
                .filter(|value| !value.trim().is_empty())
                .map(|value| (*key, value))
        })
    }
}

pub static ENV_OVERRIDES: &[EnvOverride] = &[
    EnvOverride {
        field: "application",
        keys: &["REVDEPLOY_APPLICATION", "CODEDEPLOY_APPLICATION_NAME"],
        apply: set_application,
    },
    EnvOverride {
        field: "deployment_group",
        keys: &[
            "REVDEPLOY_DEPLOYMENT_GROUP",
            "CODEDEPLOY_DEPLOYMENT_GROUP_NAME",
        ],
        apply: set_deployment_group,
    },
    EnvOverride {
        field: "region",
        keys: &["REVDEPLOY_REGION", "CODEDEPLOY_REGION"],
        apply: set_region,
    },
    EnvOverride {
        field: "bucket",
        keys: &["REVDEPLOY_BUCKET", "CODEDEPLOY_S3_BUCKET"],
        apply: set_bucket,
    },
    EnvOverride {
        field: "key",
        keys: &["REVDEPLOY_KEY", "CODEDEPLOY_S3_OBJECT_KEY"],
        apply: set_key,
    },
    EnvOverride {
        field: "paths",
        keys: &["REVDEPLOY_PATHS", "CODEDEPLOY_REVISION_PATHS"],
        apply: set_paths,
    },
    EnvOverride {
        field: "base_dir",
        keys: &["REVDEPLOY_BASE_DIR"],
        apply: set_base_dir,
    },
    EnvOverride {
        field: "appspec",
        keys: &["REVDEPLOY_APPSPEC", "CODEDEPLOY_CUSTOM_APPSPEC"],
        apply: set_appspec,
    },
    EnvOverride {
        field: "steps",
        keys: &["REVDEPLOY_STEPS", "CODEDEPLOY_DEPLOYMENT_STEPS"],
        apply: set_steps,
    },
    EnvOverride {
        field: "deployment_config",
        keys: &[
            "REVDEPLOY_DEPLOYMENT_CONFIG",
            "CODEDEPLOY_DEPLOYMENT_CONFIG_NAME",
        ],
        apply: set_deployment_config,
    },
    EnvOverride {
        field: "rollback_on_failure",
        keys: &["REVDEPLOY_ROLLBACK_ON_FAILURE", "CODEDEPLOY_ROLLBACK_ON_FAILURE"],
        apply: set_rollback_on_failure,
    },
    EnvOverride {
        field: "wait.timeout",
        keys: &["REVDEPLOY_WAIT_TIMEOUT", "CODEDEPLOY_DEPLOYMENT_WAIT_TIMEOUT_SEC"],
        apply: set_wait_timeout,
    },
    EnvOverride {
        field: "wait.poll_interval",
        keys: &[
            "REVDEPLOY_POLL_INTERVAL",
            "CODEDEPLOY_DEPLOYMENT_WAIT_POLLING_INTERVAL_SEC",
        ],
        apply: set_poll_interval,
    },
];

impl Config {
    /// Apply environment overrides found through `lookup`.
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<()> {
        for entry in ENV_OVERRIDES {
            if let Some((key, value)) = entry.resolve(&lookup) {
                tracing::debug!("{} overridden by {key}", entry.field);
                (entry.apply)(self, value).map_err(|e| {
                    Error::InvalidConfig(format!("{key}: {e}"))
                })?;
            }
        }
        Ok(())
    }
}

fn set_application(config: &mut Config, value: String) -> Result<()> {
    config.application = value;
    Ok(())
}

fn set_deployment_group(config: &mut Config, value: String) -> Result<()> {
    config.deployment_group = value;
    Ok(())
}

fn set_region(config: &mut Config, value: String) -> Result<()> {
    config.region = Some(value);
    Ok(())
}

fn set_bucket(config: &mut Config, value: String) -> Result<()> {
    config.bucket = value;
    Ok(())
}

fn set_key(config: &mut Config, value: String) -> Result<()> {
    config.key = value;
    Ok(())
}

fn set_paths(config: &mut Config, value: String) -> Result<()> {
    config.paths = value;
    Ok(())
}

fn set_base_dir(config: &mut Config, value: String) -> Result<()> {
    config.base_dir = PathBuf::from(value);
    Ok(())
}

fn set_appspec(config: &mut Config, value: String) -> Result<()> {
    config.appspec = Some(value);
    Ok(())
}

fn set_steps(config: &mut Config, value: String) -> Result<()> {
    config.steps = serde_yaml::from_str::<DeploymentSteps>(value.trim())?;
    Ok(())
}

fn set_deployment_config(config: &mut Config, value: String) -> Result<()> {
    config.deployment_config = Some(value);
    Ok(())
}

fn set_rollback_on_failure(config: &mut Config, value: String) -> Result<()> {
    config.rollback_on_failure = match value.trim().to_ascii_lowercase().as_str() {
        "true" | "yes" | "1" => true,
        "false" | "no" | "0" => false,
        other => {
            return Err(Error::InvalidConfig(format!("expected a boolean, got '{other}'")));
        }
    };
    Ok(())
}

fn set_wait_timeout(config: &mut Config, value: String) -> Result<()> {
    config.wait.timeout = parse_duration(&value)?;
    Ok(())
}

fn set_poll_interval(config: &mut Config, value: String) -> Result<()> {
    config.wait.poll_interval = parse_duration(&value)?;
    Ok(())
}

/// A bare number is seconds; anything else goes through humantime ("90s", "5m").
fn parse_duration(value: &str) -> Result<Duration> {
    let value = value.trim();
    if let Ok(secs) = value.parse::<u64>() {
        return Ok(Duration::from_secs(secs));
    }
    humantime_serde::re::humantime::parse_duration(value)
        .map_err(|e| Error::InvalidConfig(format!("invalid duration '{value}': {e}")))
}
