// ABOUTME: Configuration types and parsing for revdeploy.yml.
// ABOUTME: Handles YAML parsing, environment overrides, and validation.

mod init;
mod overrides;

pub use init::init_config;
pub use overrides::{ENV_OVERRIDES, EnvOverride};

use crate::deploy::{DeploymentOptions, FileExistsBehavior, WaitSettings};
use crate::error::{Error, Result};
use crate::listener::Identity;
use crate::pipeline::{DeploymentSteps, PipelineSettings};
use crate::revision::RevisionSpec;
use crate::types::{BundleType, region_name};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const CONFIG_FILENAME: &str = "revdeploy.yml";
pub const CONFIG_FILENAME_ALT: &str = "revdeploy.yaml";
pub const CONFIG_FILENAME_DIR: &str = ".revdeploy/config.yml";

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub application: String,

    #[serde(default)]
    pub deployment_group: String,

    #[serde(default)]
    pub region: Option<String>,

    #[serde(default)]
    pub bucket: String,

    #[serde(default)]
    pub key: String,

    /// Mapping rules, either one string or a list of items.
    #[serde(default, deserialize_with = "deserialize_rules")]
    pub paths: String,

    #[serde(default = "default_base_dir")]
    pub base_dir: PathBuf,

    #[serde(default)]
    pub temp_dir: Option<PathBuf>,

    #[serde(default)]
    pub revision_name: Option<String>,

    /// Custom spec file: a path ending in `appspec.yml`, or its literal content.
    #[serde(default)]
    pub appspec: Option<String>,

    #[serde(default)]
    pub steps: DeploymentSteps,

    #[serde(default)]
    pub deployment_config: Option<String>,

    #[serde(default)]
    pub file_exists_behavior: Option<FileExistsBehavior>,

    #[serde(default)]
    pub rollback_on_failure: bool,

    #[serde(default)]
    pub description: Option<String>,

    #[serde(default)]
    pub wait: WaitConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct WaitConfig {
    #[serde(default = "default_wait_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    #[serde(default = "default_poll_interval", with = "humantime_serde")]
    pub poll_interval: Duration,
}

impl Default for WaitConfig {
    fn default() -> Self {
        Self {
            timeout: default_wait_timeout(),
            poll_interval: default_poll_interval(),
        }
    }
}

fn default_base_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_wait_timeout() -> Duration {
    WaitSettings::default().timeout
}

fn default_poll_interval() -> Duration {
    WaitSettings::default().poll_interval
}

impl Config {
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml).map_err(Error::from)
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    pub fn discover(dir: &Path) -> Result<Self> {
        let candidates = [
            dir.join(CONFIG_FILENAME),
            dir.join(CONFIG_FILENAME_ALT),
            dir.join(CONFIG_FILENAME_DIR),
        ];

        for path in &candidates {
            if path.exists() {
                tracing::debug!("loading configuration from {}", path.display());
                return Self::load(path);
            }
        }

        Err(Error::ConfigNotFound(dir.to_path_buf()))
    }

    /// Discover the config file and apply overrides from the process environment.
    pub fn discover_with_env(dir: &Path) -> Result<Self> {
        let mut config = Self::discover(dir)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Check everything a full pipeline run needs before touching the remote side.
    pub fn validate(&self) -> Result<()> {
        self.validate_packaging()?;

        if let Some(region) = &self.region {
            region_name(region)?;
        }
        require("bucket", &self.bucket)?;
        require("key", &self.key)?;
        BundleType::from_key(&self.key)?;

        if self.steps.deploys() {
            require("deployment_group", &self.deployment_group)?;
        }
        if self.wait.poll_interval.is_zero() {
            return Err(Error::InvalidConfig(
                "wait.poll_interval must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Check what building the archive alone needs.
    pub fn validate_packaging(&self) -> Result<()> {
        require("application", &self.application)
    }

    /// Archive name, defaulting to the application name.
    pub fn revision_name(&self) -> &str {
        self.revision_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&self.application)
    }

    /// Directory the archive is written to.
    pub fn temp_dir(&self) -> PathBuf {
        self.temp_dir
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("revdeploy"))
    }

    /// Archive build inputs, with relative directories resolved against `dir`.
    pub fn revision_spec(&self, dir: &Path) -> RevisionSpec {
        RevisionSpec {
            name: self.revision_name().to_string(),
            rules: self.paths.clone(),
            base_dir: dir.join(&self.base_dir),
            temp_dir: dir.join(self.temp_dir()),
            custom_spec: self.appspec.clone(),
        }
    }

    pub fn deployment_options(&self) -> DeploymentOptions {
        DeploymentOptions {
            application: self.application.clone(),
            deployment_group: self.deployment_group.clone(),
            deployment_config: self.deployment_config.clone(),
            file_exists_behavior: self.file_exists_behavior,
            rollback_on_failure: self.rollback_on_failure,
            description: self.description.clone(),
        }
    }

    pub fn wait_settings(&self) -> WaitSettings {
        WaitSettings {
            timeout: self.wait.timeout,
            poll_interval: self.wait.poll_interval,
        }
    }

    pub fn pipeline_settings(&self, dir: &Path) -> PipelineSettings {
        PipelineSettings {
            revision: self.revision_spec(dir),
            bucket: self.bucket.clone(),
            key: self.key.clone(),
            options: self.deployment_options(),
            wait: self.wait_settings(),
            steps: self.steps,
        }
    }

    /// Values identifying this deployment setup for problem fingerprints.
    pub fn identity(&self, checkout_dir: &Path) -> Identity {
        let base_dir = self.base_dir.to_string_lossy();
        let values = [
            self.application.as_str(),
            self.deployment_group.as_str(),
            self.region.as_deref().unwrap_or_default(),
            self.bucket.as_str(),
            self.key.as_str(),
            self.paths.as_str(),
            &*base_dir,
        ];
        Identity::new(values, Some(checkout_dir))
    }

    pub fn template() -> Self {
        Config {
            application: "my-app".to_string(),
            deployment_group: "production".to_string(),
            region: Some("us-east-1".to_string()),
            bucket: "my-revisions".to_string(),
            key: "my-app/revision.zip".to_string(),
            paths: "**/*".to_string(),
            base_dir: default_base_dir(),
            temp_dir: None,
            revision_name: None,
            appspec: None,
            steps: DeploymentSteps::default(),
            deployment_config: None,
            file_exists_behavior: None,
            rollback_on_failure: false,
            description: None,
            wait: WaitConfig::default(),
        }
    }
}

fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::InvalidConfig(format!("{field} must not be empty")));
    }
    Ok(())
}

// Custom deserializers

fn deserialize_rules<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    match RulesEntry::deserialize(deserializer)? {
        RulesEntry::Text(text) => Ok(text),
        RulesEntry::List(items) => Ok(items.join("\n")),
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RulesEntry {
    Text(String),
    List(Vec<String>),
}
