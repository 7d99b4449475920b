// ABOUTME: Config scaffolding for new projects.
// ABOUTME: Creates revdeploy.yml template files.

use std::path::Path;

use crate::error::{Error, Result};

use super::{CONFIG_FILENAME, Config};

pub fn init_config(dir: &Path, application: Option<&str>, force: bool) -> Result<()> {
    let config_path = dir.join(CONFIG_FILENAME);

    if config_path.exists() && !force {
        return Err(Error::AlreadyExists(config_path));
    }

    let mut config = Config::template();

    if let Some(name) = application {
        if name.trim().is_empty() {
            return Err(Error::InvalidConfig(
                "application must not be empty".to_string(),
            ));
        }
        config.application = name.to_string();
        config.key = format!("{name}/revision.zip");
    }

    let yaml = generate_template_yaml(&config);
    std::fs::write(&config_path, yaml)?;

    Ok(())
}

fn generate_template_yaml(config: &Config) -> String {
    format!(
        r#"application: {}
deployment_group: {}
region: {}
bucket: {}
key: {}

# Mapping rules: "pattern => destination", one per line or list item.
# Prefix an item with "-:" to exclude matching files.
paths: "{}"

# Custom appspec.yml: a path to the file, or its literal content
# appspec: deploy/appspec.yml

# upload | register | deploy | deploy-and-wait
steps: deploy-and-wait

wait:
  timeout: 30m
  poll_interval: 15s
"#,
        config.application,
        config.deployment_group,
        config.region.as_deref().unwrap_or("us-east-1"),
        config.bucket,
        config.key,
        config.paths,
    )
}
