// File: tracker/src/config/manager.rs
use super::{Config, SecretsLoader};
use anyhow::Result;
use std::path::Path;
use std::sync::Arc;
use tokio::fs;
use tracing::{info, warn};

use crate::errors::ConfigError;
use crate::scheduler::validate_6_field_cron;

pub struct ConfigManager {
    current_config: Arc<Config>,
}

impl ConfigManager {
    pub async fn new(config_dir: &str) -> Result<Self> {
        let config = Self::load_configuration(config_dir).await?;
        Ok(Self {
            current_config: Arc::new(config),
        })
    }

    pub fn get_current_config(&self) -> Arc<Config> {
        self.current_config.clone()
    }

    async fn load_configuration(config_dir: &str) -> Result<Config> {
        let main_config_path = format!("{}/main.toml", config_dir);
        let main_config_content =
            fs::read_to_string(&main_config_path)
                .await
                .map_err(|e| ConfigError::LoadFailed {
                    path: main_config_path.clone(),
                    reason: e.to_string(),
                })?;

        let mut config: Config =
            toml::from_str(&main_config_content).map_err(|e| ConfigError::ParseError {
                reason: e.to_string(),
            })?;

        let secrets_path = format!("{}/secrets.toml", config_dir);
        config.secrets = SecretsLoader::load(Path::new(&secrets_path))?
            .with_overrides(|key| std::env::var(key).ok())
            .into_secrets();

        Self::validate(&config)?;

        if config.secrets.cron_secret.is_empty() {
            warn!("No cron secret configured, the sweep endpoint will reject every request");
        }

        info!(
            "Loaded configuration: listening on {}:{}, database {}, schedule {}",
            config.host,
            config.port,
            config.database_path,
            config.sweep_schedule.as_deref().unwrap_or("external")
        );

        Ok(config)
    }

    fn validate(config: &Config) -> Result<(), ConfigError> {
        if let Some(schedule) = &config.sweep_schedule {
            validate_6_field_cron(schedule).map_err(|e| ConfigError::InvalidValue {
                field: "sweep_schedule".to_string(),
                reason: e.to_string(),
            })?;
        }

        if !config.dashboard_url.starts_with("http://") && !config.dashboard_url.starts_with("https://") {
            return Err(ConfigError::InvalidValue {
                field: "dashboard_url".to_string(),
                reason: format!("'{}' is not an http(s) URL", config.dashboard_url),
            });
        }

        if config.database_path.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "database_path".to_string(),
                reason: "must not be empty".to_string(),
            });
        }

        Ok(())
    }
}
