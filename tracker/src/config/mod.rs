// File: tracker/src/config/mod.rs
pub mod manager;
pub mod secrets;

use serde::{Deserialize, Serialize};

pub use manager::ConfigManager;
pub use secrets::{Secrets, SecretsLoader};

use crate::constants::defaults;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_database_path")]
    pub database_path: String,
    /// 6-field cron expression for the in-process sweep; unset leaves
    /// triggering to the external scheduler
    pub sweep_schedule: Option<String>,
    /// Skip vehicles without an odometer reading instead of evaluating them by date only
    #[serde(default)]
    pub require_current_mileage: bool,
    #[serde(default = "default_dashboard_url")]
    pub dashboard_url: String,
    #[serde(default)]
    pub email: EmailConfig,
    #[serde(default)]
    pub push: PushConfig,
    // Populated from secrets.toml and the environment
    #[serde(skip)]
    pub secrets: Secrets,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmailConfig {
    #[serde(default = "default_email_api_base")]
    pub api_base: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    #[serde(default = "default_from_email")]
    pub from_email: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PushConfig {
    /// Full FCM send URL, e.g. `https://fcm.googleapis.com/v1/projects/<id>/messages:send`
    #[serde(default)]
    pub endpoint: String,
}

impl Default for EmailConfig {
    fn default() -> Self {
        Self {
            api_base: default_email_api_base(),
            from_name: default_from_name(),
            from_email: default_from_email(),
        }
    }
}

fn default_host() -> String {
    defaults::HOST.to_string()
}

fn default_port() -> u16 {
    defaults::PORT
}

fn default_database_path() -> String {
    defaults::DATABASE_PATH.to_string()
}

fn default_dashboard_url() -> String {
    defaults::DASHBOARD_URL.to_string()
}

fn default_email_api_base() -> String {
    defaults::EMAIL_API_BASE.to_string()
}

fn default_from_name() -> String {
    defaults::EMAIL_FROM_NAME.to_string()
}

fn default_from_email() -> String {
    defaults::EMAIL_FROM_ADDRESS.to_string()
}
