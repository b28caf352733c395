//! Test configuration builder for writing config directories programmatically

use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

/// Builder for creating test configuration directories
pub struct TestConfigBuilder {
    temp_dir: TempDir,
    main_config: MainConfigBuilder,
    secrets: Option<SecretsBuilder>,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        Self {
            temp_dir,
            main_config: MainConfigBuilder::default(),
            secrets: None,
        }
    }

    /// Configure main settings
    pub fn with_main_config<F>(mut self, f: F) -> Self
    where
        F: FnOnce(MainConfigBuilder) -> MainConfigBuilder,
    {
        self.main_config = f(self.main_config);
        self
    }

    /// Write a secrets.toml next to main.toml
    pub fn with_secrets<F>(mut self, f: F) -> Self
    where
        F: FnOnce(SecretsBuilder) -> SecretsBuilder,
    {
        self.secrets = Some(f(SecretsBuilder::default()));
        self
    }

    /// Build and write config files to temp directory
    pub fn build(self) -> TestConfig {
        let config_dir = self.temp_dir.path().join("config");
        fs::create_dir_all(&config_dir).expect("Failed to create config dir");

        fs::write(config_dir.join("main.toml"), self.main_config.to_toml())
            .expect("Failed to write main.toml");

        if let Some(secrets) = &self.secrets {
            fs::write(config_dir.join("secrets.toml"), secrets.to_toml())
                .expect("Failed to write secrets.toml");
        }

        TestConfig {
            _temp_dir: self.temp_dir,
            config_dir,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Written config directory; removed when dropped
pub struct TestConfig {
    _temp_dir: TempDir,
    pub config_dir: PathBuf,
}

impl TestConfig {
    pub fn dir(&self) -> &str {
        self.config_dir.to_str().expect("utf-8 temp path")
    }
}

/// main.toml builder
#[derive(Clone)]
pub struct MainConfigBuilder {
    port: u16,
    database_path: String,
    sweep_schedule: Option<String>,
    require_current_mileage: bool,
    dashboard_url: String,
}

impl MainConfigBuilder {
    pub fn port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn database_path(mut self, path: &str) -> Self {
        self.database_path = path.to_string();
        self
    }

    pub fn sweep_schedule(mut self, schedule: &str) -> Self {
        self.sweep_schedule = Some(schedule.to_string());
        self
    }

    pub fn require_current_mileage(mut self, required: bool) -> Self {
        self.require_current_mileage = required;
        self
    }

    pub fn dashboard_url(mut self, url: &str) -> Self {
        self.dashboard_url = url.to_string();
        self
    }

    fn to_toml(&self) -> String {
        let schedule = self
            .sweep_schedule
            .as_ref()
            .map(|s| format!("sweep_schedule = \"{}\"\n", s))
            .unwrap_or_default();

        format!(
            r#"
port = {}
database_path = "{}"
require_current_mileage = {}
dashboard_url = "{}"
{}
[email]
from_name = "Test Tracker"
from_email = "tracker@example.com"
"#,
            self.port, self.database_path, self.require_current_mileage, self.dashboard_url, schedule
        )
    }
}

impl Default for MainConfigBuilder {
    fn default() -> Self {
        Self {
            port: 8095,
            database_path: "data/test.db".to_string(),
            sweep_schedule: None,
            require_current_mileage: false,
            dashboard_url: "http://localhost:3000".to_string(),
        }
    }
}

/// secrets.toml builder
#[derive(Clone, Default)]
pub struct SecretsBuilder {
    cron_secret: Option<String>,
    email_api_key: Option<String>,
}

impl SecretsBuilder {
    pub fn cron_secret(mut self, secret: &str) -> Self {
        self.cron_secret = Some(secret.to_string());
        self
    }

    pub fn email_api_key(mut self, key: &str) -> Self {
        self.email_api_key = Some(key.to_string());
        self
    }

    fn to_toml(&self) -> String {
        let mut toml = String::new();
        if let Some(secret) = &self.cron_secret {
            toml.push_str(&format!("cron_secret = \"{}\"\n", secret));
        }
        if let Some(key) = &self.email_api_key {
            toml.push_str(&format!("email_api_key = \"{}\"\n", key));
        }
        toml
    }
}
