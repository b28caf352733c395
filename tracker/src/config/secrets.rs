// File: tracker/src/config/secrets.rs
//! Secrets loader for the cron secret and provider credentials.
//!
//! Secrets are stored in a separate TOML file (config/secrets.toml) that should
//! be excluded from version control. Each value can be overridden from the
//! environment, which takes precedence over the file.
//!
//! Example secrets.toml:
//! ```toml
//! cron_secret = "long-random-string"
//! email_api_key = "re_..."
//! push_access_token = "ya29..."
//! ```

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fmt;
use std::path::Path;
use tracing::{info, warn};

pub const ENV_CRON_SECRET: &str = "TRACKER_CRON_SECRET";
pub const ENV_EMAIL_API_KEY: &str = "TRACKER_EMAIL_API_KEY";
pub const ENV_PUSH_ACCESS_TOKEN: &str = "TRACKER_PUSH_ACCESS_TOKEN";

/// Structure matching the secrets.toml file format. Missing keys are empty.
#[derive(Clone, Default, Deserialize)]
pub struct Secrets {
    #[serde(default)]
    pub cron_secret: String,
    #[serde(default)]
    pub email_api_key: String,
    #[serde(default)]
    pub push_access_token: String,
}

impl fmt::Debug for Secrets {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |value: &str| if value.is_empty() { "<unset>" } else { "<redacted>" };
        f.debug_struct("Secrets")
            .field("cron_secret", &redact(&self.cron_secret))
            .field("email_api_key", &redact(&self.email_api_key))
            .field("push_access_token", &redact(&self.push_access_token))
            .finish()
    }
}

/// Loader for secrets from the secrets.toml file
pub struct SecretsLoader {
    secrets: Secrets,
}

impl SecretsLoader {
    /// Load secrets from the specified file path.
    /// Returns an empty loader if the file doesn't exist.
    pub fn load(secrets_path: &Path) -> Result<Self> {
        if !secrets_path.exists() {
            warn!(
                "Secrets file not found at {:?}, secrets must come from the environment",
                secrets_path
            );
            return Ok(Self {
                secrets: Secrets::default(),
            });
        }

        let content = std::fs::read_to_string(secrets_path)
            .with_context(|| format!("Failed to read secrets file: {:?}", secrets_path))?;

        let secrets: Secrets = toml::from_str(&content)
            .with_context(|| format!("Failed to parse secrets file: {:?}", secrets_path))?;

        info!("Loaded secrets from {:?}", secrets_path);

        Ok(Self { secrets })
    }

    /// Replace file values with non-empty values returned by `lookup`
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let targets = [
            (ENV_CRON_SECRET, &mut self.secrets.cron_secret),
            (ENV_EMAIL_API_KEY, &mut self.secrets.email_api_key),
            (ENV_PUSH_ACCESS_TOKEN, &mut self.secrets.push_access_token),
        ];

        for (key, target) in targets {
            if let Some(value) = lookup(key).filter(|v| !v.is_empty()) {
                info!("Using {} from the environment", key);
                *target = value;
            }
        }
        self
    }

    pub fn into_secrets(self) -> Secrets {
        self.secrets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_load_secrets() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
cron_secret = "cron-123"
email_api_key = "re_test"
"#
        )
        .unwrap();

        let secrets = SecretsLoader::load(file.path()).unwrap().into_secrets();

        assert_eq!(secrets.cron_secret, "cron-123");
        assert_eq!(secrets.email_api_key, "re_test");
        assert_eq!(secrets.push_access_token, "");
    }

    #[test]
    fn test_missing_file() {
        let secrets = SecretsLoader::load(Path::new("/nonexistent/path/secrets.toml"))
            .unwrap()
            .into_secrets();
        assert!(secrets.cron_secret.is_empty());
    }

    #[test]
    fn test_environment_overrides_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"cron_secret = "from-file""#).unwrap();

        let secrets = SecretsLoader::load(file.path())
            .unwrap()
            .with_overrides(|key| match key {
                ENV_CRON_SECRET => Some("from-env".to_string()),
                ENV_PUSH_ACCESS_TOKEN => Some(String::new()),
                _ => None,
            })
            .into_secrets();

        assert_eq!(secrets.cron_secret, "from-env");
        assert!(secrets.push_access_token.is_empty());
    }

    #[test]
    fn test_debug_redacts_values() {
        let secrets = Secrets {
            cron_secret: "super-secret".to_string(),
            ..Secrets::default()
        };
        let rendered = format!("{:?}", secrets);
        assert!(!rendered.contains("super-secret"));
        assert!(rendered.contains("<redacted>"));
        assert!(rendered.contains("<unset>"));
    }
}
