use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::provider::meteomatics::DEFAULT_BASE_URL;

pub const ENV_USERNAME: &str = "METEOMATICS_USERNAME";
pub const ENV_PASSWORD: &str = "METEOMATICS_PASSWORD";
pub const ENV_BASE_URL: &str = "METEOMATICS_BASE_URL";

/// Account credentials for the weather data provider.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// Optional endpoint override, e.g. for a proxy.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,

    /// Example TOML:
    /// [meteomatics]
    /// username = "..."
    /// password = "..."
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meteomatics: Option<Credentials>,
}

impl Config {
    /// Load config from disk, or return an empty default if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        let path = Self::config_file_path()?;
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        Self::from_toml(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    pub fn from_toml(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        let path = Self::config_file_path()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(&path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "heatgrid", "heatgrid")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Apply `METEOMATICS_*` variables from the process environment.
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup. Username and password only replace
    /// the stored credentials when both are present.
    pub fn with_overrides_from<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v: &String| !v.is_empty());

        if let (Some(username), Some(password)) = (non_empty(ENV_USERNAME), non_empty(ENV_PASSWORD)) {
            self.meteomatics = Some(Credentials { username, password });
        }
        if let Some(url) = non_empty(ENV_BASE_URL) {
            self.base_url = Some(url);
        }

        self
    }

    pub fn set_credentials(&mut self, credentials: Credentials) {
        self.meteomatics = Some(credentials);
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        self.meteomatics.as_ref()
    }

    pub fn is_configured(&self) -> bool {
        self.credentials().is_some()
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn creds(user: &str) -> Credentials {
        Credentials { username: user.into(), password: "s3cret".into() }
    }

    #[test]
    fn default_config_is_not_configured() {
        let cfg = Config::default();
        assert!(!cfg.is_configured());
        assert_eq!(cfg.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn set_credentials_marks_configured() {
        let mut cfg = Config::default();
        cfg.set_credentials(creds("alice"));

        assert!(cfg.is_configured());
        assert_eq!(cfg.credentials().map(|c| c.username.as_str()), Some("alice"));
    }

    #[test]
    fn toml_roundtrip_keeps_credentials_and_url() {
        let mut cfg = Config::default();
        cfg.set_credentials(creds("alice"));
        cfg.base_url = Some("http://localhost:9000".into());

        let text = toml::to_string_pretty(&cfg).unwrap();
        assert!(text.contains("[meteomatics]"));
        assert_eq!(Config::from_toml(&text).unwrap(), cfg);
    }

    #[test]
    fn empty_toml_is_default() {
        assert_eq!(Config::from_toml("").unwrap(), Config::default());
    }

    #[test]
    fn env_overrides_replace_credentials_when_complete() {
        let env: HashMap<&str, &str> =
            [(ENV_USERNAME, "bob"), (ENV_PASSWORD, "hunter2"), (ENV_BASE_URL, "http://proxy")].into();

        let mut cfg = Config::default();
        cfg.set_credentials(creds("alice"));
        let cfg = cfg.with_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.credentials().map(|c| c.username.as_str()), Some("bob"));
        assert_eq!(cfg.base_url(), "http://proxy");
    }

    #[test]
    fn partial_env_overrides_are_ignored() {
        let env: HashMap<&str, &str> = [(ENV_USERNAME, "bob"), (ENV_PASSWORD, "")].into();

        let mut cfg = Config::default();
        cfg.set_credentials(creds("alice"));
        let cfg = cfg.with_overrides_from(|k| env.get(k).map(|v| v.to_string()));

        assert_eq!(cfg.credentials().map(|c| c.username.as_str()), Some("alice"));
    }

    #[test]
    fn credentials_debug_is_redacted() {
        let shown = format!("{:?}", creds("alice"));
        assert!(shown.contains("alice"));
        assert!(!shown.contains("s3cret"));
    }
}
