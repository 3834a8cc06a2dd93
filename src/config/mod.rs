//
//  jenkins-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! Persistent settings for the `jk` binary: named Jenkins servers and which
//! one to use by default. The library never reads this file; it only sees
//! the [`ClientOptions`] built from it.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/jk/config.toml`
//! - **macOS**: `~/Library/Application Support/jk/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\jk\config.toml`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [core]
//! default_server = "work"
//!
//! [servers.work]
//! url = "https://ci.example.com"
//! username = "admin"
//! token = "11aa22bb33cc"
//! timeout_secs = 30
//!
//! [servers.lab]
//! url = "https://jenkins.lab.local:8443"
//! insecure = true
//! ```
//!
//! Command-line flags and the `JENKINS_URL`, `JENKINS_USER`, and
//! `JENKINS_API_TOKEN` environment variables take precedence over the file.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::api::ClientOptions;
use crate::auth::Credential;
use crate::APP_NAME;

/// Global configuration container for `jk`.
///
/// # Examples
///
/// ```rust
/// use jenkins_cli::config::Config;
///
/// let config: Config = toml::from_str(r#"
///     [core]
///     default_server = "work"
///
///     [servers.work]
///     url = "https://ci.example.com"
/// "#).unwrap();
/// assert_eq!(config.default_server().unwrap().0, "work");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Config {
    /// General settings.
    #[serde(default)]
    pub core: CoreConfig,

    /// Named servers.
    #[serde(default)]
    pub servers: BTreeMap<String, ServerConfig>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct CoreConfig {
    /// Server used when `--server` is not given.
    #[serde(default)]
    pub default_server: Option<String>,
}

/// Connection settings of one Jenkins controller.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct ServerConfig {
    /// Base URL, e.g. `https://ci.example.com`.
    pub url: String,

    /// User name for token authentication.
    #[serde(default)]
    pub username: Option<String>,

    /// API token (or password).
    #[serde(default)]
    pub token: Option<String>,

    /// Skip TLS certificate verification.
    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default)]
    pub timeout_secs: Option<u64>,
}

impl ServerConfig {
    /// Client options for this server.
    ///
    /// A token without a user name is sent as a bearer token.
    pub fn client_options(&self) -> ClientOptions {
        let mut options = ClientOptions::new(&self.url).accept_invalid_certs(self.insecure);
        if let Some(secs) = self.timeout_secs {
            options = options.with_timeout(Duration::from_secs(secs));
        }
        match (&self.username, &self.token) {
            (Some(user), Some(token)) => options.with_credential(Credential::token(user, token)),
            (None, Some(token)) => options.with_credential(Credential::bearer(token)),
            _ => options,
        }
    }
}

impl Config {
    /// Loads the configuration from the default location.
    ///
    /// A missing file yields the default (empty) configuration.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Loads the configuration from `path`.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("Failed to parse {}", path.display()))
    }

    /// Saves the configuration to the default location.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Saves the configuration to `path`, creating parent directories.
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(path, toml::to_string_pretty(self)?)?;
        Ok(())
    }

    /// Path of `config.toml` in the platform config directory.
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", APP_NAME)
            .ok_or_else(|| anyhow::anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// The named server.
    pub fn server(&self, name: &str) -> Option<&ServerConfig> {
        self.servers.get(name)
    }

    /// The default server, or the only server when exactly one is configured.
    pub fn default_server(&self) -> Option<(&str, &ServerConfig)> {
        if let Some(name) = &self.core.default_server {
            return self.servers.get_key_value(name).map(|(k, v)| (k.as_str(), v));
        }
        if self.servers.len() == 1 {
            return self.servers.iter().next().map(|(k, v)| (k.as_str(), v));
        }
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
[core]
default_server = "work"

[servers.work]
url = "https://ci.example.com"
username = "admin"
token = "secret"
timeout_secs = 30

[servers.lab]
url = "https://jenkins.lab.local"
insecure = true
"#;

    #[test]
    fn test_parse_sample() {
        let config: Config = toml::from_str(SAMPLE).unwrap();
        let (name, work) = config.default_server().unwrap();
        assert_eq!(name, "work");
        assert_eq!(work.timeout_secs, Some(30));
        assert!(config.server("lab").unwrap().insecure);
    }

    #[test]
    fn test_missing_file_is_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert!(config.default_server().is_none());
    }

    #[test]
    fn test_save_creates_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config: Config = toml::from_str(SAMPLE).unwrap();
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_single_server_is_default() {
        let config: Config = toml::from_str(
            r#"
[servers.only]
url = "http://localhost:8080"
"#,
        )
        .unwrap();
        assert_eq!(config.default_server().unwrap().0, "only");
    }

    #[test]
    fn test_client_options_from_server() {
        let server = ServerConfig {
            url: "https://ci.example.com".to_string(),
            username: Some("admin".to_string()),
            token: Some("secret".to_string()),
            insecure: true,
            timeout_secs: Some(5),
        };
        let options = server.client_options();
        assert!(options.accept_invalid_certs);
        assert_eq!(options.timeout, Some(Duration::from_secs(5)));
        assert_eq!(options.credential.unwrap().username(), Some("admin"));
    }
}
