//
//  jenkins-cli
//  context/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Server Context Module
//!
//! Decides which Jenkins controller a `jk` invocation talks to and with
//! which credentials, then opens the connection.
//!
//! ## Resolution Priority
//!
//! 1. `--url` (or `JENKINS_URL`)
//! 2. `--server <name>` looked up in the configuration file
//! 3. The configured default server
//!
//! `--user`/`--token` (or `JENKINS_USER`/`JENKINS_API_TOKEN`) replace the
//! stored credentials, and `--insecure` disables certificate checks, no
//! matter where the URL came from.
//!
//! ## Example
//!
//! ```rust,no_run
//! use jenkins_cli::cli::GlobalOptions;
//! use jenkins_cli::config::Config;
//! use jenkins_cli::context::ContextResolver;
//!
//! # async fn demo() -> anyhow::Result<()> {
//! let resolver = ContextResolver::new(Config::load()?);
//! let ctx = resolver.resolve(&GlobalOptions::default())?;
//! let jenkins = ctx.connect().await?;
//! println!("{}", jenkins.base_url());
//! # Ok(())
//! # }
//! ```

use anyhow::{bail, Context, Result};

use crate::api::{ClientOptions, Jenkins};
use crate::auth::Credential;
use crate::cli::GlobalOptions;
use crate::config::{Config, ServerConfig};

/// A resolved connection target.
#[derive(Debug, Clone)]
pub struct ServerContext {
    /// Configured server name; `None` when given by URL.
    pub name: Option<String>,
    /// Options the client will be built with.
    pub options: ClientOptions,
}

impl ServerContext {
    /// Human readable label for messages.
    pub fn label(&self) -> String {
        match &self.name {
            Some(name) => format!("{} ({})", name, self.options.base_url),
            None => self.options.base_url.clone(),
        }
    }

    /// Builds the client and runs the connection handshake.
    pub async fn connect(&self) -> Result<Jenkins> {
        let mut jenkins = Jenkins::new(self.options.clone())?;
        jenkins
            .init()
            .await
            .with_context(|| format!("Failed to connect to {}", self.label()))?;
        tracing::debug!(
            version = jenkins.version().unwrap_or("unknown"),
            csrf = jenkins.has_csrf_protection(),
            "connected"
        );
        Ok(jenkins)
    }
}

pub struct ContextResolver {
    config: Config,
}

impl ContextResolver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn resolve(&self, options: &GlobalOptions) -> Result<ServerContext> {
        let (name, server) = match (&options.url, &options.server) {
            (Some(url), _) => (
                None,
                ServerConfig {
                    url: url.clone(),
                    ..Default::default()
                },
            ),
            (None, Some(name)) => {
                let server = self
                    .config
                    .server(name)
                    .with_context(|| format!("Unknown server '{}'", name))?;
                (Some(name.clone()), server.clone())
            }
            (None, None) => match self.config.default_server() {
                Some((name, server)) => (Some(name.to_string()), server.clone()),
                None => bail!(
                    "No Jenkins server configured. Use --url, set JENKINS_URL, or add a [servers.<name>] section to the config file."
                ),
            },
        };

        let mut client_options = server.client_options();
        if options.insecure {
            client_options = client_options.accept_invalid_certs(true);
        }
        if let Some(credential) = override_credential(options, &server) {
            client_options = client_options.with_credential(credential);
        }

        Ok(ServerContext {
            name,
            options: client_options,
        })
    }
}

/// Credential from the command line, filling gaps from the stored server.
fn override_credential(options: &GlobalOptions, server: &ServerConfig) -> Option<Credential> {
    if options.user.is_none() && options.token.is_none() {
        return None;
    }
    let user = options.user.as_ref().or(server.username.as_ref());
    let token = options.token.as_ref().or(server.token.as_ref());
    match (user, token) {
        (Some(user), Some(token)) => Some(Credential::token(user, token)),
        (None, Some(token)) => Some(Credential::bearer(token)),
        (Some(_), None) => None,
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        toml::from_str(
            r#"
[core]
default_server = "work"

[servers.work]
url = "https://ci.example.com"
username = "admin"
token = "secret"

[servers.lab]
url = "https://jenkins.lab.local"
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_url_flag_wins() {
        let resolver = ContextResolver::new(config());
        let options = GlobalOptions {
            url: Some("http://localhost:8080".to_string()),
            server: Some("lab".to_string()),
            ..Default::default()
        };
        let ctx = resolver.resolve(&options).unwrap();
        assert_eq!(ctx.name, None);
        assert_eq!(ctx.options.base_url, "http://localhost:8080");
        assert!(ctx.options.credential.is_none());
    }

    #[test]
    fn test_named_server() {
        let resolver = ContextResolver::new(config());
        let options = GlobalOptions {
            server: Some("lab".to_string()),
            insecure: true,
            ..Default::default()
        };
        let ctx = resolver.resolve(&options).unwrap();
        assert_eq!(ctx.name.as_deref(), Some("lab"));
        assert!(ctx.options.accept_invalid_certs);
    }

    #[test]
    fn test_default_server_with_user_override() {
        let resolver = ContextResolver::new(config());
        let options = GlobalOptions {
            user: Some("deployer".to_string()),
            ..Default::default()
        };
        let ctx = resolver.resolve(&options).unwrap();
        assert_eq!(ctx.name.as_deref(), Some("work"));
        assert_eq!(
            ctx.options.credential.unwrap().username(),
            Some("deployer")
        );
    }

    #[test]
    fn test_unknown_server() {
        let resolver = ContextResolver::new(config());
        let options = GlobalOptions {
            server: Some("nope".to_string()),
            ..Default::default()
        };
        let err = resolver.resolve(&options).unwrap_err();
        assert!(err.to_string().contains("Unknown server 'nope'"));
    }

    #[test]
    fn test_nothing_configured() {
        let resolver = ContextResolver::new(Config::default());
        assert!(resolver.resolve(&GlobalOptions::default()).is_err());
    }
}
