//
//  jenkins-cli
//  api/plugin.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/17.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Installed plugins, read from `/pluginManager`.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::Jenkins;
use super::common::{null_default, Result};
use super::resource::{Resource, PLUGIN_MANAGER_PATH};

/// One installed plugin.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plugin {
    /// Loaded and running.
    #[serde(default)]
    pub active: bool,
    /// Version a downgrade would restore.
    #[serde(default, deserialize_with = "null_default")]
    pub backup_version: String,
    /// Shipped inside the Jenkins distribution.
    #[serde(default)]
    pub bundled: bool,
    /// Marked for removal at the next restart.
    #[serde(default)]
    pub deleted: bool,
    /// A backup version is available.
    #[serde(default)]
    pub downgradable: bool,
    /// Enabled in the plugin manager.
    #[serde(default)]
    pub enabled: bool,
    /// An update is available.
    #[serde(default)]
    pub has_update: bool,
    /// Human readable name, e.g. `Git plugin`.
    #[serde(default)]
    pub long_name: String,
    /// Pinned against bundled upgrades.
    #[serde(default)]
    pub pinned: bool,
    /// Plugin id, e.g. `git`.
    #[serde(default)]
    pub short_name: String,
    /// `YES`, `NO` or `MAYBE`.
    #[serde(default)]
    pub supports_dynamic_load: String,
    /// Plugin home page.
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    /// Installed version.
    #[serde(default)]
    pub version: String,
}

/// Snapshot of the plugin manager document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PluginResponse {
    /// Installed plugins.
    #[serde(default, deserialize_with = "null_default")]
    pub plugins: Vec<Plugin>,
}

/// Handle on the plugin manager.
#[derive(Debug, Clone)]
pub struct Plugins<'a> {
    client: &'a Jenkins,
    base: String,
    depth: u32,
    raw: Option<PluginResponse>,
}

#[async_trait]
impl<'a> Resource for Plugins<'a> {
    type Raw = PluginResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&PluginResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: PluginResponse) {
        self.raw = Some(raw);
    }

    fn poll_query(&self) -> Vec<(&'static str, String)> {
        vec![("depth", self.depth.to_string())]
    }
}

impl<'a> Plugins<'a> {
    /// Creates an unpopulated handle polled with the given `depth`.
    pub fn new(client: &'a Jenkins, depth: u32) -> Self {
        Self {
            client,
            base: PLUGIN_MANAGER_PATH.to_string(),
            depth,
            raw: None,
        }
    }

    /// Plugins from the snapshot.
    pub fn plugins(&self) -> &[Plugin] {
        self.raw
            .as_ref()
            .map(|r| r.plugins.as_slice())
            .unwrap_or_default()
    }

    /// Number of plugins in the snapshot.
    pub fn count(&self) -> usize {
        self.plugins().len()
    }

    /// Finds a plugin by id or display name.
    pub fn contains(&self, name: &str) -> Option<&Plugin> {
        self.plugins()
            .iter()
            .find(|p| p.short_name == name || p.long_name == name)
    }
}

impl Jenkins {
    /// Polls the plugin manager.
    pub async fn get_plugins(&self, depth: u32) -> Result<Plugins<'_>> {
        let mut plugins = Plugins::new(self, depth);
        plugins.refresh().await?;
        Ok(plugins)
    }

    /// Looks up an installed plugin at depth 1.
    pub async fn has_plugin(&self, name: &str) -> Result<Option<Plugin>> {
        let plugins = self.get_plugins(1).await?;
        Ok(plugins.contains(name).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_has_plugin() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/pluginManager/api/json")
            .match_query(Matcher::UrlEncoded("depth".into(), "1".into()))
            .with_status(200)
            .with_body(
                r#"{"plugins": [
                    {"shortName": "git", "longName": "Git plugin", "version": "5.2.1", "active": true},
                    {"shortName": "cloudbees-folder", "longName": "Folders Plugin", "version": "6.9"}
                ]}"#,
            )
            .create_async()
            .await;

        let jenkins = Jenkins::new(ClientOptions::new(server.url())).unwrap();
        let git = jenkins.has_plugin("git").await.unwrap().unwrap();
        assert_eq!(git.version, "5.2.1");
        assert!(jenkins.has_plugin("Folders Plugin").await.unwrap().is_some());
        assert!(jenkins.has_plugin("nope").await.unwrap().is_none());
    }
}
