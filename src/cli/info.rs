//
//  jenkins-cli
//  cli/info.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/14.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Controller information
//!
//! ```bash
//! # Version, security, and item counts
//! jk info
//!
//! # Installed plugins
//! jk info --plugins
//! ```

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::api::plugin::Plugin;
use crate::output::{format_bool, truncate, TableOutput};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct InfoCommand {
    /// List installed plugins instead
    #[arg(long)]
    pub plugins: bool,
}

#[derive(Debug, Serialize)]
struct ServerDetail {
    url: String,
    version: Option<String>,
    description: Option<String>,
    mode: String,
    executors: i64,
    quieting_down: bool,
    use_security: bool,
    use_crumbs: bool,
    jobs: usize,
    views: usize,
}

impl TableOutput for ServerDetail {
    fn headers() -> Vec<&'static str> {
        vec![
            "URL",
            "VERSION",
            "DESCRIPTION",
            "MODE",
            "EXECUTORS",
            "QUIETING DOWN",
            "SECURITY",
            "CSRF",
            "JOBS",
            "VIEWS",
        ]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.url.clone(),
            self.version.clone().unwrap_or_else(|| "unknown".to_string()),
            self.description.clone().unwrap_or_default(),
            self.mode.clone(),
            self.executors.to_string(),
            format_bool(self.quieting_down, color),
            format_bool(self.use_security, color),
            format_bool(self.use_crumbs, color),
            self.jobs.to_string(),
            self.views.to_string(),
        ]
    }
}

#[derive(Debug, Serialize)]
struct PluginListItem {
    name: String,
    title: String,
    version: String,
    enabled: bool,
    has_update: bool,
}

impl From<&Plugin> for PluginListItem {
    fn from(plugin: &Plugin) -> Self {
        Self {
            name: plugin.short_name.clone(),
            title: plugin.long_name.clone(),
            version: plugin.version.clone(),
            enabled: plugin.enabled,
            has_update: plugin.has_update,
        }
    }
}

impl TableOutput for PluginListItem {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "TITLE", "VERSION", "ENABLED", "UPDATE"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            truncate(&self.title, 40),
            self.version.clone(),
            format_bool(self.enabled, color),
            format_bool(self.has_update, color),
        ]
    }
}

impl InfoCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let writer = global.writer();

        if self.plugins {
            let plugins = jenkins.get_plugins(1).await?;
            let items: Vec<PluginListItem> = plugins.plugins().iter().map(Into::into).collect();
            return writer.write_list(&items, "No plugins installed.");
        }

        let info = jenkins.info().await?;
        let detail = ServerDetail {
            url: jenkins.base_url().to_string(),
            version: info.version.jenkins.clone(),
            description: info.description.clone(),
            mode: info.mode.clone(),
            executors: info.num_executors,
            quieting_down: info.quieting_down,
            use_security: info.use_security,
            use_crumbs: jenkins.has_csrf_protection(),
            jobs: info.jobs.len(),
            views: info.views.len(),
        };
        writer.write(&detail)
    }
}
