//
//  jenkins-cli
//  cli/view.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/15.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! View commands
//!
//! ```bash
//! jk view list
//! jk view show Nightly
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::View;
use crate::output::{truncate, TableOutput};

use super::job::JobListItem;
use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct ViewCommand {
    #[command(subcommand)]
    pub command: ViewSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum ViewSubcommand {
    /// List views
    #[command(visible_alias = "ls")]
    List,

    /// List the jobs of a view
    Show(ShowArgs),
}

#[derive(Args, Debug)]
pub struct ShowArgs {
    /// View name
    pub name: String,
}

#[derive(Debug, Serialize)]
struct ViewItem {
    name: String,
    description: String,
    jobs: usize,
    url: String,
}

impl From<&View<'_>> for ViewItem {
    fn from(view: &View<'_>) -> Self {
        Self {
            name: view.name().unwrap_or_default().to_string(),
            description: view.description().unwrap_or_default().to_string(),
            jobs: view.jobs_metadata().len(),
            url: view.url().unwrap_or_default().to_string(),
        }
    }
}

impl TableOutput for ViewItem {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "DESCRIPTION", "JOBS", "URL"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            truncate(&self.description, 40),
            self.jobs.to_string(),
            self.url.clone(),
        ]
    }
}

impl ViewCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            ViewSubcommand::List => self.list(global).await,
            ViewSubcommand::Show(args) => self.show(args, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let items: Vec<ViewItem> = jenkins
            .get_all_views()
            .await?
            .iter()
            .map(Into::into)
            .collect();
        global.writer().write_list(&items, "No views found.")
    }

    async fn show(&self, args: &ShowArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let view = jenkins.get_view(&args.name).await?;
        let items: Vec<JobListItem> = view.jobs_metadata().iter().map(Into::into).collect();
        global
            .writer()
            .write_list(&items, &format!("View {} has no jobs.", args.name))
    }
}
