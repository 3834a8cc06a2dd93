//
//  jenkins-cli
//  cli/job.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/14.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Job commands
//!
//! Jobs inside folders are addressed by their full name, `team/app`.
//!
//! ## Examples
//!
//! ```bash
//! # Top-level jobs, or the jobs of a folder
//! jk job list
//! jk job list --folder team
//!
//! # Trigger a parameterized build
//! jk job build team/app -p BRANCH=main -p DEPLOY=false
//!
//! # Upload a file parameter
//! jk job build team/app --file bundle=./dist/app.tar.gz
//!
//! # Dump the XML configuration
//! jk job config team/app > app.xml
//! ```

use std::collections::BTreeMap;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::common::{InnerJob, JobBuild};
use crate::api::history::History;
use crate::api::{FileParameter, InvokeOptions, Outcome, Resource};
use crate::output::{format_ball, format_bool, format_millis, truncate, TableOutput};

use super::{find_job, parse_key_val, split_job_path, GlobalOptions};

#[derive(Args, Debug)]
pub struct JobCommand {
    #[command(subcommand)]
    pub command: JobSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum JobSubcommand {
    /// List jobs
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show a job
    Show(JobArgs),

    /// Trigger a build
    Build(BuildArgs),

    /// Enable a job
    Enable(JobArgs),

    /// Disable a job
    Disable(JobArgs),

    /// Delete a job
    Delete(DeleteArgs),

    /// Print the job's config.xml
    Config(JobArgs),

    /// Show recent builds from the history widget
    History(HistoryArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Folder to list, e.g. `team/backend`
    #[arg(long, short = 'f')]
    pub folder: Option<String>,
}

#[derive(Args, Debug)]
pub struct JobArgs {
    /// Full job name, e.g. `team/app`
    pub name: String,
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Full job name
    pub name: String,

    /// Build parameter, repeatable
    #[arg(long = "param", short = 'p', value_name = "KEY=VALUE", value_parser = parse_key_val)]
    pub params: Vec<(String, String)>,

    /// File parameter upload, repeatable
    #[arg(long = "file", value_name = "NAME=PATH", value_parser = parse_key_val)]
    pub files: Vec<(String, String)>,

    /// Cause recorded with the build
    #[arg(long)]
    pub cause: Option<String>,

    /// Remote trigger token
    #[arg(long = "trigger-token")]
    pub trigger_token: Option<String>,

    /// Do nothing if the last build is still running
    #[arg(long)]
    pub skip_if_running: bool,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Full job name
    pub name: String,

    /// Confirm the deletion
    #[arg(long, short = 'y')]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct HistoryArgs {
    /// Full job name
    pub name: String,

    /// Maximum number of builds to show
    #[arg(long, short = 'l', default_value = "20")]
    pub limit: usize,
}

#[derive(Debug, Serialize)]
pub(super) struct JobListItem {
    name: String,
    status: String,
    url: String,
}

impl From<&InnerJob> for JobListItem {
    fn from(job: &InnerJob) -> Self {
        Self {
            name: job.name.clone(),
            status: job.color.clone(),
            url: job.url.clone(),
        }
    }
}

impl TableOutput for JobListItem {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "STATUS", "URL"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            format_ball(&self.status, color),
            self.url.clone(),
        ]
    }
}

#[derive(Debug, Serialize)]
struct JobDetail {
    name: String,
    full_name: String,
    description: String,
    status: String,
    buildable: bool,
    in_queue: bool,
    health: Option<String>,
    last_build: Option<i64>,
    last_successful_build: Option<i64>,
    last_failed_build: Option<i64>,
    next_build_number: i64,
    parameters: Vec<String>,
    url: String,
}

fn build_number(build: &Option<JobBuild>) -> Option<i64> {
    build.as_ref().map(|b| b.number)
}

fn or_dash(number: Option<i64>) -> String {
    number.map(|n| format!("#{}", n)).unwrap_or_else(|| "-".to_string())
}

impl TableOutput for JobDetail {
    fn headers() -> Vec<&'static str> {
        vec![
            "NAME",
            "FULL NAME",
            "DESCRIPTION",
            "STATUS",
            "BUILDABLE",
            "IN QUEUE",
            "HEALTH",
            "LAST BUILD",
            "LAST SUCCESS",
            "LAST FAILURE",
            "NEXT BUILD",
            "PARAMETERS",
            "URL",
        ]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            self.full_name.clone(),
            truncate(&self.description, 60),
            format_ball(&self.status, color),
            format_bool(self.buildable, color),
            format_bool(self.in_queue, color),
            self.health.clone().unwrap_or_else(|| "-".to_string()),
            or_dash(self.last_build),
            or_dash(self.last_successful_build),
            or_dash(self.last_failed_build),
            format!("#{}", self.next_build_number),
            self.parameters.join(", "),
            self.url.clone(),
        ]
    }
}

#[derive(Debug, Serialize)]
struct HistoryItem {
    number: i64,
    status: String,
    started: i64,
}

impl From<&History> for HistoryItem {
    fn from(row: &History) -> Self {
        Self {
            number: row.number,
            status: row.status.clone(),
            started: row.timestamp,
        }
    }
}

impl TableOutput for HistoryItem {
    fn headers() -> Vec<&'static str> {
        vec!["BUILD", "STATUS", "STARTED"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            format!("#{}", self.number),
            self.status.clone(),
            format_millis(self.started),
        ]
    }
}

impl JobCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            JobSubcommand::List(args) => self.list(args, global).await,
            JobSubcommand::Show(args) => self.show(args, global).await,
            JobSubcommand::Build(args) => self.build(args, global).await,
            JobSubcommand::Enable(args) => self.set_enabled(args, true, global).await,
            JobSubcommand::Disable(args) => self.set_enabled(args, false, global).await,
            JobSubcommand::Delete(args) => self.delete(args, global).await,
            JobSubcommand::Config(args) => self.config(args, global).await,
            JobSubcommand::History(args) => self.history(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;

        let items: Vec<JobListItem> = match &args.folder {
            Some(folder) => {
                let (parents, name) = split_job_path(folder)?;
                let folder = jenkins.get_folder(name, &parents).await?;
                folder.jobs_metadata().iter().map(Into::into).collect()
            }
            None => jenkins
                .get_all_job_names()
                .await?
                .iter()
                .map(Into::into)
                .collect(),
        };

        global.writer().write_list(&items, "No jobs found.")
    }

    async fn show(&self, args: &JobArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let job = find_job(&jenkins, &args.name).await?;
        let raw = job.snapshot()?;

        let detail = JobDetail {
            name: raw.name.clone(),
            full_name: raw.full_name.clone(),
            description: raw.description.clone(),
            status: raw.color.clone(),
            buildable: raw.buildable,
            in_queue: raw.in_queue,
            health: raw
                .health_report
                .first()
                .map(|h| format!("{}% {}", h.score, h.description)),
            last_build: build_number(&raw.last_build),
            last_successful_build: build_number(&raw.last_successful_build),
            last_failed_build: build_number(&raw.last_failed_build),
            next_build_number: raw.next_build_number,
            parameters: raw
                .parameter_definitions()
                .into_iter()
                .map(|p| p.name)
                .collect(),
            url: raw.url.clone(),
        };

        global.writer().write(&detail)
    }

    async fn build(&self, args: &BuildArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let mut job = find_job(&jenkins, &args.name).await?;
        let writer = global.writer();

        let simple = args.files.is_empty()
            && args.cause.is_none()
            && args.trigger_token.is_none()
            && !args.skip_if_running;

        if simple {
            return match job.invoke_simple(&args.params).await? {
                Outcome::Done(queue_id) => writer.write_success(&format!(
                    "Queued build of {} (queue item {})",
                    args.name, queue_id
                )),
                Outcome::Refused(reason) => {
                    writer.write_skipped(&format!("Not triggering {}: {}", args.name, reason))
                }
            };
        }

        for (_, path) in &args.files {
            if !std::path::Path::new(path).is_file() {
                bail!("File not found: {}", path);
            }
        }

        let params: Option<BTreeMap<String, String>> = if args.params.is_empty() {
            None
        } else {
            Some(args.params.iter().cloned().collect())
        };
        let files = args
            .files
            .iter()
            .map(|(name, path)| FileParameter {
                name: name.clone(),
                path: PathBuf::from(path),
            })
            .collect();

        let options = InvokeOptions {
            files,
            skip_if_running: args.skip_if_running,
            params,
            cause: args.cause.clone(),
            security_token: args.trigger_token.clone(),
        };
        match job.invoke(options).await? {
            Outcome::Done(()) => writer.write_success(&format!("Triggered build of {}", args.name)),
            Outcome::Refused(reason) => {
                writer.write_skipped(&format!("Not triggering {}: {}", args.name, reason))
            }
        }
    }

    async fn set_enabled(&self, args: &JobArgs, enabled: bool, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let job = find_job(&jenkins, &args.name).await?;
        if enabled {
            job.enable().await?;
            global.writer().write_success(&format!("Enabled {}", args.name))
        } else {
            job.disable().await?;
            global.writer().write_success(&format!("Disabled {}", args.name))
        }
    }

    async fn delete(&self, args: &DeleteArgs, global: &GlobalOptions) -> Result<()> {
        if !args.yes {
            bail!("Refusing to delete {} without --yes", args.name);
        }
        let jenkins = global.connect().await?;
        let job = find_job(&jenkins, &args.name).await?;
        job.delete().await?;
        global.writer().write_success(&format!("Deleted {}", args.name))
    }

    async fn config(&self, args: &JobArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let job = find_job(&jenkins, &args.name).await?;
        let xml = job.config().await?;
        global.writer().write_text(&xml)
    }

    async fn history(&self, args: &HistoryArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let job = find_job(&jenkins, &args.name).await?;
        let items: Vec<HistoryItem> = job
            .history()
            .await?
            .iter()
            .take(args.limit)
            .map(Into::into)
            .collect();
        global.writer().write_list(&items, "No builds yet.")
    }
}
