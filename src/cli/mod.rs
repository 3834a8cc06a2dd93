//
//  jenkins-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod build;
mod info;
mod job;
mod node;
mod queue;
mod view;

pub use build::BuildCommand;
pub use info::InfoCommand;
pub use job::JobCommand;
pub use node::NodeCommand;
pub use queue::QueueCommand;
pub use view::ViewCommand;

use anyhow::{bail, Result};
use clap::{Parser, Subcommand};

use crate::api::{Jenkins, Job};
use crate::config::Config;
use crate::context::ContextResolver;
use crate::output::{OutputFormat, OutputWriter};

#[derive(Parser, Debug)]
#[command(
    name = "jk",
    version,
    about = "Work with Jenkins from the command line",
    long_about = "jk talks to a Jenkins controller through its remote access API.\n\n\
                  It lists and triggers jobs, follows builds, and manages nodes, views, and the queue.",
    propagate_version = true,
    after_help = "Use 'jk <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Configured server to use
    #[arg(long, short = 's', global = true, env = "JK_SERVER")]
    pub server: Option<String>,

    /// Controller URL, bypassing the configuration file
    #[arg(long, global = true, env = "JENKINS_URL")]
    pub url: Option<String>,

    /// User name for API token authentication
    #[arg(long, short = 'u', global = true, env = "JENKINS_USER")]
    pub user: Option<String>,

    /// API token (or password)
    #[arg(long, global = true, env = "JENKINS_API_TOKEN", hide_env_values = true)]
    pub token: Option<String>,

    /// Print JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Skip TLS certificate verification
    #[arg(long, short = 'k', global = true)]
    pub insecure: bool,
}

impl GlobalOptions {
    /// Resolves the target server and connects to it.
    pub async fn connect(&self) -> Result<Jenkins> {
        let config = Config::load()?;
        ContextResolver::new(config).resolve(self)?.connect().await
    }

    pub fn writer(&self) -> OutputWriter {
        OutputWriter::new(OutputFormat::from_flag(self.json))
    }
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show controller information
    Info(InfoCommand),

    /// Work with jobs
    #[command(visible_alias = "j")]
    Job(JobCommand),

    /// Work with builds
    #[command(visible_alias = "b")]
    Build(BuildCommand),

    /// Work with build agents
    Node(NodeCommand),

    /// Work with views
    View(ViewCommand),

    /// Work with the build queue
    #[command(visible_alias = "q")]
    Queue(QueueCommand),
}

/// Splits `team/app` into its folders and the job name.
pub(crate) fn split_job_path(path: &str) -> Result<(Vec<&str>, &str)> {
    let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let Some(name) = segments.pop() else {
        bail!("Invalid job name '{}'", path);
    };
    Ok((segments, name))
}

/// Looks up a job by its slash separated full name.
pub(crate) async fn find_job<'a>(jenkins: &'a Jenkins, path: &str) -> Result<Job<'a>> {
    let (parents, name) = split_job_path(path)?;
    Ok(jenkins.get_job(name, &parents).await?)
}

/// Parses `KEY=VALUE`.
pub(crate) fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{}'", s))?;
    if key.is_empty() {
        return Err(format!("empty key in '{}'", s));
    }
    Ok((key.to_string(), value.to_string()))
}
