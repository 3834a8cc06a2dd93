//
//  jenkins-cli
//  cli/build.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/14.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build commands
//!
//! The build number defaults to the job's last build.
//!
//! ## Examples
//!
//! ```bash
//! # Last build of a job
//! jk build show team/app
//!
//! # Console log of build 42
//! jk build log team/app 42
//!
//! # Abort a running build
//! jk build stop team/app 42
//!
//! # Download every artifact of the last build
//! jk build artifacts team/app --download ./out
//! ```

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::{Build, Jenkins};
use crate::output::{format_duration, format_millis, format_result, truncate, TableOutput};

use super::{find_job, GlobalOptions};

#[derive(Args, Debug)]
pub struct BuildCommand {
    #[command(subcommand)]
    pub command: BuildSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum BuildSubcommand {
    /// Show a build
    Show(BuildArgs),

    /// Print a build's console log
    Log(BuildArgs),

    /// Abort a running build
    Stop(BuildArgs),

    /// List or download a build's artifacts
    Artifacts(ArtifactArgs),
}

#[derive(Args, Debug)]
pub struct BuildArgs {
    /// Full job name, e.g. `team/app`
    pub job: String,

    /// Build number; defaults to the last build
    pub number: Option<i64>,
}

#[derive(Args, Debug)]
pub struct ArtifactArgs {
    #[command(flatten)]
    pub build: BuildArgs,

    /// Download into this directory
    #[arg(long, short = 'd', value_name = "DIR")]
    pub download: Option<PathBuf>,
}

#[derive(Debug, Serialize)]
struct BuildDetail {
    number: i64,
    result: Option<String>,
    building: bool,
    started: i64,
    duration_ms: i64,
    built_on: String,
    causes: Vec<String>,
    culprits: Vec<String>,
    artifacts: usize,
    description: String,
    url: String,
}

impl TableOutput for BuildDetail {
    fn headers() -> Vec<&'static str> {
        vec![
            "BUILD",
            "RESULT",
            "STARTED",
            "DURATION",
            "BUILT ON",
            "CAUSES",
            "CULPRITS",
            "ARTIFACTS",
            "DESCRIPTION",
            "URL",
        ]
    }

    fn row(&self, color: bool) -> Vec<String> {
        let duration = if self.building {
            "-".to_string()
        } else {
            format_duration(std::time::Duration::from_millis(self.duration_ms.max(0) as u64))
        };
        vec![
            format!("#{}", self.number),
            format_result(self.result.as_deref(), self.building, color),
            format_millis(self.started),
            duration,
            if self.built_on.is_empty() {
                "built-in".to_string()
            } else {
                self.built_on.clone()
            },
            self.causes.join("; "),
            self.culprits.join(", "),
            self.artifacts.to_string(),
            truncate(&self.description, 60),
            self.url.clone(),
        ]
    }
}

#[derive(Debug, Serialize)]
struct ArtifactItem {
    file_name: String,
    path: String,
}

impl TableOutput for ArtifactItem {
    fn headers() -> Vec<&'static str> {
        vec!["FILE", "PATH"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![self.file_name.clone(), self.path.clone()]
    }
}

impl BuildCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            BuildSubcommand::Show(args) => self.show(args, global).await,
            BuildSubcommand::Log(args) => self.log(args, global).await,
            BuildSubcommand::Stop(args) => self.stop(args, global).await,
            BuildSubcommand::Artifacts(args) => self.artifacts(args, global).await,
        }
    }

    async fn get_build<'a>(&self, jenkins: &'a Jenkins, args: &BuildArgs) -> Result<Build<'a>> {
        let job = find_job(jenkins, &args.job).await?;
        let build = match args.number {
            Some(number) => job.get_build(number).await?,
            None => job.last_build().await?,
        };
        Ok(build)
    }

    async fn show(&self, args: &BuildArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let build = self.get_build(&jenkins, args).await?;
        let Some(raw) = build.details() else {
            anyhow::bail!("Build {} of {} has no data", build.number(), args.job);
        };

        let detail = BuildDetail {
            number: raw.number,
            result: raw.result.clone(),
            building: raw.building,
            started: raw.timestamp,
            duration_ms: raw.duration,
            built_on: raw.built_on.clone(),
            causes: build
                .causes()
                .into_iter()
                .map(|c| c.short_description)
                .collect(),
            culprits: build.culprits().iter().map(|c| c.full_name.clone()).collect(),
            artifacts: raw.artifacts.len(),
            description: raw.description.clone(),
            url: raw.url.clone(),
        };

        global.writer().write(&detail)
    }

    async fn log(&self, args: &BuildArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let build = self.get_build(&jenkins, args).await?;
        let output = build.console_output().await?;
        global.writer().write_text(&output)
    }

    async fn stop(&self, args: &BuildArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let mut build = self.get_build(&jenkins, args).await?;
        let writer = global.writer();

        if !build.is_running().await? {
            return writer.write_skipped(&format!(
                "Build #{} of {} is not running",
                build.number(),
                args.job
            ));
        }
        build.stop().await?;
        writer.write_success(&format!("Stopped build #{} of {}", build.number(), args.job))
    }

    async fn artifacts(&self, args: &ArtifactArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let build = self.get_build(&jenkins, &args.build).await?;
        let artifacts = build.artifacts();
        let writer = global.writer();

        let Some(dir) = &args.download else {
            let items: Vec<ArtifactItem> = artifacts
                .iter()
                .map(|a| ArtifactItem {
                    file_name: a.file_name().to_string(),
                    path: a.path().to_string(),
                })
                .collect();
            return writer.write_list(&items, "No artifacts.");
        };

        tokio::fs::create_dir_all(dir).await?;
        for artifact in &artifacts {
            let target = artifact.save(dir).await?;
            tracing::debug!(path = %target.display(), "saved artifact");
        }
        writer.write_success(&format!(
            "Downloaded {} artifact(s) to {}",
            artifacts.len(),
            dir.display()
        ))
    }
}
