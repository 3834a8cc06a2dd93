//
//  jenkins-cli
//  cli/queue.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/15.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Build queue commands
//!
//! ```bash
//! jk queue list
//! jk queue list --job app
//!
//! # Which build did queue item 42 turn into?
//! jk queue show 42
//!
//! jk queue cancel 42
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::QueueItem;
use crate::output::{format_millis, truncate, TableOutput};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct QueueCommand {
    #[command(subcommand)]
    pub command: QueueSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum QueueSubcommand {
    /// List pending items
    #[command(visible_alias = "ls")]
    List(ListArgs),

    /// Show one item, including items that already started
    Show(ItemArgs),

    /// Cancel a pending item
    Cancel(ItemArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Only items of this job
    #[arg(long, short = 'j')]
    pub job: Option<String>,
}

#[derive(Args, Debug)]
pub struct ItemArgs {
    /// Queue item number
    pub id: i64,
}

#[derive(Debug, Serialize)]
struct QueueListItem {
    id: i64,
    job: String,
    state: &'static str,
    since: i64,
    why: String,
    build: Option<i64>,
}

impl From<&QueueItem> for QueueListItem {
    fn from(item: &QueueItem) -> Self {
        let state = if item.cancelled == Some(true) {
            "cancelled"
        } else if item.executable.is_some() {
            "started"
        } else if item.stuck {
            "stuck"
        } else if item.blocked {
            "blocked"
        } else if item.buildable {
            "buildable"
        } else {
            "waiting"
        };
        Self {
            id: item.id,
            job: item.job_name().unwrap_or_default().to_string(),
            state,
            since: item.in_queue_since,
            why: item.why.clone().unwrap_or_default(),
            build: item.build_number(),
        }
    }
}

impl TableOutput for QueueListItem {
    fn headers() -> Vec<&'static str> {
        vec!["ID", "JOB", "STATE", "SINCE", "WHY", "BUILD"]
    }

    fn row(&self, _color: bool) -> Vec<String> {
        vec![
            self.id.to_string(),
            self.job.clone(),
            self.state.to_string(),
            format_millis(self.since),
            truncate(&self.why, 50),
            self.build
                .map(|n| format!("#{}", n))
                .unwrap_or_else(|| "-".to_string()),
        ]
    }
}

impl QueueCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            QueueSubcommand::List(args) => self.list(args, global).await,
            QueueSubcommand::Show(args) => self.show(args, global).await,
            QueueSubcommand::Cancel(args) => self.cancel(args, global).await,
        }
    }

    async fn list(&self, args: &ListArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let queue = jenkins.get_queue().await?;
        let items: Vec<QueueListItem> = match &args.job {
            Some(job) => queue.items_for_job(job).into_iter().map(Into::into).collect(),
            None => queue.items().iter().map(Into::into).collect(),
        };
        global.writer().write_list(&items, "The queue is empty.")
    }

    async fn show(&self, args: &ItemArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let item = jenkins.get_queue_item(args.id).await?;
        global.writer().write(&QueueListItem::from(&item))
    }

    async fn cancel(&self, args: &ItemArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let queue = jenkins.get_queue().await?;
        if queue.item(args.id).is_none() {
            return global
                .writer()
                .write_skipped(&format!("Queue item {} is not pending", args.id));
        }
        queue.cancel_item(args.id).await?;
        global
            .writer()
            .write_success(&format!("Cancelled queue item {}", args.id))
    }
}
