//
//  jenkins-cli
//  cli/node.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/15.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Node commands
//!
//! ## Examples
//!
//! ```bash
//! jk node list
//! jk node show agent-1
//!
//! # Drain an agent for maintenance, then bring it back
//! jk node offline agent-1 -m "disk replacement"
//! jk node online agent-1
//! ```

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::api::node::NodeResponse;
use crate::api::Outcome;
use crate::output::{format_bool, truncate, TableOutput};

use super::GlobalOptions;

#[derive(Args, Debug)]
pub struct NodeCommand {
    #[command(subcommand)]
    pub command: NodeSubcommand,
}

#[derive(Subcommand, Debug)]
pub enum NodeSubcommand {
    /// List nodes
    #[command(visible_alias = "ls")]
    List,

    /// Show a node
    Show(NodeArgs),

    /// Bring a temporarily offline node back online
    Online(NodeArgs),

    /// Take a node temporarily offline
    Offline(OfflineArgs),
}

#[derive(Args, Debug)]
pub struct NodeArgs {
    /// Node name as shown in the UI
    pub name: String,
}

#[derive(Args, Debug)]
pub struct OfflineArgs {
    /// Node name as shown in the UI
    pub name: String,

    /// Reason shown to other users
    #[arg(long, short = 'm')]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
struct NodeItem {
    name: String,
    state: &'static str,
    executors: i64,
    busy: usize,
    idle: bool,
    jnlp_agent: bool,
    offline_reason: String,
}

impl From<&NodeResponse> for NodeItem {
    fn from(raw: &NodeResponse) -> Self {
        let state = match (raw.offline, raw.temporarily_offline) {
            (false, _) => "online",
            (true, true) => "temporarily offline",
            (true, false) => "offline",
        };
        Self {
            name: raw.display_name.clone(),
            state,
            executors: raw.num_executors,
            busy: raw
                .executors
                .iter()
                .filter(|e| e.current_executable.is_some())
                .count(),
            idle: raw.idle,
            jnlp_agent: raw.jnlp_agent,
            offline_reason: raw.offline_cause_reason.clone(),
        }
    }
}

fn format_state(state: &str, color: bool) -> String {
    if !color {
        return state.to_string();
    }
    match state {
        "online" => console::style(state).green().to_string(),
        "temporarily offline" => console::style(state).yellow().to_string(),
        _ => console::style(state).red().to_string(),
    }
}

impl TableOutput for NodeItem {
    fn headers() -> Vec<&'static str> {
        vec!["NAME", "STATE", "EXECUTORS", "BUSY", "IDLE", "REASON"]
    }

    fn row(&self, color: bool) -> Vec<String> {
        vec![
            self.name.clone(),
            format_state(self.state, color),
            self.executors.to_string(),
            self.busy.to_string(),
            format_bool(self.idle, color),
            truncate(&self.offline_reason, 40),
        ]
    }

    fn fields(&self, color: bool) -> Vec<(String, String)> {
        let mut fields: Vec<(String, String)> = Self::headers()
            .into_iter()
            .map(str::to_string)
            .zip(self.row(color))
            .collect();
        fields.push(("JNLP AGENT".to_string(), format_bool(self.jnlp_agent, color)));
        fields
    }
}

impl NodeCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        match &self.command {
            NodeSubcommand::List => self.list(global).await,
            NodeSubcommand::Show(args) => self.show(args, global).await,
            NodeSubcommand::Online(args) => self.online(args, global).await,
            NodeSubcommand::Offline(args) => self.offline(args, global).await,
        }
    }

    async fn list(&self, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let items: Vec<NodeItem> = jenkins
            .get_all_nodes()
            .await?
            .iter()
            .filter_map(|node| node.details())
            .map(Into::into)
            .collect();
        global.writer().write_list(&items, "No nodes found.")
    }

    async fn show(&self, args: &NodeArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let mut node = jenkins.get_node(&args.name).await?;
        let item = NodeItem::from(node.info().await?);
        global.writer().write(&item)
    }

    async fn online(&self, args: &NodeArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let mut node = jenkins.get_node(&args.name).await?;
        let writer = global.writer();
        match node.set_online().await? {
            Outcome::Done(()) => writer.write_success(&format!("{} is online", args.name)),
            Outcome::Refused(reason) => {
                writer.write_skipped(&format!("{} stays offline: {}", args.name, reason))
            }
        }
    }

    async fn offline(&self, args: &OfflineArgs, global: &GlobalOptions) -> Result<()> {
        let jenkins = global.connect().await?;
        let mut node = jenkins.get_node(&args.name).await?;
        let writer = global.writer();
        match node.set_offline(args.message.as_deref()).await? {
            Outcome::Done(()) => writer.write_success(&format!("{} is now offline", args.name)),
            Outcome::Refused(reason) => {
                writer.write_skipped(&format!("{} is {}", args.name, reason))
            }
        }
    }
}
