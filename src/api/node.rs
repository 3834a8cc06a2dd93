//
//  jenkins-cli
//  api/node.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Nodes
//!
//! Build agents live under `/computer/<displayName>`. The computer set at
//! `/computer` lists every node in one document, so
//! [`Jenkins::get_all_nodes`] hands back handles that are already
//! populated.
//!
//! ## Offline state
//!
//! ```text
//! online ──toggleOffline──> temporarily offline ──toggleOffline──> online
//! offline (not temporary) : cannot be brought up from here
//! ```
//!
//! `set_online` and `set_offline` never toggle blindly: a node that is
//! already in the requested state, or permanently offline, comes back as an
//! [`Outcome::Refused`].

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::warn;

use super::client::{make_json, Jenkins};
use super::common::{null_default, JenkinsError, Outcome, Refusal, Result};
use super::resource::{node_path, Resource, COMPUTER_PATH};

/// Message recorded when a node is taken offline without one.
pub const DEFAULT_OFFLINE_MESSAGE: &str = "requested from jk";

const NODE_TYPE: &str = "hudson.slaves.DumbSlave$DescriptorImpl";

/// What an executor is currently running.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CurrentExecutable {
    /// Build number.
    #[serde(default)]
    pub number: i64,
    /// Absolute build URL.
    #[serde(default)]
    pub url: String,
}

/// One executor slot of a node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Executor {
    /// The running build, `None` when the slot is free.
    #[serde(default)]
    pub current_executable: Option<CurrentExecutable>,
    /// Whether the slot is free.
    #[serde(default)]
    pub idle: bool,
    /// Progress percentage of the running build, `-1` if unknown.
    #[serde(default)]
    pub progress: i64,
}

/// Snapshot of a node's JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResponse {
    /// Java class of the computer.
    #[serde(rename = "_class", default)]
    pub class: String,
    /// Display name; also the last segment of the node's path.
    #[serde(default)]
    pub display_name: String,
    /// Executor slots (populated with `depth=1`).
    #[serde(default, deserialize_with = "null_default")]
    pub executors: Vec<Executor>,
    /// Icon file name.
    #[serde(default, deserialize_with = "null_default")]
    pub icon: String,
    /// Whether every executor is idle.
    #[serde(default)]
    pub idle: bool,
    /// Whether the agent connects over JNLP.
    #[serde(default)]
    pub jnlp_agent: bool,
    /// Whether the controller can launch the agent itself.
    #[serde(default)]
    pub launch_supported: bool,
    /// Whether manual launching is allowed.
    #[serde(default)]
    pub manual_launch_allowed: bool,
    /// Node monitor readings, keyed by monitor class.
    #[serde(default)]
    pub monitor_data: BTreeMap<String, Value>,
    /// Number of executors.
    #[serde(default)]
    pub num_executors: i64,
    /// Whether the node is offline for any reason.
    #[serde(default)]
    pub offline: bool,
    /// Reason given when the node was taken offline.
    #[serde(default, deserialize_with = "null_default")]
    pub offline_cause_reason: String,
    /// Whether the node was taken offline on purpose.
    #[serde(default)]
    pub temporarily_offline: bool,
}

/// The computer set document at `/computer`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Computers {
    /// Executors currently running builds.
    #[serde(default)]
    pub busy_executors: i64,
    /// Every node, in display order.
    #[serde(rename = "computer", default)]
    pub computers: Vec<NodeResponse>,
    /// Display name of the set.
    #[serde(default)]
    pub display_name: String,
    /// Executors across all nodes.
    #[serde(default)]
    pub total_executors: i64,
}

/// SSH launcher settings (`ssh-slaves` plugin).
///
/// Unset fields are sent empty and fall back to the plugin's defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SshLauncher {
    /// Agent host name or address.
    pub host: String,
    /// SSH port, 22 when unset.
    pub port: Option<u16>,
    /// Id of the stored SSH credentials.
    pub credentials_id: Option<String>,
    /// Extra options for the agent JVM.
    pub jvm_options: Option<String>,
    /// Path of `java` on the agent.
    pub java_path: Option<String>,
    /// Command prepended to the agent start command.
    pub prefix_start_slave_cmd: Option<String>,
    /// Command appended to the agent start command.
    pub suffix_start_slave_cmd: Option<String>,
    /// Connection attempts before giving up.
    pub max_num_retries: Option<u32>,
    /// Seconds between connection attempts.
    pub retry_wait_time: Option<u32>,
    /// Seconds to wait for the agent to come up.
    pub launch_timeout_seconds: Option<u32>,
}

/// How the controller starts a new agent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Launcher {
    /// The agent connects inbound over JNLP.
    #[default]
    Jnlp,
    /// The controller connects to the agent over SSH.
    Ssh(SshLauncher),
}

impl Launcher {
    /// Builds a launcher from a method name and loose settings.
    ///
    /// `""` and `JNLPLauncher` select [`Launcher::Jnlp`]; `SSHLauncher`
    /// reads `host`, `port`, `credentialsId`, and friends from `params`.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Programming`] for any other method.
    pub fn from_method(method: &str, params: &BTreeMap<String, String>) -> Result<Self> {
        let text = |key: &str| params.get(key).cloned();
        let number = |key: &str| params.get(key).and_then(|v| v.parse().ok());
        match method {
            "" | "JNLPLauncher" => Ok(Self::Jnlp),
            "SSHLauncher" => Ok(Self::Ssh(SshLauncher {
                host: text("host").unwrap_or_default(),
                port: params.get("port").and_then(|v| v.parse().ok()),
                credentials_id: text("credentialsId"),
                jvm_options: text("jvmOptions"),
                java_path: text("javaPath"),
                prefix_start_slave_cmd: text("prefixStartSlaveCmd"),
                suffix_start_slave_cmd: text("suffixStartSlaveCmd"),
                max_num_retries: number("maxNumRetries"),
                retry_wait_time: number("retryWaitTime"),
                launch_timeout_seconds: number("launchTimeoutSeconds"),
            })),
            other => Err(JenkinsError::Programming(format!(
                "launcher method not supported: {}",
                other
            ))),
        }
    }

    fn to_json(&self) -> Value {
        match self {
            Self::Jnlp => json!({ "stapler-class": "hudson.slaves.JNLPLauncher" }),
            Self::Ssh(ssh) => {
                let opt = |v: &Option<String>| v.clone().unwrap_or_default();
                let num = |v: Option<u32>| v.map(|n| n.to_string()).unwrap_or_default();
                json!({
                    "stapler-class": "hudson.plugins.sshslaves.SSHLauncher",
                    "$class": "hudson.plugins.sshslaves.SSHLauncher",
                    "host": ssh.host,
                    "port": ssh.port.map(|p| p.to_string()).unwrap_or_default(),
                    "credentialsId": opt(&ssh.credentials_id),
                    "jvmOptions": opt(&ssh.jvm_options),
                    "javaPath": opt(&ssh.java_path),
                    "prefixStartSlaveCmd": opt(&ssh.prefix_start_slave_cmd),
                    "suffixStartSlaveCmd": opt(&ssh.suffix_start_slave_cmd),
                    "maxNumRetries": num(ssh.max_num_retries),
                    "retryWaitTime": num(ssh.retry_wait_time),
                    "launchTimeoutSeconds": num(ssh.launch_timeout_seconds),
                    "type": "hudson.slaves.DumbSlave",
                    "stapler-class-bag": "true",
                })
            }
        }
    }
}

/// Settings of a new permanent agent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeConfig {
    /// Node name.
    pub name: String,
    /// Number of executors.
    pub num_executors: u32,
    /// Node description.
    pub description: String,
    /// Remote root directory on the agent.
    pub remote_fs: String,
    /// Space separated labels.
    pub labels: String,
    /// Launch method.
    pub launcher: Launcher,
}

impl NodeConfig {
    /// A single-executor JNLP agent rooted at `remote_fs`.
    pub fn new(name: impl Into<String>, remote_fs: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_executors: 1,
            description: String::new(),
            remote_fs: remote_fs.into(),
            labels: String::new(),
            launcher: Launcher::Jnlp,
        }
    }

    fn form(&self) -> Vec<(&'static str, String)> {
        let payload = json!({
            "name": self.name,
            "nodeDescription": self.description,
            "remoteFS": self.remote_fs,
            "numExecutors": self.num_executors,
            "mode": "NORMAL",
            "type": NODE_TYPE,
            "labelString": self.labels,
            "retentionsStrategy": { "stapler-class": "hudson.slaves.RetentionStrategy$Always" },
            "nodeProperties": { "stapler-class-bag": "true" },
            "launcher": self.launcher.to_json(),
        });
        vec![
            ("name", self.name.clone()),
            ("type", NODE_TYPE.to_string()),
            ("json", make_json(&payload)),
        ]
    }
}

/// Handle on a build agent.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    client: &'a Jenkins,
    base: String,
    raw: Option<NodeResponse>,
}

#[async_trait]
impl<'a> Resource for Node<'a> {
    type Raw = NodeResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&NodeResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: NodeResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> Node<'a> {
    /// Creates an unpopulated handle for the node `name`.
    pub fn new(client: &'a Jenkins, name: &str) -> Self {
        Self {
            client,
            base: node_path(name),
            raw: None,
        }
    }

    fn from_snapshot(client: &'a Jenkins, raw: NodeResponse) -> Self {
        Self {
            client,
            base: node_path(&raw.display_name),
            raw: Some(raw),
        }
    }

    /// Display name from the snapshot.
    pub fn name(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.display_name.as_str())
    }

    /// The full snapshot.
    pub fn details(&self) -> Option<&NodeResponse> {
        self.raw.as_ref()
    }

    /// Polls and returns the fresh snapshot.
    pub async fn info(&mut self) -> Result<&NodeResponse> {
        self.refresh().await?;
        self.snapshot()
    }

    /// Polls and reports whether the node is online.
    pub async fn is_online(&mut self) -> Result<bool> {
        Ok(!self.info().await?.offline)
    }

    /// Polls and reports whether the node was taken offline on purpose.
    pub async fn is_temporarily_offline(&mut self) -> Result<bool> {
        Ok(self.info().await?.temporarily_offline)
    }

    /// Polls and reports whether every executor is idle.
    pub async fn is_idle(&mut self) -> Result<bool> {
        Ok(self.info().await?.idle)
    }

    /// Polls and reports whether the agent connects over JNLP.
    pub async fn is_jnlp_agent(&mut self) -> Result<bool> {
        Ok(self.info().await?.jnlp_agent)
    }

    /// Brings a temporarily offline node back online.
    ///
    /// Polls first. An online node is left alone (`Done`); a node that is
    /// offline but not temporarily is refused with
    /// [`Refusal::PermanentlyOffline`].
    pub async fn set_online(&mut self) -> Result<Outcome<()>> {
        let raw = self.info().await?;
        match (raw.offline, raw.temporarily_offline) {
            (false, _) => Ok(Outcome::Done(())),
            (true, false) => {
                warn!(node = %self.base, "node is permanently offline");
                Ok(Outcome::Refused(Refusal::PermanentlyOffline))
            }
            (true, true) => {
                self.toggle_temporarily_offline(None).await?;
                Ok(Outcome::Done(()))
            }
        }
    }

    /// Takes the node temporarily offline.
    ///
    /// Decided on the snapshot (polled only if the handle is unpopulated);
    /// a node already offline is refused with [`Refusal::AlreadyOffline`].
    pub async fn set_offline(&mut self, message: Option<&str>) -> Result<Outcome<()>> {
        if !self.is_polled() {
            self.refresh().await?;
        }
        if self.snapshot()?.offline {
            warn!(node = %self.base, "node is already offline");
            return Ok(Outcome::Refused(Refusal::AlreadyOffline));
        }
        self.toggle_temporarily_offline(message).await?;
        Ok(Outcome::Done(()))
    }

    /// Flips the temporarily-offline flag and checks that it moved.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::StateUnchanged`] if the node reports the
    /// same state after the toggle.
    pub async fn toggle_temporarily_offline(&mut self, message: Option<&str>) -> Result<()> {
        let before = self.is_temporarily_offline().await?;
        let path = format!("{}/toggleOffline", self.base);
        let message = message.unwrap_or(DEFAULT_OFFLINE_MESSAGE);
        let response = self
            .client
            .requester()
            .post(&path, &[("offlineMessage", message)])
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        if self.is_temporarily_offline().await? == before {
            return Err(JenkinsError::StateUnchanged {
                base: self.base.clone(),
            });
        }
        Ok(())
    }

    /// Removes the node.
    pub async fn delete(&self) -> Result<()> {
        self.post_form_expecting_ok("doDelete", &[]).await
    }

    /// Asks the controller to (re)launch the agent.
    pub async fn launch_agent(&self) -> Result<()> {
        self.post_form_expecting_ok(
            "launchSlaveAgent",
            &[("json", String::new()), ("Submit", "Launch slave agent".to_string())],
        )
        .await
    }

    /// Disconnects the agent.
    pub async fn disconnect(&self) -> Result<()> {
        self.post_form_expecting_ok(
            "doDisconnect",
            &[
                ("offlineMessage", String::new()),
                ("json", make_json(&json!({ "offlineMessage": "" }))),
                ("Submit", "Yes".to_string()),
            ],
        )
        .await
    }

    /// The agent's connection log.
    pub async fn log_text(&self) -> Result<String> {
        let path = format!("{}/logText/progressiveHtml", self.base);
        let response = self.client.requester().get(&path, &[("start", "0")]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: path,
                status: response.status,
            });
        }
        Ok(response.text())
    }

    async fn post_form_expecting_ok(&self, action: &str, fields: &[(&str, String)]) -> Result<()> {
        let path = format!("{}/{}", self.base, action);
        let response = self.client.requester().post_form(&path, &[], fields).await?;
        if response.is_ok() {
            Ok(())
        } else {
            Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            })
        }
    }
}

impl Jenkins {
    /// Polls the node `name`.
    pub async fn get_node(&self, name: &str) -> Result<Node<'_>> {
        let mut node = Node::new(self, name);
        node.refresh().await?;
        Ok(node)
    }

    /// Fetches the computer set document.
    pub async fn get_computers(&self) -> Result<Computers> {
        let response = self
            .requester()
            .get_json(COMPUTER_PATH, &[("depth", "1")])
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: COMPUTER_PATH.to_string(),
                status: response.status,
            });
        }
        response.json()
    }

    /// Every node, in listing order, populated from a single request.
    pub async fn get_all_nodes(&self) -> Result<Vec<Node<'_>>> {
        let computers = self.get_computers().await?;
        Ok(computers
            .computers
            .into_iter()
            .map(|raw| Node::from_snapshot(self, raw))
            .collect())
    }

    /// Creates a permanent agent and polls it.
    pub async fn create_node(&self, config: &NodeConfig) -> Result<Node<'_>> {
        let path = format!("{}/doCreateItem", COMPUTER_PATH);
        let response = self.requester().post_form(&path, &[], &config.form()).await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        self.get_node(&config.name).await
    }

    /// Removes the node `name`.
    pub async fn delete_node(&self, name: &str) -> Result<()> {
        Node::new(self, name).delete().await
    }
}
