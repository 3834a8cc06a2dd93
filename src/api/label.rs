//
//  jenkins-cli
//  api/label.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/17.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Labels (`/label/<name>`) and the nodes carrying them.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::Jenkins;
use super::common::{null_default, Result};
use super::node::Node;
use super::resource::{label_path, Resource};

/// A node reference inside a label document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelNode {
    /// Node name; empty for the built-in node.
    #[serde(default, deserialize_with = "null_default")]
    pub node_name: String,
    /// Node description.
    #[serde(default, deserialize_with = "null_default")]
    pub node_description: String,
    /// Executors on the node.
    #[serde(default)]
    pub num_executors: i64,
    /// `NORMAL` or `EXCLUSIVE`.
    #[serde(default, deserialize_with = "null_default")]
    pub mode: String,
}

/// Snapshot of a label's JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LabelResponse {
    /// Label name.
    #[serde(default)]
    pub name: String,
    /// Label description.
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Nodes carrying the label.
    #[serde(default, deserialize_with = "null_default")]
    pub nodes: Vec<LabelNode>,
    /// Whether every node with the label is offline.
    #[serde(default)]
    pub offline: bool,
    /// Idle executors across those nodes.
    #[serde(default)]
    pub idle_executors: i64,
    /// Busy executors across those nodes.
    #[serde(default)]
    pub busy_executors: i64,
    /// All executors across those nodes.
    #[serde(default)]
    pub total_executors: i64,
}

/// Handle on a label.
#[derive(Debug, Clone)]
pub struct Label<'a> {
    client: &'a Jenkins,
    base: String,
    raw: Option<LabelResponse>,
}

#[async_trait]
impl<'a> Resource for Label<'a> {
    type Raw = LabelResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&LabelResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: LabelResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> Label<'a> {
    /// Creates an unpopulated handle for the label `name`.
    pub fn new(client: &'a Jenkins, name: &str) -> Self {
        Self {
            client,
            base: label_path(name),
            raw: None,
        }
    }

    /// Label name from the snapshot.
    pub fn name(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.name.as_str())
    }

    /// Node references from the snapshot.
    pub fn nodes_metadata(&self) -> &[LabelNode] {
        self.raw.as_ref().map(|r| r.nodes.as_slice()).unwrap_or_default()
    }

    /// Polls every named node carrying the label, in order.
    ///
    /// The built-in node has no name in label documents and is skipped.
    pub async fn nodes(&self) -> Result<Vec<Node<'a>>> {
        let mut nodes = Vec::new();
        for meta in self.nodes_metadata().iter().filter(|n| !n.node_name.is_empty()) {
            nodes.push(self.client.get_node(&meta.node_name).await?);
        }
        Ok(nodes)
    }
}

impl Jenkins {
    /// Polls the label `name`.
    pub async fn get_label(&self, name: &str) -> Result<Label<'_>> {
        let mut label = Label::new(self, name);
        label.refresh().await?;
        Ok(label)
    }
}
