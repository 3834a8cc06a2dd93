//
//  jenkins-cli
//  api/queue.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/17.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Build Queue
//!
//! The queue at `/queue` lists pending build requests. Items are plain
//! values, not handles: a single item is re-read through
//! [`Jenkins::get_queue_item`], which is also how a queue number returned
//! by [`Job::invoke_simple`](super::job::Job::invoke_simple) is resolved to
//! the build it eventually became.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::client::Jenkins;
use super::common::{null_default, InnerJob, JenkinsError, JobBuild, Result};
use super::resource::{queue_item_path, Resource, QUEUE_PATH};

/// A pending (or recently left) queue entry.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueItem {
    /// Java class (`BlockedItem`, `BuildableItem`, `WaitingItem`, `LeftItem`).
    #[serde(rename = "_class", default)]
    pub class: String,
    /// Queue item number.
    #[serde(default)]
    pub id: i64,
    /// Whether the item waits on another build or resource.
    #[serde(default)]
    pub blocked: bool,
    /// Whether the item only waits for a free executor.
    #[serde(default)]
    pub buildable: bool,
    /// Whether the item has waited unusually long.
    #[serde(default)]
    pub stuck: bool,
    /// Whether the item was cancelled (left items only).
    #[serde(default)]
    pub cancelled: Option<bool>,
    /// Enqueue time in milliseconds since the epoch.
    #[serde(default)]
    pub in_queue_since: i64,
    /// Parameters as a newline separated `KEY=value` list.
    #[serde(default, deserialize_with = "null_default")]
    pub params: String,
    /// The job the item builds.
    #[serde(default)]
    pub task: Option<InnerJob>,
    /// Server-relative URL, e.g. `queue/item/42/`.
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    /// Why the item is still waiting.
    #[serde(default)]
    pub why: Option<String>,
    /// The build started from this item, once it left the queue.
    #[serde(default)]
    pub executable: Option<JobBuild>,
}

impl QueueItem {
    /// Number of the build started from this item, if any.
    pub fn build_number(&self) -> Option<i64> {
        self.executable.as_ref().map(|b| b.number)
    }

    /// Name of the job the item builds.
    pub fn job_name(&self) -> Option<&str> {
        self.task.as_ref().map(|t| t.name.as_str())
    }
}

/// Snapshot of the queue document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QueueResponse {
    /// Pending items, oldest first.
    #[serde(default, deserialize_with = "null_default")]
    pub items: Vec<QueueItem>,
}

/// Handle on the build queue.
#[derive(Debug, Clone)]
pub struct Queue<'a> {
    client: &'a Jenkins,
    base: String,
    raw: Option<QueueResponse>,
}

#[async_trait]
impl<'a> Resource for Queue<'a> {
    type Raw = QueueResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&QueueResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: QueueResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> Queue<'a> {
    /// Creates an unpopulated queue handle.
    pub fn new(client: &'a Jenkins) -> Self {
        Self {
            client,
            base: QUEUE_PATH.to_string(),
            raw: None,
        }
    }

    /// Items from the snapshot.
    pub fn items(&self) -> &[QueueItem] {
        self.raw.as_ref().map(|r| r.items.as_slice()).unwrap_or_default()
    }

    /// The item with the given number, if it is in the snapshot.
    pub fn item(&self, id: i64) -> Option<&QueueItem> {
        self.items().iter().find(|item| item.id == id)
    }

    /// Items building the job `name`.
    pub fn items_for_job(&self, name: &str) -> Vec<&QueueItem> {
        self.items()
            .iter()
            .filter(|item| item.job_name() == Some(name))
            .collect()
    }

    /// Cancels a pending item.
    pub async fn cancel_item(&self, id: i64) -> Result<()> {
        let path = format!("{}/cancelItem", self.base);
        let id = id.to_string();
        let response = self.client.requester().post(&path, &[("id", id.as_str())]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        Ok(())
    }
}

impl Jenkins {
    /// Polls the build queue.
    pub async fn get_queue(&self) -> Result<Queue<'_>> {
        let mut queue = Queue::new(self);
        queue.refresh().await?;
        Ok(queue)
    }

    /// Reads a single queue item, including items that already left.
    pub async fn get_queue_item(&self, id: i64) -> Result<QueueItem> {
        let path = queue_item_path(id);
        let response = self.requester().get_json(&path, &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: path,
                status: response.status,
            });
        }
        response.json()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use mockito::Matcher;

    const QUEUE: &str = r#"{
        "_class": "hudson.model.Queue",
        "discoverableItems": [],
        "items": [
            {"_class": "hudson.model.Queue$BlockedItem", "id": 41, "blocked": true,
             "why": "Build #3 is already in progress",
             "task": {"name": "alpha", "url": "http://ci/job/alpha/", "color": "blue_anime"}},
            {"_class": "hudson.model.Queue$WaitingItem", "id": 42, "params": null,
             "task": {"name": "beta", "url": "http://ci/job/beta/"}}
        ]
    }"#;

    fn jenkins(server: &mockito::ServerGuard) -> Jenkins {
        Jenkins::new(ClientOptions::new(server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_queue_items() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/queue/api/json")
            .with_status(200)
            .with_body(QUEUE)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let queue = jenkins.get_queue().await.unwrap();
        assert_eq!(queue.items().len(), 2);
        assert!(queue.item(41).unwrap().blocked);
        assert!(queue.item(7).is_none());
        let beta = queue.items_for_job("beta");
        assert_eq!(beta.len(), 1);
        assert_eq!(beta[0].id, 42);
    }

    #[tokio::test]
    async fn test_cancel_item() {
        let mut server = mockito::Server::new_async().await;
        let cancel = server
            .mock("POST", "/queue/cancelItem")
            .match_query(Matcher::UrlEncoded("id".into(), "42".into()))
            .with_status(200)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        Queue::new(&jenkins).cancel_item(42).await.unwrap();
        cancel.assert_async().await;
    }

    #[tokio::test]
    async fn test_queue_item_resolves_to_build() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/queue/item/42/api/json")
            .with_status(200)
            .with_body(
                r#"{"_class": "hudson.model.Queue$LeftItem", "id": 42, "cancelled": false,
                    "executable": {"number": 7, "url": "http://ci/job/beta/7/"}}"#,
            )
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let item = jenkins.get_queue_item(42).await.unwrap();
        assert_eq!(item.build_number(), Some(7));
        assert_eq!(item.cancelled, Some(false));
    }
}
