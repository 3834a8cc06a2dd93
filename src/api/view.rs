//
//  jenkins-cli
//  api/view.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Views
//!
//! Views group jobs under `/view/<name>`. A view's snapshot holds an
//! ordered list of job references; [`View::jobs`] polls each of them.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{make_json, Jenkins};
use super::common::{null_default, InnerJob, JenkinsError, Result};
use super::job::Job;
use super::resource::{view_path, Resource};

/// The view classes Jenkins can create through `createView`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ViewType {
    /// Plain list of jobs.
    List,
    /// Container of other views (`nested-view` plugin).
    Nested,
    /// Jobs the current user can see.
    My,
    /// Dashboard portlets (`dashboard-view` plugin).
    Dashboard,
    /// Upstream/downstream pipeline (`build-pipeline` plugin).
    Pipeline,
}

impl ViewType {
    /// Java class submitted as the view `mode`.
    pub fn class(&self) -> &'static str {
        match self {
            Self::List => "hudson.model.ListView",
            Self::Nested => "hudson.plugins.nested_view.NestedView",
            Self::My => "hudson.model.MyView",
            Self::Dashboard => "hudson.plugins.view.dashboard.Dashboard",
            Self::Pipeline => "au.com.centrumsystems.hudson.plugin.buildpipeline.BuildPipelineView",
        }
    }
}

impl fmt::Display for ViewType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.class())
    }
}

/// Snapshot of a view's JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ViewResponse {
    /// Java class of the view.
    #[serde(rename = "_class", default)]
    pub class: String,
    /// View description.
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Jobs in the view, in display order.
    #[serde(default, deserialize_with = "null_default")]
    pub jobs: Vec<InnerJob>,
    /// View name.
    #[serde(default)]
    pub name: String,
    /// View properties, kept as raw JSON.
    #[serde(default, deserialize_with = "null_default")]
    pub property: Vec<serde_json::Value>,
    /// Absolute URL.
    #[serde(default)]
    pub url: String,
}

/// Handle on a view.
#[derive(Debug, Clone)]
pub struct View<'a> {
    client: &'a Jenkins,
    base: String,
    raw: Option<ViewResponse>,
}

#[async_trait]
impl<'a> Resource for View<'a> {
    type Raw = ViewResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&ViewResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: ViewResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> View<'a> {
    /// Creates an unpopulated handle for the view `name`.
    pub fn new(client: &'a Jenkins, name: &str) -> Self {
        Self {
            client,
            base: view_path(name),
            raw: None,
        }
    }

    /// View name from the snapshot.
    pub fn name(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.name.as_str())
    }

    /// View description from the snapshot.
    pub fn description(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.description.as_str())
    }

    /// View URL from the snapshot.
    pub fn url(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.url.as_str())
    }

    /// Job references from the snapshot.
    pub fn jobs_metadata(&self) -> &[InnerJob] {
        self.raw.as_ref().map(|r| r.jobs.as_slice()).unwrap_or_default()
    }

    /// Polls every job of the view, in order. The first failure aborts.
    pub async fn jobs(&self) -> Result<Vec<Job<'a>>> {
        self.client.get_jobs_by_reference(self.jobs_metadata()).await
    }

    /// Adds the top-level job `name` to the view.
    pub async fn add_job(&self, name: &str) -> Result<()> {
        self.post_job("addJobToView", name).await
    }

    /// Removes the job `name` from the view.
    pub async fn remove_job(&self, name: &str) -> Result<()> {
        self.post_job("removeJobFromView", name).await
    }

    async fn post_job(&self, action: &str, name: &str) -> Result<()> {
        let path = format!("{}/{}", self.base, action);
        let response = self.client.requester().post(&path, &[("name", name)]).await?;
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
    /// Polls the view `name`.
    pub async fn get_view(&self, name: &str) -> Result<View<'_>> {
        let mut view = View::new(self, name);
        view.refresh().await?;
        Ok(view)
    }

    /// Polls every view listed on the root document, in order.
    ///
    /// The root document is fetched fresh; the first view that fails to
    /// poll aborts the batch.
    pub async fn get_all_views(&self) -> Result<Vec<View<'_>>> {
        let info = self.info().await?;
        let mut views = Vec::with_capacity(info.views.len());
        for data in &info.views {
            views.push(self.get_view(&data.name).await?);
        }
        Ok(views)
    }

    /// Creates a view of the given type and polls it.
    pub async fn create_view(&self, name: &str, view_type: ViewType) -> Result<View<'_>> {
        let path = "/createView";
        let fields = [
            ("name", name.to_string()),
            ("mode", view_type.class().to_string()),
            ("Submit", "OK".to_string()),
            (
                "json",
                make_json(&json!({ "name": name, "mode": view_type.class() })),
            ),
        ];
        let response = self.requester().post_form(path, &[], &fields).await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        self.get_view(name).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use mockito::Matcher;

    fn jenkins(server: &mockito::ServerGuard) -> Jenkins {
        Jenkins::new(ClientOptions::new(server.url())).unwrap()
    }

    const VIEW: &str = r#"{
        "_class": "hudson.model.ListView",
        "name": "nightly",
        "description": null,
        "jobs": [
            {"name": "alpha", "url": "http://ci/job/alpha/", "color": "blue"},
            {"name": "beta", "url": "http://ci/job/beta/", "color": "red"}
        ]
    }"#;

    #[tokio::test]
    async fn test_get_view_and_jobs() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/view/nightly/api/json")
            .with_status(200)
            .with_body(VIEW)
            .create_async()
            .await;
        server
            .mock("GET", "/job/alpha/api/json")
            .with_status(200)
            .with_body(r#"{"name": "alpha"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/job/beta/api/json")
            .with_status(200)
            .with_body(r#"{"name": "beta"}"#)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let view = jenkins.get_view("nightly").await.unwrap();
        assert_eq!(view.description(), Some(""));
        assert_eq!(view.jobs_metadata().len(), 2);
        let jobs = view.jobs().await.unwrap();
        assert_eq!(jobs[0].name(), Some("alpha"));
        assert_eq!(jobs[1].name(), Some("beta"));
    }

    #[tokio::test]
    async fn test_add_and_remove_job() {
        let mut server = mockito::Server::new_async().await;
        let add = server
            .mock("POST", "/view/nightly/addJobToView")
            .match_query(Matcher::UrlEncoded("name".into(), "alpha".into()))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("POST", "/view/nightly/removeJobFromView")
            .with_status(404)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let view = View::new(&jenkins, "nightly");
        view.add_job("alpha").await.unwrap();
        add.assert_async().await;
        let err = view.remove_job("alpha").await.unwrap_err();
        assert_eq!(err.status(), Some(404));
    }

    #[tokio::test]
    async fn test_create_view() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/createView")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "nightly".into()),
                Matcher::UrlEncoded("mode".into(), "hudson.model.ListView".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/view/nightly/api/json")
            .with_status(200)
            .with_body(VIEW)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let view = jenkins.create_view("nightly", ViewType::List).await.unwrap();
        assert_eq!(view.name(), Some("nightly"));
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_get_all_views_aborts_on_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/api/json")
            .with_status(200)
            .with_body(
                r#"{"views": [
                    {"name": "all", "url": "http://ci/"},
                    {"name": "broken", "url": "http://ci/view/broken/"}
                ]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/view/all/api/json")
            .with_status(200)
            .with_body(r#"{"name": "all"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/view/broken/api/json")
            .with_status(500)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let err = jenkins.get_all_views().await.unwrap_err();
        assert!(matches!(err, JenkinsError::NotFound { status: 500, .. }));
    }
}
