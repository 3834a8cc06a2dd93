//
//  jenkins-cli
//  api/folder.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/16.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Folders
//!
//! Folders (`cloudbees-folder` plugin) share the job URL scheme: a folder
//! nested in `a/b` lives at `/job/a/job/b/job/<name>`, and items are created
//! through the owning container's `createItem` endpoint.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::json;

use super::client::{make_json, Jenkins};
use super::common::{null_default, InnerJob, JenkinsError, Result, ViewData};
use super::job::Job;
use super::resource::{child_job_path, job_path, parent_base, Resource};

/// Item mode Jenkins uses for folders.
pub const FOLDER_MODE: &str = "com.cloudbees.hudson.plugins.folder.Folder";

/// Snapshot of a folder's JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FolderResponse {
    /// Java class of the folder.
    #[serde(rename = "_class", default)]
    pub class: String,
    /// Folder description.
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_default")]
    pub display_name: String,
    /// Folder name.
    #[serde(default)]
    pub name: String,
    /// Absolute URL.
    #[serde(default)]
    pub url: String,
    /// Items in the folder.
    #[serde(default, deserialize_with = "null_default")]
    pub jobs: Vec<InnerJob>,
    /// Primary view.
    #[serde(default)]
    pub primary_view: Option<ViewData>,
    /// Views.
    #[serde(default, deserialize_with = "null_default")]
    pub views: Vec<ViewData>,
}

/// Handle on a folder.
#[derive(Debug, Clone)]
pub struct Folder<'a> {
    client: &'a Jenkins,
    base: String,
    raw: Option<FolderResponse>,
}

#[async_trait]
impl<'a> Resource for Folder<'a> {
    type Raw = FolderResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&FolderResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: FolderResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> Folder<'a> {
    /// Creates an unpopulated handle for the folder at `base`.
    pub fn new(client: &'a Jenkins, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
            raw: None,
        }
    }

    /// Folder name from the snapshot.
    pub fn name(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.name.as_str())
    }

    /// The full snapshot.
    pub fn details(&self) -> Option<&FolderResponse> {
        self.raw.as_ref()
    }

    /// Item references from the snapshot.
    pub fn jobs_metadata(&self) -> &[InnerJob] {
        self.raw.as_ref().map(|r| r.jobs.as_slice()).unwrap_or_default()
    }

    /// Path of the container owning this folder.
    pub fn parent_base(&self) -> &str {
        parent_base(&self.base)
    }

    /// Creates the folder at this handle's path and polls it.
    pub async fn create(&mut self, name: &str) -> Result<()> {
        let path = format!("{}/createItem", self.parent_base());
        let fields = [
            ("name", name.to_string()),
            ("mode", FOLDER_MODE.to_string()),
            ("Submit", "OK".to_string()),
            ("json", make_json(&json!({ "name": name, "mode": FOLDER_MODE }))),
        ];
        let response = self.client.requester().post_form(&path, &[], &fields).await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        self.refresh().await
    }

    /// Polls the job `name` inside this folder.
    pub async fn get_job(&self, name: &str) -> Result<Job<'a>> {
        let mut job = Job::new(self.client, child_job_path(&self.base, name));
        job.refresh().await?;
        Ok(job)
    }

    /// Polls the folder `name` nested inside this one.
    pub async fn get_folder(&self, name: &str) -> Result<Folder<'a>> {
        let mut folder = Folder::new(self.client, child_job_path(&self.base, name));
        folder.refresh().await?;
        Ok(folder)
    }

    /// Polls every item listed in the snapshot as a job handle, in order.
    pub async fn jobs(&self) -> Result<Vec<Job<'a>>> {
        let mut jobs = Vec::with_capacity(self.jobs_metadata().len());
        for inner in self.jobs_metadata() {
            jobs.push(self.get_job(&inner.name).await?);
        }
        Ok(jobs)
    }
}

impl Jenkins {
    /// Creates a folder, nested inside `parents` when given.
    pub async fn create_folder<S: AsRef<str>>(&self, name: &str, parents: &[S]) -> Result<Folder<'_>> {
        let mut folder = Folder::new(self, job_path(parents, name));
        folder.create(name).await?;
        Ok(folder)
    }

    /// Polls the folder `name` nested inside `parents`.
    pub async fn get_folder<S: AsRef<str>>(&self, name: &str, parents: &[S]) -> Result<Folder<'_>> {
        let mut folder = Folder::new(self, job_path(parents, name));
        folder.refresh().await?;
        Ok(folder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use mockito::Matcher;

    const CHILD_XML: &str = "<project><description>child</description></project>";

    fn jenkins(server: &mockito::ServerGuard) -> Jenkins {
        Jenkins::new(ClientOptions::new(server.url())).unwrap()
    }

    #[tokio::test]
    async fn test_folder_then_job_inside() {
        let mut server = mockito::Server::new_async().await;
        let create_folder = server
            .mock("POST", "/createItem")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "parent".into()),
                Matcher::UrlEncoded("mode".into(), FOLDER_MODE.into()),
            ]))
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/job/parent/api/json")
            .with_status(200)
            .with_body(r#"{"_class": "com.cloudbees.hudson.plugins.folder.Folder", "name": "parent", "jobs": []}"#)
            .create_async()
            .await;
        let create_job = server
            .mock("POST", "/job/parent/createItem")
            .match_query(Matcher::UrlEncoded("name".into(), "child".into()))
            .match_header("content-type", Matcher::Regex("application/xml".into()))
            .match_body(CHILD_XML)
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/job/parent/job/child/api/json")
            .with_status(200)
            .with_body(r#"{"name": "child", "description": "child"}"#)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let folder = jenkins.create_folder::<&str>("parent", &[]).await.unwrap();
        assert_eq!(folder.base(), "/job/parent");
        assert_eq!(folder.name(), Some("parent"));

        let job = jenkins
            .create_job_in_folder(CHILD_XML, "child", &["parent"])
            .await
            .unwrap();
        assert_eq!(job.base(), "/job/parent/job/child");
        assert_eq!(job.parent_base(), "/job/parent");
        assert_eq!(job.name(), Some("child"));

        create_folder.assert_async().await;
        create_job.assert_async().await;
    }

    #[tokio::test]
    async fn test_nested_folder_creation_targets_parent() {
        let mut server = mockito::Server::new_async().await;
        let create = server
            .mock("POST", "/job/a/job/b/createItem")
            .with_status(200)
            .create_async()
            .await;
        server
            .mock("GET", "/job/a/job/b/job/c/api/json")
            .with_status(200)
            .with_body(r#"{"name": "c"}"#)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let folder = jenkins.create_folder("c", &["a", "b"]).await.unwrap();
        assert_eq!(folder.base(), "/job/a/job/b/job/c");
        create.assert_async().await;
    }

    #[tokio::test]
    async fn test_create_failure_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/createItem")
            .with_status(400)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let err = jenkins.create_folder::<&str>("dup", &[]).await.unwrap_err();
        assert!(matches!(err, JenkinsError::Status { status: 400, .. }));
    }

    #[tokio::test]
    async fn test_folder_navigation() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/team/api/json")
            .with_status(200)
            .with_body(
                r#"{"name": "team", "jobs": [
                    {"name": "api", "url": "http://ci/job/team/job/api/", "color": "blue"},
                    {"name": "web", "url": "http://ci/job/team/job/web/", "color": "red"}
                ]}"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/job/team/job/api/api/json")
            .with_status(200)
            .with_body(r#"{"name": "api"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/job/team/job/web/api/json")
            .with_status(200)
            .with_body(r#"{"name": "web"}"#)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let folder = jenkins.get_folder::<&str>("team", &[]).await.unwrap();
        let jobs = folder.jobs().await.unwrap();
        assert_eq!(jobs[0].base(), "/job/team/job/api");
        assert_eq!(jobs[1].name(), Some("web"));
    }
}
