//
//  jenkins-cli
//  api/build.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/15.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Builds
//!
//! A [`Build`] is identified by its job's base path and its number
//! (`<jobBase>/<number>`). Builds are polled with `depth=1` so that
//! artifacts, causes, and parameters come back inline.

use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::client::Jenkins;
use super::common::{null_default, JenkinsError, Result};
use super::resource::{build_path, Resource};

/// Result string of a successful build.
pub const RESULT_SUCCESS: &str = "SUCCESS";

/// An artifact entry of a build document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ArtifactData {
    /// Path shown in the UI.
    #[serde(default, deserialize_with = "null_default")]
    pub display_path: String,
    /// Bare file name.
    #[serde(default)]
    pub file_name: String,
    /// Path relative to the build's `artifact/` directory.
    #[serde(default)]
    pub relative_path: String,
}

/// A build cause (user, timer, upstream, SCM change, ...).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Cause {
    /// Human readable description.
    #[serde(default, deserialize_with = "null_default")]
    pub short_description: String,
    /// Triggering user, for user causes.
    #[serde(default)]
    pub user_id: Option<String>,
    /// Upstream project, for upstream causes.
    #[serde(default)]
    pub upstream_project: Option<String>,
    /// Upstream build number, for upstream causes.
    #[serde(default)]
    pub upstream_build: Option<i64>,
}

/// A parameter value a build ran with.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// Parameter name.
    pub name: String,
    /// Value; absent for file and password parameters.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A user who committed a change included in the build.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Culprit {
    /// Profile URL.
    #[serde(default)]
    pub absolute_url: String,
    /// Display name.
    #[serde(default)]
    pub full_name: String,
}

/// One entry of a build's `actions[]` array.
///
/// Only cause and parameter actions are modelled; anything else decodes to
/// an empty action.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BuildAction {
    /// Causes, present on `CauseAction`.
    #[serde(default, deserialize_with = "null_default")]
    pub causes: Vec<Cause>,
    /// Parameters, present on `ParametersAction`.
    #[serde(default, deserialize_with = "null_default")]
    pub parameters: Vec<ParameterValue>,
}

/// Snapshot of a build's JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildResponse {
    /// Java class of the build.
    #[serde(rename = "_class", default)]
    pub class: String,
    /// Actions; nulls and unknown shapes are tolerated.
    #[serde(default, deserialize_with = "null_default")]
    pub actions: Vec<Option<BuildAction>>,
    /// Archived artifacts.
    #[serde(default, deserialize_with = "null_default")]
    pub artifacts: Vec<ArtifactData>,
    /// Whether the build is still running.
    #[serde(default)]
    pub building: bool,
    /// Node the build ran on; empty for the built-in node.
    #[serde(default, deserialize_with = "null_default")]
    pub built_on: String,
    /// Committers of the included changes.
    #[serde(default, deserialize_with = "null_default")]
    pub culprits: Vec<Culprit>,
    /// Build description.
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Display name, usually `#<number>`.
    #[serde(default, deserialize_with = "null_default")]
    pub display_name: String,
    /// Duration in milliseconds; `0` while running.
    #[serde(default)]
    pub duration: i64,
    /// Estimated duration in milliseconds.
    #[serde(default)]
    pub estimated_duration: i64,
    /// Job display name plus build display name.
    #[serde(default, deserialize_with = "null_default")]
    pub full_display_name: String,
    /// Build id.
    #[serde(default, deserialize_with = "null_default")]
    pub id: String,
    /// Whether the build is kept forever.
    #[serde(default)]
    pub keep_log: bool,
    /// Build number.
    #[serde(default)]
    pub number: i64,
    /// Queue item number the build came from.
    #[serde(default)]
    pub queue_id: i64,
    /// `SUCCESS`, `UNSTABLE`, `FAILURE`, `ABORTED`, ...; `None` while running.
    #[serde(default)]
    pub result: Option<String>,
    /// Start time in milliseconds since the epoch.
    #[serde(default)]
    pub timestamp: i64,
    /// Absolute URL of the build.
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
}

/// Handle on a single build.
#[derive(Debug, Clone)]
pub struct Build<'a> {
    client: &'a Jenkins,
    job_base: String,
    number: i64,
    base: String,
    depth: u32,
    raw: Option<BuildResponse>,
}

#[async_trait]
impl<'a> Resource for Build<'a> {
    type Raw = BuildResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&BuildResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: BuildResponse) {
        self.raw = Some(raw);
    }

    fn poll_query(&self) -> Vec<(&'static str, String)> {
        vec![("depth", self.depth.to_string())]
    }
}

impl<'a> Build<'a> {
    /// Creates an unpopulated handle for build `number` of the job at `job_base`.
    pub fn new(client: &'a Jenkins, job_base: &str, number: i64) -> Self {
        Self {
            client,
            job_base: job_base.to_string(),
            number,
            base: build_path(job_base, number),
            depth: 1,
            raw: None,
        }
    }

    /// Overrides the `depth` sent with every poll.
    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    /// Base path of the owning job.
    pub fn job_base(&self) -> &str {
        &self.job_base
    }

    /// Build number.
    pub fn number(&self) -> i64 {
        self.number
    }

    /// The full snapshot.
    pub fn details(&self) -> Option<&BuildResponse> {
        self.raw.as_ref()
    }

    /// Result from the snapshot; `None` while running or unpolled.
    pub fn result(&self) -> Option<&str> {
        self.raw.as_ref().and_then(|r| r.result.as_deref())
    }

    /// Running flag from the snapshot.
    pub fn building(&self) -> bool {
        self.raw.as_ref().map(|r| r.building).unwrap_or(false)
    }

    /// Duration from the snapshot.
    pub fn duration(&self) -> Option<Duration> {
        self.raw
            .as_ref()
            .map(|r| Duration::from_millis(r.duration.max(0) as u64))
    }

    /// Start time from the snapshot.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.raw
            .as_ref()
            .and_then(|r| DateTime::from_timestamp_millis(r.timestamp))
    }

    /// Causes collected across all actions.
    pub fn causes(&self) -> Vec<Cause> {
        self.actions().flat_map(|a| a.causes.iter().cloned()).collect()
    }

    /// Parameter values collected across all actions.
    pub fn parameters(&self) -> Vec<ParameterValue> {
        self.actions()
            .flat_map(|a| a.parameters.iter().cloned())
            .collect()
    }

    /// Culprits from the snapshot.
    pub fn culprits(&self) -> &[Culprit] {
        self.raw
            .as_ref()
            .map(|r| r.culprits.as_slice())
            .unwrap_or_default()
    }

    /// Downloadable artifacts listed in the snapshot.
    pub fn artifacts(&self) -> Vec<Artifact<'a>> {
        let Some(raw) = &self.raw else {
            return Vec::new();
        };
        raw.artifacts
            .iter()
            .map(|data| Artifact {
                client: self.client,
                path: format!("{}/artifact/{}", self.base, data.relative_path),
                file_name: data.file_name.clone(),
            })
            .collect()
    }

    /// Polls and reports whether the build finished successfully.
    pub async fn is_good(&mut self) -> Result<bool> {
        self.refresh().await?;
        Ok(!self.building() && self.result() == Some(RESULT_SUCCESS))
    }

    /// Polls and reports whether the build is still running.
    pub async fn is_running(&mut self) -> Result<bool> {
        self.refresh().await?;
        Ok(self.building())
    }

    /// Full console log (`consoleText`).
    pub async fn console_output(&self) -> Result<String> {
        let path = format!("{}/consoleText", self.base);
        let response = self.client.requester().get(&path, &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: path,
                status: response.status,
            });
        }
        Ok(response.text())
    }

    /// Aborts a running build.
    pub async fn stop(&self) -> Result<()> {
        let path = format!("{}/stop", self.base);
        let response = self.client.requester().post(&path, &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        Ok(())
    }

    /// Replaces the build description.
    pub async fn set_description(&self, description: &str) -> Result<()> {
        let path = format!("{}/submitDescription", self.base);
        let response = self
            .client
            .requester()
            .post_form(&path, &[], &[("description", description)])
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        Ok(())
    }

    fn actions(&self) -> impl Iterator<Item = &BuildAction> {
        self.raw
            .iter()
            .flat_map(|r| r.actions.iter())
            .flatten()
    }
}

/// An archived file of a build.
#[derive(Debug, Clone)]
pub struct Artifact<'a> {
    client: &'a Jenkins,
    path: String,
    file_name: String,
}

impl<'a> Artifact<'a> {
    /// Server-relative download path.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Bare file name.
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    /// Downloads the artifact into memory.
    pub async fn data(&self) -> Result<Vec<u8>> {
        let response = self.client.requester().get(&self.path, &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: self.path.clone(),
                status: response.status,
            });
        }
        Ok(response.body)
    }

    /// Downloads the artifact into `dir/<file_name>` and returns that path.
    pub async fn save(&self, dir: &Path) -> Result<PathBuf> {
        let data = self.data().await?;
        let target = dir.join(&self.file_name);
        tokio::fs::write(&target, data).await?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use mockito::Matcher;

    const BUILD: &str = r#"{
        "_class": "hudson.model.FreeStyleBuild",
        "number": 12,
        "result": "SUCCESS",
        "building": false,
        "duration": 1500,
        "timestamp": 1700000000000,
        "actions": [
            {"_class": "hudson.model.CauseAction",
             "causes": [{"shortDescription": "Started by user admin", "userId": "admin"}]},
            {},
            null,
            {"_class": "hudson.model.ParametersAction",
             "parameters": [{"name": "BRANCH", "value": "main"}]}
        ],
        "artifacts": [
            {"displayPath": "out.txt", "fileName": "out.txt", "relativePath": "target/out.txt"}
        ],
        "culprits": []
    }"#;

    fn jenkins(server: &mockito::ServerGuard) -> Jenkins {
        Jenkins::new(ClientOptions::new(server.url())).unwrap()
    }

    async fn mock_build(server: &mut mockito::ServerGuard, body: &str) -> mockito::Mock {
        server
            .mock("GET", "/job/alpha/12/api/json")
            .match_query(Matcher::UrlEncoded("depth".into(), "1".into()))
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_poll_with_depth_and_accessors() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_build(&mut server, BUILD).await;

        let jenkins = jenkins(&server);
        let mut build = Build::new(&jenkins, "/job/alpha", 12);
        assert_eq!(build.base(), "/job/alpha/12");
        build.refresh().await.unwrap();
        mock.assert_async().await;

        assert_eq!(build.result(), Some("SUCCESS"));
        assert!(build.is_good().await.unwrap());
        assert_eq!(build.duration(), Some(Duration::from_millis(1500)));
        assert_eq!(build.timestamp().unwrap().timestamp(), 1_700_000_000);
        assert_eq!(build.causes()[0].user_id.as_deref(), Some("admin"));
        assert_eq!(build.parameters()[0].name, "BRANCH");
        assert_eq!(build.artifacts()[0].path(), "/job/alpha/12/artifact/target/out.txt");
    }

    #[tokio::test]
    async fn test_running_build_has_no_result() {
        let mut server = mockito::Server::new_async().await;
        mock_build(&mut server, r#"{"number": 12, "building": true, "result": null}"#).await;

        let jenkins = jenkins(&server);
        let mut build = Build::new(&jenkins, "/job/alpha", 12);
        assert!(build.is_running().await.unwrap());
        assert_eq!(build.result(), None);
        assert!(!build.is_good().await.unwrap());
    }

    #[tokio::test]
    async fn test_is_good_polls_unpopulated_handle() {
        let mut server = mockito::Server::new_async().await;
        let mock = mock_build(&mut server, r#"{"number": 12, "building": false, "result": "FAILURE"}"#)
            .await
            .expect(1);

        let jenkins = jenkins(&server);
        let mut build = Build::new(&jenkins, "/job/alpha", 12);
        assert!(!build.is_polled());
        assert!(!build.is_good().await.unwrap());
        assert_eq!(build.result(), Some("FAILURE"));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_console_output() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/alpha/12/consoleText")
            .with_status(200)
            .with_body("Started\nFinished: SUCCESS\n")
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let build = Build::new(&jenkins, "/job/alpha", 12);
        let log = build.console_output().await.unwrap();
        assert!(log.ends_with("Finished: SUCCESS\n"));
    }

    #[tokio::test]
    async fn test_stop_failure() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/job/alpha/12/stop")
            .with_status(500)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let err = Build::new(&jenkins, "/job/alpha", 12).stop().await.unwrap_err();
        assert!(matches!(err, JenkinsError::Status { status: 500, .. }));
    }

    #[tokio::test]
    async fn test_set_description() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/job/alpha/12/submitDescription")
            .match_body(Matcher::UrlEncoded("description".into(), "release candidate".into()))
            .with_status(200)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        Build::new(&jenkins, "/job/alpha", 12)
            .set_description("release candidate")
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_artifact_save() {
        let mut server = mockito::Server::new_async().await;
        mock_build(&mut server, BUILD).await;
        server
            .mock("GET", "/job/alpha/12/artifact/target/out.txt")
            .with_status(200)
            .with_body("artifact body")
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut build = Build::new(&jenkins, "/job/alpha", 12);
        build.refresh().await.unwrap();

        let dir = tempfile::tempdir().unwrap();
        let saved = build.artifacts()[0].save(dir.path()).await.unwrap();
        assert_eq!(saved, dir.path().join("out.txt"));
        assert_eq!(std::fs::read_to_string(saved).unwrap(), "artifact body");
    }
}
