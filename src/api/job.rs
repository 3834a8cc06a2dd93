//
//  jenkins-cli
//  api/job.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/15.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Jobs
//!
//! A [`Job`] is a handle on `/job/<name>` (or `/job/<folder>/job/<name>` when
//! nested). Its snapshot carries `{number, url}` references to notable
//! builds, metadata for sub-jobs and upstream/downstream projects, and the
//! declared parameter definitions. Navigation methods turn those references
//! into freshly polled [`Build`] and [`Job`] handles.
//!
//! ## Triggering builds
//!
//! ```text
//! invoke_simple ─┬─ snapshot says inQueue ──> Outcome::Refused(AlreadyQueued)
//!                └─ POST build | buildWithParameters
//!                      └─ Location: .../queue/item/<n>/ ──> Outcome::Done(n)
//! ```
//!
//! The queue item number is returned, not a build number: the build may not
//! exist yet. Use [`Jenkins::get_queue_item`] to follow it.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::str::FromStr;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::build::Build;
use super::client::{make_json, Jenkins};
use super::common::{null_default, InnerJob, JenkinsError, JobBuild, Outcome, Refusal, Result, ViewData};
use super::history::{parse_build_history, History};
use super::queue::QueueItem;
use super::requester::Attachment;
use super::resource::{child_job_path, job_path, job_path_from_url, parent_base, Resource};

/// Default value of a parameter definition.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParameterValue {
    /// Parameter name.
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// Default value; strings, booleans, and numbers all occur.
    #[serde(default)]
    pub value: serde_json::Value,
}

/// A build parameter declared by a job.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParameterDefinition {
    /// Default value, absent for parameters without one (e.g. file parameters).
    #[serde(default)]
    pub default_parameter_value: Option<ParameterValue>,
    /// Help text.
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Parameter name.
    pub name: String,
    /// Definition type, e.g. `StringParameterDefinition`.
    #[serde(rename = "type", default)]
    pub kind: String,
}

/// One entry of a job's `property[]` array.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobProperty {
    /// Parameter definitions, present on `ParametersDefinitionProperty`.
    #[serde(default, deserialize_with = "null_default")]
    pub parameter_definitions: Vec<ParameterDefinition>,
}

/// A health report entry (weather icon).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthReport {
    /// Human readable summary.
    #[serde(default)]
    pub description: String,
    /// Icon CSS class.
    #[serde(default)]
    pub icon_class_name: String,
    /// Icon URL.
    #[serde(default)]
    pub icon_url: String,
    /// Health score, 0 to 100.
    #[serde(default)]
    pub score: i64,
}

/// Snapshot of a job's JSON document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    /// Java class of the job (freestyle, pipeline, folder, ...).
    #[serde(rename = "_class", default)]
    pub class: String,
    /// Plugin-contributed actions, kept as raw JSON.
    #[serde(default, deserialize_with = "null_default")]
    pub actions: Vec<serde_json::Value>,
    /// Whether new builds can be scheduled.
    #[serde(default)]
    pub buildable: bool,
    /// Recent builds.
    #[serde(default, deserialize_with = "null_default")]
    pub builds: Vec<JobBuild>,
    /// Ball color; `disabled` for disabled jobs.
    #[serde(default, deserialize_with = "null_default")]
    pub color: String,
    /// Whether builds may run concurrently.
    #[serde(default)]
    pub concurrent_build: bool,
    /// Job description.
    #[serde(default, deserialize_with = "null_default")]
    pub description: String,
    /// Explicit disabled flag, reported by newer controllers.
    #[serde(default)]
    pub disabled: Option<bool>,
    /// Display name.
    #[serde(default, deserialize_with = "null_default")]
    pub display_name: String,
    /// Display name if explicitly set.
    #[serde(default)]
    pub display_name_or_null: Option<String>,
    /// Projects triggered by this one.
    #[serde(default, deserialize_with = "null_default")]
    pub downstream_projects: Vec<InnerJob>,
    /// First build.
    #[serde(default)]
    pub first_build: Option<JobBuild>,
    /// Full name including folders, e.g. `team/app`.
    #[serde(default, deserialize_with = "null_default")]
    pub full_name: String,
    /// Health report.
    #[serde(default, deserialize_with = "null_default")]
    pub health_report: Vec<HealthReport>,
    /// Whether a queue item for this job is pending.
    #[serde(default)]
    pub in_queue: bool,
    /// Whether upstream dependencies keep their builds.
    #[serde(default)]
    pub keep_dependencies: bool,
    /// Last build.
    #[serde(default)]
    pub last_build: Option<JobBuild>,
    /// Last completed build.
    #[serde(default)]
    pub last_completed_build: Option<JobBuild>,
    /// Last failed build.
    #[serde(default)]
    pub last_failed_build: Option<JobBuild>,
    /// Last stable build.
    #[serde(default)]
    pub last_stable_build: Option<JobBuild>,
    /// Last successful build.
    #[serde(default)]
    pub last_successful_build: Option<JobBuild>,
    /// Last unstable build.
    #[serde(default)]
    pub last_unstable_build: Option<JobBuild>,
    /// Last unsuccessful build.
    #[serde(default)]
    pub last_unsuccessful_build: Option<JobBuild>,
    /// Job name (last path segment).
    #[serde(default, deserialize_with = "null_default")]
    pub name: String,
    /// Number the next build will get.
    #[serde(default)]
    pub next_build_number: i64,
    /// Job properties; parameter definitions live here.
    #[serde(default, deserialize_with = "null_default")]
    pub property: Vec<JobProperty>,
    /// The pending queue item, when `in_queue` is set.
    #[serde(default)]
    pub queue_item: Option<QueueItem>,
    /// Source control configuration, kept as raw JSON.
    #[serde(default)]
    pub scm: Option<serde_json::Value>,
    /// Projects that trigger this one.
    #[serde(default, deserialize_with = "null_default")]
    pub upstream_projects: Vec<InnerJob>,
    /// Absolute URL of the job.
    #[serde(default, deserialize_with = "null_default")]
    pub url: String,
    /// Nested items (folders, multibranch projects).
    #[serde(default, deserialize_with = "null_default")]
    pub jobs: Vec<InnerJob>,
    /// Primary view of a folder.
    #[serde(default)]
    pub primary_view: Option<ViewData>,
    /// Views of a folder.
    #[serde(default, deserialize_with = "null_default")]
    pub views: Vec<ViewData>,
}

impl JobResponse {
    /// All parameter definitions across the job's properties, in order.
    pub fn parameter_definitions(&self) -> Vec<ParameterDefinition> {
        self.property
            .iter()
            .flat_map(|p| p.parameter_definitions.iter().cloned())
            .collect()
    }

    /// The reference stored under a symbolic build name.
    pub fn build_reference(&self, kind: BuildKind) -> Option<&JobBuild> {
        match kind {
            BuildKind::LastBuild => self.last_build.as_ref(),
            BuildKind::LastStableBuild => self.last_stable_build.as_ref(),
            BuildKind::LastSuccessfulBuild => self.last_successful_build.as_ref(),
            BuildKind::LastCompletedBuild => self.last_completed_build.as_ref(),
            BuildKind::FirstBuild => self.first_build.as_ref(),
            BuildKind::LastFailedBuild => self.last_failed_build.as_ref(),
        }
    }
}

/// Symbolic build names a job snapshot can resolve.
///
/// The set is closed; parsing any other name is a programming error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuildKind {
    /// `lastBuild`
    LastBuild,
    /// `lastStableBuild`
    LastStableBuild,
    /// `lastSuccessfulBuild`
    LastSuccessfulBuild,
    /// `lastCompletedBuild`
    LastCompletedBuild,
    /// `firstBuild`
    FirstBuild,
    /// `lastFailedBuild`
    LastFailedBuild,
}

impl BuildKind {
    /// Every symbolic name, in declaration order.
    pub const ALL: [BuildKind; 6] = [
        Self::LastBuild,
        Self::LastStableBuild,
        Self::LastSuccessfulBuild,
        Self::LastCompletedBuild,
        Self::FirstBuild,
        Self::LastFailedBuild,
    ];

    /// The JSON field name Jenkins uses for this reference.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::LastBuild => "lastBuild",
            Self::LastStableBuild => "lastStableBuild",
            Self::LastSuccessfulBuild => "lastSuccessfulBuild",
            Self::LastCompletedBuild => "lastCompletedBuild",
            Self::FirstBuild => "firstBuild",
            Self::LastFailedBuild => "lastFailedBuild",
        }
    }
}

impl FromStr for BuildKind {
    type Err = JenkinsError;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| JenkinsError::Programming(format!("no such build: {}", s)))
    }
}

impl std::fmt::Display for BuildKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A file passed to a file parameter when triggering a build.
#[derive(Debug, Clone)]
pub struct FileParameter {
    /// Name of the file parameter declared by the job.
    pub name: String,
    /// Local file to upload.
    pub path: PathBuf,
}

/// Options for [`Job::invoke`].
#[derive(Debug, Clone, Default)]
pub struct InvokeOptions {
    /// Files for file parameters. Non-empty forces the `build` endpoint.
    pub files: Vec<FileParameter>,
    /// Refuse when the last build is still running.
    pub skip_if_running: bool,
    /// Build parameters. `Some` selects `buildWithParameters`.
    pub params: Option<BTreeMap<String, String>>,
    /// Free-text cause recorded with the build.
    pub cause: Option<String>,
    /// Remote trigger token (`token` query parameter).
    pub security_token: Option<String>,
}

#[derive(Serialize)]
struct BuildParameter<'p> {
    name: &'p str,
    #[serde(skip_serializing_if = "Option::is_none")]
    value: Option<&'p str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    file: Option<String>,
}

#[derive(Serialize)]
struct BuildPayload<'p> {
    parameter: Vec<BuildParameter<'p>>,
}

/// Handle on a job.
#[derive(Debug, Clone)]
pub struct Job<'a> {
    client: &'a Jenkins,
    base: String,
    raw: Option<JobResponse>,
}

#[async_trait]
impl<'a> Resource for Job<'a> {
    type Raw = JobResponse;

    fn client(&self) -> &Jenkins {
        self.client
    }

    fn base(&self) -> &str {
        &self.base
    }

    fn raw(&self) -> Option<&JobResponse> {
        self.raw.as_ref()
    }

    fn set_raw(&mut self, raw: JobResponse) {
        self.raw = Some(raw);
    }
}

impl<'a> Job<'a> {
    /// Creates an unpopulated handle for the job at `base`.
    pub fn new(client: &'a Jenkins, base: impl Into<String>) -> Self {
        Self {
            client,
            base: base.into(),
            raw: None,
        }
    }

    /// Job name from the snapshot.
    pub fn name(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.name.as_str())
    }

    /// Job description from the snapshot.
    pub fn description(&self) -> Option<&str> {
        self.raw.as_ref().map(|r| r.description.as_str())
    }

    /// The full snapshot.
    pub fn details(&self) -> Option<&JobResponse> {
        self.raw.as_ref()
    }

    /// Path of the container owning this job.
    pub fn parent_base(&self) -> &str {
        parent_base(&self.base)
    }

    /// Sub-job references from the snapshot.
    pub fn sub_jobs_metadata(&self) -> &[InnerJob] {
        self.raw.as_ref().map(|r| r.jobs.as_slice()).unwrap_or_default()
    }

    /// Upstream project references from the snapshot.
    pub fn upstream_jobs_metadata(&self) -> &[InnerJob] {
        self.raw
            .as_ref()
            .map(|r| r.upstream_projects.as_slice())
            .unwrap_or_default()
    }

    /// Downstream project references from the snapshot.
    pub fn downstream_jobs_metadata(&self) -> &[InnerJob] {
        self.raw
            .as_ref()
            .map(|r| r.downstream_projects.as_slice())
            .unwrap_or_default()
    }

    /// Polls build `number` of this job.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::NotFound`] if the build does not answer 200.
    pub async fn get_build(&self, number: i64) -> Result<Build<'a>> {
        let mut build = Build::new(self.client, &self.base, number);
        build.refresh().await?;
        Ok(build)
    }

    /// Resolves a symbolic build name through the snapshot and polls it.
    ///
    /// A job without such a build resolves to number `0`, which the
    /// controller answers with a 404.
    pub async fn get_build_by_kind(&self, kind: BuildKind) -> Result<Build<'a>> {
        let number = self
            .snapshot()?
            .build_reference(kind)
            .map(|b| b.number)
            .unwrap_or(0);
        self.get_build(number).await
    }

    /// Polls the last build.
    pub async fn last_build(&self) -> Result<Build<'a>> {
        self.get_build_by_kind(BuildKind::LastBuild).await
    }

    /// Polls the first build.
    pub async fn first_build(&self) -> Result<Build<'a>> {
        self.get_build_by_kind(BuildKind::FirstBuild).await
    }

    /// Polls the last stable build.
    pub async fn last_stable_build(&self) -> Result<Build<'a>> {
        self.get_build_by_kind(BuildKind::LastStableBuild).await
    }

    /// Polls the last successful build.
    pub async fn last_successful_build(&self) -> Result<Build<'a>> {
        self.get_build_by_kind(BuildKind::LastSuccessfulBuild).await
    }

    /// Polls the last failed build.
    pub async fn last_failed_build(&self) -> Result<Build<'a>> {
        self.get_build_by_kind(BuildKind::LastFailedBuild).await
    }

    /// Polls the last completed build.
    pub async fn last_completed_build(&self) -> Result<Build<'a>> {
        self.get_build_by_kind(BuildKind::LastCompletedBuild).await
    }

    /// Number and URL of every build the controller still keeps.
    pub async fn all_build_ids(&self) -> Result<Vec<JobBuild>> {
        #[derive(Deserialize)]
        struct AllBuilds {
            #[serde(rename = "allBuilds", default)]
            builds: Vec<JobBuild>,
        }

        let response = self
            .client
            .requester()
            .get_json(&self.base, &[("tree", "allBuilds[number,url]")])
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: self.base.clone(),
                status: response.status,
            });
        }
        Ok(response.json::<AllBuilds>()?.builds)
    }

    /// Polls the nested item `name` of this job or folder.
    pub async fn get_sub_job(&self, name: &str) -> Result<Job<'a>> {
        let mut job = Job::new(self.client, child_job_path(&self.base, name));
        job.refresh().await?;
        Ok(job)
    }

    /// Polls every nested item listed in the snapshot, in order.
    ///
    /// The first failure aborts the whole batch.
    pub async fn sub_jobs(&self) -> Result<Vec<Job<'a>>> {
        let mut jobs = Vec::with_capacity(self.sub_jobs_metadata().len());
        for inner in self.sub_jobs_metadata() {
            jobs.push(self.get_sub_job(&inner.name).await?);
        }
        Ok(jobs)
    }

    /// Polls every upstream project listed in the snapshot, in order.
    pub async fn upstream_jobs(&self) -> Result<Vec<Job<'a>>> {
        self.client.get_jobs_by_reference(self.upstream_jobs_metadata()).await
    }

    /// Polls every downstream project listed in the snapshot, in order.
    pub async fn downstream_jobs(&self) -> Result<Vec<Job<'a>>> {
        self.client.get_jobs_by_reference(self.downstream_jobs_metadata()).await
    }

    /// Enables the job. The snapshot is not refreshed.
    pub async fn enable(&self) -> Result<()> {
        self.post_expecting_ok("enable").await
    }

    /// Disables the job. The snapshot is not refreshed.
    pub async fn disable(&self) -> Result<()> {
        self.post_expecting_ok("disable").await
    }

    /// Deletes the job.
    pub async fn delete(&self) -> Result<()> {
        self.post_expecting_ok("doDelete").await
    }

    /// Renames the job and moves this handle to the new path.
    ///
    /// The snapshot still describes the job under its old name until the
    /// next poll.
    pub async fn rename(&mut self, new_name: &str) -> Result<()> {
        let path = format!("{}/doRename", self.base);
        let response = self
            .client
            .requester()
            .post_form(&path, &[], &[("newName", new_name)])
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        self.base = child_job_path(parent_base(&self.base), new_name);
        Ok(())
    }

    /// Creates this job from an XML configuration and polls it.
    ///
    /// The document is posted to the owning container's `createItem`
    /// endpoint, so the handle's base decides which folder it lands in.
    pub async fn create(&mut self, config: &str, name: &str) -> Result<()> {
        let path = format!("{}/createItem", self.parent_base());
        let response = self
            .client
            .requester()
            .post_xml(&path, &[("name", name)], config)
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        self.refresh().await
    }

    /// Copies this job to `destination` inside the same container.
    pub async fn copy(&self, destination: &str) -> Result<Job<'a>> {
        let from = match self.name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => self.base.rsplit('/').next().unwrap_or_default().to_string(),
        };
        let path = format!("{}/createItem", self.parent_base());
        let response = self
            .client
            .requester()
            .post(&path, &[("name", destination), ("from", from.as_str()), ("mode", "copy")])
            .await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        let mut copy = Job::new(self.client, child_job_path(self.parent_base(), destination));
        copy.refresh().await?;
        Ok(copy)
    }

    /// Raw `config.xml` of the job.
    pub async fn config(&self) -> Result<String> {
        let response = self.fetch_config().await?;
        Ok(response.text())
    }

    /// `config.xml` decoded into a caller-supplied structure.
    pub async fn config_as<T: DeserializeOwned>(&self) -> Result<T> {
        self.fetch_config().await?.xml()
    }

    /// Replaces `config.xml` and polls the job on success.
    pub async fn update_config(&mut self, config: &str) -> Result<()> {
        let path = format!("{}/config.xml", self.base);
        let response = self.client.requester().post_xml(&path, &[], config).await?;
        if !response.is_ok() {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }
        self.refresh().await
    }

    /// Polls the job and returns its declared parameters.
    pub async fn parameters(&mut self) -> Result<Vec<ParameterDefinition>> {
        self.refresh().await?;
        Ok(self.snapshot()?.parameter_definitions())
    }

    /// Polls and reports whether a queue item is pending.
    pub async fn is_queued(&mut self) -> Result<bool> {
        self.refresh().await?;
        Ok(self.snapshot()?.in_queue)
    }

    /// Polls the job and its last build and reports whether it is building.
    ///
    /// A job that has never been built is not running.
    pub async fn is_running(&mut self) -> Result<bool> {
        self.refresh().await?;
        if self.snapshot()?.last_build.is_none() {
            return Ok(false);
        }
        let mut last = self.last_build().await?;
        last.is_running().await
    }

    /// Polls and reports whether the job is enabled.
    pub async fn is_enabled(&mut self) -> Result<bool> {
        self.refresh().await?;
        let raw = self.snapshot()?;
        Ok(match raw.disabled {
            Some(disabled) => !disabled,
            None => raw.color != "disabled",
        })
    }

    /// Triggers a build and returns the queue item number.
    ///
    /// The decision is taken from the snapshot (polled first only if the
    /// handle is unpopulated): a job showing `inQueue` is refused without
    /// any request, and the endpoint is `buildWithParameters` when the job
    /// declares parameters, `build` otherwise.
    ///
    /// # Errors
    ///
    /// - [`JenkinsError::Status`] unless the trigger answers 200 or 201
    /// - [`JenkinsError::MissingHeader`] if no `Location` header came back
    /// - [`JenkinsError::InvalidLocation`] if it does not end in a number
    pub async fn invoke_simple<K, V>(&mut self, params: &[(K, V)]) -> Result<Outcome<i64>>
    where
        K: AsRef<str> + Sync,
        V: AsRef<str> + Sync,
    {
        if !self.is_polled() {
            self.refresh().await?;
        }
        let raw = self.snapshot()?;
        if raw.in_queue {
            warn!(job = %self.base, "job is already queued");
            return Ok(Outcome::Refused(Refusal::AlreadyQueued));
        }

        let endpoint = if raw.parameter_definitions().is_empty() {
            "build"
        } else {
            "buildWithParameters"
        };
        let path = format!("{}/{}", self.base, endpoint);
        let response = self.client.requester().post_form(&path, &[], params).await?;
        if response.status != 200 && response.status != 201 {
            return Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            });
        }

        let location = response
            .header("Location")
            .ok_or(JenkinsError::MissingHeader("Location"))?;
        Ok(Outcome::Done(parse_queue_location(location)?))
    }

    /// Triggers a build with parameters and/or file uploads.
    ///
    /// Refuses when the snapshot shows the job queued, or when
    /// `skip_if_running` is set and the last build is still running.
    /// Parameters select `buildWithParameters`; files force `build` with a
    /// multipart body.
    pub async fn invoke(&mut self, options: InvokeOptions) -> Result<Outcome<()>> {
        if !self.is_polled() {
            self.refresh().await?;
        }
        if self.snapshot()?.in_queue {
            warn!(job = %self.base, "job is already queued");
            return Ok(Outcome::Refused(Refusal::AlreadyQueued));
        }
        if options.skip_if_running && self.is_running().await? {
            warn!(job = %self.base, "job is already running");
            return Ok(Outcome::Refused(Refusal::AlreadyRunning));
        }

        let mut query: Vec<(&str, &str)> = Vec::new();
        if let Some(token) = &options.security_token {
            query.push(("token", token.as_str()));
        }
        if let Some(cause) = &options.cause {
            query.push(("cause", cause.as_str()));
        }

        let params = options.params.clone().unwrap_or_default();
        let response = if options.files.is_empty() {
            let endpoint = if options.params.is_some() {
                "buildWithParameters"
            } else {
                "build"
            };
            let path = format!("{}/{}", self.base, endpoint);
            let fields: Vec<(&String, &String)> = params.iter().collect();
            (path.clone(), self.client.requester().post_form(&path, &query, &fields).await?)
        } else {
            let path = format!("{}/build", self.base);
            let mut parameter: Vec<BuildParameter<'_>> = params
                .iter()
                .map(|(name, value)| BuildParameter {
                    name,
                    value: Some(value),
                    file: None,
                })
                .collect();
            let mut attachments = Vec::with_capacity(options.files.len());
            for (index, file) in options.files.iter().enumerate() {
                let part = format!("file{}", index);
                parameter.push(BuildParameter {
                    name: &file.name,
                    value: None,
                    file: Some(part.clone()),
                });
                attachments.push(Attachment {
                    part,
                    path: file.path.clone(),
                });
            }
            let fields = vec![("json".to_string(), make_json(&BuildPayload { parameter }))];
            (
                path.clone(),
                self.client
                    .requester()
                    .post_files(&path, &query, &fields, &attachments)
                    .await?,
            )
        };

        let (path, response) = response;
        if response.status == 200 || response.status == 201 {
            Ok(Outcome::Done(()))
        } else {
            Err(JenkinsError::Status {
                operation: format!("POST {}", path),
                status: response.status,
            })
        }
    }

    /// Build history as rendered by the job page's history widget.
    pub async fn history(&self) -> Result<Vec<History>> {
        let path = format!("{}/buildHistory/ajax", self.base);
        let response = self.client.requester().get(&path, &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: path,
                status: response.status,
            });
        }
        Ok(parse_build_history(&response.text()))
    }

    async fn fetch_config(&self) -> Result<super::requester::Response> {
        let path = format!("{}/config.xml", self.base);
        let response = self.client.requester().get_xml(&path, &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: path,
                status: response.status,
            });
        }
        Ok(response)
    }

    async fn post_expecting_ok(&self, action: &str) -> Result<()> {
        let path = format!("{}/{}", self.base, action);
        let response = self.client.requester().post(&path, &[]).await?;
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

/// Extracts the queue item number from a build trigger's `Location` header.
///
/// `http://ci/queue/item/42/` and relative `/queue/item/42` both yield `42`.
pub fn parse_queue_location(location: &str) -> Result<i64> {
    let path = match url::Url::parse(location) {
        Ok(url) => url.path().to_string(),
        Err(_) => location.split(['?', '#']).next().unwrap_or_default().to_string(),
    };
    path.trim_end_matches('/')
        .rsplit('/')
        .next()
        .and_then(|segment| segment.parse().ok())
        .ok_or_else(|| JenkinsError::InvalidLocation(location.to_string()))
}

impl Jenkins {
    /// Polls the job `name`, nested inside the given folders.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::NotFound`] unless the job answers 200.
    pub async fn get_job<S: AsRef<str>>(&self, name: &str, parents: &[S]) -> Result<Job<'_>> {
        let mut job = Job::new(self, job_path(parents, name));
        job.refresh().await?;
        Ok(job)
    }

    /// Polls `child` inside the top-level folder `parent`.
    pub async fn get_sub_job(&self, parent: &str, child: &str) -> Result<Job<'_>> {
        self.get_job(child, &[parent]).await
    }

    /// Creates a top-level job from an XML configuration.
    pub async fn create_job(&self, config: &str, name: &str) -> Result<Job<'_>> {
        self.create_job_in_folder::<&str>(config, name, &[]).await
    }

    /// Creates a job inside the given folder chain.
    ///
    /// `create_job_in_folder(xml, "child", &["parent"])` posts to
    /// `/job/parent/createItem?name=child` and returns the handle for
    /// `/job/parent/job/child`.
    pub async fn create_job_in_folder<S: AsRef<str>>(
        &self,
        config: &str,
        name: &str,
        parents: &[S],
    ) -> Result<Job<'_>> {
        let mut job = Job::new(self, job_path(parents, name));
        job.create(config, name).await?;
        Ok(job)
    }

    /// Renames a top-level job and returns a handle at the new path.
    pub async fn rename_job(&self, name: &str, new_name: &str) -> Result<Job<'_>> {
        let mut job = Job::new(self, job_path::<&str>(&[], name));
        job.rename(new_name).await?;
        Ok(job)
    }

    /// Copies a top-level job.
    pub async fn copy_job(&self, from: &str, new_name: &str) -> Result<Job<'_>> {
        let job = self.get_job::<&str>(from, &[]).await?;
        job.copy(new_name).await
    }

    /// Deletes a top-level job.
    pub async fn delete_job(&self, name: &str) -> Result<()> {
        Job::new(self, job_path::<&str>(&[], name)).delete().await
    }

    /// Triggers a build of a top-level job; see [`Job::invoke_simple`].
    pub async fn build_job<K, V>(&self, name: &str, params: &[(K, V)]) -> Result<Outcome<i64>>
    where
        K: AsRef<str> + Sync,
        V: AsRef<str> + Sync,
    {
        let mut job = Job::new(self, job_path::<&str>(&[], name));
        job.invoke_simple(params).await
    }

    /// Polls build `number` of a top-level job.
    pub async fn get_build(&self, job: &str, number: i64) -> Result<Build<'_>> {
        let job = self.get_job::<&str>(job, &[]).await?;
        job.get_build(number).await
    }

    /// Build references of a top-level job.
    pub async fn get_all_build_ids(&self, job: &str) -> Result<Vec<JobBuild>> {
        let job = self.get_job::<&str>(job, &[]).await?;
        job.all_build_ids().await
    }

    /// Top-level job references, without polling each job.
    pub async fn get_all_job_names(&self) -> Result<Vec<InnerJob>> {
        Ok(self.info().await?.jobs)
    }

    /// Polls every top-level job, in the order the root lists them.
    pub async fn get_all_jobs(&self) -> Result<Vec<Job<'_>>> {
        let names = self.get_all_job_names().await?;
        self.get_jobs_by_reference(&names).await
    }

    /// Polls each referenced job, in order, at the path its URL names.
    ///
    /// References without a usable URL fall back to a top-level job of the
    /// same name. The first failure aborts the whole batch.
    pub(crate) async fn get_jobs_by_reference(&self, references: &[InnerJob]) -> Result<Vec<Job<'_>>> {
        let mut jobs = Vec::with_capacity(references.len());
        for reference in references {
            let base = job_path_from_url(&reference.url)
                .unwrap_or_else(|| job_path::<&str>(&[], &reference.name));
            let mut job = Job::new(self, base);
            job.refresh().await?;
            jobs.push(job);
        }
        Ok(jobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::client::ClientOptions;
    use mockito::Matcher;

    const JOB: &str = r#"{
        "_class": "hudson.model.FreeStyleProject",
        "name": "alpha",
        "description": "first",
        "color": "blue",
        "inQueue": false,
        "lastBuild": {"number": 12, "url": "http://ci/job/alpha/12/"},
        "firstBuild": {"number": 1, "url": "http://ci/job/alpha/1/"},
        "lastFailedBuild": null,
        "property": [],
        "upstreamProjects": [
            {"name": "up1", "url": "http://ci/job/up1/", "color": "blue"},
            {"name": "up2", "url": "http://ci/job/up2/", "color": "red"}
        ],
        "downstreamProjects": []
    }"#;

    const PARAMETERIZED: &str = r#"{
        "name": "beta",
        "inQueue": false,
        "property": [
            {"_class": "hudson.model.ParametersDefinitionProperty",
             "parameterDefinitions": [
                {"name": "BRANCH", "type": "StringParameterDefinition",
                 "description": null,
                 "defaultParameterValue": {"name": "BRANCH", "value": "main"}}
             ]}
        ]
    }"#;

    fn jenkins(server: &mockito::ServerGuard) -> Jenkins {
        Jenkins::new(ClientOptions::new(server.url())).unwrap()
    }

    async fn mock_job(server: &mut mockito::ServerGuard, path: &str, body: &str) -> mockito::Mock {
        server
            .mock("GET", format!("{}/api/json", path).as_str())
            .with_status(200)
            .with_body(body)
            .create_async()
            .await
    }

    #[tokio::test]
    async fn test_get_job_populates_snapshot() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;

        let jenkins = jenkins(&server);
        let job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        assert_eq!(job.base(), "/job/alpha");
        assert_eq!(job.name(), Some("alpha"));
        assert_eq!(job.description(), Some("first"));
        let raw = job.details().unwrap();
        assert_eq!(raw.last_build.as_ref().unwrap().number, 12);
        assert!(raw.last_failed_build.is_none());
    }

    #[tokio::test]
    async fn test_get_job_not_found() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/ghost/api/json")
            .with_status(404)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let err = jenkins.get_job::<&str>("ghost", &[]).await.unwrap_err();
        assert!(matches!(err, JenkinsError::NotFound { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_poll_404_keeps_previous_snapshot() {
        let mut server = mockito::Server::new_async().await;
        let found = mock_job(&mut server, "/job/alpha", JOB).await;

        let jenkins = jenkins(&server);
        let mut job = Job::new(&jenkins, "/job/alpha");
        assert!(!job.is_polled());
        assert_eq!(job.poll().await.unwrap(), 200);

        found.remove_async().await;
        server
            .mock("GET", "/job/alpha/api/json")
            .with_status(404)
            .create_async()
            .await;

        assert_eq!(job.poll().await.unwrap(), 404);
        assert_eq!(job.description(), Some("first"));
        let err = job.refresh().await.unwrap_err();
        assert!(matches!(err, JenkinsError::NotFound { status: 404, .. }));
    }

    #[tokio::test]
    async fn test_snapshot_is_stale_until_polled() {
        let mut server = mockito::Server::new_async().await;
        let before = mock_job(&mut server, "/job/alpha", JOB).await;

        let jenkins = jenkins(&server);
        let mut job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let other = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();

        before.remove_async().await;
        mock_job(&mut server, "/job/alpha", &JOB.replace("\"first\"", "\"second\"")).await;

        // remote changed, handle still shows the old state
        assert_eq!(job.description(), Some("first"));
        job.poll().await.unwrap();
        assert_eq!(job.description(), Some("second"));
        // independent handle keeps its own staleness
        assert_eq!(other.description(), Some("first"));
    }

    #[tokio::test]
    async fn test_repeated_poll_is_identical() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;

        let jenkins = jenkins(&server);
        let mut job = Job::new(&jenkins, "/job/alpha");
        job.poll().await.unwrap();
        let first = serde_json::to_vec(job.details().unwrap()).unwrap();
        job.poll().await.unwrap();
        let second = serde_json::to_vec(job.details().unwrap()).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_invoke_simple_without_parameters_posts_build() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        let trigger = server
            .mock("POST", "/job/alpha/build")
            .with_status(201)
            .with_header("Location", "http://host/job/x/queue/item/42/")
            .create_async()
            .await;
        let with_params = server
            .mock("POST", "/job/alpha/buildWithParameters")
            .expect(0)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let outcome = jenkins.build_job::<&str, &str>("alpha", &[]).await.unwrap();
        assert_eq!(outcome, Outcome::Done(42));
        trigger.assert_async().await;
        with_params.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_simple_with_parameters_posts_build_with_parameters() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/beta", PARAMETERIZED).await;
        let trigger = server
            .mock("POST", "/job/beta/buildWithParameters")
            .match_body(Matcher::UrlEncoded("BRANCH".into(), "dev".into()))
            .with_status(201)
            .with_header("Location", "http://host/queue/item/7/")
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = jenkins.get_job::<&str>("beta", &[]).await.unwrap();
        let outcome = job.invoke_simple(&[("BRANCH", "dev")]).await.unwrap();
        assert_eq!(outcome.queue_id(), 7);
        trigger.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_simple_refuses_queued_job_without_request() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", &JOB.replace("\"inQueue\": false", "\"inQueue\": true")).await;
        let build = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let outcome = job.invoke_simple::<&str, &str>(&[]).await.unwrap();
        assert_eq!(outcome, Outcome::Refused(Refusal::AlreadyQueued));
        assert_eq!(outcome.queue_id(), 0);
        build.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_simple_requires_location() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        server
            .mock("POST", "/job/alpha/build")
            .with_status(201)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let err = jenkins.build_job::<&str, &str>("alpha", &[]).await.unwrap_err();
        assert!(matches!(err, JenkinsError::MissingHeader("Location")));
    }

    #[tokio::test]
    async fn test_invoke_with_params_and_token() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        let trigger = server
            .mock("POST", "/job/alpha/buildWithParameters")
            .match_query(Matcher::UrlEncoded("token".into(), "t0k".into()))
            .match_body(Matcher::UrlEncoded("ENV".into(), "prod".into()))
            .with_status(201)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let outcome = job
            .invoke(InvokeOptions {
                params: Some(BTreeMap::from([("ENV".to_string(), "prod".to_string())])),
                security_token: Some("t0k".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(outcome.is_done());
        trigger.assert_async().await;
    }

    #[tokio::test]
    async fn test_skip_if_running_triggers_never_built_job() {
        let mut server = mockito::Server::new_async().await;
        mock_job(
            &mut server,
            "/job/fresh",
            r#"{"name": "fresh", "inQueue": false, "lastBuild": null, "property": []}"#,
        )
        .await;
        let no_build = server
            .mock("GET", "/job/fresh/0/api/json")
            .match_query(Matcher::Any)
            .expect(0)
            .create_async()
            .await;
        let trigger = server
            .mock("POST", "/job/fresh/build")
            .with_status(201)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = jenkins.get_job::<&str>("fresh", &[]).await.unwrap();
        assert!(!job.is_running().await.unwrap());
        let outcome = job
            .invoke(InvokeOptions {
                skip_if_running: true,
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(outcome.is_done());
        trigger.assert_async().await;
        no_build.assert_async().await;
    }

    #[tokio::test]
    async fn test_invoke_uploads_files_to_build() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("payload.txt");
        std::fs::write(&file, "hello").unwrap();

        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        let trigger = server
            .mock("POST", "/job/alpha/build")
            .match_header("content-type", Matcher::Regex("multipart/form-data".into()))
            .match_body(Matcher::Regex("payload.txt".into()))
            .with_status(201)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let outcome = job
            .invoke(InvokeOptions {
                files: vec![FileParameter {
                    name: "UPLOAD".to_string(),
                    path: file,
                }],
                ..Default::default()
            })
            .await
            .unwrap();
        assert!(outcome.is_done());
        trigger.assert_async().await;
    }

    #[test]
    fn test_parse_queue_location() {
        assert_eq!(parse_queue_location("http://host/job/x/queue/item/42/").unwrap(), 42);
        assert_eq!(parse_queue_location("/queue/item/9").unwrap(), 9);
        assert!(matches!(
            parse_queue_location("http://host/queue/item/"),
            Err(JenkinsError::InvalidLocation(_))
        ));
    }

    #[test]
    fn test_build_kind_from_str() {
        assert_eq!("lastStableBuild".parse::<BuildKind>().unwrap(), BuildKind::LastStableBuild);
        assert!(matches!(
            "lastGreatBuild".parse::<BuildKind>(),
            Err(JenkinsError::Programming(_))
        ));
    }

    #[tokio::test]
    async fn test_last_build_navigation() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        mock_job(
            &mut server,
            "/job/alpha/12",
            r#"{"number": 12, "result": "SUCCESS", "building": false}"#,
        )
        .await;

        let jenkins = jenkins(&server);
        let job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let build = job.last_build().await.unwrap();
        assert_eq!(build.base(), "/job/alpha/12");
        assert_eq!(build.number(), 12);
    }

    #[tokio::test]
    async fn test_navigation_requires_snapshot() {
        let server = mockito::Server::new_async().await;
        let jenkins = jenkins(&server);
        let job = Job::new(&jenkins, "/job/alpha");
        let err = job.last_build().await.unwrap_err();
        assert!(matches!(err, JenkinsError::NotPolled { .. }));
    }

    #[tokio::test]
    async fn test_upstream_jobs_keep_order() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        mock_job(&mut server, "/job/up1", r#"{"name": "up1"}"#).await;
        mock_job(&mut server, "/job/up2", r#"{"name": "up2"}"#).await;

        let jenkins = jenkins(&server);
        let job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let upstream = job.upstream_jobs().await.unwrap();
        let names: Vec<_> = upstream.iter().map(|j| j.name().unwrap()).collect();
        assert_eq!(names, vec!["up1", "up2"]);
    }

    #[tokio::test]
    async fn test_upstream_job_inside_folder() {
        let mut server = mockito::Server::new_async().await;
        mock_job(
            &mut server,
            "/job/team/job/app",
            r#"{"name": "app", "upstreamProjects": [
                {"name": "lib", "url": "http://ci/job/team/job/lib/", "color": "blue"}
            ]}"#,
        )
        .await;
        let lib = mock_job(&mut server, "/job/team/job/lib", r#"{"name": "lib"}"#).await;

        let jenkins = jenkins(&server);
        let job = jenkins.get_job("app", &["team"]).await.unwrap();
        let upstream = job.upstream_jobs().await.unwrap();
        assert_eq!(upstream.len(), 1);
        assert_eq!(upstream[0].base(), "/job/team/job/lib");
        assert_eq!(upstream[0].name(), Some("lib"));
        lib.assert_async().await;
    }

    #[tokio::test]
    async fn test_sub_jobs_keep_order() {
        let mut server = mockito::Server::new_async().await;
        mock_job(
            &mut server,
            "/job/matrix",
            r#"{"name": "matrix", "jobs": [
                {"name": "linux", "url": "http://ci/job/matrix/job/linux/", "color": "blue"},
                {"name": "macos", "url": "http://ci/job/matrix/job/macos/", "color": "red"},
                {"name": "windows", "url": "http://ci/job/matrix/job/windows/"}
            ]}"#,
        )
        .await;
        for name in ["linux", "macos", "windows"] {
            mock_job(
                &mut server,
                &format!("/job/matrix/job/{}", name),
                &format!(r#"{{"name": "{}"}}"#, name),
            )
            .await;
        }

        let jenkins = jenkins(&server);
        let job = jenkins.get_job::<&str>("matrix", &[]).await.unwrap();
        let children = job.sub_jobs().await.unwrap();
        let bases: Vec<_> = children.iter().map(|j| j.base()).collect();
        assert_eq!(
            bases,
            vec!["/job/matrix/job/linux", "/job/matrix/job/macos", "/job/matrix/job/windows"]
        );
        let names: Vec<_> = children.iter().map(|j| j.name().unwrap()).collect();
        assert_eq!(names, vec!["linux", "macos", "windows"]);
    }

    #[tokio::test]
    async fn test_upstream_batch_aborts_on_first_failure() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        server
            .mock("GET", "/job/up1/api/json")
            .with_status(500)
            .create_async()
            .await;
        let second = server
            .mock("GET", "/job/up2/api/json")
            .expect(0)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let job = jenkins.get_job::<&str>("alpha", &[]).await.unwrap();
        let err = job.upstream_jobs().await.unwrap_err();
        assert_eq!(err.status(), Some(500));
        second.assert_async().await;
    }

    #[tokio::test]
    async fn test_rename_moves_handle() {
        let mut server = mockito::Server::new_async().await;
        let rename = server
            .mock("POST", "/job/team/job/alpha/doRename")
            .match_body(Matcher::UrlEncoded("newName".into(), "omega".into()))
            .with_status(200)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = Job::new(&jenkins, "/job/team/job/alpha");
        job.rename("omega").await.unwrap();
        assert_eq!(job.base(), "/job/team/job/omega");
        rename.assert_async().await;
    }

    #[tokio::test]
    async fn test_enable_failure_carries_status() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/job/alpha/enable")
            .with_status(403)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let err = Job::new(&jenkins, "/job/alpha").enable().await.unwrap_err();
        assert!(matches!(err, JenkinsError::Status { status: 403, .. }));
    }

    #[tokio::test]
    async fn test_is_enabled_polls() {
        let mut server = mockito::Server::new_async().await;
        let poll = server
            .mock("GET", "/job/alpha/api/json")
            .with_status(200)
            .with_body(r#"{"name": "alpha", "color": "disabled"}"#)
            .expect(1)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let mut job = Job::new(&jenkins, "/job/alpha");
        assert!(!job.is_enabled().await.unwrap());
        poll.assert_async().await;
    }

    #[tokio::test]
    async fn test_config_and_update() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/alpha/config.xml")
            .with_status(200)
            .with_body("<project><description>old</description></project>")
            .create_async()
            .await;
        let update = server
            .mock("POST", "/job/alpha/config.xml")
            .match_body("<project><description>new</description></project>")
            .with_status(200)
            .create_async()
            .await;
        mock_job(&mut server, "/job/alpha", JOB).await;

        let jenkins = jenkins(&server);
        let mut job = Job::new(&jenkins, "/job/alpha");
        assert!(job.config().await.unwrap().contains("old"));
        job.update_config("<project><description>new</description></project>")
            .await
            .unwrap();
        assert!(job.is_polled());
        update.assert_async().await;
    }

    #[tokio::test]
    async fn test_copy_posts_to_parent_create_item() {
        let mut server = mockito::Server::new_async().await;
        mock_job(&mut server, "/job/alpha", JOB).await;
        let copy = server
            .mock("POST", "/createItem")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("name".into(), "alpha2".into()),
                Matcher::UrlEncoded("from".into(), "alpha".into()),
                Matcher::UrlEncoded("mode".into(), "copy".into()),
            ]))
            .with_status(200)
            .create_async()
            .await;
        mock_job(&mut server, "/job/alpha2", r#"{"name": "alpha2"}"#).await;

        let jenkins = jenkins(&server);
        let copied = jenkins.copy_job("alpha", "alpha2").await.unwrap();
        assert_eq!(copied.name(), Some("alpha2"));
        copy.assert_async().await;
    }

    #[tokio::test]
    async fn test_all_build_ids() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/alpha/api/json")
            .match_query(Matcher::UrlEncoded("tree".into(), "allBuilds[number,url]".into()))
            .with_status(200)
            .with_body(r#"{"allBuilds": [{"number": 2, "url": "u2"}, {"number": 1, "url": "u1"}]}"#)
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let ids = Job::new(&jenkins, "/job/alpha").all_build_ids().await.unwrap();
        assert_eq!(ids.iter().map(|b| b.number).collect::<Vec<_>>(), vec![2, 1]);
    }

    #[tokio::test]
    async fn test_history_parses_widget() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/alpha/buildHistory/ajax")
            .with_status(200)
            .with_body(
                r#"<table><tr class="build-row"><td>
                <img src="/static/red.png" alt="Failed &gt; Console Output">
                <a class="display-name" href="/job/alpha/3/">#3</a>
                <a time="1700000000000" href="/job/alpha/3/">Nov 14</a>
                </td></tr></table>"#,
            )
            .create_async()
            .await;

        let jenkins = jenkins(&server);
        let rows = Job::new(&jenkins, "/job/alpha").history().await.unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].number, 3);
        assert_eq!(rows[0].status, "Failed");
        assert_eq!(rows[0].timestamp, 1_700_000_000_000);
    }
}
