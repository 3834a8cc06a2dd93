//
//  jenkins-cli
//  api/resource.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/14.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Resource Handles and the Poll Protocol
//!
//! Every Jenkins object the client exposes (job, build, node, view, folder,
//! label, queue, plugin list, fingerprint) is a *handle*: a server-relative
//! base path, a borrowed [`Jenkins`] client, and an optional snapshot of the
//! object's last fetched JSON document.
//!
//! ```text
//! Unpopulated --poll()--> Populated --poll()--> Populated ...
//! ```
//!
//! The snapshot only changes when [`Resource::poll`] receives a 200 and the
//! body decodes. It is never invalidated behind the caller's back, so two
//! handles for the same path are independent copies with independent
//! staleness.
//!
//! This module also holds the path construction rules that mirror Jenkins'
//! URL scheme.

use async_trait::async_trait;
use serde::de::DeserializeOwned;

use super::client::Jenkins;
use super::common::{JenkinsError, Result};

/// Path of the build queue.
pub const QUEUE_PATH: &str = "/queue";

/// Path of the plugin manager.
pub const PLUGIN_MANAGER_PATH: &str = "/pluginManager";

/// Path of the computer (node) set.
pub const COMPUTER_PATH: &str = "/computer";

/// Common behaviour of every resource handle.
///
/// Implementors provide access to their client, base path, and snapshot;
/// the trait supplies the poll protocol on top.
#[async_trait]
pub trait Resource: Send + Sync {
    /// The decoded JSON document of this resource kind.
    type Raw: DeserializeOwned + Send + Sync;

    /// The client this handle issues requests through.
    fn client(&self) -> &Jenkins;

    /// Server-relative path identifying the resource.
    fn base(&self) -> &str;

    /// The last fetched snapshot, if any.
    fn raw(&self) -> Option<&Self::Raw>;

    /// Replaces the snapshot.
    fn set_raw(&mut self, raw: Self::Raw);

    /// Extra query parameters sent with every poll (e.g. `depth`).
    fn poll_query(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }

    /// Returns `true` once a snapshot is present.
    fn is_polled(&self) -> bool {
        self.raw().is_some()
    }

    /// Returns the snapshot or [`JenkinsError::NotPolled`].
    fn snapshot(&self) -> Result<&Self::Raw> {
        self.raw().ok_or_else(|| JenkinsError::NotPolled {
            base: self.base().to_string(),
        })
    }

    /// Fetches `<base>/api/json` and refreshes the snapshot.
    ///
    /// The raw status code is returned so callers can tell a 404 from other
    /// outcomes. The snapshot is replaced only on a 200; any other status
    /// leaves the previous snapshot untouched.
    ///
    /// # Errors
    ///
    /// - [`JenkinsError::Transport`] if the request fails
    /// - [`JenkinsError::Decode`] if a 200 body does not match [`Self::Raw`]
    async fn poll(&mut self) -> Result<u16> {
        let query = self.poll_query();
        let pairs: Vec<(&str, &str)> = query.iter().map(|(k, v)| (*k, v.as_str())).collect();
        let response = self.client().requester().get_json(self.base(), &pairs).await?;
        if response.is_ok() {
            let raw = response.json()?;
            self.set_raw(raw);
        }
        Ok(response.status)
    }

    /// Polls and turns any non-200 status into [`JenkinsError::NotFound`].
    async fn refresh(&mut self) -> Result<()> {
        let status = self.poll().await?;
        if status == 200 {
            Ok(())
        } else {
            Err(JenkinsError::NotFound {
                resource: self.base().to_string(),
                status,
            })
        }
    }
}

/// Builds `/job/<a>/job/<b>/.../job/<name>` from folder ancestors and a name.
pub fn job_path<S: AsRef<str>>(parents: &[S], name: &str) -> String {
    let mut path = String::new();
    for segment in parents.iter().map(AsRef::as_ref).chain(std::iter::once(name)) {
        path.push_str("/job/");
        path.push_str(segment);
    }
    path
}

/// Job path embedded in an absolute job URL, from its first `/job/` on.
///
/// `http://ci/jenkins/job/team/job/lib/` gives `/job/team/job/lib`. The
/// host and any context path are dropped, so a reference reported under a
/// different host name still resolves. `None` if the URL holds no job.
pub fn job_path_from_url(job_url: &str) -> Option<String> {
    let parsed = url::Url::parse(job_url).ok()?;
    let path = parsed.path().trim_end_matches('/');
    let start = path.find("/job/")?;
    Some(path[start..].to_string())
}

/// Appends a nested item to an existing job or folder path.
pub fn child_job_path(parent: &str, name: &str) -> String {
    format!("{}/job/{}", parent, name)
}

/// Truncates a job path at its last `/job/` segment.
///
/// This is the container that owns the item, and the place its
/// `createItem` endpoint lives. A top-level job's parent is the root (`""`).
pub fn parent_base(base: &str) -> &str {
    match base.rfind("/job/") {
        Some(index) => &base[..index],
        None => "",
    }
}

/// Full name (`a/b/c`) of the job at `/job/a/job/b/job/c`.
pub fn job_full_name(job_base: &str) -> String {
    job_base
        .split("/job/")
        .filter(|segment| !segment.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Path of build `number` of the job at `job_base`.
pub fn build_path(job_base: &str, number: i64) -> String {
    format!("{}/{}", job_base, number)
}

/// Path of the node with the given display name.
pub fn node_path(name: &str) -> String {
    format!("{}/{}", COMPUTER_PATH, name)
}

/// Path of the view with the given name.
pub fn view_path(name: &str) -> String {
    format!("/view/{}", name)
}

/// Path of the label with the given name.
pub fn label_path(name: &str) -> String {
    format!("/label/{}", name)
}

/// Path of the fingerprint with the given hash.
pub fn fingerprint_path(id: &str) -> String {
    format!("/fingerprint/{}", id)
}

/// Path of a single queue item.
pub fn queue_item_path(id: i64) -> String {
    format!("{}/item/{}", QUEUE_PATH, id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_path() {
        assert_eq!(job_path::<&str>(&[], "foo"), "/job/foo");
        assert_eq!(job_path(&["a", "b"], "c"), "/job/a/job/b/job/c");
        assert_eq!(child_job_path("/job/a", "b"), "/job/a/job/b");
    }

    #[test]
    fn test_job_path_from_url() {
        assert_eq!(
            job_path_from_url("http://ci/job/team/job/lib/").as_deref(),
            Some("/job/team/job/lib")
        );
        assert_eq!(
            job_path_from_url("https://ci.example.com/jenkins/job/app").as_deref(),
            Some("/job/app")
        );
        assert_eq!(job_path_from_url("http://ci/view/all/"), None);
        assert_eq!(job_path_from_url(""), None);
    }

    #[test]
    fn test_parent_base() {
        assert_eq!(parent_base("/job/a/job/b/job/c"), "/job/a/job/b");
        assert_eq!(parent_base("/job/parent/job/child"), "/job/parent");
        assert_eq!(parent_base("/job/top"), "");
    }

    #[test]
    fn test_job_full_name() {
        assert_eq!(job_full_name("/job/a/job/b/job/c"), "a/b/c");
        assert_eq!(job_full_name("/job/top"), "top");
    }

    #[test]
    fn test_other_paths() {
        assert_eq!(build_path("/job/a/job/b", 12), "/job/a/job/b/12");
        assert_eq!(node_path("agent1"), "/computer/agent1");
        assert_eq!(view_path("myview"), "/view/myview");
        assert_eq!(label_path("linux"), "/label/linux");
        assert_eq!(fingerprint_path("abc"), "/fingerprint/abc");
        assert_eq!(queue_item_path(42), "/queue/item/42");
    }
}
