//
//  jenkins-cli
//  api/common/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Common API Types for the Jenkins Remote Access API
//!
//! This module provides the types shared by every resource handle: the error
//! taxonomy, the refusal convention for no-op mutations, and the lightweight
//! reference tuples Jenkins embeds in its JSON documents.
//!
//! # Overview
//!
//! - [`JenkinsError`] - Unified error type for all API operations
//! - [`Outcome`] / [`Refusal`] - Typed result of a mutation that may be declined
//! - [`JobBuild`] - `{number, url}` reference to a build
//! - [`InnerJob`] - `{name, url, color}` reference to a job
//! - [`ViewData`] - `{name, url}` reference to a view
//!
//! # Example
//!
//! ```rust
//! use jenkins_cli::api::common::JenkinsError;
//!
//! fn describe(result: Result<(), JenkinsError>) {
//!     match result {
//!         Ok(()) => println!("Success!"),
//!         Err(JenkinsError::NotFound { resource, status }) => {
//!             println!("{} answered {}", resource, status)
//!         }
//!         Err(e) => println!("Error: {}", e),
//!     }
//! }
//! ```
//!
//! # Notes
//!
//! - References are never promoted to full handles implicitly; navigating
//!   from a reference always constructs and polls a new handle.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Convenience alias used throughout the API layer.
pub type Result<T, E = JenkinsError> = std::result::Result<T, E>;

/// Unified error type for all Jenkins API operations.
///
/// # Variants
///
/// | Variant | Raised when |
/// |---------|-------------|
/// | `Transport` | The HTTP exchange itself failed |
/// | `Decode` | The body did not match the expected JSON/XML shape |
/// | `NotFound` | A lookup or navigation poll answered anything but 200 |
/// | `Status` | A mutation answered with a non-success status |
/// | `MissingHeader` | A required response header was absent |
/// | `InvalidLocation` | A queue `Location` header had no numeric tail |
/// | `NotPolled` | A snapshot-dependent call ran on an unpopulated handle |
/// | `StateUnchanged` | A node toggle was accepted but the state did not move |
/// | `Programming` | A closed set (build names, launchers) was given an unknown member |
/// | `Config` | Client options failed validation |
/// | `Io` | Local file access for uploads or downloads failed |
///
/// # Notes
///
/// - `Transport` and `Decode` are always distinguishable, so callers can tell
///   "server unreachable" apart from "response was not valid JSON/XML".
/// - Nothing in the library retries; every error surfaces immediately.
#[derive(Error, Debug)]
pub enum JenkinsError {
    /// A network-level error occurred during the request.
    #[error("Network error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The response body could not be decoded.
    ///
    /// # Parameters
    ///
    /// - `what` - The document that was being decoded (e.g. "JSON at /job/foo")
    /// - `source` - The underlying decoder error
    #[error("Unable to decode {what}: {source}")]
    Decode {
        /// Description of the document being decoded.
        what: String,
        /// The decoder's error.
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A poll-backed lookup returned a non-200 status.
    #[error("{resource} not found (status {status})")]
    NotFound {
        /// The base path that was polled.
        resource: String,
        /// The literal HTTP status code.
        status: u16,
    },

    /// A mutating request was answered with an unexpected status.
    #[error("{operation} failed with status {status}")]
    Status {
        /// Human readable operation name with its target path.
        operation: String,
        /// The literal HTTP status code.
        status: u16,
    },

    /// The response lacked a header the operation depends on.
    #[error("Response is missing the {0} header")]
    MissingHeader(&'static str),

    /// The `Location` header of a build trigger could not be parsed.
    #[error("Invalid queue location: {0}")]
    InvalidLocation(String),

    /// The handle has not been polled yet.
    #[error("{base} has not been polled yet")]
    NotPolled {
        /// Base path of the unpopulated handle.
        base: String,
    },

    /// A node offline toggle did not change the node's state.
    #[error("State of {base} did not change")]
    StateUnchanged {
        /// Base path of the node.
        base: String,
    },

    /// Misuse of a closed, compile-time known set of values.
    #[error("Programming error: {0}")]
    Programming(String),

    /// Invalid client configuration.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// Local file access failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl JenkinsError {
    /// Builds a [`JenkinsError::Decode`] from any decoder error.
    pub fn decode<E>(what: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Decode {
            what: what.into(),
            source: Box::new(source),
        }
    }

    /// Returns the HTTP status code carried by this error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::NotFound { status, .. } | Self::Status { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Returns `true` for [`JenkinsError::NotFound`].
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Reason a mutation was declined without touching the server state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Refusal {
    /// The job already has a pending queue item.
    AlreadyQueued,
    /// The job's last build is still running and the caller asked to skip.
    AlreadyRunning,
    /// The node is already offline.
    AlreadyOffline,
    /// The node is offline but not temporarily, so it cannot be brought up.
    PermanentlyOffline,
}

impl std::fmt::Display for Refusal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::AlreadyQueued => "already queued",
            Self::AlreadyRunning => "already running",
            Self::AlreadyOffline => "already offline",
            Self::PermanentlyOffline => "permanently offline",
        };
        f.write_str(reason)
    }
}

/// Result of a mutation that may be refused on a precondition.
///
/// Refusals are never errors: they come back as `Ok(Outcome::Refused(_))`
/// so the caller can tell "nothing to do" from "the call failed".
///
/// # Example
///
/// ```rust
/// use jenkins_cli::api::common::{Outcome, Refusal};
///
/// let queued: Outcome<i64> = Outcome::Done(42);
/// assert_eq!(queued.into_done(), Some(42));
///
/// let refused: Outcome<i64> = Outcome::Refused(Refusal::AlreadyQueued);
/// assert!(refused.is_refused());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome<T> {
    /// The server accepted the mutation.
    Done(T),
    /// The mutation was not attempted.
    Refused(Refusal),
}

impl<T> Outcome<T> {
    /// Returns `true` if the mutation was performed.
    pub fn is_done(&self) -> bool {
        matches!(self, Self::Done(_))
    }

    /// Returns `true` if the mutation was declined.
    pub fn is_refused(&self) -> bool {
        matches!(self, Self::Refused(_))
    }

    /// Returns the refusal reason, if any.
    pub fn refusal(&self) -> Option<Refusal> {
        match self {
            Self::Refused(reason) => Some(*reason),
            Self::Done(_) => None,
        }
    }

    /// Consumes the outcome, returning the accepted value.
    pub fn into_done(self) -> Option<T> {
        match self {
            Self::Done(value) => Some(value),
            Self::Refused(_) => None,
        }
    }
}

impl Outcome<i64> {
    /// Queue item number of an accepted trigger, `0` when refused.
    pub fn queue_id(&self) -> i64 {
        match self {
            Self::Done(id) => *id,
            Self::Refused(_) => 0,
        }
    }
}

/// Lightweight `{number, url}` reference to a build.
///
/// Appears in job documents as `lastBuild`, `firstBuild`, `builds[]`, etc.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobBuild {
    /// Build number within its job.
    pub number: i64,
    /// Absolute URL of the build.
    #[serde(default)]
    pub url: String,
}

/// Lightweight `{name, url, color}` reference to a job ("metadata").
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InnerJob {
    /// Job name (the last path segment, not the full name).
    pub name: String,
    /// Absolute URL of the job.
    #[serde(default)]
    pub url: String,
    /// Ball color; absent for folders.
    #[serde(default)]
    pub color: String,
}

/// Lightweight `{name, url}` reference to a view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ViewData {
    /// View name.
    pub name: String,
    /// Absolute URL of the view.
    #[serde(default)]
    pub url: String,
}

/// A Jenkins JSON object the client does not model field by field.
///
/// Actions and similar polymorphic arrays are kept as raw JSON so that
/// unknown plugin payloads never fail decoding.
pub type GeneralObject = serde_json::Map<String, serde_json::Value>;

/// Deserializes an explicit JSON `null` as the type's default value.
///
/// Jenkins renders unset strings and lists as `null` rather than omitting
/// them; pair with `#[serde(default)]` for absent keys.
pub(crate) fn null_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
