//
//  jenkins-cli
//  api/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Jenkins Remote Access API
//!
//! This module maps Jenkins' tree of loosely typed JSON documents onto typed,
//! lazily populated resource handles.
//!
//! ## Architecture
//!
//! ```text
//! Jenkins (root) ──get_job──> Job ──last_build──> Build ──artifacts──> Artifact
//!        │                     └──sub_jobs / upstream / downstream──> Job
//!        ├──get_node / get_all_nodes──> Node
//!        ├──get_view / get_all_views──> View ──jobs──> Job
//!        ├──get_folder──> Folder ──get_job / get_folder──> Job / Folder
//!        ├──get_queue──> Queue
//!        └──get_label / get_plugins / validate_fingerprint
//! ```
//!
//! - [`requester`]: request construction, credential and crumb headers, decoding
//! - [`client`]: the [`Jenkins`] root handle and [`ClientOptions`]
//! - [`resource`]: the [`Resource`] poll protocol and URL path rules
//! - [`common`]: errors, refusals, and reference types
//!
//! ## Usage
//!
//! ```rust,no_run
//! use jenkins_cli::api::{ClientOptions, Jenkins, Resource};
//! use jenkins_cli::auth::Credential;
//!
//! # async fn demo() -> jenkins_cli::api::Result<()> {
//! let mut jenkins = Jenkins::new(
//!     ClientOptions::new("https://ci.example.com")
//!         .with_credential(Credential::token("admin", "11aa22bb")),
//! )?;
//! jenkins.init().await?;
//!
//! let job = jenkins.get_job("app", &["team"]).await?;
//! let mut build = job.last_build().await?;
//! let running = build.is_running().await?;
//! println!("{} is running: {}", build.base(), running);
//! # Ok(())
//! # }
//! ```
//!
//! ## Staleness
//!
//! Handles are never cached or invalidated. Two lookups of the same path
//! give two independent snapshots; call [`Resource::poll`] to refresh one.

/// Root handle and client configuration.
pub mod client;

/// Shared error, refusal, and reference types.
pub mod common;

/// HTTP request construction and decoding.
pub mod requester;

/// The poll protocol and path construction rules.
pub mod resource;

/// Builds and artifacts.
pub mod build;

/// Fingerprints of archived files.
pub mod fingerprint;

/// Folders.
pub mod folder;

/// Build history widget parser.
pub mod history;

/// Jobs and build triggering.
pub mod job;

/// Labels.
pub mod label;

/// Build agents.
pub mod node;

/// Installed plugins.
pub mod plugin;

/// The build queue.
pub mod queue;

/// Views.
pub mod view;

pub use build::{Artifact, Build};
pub use client::{ClientOptions, Jenkins, ServerInfo};
pub use common::{JenkinsError, Outcome, Refusal, Result};
pub use fingerprint::FingerPrint;
pub use folder::Folder;
pub use job::{BuildKind, FileParameter, InvokeOptions, Job};
pub use label::Label;
pub use node::{Launcher, Node, NodeConfig, SshLauncher};
pub use plugin::Plugins;
pub use queue::{Queue, QueueItem};
pub use resource::Resource;
pub use view::{View, ViewType};
