//
//  jenkins-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Jenkins CLI Library
//!
//! A typed, async client for the Jenkins remote access API, plus the `jk`
//! command-line tool built on top of it.
//!
//! ## Overview
//!
//! Jenkins exposes every object (the controller, jobs, builds, nodes,
//! views, folders, the queue) as a JSON document under `<path>/api/json`.
//! This library wraps each of them in a lightweight handle that knows its
//! path, fetches its document on demand, and offers navigation and actions
//! on top of the last fetched snapshot.
//!
//! ## Features
//!
//! - **Lazy handles**: every resource is polled explicitly, never cached
//! - **Build triggering**: plain, parameterized, and file-upload builds
//! - **CSRF support**: crumbs negotiated once and sent on every request
//! - **Node control**: take agents offline, bring them back, create and delete them
//! - **Scriptable CLI**: tables for humans, `--json` for pipelines
//!
//! ## Module Structure
//!
//! - [`api`]: The Jenkins client and resource handles
//! - [`auth`]: Credentials
//! - [`cli`]: Command-line interface definitions using clap
//! - [`config`]: Configuration file management
//! - [`context`]: Server selection for the CLI
//! - [`output`]: Output formatting (Table, JSON)
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use jenkins_cli::api::{ClientOptions, Jenkins, Outcome};
//! use jenkins_cli::auth::Credential;
//!
//! # async fn demo() -> jenkins_cli::api::Result<()> {
//! let mut jenkins = Jenkins::new(
//!     ClientOptions::new("https://ci.example.com")
//!         .with_credential(Credential::token("admin", "11aa22bb")),
//! )?;
//! jenkins.init().await?;
//!
//! let mut job = jenkins.get_job("app", &["team"]).await?;
//! match job.invoke_simple(&[("BRANCH", "main")]).await? {
//!     Outcome::Done(queue_id) => println!("queued as {}", queue_id),
//!     Outcome::Refused(reason) => println!("skipped: {}", reason),
//! }
//! # Ok(())
//! # }
//! ```

/// Jenkins remote API client.
///
/// The [`api::Jenkins`] root handle and one module per resource kind
/// (jobs, builds, nodes, views, folders, queue, labels, plugins,
/// fingerprints).
pub mod api;

/// Authentication credentials.
///
/// Basic authentication, Jenkins API tokens, and bearer tokens.
pub mod auth;

/// Command-line interface definitions.
///
/// Contains all `jk` commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Configuration file management.
///
/// Manages the CLI's configuration stored in platform-specific locations:
/// - Linux: `~/.config/jk/config.toml`
/// - macOS: `~/Library/Application Support/jk/config.toml`
/// - Windows: `%APPDATA%\jk\config.toml`
pub mod config;

/// Server selection.
///
/// Combines command-line flags, environment variables, and the
/// configuration file into the options of one connection.
pub mod context;

/// Output formatting for different modes.
///
/// Provides formatters for:
/// - Table format: Human-readable tables for interactive use
/// - JSON format: Structured output for scripting and automation
pub mod output;

/// Re-export of the root API handle.
pub use api::Jenkins;

/// Re-export of the main CLI struct for convenient access.
///
/// # Example
///
/// ```rust,no_run
/// use clap::Parser;
/// use jenkins_cli::Cli;
///
/// let cli = Cli::parse();
/// // Handle cli.command...
/// ```
pub use cli::Cli;

/// Re-export of the configuration struct.
pub use config::Config;

/// Application name constant.
///
/// The name of the CLI binary, used for the configuration directory and
/// the default `User-Agent`.
pub const APP_NAME: &str = "jk";

/// Application version constant.
///
/// Populated at compile time from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// Values are powers of two, leaving room for combining them in scripts.
///
/// # Example
///
/// ```rust
/// use jenkins_cli::exit_codes;
///
/// let err = anyhow::anyhow!("boom");
/// assert_eq!(exit_codes::from_error(&err), exit_codes::ERROR);
/// ```
pub mod exit_codes {
    use crate::api::JenkinsError;

    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// Network failures, unexpected responses, and anything not covered
    /// by a more specific code.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    ///
    /// Emitted by clap when parsing fails.
    pub const USAGE: i32 = 2;

    /// Authentication required or failed.
    ///
    /// The controller answered 401 or 403.
    pub const AUTH_ERROR: i32 = 4;

    /// Resource not found.
    ///
    /// A job, build, node, view, or queue item does not exist.
    pub const NOT_FOUND: i32 = 8;

    /// Picks the exit code for an error returned by a command.
    pub fn from_error(err: &anyhow::Error) -> i32 {
        let Some(jenkins) = err.chain().find_map(|e| e.downcast_ref::<JenkinsError>()) else {
            return ERROR;
        };
        match jenkins.status() {
            Some(401) | Some(403) => AUTH_ERROR,
            _ if jenkins.is_not_found() => NOT_FOUND,
            _ => ERROR,
        }
    }

}
