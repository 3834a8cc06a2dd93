//
//  jenkins-cli
//  api/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Jenkins Client (root handle)
//!
//! [`Jenkins`] is the root of the resource graph. It owns the transport,
//! credential, and CSRF state, and exposes top-level lookups that are thin
//! instantiations of resource handles at well-known paths. Lookups for each
//! resource kind live next to that kind (`job.rs`, `node.rs`, ...) as
//! additional `impl Jenkins` blocks.
//!
//! ## Features
//!
//! - Explicit [`ClientOptions`] validated at construction
//! - Server information including version headers
//! - One-shot CSRF crumb negotiation, cached for the life of the client
//! - Injected [`tracing::Span`] that every request is instrumented with
//!
//! ## Example
//!
//! ```rust,no_run
//! use jenkins_cli::api::{ClientOptions, Jenkins};
//! use jenkins_cli::auth::Credential;
//!
//! # async fn example() -> jenkins_cli::api::common::Result<()> {
//! let options = ClientOptions::new("https://ci.example.com")
//!     .with_credential(Credential::token("admin", "11aa22bb"));
//! let mut jenkins = Jenkins::new(options)?;
//! jenkins.init().await?;
//!
//! let job = jenkins.get_job("nightly", &[] as &[&str]).await?;
//! println!("{:?}", job.name());
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, info_span, Span};

use super::common::{null_default, GeneralObject, InnerJob, JenkinsError, Result, ViewData};
use super::requester::{Crumb, Requester, Response};
use crate::auth::Credential;

/// Default base URL used when none is configured.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Path of the CSRF crumb issuer.
pub const CRUMB_ISSUER_PATH: &str = "/crumbIssuer";

/// Construction options for a [`Jenkins`] client.
///
/// Every optional setting is a named field; there are no positional
/// "variadic" options. Transport concerns (TLS verification, timeout,
/// proxy) are handed to `reqwest` untouched.
#[derive(Debug, Clone)]
pub struct ClientOptions {
    /// Base URL of the controller, e.g. `https://ci.example.com/jenkins`.
    pub base_url: String,
    /// Credential attached to every request.
    pub credential: Option<Credential>,
    /// Skip TLS certificate verification.
    pub accept_invalid_certs: bool,
    /// Overall request timeout; `None` leaves the transport default.
    pub timeout: Option<Duration>,
    /// Proxy URL for all requests.
    pub proxy: Option<String>,
    /// User-Agent header.
    pub user_agent: String,
    /// Span every request is recorded under. Defaults to `jenkins{base_url}`.
    pub span: Option<Span>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self::new(DEFAULT_BASE_URL)
    }
}

impl ClientOptions {
    /// Creates options for the given base URL with everything else defaulted.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            credential: None,
            accept_invalid_certs: false,
            timeout: None,
            proxy: None,
            user_agent: format!("jk/{}", crate::VERSION),
            span: None,
        }
    }

    /// Sets the credential.
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = Some(credential);
        self
    }

    /// Disables TLS certificate verification.
    pub fn accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Routes all requests through a proxy.
    pub fn with_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.proxy = Some(proxy.into());
        self
    }

    /// Records requests under the given span instead of the default one.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = Some(span);
        self
    }

    /// Validates the options and returns the normalized base URL.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Config`] if the base URL is not an absolute
    /// http(s) URL or the proxy URL does not parse.
    pub fn validate(&self) -> Result<String> {
        let parsed = url::Url::parse(&self.base_url)
            .map_err(|e| JenkinsError::Config(format!("invalid base URL {}: {}", self.base_url, e)))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(JenkinsError::Config(format!(
                "unsupported scheme {} in {}",
                parsed.scheme(),
                self.base_url
            )));
        }
        if let Some(proxy) = &self.proxy {
            url::Url::parse(proxy)
                .map_err(|e| JenkinsError::Config(format!("invalid proxy URL {}: {}", proxy, e)))?;
        }
        Ok(self.base_url.trim_end_matches('/').to_string())
    }
}

/// Version information Jenkins reports in response headers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServerVersion {
    /// `X-Jenkins`
    pub jenkins: Option<String>,
    /// `X-Hudson`
    pub hudson: Option<String>,
    /// `X-Jenkins-CLI-Port`
    pub jenkins_cli_port: Option<String>,
    /// `X-Jenkins-CLI-Port2`
    pub jenkins_cli_port2: Option<String>,
    /// `X-Hudson-CLI-Port`
    pub hudson_cli_port: Option<String>,
}

impl ServerVersion {
    fn from_response(response: &Response) -> Self {
        let header = |name| response.header(name).map(str::to_string);
        Self {
            jenkins: header("X-Jenkins"),
            hudson: header("X-Hudson"),
            jenkins_cli_port: header("X-Jenkins-CLI-Port"),
            jenkins_cli_port2: header("X-Jenkins-CLI-Port2"),
            hudson_cli_port: header("X-Hudson-CLI-Port"),
        }
    }
}

/// The controller's root document (`/api/json`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerInfo {
    /// Java class of the root object.
    #[serde(rename = "_class", default)]
    pub class: String,
    /// Labels assigned to the built-in node.
    #[serde(default)]
    pub assigned_labels: Vec<GeneralObject>,
    /// System message.
    #[serde(default)]
    pub description: Option<String>,
    /// Top-level items.
    #[serde(default)]
    pub jobs: Vec<InnerJob>,
    /// Usage mode of the built-in node (`NORMAL` or `EXCLUSIVE`).
    #[serde(default, deserialize_with = "null_default")]
    pub mode: String,
    /// Description of the built-in node.
    #[serde(default, deserialize_with = "null_default")]
    pub node_description: String,
    /// Name of the built-in node (empty string on most controllers).
    #[serde(default, deserialize_with = "null_default")]
    pub node_name: String,
    /// Executors on the built-in node.
    #[serde(default)]
    pub num_executors: i64,
    /// The default view.
    #[serde(default)]
    pub primary_view: Option<ViewData>,
    /// Whether the controller is preparing for shutdown.
    #[serde(default)]
    pub quieting_down: bool,
    /// TCP port for inbound agents (`-1` when disabled).
    #[serde(default)]
    pub slave_agent_port: i64,
    /// Whether CSRF protection is enabled.
    #[serde(default)]
    pub use_crumbs: bool,
    /// Whether security is enabled.
    #[serde(default)]
    pub use_security: bool,
    /// All top-level views.
    #[serde(default)]
    pub views: Vec<ViewData>,
    /// Version headers of the response the document came from.
    #[serde(skip)]
    pub version: ServerVersion,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CrumbResponse {
    crumb: String,
    crumb_request_field: String,
}

/// Root handle of the Jenkins resource graph.
///
/// Resource handles borrow the client (`Job<'a>` holds `&'a Jenkins`), so
/// the client always outlives every handle derived from it. Operations that
/// change client state (`init`, `configure_csrf`) take `&mut self` and must
/// therefore run before handles are shared across tasks.
#[derive(Debug)]
pub struct Jenkins {
    requester: Requester,
    base_url: String,
    raw: Option<ServerInfo>,
    has_csrf_protection: bool,
}

impl Jenkins {
    /// Creates a client from validated options.
    ///
    /// No request is sent; call [`init`](Self::init) to check the connection
    /// and negotiate CSRF protection.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Config`] for invalid options or
    /// [`JenkinsError::Transport`] if the HTTP client cannot be built.
    pub fn new(options: ClientOptions) -> Result<Self> {
        let base_url = options.validate()?;

        let mut builder = Client::builder()
            .user_agent(options.user_agent.clone())
            .danger_accept_invalid_certs(options.accept_invalid_certs);
        if let Some(timeout) = options.timeout {
            builder = builder.timeout(timeout);
        }
        if let Some(proxy) = &options.proxy {
            builder = builder.proxy(reqwest::Proxy::all(proxy)?);
        }

        let span = options
            .span
            .unwrap_or_else(|| info_span!("jenkins", base_url = %base_url));

        Ok(Self {
            requester: Requester::new(builder.build()?, base_url.clone(), options.credential, span),
            base_url,
            raw: None,
            has_csrf_protection: false,
        })
    }

    /// The requester shared by every handle of this client.
    pub fn requester(&self) -> &Requester {
        &self.requester
    }

    /// Normalized base URL (no trailing slash).
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The last fetched root document.
    pub fn raw(&self) -> Option<&ServerInfo> {
        self.raw.as_ref()
    }

    /// The `X-Jenkins` version of the last fetched root document.
    pub fn version(&self) -> Option<&str> {
        self.raw.as_ref().and_then(|r| r.version.jenkins.as_deref())
    }

    /// Whether a crumb is being attached to requests.
    pub fn has_csrf_protection(&self) -> bool {
        self.has_csrf_protection
    }

    /// Checks the connection and negotiates CSRF protection.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::NotFound`] if the root document does not
    /// answer 200, or any transport/decode error on the way.
    pub async fn init(&mut self) -> Result<&ServerInfo> {
        let status = self.poll().await?;
        if status != 200 {
            return Err(JenkinsError::NotFound {
                resource: self.base_url.clone(),
                status,
            });
        }
        self.configure_csrf().await?;
        self.snapshot()
    }

    /// Fetches the root document into the client's snapshot.
    pub async fn poll(&mut self) -> Result<u16> {
        let response = self.requester.get_json("/", &[]).await?;
        if response.is_ok() {
            let mut info: ServerInfo = response.json()?;
            info.version = ServerVersion::from_response(&response);
            self.raw = Some(info);
        }
        Ok(response.status)
    }

    /// Fetches the root document without touching the snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::NotFound`] on a non-200 status.
    pub async fn info(&self) -> Result<ServerInfo> {
        let response = self.requester.get_json("/", &[]).await?;
        if !response.is_ok() {
            return Err(JenkinsError::NotFound {
                resource: self.base_url.clone(),
                status: response.status,
            });
        }
        let mut info: ServerInfo = response.json()?;
        info.version = ServerVersion::from_response(&response);
        Ok(info)
    }

    /// Negotiates the CSRF crumb once and caches it on the requester.
    ///
    /// - Root reports `useCrumbs = false`: protection off, no header.
    /// - Crumb issuer answers anything but 200, or cannot be reached:
    ///   treated as protection off.
    /// - Otherwise the `{crumbRequestField: crumb}` header is attached to
    ///   every subsequent request.
    ///
    /// Call again to renegotiate an expired crumb; nothing does so
    /// automatically.
    ///
    /// # Returns
    ///
    /// Whether CSRF protection ended up enabled.
    pub async fn configure_csrf(&mut self) -> Result<bool> {
        if self.raw.is_none() {
            self.poll().await?;
        }
        let use_crumbs = self.raw.as_ref().map(|r| r.use_crumbs).unwrap_or(false);

        self.requester.set_crumb(None);
        self.has_csrf_protection = false;
        if !use_crumbs {
            debug!("controller does not use crumbs");
            return Ok(false);
        }

        let response = match self.requester.get_json(CRUMB_ISSUER_PATH, &[]).await {
            Ok(response) if response.is_ok() => response,
            Ok(response) => {
                debug!(status = response.status, "crumb issuer refused, continuing without crumbs");
                return Ok(false);
            }
            Err(err) => {
                debug!(error = %err, "crumb issuer unreachable, continuing without crumbs");
                return Ok(false);
            }
        };
        let settings: CrumbResponse = response.json()?;
        self.requester.set_crumb(Some(Crumb {
            field: settings.crumb_request_field,
            value: settings.crumb,
        }));
        self.has_csrf_protection = true;
        Ok(true)
    }

    fn snapshot(&self) -> Result<&ServerInfo> {
        self.raw.as_ref().ok_or_else(|| JenkinsError::NotPolled {
            base: "/".to_string(),
        })
    }
}

/// Serializes a flat mapping into the `json` form field Jenkins' stapler expects.
pub(crate) fn make_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
}
