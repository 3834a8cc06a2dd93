//
//  jenkins-cli
//  api/requester.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/14.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Construction and Decoding
//!
//! The [`Requester`] turns a `(method, path, query, body)` tuple into an HTTP
//! exchange against the configured Jenkins base URL and hands back a
//! [`Response`] holding the status, headers, and raw body. Decoding into a
//! typed target is a separate step so that a transport failure
//! ([`JenkinsError::Transport`]) is never confused with a body that did not
//! match ([`JenkinsError::Decode`]).
//!
//! ## Body encodings
//!
//! - [`Body::Empty`] - bare POST (enable, disable, doDelete, ...)
//! - [`Body::Form`] - `application/x-www-form-urlencoded`
//! - [`Body::Xml`] - `application/xml`, used for job configuration uploads
//! - [`Body::Multipart`] - file parameters when triggering a build
//!
//! ## Headers
//!
//! Every request carries the configured [`Credential`] and, once negotiated,
//! the CSRF crumb header. The crumb is stored on the requester and reused
//! until it is explicitly renegotiated.

use std::path::{Path, PathBuf};

use reqwest::header::{HeaderMap, CONTENT_TYPE};
use reqwest::multipart;
use reqwest::{Client, Method};
use serde::de::DeserializeOwned;
use tracing::{debug, Instrument, Span};

use super::common::{JenkinsError, Result};
use crate::auth::Credential;

/// Suffix Jenkins serves the JSON rendition of any model object under.
pub const API_JSON_SUFFIX: &str = "api/json";

/// A CSRF crumb header, e.g. `Jenkins-Crumb: 4d1f...`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Crumb {
    /// Header name reported by the crumb issuer (`crumbRequestField`).
    pub field: String,
    /// Header value (`crumb`).
    pub value: String,
}

/// Request body encodings supported by the requester.
#[derive(Debug)]
pub enum Body {
    /// No body.
    Empty,
    /// Form-url-encoded key/value pairs.
    Form(Vec<(String, String)>),
    /// Raw XML document.
    Xml(String),
    /// Multipart form with file attachments.
    Multipart(multipart::Form),
}

/// A file attached to a multipart request.
#[derive(Debug, Clone)]
pub struct Attachment {
    /// Multipart part name (e.g. `file0`).
    pub part: String,
    /// Local path of the file to upload.
    pub path: PathBuf,
}

/// Status, headers, and raw body of a completed exchange.
#[derive(Debug, Clone)]
pub struct Response {
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// Raw response body.
    pub body: Vec<u8>,
    path: String,
}

impl Response {
    /// Returns `true` for a 200 response, the universal success sentinel.
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }

    /// Returns a header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Returns the body as text, replacing invalid UTF-8 sequences.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decodes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_slice(&self.body)
            .map_err(|e| JenkinsError::decode(format!("JSON from {}", self.path), e))
    }

    /// Decodes the body as XML.
    pub fn xml<T: DeserializeOwned>(&self) -> Result<T> {
        let text = std::str::from_utf8(&self.body)
            .map_err(|e| JenkinsError::decode(format!("XML from {}", self.path), e))?;
        quick_xml::de::from_str(text)
            .map_err(|e| JenkinsError::decode(format!("XML from {}", self.path), e))
    }
}

/// Builds and sends HTTP requests on behalf of every resource handle.
///
/// The requester owns the transport (`reqwest::Client`), the credential,
/// and the cached CSRF crumb. It performs no retries and caches no response
/// bodies.
#[derive(Debug, Clone)]
pub struct Requester {
    http: Client,
    base_url: String,
    credential: Option<Credential>,
    crumb: Option<Crumb>,
    span: Span,
}

impl Requester {
    /// Creates a requester for `base_url` (no trailing slash).
    pub fn new(http: Client, base_url: String, credential: Option<Credential>, span: Span) -> Self {
        Self {
            http,
            base_url,
            credential,
            crumb: None,
            span,
        }
    }

    /// The base URL every path is resolved against.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The crumb currently attached to requests, if any.
    pub fn crumb(&self) -> Option<&Crumb> {
        self.crumb.as_ref()
    }

    /// Replaces the cached crumb.
    pub fn set_crumb(&mut self, crumb: Option<Crumb>) {
        self.crumb = crumb;
    }

    /// Resolves a server-relative path against the base URL.
    pub fn url_for(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{}", self.base_url, path)
        } else {
            format!("{}/{}", self.base_url, path)
        }
    }

    /// Sends a request and collects the status, headers, and body.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Transport`] if the exchange fails or the body
    /// cannot be read. Non-success statuses are not errors at this level.
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        query: &[(&str, &str)],
        body: Body,
    ) -> Result<Response> {
        let url = self.url_for(path);
        let mut request = self.http.request(method.clone(), &url);

        if !query.is_empty() {
            request = request.query(query);
        }
        if let Some(credential) = &self.credential {
            request = credential.apply_to_request(request);
        }
        if let Some(crumb) = &self.crumb {
            request = request.header(crumb.field.as_str(), crumb.value.as_str());
        }

        request = match body {
            Body::Empty => request,
            Body::Form(fields) => request.form(&fields),
            Body::Xml(xml) => request
                .header(CONTENT_TYPE, "application/xml; charset=utf-8")
                .body(xml),
            Body::Multipart(form) => request.multipart(form),
        };

        let exchange = async {
            let response = request.send().await?;
            let status = response.status().as_u16();
            let headers = response.headers().clone();
            let body = response.bytes().await?.to_vec();
            debug!(%method, path, status, "jenkins request");
            Ok::<_, JenkinsError>(Response {
                status,
                headers,
                body,
                path: path.to_string(),
            })
        };

        exchange.instrument(self.span.clone()).await
    }

    /// GETs the JSON rendition of the object at `path` (`<path>/api/json`).
    pub async fn get_json(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.send(Method::GET, &json_endpoint(path), query, Body::Empty)
            .await
    }

    /// GETs an XML document verbatim (e.g. `<job>/config.xml`).
    pub async fn get_xml(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.send(Method::GET, path, query, Body::Empty).await
    }

    /// GETs any path verbatim.
    pub async fn get(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.send(Method::GET, path, query, Body::Empty).await
    }

    /// POSTs without a body.
    pub async fn post(&self, path: &str, query: &[(&str, &str)]) -> Result<Response> {
        self.send(Method::POST, path, query, Body::Empty).await
    }

    /// POSTs a form-url-encoded body.
    pub async fn post_form<K, V>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        fields: &[(K, V)],
    ) -> Result<Response>
    where
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let fields = fields
            .iter()
            .map(|(k, v)| (k.as_ref().to_string(), v.as_ref().to_string()))
            .collect();
        self.send(Method::POST, path, query, Body::Form(fields))
            .await
    }

    /// POSTs an XML document.
    pub async fn post_xml(
        &self,
        path: &str,
        query: &[(&str, &str)],
        xml: &str,
    ) -> Result<Response> {
        self.send(Method::POST, path, query, Body::Xml(xml.to_string()))
            .await
    }

    /// POSTs a multipart form made of text fields plus file attachments.
    ///
    /// # Errors
    ///
    /// Returns [`JenkinsError::Io`] if an attachment cannot be read.
    pub async fn post_files(
        &self,
        path: &str,
        query: &[(&str, &str)],
        fields: &[(String, String)],
        attachments: &[Attachment],
    ) -> Result<Response> {
        let mut form = multipart::Form::new();
        for (name, value) in fields {
            form = form.text(name.clone(), value.clone());
        }
        for attachment in attachments {
            let data = tokio::fs::read(&attachment.path).await?;
            let part = multipart::Part::bytes(data).file_name(file_name(&attachment.path));
            form = form.part(attachment.part.clone(), part);
        }
        self.send(Method::POST, path, query, Body::Multipart(form))
            .await
    }
}

/// Appends the JSON API suffix to an object path.
pub fn json_endpoint(path: &str) -> String {
    if path.ends_with('/') {
        format!("{}{}", path, API_JSON_SUFFIX)
    } else {
        format!("{}/{}", path, API_JSON_SUFFIX)
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "upload".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn requester(base: String) -> Requester {
        Requester::new(Client::new(), base, None, Span::none())
    }

    #[test]
    fn test_json_endpoint() {
        assert_eq!(json_endpoint("/"), "/api/json");
        assert_eq!(json_endpoint("/job/foo"), "/job/foo/api/json");
        assert_eq!(json_endpoint("/job/foo/"), "/job/foo/api/json");
    }

    #[tokio::test]
    async fn test_decode_error_is_distinct_from_transport() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/foo/api/json")
            .with_status(200)
            .with_body("<html>not json</html>")
            .create_async()
            .await;

        let response = requester(server.url())
            .get_json("/job/foo", &[])
            .await
            .unwrap();
        let err = response.json::<serde_json::Value>().unwrap_err();
        assert!(matches!(err, JenkinsError::Decode { .. }));
    }

    #[tokio::test]
    async fn test_transport_error() {
        // nothing listens on port 9 in the test environment
        let err = requester("http://127.0.0.1:9".to_string())
            .get_json("/", &[])
            .await
            .unwrap_err();
        assert!(matches!(err, JenkinsError::Transport(_)));
    }

    #[tokio::test]
    async fn test_credential_and_crumb_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/job/foo/enable")
            .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
            .match_header("Jenkins-Crumb", "abc")
            .with_status(200)
            .create_async()
            .await;

        let mut requester = Requester::new(
            Client::new(),
            server.url(),
            Some(Credential::basic("admin", "secret")),
            Span::none(),
        );
        requester.set_crumb(Some(Crumb {
            field: "Jenkins-Crumb".to_string(),
            value: "abc".to_string(),
        }));

        let response = requester.post("/job/foo/enable", &[]).await.unwrap();
        assert!(response.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_query_and_form() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/job/foo/doRename")
            .match_query(Matcher::UrlEncoded("depth".into(), "1".into()))
            .match_body(Matcher::UrlEncoded("newName".into(), "bar baz".into()))
            .with_status(200)
            .create_async()
            .await;

        requester(server.url())
            .post_form("/job/foo/doRename", &[("depth", "1")], &[("newName", "bar baz")])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_xml_decode() {
        #[derive(serde::Deserialize)]
        struct Project {
            description: String,
        }

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/job/foo/config.xml")
            .with_status(200)
            .with_body("<project><description>nightly</description></project>")
            .create_async()
            .await;

        let response = requester(server.url())
            .get_xml("/job/foo/config.xml", &[])
            .await
            .unwrap();
        let project: Project = response.xml().unwrap();
        assert_eq!(project.description, "nightly");
    }
}
