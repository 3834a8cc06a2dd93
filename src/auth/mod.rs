//
//  jenkins-cli
//  auth/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/01/12.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Authentication Module
//!
//! Jenkins accepts three kinds of credentials on its remote access API:
//!
//! - **Basic Authentication**: username and password.
//! - **API Token**: username and a per-user API token, sent as HTTP Basic.
//! - **Bearer Token**: an opaque token issued by an SSO/OIDC plugin.
//!
//! The credential is opaque to the rest of the client: it is handed to the
//! [`Jenkins`](crate::api::Jenkins) client at construction and applied to
//! every outgoing request by the requester.
//!
//! ## Example
//!
//! ```rust
//! use jenkins_cli::auth::Credential;
//!
//! let credential = Credential::token("admin", "11aa22bb33cc");
//! assert_eq!(credential.username(), Some("admin"));
//! ```

use reqwest::RequestBuilder;

/// Credentials attached to every request sent to a Jenkins controller.
///
/// # Variants
///
/// - `Basic`: Standard HTTP Basic authentication with username and password.
/// - `Token`: Username plus API token (Jenkins expects this as HTTP Basic).
/// - `Bearer`: Token sent in an `Authorization: Bearer` header.
#[derive(Clone)]
pub enum Credential {
    /// Basic HTTP authentication with username and password.
    Basic {
        /// The username for authentication.
        username: String,
        /// The password for authentication.
        password: String,
    },
    /// Jenkins API token, generated from the user's configure page.
    Token {
        /// The user owning the token.
        username: String,
        /// The API token.
        token: String,
    },
    /// Bearer token authentication.
    Bearer {
        /// The bearer token string.
        token: String,
    },
}

impl Credential {
    /// Creates a username/password credential.
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Creates a username/API token credential.
    pub fn token(username: impl Into<String>, token: impl Into<String>) -> Self {
        Self::Token {
            username: username.into(),
            token: token.into(),
        }
    }

    /// Creates a bearer token credential.
    pub fn bearer(token: impl Into<String>) -> Self {
        Self::Bearer {
            token: token.into(),
        }
    }

    /// Returns the username, if the credential carries one.
    pub fn username(&self) -> Option<&str> {
        match self {
            Self::Basic { username, .. } | Self::Token { username, .. } => Some(username),
            Self::Bearer { .. } => None,
        }
    }

    /// Applies the credential to an HTTP request.
    ///
    /// # Parameters
    ///
    /// - `request`: The [`RequestBuilder`] to add the `Authorization` header to.
    ///
    /// # Returns
    ///
    /// The modified [`RequestBuilder`].
    pub fn apply_to_request(&self, request: RequestBuilder) -> RequestBuilder {
        match self {
            Self::Basic { username, password } => request.basic_auth(username, Some(password)),
            Self::Token { username, token } => request.basic_auth(username, Some(token)),
            Self::Bearer { token } => request.bearer_auth(token),
        }
    }
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // secrets stay out of logs
        match self {
            Self::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Token { username, .. } => f
                .debug_struct("Token")
                .field("username", username)
                .finish_non_exhaustive(),
            Self::Bearer { .. } => f.debug_struct("Bearer").finish_non_exhaustive(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_hides_secrets() {
        let rendered = format!("{:?}", Credential::basic("admin", "hunter2"));
        assert!(rendered.contains("admin"));
        assert!(!rendered.contains("hunter2"));

        let rendered = format!("{:?}", Credential::bearer("s3cret"));
        assert!(!rendered.contains("s3cret"));
    }

    #[test]
    fn test_username() {
        assert_eq!(Credential::token("ci", "t").username(), Some("ci"));
        assert_eq!(Credential::bearer("t").username(), None);
    }
}
