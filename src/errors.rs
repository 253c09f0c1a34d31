// ABOUTME: Error taxonomy for the OAuth 2.0 engine
// ABOUTME: Maps named error kinds to RFC wire codes, HTTP statuses, and descriptions
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

//! # Error taxonomy
//!
//! Every failure the engine produces is a tagged [`OAuthError`]: an
//! [`ErrorKind`] (the RFC-defined `error` code), an HTTP status, and a
//! human-readable description. Parse-layer violations raise the precise
//! kind; Model contract violations raise `server_error`; non-OAuth
//! errors leaking out of the Model are wrapped as `server_error` at the
//! endpoint boundary.

use serde_json::{Map, Value};
use thiserror::Error;

/// Named error kinds defined by RFC 6749 §5.2, RFC 6750 §3.1 and RFC 7009 §2.2.1.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Missing or malformed parameter, or a duplicated authentication method
    InvalidRequest,
    /// Client authentication failed
    InvalidClient,
    /// Authorization code, refresh token, or resource-owner credentials invalid or expired
    InvalidGrant,
    /// Requested scope rejected by the Model
    InvalidScope,
    /// Bearer access token invalid or expired
    InvalidToken,
    /// Client is not permitted to use this grant or response type
    UnauthorizedClient,
    /// No bearer credentials were presented to a protected resource
    UnauthorizedRequest,
    /// `grant_type` is not in the allowed set
    UnsupportedGrantType,
    /// `response_type` is neither `code` nor `token`
    UnsupportedResponseType,
    /// Introspection/revocation `token_hint` names an unknown token type
    UnsupportedTokenType,
    /// The resource owner denied the authorization request
    AccessDenied,
    /// Bearer token lacks the scope required by the resource
    InsufficientScope,
    /// Model contract violation or wrapped non-OAuth failure
    ServerError,
    /// Programming error in the host application
    InvalidArgument,
}

impl ErrorKind {
    /// The wire `error` code for this kind.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::InvalidRequest => "invalid_request",
            Self::InvalidClient => "invalid_client",
            Self::InvalidGrant => "invalid_grant",
            Self::InvalidScope => "invalid_scope",
            Self::InvalidToken => "invalid_token",
            Self::UnauthorizedClient => "unauthorized_client",
            Self::UnauthorizedRequest => "unauthorized_request",
            Self::UnsupportedGrantType => "unsupported_grant_type",
            Self::UnsupportedResponseType => "unsupported_response_type",
            Self::UnsupportedTokenType => "unsupported_token_type",
            Self::AccessDenied => "access_denied",
            Self::InsufficientScope => "insufficient_scope",
            Self::ServerError => "server_error",
            Self::InvalidArgument => "invalid_argument",
        }
    }

    /// The default HTTP status for this kind.
    ///
    /// `invalid_client` defaults to 400; endpoints raise it to 401 when
    /// the client presented credentials through the `Authorization`
    /// header (RFC 6749 §5.2).
    #[must_use]
    pub const fn status(self) -> u16 {
        match self {
            Self::InvalidRequest
            | Self::InvalidClient
            | Self::InvalidGrant
            | Self::InvalidScope
            | Self::UnauthorizedClient
            | Self::UnsupportedGrantType
            | Self::UnsupportedResponseType
            | Self::UnsupportedTokenType
            | Self::AccessDenied => 400,
            Self::InvalidToken | Self::UnauthorizedRequest => 401,
            Self::InsufficientScope => 403,
            Self::ServerError | Self::InvalidArgument => 500,
        }
    }
}

/// A tagged protocol error: kind, HTTP status, and description.
#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct OAuthError {
    kind: ErrorKind,
    status: u16,
    message: String,
}

impl OAuthError {
    /// Create an error of the given kind with the kind's default status.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            status: kind.status(),
            message: message.into(),
        }
    }

    /// Create an `invalid_request` error.
    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidRequest, message)
    }

    /// Create an `invalid_client` error.
    pub fn invalid_client(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidClient, message)
    }

    /// Create an `invalid_grant` error.
    pub fn invalid_grant(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidGrant, message)
    }

    /// Create an `invalid_scope` error.
    pub fn invalid_scope(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidScope, message)
    }

    /// Create an `invalid_token` error.
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidToken, message)
    }

    /// Create an `unauthorized_client` error.
    pub fn unauthorized_client(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnauthorizedClient, message)
    }

    /// Create an `unauthorized_request` error.
    pub fn unauthorized_request(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnauthorizedRequest, message)
    }

    /// Create an `unsupported_grant_type` error.
    pub fn unsupported_grant_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedGrantType, message)
    }

    /// Create an `unsupported_response_type` error.
    pub fn unsupported_response_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedResponseType, message)
    }

    /// Create an `unsupported_token_type` error.
    pub fn unsupported_token_type(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::UnsupportedTokenType, message)
    }

    /// Create an `access_denied` error.
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AccessDenied, message)
    }

    /// Create an `insufficient_scope` error.
    pub fn insufficient_scope(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InsufficientScope, message)
    }

    /// Create a `server_error`.
    pub fn server_error(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::ServerError, message)
    }

    /// Create an `invalid_argument` error for host programming mistakes.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// The error kind.
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// The wire `error` code.
    #[must_use]
    pub const fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// The HTTP status the response should carry.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// The human-readable description.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Override the HTTP status while keeping the kind and message.
    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = status;
        self
    }

    /// The `{error, error_description}` JSON body for this error.
    #[must_use]
    pub fn body(&self) -> Map<String, Value> {
        let mut body = Map::new();
        body.insert("error".to_owned(), Value::String(self.code().to_owned()));
        body.insert(
            "error_description".to_owned(),
            Value::String(self.message.clone()),
        );
        body
    }
}
