// ABOUTME: Grant flow executors for the token and authorize endpoints
// ABOUTME: Defines the Grant trait, the shared issuing core, and the built-in flows
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

//! # Grant flows
//!
//! One executor per grant type: `authorization_code`,
//! `client_credentials`, `password`, `refresh_token`, and `implicit`
//! (reachable only through the authorize endpoint's `token` response
//! type). All of them draw on [`TokenIssuer`], the shared issuing core:
//! scope validation, generator fallback, expiry computation with
//! per-client overrides, and final persistence.
//!
//! Hosts register extension grants by implementing [`Grant`] and adding
//! the executor to the token endpoint's `extended_grant_types` under its
//! grant-type identifier.

/// `authorization_code` grant: redeem a single-use code for a token
pub mod authorization_code;

/// `client_credentials` grant: a client acting as its own resource owner
pub mod client_credentials;

/// `implicit` grant: access token issued straight from the authorize endpoint
pub mod implicit;

/// The shared token issuing core
pub mod issuer;

/// `password` grant: resource-owner credentials exchanged for a token
pub mod password;

/// `refresh_token` grant: rotate a refresh token into a fresh access token
pub mod refresh_token;

pub use authorization_code::AuthorizationCodeGrant;
pub use client_credentials::ClientCredentialsGrant;
pub use implicit::ImplicitGrant;
pub use issuer::TokenIssuer;
pub use password::PasswordGrant;
pub use refresh_token::RefreshTokenGrant;

use crate::errors::OAuthError;
use crate::models::{Client, Token};
use crate::request::Request;
use crate::response::Response;
use crate::validators;
use async_trait::async_trait;

/// A grant flow executor.
///
/// Given the parsed request and the already-authenticated client,
/// produce a persisted [`Token`]. The token endpoint composes the wire
/// response afterwards; the response handle is available for extension
/// grants that need to add headers of their own.
#[async_trait]
pub trait Grant: Send + Sync {
    /// Run the flow and return the saved token.
    async fn execute(
        &self,
        request: &Request,
        response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, OAuthError>;
}

/// The `scope` body parameter, normalized and shape-checked.
///
/// An empty string counts as absent; a present value must be NQSCHAR.
pub(crate) fn requested_scope(request: &Request) -> Result<Option<String>, OAuthError> {
    match request.body_param("scope").filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(scope) if validators::is_nqschar(scope) => Ok(Some(scope.to_owned())),
        Some(_) => Err(OAuthError::invalid_scope("invalid parameter: scope")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn request_with_scope(scope: &str) -> Request {
        Request::new(
            "POST",
            HashMap::new(),
            HashMap::new(),
            HashMap::from([("scope".to_owned(), scope.to_owned())]),
        )
    }

    #[test]
    fn empty_scope_counts_as_absent() {
        assert_eq!(requested_scope(&request_with_scope("")).unwrap(), None);
    }

    #[test]
    fn malformed_scope_is_rejected() {
        let err = requested_scope(&request_with_scope("read\nwrite")).unwrap_err();
        assert_eq!(err.kind(), crate::errors::ErrorKind::InvalidScope);
    }

    #[test]
    fn valid_scope_passes_through() {
        assert_eq!(
            requested_scope(&request_with_scope("read write")).unwrap(),
            Some("read write".to_owned())
        );
    }
}
