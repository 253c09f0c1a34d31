// ABOUTME: The five protocol endpoints and their shared parsing helpers
// ABOUTME: Client credential extraction (Basic or body) and token-hint parsing
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

//! # Endpoints
//!
//! Each endpoint is an independent state machine exposing one operation,
//! `execute(request, response)`. A pipeline runs parse → authenticate →
//! authorize → mutate state → shape response; every error is caught once
//! at the endpoint's outer boundary, written into the response, and then
//! returned to the host.

/// RFC 6750 bearer authentication for protected resources
pub mod authenticate;

/// RFC 6749 authorization endpoint (code and implicit response types)
pub mod authorize;

/// RFC 7662 token introspection
pub mod introspect;

/// RFC 7009 token revocation
pub mod revoke;

/// RFC 6749 token endpoint
pub mod token;

use crate::errors::OAuthError;
use crate::request::Request;
use crate::validators;
use base64::{engine::general_purpose, Engine as _};

/// Client credentials recovered from a request.
#[derive(Debug, Clone)]
pub(crate) struct ClientCredentials {
    pub client_id: String,
    pub client_secret: Option<String>,
}

/// Decode an HTTP Basic `Authorization` header into id and secret.
///
/// A non-Basic scheme is not ours to interpret; `Ok(None)` lets the
/// caller fall back to body credentials. A Basic header that fails to
/// decode is a malformed request.
fn parse_basic_credentials(value: &str) -> Result<Option<(String, String)>, OAuthError> {
    let Some((scheme, payload)) = value.split_once(' ') else {
        return Ok(None);
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(None);
    }

    let decoded = general_purpose::STANDARD
        .decode(payload.trim())
        .map_err(|_| OAuthError::invalid_request("invalid authorization header"))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| OAuthError::invalid_request("invalid authorization header"))?;
    let (client_id, client_secret) = decoded
        .split_once(':')
        .ok_or_else(|| OAuthError::invalid_request("invalid authorization header"))?;

    Ok(Some((client_id.to_owned(), client_secret.to_owned())))
}

/// Extract client credentials: HTTP Basic preferred, body fields otherwise.
pub(crate) fn client_credentials(
    request: &Request,
    secret_required: bool,
) -> Result<ClientCredentials, OAuthError> {
    let basic = match request.header("authorization") {
        Some(header) => parse_basic_credentials(header)?,
        None => None,
    };

    let credentials = match basic {
        Some((client_id, client_secret)) => ClientCredentials {
            client_id,
            client_secret: Some(client_secret),
        },
        None => ClientCredentials {
            client_id: request.body_param("client_id").unwrap_or_default().to_owned(),
            client_secret: request.body_param("client_secret").map(str::to_owned),
        },
    };

    if credentials.client_id.is_empty() {
        return Err(OAuthError::invalid_request("missing parameter: client_id"));
    }
    if !validators::is_vschar(&credentials.client_id) {
        return Err(OAuthError::invalid_request("invalid parameter: client_id"));
    }
    match &credentials.client_secret {
        None if secret_required => {
            return Err(OAuthError::invalid_request("missing parameter: client_secret"));
        }
        Some(secret) if !validators::is_vschar(secret) => {
            return Err(OAuthError::invalid_request("invalid parameter: client_secret"));
        }
        _ => {}
    }

    Ok(credentials)
}

/// Which token store a `token_hint` points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TokenHint {
    AccessToken,
    RefreshToken,
}

/// Parse the shared introspection/revocation request shape: POST,
/// form-encoded, client credentials, and the `token`/`token_hint` pair.
pub(crate) fn parse_token_hint_request(
    request: &Request,
    secret_required: bool,
) -> Result<(ClientCredentials, String, TokenHint), OAuthError> {
    if request.method() != "POST" {
        return Err(OAuthError::invalid_request("method must be POST"));
    }
    if !request.is_form_encoded() {
        return Err(OAuthError::invalid_request(
            "request content must be application/x-www-form-urlencoded",
        ));
    }

    let credentials = client_credentials(request, secret_required)?;

    let token = request
        .body_param("token")
        .filter(|t| !t.is_empty())
        .ok_or_else(|| OAuthError::invalid_request("missing parameter: token"))?;

    let hint = match request.body_param("token_hint") {
        None => return Err(OAuthError::invalid_request("missing parameter: token_hint")),
        Some("access_token") => TokenHint::AccessToken,
        Some("refresh_token") => TokenHint::RefreshToken,
        Some(other) => {
            return Err(OAuthError::unsupported_token_type(format!(
                "unsupported token type: {other}"
            )))
        }
    };

    Ok((credentials, token.to_owned(), hint))
}
