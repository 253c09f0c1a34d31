// ABOUTME: RFC 6750 bearer authentication for inbound protected-resource requests
// ABOUTME: Locates exactly one bearer token, checks expiry and scope, returns the user
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::{ErrorKind, OAuthError};
use crate::model::{model_error, Model};
use crate::models::{Token, User};
use crate::options::AuthenticateOptions;
use crate::request::Request;
use crate::response::Response;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, warn};

/// The bearer authenticate endpoint state machine.
pub struct AuthenticateEndpoint {
    model: Arc<dyn Model>,
}

impl AuthenticateEndpoint {
    /// A bearer authenticate endpoint over the given Model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model }
    }

    /// Authenticate the bearer token on this request.
    ///
    /// On success the scope headers are set (when configured) and the
    /// authenticated [`User`] is returned for the host to act on.
    ///
    /// # Errors
    /// Returns the protocol error after writing the error response. An
    /// `unauthorized_request` carries a `WWW-Authenticate` bearer
    /// challenge.
    pub async fn execute(
        &self,
        request: &Request,
        response: &mut Response,
        options: &AuthenticateOptions,
    ) -> Result<User, OAuthError> {
        match self.handle(request, response, options).await {
            Ok(token) => Ok(token.user),
            Err(err) => {
                if err.kind() == ErrorKind::UnauthorizedRequest {
                    response.set_header("www-authenticate", "Bearer realm=\"Service\"");
                }
                response.set_status(err.status());
                response.set_body(err.body());
                Err(err)
            }
        }
    }

    /// The unshaped pipeline: yields the full token record so the
    /// authorize endpoint can reuse bearer authentication.
    pub(crate) async fn handle(
        &self,
        request: &Request,
        response: &mut Response,
        options: &AuthenticateOptions,
    ) -> Result<Token, OAuthError> {
        let token_value = bearer_token_from_request(request, options)?;

        let token = self
            .model
            .get_access_token(&token_value)
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!("bearer token not recognized");
                OAuthError::invalid_token("access token is invalid")
            })?;

        let expires_at = token.access_token_expires_at.ok_or_else(|| {
            OAuthError::server_error("model token is missing the access token expiry")
        })?;
        if expires_at <= Utc::now() {
            return Err(OAuthError::invalid_token("access token has expired"));
        }

        if let Some(required_scope) = &options.scope {
            let sufficient = self
                .model
                .verify_scope(&token, required_scope)
                .await
                .map_err(model_error)?;
            if !sufficient {
                warn!(required_scope = %required_scope, "bearer token scope is insufficient");
                return Err(OAuthError::insufficient_scope(
                    "authorized scope is insufficient",
                ));
            }

            if options.add_accepted_scopes_header {
                response.set_header("x-accepted-oauth-scopes", required_scope);
            }
            if options.add_authorized_scopes_header {
                if let Some(scope) = token.scope.as_deref().filter(|s| !s.is_empty()) {
                    response.set_header("x-oauth-scopes", scope);
                }
            }
        }

        debug!(username = %token.user.username, "bearer token accepted");
        Ok(token)
    }
}

/// Locate the bearer token: `Authorization` header, query parameter, or
/// form-encoded body, with exactly one source allowed.
fn bearer_token_from_request(
    request: &Request,
    options: &AuthenticateOptions,
) -> Result<String, OAuthError> {
    let header = request.header("authorization");
    let query = request.query_param("access_token");
    let body = request.body_param("access_token");

    let sources = usize::from(header.is_some())
        + usize::from(query.is_some())
        + usize::from(body.is_some());
    if sources > 1 {
        return Err(OAuthError::invalid_request(
            "only one authentication method is allowed",
        ));
    }

    if let Some(header) = header {
        return match header.split_once(' ') {
            Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") && !token.is_empty() => {
                Ok(token.to_owned())
            }
            _ => Err(OAuthError::invalid_request("malformed authorization header")),
        };
    }

    if let Some(token) = query {
        if !options.allow_bearer_tokens_in_query_string {
            return Err(OAuthError::invalid_request(
                "do not send bearer tokens in query parameters",
            ));
        }
        return Ok(token.to_owned());
    }

    if let Some(token) = body {
        if request.method() == "GET" {
            return Err(OAuthError::invalid_request(
                "bearer tokens are not allowed in GET request bodies",
            ));
        }
        if !request.is_form_encoded() {
            return Err(OAuthError::invalid_request(
                "request content must be application/x-www-form-urlencoded",
            ));
        }
        return Ok(token.to_owned());
    }

    Err(OAuthError::unauthorized_request("no authentication given"))
}
