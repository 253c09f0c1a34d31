// ABOUTME: RFC 7662 token introspection endpoint
// ABOUTME: Reports active state and metadata for tokens the caller owns
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::endpoints::{parse_token_hint_request, TokenHint};
use crate::errors::{ErrorKind, OAuthError};
use crate::model::{model_error, Model};
use crate::options::IntrospectOptions;
use crate::request::Request;
use crate::response::Response;
use chrono::Utc;
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

/// The introspection endpoint state machine.
pub struct IntrospectEndpoint {
    model: Arc<dyn Model>,
}

/// RFC 7662 §2.2 response body. Metadata appears only on active tokens.
#[derive(Debug, Serialize)]
struct IntrospectionResponse {
    active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    client_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scope: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    expires_at: Option<i64>,
}

impl IntrospectionResponse {
    const fn inactive() -> Self {
        Self {
            active: false,
            client_id: None,
            username: None,
            scope: None,
            expires_at: None,
        }
    }
}

impl IntrospectEndpoint {
    /// An introspection endpoint over the given Model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model }
    }

    /// Run the pipeline, filling `response` with the introspection body
    /// or the shaped error.
    ///
    /// # Errors
    /// Returns the protocol error after writing the error response.
    pub async fn execute(
        &self,
        request: &Request,
        response: &mut Response,
        options: &IntrospectOptions,
    ) -> Result<(), OAuthError> {
        let result = self.handle(request, options).await;

        response.set_header("cache-control", "no-store");
        response.set_header("pragma", "no-cache");

        match result {
            Ok(body) => {
                response.set_body(body);
                Ok(())
            }
            Err(err) => {
                let err = if err.kind() == ErrorKind::InvalidClient
                    && request.header("authorization").is_some()
                {
                    response.set_header("www-authenticate", "Basic realm=\"Service\"");
                    err.with_status(401)
                } else {
                    err
                };
                response.set_status(err.status());
                response.set_body(err.body());
                Err(err)
            }
        }
    }

    async fn handle(
        &self,
        request: &Request,
        options: &IntrospectOptions,
    ) -> Result<Map<String, Value>, OAuthError> {
        let (credentials, token_value, hint) =
            parse_token_hint_request(request, options.is_client_secret_required)?;

        let client = self
            .model
            .get_client(&credentials.client_id, credentials.client_secret.as_deref())
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %credentials.client_id, "client authentication failed");
                OAuthError::invalid_client("client is invalid")
            })?;

        let token = match hint {
            TokenHint::AccessToken => self.model.get_access_token(&token_value).await,
            TokenHint::RefreshToken => self.model.get_refresh_token(&token_value).await,
        }
        .map_err(model_error)?;

        // A token issued to another client is reported exactly like an
        // unknown one.
        let introspection = match token.filter(|t| t.client.id == client.id) {
            None => {
                debug!(client_id = %client.id, "introspected token is unknown or foreign");
                IntrospectionResponse::inactive()
            }
            Some(token) => {
                let expires_at = match hint {
                    TokenHint::AccessToken => token.access_token_expires_at,
                    TokenHint::RefreshToken => token.refresh_token_expires_at,
                };
                if expires_at.is_some_and(|at| at <= Utc::now()) {
                    IntrospectionResponse::inactive()
                } else {
                    IntrospectionResponse {
                        active: true,
                        client_id: Some(token.client.id),
                        username: Some(token.user.username),
                        scope: token.scope.filter(|s| !s.is_empty()),
                        expires_at: expires_at.map(|at| at.timestamp()),
                    }
                }
            }
        };

        match serde_json::to_value(introspection) {
            Ok(Value::Object(body)) => Ok(body),
            _ => Err(OAuthError::server_error(
                "failed to serialize introspection response",
            )),
        }
    }
}
