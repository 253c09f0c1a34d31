// ABOUTME: RFC 6749 token endpoint: authenticate the client, dispatch the grant
// ABOUTME: Composes the bearer response and the invalid_client challenge rule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::endpoints::client_credentials;
use crate::errors::{ErrorKind, OAuthError};
use crate::grants::{
    AuthorizationCodeGrant, ClientCredentialsGrant, Grant, PasswordGrant, RefreshTokenGrant,
    TokenIssuer,
};
use crate::model::{model_error, Model};
use crate::models::Token;
use crate::options::TokenOptions;
use crate::request::Request;
use crate::response::Response;
use crate::validators;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::{debug, warn};

const STANDARD_GRANT_TYPES: [&str; 4] = [
    "authorization_code",
    "client_credentials",
    "password",
    "refresh_token",
];

/// The token endpoint state machine.
pub struct TokenEndpoint {
    model: Arc<dyn Model>,
}

impl TokenEndpoint {
    /// A token endpoint over the given Model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model }
    }

    /// Run the pipeline, filling `response` with the bearer token or the
    /// shaped error.
    ///
    /// # Errors
    /// Returns the protocol error after writing the error response, so
    /// the host can log it.
    pub async fn execute(
        &self,
        request: &Request,
        response: &mut Response,
        options: &TokenOptions,
    ) -> Result<(), OAuthError> {
        let result = self.handle(request, response, options).await.and_then(|token| {
            bearer_body(&token, options.allow_extended_token_attributes)
        });

        // The three cache headers apply to success and error alike.
        response.set_header("content-type", "application/json;charset=UTF-8");
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
        response: &mut Response,
        options: &TokenOptions,
    ) -> Result<Token, OAuthError> {
        if request.method() != "POST" {
            return Err(OAuthError::invalid_request("method must be POST"));
        }
        if !request.is_form_encoded() {
            return Err(OAuthError::invalid_request(
                "request content must be application/x-www-form-urlencoded",
            ));
        }

        let grant_type = request
            .body_param("grant_type")
            .filter(|g| !g.is_empty())
            .ok_or_else(|| OAuthError::invalid_request("missing parameter: grant_type"))?;
        // Extension grants are identified by absolute URIs.
        if !validators::is_nchar(grant_type) && !validators::is_uri(grant_type) {
            return Err(OAuthError::invalid_request("invalid parameter: grant_type"));
        }
        if !STANDARD_GRANT_TYPES.contains(&grant_type)
            && !options.extended_grant_types.contains_key(grant_type)
        {
            return Err(OAuthError::unsupported_grant_type(format!(
                "unsupported grant type: {grant_type}"
            )));
        }

        let credentials = client_credentials(
            request,
            options.client_authentication_required(grant_type),
        )?;

        let client = self
            .model
            .get_client(&credentials.client_id, credentials.client_secret.as_deref())
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %credentials.client_id, "client authentication failed");
                OAuthError::invalid_client("client is invalid")
            })?;

        if !client.grants.iter().any(|g| g == grant_type) {
            warn!(
                client_id = %client.id,
                grant_type,
                "client is not registered for the requested grant type"
            );
            return Err(OAuthError::unauthorized_client(
                "client is not authorized to use this grant type",
            ));
        }

        debug!(client_id = %client.id, grant_type, "dispatching grant");

        let issuer = TokenIssuer::new(
            Arc::clone(&self.model),
            &client,
            options.access_token_lifetime,
            options.refresh_token_lifetime,
            options.always_issue_new_refresh_token,
        );

        match grant_type {
            "authorization_code" => {
                AuthorizationCodeGrant
                    .execute(request, response, &client, &issuer)
                    .await
            }
            "client_credentials" => {
                ClientCredentialsGrant
                    .execute(request, response, &client, &issuer)
                    .await
            }
            "password" => PasswordGrant.execute(request, response, &client, &issuer).await,
            "refresh_token" => {
                RefreshTokenGrant
                    .execute(request, response, &client, &issuer)
                    .await
            }
            extension => {
                let grant = options.extended_grant_types.get(extension).ok_or_else(|| {
                    OAuthError::unsupported_grant_type(format!(
                        "unsupported grant type: {extension}"
                    ))
                })?;
                grant.execute(request, response, &client, &issuer).await
            }
        }
    }
}

fn bearer_body(token: &Token, allow_extended: bool) -> Result<Map<String, Value>, OAuthError> {
    match serde_json::to_value(token.bearer(allow_extended)) {
        Ok(Value::Object(body)) => Ok(body),
        _ => Err(OAuthError::server_error("failed to serialize bearer token")),
    }
}
