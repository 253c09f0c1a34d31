// ABOUTME: Resource-owner password grant: username and password for a token
// ABOUTME: Issues access and refresh tokens after Model credential verification
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::OAuthError;
use crate::grants::{requested_scope, Grant, TokenIssuer};
use crate::model::model_error;
use crate::models::{Client, Token};
use crate::request::Request;
use crate::response::Response;
use crate::validators;
use async_trait::async_trait;
use serde_json::Map;
use tracing::{debug, warn};

/// Executor for `grant_type=password`.
pub struct PasswordGrant;

#[async_trait]
impl Grant for PasswordGrant {
    async fn execute(
        &self,
        request: &Request,
        _response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let username = request
            .body_param("username")
            .ok_or_else(|| OAuthError::invalid_request("missing parameter: username"))?;
        if !validators::is_unicode_char_no_crlf(username) {
            return Err(OAuthError::invalid_request("invalid parameter: username"));
        }

        let password = request
            .body_param("password")
            .ok_or_else(|| OAuthError::invalid_request("missing parameter: password"))?;
        if !validators::is_unicode_char_no_crlf(password) {
            return Err(OAuthError::invalid_request("invalid parameter: password"));
        }

        let scope = requested_scope(request)?;

        let user = issuer
            .model()
            .get_user(username, password)
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %client.id, "resource owner credentials rejected");
                OAuthError::invalid_grant("user credentials are invalid")
            })?;

        let scope = issuer.validate_scope(client, &user, scope.as_deref()).await?;

        let access_token = issuer
            .generate_access_token(client, &user, scope.as_deref())
            .await?;
        let refresh_token = issuer
            .generate_refresh_token(client, &user, scope.as_deref())
            .await?;

        debug!(client_id = %client.id, username = %user.username, "password grant token issued");

        issuer
            .save(Token {
                access_token,
                access_token_expires_at: Some(issuer.access_token_expires_at()),
                refresh_token: Some(refresh_token),
                refresh_token_expires_at: Some(issuer.refresh_token_expires_at()),
                scope,
                client: client.clone(),
                user,
                extra: Map::new(),
            })
            .await
    }
}
