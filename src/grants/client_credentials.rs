// ABOUTME: Client-credentials grant: a confidential client acting for itself
// ABOUTME: Issues an access token only; no refresh token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::OAuthError;
use crate::grants::{requested_scope, Grant, TokenIssuer};
use crate::model::model_error;
use crate::models::{Client, Token};
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use serde_json::Map;
use tracing::debug;

/// Executor for `grant_type=client_credentials`.
pub struct ClientCredentialsGrant;

#[async_trait]
impl Grant for ClientCredentialsGrant {
    async fn execute(
        &self,
        request: &Request,
        _response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let user = issuer
            .model()
            .get_user_from_client(client)
            .await
            .map_err(model_error)?
            .ok_or_else(|| OAuthError::invalid_grant("user credentials are invalid"))?;

        let scope = requested_scope(request)?;
        let scope = issuer.validate_scope(client, &user, scope.as_deref()).await?;

        let access_token = issuer
            .generate_access_token(client, &user, scope.as_deref())
            .await?;

        debug!(client_id = %client.id, "client credentials token issued");

        issuer
            .save(Token {
                access_token,
                access_token_expires_at: Some(issuer.access_token_expires_at()),
                refresh_token: None,
                refresh_token_expires_at: None,
                scope,
                client: client.clone(),
                user,
                extra: Map::new(),
            })
            .await
    }
}
