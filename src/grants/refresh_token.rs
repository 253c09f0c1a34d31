// ABOUTME: Refresh-token grant: exchange a live refresh token for a new access token
// ABOUTME: Rotates the refresh token, revoking the old one before the new token is saved
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::OAuthError;
use crate::grants::{Grant, TokenIssuer};
use crate::model::model_error;
use crate::models::{Client, Token};
use crate::request::Request;
use crate::response::Response;
use crate::validators;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::Map;
use tracing::{info, warn};

/// Executor for `grant_type=refresh_token`.
pub struct RefreshTokenGrant;

#[async_trait]
impl Grant for RefreshTokenGrant {
    async fn execute(
        &self,
        request: &Request,
        _response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let refresh_token_value = request
            .body_param("refresh_token")
            .ok_or_else(|| OAuthError::invalid_request("missing parameter: refresh_token"))?;
        if !validators::is_vschar(refresh_token_value) {
            return Err(OAuthError::invalid_request("invalid parameter: refresh_token"));
        }

        let old_token = issuer
            .model()
            .get_refresh_token(refresh_token_value)
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %client.id, "refresh token not found");
                OAuthError::invalid_grant("refresh token is invalid")
            })?;

        if old_token.client.id != client.id {
            warn!(
                client_id = %client.id,
                token_client_id = %old_token.client.id,
                "refresh token was issued to another client"
            );
            return Err(OAuthError::invalid_grant("refresh token is invalid"));
        }

        match old_token.refresh_token_expires_at {
            Some(expires_at) if expires_at > Utc::now() => {}
            _ => return Err(OAuthError::invalid_grant("refresh token has expired")),
        }

        // Rotation: the consumed token must be dead before its successor
        // is persisted.
        if issuer.always_issue_new_refresh_token() {
            let revoked = issuer
                .model()
                .revoke_refresh_token(&old_token)
                .await
                .map_err(model_error)?;
            if !revoked {
                return Err(OAuthError::invalid_grant("refresh token is invalid"));
            }
        }

        // Scope always carries over from the consumed token; the `scope`
        // form parameter cannot widen or narrow it here.
        let scope = old_token.scope.clone();
        let access_token = issuer
            .generate_access_token(client, &old_token.user, scope.as_deref())
            .await?;

        let (refresh_token, refresh_token_expires_at) = if issuer.always_issue_new_refresh_token() {
            let rotated = issuer
                .generate_refresh_token(client, &old_token.user, scope.as_deref())
                .await?;
            info!(client_id = %client.id, "refresh token rotated");
            (Some(rotated), Some(issuer.refresh_token_expires_at()))
        } else {
            (None, None)
        };

        issuer
            .save(Token {
                access_token,
                access_token_expires_at: Some(issuer.access_token_expires_at()),
                refresh_token,
                refresh_token_expires_at,
                scope,
                client: client.clone(),
                user: old_token.user.clone(),
                extra: Map::new(),
            })
            .await
    }
}
