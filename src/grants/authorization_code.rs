// ABOUTME: Authorization-code grant: redeem a single-use code for a bearer token
// ABOUTME: Enforces client binding, expiry, redirect-uri match, and one-time use
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
use tracing::{debug, warn};

/// Executor for `grant_type=authorization_code`.
pub struct AuthorizationCodeGrant;

#[async_trait]
impl Grant for AuthorizationCodeGrant {
    async fn execute(
        &self,
        request: &Request,
        _response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let code_value = request
            .body_param("code")
            .ok_or_else(|| OAuthError::invalid_request("missing parameter: code"))?;
        if !validators::is_vschar(code_value) {
            return Err(OAuthError::invalid_request("invalid parameter: code"));
        }

        let redirect_uri = request.param("redirect_uri");
        if let Some(uri) = redirect_uri {
            if !validators::is_uri(uri) {
                return Err(OAuthError::invalid_request(
                    "invalid request: redirect_uri is not a valid URI",
                ));
            }
        }

        let code = issuer
            .model()
            .get_authorization_code(code_value)
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %client.id, "authorization code not found");
                OAuthError::invalid_grant("authorization code is invalid")
            })?;

        if code.client.id != client.id {
            warn!(
                client_id = %client.id,
                code_client_id = %code.client.id,
                "authorization code was issued to another client"
            );
            return Err(OAuthError::invalid_grant("authorization code is invalid"));
        }

        if code.expires_at <= Utc::now() {
            return Err(OAuthError::invalid_grant("authorization code has expired"));
        }

        // A code bound to a redirect URI is redeemable only with that exact URI.
        if let Some(expected) = &code.redirect_uri {
            if redirect_uri != Some(expected.as_str()) {
                return Err(OAuthError::invalid_request(
                    "invalid request: redirect_uri is invalid",
                ));
            }
        }

        // One-time use: the code dies before the token exists.
        let revoked = issuer
            .model()
            .revoke_authorization_code(&code)
            .await
            .map_err(model_error)?;
        if !revoked {
            return Err(OAuthError::invalid_grant("authorization code is invalid"));
        }

        let scope = code.scope.clone();
        let access_token = issuer
            .generate_access_token(client, &code.user, scope.as_deref())
            .await?;
        let refresh_token = issuer
            .generate_refresh_token(client, &code.user, scope.as_deref())
            .await?;

        debug!(client_id = %client.id, "authorization code redeemed");

        issuer
            .save(Token {
                access_token,
                access_token_expires_at: Some(issuer.access_token_expires_at()),
                refresh_token: Some(refresh_token),
                refresh_token_expires_at: Some(issuer.refresh_token_expires_at()),
                scope,
                client: client.clone(),
                user: code.user.clone(),
                extra: Map::new(),
            })
            .await
    }
}
