// ABOUTME: Implicit grant: access token issued directly from the authorize endpoint
// ABOUTME: Carries the already-authenticated user and validated scope; no refresh token
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::OAuthError;
use crate::grants::{Grant, TokenIssuer};
use crate::models::{Client, Token, User};
use crate::request::Request;
use crate::response::Response;
use async_trait::async_trait;
use serde_json::Map;
use tracing::debug;

/// Executor for the implicit flow (`response_type=token`).
///
/// Constructed by the authorize endpoint with the resource owner and
/// validated scope already in hand; there is nothing left to parse from
/// the request.
pub struct ImplicitGrant {
    user: User,
    scope: Option<String>,
}

impl ImplicitGrant {
    /// An implicit grant for the given user and validated scope.
    #[must_use]
    pub fn new(user: User, scope: Option<String>) -> Self {
        Self { user, scope }
    }
}

#[async_trait]
impl Grant for ImplicitGrant {
    async fn execute(
        &self,
        _request: &Request,
        _response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, OAuthError> {
        let access_token = issuer
            .generate_access_token(client, &self.user, self.scope.as_deref())
            .await?;

        debug!(client_id = %client.id, "implicit access token issued");

        issuer
            .save(Token {
                access_token,
                access_token_expires_at: Some(issuer.access_token_expires_at()),
                refresh_token: None,
                refresh_token_expires_at: None,
                scope: self.scope.clone(),
                client: client.clone(),
                user: self.user.clone(),
                extra: Map::new(),
            })
            .await
    }
}
