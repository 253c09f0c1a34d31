// ABOUTME: Shared token issuing core used by every grant flow
// ABOUTME: Scope validation, generator fallback, expiry computation, persistence
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::errors::OAuthError;
use crate::model::{model_error, Model};
use crate::models::{Client, Token, User};
use crate::tokens::generate_random_token;
use chrono::{DateTime, Duration, Utc};
use std::sync::Arc;
use tracing::debug;

/// The issuing context handed to a grant executor.
///
/// Resolves lifetimes once per call, with the client's own overrides
/// taking precedence over the endpoint options, so grant code never
/// consults configuration directly.
pub struct TokenIssuer {
    model: Arc<dyn Model>,
    access_token_lifetime: i64,
    refresh_token_lifetime: i64,
    always_issue_new_refresh_token: bool,
}

impl TokenIssuer {
    /// Build an issuer for one grant execution.
    #[must_use]
    pub fn new(
        model: Arc<dyn Model>,
        client: &Client,
        access_token_lifetime: i64,
        refresh_token_lifetime: i64,
        always_issue_new_refresh_token: bool,
    ) -> Self {
        Self {
            model,
            access_token_lifetime: client
                .access_token_lifetime
                .unwrap_or(access_token_lifetime),
            refresh_token_lifetime: client
                .refresh_token_lifetime
                .unwrap_or(refresh_token_lifetime),
            always_issue_new_refresh_token,
        }
    }

    /// An issuer for the authorize endpoint's code and implicit paths,
    /// which never mint refresh tokens.
    #[must_use]
    pub fn without_refresh_tokens(
        model: Arc<dyn Model>,
        client: &Client,
        access_token_lifetime: i64,
    ) -> Self {
        Self {
            model,
            access_token_lifetime: client
                .access_token_lifetime
                .unwrap_or(access_token_lifetime),
            refresh_token_lifetime: 0,
            always_issue_new_refresh_token: false,
        }
    }

    /// The Model behind this issuer.
    #[must_use]
    pub fn model(&self) -> &Arc<dyn Model> {
        &self.model
    }

    /// Whether refresh exchanges rotate the refresh token.
    #[must_use]
    pub const fn always_issue_new_refresh_token(&self) -> bool {
        self.always_issue_new_refresh_token
    }

    /// Validate a requested scope through the Model.
    ///
    /// Nothing requested passes through untouched unless the Model
    /// grants a default scope; a requested scope the Model rejects
    /// (empty or absent result) is `invalid_scope`.
    pub async fn validate_scope(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<Option<String>, OAuthError> {
        let validated = self
            .model
            .validate_scope(client, user, scope)
            .await
            .map_err(model_error)?
            .filter(|s| !s.is_empty());

        if scope.is_some() && validated.is_none() {
            debug!(client_id = %client.id, "model rejected requested scope");
            return Err(OAuthError::invalid_scope("requested scope is invalid"));
        }
        Ok(validated)
    }

    /// Mint an access token: Model hook first, engine generator as fallback.
    pub async fn generate_access_token(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<String, OAuthError> {
        match self
            .model
            .generate_access_token(client, user, scope)
            .await
            .map_err(model_error)?
            .filter(|t| !t.is_empty())
        {
            Some(token) => Ok(token),
            None => generate_random_token(),
        }
    }

    /// Mint a refresh token: Model hook first, engine generator as fallback.
    pub async fn generate_refresh_token(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<String, OAuthError> {
        match self
            .model
            .generate_refresh_token(client, user, scope)
            .await
            .map_err(model_error)?
            .filter(|t| !t.is_empty())
        {
            Some(token) => Ok(token),
            None => generate_random_token(),
        }
    }

    /// Mint an authorization code: Model hook first, engine generator as fallback.
    pub async fn generate_authorization_code(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<String, OAuthError> {
        match self
            .model
            .generate_authorization_code(client, user, scope)
            .await
            .map_err(model_error)?
            .filter(|t| !t.is_empty())
        {
            Some(code) => Ok(code),
            None => generate_random_token(),
        }
    }

    /// When a freshly minted access token expires.
    #[must_use]
    pub fn access_token_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.access_token_lifetime)
    }

    /// When a freshly minted refresh token expires.
    #[must_use]
    pub fn refresh_token_expires_at(&self) -> DateTime<Utc> {
        Utc::now() + Duration::seconds(self.refresh_token_lifetime)
    }

    /// Persist a token through the Model.
    pub async fn save(&self, token: Token) -> Result<Token, OAuthError> {
        self.model
            .save_token(&token)
            .await
            .map_err(model_error)?
            .ok_or_else(|| OAuthError::server_error("model did not return the saved token"))
    }
}
