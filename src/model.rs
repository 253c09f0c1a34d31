// ABOUTME: The data-access capability set the host application supplies
// ABOUTME: Defines the Model trait, the resource-owner Authenticator, and Model error wrapping
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

//! # The Model
//!
//! The engine owns no persistence. Clients, users, authorization codes,
//! and tokens live behind the [`Model`] trait, implemented by the host
//! over whatever storage it runs. Every Model call is an awaited I/O
//! point; within one endpoint pipeline the calls are strictly sequential.
//!
//! Capabilities fall into three groups:
//!
//! - **Required**: `get_client`, `save_token`, `get_access_token`. Every
//!   deployment needs them and the trait makes them mandatory.
//! - **Flow-specific**: `get_user`, `get_user_from_client`,
//!   `verify_scope`, the authorization-code and refresh-token methods.
//!   Their default implementations report a missing capability, which
//!   endpoints surface as `invalid_argument` — a host bug, not a
//!   protocol failure. Implement the ones your enabled flows reach.
//! - **Optional hooks**: `validate_scope` (defaults to accepting the
//!   requested scope unchanged) and the three `generate_*` hooks
//!   (defaulting to `None`, which selects the engine's own generator).

use crate::errors::OAuthError;
use crate::models::{AuthorizationCode, Client, Token, User};
use crate::request::Request;
use crate::response::Response;
use anyhow::Result;
use async_trait::async_trait;

/// Error raised by the default implementations of flow-specific
/// capabilities a host did not supply.
#[derive(Debug, thiserror::Error)]
#[error("model capability not implemented: {0}")]
pub struct MissingCapability(pub &'static str);

/// Wrap an error escaping a Model call.
///
/// A [`MissingCapability`] marks a host programming error and maps to
/// `invalid_argument`; anything else is a backend failure and maps to
/// `server_error`.
pub(crate) fn model_error(err: anyhow::Error) -> OAuthError {
    if let Some(missing) = err.downcast_ref::<MissingCapability>() {
        OAuthError::invalid_argument(missing.to_string())
    } else {
        OAuthError::server_error(format!("model failure: {err}"))
    }
}

/// The persistence and policy backend supplied by the host application.
///
/// Shared across all in-flight requests; implementations must be safe
/// for concurrent use. Methods return `Ok(None)`/`Ok(false)` for
/// negative lookups and reserve `Err` for backend failures.
#[async_trait]
pub trait Model: Send + Sync {
    /// Load a client by id, verifying the secret when one is given.
    async fn get_client(&self, client_id: &str, client_secret: Option<&str>)
        -> Result<Option<Client>>;

    /// Authenticate a resource owner by credentials (password grant).
    async fn get_user(&self, username: &str, password: &str) -> Result<Option<User>> {
        let _ = (username, password);
        Err(MissingCapability("get_user").into())
    }

    /// The user a client acts as under the client-credentials grant.
    async fn get_user_from_client(&self, client: &Client) -> Result<Option<User>> {
        let _ = client;
        Err(MissingCapability("get_user_from_client").into())
    }

    /// Validate and possibly narrow a requested scope.
    ///
    /// Return the validated scope, or `None` to reject the request. The
    /// default accepts the requested scope unchanged, which is what an
    /// absent capability means.
    async fn validate_scope(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<Option<String>> {
        let _ = (client, user);
        Ok(scope.map(str::to_owned))
    }

    /// Whether an access token's scope covers the required scope.
    async fn verify_scope(&self, token: &Token, required_scope: &str) -> Result<bool> {
        let _ = (token, required_scope);
        Err(MissingCapability("verify_scope").into())
    }

    /// Persist an authorization code. The record embeds client and user.
    async fn save_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<Option<AuthorizationCode>> {
        let _ = code;
        Err(MissingCapability("save_authorization_code").into())
    }

    /// Load an authorization code by value.
    async fn get_authorization_code(&self, code: &str) -> Result<Option<AuthorizationCode>> {
        let _ = code;
        Err(MissingCapability("get_authorization_code").into())
    }

    /// Revoke a redeemed authorization code. Must return `true` exactly
    /// when the code existed and is now dead.
    async fn revoke_authorization_code(&self, code: &AuthorizationCode) -> Result<bool> {
        let _ = code;
        Err(MissingCapability("revoke_authorization_code").into())
    }

    /// Persist a freshly issued token. The record embeds client and user.
    async fn save_token(&self, token: &Token) -> Result<Option<Token>>;

    /// Load a token record by access token value.
    async fn get_access_token(&self, access_token: &str) -> Result<Option<Token>>;

    /// Load a token record by refresh token value.
    async fn get_refresh_token(&self, refresh_token: &str) -> Result<Option<Token>> {
        let _ = refresh_token;
        Err(MissingCapability("get_refresh_token").into())
    }

    /// Invalidate an access token (revocation endpoint).
    async fn revoke_access_token(&self, token: &Token) -> Result<bool> {
        let _ = token;
        Err(MissingCapability("revoke_access_token").into())
    }

    /// Invalidate a refresh token (rotation and revocation).
    async fn revoke_refresh_token(&self, token: &Token) -> Result<bool> {
        let _ = token;
        Err(MissingCapability("revoke_refresh_token").into())
    }

    /// Custom access-token generator hook; `None` selects the engine's.
    async fn generate_access_token(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<Option<String>> {
        let _ = (client, user, scope);
        Ok(None)
    }

    /// Custom refresh-token generator hook; `None` selects the engine's.
    async fn generate_refresh_token(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<Option<String>> {
        let _ = (client, user, scope);
        Ok(None)
    }

    /// Custom authorization-code generator hook; `None` selects the engine's.
    async fn generate_authorization_code(
        &self,
        client: &Client,
        user: &User,
        scope: Option<&str>,
    ) -> Result<Option<String>> {
        let _ = (client, user, scope);
        Ok(None)
    }
}

/// Establishes the resource owner's identity during authorization.
///
/// Typically backed by the host's login session. When the authorize
/// endpoint is configured without one, it falls back to bearer
/// authentication and uses the token's user.
#[async_trait]
pub trait Authenticator: Send + Sync {
    /// Identify the resource owner behind this request, or `None` when
    /// nobody is signed in.
    async fn execute(&self, request: &Request, response: &mut Response) -> Result<Option<User>>;
}
