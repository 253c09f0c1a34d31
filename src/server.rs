// ABOUTME: Server facade holding per-endpoint defaults and delegating to endpoints
// ABOUTME: Clones and overlays options per call so requests never share option state
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::endpoints::authenticate::AuthenticateEndpoint;
use crate::endpoints::authorize::AuthorizeEndpoint;
use crate::endpoints::introspect::IntrospectEndpoint;
use crate::endpoints::revoke::RevokeEndpoint;
use crate::endpoints::token::TokenEndpoint;
use crate::errors::OAuthError;
use crate::model::Model;
use crate::models::User;
use crate::options::{
    AuthenticateOverrides, AuthorizeOverrides, IntrospectOverrides, RevokeOverrides,
    ServerOptions, TokenOverrides,
};
use crate::request::Request;
use crate::response::Response;
use std::sync::Arc;

/// The OAuth 2.0 server facade.
///
/// Holds the Model and the per-endpoint default options; every call
/// overlays its overrides onto a clone of the defaults and delegates to
/// the matching endpoint. The facade itself carries no per-request
/// state, so one instance serves all in-flight requests.
pub struct OAuth2Server {
    options: ServerOptions,
    authorize: AuthorizeEndpoint,
    token: TokenEndpoint,
    authenticate: AuthenticateEndpoint,
    introspect: IntrospectEndpoint,
    revoke: RevokeEndpoint,
}

impl OAuth2Server {
    /// A server over the given Model with default options everywhere.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self::with_options(model, ServerOptions::default())
    }

    /// A server with host-tuned per-endpoint defaults.
    #[must_use]
    pub fn with_options(model: Arc<dyn Model>, options: ServerOptions) -> Self {
        Self {
            authorize: AuthorizeEndpoint::new(Arc::clone(&model)),
            token: TokenEndpoint::new(Arc::clone(&model)),
            authenticate: AuthenticateEndpoint::new(Arc::clone(&model)),
            introspect: IntrospectEndpoint::new(Arc::clone(&model)),
            revoke: RevokeEndpoint::new(model),
            options,
        }
    }

    /// The configured per-endpoint defaults.
    #[must_use]
    pub const fn options(&self) -> &ServerOptions {
        &self.options
    }

    /// Handle an authorization request (RFC 6749 §4.1.1, §4.2.1).
    ///
    /// # Errors
    /// Returns the protocol error after the error response is written.
    pub async fn authorize(
        &self,
        request: &Request,
        response: &mut Response,
        overrides: &AuthorizeOverrides,
    ) -> Result<(), OAuthError> {
        let options = self.options.authorize.overlaid(overrides);
        self.authorize.execute(request, response, &options).await
    }

    /// Handle a token request (RFC 6749 §3.2).
    ///
    /// # Errors
    /// Returns the protocol error after the error response is written.
    pub async fn token(
        &self,
        request: &Request,
        response: &mut Response,
        overrides: &TokenOverrides,
    ) -> Result<(), OAuthError> {
        let options = self.options.token.overlaid(overrides);
        self.token.execute(request, response, &options).await
    }

    /// Authenticate a bearer token on a protected-resource request
    /// (RFC 6750 §2).
    ///
    /// # Errors
    /// Returns the protocol error after the error response is written.
    pub async fn authenticate(
        &self,
        request: &Request,
        response: &mut Response,
        overrides: &AuthenticateOverrides,
    ) -> Result<User, OAuthError> {
        let options = self.options.authenticate.overlaid(overrides);
        self.authenticate.execute(request, response, &options).await
    }

    /// Handle a token introspection request (RFC 7662 §2).
    ///
    /// # Errors
    /// Returns the protocol error after the error response is written.
    pub async fn introspect(
        &self,
        request: &Request,
        response: &mut Response,
        overrides: &IntrospectOverrides,
    ) -> Result<(), OAuthError> {
        let options = self.options.introspect.overlaid(overrides);
        self.introspect.execute(request, response, &options).await
    }

    /// Handle a token revocation request (RFC 7009 §2).
    ///
    /// # Errors
    /// Returns the protocol error after the error response is written.
    pub async fn revoke(
        &self,
        request: &Request,
        response: &mut Response,
        overrides: &RevokeOverrides,
    ) -> Result<(), OAuthError> {
        let options = self.options.revoke.overlaid(overrides);
        self.revoke.execute(request, response, &options).await
    }
}
