// ABOUTME: Per-endpoint option records with defaults and per-call overlays
// ABOUTME: Overrides parse string pairs so query passthroughs can carry flags
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

//! # Endpoint options
//!
//! Each endpoint owns a defaults record held by the server facade. A
//! call may carry a partial override record; the facade clones the
//! defaults and overlays the overrides, so no caller ever observes
//! another request's options.
//!
//! Override records can also be assembled from string key/value pairs
//! (`from_pairs`), because hosts commonly thread flags through query
//! parameters: the literal strings `"true"`/`"false"` coerce to
//! booleans and integer strings parse to lifetimes. Unknown keys and
//! unparsable values are dropped.

use crate::grants::Grant;
use crate::model::Authenticator;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

fn parse_flag(value: &str) -> Option<bool> {
    match value {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    }
}

fn parse_lifetime(value: &str) -> Option<i64> {
    value.parse().ok()
}

// ── Authorize ───────────────────────────────────────────────────────────

/// Options for the authorize endpoint.
#[derive(Clone)]
pub struct AuthorizeOptions {
    /// Resource-owner authenticator; bearer authentication when absent
    pub authenticate_handler: Option<Arc<dyn Authenticator>>,
    /// Access token lifetime in seconds for the implicit response type
    pub access_token_lifetime: i64,
    /// Authorization code lifetime in seconds
    pub authorization_code_lifetime: i64,
    /// Accept requests that omit the `state` parameter
    pub allow_empty_state: bool,
}

impl Default for AuthorizeOptions {
    fn default() -> Self {
        Self {
            authenticate_handler: None,
            access_token_lifetime: 1800,
            authorization_code_lifetime: 300,
            allow_empty_state: false,
        }
    }
}

impl fmt::Debug for AuthorizeOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeOptions")
            .field(
                "authenticate_handler",
                &self.authenticate_handler.as_ref().map(|_| "<handler>"),
            )
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field(
                "authorization_code_lifetime",
                &self.authorization_code_lifetime,
            )
            .field("allow_empty_state", &self.allow_empty_state)
            .finish()
    }
}

impl AuthorizeOptions {
    /// Clone these defaults with the overrides applied.
    #[must_use]
    pub fn overlaid(&self, overrides: &AuthorizeOverrides) -> Self {
        Self {
            authenticate_handler: overrides
                .authenticate_handler
                .clone()
                .or_else(|| self.authenticate_handler.clone()),
            access_token_lifetime: overrides
                .access_token_lifetime
                .unwrap_or(self.access_token_lifetime),
            authorization_code_lifetime: overrides
                .authorization_code_lifetime
                .unwrap_or(self.authorization_code_lifetime),
            allow_empty_state: overrides.allow_empty_state.unwrap_or(self.allow_empty_state),
        }
    }
}

/// Per-call overrides for the authorize endpoint.
#[derive(Clone, Default)]
pub struct AuthorizeOverrides {
    /// Replace the resource-owner authenticator for this call
    pub authenticate_handler: Option<Arc<dyn Authenticator>>,
    /// Override the implicit access token lifetime
    pub access_token_lifetime: Option<i64>,
    /// Override the authorization code lifetime
    pub authorization_code_lifetime: Option<i64>,
    /// Override the empty-state allowance
    pub allow_empty_state: Option<bool>,
}

impl fmt::Debug for AuthorizeOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthorizeOverrides")
            .field(
                "authenticate_handler",
                &self.authenticate_handler.as_ref().map(|_| "<handler>"),
            )
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field(
                "authorization_code_lifetime",
                &self.authorization_code_lifetime,
            )
            .field("allow_empty_state", &self.allow_empty_state)
            .finish()
    }
}

impl AuthorizeOverrides {
    /// Build overrides from string key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            match key {
                "access_token_lifetime" => {
                    overrides.access_token_lifetime = parse_lifetime(value);
                }
                "authorization_code_lifetime" => {
                    overrides.authorization_code_lifetime = parse_lifetime(value);
                }
                "allow_empty_state" => overrides.allow_empty_state = parse_flag(value),
                _ => {}
            }
        }
        overrides
    }
}

// ── Token ───────────────────────────────────────────────────────────────

/// Options for the token endpoint.
#[derive(Clone)]
pub struct TokenOptions {
    /// Access token lifetime in seconds
    pub access_token_lifetime: i64,
    /// Refresh token lifetime in seconds
    pub refresh_token_lifetime: i64,
    /// Copy Model-attached extra attributes onto the wire
    pub allow_extended_token_attributes: bool,
    /// Per-grant client authentication requirement; absent entries mean required
    pub require_client_authentication: HashMap<String, bool>,
    /// Rotate the refresh token on every refresh exchange
    pub always_issue_new_refresh_token: bool,
    /// Extension grant executors keyed by grant-type identifier
    pub extended_grant_types: HashMap<String, Arc<dyn Grant>>,
}

impl Default for TokenOptions {
    fn default() -> Self {
        Self {
            access_token_lifetime: 1800,
            refresh_token_lifetime: 86400,
            allow_extended_token_attributes: false,
            require_client_authentication: HashMap::from([
                ("password".to_owned(), true),
                ("refresh_token".to_owned(), true),
            ]),
            always_issue_new_refresh_token: true,
            extended_grant_types: HashMap::new(),
        }
    }
}

impl fmt::Debug for TokenOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut extended: Vec<&str> = self
            .extended_grant_types
            .keys()
            .map(String::as_str)
            .collect();
        extended.sort_unstable();
        f.debug_struct("TokenOptions")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field(
                "allow_extended_token_attributes",
                &self.allow_extended_token_attributes,
            )
            .field(
                "require_client_authentication",
                &self.require_client_authentication,
            )
            .field(
                "always_issue_new_refresh_token",
                &self.always_issue_new_refresh_token,
            )
            .field("extended_grant_types", &extended)
            .finish()
    }
}

impl TokenOptions {
    /// Clone these defaults with the overrides applied.
    #[must_use]
    pub fn overlaid(&self, overrides: &TokenOverrides) -> Self {
        Self {
            access_token_lifetime: overrides
                .access_token_lifetime
                .unwrap_or(self.access_token_lifetime),
            refresh_token_lifetime: overrides
                .refresh_token_lifetime
                .unwrap_or(self.refresh_token_lifetime),
            allow_extended_token_attributes: overrides
                .allow_extended_token_attributes
                .unwrap_or(self.allow_extended_token_attributes),
            require_client_authentication: overrides
                .require_client_authentication
                .clone()
                .unwrap_or_else(|| self.require_client_authentication.clone()),
            always_issue_new_refresh_token: overrides
                .always_issue_new_refresh_token
                .unwrap_or(self.always_issue_new_refresh_token),
            extended_grant_types: overrides
                .extended_grant_types
                .clone()
                .unwrap_or_else(|| self.extended_grant_types.clone()),
        }
    }

    /// Whether the grant type requires client authentication.
    ///
    /// An absent entry means required; only an explicit `false` lifts it.
    #[must_use]
    pub fn client_authentication_required(&self, grant_type: &str) -> bool {
        self.require_client_authentication
            .get(grant_type)
            .copied()
            .unwrap_or(true)
    }
}

/// Per-call overrides for the token endpoint.
#[derive(Clone, Default)]
pub struct TokenOverrides {
    /// Override the access token lifetime
    pub access_token_lifetime: Option<i64>,
    /// Override the refresh token lifetime
    pub refresh_token_lifetime: Option<i64>,
    /// Override extended-attribute passthrough
    pub allow_extended_token_attributes: Option<bool>,
    /// Replace the per-grant client authentication map
    pub require_client_authentication: Option<HashMap<String, bool>>,
    /// Override refresh-token rotation
    pub always_issue_new_refresh_token: Option<bool>,
    /// Replace the extension grant registry
    pub extended_grant_types: Option<HashMap<String, Arc<dyn Grant>>>,
}

impl fmt::Debug for TokenOverrides {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenOverrides")
            .field("access_token_lifetime", &self.access_token_lifetime)
            .field("refresh_token_lifetime", &self.refresh_token_lifetime)
            .field(
                "allow_extended_token_attributes",
                &self.allow_extended_token_attributes,
            )
            .field(
                "require_client_authentication",
                &self.require_client_authentication,
            )
            .field(
                "always_issue_new_refresh_token",
                &self.always_issue_new_refresh_token,
            )
            .field(
                "extended_grant_types",
                &self.extended_grant_types.as_ref().map(HashMap::len),
            )
            .finish()
    }
}

impl TokenOverrides {
    /// Build overrides from string key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            match key {
                "access_token_lifetime" => overrides.access_token_lifetime = parse_lifetime(value),
                "refresh_token_lifetime" => {
                    overrides.refresh_token_lifetime = parse_lifetime(value);
                }
                "allow_extended_token_attributes" => {
                    overrides.allow_extended_token_attributes = parse_flag(value);
                }
                "always_issue_new_refresh_token" => {
                    overrides.always_issue_new_refresh_token = parse_flag(value);
                }
                _ => {}
            }
        }
        overrides
    }
}

// ── Authenticate ────────────────────────────────────────────────────────

/// Options for the bearer authenticate endpoint.
#[derive(Debug, Clone)]
pub struct AuthenticateOptions {
    /// Scope the protected resource requires, when any
    pub scope: Option<String>,
    /// Emit `X-Accepted-OAuth-Scopes` on scoped successes
    pub add_accepted_scopes_header: bool,
    /// Emit `X-OAuth-Scopes` on scoped successes
    pub add_authorized_scopes_header: bool,
    /// Accept `access_token` as a query parameter
    pub allow_bearer_tokens_in_query_string: bool,
}

impl Default for AuthenticateOptions {
    fn default() -> Self {
        Self {
            scope: None,
            add_accepted_scopes_header: true,
            add_authorized_scopes_header: true,
            allow_bearer_tokens_in_query_string: false,
        }
    }
}

impl AuthenticateOptions {
    /// Clone these defaults with the overrides applied.
    #[must_use]
    pub fn overlaid(&self, overrides: &AuthenticateOverrides) -> Self {
        Self {
            scope: overrides.scope.clone().or_else(|| self.scope.clone()),
            add_accepted_scopes_header: overrides
                .add_accepted_scopes_header
                .unwrap_or(self.add_accepted_scopes_header),
            add_authorized_scopes_header: overrides
                .add_authorized_scopes_header
                .unwrap_or(self.add_authorized_scopes_header),
            allow_bearer_tokens_in_query_string: overrides
                .allow_bearer_tokens_in_query_string
                .unwrap_or(self.allow_bearer_tokens_in_query_string),
        }
    }
}

/// Per-call overrides for the bearer authenticate endpoint.
#[derive(Debug, Clone, Default)]
pub struct AuthenticateOverrides {
    /// Require this scope for the protected resource
    pub scope: Option<String>,
    /// Override the accepted-scopes header emission
    pub add_accepted_scopes_header: Option<bool>,
    /// Override the authorized-scopes header emission
    pub add_authorized_scopes_header: Option<bool>,
    /// Override query-string bearer acceptance
    pub allow_bearer_tokens_in_query_string: Option<bool>,
}

impl AuthenticateOverrides {
    /// Build overrides from string key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            match key {
                "scope" => overrides.scope = Some(value.to_owned()),
                "add_accepted_scopes_header" => {
                    overrides.add_accepted_scopes_header = parse_flag(value);
                }
                "add_authorized_scopes_header" => {
                    overrides.add_authorized_scopes_header = parse_flag(value);
                }
                "allow_bearer_tokens_in_query_string" => {
                    overrides.allow_bearer_tokens_in_query_string = parse_flag(value);
                }
                _ => {}
            }
        }
        overrides
    }
}

// ── Introspect / Revoke ─────────────────────────────────────────────────

/// Options for the introspection endpoint.
#[derive(Debug, Clone)]
pub struct IntrospectOptions {
    /// Require a client secret alongside the client id
    pub is_client_secret_required: bool,
}

impl Default for IntrospectOptions {
    fn default() -> Self {
        Self {
            is_client_secret_required: true,
        }
    }
}

impl IntrospectOptions {
    /// Clone these defaults with the overrides applied.
    #[must_use]
    pub fn overlaid(&self, overrides: &IntrospectOverrides) -> Self {
        Self {
            is_client_secret_required: overrides
                .is_client_secret_required
                .unwrap_or(self.is_client_secret_required),
        }
    }
}

/// Per-call overrides for the introspection endpoint.
#[derive(Debug, Clone, Default)]
pub struct IntrospectOverrides {
    /// Override the client-secret requirement
    pub is_client_secret_required: Option<bool>,
}

impl IntrospectOverrides {
    /// Build overrides from string key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            if key == "is_client_secret_required" {
                overrides.is_client_secret_required = parse_flag(value);
            }
        }
        overrides
    }
}

/// Options for the revocation endpoint.
#[derive(Debug, Clone)]
pub struct RevokeOptions {
    /// Require a client secret alongside the client id
    pub is_client_secret_required: bool,
}

impl Default for RevokeOptions {
    fn default() -> Self {
        Self {
            is_client_secret_required: true,
        }
    }
}

impl RevokeOptions {
    /// Clone these defaults with the overrides applied.
    #[must_use]
    pub fn overlaid(&self, overrides: &RevokeOverrides) -> Self {
        Self {
            is_client_secret_required: overrides
                .is_client_secret_required
                .unwrap_or(self.is_client_secret_required),
        }
    }
}

/// Per-call overrides for the revocation endpoint.
#[derive(Debug, Clone, Default)]
pub struct RevokeOverrides {
    /// Override the client-secret requirement
    pub is_client_secret_required: Option<bool>,
}

impl RevokeOverrides {
    /// Build overrides from string key/value pairs.
    pub fn from_pairs<'a, I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a str)>,
    {
        let mut overrides = Self::default();
        for (key, value) in pairs {
            if key == "is_client_secret_required" {
                overrides.is_client_secret_required = parse_flag(value);
            }
        }
        overrides
    }
}

// ── Server ──────────────────────────────────────────────────────────────

/// The full defaults record held by the server facade.
#[derive(Debug, Clone, Default)]
pub struct ServerOptions {
    /// Authorize endpoint defaults
    pub authorize: AuthorizeOptions,
    /// Token endpoint defaults
    pub token: TokenOptions,
    /// Bearer authenticate endpoint defaults
    pub authenticate: AuthenticateOptions,
    /// Introspection endpoint defaults
    pub introspect: IntrospectOptions,
    /// Revocation endpoint defaults
    pub revoke: RevokeOptions,
}
