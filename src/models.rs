// ABOUTME: Core domain records for the OAuth 2.0 engine
// ABOUTME: Defines Client, User, AuthorizationCode, Token, and the bearer wire form
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::{Map, Value};

/// A registered OAuth 2.0 client application.
///
/// The client secret never passes through the engine; the Model verifies
/// it during `get_client`.
#[derive(Debug, Clone)]
pub struct Client {
    /// Client identifier
    pub id: String,
    /// Grant-type identifiers this client may use
    pub grants: Vec<String>,
    /// Registered redirect URIs, matched exactly
    pub redirect_uris: Vec<String>,
    /// Per-client access token lifetime in seconds, overriding the endpoint default
    pub access_token_lifetime: Option<i64>,
    /// Per-client refresh token lifetime in seconds, overriding the endpoint default
    pub refresh_token_lifetime: Option<i64>,
    /// Per-client authorization code lifetime in seconds, overriding the endpoint default
    pub authorization_code_lifetime: Option<i64>,
}

impl Client {
    /// A client with the given id and grants and no lifetime overrides.
    #[must_use]
    pub fn new(id: &str, grants: &[&str]) -> Self {
        Self {
            id: id.to_owned(),
            grants: grants.iter().map(|&g| g.to_owned()).collect(),
            redirect_uris: Vec::new(),
            access_token_lifetime: None,
            refresh_token_lifetime: None,
            authorization_code_lifetime: None,
        }
    }
}

/// A resource owner.
///
/// The engine treats users as opaque; `username` is the only attribute
/// it reads (for introspection responses). Host-owned attributes ride in
/// `data`.
#[derive(Debug, Clone)]
pub struct User {
    /// Username reported by token introspection
    pub username: String,
    /// Host-defined attributes, opaque to the engine
    pub data: Map<String, Value>,
}

impl User {
    /// A user with the given username and no extra attributes.
    #[must_use]
    pub fn new(username: &str) -> Self {
        Self {
            username: username.to_owned(),
            data: Map::new(),
        }
    }
}

/// A single-use authorization code awaiting redemption.
#[derive(Debug, Clone)]
pub struct AuthorizationCode {
    /// The code value handed to the client on the redirect
    pub authorization_code: String,
    /// Redemption deadline; a code at or past this instant is dead
    pub expires_at: DateTime<Utc>,
    /// Redirect URI the code was issued for; must match exactly on redemption when set
    pub redirect_uri: Option<String>,
    /// Scope granted when the code was issued
    pub scope: Option<String>,
    /// Client the code was issued to
    pub client: Client,
    /// Resource owner who approved the request
    pub user: User,
}

/// A persisted token record.
#[derive(Debug, Clone)]
pub struct Token {
    /// The access token value
    pub access_token: String,
    /// When the access token expires
    pub access_token_expires_at: Option<DateTime<Utc>>,
    /// The refresh token value, when one was issued
    pub refresh_token: Option<String>,
    /// When the refresh token expires
    pub refresh_token_expires_at: Option<DateTime<Utc>>,
    /// Space-delimited granted scope
    pub scope: Option<String>,
    /// Client the token belongs to
    pub client: Client,
    /// Resource owner the token acts for
    pub user: User,
    /// Extended attributes the Model attached; copied onto the wire only
    /// when the token endpoint allows extended token attributes
    pub extra: Map<String, Value>,
}

impl Token {
    /// Seconds until the access token expires: floor((expires_at − now)/1000).
    #[must_use]
    pub fn access_token_lifetime(&self) -> Option<i64> {
        self.access_token_expires_at
            .map(|expires_at| (expires_at - Utc::now()).num_milliseconds().div_euclid(1000))
    }

    /// The wire representation of this token.
    #[must_use]
    pub fn bearer(&self, allow_extended_attributes: bool) -> BearerToken {
        BearerToken {
            access_token: self.access_token.clone(),
            token_type: "Bearer".to_owned(),
            expires_in: self.access_token_lifetime(),
            refresh_token: self.refresh_token.clone(),
            scope: self.scope.clone(),
            extra: if allow_extended_attributes {
                self.extra.clone()
            } else {
                Map::new()
            },
        }
    }
}

/// The RFC 6750 bearer token as serialized into the token response body.
#[derive(Debug, Clone, Serialize)]
pub struct BearerToken {
    /// The access token value
    pub access_token: String,
    /// Always `"Bearer"`
    pub token_type: String,
    /// Seconds until expiry, when the lifetime is known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_in: Option<i64>,
    /// The refresh token, when one was issued
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    /// Granted scope, when one was recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
    /// Extended attributes, flattened into the response object
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
