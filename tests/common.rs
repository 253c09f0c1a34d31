// ABOUTME: Shared test fixtures for the OAuth 2.0 engine integration tests
// ABOUTME: Request builders and a pre-wired in-memory model plus server
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::missing_panics_doc,
    clippy::must_use_candidate
)]

//! Shared fixtures for `oauth2-engine` integration tests.

use chrono::{DateTime, Duration, Utc};
use oauth2_engine::{Client, MemoryModel, OAuth2Server, Request, Token, User};
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Arc;

/// Build a string map from a slice of pairs.
pub fn pairs(entries: &[(&str, &str)]) -> HashMap<String, String> {
    entries
        .iter()
        .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
        .collect()
}

/// A form-encoded POST request with the given body fields.
pub fn post_form(body: &[(&str, &str)]) -> Request {
    post_form_with_headers(&[], body)
}

/// A form-encoded POST request with extra headers.
pub fn post_form_with_headers(headers: &[(&str, &str)], body: &[(&str, &str)]) -> Request {
    let mut all_headers = pairs(headers);
    all_headers.insert(
        "content-type".to_owned(),
        "application/x-www-form-urlencoded".to_owned(),
    );
    Request::new("POST", all_headers, HashMap::new(), pairs(body))
}

/// A GET request carrying only query parameters.
pub fn get_with_query(query: &[(&str, &str)]) -> Request {
    Request::new("GET", HashMap::new(), pairs(query), HashMap::new())
}

/// A GET request with headers and query parameters.
pub fn get_with_headers(headers: &[(&str, &str)], query: &[(&str, &str)]) -> Request {
    Request::new("GET", pairs(headers), pairs(query), HashMap::new())
}

/// An in-memory model and a server over it; `seed` runs before the
/// server is built.
pub fn server_with_model<F>(seed: F) -> (Arc<MemoryModel>, OAuth2Server)
where
    F: FnOnce(&MemoryModel),
{
    let model = Arc::new(MemoryModel::new());
    seed(&model);
    let server = OAuth2Server::new(Arc::clone(&model) as Arc<dyn oauth2_engine::Model>);
    (model, server)
}

/// A client with redirect URIs attached.
pub fn client_with_redirects(id: &str, grants: &[&str], redirect_uris: &[&str]) -> Client {
    let mut client = Client::new(id, grants);
    client.redirect_uris = redirect_uris.iter().map(|&u| u.to_owned()).collect();
    client
}

/// A live token record for the given client and user.
pub fn live_token(
    access_token: &str,
    refresh_token: Option<&str>,
    scope: Option<&str>,
    client: &Client,
    user: &User,
) -> Token {
    token_expiring_at(
        access_token,
        refresh_token,
        scope,
        client,
        user,
        Utc::now() + Duration::hours(1),
    )
}

/// A token record with explicit access-token expiry.
pub fn token_expiring_at(
    access_token: &str,
    refresh_token: Option<&str>,
    scope: Option<&str>,
    client: &Client,
    user: &User,
    access_token_expires_at: DateTime<Utc>,
) -> Token {
    Token {
        access_token: access_token.to_owned(),
        access_token_expires_at: Some(access_token_expires_at),
        refresh_token: refresh_token.map(str::to_owned),
        refresh_token_expires_at: refresh_token.map(|_| Utc::now() + Duration::days(14)),
        scope: scope.map(str::to_owned),
        client: client.clone(),
        user: user.clone(),
        extra: Map::new(),
    }
}

/// Assert a string is a 40-character lowercase hex token.
pub fn assert_hex40(value: &str) {
    assert_eq!(value.len(), 40, "expected a 40-char token, got {value:?}");
    assert!(
        value
            .chars()
            .all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()),
        "expected lowercase hex, got {value:?}"
    );
}
