// ABOUTME: Integration tests for the token endpoint and the four standard grants
// ABOUTME: Covers bearer composition, rotation ordering, and client authentication rules
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::*;
use oauth2_engine::errors::ErrorKind;
use oauth2_engine::grants::{Grant, TokenIssuer};
use oauth2_engine::{
    Client, Model, Request, Response, Token, TokenOptions, TokenOverrides, User,
};
use serde_json::Map;
use std::collections::HashMap;
use std::sync::Arc;

// =============================================================================
// Password grant
// =============================================================================

#[tokio::test]
async fn password_grant_issues_bearer_token() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
        model.register_user(User::new("alice"), "pw");
    });

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "alice"),
        ("password", "pw"),
        ("scope", "read"),
    ]);
    let mut response = Response::new();

    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("cache-control"), Some("no-store"));
    assert_eq!(response.header("pragma"), Some("no-cache"));
    assert_eq!(
        response.header("content-type"),
        Some("application/json;charset=UTF-8")
    );

    let body = response.body();
    assert_hex40(body["access_token"].as_str().unwrap());
    assert_hex40(body["refresh_token"].as_str().unwrap());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["scope"], "read");
    let expires_in = body["expires_in"].as_i64().unwrap();
    assert!((1798..=1800).contains(&expires_in), "expires_in {expires_in}");
}

#[tokio::test]
async fn password_grant_rejects_bad_credentials() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
        model.register_user(User::new("alice"), "pw");
    });

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "alice"),
        ("password", "wrong"),
    ]);
    let mut response = Response::new();

    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGrant);
    assert_eq!(response.status(), 400);
    assert_eq!(response.body()["error"], "invalid_grant");
}

#[tokio::test]
async fn password_grant_rejects_newline_in_username() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "ali\nce"),
        ("password", "pw"),
    ]);
    let mut response = Response::new();

    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

// =============================================================================
// Client credentials grant
// =============================================================================

#[tokio::test]
async fn client_credentials_grant_issues_access_token_only() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("worker", &["client_credentials"]), Some("s1"));
        model.set_client_user("worker", User::new("service"));
    });

    let request = post_form(&[
        ("grant_type", "client_credentials"),
        ("client_id", "worker"),
        ("client_secret", "s1"),
        ("scope", "jobs"),
    ]);
    let mut response = Response::new();

    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();

    let body = response.body();
    assert_hex40(body["access_token"].as_str().unwrap());
    assert_eq!(body["scope"], "jobs");
    assert!(body.get("refresh_token").is_none(), "no refresh token for client_credentials");
}

#[tokio::test]
async fn client_credentials_grant_requires_a_bound_user() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("worker", &["client_credentials"]), Some("s1"));
    });

    let request = post_form(&[
        ("grant_type", "client_credentials"),
        ("client_id", "worker"),
        ("client_secret", "s1"),
    ]);
    let mut response = Response::new();

    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGrant);
}

// =============================================================================
// Refresh token grant
// =============================================================================

#[tokio::test]
async fn refresh_grant_rotates_and_revokes_before_saving() {
    let client = Client::new("c1", &["refresh_token"]);
    let user = User::new("alice");
    let (model, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.insert_refresh_token(live_token("a0", Some("R1"), Some("read"), &client, &user));
    });

    let request = post_form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", "R1"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        // the scope parameter has no effect on a refresh exchange
        ("scope", "admin"),
    ]);
    let mut response = Response::new();

    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();

    let body = response.body();
    let new_refresh = body["refresh_token"].as_str().unwrap();
    assert_ne!(new_refresh, "R1");
    assert_eq!(body["scope"], "read");

    let journal = model.journal();
    let revoke_at = journal
        .iter()
        .position(|e| e == "revoke_refresh_token:R1")
        .expect("old refresh token revoked");
    let save_at = journal
        .iter()
        .position(|e| e.starts_with("save_token:"))
        .expect("new token saved");
    assert!(revoke_at < save_at, "revocation must precede the save");

    // the rotated token is live, the old one is gone
    assert!(model.stored_refresh_token(new_refresh).is_some());
    assert!(model.stored_refresh_token("R1").is_none());
}

#[tokio::test]
async fn refresh_grant_keeps_old_token_when_rotation_is_off() {
    let client = Client::new("c1", &["refresh_token"]);
    let user = User::new("alice");
    let (model, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.insert_refresh_token(live_token("a0", Some("R1"), Some("read"), &client, &user));
    });

    let request = post_form(&[
        ("grant_type", "refresh_token"),
        ("refresh_token", "R1"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
    ]);
    let mut response = Response::new();

    let overrides = TokenOverrides {
        always_issue_new_refresh_token: Some(false),
        ..TokenOverrides::default()
    };
    server.token(&request, &mut response, &overrides).await.unwrap();

    assert!(response.body().get("refresh_token").is_none());
    assert!(model.stored_refresh_token("R1").is_some(), "old token still live");
    assert!(!model.journal().iter().any(|e| e.starts_with("revoke_refresh_token:")));
}

#[tokio::test]
async fn refresh_grant_rejects_expired_and_foreign_tokens() {
    let owner = Client::new("c1", &["refresh_token"]);
    let other = Client::new("c2", &["refresh_token"]);
    let user = User::new("alice");
    let (_, server) = server_with_model(|model| {
        model.register_client(owner.clone(), Some("s1"));
        model.register_client(other.clone(), Some("s2"));

        let mut expired = live_token("a0", Some("R-expired"), None, &owner, &user);
        expired.refresh_token_expires_at = Some(Utc::now() - Duration::seconds(1));
        model.insert_refresh_token(expired);

        model.insert_refresh_token(live_token("a1", Some("R-foreign"), None, &other, &user));
    });

    let mut response = Response::new();
    let err = server
        .token(
            &post_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", "R-expired"),
                ("client_id", "c1"),
                ("client_secret", "s1"),
            ]),
            &mut response,
            &TokenOverrides::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGrant);

    let mut response = Response::new();
    let err = server
        .token(
            &post_form(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", "R-foreign"),
                ("client_id", "c1"),
                ("client_secret", "s1"),
            ]),
            &mut response,
            &TokenOverrides::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidGrant);
}

// =============================================================================
// Request validation and client authentication
// =============================================================================

#[tokio::test]
async fn non_post_and_non_form_requests_are_rejected() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let get = Request::new(
        "GET",
        pairs(&[("content-type", "application/x-www-form-urlencoded")]),
        HashMap::new(),
        pairs(&[("grant_type", "password")]),
    );
    let mut response = Response::new();
    let err = server
        .token(&get, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    let json = Request::new(
        "POST",
        pairs(&[("content-type", "application/json")]),
        HashMap::new(),
        pairs(&[("grant_type", "password")]),
    );
    let mut response = Response::new();
    let err = server
        .token(&json, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn unknown_grant_type_is_unsupported() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let request = post_form(&[
        ("grant_type", "device_code"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
    ]);
    let mut response = Response::new();
    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedGrantType);
    assert_eq!(response.body()["error"], "unsupported_grant_type");
}

#[tokio::test]
async fn grant_not_registered_for_client_is_unauthorized() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["authorization_code"]), Some("s1"));
        model.register_user(User::new("alice"), "pw");
    });

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "alice"),
        ("password", "pw"),
    ]);
    let mut response = Response::new();
    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnauthorizedClient);
}

#[tokio::test]
async fn invalid_client_with_basic_header_answers_401_challenge() {
    let (_, server) = server_with_model(|_| {});

    // base64("ghost:nope")
    let request = post_form_with_headers(
        &[("authorization", "Basic Z2hvc3Q6bm9wZQ==")],
        &[("grant_type", "password"), ("username", "a"), ("password", "b")],
    );
    let mut response = Response::new();

    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidClient);
    assert_eq!(err.status(), 401);
    assert_eq!(response.status(), 401);
    assert_eq!(
        response.header("www-authenticate"),
        Some("Basic realm=\"Service\"")
    );
    assert_eq!(response.body()["error"], "invalid_client");
}

#[tokio::test]
async fn invalid_client_without_header_stays_400() {
    let (_, server) = server_with_model(|_| {});

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "ghost"),
        ("client_secret", "nope"),
        ("username", "a"),
        ("password", "b"),
    ]);
    let mut response = Response::new();

    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidClient);
    assert_eq!(response.status(), 400);
    assert!(response.header("www-authenticate").is_none());
}

#[tokio::test]
async fn basic_header_overrides_body_credentials() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
        model.register_user(User::new("alice"), "pw");
    });

    // base64("c1:s1"); the body names a different client entirely
    let request = post_form_with_headers(
        &[("authorization", "Basic YzE6czE=")],
        &[
            ("grant_type", "password"),
            ("client_id", "evil"),
            ("client_secret", "wrong"),
            ("username", "alice"),
            ("password", "pw"),
        ],
    );
    let mut response = Response::new();

    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();
    assert_eq!(response.status(), 200);
}

#[tokio::test]
async fn client_secret_can_be_waived_per_grant() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("spa", &["password"]), None);
        model.register_user(User::new("alice"), "pw");
    });

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "spa"),
        ("username", "alice"),
        ("password", "pw"),
    ]);

    // required by default
    let mut response = Response::new();
    let err = server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    // waived for the password grant
    let overrides = TokenOverrides {
        require_client_authentication: Some(HashMap::from([("password".to_owned(), false)])),
        ..TokenOverrides::default()
    };
    let mut response = Response::new();
    server.token(&request, &mut response, &overrides).await.unwrap();
    assert_eq!(response.status(), 200);
}

// =============================================================================
// Lifetimes and extended attributes
// =============================================================================

#[tokio::test]
async fn client_lifetime_overrides_win_over_options() {
    let mut client = Client::new("c1", &["password"]);
    client.access_token_lifetime = Some(60);
    let (_, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.register_user(User::new("alice"), "pw");
    });

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "alice"),
        ("password", "pw"),
    ]);
    let mut response = Response::new();
    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();

    let expires_in = response.body()["expires_in"].as_i64().unwrap();
    assert!((58..=60).contains(&expires_in), "expires_in {expires_in}");
}

// =============================================================================
// Extension grants
// =============================================================================

struct AssertionGrant;

#[async_trait::async_trait]
impl Grant for AssertionGrant {
    async fn execute(
        &self,
        request: &Request,
        _response: &mut Response,
        client: &Client,
        issuer: &TokenIssuer,
    ) -> Result<Token, oauth2_engine::OAuthError> {
        let subject = request
            .body_param("assertion")
            .ok_or_else(|| oauth2_engine::OAuthError::invalid_request("missing parameter: assertion"))?;
        let user = User::new(subject);
        let access_token = issuer.generate_access_token(client, &user, None).await?;
        issuer
            .save(Token {
                access_token,
                access_token_expires_at: Some(issuer.access_token_expires_at()),
                refresh_token: None,
                refresh_token_expires_at: None,
                scope: None,
                client: client.clone(),
                user,
                extra: Map::new(),
            })
            .await
    }
}

#[tokio::test]
async fn extension_grants_dispatch_by_uri_identifier() {
    const GRANT_URI: &str = "urn:example:assertion";

    let (model, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &[GRANT_URI]), Some("s1"));
    });

    let overrides = TokenOverrides {
        extended_grant_types: Some(HashMap::from([(
            GRANT_URI.to_owned(),
            Arc::new(AssertionGrant) as Arc<dyn Grant>,
        )])),
        ..TokenOverrides::default()
    };

    let request = post_form(&[
        ("grant_type", GRANT_URI),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("assertion", "bob"),
    ]);
    let mut response = Response::new();
    server.token(&request, &mut response, &overrides).await.unwrap();

    let access_token = response.body()["access_token"].as_str().unwrap().to_owned();
    let saved = model.stored_access_token(&access_token).unwrap();
    assert_eq!(saved.user.username, "bob");
}

// =============================================================================
// Custom Model generators
// =============================================================================

struct PrefixedTokenModel {
    inner: oauth2_engine::MemoryModel,
}

#[async_trait::async_trait]
impl Model for PrefixedTokenModel {
    async fn get_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> anyhow::Result<Option<Client>> {
        self.inner.get_client(client_id, client_secret).await
    }

    async fn get_user(&self, username: &str, password: &str) -> anyhow::Result<Option<User>> {
        self.inner.get_user(username, password).await
    }

    async fn save_token(&self, token: &Token) -> anyhow::Result<Option<Token>> {
        self.inner.save_token(token).await
    }

    async fn get_access_token(&self, access_token: &str) -> anyhow::Result<Option<Token>> {
        self.inner.get_access_token(access_token).await
    }

    async fn generate_access_token(
        &self,
        _client: &Client,
        user: &User,
        _scope: Option<&str>,
    ) -> anyhow::Result<Option<String>> {
        Ok(Some(format!("at-{}", user.username)))
    }
}

#[tokio::test]
async fn model_generator_hook_replaces_the_default() {
    let inner = oauth2_engine::MemoryModel::new();
    inner.register_client(Client::new("c1", &["password"]), Some("s1"));
    inner.register_user(User::new("alice"), "pw");
    let server = oauth2_engine::OAuth2Server::new(Arc::new(PrefixedTokenModel { inner }));

    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "alice"),
        ("password", "pw"),
    ]);
    let mut response = Response::new();
    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();

    assert_eq!(response.body()["access_token"], "at-alice");
    // the refresh token still comes from the engine's generator
    assert_hex40(response.body()["refresh_token"].as_str().unwrap());
}

// =============================================================================
// Option plumbing
// =============================================================================

#[tokio::test]
async fn overrides_do_not_leak_between_calls() {
    let client = Client::new("c1", &["password"]);
    let (_, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.register_user(User::new("alice"), "pw");
    });
    let request = post_form(&[
        ("grant_type", "password"),
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("username", "alice"),
        ("password", "pw"),
    ]);

    let shortened = TokenOverrides {
        access_token_lifetime: Some(5),
        ..TokenOverrides::default()
    };
    let mut response = Response::new();
    server.token(&request, &mut response, &shortened).await.unwrap();
    assert!(response.body()["expires_in"].as_i64().unwrap() <= 5);

    // the next call sees the defaults again
    let mut response = Response::new();
    server
        .token(&request, &mut response, &TokenOverrides::default())
        .await
        .unwrap();
    assert!(response.body()["expires_in"].as_i64().unwrap() > 1700);
}

#[tokio::test]
async fn token_options_defaults_match_spec() {
    let options = TokenOptions::default();
    assert_eq!(options.access_token_lifetime, 1800);
    assert_eq!(options.refresh_token_lifetime, 86400);
    assert!(options.always_issue_new_refresh_token);
}
