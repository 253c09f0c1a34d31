// ABOUTME: Integration tests for the introspection and revocation endpoints
// ABOUTME: Covers active/inactive reporting, ownership checks, and RFC 7009's 200-always rule
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
#![allow(missing_docs)]

mod common;

use chrono::{Duration, Utc};
use common::*;
use oauth2_engine::errors::ErrorKind;
use oauth2_engine::{Client, IntrospectOverrides, Response, RevokeOverrides, User};

// =============================================================================
// Introspection
// =============================================================================

#[tokio::test]
async fn unknown_token_introspects_as_inactive() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "unknown"),
        ("token_hint", "access_token"),
    ]);
    let mut response = Response::new();

    server
        .introspect(&request, &mut response, &IntrospectOverrides::default())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert_eq!(response.header("cache-control"), Some("no-store"));
    assert_eq!(response.header("pragma"), Some("no-cache"));
    assert_eq!(response.body()["active"], false);
    assert_eq!(response.body().len(), 1, "inactive reports carry no metadata");
}

#[tokio::test]
async fn live_access_token_introspects_with_metadata() {
    let client = Client::new("c1", &["password"]);
    let (_, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.insert_access_token(live_token(
            "tok-1",
            None,
            Some("read"),
            &client,
            &User::new("alice"),
        ));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "tok-1"),
        ("token_hint", "access_token"),
    ]);
    let mut response = Response::new();

    server
        .introspect(&request, &mut response, &IntrospectOverrides::default())
        .await
        .unwrap();

    let body = response.body();
    assert_eq!(body["active"], true);
    assert_eq!(body["client_id"], "c1");
    assert_eq!(body["username"], "alice");
    assert_eq!(body["scope"], "read");
    let expires_at = body["expires_at"].as_i64().unwrap();
    assert!(expires_at > Utc::now().timestamp());
}

#[tokio::test]
async fn expired_and_foreign_tokens_introspect_as_inactive() {
    let owner = Client::new("c1", &["password"]);
    let other = Client::new("c2", &["password"]);
    let (_, server) = server_with_model(|model| {
        model.register_client(owner.clone(), Some("s1"));
        model.register_client(other.clone(), Some("s2"));
        model.insert_access_token(token_expiring_at(
            "tok-expired",
            None,
            None,
            &owner,
            &User::new("alice"),
            Utc::now() - Duration::seconds(1),
        ));
        model.insert_access_token(live_token(
            "tok-foreign",
            None,
            None,
            &other,
            &User::new("bob"),
        ));
    });

    for token in ["tok-expired", "tok-foreign"] {
        let request = post_form(&[
            ("client_id", "c1"),
            ("client_secret", "s1"),
            ("token", token),
            ("token_hint", "access_token"),
        ]);
        let mut response = Response::new();
        server
            .introspect(&request, &mut response, &IntrospectOverrides::default())
            .await
            .unwrap();
        assert_eq!(response.body()["active"], false, "token {token}");
    }
}

#[tokio::test]
async fn refresh_hint_reads_the_refresh_token_store() {
    let client = Client::new("c1", &["refresh_token"]);
    let (_, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.insert_refresh_token(live_token(
            "a1",
            Some("R1"),
            Some("read"),
            &client,
            &User::new("alice"),
        ));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "R1"),
        ("token_hint", "refresh_token"),
    ]);
    let mut response = Response::new();

    server
        .introspect(&request, &mut response, &IntrospectOverrides::default())
        .await
        .unwrap();
    assert_eq!(response.body()["active"], true);
    assert_eq!(response.body()["username"], "alice");
}

#[tokio::test]
async fn bad_hint_and_missing_token_are_parse_errors() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let mut response = Response::new();
    let err = server
        .introspect(
            &post_form(&[
                ("client_id", "c1"),
                ("client_secret", "s1"),
                ("token", "tok"),
                ("token_hint", "id_token"),
            ]),
            &mut response,
            &IntrospectOverrides::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::UnsupportedTokenType);

    let mut response = Response::new();
    let err = server
        .introspect(
            &post_form(&[
                ("client_id", "c1"),
                ("client_secret", "s1"),
                ("token_hint", "access_token"),
            ]),
            &mut response,
            &IntrospectOverrides::default(),
        )
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);
}

#[tokio::test]
async fn introspect_client_auth_honors_the_secret_requirement() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("token", "tok"),
        ("token_hint", "access_token"),
    ]);

    // secret required by default
    let mut response = Response::new();
    let err = server
        .introspect(&request, &mut response, &IntrospectOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidRequest);

    // waived by the host
    let overrides = IntrospectOverrides {
        is_client_secret_required: Some(false),
    };
    let mut response = Response::new();
    server.introspect(&request, &mut response, &overrides).await.unwrap();
    assert_eq!(response.body()["active"], false);
}

#[tokio::test]
async fn introspect_invalid_client_with_basic_header_answers_401() {
    let (_, server) = server_with_model(|_| {});

    // base64("ghost:nope")
    let request = post_form_with_headers(
        &[("authorization", "Basic Z2hvc3Q6bm9wZQ==")],
        &[("token", "tok"), ("token_hint", "access_token")],
    );
    let mut response = Response::new();

    let err = server
        .introspect(&request, &mut response, &IntrospectOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidClient);
    assert_eq!(response.status(), 401);
    assert_eq!(
        response.header("www-authenticate"),
        Some("Basic realm=\"Service\"")
    );
}

// =============================================================================
// Revocation
// =============================================================================

#[tokio::test]
async fn revoking_an_unknown_token_still_succeeds() {
    let (model, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "unknown"),
        ("token_hint", "refresh_token"),
    ]);
    let mut response = Response::new();

    server
        .revoke(&request, &mut response, &RevokeOverrides::default())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.body().is_empty(), "revocation succeeds with an empty body");
    assert!(
        !model.journal().iter().any(|e| e.starts_with("revoke_")),
        "no revocation reaches the model for an unknown token"
    );
}

#[tokio::test]
async fn revoking_an_owned_refresh_token_invalidates_it() {
    let client = Client::new("c1", &["refresh_token"]);
    let (model, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.insert_refresh_token(live_token(
            "a1",
            Some("R1"),
            None,
            &client,
            &User::new("alice"),
        ));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "R1"),
        ("token_hint", "refresh_token"),
    ]);
    let mut response = Response::new();

    server
        .revoke(&request, &mut response, &RevokeOverrides::default())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(response.body().is_empty());
    assert!(model.stored_refresh_token("R1").is_none());
    assert!(model
        .journal()
        .contains(&"revoke_refresh_token:R1".to_owned()));
}

#[tokio::test]
async fn revoking_a_foreign_token_is_silently_ignored() {
    let owner = Client::new("c1", &["password"]);
    let other = Client::new("c2", &["password"]);
    let (model, server) = server_with_model(|model| {
        model.register_client(owner.clone(), Some("s1"));
        model.register_client(other.clone(), Some("s2"));
        model.insert_access_token(live_token(
            "tok-foreign",
            None,
            None,
            &other,
            &User::new("bob"),
        ));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "tok-foreign"),
        ("token_hint", "access_token"),
    ]);
    let mut response = Response::new();

    server
        .revoke(&request, &mut response, &RevokeOverrides::default())
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    assert!(model.stored_access_token("tok-foreign").is_some(), "token untouched");
    assert!(!model.journal().iter().any(|e| e.starts_with("revoke_")));
}

#[tokio::test]
async fn revoking_an_owned_access_token_invalidates_it() {
    let client = Client::new("c1", &["password"]);
    let (model, server) = server_with_model(|model| {
        model.register_client(client.clone(), Some("s1"));
        model.insert_access_token(live_token(
            "tok-1",
            None,
            None,
            &client,
            &User::new("alice"),
        ));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "s1"),
        ("token", "tok-1"),
        ("token_hint", "access_token"),
    ]);
    let mut response = Response::new();

    server
        .revoke(&request, &mut response, &RevokeOverrides::default())
        .await
        .unwrap();
    assert!(model.stored_access_token("tok-1").is_none());
}

#[tokio::test]
async fn revoke_rejects_unauthenticated_clients() {
    let (_, server) = server_with_model(|model| {
        model.register_client(Client::new("c1", &["password"]), Some("s1"));
    });

    let request = post_form(&[
        ("client_id", "c1"),
        ("client_secret", "wrong"),
        ("token", "tok"),
        ("token_hint", "access_token"),
    ]);
    let mut response = Response::new();

    let err = server
        .revoke(&request, &mut response, &RevokeOverrides::default())
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::InvalidClient);
    assert_eq!(response.status(), 400);
    assert_eq!(response.body()["error"], "invalid_client");
}
