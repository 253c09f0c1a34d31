// ABOUTME: Main library entry point for the OAuth 2.0 authorization engine
// ABOUTME: Exposes the five protocol endpoints, the Model trait, and wire value objects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

#![deny(unsafe_code)]
#![warn(missing_docs)]

//! # oauth2-engine
//!
//! A reusable, framework-agnostic OAuth 2.0 authorization service core.
//! Implements the server side of RFC 6749 (Authorization Framework),
//! RFC 6750 (Bearer Token Usage), RFC 7662 (Token Introspection), and
//! RFC 7009 (Token Revocation).
//!
//! The engine mediates between untrusted HTTP actors and a trusted
//! data-access backend supplied by the host application (the [`Model`]
//! trait). It validates requests, authenticates participants, enforces
//! grant-flow state rules, mints and rotates credentials, and shapes
//! standards-compliant responses and redirects. Binding to a concrete
//! HTTP framework is the host's job: the engine consumes an
//! already-parsed [`Request`] and writes to a mutable [`Response`].
//!
//! ## Quick start
//!
//! ```rust,no_run
//! use std::collections::HashMap;
//! use std::sync::Arc;
//! use oauth2_engine::{MemoryModel, OAuth2Server, Request, Response, TokenOverrides};
//!
//! #[tokio::main]
//! async fn main() {
//!     let model = Arc::new(MemoryModel::new());
//!     let server = OAuth2Server::new(model);
//!
//!     // One parsed HTTP request in, one populated response out.
//!     let request = Request::new(
//!         "POST",
//!         HashMap::from([(
//!             "Content-Type".to_owned(),
//!             "application/x-www-form-urlencoded".to_owned(),
//!         )]),
//!         HashMap::new(),
//!         HashMap::from([
//!             ("grant_type".to_owned(), "client_credentials".to_owned()),
//!             ("client_id".to_owned(), "worker".to_owned()),
//!             ("client_secret".to_owned(), "s3cret".to_owned()),
//!         ]),
//!     );
//!     let mut response = Response::new();
//!
//!     if let Err(err) = server
//!         .token(&request, &mut response, &TokenOverrides::default())
//!         .await
//!     {
//!         eprintln!("token request rejected: {err}");
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! Each endpoint is a pipeline: parse, authenticate, authorize, mutate
//! state, shape response. Endpoints are independent; they share only the
//! [`Model`], the character-class validators, and the response helpers.
//! Errors unwind through a single per-endpoint catch point that writes
//! the error response before handing the error back to the host.

/// The five protocol endpoints as independent state machines
pub mod endpoints;

/// Named error kinds carrying wire codes, HTTP statuses, and descriptions
pub mod errors;

/// Grant flow executors and the shared token issuing core
pub mod grants;

/// In-memory reference implementation of the [`Model`] trait
pub mod memory;

/// The data-access capability set supplied by the host application
pub mod model;

/// Domain records: clients, users, codes, tokens, and the bearer wire form
pub mod models;

/// Per-endpoint option records, defaults, and per-call overlays
pub mod options;

/// Parsed HTTP request value object
pub mod request;

/// Mutable HTTP response builder
pub mod response;

/// The server facade holding defaults and delegating to endpoints
pub mod server;

/// Opaque random token generation
pub mod tokens;

/// RFC 6749 Appendix A character-class predicates
pub mod validators;

pub use endpoints::authenticate::AuthenticateEndpoint;
pub use endpoints::authorize::AuthorizeEndpoint;
pub use endpoints::introspect::IntrospectEndpoint;
pub use endpoints::revoke::RevokeEndpoint;
pub use endpoints::token::TokenEndpoint;
pub use errors::{ErrorKind, OAuthError};
pub use grants::Grant;
pub use memory::MemoryModel;
pub use model::{Authenticator, Model};
pub use models::{AuthorizationCode, BearerToken, Client, Token, User};
pub use options::{
    AuthenticateOptions, AuthenticateOverrides, AuthorizeOptions, AuthorizeOverrides,
    IntrospectOptions, IntrospectOverrides, RevokeOptions, RevokeOverrides, ServerOptions,
    TokenOptions, TokenOverrides,
};
pub use request::Request;
pub use response::Response;
pub use server::OAuth2Server;
