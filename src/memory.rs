// ABOUTME: In-memory reference implementation of the Model trait
// ABOUTME: Backs the crate's own tests and host smoke tests; records a call journal
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::model::Model;
use crate::models::{AuthorizationCode, Client, Token, User};
use anyhow::Result;
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Default)]
struct MemoryState {
    clients: HashMap<String, (Client, Option<String>)>,
    users: HashMap<String, (User, String)>,
    client_users: HashMap<String, User>,
    codes: HashMap<String, AuthorizationCode>,
    access_tokens: HashMap<String, Token>,
    refresh_tokens: HashMap<String, Token>,
    valid_scopes: Option<HashSet<String>>,
    journal: Vec<String>,
}

/// A complete in-process [`Model`] over mutex-guarded hash maps.
///
/// Registered state goes in through the `register_*`/`insert_*` methods;
/// every mutating Model call is appended to a journal so tests can
/// assert ordering and once-only semantics.
#[derive(Default)]
pub struct MemoryModel {
    state: Mutex<MemoryState>,
}

impl MemoryModel {
    /// An empty model.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, MemoryState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a client with an optional secret.
    pub fn register_client(&self, client: Client, secret: Option<&str>) {
        self.state()
            .clients
            .insert(client.id.clone(), (client, secret.map(str::to_owned)));
    }

    /// Register a resource owner with a password.
    pub fn register_user(&self, user: User, password: &str) {
        self.state()
            .users
            .insert(user.username.clone(), (user, password.to_owned()));
    }

    /// Bind the user a client acts as under the client-credentials grant.
    pub fn set_client_user(&self, client_id: &str, user: User) {
        self.state().client_users.insert(client_id.to_owned(), user);
    }

    /// Restrict `validate_scope` to the given scope identifiers; a
    /// request naming anything else is rejected.
    pub fn restrict_scopes<'a, I>(&self, scopes: I)
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.state().valid_scopes =
            Some(scopes.into_iter().map(str::to_owned).collect());
    }

    /// Seed an access token record.
    pub fn insert_access_token(&self, token: Token) {
        self.state()
            .access_tokens
            .insert(token.access_token.clone(), token);
    }

    /// Seed a refresh token record.
    pub fn insert_refresh_token(&self, token: Token) {
        if let Some(refresh_token) = token.refresh_token.clone() {
            self.state().refresh_tokens.insert(refresh_token, token);
        }
    }

    /// Seed an authorization code record.
    pub fn insert_authorization_code(&self, code: AuthorizationCode) {
        self.state()
            .codes
            .insert(code.authorization_code.clone(), code);
    }

    /// The mutation journal, in call order.
    #[must_use]
    pub fn journal(&self) -> Vec<String> {
        self.state().journal.clone()
    }

    /// A stored access token, if any.
    #[must_use]
    pub fn stored_access_token(&self, access_token: &str) -> Option<Token> {
        self.state().access_tokens.get(access_token).cloned()
    }

    /// A stored refresh token, if any.
    #[must_use]
    pub fn stored_refresh_token(&self, refresh_token: &str) -> Option<Token> {
        self.state().refresh_tokens.get(refresh_token).cloned()
    }

    /// A stored authorization code, if any.
    #[must_use]
    pub fn stored_authorization_code(&self, code: &str) -> Option<AuthorizationCode> {
        self.state().codes.get(code).cloned()
    }
}

#[async_trait]
impl Model for MemoryModel {
    async fn get_client(
        &self,
        client_id: &str,
        client_secret: Option<&str>,
    ) -> Result<Option<Client>> {
        let state = self.state();
        let Some((client, stored_secret)) = state.clients.get(client_id) else {
            return Ok(None);
        };
        if let Some(given) = client_secret {
            if stored_secret.as_deref() != Some(given) {
                return Ok(None);
            }
        }
        Ok(Some(client.clone()))
    }

    async fn get_user(&self, username: &str, password: &str) -> Result<Option<User>> {
        let state = self.state();
        Ok(state
            .users
            .get(username)
            .filter(|(_, stored)| stored == password)
            .map(|(user, _)| user.clone()))
    }

    async fn get_user_from_client(&self, client: &Client) -> Result<Option<User>> {
        Ok(self.state().client_users.get(&client.id).cloned())
    }

    async fn validate_scope(
        &self,
        _client: &Client,
        _user: &User,
        scope: Option<&str>,
    ) -> Result<Option<String>> {
        let state = self.state();
        match (scope, &state.valid_scopes) {
            (None, _) => Ok(None),
            (Some(scope), None) => Ok(Some(scope.to_owned())),
            (Some(scope), Some(valid)) => {
                if scope.split(' ').all(|s| valid.contains(s)) {
                    Ok(Some(scope.to_owned()))
                } else {
                    Ok(None)
                }
            }
        }
    }

    async fn verify_scope(&self, token: &Token, required_scope: &str) -> Result<bool> {
        let granted: HashSet<&str> = token
            .scope
            .as_deref()
            .unwrap_or("")
            .split(' ')
            .filter(|s| !s.is_empty())
            .collect();
        Ok(required_scope
            .split(' ')
            .filter(|s| !s.is_empty())
            .all(|s| granted.contains(s)))
    }

    async fn save_authorization_code(
        &self,
        code: &AuthorizationCode,
    ) -> Result<Option<AuthorizationCode>> {
        let mut state = self.state();
        state
            .journal
            .push(format!("save_authorization_code:{}", code.authorization_code));
        state
            .codes
            .insert(code.authorization_code.clone(), code.clone());
        Ok(Some(code.clone()))
    }

    async fn get_authorization_code(&self, code: &str) -> Result<Option<AuthorizationCode>> {
        Ok(self.state().codes.get(code).cloned())
    }

    async fn revoke_authorization_code(&self, code: &AuthorizationCode) -> Result<bool> {
        let mut state = self.state();
        state
            .journal
            .push(format!("revoke_authorization_code:{}", code.authorization_code));
        Ok(state.codes.remove(&code.authorization_code).is_some())
    }

    async fn save_token(&self, token: &Token) -> Result<Option<Token>> {
        let mut state = self.state();
        state
            .journal
            .push(format!("save_token:{}", token.access_token));
        state
            .access_tokens
            .insert(token.access_token.clone(), token.clone());
        if let Some(refresh_token) = token.refresh_token.clone() {
            state.refresh_tokens.insert(refresh_token, token.clone());
        }
        Ok(Some(token.clone()))
    }

    async fn get_access_token(&self, access_token: &str) -> Result<Option<Token>> {
        Ok(self.state().access_tokens.get(access_token).cloned())
    }

    async fn get_refresh_token(&self, refresh_token: &str) -> Result<Option<Token>> {
        Ok(self.state().refresh_tokens.get(refresh_token).cloned())
    }

    async fn revoke_access_token(&self, token: &Token) -> Result<bool> {
        let mut state = self.state();
        state
            .journal
            .push(format!("revoke_access_token:{}", token.access_token));
        Ok(state.access_tokens.remove(&token.access_token).is_some())
    }

    async fn revoke_refresh_token(&self, token: &Token) -> Result<bool> {
        let Some(refresh_token) = token.refresh_token.as_deref() else {
            return Ok(false);
        };
        let mut state = self.state();
        state
            .journal
            .push(format!("revoke_refresh_token:{refresh_token}"));
        Ok(state.refresh_tokens.remove(refresh_token).is_some())
    }
}
