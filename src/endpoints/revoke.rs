// ABOUTME: RFC 7009 token revocation endpoint
// ABOUTME: Invalidates caller-owned tokens; answers 200 regardless of token fate
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::endpoints::{parse_token_hint_request, TokenHint};
use crate::errors::{ErrorKind, OAuthError};
use crate::model::{model_error, Model};
use crate::options::RevokeOptions;
use crate::request::Request;
use crate::response::Response;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// The revocation endpoint state machine.
pub struct RevokeEndpoint {
    model: Arc<dyn Model>,
}

impl RevokeEndpoint {
    /// A revocation endpoint over the given Model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self { model }
    }

    /// Run the pipeline. Per RFC 7009 §2.2 the response is 200 with an
    /// empty body whether or not the token existed or belonged to the
    /// caller; only parse and client-authentication failures error.
    ///
    /// # Errors
    /// Returns the protocol error after writing the error response.
    pub async fn execute(
        &self,
        request: &Request,
        response: &mut Response,
        options: &RevokeOptions,
    ) -> Result<(), OAuthError> {
        match self.handle(request, options).await {
            Ok(()) => Ok(()),
            Err(err) => {
                let err = if err.kind() == ErrorKind::InvalidClient
                    && request.header("authorization").is_some()
                {
                    response.set_header("www-authenticate", "Basic realm=\"Service\"");
                    err.with_status(401)
                } else {
                    err
                };
                response.set_status(err.status());
                response.set_body(err.body());
                Err(err)
            }
        }
    }

    async fn handle(&self, request: &Request, options: &RevokeOptions) -> Result<(), OAuthError> {
        let (credentials, token_value, hint) =
            parse_token_hint_request(request, options.is_client_secret_required)?;

        let client = self
            .model
            .get_client(&credentials.client_id, credentials.client_secret.as_deref())
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %credentials.client_id, "client authentication failed");
                OAuthError::invalid_client("client is invalid")
            })?;

        let token = match hint {
            TokenHint::AccessToken => self.model.get_access_token(&token_value).await,
            TokenHint::RefreshToken => self.model.get_refresh_token(&token_value).await,
        }
        .map_err(model_error)?;

        // Unknown and foreign tokens are silently ignored; revealing
        // their existence would leak other clients' state.
        match token.filter(|t| t.client.id == client.id) {
            None => {
                debug!(client_id = %client.id, "revocation target unknown or foreign, ignoring");
            }
            Some(token) => {
                let revoked = match hint {
                    TokenHint::AccessToken => self.model.revoke_access_token(&token).await,
                    TokenHint::RefreshToken => self.model.revoke_refresh_token(&token).await,
                }
                .map_err(model_error)?;
                if revoked {
                    info!(client_id = %client.id, "token revoked");
                } else {
                    warn!(client_id = %client.id, "model declined to revoke token");
                }
            }
        }

        Ok(())
    }
}
