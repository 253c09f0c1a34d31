// ABOUTME: RFC 6749 authorization endpoint: code and implicit response types
// ABOUTME: Authenticates the resource owner, validates the client, composes redirects
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use crate::endpoints::authenticate::AuthenticateEndpoint;
use crate::errors::{ErrorKind, OAuthError};
use crate::grants::{Grant, ImplicitGrant, TokenIssuer};
use crate::model::{model_error, Model};
use crate::models::{AuthorizationCode, Client, User};
use crate::options::{AuthenticateOptions, AuthorizeOptions};
use crate::request::Request;
use crate::response::Response;
use crate::validators;
use chrono::{Duration, Utc};
use std::sync::Arc;
use tracing::{debug, warn};
use url::form_urlencoded;
use url::Url;

/// The authorization endpoint state machine.
pub struct AuthorizeEndpoint {
    model: Arc<dyn Model>,
    authenticate: AuthenticateEndpoint,
}

/// The validated parameters of an authorization request.
struct AuthorizationRequest<'a> {
    response_type: &'a str,
    redirect_uri: &'a str,
    client_id: &'a str,
    scope: Option<&'a str>,
    state: Option<&'a str>,
}

impl AuthorizeEndpoint {
    /// An authorize endpoint over the given Model.
    #[must_use]
    pub fn new(model: Arc<dyn Model>) -> Self {
        Self {
            authenticate: AuthenticateEndpoint::new(Arc::clone(&model)),
            model,
        }
    }

    /// Run the pipeline, filling `response` with the success redirect or
    /// the shaped error.
    ///
    /// # Errors
    /// Returns the protocol error after writing the error response.
    /// `invalid_client` and `unauthorized_request` answer 401 JSON and
    /// never redirect; other errors redirect with `error` parameters
    /// when the request named a redirect URI.
    pub async fn execute(
        &self,
        request: &Request,
        response: &mut Response,
        options: &AuthorizeOptions,
    ) -> Result<(), OAuthError> {
        match self.handle(request, response, options).await {
            Ok(()) => Ok(()),
            Err(err) => Err(shape_error(request, response, err)),
        }
    }

    async fn handle(
        &self,
        request: &Request,
        response: &mut Response,
        options: &AuthorizeOptions,
    ) -> Result<(), OAuthError> {
        // The consent page reports denial through the query string.
        if request.query_param("allowed") == Some("false") {
            return Err(OAuthError::access_denied(
                "user denied access to the application",
            ));
        }

        let authorization = parse_authorization_request(request, options)?;

        let user = self.authenticated_user(request, response, options).await?;

        let client = self.validated_client(&authorization).await?;

        let scope = match authorization.scope {
            Some(requested) => {
                let validated = self
                    .model
                    .validate_scope(&client, &user, Some(requested))
                    .await
                    .map_err(model_error)?
                    .filter(|s| !s.is_empty());
                match validated {
                    Some(scope) => Some(scope),
                    None => {
                        debug!(client_id = %client.id, "model rejected requested scope");
                        return Err(OAuthError::invalid_scope("requested scope is invalid"));
                    }
                }
            }
            None => None,
        };

        match authorization.response_type {
            "code" => {
                self.grant_authorization_code(
                    response,
                    options,
                    &authorization,
                    &client,
                    &user,
                    scope,
                )
                .await
            }
            _ => {
                self.grant_implicit_token(request, response, options, &authorization, &client, user, scope)
                    .await
            }
        }
    }

    /// Establish the resource owner: the configured handler when one is
    /// set, bearer authentication otherwise.
    async fn authenticated_user(
        &self,
        request: &Request,
        response: &mut Response,
        options: &AuthorizeOptions,
    ) -> Result<User, OAuthError> {
        match &options.authenticate_handler {
            Some(handler) => handler
                .execute(request, response)
                .await
                .map_err(|e| OAuthError::server_error(format!("authenticate handler failure: {e}")))?
                .ok_or_else(|| {
                    OAuthError::server_error("authenticate handler did not return a user")
                }),
            None => {
                let token = self
                    .authenticate
                    .handle(request, response, &AuthenticateOptions::default())
                    .await?;
                Ok(token.user)
            }
        }
    }

    async fn validated_client(
        &self,
        authorization: &AuthorizationRequest<'_>,
    ) -> Result<Client, OAuthError> {
        let client = self
            .model
            .get_client(authorization.client_id, None)
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                warn!(client_id = %authorization.client_id, "unknown client on authorize");
                OAuthError::invalid_client("client credentials are invalid")
            })?;

        if client.grants.is_empty() {
            return Err(OAuthError::invalid_client("client has no grants"));
        }

        let required_grant = if authorization.response_type == "code" {
            "authorization_code"
        } else {
            "implicit"
        };
        if !client.grants.iter().any(|g| g == required_grant) {
            return Err(OAuthError::unauthorized_client(
                "client is not authorized to use this response type",
            ));
        }

        if client.redirect_uris.is_empty() {
            return Err(OAuthError::invalid_client("client has no registered redirect URI"));
        }
        if !client
            .redirect_uris
            .iter()
            .any(|uri| uri == authorization.redirect_uri)
        {
            warn!(client_id = %client.id, "redirect_uri does not match a registered value");
            return Err(OAuthError::invalid_client(
                "redirect_uri does not match a registered value",
            ));
        }

        Ok(client)
    }

    #[allow(clippy::too_many_arguments)]
    async fn grant_authorization_code(
        &self,
        response: &mut Response,
        options: &AuthorizeOptions,
        authorization: &AuthorizationRequest<'_>,
        client: &Client,
        user: &User,
        scope: Option<String>,
    ) -> Result<(), OAuthError> {
        let issuer =
            TokenIssuer::without_refresh_tokens(Arc::clone(&self.model), client, options.access_token_lifetime);

        let lifetime = client
            .authorization_code_lifetime
            .unwrap_or(options.authorization_code_lifetime);
        let code_value = issuer
            .generate_authorization_code(client, user, scope.as_deref())
            .await?;

        let code = AuthorizationCode {
            authorization_code: code_value,
            expires_at: Utc::now() + Duration::seconds(lifetime),
            redirect_uri: Some(authorization.redirect_uri.to_owned()),
            scope,
            client: client.clone(),
            user: user.clone(),
        };

        let saved = self
            .model
            .save_authorization_code(&code)
            .await
            .map_err(model_error)?
            .ok_or_else(|| {
                OAuthError::server_error("model did not return the saved authorization code")
            })?;

        debug!(client_id = %client.id, "authorization code issued");

        // The success redirect owns the whole query string.
        let mut url = parse_redirect_uri(authorization.redirect_uri)?;
        url.set_query(None);
        {
            let mut pairs = url.query_pairs_mut();
            pairs.append_pair("code", &saved.authorization_code);
            if let Some(scope) = saved.scope.as_deref().filter(|s| !s.is_empty()) {
                pairs.append_pair("scope", scope);
            }
            if let Some(state) = authorization.state {
                pairs.append_pair("state", state);
            }
        }
        response.redirect(url.as_str());
        Ok(())
    }

    #[allow(clippy::too_many_arguments)]
    async fn grant_implicit_token(
        &self,
        request: &Request,
        response: &mut Response,
        options: &AuthorizeOptions,
        authorization: &AuthorizationRequest<'_>,
        client: &Client,
        user: User,
        scope: Option<String>,
    ) -> Result<(), OAuthError> {
        let issuer =
            TokenIssuer::without_refresh_tokens(Arc::clone(&self.model), client, options.access_token_lifetime);

        let token = ImplicitGrant::new(user, scope)
            .execute(request, response, client, &issuer)
            .await?;

        let mut params = form_urlencoded::Serializer::new(String::new());
        params.append_pair("access_token", &token.access_token);
        if let Some(expires_in) = token.access_token_lifetime() {
            params.append_pair("expires_in", &expires_in.to_string());
        }
        if let Some(state) = authorization.state {
            params.append_pair("state", state);
        }
        let params = params.finish();

        // Fragment parameters join any fragment the client registered.
        let mut url = parse_redirect_uri(authorization.redirect_uri)?;
        let fragment = match url.fragment() {
            Some(existing) if !existing.is_empty() => format!("{existing}&{params}"),
            _ => params,
        };
        url.set_fragment(Some(&fragment));
        response.redirect(url.as_str());
        Ok(())
    }
}

fn parse_authorization_request<'a>(
    request: &'a Request,
    options: &AuthorizeOptions,
) -> Result<AuthorizationRequest<'a>, OAuthError> {
    let response_type = request
        .param("response_type")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OAuthError::invalid_request("missing parameter: response_type"))?;
    if response_type != "code" && response_type != "token" {
        return Err(OAuthError::unsupported_response_type(format!(
            "unsupported response type: {response_type}"
        )));
    }

    let redirect_uri = request
        .param("redirect_uri")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OAuthError::invalid_request("missing parameter: redirect_uri"))?;
    if !validators::is_uri(redirect_uri) {
        return Err(OAuthError::invalid_request(
            "invalid request: redirect_uri is not a valid URI",
        ));
    }

    let client_id = request
        .param("client_id")
        .filter(|v| !v.is_empty())
        .ok_or_else(|| OAuthError::invalid_request("missing parameter: client_id"))?;
    if !validators::is_vschar(client_id) {
        return Err(OAuthError::invalid_request("invalid parameter: client_id"));
    }

    let scope = request.param("scope").filter(|v| !v.is_empty());
    if let Some(scope) = scope {
        if !validators::is_nqschar(scope) {
            return Err(OAuthError::invalid_scope("invalid parameter: scope"));
        }
    }

    let state = request.param("state").filter(|v| !v.is_empty());
    match state {
        None if !options.allow_empty_state => {
            return Err(OAuthError::invalid_request("missing parameter: state"));
        }
        Some(state) if !validators::is_vschar(state) => {
            return Err(OAuthError::invalid_request("invalid parameter: state"));
        }
        _ => {}
    }

    Ok(AuthorizationRequest {
        response_type,
        redirect_uri,
        client_id,
        scope,
        state,
    })
}

fn parse_redirect_uri(uri: &str) -> Result<Url, OAuthError> {
    Url::parse(uri)
        .map_err(|_| OAuthError::invalid_request("invalid request: redirect_uri is not a valid URI"))
}

/// RFC 6749 §4.1.2.1 error shaping: authentication failures answer 401
/// JSON without redirecting; everything else redirects with `error`
/// parameters when the request named a redirect URI.
fn shape_error(request: &Request, response: &mut Response, err: OAuthError) -> OAuthError {
    if matches!(
        err.kind(),
        ErrorKind::InvalidClient | ErrorKind::UnauthorizedRequest
    ) {
        let err = err.with_status(401);
        response.set_status(err.status());
        response.set_body(err.body());
        return err;
    }

    // The raw request decides where errors go; the registered client
    // list is never consulted here.
    if let Some(uri) = request.param("redirect_uri") {
        if let Ok(mut url) = Url::parse(uri) {
            url.query_pairs_mut()
                .append_pair("error", err.code())
                .append_pair("error_description", err.message());
            response.redirect(url.as_str());
            response.set_body(err.body());
            return err;
        }
    }

    response.set_status(err.status());
    response.set_body(err.body());
    err
}
