// ABOUTME: Parsed HTTP request value object consumed by every endpoint
// ABOUTME: Normalizes method casing and header keys; immutable after construction
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use std::collections::HashMap;

/// A parsed HTTP request.
///
/// The HTTP transport adapter builds one of these per call from its
/// framework-native request: the method, the headers, the decoded query
/// string, and the form-decoded body. Construction normalizes the method
/// to uppercase and header keys to lowercase; the value is immutable
/// afterwards.
#[derive(Debug, Clone)]
pub struct Request {
    method: String,
    headers: HashMap<String, String>,
    query: HashMap<String, String>,
    body: HashMap<String, String>,
}

impl Request {
    /// Build a request from transport-supplied parts.
    #[must_use]
    pub fn new(
        method: &str,
        headers: HashMap<String, String>,
        query: HashMap<String, String>,
        body: HashMap<String, String>,
    ) -> Self {
        let headers = headers
            .into_iter()
            .map(|(name, value)| (name.to_lowercase(), value))
            .collect();

        Self {
            method: method.to_uppercase(),
            headers,
            query,
            body,
        }
    }

    /// The request method, uppercased.
    #[must_use]
    pub fn method(&self) -> &str {
        &self.method
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// A decoded query-string parameter.
    #[must_use]
    pub fn query_param(&self, name: &str) -> Option<&str> {
        self.query.get(name).map(String::as_str)
    }

    /// A form-decoded body parameter.
    #[must_use]
    pub fn body_param(&self, name: &str) -> Option<&str> {
        self.body.get(name).map(String::as_str)
    }

    /// A parameter from the body or, failing that, the query string.
    ///
    /// Authorization requests accept their parameters from either
    /// location; the body wins when both carry the name.
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.body_param(name).or_else(|| self.query_param(name))
    }

    /// Whether the request body is `application/x-www-form-urlencoded`.
    ///
    /// The media type is matched up to any `;` parameter so charset
    /// suffixes do not defeat the check.
    #[must_use]
    pub fn is_form_encoded(&self) -> bool {
        self.header("content-type")
            .map(|value| value.split(';').next().unwrap_or("").trim())
            .is_some_and(|media_type| media_type.eq_ignore_ascii_case("application/x-www-form-urlencoded"))
    }
}
