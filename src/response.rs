// ABOUTME: Mutable HTTP response builder filled by the endpoint pipelines
// ABOUTME: Holds status, case-insensitive headers, and a JSON body map
//
// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 oauth2-engine contributors

use serde_json::{Map, Value};
use std::collections::HashMap;

/// An HTTP response under construction.
///
/// Lives for exactly one endpoint invocation; the endpoint is the single
/// writer. The transport adapter reads the final status, headers, and
/// body once the call returns.
#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    headers: HashMap<String, String>,
    body: Map<String, Value>,
}

impl Response {
    /// A fresh 200 response with no headers and an empty body.
    #[must_use]
    pub fn new() -> Self {
        Self {
            status: 200,
            headers: HashMap::new(),
            body: Map::new(),
        }
    }

    /// The response status.
    #[must_use]
    pub const fn status(&self) -> u16 {
        self.status
    }

    /// Set the response status.
    pub fn set_status(&mut self, status: u16) {
        self.status = status;
    }

    /// Case-insensitive header lookup.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(&name.to_lowercase()).map(String::as_str)
    }

    /// Set a header; the name is stored lowercased.
    pub fn set_header(&mut self, name: &str, value: &str) {
        self.headers.insert(name.to_lowercase(), value.to_owned());
    }

    /// All headers, keyed by lowercased name.
    #[must_use]
    pub const fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// The JSON body map.
    #[must_use]
    pub const fn body(&self) -> &Map<String, Value> {
        &self.body
    }

    /// Replace the body.
    pub fn set_body(&mut self, body: Map<String, Value>) {
        self.body = body;
    }

    /// Redirect: sets `Location` and status 302.
    pub fn redirect(&mut self, url: &str) {
        self.set_header("location", url);
        self.status = 302;
    }
}

impl Default for Response {
    fn default() -> Self {
        Self::new()
    }
}
