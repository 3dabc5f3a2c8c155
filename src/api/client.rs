// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Shared HTTP client for the OnDemand API

use reqwest::{Client, RequestBuilder};

pub const DEFAULT_BASE_URL: &str = "https://api.on-demand.io";

const API_KEY_HEADER: &str = "apikey";

/// Holds the connection pool, credentials and base URL for one run.
/// Session, upload and query calls are implemented in their own modules.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ApiClient {
    /// Create a client against the public API
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(api_key, DEFAULT_BASE_URL)
    }

    /// Create with a custom base URL
    pub fn with_base_url(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        let base_url: String = base_url.into();
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// POST with the API key header attached
    pub(crate) fn post(&self, url: &str) -> RequestBuilder {
        self.client
            .post(url)
            .header(API_KEY_HEADER, &self.api_key)
    }
}
