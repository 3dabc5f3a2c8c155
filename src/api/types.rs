// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Value types shared by the API clients

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

use crate::error::ChatError;

/// How the query response is delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseMode {
    /// A single JSON payload
    Sync,
    /// A `data:`-prefixed event feed
    Stream,
}

impl ResponseMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResponseMode::Sync => "sync",
            ResponseMode::Stream => "stream",
        }
    }
}

impl fmt::Display for ResponseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResponseMode {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "sync" => Ok(ResponseMode::Sync),
            "stream" => Ok(ResponseMode::Stream),
            other => Err(ChatError::Config(format!(
                "invalid response mode '{}': expected 'sync' or 'stream'",
                other
            ))),
        }
    }
}

/// Generation parameters sent with every query
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationConfig {
    pub endpoint_id: String,
    pub reasoning_mode: String,
    pub fulfillment_prompt: String,
    pub stop_sequences: Vec<String>,
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
    pub response_mode: ResponseMode,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            endpoint_id: "predefined-openai-gpt4.1".to_string(),
            reasoning_mode: "grok-4-fast".to_string(),
            fulfillment_prompt: String::new(),
            stop_sequences: Vec::new(),
            temperature: 0.7,
            top_p: 1.0,
            max_tokens: 0,
            presence_penalty: 0.0,
            frequency_penalty: 0.0,
            response_mode: ResponseMode::Stream,
        }
    }
}

/// Caller-supplied annotation echoed back in the final result.
/// Order within a list is preserved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContextField {
    pub key: String,
    pub value: String,
}

impl ContextField {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

impl FromStr for ContextField {
    type Err = ChatError;

    /// Parse `key=value`. The value may itself contain `=`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => {
                Ok(ContextField::new(key.trim(), value))
            }
            _ => Err(ChatError::Config(format!(
                "invalid context field '{}': expected KEY=VALUE",
                s
            ))),
        }
    }
}

/// Server-side conversation created once per run
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub id: String,
    #[serde(default, deserialize_with = "context_fields_lenient")]
    pub context_metadata: Vec<ContextField>,
}

// The echo is informational. A null list or an entry that is not a
// string pair is dropped instead of failing the session.
fn context_fields_lenient<'de, D>(deserializer: D) -> Result<Vec<ContextField>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Array(entries)) => entries
            .into_iter()
            .filter_map(|entry| serde_json::from_value(entry).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Opaque id of an uploaded file
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct MediaReference(pub String);

impl MediaReference {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MediaReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
