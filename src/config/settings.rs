// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Settings management for ondemand-chat
//!
//! Handles loading settings from ~/.ondemand/settings.json and resolving them,
//! together with environment variables and CLI flags, into a [`RunConfig`].

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::api::{ContextField, GenerationConfig, DEFAULT_BASE_URL};

mod io;
mod validation;

pub use validation::RunOverrides;

/// Placeholder values shipped in sample configs; treated as unset.
pub const API_KEY_PLACEHOLDER: &str = "<your_api_key>";
pub const EXTERNAL_USER_ID_PLACEHOLDER: &str = "<your_external_user_id>";

/// Main settings structure, stored in ~/.ondemand/settings.json
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Settings {
    /// Credentials and endpoint
    #[serde(default)]
    pub api: ApiConfig,

    /// Session creation parameters
    #[serde(default)]
    pub session: SessionConfig,

    /// Query generation parameters
    #[serde(default)]
    pub query: QueryConfig,

    /// Optional file attachment
    #[serde(default)]
    pub media: MediaConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// API key (if stored directly, not recommended)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Environment variable name for API key
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,

    #[serde(default = "default_base_url")]
    pub base_url: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_key_env: default_api_key_env(),
            base_url: default_base_url(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SessionConfig {
    /// Generated per run when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_user_id: Option<String>,

    #[serde(default)]
    pub agent_ids: Vec<String>,

    /// Echoed back in the final result, in this order
    #[serde(default)]
    pub context_metadata: Vec<ContextField>,
}

/// Generation parameters as stored on disk.
///
/// `response_mode` stays a string here so an invalid value surfaces as a
/// configuration error at resolution time instead of a parse failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueryConfig {
    #[serde(default = "default_endpoint_id")]
    pub endpoint_id: String,

    #[serde(default = "default_reasoning_mode")]
    pub reasoning_mode: String,

    #[serde(default = "default_response_mode")]
    pub response_mode: String,

    #[serde(default)]
    pub fulfillment_prompt: String,

    #[serde(default)]
    pub stop_sequences: Vec<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f64,

    #[serde(default = "default_top_p")]
    pub top_p: f64,

    #[serde(default)]
    pub max_tokens: u32,

    #[serde(default)]
    pub presence_penalty: f64,

    #[serde(default)]
    pub frequency_penalty: f64,
}

impl Default for QueryConfig {
    fn default() -> Self {
        let generation = GenerationConfig::default();
        Self {
            endpoint_id: generation.endpoint_id,
            reasoning_mode: generation.reasoning_mode,
            response_mode: generation.response_mode.to_string(),
            fulfillment_prompt: generation.fulfillment_prompt,
            stop_sequences: generation.stop_sequences,
            temperature: generation.temperature,
            top_p: generation.top_p,
            max_tokens: generation.max_tokens,
            presence_penalty: generation.presence_penalty,
            frequency_penalty: generation.frequency_penalty,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MediaConfig {
    /// File to attach to the session; empty means none
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<PathBuf>,

    /// Agents the uploaded file is processed by
    #[serde(default)]
    pub agent_ids: Vec<String>,
}

/// Everything one run needs, resolved once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct RunConfig {
    pub api_key: String,
    pub base_url: String,
    pub external_user_id: String,
    pub query: String,
    pub agent_ids: Vec<String>,
    pub file_agent_ids: Vec<String>,
    pub media_file_path: Option<PathBuf>,
    pub context_metadata: Vec<ContextField>,
    pub generation: GenerationConfig,
}

fn default_api_key_env() -> String {
    "ONDEMAND_API_KEY".to_string()
}

fn default_base_url() -> String {
    DEFAULT_BASE_URL.to_string()
}

fn default_endpoint_id() -> String {
    GenerationConfig::default().endpoint_id
}

fn default_reasoning_mode() -> String {
    GenerationConfig::default().reasoning_mode
}

fn default_response_mode() -> String {
    GenerationConfig::default().response_mode.to_string()
}

fn default_temperature() -> f64 {
    GenerationConfig::default().temperature
}

fn default_top_p() -> f64 {
    GenerationConfig::default().top_p
}
