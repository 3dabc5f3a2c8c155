// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

use std::path::PathBuf;

use crate::api::{GenerationConfig, ResponseMode};
use crate::error::{ChatError, Result};

use super::{RunConfig, Settings, API_KEY_PLACEHOLDER, EXTERNAL_USER_ID_PLACEHOLDER};

pub const BASE_URL_ENV: &str = "ONDEMAND_BASE_URL";
pub const EXTERNAL_USER_ID_ENV: &str = "ONDEMAND_EXTERNAL_USER_ID";
pub const MEDIA_FILE_PATH_ENV: &str = "MEDIA_FILE_PATH";

/// Per-run values supplied on the command line. They win over the
/// environment, which wins over the settings file.
#[derive(Debug, Clone, Default)]
pub struct RunOverrides {
    pub query: String,
    pub api_key: Option<String>,
    pub base_url: Option<String>,
    pub external_user_id: Option<String>,
    /// Replaces the configured agents when non-empty
    pub agent_ids: Vec<String>,
    pub response_mode: Option<String>,
    pub endpoint_id: Option<String>,
    pub reasoning_mode: Option<String>,
    pub fulfillment_prompt: Option<String>,
    /// Replaces the configured stop sequences when non-empty
    pub stop_sequences: Vec<String>,
    pub temperature: Option<f64>,
    pub top_p: Option<f64>,
    pub max_tokens: Option<u32>,
    pub presence_penalty: Option<f64>,
    pub frequency_penalty: Option<f64>,
    pub media_file_path: Option<PathBuf>,
    /// Replaces the configured file agents when non-empty
    pub file_agent_ids: Vec<String>,
    /// Raw `KEY=VALUE` entries appended after the configured context
    pub context: Vec<String>,
}

impl Settings {
    /// Get the API key, checking env var first.
    pub fn get_api_key(&self) -> Option<String> {
        self.api_key_with(|name| std::env::var(name).ok())
    }

    fn api_key_with(&self, env: impl Fn(&str) -> Option<String>) -> Option<String> {
        // Priority: env var > config file.
        env(&self.api.api_key_env)
            .filter(|key| !is_unset(key, API_KEY_PLACEHOLDER))
            .or_else(|| self.api.api_key.clone())
            .filter(|key| !is_unset(key, API_KEY_PLACEHOLDER))
    }

    /// Resolve settings, environment and CLI overrides into one immutable
    /// run configuration. This is the only place configuration errors arise.
    pub fn resolve(&self, overrides: RunOverrides) -> Result<RunConfig> {
        self.resolve_with(overrides, |name| std::env::var(name).ok())
    }

    pub(crate) fn resolve_with(
        &self,
        overrides: RunOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<RunConfig> {
        let query = overrides.query.trim().to_string();
        if query.is_empty() {
            return Err(ChatError::Config("query text is empty".to_string()));
        }

        let api_key = overrides
            .api_key
            .filter(|key| !is_unset(key, API_KEY_PLACEHOLDER))
            .or_else(|| self.api_key_with(&env))
            .ok_or_else(|| {
                ChatError::Config(format!(
                    "missing API key: pass --api-key, set {} or api.api_key in {}",
                    self.api.api_key_env,
                    Settings::default_path().display()
                ))
            })?;

        let response_mode: ResponseMode = overrides
            .response_mode
            .as_deref()
            .unwrap_or(&self.query.response_mode)
            .parse()?;

        let mut context_metadata = self.session.context_metadata.clone();
        for raw in &overrides.context {
            context_metadata.push(raw.parse()?);
        }

        let base_url = overrides
            .base_url
            .or_else(|| env(BASE_URL_ENV))
            .unwrap_or_else(|| self.api.base_url.clone());

        // An empty path means "no attachment".
        let media_file_path = overrides
            .media_file_path
            .or_else(|| env(MEDIA_FILE_PATH_ENV).map(PathBuf::from))
            .or_else(|| self.media.file_path.clone())
            .filter(|path| !path.as_os_str().is_empty());

        let generation = GenerationConfig {
            endpoint_id: overrides
                .endpoint_id
                .unwrap_or_else(|| self.query.endpoint_id.clone()),
            reasoning_mode: overrides
                .reasoning_mode
                .unwrap_or_else(|| self.query.reasoning_mode.clone()),
            fulfillment_prompt: overrides
                .fulfillment_prompt
                .unwrap_or_else(|| self.query.fulfillment_prompt.clone()),
            stop_sequences: non_empty_or(overrides.stop_sequences, &self.query.stop_sequences),
            temperature: overrides.temperature.unwrap_or(self.query.temperature),
            top_p: overrides.top_p.unwrap_or(self.query.top_p),
            max_tokens: overrides.max_tokens.unwrap_or(self.query.max_tokens),
            presence_penalty: overrides
                .presence_penalty
                .unwrap_or(self.query.presence_penalty),
            frequency_penalty: overrides
                .frequency_penalty
                .unwrap_or(self.query.frequency_penalty),
            response_mode,
        };

        let external_user_id = overrides
            .external_user_id
            .or_else(|| env(EXTERNAL_USER_ID_ENV))
            .or_else(|| self.session.external_user_id.clone())
            .filter(|id| !is_unset(id, EXTERNAL_USER_ID_PLACEHOLDER))
            .unwrap_or_else(|| {
                let generated = uuid::Uuid::new_v4().to_string();
                tracing::warn!(external_user_id = %generated, "no external user id configured, generated one");
                generated
            });

        Ok(RunConfig {
            api_key,
            base_url,
            external_user_id,
            query,
            agent_ids: non_empty_or(overrides.agent_ids, &self.session.agent_ids),
            file_agent_ids: non_empty_or(overrides.file_agent_ids, &self.media.agent_ids),
            media_file_path,
            context_metadata,
            generation,
        })
    }
}

fn is_unset(value: &str, placeholder: &str) -> bool {
    let value = value.trim();
    value.is_empty() || value == placeholder
}

fn non_empty_or(values: Vec<String>, fallback: &[String]) -> Vec<String> {
    if values.is_empty() {
        fallback.to_vec()
    } else {
        values
    }
}
