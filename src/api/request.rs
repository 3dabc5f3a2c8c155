// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Request payloads
//!
//! Pure builders for the three request bodies. Field names are the remote
//! API's wire names. Empty lists serialize as `[]`, never `null`.

use serde::Serialize;

use super::types::{ContextField, GenerationConfig, MediaReference, ResponseMode};

/// Creator/updater marker written into every upload
pub const UPLOAD_ACTOR: &str = "AIREV";

/// Body of `POST /chat/v1/sessions`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSessionRequest<'a> {
    pub agent_ids: &'a [String],
    pub external_user_id: &'a str,
    pub context_metadata: &'a [ContextField],
}

/// Body of `POST /chat/v1/sessions/{id}/query`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QueryRequest<'a> {
    pub endpoint_id: &'a str,
    pub query: &'a str,
    pub agent_ids: &'a [String],
    pub response_mode: ResponseMode,
    pub reasoning_mode: &'a str,
    pub model_configs: ModelConfigs<'a>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub media_id: Option<&'a str>,
}

/// Generation parameters nested under `modelConfigs`
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ModelConfigs<'a> {
    pub fulfillment_prompt: &'a str,
    pub stop_sequences: &'a [String],
    pub temperature: f64,
    pub top_p: f64,
    pub max_tokens: u32,
    pub presence_penalty: f64,
    pub frequency_penalty: f64,
}

impl<'a> From<&'a GenerationConfig> for ModelConfigs<'a> {
    fn from(config: &'a GenerationConfig) -> Self {
        Self {
            fulfillment_prompt: &config.fulfillment_prompt,
            stop_sequences: &config.stop_sequences,
            temperature: config.temperature,
            top_p: config.top_p,
            max_tokens: config.max_tokens,
            presence_penalty: config.presence_penalty,
            frequency_penalty: config.frequency_penalty,
        }
    }
}

/// Text fields of the multipart upload, in wire order.
/// The `file` part itself is attached by the upload client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadForm {
    pub file_name: String,
    pub fields: Vec<(&'static str, String)>,
}

pub fn create_session_request<'a>(
    agent_ids: &'a [String],
    external_user_id: &'a str,
    context_metadata: &'a [ContextField],
) -> CreateSessionRequest<'a> {
    CreateSessionRequest {
        agent_ids,
        external_user_id,
        context_metadata,
    }
}

pub fn query_request<'a>(
    config: &'a GenerationConfig,
    query: &'a str,
    agent_ids: &'a [String],
    media: Option<&'a MediaReference>,
) -> QueryRequest<'a> {
    QueryRequest {
        endpoint_id: &config.endpoint_id,
        query,
        agent_ids,
        response_mode: config.response_mode,
        reasoning_mode: &config.reasoning_mode,
        model_configs: ModelConfigs::from(config),
        media_id: media.map(MediaReference::as_str),
    }
}

pub fn upload_form(session_id: &str, file_name: &str, agent_ids: &[String]) -> UploadForm {
    let mut fields = vec![
        ("createdBy", session_id.to_string()),
        ("createdBy", UPLOAD_ACTOR.to_string()),
        ("updatedBy", UPLOAD_ACTOR.to_string()),
        ("name", file_name.to_string()),
        ("responseMode", ResponseMode::Sync.as_str().to_string()),
    ];
    fields.extend(agent_ids.iter().map(|agent| ("agents", agent.clone())));

    UploadForm {
        file_name: file_name.to_string(),
        fields,
    }
}
