// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Query submission
//!
//! Sends the query and hands the response body to the sync reader or the
//! stream aggregator depending on the configured response mode.

use serde::Serialize;
use serde_json::Value;

use super::client::ApiClient;
use super::request::query_request;
use super::stream::{aggregate_stream, StreamedResponse};
use super::sync_response::read_sync_response;
use super::types::{ContextField, GenerationConfig, MediaReference, ResponseMode, Session};
use crate::error::{ApiError, ChatError, Result};

/// Outcome of a query. Both variants serialize to an object whose `data`
/// member carries the answer and the caller's `contextMetadata`.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum QueryResult {
    /// Server JSON with `data.contextMetadata` attached
    Sync(Value),
    /// Reassembled event feed
    Streamed(StreamedResponse),
}

impl QueryResult {
    pub fn answer(&self) -> Option<&str> {
        match self {
            QueryResult::Sync(value) => value.pointer("/data/answer").and_then(Value::as_str),
            QueryResult::Streamed(response) => Some(&response.data.answer),
        }
    }

    pub fn session_id(&self) -> Option<&str> {
        match self {
            QueryResult::Sync(value) => value.pointer("/data/sessionId").and_then(Value::as_str),
            QueryResult::Streamed(response) => response.data.session_id.as_deref(),
        }
    }

    pub fn to_pretty_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

impl ApiClient {
    /// Submit `query` to an existing session.
    pub async fn submit_query(
        &self,
        session: &Session,
        query: &str,
        agent_ids: &[String],
        config: &GenerationConfig,
        context_metadata: &[ContextField],
        media: Option<&MediaReference>,
    ) -> Result<QueryResult> {
        let url = self.url(&format!("/chat/v1/sessions/{}/query", session.id));
        let body = query_request(config, query, agent_ids, media);

        tracing::info!(url = %url, response_mode = %config.response_mode, "submitting query");
        tracing::debug!(body = %serde_json::to_string(&body)?, "query request body");

        let response = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::QuerySubmission(ApiError::Network(e.to_string())))?;

        let status = response.status();
        match config.response_mode {
            ResponseMode::Sync => {
                let text = response
                    .text()
                    .await
                    .map_err(|e| ChatError::QueryResponse(ApiError::Network(e.to_string())))?;
                read_sync_response(status, &text, context_metadata).map(QueryResult::Sync)
            }
            ResponseMode::Stream => {
                if !status.is_success() {
                    let text = response
                        .text()
                        .await
                        .map_err(|e| ChatError::QueryResponse(ApiError::Network(e.to_string())))?;
                    return Err(ChatError::QueryResponse(ApiError::Status {
                        status: status.as_u16(),
                        body: text,
                    }));
                }

                tracing::info!("reading streamed response");
                aggregate_stream(response.bytes_stream(), context_metadata)
                    .await
                    .map(QueryResult::Streamed)
            }
        }
    }
}
