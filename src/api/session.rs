// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Session creation

use reqwest::StatusCode;
use serde::Deserialize;

use super::client::ApiClient;
use super::request::create_session_request;
use super::types::{ContextField, Session};
use crate::error::{ApiError, ChatError, Result};

const SESSIONS_PATH: &str = "/chat/v1/sessions";

#[derive(Debug, Deserialize)]
struct CreateSessionResponse {
    data: Session,
}

impl ApiClient {
    /// Create the chat session every later call is scoped to.
    ///
    /// Only `201 Created` with a non-empty `data.id` counts as success.
    pub async fn create_session(
        &self,
        agent_ids: &[String],
        external_user_id: &str,
        context_metadata: &[ContextField],
    ) -> Result<Session> {
        let url = self.url(SESSIONS_PATH);
        let body = create_session_request(agent_ids, external_user_id, context_metadata);

        tracing::info!(url = %url, "creating chat session");
        tracing::debug!(body = %serde_json::to_string(&body)?, "session request body");

        let response = self
            .post(&url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ChatError::SessionCreation(ApiError::Network(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::SessionCreation(ApiError::Network(e.to_string())))?;

        let session = parse_session_response(status, &text)?;

        tracing::info!(session_id = %session.id, "chat session created");
        for field in &session.context_metadata {
            tracing::info!(key = %field.key, value = %field.value, "session context field");
        }

        Ok(session)
    }
}

fn parse_session_response(status: StatusCode, body: &str) -> Result<Session> {
    if status != StatusCode::CREATED {
        return Err(ChatError::SessionCreation(ApiError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }));
    }

    let parsed: CreateSessionResponse = serde_json::from_str(body).map_err(|e| {
        ChatError::SessionCreation(ApiError::InvalidResponse(format!("{}: {}", e, body)))
    })?;

    if parsed.data.id.is_empty() {
        return Err(ChatError::SessionCreation(ApiError::InvalidResponse(
            format!("empty session id: {}", body),
        )));
    }

    Ok(parsed.data)
}
