// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Sync-mode query responses

use reqwest::StatusCode;
use serde_json::Value;

use super::types::ContextField;
use crate::error::{ApiError, ChatError, Result};

/// Decode a sync query response and attach the caller's context metadata
/// as `data.contextMetadata`.
///
/// When `data` is missing or not an object the body is returned unchanged.
pub fn read_sync_response(
    status: StatusCode,
    body: &str,
    context_metadata: &[ContextField],
) -> Result<Value> {
    if !status.is_success() {
        return Err(ChatError::QueryResponse(ApiError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }));
    }

    let mut value: Value = serde_json::from_str(body).map_err(|e| {
        ChatError::QueryResponse(ApiError::InvalidResponse(format!("{}: {}", e, body)))
    })?;

    match value.get_mut("data").and_then(Value::as_object_mut) {
        Some(data) => {
            data.insert(
                "contextMetadata".to_string(),
                serde_json::to_value(context_metadata)?,
            );
        }
        None => tracing::debug!("sync response has no data object; context metadata not attached"),
    }

    Ok(value)
}
