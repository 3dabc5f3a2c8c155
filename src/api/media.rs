// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Media upload
//!
//! Attaches a local file to a session through the raw multipart endpoint.

use std::path::Path;

use reqwest::multipart::{Form, Part};
use reqwest::StatusCode;

use super::client::ApiClient;
use super::request::upload_form;
use super::types::MediaReference;
use crate::error::{ApiError, ChatError, Result};

const UPLOAD_PATH: &str = "/media/v1/public/file/raw";

impl ApiClient {
    /// Upload `path` and return the server-assigned media id.
    ///
    /// The file is streamed from disk with its length declared up front. The
    /// handle is owned by the request body and closed when this call returns.
    pub async fn upload_file(
        &self,
        path: &Path,
        session_id: &str,
        file_agent_ids: &[String],
    ) -> Result<MediaReference> {
        let file_name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .ok_or_else(|| {
                ChatError::MediaUpload(ApiError::File(format!(
                    "{} has no file name",
                    path.display()
                )))
            })?;

        let file = tokio::fs::File::open(path).await.map_err(|e| {
            ChatError::MediaUpload(ApiError::File(format!(
                "failed to open {}: {}",
                path.display(),
                e
            )))
        })?;
        let length = file
            .metadata()
            .await
            .map_err(|e| {
                ChatError::MediaUpload(ApiError::File(format!(
                    "failed to stat {}: {}",
                    path.display(),
                    e
                )))
            })?
            .len();

        let upload = upload_form(session_id, &file_name, file_agent_ids);
        let mut form = Form::new().part(
            "file",
            Part::stream_with_length(file, length).file_name(upload.file_name.clone()),
        );
        for (name, value) in upload.fields {
            form = form.text(name, value);
        }

        let url = self.url(UPLOAD_PATH);
        tracing::info!(url = %url, file = %path.display(), "uploading media");

        let response = self
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ChatError::MediaUpload(ApiError::Network(e.to_string())))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ChatError::MediaUpload(ApiError::Network(e.to_string())))?;

        let media = parse_upload_response(status, &text)?;
        tracing::info!(media_id = %media, "media uploaded");
        Ok(media)
    }
}

fn parse_upload_response(status: StatusCode, body: &str) -> Result<MediaReference> {
    if status != StatusCode::OK && status != StatusCode::CREATED {
        return Err(ChatError::MediaUpload(ApiError::Status {
            status: status.as_u16(),
            body: body.to_string(),
        }));
    }

    let value: serde_json::Value = serde_json::from_str(body).map_err(|e| {
        ChatError::MediaUpload(ApiError::InvalidResponse(format!("{}: {}", e, body)))
    })?;

    value
        .pointer("/data/id")
        .and_then(serde_json::Value::as_str)
        .filter(|id| !id.is_empty())
        .map(|id| MediaReference(id.to_string()))
        .ok_or_else(|| {
            ChatError::MediaUpload(ApiError::InvalidResponse(format!(
                "missing data.id: {}",
                body
            )))
        })
}
