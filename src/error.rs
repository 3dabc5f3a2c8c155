// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! Error types for ondemand-chat
//!
//! Every step of a run has its own variant so the caller can tell which call
//! failed. None of them are retried.

use thiserror::Error;

/// Main error type for a chat run
#[derive(Error, Debug)]
pub enum ChatError {
    /// Missing credentials, invalid response mode, malformed settings.
    /// Raised before any network call.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Session creation did not return 201 with a session id
    #[error("Session creation failed: {0}")]
    SessionCreation(#[source] ApiError),

    /// Media upload failed (file, transport, status or response shape)
    #[error("Media upload failed: {0}")]
    MediaUpload(#[source] ApiError),

    /// The query request could not be sent
    #[error("Query submission failed: {0}")]
    QuerySubmission(#[source] ApiError),

    /// The query response was not a success or could not be decoded
    #[error("Query response error: {0}")]
    QueryResponse(#[source] ApiError),

    /// Transport failure while reading the event feed
    #[error("Stream read error: {0}")]
    StreamRead(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Failure details shared by all API calls
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request never produced a response
    #[error("Network error: {0}")]
    Network(String),

    /// The server answered with an unexpected status
    #[error("API error ({status}): {body}")]
    Status { status: u16, body: String },

    /// The server answered with success but the body was not usable
    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    /// A local file needed by the request could not be read
    #[error("File error: {0}")]
    File(String),
}

impl ApiError {
    /// HTTP status carried by the error, if the server answered at all.
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Result type alias for chat operations
pub type Result<T> = std::result::Result<T, ChatError>;
