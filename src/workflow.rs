// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! One chat run: create a session, attach a file if configured, query.
//!
//! Steps run strictly in sequence and the first failure ends the run.

use crate::api::{ApiClient, QueryResult};
use crate::config::RunConfig;
use crate::error::Result;

/// Run the workflow against the configured base URL
pub async fn run(config: &RunConfig) -> Result<QueryResult> {
    let client = ApiClient::with_base_url(&config.api_key, &config.base_url);
    run_with_client(&client, config).await
}

/// Run the workflow with an existing client
pub async fn run_with_client(client: &ApiClient, config: &RunConfig) -> Result<QueryResult> {
    let session = client
        .create_session(
            &config.agent_ids,
            &config.external_user_id,
            &config.context_metadata,
        )
        .await?;

    let media = match &config.media_file_path {
        Some(path) => Some(
            client
                .upload_file(path, &session.id, &config.file_agent_ids)
                .await?,
        ),
        None => None,
    };

    tracing::info!(query = %config.query, "submitting query");
    client
        .submit_query(
            &session,
            &config.query,
            &config.agent_ids,
            &config.generation,
            &config.context_metadata,
            media.as_ref(),
        )
        .await
}
