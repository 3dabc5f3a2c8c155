// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! OnDemand chat API
//!
//! Request builders, the three calls of a run (session, upload, query) and
//! the sync/stream response handling.

pub mod client;
pub mod media;
pub mod query;
pub mod request;
pub mod session;
pub mod stream;
pub mod sync_response;
pub mod types;

pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use query::QueryResult;
pub use stream::{aggregate_stream, StreamAggregator, StreamEvent, StreamedResponse};
pub use types::*;
