// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! ondemand-chat - command-line client for the OnDemand chat API.
//!
//! A run creates a chat session, optionally uploads a file into it, then
//! submits one query and prints the answer as JSON.
//!
//! - `api`: request builders, the session/upload/query calls, sync and
//!   streamed response handling
//! - `config`: settings file, environment and CLI resolution
//! - `workflow`: the sequential three-step run

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod workflow;

pub use error::{ChatError, Result};
