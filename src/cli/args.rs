// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! CLI argument definitions using Clap

use clap::Parser;
use std::path::PathBuf;

use crate::config::RunOverrides;

/// Create a chat session, optionally attach a file, and ask one question
#[derive(Parser, Debug)]
#[command(name = "ondemand-chat")]
#[command(version, about = "Query the OnDemand chat API from your terminal")]
pub struct Cli {
    /// The question to ask
    pub query: String,

    /// Settings file path (defaults to ~/.ondemand/settings.json)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Verbosity level (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// API key (overrides the environment and settings file)
    #[arg(long)]
    pub api_key: Option<String>,

    /// API base URL
    #[arg(long)]
    pub base_url: Option<String>,

    /// External user id for the session (generated when unset)
    #[arg(long)]
    pub external_user_id: Option<String>,

    /// Agent to enable for the session (repeatable)
    #[arg(long = "agent", value_name = "ID")]
    pub agents: Vec<String>,

    /// Response mode: sync or stream
    #[arg(short = 'm', long)]
    pub response_mode: Option<String>,

    /// Model endpoint id
    #[arg(long)]
    pub endpoint_id: Option<String>,

    /// Reasoning mode
    #[arg(long)]
    pub reasoning_mode: Option<String>,

    /// Fulfillment prompt template
    #[arg(long)]
    pub fulfillment_prompt: Option<String>,

    /// Stop sequence (repeatable)
    #[arg(long = "stop", value_name = "SEQ")]
    pub stop_sequences: Vec<String>,

    #[arg(long)]
    pub temperature: Option<f64>,

    #[arg(long)]
    pub top_p: Option<f64>,

    #[arg(long)]
    pub max_tokens: Option<u32>,

    #[arg(long)]
    pub presence_penalty: Option<f64>,

    #[arg(long)]
    pub frequency_penalty: Option<f64>,

    /// File to attach to the session before querying
    #[arg(short, long, value_name = "PATH")]
    pub file: Option<PathBuf>,

    /// Agent that processes the uploaded file (repeatable)
    #[arg(long = "file-agent", value_name = "ID")]
    pub file_agents: Vec<String>,

    /// Context metadata echoed in the result (repeatable)
    #[arg(long = "context", value_name = "KEY=VALUE")]
    pub context: Vec<String>,
}

impl Cli {
    /// Per-run overrides for settings resolution
    pub fn overrides(&self) -> RunOverrides {
        RunOverrides {
            query: self.query.clone(),
            api_key: self.api_key.clone(),
            base_url: self.base_url.clone(),
            external_user_id: self.external_user_id.clone(),
            agent_ids: self.agents.clone(),
            response_mode: self.response_mode.clone(),
            endpoint_id: self.endpoint_id.clone(),
            reasoning_mode: self.reasoning_mode.clone(),
            fulfillment_prompt: self.fulfillment_prompt.clone(),
            stop_sequences: self.stop_sequences.clone(),
            temperature: self.temperature,
            top_p: self.top_p,
            max_tokens: self.max_tokens,
            presence_penalty: self.presence_penalty,
            frequency_penalty: self.frequency_penalty,
            media_file_path: self.file.clone(),
            file_agent_ids: self.file_agents.clone(),
            context: self.context.clone(),
        }
    }
}
