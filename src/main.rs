// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2025 Blackman Artificial Intelligence Technologies Inc.

//! ondemand-chat - ask the OnDemand chat API a question from your terminal
//!
//! Entry point for the ondemand-chat CLI application.

use clap::Parser;

use ondemand_chat::cli::Cli;
use ondemand_chat::config::Settings;
use ondemand_chat::error::Result;
use ondemand_chat::workflow;

#[tokio::main]
async fn main() {
    // Parse CLI arguments
    let cli = Cli::parse();

    // Initialize tracing
    let mut env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::WARN.into());

    // `-v` shows progress, `-vv` adds request bodies. `RUST_LOG` still applies.
    let directive = match cli.verbose {
        0 => None,
        1 => Some("ondemand_chat=info"),
        _ => Some("ondemand_chat=debug"),
    };
    if let Some(directive) = directive {
        if let Ok(parsed) = directive.parse() {
            env_filter = env_filter.add_directive(parsed);
        }
    }

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run(cli).await {
        eprintln!("❌ {}", err);
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<()> {
    let settings = match &cli.config {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    let config = settings.resolve(cli.overrides())?;
    tracing::info!(
        response_mode = %config.generation.response_mode,
        base_url = %config.base_url,
        "configuration resolved"
    );

    let result = workflow::run(&config).await?;
    println!("{}", result.to_pretty_json()?);
    Ok(())
}
