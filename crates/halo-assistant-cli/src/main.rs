#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod command;
mod config;
mod telemetry;

use std::process;

use anyhow::Context;
use halo_assistant::AssistantClient;

use crate::config::Cli;

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "halo_assistant_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "halo_assistant_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "halo_assistant_cli::command";

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_STARTUP,
            error = format!("{error:#}"),
            "command failed"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::init();

    telemetry::init_tracing(cli.verbose)?;
    cli.log();
    cli.validate()?;

    let client =
        AssistantClient::new(cli.client.clone()).context("failed to create assistant client")?;

    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        command = ?cli.command,
        "Executing command"
    );

    cli.command.execute(&client).await
}
