//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── client: ClientConfig   # Origin, timeout, user agent, headers
//! ├── verbose                # Debug logging when RUST_LOG is unset
//! └── command: Command       # chat | knowledge ...
//! ```
//!
//! All client options can be provided via CLI arguments or environment
//! variables. Use `--help` to see all available options.
//!
//! # Example
//!
//! ```bash
//! halo-assistant --origin https://blog.example.com knowledge list
//!
//! # Or via environment variables
//! HALO_ORIGIN=https://blog.example.com halo-assistant chat "What is Halo?"
//! ```

use std::process;

use anyhow::{Context, bail};
use clap::Parser;
use halo_assistant::ClientConfig;

use crate::TRACING_TARGET_CONFIG;
use crate::command::Command;

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "halo-assistant")]
#[command(about = "Chat with the Halo AI assistant and manage its knowledge corpus")]
#[command(version)]
pub struct Cli {
    /// Assistant API client configuration.
    #[clap(flatten)]
    pub client: ClientConfig,

    /// Log at debug level when RUST_LOG is not set
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads environment variables from .env file (if enabled) and parses CLI arguments.
    ///
    /// The .env file is loaded before clap parses arguments so that its
    /// variables act as defaults for `env`-backed options.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    /// Loads environment variables from .env file if the dotenv feature is enabled.
    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    /// No-op when dotenv feature is disabled.
    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Validates all configuration values.
    ///
    /// The console always talks HTTP through reqwest, which cannot send a
    /// path-only URL, so an origin is required here.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.client.resolved_origin().is_empty() {
            bail!("no Halo origin configured: pass --origin or set HALO_ORIGIN");
        }

        self.client
            .validate()
            .context("invalid client configuration")?;
        Ok(())
    }

    /// Logs configuration at debug level (no header values).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "Build information"
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            origin = self.client.resolved_origin(),
            timeout_secs = ?self.client.http_timeout,
            user_agent = %self.client.effective_user_agent(),
            extra_headers = self.client.headers.len(),
            "Client configuration"
        );
    }

    /// Returns a list of enabled compile-time features.
    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
