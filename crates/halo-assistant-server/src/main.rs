#![forbid(unsafe_code)]

use std::process;

use anyhow::Context;
use clap::Parser;
use halo_assistant_server::server::{TRACING_TARGET_SHUTDOWN, TRACING_TARGET_STARTUP};
use halo_assistant_server::{
    AssistantService, ChatModel, KnowledgeStore, ServerConfig, ServiceState, routes, serve,
};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

/// Backend of the Halo AI assistant plugin.
#[derive(Debug, Parser)]
#[command(name = "halo-assistant-server")]
#[command(about = "Serve the Halo AI assistant knowledge and chat API")]
#[command(version)]
struct Cli {
    #[clap(flatten)]
    server: ServerConfig,
}

#[tokio::main]
async fn main() {
    let Err(error) = run().await else {
        tracing::info!(
            target: TRACING_TARGET_SHUTDOWN,
            "application terminated successfully"
        );
        process::exit(0);
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_SHUTDOWN,
            error = format!("{error:#}"),
            "application terminated with error"
        );
    } else {
        eprintln!("Error: {error:#}");
    }

    process::exit(1);
}

/// Main application entry point.
async fn run() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing();

    tracing::info!(
        target: TRACING_TARGET_STARTUP,
        version = env!("CARGO_PKG_VERSION"),
        pid = process::id(),
        "starting assistant server"
    );
    tracing::debug!(
        target: TRACING_TARGET_STARTUP,
        config = ?cli.server,
        "Server configuration"
    );

    let store = KnowledgeStore::open(cli.server.knowledge_path()).await;
    let model = ChatModel::from_config(&cli.server.model)
        .context("invalid chat model configuration")?;
    if model.is_none() {
        tracing::warn!(
            target: TRACING_TARGET_STARTUP,
            "AI_ASSISTANT_API_KEY is not set, answers will only list retrieved knowledge"
        );
    }

    let state = ServiceState::new(store.clone(), AssistantService::new(store, model));
    serve(routes(state), &cli.server).await?;
    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}
