//! Subcommands and their dispatch.

mod chat;
mod knowledge;

use std::io::Write;
use std::path::PathBuf;

use clap::{ArgGroup, Args, Subcommand};
use halo_assistant::AssistantClient;
use tokio::io::BufReader;

use self::chat::ChatSession;

/// Top-level subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Ask the assistant a question, or start an interactive conversation
    Chat(ChatArgs),
    /// Manage the knowledge corpus used to ground answers
    Knowledge {
        #[command(subcommand)]
        command: KnowledgeCommand,
    },
}

/// Arguments of the `chat` subcommand.
#[derive(Debug, Clone, Args)]
#[command(group(ArgGroup::new("mode").required(true).args(["question", "interactive"])))]
pub struct ChatArgs {
    /// Question to ask
    pub question: Option<String>,

    /// Read questions from stdin and keep the conversation history
    #[arg(short, long)]
    pub interactive: bool,

    /// Number of knowledge items the backend should retrieve
    #[arg(long, value_parser = clap::value_parser!(u32).range(1..))]
    pub top_k: Option<u32>,

    /// System message prepended to the conversation history
    #[arg(long)]
    pub system: Option<String>,

    /// Print the raw JSON response
    #[arg(long, conflicts_with = "interactive")]
    pub json: bool,
}

/// Knowledge corpus subcommands.
#[derive(Debug, Clone, Subcommand)]
pub enum KnowledgeCommand {
    /// List every knowledge item
    List {
        /// Print the raw JSON response
        #[arg(long)]
        json: bool,
    },
    /// Create a knowledge item
    Create {
        #[arg(long)]
        title: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Replace the title and content of a knowledge item
    Update {
        /// Id of the item to update
        id: String,
        #[arg(long)]
        title: String,
        #[command(flatten)]
        content: ContentArgs,
    },
    /// Delete a knowledge item
    Delete {
        /// Id of the item to delete
        id: String,
    },
}

/// Where the content of a knowledge item comes from.
#[derive(Debug, Clone, Args)]
#[group(required = true, multiple = false)]
pub struct ContentArgs {
    /// Content given inline
    #[arg(long)]
    pub content: Option<String>,

    /// Read the content from a UTF-8 file
    #[arg(long)]
    pub file: Option<PathBuf>,
}

impl Command {
    /// Runs the command, writing results to stdout.
    pub async fn execute(self, client: &AssistantClient) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout();
        self.execute_with(client, &mut stdout).await?;
        stdout.flush()?;
        Ok(())
    }

    async fn execute_with<W: Write>(
        self,
        client: &AssistantClient,
        out: &mut W,
    ) -> anyhow::Result<()> {
        match self {
            Self::Chat(args) if args.interactive => {
                let input = BufReader::new(tokio::io::stdin());
                let session = ChatSession::new(args.top_k, args.system);
                chat::run_interactive(client, session, input, out).await
            }
            Self::Chat(args) => {
                let question = args.question.unwrap_or_default();
                let session = ChatSession::new(args.top_k, args.system);
                chat::run_once(client, &session, &question, args.json, out).await
            }
            Self::Knowledge { command } => knowledge::execute(client, command, out).await,
        }
    }
}
