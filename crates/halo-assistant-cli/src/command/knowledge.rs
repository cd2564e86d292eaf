//! Knowledge corpus management.

use std::io::Write;

use anyhow::Context;
use halo_assistant::AssistantClient;
use halo_assistant::types::{KnowledgeItem, KnowledgePayload};

use super::{ContentArgs, KnowledgeCommand};
use crate::TRACING_TARGET_COMMAND;

/// Characters of content shown per item in listings.
const PREVIEW_CHARS: usize = 60;

pub(super) async fn execute<W: Write>(
    client: &AssistantClient,
    command: KnowledgeCommand,
    out: &mut W,
) -> anyhow::Result<()> {
    match command {
        KnowledgeCommand::List { json } => {
            let items = client
                .list_knowledge()
                .await
                .context("failed to list knowledge")?;

            if json {
                serde_json::to_writer_pretty(&mut *out, &items)?;
                writeln!(out)?;
            } else {
                render_list(&items, out)?;
            }
        }
        KnowledgeCommand::Create { title, content } => {
            let payload = KnowledgePayload::new(title, content.resolve().await?);
            let item = client
                .create_knowledge(&payload)
                .await
                .context("failed to create knowledge item")?;

            tracing::info!(target: TRACING_TARGET_COMMAND, id = %item.id, "Knowledge item created");
            writeln!(out, "created {}", item.id)?;
        }
        KnowledgeCommand::Update { id, title, content } => {
            let payload = KnowledgePayload::new(title, content.resolve().await?);
            let item = client
                .update_knowledge(&id, &payload)
                .await
                .with_context(|| format!("failed to update knowledge item {id}"))?;

            tracing::info!(target: TRACING_TARGET_COMMAND, id = %item.id, "Knowledge item updated");
            writeln!(out, "updated {}", item.id)?;
        }
        KnowledgeCommand::Delete { id } => {
            client
                .delete_knowledge(&id)
                .await
                .with_context(|| format!("failed to delete knowledge item {id}"))?;

            tracing::info!(target: TRACING_TARGET_COMMAND, %id, "Knowledge item deleted");
            writeln!(out, "deleted {id}")?;
        }
    }
    Ok(())
}

impl ContentArgs {
    /// Returns the inline content, or reads it from the given file.
    async fn resolve(self) -> anyhow::Result<String> {
        match (self.content, self.file) {
            (Some(content), _) => Ok(content),
            (None, Some(path)) => tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("failed to read {}", path.display())),
            (None, None) => anyhow::bail!("either --content or --file is required"),
        }
    }
}

fn render_list<W: Write>(items: &[KnowledgeItem], out: &mut W) -> std::io::Result<()> {
    if items.is_empty() {
        return writeln!(out, "no knowledge items");
    }

    for item in items {
        writeln!(out, "{}\t{}\t{}", item.id, item.title, preview(&item.content))?;
    }
    Ok(())
}

/// Returns the first line of the content, shortened to [`PREVIEW_CHARS`].
fn preview(content: &str) -> String {
    let line = content.lines().next().unwrap_or_default().trim();
    if line.chars().count() > PREVIEW_CHARS {
        let short: String = line.chars().take(PREVIEW_CHARS).collect();
        format!("{short}…")
    } else {
        line.to_owned()
    }
}
