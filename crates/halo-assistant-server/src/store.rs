//! Knowledge items persisted to a single JSON file.
//!
//! Items are held in memory and the whole list is rewritten on every change.
//! A change only becomes visible once the file has been written.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use halo_assistant::types::{KnowledgeItem, KnowledgePayload, SourceReference};
use serde::Deserialize;
use thiserror::Error;
use tokio::sync::RwLock;
use uuid::Uuid;

/// Tracing target for knowledge store operations.
pub const TRACING_TARGET: &str = "halo_assistant_server::store";

/// Query tokens shorter than this many characters are ignored.
const MIN_TOKEN_CHARS: usize = 2;

/// Snippets longer than this many characters are cut and marked with `...`.
const SNIPPET_CHARS: usize = 220;

/// Errors raised by the knowledge store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// No item has the requested id.
    #[error("knowledge item not found: {0}")]
    NotFound(String),

    /// The knowledge file could not be written.
    #[error("failed to write knowledge file {}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The item list could not be encoded.
    #[error("failed to encode knowledge items")]
    Encode(#[from] serde_json::Error),
}

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Item as found on disk. Entries without an id are dropped on load.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct StoredItem {
    id: Option<String>,
    title: Option<String>,
    content: Option<String>,
}

impl StoredItem {
    fn into_item(self) -> Option<KnowledgeItem> {
        Some(KnowledgeItem {
            id: self.id?,
            title: self.title.unwrap_or_default(),
            content: self.content.unwrap_or_default(),
        })
    }
}

struct KnowledgeStoreInner {
    path: PathBuf,
    items: RwLock<Vec<KnowledgeItem>>,
}

/// Shared handle to the knowledge corpus.
#[derive(Clone)]
pub struct KnowledgeStore {
    inner: Arc<KnowledgeStoreInner>,
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("path", &self.inner.path)
            .finish_non_exhaustive()
    }
}

impl KnowledgeStore {
    /// Opens the store backed by `path`.
    ///
    /// A missing file gives an empty store. An unreadable or malformed file
    /// is logged and also gives an empty store; it is overwritten by the
    /// next change.
    pub async fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let items = load(&path).await;

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            items = items.len(),
            "Knowledge store opened"
        );

        Self {
            inner: Arc::new(KnowledgeStoreInner {
                path,
                items: RwLock::new(items),
            }),
        }
    }

    /// Returns the backing file.
    pub fn path(&self) -> &Path {
        &self.inner.path
    }

    /// Returns a snapshot of every item, in insertion order.
    pub async fn list(&self) -> Vec<KnowledgeItem> {
        self.inner.items.read().await.clone()
    }

    /// Stores a new item under a fresh `kb-` id.
    pub async fn create(&self, payload: KnowledgePayload) -> StoreResult<KnowledgeItem> {
        let item = KnowledgeItem {
            id: new_id(),
            title: payload.title,
            content: payload.content,
        };

        let mut items = self.inner.items.write().await;
        let mut next = items.clone();
        next.push(item.clone());
        self.persist(&next).await?;
        *items = next;

        tracing::debug!(target: TRACING_TARGET, id = %item.id, "Knowledge item created");
        Ok(item)
    }

    /// Replaces the title and content of an existing item.
    pub async fn update(&self, id: &str, payload: KnowledgePayload) -> StoreResult<KnowledgeItem> {
        let mut items = self.inner.items.write().await;
        let Some(index) = items.iter().position(|item| item.id == id) else {
            return Err(StoreError::NotFound(id.to_owned()));
        };

        let mut next = items.clone();
        next[index].title = payload.title;
        next[index].content = payload.content;
        let updated = next[index].clone();
        self.persist(&next).await?;
        *items = next;

        tracing::debug!(target: TRACING_TARGET, %id, "Knowledge item updated");
        Ok(updated)
    }

    /// Removes every item with the given id.
    ///
    /// Unknown ids are not an error. A blank id is ignored.
    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        if id.trim().is_empty() {
            return Ok(());
        }

        let mut items = self.inner.items.write().await;
        let next: Vec<KnowledgeItem> = items.iter().filter(|item| item.id != id).cloned().collect();
        let removed = items.len() - next.len();
        self.persist(&next).await?;
        *items = next;

        tracing::debug!(target: TRACING_TARGET, %id, removed, "Knowledge item deleted");
        Ok(())
    }

    /// Ranks items by keyword hits and returns the best `top_k` as sources.
    ///
    /// The question is lowercased and split on whitespace; every occurrence
    /// of a token in the lowercased title and content scores one point.
    /// Items without hits are left out and ties keep insertion order.
    pub async fn search(&self, question: &str, top_k: usize) -> Vec<SourceReference> {
        let question = question.to_lowercase();
        let tokens: Vec<&str> = question
            .split_whitespace()
            .filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
            .collect();
        if tokens.is_empty() {
            return Vec::new();
        }

        let items = self.inner.items.read().await;
        let mut ranked: Vec<(usize, &KnowledgeItem)> = items
            .iter()
            .map(|item| (score(item, &tokens), item))
            .filter(|(score, _)| *score > 0)
            .collect();
        ranked.sort_by(|a, b| b.0.cmp(&a.0));

        tracing::debug!(
            target: TRACING_TARGET,
            tokens = tokens.len(),
            hits = ranked.len(),
            top_k,
            "Knowledge searched"
        );

        ranked
            .into_iter()
            .take(top_k)
            .map(|(_, item)| to_source(item))
            .collect()
    }

    async fn persist(&self, items: &[KnowledgeItem]) -> StoreResult<()> {
        let path = &self.inner.path;
        let json = serde_json::to_vec_pretty(items)?;

        let write = async {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(path, json).await
        };

        write.await.map_err(|source| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %source,
                "Failed to save knowledge file"
            );
            StoreError::Write {
                path: path.clone(),
                source,
            }
        })
    }
}

async fn load(path: &Path) -> Vec<KnowledgeItem> {
    let json = match tokio::fs::read_to_string(path).await {
        Ok(json) => json,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "Failed to read knowledge file, starting empty"
            );
            return Vec::new();
        }
    };

    match serde_json::from_str::<Option<Vec<Option<StoredItem>>>>(&json) {
        Ok(stored) => stored
            .unwrap_or_default()
            .into_iter()
            .flatten()
            .filter_map(StoredItem::into_item)
            .collect(),
        Err(e) => {
            tracing::warn!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "Failed to parse knowledge file, starting empty"
            );
            Vec::new()
        }
    }
}

fn new_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    format!("kb-{}", &simple[..16])
}

fn score(item: &KnowledgeItem, tokens: &[&str]) -> usize {
    let haystack = format!("{}\n{}", item.title, item.content).to_lowercase();
    tokens
        .iter()
        .map(|token| haystack.matches(token).count())
        .sum()
}

fn to_source(item: &KnowledgeItem) -> SourceReference {
    SourceReference {
        id: item.id.clone(),
        title: item.title.clone(),
        snippet: snippet(&item.content),
    }
}

fn snippet(content: &str) -> String {
    match content.char_indices().nth(SNIPPET_CHARS) {
        Some((cut, _)) => format!("{}...", &content[..cut]),
        None => content.to_owned(),
    }
}
