//! Server and chat model configuration.
//!
//! Every option can be given as a CLI argument or an environment variable.
//! The `AI_ASSISTANT_*` variables keep the names the plugin backend has
//! always read.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use serde::{Deserialize, Serialize};

/// Default location of the knowledge file, relative to the home directory.
const DEFAULT_KNOWLEDGE_PATH: [&str; 4] = [".halo", "plugins", "ai-assistant", "knowledge.json"];

/// HTTP server configuration.
#[derive(Debug, Clone, Args, Serialize, Deserialize)]
#[must_use = "config does nothing unless you use it"]
pub struct ServerConfig {
    /// Host address to bind the server to
    #[arg(long, env = "HOST", default_value = "127.0.0.1")]
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// TCP port number for the server to listen on
    #[arg(short = 'p', long, env = "PORT", default_value_t = 8090)]
    pub port: u16,

    /// JSON file holding the knowledge items
    /// (default: ~/.halo/plugins/ai-assistant/knowledge.json)
    #[arg(long, env = "AI_ASSISTANT_KB_PATH")]
    #[serde(default)]
    pub knowledge_path: Option<PathBuf>,

    /// Chat model used to phrase answers.
    #[command(flatten)]
    #[serde(default)]
    pub model: ModelConfig,
}

fn default_host() -> IpAddr {
    IpAddr::V4(Ipv4Addr::LOCALHOST)
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: 8090,
            knowledge_path: None,
            model: ModelConfig::default(),
        }
    }
}

impl ServerConfig {
    /// Returns the socket address to bind.
    pub fn server_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Returns whether the server listens on every interface.
    pub fn binds_to_all_interfaces(&self) -> bool {
        self.host.is_unspecified()
    }

    /// Returns the knowledge file path, falling back to the home directory.
    ///
    /// A blank configured path counts as unset.
    pub fn knowledge_path(&self) -> PathBuf {
        if let Some(path) = self
            .knowledge_path
            .as_ref()
            .filter(|path| !path.as_os_str().to_string_lossy().trim().is_empty())
        {
            return path.clone();
        }

        let home = std::env::var_os("HOME")
            .or_else(|| std::env::var_os("USERPROFILE"))
            .map_or_else(|| PathBuf::from("."), PathBuf::from);
        DEFAULT_KNOWLEDGE_PATH
            .iter()
            .fold(home, |path, segment| path.join(segment))
    }
}

/// OpenAI-compatible chat completion settings.
///
/// Without an API key no model is called and answers are assembled from the
/// retrieved knowledge items.
#[derive(Clone, Args, Serialize, Deserialize)]
pub struct ModelConfig {
    /// API key of the chat completion service
    #[arg(long = "model-api-key", env = "AI_ASSISTANT_API_KEY")]
    #[serde(default)]
    pub api_key: Option<String>,

    /// Base URL of the chat completion service
    #[arg(
        long = "model-base-url",
        env = "AI_ASSISTANT_BASE_URL",
        default_value = "https://api.openai.com"
    )]
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Model name sent with every completion request
    #[arg(long = "model", env = "AI_ASSISTANT_MODEL", default_value = "gpt-4.1-mini")]
    #[serde(default = "default_model")]
    pub model: String,

    /// Completion request timeout in seconds
    #[arg(long = "model-timeout", env = "AI_ASSISTANT_TIMEOUT", default_value_t = 60)]
    #[serde(default = "default_model_timeout")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_owned()
}

fn default_model() -> String {
    "gpt-4.1-mini".to_owned()
}

fn default_model_timeout() -> u64 {
    60
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_model_timeout(),
        }
    }
}

impl std::fmt::Debug for ModelConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelConfig")
            .field("api_key", &self.api_key().map(|_| "<redacted>"))
            .field("base_url", &self.base_url)
            .field("model", &self.model)
            .field("timeout_secs", &self.timeout_secs)
            .finish()
    }
}

impl ModelConfig {
    /// Returns the API key, treating a blank one as missing.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
    }

    /// Returns the chat completions endpoint.
    pub fn completions_url(&self) -> String {
        format!("{}/v1/chat/completions", self.base_url.trim_end_matches('/'))
    }

    /// Returns the completion request timeout.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Set the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    /// Set the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.server_addr().to_string(), "127.0.0.1:8090");
        assert!(!config.binds_to_all_interfaces());
        assert!(config.model.api_key().is_none());
    }

    #[test]
    fn test_knowledge_path() {
        let config = ServerConfig {
            knowledge_path: Some(PathBuf::from("/tmp/kb.json")),
            ..ServerConfig::default()
        };
        assert_eq!(config.knowledge_path(), PathBuf::from("/tmp/kb.json"));

        let config = ServerConfig {
            knowledge_path: Some(PathBuf::from("  ")),
            ..ServerConfig::default()
        };
        assert!(config.knowledge_path().ends_with(".halo/plugins/ai-assistant/knowledge.json"));
    }

    #[test]
    fn test_model_config() {
        let config = ModelConfig::default().with_base_url("http://localhost:11434//");
        assert_eq!(
            config.completions_url(),
            "http://localhost:11434/v1/chat/completions"
        );
        assert!(ModelConfig::default().with_api_key("  ").api_key().is_none());
        assert_eq!(ModelConfig::default().with_api_key("sk").api_key(), Some("sk"));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let config = ModelConfig::default().with_api_key("sk-secret");
        assert!(!format!("{config:?}").contains("sk-secret"));
    }
}
