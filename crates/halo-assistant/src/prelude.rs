//! Convenient re-exports for common use.

pub use crate::plugin::{PluginDescriptor, TabDescriptor, define_plugin};
pub use crate::transport::{HttpTransport, ReqwestTransport};
pub use crate::types::{
    ChatMessage, ChatRequest, ChatResponse, KnowledgeItem, KnowledgePayload, Role,
    SourceReference,
};
pub use crate::{AssistantClient, ClientConfig, Error, ErrorKind, Result};
