#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

pub mod config;
pub mod handler;
pub mod model;
pub mod server;
pub mod service;
pub mod store;

pub use crate::config::{ModelConfig, ServerConfig};
pub use crate::handler::{ServiceState, routes};
pub use crate::model::ChatModel;
pub use crate::server::{ServerError, serve};
pub use crate::service::AssistantService;
pub use crate::store::KnowledgeStore;
