#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod connect;
mod error;

pub mod endpoint;
pub mod plugin;
pub mod prelude;
pub mod transport;
pub mod types;

pub use crate::connect::{AssistantClient, ClientConfig, TRACING_TARGET};
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
