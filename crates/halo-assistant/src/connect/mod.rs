//! Assistant client module.
//!
//! This module provides the main client interface for the assistant API.
//! It builds plugin URLs and delegates each request to an
//! [`HttpTransport`](crate::transport::HttpTransport).

mod client;
mod config;

pub use client::{AssistantClient, TRACING_TARGET};
pub use config::ClientConfig;
