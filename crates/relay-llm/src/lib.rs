//! Client side of the relay: talks to an Ollama server.
//!
//! - [`LlmBackend`] — Sends a prompt, returns the generated text
//! - [`ReadinessProbe`] — Single health check against the model listing
//! - [`OllamaClient`] — Native Ollama implementation of both
//! - [`wait_until_ready`] — Polls a probe until the model is loaded or time runs out
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use relay_config::RelayConfig;
//! use relay_llm::{LlmBackend, OllamaClient};
//!
//! let config = RelayConfig::from_env()?;
//! let client = OllamaClient::new(&config);
//! let text = client.generate("Why is the sky blue?").await?;
//! ```

mod backend;
mod ollama;
mod readiness;

pub use backend::{LlmBackend, ReadinessProbe};
pub use ollama::{OllamaClient, OllamaMetrics, OllamaModelInfo, OllamaTagsResponse};
pub use readiness::wait_until_ready;
