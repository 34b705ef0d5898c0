//! LLM vendor adapters for Ragbot.
//!
//! # Architecture
//!
//! - [`traits::ProviderAdapter`] — one `complete` call per user message
//! - [`registry`] — static specs for the 5 supported vendors
//! - [`openai_compat::OpenAiCompatAdapter`] — Groq, OpenAI, Perplexity
//! - [`gemini::GeminiAdapter`] — Google `generateContent`
//! - [`claude::ClaudeAdapter`] — Anthropic Messages API
//! - [`adapters::AdapterRegistry`] — vendor → adapter lookup built from config

pub mod adapters;
pub mod claude;
pub mod context;
pub mod gemini;
mod http;
pub mod openai_compat;
pub mod registry;
pub mod traits;

// Re-export main types for convenience
pub use adapters::AdapterRegistry;
pub use claude::ClaudeAdapter;
pub use gemini::GeminiAdapter;
pub use openai_compat::OpenAiCompatAdapter;
pub use registry::{HistoryMode, ProviderSpec, WireFormat, PROVIDERS};
pub use traits::ProviderAdapter;
