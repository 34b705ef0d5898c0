//! Ragbot core — shared types, errors, configuration, and path helpers.
//!
//! Everything here is vendor-agnostic: the provider adapters and the
//! conversation session both build on these types.

pub mod config;
pub mod error;
pub mod types;
pub mod utils;

pub use error::{CompletionError, CompletionResult, ConfigError, FailureKind};
pub use types::{Persona, ProviderCredential, Role, SamplingConfig, SamplingError, Turn, Vendor};
