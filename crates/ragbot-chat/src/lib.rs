//! Conversation layer for Ragbot.
//!
//! - [`session::ConversationSession`] — transcript owner, one request at a time
//! - [`persona`] — built-in system prompts
//! - [`stats::SessionStats`] — request counters and latency
//! - [`transcript`] — JSONL export

pub mod persona;
pub mod session;
pub mod stats;
pub mod transcript;

pub use session::{ConversationSession, SessionError, SessionState};
pub use stats::SessionStats;
