//! Conversation shaping shared by the adapters: which turns go upstream,
//! and how single-shot vendors flatten a prompt.

use ragbot_core::{Role, Turn};

/// Turns worth sending to a multi-turn vendor, in order.
///
/// Skips error turns, system turns (the system prompt travels separately)
/// and any assistant turns before the first user turn, such as a welcome
/// message.
pub fn conversation_turns(history: &[Turn]) -> Vec<&Turn> {
    history
        .iter()
        .filter(|t| !t.error && t.role != Role::System)
        .skip_while(|t| t.role != Role::User)
        .collect()
}

/// Content of the most recent user turn.
pub fn latest_user_text(history: &[Turn]) -> Option<&str> {
    history
        .iter()
        .rev()
        .find(|t| t.role == Role::User)
        .map(|t| t.content.as_str())
}

/// Single-shot prompt: system prompt, blank line, user text.
pub fn flatten_prompt(system_prompt: &str, user_text: &str) -> String {
    let system_prompt = system_prompt.trim();
    if system_prompt.is_empty() {
        user_text.to_string()
    } else {
        format!("{system_prompt}\n\n{user_text}")
    }
}

/// How many conversational turns a single-shot request leaves out.
pub fn dropped_turns(history: &[Turn]) -> usize {
    conversation_turns(history).len().saturating_sub(1)
}
