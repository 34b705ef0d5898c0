//! Built-in system prompts.

use ragbot_core::Persona;

const SUPPORT_PROMPT: &str = "You are a customer support assistant for our company. \
Answer questions about products, orders, billing and business hours accurately and concisely. \
If you do not know the answer, say so and suggest contacting a human agent. \
Never invent policies, prices or order details.";

const STANDARD_PROMPT: &str = "You are a helpful assistant. Answer clearly and concisely.";

/// The built-in prompt for a persona.
pub fn persona_prompt(persona: Persona) -> &'static str {
    match persona {
        Persona::Support => SUPPORT_PROMPT,
        Persona::Standard => STANDARD_PROMPT,
    }
}

/// A non-blank custom prompt wins over the persona's built-in one.
pub fn resolve_system_prompt(persona: Persona, custom: Option<&str>) -> String {
    match custom.map(str::trim) {
        Some(prompt) if !prompt.is_empty() => prompt.to_string(),
        _ => persona_prompt(persona).to_string(),
    }
}
