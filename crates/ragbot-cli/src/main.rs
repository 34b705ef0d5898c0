//! Ragbot CLI — entry point.
//!
//! # Commands
//!
//! - `ragbot chat [-m MESSAGE] [-v VENDOR] [-t TEMP]` — single-shot or REPL
//! - `ragbot onboard` — write a default config file
//! - `ragbot status` — show configuration and vendor status

mod helpers;
mod onboard;
mod repl;
mod status;

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;

use ragbot_chat::ConversationSession;
use ragbot_core::config::{load_config, Config};
use ragbot_core::utils::expand_home;
use ragbot_core::{Persona, Vendor};
use ragbot_providers::AdapterRegistry;

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// 🤖 Ragbot — chat with Gemini, Groq, Claude, OpenAI or Perplexity
#[derive(Parser)]
#[command(name = "ragbot", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with an LLM (single-shot or interactive REPL)
    Chat {
        /// Single message (non-interactive). Omit for REPL mode.
        #[arg(short, long)]
        message: Option<String>,

        /// Vendor to talk to (gemini, groq, claude, openai, perplexity)
        #[arg(short, long)]
        vendor: Option<Vendor>,

        /// Sampling temperature, 0.0 to 1.0
        #[arg(short, long)]
        temperature: Option<f64>,

        /// Maximum tokens per answer
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Built-in system prompt (support, standard)
        #[arg(long)]
        persona: Option<Persona>,

        /// Config file (defaults to ~/.ragbot/config.json)
        #[arg(long)]
        config: Option<String>,

        /// Enable debug logging
        #[arg(long, default_value_t = false)]
        logs: bool,
    },

    /// Write a default configuration file
    Onboard {
        /// Config file (defaults to ~/.ragbot/config.json)
        #[arg(long)]
        config: Option<String>,
    },

    /// Show configuration and vendor status
    Status {
        /// Config file (defaults to ~/.ragbot/config.json)
        #[arg(long)]
        config: Option<String>,
    },
}

/// Command-line values that take precedence over the config file.
#[derive(Debug, Default)]
struct ChatOverrides {
    vendor: Option<Vendor>,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
    persona: Option<Persona>,
}

impl ChatOverrides {
    fn apply(self, config: &mut Config) {
        if let Some(vendor) = self.vendor {
            config.chat.vendor = vendor;
        }
        if let Some(temperature) = self.temperature {
            config.chat.temperature = temperature;
        }
        if let Some(max_tokens) = self.max_tokens {
            config.chat.max_output_tokens = max_tokens;
        }
        if let Some(persona) = self.persona {
            config.chat.persona = persona;
        }
    }
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Chat {
            message,
            vendor,
            temperature,
            max_tokens,
            persona,
            config,
            logs,
        } => {
            init_logging(logs);
            let overrides = ChatOverrides {
                vendor,
                temperature,
                max_tokens,
                persona,
            };
            run_chat(message, overrides, config_path(config)).await
        }
        Commands::Onboard { config } => onboard::run(config_path(config)),
        Commands::Status { config } => status::run(config_path(config)),
    }
}

fn config_path(arg: Option<String>) -> Option<PathBuf> {
    arg.as_deref().map(expand_home)
}

// ─────────────────────────────────────────────
// Chat command
// ─────────────────────────────────────────────

async fn run_chat(
    message: Option<String>,
    overrides: ChatOverrides,
    config_path: Option<PathBuf>,
) -> Result<()> {
    let mut config = load_config(config_path.as_deref());
    overrides.apply(&mut config);

    let mut session = build_session(&config)?;

    match message {
        Some(msg) => {
            // Single-shot mode
            let vendor = session.vendor();
            info!(vendor = %vendor, "processing single message");
            let turns = session.submit(&msg).await?;
            match turns.last() {
                Some(turn) if turn.error => anyhow::bail!("{}", turn.content),
                Some(turn) => helpers::print_response(vendor, &turn.content),
                None => {}
            }
        }
        None => {
            // Interactive REPL mode
            repl::run(session).await?;
        }
    }

    Ok(())
}

/// Build a session from configuration, refusing to start without a key for
/// the selected vendor.
fn build_session(config: &Config) -> Result<ConversationSession> {
    let vendor = config.chat.vendor;
    config.check_ready(vendor).with_context(|| {
        let configured = config.providers.configured_vendors();
        if configured.is_empty() {
            format!("cannot start a chat with {vendor}")
        } else {
            let names: Vec<&str> = configured.iter().map(|v| v.as_str()).collect();
            format!(
                "cannot start a chat with {vendor} (keys are set for: {})",
                names.join(", ")
            )
        }
    })?;

    let adapters = AdapterRegistry::from_config(&config.providers, config.chat.request_timeout())?;
    let session = ConversationSession::from_config(config, adapters)?;
    Ok(session)
}

/// Initialize tracing/logging.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("ragbot=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .init();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
