//! `ragbot status` — show configuration and vendor status.
//!
//! - Config path, selected vendor, model and sampling parameters
//! - Key status and conversation mode for each vendor (never the key itself)

use std::path::PathBuf;

use anyhow::Result;
use colored::Colorize;

use ragbot_chat::persona::resolve_system_prompt;
use ragbot_core::config::{get_config_path, load_config};
use ragbot_core::utils::truncate_string;
use ragbot_providers::registry::{find_by_vendor, resolve_model, HistoryMode, PROVIDERS};

/// Run the status command.
pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    let config = load_config(config_path.as_deref());
    let config_path = config_path.unwrap_or_else(get_config_path);
    let chat = &config.chat;

    println!();
    println!("{}", "🤖 Ragbot Status".cyan().bold());
    println!();

    // Config
    println!(
        "  {:<18} {} {}",
        "Config:".bold(),
        config_path.display(),
        if config_path.exists() {
            "✓".green().to_string()
        } else {
            "(not found, using defaults)".red().to_string()
        }
    );

    // Vendor & model
    let spec = find_by_vendor(chat.vendor);
    println!(
        "  {:<18} {} ({})",
        "Vendor:".bold(),
        chat.vendor,
        resolve_model(spec, config.providers.get(chat.vendor))
    );

    // Temperature & tokens
    println!(
        "  {:<18} {} | max_tokens: {} | timeout: {}s",
        "Parameters:".bold(),
        format!("temp: {}", chat.temperature).dimmed(),
        format!("{}", chat.max_output_tokens).dimmed(),
        chat.request_timeout_secs,
    );

    let prompt = resolve_system_prompt(chat.persona, chat.system_prompt.as_deref());
    println!(
        "  {:<18} {}",
        "System prompt:".bold(),
        truncate_string(&prompt, 60).dimmed()
    );

    // Readiness
    let ready = match config.check_ready(chat.vendor) {
        Ok(()) => format!("{} ready", "✓".green()),
        Err(e) => format!("{} {e}", "✗".red()),
    };
    println!("  {:<18} {}", "Chat:".bold(), ready);

    // Vendors
    println!();
    println!("  {}", "Vendors:".bold());
    for spec in PROVIDERS.iter() {
        let key = if config.providers.get(spec.vendor).is_configured() {
            format!("{} (key set)", "✓".green())
        } else {
            format!("{}", format!("· not configured ({})", spec.env_key()).dimmed())
        };
        let mode = match spec.history {
            HistoryMode::Full => "full history",
            HistoryMode::LatestOnly => "latest message only",
        };
        println!(
            "    {:<12} {:<40} {}",
            spec.display_name(),
            key,
            mode.dimmed()
        );
    }

    println!();

    Ok(())
}
