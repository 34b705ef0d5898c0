//! `ragbot onboard` — write a default config file and data directories.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use colored::Colorize;

use ragbot_core::config::{get_config_path, save_config, Config};
use ragbot_core::utils::{get_history_path, get_transcripts_path};
use ragbot_core::Vendor;

/// Run the onboard command.
pub fn run(config_path: Option<PathBuf>) -> Result<()> {
    println!();
    println!("{}", "🤖 Ragbot — Setup".cyan().bold());
    println!();

    let config_path = config_path.unwrap_or_else(get_config_path);

    if write_default_config(&config_path)? {
        println!(
            "  {} created config at {}",
            "✓".green(),
            config_path.display()
        );
    } else {
        println!(
            "  {} config already exists at {}",
            "✓".green(),
            config_path.display()
        );
    }

    for dir in [get_history_path(), get_transcripts_path()] {
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("failed to create {}", dir.display()))?;
        println!("  {} {}", "✓".green(), dir.display());
    }

    println!();
    println!("  Add an API key to the config file or export one of:");
    for vendor in Vendor::ALL {
        println!("    {:<20} {}", vendor.env_key(), vendor.display_name().dimmed());
    }
    println!();
    println!(
        "{}",
        "  Setup complete! Run `ragbot chat` to start chatting.".green()
    );
    println!();

    Ok(())
}

/// Write the default config unless the file exists. Returns whether it wrote.
fn write_default_config(path: &Path) -> Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    save_config(&Config::default(), Some(path))
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(true)
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
