//! Shared CLI helpers — response printing, banner, statistics.

use colored::Colorize;

use ragbot_chat::SessionStats;
use ragbot_core::{Turn, Vendor};

/// Print an assistant answer to stdout.
pub fn print_response(vendor: Vendor, response: &str) {
    println!();
    println!("{}", format!("🤖 {vendor}").cyan().bold());
    if response.is_empty() {
        println!("{}", "(no response)".dimmed());
    } else {
        println!("{response}");
    }
    println!();
}

/// Print an error turn; it replaces the answer in the transcript.
pub fn print_error_turn(content: &str) {
    println!();
    println!("{}", content.yellow());
    println!();
}

/// Print the reply turn appended by a submit.
pub fn print_turn(vendor: Vendor, turn: &Turn) {
    if turn.error {
        print_error_turn(&turn.content);
    } else {
        print_response(vendor, &turn.content);
    }
}

/// Print the banner shown at REPL start.
pub fn print_banner(vendor: Vendor, model: Option<&str>) {
    let version = env!("CARGO_PKG_VERSION");
    println!();
    println!("{}  v{}", "🤖 Ragbot".cyan().bold(), version.dimmed());
    println!(
        "{}",
        format!("Talking to {vendor} ({})", model.unwrap_or("no adapter")).dimmed()
    );
    println!(
        "{}",
        "Type a message, /help for commands, or \"exit\" to quit.".dimmed()
    );
    println!();
}

/// Print a "thinking" placeholder while a request is in flight.
pub fn print_thinking() {
    eprint!("{}", "⠿ thinking...".dimmed());
}

/// Clear the "thinking" placeholder.
pub fn clear_thinking() {
    eprint!("\r{}\r", " ".repeat(40));
}

/// Render session statistics as display lines.
pub fn stats_lines(stats: &SessionStats) -> Vec<String> {
    let mut lines = vec![format!(
        "Requests: {} ({} ok, {} failed)",
        stats.requests(),
        stats.successes(),
        stats.failures()
    )];

    if let Some(rate) = stats.success_rate() {
        lines.push(format!("Success rate: {:.1}%", rate * 100.0));
    }
    if let Some(avg) = stats.average_latency() {
        lines.push(format!("Avg response time: {:.2}s", avg.as_secs_f64()));
    }
    if let Some(last) = stats.last_latency() {
        lines.push(format!("Last response time: {:.2}s", last.as_secs_f64()));
    }
    for (kind, count) in stats.failure_breakdown() {
        lines.push(format!("  {}: {}", kind.as_str(), count));
    }
    lines
}

pub fn print_stats(stats: &SessionStats) {
    println!();
    println!("{}", "📊 Session stats".bold());
    for line in stats_lines(stats) {
        println!("  {line}");
    }
    println!();
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
