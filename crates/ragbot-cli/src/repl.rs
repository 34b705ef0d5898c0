//! Interactive REPL.
//!
//! Uses `rustyline` for readline-style editing with persistent history.
//! Lines starting with `/` are commands; everything else is sent to the
//! selected vendor.

use anyhow::Result;
use colored::Colorize;
use rustyline::config::Configurer;
use rustyline::history::DefaultHistory;
use rustyline::{DefaultEditor, Editor};
use tracing::debug;

use ragbot_chat::transcript::export_transcript;
use ragbot_chat::ConversationSession;
use ragbot_core::utils::{get_history_path, get_transcripts_path};
use ragbot_core::{CompletionError, ConfigError, Vendor};

use crate::helpers;

/// Exit commands (case-insensitive match).
const EXIT_COMMANDS: &[&str] = &["exit", "quit", "/exit", "/quit", ":q"];

const HELP: &str = "\
  /clear           start over (keeps the welcome message)
  /vendor [name]   show or switch vendor: gemini, groq, claude, openai, perplexity
  /temp [x]        show or set temperature (0.0 - 1.0)
  /stats           request counts and response times
  /export          save the transcript as JSONL
  /help            this list
  exit, quit, :q   leave";

/// One line of REPL input, classified.
#[derive(Debug, PartialEq)]
enum ReplCommand<'a> {
    Exit,
    Clear,
    Vendor(Option<&'a str>),
    Temp(Option<&'a str>),
    Stats,
    Export,
    Help,
    Unknown(&'a str),
    Message(&'a str),
}

fn parse_command(input: &str) -> ReplCommand<'_> {
    let input = input.trim();
    if is_exit_command(input) {
        return ReplCommand::Exit;
    }
    let Some(rest) = input.strip_prefix('/') else {
        return ReplCommand::Message(input);
    };

    let (name, arg) = match rest.split_once(char::is_whitespace) {
        Some((name, arg)) => (name, Some(arg.trim()).filter(|a| !a.is_empty())),
        None => (rest, None),
    };

    match name.to_lowercase().as_str() {
        "clear" => ReplCommand::Clear,
        "vendor" => ReplCommand::Vendor(arg),
        "temp" | "temperature" => ReplCommand::Temp(arg),
        "stats" => ReplCommand::Stats,
        "export" => ReplCommand::Export,
        "help" | "?" => ReplCommand::Help,
        _ => ReplCommand::Unknown(input),
    }
}

/// Run the interactive REPL loop.
pub async fn run(mut session: ConversationSession) -> Result<()> {
    helpers::print_banner(session.vendor(), session.model().as_deref());
    for turn in session.turns() {
        helpers::print_turn(session.vendor(), turn);
    }

    let mut editor = create_editor()?;

    loop {
        let input = match editor.readline("You: ") {
            Ok(line) => line,
            Err(rustyline::error::ReadlineError::Interrupted) => {
                // Ctrl-C — exit cleanly
                break;
            }
            Err(rustyline::error::ReadlineError::Eof) => {
                // Ctrl-D — exit cleanly
                break;
            }
            Err(e) => {
                eprintln!("Input error: {e}");
                break;
            }
        };

        if input.trim().is_empty() {
            continue;
        }
        let _ = editor.add_history_entry(&input);

        match parse_command(&input) {
            ReplCommand::Exit => {
                println!("\nGoodbye! 👋");
                break;
            }
            ReplCommand::Message(text) => send(&mut session, text).await,
            ReplCommand::Clear => match session.clear() {
                Ok(()) => {
                    println!("{}", "Conversation cleared.".dimmed());
                    for turn in session.turns() {
                        helpers::print_turn(session.vendor(), turn);
                    }
                }
                Err(e) => eprintln!("\n❌ {e}\n"),
            },
            ReplCommand::Vendor(name) => switch_vendor(&mut session, name),
            ReplCommand::Temp(value) => set_temperature(&mut session, value),
            ReplCommand::Stats => helpers::print_stats(session.stats()),
            ReplCommand::Export => {
                match export_transcript(session.turns(), session.vendor(), &get_transcripts_path()) {
                    Ok(path) => println!("{} {}", "Saved transcript to".dimmed(), path.display()),
                    Err(e) => eprintln!("\n❌ Export failed: {e}\n"),
                }
            }
            ReplCommand::Help => println!("\n{HELP}\n"),
            ReplCommand::Unknown(cmd) => {
                println!("{} {cmd}  (try /help)", "Unknown command:".yellow())
            }
        }
    }

    save_history(&mut editor);

    Ok(())
}

async fn send(session: &mut ConversationSession, text: &str) {
    let vendor = session.vendor();
    debug!(vendor = %vendor, input = text, "processing input");
    helpers::print_thinking();

    let outcome = session.submit(text).await;
    helpers::clear_thinking();

    match outcome {
        Ok(turns) => {
            if let Some(turn) = turns.last() {
                helpers::print_turn(vendor, turn);
            }
        }
        Err(e) => eprintln!("\n❌ Error: {e}\n"),
    }

    if session.last_error().is_some_and(CompletionError::is_fatal) {
        println!("{}", key_hint(session));
    }
}

/// Where to go after a vendor rejected the session for lack of a key.
fn key_hint(session: &ConversationSession) -> String {
    let usable: Vec<&str> = Vendor::ALL
        .into_iter()
        .filter(|v| session.has_credential(*v))
        .map(|v| v.as_str())
        .collect();
    if usable.is_empty() {
        "Run `ragbot onboard` to set up an API key.".dimmed().to_string()
    } else {
        format!("Try /vendor {}", usable.join(" | ")).dimmed().to_string()
    }
}

fn switch_vendor(session: &mut ConversationSession, name: Option<&str>) {
    let Some(name) = name else {
        println!("Current vendor: {}", session.vendor().to_string().bold());
        for vendor in Vendor::ALL {
            let key = if session.has_credential(vendor) {
                "✓".green().to_string()
            } else {
                "· no key".dimmed().to_string()
            };
            println!("  {:<12} {key}", vendor.as_str());
        }
        return;
    };

    let vendor: Vendor = match name.parse() {
        Ok(v) => v,
        Err(e) => {
            eprintln!("{} {e}", "✗".red());
            return;
        }
    };
    if !session.has_credential(vendor) {
        eprintln!("{} {}", "✗".red(), ConfigError::missing_credential(vendor));
        return;
    }

    session.select_vendor(vendor);
    println!(
        "Now talking to {} ({})",
        vendor.to_string().bold(),
        session.model().unwrap_or_default()
    );
}

fn set_temperature(session: &mut ConversationSession, value: Option<&str>) {
    let Some(value) = value else {
        println!("Temperature: {}", session.sampling().temperature());
        return;
    };

    let parsed = match value.parse::<f64>() {
        Ok(t) => t,
        Err(_) => {
            eprintln!("{} not a number: {value}", "✗".red());
            return;
        }
    };
    match session.sampling().with_temperature(parsed) {
        Ok(sampling) => {
            session.set_sampling(sampling);
            println!("Temperature set to {parsed}");
        }
        Err(e) => eprintln!("{} {e}", "✗".red()),
    }
}

/// Create a rustyline editor with history.
fn create_editor() -> Result<Editor<(), DefaultHistory>> {
    let mut editor = DefaultEditor::new()?;
    editor.set_max_history_size(1000)?;

    let history_path = history_path();
    if history_path.exists() {
        let _ = editor.load_history(&history_path);
        debug!("loaded REPL history from {}", history_path.display());
    }

    Ok(editor)
}

/// Save history to disk.
fn save_history(editor: &mut Editor<(), DefaultHistory>) {
    let path = history_path();
    if let Some(parent) = path.parent() {
        let _ = std::fs::create_dir_all(parent);
    }
    if let Err(e) = editor.save_history(&path) {
        debug!("failed to save history: {e}");
    }
}

/// Path to the history file.
fn history_path() -> std::path::PathBuf {
    get_history_path().join("cli_history")
}

/// Check if input is an exit command.
fn is_exit_command(input: &str) -> bool {
    let lower = input.to_lowercase();
    EXIT_COMMANDS.contains(&lower.as_str())
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use ragbot_providers::AdapterRegistry;

    #[test]
    fn exit_commands() {
        assert!(is_exit_command("exit"));
        assert!(is_exit_command("EXIT"));
        assert!(is_exit_command("/quit"));
        assert!(is_exit_command(":q"));
        assert!(!is_exit_command("hello"));
        assert!(!is_exit_command(""));
    }

    #[test]
    fn parses_commands() {
        assert_eq!(parse_command("  quit "), ReplCommand::Exit);
        assert_eq!(parse_command("/clear"), ReplCommand::Clear);
        assert_eq!(parse_command("/vendor"), ReplCommand::Vendor(None));
        assert_eq!(parse_command("/vendor  claude "), ReplCommand::Vendor(Some("claude")));
        assert_eq!(parse_command("/TEMP 0.3"), ReplCommand::Temp(Some("0.3")));
        assert_eq!(parse_command("/stats"), ReplCommand::Stats);
        assert_eq!(parse_command("/export"), ReplCommand::Export);
        assert_eq!(parse_command("/help"), ReplCommand::Help);
        assert_eq!(parse_command("/frobnicate"), ReplCommand::Unknown("/frobnicate"));
        assert_eq!(
            parse_command("What are your business hours?"),
            ReplCommand::Message("What are your business hours?")
        );
    }

    #[test]
    fn history_path_under_data_dir() {
        let path = history_path();
        assert!(path.to_string_lossy().contains(".ragbot"));
        assert!(path.to_string_lossy().contains("cli_history"));
    }

    #[test]
    fn vendor_switch_needs_key() {
        let mut session = ConversationSession::new(AdapterRegistry::default(), Vendor::Groq);
        switch_vendor(&mut session, Some("claude"));
        assert_eq!(session.vendor(), Vendor::Groq);
        switch_vendor(&mut session, Some("nope"));
        assert_eq!(session.vendor(), Vendor::Groq);
    }

    #[test]
    fn key_hint_lists_usable_vendors() {
        let session = ConversationSession::new(AdapterRegistry::default(), Vendor::Groq);
        assert!(key_hint(&session).contains("ragbot onboard"));

        let mut config = ragbot_core::config::Config::default();
        config.providers.claude.api_key = "sk-ant".into();
        config.providers.openai.api_key = "sk".into();
        let session =
            ConversationSession::from_config(&config, AdapterRegistry::default()).unwrap();
        assert!(key_hint(&session).contains("/vendor claude | openai"));
    }

    #[test]
    fn temperature_is_validated() {
        let mut session = ConversationSession::new(AdapterRegistry::default(), Vendor::Groq);
        set_temperature(&mut session, Some("0.25"));
        assert_eq!(session.sampling().temperature(), 0.25);
        set_temperature(&mut session, Some("1.5"));
        assert_eq!(session.sampling().temperature(), 0.25);
        set_temperature(&mut session, Some("warm"));
        assert_eq!(session.sampling().temperature(), 0.25);
    }
}
