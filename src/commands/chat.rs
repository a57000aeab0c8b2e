//! Interactive chat mode handler.
//!
//! Builds the store and request client, then runs a readline-based
//! loop that submits user input to the hosted model and appends the
//! reply to the active session. Slash commands manage sessions without
//! leaving the loop.

use crate::client::ChatClient;
use crate::config::{resolve_model, GenerationOptions};
use crate::error::Result;
use crate::prompt;
use crate::session::{ChatSession, MessageRole};
use crate::storage::Storage;
use crate::store::ChatStore;
use anyhow::bail;
use colored::Colorize;
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use uuid::Uuid;

/// Slash commands recognized inside the chat loop
#[derive(Debug, Clone, PartialEq, Eq)]
enum SpecialCommand {
    /// Start a fresh session and switch to it
    New,
    /// List saved sessions with switch indices
    Sessions,
    /// Switch to the numbered session from the last listing
    Switch(usize),
    /// Toggle the pin flag on the active session
    Pin,
    /// Rename the active session
    Title(String),
    Help,
    Exit,
    /// Slash input that did not parse
    Unknown(String),
    /// Regular chat input
    None,
}

fn parse_special_command(input: &str) -> SpecialCommand {
    if !input.starts_with('/') {
        return SpecialCommand::None;
    }
    let mut parts = input.split_whitespace();
    let command = parts.next().unwrap_or_default();
    match command {
        "/new" => SpecialCommand::New,
        "/sessions" => SpecialCommand::Sessions,
        "/switch" => match parts.next().and_then(|n| n.parse::<usize>().ok()) {
            Some(index) if index >= 1 => SpecialCommand::Switch(index),
            _ => SpecialCommand::Unknown(input.to_string()),
        },
        "/pin" => SpecialCommand::Pin,
        "/title" => {
            let title = input.trim_start_matches("/title").trim();
            if title.is_empty() {
                SpecialCommand::Unknown(input.to_string())
            } else {
                SpecialCommand::Title(title.to_string())
            }
        }
        "/help" => SpecialCommand::Help,
        "/exit" | "/quit" => SpecialCommand::Exit,
        _ => SpecialCommand::Unknown(input.to_string()),
    }
}

/// Start an interactive chat session
///
/// # Arguments
///
/// * `session` - Optional session id to resume
/// * `model_override` - Optional model identifier or catalog label
///   overriding the configured model for this run
pub async fn run_chat(session: Option<String>, model_override: Option<String>) -> Result<()> {
    let storage = Storage::new()?;
    let store = ChatStore::new(storage);
    store.initialize().await;

    let Some(credential) = store.credential() else {
        bail!("No API credential configured. Run `colloquy auth set <key>` first.");
    };

    let settings = store.settings();
    let model = model_override
        .map(|m| resolve_model(&m))
        .unwrap_or_else(|| settings.model.clone());
    let options = GenerationOptions::from(&settings);
    let client = ChatClient::new()?;

    if let Some(raw) = &session {
        let id = Uuid::parse_str(raw).map_err(|_| anyhow::anyhow!("Invalid session id: {raw}"))?;
        let Some(resumed) = store.session(id) else {
            bail!("No session with id {id}");
        };
        store.set_active_session(Some(id));
        print_transcript(&resumed);
    }

    print_welcome_banner(&model, store.sessions().len());

    let mut rl = DefaultEditor::new()?;

    loop {
        match rl.readline("> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                rl.add_history_entry(trimmed)?;

                match parse_special_command(trimmed) {
                    SpecialCommand::New => {
                        let id = store.create_session();
                        store.set_active_session(Some(id));
                        println!("{}\n", "Started a new chat".green());
                        continue;
                    }
                    SpecialCommand::Sessions => {
                        print_session_listing(&store);
                        continue;
                    }
                    SpecialCommand::Switch(index) => {
                        let summaries = store.session_summaries();
                        match summaries.get(index - 1) {
                            Some(summary) => {
                                store.set_active_session(Some(summary.id));
                                if let Some(selected) = store.session(summary.id) {
                                    print_transcript(&selected);
                                }
                            }
                            None => println!("{}", "No such session number".yellow()),
                        }
                        continue;
                    }
                    SpecialCommand::Pin => {
                        match store.active_session_id() {
                            Some(id) => {
                                store.toggle_pin(id);
                                let pinned = store
                                    .session(id)
                                    .map(|s| s.is_pinned)
                                    .unwrap_or_default();
                                println!("{}\n", if pinned { "Pinned" } else { "Unpinned" });
                            }
                            None => println!("{}", "No active chat to pin".yellow()),
                        }
                        continue;
                    }
                    SpecialCommand::Title(title) => {
                        match store.active_session_id() {
                            Some(id) => {
                                store.update_session_title(id, title);
                                println!("Renamed\n");
                            }
                            None => println!("{}", "No active chat to rename".yellow()),
                        }
                        continue;
                    }
                    SpecialCommand::Help => {
                        print_help();
                        continue;
                    }
                    SpecialCommand::Exit => break,
                    SpecialCommand::Unknown(input) => {
                        println!("{}", format!("Unknown command: {input} (try /help)").yellow());
                        continue;
                    }
                    SpecialCommand::None => {}
                }

                let session_id = ensure_active_session(&store);
                store.add_message(session_id, MessageRole::User, trimmed);
                store.set_error(None);
                store.set_loading(true);

                let history = store
                    .session(session_id)
                    .map(|s| s.messages)
                    .unwrap_or_default();
                let result = client
                    .send_message(&history, &credential, &model, &options)
                    .await;
                store.set_loading(false);

                match result {
                    Ok(reply) => {
                        store.add_message(session_id, MessageRole::Assistant, reply.as_str());
                        println!("\n{} {}\n", "assistant>".green().bold(), reply);
                        maybe_generate_title(&store, &client, session_id, &credential, &model)
                            .await;
                    }
                    Err(err) => {
                        println!("{}", format!("Error: {err}").red());
                        store.set_error(Some(err));
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                client.cancel_current_request();
                continue;
            }
            Err(ReadlineError::Eof) => break,
            Err(err) => {
                tracing::error!("Readline error: {}", err);
                break;
            }
        }
    }

    store.flush().await?;
    println!("Goodbye");
    Ok(())
}

/// Active session id, creating and activating a session when none is
fn ensure_active_session(store: &ChatStore) -> Uuid {
    if let Some(id) = store.active_session_id() {
        if store.session(id).is_some() {
            return id;
        }
    }
    let id = store.create_session();
    store.set_active_session(Some(id));
    id
}

/// Generate a title after the first exchange, falling back to a
/// truncated copy of the user's first message
///
/// The fallback lives here, at the integration boundary, not in the
/// request client.
async fn maybe_generate_title(
    store: &ChatStore,
    client: &ChatClient,
    session_id: Uuid,
    credential: &str,
    model: &str,
) {
    let Some(session) = store.session(session_id) else {
        return;
    };
    if session.has_generated_title() || session.messages.len() != 2 {
        return;
    }
    let user_text = session.messages[0].content.clone();
    let assistant_text = session.messages[1].content.clone();

    let title = client
        .generate_title(&user_text, &assistant_text, credential, model)
        .await
        .unwrap_or_else(|| prompt::fallback_title(&user_text));
    store.update_session_title(session_id, title);
}

fn print_welcome_banner(model: &str, session_count: usize) {
    println!("{}", "colloquy".bold());
    println!("Model: {}", model.cyan());
    println!("Saved sessions: {session_count}");
    println!("Type {} for commands, {} to leave\n", "/help".cyan(), "/exit".cyan());
}

fn print_transcript(session: &ChatSession) {
    println!("{}", format!("── {} ──", session.title).bold());
    for message in &session.messages {
        match message.role {
            MessageRole::User => println!("{} {}", "you>".blue().bold(), message.content),
            MessageRole::Assistant => {
                println!("{} {}", "assistant>".green().bold(), message.content)
            }
        }
    }
    println!();
}

fn print_session_listing(store: &ChatStore) {
    let summaries = store.session_summaries();
    if summaries.is_empty() {
        println!("No saved sessions\n");
        return;
    }
    let active = store.active_session_id();
    for (index, summary) in summaries.iter().enumerate() {
        let marker = if Some(summary.id) == active { "*" } else { " " };
        let pin = if summary.is_pinned { " [pinned]" } else { "" };
        println!(
            "{marker} {:>2}. {} ({} messages){pin}",
            index + 1,
            summary.title,
            summary.message_count
        );
    }
    println!();
}

fn print_help() {
    println!("Available commands:");
    println!("  /new            Start a new chat");
    println!("  /sessions       List saved chats");
    println!("  /switch <n>     Switch to chat number n");
    println!("  /pin            Pin or unpin the current chat");
    println!("  /title <text>   Rename the current chat");
    println!("  /help           Show this help");
    println!("  /exit           Leave chat mode\n");
}
