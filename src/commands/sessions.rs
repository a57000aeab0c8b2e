//! Session management commands
//!
//! Listing groups sessions the way the chat drawer does: pinned first,
//! then by recency buckets derived from `updated_at`.

use crate::error::Result;
use crate::session::{group_summaries, SessionSummary};
use crate::storage::Storage;
use crate::store::ChatStore;
use anyhow::bail;
use chrono::Utc;
use colored::Colorize;
use prettytable::{cell, row, Table};
use uuid::Uuid;

/// List saved sessions, grouped by recency
///
/// # Arguments
///
/// * `json` - Emit raw summaries as JSON instead of tables
pub async fn list_sessions(json: bool) -> Result<()> {
    let store = ChatStore::new(Storage::new()?);
    store.initialize().await;
    let summaries = store.session_summaries();

    if json {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    if summaries.is_empty() {
        println!("No saved sessions");
        return Ok(());
    }

    for (group, members) in group_summaries(&summaries, Utc::now()) {
        println!("{}", group.to_string().bold());
        let mut table = Table::new();
        table.add_row(row!["Id", "Title", "Messages", "Updated"]);
        for summary in &members {
            table.add_row(row![
                short_id(summary.id),
                summary.title,
                summary.message_count,
                summary.updated_at.format("%Y-%m-%d %H:%M")
            ]);
        }
        table.printstd();
        println!();
    }
    Ok(())
}

/// Delete one session by id or unambiguous id prefix
pub async fn delete_session(id: &str) -> Result<()> {
    let store = ChatStore::new(Storage::new()?);
    store.initialize().await;

    let target = resolve_session_id(&store.session_summaries(), id)?;
    store.delete_session(target);
    store.flush().await?;

    println!("Deleted session {}", short_id(target));
    Ok(())
}

/// Drop every saved session
///
/// Refuses to act without `--yes`; there is no undo.
pub async fn clear_sessions(yes: bool) -> Result<()> {
    if !yes {
        println!("This deletes all saved chats. Re-run with --yes to confirm.");
        return Ok(());
    }

    let storage = Storage::new()?;
    let count = storage.load_sessions().await.len();
    storage.clear_sessions().await?;

    println!("Deleted {count} sessions");
    Ok(())
}

/// First eight hex digits of a session id, enough to address it
fn short_id(id: Uuid) -> String {
    id.to_string().chars().take(8).collect()
}

/// Match user input against session ids, accepting any unique prefix
fn resolve_session_id(summaries: &[SessionSummary], input: &str) -> Result<Uuid> {
    if let Ok(id) = Uuid::parse_str(input) {
        if summaries.iter().any(|s| s.id == id) {
            return Ok(id);
        }
        bail!("No session with id {input}");
    }

    let needle = input.to_lowercase();
    let matches: Vec<&SessionSummary> = summaries
        .iter()
        .filter(|s| s.id.to_string().starts_with(&needle))
        .collect();
    match matches.as_slice() {
        [only] => Ok(only.id),
        [] => bail!("No session with id {input}"),
        _ => bail!("Session id prefix {input} is ambiguous"),
    }
}
