//! Prompt construction and title helpers
//!
//! The hosted endpoint takes a single text blob, so conversation
//! history is flattened into `Human:` / `Assistant:` blocks with a
//! trailing `Assistant:` cue. The serialization is deterministic and
//! order-preserving; tests depend on the exact byte layout.

use crate::session::{Message, MessageRole};

/// Maximum length of a generated title
pub const TITLE_MAX_LEN: usize = 50;

/// Maximum length of a fallback title derived from the first message
pub const FALLBACK_TITLE_MAX_LEN: usize = 30;

/// Serialize a message history into the inference prompt
///
/// Each user message becomes `Human: <content>`, each assistant message
/// `Assistant: <content>`, every block followed by a blank line, and a
/// trailing `Assistant:` cues the model to continue.
pub fn format_messages(messages: &[Message]) -> String {
    let mut formatted = String::new();
    for message in messages {
        match message.role {
            MessageRole::User => {
                formatted.push_str("Human: ");
            }
            MessageRole::Assistant => {
                formatted.push_str("Assistant: ");
            }
        }
        formatted.push_str(&message.content);
        formatted.push_str("\n\n");
    }
    formatted.push_str("Assistant:");
    formatted
}

/// Build the instruction prompt for title generation
pub fn title_prompt(user_text: &str, assistant_text: &str) -> String {
    format!(
        "Generate a short title (3-5 words) for a conversation that starts with this exchange. Only output the title, nothing else.\n\n\
         User: {user_text}\n\
         Assistant: {assistant_text}\n\n\
         Title:"
    )
}

/// Clean up a model-generated title
///
/// Strips surrounding quote characters, trims, and caps the length at
/// [`TITLE_MAX_LEN`]. Returns `None` when nothing usable remains.
pub fn clean_title(raw: &str) -> Option<String> {
    let mut title = raw.trim().trim_matches(|c| c == '"' || c == '\'').trim();
    let truncated;
    if title.chars().count() > TITLE_MAX_LEN {
        truncated = title.chars().take(TITLE_MAX_LEN).collect::<String>();
        title = truncated.trim_end();
    }
    if title.is_empty() {
        None
    } else {
        Some(title.to_string())
    }
}

/// Derive a title from the user's first message when generation failed
pub fn fallback_title(message: &str) -> String {
    if message.chars().count() <= FALLBACK_TITLE_MAX_LEN {
        return message.to_string();
    }
    let truncated: String = message.chars().take(FALLBACK_TITLE_MAX_LEN).collect();
    format!("{}...", truncated.trim_end())
}
