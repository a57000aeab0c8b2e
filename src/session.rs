//! Chat session data model
//!
//! Sessions own an append-only message list; all timestamps are UTC.
//! Listing helpers (summaries, date grouping) live here so the store
//! and the CLI share one definition.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Placeholder title a session carries until a real one is generated
pub const SENTINEL_TITLE: &str = "New Chat";

/// Who produced a message
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::Assistant => write!(f, "assistant"),
        }
    }
}

/// One turn in a conversation
///
/// Immutable after creation: the store only ever appends messages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: Uuid,
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl Message {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// One conversation thread
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatSession {
    pub id: Uuid,
    pub title: String,
    pub messages: Vec<Message>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(default)]
    pub is_pinned: bool,
}

impl ChatSession {
    /// Create an empty session with the sentinel title
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            title: SENTINEL_TITLE.to_string(),
            messages: Vec::new(),
            created_at: now,
            updated_at: now,
            is_pinned: false,
        }
    }

    /// Append a message and bump `updated_at`
    pub fn push_message(&mut self, message: Message) {
        self.messages.push(message);
        self.updated_at = Utc::now();
    }

    /// Overwrite the title and bump `updated_at`
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.title = title.into();
        self.updated_at = Utc::now();
    }

    /// Flip the pin flag and bump `updated_at`
    pub fn toggle_pin(&mut self) {
        self.is_pinned = !self.is_pinned;
        self.updated_at = Utc::now();
    }

    /// Whether a real title has replaced the sentinel yet
    pub fn has_generated_title(&self) -> bool {
        self.title != SENTINEL_TITLE
    }

    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            id: self.id,
            title: self.title.clone(),
            updated_at: self.updated_at,
            message_count: self.messages.len(),
            is_pinned: self.is_pinned,
        }
    }
}

impl Default for ChatSession {
    fn default() -> Self {
        Self::new()
    }
}

/// Lightweight view of a session for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionSummary {
    pub id: Uuid,
    pub title: String,
    pub updated_at: DateTime<Utc>,
    pub message_count: usize,
    pub is_pinned: bool,
}

/// Bucket a session listing sorts into
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum DateGroup {
    Pinned,
    Today,
    Yesterday,
    LastWeek,
    Older,
}

impl fmt::Display for DateGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pinned => write!(f, "Pinned"),
            Self::Today => write!(f, "Today"),
            Self::Yesterday => write!(f, "Yesterday"),
            Self::LastWeek => write!(f, "Last 7 Days"),
            Self::Older => write!(f, "Older"),
        }
    }
}

/// Classify a summary relative to `now`
///
/// Pinned sessions always land in [`DateGroup::Pinned`] regardless of age.
pub fn date_group(summary: &SessionSummary, now: DateTime<Utc>) -> DateGroup {
    if summary.is_pinned {
        return DateGroup::Pinned;
    }
    let date = summary.updated_at.date_naive();
    let today = now.date_naive();
    if date == today {
        DateGroup::Today
    } else if today.pred_opt() == Some(date) {
        DateGroup::Yesterday
    } else if summary.updated_at > now - Duration::days(7) {
        DateGroup::LastWeek
    } else {
        DateGroup::Older
    }
}

/// Group summaries for display, keeping each group's internal order
///
/// Empty groups are omitted; groups come back in display order
/// (Pinned, Today, Yesterday, Last 7 Days, Older).
pub fn group_summaries(
    summaries: &[SessionSummary],
    now: DateTime<Utc>,
) -> Vec<(DateGroup, Vec<SessionSummary>)> {
    let mut groups: Vec<(DateGroup, Vec<SessionSummary>)> = vec![
        (DateGroup::Pinned, Vec::new()),
        (DateGroup::Today, Vec::new()),
        (DateGroup::Yesterday, Vec::new()),
        (DateGroup::LastWeek, Vec::new()),
        (DateGroup::Older, Vec::new()),
    ];
    for summary in summaries {
        let group = date_group(summary, now);
        if let Some((_, members)) = groups.iter_mut().find(|(g, _)| *g == group) {
            members.push(summary.clone());
        }
    }
    groups.retain(|(_, members)| !members.is_empty());
    groups
}
