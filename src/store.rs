//! In-memory session registry with background persistence
//!
//! `ChatStore` is the single authoritative owner of all chat sessions,
//! the active-session pointer, the credential, and the generation
//! settings. Mutations are synchronous; durability is delegated to
//! [`Storage`] as an unawaited background task whose failure is logged,
//! never surfaced. A crash between a mutation and its save can lose the
//! most recent change; each save is a full snapshot, so the last write
//! to land wins.

use crate::config::{Settings, SettingsPatch};
use crate::error::AppError;
use crate::session::{ChatSession, Message, MessageRole, SessionSummary};
use crate::storage::Storage;
use parking_lot::RwLock;
use std::sync::Arc;
use uuid::Uuid;

/// Process-wide chat state
///
/// Construct one at startup and hand clones to whatever composes the
/// presentation layer; clones share the same underlying state.
#[derive(Clone)]
pub struct ChatStore {
    inner: Arc<RwLock<InnerState>>,
    storage: Arc<Storage>,
}

#[derive(Default)]
struct InnerState {
    sessions: Vec<ChatSession>,
    active_session: Option<Uuid>,
    is_loading: bool,
    last_error: Option<AppError>,
    credential: Option<String>,
    settings: Settings,
}

impl ChatStore {
    pub fn new(storage: Storage) -> Self {
        Self {
            inner: Arc::new(RwLock::new(InnerState::default())),
            storage: Arc::new(storage),
        }
    }

    /// Load sessions, credential, and settings from storage, replacing
    /// in-memory state wholesale
    ///
    /// Missing or corrupt data falls back to empty/absent/defaults.
    /// Operations invoked before this completes simply act on default
    /// state; that is allowed, not an error.
    pub async fn initialize(&self) {
        let sessions = self.storage.load_sessions().await;
        let credential = self.storage.load_credential().await;
        let settings = self.storage.load_settings().await.unwrap_or_default();

        tracing::info!("Loaded {} sessions from storage", sessions.len());

        let mut inner = self.inner.write();
        inner.sessions = sessions;
        inner.credential = credential;
        inner.settings = settings;
    }

    /// Create a session with the sentinel title and insert it at the
    /// front of the list (most-recent-first)
    ///
    /// The active pointer is not changed; the caller decides whether to
    /// switch to the new session.
    pub fn create_session(&self) -> Uuid {
        let session = ChatSession::new();
        let id = session.id;
        {
            let mut inner = self.inner.write();
            inner.sessions.insert(0, session);
        }
        self.persist_sessions();
        id
    }

    /// Append a message to the named session
    ///
    /// Unknown session ids are ignored without error, matching the
    /// defensive contract the UI layer relies on.
    pub fn add_message(&self, session_id: Uuid, role: MessageRole, content: impl Into<String>) {
        let mutated = {
            let mut inner = self.inner.write();
            match inner.sessions.iter_mut().find(|s| s.id == session_id) {
                Some(session) => {
                    session.push_message(Message::new(role, content));
                    true
                }
                None => false,
            }
        };
        if mutated {
            self.persist_sessions();
        } else {
            tracing::debug!("add_message ignored unknown session {}", session_id);
        }
    }

    /// Overwrite a session's title; unknown id is a silent no-op
    pub fn update_session_title(&self, session_id: Uuid, title: impl Into<String>) {
        let mutated = {
            let mut inner = self.inner.write();
            match inner.sessions.iter_mut().find(|s| s.id == session_id) {
                Some(session) => {
                    session.set_title(title);
                    true
                }
                None => false,
            }
        };
        if mutated {
            self.persist_sessions();
        } else {
            tracing::debug!("update_session_title ignored unknown session {}", session_id);
        }
    }

    /// Remove a session; clears the active pointer if it pointed there
    ///
    /// Deleting an id that is already gone is a no-op.
    pub fn delete_session(&self, session_id: Uuid) {
        let mutated = {
            let mut inner = self.inner.write();
            let before = inner.sessions.len();
            inner.sessions.retain(|s| s.id != session_id);
            if inner.active_session == Some(session_id) {
                inner.active_session = None;
            }
            inner.sessions.len() != before
        };
        if mutated {
            self.persist_sessions();
        }
    }

    /// Flip a session's pin flag; unknown id is a silent no-op
    pub fn toggle_pin(&self, session_id: Uuid) {
        let mutated = {
            let mut inner = self.inner.write();
            match inner.sessions.iter_mut().find(|s| s.id == session_id) {
                Some(session) => {
                    session.toggle_pin();
                    true
                }
                None => false,
            }
        };
        if mutated {
            self.persist_sessions();
        } else {
            tracing::debug!("toggle_pin ignored unknown session {}", session_id);
        }
    }

    /// Point at a session (or nothing); in-memory only, the pointer is
    /// not durable
    pub fn set_active_session(&self, session_id: Option<Uuid>) {
        self.inner.write().active_session = session_id;
    }

    pub fn active_session_id(&self) -> Option<Uuid> {
        self.inner.read().active_session
    }

    /// Clone of the session the active pointer names, if any
    pub fn current_session(&self) -> Option<ChatSession> {
        let inner = self.inner.read();
        let id = inner.active_session?;
        inner.sessions.iter().find(|s| s.id == id).cloned()
    }

    /// Empty the session list and drop the persisted blob
    pub fn clear_all_sessions(&self) {
        {
            let mut inner = self.inner.write();
            inner.sessions.clear();
            inner.active_session = None;
        }
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            if let Err(err) = storage.clear_sessions().await {
                tracing::error!("Failed to clear persisted sessions: {}", err);
            }
        });
    }

    pub fn set_loading(&self, loading: bool) {
        self.inner.write().is_loading = loading;
    }

    pub fn is_loading(&self) -> bool {
        self.inner.read().is_loading
    }

    pub fn set_error(&self, error: Option<AppError>) {
        self.inner.write().last_error = error;
    }

    pub fn last_error(&self) -> Option<AppError> {
        self.inner.read().last_error.clone()
    }

    /// Replace the credential
    ///
    /// A new credential is persisted; clearing only forgets the
    /// in-memory copy. Purging the stored credential is a distinct
    /// [`Storage::remove_credential`] call made by the auth command.
    pub fn set_credential(&self, credential: Option<String>) {
        if let Some(credential) = credential.clone() {
            let storage = Arc::clone(&self.storage);
            tokio::spawn(async move {
                if let Err(err) = storage.save_credential(&credential).await {
                    tracing::error!("Failed to persist credential: {}", err);
                }
            });
        }
        self.inner.write().credential = credential;
    }

    pub fn credential(&self) -> Option<String> {
        self.inner.read().credential.clone()
    }

    /// Merge a partial settings update and persist the merged result
    pub fn update_settings(&self, patch: SettingsPatch) {
        let merged = {
            let mut inner = self.inner.write();
            inner.settings.apply(patch);
            inner.settings.clone()
        };
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            if let Err(err) = storage.save_settings(&merged).await {
                tracing::error!("Failed to persist settings: {}", err);
            }
        });
    }

    pub fn settings(&self) -> Settings {
        self.inner.read().settings.clone()
    }

    /// Cloned snapshot of all sessions in list order
    pub fn sessions(&self) -> Vec<ChatSession> {
        self.inner.read().sessions.clone()
    }

    pub fn session(&self, session_id: Uuid) -> Option<ChatSession> {
        self.inner
            .read()
            .sessions
            .iter()
            .find(|s| s.id == session_id)
            .cloned()
    }

    pub fn session_summaries(&self) -> Vec<SessionSummary> {
        self.inner.read().sessions.iter().map(|s| s.summary()).collect()
    }

    /// Save sessions and settings now, awaiting the writes
    ///
    /// Mutations persist in the background and a short-lived process
    /// can exit before those tasks land; one-shot commands call this
    /// before returning.
    pub async fn flush(&self) -> crate::error::Result<()> {
        let (sessions, settings) = {
            let inner = self.inner.read();
            (inner.sessions.clone(), inner.settings.clone())
        };
        self.storage.save_sessions(&sessions).await?;
        self.storage.save_settings(&settings).await?;
        Ok(())
    }

    /// Snapshot the session list and save it in the background
    ///
    /// Writes may complete out of dispatch order; each carries the full
    /// list, so the last snapshot to land wins.
    fn persist_sessions(&self) {
        let snapshot = self.inner.read().sessions.clone();
        let storage = Arc::clone(&self.storage);
        tokio::spawn(async move {
            if let Err(err) = storage.save_sessions(&snapshot).await {
                tracing::error!("Failed to persist sessions: {}", err);
            }
        });
    }
}
