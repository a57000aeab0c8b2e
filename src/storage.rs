//! Persistent storage for sessions, credential, and settings
//!
//! Every value is persisted as a whole JSON document under a fixed
//! file name; saves overwrite the entire document for their key.
//! Loads fall back to empty/absent on missing or corrupt data so a
//! damaged file can never wedge startup.

use crate::config::Settings;
use crate::error::Result;
use crate::session::ChatSession;
use anyhow::Context;
use directories::ProjectDirs;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::path::{Path, PathBuf};

const SESSIONS_FILE: &str = "sessions.json";
const CREDENTIAL_FILE: &str = "credential.json";
const SETTINGS_FILE: &str = "settings.json";

/// Storage backend for the chat client
///
/// Owns the on-disk representation exclusively; no other component
/// reads or writes the persisted files directly.
#[derive(Debug, Clone)]
pub struct Storage {
    root: PathBuf,
}

impl Storage {
    /// Create a storage instance rooted in the user's data directory
    ///
    /// The `COLLOQUY_DATA_DIR` environment variable overrides the
    /// platform data directory, which makes it easy to point the binary
    /// at a scratch directory without touching the user's history.
    pub fn new() -> Result<Self> {
        if let Ok(override_dir) = std::env::var("COLLOQUY_DATA_DIR") {
            return Self::with_root(override_dir);
        }

        let proj_dirs = ProjectDirs::from("com", "xbcsmith", "colloquy")
            .context("Could not determine data directory")?;
        Self::with_root(proj_dirs.data_dir())
    }

    /// Create a storage instance rooted at the given directory
    ///
    /// This is primarily useful for tests where the default application
    /// data directory is not desirable (for example, a temporary
    /// directory).
    ///
    /// # Examples
    ///
    /// ```
    /// use colloquy::storage::Storage;
    ///
    /// let storage = Storage::with_root("/tmp/colloquy-test").unwrap();
    /// ```
    pub fn with_root(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory {}", root.display()))?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn path(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    async fn read_document<T: DeserializeOwned>(&self, name: &str) -> Option<T> {
        let path = self.path(name);
        let contents = match tokio::fs::read_to_string(&path).await {
            Ok(contents) => contents,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return None,
            Err(err) => {
                tracing::warn!("Failed to read {}: {}", path.display(), err);
                return None;
            }
        };
        match serde_json::from_str(&contents) {
            Ok(value) => Some(value),
            Err(err) => {
                tracing::warn!("Ignoring corrupt document {}: {}", path.display(), err);
                None
            }
        }
    }

    async fn write_document<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let path = self.path(name);
        let contents = serde_json::to_vec(value).context("Failed to serialize document")?;
        tokio::fs::write(&path, contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(())
    }

    async fn remove_document(&self, name: &str) -> Result<()> {
        let path = self.path(name);
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => {
                Err(err).with_context(|| format!("Failed to remove {}", path.display()))
            }
        }
    }

    /// Load all sessions, empty on missing or corrupt data
    pub async fn load_sessions(&self) -> Vec<ChatSession> {
        self.read_document(SESSIONS_FILE).await.unwrap_or_default()
    }

    /// Overwrite the persisted session list
    pub async fn save_sessions(&self, sessions: &[ChatSession]) -> Result<()> {
        self.write_document(SESSIONS_FILE, &sessions).await
    }

    /// Load the stored credential, if any
    pub async fn load_credential(&self) -> Option<String> {
        self.read_document(CREDENTIAL_FILE).await
    }

    /// Overwrite the persisted credential
    pub async fn save_credential(&self, credential: &str) -> Result<()> {
        self.write_document(CREDENTIAL_FILE, &credential).await
    }

    /// Delete the persisted credential; succeeds when none exists
    pub async fn remove_credential(&self) -> Result<()> {
        self.remove_document(CREDENTIAL_FILE).await
    }

    /// Load persisted settings, `None` when absent or corrupt
    pub async fn load_settings(&self) -> Option<Settings> {
        self.read_document(SETTINGS_FILE).await
    }

    /// Overwrite the persisted settings
    pub async fn save_settings(&self, settings: &Settings) -> Result<()> {
        self.write_document(SETTINGS_FILE, settings).await
    }

    /// Drop the persisted session list
    pub async fn clear_sessions(&self) -> Result<()> {
        self.remove_document(SESSIONS_FILE).await
    }

    /// Drop sessions, credential, and settings together
    pub async fn clear_all(&self) -> Result<()> {
        self.remove_document(SESSIONS_FILE).await?;
        self.remove_document(CREDENTIAL_FILE).await?;
        self.remove_document(SETTINGS_FILE).await?;
        Ok(())
    }
}
