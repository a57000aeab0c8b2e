//! Colloquy - Terminal chat client library
//!
//! This library provides the core functionality for the Colloquy chat
//! client: the session store, persistent storage, and the request
//! client for the hosted text-generation endpoint.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `store`: In-memory session registry with background persistence
//! - `storage`: Whole-document JSON persistence for sessions, credential, and settings
//! - `client`: HTTP client with single-flight cancellation and error classification
//! - `session`: Chat session and message data model
//! - `prompt`: Prompt serialization and title helpers
//! - `config`: Generation settings and API constants
//! - `error`: Error taxonomy and result alias
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use colloquy::client::ChatClient;
//! use colloquy::storage::Storage;
//! use colloquy::store::ChatStore;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let store = ChatStore::new(Storage::new()?);
//!     store.initialize().await;
//!     let _client = ChatClient::new()?;
//!
//!     // Chat loop would go here
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod commands;
pub mod config;
pub mod error;
pub mod prompt;
pub mod session;
pub mod storage;
pub mod store;

// Re-export commonly used types
pub use client::ChatClient;
pub use config::{GenerationOptions, Settings, SettingsPatch};
pub use error::{AppError, Result};
pub use session::{ChatSession, Message, MessageRole, SessionSummary};
pub use storage::Storage;
pub use store::ChatStore;
