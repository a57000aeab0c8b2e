/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `chat`     — Interactive chat session
- `sessions` — List, delete, and clear saved sessions
- `auth`     — Store, remove, and inspect the API credential
- `settings` — Show and change generation settings

These handlers are intentionally small and use the library components:
the session store, the storage backend, and the request client.
*/

pub mod auth;
pub mod chat;
pub mod sessions;
pub mod settings;
