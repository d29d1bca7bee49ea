//! Authentication module for holding and persisting the session credential.
//!
//! This module provides:
//! - `SessionStore`: the single source of truth for the bearer credential
//! - `TokenStorage`: durable backends (JSON file, OS keychain, in-memory)
//! - `SessionStore::login`: the credential exchange against the login endpoint
//!
//! The credential is written through to durable storage on every mutation
//! so it survives restarts of the console.

pub mod login;
pub mod session;
pub mod storage;

pub use login::LoginError;
pub use session::SessionStore;
pub use storage::{FileTokenStorage, KeyringTokenStorage, MemoryTokenStorage, TokenStorage};
