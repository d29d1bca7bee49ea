use std::fmt;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::RwLock;
use tracing::{debug, warn};

use super::TokenStorage;

struct SessionInner {
    credential: RwLock<Option<String>>,
    storage: Box<dyn TokenStorage>,
}

/// Single source of truth for the current bearer credential.
///
/// Cloning is cheap and every clone observes the same credential. The
/// in-memory value and the durable copy are updated together on every
/// mutation, so a store reopened over the same storage sees the last
/// value written.
#[derive(Clone)]
pub struct SessionStore {
    inner: Arc<SessionInner>,
}

impl SessionStore {
    /// Open a store, initializing the in-memory credential from `storage`.
    ///
    /// An unreadable durable copy is treated as "no credential"; the user
    /// is sent to the login screen rather than failing startup.
    pub fn open(storage: impl TokenStorage + 'static) -> Self {
        let credential = match storage.load() {
            Ok(value) => value.filter(|v| !v.is_empty()),
            Err(e) => {
                warn!(error = %e, "Failed to load stored credential, starting signed out");
                None
            }
        };
        debug!(has_credential = credential.is_some(), "Session store opened");

        Self {
            inner: Arc::new(SessionInner {
                credential: RwLock::new(credential),
                storage: Box::new(storage),
            }),
        }
    }

    /// Store `value` durably, then in memory.
    ///
    /// If the durable write fails the in-memory value is left untouched.
    pub fn set_credential(&self, value: &str) -> Result<()> {
        let mut credential = self.inner.credential.write();
        self.inner.storage.save(value)?;
        *credential = Some(value.to_string());
        debug!("Credential stored");
        Ok(())
    }

    /// Drop the credential from memory and from durable storage.
    ///
    /// Idempotent. The in-memory value is always cleared, even when removing
    /// the durable copy fails.
    pub fn clear_credential(&self) -> Result<()> {
        let mut credential = self.inner.credential.write();
        let had_credential = credential.take().is_some();
        self.inner.storage.remove()?;
        if had_credential {
            debug!("Credential cleared");
        }
        Ok(())
    }

    /// The current credential, or `None` when signed out.
    pub fn current_credential(&self) -> Option<String> {
        self.inner
            .credential
            .read()
            .as_ref()
            .filter(|v| !v.is_empty())
            .cloned()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current_credential().is_some()
    }
}

impl fmt::Debug for SessionStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionStore")
            .field("authenticated", &self.is_authenticated())
            .finish()
    }
}
