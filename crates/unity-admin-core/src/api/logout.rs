//! One-shot forced logout.
//!
//! Any number of requests may observe an authentication failure at the same
//! time. Every one of them clears the stored credential, which is idempotent.
//! Exactly one of them runs the visible part of the logout (prompt the user,
//! navigate to the login screen); the rest only fail their own call.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::auth::SessionStore;
use crate::navigation::Route;

/// Prompt shown once when the session is found to be expired
pub const SESSION_EXPIRED_PROMPT: &str = "Your session has expired, please log in again";

/// User-facing notices raised by the pipeline.
pub trait Notifier: Send + Sync {
    /// Transient, dismissible error notice.
    fn error(&self, message: &str);

    /// Blocking prompt; returns once the user has acknowledged it.
    fn alert(&self, message: &str);
}

/// Access to the console's current location.
pub trait Navigator: Send + Sync {
    fn current_route(&self) -> Route;

    fn navigate(&self, route: Route);
}

/// Notifier that only logs. Used when no UI is attached.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogNotifier;

impl Notifier for LogNotifier {
    fn error(&self, message: &str) {
        warn!(notice = message, "API error");
    }

    fn alert(&self, message: &str) {
        warn!(notice = message, "Session alert");
    }
}

pub struct LogoutSequence {
    /// Set at the start of the first forced logout, never reset.
    pending: AtomicBool,
    session: SessionStore,
    notifier: Arc<dyn Notifier>,
    navigator: Option<Arc<dyn Navigator>>,
}

impl LogoutSequence {
    pub fn new(
        session: SessionStore,
        notifier: Arc<dyn Notifier>,
        navigator: Option<Arc<dyn Navigator>>,
    ) -> Self {
        Self {
            pending: AtomicBool::new(false),
            session,
            notifier,
            navigator,
        }
    }

    /// Clear the credential, then prompt and navigate if no other caller
    /// has done so.
    ///
    /// Returns `true` for the single caller that prompted.
    pub fn trigger(&self) -> bool {
        if let Err(e) = self.session.clear_credential() {
            warn!(error = %e, "Failed to remove stored credential during logout");
        }

        if self
            .pending
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("Logout already in progress, suppressing");
            return false;
        }

        info!("Credential rejected, logging out");

        match &self.navigator {
            Some(navigator) if navigator.current_route() == Route::Login => {
                debug!("Already on the login screen");
            }
            Some(navigator) => {
                self.notifier.alert(SESSION_EXPIRED_PROMPT);
                navigator.navigate(Route::Login);
            }
            None => self.notifier.alert(SESSION_EXPIRED_PROMPT),
        }
        true
    }

    pub fn is_pending(&self) -> bool {
        self.pending.load(Ordering::Acquire)
    }
}


#[cfg(test)]
mod tests {
    use super::testing::{RecordingNavigator, RecordingNotifier};
    use super::*;
    use crate::auth::MemoryTokenStorage;

    fn signed_in_session() -> SessionStore {
        let session = SessionStore::open(MemoryTokenStorage::new());
        session.set_credential("t1").unwrap();
        session
    }

    #[test]
    fn test_first_trigger_runs_side_effects() {
        let session = signed_in_session();
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::at(Route::Platforms));
        let logout = LogoutSequence::new(session.clone(), notifier.clone(), Some(navigator.clone()));

        assert!(logout.trigger());
        assert!(logout.is_pending());
        assert!(!session.is_authenticated());
        assert_eq!(notifier.alerts.lock().as_slice(), [SESSION_EXPIRED_PROMPT]);
        assert_eq!(navigator.visits.lock().as_slice(), [Route::Login]);
    }

    #[test]
    fn test_later_triggers_are_suppressed() {
        let session = signed_in_session();
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::at(Route::Assessments));
        let logout = LogoutSequence::new(session, notifier.clone(), Some(navigator.clone()));

        assert!(logout.trigger());
        *navigator.current.lock() = Route::Users;
        assert!(!logout.trigger());
        assert!(!logout.trigger());

        assert_eq!(notifier.alerts.lock().len(), 1);
        assert_eq!(navigator.visits.lock().len(), 1);
    }

    #[test]
    fn test_later_triggers_still_clear_credential() {
        let session = signed_in_session();
        let notifier = Arc::new(RecordingNotifier::default());
        let logout = LogoutSequence::new(session.clone(), notifier.clone(), None);

        assert!(logout.trigger());
        session.set_credential("t2").unwrap();
        assert!(!logout.trigger());

        assert_eq!(session.current_credential(), None);
        assert_eq!(notifier.alerts.lock().len(), 1);
    }

    #[test]
    fn test_no_prompt_when_already_on_login() {
        let session = signed_in_session();
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::at(Route::Login));
        let logout = LogoutSequence::new(session.clone(), notifier.clone(), Some(navigator.clone()));

        assert!(logout.trigger());
        assert!(!session.is_authenticated());
        assert!(notifier.alerts.lock().is_empty());
        assert!(navigator.visits.lock().is_empty());
    }

    #[test]
    fn test_concurrent_triggers_run_once() {
        let session = signed_in_session();
        let notifier = Arc::new(RecordingNotifier::default());
        let navigator = Arc::new(RecordingNavigator::at(Route::Sessions));
        let logout = Arc::new(LogoutSequence::new(
            session,
            notifier.clone(),
            Some(navigator.clone()),
        ));

        let handles: Vec<_> = (0..8)
            .map(|_| {
                let logout = Arc::clone(&logout);
                std::thread::spawn(move || logout.trigger())
            })
            .collect();
        let winners = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|won| *won)
            .count();

        assert_eq!(winners, 1);
        assert_eq!(notifier.alerts.lock().len(), 1);
        assert_eq!(navigator.visits.lock().len(), 1);
    }
}
