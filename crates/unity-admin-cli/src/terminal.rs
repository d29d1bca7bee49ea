//! Terminal implementations of the pipeline's UI collaborators.

use std::io::{self, BufRead, IsTerminal, Write};

use parking_lot::Mutex;
use tracing::debug;
use unity_admin_core::{Navigator, Notifier, Route};

/// Prints pipeline notices to stderr.
pub struct TerminalNotifier;

impl Notifier for TerminalNotifier {
    fn error(&self, message: &str) {
        eprintln!("error: {}", message);
    }

    fn alert(&self, message: &str) {
        eprintln!("\n!! {}", message);
        // Block until acknowledged when someone is at the keyboard. This parks
        // the runtime worker running the request; each invocation runs a single
        // command, so nothing else is waiting on it.
        if io::stdin().is_terminal() {
            eprint!("Press Enter to continue...");
            let _ = io::stderr().flush();
            let mut line = String::new();
            let _ = io::stdin().lock().read_line(&mut line);
        }
    }
}

/// Tracks the console's current route for the lifetime of one command.
pub struct TerminalNavigator {
    current: Mutex<Route>,
}

impl TerminalNavigator {
    pub fn new(start: Route) -> Self {
        Self {
            current: Mutex::new(start),
        }
    }
}

impl Navigator for TerminalNavigator {
    fn current_route(&self) -> Route {
        self.current.lock().clone()
    }

    fn navigate(&self, route: Route) {
        debug!(route = %route, "Navigating");
        if route == Route::Login {
            eprintln!("Run `unity-admin login` to sign in again.");
        }
        *self.current.lock() = route;
    }
}
