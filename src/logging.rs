//! Diagnostic logging handed to volume sources at construction.
//!
//! The library never installs a global subscriber. A [`Logger`] carries the
//! `tracing` dispatcher that events should reach, so embedding programs (and
//! tests) decide where diagnostics go.

use std::fmt;

use tracing::Dispatch;
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter used by the binary.
pub const LOG_FILTER_ENV: &str = "GCE_STORAGE_LOG";

/// Handle to the dispatcher that receives a component's events.
#[derive(Clone)]
pub struct Logger {
    dispatch: Dispatch,
}

impl Logger {
    /// Creates a logger that emits to `dispatch`.
    #[must_use]
    pub const fn new(dispatch: Dispatch) -> Self {
        Self { dispatch }
    }

    /// Captures the dispatcher active for the calling thread.
    #[must_use]
    pub fn current() -> Self {
        Self::new(tracing::dispatcher::get_default(Clone::clone))
    }

    /// Creates a logger that discards everything.
    #[must_use]
    pub fn disabled() -> Self {
        Self::new(Dispatch::none())
    }

    /// Runs `emit` with this logger's dispatcher as the default, so `tracing`
    /// macros inside the closure reach it.
    pub fn in_scope<T>(&self, emit: impl FnOnce() -> T) -> T {
        tracing::dispatcher::with_default(&self.dispatch, emit)
    }
}

impl Default for Logger {
    fn default() -> Self {
        Self::current()
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

/// Builds the stderr subscriber used by the command-line front end.
///
/// The filter is read from [`LOG_FILTER_ENV`] and defaults to `info`.
#[must_use]
pub fn stderr_dispatch() -> Dispatch {
    let filter =
        EnvFilter::try_from_env(LOG_FILTER_ENV).unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .finish();
    Dispatch::new(subscriber)
}
