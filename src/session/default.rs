//! Per-thread default session
//!
//! Convenience access to a [`Session`] that is created on first use from
//! the loaded configuration, for callers that only ever drive one shell.

use std::cell::RefCell;

use super::{ScopeOptions, Session};
use crate::config::SessionConfig;
use crate::error::{Error, Result};
use crate::models::{ExecOptions, ExecOutput};

thread_local! {
    static DEFAULT_SESSION: RefCell<Option<Session>> = const { RefCell::new(None) };
}

/// Run `f` against this thread's default session, creating it if needed.
///
/// The session is borrowed for the duration of `f`; reaching for the
/// default session again from inside `f` fails with
/// [`Error::ReentrantScope`]. Use the `&mut Session` passed in instead.
pub fn with_default_session<T, F>(f: F) -> Result<T>
where
    F: FnOnce(&mut Session) -> Result<T>,
{
    DEFAULT_SESSION.with(|cell| {
        let mut slot = cell.try_borrow_mut().map_err(|_| Error::ReentrantScope)?;
        let session = slot.get_or_insert_with(|| {
            debug!("Creating default session");
            Session::with_config(SessionConfig::load_or_default())
        });
        f(session)
    })
}

/// [`Session::execute`] on the default session
pub fn execute(command: &str, options: ExecOptions) -> Result<ExecOutput> {
    with_default_session(|session| session.execute(command, options))
}

/// [`Session::scope`] on the default session
pub fn in_default_scope<T, F>(options: ScopeOptions, f: F) -> Result<T>
where
    F: FnOnce(&mut Session) -> Result<T>,
{
    with_default_session(|session| session.scope(options, f))
}

/// Stop and discard this thread's default session, if one exists
pub fn reset_default_session() -> Result<()> {
    let session = DEFAULT_SESSION.with(|cell| {
        cell.try_borrow_mut()
            .map(|mut slot| slot.take())
            .map_err(|_| Error::ReentrantScope)
    })?;

    if let Some(mut session) = session {
        if session.is_running() {
            session.stop()?;
        }
    }
    Ok(())
}
