//! services/console/src/adapters/session.rs
//!
//! The in-process owner of the current session. Implements the
//! `SessionProvider` port from the `core` crate.

use ledgerdesk_core::domain::Session;
use ledgerdesk_core::ports::{SessionListener, SessionProvider};
use parking_lot::{Mutex, RwLock};
use std::sync::Arc;
use tracing::info;

#[derive(Default)]
pub struct SessionStore {
    current: RwLock<Option<Session>>,
    listeners: Mutex<Vec<Arc<dyn Fn() + Send + Sync>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionProvider for SessionStore {
    fn current(&self) -> Option<Session> {
        self.current.read().clone()
    }

    fn establish(&self, session: Session) {
        info!("Session established for {} ({})", session.email(), session.role());
        *self.current.write() = Some(session);
    }

    fn take(&self) -> Option<Session> {
        // Neither lock is held while listeners run, so they may call back in.
        let taken = self.current.write().take();
        if let Some(session) = &taken {
            info!("Session cleared for {}", session.email());
            let listeners = self.listeners.lock().clone();
            for listener in listeners {
                listener();
            }
        }
        taken
    }

    fn on_session_cleared(&self, listener: SessionListener) {
        self.listeners.lock().push(Arc::from(listener));
    }
}
