//! crates/ledgerdesk_core/src/ports.rs
//!
//! Defines the service contracts (traits) the console core depends on.
//! These traits form the boundary of the hexagonal architecture, keeping the core
//! independent of the HTTP client, the remote API and the session storage.

use crate::actions::Action;
use crate::domain::{ActivationState, Role, Session};
use async_trait::async_trait;
use uuid::Uuid;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
///
/// Each call has exactly one failure path; the variant only tells the caller how
/// to react, the message tells the user what went wrong.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    #[error("Network error: {0}")]
    Network(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Rejected: {0}")]
    Validation(String),
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Server error: {0}")]
    Server(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

impl PortError {
    /// Authorization failures are the only kind that end the session.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, PortError::Unauthorized(_))
    }
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Resources
//=========================================================================================

/// A record type exposed by the remote API as one collection.
pub trait Resource: Clone + Send + Sync + 'static {
    /// The writable fields sent on create and update.
    type Draft: Clone + Send + Sync;

    /// Collection path below the API root, without leading or trailing slash.
    const COLLECTION: &'static str;

    /// The context-menu actions offered for rows of this collection.
    const ACTIONS: &'static [Action];

    fn id(&self) -> Uuid;

    fn activation(&self) -> ActivationState;

    /// The current values of the record as a draft, used to pre-fill editors.
    fn to_draft(&self) -> Self::Draft;

    /// The draft that applies a flag action (Favorite, Archive) to this record,
    /// or `None` if the collection has no such flag.
    fn flagged(&self, _action: Action) -> Option<Self::Draft> {
        None
    }
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

/// One authenticated REST collection.
#[async_trait]
pub trait ResourceService<R: Resource>: Send + Sync {
    /// Fetches the whole collection. Never yields a partial sequence.
    async fn list(&self, session: &Session) -> PortResult<Vec<R>>;

    /// Creates a record. The new record is only observable by listing again.
    async fn create(&self, draft: &R::Draft, session: &Session) -> PortResult<()>;

    async fn update(&self, id: Uuid, draft: &R::Draft, session: &Session) -> PortResult<()>;

    /// Moves the record to the opposite of `current`.
    async fn toggle_activation(
        &self,
        id: Uuid,
        current: ActivationState,
        session: &Session,
    ) -> PortResult<()>;

    async fn delete(&self, id: Uuid, session: &Session) -> PortResult<()>;
}

#[async_trait]
pub trait AuthService: Send + Sync {
    /// Exchanges credentials for a fresh session.
    async fn login(&self, email: &str, password: &str) -> PortResult<Session>;

    /// Revokes the session's credential on the remote side.
    async fn logout(&self, session: &Session) -> PortResult<()>;
}

/// Callback fired when the current session is cleared.
pub type SessionListener = Box<dyn Fn() + Send + Sync>;

/// Owner of the current session for the whole console.
///
/// Only this provider creates or clears the session; everybody else reads.
pub trait SessionProvider: Send + Sync {
    fn current(&self) -> Option<Session>;

    fn credential(&self) -> Option<String> {
        self.current()
            .and_then(|session| session.credential().map(str::to_string))
    }

    fn role(&self) -> Option<Role> {
        self.current().map(|session| session.role())
    }

    /// Stores a freshly logged-in session, replacing any previous one.
    fn establish(&self, session: Session);

    /// Removes the current session and notifies listeners. The caller gets the
    /// session back to run its own teardown on it.
    fn take(&self) -> Option<Session>;

    /// Ends and drops the current session, notifying listeners.
    fn clear(&self) {
        if let Some(mut session) = self.take() {
            session.end();
        }
    }

    fn on_session_cleared(&self, listener: SessionListener);
}
