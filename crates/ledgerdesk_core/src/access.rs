//! crates/ledgerdesk_core/src/access.rs
//!
//! The authorization gate: decides from the session's role claim whether a
//! navigation target or capability is permitted.

use crate::domain::{RoleSet, Session};

/// True iff the session is active and its role is one of `required`.
///
/// Pure: the menu re-evaluates this on every render, so the same session must
/// always get the same answer.
pub fn can_access(session: &Session, required: RoleSet) -> bool {
    session.is_active() && required.contains(session.role())
}

/// The outcome of a gated navigation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Access {
    Granted,
    Denied(UnauthorizedView),
    /// There is no session at all; the login page is shown instead of the
    /// unauthorized screen.
    LoginRequired,
}

impl Access {
    pub fn is_granted(&self) -> bool {
        matches!(self, Access::Granted)
    }
}

pub fn check(session: &Session, required: RoleSet) -> Access {
    if can_access(session, required) {
        Access::Granted
    } else {
        Access::Denied(UnauthorizedView::default())
    }
}

/// What the user can do from the unauthorized screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    GoBack,
}

impl RecoveryAction {
    pub fn label_key(&self) -> &'static str {
        match self {
            RecoveryAction::GoBack => "unauthorized.go_back",
        }
    }
}

/// The terminal screen shown when a navigation attempt is denied.
///
/// It never redirects to the login page on its own; that only happens on
/// logout or credential expiry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnauthorizedView {
    pub title_key: &'static str,
    pub message_key: &'static str,
}

impl Default for UnauthorizedView {
    fn default() -> Self {
        Self {
            title_key: "unauthorized.title",
            message_key: "unauthorized.message",
        }
    }
}

impl UnauthorizedView {
    pub fn actions(&self) -> &'static [RecoveryAction] {
        &[RecoveryAction::GoBack]
    }
}
