//! crates/ledgerdesk_core/src/actions.rs
//!
//! The closed set of context-menu actions a table row can emit.

use crate::access::can_access;
use crate::domain::{Role, RoleSet, Session};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Modify,
    Favorite,
    Archive,
    Details,
    ClientInfo,
    Delete,
}

impl Action {
    pub const ALL: [Action; 6] = [
        Action::Modify,
        Action::Favorite,
        Action::Archive,
        Action::Details,
        Action::ClientInfo,
        Action::Delete,
    ];

    /// Translation key of the menu label.
    pub fn label_key(&self) -> &'static str {
        match self {
            Action::Modify => "actions.modify",
            Action::Favorite => "actions.favorite",
            Action::Archive => "actions.archive",
            Action::Details => "actions.details",
            Action::ClientInfo => "actions.client_info",
            Action::Delete => "actions.delete",
        }
    }

    pub fn required_roles(&self) -> RoleSet {
        match self {
            Action::Details | Action::Favorite => RoleSet::ALL,
            Action::Modify | Action::ClientInfo | Action::Archive => {
                RoleSet::STAFF.union(RoleSet::of(&[Role::ExternalAccountant]))
            }
            Action::Delete => RoleSet::STAFF,
        }
    }

    /// Destructive actions ask for confirmation before they run.
    pub fn needs_confirmation(&self) -> bool {
        matches!(self, Action::Delete | Action::Archive)
    }
}

/// The actions of `offered` the session may use, in menu order.
pub fn context_menu(offered: &[Action], session: &Session) -> Vec<Action> {
    offered
        .iter()
        .copied()
        .filter(|action| can_access(session, action.required_roles()))
        .collect()
}
