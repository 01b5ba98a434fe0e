//! crates/ledgerdesk_core/src/domain.rs
//!
//! Defines the pure, core data structures for the console.
//! These structs are independent of any transport or serialization format.

use chrono::{DateTime, Utc};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

//=========================================================================================
// Roles
//=========================================================================================

/// The role claim carried by a login session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Admin,
    InternalAccountant,
    ExternalAccountant,
    Client,
}

impl Role {
    pub const ALL: [Role; 4] = [
        Role::Admin,
        Role::InternalAccountant,
        Role::ExternalAccountant,
        Role::Client,
    ];

    /// The name the remote API uses for this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::InternalAccountant => "internal_accountant",
            Role::ExternalAccountant => "external_accountant",
            Role::Client => "client",
        }
    }

    const fn bit(self) -> u8 {
        match self {
            Role::Admin => 1,
            Role::InternalAccountant => 1 << 1,
            Role::ExternalAccountant => 1 << 2,
            Role::Client => 1 << 3,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown role: {0}")]
pub struct UnknownRole(pub String);

impl FromStr for Role {
    type Err = UnknownRole;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Role::ALL
            .into_iter()
            .find(|role| role.as_str() == s)
            .ok_or_else(|| UnknownRole(s.to_string()))
    }
}

/// A set of roles, small enough to live in `const` navigation tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct RoleSet(u8);

impl RoleSet {
    pub const EMPTY: RoleSet = RoleSet(0);
    pub const ALL: RoleSet = RoleSet::of(&Role::ALL);
    /// Everyone working inside the firm.
    pub const STAFF: RoleSet = RoleSet::of(&[Role::Admin, Role::InternalAccountant]);

    pub const fn of(roles: &[Role]) -> Self {
        let mut bits = 0;
        let mut i = 0;
        while i < roles.len() {
            bits |= roles[i].bit();
            i += 1;
        }
        RoleSet(bits)
    }

    pub const fn contains(&self, role: Role) -> bool {
        self.0 & role.bit() != 0
    }

    pub const fn union(self, other: RoleSet) -> RoleSet {
        RoleSet(self.0 | other.0)
    }

    pub const fn intersect(self, other: RoleSet) -> RoleSet {
        RoleSet(self.0 & other.0)
    }

    pub const fn is_empty(&self) -> bool {
        self.0 == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        Role::ALL.into_iter().filter(move |role| self.contains(*role))
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        iter.into_iter()
            .fold(RoleSet::EMPTY, |set, role| RoleSet(set.0 | role.bit()))
    }
}

//=========================================================================================
// Session
//=========================================================================================

/// The client-side view of an authenticated user for one login lifetime.
///
/// A session is only ever created by a successful login and only ever ended by
/// logout or credential expiry. Once ended it stays ended.
#[derive(Clone, PartialEq, Eq)]
pub struct Session {
    credential: Option<String>,
    role: Role,
    email: String,
    is_active: bool,
}

impl Session {
    /// The login transition.
    pub fn new(credential: impl Into<String>, role: Role, email: impl Into<String>) -> Self {
        Self {
            credential: Some(credential.into()),
            role,
            email: email.into(),
            is_active: true,
        }
    }

    pub fn credential(&self) -> Option<&str> {
        self.credential.as_deref()
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    /// The logout transition. Deactivates first, then drops the credential.
    pub fn end(&mut self) {
        self.is_active = false;
        self.credential = None;
    }
}

// The credential never shows up in logs.
impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("credential", &self.credential.as_ref().map(|_| "<redacted>"))
            .field("role", &self.role)
            .field("email", &self.email)
            .field("is_active", &self.is_active)
            .finish()
    }
}

//=========================================================================================
// Records
//=========================================================================================

/// Binary status toggled by administrative action, independent of deletion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActivationState {
    Active,
    Inactive,
}

impl ActivationState {
    pub fn is_active(&self) -> bool {
        matches!(self, ActivationState::Active)
    }

    pub fn toggled(&self) -> Self {
        match self {
            ActivationState::Active => ActivationState::Inactive,
            ActivationState::Inactive => ActivationState::Active,
        }
    }
}

/// An accountant employed by the firm.
#[derive(Debug, Clone, PartialEq)]
pub struct Accountant {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: Option<String>,
    pub activation: ActivationState,
    pub created_at: DateTime<Utc>,
}

/// The writable fields of an accountant.
#[derive(Debug, Clone, PartialEq)]
pub struct AccountantDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub title: Option<String>,
}

impl AccountantDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            title: None,
        }
    }
}

/// A customer of the firm whose invoices are managed in the console.
#[derive(Debug, Clone, PartialEq)]
pub struct ClientAccount {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
    pub activation: ActivationState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub company: Option<String>,
}

impl ClientDraft {
    pub fn new(name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: None,
            company: None,
        }
    }
}

/// A folder grouping a client's invoices.
#[derive(Debug, Clone, PartialEq)]
pub struct Folder {
    pub id: Uuid,
    pub name: String,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub favorite: bool,
    pub archived: bool,
    pub activation: ActivationState,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FolderDraft {
    pub name: String,
    pub description: Option<String>,
    pub client_id: Option<Uuid>,
    pub favorite: bool,
    pub archived: bool,
}

impl FolderDraft {
    /// A plain folder: no description or client, neither favorite nor archived.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            client_id: None,
            favorite: false,
            archived: false,
        }
    }
}
