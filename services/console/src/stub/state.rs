//! services/console/src/stub/state.rs
//!
//! Defines the stub API's shared state: the accounts that may log in, the
//! bearer tokens handed out, the stored collections, and the request log.

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHasher, SaltString},
    Algorithm, Argon2, Params, Version,
};
use chrono::Utc;
use ledgerdesk_core::domain::{Accountant, ClientAccount, Folder, Role, RoleSet};
use ledgerdesk_core::ports::Resource;
use serde_json::{Map, Value};
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

//=========================================================================================
// Collections
//=========================================================================================

/// A collection served by the stub, the roles allowed to use it, and the
/// fields every write must fill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CollectionSpec {
    pub name: &'static str,
    pub allowed: RoleSet,
    pub required: &'static [&'static str],
}

pub const COLLECTIONS: [CollectionSpec; 3] = [
    CollectionSpec {
        name: <Accountant as Resource>::COLLECTION,
        allowed: RoleSet::of(&[Role::Admin]),
        required: &["name", "email"],
    },
    CollectionSpec {
        name: <ClientAccount as Resource>::COLLECTION,
        allowed: RoleSet::of(&[Role::Admin, Role::InternalAccountant, Role::ExternalAccountant]),
        required: &["name", "email"],
    },
    CollectionSpec {
        name: <Folder as Resource>::COLLECTION,
        allowed: RoleSet::ALL,
        required: &["name"],
    },
];

pub type StoredRecord = Map<String, Value>;

//=========================================================================================
// Accounts and Tokens
//=========================================================================================

#[derive(Debug, thiserror::Error)]
pub enum SeedError {
    #[error("Failed to hash password: {0}")]
    Hash(String),
}

#[derive(Debug, Clone)]
pub struct StubUser {
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

/// Who is behind a bearer token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Caller {
    pub email: String,
    pub role: Role,
}

/// The raw bearer token of the current request.
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

//=========================================================================================
// StubState (Shared Across All Requests)
//=========================================================================================

pub struct StubState {
    users: Vec<StubUser>,
    tokens: RwLock<HashMap<String, Caller>>,
    collections: RwLock<HashMap<&'static str, Vec<StoredRecord>>>,
    requests: Mutex<Vec<String>>,
}

impl Default for StubState {
    fn default() -> Self {
        Self::new()
    }
}

impl StubState {
    pub fn new() -> Self {
        let collections = COLLECTIONS
            .iter()
            .map(|spec| (spec.name, Vec::new()))
            .collect();
        Self {
            users: Vec::new(),
            tokens: RwLock::new(HashMap::new()),
            collections: RwLock::new(collections),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Adds an account that may log in.
    pub fn with_user(mut self, email: &str, password: &str, role: Role) -> Result<Self, SeedError> {
        let salt = SaltString::generate(&mut OsRng);
        let password_hash = hasher()?
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| SeedError::Hash(e.to_string()))?
            .to_string();
        self.users.push(StubUser {
            email: email.to_string(),
            password_hash,
            role,
        });
        Ok(self)
    }

    pub fn user(&self, email: &str) -> Option<&StubUser> {
        self.users.iter().find(|user| user.email == email)
    }

    // --- Tokens ---

    pub async fn issue_token(&self, caller: Caller) -> String {
        let token = Uuid::new_v4().simple().to_string();
        self.tokens.write().await.insert(token.clone(), caller);
        token
    }

    pub async fn resolve_token(&self, token: &str) -> Option<Caller> {
        self.tokens.read().await.get(token).cloned()
    }

    pub async fn revoke_token(&self, token: &str) -> bool {
        self.tokens.write().await.remove(token).is_some()
    }

    // --- Records ---

    /// Stores a record the way a successful create would, keeping any `status`
    /// the caller provided. Returns `None` for unknown collections.
    pub async fn insert(&self, collection: &str, fields: StoredRecord) -> Option<Uuid> {
        let (id, record) = stamp(fields);
        self.with_collection(collection, |records| records.push(record))
            .await
            .map(|_| id)
    }

    pub async fn records(&self, collection: &str) -> Vec<StoredRecord> {
        self.collections
            .read()
            .await
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn with_collection<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Vec<StoredRecord>) -> T,
    ) -> Option<T> {
        let mut collections = self.collections.write().await;
        collections.get_mut(collection).map(f)
    }

    // --- Request Log ---

    pub async fn log_request(&self, line: String) {
        self.requests.lock().await.push(line);
    }

    pub async fn requests(&self) -> Vec<String> {
        self.requests.lock().await.clone()
    }

    /// How many logged requests equal `line`, e.g. `"PUT /folders/<id>/activate"`.
    pub async fn count_requests(&self, line: &str) -> usize {
        self.requests
            .lock()
            .await
            .iter()
            .filter(|logged| logged.as_str() == line)
            .count()
    }
}

/// Argon2 with small costs; the stub only ever holds throwaway passwords.
fn hasher() -> Result<Argon2<'static>, SeedError> {
    let params = Params::new(4096, 1, 1, None).map_err(|e| SeedError::Hash(e.to_string()))?;
    Ok(Argon2::new(Algorithm::Argon2id, Version::V0x13, params))
}

/// Gives a new record its server-side fields.
pub fn stamp(mut fields: StoredRecord) -> (Uuid, StoredRecord) {
    let id = Uuid::new_v4();
    fields.insert("id".to_string(), Value::String(id.to_string()));
    fields
        .entry("status")
        .or_insert_with(|| Value::String("active".to_string()));
    fields.insert(
        "created_at".to_string(),
        Value::String(Utc::now().to_rfc3339()),
    );
    (id, fields)
}
