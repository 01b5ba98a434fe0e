//! services/console/src/adapters/records.rs
//!
//! The JSON shapes exchanged with the remote API, and their mapping onto the
//! pure domain types of the core crate.

use chrono::{DateTime, Utc};
use ledgerdesk_core::domain::{
    Accountant, AccountantDraft, ActivationState, ClientAccount, ClientDraft, Folder, FolderDraft,
};
use ledgerdesk_core::ports::Resource;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A resource the HTTP adapter knows how to read and write.
pub trait WireResource: Resource {
    /// The record as the API returns it.
    type Record: DeserializeOwned + Send;
    /// The body sent on create and update.
    type Payload: Serialize + Send + Sync;

    fn from_record(record: Self::Record) -> Self;

    fn payload(draft: &Self::Draft) -> Self::Payload;
}

//=========================================================================================
// Shared Fields
//=========================================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum StatusRecord {
    Active,
    Inactive,
}

impl StatusRecord {
    fn to_domain(self) -> ActivationState {
        match self {
            StatusRecord::Active => ActivationState::Active,
            StatusRecord::Inactive => ActivationState::Inactive,
        }
    }
}

//=========================================================================================
// Accountants
//=========================================================================================

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct AccountantRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    pub status: StatusRecord,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct AccountantPayload {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl WireResource for Accountant {
    type Record = AccountantRecord;
    type Payload = AccountantPayload;

    fn from_record(record: AccountantRecord) -> Self {
        Accountant {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            title: record.title,
            activation: record.status.to_domain(),
            created_at: record.created_at,
        }
    }

    fn payload(draft: &AccountantDraft) -> AccountantPayload {
        AccountantPayload {
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            title: draft.title.clone(),
        }
    }
}

//=========================================================================================
// Clients
//=========================================================================================

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct ClientRecord {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub company: Option<String>,
    pub status: StatusRecord,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ClientPayload {
    pub name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

impl WireResource for ClientAccount {
    type Record = ClientRecord;
    type Payload = ClientPayload;

    fn from_record(record: ClientRecord) -> Self {
        ClientAccount {
            id: record.id,
            name: record.name,
            email: record.email,
            phone: record.phone,
            company: record.company,
            activation: record.status.to_domain(),
            created_at: record.created_at,
        }
    }

    fn payload(draft: &ClientDraft) -> ClientPayload {
        ClientPayload {
            name: draft.name.clone(),
            email: draft.email.clone(),
            phone: draft.phone.clone(),
            company: draft.company.clone(),
        }
    }
}

//=========================================================================================
// Folders
//=========================================================================================

#[derive(Debug, Deserialize, Serialize, ToSchema)]
pub struct FolderRecord {
    pub id: Uuid,
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub client_id: Option<Uuid>,
    #[serde(default)]
    pub favorite: bool,
    #[serde(default)]
    pub archived: bool,
    pub status: StatusRecord,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderPayload {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_id: Option<Uuid>,
    pub favorite: bool,
    pub archived: bool,
}

impl WireResource for Folder {
    type Record = FolderRecord;
    type Payload = FolderPayload;

    fn from_record(record: FolderRecord) -> Self {
        Folder {
            id: record.id,
            name: record.name,
            description: record.description,
            client_id: record.client_id,
            favorite: record.favorite,
            archived: record.archived,
            activation: record.status.to_domain(),
            created_at: record.created_at,
        }
    }

    fn payload(draft: &FolderDraft) -> FolderPayload {
        FolderPayload {
            name: draft.name.clone(),
            description: draft.description.clone(),
            client_id: draft.client_id,
            favorite: draft.favorite,
            archived: draft.archived,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn optional_fields_may_be_missing_on_the_wire() {
        let record: FolderRecord = serde_json::from_value(json!({
            "id": "6f1c2b1e-3c1d-4a55-9f37-2a8d0f5e4b10",
            "name": "Receipts",
            "status": "inactive",
            "created_at": "2024-03-01T10:00:00Z"
        }))
        .unwrap();
        let folder = Folder::from_record(record);
        assert_eq!(folder.activation, ActivationState::Inactive);
        assert!(!folder.favorite);
        assert_eq!(folder.description, None);
    }

    #[test]
    fn unset_optional_fields_are_left_out_of_payloads() {
        let payload = Accountant::payload(&AccountantDraft::new("Acme", "a@acme.com"));
        assert_eq!(
            serde_json::to_value(payload).unwrap(),
            json!({ "name": "Acme", "email": "a@acme.com" })
        );
    }
}
