//! crates/ledgerdesk_core/src/resources.rs
//!
//! Binds each record type to its remote collection and context menu.

use crate::actions::Action;
use crate::domain::{
    Accountant, AccountantDraft, ActivationState, ClientAccount, ClientDraft, Folder, FolderDraft,
};
use crate::ports::Resource;
use uuid::Uuid;

impl Resource for Accountant {
    type Draft = AccountantDraft;

    const COLLECTION: &'static str = "accountants/internal";
    const ACTIONS: &'static [Action] = &[Action::Modify, Action::Details, Action::Delete];

    fn id(&self) -> Uuid {
        self.id
    }

    fn activation(&self) -> ActivationState {
        self.activation
    }

    fn to_draft(&self) -> AccountantDraft {
        AccountantDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            title: self.title.clone(),
        }
    }
}

impl Resource for ClientAccount {
    type Draft = ClientDraft;

    const COLLECTION: &'static str = "clients";
    const ACTIONS: &'static [Action] = &[
        Action::Modify,
        Action::Details,
        Action::ClientInfo,
        Action::Delete,
    ];

    fn id(&self) -> Uuid {
        self.id
    }

    fn activation(&self) -> ActivationState {
        self.activation
    }

    fn to_draft(&self) -> ClientDraft {
        ClientDraft {
            name: self.name.clone(),
            email: self.email.clone(),
            phone: self.phone.clone(),
            company: self.company.clone(),
        }
    }
}

impl Resource for Folder {
    type Draft = FolderDraft;

    const COLLECTION: &'static str = "folders";
    const ACTIONS: &'static [Action] = &Action::ALL;

    fn id(&self) -> Uuid {
        self.id
    }

    fn activation(&self) -> ActivationState {
        self.activation
    }

    fn to_draft(&self) -> FolderDraft {
        FolderDraft {
            name: self.name.clone(),
            description: self.description.clone(),
            client_id: self.client_id,
            favorite: self.favorite,
            archived: self.archived,
        }
    }

    /// Favorite flips the star; Archive only ever archives.
    fn flagged(&self, action: Action) -> Option<FolderDraft> {
        let mut draft = self.to_draft();
        match action {
            Action::Favorite => draft.favorite = !self.favorite,
            Action::Archive => draft.archived = true,
            _ => return None,
        }
        Some(draft)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn folder() -> Folder {
        Folder {
            id: Uuid::new_v4(),
            name: "2024 invoices".to_string(),
            description: None,
            client_id: None,
            favorite: false,
            archived: false,
            activation: ActivationState::Active,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn folder_flags_map_to_drafts() {
        let folder = folder();
        assert!(folder.flagged(Action::Favorite).unwrap().favorite);
        assert!(folder.flagged(Action::Archive).unwrap().archived);
        assert!(folder.flagged(Action::Delete).is_none());

        let starred = Folder {
            favorite: true,
            ..folder
        };
        assert!(!starred.flagged(Action::Favorite).unwrap().favorite);
    }

    #[test]
    fn accountants_have_no_flags() {
        let accountant = Accountant {
            id: Uuid::new_v4(),
            name: "Ada".to_string(),
            email: "ada@firm.test".to_string(),
            phone: None,
            title: Some("Senior".to_string()),
            activation: ActivationState::Inactive,
            created_at: Utc::now(),
        };
        assert!(accountant.flagged(Action::Favorite).is_none());
        assert_eq!(accountant.to_draft().title.as_deref(), Some("Senior"));
    }
}
