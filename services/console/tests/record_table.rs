//! `RecordTable` failure handling, driven by a scripted in-process service.

use async_trait::async_trait;
use chrono::Utc;
use console_lib::adapters::SessionStore;
use console_lib::views::{LoadState, NoticeLevel, Panel, RecordTable};
use ledgerdesk_core::actions::Action;
use ledgerdesk_core::domain::{ActivationState, Folder, FolderDraft, Role, Session};
use ledgerdesk_core::ports::{PortError, PortResult, ResourceService, SessionProvider};
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use uuid::Uuid;

/// Answers each call with the next scripted result and counts the calls.
#[derive(Default)]
struct ScriptedFolders {
    lists: Mutex<VecDeque<PortResult<Vec<Folder>>>>,
    writes: Mutex<VecDeque<PortResult<()>>>,
    list_calls: Mutex<usize>,
    write_calls: Mutex<usize>,
}

impl ScriptedFolders {
    fn list_then(self, result: PortResult<Vec<Folder>>) -> Self {
        self.lists.lock().push_back(result);
        self
    }

    fn write_then(self, result: PortResult<()>) -> Self {
        self.writes.lock().push_back(result);
        self
    }

    fn list_calls(&self) -> usize {
        *self.list_calls.lock()
    }

    fn write_calls(&self) -> usize {
        *self.write_calls.lock()
    }

    fn next_write(&self) -> PortResult<()> {
        *self.write_calls.lock() += 1;
        self.writes.lock().pop_front().unwrap_or(Ok(()))
    }
}

#[async_trait]
impl ResourceService<Folder> for ScriptedFolders {
    async fn list(&self, _session: &Session) -> PortResult<Vec<Folder>> {
        *self.list_calls.lock() += 1;
        self.lists
            .lock()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::Unexpected("script exhausted".to_string())))
    }

    async fn create(&self, _draft: &FolderDraft, _session: &Session) -> PortResult<()> {
        self.next_write()
    }

    async fn update(&self, _id: Uuid, _draft: &FolderDraft, _session: &Session) -> PortResult<()> {
        self.next_write()
    }

    async fn toggle_activation(
        &self,
        _id: Uuid,
        _current: ActivationState,
        _session: &Session,
    ) -> PortResult<()> {
        self.next_write()
    }

    async fn delete(&self, _id: Uuid, _session: &Session) -> PortResult<()> {
        self.next_write()
    }
}

fn folder(name: &str) -> Folder {
    Folder {
        id: Uuid::new_v4(),
        name: name.to_string(),
        description: None,
        client_id: None,
        favorite: false,
        archived: false,
        activation: ActivationState::Active,
        created_at: Utc::now(),
    }
}

fn signed_in(role: Role) -> Arc<SessionStore> {
    let sessions = Arc::new(SessionStore::new());
    sessions.establish(Session::new("token", role, "user@firm.test"));
    sessions
}

fn table(
    service: ScriptedFolders,
    sessions: Arc<SessionStore>,
) -> (RecordTable<Folder>, Arc<ScriptedFolders>) {
    let service = Arc::new(service);
    (RecordTable::new(service.clone(), sessions), service)
}

#[tokio::test]
async fn a_failed_refresh_keeps_the_previous_rows() {
    let rows = vec![folder("Receipts"), folder("Payroll")];
    let script = ScriptedFolders::default()
        .list_then(Ok(rows.clone()))
        .list_then(Err(PortError::Server("Failed to list folders: 502".to_string())));
    let (mut table, _) = table(script, signed_in(Role::Admin));

    table.refresh().await.unwrap();
    assert_eq!(table.load_state(), LoadState::Loaded);

    let err = table.refresh().await.unwrap_err();
    assert!(matches!(err, PortError::Server(_)));
    assert_eq!(table.rows(), rows.as_slice());
    assert_eq!(table.load_state(), LoadState::Failed);
    let notice = table.notice().unwrap();
    assert_eq!(notice.level, NoticeLevel::Error);
    assert!(notice.message.contains("Server error"));
}

#[tokio::test]
async fn a_failed_write_is_not_followed_by_a_relist() {
    let script = ScriptedFolders::default()
        .list_then(Ok(vec![folder("Receipts")]))
        .write_then(Err(PortError::Network("connection refused".to_string())));
    let (mut table, service) = table(script, signed_in(Role::Admin));
    table.refresh().await.unwrap();

    let err = table.submit_new(FolderDraft::new("Payroll")).await.unwrap_err();
    assert!(matches!(err, PortError::Network(_)));
    assert_eq!(service.list_calls(), 1);
    assert_eq!(service.write_calls(), 1);
    assert_eq!(table.rows().len(), 1);
    assert_eq!(table.notice().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn an_unauthorized_write_clears_the_session_without_a_notice() {
    let sessions = signed_in(Role::Admin);
    let script = ScriptedFolders::default()
        .write_then(Err(PortError::Unauthorized("Failed to create folders: 401".to_string())));
    let (mut table, _) = table(script, sessions.clone());

    let err = table.submit_new(FolderDraft::new("Payroll")).await.unwrap_err();
    assert!(err.is_unauthorized());
    assert!(sessions.current().is_none());
    assert!(table.notice().is_none());
}

#[tokio::test]
async fn without_a_session_nothing_is_called() {
    let (mut table, service) = table(ScriptedFolders::default(), Arc::new(SessionStore::new()));

    let err = table.refresh().await.unwrap_err();
    assert!(err.is_unauthorized());
    assert_eq!(service.list_calls(), 0);
    assert!(table.context_menu().is_empty());
}

#[tokio::test]
async fn a_rejected_edit_keeps_the_editor_open() {
    let row = folder("Receipts");
    let id = row.id;
    let script = ScriptedFolders::default()
        .list_then(Ok(vec![row]))
        .write_then(Err(PortError::Validation("name is required".to_string())));
    let (mut table, _) = table(script, signed_in(Role::InternalAccountant));
    table.refresh().await.unwrap();

    table.dispatch(Action::Modify, id).await.unwrap();
    table.draft_mut().unwrap().name.clear();
    assert!(table.submit_edit().await.is_err());
    assert!(matches!(table.panel(), Some(Panel::Editor { .. })));
}

#[tokio::test]
async fn details_and_client_info_only_open_panels() {
    let row = folder("Receipts");
    let id = row.id;
    let script = ScriptedFolders::default().list_then(Ok(vec![row]));
    let (mut table, service) = table(script, signed_in(Role::ExternalAccountant));
    table.refresh().await.unwrap();

    table.dispatch(Action::Details, id).await.unwrap();
    assert_eq!(table.panel(), Some(&Panel::Details(id)));
    table.dispatch(Action::ClientInfo, id).await.unwrap();
    assert_eq!(table.panel(), Some(&Panel::ClientInfo(id)));
    table.dismiss();
    assert!(table.panel().is_none());
    assert_eq!(service.write_calls(), 0);
}

#[tokio::test]
async fn unknown_rows_are_not_found() {
    let script = ScriptedFolders::default().list_then(Ok(vec![folder("Receipts")]));
    let (mut table, _) = table(script, signed_in(Role::Admin));
    table.refresh().await.unwrap();

    let err = table.toggle(Uuid::new_v4()).await.unwrap_err();
    assert!(matches!(err, PortError::NotFound(_)));
}

#[tokio::test]
async fn an_accepted_write_stays_accepted_when_the_relist_fails() {
    let rows = vec![folder("Receipts")];
    let script = ScriptedFolders::default()
        .list_then(Ok(rows.clone()))
        .write_then(Ok(()))
        .list_then(Err(PortError::Network("connection reset".to_string())));
    let (mut table, service) = table(script, signed_in(Role::Admin));
    table.refresh().await.unwrap();

    table.submit_new(FolderDraft::new("Payroll")).await.unwrap();
    assert_eq!(service.write_calls(), 1);
    assert_eq!(service.list_calls(), 2);
    assert_eq!(table.load_state(), LoadState::Failed);
    assert_eq!(table.rows(), rows.as_slice());
    assert_eq!(table.notice().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn an_accepted_edit_closes_the_editor_even_if_the_relist_fails() {
    let row = folder("Receipts");
    let id = row.id;
    let script = ScriptedFolders::default()
        .list_then(Ok(vec![row]))
        .write_then(Ok(()))
        .list_then(Err(PortError::Server("Failed to list folders: 502".to_string())));
    let (mut table, service) = table(script, signed_in(Role::Admin));
    table.refresh().await.unwrap();

    table.dispatch(Action::Modify, id).await.unwrap();
    table.draft_mut().unwrap().name = "Receipts 2026".to_string();
    table.submit_edit().await.unwrap();
    assert!(table.panel().is_none());
    assert_eq!(service.write_calls(), 1);
    assert_eq!(table.load_state(), LoadState::Failed);
}
