//! services/console/src/views/table.rs
//!
//! The view-model behind every record table (accountants, clients, folders):
//! rows, the open panel, the last notice, and the context-menu handler.

use crate::views::notice::Notice;
use ledgerdesk_core::actions::{context_menu, Action};
use ledgerdesk_core::domain::Session;
use ledgerdesk_core::ports::{PortError, PortResult, Resource, ResourceService, SessionProvider};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadState {
    Idle,
    Loaded,
    Failed,
}

/// The modal or side panel currently open over the table.
#[derive(Debug, Clone, PartialEq)]
pub enum Panel<D> {
    Editor { id: Uuid, draft: D },
    Details(Uuid),
    ClientInfo(Uuid),
    Confirm { action: Action, id: Uuid },
}

pub struct RecordTable<R: Resource> {
    service: Arc<dyn ResourceService<R>>,
    sessions: Arc<dyn SessionProvider>,
    rows: Vec<R>,
    load: LoadState,
    panel: Option<Panel<R::Draft>>,
    notice: Option<Notice>,
}

impl<R: Resource> RecordTable<R> {
    pub fn new(service: Arc<dyn ResourceService<R>>, sessions: Arc<dyn SessionProvider>) -> Self {
        Self {
            service,
            sessions,
            rows: Vec::new(),
            load: LoadState::Idle,
            panel: None,
            notice: None,
        }
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn row(&self, id: Uuid) -> Option<&R> {
        self.rows.iter().find(|row| row.id() == id)
    }

    pub fn load_state(&self) -> LoadState {
        self.load
    }

    pub fn panel(&self) -> Option<&Panel<R::Draft>> {
        self.panel.as_ref()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn dismiss(&mut self) {
        self.panel = None;
    }

    /// The draft being edited, for the form to write into.
    pub fn draft_mut(&mut self) -> Option<&mut R::Draft> {
        match &mut self.panel {
            Some(Panel::Editor { draft, .. }) => Some(draft),
            _ => None,
        }
    }

    fn session(&self) -> PortResult<Session> {
        self.sessions
            .current()
            .ok_or_else(|| PortError::Unauthorized(format!("{}: no active session", R::COLLECTION)))
    }

    /// Routes a failure: authorization failures end the session, everything
    /// else becomes a notice and leaves the table as it was.
    fn settle<T>(&mut self, result: PortResult<T>) -> PortResult<T> {
        if let Err(e) = &result {
            if e.is_unauthorized() {
                error!("{}; clearing the session", e);
                self.sessions.clear();
            } else {
                warn!("{}", e);
                self.notice = Some(Notice::from(e));
            }
        }
        result
    }

    /// Replaces the rows with a fresh listing. On failure the previous rows stay.
    pub async fn refresh(&mut self) -> PortResult<()> {
        let result = match self.session() {
            Ok(session) => self.service.list(&session).await,
            Err(e) => Err(e),
        };
        match self.settle(result) {
            Ok(rows) => {
                self.rows = rows;
                self.load = LoadState::Loaded;
                Ok(())
            }
            Err(e) => {
                self.load = LoadState::Failed;
                Err(e)
            }
        }
    }

    /// Runs a mutation and, once the API confirmed it, re-lists. The result is
    /// the mutation's own; a failed re-list only marks the table stale.
    async fn confirmed<F>(&mut self, success: &str, mutation: F) -> PortResult<()>
    where
        F: for<'a> FnOnce(
            &'a dyn ResourceService<R>,
            &'a Session,
        ) -> futures::future::BoxFuture<'a, PortResult<()>>,
    {
        let session = self.session();
        let result = match &session {
            Ok(session) => mutation(self.service.as_ref(), session).await,
            Err(e) => Err(e.clone()),
        };
        self.settle(result)?;
        info!("{} ({})", success, R::COLLECTION);
        self.notice = Some(Notice::success(success));
        if let Err(e) = self.refresh().await {
            warn!("{} ({}) but the re-list failed: {}", success, R::COLLECTION, e);
        }
        Ok(())
    }

    pub async fn submit_new(&mut self, draft: R::Draft) -> PortResult<()> {
        self.confirmed("records.created", move |service, session| {
            Box::pin(async move { service.create(&draft, session).await })
        })
        .await
    }

    /// Saves the open editor. The editor stays open only if the API refuses the
    /// update itself.
    pub async fn submit_edit(&mut self) -> PortResult<()> {
        let (id, draft) = match &self.panel {
            Some(Panel::Editor { id, draft }) => (*id, draft.clone()),
            _ => return Err(PortError::Validation("no record is being edited".to_string())),
        };
        self.confirmed("records.updated", move |service, session| {
            Box::pin(async move { service.update(id, &draft, session).await })
        })
        .await?;
        self.panel = None;
        Ok(())
    }

    /// Flips the activation of a listed record.
    pub async fn toggle(&mut self, id: Uuid) -> PortResult<()> {
        let current = match self.row(id) {
            Some(row) => row.activation(),
            None => return Err(PortError::NotFound(format!("{} {}", R::COLLECTION, id))),
        };
        self.confirmed("records.activation_changed", move |service, session| {
            Box::pin(async move { service.toggle_activation(id, current, session).await })
        })
        .await
    }

    /// The actions the current session may pick from a row's context menu.
    pub fn context_menu(&self) -> Vec<Action> {
        match self.sessions.current() {
            Some(session) => context_menu(R::ACTIONS, &session),
            None => Vec::new(),
        }
    }

    /// The single handler for every context-menu action.
    pub async fn dispatch(&mut self, action: Action, id: Uuid) -> PortResult<()> {
        if !self.context_menu().contains(&action) {
            let err = PortError::Validation(format!("{} is not available here", action.label_key()));
            self.notice = Some(Notice::from(&err));
            return Err(err);
        }
        let row = self
            .row(id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("{} {}", R::COLLECTION, id)))?;

        match action {
            action if action.needs_confirmation() => {
                self.panel = Some(Panel::Confirm { action, id });
                Ok(())
            }
            Action::Modify => {
                self.panel = Some(Panel::Editor {
                    id,
                    draft: row.to_draft(),
                });
                Ok(())
            }
            Action::Details => {
                self.panel = Some(Panel::Details(id));
                Ok(())
            }
            Action::ClientInfo => {
                self.panel = Some(Panel::ClientInfo(id));
                Ok(())
            }
            _ => self.apply_flag(&row, action).await,
        }
    }

    /// Runs the action waiting in the confirmation panel.
    pub async fn confirm(&mut self) -> PortResult<()> {
        let (action, id) = match self.panel {
            Some(Panel::Confirm { action, id }) => (action, id),
            _ => return Err(PortError::Validation("nothing to confirm".to_string())),
        };
        self.panel = None;
        self.run_confirmed(action, id).await
    }

    async fn run_confirmed(&mut self, action: Action, id: Uuid) -> PortResult<()> {
        match action {
            Action::Delete => {
                self.confirmed("records.deleted", move |service, session| {
                    Box::pin(async move { service.delete(id, session).await })
                })
                .await
            }
            _ => {
                let row = self
                    .row(id)
                    .cloned()
                    .ok_or_else(|| PortError::NotFound(format!("{} {}", R::COLLECTION, id)))?;
                self.apply_flag(&row, action).await
            }
        }
    }

    async fn apply_flag(&mut self, row: &R, action: Action) -> PortResult<()> {
        let id = row.id();
        let draft = row.flagged(action).ok_or_else(|| {
            PortError::Validation(format!("{} has no {} flag", R::COLLECTION, action.label_key()))
        })?;
        self.confirmed("records.updated", move |service, session| {
            Box::pin(async move { service.update(id, &draft, session).await })
        })
        .await
    }
}
