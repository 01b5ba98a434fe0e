//! services/console/src/console.rs
//!
//! The console's shared state: the session provider, the remote services, and
//! the navigation shell, wired together once at startup.

use crate::adapters::{HttpAuthClient, HttpResourceClient, SessionStore};
use crate::config::Config;
use crate::error::ConsoleError;
use crate::views::RecordTable;
use futures::future::{join_all, BoxFuture, FutureExt};
use ledgerdesk_core::access::{can_access, Access};
use ledgerdesk_core::domain::{Accountant, ClientAccount, Folder, Session};
use ledgerdesk_core::navigation::{MenuItem, NavMenu, NavShell, Route, Screen, SectionState};
use ledgerdesk_core::ports::{AuthService, PortResult, Resource, ResourceService, SessionProvider};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};

/// Where each collection lives in the menu.
pub const ACCOUNTANTS_ROUTE: &str = "/accountants/internal";
pub const CLIENTS_ROUTE: &str = "/clients/directory";
pub const FOLDERS_ROUTE: &str = "/folders";

/// The remote collections the console works with.
#[derive(Clone)]
pub struct Services {
    pub accountants: Arc<dyn ResourceService<Accountant>>,
    pub clients: Arc<dyn ResourceService<ClientAccount>>,
    pub folders: Arc<dyn ResourceService<Folder>>,
}

/// One dashboard card: how many records a collection holds.
#[derive(Debug, Clone, PartialEq)]
pub struct OverviewCard {
    pub collection: &'static str,
    pub count: PortResult<usize>,
}

pub struct Console {
    sessions: Arc<dyn SessionProvider>,
    auth: Arc<dyn AuthService>,
    services: Services,
    shell: NavShell,
    session_cleared: Arc<AtomicBool>,
}

impl Console {
    pub fn new(
        sessions: Arc<dyn SessionProvider>,
        auth: Arc<dyn AuthService>,
        services: Services,
        menu: NavMenu,
    ) -> Self {
        let session_cleared = Arc::new(AtomicBool::new(false));
        let flag = session_cleared.clone();
        sessions.on_session_cleared(Box::new(move || flag.store(true, Ordering::SeqCst)));

        Self {
            sessions,
            auth,
            services,
            shell: NavShell::new(menu),
            session_cleared,
        }
    }

    /// Builds the console against the remote API named in `config`.
    pub fn from_config(config: &Config) -> Result<Self, ConsoleError> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        let services = Services {
            accountants: Arc::new(HttpResourceClient::<Accountant>::new(client.clone(), &config.api_root)?),
            clients: Arc::new(HttpResourceClient::<ClientAccount>::new(client.clone(), &config.api_root)?),
            folders: Arc::new(HttpResourceClient::<Folder>::new(client.clone(), &config.api_root)?),
        };
        let auth = Arc::new(HttpAuthClient::new(client, &config.api_root)?);
        info!("Console configured against {}", config.api_root);
        Ok(Self::new(
            Arc::new(SessionStore::new()),
            auth,
            services,
            NavMenu::standard(),
        ))
    }

    pub fn sessions(&self) -> &Arc<dyn SessionProvider> {
        &self.sessions
    }

    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Follows a session that was cleared elsewhere (credential expiry) to the
    /// login page.
    fn sync(&mut self) {
        if self.session_cleared.swap(false, Ordering::SeqCst) {
            info!("Session cleared; returning to {}", Route::LOGIN);
            let mut ended = self.sessions.take();
            match ended.as_mut() {
                Some(session) => self.shell.logout(session),
                None => self.shell.return_to_login(),
            }
        }
    }

    //=====================================================================================
    // Login / Logout
    //=====================================================================================

    /// Logs in, first logging out any session still held so its credential is
    /// revoked rather than overwritten.
    pub async fn login(&mut self, email: &str, password: &str) -> PortResult<Access> {
        if self.sessions.current().is_some() {
            info!("Replacing the current session; logging out first");
            self.logout().await;
        }
        let session = self.auth.login(email, password).await?;
        info!("Logged in as {} ({})", session.email(), session.role());
        self.sessions.establish(session.clone());
        self.session_cleared.store(false, Ordering::SeqCst);
        Ok(self.shell.enter(&session, Route::DASHBOARD))
    }

    /// Revokes the credential remotely when possible, then ends the session and
    /// returns to the login page regardless.
    pub async fn logout(&mut self) {
        if let Some(session) = self.sessions.current() {
            if let Err(e) = self.auth.logout(&session).await {
                warn!("Remote logout failed: {}", e);
            }
        }
        let mut taken = self.sessions.take();
        self.session_cleared.store(false, Ordering::SeqCst);
        match taken.as_mut() {
            Some(session) => self.shell.logout(session),
            None => self.shell.return_to_login(),
        }
    }

    //=====================================================================================
    // Navigation
    //=====================================================================================

    pub fn screen(&mut self) -> &Screen {
        self.sync();
        self.shell.screen()
    }

    pub fn menu(&mut self) -> Vec<MenuItem> {
        self.sync();
        match self.sessions.current() {
            Some(session) => self.shell.menu(&session),
            None => Vec::new(),
        }
    }

    pub fn toggle_section(&mut self, label: &'static str) -> SectionState {
        self.shell.toggle_section(label)
    }

    /// Without a session only the login page is reachable.
    pub fn navigate(&mut self, route: impl Into<Route>) -> Access {
        self.sync();
        match self.sessions.current() {
            Some(session) => self.shell.navigate(&session, route),
            None => {
                self.shell.return_to_login();
                Access::LoginRequired
            }
        }
    }

    pub fn go_back(&mut self) -> bool {
        self.shell.go_back()
    }

    //=====================================================================================
    // Views
    //=====================================================================================

    pub fn accountant_table(&self) -> RecordTable<Accountant> {
        RecordTable::new(self.services.accountants.clone(), self.sessions.clone())
    }

    pub fn client_table(&self) -> RecordTable<ClientAccount> {
        RecordTable::new(self.services.clients.clone(), self.sessions.clone())
    }

    pub fn folder_table(&self) -> RecordTable<Folder> {
        RecordTable::new(self.services.folders.clone(), self.sessions.clone())
    }

    /// Counts every collection the session may open, all at once. Cards fail
    /// independently; an authorization failure on any of them ends the session.
    pub async fn load_overview(&mut self) -> Vec<OverviewCard> {
        let Some(session) = self.sessions.current() else {
            return Vec::new();
        };
        let menu = self.shell.config();
        let allowed = |route: &str| can_access(&session, menu.required_for(&Route::from(route)));

        let mut pending: Vec<BoxFuture<'_, OverviewCard>> = Vec::new();
        if allowed(ACCOUNTANTS_ROUTE) {
            pending.push(count(self.services.accountants.as_ref(), &session).boxed());
        }
        if allowed(CLIENTS_ROUTE) {
            pending.push(count(self.services.clients.as_ref(), &session).boxed());
        }
        if allowed(FOLDERS_ROUTE) {
            pending.push(count(self.services.folders.as_ref(), &session).boxed());
        }
        let cards = join_all(pending).await;

        if cards
            .iter()
            .any(|card| matches!(&card.count, Err(e) if e.is_unauthorized()))
        {
            self.sessions.clear();
            self.sync();
        }
        cards
    }
}

async fn count<R: Resource>(service: &dyn ResourceService<R>, session: &Session) -> OverviewCard {
    OverviewCard {
        collection: R::COLLECTION,
        count: service.list(session).await.map(|rows| rows.len()),
    }
}
