//! Shared fixtures: a stub API on an ephemeral port and seeded accounts.

#![allow(dead_code)]

use console_lib::adapters::HttpAuthClient;
use console_lib::config::{parse_api_root, Config};
use console_lib::stub::{self, StubState};
use console_lib::Console;
use ledgerdesk_core::domain::{Role, Session};
use ledgerdesk_core::ports::AuthService;
use reqwest::Url;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub const ADMIN: (&str, &str) = ("admin@firm.test", "admin-pass");
pub const INTERNAL: (&str, &str) = ("ia@firm.test", "ia-pass");
pub const EXTERNAL: (&str, &str) = ("ea@firm.test", "ea-pass");
pub const CLIENT: (&str, &str) = ("client@firm.test", "client-pass");

pub struct StubServer {
    pub state: Arc<StubState>,
    pub api_root: Url,
    shutdown: CancellationToken,
}

impl Drop for StubServer {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl StubServer {
    /// Starts a stub with one account per role.
    pub async fn start() -> Self {
        let state = StubState::new()
            .with_user(ADMIN.0, ADMIN.1, Role::Admin)
            .and_then(|s| s.with_user(INTERNAL.0, INTERNAL.1, Role::InternalAccountant))
            .and_then(|s| s.with_user(EXTERNAL.0, EXTERNAL.1, Role::ExternalAccountant))
            .and_then(|s| s.with_user(CLIENT.0, CLIENT.1, Role::Client))
            .expect("seed accounts");
        Self::start_with(state).await
    }

    pub async fn start_with(state: StubState) -> Self {
        let state = Arc::new(state);
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("local addr");
        let shutdown = CancellationToken::new();
        tokio::spawn(stub::serve(
            listener,
            stub::router(state.clone()),
            shutdown.clone(),
        ));
        Self {
            state,
            api_root: parse_api_root(&format!("http://{}", addr)).expect("api root"),
            shutdown,
        }
    }

    pub fn config(&self) -> Config {
        let root = self.api_root.to_string();
        Config::from_lookup(|name| match name {
            "API_ROOT" => Some(root.clone()),
            "REQUEST_TIMEOUT_SECS" => Some("5".to_string()),
            _ => None,
        })
        .expect("config")
    }

    pub fn console(&self) -> Console {
        Console::from_config(&self.config()).expect("console")
    }

    pub async fn login(&self, account: (&str, &str)) -> Session {
        HttpAuthClient::new(reqwest::Client::new(), &self.api_root)
            .expect("auth client")
            .login(account.0, account.1)
            .await
            .expect("login")
    }

    /// Stores a record directly, bypassing the API.
    pub async fn seed(&self, collection: &str, fields: Value) -> Uuid {
        let fields = fields.as_object().cloned().expect("object");
        self.state
            .insert(collection, fields)
            .await
            .expect("known collection")
    }

    pub async fn seed_accountant(&self, name: &str, email: &str, status: &str) -> Uuid {
        self.seed(
            "accountants/internal",
            json!({ "name": name, "email": email, "status": status }),
        )
        .await
    }

    pub async fn seed_folder(&self, name: &str) -> Uuid {
        self.seed("folders", json!({ "name": name, "favorite": false, "archived": false }))
            .await
    }

    pub async fn hits(&self, method: &str, path: &str) -> usize {
        self.state
            .count_requests(&format!("{} {}", method, path))
            .await
    }
}
