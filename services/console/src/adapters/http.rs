//! services/console/src/adapters/http.rs
//!
//! This module contains the adapters that talk to the remote API over HTTP.
//! `HttpResourceClient` implements the `ResourceService` port for any collection,
//! `HttpAuthClient` implements the `AuthService` port.

use crate::adapters::records::WireResource;
use crate::config::ConfigError;
use async_trait::async_trait;
use ledgerdesk_core::domain::{ActivationState, Role, Session};
use ledgerdesk_core::ports::{AuthService, PortError, PortResult, ResourceService};
use reqwest::{Client, RequestBuilder, Response, StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::marker::PhantomData;
use tracing::{debug, error, warn};
use uuid::Uuid;

//=========================================================================================
// Failure Classification
//=========================================================================================

/// Maps a non-success status onto the port taxonomy.
pub fn classify_status(status: StatusCode, context: &str, body: &str) -> PortError {
    let detail = if body.trim().is_empty() {
        format!("{}: HTTP {}", context, status)
    } else {
        format!("{}: HTTP {}: {}", context, status, body.trim())
    };
    match status.as_u16() {
        401 | 403 => PortError::Unauthorized(detail),
        404 => PortError::NotFound(detail),
        400..=499 => PortError::Validation(detail),
        500..=599 => PortError::Server(detail),
        _ => PortError::Unexpected(detail),
    }
}

/// Maps a transport-level failure onto the port taxonomy.
pub fn classify_transport(err: &reqwest::Error, context: &str) -> PortError {
    if err.is_decode() || err.is_body() {
        PortError::Unexpected(format!("{}: malformed response: {}", context, err))
    } else {
        PortError::Network(format!("{}: {}", context, err))
    }
}

/// The root as a join base: with a trailing slash, so joining keeps its last
/// segment.
fn join_base(api_root: &Url) -> Url {
    let mut base = api_root.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base
}

/// Attaches the session's credential, or refuses before any I/O.
fn authorize(request: RequestBuilder, session: &Session, context: &str) -> PortResult<RequestBuilder> {
    match session.credential() {
        Some(credential) if session.is_active() => Ok(request.bearer_auth(credential)),
        _ => Err(PortError::Unauthorized(format!("{}: no active session", context))),
    }
}

/// Sends the request and turns every non-2xx answer into an error.
async fn send(request: RequestBuilder, context: &str) -> PortResult<Response> {
    let response = request.send().await.map_err(|e| {
        let err = classify_transport(&e, context);
        error!("{}", err);
        err
    })?;

    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    let err = classify_status(status, context, &body);
    warn!("{}", err);
    Err(err)
}

//=========================================================================================
// Resource Collections
//=========================================================================================

/// An adapter that implements the `ResourceService` port for the collection of `R`.
pub struct HttpResourceClient<R> {
    client: Client,
    collection: Url,
    resource: PhantomData<fn() -> R>,
}

impl<R> Clone for HttpResourceClient<R> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            collection: self.collection.clone(),
            resource: PhantomData,
        }
    }
}

impl<R: WireResource> HttpResourceClient<R> {
    /// Creates a client for `R::COLLECTION` below `api_root`.
    pub fn new(client: Client, api_root: &Url) -> Result<Self, ConfigError> {
        let collection = join_base(api_root)
            .join(R::COLLECTION)
            .map_err(|e| ConfigError::InvalidValue("API_ROOT".to_string(), e.to_string()))?;
        if collection.cannot_be_a_base() {
            return Err(ConfigError::InvalidValue(
                "API_ROOT".to_string(),
                format!("'{}' cannot be used as a base URL", api_root),
            ));
        }
        Ok(Self {
            client,
            collection,
            resource: PhantomData,
        })
    }

    pub fn collection_url(&self) -> &Url {
        &self.collection
    }

    fn member_url(&self, id: Uuid, verb: Option<&str>) -> Url {
        let mut url = self.collection.clone();
        // Infallible: `new` rejects cannot-be-a-base URLs.
        if let Ok(mut segments) = url.path_segments_mut() {
            segments.pop_if_empty().push(&id.to_string());
            if let Some(verb) = verb {
                segments.push(verb);
            }
        }
        url
    }

    fn context(op: &str) -> String {
        format!("Failed to {} {}", op, R::COLLECTION)
    }
}

#[async_trait]
impl<R: WireResource> ResourceService<R> for HttpResourceClient<R> {
    async fn list(&self, session: &Session) -> PortResult<Vec<R>> {
        let context = Self::context("list");
        debug!("GET {}", self.collection);
        let request = authorize(self.client.get(self.collection.clone()), session, &context)?;
        let response = send(request, &context).await?;

        // Decode everything or nothing.
        let records = response
            .json::<Vec<R::Record>>()
            .await
            .map_err(|e| classify_transport(&e, &context))?;
        Ok(records.into_iter().map(R::from_record).collect())
    }

    async fn create(&self, draft: &R::Draft, session: &Session) -> PortResult<()> {
        let context = Self::context("create");
        debug!("POST {}", self.collection);
        let request = self
            .client
            .post(self.collection.clone())
            .json(&R::payload(draft));
        send(authorize(request, session, &context)?, &context).await?;
        Ok(())
    }

    async fn update(&self, id: Uuid, draft: &R::Draft, session: &Session) -> PortResult<()> {
        let context = Self::context("update");
        let url = self.member_url(id, None);
        debug!("PUT {}", url);
        let request = self.client.put(url).json(&R::payload(draft));
        send(authorize(request, session, &context)?, &context).await?;
        Ok(())
    }

    async fn toggle_activation(
        &self,
        id: Uuid,
        current: ActivationState,
        session: &Session,
    ) -> PortResult<()> {
        let verb = if current.is_active() {
            "deactivate"
        } else {
            "activate"
        };
        let context = Self::context(verb);
        let url = self.member_url(id, Some(verb));
        debug!("PUT {}", url);
        let request = authorize(self.client.put(url), session, &context)?;
        send(request, &context).await?;
        Ok(())
    }

    async fn delete(&self, id: Uuid, session: &Session) -> PortResult<()> {
        let context = Self::context("delete");
        let url = self.member_url(id, None);
        debug!("DELETE {}", url);
        let request = authorize(self.client.delete(url), session, &context)?;
        send(request, &context).await?;
        Ok(())
    }
}

//=========================================================================================
// Authentication
//=========================================================================================

#[derive(Serialize)]
struct LoginBody<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct LoginReply {
    token: String,
    role: String,
    email: String,
}

/// An adapter that implements the `AuthService` port against `/auth/*`.
#[derive(Clone)]
pub struct HttpAuthClient {
    client: Client,
    login_url: Url,
    logout_url: Url,
}

impl HttpAuthClient {
    pub fn new(client: Client, api_root: &Url) -> Result<Self, ConfigError> {
        let base = join_base(api_root);
        let join = |path: &str| {
            base.join(path)
                .map_err(|e| ConfigError::InvalidValue("API_ROOT".to_string(), e.to_string()))
        };
        Ok(Self {
            client,
            login_url: join("auth/login")?,
            logout_url: join("auth/logout")?,
        })
    }
}

#[async_trait]
impl AuthService for HttpAuthClient {
    async fn login(&self, email: &str, password: &str) -> PortResult<Session> {
        let context = "Failed to log in";
        let request = self
            .client
            .post(self.login_url.clone())
            .json(&LoginBody { email, password });
        let reply = send(request, context)
            .await?
            .json::<LoginReply>()
            .await
            .map_err(|e| classify_transport(&e, context))?;

        let role = reply
            .role
            .parse::<Role>()
            .map_err(|e| PortError::Unexpected(format!("{}: {}", context, e)))?;
        Ok(Session::new(reply.token, role, reply.email))
    }

    async fn logout(&self, session: &Session) -> PortResult<()> {
        let context = "Failed to log out";
        let request = authorize(self.client.post(self.logout_url.clone()), session, context)?;
        send(request, context).await?;
        Ok(())
    }
}
