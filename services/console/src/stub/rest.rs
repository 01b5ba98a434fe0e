//! services/console/src/stub/rest.rs
//!
//! Contains the Axum handlers for the stub's record collections and the master
//! definition for its OpenAPI specification.
//!
//! Every collection is mounted with the same handlers; the `CollectionSpec`
//! extension tells a handler which collection it is serving.

use crate::adapters::records::{
    AccountantPayload, AccountantRecord, ClientPayload, ClientRecord, FolderPayload, FolderRecord,
    StatusRecord,
};
use crate::stub::auth::{LoginRequest, LoginResponse};
use crate::stub::state::{stamp, Caller, CollectionSpec, StoredRecord, StubState};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::Json,
    Extension,
};
use regex::Regex;
use serde_json::Value;
use std::sync::{Arc, OnceLock};
use tracing::{info, warn};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use uuid::Uuid;

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::stub::auth::login_handler,
        crate::stub::auth::logout_handler,
        list_records,
        create_record,
        update_record,
        delete_record,
        activate_record,
        deactivate_record,
    ),
    components(
        schemas(
            LoginRequest,
            LoginResponse,
            StatusRecord,
            AccountantRecord,
            AccountantPayload,
            ClientRecord,
            ClientPayload,
            FolderRecord,
            FolderPayload,
        )
    ),
    modifiers(&BearerAuth),
    tags(
        (name = "Ledgerdesk Stub API", description = "In-memory stand-in for the invoice-management REST API.")
    )
)]
pub struct ApiDoc;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Bearer).build()),
            );
        }
    }
}

//=========================================================================================
// Validation
//=========================================================================================

type HandlerError = (StatusCode, String);

/// Fields only the server writes.
const SERVER_FIELDS: [&str; 3] = ["id", "status", "created_at"];

fn email_pattern() -> Option<&'static Regex> {
    static EMAIL: OnceLock<Option<Regex>> = OnceLock::new();
    EMAIL
        .get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").ok())
        .as_ref()
}

fn is_email(candidate: &str) -> bool {
    email_pattern().is_some_and(|pattern| pattern.is_match(candidate))
}

fn authorize(spec: &CollectionSpec, caller: &Caller) -> Result<(), HandlerError> {
    if spec.allowed.contains(caller.role) {
        Ok(())
    } else {
        warn!("{} ({}) may not access {}", caller.email, caller.role, spec.name);
        Err((
            StatusCode::FORBIDDEN,
            format!("Role {} may not access {}", caller.role, spec.name),
        ))
    }
}

/// Checks a write body and strips the fields the server owns.
fn validate(spec: &CollectionSpec, body: Value) -> Result<StoredRecord, HandlerError> {
    let rejected = |message: String| (StatusCode::UNPROCESSABLE_ENTITY, message);

    let Value::Object(mut fields) = body else {
        return Err(rejected("Body must be a JSON object".to_string()));
    };
    for field in spec.required {
        match fields.get(*field).and_then(Value::as_str) {
            Some(value) if !value.trim().is_empty() => {}
            _ => return Err(rejected(format!("{} is required", field))),
        }
    }
    if let Some(email) = fields.get("email") {
        match email.as_str() {
            Some(email) if is_email(email) => {}
            _ => return Err(rejected("email is not a valid address".to_string())),
        }
    }
    for key in SERVER_FIELDS {
        fields.remove(key);
    }
    Ok(fields)
}

fn not_found(spec: &CollectionSpec, id: Uuid) -> HandlerError {
    (
        StatusCode::NOT_FOUND,
        format!("No record {} in {}", id, spec.name),
    )
}

fn has_id(record: &StoredRecord, id: &str) -> bool {
    record.get("id").and_then(Value::as_str) == Some(id)
}

/// Runs `edit` on the record with `id`, returning the edited copy.
async fn edit_record(
    state: &StubState,
    spec: &CollectionSpec,
    id: Uuid,
    edit: impl FnOnce(&mut StoredRecord),
) -> Result<StoredRecord, HandlerError> {
    let key = id.to_string();
    state
        .with_collection(spec.name, |records| {
            records.iter_mut().find(|record| has_id(record, &key)).map(|record| {
                edit(record);
                record.clone()
            })
        })
        .await
        .flatten()
        .ok_or_else(|| not_found(spec, id))
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List every record in a collection.
#[utoipa::path(
    get,
    path = "/{collection}",
    params(
        ("collection" = String, Path, description = "accountants/internal, clients or folders")
    ),
    responses(
        (status = 200, description = "All records; accountants shown", body = [AccountantRecord]),
        (status = 401, description = "Missing or unknown token"),
        (status = 403, description = "Role may not access the collection")
    ),
    security(("bearer" = []))
)]
pub async fn list_records(
    State(state): State<Arc<StubState>>,
    Extension(spec): Extension<CollectionSpec>,
    Extension(caller): Extension<Caller>,
) -> Result<Json<Vec<StoredRecord>>, HandlerError> {
    authorize(&spec, &caller)?;
    Ok(Json(state.records(spec.name).await))
}

/// Create a record. New records start active.
#[utoipa::path(
    post,
    path = "/{collection}",
    params(
        ("collection" = String, Path, description = "accountants/internal, clients or folders")
    ),
    request_body(content = AccountantPayload, description = "The collection's writable fields; accountants shown."),
    responses(
        (status = 201, description = "Record created", body = AccountantRecord),
        (status = 401, description = "Missing or unknown token"),
        (status = 403, description = "Role may not access the collection"),
        (status = 422, description = "A required field is empty or the email is malformed")
    ),
    security(("bearer" = []))
)]
pub async fn create_record(
    State(state): State<Arc<StubState>>,
    Extension(spec): Extension<CollectionSpec>,
    Extension(caller): Extension<Caller>,
    Json(body): Json<Value>,
) -> Result<(StatusCode, Json<StoredRecord>), HandlerError> {
    authorize(&spec, &caller)?;
    let fields = validate(&spec, body)?;

    let (id, record) = stamp(fields);
    state
        .with_collection(spec.name, |records| records.push(record.clone()))
        .await
        .ok_or_else(|| not_found(&spec, id))?;
    info!("{} created {} in {}", caller.email, id, spec.name);

    Ok((StatusCode::CREATED, Json(record)))
}

/// Replace a record's writable fields.
#[utoipa::path(
    put,
    path = "/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "accountants/internal, clients or folders"),
        ("id" = Uuid, Path, description = "The record's id")
    ),
    request_body(content = AccountantPayload, description = "The collection's writable fields; accountants shown."),
    responses(
        (status = 200, description = "Record updated", body = AccountantRecord),
        (status = 401, description = "Missing or unknown token"),
        (status = 403, description = "Role may not access the collection"),
        (status = 404, description = "No such record"),
        (status = 422, description = "A required field is empty or the email is malformed")
    ),
    security(("bearer" = []))
)]
pub async fn update_record(
    State(state): State<Arc<StubState>>,
    Extension(spec): Extension<CollectionSpec>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> Result<Json<StoredRecord>, HandlerError> {
    authorize(&spec, &caller)?;
    let fields = validate(&spec, body)?;

    let record = edit_record(&state, &spec, id, move |record| {
        record.retain(|key, _| SERVER_FIELDS.contains(&key.as_str()));
        record.extend(fields);
    })
    .await?;
    Ok(Json(record))
}

/// Delete a record.
#[utoipa::path(
    delete,
    path = "/{collection}/{id}",
    params(
        ("collection" = String, Path, description = "accountants/internal, clients or folders"),
        ("id" = Uuid, Path, description = "The record's id")
    ),
    responses(
        (status = 204, description = "Record deleted"),
        (status = 401, description = "Missing or unknown token"),
        (status = 403, description = "Role may not access the collection"),
        (status = 404, description = "No such record")
    ),
    security(("bearer" = []))
)]
pub async fn delete_record(
    State(state): State<Arc<StubState>>,
    Extension(spec): Extension<CollectionSpec>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, HandlerError> {
    authorize(&spec, &caller)?;
    let key = id.to_string();
    let removed = state
        .with_collection(spec.name, |records| {
            let before = records.len();
            records.retain(|record| !has_id(record, &key));
            records.len() < before
        })
        .await
        .unwrap_or(false);

    if !removed {
        return Err(not_found(&spec, id));
    }
    info!("{} deleted {} from {}", caller.email, id, spec.name);
    Ok(StatusCode::NO_CONTENT)
}

/// Mark a record active.
#[utoipa::path(
    put,
    path = "/{collection}/{id}/activate",
    params(
        ("collection" = String, Path, description = "accountants/internal, clients or folders"),
        ("id" = Uuid, Path, description = "The record's id")
    ),
    responses(
        (status = 200, description = "Record is active", body = AccountantRecord),
        (status = 401, description = "Missing or unknown token"),
        (status = 403, description = "Role may not access the collection"),
        (status = 404, description = "No such record")
    ),
    security(("bearer" = []))
)]
pub async fn activate_record(
    State(state): State<Arc<StubState>>,
    Extension(spec): Extension<CollectionSpec>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredRecord>, HandlerError> {
    set_status(&state, &spec, &caller, id, StatusRecord::Active).await
}

/// Mark a record inactive.
#[utoipa::path(
    put,
    path = "/{collection}/{id}/deactivate",
    params(
        ("collection" = String, Path, description = "accountants/internal, clients or folders"),
        ("id" = Uuid, Path, description = "The record's id")
    ),
    responses(
        (status = 200, description = "Record is inactive", body = AccountantRecord),
        (status = 401, description = "Missing or unknown token"),
        (status = 403, description = "Role may not access the collection"),
        (status = 404, description = "No such record")
    ),
    security(("bearer" = []))
)]
pub async fn deactivate_record(
    State(state): State<Arc<StubState>>,
    Extension(spec): Extension<CollectionSpec>,
    Extension(caller): Extension<Caller>,
    Path(id): Path<Uuid>,
) -> Result<Json<StoredRecord>, HandlerError> {
    set_status(&state, &spec, &caller, id, StatusRecord::Inactive).await
}

async fn set_status(
    state: &StubState,
    spec: &CollectionSpec,
    caller: &Caller,
    id: Uuid,
    status: StatusRecord,
) -> Result<Json<StoredRecord>, HandlerError> {
    authorize(spec, caller)?;
    let value = serde_json::to_value(status).map_err(|e| {
        (StatusCode::INTERNAL_SERVER_ERROR, format!("Failed to encode status: {}", e))
    })?;
    let record = edit_record(state, spec, id, move |record| {
        record.insert("status".to_string(), value);
    })
    .await?;
    Ok(Json(record))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stub::state::COLLECTIONS;
    use ledgerdesk_core::domain::Role;
    use serde_json::json;

    fn folders() -> CollectionSpec {
        COLLECTIONS[2]
    }

    fn accountants() -> CollectionSpec {
        COLLECTIONS[0]
    }

    #[test]
    fn writes_need_their_required_fields() {
        let err = validate(&folders(), json!({ "name": "  " })).unwrap_err();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);

        let err = validate(&accountants(), json!({ "name": "Ada" })).unwrap_err();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);

        let err = validate(&accountants(), json!({ "name": "Ada", "email": "not-an-email" })).unwrap_err();
        assert_eq!(err.1, "email is not a valid address");

        let err = validate(&folders(), json!(["name"])).unwrap_err();
        assert_eq!(err.0, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn email_shapes() {
        assert!(email_pattern().is_some());
        assert!(is_email("ada@firm.test"));
        assert!(!is_email("ada@firm"));
        assert!(!is_email("ada firm@x.test"));
    }

    #[test]
    fn server_fields_are_stripped_from_writes() {
        let fields = validate(
            &folders(),
            json!({ "name": "Receipts", "id": "x", "status": "inactive", "created_at": "now" }),
        )
        .unwrap();
        assert_eq!(fields.len(), 1);
        assert_eq!(fields["name"], json!("Receipts"));
    }

    #[test]
    fn only_listed_roles_reach_a_collection() {
        let caller = |role| Caller {
            email: "x@firm.test".to_string(),
            role,
        };
        assert!(authorize(&accountants(), &caller(Role::Admin)).is_ok());
        let err = authorize(&accountants(), &caller(Role::InternalAccountant)).unwrap_err();
        assert_eq!(err.0, StatusCode::FORBIDDEN);
        assert!(authorize(&folders(), &caller(Role::Client)).is_ok());
    }

    #[test]
    fn the_document_lists_every_collection_operation() {
        let doc = ApiDoc::openapi();
        assert!(doc.paths.paths.contains_key("/{collection}"));
        assert!(doc.paths.paths.contains_key("/{collection}/{id}/deactivate"));
        assert!(doc.paths.paths.contains_key("/auth/login"));
    }
}
