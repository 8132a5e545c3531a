//! HTTP surface for the listings service.
//!
//! - `POST /startup` – Create a listing from a JSON body; the server stamps `createdAtMillis`.
//! - `GET /startup?id=` – Fetch one listing.
//! - `PUT /startup?id=` – Replace a listing wholesale with the JSON body.
//! - `DELETE /startup?id=` – Remove a listing.
//! - `GET /startups` – Every stored listing as a JSON array; any method lists.
//! - `GET /health` – Store reachability.
//! - `GET /commands` – Machine-readable route catalog.
//!
//! Any other method on `/startup` answers `405 Method not allowed`. When `id` is repeated in
//! the query string only the first occurrence counts.

use crate::listing::{Listing, ListingDraft, ListingId, current_time_millis};
use crate::store::{ListingStore, StoreError};
use axum::{
    Json, Router,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, get},
};
use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

/// Build the HTTP router over the given store.
pub fn create_router<S>(store: Arc<S>) -> Router
where
    S: ListingStore + 'static,
{
    Router::new()
        .route(
            "/startup",
            get(get_listing::<S>)
                .post(create_listing::<S>)
                .put(update_listing::<S>)
                .delete(delete_listing::<S>)
                .head(method_not_allowed)
                .fallback(method_not_allowed),
        )
        .route("/startups", any(list_listings::<S>))
        .route("/health", get(health::<S>))
        .route("/commands", get(get_commands))
        .with_state(store)
}

/// Raw query pairs; kept as a list so repeated keys never fail extraction.
type QueryPairs = Query<Vec<(String, String)>>;

/// Identifier from the first `id` pair in the query string.
fn listing_id(pairs: &[(String, String)]) -> Result<ListingId, ApiError> {
    let raw = pairs
        .iter()
        .find(|(key, _)| key == "id")
        .map(|(_, value)| value.as_str())
        .filter(|value| !value.is_empty())
        .ok_or(ApiError::MissingId)?;
    ListingId::parse(raw).map_err(|_| ApiError::InvalidId)
}

#[derive(Serialize)]
struct CreatedResponse {
    message: &'static str,
    id: ListingId,
}

#[derive(Serialize)]
struct UpdatedResponse {
    message: &'static str,
    #[serde(rename = "modifiedCount")]
    modified_count: u64,
}

#[derive(Serialize)]
struct DeletedResponse {
    message: &'static str,
}

fn decode_draft(body: &[u8]) -> Result<ListingDraft, ApiError> {
    serde_json::from_slice(body).map_err(|err| ApiError::MalformedBody(err.to_string()))
}

async fn create_listing<S>(
    State(store): State<Arc<S>>,
    body: Bytes,
) -> Result<Json<CreatedResponse>, ApiError>
where
    S: ListingStore,
{
    let document = decode_draft(&body)?.stamped(current_time_millis());
    let created_at_millis = document.created_at_millis;
    let id = store.insert(document).await?;
    tracing::info!(%id, created_at_millis, "Listing created");
    Ok(Json(CreatedResponse {
        message: "Startup created successfully",
        id,
    }))
}

async fn get_listing<S>(
    State(store): State<Arc<S>>,
    Query(pairs): QueryPairs,
) -> Result<Json<Listing>, ApiError>
where
    S: ListingStore,
{
    let id = listing_id(&pairs)?;
    Ok(Json(store.find_by_id(&id).await?))
}

/// Replace the stored document with the request body; omitted fields are cleared.
async fn update_listing<S>(
    State(store): State<Arc<S>>,
    Query(pairs): QueryPairs,
    body: Bytes,
) -> Result<Json<UpdatedResponse>, ApiError>
where
    S: ListingStore,
{
    let id = listing_id(&pairs)?;
    let document = decode_draft(&body)?.into_replacement();
    let summary = store.replace_by_id(&id, document).await?;
    if summary.matched == 0 {
        return Err(ApiError::NotFound);
    }
    tracing::info!(%id, modified = summary.modified, "Listing replaced");
    Ok(Json(UpdatedResponse {
        message: "Startup updated successfully",
        modified_count: summary.modified,
    }))
}

async fn delete_listing<S>(
    State(store): State<Arc<S>>,
    Query(pairs): QueryPairs,
) -> Result<Json<DeletedResponse>, ApiError>
where
    S: ListingStore,
{
    let id = listing_id(&pairs)?;
    if store.delete_by_id(&id).await? == 0 {
        return Err(ApiError::NotFound);
    }
    tracing::info!(%id, "Listing deleted");
    Ok(Json(DeletedResponse {
        message: "Startup deleted successfully",
    }))
}

async fn list_listings<S>(State(store): State<Arc<S>>) -> Result<Json<Vec<Listing>>, ApiError>
where
    S: ListingStore,
{
    let listings = store.find_all().await?;
    tracing::debug!(count = listings.len(), "Listings enumerated");
    Ok(Json(listings))
}

async fn health<S>(State(store): State<Arc<S>>) -> Response
where
    S: ListingStore,
{
    match store.ping().await {
        Ok(()) => Json(json!({ "storeReachable": true })).into_response(),
        Err(err) => {
            tracing::warn!(error = %err, "Store health check failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(json!({ "storeReachable": false, "error": err.to_string() })),
            )
                .into_response()
        }
    }
}

async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}

/// Descriptor for a single command in the discovery catalog.
#[derive(Serialize)]
struct CommandDescriptor {
    name: &'static str,
    method: &'static str,
    path: &'static str,
    description: &'static str,
}

/// Response body for `GET /commands`.
#[derive(Serialize)]
struct CommandsResponse {
    commands: Vec<CommandDescriptor>,
}

async fn get_commands() -> Json<CommandsResponse> {
    Json(CommandsResponse {
        commands: vec![
            CommandDescriptor {
                name: "create",
                method: "POST",
                path: "/startup",
                description: "Create a listing from a JSON object. Returns { \"message\", \"id\" }.",
            },
            CommandDescriptor {
                name: "read",
                method: "GET",
                path: "/startup?id=<id>",
                description: "Fetch a listing by its 24-character hex id.",
            },
            CommandDescriptor {
                name: "replace",
                method: "PUT",
                path: "/startup?id=<id>",
                description: "Replace the whole listing with the JSON body. Fields not sent are removed.",
            },
            CommandDescriptor {
                name: "delete",
                method: "DELETE",
                path: "/startup?id=<id>",
                description: "Delete a listing permanently.",
            },
            CommandDescriptor {
                name: "list",
                method: "GET",
                path: "/startups",
                description: "Return every stored listing as a JSON array.",
            },
            CommandDescriptor {
                name: "health",
                method: "GET",
                path: "/health",
                description: "Report whether the document store is reachable.",
            },
        ],
    })
}

/// Failures rendered as plain-text HTTP responses.
#[derive(Debug)]
enum ApiError {
    MissingId,
    InvalidId,
    MalformedBody(String),
    NotFound,
    MethodNotAllowed,
    Backend(StoreError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::MissingId => {
                (StatusCode::BAD_REQUEST, "ID parameter is required").into_response()
            }
            Self::InvalidId => (StatusCode::BAD_REQUEST, "Invalid ID format").into_response(),
            Self::MalformedBody(message) => (StatusCode::BAD_REQUEST, message).into_response(),
            Self::NotFound => (StatusCode::NOT_FOUND, "Startup not found").into_response(),
            Self::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method not allowed").into_response()
            }
            Self::Backend(err) => {
                tracing::error!(error = %err, "Store operation failed");
                (StatusCode::INTERNAL_SERVER_ERROR, err.to_string()).into_response()
            }
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(inner: StoreError) -> Self {
        if inner.is_transport() {
            Self::Backend(inner)
        } else {
            Self::NotFound
        }
    }
}
