//! Serve command - runs the PhoneBook HTTP API.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{FromRequestParts, Path, Query, State},
    http::{HeaderName, StatusCode, request::Parts},
    response::{IntoResponse, Response},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tokio::signal::unix::{SignalKind, signal};

use phonebook::{
    Contact, ContactDraft, Directory, OwnerId, Page, PageRequest,
    backend::database::{DbKind, InMemory, SqlxBackend},
};

use crate::backend::{backend_label, create_backend, inmemory_path};
use crate::cli::ServeArgs;

/// Shared application state
#[derive(Clone)]
pub(crate) struct AppState {
    directory: Arc<Directory>,
    owner_header: HeaderName,
}

impl AppState {
    pub(crate) fn new(directory: Arc<Directory>, owner_header: HeaderName) -> Self {
        Self {
            directory,
            owner_header,
        }
    }
}

/// Run the PhoneBook server
pub async fn run(args: &ServeArgs) -> Result<(), Box<dyn std::error::Error>> {
    // Configuration is checked before any storage is touched.
    let config = args.directory.to_config();
    config.validate()?;
    let owner_header = HeaderName::try_from(args.owner_header.as_str())?;

    let backend = create_backend(&args.backend_config).await?;
    let directory = Arc::new(Directory::new(backend, &config)?);
    tracing::info!(
        backend = %backend_label(&args.backend_config),
        limit_min = config.limit.min,
        limit_max = config.limit.max,
        scheme = ?config.cursor.scheme,
        "Directory ready"
    );

    let app = router(AppState::new(directory.clone(), owner_header));

    let addr = format!("{}:{}", args.host, args.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    let local_addr = listener.local_addr()?;

    println!("PhoneBook server listening on http://{local_addr}");
    println!();
    println!("Available endpoints:");
    println!("  GET    /health                 - Health check");
    println!("  GET    /api/v1/contacts        - List contacts (limit, cursor, search)");
    println!("  POST   /api/v1/contacts        - Create a contact");
    println!("  GET    /api/v1/contacts/{{id}}   - Get a contact");
    println!("  PUT    /api/v1/contacts/{{id}}   - Replace a contact");
    println!("  DELETE /api/v1/contacts/{{id}}   - Delete a contact");
    println!();
    println!("Owner identity header: {}", args.owner_header);
    println!("Press Ctrl+C to shutdown");

    let json_path = inmemory_path(&args.backend_config);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let mut sigterm = match signal(SignalKind::terminate()) {
                Ok(sigterm) => sigterm,
                Err(e) => {
                    tracing::error!("Failed to set up SIGTERM handler: {e}");
                    return;
                }
            };

            tokio::select! {
                _ = sigterm.recv() => tracing::info!("Received SIGTERM, initiating graceful shutdown..."),
                _ = tokio::signal::ctrl_c() => tracing::info!("Received SIGINT, initiating graceful shutdown..."),
            }

            // Save contacts on shutdown (only needed for InMemory backend)
            if let Some(in_memory_backend) = directory.backend().as_any().downcast_ref::<InMemory>()
            {
                match in_memory_backend.save_to_file(&json_path).await {
                    Ok(()) => println!("\nContacts saved to {}", json_path.display()),
                    Err(e) => {
                        tracing::error!("Failed to save contacts: {e:?}");
                        eprintln!("Failed to save contacts: {e}");
                    }
                }
            }
        })
        .await?;

    println!("Server shut down");
    Ok(())
}

/// Build the HTTP router over the given state.
pub(crate) fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(handle_health))
        .route(
            "/api/v1/contacts",
            get(handle_list_contacts).post(handle_create_contact),
        )
        .route(
            "/api/v1/contacts/{id}",
            get(handle_get_contact)
                .put(handle_update_contact)
                .delete(handle_delete_contact),
        )
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// An error response with a JSON `{"error": ...}` body.
#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    fn unauthorized() -> Self {
        Self {
            status: StatusCode::UNAUTHORIZED,
            message: "Missing or invalid owner identity".to_string(),
        }
    }
}

impl From<phonebook::Error> for ApiError {
    fn from(err: phonebook::Error) -> Self {
        let status = if err.is_client_error() {
            StatusCode::BAD_REQUEST
        } else if err.is_not_found() {
            StatusCode::NOT_FOUND
        } else if err.is_timeout() {
            StatusCode::GATEWAY_TIMEOUT
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };

        if status.is_server_error() {
            // Storage details stay in the logs.
            tracing::error!(module = err.module(), "Request failed: {err}");
            let message = if status == StatusCode::GATEWAY_TIMEOUT {
                "Storage did not respond in time"
            } else {
                "Internal storage error"
            };
            return Self {
                status,
                message: message.to_string(),
            };
        }

        Self {
            status,
            message: err.to_string(),
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (
            self.status,
            Json(ErrorBody {
                error: self.message,
            }),
        )
            .into_response()
    }
}

// ============================================================================
// Extractors
// ============================================================================

/// Authenticated owner, read from the gateway-injected identity header.
pub(crate) struct Owner(OwnerId);

impl FromRequestParts<AppState> for Owner {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        parts
            .headers
            .get(&state.owner_header)
            .and_then(|value| value.to_str().ok())
            .and_then(parse_owner)
            .map(Owner)
            .ok_or_else(ApiError::unauthorized)
    }
}

/// Parse an owner id header value. Zero and values beyond the signed 64-bit
/// range storage uses are never valid owners.
fn parse_owner(value: &str) -> Option<OwnerId> {
    value
        .trim()
        .parse::<OwnerId>()
        .ok()
        .filter(|id| *id != 0 && *id <= i64::MAX as u64)
}

fn parse_contact_id(raw: &str) -> Result<u64, ApiError> {
    raw.parse::<u64>()
        .ok()
        .filter(|id| *id != 0)
        .ok_or_else(|| ApiError::bad_request(format!("Invalid contact id: {raw}")))
}

// ============================================================================
// Handlers
// ============================================================================

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    backend: &'static str,
}

/// Handler for GET /health
async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    let backend = state.directory.backend();
    let backend_type = if let Some(sqlx) = backend.as_any().downcast_ref::<SqlxBackend>() {
        match sqlx.kind() {
            DbKind::Sqlite => "sqlite",
            DbKind::Postgres => "postgres",
        }
    } else if backend.as_any().is::<InMemory>() {
        "inmemory"
    } else {
        "unknown"
    };

    Json(HealthResponse {
        status: "healthy",
        backend: backend_type,
    })
}

/// Query string of GET /api/v1/contacts
#[derive(Debug, Default, Deserialize)]
struct ListQuery {
    limit: Option<String>,
    cursor: Option<String>,
    search: Option<String>,
}

/// Handler for GET /api/v1/contacts
async fn handle_list_contacts(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Query(query): Query<ListQuery>,
) -> Result<Json<Page>, ApiError> {
    let limit = match query.limit.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(
            raw.parse::<i64>()
                .map_err(|_| ApiError::bad_request(format!("Invalid limit: {raw}")))?,
        ),
    };

    let request = PageRequest {
        owner_id,
        cursor: query.cursor,
        search: query.search,
        limit,
    };
    Ok(Json(state.directory.list_contacts(&request).await?))
}

/// Handler for POST /api/v1/contacts
async fn handle_create_contact(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Json(draft): Json<ContactDraft>,
) -> Result<(StatusCode, Json<Contact>), ApiError> {
    let contact = state.directory.create_contact(owner_id, draft).await?;
    Ok((StatusCode::CREATED, Json(contact)))
}

/// Handler for GET /api/v1/contacts/{id}
async fn handle_get_contact(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
) -> Result<Json<Contact>, ApiError> {
    let contact_id = parse_contact_id(&id)?;
    Ok(Json(
        state.directory.get_contact(owner_id, contact_id).await?,
    ))
}

/// Handler for PUT /api/v1/contacts/{id}
async fn handle_update_contact(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
    Json(draft): Json<ContactDraft>,
) -> Result<Json<Contact>, ApiError> {
    let contact_id = parse_contact_id(&id)?;
    Ok(Json(
        state
            .directory
            .update_contact(owner_id, contact_id, draft)
            .await?,
    ))
}

/// Handler for DELETE /api/v1/contacts/{id}
async fn handle_delete_contact(
    State(state): State<AppState>,
    Owner(owner_id): Owner,
    Path(id): Path<String>,
) -> Result<StatusCode, ApiError> {
    let contact_id = parse_contact_id(&id)?;
    state.directory.delete_contact(owner_id, contact_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
