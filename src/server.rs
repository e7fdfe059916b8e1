//! JSON HTTP API for documents, meetings, chat, and search.
//!
//! # Endpoints
//!
//! | Method   | Path | Description |
//! |----------|------|-------------|
//! | `GET`    | `/health` | Health check (version and available providers) |
//! | `POST`   | `/documents` | Upload a document |
//! | `GET`    | `/documents` | List documents (category/tag filters) |
//! | `GET`    | `/documents/{id}` | Fetch a document |
//! | `PUT`    | `/documents/{id}` | Partial-field update |
//! | `DELETE` | `/documents/{id}` | Delete a document |
//! | `POST`   | `/meetings` | Upload a transcript; summarize and store |
//! | `GET`    | `/meetings` | List meetings (tag/participant filters) |
//! | `GET`    | `/meetings/{id}` | Fetch a meeting |
//! | `PUT`    | `/meetings/{id}` | Re-summarize from a new transcript |
//! | `DELETE` | `/meetings/{id}` | Delete a meeting |
//! | `POST`   | `/chat/ask` | Answer a question over stored records |
//! | `GET`    | `/chat/providers` | List available answer providers |
//! | `GET`    | `/search` | Keyword search over recent meetings |
//!
//! # Error Contract
//!
//! All error responses share one schema:
//!
//! ```json
//! { "error": { "code": "bad_request", "message": "question must not be empty" } }
//! ```
//!
//! Error codes: `bad_request` (400), `not_found` (404),
//! `configuration` (503, no provider can serve the request),
//! `internal` (500).
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted to support
//! browser-based clients.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

use crate::chat::Chatbot;
use crate::config::Config;
use crate::db;
use crate::models::{ChatQuery, ChatResponse, Document, DocumentUpdate, MeetingSummary};
use crate::provider::ProviderRegistry;
use crate::search;
use crate::store::sqlite::SqliteStore;
use crate::store::{DocumentFilter, MeetingFilter, Store};
use crate::summary::{self, MeetingMeta};

/// Shared application state passed to all route handlers.
#[derive(Clone)]
struct AppState {
    config: Arc<Config>,
    store: Arc<dyn Store>,
    providers: Arc<ProviderRegistry>,
    chatbot: Arc<Chatbot>,
}

/// Starts the HTTP server on the address configured in `[server].bind`.
/// Runs until the process is terminated.
pub async fn run_server(config: &Config) -> anyhow::Result<()> {
    let bind_addr = config.server.bind.clone();
    let config = Arc::new(config.clone());

    let pool = db::connect(&config).await?;
    let store: Arc<dyn Store> = Arc::new(SqliteStore::new(pool));
    let providers = Arc::new(ProviderRegistry::from_env(&config.providers));
    let chatbot = Arc::new(Chatbot::new(
        store.clone(),
        providers.clone(),
        config.retrieval.clone(),
    ));

    let state = AppState {
        config,
        store,
        providers,
        chatbot,
    };

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(handle_health))
        .route("/documents", post(handle_create_document).get(handle_list_documents))
        .route(
            "/documents/{id}",
            get(handle_get_document)
                .put(handle_update_document)
                .delete(handle_delete_document),
        )
        .route("/meetings", post(handle_create_meeting).get(handle_list_meetings))
        .route(
            "/meetings/{id}",
            get(handle_get_meeting)
                .put(handle_update_meeting)
                .delete(handle_delete_meeting),
        )
        .route("/chat/ask", post(handle_chat_ask))
        .route("/chat/providers", get(handle_chat_providers))
        .route("/search", get(handle_search))
        .layer(cors)
        .with_state(state);

    info!("server listening on http://{}", bind_addr);
    println!("Meetwise server listening on http://{}", bind_addr);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============ Error response ============

#[derive(Serialize)]
struct ErrorBody {
    error: ErrorDetail,
}

#[derive(Serialize)]
struct ErrorDetail {
    code: String,
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    code: String,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: self.message,
            },
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        code: "bad_request".to_string(),
        message: message.into(),
    }
}

fn not_found(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        code: "not_found".to_string(),
        message: message.into(),
    }
}

fn configuration_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::SERVICE_UNAVAILABLE,
        code: "configuration".to_string(),
        message: message.into(),
    }
}

fn internal_error(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        code: "internal".to_string(),
        message: message.into(),
    }
}

/// Maps `anyhow` errors from the chat/summary layers to HTTP errors.
/// Missing providers are a deployment problem, not a server bug, so
/// they get their own code.
fn classify_error(err: anyhow::Error) -> AppError {
    let msg = format!("{:#}", err);
    if msg.contains("No AI providers") {
        configuration_error(msg)
    } else {
        internal_error(msg)
    }
}

// ============ GET /health ============

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
    providers: Vec<String>,
}

async fn handle_health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        providers: state
            .providers
            .available()
            .into_iter()
            .map(String::from)
            .collect(),
    })
}

// ============ Documents ============

#[derive(Deserialize)]
struct CreateDocumentRequest {
    title: String,
    content: String,
    #[serde(default = "default_category")]
    category: String,
    #[serde(default)]
    tags: Vec<String>,
    #[serde(default)]
    metadata: serde_json::Value,
}

fn default_category() -> String {
    "general".to_string()
}

async fn handle_create_document(
    State(state): State<AppState>,
    Json(req): Json<CreateDocumentRequest>,
) -> Result<(StatusCode, Json<Document>), AppError> {
    if req.title.trim().is_empty() {
        return Err(bad_request("title must not be empty"));
    }
    if req.content.trim().is_empty() {
        return Err(bad_request("content must not be empty"));
    }

    let now = Utc::now();
    let doc = Document {
        doc_id: Document::new_id(),
        title: req.title,
        content: req.content,
        category: req.category,
        tags: req.tags,
        metadata: req.metadata,
        created_at: now,
        updated_at: now,
    };

    state
        .store
        .insert_document(&doc)
        .await
        .map_err(classify_error)?;
    Ok((StatusCode::CREATED, Json(doc)))
}

#[derive(Deserialize)]
struct ListDocumentsParams {
    category: Option<String>,
    tag: Option<String>,
    #[serde(default = "default_list_limit")]
    limit: i64,
    #[serde(default)]
    offset: i64,
}

fn default_list_limit() -> i64 {
    50
}

#[derive(Serialize)]
struct DocumentListResponse {
    documents: Vec<Document>,
}

async fn handle_list_documents(
    State(state): State<AppState>,
    Query(params): Query<ListDocumentsParams>,
) -> Result<Json<DocumentListResponse>, AppError> {
    let filter = DocumentFilter {
        category: params.category,
        tag: params.tag,
        limit: params.limit,
        offset: params.offset,
    };
    let documents = state
        .store
        .list_documents(&filter)
        .await
        .map_err(classify_error)?;
    Ok(Json(DocumentListResponse { documents }))
}

async fn handle_get_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Document>, AppError> {
    let doc = state
        .store
        .get_document(&id)
        .await
        .map_err(classify_error)?
        .ok_or_else(|| not_found(format!("document not found: {}", id)))?;
    Ok(Json(doc))
}

async fn handle_update_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(update): Json<DocumentUpdate>,
) -> Result<Json<Document>, AppError> {
    if update.is_empty() {
        return Err(bad_request("no fields to update"));
    }
    let updated = state
        .store
        .update_document(&id, &update)
        .await
        .map_err(classify_error)?;
    if !updated {
        return Err(not_found(format!("document not found: {}", id)));
    }
    let doc = state
        .store
        .get_document(&id)
        .await
        .map_err(classify_error)?
        .ok_or_else(|| not_found(format!("document not found: {}", id)))?;
    Ok(Json(doc))
}

async fn handle_delete_document(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state
        .store
        .delete_document(&id)
        .await
        .map_err(classify_error)?;
    if !deleted {
        return Err(not_found(format!("document not found: {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// ============ Meetings ============

#[derive(Deserialize)]
struct CreateMeetingRequest {
    transcript: String,
    title: Option<String>,
    #[serde(default)]
    participants: Vec<String>,
    duration_minutes: Option<i64>,
    date: Option<DateTime<Utc>>,
    /// Provider used for summarization; defaults like chat dispatch.
    provider: Option<String>,
}

async fn handle_create_meeting(
    State(state): State<AppState>,
    Json(req): Json<CreateMeetingRequest>,
) -> Result<(StatusCode, Json<MeetingSummary>), AppError> {
    if req.transcript.trim().is_empty() {
        return Err(bad_request("transcript must not be empty"));
    }

    let requested = req
        .provider
        .unwrap_or_else(|| state.config.providers.default.clone());
    let provider = state.providers.resolve(&requested).map_err(classify_error)?;

    let defaults = MeetingMeta::default();
    let meta = MeetingMeta {
        title: req.title.unwrap_or(defaults.title),
        participants: req.participants,
        duration_minutes: req.duration_minutes.unwrap_or(defaults.duration_minutes),
        date: req.date.unwrap_or(defaults.date),
    };

    let meeting = summary::generate_and_store(state.store.as_ref(), provider, &req.transcript, meta)
        .await
        .map_err(classify_error)?;
    Ok((StatusCode::CREATED, Json(meeting)))
}

#[derive(Deserialize)]
struct ListMeetingsParams {
    tag: Option<String>,
    participant: Option<String>,
    #[serde(default = "default_list_limit")]
    limit: i64,
}

#[derive(Serialize)]
struct MeetingListResponse {
    meetings: Vec<MeetingSummary>,
}

async fn handle_list_meetings(
    State(state): State<AppState>,
    Query(params): Query<ListMeetingsParams>,
) -> Result<Json<MeetingListResponse>, AppError> {
    let filter = MeetingFilter {
        tag: params.tag,
        participant: params.participant,
        limit: params.limit,
    };
    let meetings = state
        .store
        .list_meetings(&filter)
        .await
        .map_err(classify_error)?;
    Ok(Json(MeetingListResponse { meetings }))
}

async fn handle_get_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<MeetingSummary>, AppError> {
    let meeting = state
        .store
        .get_meeting(&id)
        .await
        .map_err(classify_error)?
        .ok_or_else(|| not_found(format!("meeting not found: {}", id)))?;
    Ok(Json(meeting))
}

#[derive(Deserialize)]
struct UpdateMeetingRequest {
    transcript: String,
    provider: Option<String>,
}

async fn handle_update_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(req): Json<UpdateMeetingRequest>,
) -> Result<Json<MeetingSummary>, AppError> {
    if req.transcript.trim().is_empty() {
        return Err(bad_request("transcript must not be empty"));
    }

    let requested = req
        .provider
        .unwrap_or_else(|| state.config.providers.default.clone());
    let provider = state.providers.resolve(&requested).map_err(classify_error)?;

    let updated = summary::regenerate(state.store.as_ref(), provider, &id, &req.transcript)
        .await
        .map_err(classify_error)?;
    if !updated {
        return Err(not_found(format!("meeting not found: {}", id)));
    }
    let meeting = state
        .store
        .get_meeting(&id)
        .await
        .map_err(classify_error)?
        .ok_or_else(|| not_found(format!("meeting not found: {}", id)))?;
    Ok(Json(meeting))
}

async fn handle_delete_meeting(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<serde_json::Value>, AppError> {
    let deleted = state
        .store
        .delete_meeting(&id)
        .await
        .map_err(classify_error)?;
    if !deleted {
        return Err(not_found(format!("meeting not found: {}", id)));
    }
    Ok(Json(serde_json::json!({ "deleted": id })))
}

// ============ Chat ============

async fn handle_chat_ask(
    State(state): State<AppState>,
    Json(query): Json<ChatQuery>,
) -> Result<Json<ChatResponse>, AppError> {
    if query.question.trim().is_empty() {
        return Err(bad_request("question must not be empty"));
    }
    let response = state.chatbot.ask(&query).await.map_err(classify_error)?;
    Ok(Json(response))
}

#[derive(Serialize)]
struct ProvidersResponse {
    providers: Vec<String>,
    default: String,
}

async fn handle_chat_providers(State(state): State<AppState>) -> Json<ProvidersResponse> {
    Json(ProvidersResponse {
        providers: state
            .providers
            .available()
            .into_iter()
            .map(String::from)
            .collect(),
        default: state.config.providers.default.clone(),
    })
}

// ============ Search ============

#[derive(Deserialize)]
struct SearchParams {
    q: String,
    #[serde(default = "default_search_limit")]
    limit: usize,
    days: Option<i64>,
}

fn default_search_limit() -> usize {
    10
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<search::MeetingHit>,
}

async fn handle_search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<SearchResponse>, AppError> {
    if params.q.trim().is_empty() {
        return Err(bad_request("q must not be empty"));
    }
    let days = params.days.unwrap_or(state.config.retrieval.lookback_days);
    let results = search::search_recent_meetings(
        state.store.as_ref(),
        &params.q,
        params.limit,
        days,
        state.config.retrieval.recent_meetings_limit,
    )
    .await
    .map_err(classify_error)?;
    Ok(Json(SearchResponse { results }))
}
