use std::{net::SocketAddr, sync::Arc};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use server_api::{create_pitch, get_startup, ApiContext};
use shared::{
    domain::{DocumentId, StoredStartup},
    error::{ApiError, ErrorCode},
    protocol::{CreatePitchRequest, LoginRequest, LoginResponse, SubmissionResult, SubmissionStatus},
};
use storage::Storage;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod session;

use app_state::AppState;
use config::{load_settings, prepare_database_url};
use session::{issue_token, session_from_headers, SessionConfig};

const MAX_USERNAME_CHARS: usize = 64;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let settings = load_settings();
    let database_url = prepare_database_url(&settings.database_url);
    let storage = Storage::new(&database_url).await.map_err(|error| {
        error!(
            %database_url,
            %error,
            "failed to open SQLite database; verify parent directory exists and permissions are correct"
        );
        error
    })?;

    let state = AppState {
        api: ApiContext::new(Arc::new(storage.clone())),
        storage,
        sessions: SessionConfig {
            secret: settings.session_secret,
            ttl_seconds: settings.session_ttl_seconds,
        },
        max_body_bytes: settings.max_body_bytes,
    };
    let app = build_router(Arc::new(state));

    let addr: SocketAddr = settings.server_bind.parse()?;
    info!(%addr, "server listening");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

fn build_router(state: Arc<AppState>) -> Router {
    let max_body_bytes = state.max_body_bytes;
    Router::new()
        .route("/healthz", get(healthz))
        .route("/login", post(login))
        .route("/pitches", post(http_create_pitch))
        .route("/startup/:id", get(http_get_startup))
        .layer(RequestBodyLimitLayer::new(max_body_bytes))
        .with_state(state)
}

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::NotFound => StatusCode::NOT_FOUND,
        ErrorCode::Validation => StatusCode::BAD_REQUEST,
        ErrorCode::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

fn api_error(err: ApiError) -> (StatusCode, Json<ApiError>) {
    (status_for(err.code), Json(err))
}

async fn healthz(
    State(state): State<Arc<AppState>>,
) -> Result<&'static str, (StatusCode, Json<ApiError>)> {
    state.storage.health_check().await.map_err(|e| {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(ApiError::internal(e)),
        )
    })?;
    Ok("ok")
}

async fn login(
    State(state): State<Arc<AppState>>,
    Json(req): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, (StatusCode, Json<ApiError>)> {
    let username = req.username.trim();
    if username.is_empty() || username.chars().count() > MAX_USERNAME_CHARS {
        return Err(api_error(ApiError::new(
            ErrorCode::Validation,
            format!("username must be 1-{MAX_USERNAME_CHARS} characters"),
        )));
    }

    let user_id = state
        .storage
        .create_user(username)
        .await
        .map_err(|e| api_error(ApiError::internal(e)))?;
    let token = issue_token(&state.sessions, user_id, username).map_err(|e| {
        api_error(ApiError::internal(format_args!(
            "session token mint failed: {e}"
        )))
    })?;

    info!(%user_id, "session issued");
    Ok(Json(LoginResponse { user_id, token }))
}

async fn http_create_pitch(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    Json(req): Json<CreatePitchRequest>,
) -> (StatusCode, Json<SubmissionResult>) {
    let session = session_from_headers(&state.sessions, &headers);
    let result = create_pitch(&state.api, session.as_ref(), req).await;

    let status = match result.status {
        SubmissionStatus::Success => StatusCode::CREATED,
        _ if session.is_none() => StatusCode::UNAUTHORIZED,
        _ if !result.field_errors.is_empty() => StatusCode::UNPROCESSABLE_ENTITY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (status, Json(result))
}

async fn http_get_startup(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> Result<Json<StoredStartup>, (StatusCode, Json<ApiError>)> {
    let startup = get_startup(&state.api, &DocumentId(id))
        .await
        .map_err(api_error)?;
    Ok(Json(startup))
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
