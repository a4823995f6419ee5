use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use shared::{
    error::ErrorCode,
    protocol::{SubmissionStatus, LOGIN_REQUIRED_MESSAGE},
};
use tokio::net::TcpListener;

use super::*;

#[derive(Clone, Default)]
struct ServerState {
    seen_auth: Arc<Mutex<Vec<Option<String>>>>,
}

async fn login(Json(req): Json<LoginRequest>) -> Json<LoginResponse> {
    Json(LoginResponse {
        user_id: UserId(5),
        token: format!("token-for-{}", req.username),
    })
}

async fn pitches(
    State(state): State<ServerState>,
    headers: HeaderMap,
    Json(req): Json<CreatePitchRequest>,
) -> (StatusCode, Json<SubmissionResult>) {
    let auth = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.seen_auth.lock().expect("lock").push(auth.clone());

    match auth {
        Some(_) => (
            StatusCode::CREATED,
            Json(SubmissionResult::success(DocumentId(format!(
                "id-{}",
                req.fields.title
            )))),
        ),
        None => (
            StatusCode::UNAUTHORIZED,
            Json(req.previous.with_error(LOGIN_REQUIRED_MESSAGE)),
        ),
    }
}

async fn startup(Path(id): Path<String>) -> (StatusCode, Json<ApiError>) {
    (
        StatusCode::NOT_FOUND,
        Json(ApiError::new(
            ErrorCode::NotFound,
            format!("startup {id} not found"),
        )),
    )
}

async fn broken() -> (StatusCode, &'static str) {
    (StatusCode::BAD_GATEWAY, "<html>upstream down</html>")
}

async fn spawn_server() -> (String, ServerState) {
    let state = ServerState::default();
    let app = Router::new()
        .route("/login", post(login))
        .route("/pitches", post(pitches))
        .route("/startup/:id", get(startup))
        .with_state(state.clone());
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    (format!("http://{addr}/"), state)
}

fn fields() -> PitchFields {
    PitchFields {
        title: "Soil".into(),
        description: "Carbon credits for farms".into(),
        category: "Climate".into(),
        link: "https://example.com/soil.png".into(),
    }
}

#[tokio::test]
async fn anonymous_submission_decodes_error_body() {
    let (url, state) = spawn_server().await;
    let client = PitchClient::new(url);

    let result = client
        .submit_pitch(&SubmissionResult::initial(), &fields(), "Soil carbon pitch")
        .await
        .expect("result");

    assert_eq!(result.status, SubmissionStatus::Error);
    assert_eq!(result.error, LOGIN_REQUIRED_MESSAGE);
    assert_eq!(state.seen_auth.lock().expect("lock").clone(), vec![None]);
}

#[tokio::test]
async fn login_token_is_sent_as_bearer() {
    let (url, state) = spawn_server().await;
    let client = PitchClient::new(format!("{url}/"));

    let user_id = client.login("alice").await.expect("login");
    assert_eq!(user_id, UserId(5));
    assert!(client.is_logged_in().await);

    let result = client
        .create_pitch(&SubmissionResult::initial(), &fields(), "Soil carbon pitch")
        .await
        .expect("result");

    assert!(result.is_success());
    assert_eq!(result.id, Some(DocumentId("id-Soil".into())));
    assert_eq!(
        state.seen_auth.lock().expect("lock").clone(),
        vec![Some("Bearer token-for-alice".to_string())]
    );
}

#[tokio::test]
async fn fetch_startup_surfaces_api_error() {
    let (url, _state) = spawn_server().await;
    let client = PitchClient::new(url);

    let err = client
        .fetch_startup(&DocumentId("nope".into()))
        .await
        .expect_err("should fail");

    match err {
        ClientError::Api(api) => assert!(matches!(api.code, ErrorCode::NotFound)),
        other => panic!("expected api error, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_submission_response_is_unexpected() {
    let app = Router::new().route("/pitches", post(broken));
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("addr");
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("serve");
    });
    let client = PitchClient::new(format!("http://{addr}"));

    let err = client
        .submit_pitch(&SubmissionResult::initial(), &fields(), "Soil carbon pitch")
        .await
        .expect_err("should fail");

    assert!(matches!(err, ClientError::UnexpectedResponse { status: 502 }));
}
