use std::sync::Mutex;

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::Utc;
use shared::{
    error::ErrorCode,
    protocol::{SubmissionStatus, PITCH_CREATED_MESSAGE},
    validation::ValidationErrors,
};
use storage::Storage;

use super::*;

#[derive(Default)]
struct RecordingStore {
    created: Mutex<Vec<PitchDocument>>,
    fail_with: Option<String>,
}

impl RecordingStore {
    fn failing(err: impl Into<String>) -> Self {
        Self {
            created: Mutex::new(Vec::new()),
            fail_with: Some(err.into()),
        }
    }

    fn created(&self) -> Vec<PitchDocument> {
        self.created.lock().expect("lock").clone()
    }
}

#[async_trait]
impl ContentStore for RecordingStore {
    async fn create_document(&self, document: &PitchDocument) -> Result<StoredStartup> {
        if let Some(err) = &self.fail_with {
            return Err(anyhow!(err.clone()));
        }
        let mut created = self.created.lock().expect("lock");
        created.push(document.clone());
        Ok(StoredStartup {
            id: DocumentId(format!("doc-{}", created.len())),
            created_at: Utc::now(),
            document: document.clone(),
        })
    }

    async fn load_document(&self, _id: &DocumentId) -> Result<Option<StoredStartup>> {
        Ok(None)
    }
}

fn session() -> Session {
    Session {
        user_id: UserId(42),
        username: "alice".into(),
    }
}

fn request(title: &str, link: &str) -> CreatePitchRequest {
    CreatePitchRequest {
        previous: SubmissionResult::initial(),
        fields: PitchFields {
            title: title.into(),
            description: "Subscription boxes for houseplants".into(),
            category: "Retail".into(),
            link: link.into(),
        },
        pitch: "Plants arrive monthly with care guides.".into(),
    }
}

#[tokio::test]
async fn unauthenticated_caller_never_reaches_store() {
    let store = Arc::new(RecordingStore::default());
    let ctx = ApiContext::new(store.clone());

    let result = create_pitch(&ctx, None, request("Plant Box", "https://example.com/p.png")).await;

    assert_eq!(result.status, SubmissionStatus::Error);
    assert_eq!(result.error, LOGIN_REQUIRED_MESSAGE);
    assert!(result.id.is_none());
    assert!(store.created().is_empty());
}

#[tokio::test]
async fn authenticated_caller_creates_exactly_one_document() {
    let store = Arc::new(RecordingStore::default());
    let ctx = ApiContext::new(store.clone());

    let result = create_pitch(
        &ctx,
        Some(&session()),
        request("My Great Idea!!", "https://example.com/p.png"),
    )
    .await;

    assert_eq!(result.status, SubmissionStatus::Success);
    assert_eq!(result.error, "");
    assert_eq!(result.id, Some(DocumentId("doc-1".into())));
    assert_eq!(result.message.as_deref(), Some(PITCH_CREATED_MESSAGE));

    let created = store.created();
    assert_eq!(created.len(), 1);
    let doc = &created[0];
    assert_eq!(doc.kind, DocumentType::Startup);
    assert_eq!(doc.slug.current, "my-great-idea");
    assert_eq!(doc.author, AuthorRef::user(UserId(42)));
    assert_eq!(doc.image, "https://example.com/p.png");
    assert_eq!(doc.pitch, "Plants arrive monthly with care guides.");
}

#[tokio::test]
async fn invalid_fields_are_rejected_at_the_boundary() {
    let store = Arc::new(RecordingStore::default());
    let ctx = ApiContext::new(store.clone());

    let result = create_pitch(&ctx, Some(&session()), request("", "not a url")).await;

    assert_eq!(result.status, SubmissionStatus::Error);
    assert_eq!(result.error, VALIDATION_FAILED_MESSAGE);
    assert!(result.field_errors.contains("title"));
    assert!(result.field_errors.contains("link"));
    assert!(store.created().is_empty());
}

#[tokio::test]
async fn store_failure_becomes_error_result_with_message() {
    let ctx = ApiContext::new(Arc::new(RecordingStore::failing("quota exceeded")));
    let mut req = request("Plant Box", "https://example.com/p.png");
    req.previous = SubmissionResult::initial().with_error("earlier failure");

    let result = create_pitch(&ctx, Some(&session()), req).await;

    assert_eq!(result.status, SubmissionStatus::Error);
    assert_eq!(result.error, "quota exceeded");
    assert!(result.id.is_none());
}

#[tokio::test]
async fn store_failure_after_earlier_success_reports_no_stale_state() {
    let ctx = ApiContext::new(Arc::new(RecordingStore::failing("quota exceeded")));
    let mut stale = ValidationErrors::default();
    stale.insert("category", "Category must be 1 to 20 characters");
    let mut req = request("Plant Box", "https://example.com/p.png");
    req.previous = SubmissionResult::success(DocumentId("old-doc".into())).with_field_errors(stale);

    let result = create_pitch(&ctx, Some(&session()), req).await;

    assert_eq!(result.status, SubmissionStatus::Error);
    assert_eq!(result.error, "quota exceeded");
    assert!(result.id.is_none());
    assert!(result.field_errors.is_empty());
}

#[tokio::test]
async fn sqlite_store_persists_created_pitch() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let user_id = storage.create_user("alice").await.expect("user");
    let ctx = ApiContext::new(Arc::new(storage.clone()));
    let session = Session {
        user_id,
        username: "alice".into(),
    };

    let result = create_pitch(
        &ctx,
        Some(&session),
        request("Plant Box", "https://example.com/p.png"),
    )
    .await;
    let id = result.id.expect("assigned id");

    let stored = get_startup(&ctx, &id).await.expect("stored");
    assert_eq!(stored.document.slug.current, "plant-box");
    assert_eq!(stored.document.author.target, user_id.to_string());
}

#[tokio::test]
async fn repeated_titles_create_separate_documents() {
    let storage = Storage::new("sqlite::memory:").await.expect("db");
    let ctx = ApiContext::new(Arc::new(storage.clone()));

    let first = create_pitch(&ctx, Some(&session()), request("Plant Box", "https://example.com/a.png")).await;
    let second = create_pitch(&ctx, Some(&session()), request("Plant Box!", "https://example.com/b.png")).await;

    assert!(first.is_success() && second.is_success());
    assert_ne!(first.id, second.id);
    assert_eq!(storage.count_documents_with_slug("plant-box").await.expect("count"), 2);
}

#[tokio::test]
async fn get_startup_reports_not_found() {
    let ctx = ApiContext::new(Arc::new(RecordingStore::default()));
    let err = get_startup(&ctx, &DocumentId("missing".into()))
        .await
        .expect_err("should fail");
    assert!(matches!(err.code, ErrorCode::NotFound));
}
