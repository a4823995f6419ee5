use std::sync::Arc;

use shared::{
    domain::{
        AuthorRef, DocumentId, DocumentType, PitchDocument, PitchDraft, PitchFields, Slug,
        StoredStartup, UserId,
    },
    error::ApiError,
    protocol::{
        CreatePitchRequest, SubmissionResult, LOGIN_REQUIRED_MESSAGE, VALIDATION_FAILED_MESSAGE,
    },
    slug::slugify,
    validation::validate_draft,
};
use storage::ContentStore;
use tracing::{error, info, warn};

#[derive(Clone)]
pub struct ApiContext {
    pub content: Arc<dyn ContentStore>,
}

impl ApiContext {
    pub fn new(content: Arc<dyn ContentStore>) -> Self {
        Self { content }
    }
}

/// Identity of the caller, resolved before the handler runs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
}

/// Creates a startup document from a submitted pitch.
///
/// Never fails: authorization, validation and store errors all come back as
/// a `SubmissionResult` with status `Error`, echoing `request.previous`.
pub async fn create_pitch(
    ctx: &ApiContext,
    session: Option<&Session>,
    request: CreatePitchRequest,
) -> SubmissionResult {
    let CreatePitchRequest {
        previous,
        fields,
        pitch,
    } = request;

    let Some(session) = session else {
        return previous.with_error(LOGIN_REQUIRED_MESSAGE);
    };

    let draft = PitchDraft::from_parts(fields, pitch);
    if let Err(field_errors) = validate_draft(&draft) {
        warn!(user_id = %session.user_id, %field_errors, "rejected invalid pitch");
        return previous
            .with_error(VALIDATION_FAILED_MESSAGE)
            .with_field_errors(field_errors);
    }

    let document = build_document(session, draft.fields(), draft.pitch);
    match ctx.content.create_document(&document).await {
        Ok(created) => {
            info!(
                user_id = %session.user_id,
                id = %created.id,
                slug = %created.document.slug.current,
                "pitch created"
            );
            SubmissionResult::success(created.id)
        }
        Err(err) => {
            error!(user_id = %session.user_id, error = ?err, "failed to create pitch");
            previous.with_error(format!("{err:#}"))
        }
    }
}

/// Reshapes the submitted fields into the persisted document shape.
pub fn build_document(session: &Session, fields: PitchFields, pitch: String) -> PitchDocument {
    let slug = slugify(&fields.title);
    PitchDocument {
        kind: DocumentType::Startup,
        title: fields.title,
        description: fields.description,
        category: fields.category,
        image: fields.link,
        slug: Slug::new(slug),
        author: AuthorRef::user(session.user_id),
        pitch,
    }
}

pub async fn get_startup(ctx: &ApiContext, id: &DocumentId) -> Result<StoredStartup, ApiError> {
    ctx.content
        .load_document(id)
        .await
        .map_err(ApiError::internal)?
        .ok_or_else(|| ApiError::not_found("startup"))
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;
