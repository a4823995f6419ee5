use serde::{Deserialize, Serialize};

use crate::{
    domain::{DocumentId, PitchFields, UserId},
    validation::ValidationErrors,
};

pub const PITCH_CREATED_MESSAGE: &str = "Pitch submitted successfully!";
pub const LOGIN_REQUIRED_MESSAGE: &str = "You must be logged in to create a pitch";
pub const VALIDATION_FAILED_MESSAGE: &str = "Validation failed";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SubmissionStatus {
    #[default]
    Initial,
    Success,
    Error,
}

/// Outcome of one pitch submission attempt, shared by the handler and the form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubmissionResult {
    pub status: SubmissionStatus,
    #[serde(default)]
    pub error: String,
    #[serde(rename = "_id", default, skip_serializing_if = "Option::is_none")]
    pub id: Option<DocumentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(
        rename = "fieldErrors",
        default,
        skip_serializing_if = "ValidationErrors::is_empty"
    )]
    pub field_errors: ValidationErrors,
}

impl SubmissionResult {
    pub fn initial() -> Self {
        Self::default()
    }

    pub fn success(id: DocumentId) -> Self {
        Self {
            status: SubmissionStatus::Success,
            error: String::new(),
            id: Some(id),
            message: Some(PITCH_CREATED_MESSAGE.to_string()),
            field_errors: ValidationErrors::default(),
        }
    }

    /// The `Error` result that follows this one. An earlier attempt's id
    /// and field errors do not carry over.
    pub fn with_error(&self, error: impl Into<String>) -> Self {
        Self {
            status: SubmissionStatus::Error,
            error: error.into(),
            id: None,
            message: None,
            field_errors: ValidationErrors::default(),
        }
    }

    pub fn with_field_errors(mut self, field_errors: ValidationErrors) -> Self {
        self.field_errors = field_errors;
        self
    }

    pub fn is_success(&self) -> bool {
        self.status == SubmissionStatus::Success
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePitchRequest {
    #[serde(default)]
    pub previous: SubmissionResult,
    pub fields: PitchFields,
    pub pitch: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub username: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: UserId,
    pub token: String,
}

pub fn startup_route(id: &DocumentId) -> String {
    format!("/startup/{id}")
}

#[cfg(test)]
#[path = "tests/protocol_tests.rs"]
mod tests;
