use anyhow::Result;
use async_trait::async_trait;
use shared::{domain::PitchFields, protocol::SubmissionResult};

pub mod client;
pub mod error;
pub mod form;

pub use client::PitchClient;
pub use error::ClientError;
pub use form::{FormField, PendingHandle, StartupForm, SubmitButton};

/// Sends a validated pitch to the submission handler.
#[async_trait]
pub trait PitchSubmitter: Send + Sync {
    async fn create_pitch(
        &self,
        previous: &SubmissionResult,
        fields: &PitchFields,
        pitch: &str,
    ) -> Result<SubmissionResult>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ToastVariant {
    #[default]
    Default,
    Destructive,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub title: String,
    pub description: String,
    pub variant: ToastVariant,
}

impl Toast {
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            variant: ToastVariant::Default,
        }
    }

    pub fn destructive(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            variant: ToastVariant::Destructive,
            ..Self::new(title, description)
        }
    }
}

/// Fire-and-forget user feedback.
pub trait Notifier: Send + Sync {
    fn notify(&self, toast: Toast);
}

pub trait Navigator: Send + Sync {
    fn push(&self, path: &str);
}
