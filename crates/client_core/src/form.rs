use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use shared::{
    domain::PitchDraft,
    protocol::{startup_route, SubmissionResult, PITCH_CREATED_MESSAGE, VALIDATION_FAILED_MESSAGE},
    validation::{validate_draft, ValidationErrors},
};
use tracing::{debug, info, warn};

use crate::{Navigator, Notifier, PitchSubmitter, Toast};

pub const SOMETHING_WENT_WRONG: &str = "Something went wrong";
pub const SUBMIT_LABEL: &str = "Submit Your Pitch";
pub const SUBMITTING_LABEL: &str = "Submitting...";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FormField {
    Title,
    Description,
    Category,
    Link,
    Pitch,
}

impl FormField {
    pub fn name(self) -> &'static str {
        match self {
            FormField::Title => "title",
            FormField::Description => "description",
            FormField::Category => "category",
            FormField::Link => "link",
            FormField::Pitch => "pitch",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubmitButton {
    pub label: &'static str,
    pub disabled: bool,
}

/// Read-only view of the in-flight flag, usable while `submit` holds the form.
#[derive(Debug, Clone)]
pub struct PendingHandle(Arc<AtomicBool>);

impl PendingHandle {
    pub fn is_pending(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    pub fn button(&self) -> SubmitButton {
        let disabled = self.is_pending();
        SubmitButton {
            label: if disabled { SUBMITTING_LABEL } else { SUBMIT_LABEL },
            disabled,
        }
    }
}

/// Raises the pending flag for as long as it lives.
struct InFlight(Arc<AtomicBool>);

impl InFlight {
    fn raise(flag: &Arc<AtomicBool>) -> Self {
        flag.store(true, Ordering::SeqCst);
        Self(flag.clone())
    }
}

impl Drop for InFlight {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Client-side controller for the startup pitch form.
///
/// Holds the draft, the inline validation errors and the last submission
/// result. Field values survive failed submissions and are cleared only
/// after a successful one.
pub struct StartupForm {
    draft: PitchDraft,
    errors: ValidationErrors,
    state: SubmissionResult,
    in_flight: Arc<AtomicBool>,
    submitter: Arc<dyn PitchSubmitter>,
    notifier: Arc<dyn Notifier>,
    navigator: Arc<dyn Navigator>,
}

impl StartupForm {
    pub fn new(
        submitter: Arc<dyn PitchSubmitter>,
        notifier: Arc<dyn Notifier>,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            draft: PitchDraft::default(),
            errors: ValidationErrors::default(),
            state: SubmissionResult::initial(),
            in_flight: Arc::new(AtomicBool::new(false)),
            submitter,
            notifier,
            navigator,
        }
    }

    /// Applies an edit. Editing a field drops its inline error.
    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) {
        let value = value.into();
        match field {
            FormField::Title => self.draft.title = value,
            FormField::Description => self.draft.description = value,
            FormField::Category => self.draft.category = value,
            FormField::Link => self.draft.link = value,
            FormField::Pitch => self.draft.pitch = value,
        }
        self.errors.remove(field.name());
    }

    /// Markdown editor change.
    pub fn set_pitch(&mut self, markdown: impl Into<String>) {
        self.set_field(FormField::Pitch, markdown);
    }

    pub fn draft(&self) -> &PitchDraft {
        &self.draft
    }

    pub fn errors(&self) -> &ValidationErrors {
        &self.errors
    }

    pub fn error_for(&self, field: FormField) -> Option<&str> {
        self.errors.first(field.name())
    }

    pub fn state(&self) -> &SubmissionResult {
        &self.state
    }

    pub fn pending_handle(&self) -> PendingHandle {
        PendingHandle(self.in_flight.clone())
    }

    pub fn submit_button(&self) -> SubmitButton {
        self.pending_handle().button()
    }

    /// Validates the draft and, if it passes, hands it to the submitter.
    ///
    /// Always resolves to the new form state; failures are reported through
    /// the notifier rather than returned as errors.
    ///
    /// `&mut self` keeps a second submission from starting while one is
    /// pending; observers read the flag through a [`PendingHandle`].
    pub async fn submit(&mut self) -> SubmissionResult {
        let _in_flight = InFlight::raise(&self.in_flight);

        let candidate = self.draft.clone();
        if let Err(errors) = validate_draft(&candidate) {
            debug!(%errors, "pitch draft failed validation");
            self.errors = errors;
            self.notifier
                .notify(Toast::new("Error", "Please fix the errors"));
            self.state = self.state.with_error(VALIDATION_FAILED_MESSAGE);
            return self.state.clone();
        }
        self.errors = ValidationErrors::default();

        let outcome = self
            .submitter
            .create_pitch(&self.state, &candidate.fields(), &candidate.pitch)
            .await;

        self.state = match outcome {
            Ok(result) if result.is_success() => match result.id.clone() {
                Some(id) => {
                    info!(%id, "pitch submitted");
                    self.notifier
                        .notify(Toast::new("Success", PITCH_CREATED_MESSAGE));
                    self.navigator.push(&startup_route(&id));
                    self.draft = PitchDraft::default();
                    result
                }
                None => {
                    warn!("submission succeeded without a document id");
                    self.fail(SOMETHING_WENT_WRONG)
                }
            },
            Ok(result) => {
                let description = if result.error.is_empty() {
                    SOMETHING_WENT_WRONG
                } else {
                    result.error.as_str()
                };
                self.notifier.notify(Toast::destructive("Error", description));
                if !result.field_errors.is_empty() {
                    self.errors = result.field_errors.clone();
                }
                result
            }
            Err(error) => {
                warn!(error = ?error, "pitch submission failed");
                self.fail(SOMETHING_WENT_WRONG)
            }
        };

        self.state.clone()
    }

    fn fail(&self, message: &str) -> SubmissionResult {
        self.notifier.notify(Toast::destructive("Error", message));
        self.state.with_error(message)
    }
}

#[cfg(test)]
#[path = "tests/form_tests.rs"]
mod tests;
