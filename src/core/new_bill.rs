//! New bill business logic - Receipt upload and bill submission.
//!
//! Submitting a bill takes two store calls. Selecting a file uploads the
//! receipt right away; submitting the form then creates the bill record that
//! points at it. The two calls are not atomic, so the creator compensates:
//! an upload left behind by a replaced selection or by a failed submission is
//! deleted from the store (unless compensation is disabled in the config).
//!
//! State is kept behind a `std::sync::Mutex` that is never held across an
//! `.await`. The submit phase is checked and set under that lock, and file
//! changes are refused once a submission has started. Overlapping selections
//! are numbered; only the latest one may stage its upload.

use crate::{
    config::NewBillConfig,
    context::ContainerContext,
    core::form::{FormValues, StagedUpload, build_bill},
    diagnostics::{Diagnostic, Diagnostics},
    errors::{Error, Result, ValidationError},
    routes::{Navigator, Route},
    store::{CreatePayload, MultipartForm, Store, UploadFile},
};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tracing::{info, instrument, warn};

/// Where the creator is in its submission lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SubmitPhase {
    /// No submission has started; the form accepts input
    #[default]
    Idle,
    /// A JSON create call is awaiting the store
    InFlight,
    /// The bill was created; the form is done
    Submitted,
}

impl SubmitPhase {
    fn busy_error(self) -> Option<ValidationError> {
        match self {
            Self::Idle => None,
            Self::InFlight => Some(ValidationError::SubmissionInProgress),
            Self::Submitted => Some(ValidationError::AlreadySubmitted),
        }
    }
}

#[derive(Debug)]
struct NewBillState {
    upload: Option<StagedUpload>,
    file_validation_passed: bool,
    phase: SubmitPhase,
    // Number of the latest file selection
    selection: u64,
}

impl Default for NewBillState {
    fn default() -> Self {
        Self {
            upload: None,
            file_validation_passed: true,
            phase: SubmitPhase::Idle,
            selection: 0,
        }
    }
}

impl NewBillState {
    fn submit_gate(&self) -> std::result::Result<StagedUpload, ValidationError> {
        if let Some(error) = self.phase.busy_error() {
            return Err(error);
        }
        if !self.file_validation_passed {
            return Err(ValidationError::FileValidationFailed);
        }
        self.upload.clone().ok_or(ValidationError::MissingUpload)
    }
}

/// Container behind the new-bill screen.
pub struct BillCreator {
    store: Arc<dyn Store>,
    navigator: Arc<dyn Navigator>,
    diagnostics: Arc<dyn Diagnostics>,
    settings: NewBillConfig,
    email: String,
    state: Mutex<NewBillState>,
}

impl BillCreator {
    /// Builds the container, binding the connected user's email.
    ///
    /// Fails with a session error when nobody is connected or the user has no email.
    pub fn new(context: &ContainerContext) -> Result<Self> {
        let user = context.session.current_user()?;
        let email = user.require_email()?.to_string();
        Ok(Self {
            store: Arc::clone(&context.store),
            navigator: Arc::clone(&context.navigator),
            diagnostics: Arc::clone(&context.diagnostics),
            settings: context.config.new_bill.clone(),
            email,
            state: Mutex::new(NewBillState::default()),
        })
    }

    fn state(&self) -> MutexGuard<'_, NewBillState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Email every bill of this form is created for.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// URL of the staged receipt.
    #[must_use]
    pub fn file_url(&self) -> Option<String> {
        self.state().upload.as_ref().map(|u| u.file_url.clone())
    }

    /// Name of the staged receipt file.
    #[must_use]
    pub fn file_name(&self) -> Option<String> {
        self.state().upload.as_ref().map(|u| u.file_name.clone())
    }

    /// Store key of the staged upload.
    #[must_use]
    pub fn bill_id(&self) -> Option<String> {
        self.state().upload.as_ref().map(|u| u.key.clone())
    }

    /// Validation gate: false after a disallowed file was selected.
    #[must_use]
    pub fn file_validation_passed(&self) -> bool {
        self.state().file_validation_passed
    }

    /// Current submission phase.
    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.state().phase
    }

    fn reject(&self, error: ValidationError) -> Error {
        self.diagnostics
            .report(Diagnostic::ValidationFailed(error.clone()));
        Error::Validation(error)
    }

    /// Handles a change of the receipt file input.
    ///
    /// A new selection replaces whatever was staged before. Disallowed types
    /// close the validation gate; allowed types reopen it and are uploaded
    /// immediately, with the session email, as a multipart payload. Nothing
    /// changes once a submission has started.
    #[instrument(skip(self, file), fields(email = %self.email))]
    pub async fn on_file_change(&self, file: Option<UploadFile>) -> Result<()> {
        let selected = {
            let mut state = self.state();
            match (state.phase.busy_error(), file) {
                (Some(error), _) => Err(error),
                (None, None) => Err(ValidationError::MissingFile),
                (None, Some(file)) => {
                    let accepted = self.settings.accepts(&file.mime_type);
                    state.selection += 1;
                    state.file_validation_passed = accepted;
                    Ok((file, accepted, state.selection, state.upload.take()))
                }
            }
        };
        let (file, accepted, selection, previous) = selected.map_err(|e| self.reject(e))?;

        if let Some(previous) = previous {
            self.discard(&previous).await;
        }

        if !accepted {
            return Err(self.reject(ValidationError::InvalidFileType {
                mime_type: file.mime_type,
            }));
        }

        let file_name = file.name.clone();
        let form = MultipartForm::new()
            .file("file", file)
            .text("email", self.email.clone());

        let created = match self.store.bills().create(CreatePayload::multipart(form)).await {
            Ok(created) => created,
            Err(e) => {
                self.diagnostics.report(Diagnostic::UploadFailed {
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let Some(file_url) = created.file_url else {
            let e = Error::transport("upload response carried no file url");
            self.diagnostics.report(Diagnostic::UploadFailed {
                message: e.to_string(),
            });
            self.compensate(&created.key).await;
            return Err(e);
        };

        self.diagnostics.report(Diagnostic::FileUploaded {
            file_url: file_url.clone(),
            key: created.key.clone(),
        });
        let upload = StagedUpload {
            file_url,
            file_name,
            key: created.key,
        };

        let superseded = {
            let mut state = self.state();
            if state.selection == selection {
                state.upload = Some(upload);
                None
            } else {
                Some(upload)
            }
        };
        if let Some(stale) = superseded {
            info!(key = %stale.key, "upload superseded by a newer selection");
            self.discard(&stale).await;
        }
        Ok(())
    }

    /// Handles submission of the new-bill form.
    ///
    /// Nothing reaches the store unless the validation gate is open and a
    /// receipt has been uploaded. On success the user is sent to the bills
    /// list; on failure the form stays on screen.
    #[instrument(skip(self, form), fields(email = %self.email))]
    pub async fn on_submit(&self, form: &dyn FormValues) -> Result<()> {
        let gate = {
            let mut state = self.state();
            let gate = state.submit_gate();
            if gate.is_ok() {
                state.phase = SubmitPhase::InFlight;
            }
            gate
        };
        let upload = gate.map_err(|e| self.reject(e))?;

        let outcome = self.submit(form, &upload).await;

        match outcome {
            Ok(()) => {
                self.state().phase = SubmitPhase::Submitted;
                self.diagnostics.report(Diagnostic::BillSubmitted);
                self.navigator.navigate(Route::Bills);
                Ok(())
            }
            Err(e) => {
                self.state().phase = SubmitPhase::Idle;
                if e.as_validation().is_none() && self.settings.compensate_orphaned_uploads {
                    self.compensate(&upload.key).await;
                    let mut state = self.state();
                    if state.upload.as_ref() == Some(&upload) {
                        state.upload = None;
                    }
                }
                Err(e)
            }
        }
    }

    async fn submit(&self, form: &dyn FormValues, upload: &StagedUpload) -> Result<()> {
        let bill = build_bill(form, &self.email, upload, self.settings.default_pct)
            .map_err(|e| self.reject(e))?;
        let body = serde_json::to_string(&bill)?;

        match self.store.bills().create(CreatePayload::json(body)).await {
            Ok(created) => {
                info!(key = %created.key, "bill created");
                Ok(())
            }
            Err(e) => {
                self.diagnostics.report(Diagnostic::SubmitFailed {
                    message: e.to_string(),
                });
                Err(e)
            }
        }
    }

    // Deletes an upload nothing will reference, when compensation is on.
    async fn discard(&self, upload: &StagedUpload) {
        if self.settings.compensate_orphaned_uploads {
            self.compensate(&upload.key).await;
        }
    }

    async fn compensate(&self, key: &str) {
        match self.store.bills().delete(key).await {
            Ok(()) => self.diagnostics.report(Diagnostic::UploadDiscarded {
                key: key.to_string(),
            }),
            Err(e) => {
                warn!(%key, "compensating delete failed: {}", e);
                self.diagnostics.report(Diagnostic::CompensationFailed {
                    key: key.to_string(),
                    message: e.to_string(),
                });
            }
        }
    }
}
