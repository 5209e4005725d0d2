//! New-report form state and the write path behind its submit button.

use crate::cell::StateCell;
use crate::error::{StoreError, ValidationError};
use crate::report::NewReport;
use crate::store::ReportStore;

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportForm {
    pub title: String,
    pub description: String,
    pub author: String,
    is_submitting: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Inserted; fields are cleared and the modal should close.
    Submitted,
    /// Blocked locally, nothing was sent.
    Rejected(ValidationError),
    /// The store refused the insert; fields are kept for a retry.
    Failed(StoreError),
    /// The form went away while the insert was in flight.
    Dropped,
}

impl SubmitOutcome {
    /// Text to put in front of the user, if any.
    pub fn alert_message(&self) -> Option<String> {
        match self {
            Self::Rejected(err) => Some(err.to_string()),
            Self::Failed(err) => Some(format!("Failed to submit report: {err}")),
            Self::Submitted | Self::Dropped => None,
        }
    }
}

impl ReportForm {
    /// A form pre-filled with typed values, not yet submitting.
    pub fn with_fields(
        title: impl Into<String>,
        description: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            author: author.into(),
            is_submitting: false,
        }
    }

    pub fn is_submitting(&self) -> bool {
        self.is_submitting
    }

    pub fn submit_label(&self) -> &'static str {
        if self.is_submitting {
            "Submitting..."
        } else {
            "Submit Report"
        }
    }

    /// Validates the fields and marks the form busy.
    pub fn begin_submit(&mut self) -> Result<NewReport, ValidationError> {
        if self.is_submitting {
            return Err(ValidationError::SubmissionPending);
        }
        let record = NewReport::new(
            self.title.clone(),
            self.description.clone(),
            self.author.clone(),
        )?;
        self.is_submitting = true;
        Ok(record)
    }

    pub fn finish_submit(&mut self, result: Result<(), StoreError>) -> SubmitOutcome {
        self.is_submitting = false;
        match result {
            Ok(()) => {
                self.clear_fields();
                SubmitOutcome::Submitted
            }
            Err(err) => SubmitOutcome::Failed(err),
        }
    }

    /// Cancel path: drops whatever was typed.
    pub fn discard(&mut self) {
        self.clear_fields();
    }

    fn clear_fields(&mut self) {
        self.title.clear();
        self.description.clear();
        self.author.clear();
    }
}

/// Runs one submit against `store`. Exactly one insert is issued when the
/// fields validate, none otherwise.
pub async fn submit_report<S, F>(store: &S, collection: &str, form: &F) -> SubmitOutcome
where
    S: ReportStore + ?Sized,
    F: StateCell<ReportForm>,
{
    let record = match form.try_update_state(ReportForm::begin_submit) {
        None => return SubmitOutcome::Dropped,
        Some(Err(err)) => {
            tracing::debug!(error = %err, "report submit blocked");
            return SubmitOutcome::Rejected(err);
        }
        Some(Ok(record)) => record,
    };

    let result = store.insert(collection, &record).await;
    match &result {
        Ok(()) => tracing::info!(collection, title = %record.title, "report submitted"),
        Err(err) => tracing::warn!(collection, error = %err, "report insert failed"),
    }

    form.try_update_state(|f| f.finish_submit(result))
        .unwrap_or(SubmitOutcome::Dropped)
}
