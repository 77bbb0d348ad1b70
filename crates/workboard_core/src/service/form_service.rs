//! Public form use-case service.
//!
//! # Responsibility
//! - Load a form definition through a transport-agnostic backend.
//! - Validate submissions before they leave the process.
//!
//! # Invariants
//! - Invalid submissions never reach the backend.
//! - Backend failures are surfaced once; there is no automatic retry.

use crate::cache::{FetchError, FetchResult};
use crate::model::form::{FieldProblem, FormDefinition, FormSubmission};
use log::{info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Result type for form use-cases.
pub type FormResult<T> = Result<T, FormError>;

/// Service error for public form use-cases.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    /// No form exists for this ID.
    NotFound(String),
    /// Submission failed validation; every problem is listed.
    Validation(Vec<FieldProblem>),
    /// Transport or server failure.
    Backend(FetchError),
}

impl Display for FormError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(form_id) => write!(f, "form not found: {form_id}"),
            Self::Validation(problems) => {
                let details = problems
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join("; ");
                write!(f, "invalid submission: {details}")
            }
            Self::Backend(err) => write!(f, "{err}"),
        }
    }
}

impl Error for FormError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Backend(err) => Some(err),
            _ => None,
        }
    }
}

impl From<FetchError> for FormError {
    fn from(value: FetchError) -> Self {
        Self::Backend(value)
    }
}

/// Request path of a form definition.
pub fn form_path(form_id: &str) -> String {
    format!("forms/{}", form_id.trim())
}

/// Request path of the submit endpoint.
pub fn form_submit_path(form_id: &str) -> String {
    format!("{}/submit", form_path(form_id))
}

/// Transport contract for the public form backend.
pub trait FormBackend {
    /// `GET forms/{id}`; `Ok(None)` when the form does not exist.
    fn fetch_form(&self, form_id: &str) -> FetchResult<Option<FormDefinition>>;

    /// `POST forms/{id}/submit`; success is binary.
    fn submit_form(&self, form_id: &str, submission: &FormSubmission) -> FetchResult<()>;
}

/// Use-case service wrapper for public form flows.
pub struct PublicFormService<B: FormBackend> {
    backend: B,
}

impl<B: FormBackend> PublicFormService<B> {
    /// Creates a service using the provided backend implementation.
    pub fn new(backend: B) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Loads a form definition.
    pub fn load_form(&self, form_id: &str) -> FormResult<FormDefinition> {
        let form_id = form_id.trim();
        match self.backend.fetch_form(form_id) {
            Ok(Some(definition)) => {
                info!(
                    "event=form_load module=form status=ok fields={}",
                    definition.form_schema.len()
                );
                Ok(definition)
            }
            Ok(None) => Err(FormError::NotFound(form_id.to_string())),
            Err(err) => {
                warn!("event=form_load module=form status=error error={err}");
                Err(err.into())
            }
        }
    }

    /// Validates and submits values for `definition`.
    ///
    /// Values are sent trimmed.
    pub fn submit(
        &self,
        form_id: &str,
        definition: &FormDefinition,
        submission: &FormSubmission,
    ) -> FormResult<()> {
        let problems = definition.validate_submission(submission);
        if !problems.is_empty() {
            info!(
                "event=form_submit module=form status=rejected problems={}",
                problems.len()
            );
            return Err(FormError::Validation(problems));
        }

        let trimmed = submission
            .iter()
            .map(|(key, value)| (key.clone(), value.trim().to_string()))
            .collect::<FormSubmission>();
        self.backend
            .submit_form(form_id.trim(), &trimmed)
            .map_err(|err| {
                warn!("event=form_submit module=form status=error error={err}");
                FormError::from(err)
            })?;
        info!(
            "event=form_submit module=form status=ok fields={}",
            trimmed.len()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{form_path, form_submit_path, FormError};
    use crate::cache::FetchError;
    use std::error::Error;

    #[test]
    fn paths_follow_backend_contract() {
        assert_eq!(form_path(" abc "), "forms/abc");
        assert_eq!(form_submit_path("abc"), "forms/abc/submit");
    }

    #[test]
    fn backend_error_is_exposed_as_source() {
        let err = FormError::from(FetchError::Status(500));
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "request failed with status 500");
    }
}
