//! Public form definition and submission model.
//!
//! # Invariants
//! - Field IDs are the submission keys; values are always strings.
//! - Unknown field types are preserved as `FormFieldType::Other`.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// Field-id to value mapping posted to the submit endpoint.
pub type FormSubmission = BTreeMap<String, String>;

/// Input kind of one form field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FormFieldType {
    Text,
    Textarea,
    Number,
    Email,
    Date,
    Select,
    #[serde(other)]
    Other,
}

/// One field of a public form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormField {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub required: bool,
    #[serde(rename = "type")]
    pub field_type: FormFieldType,
}

/// Form definition served by `GET forms/{id}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDefinition {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub form_schema: Vec<FormField>,
    pub workspace_id: String,
}

/// Reason one field failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldProblemKind {
    MissingRequired,
    UnknownField,
    InvalidEmail,
    InvalidNumber,
}

/// Validation finding for one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldProblem {
    pub field_id: String,
    pub kind: FieldProblemKind,
}

impl Display for FieldProblem {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let reason = match self.kind {
            FieldProblemKind::MissingRequired => "is required",
            FieldProblemKind::UnknownField => "is not part of this form",
            FieldProblemKind::InvalidEmail => "must be an email address",
            FieldProblemKind::InvalidNumber => "must be a number",
        };
        write!(f, "field `{}` {reason}", self.field_id)
    }
}

impl Error for FieldProblem {}

impl FormDefinition {
    /// Submission with every field present and empty.
    pub fn blank_submission(&self) -> FormSubmission {
        self.form_schema
            .iter()
            .map(|field| (field.id.clone(), String::new()))
            .collect()
    }

    pub fn field(&self, id: &str) -> Option<&FormField> {
        self.form_schema.iter().find(|field| field.id == id)
    }

    /// Checks `submission` against the schema and reports every problem.
    ///
    /// Schema fields are checked in schema order, then unknown keys in key
    /// order.
    pub fn validate_submission(&self, submission: &FormSubmission) -> Vec<FieldProblem> {
        let mut problems = Vec::new();
        for field in &self.form_schema {
            let value = submission
                .get(&field.id)
                .map(|value| value.trim())
                .unwrap_or_default();
            let kind = if value.is_empty() {
                field.required.then_some(FieldProblemKind::MissingRequired)
            } else {
                match field.field_type {
                    FormFieldType::Email if !EMAIL_RE.is_match(value) => {
                        Some(FieldProblemKind::InvalidEmail)
                    }
                    FormFieldType::Number if value.parse::<f64>().is_err() => {
                        Some(FieldProblemKind::InvalidNumber)
                    }
                    _ => None,
                }
            };
            if let Some(kind) = kind {
                problems.push(FieldProblem {
                    field_id: field.id.clone(),
                    kind,
                });
            }
        }
        for key in submission.keys() {
            if self.field(key).is_none() {
                problems.push(FieldProblem {
                    field_id: key.clone(),
                    kind: FieldProblemKind::UnknownField,
                });
            }
        }
        problems
    }
}
