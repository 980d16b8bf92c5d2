//! Post-load validation.
//!
//! A document type may declare one [`Validator`]. It runs once per load,
//! after any migration. A failed validation is reported and logged; the load
//! still completes with the document as read.

use tracing::warn;

/// Checks a loaded document. `Some(message)` means the document is invalid.
///
/// Implemented for every `Fn(&D) -> Option<String>`.
pub trait Validator<D>: Send + Sync {
    fn validate(&self, document: &D) -> Option<String>;
}

impl<D, F> Validator<D> for F
where
    F: Fn(&D) -> Option<String> + Send + Sync,
{
    fn validate(&self, document: &D) -> Option<String> {
        self(document)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationReport {
    /// No validator is declared.
    Skipped,
    Passed,
    Failed(String),
}

impl ValidationReport {
    pub fn is_failed(&self) -> bool {
        matches!(self, ValidationReport::Failed(_))
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            ValidationReport::Failed(message) => Some(message),
            _ => None,
        }
    }
}

/// Runs an optional validator and logs failures.
pub struct ValidationRunner;

impl ValidationRunner {
    pub fn run<D>(validator: Option<&dyn Validator<D>>, document: &D, doc_id: &str) -> ValidationReport {
        let Some(validator) = validator else {
            return ValidationReport::Skipped;
        };
        match validator.validate(document) {
            None => ValidationReport::Passed,
            Some(message) => {
                warn!(doc_id, message = %message, "document failed validation");
                ValidationReport::Failed(message)
            }
        }
    }
}
