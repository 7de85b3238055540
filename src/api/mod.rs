//! HTTP handlers, one module per resource. Every success body carries
//! `success: true`; failures render through [`ApiError`].

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;

use validator::{Validate, ValidationErrors, ValidationErrorsKind};

use crate::error::ApiError;

/// Runs derive-based validation and surfaces the first message as a 400.
pub(crate) fn check<T: Validate>(dto: &T) -> Result<(), ApiError> {
    dto.validate().map_err(|errs| {
        let message =
            first_message(&errs).unwrap_or_else(|| "Invalid request".to_string());
        ApiError::Validation(message)
    })
}

/// Walks field, nested-struct, and list errors for the first human-readable
/// message.
fn first_message(errs: &ValidationErrors) -> Option<String> {
    for (field, kind) in errs.errors() {
        match kind {
            ValidationErrorsKind::Field(errors) => {
                if let Some(error) = errors.first() {
                    return Some(match &error.message {
                        Some(msg) => msg.to_string(),
                        None => format!("{field} is invalid"),
                    });
                }
            }
            ValidationErrorsKind::Struct(nested) => {
                if let Some(msg) = first_message(nested) {
                    return Some(msg);
                }
            }
            ValidationErrorsKind::List(items) => {
                if let Some(msg) = items.values().find_map(|nested| first_message(nested)) {
                    return Some(msg);
                }
            }
        }
    }
    None
}
