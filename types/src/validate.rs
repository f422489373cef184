//! Submit-time field validation.
//!
//! The email check is deliberately the same cheap heuristic the form UI has
//! always shipped: one `@` with something on both sides, a `.` somewhere in
//! the domain part, no whitespace. It is a client-side sanity check, not
//! RFC 5322 validation; the relay service does its own authoritative checks.

use std::sync::OnceLock;

use regex::Regex;

use crate::{FormFields, SubmissionPayload};

/// Validation failures, with the inline message shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please fill in all fields.")]
    MissingFields,
    #[error("Please enter a valid email.")]
    InvalidEmail,
}

fn email_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("email pattern is a valid regex literal")
    })
}

/// Validate the trimmed fields, producing the payload to submit.
///
/// Missing fields are reported before email shape, matching the order the
/// form checks them. No IO happens here; a `ValidationError` means the caller
/// must not touch the network.
pub fn validate(fields: &FormFields) -> Result<SubmissionPayload, ValidationError> {
    let payload = fields.trimmed();
    if payload.name.is_empty() || payload.email.is_empty() || payload.message.is_empty() {
        return Err(ValidationError::MissingFields);
    }
    if !email_pattern().is_match(&payload.email) {
        return Err(ValidationError::InvalidEmail);
    }
    Ok(payload)
}
