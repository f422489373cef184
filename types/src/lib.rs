//! Contact form domain types.
//!
//! This crate contains pure domain types with no IO, no async, and minimal
//! dependencies: the form fields, the trimmed submission payload, field
//! validation, and the per-form submission state machine. Everything here can
//! be driven synchronously and deterministically, which is where all the
//! behavior worth unit-testing lives; the HTTP layer sits on top in
//! `formrelay-client` and `formrelay-controller`.

mod form;
mod validate;

pub use form::{ContactForm, SEND_FAILED_MESSAGE, SubmissionState, SubmitGate};
pub use validate::{ValidationError, validate};

use serde::Serialize;

/// Selector for one of the three form fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Name,
    Email,
    Message,
}

/// Raw form field state, overwritten on every keystroke.
///
/// Values are stored exactly as typed. Trimming happens at the validation
/// boundary ([`validate`]), not on entry, so the user never sees their
/// in-progress input rewritten underneath them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormFields {
    name: String,
    email: String,
    message: String,
}

impl FormFields {
    /// Overwrite a single field. Never validates, always succeeds.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Message => &mut self.message,
        };
        *slot = value.into();
    }

    #[must_use]
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Message => &self.message,
        }
    }

    /// Reset all fields to empty strings.
    ///
    /// Only called on transition into `Succeeded`; a failed attempt keeps the
    /// typed input so the user can retry without re-entering it.
    pub(crate) fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.message.clear();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.name.is_empty() && self.email.is_empty() && self.message.is_empty()
    }

    /// The trimmed view of the fields, as it would be submitted.
    #[must_use]
    pub fn trimmed(&self) -> SubmissionPayload {
        SubmissionPayload {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            message: self.message.trim().to_string(),
        }
    }
}

/// The exact JSON body posted to the relay: `{name, email, message}`, all
/// trimmed. Constructed only by [`validate`] passing, so existence of a value
/// proves the fields were non-empty and the email matched the pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SubmissionPayload {
    pub name: String,
    pub email: String,
    pub message: String,
}
