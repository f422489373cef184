//! The per-form submission state machine.
//!
//! Transitions are strictly sequential per attempt:
//!
//! ```text
//! Idle ── begin_submit ──▶ Submitting ── finish_submit(true) ──▶ Succeeded
//!   ▲          │                │
//!   │          ▼                └── finish_submit(false) ──▶ Failed(retry msg)
//!   │     Failed(validation msg)
//!   └── (any later begin_submit restarts the cycle)
//! ```
//!
//! Invariant: fields are cleared only on the transition into `Succeeded`, so a
//! failed attempt never loses typed input.

use crate::{Field, FormFields, SubmissionPayload, ValidationError, validate};

/// Message surfaced inline when the relay call fails; retry is manual.
pub const SEND_FAILED_MESSAGE: &str = "Failed to send message. Please try again.";

/// Submission status of a single form instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SubmissionState {
    #[default]
    Idle,
    Submitting,
    Succeeded,
    /// The user-facing message, rendered verbatim inline.
    Failed(String),
}

impl SubmissionState {
    #[must_use]
    pub const fn is_submitting(&self) -> bool {
        matches!(self, Self::Submitting)
    }
}

/// Outcome of [`ContactForm::begin_submit`].
///
/// Sum type so the caller cannot accidentally issue a network call for a
/// rejected or already-in-flight attempt: only `Send` carries a payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitGate {
    /// Validation passed; deliver this payload, then call `finish_submit`.
    Send(SubmissionPayload),
    /// Validation failed; state is now `Failed` with the inline message.
    Rejected(ValidationError),
    /// A submission is already in flight; this attempt is a no-op.
    InFlight,
}

/// Field state plus submission status for one contact form.
///
/// Pure and synchronous. The async layer (`formrelay-controller`) drives the
/// `begin_submit` / `finish_submit` pair around the actual network call.
#[derive(Debug, Clone, Default)]
pub struct ContactForm {
    fields: FormFields,
    state: SubmissionState,
}

impl ContactForm {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Overwrite one field. Never validates, never transitions state.
    pub fn update_field(&mut self, field: Field, value: impl Into<String>) {
        self.fields.set(field, value);
    }

    #[must_use]
    pub fn fields(&self) -> &FormFields {
        &self.fields
    }

    #[must_use]
    pub fn state(&self) -> &SubmissionState {
        &self.state
    }

    /// Start a submission attempt.
    ///
    /// While a previous attempt is still `Submitting` this is a no-op
    /// (`InFlight`), which is what keeps two rapid submits from producing two
    /// network calls. Otherwise validation runs; on failure the state moves
    /// to `Failed` with the inline message and no payload is produced.
    pub fn begin_submit(&mut self) -> SubmitGate {
        if self.state.is_submitting() {
            return SubmitGate::InFlight;
        }
        match validate(&self.fields) {
            Ok(payload) => {
                self.state = SubmissionState::Submitting;
                SubmitGate::Send(payload)
            }
            Err(err) => {
                self.state = SubmissionState::Failed(err.to_string());
                SubmitGate::Rejected(err)
            }
        }
    }

    /// Record the delivery outcome of the in-flight attempt.
    ///
    /// Ignored unless the state is `Submitting`; `finish_submit` without a
    /// matching `begin_submit` must not clear fields or rewrite a settled
    /// state. Fields are cleared only here, only on success.
    pub fn finish_submit(&mut self, delivered: bool) {
        if !self.state.is_submitting() {
            return;
        }
        if delivered {
            self.fields.clear();
            self.state = SubmissionState::Succeeded;
        } else {
            self.state = SubmissionState::Failed(SEND_FAILED_MESSAGE.to_string());
        }
    }
}
