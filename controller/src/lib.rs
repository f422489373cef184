//! The contact form submission controller.
//!
//! [`ContactFormController`] binds the pure state machine from
//! `formrelay-types` to a [`RelaySink`] from `formrelay-client`. Field edits
//! are synchronous; `submit` is the single suspension point, and the
//! `Submitting` state doubles as the in-flight guard: a second `submit`
//! issued while the first is awaiting the relay is a no-op, so one form
//! instance can never have two concurrent network calls.
//!
//! The mutex around the form is never held across the network await. Only
//! the `begin_submit` / `finish_submit` transitions run under the lock.

use std::sync::{Mutex, MutexGuard, PoisonError};

use formrelay_client::{RelayClient, RelaySink};
use formrelay_types::{ContactForm, Field, FormFields, SubmissionState, SubmitGate};

/// Owns one form's fields and submission state, plus the relay used to
/// deliver it. One instance backs one rendered form.
pub struct ContactFormController<R = RelayClient> {
    form: Mutex<ContactForm>,
    relay: R,
}

impl ContactFormController<RelayClient> {
    /// Controller against the configured relay endpoint.
    #[must_use]
    pub fn new() -> Self {
        Self::with_relay(RelayClient::new())
    }
}

impl Default for ContactFormController<RelayClient> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: RelaySink> ContactFormController<R> {
    /// Controller over an arbitrary delivery seam.
    pub fn with_relay(relay: R) -> Self {
        Self {
            form: Mutex::new(ContactForm::new()),
            relay,
        }
    }

    #[must_use]
    pub fn relay(&self) -> &R {
        &self.relay
    }

    // A poisoned lock only means a panic mid-transition elsewhere; the form
    // state itself is always coherent, so recover rather than propagate.
    fn form(&self) -> MutexGuard<'_, ContactForm> {
        self.form.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Overwrite one field. Never validates, never touches the network.
    pub fn update_field(&self, field: Field, value: impl Into<String>) {
        self.form().update_field(field, value);
    }

    /// Snapshot of the current submission state.
    #[must_use]
    pub fn state(&self) -> SubmissionState {
        self.form().state().clone()
    }

    /// Snapshot of the current field values.
    #[must_use]
    pub fn fields(&self) -> FormFields {
        self.form().fields().clone()
    }

    /// Run one submission attempt and return the resulting state.
    ///
    /// Validation failures settle synchronously to `Failed` with the inline
    /// message and never reach the network. A passing validation makes
    /// exactly one delivery attempt; the relay's own diagnostics go to
    /// `tracing`, while the state carries only the user-facing retry message.
    pub async fn submit(&self) -> SubmissionState {
        let gate = {
            let mut form = self.form();
            form.begin_submit()
        };

        let payload = match gate {
            SubmitGate::Send(payload) => payload,
            SubmitGate::InFlight => {
                tracing::debug!("Submit ignored; a submission is already in flight");
                return self.state();
            }
            SubmitGate::Rejected(err) => {
                tracing::debug!(%err, "Submission rejected by validation");
                return self.state();
            }
        };

        let outcome = self.relay.deliver(&payload).await;
        if let Err(e) = &outcome {
            tracing::warn!(error = %e, "Relay delivery failed");
        }

        let mut form = self.form();
        form.finish_submit(outcome.is_ok());
        form.state().clone()
    }
}


#[cfg(test)]
mod integration_tests {
    use formrelay_client::RelayClient;
    use formrelay_types::{Field, SEND_FAILED_MESSAGE, SubmissionState};
    use serde_json::json;
    use wiremock::matchers::{body_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::ContactFormController;

    fn controller_for(server: &MockServer) -> ContactFormController {
        let endpoint = format!("{}/f/test", server.uri())
            .parse()
            .expect("mock server uri is a valid URL");
        ContactFormController::with_relay(RelayClient::with_endpoint(endpoint))
    }

    #[tokio::test]
    async fn end_to_end_success_posts_trimmed_payload_and_clears_form() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/f/test"))
            .and(header("content-type", "application/json"))
            .and(body_json(json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "message": "hello"
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let controller = controller_for(&server);
        controller.update_field(Field::Name, "  Ada Lovelace ");
        controller.update_field(Field::Email, " ada@example.com ");
        controller.update_field(Field::Message, " hello ");

        let state = controller.submit().await;

        assert_eq!(state, SubmissionState::Succeeded);
        assert!(controller.fields().is_empty());
    }

    #[tokio::test]
    async fn end_to_end_relay_error_surfaces_retry_message_once() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/f/test"))
            .respond_with(ResponseTemplate::new(500))
            .expect(1) // single attempt - the controller never retries on its own
            .mount(&server)
            .await;

        let controller = controller_for(&server);
        controller.update_field(Field::Name, "A");
        controller.update_field(Field::Email, "a@b.co");
        controller.update_field(Field::Message, "hi");

        let state = controller.submit().await;

        assert_eq!(
            state,
            SubmissionState::Failed(SEND_FAILED_MESSAGE.to_string())
        );
        assert_eq!(controller.fields().get(Field::Message), "hi");
    }
}
