//! HTTP client for the hosted form-relay endpoint.
//!
//! The relay is a third-party service that accepts a JSON form submission and
//! forwards it as email, so no mail server has to be operated. The contract
//! is deliberately small:
//!
//! - one `POST` with body `{name, email, message}` per delivery
//! - any 2xx status is success; everything else is failure
//! - exactly one attempt, no retry, no backoff — retry is the user's, via the
//!   form's inline failure message
//!
//! Diagnostic detail (status, capped error body) goes to `tracing`; the
//! user-facing failure text lives in `formrelay-types` and never depends on
//! what the relay said.

use std::sync::OnceLock;
use std::time::Duration;

use formrelay_types::SubmissionPayload;
use url::Url;

/// Canonical hosted relay endpoint.
pub const RELAY_ENDPOINT_URL: &str = "https://formspree.io/f/xzzpvenq";

const CONNECT_TIMEOUT_SECS: u64 = 10;
const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 10;

const MAX_ERROR_BODY_BYTES: usize = 8 * 1024;

/// Delivery failures. `Status` is a reachable relay that said no;
/// `Transport` is a connection error or timeout before any status arrived.
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    #[error("relay returned HTTP {status}")]
    Status {
        status: reqwest::StatusCode,
        /// Message extracted from the relay's JSON error body, when present.
        detail: Option<String>,
    },
    #[error("relay request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// The seam between the submission controller and the network.
///
/// Implementations must make at most one attempt per call.
pub trait RelaySink {
    fn deliver(
        &self,
        payload: &SubmissionPayload,
    ) -> impl Future<Output = Result<(), RelayError>> + Send;
}

/// Shared HTTP client for relay deliveries.
///
/// The whole request is bounded by the request timeout, so a hung relay
/// resolves to `Transport` rather than leaving the form stuck in
/// `Submitting`.
pub fn http_client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        base_client_builder().build().unwrap_or_else(|e| {
            tracing::error!("Failed to build relay HTTP client: {e}. Falling back to defaults.");
            reqwest::Client::new()
        })
    })
}

fn base_client_builder() -> reqwest::ClientBuilder {
    reqwest::Client::builder()
        .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
        .timeout(request_timeout())
        .redirect(reqwest::redirect::Policy::none())
}

/// Request timeout, overridable via `FORMRELAY_TIMEOUT_SECS`.
pub(crate) fn request_timeout() -> Duration {
    static TIMEOUT: OnceLock<Duration> = OnceLock::new();
    *TIMEOUT.get_or_init(|| {
        let timeout = std::env::var("FORMRELAY_TIMEOUT_SECS")
            .ok()
            .and_then(|value| value.parse::<u64>().ok())
            .filter(|value| *value > 0)
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(timeout)
    })
}

/// Relay endpoint, overridable via `FORMRELAY_ENDPOINT`.
///
/// An override that does not parse as a URL is logged and ignored rather than
/// silently swallowing submissions.
fn default_endpoint() -> &'static Url {
    static ENDPOINT: OnceLock<Url> = OnceLock::new();
    ENDPOINT.get_or_init(|| {
        if let Ok(raw) = std::env::var("FORMRELAY_ENDPOINT") {
            match Url::parse(&raw) {
                Ok(url) => return url,
                Err(e) => {
                    tracing::warn!(%e, "Invalid FORMRELAY_ENDPOINT override; using default relay");
                }
            }
        }
        Url::parse(RELAY_ENDPOINT_URL).expect("default relay endpoint is a valid URL literal")
    })
}

/// Read an error response body, capped so a misbehaving relay cannot make us
/// buffer arbitrary amounts of data just to log a failure.
async fn read_capped_error_body(response: reqwest::Response) -> String {
    use futures_util::StreamExt;
    let mut body = Vec::new();
    let mut stream = response.bytes_stream();
    while let Some(chunk) = stream.next().await {
        let Ok(chunk) = chunk else { break };
        body.extend_from_slice(&chunk);
        if body.len() > MAX_ERROR_BODY_BYTES {
            body.truncate(MAX_ERROR_BODY_BYTES);
            let text = String::from_utf8_lossy(&body);
            return format!("{text}...(truncated)");
        }
    }
    String::from_utf8_lossy(&body).into_owned()
}

/// Pull a human-readable message out of a relay JSON error body.
///
/// Formspree-style relays answer with `{"error": "..."}` or
/// `{"errors": [{"message": "..."}]}`; a plain `{"message": "..."}` is
/// accepted too. Anything else yields `None` and the raw (capped) body is
/// logged instead.
fn extract_relay_error_message(raw: &str) -> Option<String> {
    let payload: serde_json::Value = serde_json::from_str(raw).ok()?;
    payload
        .pointer("/error")
        .and_then(|value| value.as_str())
        .or_else(|| {
            payload
                .pointer("/errors/0/message")
                .and_then(|value| value.as_str())
        })
        .or_else(|| payload.pointer("/message").and_then(|value| value.as_str()))
        .map(ToString::to_string)
}

/// Relay client bound to one endpoint.
///
/// Cheap to clone; the underlying `reqwest::Client` is shared.
#[derive(Debug, Clone)]
pub struct RelayClient {
    client: reqwest::Client,
    endpoint: Url,
}

impl RelayClient {
    /// Client against the configured relay endpoint
    /// (`FORMRELAY_ENDPOINT` override, else [`RELAY_ENDPOINT_URL`]).
    #[must_use]
    pub fn new() -> Self {
        Self::with_endpoint(default_endpoint().clone())
    }

    /// Client against an explicit endpoint.
    #[must_use]
    pub fn with_endpoint(endpoint: Url) -> Self {
        Self {
            client: http_client().clone(),
            endpoint,
        }
    }

    #[must_use]
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

impl Default for RelayClient {
    fn default() -> Self {
        Self::new()
    }
}

impl RelaySink for RelayClient {
    async fn deliver(&self, payload: &SubmissionPayload) -> Result<(), RelayError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .json(payload)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            tracing::debug!(%status, "Relay accepted submission");
            return Ok(());
        }

        let body = read_capped_error_body(response).await;
        let detail = extract_relay_error_message(&body);
        tracing::warn!(
            %status,
            detail = detail.as_deref().unwrap_or(&body),
            "Relay rejected submission"
        );
        Err(RelayError::Status { status, detail })
    }
}

#[cfg(test)]
mod tests {
    use super::extract_relay_error_message;

    #[test]
    fn extracts_top_level_error_string() {
        let raw = r#"{"error": "form disabled"}"#;
        assert_eq!(
            extract_relay_error_message(raw),
            Some("form disabled".to_string())
        );
    }

    #[test]
    fn extracts_first_message_from_errors_array() {
        let raw = r#"{"errors": [{"field": "email", "message": "should be an email"}]}"#;
        assert_eq!(
            extract_relay_error_message(raw),
            Some("should be an email".to_string())
        );
    }

    #[test]
    fn extracts_plain_message_field() {
        let raw = r#"{"message": "try later"}"#;
        assert_eq!(extract_relay_error_message(raw), Some("try later".to_string()));
    }

    #[test]
    fn returns_none_for_non_json_body() {
        assert_eq!(extract_relay_error_message("<html>502</html>"), None);
        assert_eq!(extract_relay_error_message(""), None);
    }

    #[test]
    fn returns_none_for_json_without_known_shape() {
        assert_eq!(extract_relay_error_message(r#"{"ok": false}"#), None);
    }
}
