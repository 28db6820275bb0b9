//! Signed webhook transport.
//!
//! One HTTP POST per dispatch attempt. The JSON body is signed with the
//! subscriber's shared secret (HMAC-SHA256, hex, in the
//! `x-relay-signature` header) so receivers can authenticate the sender.

use std::time::Duration;

use relay_core::signing::{sign_body, SIGNATURE_HEADER};

use super::{EventEnvelope, Outcome};

/// Default per-attempt request timeout.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Webhook HTTP transport.
///
/// Two pre-built clients: TLS verification is a per-subscriber choice, and
/// reqwest clients are immutable after construction.
pub struct WebhookTransport {
    client: reqwest::Client,
    insecure_client: reqwest::Client,
}

impl WebhookTransport {
    /// Build the transport with the given per-attempt timeout.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        let insecure_client = reqwest::Client::builder()
            .timeout(timeout)
            .danger_accept_invalid_certs(true)
            .build()?;
        Ok(Self {
            client,
            insecure_client,
        })
    }

    /// Execute one signed POST and classify the result.
    ///
    /// Classification:
    /// - 2xx → success
    /// - 408, 429, 5xx, or a request error (DNS, connect, timeout) → transient
    /// - any other status → permanent
    pub async fn send(
        &self,
        url: &str,
        secret: &str,
        verify_tls: bool,
        envelope: &EventEnvelope,
    ) -> Outcome {
        let body = match serde_json::to_vec(envelope) {
            Ok(body) => body,
            Err(e) => {
                return Outcome::Permanent {
                    reason: format!("failed to encode event body: {e}"),
                }
            }
        };
        let signature = sign_body(secret, &body);

        if !verify_tls {
            tracing::warn!(url, "Dispatching webhook without TLS verification");
        }
        let client = if verify_tls {
            &self.client
        } else {
            &self.insecure_client
        };

        let response = client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json")
            .header(SIGNATURE_HEADER, signature)
            .body(body)
            .send()
            .await;

        match response {
            Ok(response) => Self::classify_status(response.status()),
            Err(e) => Outcome::Transient {
                reason: format!("request failed: {e}"),
            },
        }
    }

    fn classify_status(status: reqwest::StatusCode) -> Outcome {
        if status.is_success() {
            return Outcome::Success {
                status_code: Some(status.as_u16() as i64),
            };
        }
        let retryable = status.is_server_error()
            || status == reqwest::StatusCode::REQUEST_TIMEOUT
            || status == reqwest::StatusCode::TOO_MANY_REQUESTS;
        if retryable {
            Outcome::Transient {
                reason: format!("HTTP {}", status.as_u16()),
            }
        } else {
            Outcome::Permanent {
                reason: format!("HTTP {}", status.as_u16()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use reqwest::StatusCode;

    #[test]
    fn success_statuses() {
        assert_matches!(
            WebhookTransport::classify_status(StatusCode::OK),
            Outcome::Success {
                status_code: Some(200)
            }
        );
        assert_matches!(
            WebhookTransport::classify_status(StatusCode::NO_CONTENT),
            Outcome::Success {
                status_code: Some(204)
            }
        );
    }

    #[test]
    fn retryable_statuses() {
        for status in [
            StatusCode::REQUEST_TIMEOUT,
            StatusCode::TOO_MANY_REQUESTS,
            StatusCode::INTERNAL_SERVER_ERROR,
            StatusCode::BAD_GATEWAY,
            StatusCode::SERVICE_UNAVAILABLE,
        ] {
            assert_matches!(
                WebhookTransport::classify_status(status),
                Outcome::Transient { .. },
                "{status}"
            );
        }
    }

    #[test]
    fn permanent_statuses() {
        for status in [
            StatusCode::BAD_REQUEST,
            StatusCode::UNAUTHORIZED,
            StatusCode::FORBIDDEN,
            StatusCode::NOT_FOUND,
            StatusCode::GONE,
        ] {
            assert_matches!(
                WebhookTransport::classify_status(status),
                Outcome::Permanent { .. },
                "{status}"
            );
        }
    }
}
