//! Report submission.
//!
//! One POST per call, one outcome per call. No retry; the transport's
//! deadline is the only bound on how long a caller waits.

use std::sync::Arc;

use crate::logging::structured::LogContext;
use crate::routing::{interpret_report_response, SubmissionOutcome};

use super::context::{AttemptContext, AttemptKind};
use super::report::ReportPayload;
use super::transport::Transport;

pub struct SubmissionClient {
    transport: Arc<dyn Transport>,
    endpoint: String,
    ctx: LogContext,
}

impl SubmissionClient {
    pub fn new(transport: Arc<dyn Transport>, endpoint: &str, ctx: &LogContext) -> Self {
        Self {
            transport,
            endpoint: endpoint.to_string(),
            ctx: ctx.clone(),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Send the payload and classify the reply.
    pub async fn submit(&self, payload: &ReportPayload) -> SubmissionOutcome {
        let attempt = AttemptContext::new(&self.ctx, AttemptKind::Report);
        let ctx = attempt.log_context();

        let body = match serde_json::to_vec(payload) {
            Ok(body) => body,
            Err(e) => {
                // Nothing left the device.
                log::error!("{} REPORT_ENCODE_FAILED error={}", ctx, e);
                return SubmissionOutcome::NetworkError;
            }
        };

        log::info!(
            "{} REPORT_SUBMIT_START endpoint={} postal_code={} accuracy_m={} bytes={}",
            ctx,
            self.endpoint,
            payload.postal_address().postal_code,
            payload.coordinate().accuracy,
            body.len()
        );

        let result = self.transport.post_json(&self.endpoint, body).await;
        let outcome = SubmissionOutcome::from(interpret_report_response(result, ctx));

        match &outcome {
            SubmissionOutcome::Success { report_id } => log::info!(
                "{} REPORT_SUBMIT_COMPLETE outcome=success report_id={} elapsed_ms={}",
                ctx,
                report_id,
                attempt.elapsed_ms()
            ),
            other => log::warn!(
                "{} REPORT_SUBMIT_COMPLETE outcome={} elapsed_ms={}",
                ctx,
                other.as_str(),
                attempt.elapsed_ms()
            ),
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;
    use crate::error::TransportError;
    use crate::pipeline::report::ReportBuilder;
    use crate::pipeline::transport::{MockTransport, ResponseReceived};
    use crate::storage::Identity;
    use crate::validation::PostalAddress;

    fn payload() -> ReportPayload {
        let identity = Identity {
            id: "device-1".to_string(),
            accepts_open_license: true,
            first_name: "Anna".to_string(),
            last_name: "Svensson".to_string(),
            email: "anna@example.se".to_string(),
            updated_at: Utc::now(),
        };
        let address = PostalAddress {
            postal_code: "12345".to_string(),
            postal_town: "Stockholm".to_string(),
            street_name: "Main Street".to_string(),
            house_number: "1".to_string(),
            house_name: String::new(),
        };
        ReportBuilder::new("insamlingsappen-ios", "1.0").build(&address, None, &identity)
    }

    fn client(transport: MockTransport) -> SubmissionClient {
        SubmissionClient::new(
            Arc::new(transport),
            "http://collector.test/api/0.0.5/location_sample/create",
            &LogContext::new("test-session"),
        )
    }

    #[tokio::test]
    async fn test_success_sends_exactly_once() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .withf(|url, body| {
                let value: serde_json::Value = serde_json::from_slice(body).unwrap();
                url.ends_with("/location_sample/create") && value["accountIdentity"] == "device-1"
            })
            .times(1)
            .returning(|_, _| {
                Ok(ResponseReceived {
                    status: 200,
                    body: br#"{"identity":"123"}"#.to_vec(),
                })
            });

        let outcome = client(transport).submit(&payload()).await;
        assert_eq!(
            outcome,
            SubmissionOutcome::Success {
                report_id: "123".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_transport_failure_is_network_error() {
        let mut transport = MockTransport::new();
        transport
            .expect_post_json()
            .times(1)
            .returning(|_, _| Err(TransportError::Timeout));

        assert_eq!(
            client(transport).submit(&payload()).await,
            SubmissionOutcome::NetworkError
        );
    }

    #[tokio::test]
    async fn test_empty_body_is_malformed() {
        let mut transport = MockTransport::new();
        transport.expect_post_json().times(1).returning(|_, _| {
            Ok(ResponseReceived {
                status: 200,
                body: Vec::new(),
            })
        });

        assert_eq!(
            client(transport).submit(&payload()).await,
            SubmissionOutcome::MalformedResponse
        );
    }
}
