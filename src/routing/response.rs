//! Response interpretation.
//!
//! Turns a transport result into a report id or a failure kind.
//!
//! # Decision Tree
//! 1. No response -> NetworkError
//! 2. Non-2xx status -> ServerRejected
//! 3. Empty body -> MalformedResponse
//! 4. Body not a JSON object, or the expected key missing -> MalformedResponse
//! 5. Otherwise the endpoint-specific verdict

use serde_json::{Map, Value};

use crate::error::TransportError;
use crate::logging::structured::LogContext;
use crate::pipeline::transport::ResponseReceived;

use super::outcome::FailureKind;

/// Key holding the report id in a collection response.
pub const REPORT_ID_KEY: &str = "identity";
/// Key holding the verdict in an account response.
pub const SUCCESS_KEY: &str = "success";

/// Classify a collection-endpoint response.
pub fn interpret_report_response(
    result: Result<ResponseReceived, TransportError>,
    ctx: &LogContext,
) -> Result<String, FailureKind> {
    let object = response_object(result, ctx)?;

    match object.get(REPORT_ID_KEY) {
        Some(Value::String(id)) if !id.trim().is_empty() => Ok(id.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        other => {
            log::warn!(
                "{} RESPONSE_MISSING_FIELD key={} found={:?}",
                ctx,
                REPORT_ID_KEY,
                other
            );
            Err(FailureKind::MalformedResponse)
        }
    }
}

/// Classify an account-endpoint response.
pub fn interpret_account_response(
    result: Result<ResponseReceived, TransportError>,
    ctx: &LogContext,
) -> Result<(), FailureKind> {
    let object = response_object(result, ctx)?;

    match object.get(SUCCESS_KEY) {
        Some(Value::Bool(true)) => Ok(()),
        Some(Value::Bool(false)) => {
            log::warn!("{} ACCOUNT_REJECTED success=false", ctx);
            Err(FailureKind::ServerRejected)
        }
        other => {
            log::warn!(
                "{} RESPONSE_MISSING_FIELD key={} found={:?}",
                ctx,
                SUCCESS_KEY,
                other
            );
            Err(FailureKind::MalformedResponse)
        }
    }
}

/// Steps 1-4 of the decision tree.
fn response_object(
    result: Result<ResponseReceived, TransportError>,
    ctx: &LogContext,
) -> Result<Map<String, Value>, FailureKind> {
    let response = match result {
        Ok(response) => response,
        Err(e) => {
            log::warn!("{} RESPONSE_NONE error={}", ctx, e);
            return Err(FailureKind::NetworkError);
        }
    };

    if !response.is_success() {
        log::warn!("{} RESPONSE_REJECTED status={}", ctx, response.status);
        return Err(FailureKind::ServerRejected);
    }

    if response.body.iter().all(u8::is_ascii_whitespace) {
        log::warn!("{} RESPONSE_EMPTY status={}", ctx, response.status);
        return Err(FailureKind::MalformedResponse);
    }

    match serde_json::from_slice::<Value>(&response.body) {
        Ok(Value::Object(object)) => {
            log::debug!("{} RESPONSE_PARSED keys={:?}", ctx, object.keys().collect::<Vec<_>>());
            Ok(object)
        }
        Ok(other) => {
            log::warn!("{} RESPONSE_NOT_OBJECT body={}", ctx, other);
            Err(FailureKind::MalformedResponse)
        }
        Err(e) => {
            log::warn!("{} RESPONSE_PARSE_FAILED error={}", ctx, e);
            Err(FailureKind::MalformedResponse)
        }
    }
}
