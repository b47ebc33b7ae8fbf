//! HTTP clients for the CRM and the messaging provider.
//!
//! Both APIs are internal GraphQL endpoints reached with synchronous `ureq`
//! requests. A GraphQL POST that receives any HTTP response yields an
//! [`ApiResponse`] carrying the status and the body; only transport failures
//! become [`ApiError`]s. Callers decide what a non-200 status means.

pub mod crm;
pub mod messaging;

pub use crm::{parse_cookies, CrmClient, CrmSession};
pub use messaging::{AssignOutcome, MessagingClient};

use crate::error::{ApiError, ApiResult};
use crate::metrics::Metrics;
use serde_json::Value;
use std::io::{self, Read};
use std::time::{Duration, Instant};

/// Status and body of a GraphQL call.
///
/// Bodies that are not JSON are kept verbatim as `{"raw": "<text>"}` so they
/// can be shown in diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: u16,
    pub data: Value,
}

impl ApiResponse {
    pub fn new(status: u16, data: Value) -> Self {
        Self { status, data }
    }

    /// Build a response from a status code and raw body text.
    pub fn from_text(status: u16, text: &str) -> Self {
        let data = serde_json::from_str(text)
            .unwrap_or_else(|_| serde_json::json!({ "raw": text }));
        Self { status, data }
    }

    fn read(response: ureq::Response) -> Self {
        let status = response.status();
        let mut bytes = Vec::new();
        if let Err(e) = response.into_reader().read_to_end(&mut bytes) {
            tracing::warn!("Response body truncated after {} bytes: {}", bytes.len(), e);
        }
        Self::from_text(status, &String::from_utf8_lossy(&bytes))
    }

    /// Whether the transport reported success (exactly 200).
    pub fn is_ok(&self) -> bool {
        self.status == 200
    }
}

pub(crate) fn build_agent(timeout_secs: u64) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
}

/// POST a JSON body and capture the response, whatever its status.
pub(crate) fn post_json(
    request: ureq::Request,
    body: &Value,
    metrics: &Metrics,
) -> ApiResult<ApiResponse> {
    let start = Instant::now();
    let url = request.url().to_string();

    tracing::debug!("POST {}", url);
    tracing::debug!(
        "Request body: {}",
        serde_json::to_string_pretty(body).unwrap_or_else(|_| "<invalid json>".to_string())
    );

    let result = match request.send_json(body) {
        Ok(response) => Ok(ApiResponse::read(response)),
        Err(ureq::Error::Status(_, response)) => Ok(ApiResponse::read(response)),
        Err(ureq::Error::Transport(transport)) => Err(map_transport_error(transport)),
    };

    metrics.record_http_request(start.elapsed());
    match &result {
        Ok(response) if response.is_ok() => {
            tracing::debug!("POST {} - Success (status: {})", url, response.status);
        }
        Ok(response) => {
            tracing::debug!("POST {} - Status {}", url, response.status);
            metrics.record_http_error();
        }
        Err(e) => {
            tracing::error!("POST {} - Error: {:?}", url, e);
            metrics.record_http_error();
        }
    }

    result
}

fn map_transport_error(transport: ureq::Transport) -> ApiError {
    if is_timeout(&transport) {
        return ApiError::Timeout;
    }
    match transport.kind() {
        ureq::ErrorKind::ConnectionFailed => {
            ApiError::HttpError(format!("Connection failed: {}", transport))
        }
        _ => ApiError::HttpError(transport.to_string()),
    }
}

fn is_timeout(transport: &ureq::Transport) -> bool {
    std::error::Error::source(transport)
        .and_then(|source| source.downcast_ref::<io::Error>())
        .map(|e| matches!(e.kind(), io::ErrorKind::TimedOut | io::ErrorKind::WouldBlock))
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_text_json() {
        let response = ApiResponse::from_text(200, r#"{"data": {"ok": true}}"#);
        assert!(response.is_ok());
        assert_eq!(response.data, json!({"data": {"ok": true}}));
    }

    #[test]
    fn test_from_text_keeps_raw_body() {
        let response = ApiResponse::from_text(502, "<html>Bad gateway</html>");
        assert!(!response.is_ok());
        assert_eq!(response.data, json!({"raw": "<html>Bad gateway</html>"}));
    }

    fn transport_error(kind: io::ErrorKind, message: &str) -> ApiError {
        match ureq::Error::from(io::Error::new(kind, message.to_string())) {
            ureq::Error::Transport(transport) => map_transport_error(transport),
            other => panic!("Expected transport error, got: {:?}", other),
        }
    }

    #[test]
    fn test_timeout_is_mapped_to_timeout() {
        assert!(matches!(
            transport_error(io::ErrorKind::TimedOut, "timed out reading response"),
            ApiError::Timeout
        ));
        assert!(matches!(
            transport_error(io::ErrorKind::WouldBlock, "resource temporarily unavailable"),
            ApiError::Timeout
        ));
    }

    #[test]
    fn test_other_io_errors_keep_their_message() {
        match transport_error(io::ErrorKind::ConnectionReset, "connection reset by peer") {
            ApiError::HttpError(message) => assert!(message.contains("connection reset by peer")),
            other => panic!("Expected HttpError, got: {:?}", other),
        }
    }

    #[test]
    fn test_only_200_is_ok() {
        assert!(!ApiResponse::new(201, Value::Null).is_ok());
        assert!(!ApiResponse::new(401, Value::Null).is_ok());
    }
}
