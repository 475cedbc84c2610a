//! HTTP transport.
//!
//! POSTs a JSON body and hands back whatever came back. Interpreting the
//! response is the job of [`crate::routing`].

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CACHE_CONTROL, CONTENT_TYPE, PRAGMA};
use reqwest::Client;

use crate::error::TransportError;

/// A response arrived; status and raw body, uninterpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseReceived {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ResponseReceived {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// One POST, no retry.
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<ResponseReceived, TransportError>;
}

/// `reqwest`-backed transport with a fixed per-request deadline.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .default_headers(Self::headers())
            .build()?;
        Ok(Self { client })
    }

    fn headers() -> HeaderMap {
        let json = HeaderValue::from_static("application/json");
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, json.clone());
        headers.insert(ACCEPT, json);
        // Always go to the origin.
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));
        headers.insert(PRAGMA, HeaderValue::from_static("no-cache"));
        headers
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post_json(&self, url: &str, body: Vec<u8>) -> Result<ResponseReceived, TransportError> {
        let response = self.client.post(url).body(body).send().await?;
        let status = response.status().as_u16();
        let body = response.bytes().await?.to_vec();
        Ok(ResponseReceived { status, body })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_posts_json_with_cache_bypass() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/echo")
            .match_header("content-type", "application/json")
            .match_header("accept", "application/json")
            .match_header("cache-control", "no-cache")
            .match_body(r#"{"a":1}"#)
            .with_status(201)
            .with_body("ok")
            .create_async()
            .await;

        let transport = HttpTransport::new(Duration::from_secs(5)).unwrap();
        let response = transport
            .post_json(&format!("{}/echo", server.url()), br#"{"a":1}"#.to_vec())
            .await
            .unwrap();

        mock.assert_async().await;
        assert_eq!(response.status, 201);
        assert!(response.is_success());
        assert_eq!(response.body, b"ok");
    }

    #[tokio::test]
    async fn test_unreachable_host_is_transport_error() {
        let transport = HttpTransport::new(Duration::from_secs(2)).unwrap();
        // Port 9 on loopback: nothing listens there.
        let result = transport
            .post_json("http://127.0.0.1:9/api", b"{}".to_vec())
            .await;
        assert!(result.is_err());
    }
}
