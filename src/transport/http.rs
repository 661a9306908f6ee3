//! HTTP transport over reqwest

use super::{SearchTransport, TransportError};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;

/// Search endpoint, relative to the backend base URL
pub const SEARCH_PATH: &str = "/api/search";

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Posts intents to `{base_url}/api/search`
pub struct HttpTransport {
    client: Client,
    endpoint: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, TransportError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| TransportError::unknown(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}{SEARCH_PATH}", base_url.trim_end_matches('/')),
        })
    }
}

#[async_trait]
impl SearchTransport for HttpTransport {
    async fn send(&self, body: Vec<u8>) -> Result<Vec<u8>, TransportError> {
        let correlation_id = uuid::Uuid::new_v4().to_string();
        tracing::debug!(endpoint = %self.endpoint, %correlation_id, "Posting intent");

        let response = self
            .client
            .post(&self.endpoint)
            .header(CONTENT_TYPE, "application/json")
            .header(ACCEPT, "application/json")
            .header(REQUEST_ID_HEADER, &correlation_id)
            .body(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    TransportError::timeout(format!("Request timeout: {e}"))
                } else if e.is_connect() {
                    TransportError::network(format!("Connection failed: {e}"))
                } else {
                    TransportError::unknown(format!("Request failed: {e}"))
                }
            })?;

        let status = response.status();
        let body = response
            .bytes()
            .await
            .map_err(|e| TransportError::network(format!("Failed to read response: {e}")))?;

        if !status.is_success() {
            return Err(TransportError::from_status(
                status.as_u16(),
                &String::from_utf8_lossy(&body),
            ));
        }

        Ok(body.to_vec())
    }

    fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::TransportErrorKind;
    use axum::{http::HeaderMap, http::StatusCode, routing::post, Router};
    use std::net::SocketAddr;

    async fn serve(router: Router) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        addr
    }

    #[test]
    fn endpoint_joins_base_url() {
        let transport = HttpTransport::new("http://backend:8080/", Duration::from_secs(1)).unwrap();
        assert_eq!(transport.endpoint(), "http://backend:8080/api/search");
    }

    #[tokio::test]
    async fn posts_body_and_returns_response_bytes() {
        let router = Router::new().route(
            SEARCH_PATH,
            post(|headers: HeaderMap, body: String| async move {
                let content_type = headers
                    .get("content-type")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                let has_request_id = headers.contains_key(REQUEST_ID_HEADER);
                format!("{content_type}|{has_request_id}|{body}")
            }),
        );
        let addr = serve(router).await;

        let transport = HttpTransport::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let body = transport.send(b"{\"q\":1}".to_vec()).await.unwrap();
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "application/json|true|{\"q\":1}"
        );
    }

    #[tokio::test]
    async fn non_success_status_is_classified() {
        let router = Router::new().route(
            SEARCH_PATH,
            post(|| async { (StatusCode::SERVICE_UNAVAILABLE, "indexer down") }),
        );
        let addr = serve(router).await;

        let transport = HttpTransport::new(&format!("http://{addr}"), Duration::from_secs(5)).unwrap();
        let err = transport.send(Vec::new()).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::ServerError);
        assert_eq!(err.status, Some(503));
        assert!(err.message.contains("indexer down"));
    }

    #[tokio::test]
    async fn slow_backend_times_out() {
        let router = Router::new().route(
            SEARCH_PATH,
            post(|| async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                "late"
            }),
        );
        let addr = serve(router).await;

        let transport =
            HttpTransport::new(&format!("http://{addr}"), Duration::from_millis(100)).unwrap();
        let err = transport.send(Vec::new()).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Timeout);
    }

    #[tokio::test]
    async fn unreachable_backend_is_a_network_error() {
        // Bind then drop to get a port nothing listens on
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let transport = HttpTransport::new(&format!("http://{addr}"), Duration::from_secs(2)).unwrap();
        let err = transport.send(Vec::new()).await.unwrap_err();
        assert_eq!(err.kind, TransportErrorKind::Network);
    }
}
