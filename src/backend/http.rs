use crate::backend::{BackendError, SqlGenerator};
use crate::config::BackendConfig;
use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// HTTP client for the remote text-to-SQL service.
///
/// The service contract is a single endpoint: `POST {base_url}/generate`
/// with body `{"text": ...}` answered by `{"query": ...}` on 200. The base
/// URL is supplied per call because the user can edit it in the page.
pub struct HttpBackend {
    client: reqwest::Client,
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    query: String,
}

impl HttpBackend {
    pub fn new(config: &BackendConfig) -> Result<Self, BackendError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| BackendError::ConnectionError(e.to_string()))?;

        Ok(Self { client })
    }

    fn endpoint(base_url: &str) -> Result<Url, BackendError> {
        // Fail fast on a malformed URL instead of letting the request layer
        // report it as a connection problem.
        let trimmed = base_url.trim().trim_end_matches('/');
        if trimmed.is_empty() {
            return Err(BackendError::InvalidUrl("backend URL is empty".to_string()));
        }

        let url = Url::parse(&format!("{}/generate", trimmed))
            .map_err(|e| BackendError::InvalidUrl(format!("{}: {}", base_url, e)))?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(BackendError::InvalidUrl(format!(
                "unsupported scheme '{}'",
                other
            ))),
        }
    }
}

#[async_trait]
impl SqlGenerator for HttpBackend {
    async fn generate(&self, text: &str, base_url: &str) -> Result<String, BackendError> {
        let endpoint = Self::endpoint(base_url)?;
        debug!("Sending generate request to {}", endpoint);

        let request = GenerateRequest { text };

        let response = self
            .client
            .post(endpoint)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    BackendError::Timeout(e.to_string())
                } else {
                    BackendError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        if status != StatusCode::OK {
            // The body is opaque human-readable error text; surface it as-is.
            let body = response
                .text()
                .await
                .unwrap_or_else(|e| format!("<unreadable body: {}>", e));
            return Err(BackendError::ResponseError {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: GenerateResponse = response
            .json()
            .await
            .map_err(|e| BackendError::InvalidResponse(e.to_string()))?;

        Ok(parsed.query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum::routing::post;
    use axum::{Json, Router};

    fn backend(timeout_secs: u64) -> HttpBackend {
        HttpBackend::new(&BackendConfig {
            default_url: String::new(),
            timeout_secs,
        })
        .unwrap()
    }

    /// Serves the given router on an ephemeral port, stands in for the
    /// remote text-to-SQL service.
    async fn spawn_fake_service(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn returns_query_field_on_200() {
        let router = Router::new().route(
            "/generate",
            post(|Json(req): Json<serde_json::Value>| async move {
                assert_eq!(
                    req["text"],
                    "Show me all users who signed up in the last 30 days"
                );
                Json(serde_json::json!({
                    "query": "SELECT * FROM users WHERE signup_date >= NOW() - INTERVAL 30 DAY"
                }))
            }),
        );
        let base_url = spawn_fake_service(router).await;

        let sql = backend(5)
            .generate(
                "Show me all users who signed up in the last 30 days",
                &base_url,
            )
            .await
            .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE signup_date >= NOW() - INTERVAL 30 DAY"
        );
    }

    #[tokio::test]
    async fn trailing_slash_in_base_url_is_tolerated() {
        let router = Router::new().route(
            "/generate",
            post(|| async { Json(serde_json::json!({"query": "SELECT 1"})) }),
        );
        let base_url = spawn_fake_service(router).await;

        let sql = backend(5)
            .generate("anything", &format!("{}/", base_url))
            .await
            .unwrap();
        assert_eq!(sql, "SELECT 1");
    }

    #[tokio::test]
    async fn non_200_surfaces_raw_body() {
        let router = Router::new().route(
            "/generate",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "internal error") }),
        );
        let base_url = spawn_fake_service(router).await;

        let err = backend(5).generate("q", &base_url).await.unwrap_err();
        match err {
            BackendError::ResponseError { status, body } => {
                assert_eq!(status, 500);
                assert_eq!(body, "internal error");
            }
            other => panic!("expected ResponseError, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn missing_query_field_is_invalid_response() {
        let router = Router::new().route(
            "/generate",
            post(|| async { Json(serde_json::json!({"sql": "SELECT 1"})) }),
        );
        let base_url = spawn_fake_service(router).await;

        let err = backend(5).generate("q", &base_url).await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn unreachable_service_is_a_connection_error() {
        // Bind then drop so the port is known-dead.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let err = backend(5)
            .generate("q", &format!("http://{}", addr))
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ConnectionError(_)));
    }

    #[tokio::test]
    async fn slow_service_times_out_distinctly() {
        let router = Router::new().route(
            "/generate",
            post(|| async {
                tokio::time::sleep(std::time::Duration::from_secs(5)).await;
                Json(serde_json::json!({"query": "SELECT 1"}))
            }),
        );
        let base_url = spawn_fake_service(router).await;

        let err = backend(1).generate("q", &base_url).await.unwrap_err();
        assert!(matches!(err, BackendError::Timeout(_)));
    }

    #[tokio::test]
    async fn malformed_url_fails_fast() {
        let err = backend(5).generate("q", "not a url").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidUrl(_)));

        let err = backend(5).generate("q", "ftp://example.com").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidUrl(_)));

        let err = backend(5).generate("q", "   ").await.unwrap_err();
        assert!(matches!(err, BackendError::InvalidUrl(_)));
    }
}
