//
//  bosh-cli
//  director/transport.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/04.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Transports
//!
//! A [`Transport`] performs one logical exchange with the Director. Transports
//! stack: each layer receives the request, may adjust or repeat it, and hands
//! it to the layer below. The assembled stack, outermost first, is
//!
//! ```text
//! AdjustableClient -> RetryTransport -> RedirectingTransport -> HttpTransport
//! ```
//!
//! - [`HttpTransport`] turns a [`DirectorRequest`] into a single `reqwest` call.
//! - [`RetryTransport`] repeats requests that failed at the network level.
//!
//! Requests are passed as `&mut` so outer layers can observe what inner layers
//! stamped on them (the `Authorization` header in particular).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, Method, Response, StatusCode};
use tracing::{debug, warn};

use super::error::{DirectorError, Result};
use super::request::DirectorRequest;
use crate::util::redact_url;

/// Default number of attempts made by [`RetryTransport`].
pub const DEFAULT_RETRY_ATTEMPTS: u32 = 5;

/// Default pause between [`RetryTransport`] attempts.
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_millis(500);

/// One logical request/response exchange with the Director.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Dispatches `request` and returns the response, whatever its status.
    ///
    /// Only failures to obtain a response are errors at this level.
    async fn execute(&self, request: &mut DirectorRequest) -> Result<Response>;
}

/// The bottom of the stack: a single HTTP exchange through `reqwest`.
///
/// The wrapped client must have its own redirect following disabled; redirects
/// are handled by [`RedirectingTransport`](super::redirect::RedirectingTransport).
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn execute(&self, request: &mut DirectorRequest) -> Result<Response> {
        let method = request.method().clone();

        debug!(
            method = %method,
            endpoint = %redact_url(request.url()),
            retried = request.is_retried(),
            "Sending request to director"
        );

        let mut builder = self
            .client
            .request(method.clone(), request.url().clone())
            .headers(request.headers().clone());

        let body = request
            .dispatch_body()
            .await
            .map_err(|err| DirectorError::io("Opening request body", err))?;

        if let Some((body, length)) = body {
            if let Some(length) = length {
                builder = builder.header(CONTENT_LENGTH, length);
            }
            builder = builder.body(body);
        }

        builder
            .send()
            .await
            .map_err(|source| DirectorError::transport(format!("Performing {method} request"), source))
    }
}

/// Repeats requests that failed before a usable response was received.
///
/// Connection failures are retried for every method since the Director never
/// saw the request. Other transport failures, and `504 Gateway Timeout` answers
/// from a proxy in front of the Director, are only retried for idempotent
/// methods. No other HTTP status is retried here.
pub struct RetryTransport {
    inner: Arc<dyn Transport>,
    max_attempts: u32,
    delay: Duration,
}

impl RetryTransport {
    pub fn new(inner: Arc<dyn Transport>, max_attempts: u32, delay: Duration) -> Self {
        Self {
            inner,
            max_attempts: max_attempts.max(1),
            delay,
        }
    }

    /// A retry transport with [`DEFAULT_RETRY_ATTEMPTS`] and [`DEFAULT_RETRY_DELAY`].
    pub fn with_defaults(inner: Arc<dyn Transport>) -> Self {
        Self::new(inner, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY)
    }
}

#[async_trait]
impl Transport for RetryTransport {
    async fn execute(&self, request: &mut DirectorRequest) -> Result<Response> {
        let mut attempt = 1;

        loop {
            match self.inner.execute(request).await {
                Ok(response)
                    if attempt < self.max_attempts
                        && response.status() == StatusCode::GATEWAY_TIMEOUT
                        && is_idempotent(request.method()) =>
                {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        endpoint = %redact_url(request.url()),
                        "Director gateway timed out, retrying"
                    );
                    drop(response);
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Ok(response) => return Ok(response),
                Err(err) if attempt < self.max_attempts && is_retryable(&err, request.method()) => {
                    warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        endpoint = %redact_url(request.url()),
                        error = %err,
                        "Director request failed, retrying"
                    );
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}

fn is_idempotent(method: &Method) -> bool {
    matches!(
        *method,
        Method::GET | Method::HEAD | Method::PUT | Method::DELETE | Method::OPTIONS
    )
}

fn is_retryable(err: &DirectorError, method: &Method) -> bool {
    match err.root() {
        DirectorError::Transport { source, .. } => {
            source.is_connect() || (is_idempotent(method) && !source.is_builder())
        }
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicU32, Ordering};

    use url::Url;

    use super::*;
    use crate::director::request::RequestBody;
    use crate::director::testing::{closed_port_url, response, ScriptedTransport};

    struct CountingTransport {
        inner: HttpTransport,
        calls: AtomicU32,
    }

    #[async_trait]
    impl Transport for CountingTransport {
        async fn execute(&self, request: &mut DirectorRequest) -> Result<Response> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.inner.execute(request).await
        }
    }

    fn counting() -> Arc<CountingTransport> {
        Arc::new(CountingTransport {
            inner: HttpTransport::new(Client::new()),
            calls: AtomicU32::new(0),
        })
    }

    #[tokio::test]
    async fn test_http_transport_sends_headers_and_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/path")
            .match_header("x-custom", "yes")
            .match_body("req-body")
            .with_status(201)
            .with_body("created")
            .create_async()
            .await;

        let url = Url::parse(&format!("{}/path", server.url())).unwrap();
        let mut request = DirectorRequest::new(Method::POST, url);
        request
            .headers_mut()
            .insert("x-custom", "yes".parse().unwrap());
        request.set_body(RequestBody::bytes("req-body"));

        let response = HttpTransport::new(Client::new())
            .execute(&mut request)
            .await
            .unwrap();

        assert_eq!(response.status().as_u16(), 201);
        assert_eq!(response.text().await.unwrap(), "created");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_retry_transport_retries_connection_failures_up_to_limit() {
        let inner = counting();
        let transport = RetryTransport::new(inner.clone(), 3, Duration::from_millis(1));

        let mut request = DirectorRequest::new(Method::POST, closed_port_url("/stemcells"));
        request.set_body(RequestBody::bytes("payload"));

        let err = transport.execute(&mut request).await.unwrap_err();

        assert!(matches!(err.root(), DirectorError::Transport { .. }));
        assert!(err.to_string().contains("Performing POST request"));
        assert_eq!(inner.calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_retry_transport_does_not_retry_http_statuses() {
        let inner = Arc::new(ScriptedTransport::new(vec![Ok(response(500, "boom"))]));
        let transport = RetryTransport::new(inner.clone(), 3, Duration::from_millis(1));

        let mut request = DirectorRequest::new(Method::GET, closed_port_url("/info"));
        let response = transport.execute(&mut request).await.unwrap();

        assert_eq!(response.status().as_u16(), 500);
        assert_eq!(inner.request_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_transport_retries_gateway_timeouts_for_idempotent_requests() {
        let inner = Arc::new(ScriptedTransport::new(vec![
            Ok(response(504, "")),
            Ok(response(504, "")),
            Ok(response(200, "{}")),
        ]));
        let transport = RetryTransport::new(inner.clone(), 5, Duration::from_millis(1));

        let mut request = DirectorRequest::new(Method::GET, closed_port_url("/info"));
        let response = transport.execute(&mut request).await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        assert_eq!(inner.request_count(), 3);
    }

    #[tokio::test]
    async fn test_retry_transport_returns_gateway_timeout_for_posts() {
        let inner = Arc::new(ScriptedTransport::new(vec![Ok(response(504, ""))]));
        let transport = RetryTransport::new(inner.clone(), 5, Duration::from_millis(1));

        let mut request = DirectorRequest::new(Method::POST, closed_port_url("/deployments"));
        let response = transport.execute(&mut request).await.unwrap();

        assert_eq!(response.status().as_u16(), 504);
        assert_eq!(inner.request_count(), 1);
    }

    #[tokio::test]
    async fn test_retry_transport_does_not_retry_non_network_errors() {
        let inner = Arc::new(ScriptedTransport::new(vec![Err(DirectorError::Authentication(
            "no token".to_string(),
        ))]));
        let transport = RetryTransport::new(inner.clone(), 3, Duration::from_millis(1));

        let mut request = DirectorRequest::new(Method::GET, closed_port_url("/info"));
        assert!(transport.execute(&mut request).await.is_err());
        assert_eq!(inner.request_count(), 1);
    }
}
