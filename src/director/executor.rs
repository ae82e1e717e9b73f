//
//  bosh-cli
//  director/executor.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/05.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Executor
//!
//! [`RequestExecutor`] issues single calls against the Director endpoint and
//! interprets the answer:
//!
//! - `200`, `201` and `206` are successful; anything else becomes
//!   [`DirectorError::NonSuccessStatus`] carrying the response body;
//! - a 3xx with a `Location` header is followed as a scrubbed `GET` pinned to
//!   the configured endpoint (see [`RedirectPolicy`]);
//! - typed calls decode the body as JSON and report garbled bodies as
//!   [`DirectorError::Unmarshal`], never as a transport problem.
//!
//! Raw calls hand back the status, headers and body bytes. A raw `GET` can
//! stream the body into a caller-supplied [`DownloadSink`] instead of
//! buffering it.
//!
//! ## Example
//!
//! ```rust,no_run
//! use bosh_cli::director::{FactoryConfig, ClientFactory};
//! use serde_json::Value;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = FactoryConfig::from_url("10.0.0.6")?;
//! let director = ClientFactory::new(config).build()?;
//! let info: Value = director.executor().get("/info", None).await?;
//! println!("{info}");
//! # Ok(())
//! # }
//! ```

use std::io::Write;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::HeaderMap;
use reqwest::{Method, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use super::error::{DirectorError, Result, ResultExt};
use super::redirect::{RedirectPolicy, DEFAULT_MAX_REDIRECTS};
use super::reporter::{DownloadWriter, FileReporter};
use super::request::{DirectorRequest, RequestBody, RequestCustomizer, APPLICATION_X_COMPRESSED};
use super::transport::Transport;

/// A response whose status was accepted.
#[derive(Debug, Clone)]
pub struct RawResponse {
    /// Status code (200, 201 or 206)
    pub status: StatusCode,
    /// Response headers
    pub headers: HeaderMap,
    /// Buffered body; empty when the body was streamed into a sink
    pub body: Bytes,
}

/// Where a raw `GET` streams its response body.
pub struct DownloadSink<'a> {
    writer: &'a mut (dyn Write + Send),
    track: bool,
}

impl<'a> DownloadSink<'a> {
    /// A sink whose progress is reported through the executor's [`FileReporter`].
    pub fn tracked(writer: &'a mut (dyn Write + Send)) -> Self {
        Self {
            writer,
            track: true,
        }
    }

    /// A sink that receives bytes without progress reporting.
    pub fn untracked(writer: &'a mut (dyn Write + Send)) -> Self {
        Self {
            writer,
            track: false,
        }
    }
}

/// Issues calls against one Director endpoint.
///
/// The executor keeps no state between calls and is cheap to clone.
#[derive(Clone)]
pub struct RequestExecutor {
    endpoint: Url,
    client: Arc<dyn Transport>,
    file_reporter: Arc<dyn FileReporter>,
    redirects: RedirectPolicy,
}

impl RequestExecutor {
    /// Creates an executor sending every request through `client`.
    ///
    /// # Parameters
    ///
    /// * `endpoint` - Base URL of the Director (`https://host:port`)
    /// * `client` - The transport stack each physical exchange goes through
    /// * `file_reporter` - Observer for archive uploads and tracked downloads
    pub fn new(
        endpoint: Url,
        client: Arc<dyn Transport>,
        file_reporter: Arc<dyn FileReporter>,
    ) -> Self {
        let redirects = RedirectPolicy::new(endpoint.clone(), DEFAULT_MAX_REDIRECTS);
        Self {
            endpoint,
            client,
            file_reporter,
            redirects,
        }
    }

    /// Overrides the number of redirect hops followed by this executor.
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.redirects = RedirectPolicy::new(self.endpoint.clone(), max_redirects);
        self
    }

    /// Base URL every path is resolved against.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// Sends a `GET` and decodes the JSON response.
    ///
    /// # Parameters
    ///
    /// * `path` - Path and query relative to the endpoint (e.g. `/tasks/7`)
    /// * `customizer` - Optional hook to add headers before dispatch
    ///
    /// # Errors
    ///
    /// Returns [`DirectorError::NonSuccessStatus`] for unaccepted statuses and
    /// [`DirectorError::Unmarshal`] when the body is not a valid `T`.
    pub async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        customizer: RequestCustomizer<'_>,
    ) -> Result<T> {
        let response = self.raw_get(path, None, customizer).await?;
        decode(&response.body)
    }

    /// Sends a `POST` with `payload` and decodes the JSON response.
    pub async fn post<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: RequestBody,
        customizer: RequestCustomizer<'_>,
    ) -> Result<T> {
        let response = self.raw_post(path, Some(payload), customizer).await?;
        decode(&response.body)
    }

    /// Sends a `PUT` with `payload` and decodes the JSON response.
    pub async fn put<T: DeserializeOwned>(
        &self,
        path: &str,
        payload: RequestBody,
        customizer: RequestCustomizer<'_>,
    ) -> Result<T> {
        let response = self.raw_put(path, Some(payload), customizer).await?;
        decode(&response.body)
    }

    /// Sends a `DELETE` and decodes the JSON response.
    pub async fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        customizer: RequestCustomizer<'_>,
    ) -> Result<T> {
        let response = self.raw_delete(path, customizer).await?;
        decode(&response.body)
    }

    /// Sends a `GET` and returns the raw response.
    ///
    /// With a `sink` the body is streamed into it and
    /// [`RawResponse::body`] is left empty; without one the body is buffered.
    pub async fn raw_get(
        &self,
        path: &str,
        sink: Option<DownloadSink<'_>>,
        customizer: RequestCustomizer<'_>,
    ) -> Result<RawResponse> {
        self.raw(Method::GET, path, None, sink, customizer).await
    }

    /// Sends a `POST` and returns the raw response.
    pub async fn raw_post(
        &self,
        path: &str,
        payload: Option<RequestBody>,
        customizer: RequestCustomizer<'_>,
    ) -> Result<RawResponse> {
        self.raw(Method::POST, path, payload, None, customizer).await
    }

    /// Sends a `PUT` and returns the raw response.
    pub async fn raw_put(
        &self,
        path: &str,
        payload: Option<RequestBody>,
        customizer: RequestCustomizer<'_>,
    ) -> Result<RawResponse> {
        self.raw(Method::PUT, path, payload, None, customizer).await
    }

    /// Sends a `DELETE` and returns the raw response.
    pub async fn raw_delete(
        &self,
        path: &str,
        customizer: RequestCustomizer<'_>,
    ) -> Result<RawResponse> {
        self.raw(Method::DELETE, path, None, None, customizer).await
    }

    async fn raw(
        &self,
        method: Method,
        path: &str,
        payload: Option<RequestBody>,
        sink: Option<DownloadSink<'_>>,
        customizer: RequestCustomizer<'_>,
    ) -> Result<RawResponse> {
        let url = self.endpoint.join(path)?;
        let mut request = DirectorRequest::new(method.clone(), url);
        request.replace_body(payload);

        if let Some(customize) = customizer {
            customize(&mut request);
        }

        if request.has_body() && request.content_type() == Some(APPLICATION_X_COMPRESSED) {
            request.track_upload_with(self.file_reporter.clone());
        }

        let response = self
            .perform(request)
            .await
            .wrap_err_with(|| format!("Performing request {method} '{path}'"))?;

        self.read_response(response, sink).await
    }

    /// Dispatches `request`, following redirects that reach this layer.
    async fn perform(&self, mut request: DirectorRequest) -> Result<Response> {
        let mut response = self.client.execute(&mut request).await?;
        let mut hops = 0;

        while let Some(next) = self.redirects.next_request(&request, &response)? {
            hops += 1;
            self.redirects.check_hops(hops)?;
            drop(response);

            debug!(hop = hops, path = next.url().path(), "Following director redirect");

            request = next;
            response = self.client.execute(&mut request).await?;
        }

        Ok(response)
    }

    async fn read_response(
        &self,
        mut response: Response,
        sink: Option<DownloadSink<'_>>,
    ) -> Result<RawResponse> {
        let status = response.status();
        let headers = response.headers().clone();

        debug!(status = status.as_u16(), "Director responded");

        if !is_success(status) {
            let body = response
                .bytes()
                .await
                .map_err(|err| DirectorError::transport("Reading director response", err))?;
            return Err(DirectorError::NonSuccessStatus {
                status,
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }

        let Some(sink) = sink else {
            let body = response
                .bytes()
                .await
                .map_err(|err| DirectorError::transport("Reading director response", err))?;
            return Ok(RawResponse {
                status,
                headers,
                body,
            });
        };

        let size = response.content_length().unwrap_or(0);
        let mut writer: DownloadWriter<'_> = if sink.track {
            self.file_reporter.track_download(size, Box::new(sink.writer))
        } else {
            Box::new(sink.writer)
        };

        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|err| DirectorError::transport("Reading director response", err))?
        {
            writer
                .write_all(&chunk)
                .map_err(|err| DirectorError::io("Writing director response", err))?;
        }
        writer
            .flush()
            .map_err(|err| DirectorError::io("Writing director response", err))?;

        Ok(RawResponse {
            status,
            headers,
            body: Bytes::new(),
        })
    }
}

fn is_success(status: StatusCode) -> bool {
    matches!(
        status,
        StatusCode::OK | StatusCode::CREATED | StatusCode::PARTIAL_CONTENT
    )
}

fn decode<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    serde_json::from_slice(body).map_err(DirectorError::Unmarshal)
}
