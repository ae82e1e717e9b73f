//
//  bosh-cli
//  director/request.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/03.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Director Requests
//!
//! [`DirectorRequest`] is the unit every transport layer passes down: method,
//! URL, headers, and an optional [`RequestBody`].
//!
//! A body is never a one-shot stream. It is a *source* that can be opened any
//! number of times, so the same request can be dispatched again after a 401
//! readjustment or a network retry and still send identical bytes.
//!
//! ## Example
//!
//! ```rust
//! use bosh_cli::director::{DirectorRequest, RequestBody, APPLICATION_JSON};
//! use reqwest::Method;
//! use url::Url;
//!
//! let url = Url::parse("https://director.example.com:25555/configs").unwrap();
//! let mut request = DirectorRequest::new(Method::POST, url);
//! request.set_body(RequestBody::bytes(r#"{"type":"cloud"}"#));
//! request.set_content_type(APPLICATION_JSON);
//!
//! assert!(request.has_body());
//! assert_eq!(request.content_type(), Some(APPLICATION_JSON));
//! ```

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::{Body, Method};
use tokio_util::io::ReaderStream;
use url::Url;

use super::reporter::{FileReporter, UploadStream};

/// Content type for structured payloads.
pub const APPLICATION_JSON: &str = "application/json";

/// Content type for manifest- and config-shaped payloads.
pub const TEXT_YAML: &str = "text/yaml";

/// Content type for binary archive uploads. Bodies with this content type
/// are passed through the [`FileReporter`] for upload tracking.
pub const APPLICATION_X_COMPRESSED: &str = "application/x-compressed";

/// Optional hook that adjusts a request before it is dispatched.
///
/// Callers use it to set headers (`Content-Type`, `Range`, ...) or to attach
/// a body to raw requests.
pub type RequestCustomizer<'a> = Option<&'a (dyn Fn(&mut DirectorRequest) + Send + Sync)>;

/// A regenerable request body.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// In-memory payload.
    Bytes(Bytes),
    /// A file on disk, re-opened for every dispatch.
    File {
        /// Location of the file
        path: PathBuf,
        /// Size recorded when the body was created
        size: u64,
    },
}

impl RequestBody {
    /// Creates an in-memory body.
    pub fn bytes(bytes: impl Into<Bytes>) -> Self {
        Self::Bytes(bytes.into())
    }

    /// Creates a file-backed body, recording the current file size.
    pub async fn file(path: impl Into<PathBuf>) -> io::Result<Self> {
        let path = path.into();
        let size = tokio::fs::metadata(&path).await?.len();
        Ok(Self::File { path, size })
    }

    /// Number of bytes this body produces.
    pub fn len(&self) -> u64 {
        match self {
            Self::Bytes(bytes) => bytes.len() as u64,
            Self::File { size, .. } => *size,
        }
    }

    /// True when the body produces no bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Opens a fresh stream over the body's bytes.
    pub async fn open(&self) -> io::Result<UploadStream> {
        match self {
            Self::Bytes(bytes) => Ok(Box::new(io::Cursor::new(bytes.clone()))),
            Self::File { path, .. } => Ok(Box::new(tokio::fs::File::open(path).await?)),
        }
    }

    /// Checks that the body can still be regenerated byte-for-byte.
    ///
    /// A file body whose file disappeared or changed size since the body was
    /// created cannot be replayed.
    pub async fn ensure_replayable(&self) -> io::Result<()> {
        match self {
            Self::Bytes(_) => Ok(()),
            Self::File { path, size } => {
                let current = tokio::fs::metadata(path).await?.len();
                if current != *size {
                    return Err(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!(
                            "'{}' changed size from {} to {} bytes",
                            path.display(),
                            size,
                            current
                        ),
                    ));
                }
                Ok(())
            }
        }
    }
}

/// A request on its way to the Director.
#[derive(Clone)]
pub struct DirectorRequest {
    method: Method,
    url: Url,
    headers: HeaderMap,
    body: Option<RequestBody>,
    retried: bool,
    upload_reporter: Option<Arc<dyn FileReporter>>,
}

impl fmt::Debug for DirectorRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectorRequest")
            .field("method", &self.method)
            .field("url", &crate::util::redact_url(&self.url))
            .field("body", &self.body)
            .field("retried", &self.retried)
            .field("tracked_upload", &self.upload_reporter.is_some())
            .finish()
    }
}

impl DirectorRequest {
    /// Creates a request without headers or body.
    pub fn new(method: Method, url: Url) -> Self {
        Self {
            method,
            url,
            headers: HeaderMap::new(),
            body: None,
            retried: false,
            upload_reporter: None,
        }
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    pub fn url(&self) -> &Url {
        &self.url
    }

    pub fn url_mut(&mut self) -> &mut Url {
        &mut self.url
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.headers
    }

    pub fn headers_mut(&mut self) -> &mut HeaderMap {
        &mut self.headers
    }

    pub fn body(&self) -> Option<&RequestBody> {
        self.body.as_ref()
    }

    /// Attaches a body, replacing any previous one.
    pub fn set_body(&mut self, body: RequestBody) {
        self.body = Some(body);
    }

    /// Replaces the body wholesale, including removing it.
    pub fn replace_body(&mut self, body: Option<RequestBody>) {
        self.body = body;
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Sets the `Content-Type` header.
    pub fn set_content_type(&mut self, content_type: &'static str) {
        self.headers
            .insert(CONTENT_TYPE, HeaderValue::from_static(content_type));
    }

    /// Returns the `Content-Type` header, if present and valid text.
    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
    }

    /// True once the request has been re-dispatched after readjustment.
    pub fn is_retried(&self) -> bool {
        self.retried
    }

    pub(crate) fn mark_retried(&mut self) {
        self.retried = true;
    }

    /// Routes the body through `reporter` each time it is opened.
    pub fn track_upload_with(&mut self, reporter: Arc<dyn FileReporter>) {
        self.upload_reporter = Some(reporter);
    }

    /// Builds a fresh `reqwest` body for one dispatch.
    ///
    /// Returns the body together with an explicit content length for streamed
    /// bodies, or `None` when the request carries no body.
    pub(crate) async fn dispatch_body(&self) -> io::Result<Option<(Body, Option<u64>)>> {
        let Some(body) = &self.body else {
            return Ok(None);
        };

        match (body, &self.upload_reporter) {
            (RequestBody::Bytes(bytes), None) => Ok(Some((Body::from(bytes.clone()), None))),
            (body, reporter) => {
                let mut stream = body.open().await?;
                if let Some(reporter) = reporter {
                    stream = reporter.track_upload(body.len(), stream);
                }
                let body_stream = Body::wrap_stream(ReaderStream::new(stream));
                Ok(Some((body_stream, Some(body.len()))))
            }
        }
    }

    /// Reads the whole body into memory.
    #[cfg(test)]
    pub(crate) async fn read_body(&self) -> Option<Vec<u8>> {
        use tokio::io::AsyncReadExt;

        let body = self.body.as_ref()?;
        let mut stream = body.open().await.ok()?;
        let mut buf = Vec::new();
        stream.read_to_end(&mut buf).await.ok()?;
        Some(buf)
    }
}
