//
//  bosh-cli
//  director/error.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/03.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Director Error Types
//!
//! Every failure produced by the request/task protocol layer is a
//! [`DirectorError`]. The variants follow the failure taxonomy of the client:
//!
//! | Variant | Meaning |
//! |---------|---------|
//! | `Config` | Invalid factory configuration, raised before any network call |
//! | `Transport` | Connection, TLS or protocol failure talking to the Director |
//! | `NonSuccessStatus` | The Director answered with a status outside 200/201/206 |
//! | `Unmarshal` | A successful response carried a body that is not the expected JSON |
//! | `TaskFailed` | A task reached a terminal state other than `done` |
//! | `TooManyRedirects` | The redirect hop limit was exceeded |
//! | `Authentication` | A token supplier could not produce credentials |
//! | `Io` | A request body source or response sink failed |
//! | `Failed` | The Director answered, but the operation cannot go ahead |
//! | `Wrapped` | Any of the above, prefixed with the operation that was attempted |
//!
//! Layers wrap the error from the layer below with [`DirectorError::wrap`] (or
//! [`ResultExt::wrap_err`]), so the rendered message reads like
//! `Capturing task '7' output: Getting task state: Director responded with ...`
//! while [`DirectorError::status`] still reaches the innermost status code.

use reqwest::StatusCode;
use thiserror::Error;

use super::task_client::TaskState;
use crate::util::truncate;

/// Maximum number of response body characters quoted in a status error.
pub const BODY_EXCERPT_LEN: usize = 1024;

/// Result alias used across the director module.
pub type Result<T> = std::result::Result<T, DirectorError>;

/// Errors produced while talking to the Director.
#[derive(Error, Debug)]
pub enum DirectorError {
    /// The factory configuration is unusable.
    #[error("Validating director configuration: {0}")]
    Config(String),

    /// The request never produced an HTTP response.
    #[error("{context}: {source}")]
    Transport {
        /// Operation that was being performed
        context: String,
        #[source]
        source: reqwest::Error,
    },

    /// The Director responded, but not with 200, 201 or 206.
    #[error(
        "Director responded with non-successful status code '{}' response '{}'",
        .status.as_u16(),
        truncate(.body, BODY_EXCERPT_LEN)
    )]
    NonSuccessStatus {
        /// Status code returned by the Director
        status: StatusCode,
        /// Complete response body
        body: String,
    },

    /// A successful response body could not be decoded.
    #[error("Unmarshaling Director response: {0}")]
    Unmarshal(#[source] serde_json::Error),

    /// A task finished in a state other than `done`.
    #[error("Expected task '{id}' to succeed but state is '{state}'")]
    TaskFailed { id: u64, state: TaskState },

    /// Redirect chain longer than the configured limit.
    #[error("Stopped after {0} redirects")]
    TooManyRedirects(usize),

    /// Credentials could not be obtained for a request.
    #[error("Authenticating request: {0}")]
    Authentication(String),

    /// Reading a request body or writing a response sink failed.
    #[error("{context}: {source}")]
    Io {
        context: String,
        #[source]
        source: std::io::Error,
    },

    /// An operation could not be completed, with the reason spelled out.
    #[error("{0}")]
    Failed(String),

    #[error("Building director URL: {0}")]
    Url(#[from] url::ParseError),

    /// An error from a lower layer, prefixed with the operation attempted.
    #[error("{context}: {source}")]
    Wrapped {
        context: String,
        #[source]
        source: Box<DirectorError>,
    },
}

impl DirectorError {
    /// Builds a transport error for the given operation.
    pub fn transport(context: impl Into<String>, source: reqwest::Error) -> Self {
        Self::Transport {
            context: context.into(),
            source,
        }
    }

    /// Builds an I/O error for the given operation.
    pub fn io(context: impl Into<String>, source: std::io::Error) -> Self {
        Self::Io {
            context: context.into(),
            source,
        }
    }

    /// Prefixes this error with a description of the operation attempted.
    pub fn wrap(self, context: impl Into<String>) -> Self {
        Self::Wrapped {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Returns the innermost error, skipping any wrapping layers.
    pub fn root(&self) -> &DirectorError {
        match self {
            Self::Wrapped { source, .. } => source.root(),
            other => other,
        }
    }

    /// Returns the HTTP status behind a non-successful status error, if any.
    ///
    /// Wrapping layers are looked through, so a 416 reported while
    /// "Getting task output" is still recognisable as a 416.
    pub fn status(&self) -> Option<StatusCode> {
        match self.root() {
            Self::NonSuccessStatus { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns the full response body of a non-successful status error.
    pub fn response_body(&self) -> Option<&str> {
        match self.root() {
            Self::NonSuccessStatus { body, .. } => Some(body),
            _ => None,
        }
    }

    /// True when the Director rejected the credentials (after readjustment).
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(StatusCode::UNAUTHORIZED)
    }

    /// True when a task reached a non-successful terminal state.
    pub fn is_task_failure(&self) -> bool {
        matches!(self.root(), Self::TaskFailed { .. })
    }
}

/// Extension for wrapping the error side of a director [`Result`].
pub trait ResultExt<T> {
    /// Prefixes the error (if any) with a description of the operation.
    fn wrap_err(self, context: impl Into<String>) -> Result<T>;

    /// Lazily built variant of [`wrap_err`](Self::wrap_err).
    fn wrap_err_with<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C;
}

impl<T> ResultExt<T> for Result<T> {
    fn wrap_err(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|err| err.wrap(context))
    }

    fn wrap_err_with<C, F>(self, f: F) -> Result<T>
    where
        C: Into<String>,
        F: FnOnce() -> C,
    {
        self.map_err(|err| err.wrap(f()))
    }
}
