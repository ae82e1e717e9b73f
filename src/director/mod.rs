//
//  bosh-cli
//  director/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/05.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Director Client Layer
//!
//! HTTP plumbing for talking to a BOSH Director: authentication that can be
//! refreshed after a `401`, redirects that keep credentials on the Director,
//! retries of transient failures, and long-running tasks whose logs are
//! streamed while they run.
//!
//! ## Architecture
//!
//! Requests flow through a stack of [`Transport`]s, outermost first:
//!
//! | Layer | Role |
//! |-------|------|
//! | [`AdjustableClient`] | Applies the [`AuthAdjustment`], re-sends once after a `401` |
//! | [`RetryTransport`] | Retries connection failures and gateway timeouts |
//! | [`RedirectingTransport`] | Follows `3xx` only back to the Director endpoint |
//! | [`HttpTransport`] | Sends the request with `reqwest` |
//!
//! On top of the stack, [`RequestExecutor`] resolves paths, checks statuses
//! and decodes JSON, and [`TaskClient`] starts tasks and polls them to the
//! end. [`ClientFactory`] wires everything into a [`Director`].
//!
//! ## Usage
//!
//! ```rust,no_run
//! use bosh_cli::director::{ClientFactory, FactoryConfig};
//!
//! # async fn run() -> bosh_cli::director::Result<()> {
//! let mut config = FactoryConfig::from_url("https://10.0.0.6:25555")?;
//! config.client = Some("admin".to_string());
//! config.client_secret = Some("secret".to_string());
//!
//! let director = ClientFactory::new(config).build()?;
//! let info = director.info().await?;
//! println!("{} {}", info.name, info.version);
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Every operation returns [`DirectorError`]. Failures are wrapped with the
//! operation that was attempted, so the rendered message reads outermost
//! first, e.g. `Finding task '42': Director responded with non-successful
//! status code '404' response '...'`. Failures that never produced a
//! response also name the request: `Performing request GET '/tasks/42': ...`.
//! [`DirectorError::status`] and [`DirectorError::response_body`] reach
//! through the wrapping to the HTTP response that caused it.

/// Re-sends requests once after a `401` with fresh credentials.
pub mod adjustable_client;

/// Authentication applied to outgoing requests.
pub mod adjustment;

/// The [`Director`] entry point and whole-Director operations.
pub mod client;

/// Config document operations.
pub mod configs;

/// Deploying and deleting deployments.
pub mod deployments;

/// Error type shared by the whole layer.
pub mod error;

/// Path resolution, status checks and JSON decoding.
pub mod executor;

/// Builds a [`Director`] from connection settings.
pub mod factory;

/// Redirects that stay on the Director endpoint.
pub mod redirect;

/// Progress callbacks for tasks and file transfers.
pub mod reporter;

/// Replayable requests and request bodies.
pub mod request;

/// Task submission, polling and output streaming.
pub mod task_client;

/// Task listing and lookup.
pub mod tasks;

/// Sending requests, with and without retries.
pub mod transport;

/// Stemcell and release uploads.
pub mod uploads;

#[cfg(test)]
mod testing;

pub use adjustable_client::AdjustableClient;
pub use adjustment::{Adjustment, AuthAdjustment, TokenSupplier};
pub use client::{Director, Info};
pub use configs::{ConfigsFilter, DirectorConfig};
pub use deployments::DeployOptions;
pub use error::{DirectorError, Result, ResultExt};
pub use executor::{DownloadSink, RawResponse, RequestExecutor};
pub use factory::{ClientFactory, FactoryConfig, DEFAULT_DIRECTOR_PORT};
pub use redirect::{RedirectPolicy, RedirectingTransport};
pub use reporter::{FileReporter, NoopFileReporter, NoopTaskReporter, TaskReporter};
pub use request::{
    DirectorRequest, RequestBody, RequestCustomizer, APPLICATION_JSON, APPLICATION_X_COMPRESSED,
    TEXT_YAML,
};
pub use task_client::{OutputType, TaskClient, TaskState};
pub use tasks::Task;
pub use transport::{HttpTransport, RetryTransport, Transport};
