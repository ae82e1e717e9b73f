//
//  bosh-cli
//  director/adjustable_client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/04.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Adjustable Client
//!
//! [`AdjustableClient`] wraps a [`Transport`] with an [`Adjustment`] and gives
//! every logical request at most one chance at readjustment:
//!
//! 1. Adjust the request. The first `retried` flag is `true` for requests that
//!    carry a body and `false` otherwise.
//! 2. Dispatch it. Network failures are returned untouched, since the retry
//!    layer below has already had its go.
//! 3. If the adjustment says the response needs readjustment (a 401), drop the
//!    response, restore the original body, adjust again with `retried = true`
//!    and dispatch once more. Whatever comes back is final.
//!
//! There are never more than two physical dispatches per call.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Response;
use tracing::debug;

use super::adjustment::Adjustment;
use super::error::{DirectorError, Result, ResultExt};
use super::request::DirectorRequest;
use super::transport::Transport;
use crate::util::redact_url;

/// A transport that applies an [`Adjustment`] with a single readjustment retry.
pub struct AdjustableClient {
    inner: Arc<dyn Transport>,
    adjustment: Arc<dyn Adjustment>,
}

impl AdjustableClient {
    pub fn new(inner: Arc<dyn Transport>, adjustment: Arc<dyn Adjustment>) -> Self {
        Self { inner, adjustment }
    }
}

#[async_trait]
impl Transport for AdjustableClient {
    async fn execute(&self, request: &mut DirectorRequest) -> Result<Response> {
        let retried = request.has_body();

        self.adjustment
            .adjust(request, retried)
            .await
            .wrap_err("Adjusting request")?;

        let original_body = request.body().cloned();
        if let Some(body) = &original_body {
            body.ensure_replayable()
                .await
                .map_err(|err| DirectorError::io("Making request body replayable", err))?;
        }

        let response = self.inner.execute(request).await?;

        if !self.adjustment.needs_readjustment(&response) {
            return Ok(response);
        }

        debug!(
            status = response.status().as_u16(),
            endpoint = %redact_url(request.url()),
            "Director rejected credentials, readjusting request"
        );
        drop(response);

        request.replace_body(original_body);
        request.mark_retried();

        self.adjustment
            .adjust(request, true)
            .await
            .wrap_err("Readjusting request")?;

        self.inner.execute(request).await
    }
}
