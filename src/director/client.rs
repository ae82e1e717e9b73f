//
//  bosh-cli
//  director/client.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/06.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Director Client
//!
//! [`Director`] pairs a [`RequestExecutor`] with a [`TaskClient`] sharing the
//! same transport stack, and hosts the Director operations. Operations are
//! grouped by resource in sibling modules (`tasks`, `configs`, `uploads`,
//! `deployments`); this module holds the ones that belong to the Director as
//! a whole.

use std::collections::HashMap;
use std::io::Write;

use serde::{Deserialize, Serialize};
use serde_json::json;

use super::error::{Result, ResultExt};
use super::executor::{DownloadSink, RequestExecutor};
use super::request::{DirectorRequest, RequestBody, APPLICATION_JSON};
use super::task_client::TaskClient;

/// Director identity and capabilities from `GET /info`.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Info {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub uuid: String,
    #[serde(default)]
    pub version: String,
    /// Authenticated user, if the request carried valid credentials
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub cpi: Option<String>,
    #[serde(default)]
    pub user_authentication: UserAuthentication,
    #[serde(default)]
    pub features: HashMap<String, Feature>,
}

/// How the Director authenticates users.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct UserAuthentication {
    /// `basic` or `uaa`
    #[serde(rename = "type", default)]
    pub kind: String,
    #[serde(default)]
    pub options: AuthenticationOptions,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AuthenticationOptions {
    /// UAA base URL for `uaa` authentication
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Feature {
    #[serde(default)]
    pub status: bool,
}

impl Info {
    /// True when the Director delegates authentication to UAA.
    pub fn is_uaa(&self) -> bool {
        self.user_authentication.kind == "uaa"
    }

    /// UAA base URL, when the Director uses UAA.
    pub fn uaa_url(&self) -> Option<&str> {
        if !self.is_uaa() {
            return None;
        }
        self.user_authentication.options.url.as_deref()
    }
}

/// Entry point for Director operations.
#[derive(Clone)]
pub struct Director {
    executor: RequestExecutor,
    task_client: TaskClient,
}

impl Director {
    /// Pairs an executor with a task client built over the same stack.
    pub fn new(executor: RequestExecutor, task_client: TaskClient) -> Self {
        Self {
            executor,
            task_client,
        }
    }

    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    pub fn task_client(&self) -> &TaskClient {
        &self.task_client
    }

    /// Fetches `GET /info`.
    ///
    /// The Director answers this without credentials, which makes it the
    /// usual first call against a new environment.
    pub async fn info(&self) -> Result<Info> {
        self.executor
            .get("/info", None)
            .await
            .wrap_err("Fetching info")
    }

    /// Removes unused releases, stemcells and orphaned disks.
    ///
    /// With `all` the Director removes every unused resource instead of
    /// keeping the most recent ones. Returns the task result text.
    pub async fn clean_up(&self, all: bool) -> Result<String> {
        let payload = json!({ "config": { "remove_all": all } }).to_string();
        let json = |request: &mut DirectorRequest| request.set_content_type(APPLICATION_JSON);

        let result = self
            .task_client
            .post_result("/cleanup", RequestBody::bytes(payload), Some(&json))
            .await
            .wrap_err("Cleaning up resources")?;

        Ok(String::from_utf8_lossy(&result).into_owned())
    }

    /// Streams the blob `blob_id` from the Director blobstore into `writer`.
    pub async fn download_resource(&self, blob_id: &str, writer: &mut (dyn Write + Send)) -> Result<()> {
        self.executor
            .raw_get(
                &format!("/resources/{blob_id}"),
                Some(DownloadSink::tracked(writer)),
                None,
            )
            .await
            .wrap_err_with(|| format!("Downloading resource '{blob_id}'"))?;
        Ok(())
    }
}
