//
//  bosh-cli
//  director/configs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/07.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configs
//!
//! Named, typed configuration documents (`cloud`, `runtime`, `cpi`, ...)
//! stored by the Director. Every update creates a new version; the latest
//! version of a `(type, name)` pair is the active one.
//!
//! Updates can be guarded with the id the caller believes is latest. When
//! another update won the race the Director answers `412 Precondition Failed`
//! and [`Director::update_config`] reports both ids.

use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use serde_json::json;
use url::form_urlencoded;

use super::client::Director;
use super::error::{DirectorError, Result, ResultExt};
use super::request::{DirectorRequest, RequestBody, APPLICATION_JSON};

/// One version of a config document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct DirectorConfig {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub team: Option<String>,
    #[serde(default)]
    pub content: String,
    /// True for the version currently in effect
    #[serde(default)]
    pub current: bool,
}

/// Narrows a config listing.
#[derive(Debug, Clone, Default)]
pub struct ConfigsFilter {
    pub kind: Option<String>,
    pub name: Option<String>,
}

#[derive(Deserialize)]
struct PreconditionFailed {
    #[serde(default)]
    latest_id: String,
    #[serde(default)]
    expected_latest_id: String,
}

fn configs_path(pairs: &[(&str, &str)]) -> String {
    let mut query = form_urlencoded::Serializer::new(String::new());
    for (key, value) in pairs {
        query.append_pair(key, value);
    }
    format!("/configs?{}", query.finish())
}

impl Director {
    /// Lists config versions, newest first.
    ///
    /// With `limit == 1` only the latest version of each `(type, name)` is
    /// returned.
    pub async fn list_configs(&self, limit: usize, filter: &ConfigsFilter) -> Result<Vec<DirectorConfig>> {
        let limit = limit.to_string();
        let latest = (limit == "1").to_string();

        let mut pairs: Vec<(&str, &str)> = Vec::new();
        if let Some(kind) = filter.kind.as_deref().filter(|kind| !kind.is_empty()) {
            pairs.push(("type", kind));
        }
        if let Some(name) = filter.name.as_deref().filter(|name| !name.is_empty()) {
            pairs.push(("name", name));
        }
        pairs.push(("limit", limit.as_str()));
        pairs.push(("latest", latest.as_str()));

        self.executor()
            .get(&configs_path(&pairs), None)
            .await
            .wrap_err("Listing configs")
    }

    /// The active version of config `name` of type `kind`.
    pub async fn latest_config(&self, kind: &str, name: &str) -> Result<DirectorConfig> {
        let path = configs_path(&[("type", kind), ("name", name), ("limit", "1"), ("latest", "true")]);

        let configs: Vec<DirectorConfig> = self
            .executor()
            .get(&path, None)
            .await
            .wrap_err("Finding config")?;

        configs
            .into_iter()
            .next()
            .ok_or_else(|| DirectorError::Failed("No config".to_string()))
    }

    /// Stores a new version of a config.
    ///
    /// `expected_latest_id` guards against concurrent updates; pass `None` to
    /// update unconditionally.
    pub async fn update_config(
        &self,
        kind: &str,
        name: &str,
        expected_latest_id: Option<&str>,
        content: &str,
    ) -> Result<DirectorConfig> {
        let mut body = json!({ "type": kind, "name": name, "content": content });
        if let Some(id) = expected_latest_id.filter(|id| !id.is_empty()) {
            body["expected_latest_id"] = json!(id);
        }
        let payload = body.to_string();
        let json = |request: &mut DirectorRequest| request.set_content_type(APPLICATION_JSON);

        let result = self
            .executor()
            .post("/configs", RequestBody::bytes(payload), Some(&json))
            .await;

        match result {
            Err(err) if err.status() == Some(StatusCode::PRECONDITION_FAILED) => {
                let body = err.response_body().unwrap_or_default();
                let rejected: PreconditionFailed = serde_json::from_str(body)
                    .map_err(DirectorError::Unmarshal)
                    .wrap_err_with(|| format!("Could not unmarshal response: '{body}'"))?;
                Err(DirectorError::Failed(format!(
                    "Config update rejected: The expected latest ID '{}' doesn't match the latest ID '{}'. \
                     This most likely means that a concurrent update of the config happened. \
                     Please try to upload again.",
                    rejected.expected_latest_id, rejected.latest_id
                )))
            }
            other => other.wrap_err("Updating config"),
        }
    }

    /// Deletes every version of a config.
    ///
    /// Returns `false` when no such config existed.
    pub async fn delete_config(&self, kind: &str, name: &str) -> Result<bool> {
        let path = configs_path(&[("type", kind), ("name", name)]);
        match self.executor().raw_delete(&path, None).await {
            Ok(_) => Ok(true),
            Err(err) if err.status() == Some(StatusCode::NOT_FOUND) => Ok(false),
            Err(err) => Err(err.wrap("Deleting config")),
        }
    }
}
