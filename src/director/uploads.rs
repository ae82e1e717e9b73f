//
//  bosh-cli
//  director/uploads.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/07.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Stemcell and Release Uploads
//!
//! Archives are posted as `application/x-compressed` file bodies. The body is
//! re-opened from disk for every dispatch, so an upload that has to be sent
//! again after a 401 sends the same bytes, and the executor routes it through
//! the [`FileReporter`](super::reporter::FileReporter) for progress.
//!
//! Archives that already live on a web server can be imported by URL instead;
//! the Director downloads them itself.

use std::path::Path;

use serde_json::json;

use super::client::Director;
use super::error::{DirectorError, Result, ResultExt};
use super::request::{DirectorRequest, RequestBody, APPLICATION_JSON, APPLICATION_X_COMPRESSED};

/// Builds `base` with the `name=true` flags that are set.
fn with_flags(base: &str, flags: &[(&str, bool)]) -> String {
    let set: Vec<String> = flags
        .iter()
        .filter(|(_, on)| *on)
        .map(|(name, _)| format!("{name}=true"))
        .collect();

    if set.is_empty() {
        base.to_string()
    } else {
        format!("{base}?{}", set.join("&"))
    }
}

fn location_body(url: &str, sha1: Option<&str>) -> String {
    let mut body = json!({ "location": url });
    if let Some(sha1) = sha1.filter(|sha1| !sha1.is_empty()) {
        body["sha1"] = json!(sha1);
    }
    body.to_string()
}

impl Director {
    /// Uploads a stemcell tarball and waits for the import task.
    ///
    /// With `fix` an already uploaded stemcell of the same name and version is
    /// replaced.
    pub async fn upload_stemcell_file(&self, path: &Path, fix: bool) -> Result<()> {
        self.upload_file(&with_flags("/stemcells", &[("fix", fix)]), path)
            .await
            .wrap_err("Uploading stemcell file")
    }

    /// Imports a stemcell from `url` and waits for the import task.
    pub async fn upload_stemcell_url(&self, url: &str, sha1: Option<&str>, fix: bool) -> Result<()> {
        self.upload_location(&with_flags("/stemcells", &[("fix", fix)]), url, sha1)
            .await
            .wrap_err_with(|| format!("Uploading remote stemcell '{url}'"))
    }

    /// Uploads a release tarball and waits for the import task.
    ///
    /// `rebase` asks the Director to rebase a dev release on top of what is
    /// already uploaded; `fix` replaces packages and jobs that already exist.
    pub async fn upload_release_file(&self, path: &Path, rebase: bool, fix: bool) -> Result<()> {
        let target = with_flags("/releases", &[("rebase", rebase), ("fix", fix)]);
        self.upload_file(&target, path)
            .await
            .wrap_err("Uploading release file")
    }

    /// Imports a release from `url` and waits for the import task.
    pub async fn upload_release_url(
        &self,
        url: &str,
        sha1: Option<&str>,
        rebase: bool,
        fix: bool,
    ) -> Result<()> {
        let target = with_flags("/releases", &[("rebase", rebase), ("fix", fix)]);
        self.upload_location(&target, url, sha1)
            .await
            .wrap_err_with(|| format!("Uploading remote release '{url}'"))
    }

    async fn upload_file(&self, target: &str, path: &Path) -> Result<()> {
        let body = RequestBody::file(path)
            .await
            .map_err(|err| DirectorError::io(format!("Opening file '{}'", path.display()), err))?;
        let compressed = |request: &mut DirectorRequest| request.set_content_type(APPLICATION_X_COMPRESSED);

        self.task_client()
            .post_result(target, body, Some(&compressed))
            .await?;
        Ok(())
    }

    async fn upload_location(&self, target: &str, url: &str, sha1: Option<&str>) -> Result<()> {
        let json = |request: &mut DirectorRequest| request.set_content_type(APPLICATION_JSON);

        self.task_client()
            .post_result(target, RequestBody::bytes(location_body(url, sha1)), Some(&json))
            .await?;
        Ok(())
    }
}
