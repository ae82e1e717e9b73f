//
//  bosh-cli
//  director/deployments.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/07.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deploying manifests and deleting deployments.

use url::Url;

use super::client::Director;
use super::error::{DirectorError, Result, ResultExt};
use super::request::{DirectorRequest, RequestBody, TEXT_YAML};

/// Flags for [`Director::deploy`].
#[derive(Debug, Clone, Copy, Default)]
pub struct DeployOptions {
    /// Recreate every VM, even the unchanged ones
    pub recreate: bool,
    /// Recover instances with unresponsive agents
    pub fix: bool,
    /// Render and validate without changing anything
    pub dry_run: bool,
}

/// `/deployments/{name}` with `name` encoded as a single path segment.
fn deployment_path(name: &str) -> Result<String> {
    let mut url = Url::parse("http://director/deployments")?;
    url.path_segments_mut()
        .map_err(|_| DirectorError::Failed("Building deployment path".to_string()))?
        .push(name);
    Ok(url.path().to_string())
}

impl DeployOptions {
    fn query(&self) -> String {
        let flags = [
            ("recreate", self.recreate),
            ("fix", self.fix),
            ("dry_run", self.dry_run),
        ];
        flags
            .iter()
            .filter(|(_, on)| *on)
            .map(|(name, _)| format!("{name}=true"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

impl Director {
    /// Creates or updates the deployment described by `manifest` and waits
    /// for the task.
    ///
    /// # Parameters
    ///
    /// * `manifest` - Deployment manifest YAML, sent as-is
    /// * `options` - Deploy flags
    pub async fn deploy(&self, manifest: impl Into<Vec<u8>>, options: DeployOptions) -> Result<()> {
        let query = options.query();
        let path = if query.is_empty() {
            "/deployments".to_string()
        } else {
            format!("/deployments?{query}")
        };
        let yaml = |request: &mut DirectorRequest| request.set_content_type(TEXT_YAML);

        self.task_client()
            .post_result(&path, RequestBody::bytes(manifest.into()), Some(&yaml))
            .await
            .wrap_err("Updating deployment")?;
        Ok(())
    }

    /// Deletes deployment `name` and waits for the task.
    ///
    /// `force` keeps going when individual VMs or disks fail to delete.
    pub async fn delete_deployment(&self, name: &str, force: bool) -> Result<()> {
        let mut path = deployment_path(name)?;
        if force {
            path.push_str("?force=true");
        }

        self.task_client()
            .delete_result(&path, None)
            .await
            .wrap_err_with(|| format!("Deleting deployment '{name}'"))?;
        Ok(())
    }
}
