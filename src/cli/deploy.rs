//
//  bosh-cli
//  cli/deploy.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Deployment commands
//!
//! ## Examples
//!
//! ```bash
//! # Create or update the deployment named in the manifest
//! bosh -e vbox deploy ./zookeeper.yml
//!
//! # Recreate every VM, even unchanged ones
//! bosh -e vbox deploy ./zookeeper.yml --recreate
//!
//! # Delete a deployment, ignoring errors from its VMs
//! bosh -e vbox delete-deployment -d zookeeper --force
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::Deserialize;

use crate::director::DeployOptions;
use crate::interactive::confirm_operation;

use super::context::CommandContext;
use super::GlobalOptions;

/// Create or update a deployment
#[derive(Args, Debug)]
pub struct DeployCommand {
    /// Path to the deployment manifest
    pub manifest: PathBuf,

    /// Recreate all VMs in the deployment
    #[arg(long)]
    pub recreate: bool,

    /// Recreate unresponsive instances
    #[arg(long)]
    pub fix: bool,

    /// Render the changes without applying them
    #[arg(long)]
    pub dry_run: bool,
}

/// Delete a deployment
#[derive(Args, Debug)]
pub struct DeleteDeploymentCommand {
    /// Deployment name
    #[arg(long, short = 'd', env = "BOSH_DEPLOYMENT")]
    pub deployment: String,

    /// Ignore errors while deleting
    #[arg(long)]
    pub force: bool,
}

#[derive(Debug, Deserialize)]
struct ManifestHeader {
    #[serde(default)]
    name: String,
}

/// Reads the deployment name out of a manifest.
///
/// # Returns
///
/// The top-level `name`, or an error when the manifest is not YAML or has no
/// name.
fn manifest_name(manifest: &str) -> Result<String> {
    let header: ManifestHeader =
        serde_yaml::from_str(manifest).context("Deployment manifest is not valid YAML")?;
    if header.name.is_empty() {
        bail!("Expected manifest to specify deployment name");
    }
    Ok(header.name)
}

impl DeployCommand {
    fn options(&self) -> DeployOptions {
        DeployOptions {
            recreate: self.recreate,
            fix: self.fix,
            dry_run: self.dry_run,
        }
    }

    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let manifest = std::fs::read_to_string(&self.manifest)
            .with_context(|| format!("Failed to read manifest '{}'", self.manifest.display()))?;
        let name = manifest_name(&manifest)?;

        ctx.output.write_info(&format!("Using deployment '{name}'"));
        if !confirm_operation(&format!("Update deployment '{name}'?"), global.non_interactive)? {
            bail!("Stopped");
        }

        let director = ctx.director().await?;
        let outcome = director.deploy(manifest, self.options()).await;
        ctx.finish(outcome)?;

        if self.dry_run {
            ctx.output
                .write_success(&format!("Dry run of deployment '{name}' finished"));
        } else {
            ctx.output.write_success(&format!("Updated deployment '{name}'"));
        }
        Ok(())
    }
}

impl DeleteDeploymentCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let name = &self.deployment;
        if !confirm_operation(&format!("Delete deployment '{name}'?"), global.non_interactive)? {
            bail!("Stopped");
        }

        let director = ctx.director().await?;
        let outcome = director.delete_deployment(name, self.force).await;
        ctx.finish(outcome)?;

        ctx.output.write_success(&format!("Deleted deployment '{name}'"));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manifest_name() {
        let manifest = "name: zookeeper\nreleases: []\n";
        assert_eq!(manifest_name(manifest).unwrap(), "zookeeper");

        let err = manifest_name("releases: []\n").unwrap_err();
        assert!(err.to_string().contains("deployment name"));

        assert!(manifest_name("name: [unclosed").is_err());
    }
}
