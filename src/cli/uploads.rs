//
//  bosh-cli
//  cli/uploads.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Upload commands
//!
//! Each command accepts a local tarball or an `http(s)://` URL the Director
//! downloads itself.
//!
//! ## Examples
//!
//! ```bash
//! bosh -e vbox upload-stemcell ./bosh-stemcell-warden.tgz
//! bosh -e vbox upload-release https://bosh.io/d/github.com/cloudfoundry/uaa-release --sha1 3f0c...
//! bosh -e vbox upload-release ./dev-release.tgz --rebase
//! ```

use std::path::Path;

use anyhow::{bail, Result};
use clap::Args;

use crate::output::OutputWriter;
use crate::util::format_size;

use super::context::CommandContext;
use super::GlobalOptions;

/// Upload a stemcell
#[derive(Args, Debug)]
pub struct UploadStemcellCommand {
    /// Path or URL of the stemcell tarball
    pub location: String,

    /// SHA1 of a remote stemcell
    #[arg(long)]
    pub sha1: Option<String>,

    /// Replace a stemcell already uploaded with the same name and version
    #[arg(long)]
    pub fix: bool,
}

/// Upload a release
#[derive(Args, Debug)]
pub struct UploadReleaseCommand {
    /// Path or URL of the release tarball
    pub location: String,

    /// SHA1 of a remote release
    #[arg(long)]
    pub sha1: Option<String>,

    /// Rebase a dev release on top of the uploaded ones
    #[arg(long)]
    pub rebase: bool,

    /// Replace packages and jobs that were already uploaded
    #[arg(long)]
    pub fix: bool,
}

fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

fn announce(output: &OutputWriter, kind: &str, location: &str, path: Option<&Path>) {
    let size = path
        .and_then(|path| std::fs::metadata(path).ok())
        .map(|metadata| format!(" ({})", format_size(metadata.len())))
        .unwrap_or_default();
    output.write_info(&format!("Uploading {kind} '{location}'{size}"));
}

fn local_archive(location: &str) -> Result<&Path> {
    let path = Path::new(location);
    if !path.is_file() {
        bail!("Expected '{location}' to be a tarball or an http(s) URL");
    }
    Ok(path)
}

impl UploadStemcellCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let remote = is_remote(&self.location);
        let path = if remote { None } else { Some(local_archive(&self.location)?) };
        announce(&ctx.output, "stemcell", &self.location, path);

        let director = ctx.director().await?;
        let outcome = match path {
            Some(path) => director.upload_stemcell_file(path, self.fix).await,
            None => {
                director
                    .upload_stemcell_url(&self.location, self.sha1.as_deref(), self.fix)
                    .await
            }
        };
        ctx.finish(outcome)?;

        ctx.output.write_success("Uploaded stemcell");
        Ok(())
    }
}

impl UploadReleaseCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let remote = is_remote(&self.location);
        let path = if remote { None } else { Some(local_archive(&self.location)?) };
        announce(&ctx.output, "release", &self.location, path);

        let director = ctx.director().await?;
        let outcome = match path {
            Some(path) => {
                director
                    .upload_release_file(path, self.rebase, self.fix)
                    .await
            }
            None => {
                director
                    .upload_release_url(&self.location, self.sha1.as_deref(), self.rebase, self.fix)
                    .await
            }
        };
        ctx.finish(outcome)?;

        ctx.output.write_success("Uploaded release");
        Ok(())
    }
}
