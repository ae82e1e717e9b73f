//
//  bosh-cli
//  cli/clean_up.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Clean-up command

use anyhow::{bail, Result};
use clap::Args;
use serde::Serialize;

use crate::interactive::confirm_operation;

use super::context::CommandContext;
use super::GlobalOptions;

/// Remove unused releases, stemcells and orphaned disks
#[derive(Args, Debug)]
pub struct CleanUpCommand {
    /// Remove all unused resources, not just the older versions
    #[arg(long)]
    pub all: bool,
}

#[derive(Serialize)]
struct CleanUpResult<'a> {
    result: &'a str,
}

impl CleanUpCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let question = if self.all {
            "Delete all unused releases, stemcells and orphaned disks?"
        } else {
            "Delete unused releases, stemcells and orphaned disks?"
        };
        if !confirm_operation(question, global.non_interactive)? {
            bail!("Stopped");
        }

        let director = ctx.director().await?;
        let outcome = director.clean_up(self.all).await;
        let result = ctx.finish(outcome)?;

        if ctx.output.is_json() {
            return crate::output::write_json(&CleanUpResult { result: &result });
        }
        if !result.trim().is_empty() {
            ctx.output.write_info(result.trim_end());
        }
        ctx.output.write_success("Cleaned up");
        Ok(())
    }
}
