//
//  bosh-cli
//  cli/configs.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Config commands
//!
//! ## Examples
//!
//! ```bash
//! bosh -e vbox configs --type cloud
//! bosh -e vbox update-config --type runtime --name dns ./dns.yml
//! bosh -e vbox delete-config --type runtime --name dns
//! ```

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Args;

use crate::director::{ConfigsFilter, DirectorConfig};
use crate::interactive::confirm_operation;
use crate::output::format_bool;

use super::context::CommandContext;
use super::GlobalOptions;

/// List the latest configs
#[derive(Args, Debug)]
pub struct ConfigsCommand {
    /// Only configs of this type
    #[arg(long = "type")]
    pub kind: Option<String>,

    /// Only configs with this name
    #[arg(long)]
    pub name: Option<String>,

    /// Versions to list; 1 lists only the latest of each config
    #[arg(long, default_value_t = 1)]
    pub recent: usize,
}

/// Store a new version of a config
#[derive(Args, Debug)]
pub struct UpdateConfigCommand {
    /// Config type, e.g. cloud, runtime, cpi
    #[arg(long = "type")]
    pub kind: String,

    /// Config name
    #[arg(long, default_value = "default")]
    pub name: String,

    /// Reject the update unless this is still the latest config ID
    #[arg(long)]
    pub expected_latest_id: Option<String>,

    /// Path to the config YAML
    pub path: PathBuf,
}

/// Delete every version of a config
#[derive(Args, Debug)]
pub struct DeleteConfigCommand {
    /// Config type
    #[arg(long = "type")]
    pub kind: String,

    /// Config name
    #[arg(long, default_value = "default")]
    pub name: String,
}

impl ConfigsCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let director = ctx.director().await?;

        let filter = ConfigsFilter {
            kind: self.kind.clone(),
            name: self.name.clone(),
        };
        let outcome = director.list_configs(self.recent, &filter).await;
        let configs = ctx.finish(outcome)?;

        let color = ctx.output.color();
        ctx.output.write(configs.as_slice(), |configs, table| {
            table
                .headers(["ID", "Type", "Name", "Team", "Created At", "Current"])
                .rows(configs.iter().map(|config: &DirectorConfig| {
                    [
                        config.id.clone(),
                        config.kind.clone(),
                        config.name.clone(),
                        config.team.clone().unwrap_or_default(),
                        config.created_at.clone(),
                        format_bool(config.current, color),
                    ]
                }))
        })
    }
}

impl UpdateConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("Failed to read config '{}'", self.path.display()))?;
        serde_yaml::from_str::<serde_yaml::Value>(&content)
            .with_context(|| format!("Config '{}' is not valid YAML", self.path.display()))?;

        let director = ctx.director().await?;
        let outcome = director
            .update_config(
                &self.kind,
                &self.name,
                self.expected_latest_id.as_deref(),
                &content,
            )
            .await;
        let config = ctx.finish(outcome)?;

        if ctx.output.is_json() {
            return crate::output::write_json(&config);
        }
        ctx.output.write_success(&format!(
            "Updated {} config '{}' (ID {})",
            config.kind, config.name, config.id
        ));
        Ok(())
    }
}

impl DeleteConfigCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let question = format!("Delete {} config '{}'?", self.kind, self.name);
        if !confirm_operation(&question, global.non_interactive)? {
            bail!("Stopped");
        }

        let director = ctx.director().await?;
        let outcome = director.delete_config(&self.kind, &self.name).await;
        let deleted = ctx.finish(outcome)?;

        if deleted {
            ctx.output
                .write_success(&format!("Deleted {} config '{}'", self.kind, self.name));
        } else {
            ctx.output.write_warning(&format!(
                "No {} config named '{}' to delete",
                self.kind, self.name
            ));
        }
        Ok(())
    }
}
