//
//  bosh-cli
//  cli/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! CLI command definitions using clap derive macros

mod clean_up;
mod completion;
mod configs;
mod context;
mod deploy;
mod environment;
mod tasks;
mod uploads;

pub use clean_up::CleanUpCommand;
pub use completion::{CompletionCommand, CompletionShell};
pub use configs::{ConfigsCommand, DeleteConfigCommand, UpdateConfigCommand};
pub use context::{CommandContext, DEFAULT_UAA_CLIENT};
pub use deploy::{DeleteDeploymentCommand, DeployCommand};
pub use environment::{AliasEnvCommand, EnvironmentCommand, LogInCommand, LogOutCommand};
pub use tasks::{CancelTaskCommand, TaskCommand, TasksCommand};
pub use uploads::{UploadReleaseCommand, UploadStemcellCommand};

use clap::{Parser, Subcommand};

/// BOSH CLI - Drive a BOSH Director from the command line
#[derive(Parser, Debug)]
#[command(
    name = "bosh",
    version,
    about = "Drive a BOSH Director from the command line",
    long_about = "bosh talks to a BOSH Director.\n\n\
                  It uploads releases and stemcells, updates configs, deploys, and follows \
                  the Director tasks those operations start.",
    propagate_version = true,
    after_help = "Use 'bosh <command> --help' for more information about a command."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalOptions,
}

/// Global options available to all commands
#[derive(Parser, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Director environment alias or URL
    #[arg(long, short = 'e', global = true, env = "BOSH_ENVIRONMENT")]
    pub environment: Option<String>,

    /// Director CA certificate, inline PEM or a path
    #[arg(long, global = true, env = "BOSH_CA_CERT")]
    pub ca_cert: Option<String>,

    /// Client ID to authenticate with
    #[arg(long, global = true, env = "BOSH_CLIENT")]
    pub client: Option<String>,

    /// Client secret to authenticate with
    #[arg(long, global = true, env = "BOSH_CLIENT_SECRET", hide_env_values = true)]
    pub client_secret: Option<String>,

    /// Output format as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Answer yes to every confirmation and never prompt
    #[arg(long, short = 'n', global = true, env = "BOSH_NON_INTERACTIVE")]
    pub non_interactive: bool,
}

/// Top-level commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show Director information
    #[command(visible_alias = "env")]
    Environment(EnvironmentCommand),

    /// Alias a Director URL
    AliasEnv(AliasEnvCommand),

    /// Log in to the Director
    #[command(visible_alias = "l")]
    LogIn(LogInCommand),

    /// Forget stored credentials
    LogOut(LogOutCommand),

    /// List running or recent tasks
    Tasks(TasksCommand),

    /// Show task output
    #[command(visible_alias = "t")]
    Task(TaskCommand),

    /// Cancel a task
    #[command(visible_alias = "ct")]
    CancelTask(CancelTaskCommand),

    /// List configs
    Configs(ConfigsCommand),

    /// Update a config
    #[command(visible_alias = "uc")]
    UpdateConfig(UpdateConfigCommand),

    /// Delete a config
    DeleteConfig(DeleteConfigCommand),

    /// Upload a stemcell
    #[command(visible_alias = "us")]
    UploadStemcell(UploadStemcellCommand),

    /// Upload a release
    #[command(visible_alias = "ur")]
    UploadRelease(UploadReleaseCommand),

    /// Create or update a deployment
    #[command(visible_alias = "d")]
    Deploy(DeployCommand),

    /// Delete a deployment
    DeleteDeployment(DeleteDeploymentCommand),

    /// Remove unused releases, stemcells and disks
    CleanUp(CleanUpCommand),

    /// Generate shell completion scripts
    Completion(CompletionCommand),

    /// Print version information
    Version,
}
