//
//  bosh-cli
//  main.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/10.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use bosh_cli::cli::{Cli, Commands};
use bosh_cli::director::DirectorError;
use bosh_cli::exit_codes;

#[tokio::main]
async fn main() -> Result<()> {
    init_logging();

    let cli = Cli::parse();

    match run(cli).await {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {e:#}");
            std::process::exit(exit_code(&e));
        }
    }
}

/// Initialize logging based on environment
fn init_logging() {
    let filter = EnvFilter::try_from_env("BOSH_LOG_LEVEL")
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();
}

/// Picks the exit code from the first Director error in the chain.
fn exit_code(error: &anyhow::Error) -> i32 {
    let director_error = error
        .chain()
        .find_map(|cause| cause.downcast_ref::<DirectorError>());

    match director_error {
        Some(err) if err.is_task_failure() => exit_codes::TASK_FAILED,
        Some(err) if err.is_unauthorized() => exit_codes::AUTH_ERROR,
        Some(err) if matches!(err.root(), DirectorError::Authentication(_)) => exit_codes::AUTH_ERROR,
        _ => exit_codes::ERROR,
    }
}

/// Main command dispatcher
async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Environment(cmd) => cmd.run(&cli.global).await,
        Commands::AliasEnv(cmd) => cmd.run(&cli.global).await,
        Commands::LogIn(cmd) => cmd.run(&cli.global).await,
        Commands::LogOut(cmd) => cmd.run(&cli.global).await,
        Commands::Tasks(cmd) => cmd.run(&cli.global).await,
        Commands::Task(cmd) => cmd.run(&cli.global).await,
        Commands::CancelTask(cmd) => cmd.run(&cli.global).await,
        Commands::Configs(cmd) => cmd.run(&cli.global).await,
        Commands::UpdateConfig(cmd) => cmd.run(&cli.global).await,
        Commands::DeleteConfig(cmd) => cmd.run(&cli.global).await,
        Commands::UploadStemcell(cmd) => cmd.run(&cli.global).await,
        Commands::UploadRelease(cmd) => cmd.run(&cli.global).await,
        Commands::Deploy(cmd) => cmd.run(&cli.global).await,
        Commands::DeleteDeployment(cmd) => cmd.run(&cli.global).await,
        Commands::CleanUp(cmd) => cmd.run(&cli.global).await,
        Commands::Completion(cmd) => cmd.run(&cli.global).await,
        Commands::Version => {
            println!("{} version {}", bosh_cli::APP_NAME, bosh_cli::VERSION);
            Ok(())
        }
    }
}
