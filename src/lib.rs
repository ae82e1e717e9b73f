//
//  bosh-cli
//  lib.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/01.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # BOSH CLI Library
//!
//! A client library and command-line interface for driving a BOSH Director.
//!
//! ## Overview
//!
//! The Director runs most operations asynchronously and exposes them as
//! tasks. This library authenticates every request, follows redirects back to
//! the Director, submits long-running operations and polls the resulting
//! task until it finishes, streaming its output as it goes.
//!
//! ## Features
//!
//! - **Authenticated Requests**: Basic and UAA token authentication, with one
//!   re-authenticated retry when the Director rejects a token
//! - **Task Polling**: Submit-then-poll with incremental output streaming
//! - **Uploads**: Stemcell and release tarballs with progress reporting
//! - **Interactive & Scriptable**: Tables and live task logs, or JSON output
//!
//! ## Module Structure
//!
//! - [`director`]: Request execution, authentication adjustment, task polling
//! - [`auth`]: UAA token session
//! - [`cli`]: Command-line interface definitions using clap
//! - [`config`]: Configuration file management
//! - [`output`]: Tables, JSON and console reporters
//! - [`interactive`]: Prompts and confirmations
//! - [`util`]: Utility functions
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use bosh_cli::director::{ClientFactory, FactoryConfig};
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = FactoryConfig::from_url("https://10.0.0.6:25555")?;
//! let director = ClientFactory::new(config).build()?;
//!
//! let info = director.info().await?;
//! println!("{} {}", info.name, info.version);
//! # Ok(())
//! # }
//! ```

/// Director client.
///
/// The request executor, authentication adjustment, task client and the
/// factory that assembles them, plus the Director operations built on top.
pub mod director;

/// UAA token session.
pub mod auth;

/// Command-line interface definitions.
///
/// Contains all CLI commands, arguments, and subcommands defined using the clap derive API.
pub mod cli;

/// Configuration file management.
///
/// Manages the CLI's environments stored in platform-specific locations:
/// - Linux: `~/.config/bosh/config.toml`
/// - macOS: `~/Library/Application Support/bosh/config.toml`
/// - Windows: `%APPDATA%\bosh\config\config.toml`
pub mod config;

/// Output formatting for tables, JSON and live task output.
pub mod output;

/// Interactive prompts and confirmations.
pub mod interactive;

/// Utility functions and helpers.
pub mod util;

pub use cli::Cli;
pub use config::Config;
pub use director::{Director, DirectorError};

/// Application name constant.
///
/// The name of the CLI binary, used for display and shell completions.
pub const APP_NAME: &str = "bosh";

/// Application version constant, taken from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Exit codes for the CLI.
///
/// # Exit Code Ranges
///
/// - `0`: Success
/// - `1-3`: General errors and usage issues
/// - `4-7`: Authentication-related issues
/// - `16-31`: Task-related issues
pub mod exit_codes {
    /// Successful execution.
    pub const SUCCESS: i32 = 0;

    /// General error.
    ///
    /// An unspecified error occurred during execution.
    /// Check stderr for details.
    pub const ERROR: i32 = 1;

    /// Invalid usage or arguments.
    pub const USAGE: i32 = 2;

    /// Authentication failed.
    ///
    /// The Director still answered 401 after the credentials were refreshed.
    /// Run `bosh log-in` to authenticate again.
    pub const AUTH_ERROR: i32 = 4;

    /// A Director task finished in a state other than `done`.
    pub const TASK_FAILED: i32 = 16;
}
