//
//  bosh-cli
//  cli/context.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Per-invocation state shared by the commands: the resolved environment,
//! output settings and the Director client built for it.
//!
//! Building an authenticated client takes one unauthenticated `GET /info`
//! first, since only the Director knows whether it expects basic
//! credentials or UAA tokens.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::debug;

use crate::auth::{AccessTokenSession, SessionTokens};
use crate::config::{resolve_ca_cert, Config, EnvironmentConfig};
use crate::director::{ClientFactory, Director, FactoryConfig, Info, OutputType};
use crate::output::{ConsoleFileReporter, ConsoleTaskReporter, OutputFormat, OutputWriter, TaskStream};

use super::GlobalOptions;

/// UAA client the CLI uses when none is given.
pub const DEFAULT_UAA_CLIENT: &str = "bosh_cli";

pub struct CommandContext<'a> {
    pub global: &'a GlobalOptions,
    pub config: Config,
    config_path: PathBuf,
    pub alias: Option<String>,
    pub environment: EnvironmentConfig,
    pub output: OutputWriter,
    session: Option<Arc<AccessTokenSession>>,
}

impl<'a> CommandContext<'a> {
    /// Loads the configuration and resolves the target environment.
    pub fn load(global: &'a GlobalOptions) -> Result<Self> {
        let config_path = Config::config_path()?;
        let config = Config::load_from(&config_path)?;
        let (alias, environment) = config.resolve_environment(global.environment.as_deref())?;
        debug!(alias = ?alias, url = %environment.url, "Resolved environment");

        Ok(Self {
            global,
            config,
            config_path,
            alias,
            environment,
            output: OutputWriter::new(OutputFormat::from_json_flag(global.json)),
            session: None,
        })
    }

    /// Connection settings with `--ca-cert` applied, no credentials.
    pub fn connection(&self) -> Result<FactoryConfig> {
        let mut connection = self
            .environment
            .factory_config()
            .with_context(|| format!("Invalid Director URL '{}'", self.environment.url))?;
        if let Some(ca_cert) = self.global.ca_cert.as_deref() {
            connection.ca_cert = Some(resolve_ca_cert(ca_cert)?);
        }
        Ok(connection)
    }

    fn factory(&self, connection: FactoryConfig, output_type: OutputType) -> ClientFactory {
        let file_reporter = if self.output.is_json() || self.global.non_interactive {
            ConsoleFileReporter::hidden()
        } else {
            ConsoleFileReporter::new()
        };

        ClientFactory::new(connection)
            .with_task_reporter(Arc::new(ConsoleTaskReporter::to_stream(
                TaskStream::for_format(self.output.format()),
                output_type == OutputType::Event,
            )))
            .with_file_reporter(Arc::new(file_reporter))
    }

    /// A client without credentials, enough for `GET /info`.
    pub fn anonymous_director(&self) -> Result<Director> {
        Ok(self.factory(self.connection()?, OutputType::Event).build()?)
    }

    pub async fn info(&self) -> Result<Info> {
        Ok(self.anonymous_director()?.info().await?)
    }

    /// An authenticated client whose task output is rendered as events.
    pub async fn director(&mut self) -> Result<Director> {
        self.director_with_output(OutputType::Event).await
    }

    /// An authenticated client relaying task output of `output_type`.
    pub async fn director_with_output(&mut self, output_type: OutputType) -> Result<Director> {
        let info = self.info().await?;
        let mut connection = self.connection()?;

        let client = self
            .global
            .client
            .clone()
            .or_else(|| self.environment.client.clone());
        let client_secret = self
            .global
            .client_secret
            .clone()
            .or_else(|| self.environment.client_secret.clone());

        match info.uaa_url() {
            Some(uaa_url) => {
                let factory = ClientFactory::new(connection.clone());
                let session = Arc::new(AccessTokenSession::new(
                    factory.http_client()?,
                    uaa_url,
                    client.as_deref().unwrap_or(DEFAULT_UAA_CLIENT),
                    client_secret,
                    self.stored_tokens(client.as_deref()),
                )?);
                connection.token_supplier = Some(session.clone());
                self.session = Some(session);
            }
            None => {
                connection.client = client;
                connection.client_secret = client_secret;
            }
        }

        Ok(self.factory(connection, output_type).build()?)
    }

    /// Tokens saved for this environment, unless they belong to a different
    /// client than the one now requested.
    fn stored_tokens(&self, client: Option<&str>) -> SessionTokens {
        let saved_client = self.environment.client.as_deref();
        match (client, saved_client) {
            (Some(requested), Some(saved)) if requested != saved => SessionTokens::default(),
            _ => self.environment.tokens(),
        }
    }

    /// The UAA session of the last client built, if the Director uses UAA.
    pub fn session(&self) -> Option<&Arc<AccessTokenSession>> {
        self.session.as_ref()
    }

    /// Writes refreshed tokens back to the aliased environment.
    pub fn persist_tokens(&mut self) -> Result<()> {
        let (Some(alias), Some(session)) = (self.alias.as_deref(), self.session.as_ref()) else {
            return Ok(());
        };

        let tokens = session.current_tokens();
        if tokens == self.environment.tokens() {
            return Ok(());
        }

        self.environment.store_tokens(&tokens);
        if let Some(saved) = self.config.environment_mut(alias) {
            saved.store_tokens(&tokens);
        }
        self.config
            .save_to(&self.config_path)
            .context("Failed to save refreshed tokens")
    }

    /// Persists refreshed tokens, then hands back the Director outcome.
    ///
    /// Tokens are saved even when the operation failed, since the refresh
    /// that preceded the failure already consumed the old refresh token.
    pub fn finish<T>(&mut self, outcome: crate::director::Result<T>) -> Result<T> {
        self.persist_tokens()?;
        Ok(outcome?)
    }
}
