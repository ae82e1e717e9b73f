//
//  bosh-cli
//  cli/environment.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/09.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! Environment commands: showing the Director, aliasing it, and logging in
//! and out.
//!
//! ## Examples
//!
//! ```bash
//! # Remember a Director under an alias
//! bosh alias-env vbox -e 192.168.56.6 --ca-cert ./director.pem
//!
//! # Show Director details
//! bosh -e vbox environment
//!
//! # Obtain and save a UAA token with client credentials
//! bosh -e vbox log-in --client admin --client-secret "$SECRET"
//! ```

use anyhow::{bail, Context, Result};
use clap::Args;
use console::style;

use crate::auth::{AccessTokenSession, SessionTokens};
use crate::config::{resolve_ca_cert, Config, EnvironmentConfig};
use crate::director::{ClientFactory, FactoryConfig, Info};
use crate::interactive::{prompt_input, prompt_password};
use crate::output::{OutputFormat, OutputWriter};

use super::context::{CommandContext, DEFAULT_UAA_CLIENT};
use super::GlobalOptions;

/// Show Director details
#[derive(Args, Debug)]
pub struct EnvironmentCommand {}

/// Alias a Director URL for later use with -e
#[derive(Args, Debug)]
pub struct AliasEnvCommand {
    /// Name to save the environment under
    pub alias: String,
}

/// Log in to the Director and save the credentials
#[derive(Args, Debug)]
pub struct LogInCommand {}

/// Forget saved tokens and secrets of an environment
#[derive(Args, Debug)]
pub struct LogOutCommand {}

fn print_info(output: &OutputWriter, info: &Info) -> Result<()> {
    output.write(info, |info, table| {
        let mut features: Vec<String> = info
            .features
            .iter()
            .map(|(name, feature)| {
                let status = if feature.status { "enabled" } else { "disabled" };
                format!("{name}: {status}")
            })
            .collect();
        features.sort();

        table
            .headers(["Property", "Value"])
            .row(["Name".to_string(), info.name.clone()])
            .row(["UUID".to_string(), info.uuid.clone()])
            .row(["Version".to_string(), info.version.clone()])
            .row(["Director Stemcell".to_string(), info.cpi.clone().unwrap_or_default()])
            .row(["Auth".to_string(), info.user_authentication.kind.clone()])
            .row(["Features".to_string(), features.join("\n")])
            .row([
                "User".to_string(),
                info.user.clone().unwrap_or_else(|| "(not logged in)".to_string()),
            ])
    })
}

impl EnvironmentCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;

        let has_credentials = ctx.environment.has_tokens()
            || global.client_secret.is_some()
            || ctx.environment.client_secret.is_some();

        let info = if has_credentials {
            let director = ctx.director().await?;
            let outcome = director.info().await;
            ctx.finish(outcome)?
        } else {
            ctx.info().await?
        };

        if !ctx.output.is_json() {
            let name = ctx.alias.as_deref().unwrap_or(&ctx.environment.url);
            println!("Using environment '{}'\n", style(name).bold());
        }
        print_info(&ctx.output, &info)
    }
}

impl AliasEnvCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let Some(url) = global.environment.as_deref().filter(|url| !url.trim().is_empty()) else {
            bail!("Expected non-empty Director URL. Pass it with '--environment'");
        };

        let mut config = Config::load()?;
        let mut environment = EnvironmentConfig::new(url);
        if let Some(ca_cert) = global.ca_cert.as_deref() {
            environment.ca_cert = Some(resolve_ca_cert(ca_cert)?);
        }

        // The Director must be reachable before it is saved.
        let mut connection = FactoryConfig::from_url(&environment.url)?;
        connection.ca_cert = environment.ca_cert.clone();
        let info = ClientFactory::new(connection)
            .build()?
            .info()
            .await
            .with_context(|| format!("Failed to reach Director at '{}'", environment.url))?;

        config.alias_environment(&self.alias, environment);
        config.save()?;

        let output = OutputWriter::new(OutputFormat::from_json_flag(global.json));
        if !output.is_json() {
            println!("Saved environment '{}'\n", style(&self.alias).bold());
        }
        print_info(&output, &info)
    }
}

impl LogInCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let Some(alias) = ctx.alias.clone() else {
            bail!("Logging in requires an aliased environment. Run 'alias-env' first");
        };

        let info = ctx.info().await?;

        let client = match global.client.clone().or_else(|| ctx.environment.client.clone()) {
            Some(client) => client,
            None if global.non_interactive => DEFAULT_UAA_CLIENT.to_string(),
            None => prompt_input("Client")?,
        };
        let client_secret = match global
            .client_secret
            .clone()
            .or_else(|| ctx.environment.client_secret.clone())
        {
            Some(secret) => secret,
            None if global.non_interactive => {
                bail!("Expected a client secret. Pass it with '--client-secret' or BOSH_CLIENT_SECRET")
            }
            None => prompt_password("Client Secret")?,
        };

        let mut environment = ctx.environment.clone();
        environment.client = Some(client.clone());
        environment.client_secret = Some(client_secret.clone());

        match info.uaa_url() {
            Some(uaa_url) => {
                let http = ClientFactory::new(ctx.connection()?).http_client()?;
                let session = AccessTokenSession::new(
                    http,
                    uaa_url,
                    client.as_str(),
                    Some(client_secret),
                    SessionTokens::default(),
                )?;
                let tokens = session
                    .refresh()
                    .await
                    .context("Failed to obtain a UAA token")?;
                environment.store_tokens(&tokens);
            }
            None => {
                let mut connection = ctx.connection()?;
                connection.client = Some(client.clone());
                connection.client_secret = Some(client_secret);
                let verified = ClientFactory::new(connection).build()?.info().await?;
                if verified.user.is_none() {
                    bail!("Invalid credentials for client '{client}'");
                }
                environment.clear_tokens();
            }
        }

        if let Some(saved) = ctx.config.environment_mut(&alias) {
            *saved = environment;
        }
        ctx.config.save()?;

        ctx.output
            .write_success(&format!("Logged in to '{alias}' as client '{client}'"));
        Ok(())
    }
}

impl LogOutCommand {
    pub async fn run(&self, global: &GlobalOptions) -> Result<()> {
        let mut ctx = CommandContext::load(global)?;
        let Some(alias) = ctx.alias.clone() else {
            bail!("Logging out requires an aliased environment");
        };

        if let Some(environment) = ctx.config.environment_mut(&alias) {
            environment.clear_tokens();
            environment.client_secret = None;
        }
        ctx.config.save()?;

        ctx.output.write_success(&format!("Logged out from '{alias}'"));
        Ok(())
    }
}
