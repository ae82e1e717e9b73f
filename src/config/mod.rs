//
//  bosh-cli
//  config/mod.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Configuration Module
//!
//! The CLI remembers Directors by alias in a TOML file, together with the
//! credentials last used against them.
//!
//! ## Configuration File Location
//!
//! - **Linux**: `~/.config/bosh/config.toml`
//! - **macOS**: `~/Library/Application Support/bosh/config.toml`
//! - **Windows**: `C:\Users\<User>\AppData\Roaming\bosh\config\config.toml`
//!
//! `BOSH_CONFIG` points the CLI at a different file. A missing file is an
//! empty configuration.
//!
//! ## Example Configuration File
//!
//! ```toml
//! default_environment = "vbox"
//!
//! [environments.vbox]
//! url = "https://192.168.56.6:25555"
//! ca_cert = "-----BEGIN CERTIFICATE-----\n..."
//! client = "admin"
//! client_secret = "..."
//! ```
//!
//! ## Submodules
//!
//! - [`file`]: Low-level file I/O
//! - [`environment`]: Per-Director settings

mod environment;
mod file;

pub use environment::*;
pub use file::*;

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable overriding the configuration file path.
pub const CONFIG_PATH_ENV: &str = "BOSH_CONFIG";

/// Everything the CLI remembers between invocations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Alias used when no `--environment` is given
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_environment: Option<String>,

    #[serde(default)]
    pub environments: BTreeMap<String, EnvironmentConfig>,
}

impl Config {
    /// Loads the configuration from [`Config::config_path`].
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !config_exists(path) {
            return Ok(Self::default());
        }
        let content = read_config_file(path)?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file '{}'", path.display()))
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        write_config_file(path, &content)
    }

    /// `BOSH_CONFIG` if set, otherwise `config.toml` in the platform config
    /// directory.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_PATH_ENV).filter(|path| !path.is_empty()) {
            return Ok(PathBuf::from(path));
        }

        let dirs = ProjectDirs::from("", "", "bosh")
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Finds an environment by alias, or by URL for environments that were
    /// aliased.
    pub fn find_environment(&self, name_or_url: &str) -> Option<(&str, &EnvironmentConfig)> {
        if let Some((alias, env)) = self.environments.get_key_value(name_or_url) {
            return Some((alias.as_str(), env));
        }

        let url = normalize_director_url(name_or_url);
        self.environments
            .iter()
            .find(|(_, env)| env.url == url)
            .map(|(alias, env)| (alias.as_str(), env))
    }

    /// Resolves the environment a command runs against.
    ///
    /// `requested` falls back to the default environment. Unknown names are
    /// taken as a Director URL with no saved settings.
    ///
    /// # Returns
    ///
    /// The alias under which the environment is saved, if any, and its
    /// settings.
    pub fn resolve_environment(&self, requested: Option<&str>) -> Result<(Option<String>, EnvironmentConfig)> {
        let Some(name) = requested
            .filter(|name| !name.trim().is_empty())
            .or(self.default_environment.as_deref())
        else {
            bail!("Expected non-empty Director URL. Use '--environment' or 'alias-env' first");
        };

        Ok(match self.find_environment(name) {
            Some((alias, env)) => (Some(alias.to_string()), env.clone()),
            None => (None, EnvironmentConfig::new(name)),
        })
    }

    /// Saves `env` under `alias`, keeping tokens of an unchanged Director.
    ///
    /// The first aliased environment becomes the default.
    pub fn alias_environment(&mut self, alias: &str, mut env: EnvironmentConfig) {
        if let Some(existing) = self.environments.get(alias) {
            if existing.url == env.url && !env.has_tokens() {
                env.store_tokens(&existing.tokens());
                env.client = env.client.take().or_else(|| existing.client.clone());
                env.client_secret = env.client_secret.take().or_else(|| existing.client_secret.clone());
            }
        }

        self.environments.insert(alias.to_string(), env);
        if self.default_environment.is_none() {
            self.default_environment = Some(alias.to_string());
        }
    }

    pub fn environment_mut(&mut self, alias: &str) -> Option<&mut EnvironmentConfig> {
        self.environments.get_mut(alias)
    }
}
