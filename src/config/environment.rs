//
//  bosh-cli
//  config/environment.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Environment Configuration
//!
//! An environment is a Director the CLI knows by an alias: its URL, the CA
//! that signed its certificate, and the credentials last used against it.
//!
//! ```rust
//! use bosh_cli::config::{normalize_director_url, EnvironmentConfig};
//!
//! let env = EnvironmentConfig::new("https://10.0.0.6:25555/");
//! assert_eq!(env.url, "https://10.0.0.6:25555");
//! assert_eq!(normalize_director_url(" 10.0.0.6 "), "10.0.0.6");
//! ```

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::auth::SessionTokens;
use crate::director::{self, FactoryConfig};

/// One aliased Director.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnvironmentConfig {
    pub url: String,

    /// PEM bundle trusted for this Director instead of the system roots
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub client_secret: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_expiry: Option<DateTime<Utc>>,
}

impl fmt::Debug for EnvironmentConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redacted = |value: &Option<String>| value.as_ref().map(|_| "<redacted>");
        f.debug_struct("EnvironmentConfig")
            .field("url", &self.url)
            .field("ca_cert", &self.ca_cert.as_ref().map(|_| "<pem>"))
            .field("client", &self.client)
            .field("client_secret", &redacted(&self.client_secret))
            .field("access_token", &redacted(&self.access_token))
            .field("refresh_token", &redacted(&self.refresh_token))
            .field("token_type", &self.token_type)
            .field("token_expiry", &self.token_expiry)
            .finish()
    }
}

impl EnvironmentConfig {
    pub fn new(url: &str) -> Self {
        Self {
            url: normalize_director_url(url),
            ..Default::default()
        }
    }

    /// Tokens saved by the last `log-in`, in the form the token session uses.
    pub fn tokens(&self) -> SessionTokens {
        SessionTokens {
            access_token: self.access_token.clone(),
            refresh_token: self.refresh_token.clone(),
            token_type: self.token_type.clone(),
            expires_at: self.token_expiry,
        }
    }

    pub fn has_tokens(&self) -> bool {
        self.access_token.is_some() || self.refresh_token.is_some()
    }

    pub fn store_tokens(&mut self, tokens: &SessionTokens) {
        self.access_token = tokens.access_token.clone();
        self.refresh_token = tokens.refresh_token.clone();
        self.token_type = tokens.token_type.clone();
        self.token_expiry = tokens.expires_at;
    }

    pub fn clear_tokens(&mut self) {
        self.store_tokens(&SessionTokens::default());
    }

    /// Connection settings for this Director, without credentials.
    ///
    /// Credentials depend on how the Director authenticates, which is only
    /// known after asking it.
    pub fn factory_config(&self) -> director::Result<FactoryConfig> {
        let mut config = FactoryConfig::from_url(&self.url)?;
        config.ca_cert = self.ca_cert.clone();
        Ok(config)
    }
}

/// Trims whitespace and trailing slashes so aliases compare by URL reliably.
pub fn normalize_director_url(url: &str) -> String {
    url.trim().trim_end_matches('/').to_string()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn test_tokens_round_trip_through_environment() {
        let tokens = SessionTokens {
            access_token: Some("access".to_string()),
            refresh_token: Some("refresh".to_string()),
            token_type: Some("bearer".to_string()),
            expires_at: Utc.with_ymd_and_hms(2026, 2, 8, 12, 0, 0).single(),
        };

        let mut env = EnvironmentConfig::new("https://10.0.0.6:25555");
        assert!(!env.has_tokens());

        env.store_tokens(&tokens);
        assert!(env.has_tokens());
        assert_eq!(env.tokens(), tokens);

        env.clear_tokens();
        assert!(!env.has_tokens());
        assert_eq!(env.token_expiry, None);
    }

    #[test]
    fn test_factory_config_carries_ca() {
        let mut env = EnvironmentConfig::new("10.0.0.6:25556");
        env.ca_cert = Some("-----BEGIN CERTIFICATE-----".to_string());

        let config = env.factory_config().unwrap();
        assert_eq!(config.host, "10.0.0.6");
        assert_eq!(config.port, 25556);
        assert!(config.ca_cert.is_some());
        assert!(config.client.is_none());
    }

    #[test]
    fn test_debug_hides_secrets() {
        let mut env = EnvironmentConfig::new("https://10.0.0.6");
        env.client_secret = Some("hunter2".to_string());
        env.access_token = Some("eyJhbGciOi".to_string());

        let rendered = format!("{env:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(!rendered.contains("eyJhbGciOi"));
    }
}
