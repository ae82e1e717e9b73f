//
//  bosh-cli
//  auth/session.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/08.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # UAA Token Session
//!
//! [`AccessTokenSession`] supplies `Authorization` header values for
//! UAA-backed Directors. It hands out the cached access token until it is
//! close to expiry, and fetches a new one from `POST {uaa}/oauth/token` when
//! the token is stale or when the Director has just rejected it.
//!
//! ## Grants
//!
//! | Held credentials | Grant used |
//! |------------------|------------|
//! | Refresh token | `refresh_token` |
//! | Client secret, no refresh token | `client_credentials` |
//! | Neither | none, the session fails |
//!
//! The client id and secret are always sent with HTTP Basic.
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use bosh_cli::auth::{AccessTokenSession, SessionTokens};
//! use bosh_cli::director::FactoryConfig;
//!
//! # fn example() -> anyhow::Result<()> {
//! let session = AccessTokenSession::new(
//!     reqwest::Client::new(),
//!     "https://10.0.0.6:8443",
//!     "admin",
//!     Some("secret".to_string()),
//!     SessionTokens::default(),
//! )?;
//!
//! let mut config = FactoryConfig::from_url("10.0.0.6")?;
//! config.token_supplier = Some(Arc::new(session));
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Mutex;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;
use url::Url;

use crate::director::TokenSupplier;

/// Seconds before expiry at which a cached token is no longer handed out.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Tokens held by a session.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionTokens {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    /// Usually `bearer`
    pub token_type: Option<String>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl fmt::Debug for SessionTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionTokens")
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl SessionTokens {
    /// True when the access token is missing or expires within the margin.
    ///
    /// Tokens without a known expiry are treated as valid.
    pub fn is_stale(&self, now: DateTime<Utc>) -> bool {
        if self.access_token.as_deref().unwrap_or_default().is_empty() {
            return true;
        }
        match self.expires_at {
            Some(expires_at) => expires_at - Duration::seconds(EXPIRY_MARGIN_SECS) <= now,
            None => false,
        }
    }

    /// The `Authorization` header value, e.g. `bearer eyJhbGci...`.
    pub fn header_value(&self) -> Option<String> {
        let token = self.access_token.as_deref().filter(|token| !token.is_empty())?;
        let kind = self.token_type.as_deref().unwrap_or("bearer");
        Some(format!("{kind} {token}"))
    }
}

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    expires_in: Option<i64>,
}

/// Token supplier backed by a UAA token endpoint.
pub struct AccessTokenSession {
    http: Client,
    token_url: Url,
    client: String,
    client_secret: Option<String>,
    tokens: Mutex<SessionTokens>,
}

impl fmt::Debug for AccessTokenSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessTokenSession")
            .field("token_url", &self.token_url.as_str())
            .field("client", &self.client)
            .field("client_secret", &self.client_secret.as_ref().map(|_| "<redacted>"))
            .finish_non_exhaustive()
    }
}

impl AccessTokenSession {
    /// Creates a session for the UAA at `uaa_url`.
    ///
    /// # Parameters
    ///
    /// * `http` - Client used for the token endpoint
    /// * `uaa_url` - UAA base URL, as advertised by the Director's `/info`
    /// * `client` - UAA client id
    /// * `client_secret` - Client secret, needed for the `client_credentials` grant
    /// * `tokens` - Previously obtained tokens, if any
    pub fn new(
        http: Client,
        uaa_url: &str,
        client: impl Into<String>,
        client_secret: Option<String>,
        tokens: SessionTokens,
    ) -> Result<Self> {
        let token_url = Url::parse(&format!("{}/oauth/token", uaa_url.trim_end_matches('/')))
            .with_context(|| format!("Invalid UAA URL '{uaa_url}'"))?;

        Ok(Self {
            http,
            token_url,
            client: client.into(),
            client_secret,
            tokens: Mutex::new(tokens),
        })
    }

    /// Snapshot of the tokens currently held, for persisting.
    pub fn current_tokens(&self) -> SessionTokens {
        self.lock().clone()
    }

    /// Fetches a new access token regardless of the cached one.
    pub async fn refresh(&self) -> Result<SessionTokens> {
        let held = self.current_tokens();

        let params: Vec<(&str, &str)> = match (held.refresh_token.as_deref(), self.client_secret.as_deref()) {
            (Some(refresh_token), _) if !refresh_token.is_empty() => {
                vec![("grant_type", "refresh_token"), ("refresh_token", refresh_token)]
            }
            (_, Some(_)) => vec![("grant_type", "client_credentials")],
            _ => bail!(
                "Cannot obtain a token for client '{}': no refresh token or client secret available",
                self.client
            ),
        };
        let grant = params[0].1;
        debug!(grant, url = %self.token_url, "Requesting UAA token");

        let response = self
            .http
            .post(self.token_url.clone())
            .basic_auth(&self.client, Some(self.client_secret.as_deref().unwrap_or_default()))
            .header(reqwest::header::ACCEPT, "application/json")
            .form(&params)
            .send()
            .await
            .with_context(|| format!("Failed to request token from '{}'", self.token_url))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            bail!("Token request with grant '{grant}' failed ({status}): {body}");
        }

        let fresh: TokenResponse = response
            .json()
            .await
            .context("Failed to parse token response")?;

        let tokens = SessionTokens {
            access_token: Some(fresh.access_token),
            // UAA omits the refresh token on refresh grants for some clients
            refresh_token: fresh.refresh_token.or(held.refresh_token),
            token_type: fresh.token_type.or(held.token_type),
            expires_at: fresh
                .expires_in
                .and_then(|secs| expiry_after(Utc::now(), secs)),
        };
        *self.lock() = tokens.clone();
        Ok(tokens)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, SessionTokens> {
        self.tokens
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
    }
}

/// `now + secs`, or no known expiry when that is not a representable time.
fn expiry_after(now: DateTime<Utc>, secs: i64) -> Option<DateTime<Utc>> {
    Duration::try_seconds(secs).and_then(|lifetime| now.checked_add_signed(lifetime))
}

#[async_trait]
impl TokenSupplier for AccessTokenSession {
    async fn token(&self, retried: bool) -> Result<String> {
        if !retried {
            let held = self.current_tokens();
            if !held.is_stale(Utc::now()) {
                if let Some(value) = held.header_value() {
                    return Ok(value);
                }
            }
        }

        let tokens = self.refresh().await?;
        tokens
            .header_value()
            .context("Token endpoint returned an empty access token")
    }
}

#[cfg(test)]
mod tests {
    use mockito::Matcher;

    use super::*;

    fn session(server: &mockito::Server, secret: Option<&str>, tokens: SessionTokens) -> AccessTokenSession {
        AccessTokenSession::new(
            Client::new(),
            &server.url(),
            "bosh_cli",
            secret.map(str::to_string),
            tokens,
        )
        .unwrap()
    }

    fn fresh_tokens() -> SessionTokens {
        SessionTokens {
            access_token: Some("cached".to_string()),
            refresh_token: Some("refresh-1".to_string()),
            token_type: Some("bearer".to_string()),
            expires_at: Some(Utc::now() + Duration::hours(1)),
        }
    }

    #[test]
    fn test_staleness_margin() {
        let now = Utc::now();
        let mut tokens = fresh_tokens();
        assert!(!tokens.is_stale(now));

        tokens.expires_at = Some(now + Duration::seconds(30));
        assert!(tokens.is_stale(now));

        tokens.expires_at = None;
        assert!(!tokens.is_stale(now));

        tokens.access_token = None;
        assert!(tokens.is_stale(now));
    }

    #[test]
    fn test_expiry_out_of_range_is_unknown() {
        let now = Utc::now();
        assert_eq!(expiry_after(now, 60), Some(now + Duration::seconds(60)));
        assert_eq!(expiry_after(now, i64::MAX), None);
        assert_eq!(expiry_after(now, i64::MIN), None);
    }

    #[tokio::test]
    async fn test_absurd_expires_in_is_kept_without_expiry() {
        let mut server = mockito::Server::new_async().await;
        let _grant = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(format!(r#"{{"access_token":"forever","expires_in":{}}}"#, i64::MAX))
            .create_async()
            .await;

        let session = session(&server, None, fresh_tokens());

        assert_eq!(session.token(true).await.unwrap(), "bearer forever");
        assert_eq!(session.current_tokens().expires_at, None);
    }

    #[test]
    fn test_debug_redacts_tokens() {
        let rendered = format!("{:?}", fresh_tokens());
        assert!(!rendered.contains("cached"));
        assert!(!rendered.contains("refresh-1"));
    }

    #[test]
    fn test_token_url_tolerates_trailing_slash() {
        let session = AccessTokenSession::new(
            Client::new(),
            "https://uaa.example.com:8443/",
            "admin",
            None,
            SessionTokens::default(),
        )
        .unwrap();
        assert_eq!(session.token_url.as_str(), "https://uaa.example.com:8443/oauth/token");
    }

    #[tokio::test]
    async fn test_cached_token_is_reused_until_retried() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/oauth/token")
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("grant_type".into(), "refresh_token".into()),
                Matcher::UrlEncoded("refresh_token".into(), "refresh-1".into()),
            ]))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"access_token":"fresh","token_type":"bearer","refresh_token":"refresh-2","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let session = session(&server, None, fresh_tokens());

        assert_eq!(session.token(false).await.unwrap(), "bearer cached");
        assert_eq!(session.token(true).await.unwrap(), "bearer fresh");
        assert_eq!(session.token(false).await.unwrap(), "bearer fresh");

        let held = session.current_tokens();
        assert_eq!(held.refresh_token.as_deref(), Some("refresh-2"));
        assert!(held.expires_at.is_some());
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_client_credentials_grant_without_refresh_token() {
        let mut server = mockito::Server::new_async().await;
        let grant = server
            .mock("POST", "/oauth/token")
            // admin:secret
            .match_header("authorization", "Basic YWRtaW46c2VjcmV0")
            .match_body(Matcher::UrlEncoded("grant_type".into(), "client_credentials".into()))
            .with_status(200)
            .with_body(r#"{"access_token":"issued","token_type":"bearer","expires_in":60}"#)
            .create_async()
            .await;

        let session = AccessTokenSession::new(
            Client::new(),
            &server.url(),
            "admin",
            Some("secret".to_string()),
            SessionTokens::default(),
        )
        .unwrap();

        assert_eq!(session.token(false).await.unwrap(), "bearer issued");
        grant.assert_async().await;
    }

    #[tokio::test]
    async fn test_stale_token_is_refreshed_without_retry() {
        let mut server = mockito::Server::new_async().await;
        let refresh = server
            .mock("POST", "/oauth/token")
            .with_status(200)
            .with_body(r#"{"access_token":"renewed","expires_in":3600}"#)
            .expect(1)
            .create_async()
            .await;

        let mut tokens = fresh_tokens();
        tokens.expires_at = Some(Utc::now() - Duration::minutes(5));

        let session = session(&server, None, tokens);

        assert_eq!(session.token(false).await.unwrap(), "bearer renewed");
        // the refresh token was not rotated, so the old one is kept
        assert_eq!(session.current_tokens().refresh_token.as_deref(), Some("refresh-1"));
        refresh.assert_async().await;
    }

    #[tokio::test]
    async fn test_rejected_grant_is_an_error() {
        let mut server = mockito::Server::new_async().await;
        let _rejected = server
            .mock("POST", "/oauth/token")
            .with_status(401)
            .with_body(r#"{"error":"invalid_token"}"#)
            .create_async()
            .await;

        let session = session(&server, None, fresh_tokens());

        let err = session.token(true).await.unwrap_err();
        assert!(err.to_string().contains("401"));
        assert_eq!(session.current_tokens().access_token.as_deref(), Some("cached"));
    }

    #[tokio::test]
    async fn test_no_grant_available() {
        let server = mockito::Server::new_async().await;
        let session = session(&server, None, SessionTokens::default());

        let err = session.token(false).await.unwrap_err();
        assert!(err.to_string().contains("no refresh token or client secret"));
    }
}
