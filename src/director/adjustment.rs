//
//  bosh-cli
//  director/adjustment.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/04.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Request Adjustments
//!
//! An [`Adjustment`] stamps credentials onto outgoing requests and decides
//! whether a response demands that the exchange be redone with fresh
//! credentials.
//!
//! [`AuthAdjustment`] is the implementation used against a real Director. It
//! comes in three variants chosen once, when the client stack is assembled:
//!
//! | Variant | Header | Source |
//! |---------|--------|--------|
//! | `Basic` | `Authorization: Basic <base64(client:secret)>` | client id and secret |
//! | `Token` | `Authorization: <value from supplier>` | a [`TokenSupplier`] |
//! | `None` | nothing | anonymous access (e.g. `GET /info`) |
//!
//! All variants ask for readjustment exactly when the Director answers
//! `401 Unauthorized`.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine};
use reqwest::header::{HeaderValue, AUTHORIZATION};
use reqwest::{Response, StatusCode};

use super::error::{DirectorError, Result};
use super::request::DirectorRequest;

/// Stamps credentials on requests and recognises rejected credentials.
#[async_trait]
pub trait Adjustment: Send + Sync {
    /// Mutates `request` in place before dispatch.
    ///
    /// `retried` is true when the caller needs credentials that are known to
    /// be fresh, e.g. after the Director rejected the previous ones.
    async fn adjust(&self, request: &mut DirectorRequest, retried: bool) -> Result<()>;

    /// True when `response` means the request must be redone with
    /// readjusted credentials.
    fn needs_readjustment(&self, response: &Response) -> bool;
}

/// Produces the value of the `Authorization` header for token auth.
///
/// Implementations typically cache a token and only contact the token
/// issuer when `retried` is true or the cached token is no longer valid.
#[async_trait]
pub trait TokenSupplier: Send + Sync {
    /// Returns a complete header value such as `"bearer eyJhbGci..."`.
    async fn token(&self, retried: bool) -> anyhow::Result<String>;
}

/// Credential stamping for Director requests.
#[derive(Clone)]
pub enum AuthAdjustment {
    /// HTTP Basic authentication with a client id and secret.
    Basic {
        /// Client (user) name
        client: String,
        /// Client secret (password)
        client_secret: String,
    },
    /// Bearer-style authentication with a header value from a supplier.
    Token(Arc<dyn TokenSupplier>),
    /// No credentials.
    None,
}

impl fmt::Debug for AuthAdjustment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Basic { client, .. } => f
                .debug_struct("Basic")
                .field("client", client)
                .field("client_secret", &"<redacted>")
                .finish(),
            Self::Token(_) => f.write_str("Token"),
            Self::None => f.write_str("None"),
        }
    }
}

impl AuthAdjustment {
    /// Picks the variant for a set of credentials.
    ///
    /// A token supplier wins over a client id; a client id without a supplier
    /// means Basic auth; nothing at all means anonymous requests.
    pub fn from_credentials(
        token_supplier: Option<Arc<dyn TokenSupplier>>,
        client: Option<&str>,
        client_secret: Option<&str>,
    ) -> Self {
        match (token_supplier, client) {
            (Some(supplier), _) => Self::Token(supplier),
            (None, Some(client)) if !client.is_empty() => Self::Basic {
                client: client.to_string(),
                client_secret: client_secret.unwrap_or_default().to_string(),
            },
            _ => Self::None,
        }
    }
}

#[async_trait]
impl Adjustment for AuthAdjustment {
    async fn adjust(&self, request: &mut DirectorRequest, retried: bool) -> Result<()> {
        let value = match self {
            Self::Basic {
                client,
                client_secret,
            } => {
                let encoded = STANDARD.encode(format!("{client}:{client_secret}"));
                format!("Basic {encoded}")
            }
            Self::Token(supplier) => supplier
                .token(retried)
                .await
                .map_err(|err| DirectorError::Authentication(format!("{err:#}")))?,
            Self::None => return Ok(()),
        };

        let mut header = HeaderValue::from_str(&value).map_err(|_| {
            DirectorError::Authentication("Authorization header contains invalid characters".to_string())
        })?;
        header.set_sensitive(true);
        request.headers_mut().insert(AUTHORIZATION, header);

        Ok(())
    }

    fn needs_readjustment(&self, response: &Response) -> bool {
        response.status() == StatusCode::UNAUTHORIZED
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reqwest::Method;
    use url::Url;

    use super::*;
    use crate::director::testing::response;

    struct FakeSupplier {
        calls: Mutex<Vec<bool>>,
        fail: bool,
    }

    #[async_trait]
    impl TokenSupplier for FakeSupplier {
        async fn token(&self, retried: bool) -> anyhow::Result<String> {
            self.calls.lock().unwrap().push(retried);
            if self.fail {
                anyhow::bail!("fake-token-err");
            }
            Ok(if retried { "bearer fresh" } else { "bearer cached" }.to_string())
        }
    }

    fn request() -> DirectorRequest {
        DirectorRequest::new(Method::GET, Url::parse("https://director:25555/info").unwrap())
    }

    fn authorization(request: &DirectorRequest) -> Option<&str> {
        request
            .headers()
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
    }

    #[tokio::test]
    async fn test_basic_stamps_credentials_every_time() {
        let adjustment = AuthAdjustment::from_credentials(None, Some("username"), Some("password"));
        let mut req = request();

        adjustment.adjust(&mut req, false).await.unwrap();
        assert_eq!(authorization(&req), Some("Basic dXNlcm5hbWU6cGFzc3dvcmQ="));

        adjustment.adjust(&mut req, true).await.unwrap();
        assert_eq!(authorization(&req), Some("Basic dXNlcm5hbWU6cGFzc3dvcmQ="));
    }

    #[tokio::test]
    async fn test_token_passes_retried_flag_to_supplier() {
        let supplier = Arc::new(FakeSupplier {
            calls: Mutex::new(Vec::new()),
            fail: false,
        });
        let adjustment = AuthAdjustment::from_credentials(Some(supplier.clone()), Some("ignored"), None);
        let mut req = request();

        adjustment.adjust(&mut req, false).await.unwrap();
        assert_eq!(authorization(&req), Some("bearer cached"));

        adjustment.adjust(&mut req, true).await.unwrap();
        assert_eq!(authorization(&req), Some("bearer fresh"));

        assert_eq!(*supplier.calls.lock().unwrap(), vec![false, true]);
    }

    #[tokio::test]
    async fn test_token_supplier_failure_is_authentication_error() {
        let supplier = Arc::new(FakeSupplier {
            calls: Mutex::new(Vec::new()),
            fail: true,
        });
        let adjustment = AuthAdjustment::Token(supplier);
        let mut req = request();

        let err = adjustment.adjust(&mut req, false).await.unwrap_err();
        assert!(matches!(err, DirectorError::Authentication(_)));
        assert!(err.to_string().contains("fake-token-err"));
        assert!(authorization(&req).is_none());
    }

    #[tokio::test]
    async fn test_none_leaves_request_untouched() {
        let adjustment = AuthAdjustment::from_credentials(None, None, None);
        let mut req = request();

        adjustment.adjust(&mut req, true).await.unwrap();
        assert!(req.headers().is_empty());
    }

    #[test]
    fn test_readjustment_only_on_unauthorized() {
        let adjustment = AuthAdjustment::None;

        assert!(adjustment.needs_readjustment(&response(401, "")));
        for status in [200, 302, 403, 404, 500] {
            assert!(!adjustment.needs_readjustment(&response(status, "")));
        }
    }
}
