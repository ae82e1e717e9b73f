//
//  bosh-cli
//  director/redirect.rs
//
//  Created by Ngonidzashe Mangudya on 2026/02/04.
//  Copyright (c) 2025 IAMNGONI. All rights reserved.
//

//! # Redirect Handling
//!
//! The Director (or a proxy in front of it) may answer with a 3xx. A
//! redirected request is never sent where the `Location` header says. It is
//! rebuilt by [`RedirectPolicy`]:
//!
//! - method becomes `GET` and the body is dropped;
//! - the path and query come from `Location`, but scheme, host and port are
//!   forced back to the configured Director endpoint;
//! - every header except `Authorization` is discarded.
//!
//! [`RedirectingTransport`] applies the policy below the retry layer and
//! re-adjusts each hop with `retried = true`, because hops are invisible to
//! the [`AdjustableClient`](super::adjustable_client::AdjustableClient) above.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, LOCATION};
use reqwest::{Method, Response};
use tracing::debug;
use url::Url;

use super::adjustment::Adjustment;
use super::error::{DirectorError, Result, ResultExt};
use super::request::DirectorRequest;
use super::transport::Transport;
use crate::util::redact_url;

/// Maximum number of redirect hops followed for one request.
pub const DEFAULT_MAX_REDIRECTS: usize = 10;

/// Decides whether and where a redirect is followed.
#[derive(Debug, Clone)]
pub struct RedirectPolicy {
    endpoint: Url,
    max_redirects: usize,
}

impl RedirectPolicy {
    /// Creates a policy that pins every hop to `endpoint`.
    pub fn new(endpoint: Url, max_redirects: usize) -> Self {
        Self {
            endpoint,
            max_redirects,
        }
    }

    pub fn max_redirects(&self) -> usize {
        self.max_redirects
    }

    /// Builds the follow-up request for `response`, if it is a redirect.
    ///
    /// Returns `Ok(None)` when the response is not a 3xx or carries no usable
    /// `Location` header; such a response is final.
    pub fn next_request(
        &self,
        previous: &DirectorRequest,
        response: &Response,
    ) -> Result<Option<DirectorRequest>> {
        if !response.status().is_redirection() {
            return Ok(None);
        }

        let Some(location) = response
            .headers()
            .get(LOCATION)
            .and_then(|value| value.to_str().ok())
        else {
            return Ok(None);
        };

        let target = previous.url().join(location)?;

        let mut url = self.endpoint.clone();
        url.set_path(target.path());
        url.set_query(target.query());
        url.set_fragment(None);

        let mut next = DirectorRequest::new(Method::GET, url);
        if let Some(authorization) = previous.headers().get(AUTHORIZATION) {
            next.headers_mut()
                .insert(AUTHORIZATION, authorization.clone());
        }

        Ok(Some(next))
    }

    /// Fails once `hops` exceeds the configured limit.
    pub fn check_hops(&self, hops: usize) -> Result<()> {
        if hops > self.max_redirects {
            return Err(DirectorError::TooManyRedirects(self.max_redirects));
        }
        Ok(())
    }
}

/// Follows redirects for the transport it wraps.
pub struct RedirectingTransport {
    inner: Arc<dyn Transport>,
    policy: RedirectPolicy,
    adjustment: Arc<dyn Adjustment>,
}

impl RedirectingTransport {
    pub fn new(
        inner: Arc<dyn Transport>,
        policy: RedirectPolicy,
        adjustment: Arc<dyn Adjustment>,
    ) -> Self {
        Self {
            inner,
            policy,
            adjustment,
        }
    }
}

#[async_trait]
impl Transport for RedirectingTransport {
    async fn execute(&self, request: &mut DirectorRequest) -> Result<Response> {
        let mut response = self.inner.execute(request).await?;
        let mut current: Option<DirectorRequest> = None;
        let mut hops = 0;

        loop {
            let previous = current.as_ref().unwrap_or(&*request);
            let Some(mut next) = self.policy.next_request(previous, &response)? else {
                return Ok(response);
            };

            hops += 1;
            self.policy.check_hops(hops)?;
            drop(response);

            self.adjustment
                .adjust(&mut next, true)
                .await
                .wrap_err("Adjusting redirected request")?;

            debug!(
                hop = hops,
                endpoint = %redact_url(next.url()),
                "Following director redirect"
            );

            response = self.inner.execute(&mut next).await?;
            current = Some(next);
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use reqwest::header::CONTENT_TYPE;
    use reqwest::Client;

    use super::*;
    use crate::director::request::{RequestBody, APPLICATION_JSON};
    use crate::director::testing::{response, response_with_headers, ScriptedTransport};
    use crate::director::transport::HttpTransport;

    /// Stamps the `retried` flag into the Authorization header.
    #[derive(Default)]
    struct FlagAdjustment {
        calls: Mutex<Vec<bool>>,
    }

    #[async_trait]
    impl Adjustment for FlagAdjustment {
        async fn adjust(&self, request: &mut DirectorRequest, retried: bool) -> Result<()> {
            self.calls.lock().unwrap().push(retried);
            let value = format!("bearer retried-{retried}");
            request
                .headers_mut()
                .insert(AUTHORIZATION, value.parse().unwrap());
            Ok(())
        }

        fn needs_readjustment(&self, _response: &Response) -> bool {
            false
        }
    }

    fn endpoint() -> Url {
        Url::parse("https://director.test:25555").unwrap()
    }

    fn json_post(url: &str) -> DirectorRequest {
        let mut request = DirectorRequest::new(Method::POST, Url::parse(url).unwrap());
        request.set_body(RequestBody::bytes(r#"{"a":1}"#));
        request.set_content_type(APPLICATION_JSON);
        request
            .headers_mut()
            .insert(AUTHORIZATION, "bearer original".parse().unwrap());
        request
            .headers_mut()
            .insert("referer", "https://director.test/".parse().unwrap());
        request
    }

    #[test]
    fn test_policy_ignores_non_redirects() {
        let policy = RedirectPolicy::new(endpoint(), DEFAULT_MAX_REDIRECTS);
        let request = json_post("https://director.test:25555/configs");

        assert!(policy
            .next_request(&request, &response(200, ""))
            .unwrap()
            .is_none());
        assert!(policy
            .next_request(&request, &response(302, ""))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_policy_scrubs_and_pins_to_endpoint() {
        let policy = RedirectPolicy::new(endpoint(), DEFAULT_MAX_REDIRECTS);
        let request = json_post("https://director.test:25555/configs");
        let redirect = response_with_headers(
            302,
            "",
            &[("location", "http://user:pw@elsewhere.example:8080/result?x=1")],
        );

        let next = policy.next_request(&request, &redirect).unwrap().unwrap();

        assert_eq!(next.method(), Method::GET);
        assert_eq!(
            next.url().as_str(),
            "https://director.test:25555/result?x=1"
        );
        assert!(!next.has_body());
        assert_eq!(next.headers().len(), 1);
        assert_eq!(next.headers()[AUTHORIZATION], "bearer original");
    }

    #[test]
    fn test_policy_resolves_relative_locations() {
        let policy = RedirectPolicy::new(endpoint(), DEFAULT_MAX_REDIRECTS);
        let request = DirectorRequest::new(
            Method::GET,
            Url::parse("https://director.test:25555/tasks/1/output").unwrap(),
        );
        let redirect = response_with_headers(301, "", &[("location", "raw")]);

        let next = policy.next_request(&request, &redirect).unwrap().unwrap();
        assert_eq!(next.url().path(), "/tasks/1/raw");
    }

    #[test]
    fn test_hop_limit() {
        let policy = RedirectPolicy::new(endpoint(), 2);
        assert!(policy.check_hops(2).is_ok());
        assert!(matches!(
            policy.check_hops(3),
            Err(DirectorError::TooManyRedirects(2))
        ));
    }

    #[tokio::test]
    async fn test_transport_follows_and_readjusts_each_hop() {
        let inner = Arc::new(ScriptedTransport::new(vec![
            Ok(response_with_headers(302, "", &[("location", "/one")])),
            Ok(response_with_headers(307, "", &[("location", "/two")])),
            Ok(response(200, "done")),
        ]));
        let adjustment = Arc::new(FlagAdjustment::default());
        let transport = RedirectingTransport::new(
            inner.clone(),
            RedirectPolicy::new(endpoint(), DEFAULT_MAX_REDIRECTS),
            adjustment.clone(),
        );

        let mut request = json_post("https://director.test:25555/start");
        let response = transport.execute(&mut request).await.unwrap();

        assert_eq!(response.text().await.unwrap(), "done");
        assert_eq!(*adjustment.calls.lock().unwrap(), vec![true, true]);

        let sent = inner.requests();
        assert_eq!(sent.len(), 3);
        assert_eq!(sent[1].url.path(), "/one");
        assert_eq!(sent[2].url.path(), "/two");
        assert_eq!(sent[2].method, Method::GET);
        assert_eq!(sent[2].header("authorization"), Some("bearer retried-true"));
        assert!(sent[2].body.is_none());

        // The caller's request is left as it was sent.
        assert_eq!(request.url().path(), "/start");
        assert!(request.has_body());
    }

    #[tokio::test]
    async fn test_transport_stops_after_hop_limit() {
        let script = (0..3)
            .map(|_| Ok(response_with_headers(302, "", &[("location", "/loop")])))
            .collect();
        let inner = Arc::new(ScriptedTransport::new(script));
        let transport = RedirectingTransport::new(
            inner.clone(),
            RedirectPolicy::new(endpoint(), 2),
            Arc::new(FlagAdjustment::default()),
        );

        let mut request = DirectorRequest::new(Method::GET, endpoint().join("/loop").unwrap());
        let err = transport.execute(&mut request).await.unwrap_err();

        assert!(matches!(err, DirectorError::TooManyRedirects(2)));
        assert_eq!(inner.request_count(), 3);
    }

    #[tokio::test]
    async fn test_redirected_post_arrives_as_scrubbed_get() {
        let mut server = mockito::Server::new_async().await;
        let redirect = server
            .mock("POST", "/configs")
            .with_status(302)
            .with_header("location", "/result")
            .create_async()
            .await;
        let follow_up = server
            .mock("GET", "/result")
            .match_header("authorization", "bearer retried-true")
            .match_header(CONTENT_TYPE.as_str(), mockito::Matcher::Missing)
            .match_header("referer", mockito::Matcher::Missing)
            .match_body("")
            .with_status(200)
            .create_async()
            .await;

        let endpoint = Url::parse(&server.url()).unwrap();
        let transport = RedirectingTransport::new(
            Arc::new(HttpTransport::new(
                Client::builder()
                    .redirect(reqwest::redirect::Policy::none())
                    .build()
                    .unwrap(),
            )),
            RedirectPolicy::new(endpoint.clone(), DEFAULT_MAX_REDIRECTS),
            Arc::new(FlagAdjustment::default()),
        );

        let mut request = json_post(endpoint.join("/configs").unwrap().as_str());
        let response = transport.execute(&mut request).await.unwrap();

        assert_eq!(response.status().as_u16(), 200);
        redirect.assert_async().await;
        follow_up.assert_async().await;
    }
}
