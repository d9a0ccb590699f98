//! Testing utilities including a mock transport.
//!
//! Useful for testing probe logic without opening sockets: script responses
//! per request URL and assert on the order and count of recorded calls.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;

use crate::config::Credentials;
use crate::diagnostics::{origin, Diagnostic};
use crate::result::{Discovered, DiscoveryResult};
use crate::transport::{HttpResponse, Transport};

/// Record of a call made to the mock transport.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    Get { url: String },
    Post { url: String, content_type: String },
}

impl MockCall {
    pub fn url(&self) -> &str {
        match self {
            MockCall::Get { url } | MockCall::Post { url, .. } => url,
        }
    }
}

/// A scripted [`Transport`].
///
/// Responses are keyed by the full request URL (including the probe query
/// string). URLs with no scripted response answer with `CANNOT_CONNECT`,
/// which is what an unreachable candidate would produce.
#[derive(Default)]
pub struct MockTransport {
    responses: Arc<RwLock<HashMap<String, DiscoveryResult<HttpResponse>>>>,
    calls: Arc<RwLock<Vec<MockCall>>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a 200 response with the given content type and body.
    pub fn with_ok(self, url: impl Into<String>, content_type: &str, body: &str) -> Self {
        self.with_result(
            url,
            Ok(Discovered::new(HttpResponse {
                status: 200,
                content_type: content_type.to_owned(),
                body: body.to_owned(),
            })),
        )
    }

    /// Script a failing response carrying a single diagnostic.
    pub fn with_failure(self, url: impl Into<String>, diagnostic: Diagnostic) -> Self {
        self.with_result(url, Err(vec![diagnostic]))
    }

    /// Script an arbitrary result, e.g. a success with warnings.
    pub fn with_result(self, url: impl Into<String>, result: DiscoveryResult<HttpResponse>) -> Self {
        self.responses.write().unwrap().insert(url.into(), result);
        self
    }

    /// All calls made so far, in order.
    pub fn calls(&self) -> Vec<MockCall> {
        self.calls.read().unwrap().clone()
    }

    /// How many times `url` was requested.
    pub fn call_count(&self, url: &str) -> usize {
        self.calls
            .read()
            .unwrap()
            .iter()
            .filter(|call| call.url() == url)
            .count()
    }

    fn respond(&self, url: &str) -> DiscoveryResult<HttpResponse> {
        self.responses
            .read()
            .unwrap()
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(vec![Diagnostic::cannot_connect(origin::URL)]))
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn get(
        &self,
        url: &str,
        _credentials: Option<&Credentials>,
    ) -> DiscoveryResult<HttpResponse> {
        self.calls.write().unwrap().push(MockCall::Get {
            url: url.to_owned(),
        });
        self.respond(url)
    }

    async fn post(
        &self,
        url: &str,
        _credentials: Option<&Credentials>,
        content_type: &str,
        _body: &str,
    ) -> DiscoveryResult<HttpResponse> {
        self.calls.write().unwrap().push(MockCall::Post {
            url: url.to_owned(),
            content_type: content_type.to_owned(),
        });
        self.respond(url)
    }
}
