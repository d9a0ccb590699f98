//! HTTP transport with a reachability pre-flight and a bounded TLS trust
//! fallback.
//!
//! One logical request = one TCP ping, one strict-TLS attempt, and at most
//! one trust-all retry. Timeouts are tuned for interactive discovery
//! (hundreds of milliseconds), not bulk transfer. Clients are built per
//! request and dropped on every exit path; nothing is pooled across probe
//! attempts.

use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpStream;
use url::Url;

use crate::config::Credentials;
use crate::diagnostics::{origin, Diagnostic};
use crate::result::{Discovered, DiscoveryResult};

/// Connect/read timeout shared by the TCP ping and the real request.
pub const PING_TIMEOUT: Duration = Duration::from_millis(500);

/// Sentinel recorded when a response carries no Content-Type header. It
/// can never match a protocol MIME whitelist.
pub const NO_CONTENT_TYPE: &str = "NONE";

const HTTP_OK: u16 = 200;
const HTTPS: &str = "https";

/// A fully buffered HTTP response. Capability documents are small.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    /// Content-Type header value, or [`NO_CONTENT_TYPE`] if absent.
    pub content_type: String,
    pub body: String,
}

impl HttpResponse {
    pub fn is_ok(&self) -> bool {
        self.status == HTTP_OK
    }
}

/// The request seam the protocol probes talk through.
///
/// Real probing goes through [`HttpTransport`]; tests substitute
/// [`crate::testing::MockTransport`].
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a GET. Does NOT check the response status or body; callers'
    /// status/content-type checks decide pass/fail.
    async fn get(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> DiscoveryResult<HttpResponse>;

    /// Send a POST with the given body and content type.
    async fn post(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        content_type: &str,
        body: &str,
    ) -> DiscoveryResult<HttpResponse>;
}

/// Attempts to open a TCP connection to the host behind `url`.
///
/// Purely advisory: success does not guarantee the subsequent real request
/// succeeds, but failure lets a probe bail out before issuing one.
pub async fn reachable_url(url: &str) -> Result<(), Diagnostic> {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            tracing::debug!(url, error = %e, "not an absolute URL");
            return Err(Diagnostic::cannot_connect(origin::URL));
        }
    };
    let host = parsed
        .host_str()
        .ok_or_else(|| Diagnostic::cannot_connect(origin::URL))?;
    let port = parsed
        .port_or_known_default()
        .ok_or_else(|| Diagnostic::cannot_connect(origin::URL))?;
    reachable(host, port).await
}

/// Attempts to open a TCP connection to `host:port` within [`PING_TIMEOUT`].
pub async fn reachable(host: &str, port: u16) -> Result<(), Diagnostic> {
    match tokio::time::timeout(PING_TIMEOUT, TcpStream::connect((host, port))).await {
        Ok(Ok(_stream)) => {
            tracing::debug!(host, port, "endpoint is reachable");
            Ok(())
        }
        Ok(Err(e)) => {
            tracing::debug!(host, port, error = %e, "endpoint is unreachable");
            Err(Diagnostic::cannot_connect(origin::ADDRESS))
        }
        Err(_elapsed) => {
            tracing::debug!(host, port, "reachability check timed out");
            Err(Diagnostic::cannot_connect(origin::ADDRESS))
        }
    }
}

#[derive(Debug, Clone, Copy)]
enum Method {
    Get,
    Post,
}

/// HTTP(S) transport backed by reqwest.
#[derive(Debug, Clone, Default)]
pub struct HttpTransport;

impl HttpTransport {
    pub fn new() -> Self {
        Self
    }

    /// Issue the request once, strict or trust-all, with no retries.
    async fn execute(
        &self,
        method: Method,
        url: &str,
        credentials: Option<&Credentials>,
        body: Option<(&str, &str)>,
        trust_any_ca: bool,
    ) -> Result<HttpResponse, reqwest::Error> {
        let mut builder = reqwest::Client::builder()
            .connect_timeout(PING_TIMEOUT)
            .timeout(PING_TIMEOUT)
            .pool_max_idle_per_host(0);
        if trust_any_ca {
            builder = builder.danger_accept_invalid_certs(true);
        }
        let client = builder.build()?;

        let mut request = match method {
            Method::Get => client.get(url),
            Method::Post => client.post(url),
        };
        // Basic-Auth only travels over TLS.
        if let (true, Some(creds)) = (url.starts_with(HTTPS), credentials) {
            request = request.basic_auth(&creds.username, Some(&creds.password));
        }
        if let Some((content_type, content)) = body {
            request = request
                .header(reqwest::header::CONTENT_TYPE, content_type)
                .body(content.to_owned());
        }

        let response = request.send().await?;
        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| NO_CONTENT_TYPE.to_owned());
        let body = response.text().await?;

        Ok(HttpResponse {
            status,
            content_type,
            body,
        })
    }

    async fn send(
        &self,
        method: Method,
        url: &str,
        credentials: Option<&Credentials>,
        body: Option<(&str, &str)>,
    ) -> DiscoveryResult<HttpResponse> {
        if let Err(diag) = reachable_url(url).await {
            return Err(vec![diag]);
        }

        match self.execute(method, url, credentials, body, false).await {
            Ok(response) if response.is_ok() => {
                tracing::debug!(url, "found valid endpoint");
                Ok(Discovered::new(response))
            }
            Ok(response) => {
                tracing::debug!(url, status = response.status, "non-200 response");
                Err(vec![Diagnostic::cannot_connect(origin::URL)])
            }
            Err(e) if is_peer_verification_error(&e) => {
                tracing::debug!(url, error = %e, "failed cert check");
                Err(vec![Diagnostic::cert_error(origin::URL)])
            }
            Err(e) => {
                tracing::debug!(url, error = %e, "strict attempt failed, retrying trust-all");
                match self.execute(method, url, credentials, body, true).await {
                    Ok(response) if response.is_ok() => {
                        tracing::debug!(url, "untrusted certificate at endpoint");
                        Ok(Discovered::with_warnings(
                            response,
                            vec![Diagnostic::untrusted_ca(origin::URL)],
                        ))
                    }
                    Ok(response) => {
                        tracing::debug!(url, status = response.status, "trust-all got non-200");
                        Err(vec![Diagnostic::cannot_connect(origin::URL)])
                    }
                    Err(e) => {
                        tracing::debug!(url, error = %e, "trust-all attempt failed");
                        Err(vec![Diagnostic::cannot_connect(origin::URL)])
                    }
                }
            }
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn get(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> DiscoveryResult<HttpResponse> {
        self.send(Method::Get, url, credentials, None).await
    }

    async fn post(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
        content_type: &str,
        body: &str,
    ) -> DiscoveryResult<HttpResponse> {
        self.send(Method::Post, url, credentials, Some((content_type, body)))
            .await
    }
}

/// Whether an error is a TLS peer-verification failure the trust-all
/// retry cannot repair: the server presented a certificate that is not
/// valid for the name being contacted.
///
/// Unknown-issuer and self-signed chains are deliberately NOT matched
/// here — the trust-all retry exists precisely for those, so they fall
/// through to it like any other I/O failure. reqwest surfaces TLS
/// failures as connect errors; the distinguishing detail only appears in
/// the error source chain (rustls reports `NotValidForName`, openssl
/// reports a hostname mismatch).
fn is_peer_verification_error(err: &(dyn std::error::Error + 'static)) -> bool {
    const IDENTITY_MARKERS: [&str; 3] =
        ["notvalidforname", "hostname mismatch", "name mismatch"];
    let mut source = Some(err);
    while let Some(e) = source {
        let text = e.to_string().to_lowercase();
        if IDENTITY_MARKERS.iter().any(|marker| text.contains(marker)) {
            return true;
        }
        source = e.source();
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn reachable_rejects_unroutable_host_within_timeout() {
        // TEST-NET-1 (RFC 5737) is guaranteed unroutable.
        let started = std::time::Instant::now();
        let result = reachable("192.0.2.1", 80).await;
        let diag = result.unwrap_err();
        assert_eq!(diag, Diagnostic::cannot_connect(origin::ADDRESS));
        // Bounded by the ping timeout, with slack for scheduling.
        assert!(started.elapsed() < PING_TIMEOUT * 4);
    }

    #[tokio::test]
    async fn reachable_url_rejects_relative_url() {
        let diag = reachable_url("not-a-url").await.unwrap_err();
        assert_eq!(diag, Diagnostic::cannot_connect(origin::URL));
    }

    #[tokio::test]
    async fn send_short_circuits_on_unreachable_host() {
        let transport = HttpTransport::new();
        let result = transport.get("http://192.0.2.1:80/services/csw", None).await;
        let diags = result.unwrap_err();
        assert_eq!(diags, vec![Diagnostic::cannot_connect(origin::ADDRESS)]);
    }

    /// A nested error chain shaped like the ones reqwest produces for
    /// connect failures: outer request error, inner TLS/I/O detail.
    #[derive(Debug, thiserror::Error)]
    #[error("{message}")]
    struct ChainedError {
        message: &'static str,
        #[source]
        source: Option<Box<ChainedError>>,
    }

    fn error_chain(messages: &[&'static str]) -> ChainedError {
        let mut iter = messages.iter().rev().copied();
        let mut err = ChainedError {
            message: iter.next().expect("at least one message"),
            source: None,
        };
        for message in iter {
            err = ChainedError {
                message,
                source: Some(Box::new(err)),
            };
        }
        err
    }

    #[test]
    fn name_mismatch_is_a_peer_verification_hard_stop() {
        // rustls wording.
        let rustls = error_chain(&[
            "error sending request",
            "client error (Connect)",
            "invalid peer certificate: NotValidForName",
        ]);
        assert!(is_peer_verification_error(&rustls));

        // openssl wording.
        let openssl = error_chain(&[
            "error sending request",
            "certificate verify failed",
            "Hostname mismatch",
        ]);
        assert!(is_peer_verification_error(&openssl));
    }

    #[test]
    fn self_signed_and_unknown_issuer_take_the_trust_all_retry() {
        // These are exactly the failures the trust-all retry exists for;
        // classifying them as peer-verification errors would dead-end the
        // fallback.
        let chains: [&[&str]; 3] = [
            &[
                "error sending request",
                "invalid peer certificate: UnknownIssuer",
            ],
            &[
                "error sending request",
                "certificate verify failed",
                "self-signed certificate",
            ],
            &[
                "error sending request",
                "certificate verify failed",
                "unable to get local issuer certificate",
            ],
        ];
        for messages in chains {
            let err = error_chain(messages);
            assert!(
                !is_peer_verification_error(&err),
                "should take the trust-all retry: {messages:?}"
            );
        }
    }

    #[test]
    fn plain_io_failures_are_not_peer_verification_errors() {
        for messages in [
            &["error sending request", "connection reset by peer"][..],
            &["error sending request", "dns error: failed to lookup address"][..],
            &["operation timed out"][..],
        ] {
            let err = error_chain(messages);
            assert!(!is_peer_verification_error(&err), "{messages:?}");
        }
    }

    #[tokio::test]
    async fn non_tls_failure_after_fallback_is_a_single_cannot_connect() {
        // A listener that accepts and immediately hangs up: reachability
        // passes, but both the strict attempt and the trust-all retry fail
        // for a reason trust cannot repair.
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        tokio::spawn(async move {
            loop {
                match listener.accept().await {
                    Ok((stream, _)) => drop(stream),
                    Err(_) => break,
                }
            }
        });

        let transport = HttpTransport::new();
        let diags = transport
            .get(&format!("http://127.0.0.1:{port}/services/csw"), None)
            .await
            .unwrap_err();
        assert_eq!(diags, vec![Diagnostic::cannot_connect(origin::URL)]);
    }

    #[test]
    fn missing_content_type_sentinel_matches_no_whitelist() {
        let response = HttpResponse {
            status: 200,
            content_type: NO_CONTENT_TYPE.to_owned(),
            body: String::new(),
        };
        let whitelists: [&[&str]; 2] = [
            &["text/xml", "application/xml"],
            &["application/atom+xml"],
        ];
        for whitelist in whitelists {
            assert!(!whitelist.contains(&response.content_type.as_str()));
        }
    }
}
