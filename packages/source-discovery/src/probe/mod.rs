//! The probing engine.
//!
//! One control flow, three protocol strategies: every protocol knows its
//! candidate URL templates, its probe query string, the MIME types a valid
//! response may carry, and how to turn a capability document into a source
//! configuration. [`SourceProbe`] drives the shared flow; [`csw`], [`wfs`],
//! and [`opensearch`] supply the per-protocol pieces.

pub mod csw;
pub mod opensearch;
pub mod wfs;

use crate::config::{Credentials, Protocol, SourceConfig};
use crate::diagnostics::{origin, Diagnostic};
use crate::result::{Discovered, DiscoveryResult};
use crate::transport::{HttpResponse, HttpTransport, Transport};

/// Everything that varies between protocols, as data.
pub(crate) struct ProtocolDescriptor {
    /// Candidate URL templates in strict preference order: HTTPS before
    /// HTTP, well-known path before bare root. `{host}` and `{port}` are
    /// substituted per attempt.
    pub url_templates: &'static [&'static str],
    /// Query string appended to a candidate URL to elicit a capability
    /// response.
    pub probe_query: &'static str,
    /// Content types a valid capability response may carry.
    pub mime_types: &'static [&'static str],
}

impl Protocol {
    pub(crate) fn descriptor(self) -> &'static ProtocolDescriptor {
        match self {
            Protocol::Csw => &csw::DESCRIPTOR,
            Protocol::Wfs => &wfs::DESCRIPTOR,
            Protocol::OpenSearch => &opensearch::DESCRIPTOR,
        }
    }

    /// Query string this protocol appends to a candidate URL.
    pub fn probe_query(self) -> &'static str {
        self.descriptor().probe_query
    }

    /// Candidate endpoint URLs for `host:port`, in the order they are probed.
    pub fn candidate_urls(self, host: &str, port: u16) -> Vec<String> {
        self.descriptor()
            .url_templates
            .iter()
            .map(|template| render_template(template, host, port))
            .collect()
    }
}

fn render_template(template: &str, host: &str, port: u16) -> String {
    template
        .replace("{host}", host)
        .replace("{port}", &port.to_string())
}

/// Probes endpoints for a single protocol.
///
/// Each call owns its transport and result instances; concurrent probes
/// for different protocols or hosts are safe by construction.
pub struct SourceProbe<T = HttpTransport> {
    protocol: Protocol,
    transport: T,
}

impl SourceProbe<HttpTransport> {
    pub fn new(protocol: Protocol) -> Self {
        Self::with_transport(protocol, HttpTransport::new())
    }
}

impl<T: Transport> SourceProbe<T> {
    pub fn with_transport(protocol: Protocol, transport: T) -> Self {
        Self {
            protocol,
            transport,
        }
    }

    pub fn protocol(&self) -> Protocol {
        self.protocol
    }

    /// Tries every candidate URL for `host:port` in preference order and
    /// returns the first that answers as this protocol.
    ///
    /// Per-candidate failure detail is collapsed into a single
    /// `UNKNOWN_ENDPOINT` when nothing matches; individual failures are
    /// only visible at debug level.
    pub async fn discover_url(
        &self,
        host: &str,
        port: u16,
        credentials: Option<&Credentials>,
    ) -> DiscoveryResult<String> {
        for url in self.protocol.candidate_urls(host, port) {
            match self.probe_url(&url, credentials).await {
                Ok(discovered) => {
                    tracing::debug!(protocol = %self.protocol, url, "discovered endpoint");
                    return Ok(discovered);
                }
                Err(diagnostics) => {
                    tracing::debug!(
                        protocol = %self.protocol,
                        url,
                        ?diagnostics,
                        "candidate rejected"
                    );
                }
            }
        }
        Err(vec![Diagnostic::unknown_endpoint(origin::ADDRESS)])
    }

    /// Issues this protocol's capability request against `url` and checks
    /// whether the response looks like the protocol. On success the value
    /// is the probed endpoint URL (without the probe query string).
    pub async fn probe_url(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> DiscoveryResult<String> {
        let response = self.send_capabilities_request(url, credentials).await?;
        Ok(response.map(|_| url.to_owned()))
    }

    /// Re-probes `url` and parses the capability document into the most
    /// specific matching source configuration.
    pub async fn build_config(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> DiscoveryResult<SourceConfig> {
        let response = self.send_capabilities_request(url, credentials).await?;
        let Discovered {
            value,
            mut warnings,
        } = response;

        let interpreted = match self.protocol {
            Protocol::Csw => csw::interpret(url, credentials, &value.body),
            Protocol::Wfs => wfs::interpret(url, credentials, &value.body),
            Protocol::OpenSearch => opensearch::interpret(url, credentials),
        };
        match interpreted {
            Ok(config) => Ok(Discovered::with_warnings(config, warnings)),
            Err(diag) => {
                warnings.push(diag);
                Err(warnings)
            }
        }
    }

    /// The shared probe step: GET the capability URL, require 200 plus a
    /// whitelisted content type, then run any protocol-specific body check.
    async fn send_capabilities_request(
        &self,
        url: &str,
        credentials: Option<&Credentials>,
    ) -> DiscoveryResult<HttpResponse> {
        let descriptor = self.protocol.descriptor();
        let request_url = format!("{url}{}", descriptor.probe_query);
        let response = self.transport.get(&request_url, credentials).await?;
        let Discovered {
            value,
            mut warnings,
        } = response;

        if !(value.is_ok() && descriptor.mime_types.contains(&value.content_type.as_str())) {
            tracing::debug!(
                protocol = %self.protocol,
                url,
                status = value.status,
                content_type = %value.content_type,
                "response does not match protocol signature"
            );
            warnings.push(Diagnostic::unknown_endpoint(origin::URL));
            return Err(warnings);
        }

        if self.protocol == Protocol::OpenSearch {
            if let Err(diag) = opensearch::verify_body(&value.body) {
                warnings.push(diag);
                return Err(warnings);
            }
        }

        Ok(Discovered::with_warnings(value, warnings))
    }
}
