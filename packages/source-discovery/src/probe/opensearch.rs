//! OpenSearch strategy: a sample query instead of GetCapabilities, and a
//! `totalResults` sanity check instead of branch selection.

use crate::capabilities;
use crate::config::{
    Credentials, OpenSearchSourceConfig, SourceConfig, OPENSEARCH_FACTORY_PID,
};
use crate::diagnostics::{origin, Diagnostic};

use super::ProtocolDescriptor;

pub(crate) static DESCRIPTOR: ProtocolDescriptor = ProtocolDescriptor {
    url_templates: &[
        "https://{host}:{port}/services/catalog/query",
        "https://{host}:{port}/catalog/query",
        "http://{host}:{port}/services/catalog/query",
        "http://{host}:{port}/catalog/query",
    ],
    probe_query: "?q=test&mr=1&src=local",
    mime_types: &["application/atom+xml", "application/atom+xml; charset=UTF-8"],
};

/// Requires the Atom response to carry an OpenSearch `totalResults`
/// element. Runs at probe time, unlike the CSW/WFS structural checks.
pub(crate) fn verify_body(body: &str) -> Result<(), Diagnostic> {
    let doc = capabilities::parse(body).map_err(|e| {
        tracing::debug!(error = %e, "failed to parse OpenSearch response");
        Diagnostic::internal_error(origin::URL)
    })?;
    if capabilities::has_total_results(&doc) {
        Ok(())
    } else {
        tracing::debug!("OpenSearch response is missing totalResults");
        Err(Diagnostic::unknown_endpoint(origin::URL))
    }
}

/// No branch selection needed: a verified endpoint always gets the single
/// OpenSearch factory.
pub(crate) fn interpret(
    url: &str,
    credentials: Option<&Credentials>,
) -> Result<SourceConfig, Diagnostic> {
    Ok(SourceConfig::OpenSearch(OpenSearchSourceConfig {
        endpoint_url: url.to_owned(),
        credentials: credentials.cloned(),
        factory_pid: OPENSEARCH_FACTORY_PID.to_owned(),
    }))
}
