//! Namespace-aware queries over capability documents.
//!
//! This module turns raw XML into the handful of facts the protocol probes
//! care about: which output schemas a CSW endpoint advertises for
//! `GetRecords`, which version a WFS capabilities root declares, and
//! whether an OpenSearch response carries a `totalResults` element.
//! Protocol-level interpretation of those facts lives in [`crate::probe`].

use roxmltree::{Document, Node};
use thiserror::Error;

/// OGC OWS namespace used by CSW capability documents.
pub const OWS_NS: &str = "http://www.opengis.net/ows";
/// WFS 2.0 capabilities namespace.
pub const WFS_NS: &str = "http://www.opengis.net/wfs/2.0";
/// OpenSearch 1.1 namespace (bound as both `os` and `opensearch` in the wild).
pub const OPENSEARCH_NS: &str = "http://a9.com/-/spec/opensearch/1.1/";

/// Output schema URN identifying the catalog-metacard profile.
pub const METACARD_OUTPUT_SCHEMA: &str = "urn:catalog:metacard";
/// Output schema URI identifying ISO/GMD metadata.
pub const GMD_OUTPUT_SCHEMA: &str = "http://www.isotc211.org/2005/gmd";

#[derive(Debug, Error)]
pub enum CapabilitiesError {
    #[error("malformed capability document: {0}")]
    Parse(#[from] roxmltree::Error),
}

/// Parses a capability response body as namespace-aware XML.
pub fn parse(body: &str) -> Result<Document<'_>, CapabilitiesError> {
    Ok(Document::parse(body)?)
}

fn is_ows(node: &Node<'_, '_>, local_name: &str) -> bool {
    node.is_element()
        && node.tag_name().name() == local_name
        && node.tag_name().namespace() == Some(OWS_NS)
}

/// Collects every `OutputSchema` value the document advertises for the
/// `GetRecords` operation, in document order.
///
/// The `ows:Operation[@name='GetRecords']/ows:Parameter[@name='OutputSchema'
/// or @name='outputSchema']/ows:Value` shape, with both attribute spellings
/// accepted.
pub fn csw_output_schemas(doc: &Document<'_>) -> Vec<String> {
    let mut schemas = Vec::new();
    for operation in doc
        .descendants()
        .filter(|n| is_ows(n, "Operation") && n.attribute("name") == Some("GetRecords"))
    {
        for parameter in operation.descendants().filter(|n| {
            is_ows(n, "Parameter")
                && matches!(n.attribute("name"), Some("OutputSchema") | Some("outputSchema"))
        }) {
            for value in parameter.descendants().filter(|n| is_ows(n, "Value")) {
                if let Some(text) = value.text() {
                    let text = text.trim();
                    if !text.is_empty() {
                        schemas.push(text.to_owned());
                    }
                }
            }
        }
    }
    schemas
}

/// Reads the `version` attribute off the capabilities root element.
pub fn wfs_version<'a>(doc: &'a Document<'_>) -> Option<&'a str> {
    doc.root_element().attribute("version")
}

/// Whether the document contains an OpenSearch `totalResults` element.
pub fn has_total_results(doc: &Document<'_>) -> bool {
    doc.descendants().any(|n| {
        n.is_element()
            && n.tag_name().name() == "totalResults"
            && n.tag_name().namespace() == Some(OPENSEARCH_NS)
    })
}
