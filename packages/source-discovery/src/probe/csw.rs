//! CSW strategy: templates, probe query, and capability interpretation.

use crate::capabilities::{self, GMD_OUTPUT_SCHEMA, METACARD_OUTPUT_SCHEMA};
use crate::config::{
    Credentials, CswSourceConfig, SourceConfig, CSW_GMD_FACTORY_PID, CSW_PROFILE_FACTORY_PID,
    CSW_SPEC_FACTORY_PID,
};
use crate::diagnostics::{origin, Diagnostic};

use super::ProtocolDescriptor;

pub(crate) static DESCRIPTOR: ProtocolDescriptor = ProtocolDescriptor {
    url_templates: &[
        "https://{host}:{port}/services/csw",
        "https://{host}:{port}/csw",
        "http://{host}:{port}/services/csw",
        "http://{host}:{port}/csw",
    ],
    probe_query: "?service=CSW&request=GetCapabilities",
    mime_types: &[
        "text/xml",
        "application/xml",
        "application/xml; charset=UTF-8",
        "text/xml; charset=UTF-8",
    ],
};

/// Factory selected by a capability rule, plus the output schema to record.
struct CswSelection {
    factory_pid: &'static str,
    output_schema: Option<String>,
}

/// The ordered profile rules. The first rule whose predicate extracts a
/// selection from the advertised output schemas wins; adding a profile
/// means adding a row, not restructuring the flow. Priority is absolute:
/// a document satisfying both the metacard and the GMD test selects the
/// profile factory.
static PROFILE_RULES: &[(&str, fn(&[String]) -> Option<CswSelection>)] = &[
    ("catalog metacard profile", |schemas| {
        schemas
            .iter()
            .any(|s| s == METACARD_OUTPUT_SCHEMA)
            .then(|| CswSelection {
                factory_pid: CSW_PROFILE_FACTORY_PID,
                output_schema: None,
            })
    }),
    ("ISO GMD schema", |schemas| {
        schemas
            .iter()
            .any(|s| s == GMD_OUTPUT_SCHEMA)
            .then(|| CswSelection {
                factory_pid: CSW_GMD_FACTORY_PID,
                output_schema: Some(GMD_OUTPUT_SCHEMA.to_owned()),
            })
    }),
    ("first advertised schema", |schemas| {
        schemas.first().map(|schema| CswSelection {
            factory_pid: CSW_SPEC_FACTORY_PID,
            output_schema: Some(schema.clone()),
        })
    }),
];

/// Selects the most specific matching CSW factory from a capability
/// document.
pub(crate) fn interpret(
    url: &str,
    credentials: Option<&Credentials>,
    body: &str,
) -> Result<SourceConfig, Diagnostic> {
    let doc = capabilities::parse(body).map_err(|e| {
        tracing::debug!(url, error = %e, "failed to parse CSW capabilities");
        Diagnostic::internal_error(origin::URL)
    })?;
    let schemas = capabilities::csw_output_schemas(&doc);

    for (rule, select) in PROFILE_RULES.iter().copied() {
        match select(&schemas) {
            Some(selection) => {
                return Ok(SourceConfig::Csw(CswSourceConfig {
                    endpoint_url: url.to_owned(),
                    credentials: credentials.cloned(),
                    factory_pid: selection.factory_pid.to_owned(),
                    output_schema: selection.output_schema,
                }));
            }
            None => {
                tracing::debug!(url, rule, "CSW profile rule did not match");
            }
        }
    }

    tracing::debug!(url, "endpoint answered GetCapabilities but advertised no output schema");
    Err(Diagnostic::internal_error(origin::URL))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities_with(values: &str) -> String {
        format!(
            r#"<csw:Capabilities xmlns:csw="http://www.opengis.net/cat/csw/2.0.2"
                                 xmlns:ows="http://www.opengis.net/ows" version="2.0.2">
                 <ows:OperationsMetadata>
                   <ows:Operation name="GetRecords">
                     <ows:Parameter name="OutputSchema">{values}</ows:Parameter>
                   </ows:Operation>
                 </ows:OperationsMetadata>
               </csw:Capabilities>"#
        )
    }

    #[test]
    fn metacard_outranks_gmd() {
        let body = capabilities_with(
            "<ows:Value>http://www.isotc211.org/2005/gmd</ows:Value>\
             <ows:Value>urn:catalog:metacard</ows:Value>",
        );
        let config = interpret("https://example.org:443/services/csw", None, &body).unwrap();
        assert_eq!(config.factory_pid(), CSW_PROFILE_FACTORY_PID);
        assert!(config.output_schema().is_none());
    }

    #[test]
    fn gmd_selected_and_schema_recorded() {
        let body = capabilities_with("<ows:Value>http://www.isotc211.org/2005/gmd</ows:Value>");
        let config = interpret("https://example.org:443/services/csw", None, &body).unwrap();
        assert_eq!(config.factory_pid(), CSW_GMD_FACTORY_PID);
        assert_eq!(config.output_schema(), Some(GMD_OUTPUT_SCHEMA));
    }

    #[test]
    fn unknown_schema_falls_through_to_spec_factory() {
        let body = capabilities_with("<ows:Value>http://www.opengis.net/cat/csw/2.0.2</ows:Value>");
        let config = interpret("https://example.org:443/services/csw", None, &body).unwrap();
        assert_eq!(config.factory_pid(), CSW_SPEC_FACTORY_PID);
        assert_eq!(
            config.output_schema(),
            Some("http://www.opengis.net/cat/csw/2.0.2")
        );
    }

    #[test]
    fn no_advertised_schema_is_an_internal_error() {
        let body = capabilities_with("");
        let diag = interpret("https://example.org:443/services/csw", None, &body).unwrap_err();
        assert_eq!(diag, Diagnostic::internal_error(origin::URL));
    }

    #[test]
    fn unparsable_document_is_an_internal_error() {
        let diag = interpret("https://example.org:443/services/csw", None, "<oops").unwrap_err();
        assert_eq!(diag, Diagnostic::internal_error(origin::URL));
    }

    #[test]
    fn credentials_attached_verbatim() {
        let body = capabilities_with("<ows:Value>urn:catalog:metacard</ows:Value>");
        let creds = Credentials::new("admin", "hunter2");
        let config =
            interpret("https://example.org:443/services/csw", Some(&creds), &body).unwrap();
        assert_eq!(config.credentials(), Some(&creds));
        assert_eq!(config.endpoint_url(), "https://example.org:443/services/csw");
    }
}
