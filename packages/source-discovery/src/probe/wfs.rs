//! WFS strategy: templates, probe query, and version mapping.

use crate::capabilities;
use crate::config::{
    Credentials, SourceConfig, WfsSourceConfig, WFS1_FACTORY_PID, WFS2_FACTORY_PID,
};
use crate::diagnostics::{origin, Diagnostic};

use super::ProtocolDescriptor;

pub(crate) static DESCRIPTOR: ProtocolDescriptor = ProtocolDescriptor {
    url_templates: &[
        "https://{host}:{port}/services/wfs",
        "https://{host}:{port}/wfs",
        "http://{host}:{port}/services/wfs",
        "http://{host}:{port}/wfs",
    ],
    probe_query: "?service=WFS&request=GetCapabilities&AcceptVersions=2.0.0,1.0.0",
    mime_types: &[
        "text/xml",
        "application/xml",
        "text/xml; charset=UTF-8",
        "application/xml; charset=UTF-8",
    ],
};

/// Maps the capabilities root `version` attribute onto a WFS factory.
/// Anything other than 2.0.0 or 1.0.0 is a hard stop, not a fallback.
pub(crate) fn interpret(
    url: &str,
    credentials: Option<&Credentials>,
    body: &str,
) -> Result<SourceConfig, Diagnostic> {
    let doc = capabilities::parse(body).map_err(|e| {
        tracing::debug!(url, error = %e, "failed to parse WFS capabilities");
        Diagnostic::internal_error(origin::URL)
    })?;

    let factory_pid = match capabilities::wfs_version(&doc) {
        Some("2.0.0") => WFS2_FACTORY_PID,
        Some("1.0.0") => WFS1_FACTORY_PID,
        version => {
            tracing::debug!(url, ?version, "unsupported WFS version");
            return Err(Diagnostic::unknown_endpoint(origin::URL));
        }
    };

    Ok(SourceConfig::Wfs(WfsSourceConfig {
        endpoint_url: url.to_owned(),
        credentials: credentials.cloned(),
        factory_pid: factory_pid.to_owned(),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn capabilities(version_attr: &str) -> String {
        format!(
            r#"<wfs:WFS_Capabilities xmlns:wfs="http://www.opengis.net/wfs/2.0"{version_attr}/>"#
        )
    }

    #[test]
    fn version_two_selects_wfs2() {
        let body = capabilities(r#" version="2.0.0""#);
        let config = interpret("https://example.org:443/services/wfs", None, &body).unwrap();
        assert_eq!(config.factory_pid(), WFS2_FACTORY_PID);
    }

    #[test]
    fn version_one_selects_wfs1() {
        let body = capabilities(r#" version="1.0.0""#);
        let config = interpret("https://example.org:443/services/wfs", None, &body).unwrap();
        assert_eq!(config.factory_pid(), WFS1_FACTORY_PID);
    }

    #[test]
    fn unsupported_versions_are_unknown_endpoints() {
        for attr in [r#" version="9.9.9""#, r#" version="""#, ""] {
            let body = capabilities(attr);
            let diag =
                interpret("https://example.org:443/services/wfs", None, &body).unwrap_err();
            assert_eq!(diag, Diagnostic::unknown_endpoint(origin::URL), "{attr:?}");
        }
    }

    #[test]
    fn unparsable_document_is_an_internal_error() {
        let diag = interpret("https://example.org:443/services/wfs", None, "<oops").unwrap_err();
        assert_eq!(diag, Diagnostic::internal_error(origin::URL));
    }
}
