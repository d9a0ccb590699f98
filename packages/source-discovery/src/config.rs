//! Source configurations emitted by a successful probe.
//!
//! A configuration is immutable once built. The probing engine hands it to
//! the persistence collaborator, which owns storage; nothing in this crate
//! writes state.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The protocols this crate can discover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Protocol {
    Csw,
    Wfs,
    OpenSearch,
}

impl Protocol {
    pub fn as_str(self) -> &'static str {
        match self {
            Protocol::Csw => "CSW",
            Protocol::Wfs => "WFS",
            Protocol::OpenSearch => "OpenSearch",
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Basic-Auth credentials, attached to a discovered configuration verbatim.
/// Never validated against the target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

/// Factory pid for a CSW endpoint speaking the catalog-metacard profile.
pub const CSW_PROFILE_FACTORY_PID: &str = "Csw_Federation_Profile_Source";
/// Factory pid for a CSW endpoint advertising the ISO/GMD output schema.
pub const CSW_GMD_FACTORY_PID: &str = "Gmd_Csw_Federated_Source";
/// Factory pid for a generic specification-conformant CSW endpoint.
pub const CSW_SPEC_FACTORY_PID: &str = "Csw_Federated_Source";
/// Factory pid for WFS 1.0.0 endpoints.
pub const WFS1_FACTORY_PID: &str = "Wfs_v1_0_0_Federated_Source";
/// Factory pid for WFS 2.0.0 endpoints.
pub const WFS2_FACTORY_PID: &str = "Wfs_v2_0_0_Federated_Source";
/// Factory pid for OpenSearch endpoints.
pub const OPENSEARCH_FACTORY_PID: &str = "OpenSearchSource";

/// A discovered CSW source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CswSourceConfig {
    pub endpoint_url: String,
    pub credentials: Option<Credentials>,
    pub factory_pid: String,
    /// Output schema to request with `GetRecords`; only recorded for the
    /// GMD and generic-spec factories.
    pub output_schema: Option<String>,
}

/// A discovered WFS source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WfsSourceConfig {
    pub endpoint_url: String,
    pub credentials: Option<Credentials>,
    pub factory_pid: String,
}

/// A discovered OpenSearch source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OpenSearchSourceConfig {
    pub endpoint_url: String,
    pub credentials: Option<Credentials>,
    pub factory_pid: String,
}

/// A ready-to-persist source configuration, keyed by protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "protocol")]
pub enum SourceConfig {
    Csw(CswSourceConfig),
    Wfs(WfsSourceConfig),
    OpenSearch(OpenSearchSourceConfig),
}

impl SourceConfig {
    pub fn protocol(&self) -> Protocol {
        match self {
            SourceConfig::Csw(_) => Protocol::Csw,
            SourceConfig::Wfs(_) => Protocol::Wfs,
            SourceConfig::OpenSearch(_) => Protocol::OpenSearch,
        }
    }

    pub fn endpoint_url(&self) -> &str {
        match self {
            SourceConfig::Csw(c) => &c.endpoint_url,
            SourceConfig::Wfs(c) => &c.endpoint_url,
            SourceConfig::OpenSearch(c) => &c.endpoint_url,
        }
    }

    pub fn factory_pid(&self) -> &str {
        match self {
            SourceConfig::Csw(c) => &c.factory_pid,
            SourceConfig::Wfs(c) => &c.factory_pid,
            SourceConfig::OpenSearch(c) => &c.factory_pid,
        }
    }

    pub fn credentials(&self) -> Option<&Credentials> {
        match self {
            SourceConfig::Csw(c) => c.credentials.as_ref(),
            SourceConfig::Wfs(c) => c.credentials.as_ref(),
            SourceConfig::OpenSearch(c) => c.credentials.as_ref(),
        }
    }

    /// CSW output schema extra, if this is a CSW configuration carrying one.
    pub fn output_schema(&self) -> Option<&str> {
        match self {
            SourceConfig::Csw(c) => c.output_schema.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accessors_cross_variants() {
        let config = SourceConfig::Wfs(WfsSourceConfig {
            endpoint_url: "https://example.org:8443/services/wfs".into(),
            credentials: Some(Credentials::new("admin", "hunter2")),
            factory_pid: WFS2_FACTORY_PID.into(),
        });
        assert_eq!(config.protocol(), Protocol::Wfs);
        assert_eq!(config.factory_pid(), WFS2_FACTORY_PID);
        assert_eq!(config.credentials().unwrap().username, "admin");
        assert!(config.output_schema().is_none());
    }
}
