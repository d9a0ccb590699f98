//! Endpoint discovery and capability probing for geospatial search services.
//!
//! Given a host/port or a direct URL, this crate figures out whether a CSW,
//! WFS, or OpenSearch service is listening there, which protocol variant it
//! speaks, and emits a ready-to-persist [`SourceConfig`]. Persisting that
//! configuration (and validating user input before it gets here) is the
//! caller's job; this crate only does the probing.
//!
//! # Example
//!
//! ```rust,ignore
//! use source_discovery::{Protocol, SourceProbe};
//!
//! let probe = SourceProbe::new(Protocol::Csw);
//!
//! // Find the endpoint, then turn its capabilities into a configuration.
//! let url = probe.discover_url("example.org", 8993, None).await?;
//! let config = probe.build_config(&url.value, None).await?;
//! println!("factory: {}", config.value.factory_pid());
//! for warning in &config.warnings {
//!     eprintln!("note: {warning}");
//! }
//! ```
//!
//! # Modules
//!
//! - [`probe`] - The probing engine and the three protocol strategies
//! - [`transport`] - HTTP(S) requests with reachability pre-flight and TLS
//!   trust fallback
//! - [`capabilities`] - Namespace-aware capability-document queries
//! - [`config`] - Discovered source configurations and factory identifiers
//! - [`diagnostics`] - The closed diagnostic taxonomy
//! - [`testing`] - Mock transport for tests

pub mod capabilities;
pub mod config;
pub mod diagnostics;
pub mod probe;
pub mod result;
pub mod testing;
pub mod transport;

pub use config::{
    Credentials, CswSourceConfig, OpenSearchSourceConfig, Protocol, SourceConfig, WfsSourceConfig,
};
pub use diagnostics::{Diagnostic, DiagnosticKind, Severity};
pub use probe::SourceProbe;
pub use result::{Discovered, DiscoveryResult};
pub use transport::{HttpResponse, HttpTransport, Transport};
