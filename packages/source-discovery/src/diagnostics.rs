//! Diagnostic messages produced by probe operations.
//!
//! The taxonomy is closed: every failure or caveat a probe can report maps
//! onto one of the [`DiagnosticKind`] variants. Severity is a function of
//! the kind, so a caller can never construct, say, a warning-level
//! `CannotConnect`.

use std::fmt;

use serde::Serialize;

/// What went wrong (or almost went wrong) during a probe step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DiagnosticKind {
    /// Network failure, timeout, or a non-200 response.
    CannotConnect,
    /// TLS peer verification failed on the strict attempt.
    CertError,
    /// The request only succeeded after falling back to a trust-all TLS
    /// context. The payload is usable; the trust gap is not.
    UntrustedCa,
    /// A response came back but does not match the protocol signature,
    /// or advertises an unsupported protocol version.
    UnknownEndpoint,
    /// Local failure: unparsable document, capability interpretation
    /// exhausted without a result.
    InternalError,
}

/// Whether a diagnostic invalidates the probe result or merely annotates it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    Error,
    Warning,
}

impl DiagnosticKind {
    pub fn severity(self) -> Severity {
        match self {
            DiagnosticKind::UntrustedCa => Severity::Warning,
            DiagnosticKind::CannotConnect
            | DiagnosticKind::CertError
            | DiagnosticKind::UnknownEndpoint
            | DiagnosticKind::InternalError => Severity::Error,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DiagnosticKind::CannotConnect => "CANNOT_CONNECT",
            DiagnosticKind::CertError => "CERT_ERROR",
            DiagnosticKind::UntrustedCa => "UNTRUSTED_CA",
            DiagnosticKind::UnknownEndpoint => "UNKNOWN_ENDPOINT",
            DiagnosticKind::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for DiagnosticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identifiers of the input fields a diagnostic can be attached to.
///
/// The command layer uses these to route a message back to the user-facing
/// input it pertains to.
pub mod origin {
    pub const URL: &str = "url";
    pub const ADDRESS: &str = "address";
    pub const CREDENTIALS: &str = "credentials";
}

/// A single probe diagnostic: a kind plus the input field it pertains to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// Identifier of the originating input field, see [`origin`].
    pub origin: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, origin: impl Into<String>) -> Self {
        Self {
            kind,
            origin: origin.into(),
        }
    }

    pub fn cannot_connect(origin: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::CannotConnect, origin)
    }

    pub fn cert_error(origin: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::CertError, origin)
    }

    pub fn untrusted_ca(origin: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UntrustedCa, origin)
    }

    pub fn unknown_endpoint(origin: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::UnknownEndpoint, origin)
    }

    pub fn internal_error(origin: impl Into<String>) -> Self {
        Self::new(DiagnosticKind::InternalError, origin)
    }

    pub fn severity(&self) -> Severity {
        self.kind.severity()
    }

    pub fn is_error(&self) -> bool {
        self.severity() == Severity::Error
    }

    pub fn is_warning(&self) -> bool {
        self.severity() == Severity::Warning
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.kind, self.origin)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn untrusted_ca_is_the_only_warning() {
        let kinds = [
            DiagnosticKind::CannotConnect,
            DiagnosticKind::CertError,
            DiagnosticKind::UntrustedCa,
            DiagnosticKind::UnknownEndpoint,
            DiagnosticKind::InternalError,
        ];
        for kind in kinds {
            let expected = if kind == DiagnosticKind::UntrustedCa {
                Severity::Warning
            } else {
                Severity::Error
            };
            assert_eq!(kind.severity(), expected, "{kind}");
        }
    }

    #[test]
    fn diagnostic_carries_origin() {
        let diag = Diagnostic::cannot_connect(origin::ADDRESS);
        assert!(diag.is_error());
        assert_eq!(diag.origin, "address");
        assert_eq!(diag.to_string(), "CANNOT_CONNECT (address)");
    }
}
