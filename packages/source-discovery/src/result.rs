//! Per-stage probe results.
//!
//! Every probing-layer function returns a [`DiscoveryResult`] instead of
//! raising: either a value plus any warning-level diagnostics collected on
//! the way, or the list of diagnostics explaining the failure. An
//! error-level diagnostic therefore always means "no value" by
//! construction, while warnings (untrusted CA) can ride along with a
//! successful payload.

use crate::diagnostics::Diagnostic;

/// A successful stage outcome: the value plus any warnings.
///
/// Callers must not treat "value present" as "zero messages" - a probe
/// that only succeeded through the trust-all TLS fallback still carries
/// its `UNTRUSTED_CA` warning here.
#[derive(Debug, Clone, PartialEq)]
pub struct Discovered<T> {
    pub value: T,
    pub warnings: Vec<Diagnostic>,
}

/// Outcome of a single probe stage.
///
/// The `Err` side holds every diagnostic accumulated by the failing
/// attempt; at least one of them is error severity.
pub type DiscoveryResult<T> = Result<Discovered<T>, Vec<Diagnostic>>;

impl<T> Discovered<T> {
    pub fn new(value: T) -> Self {
        Self {
            value,
            warnings: Vec::new(),
        }
    }

    pub fn with_warnings(value: T, warnings: Vec<Diagnostic>) -> Self {
        debug_assert!(warnings.iter().all(Diagnostic::is_warning));
        Self { value, warnings }
    }

    /// Transform the value, keeping accumulated warnings.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Discovered<U> {
        Discovered {
            value: f(self.value),
            warnings: self.warnings,
        }
    }
}
