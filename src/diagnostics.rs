//! Non-fatal build diagnostics.
//!
//! Stages that can degrade gracefully (an author-supplied description that is
//! longer than a meta tag should carry, for example) report through a
//! [`DiagnosticSink`] handed in by the caller instead of writing to a global
//! logger. The CLI wires in [`LogSink`]; tests and parallel builds collect into
//! a `Vec<Diagnostic>` and decide later what to print.
//!
//! Reporting never fails and never blocks the stage that reports.

use std::fmt;

/// A warning raised while building, identifying the document it concerns.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Diagnostic {
    /// An explicit description exceeds the meta description limit. It is
    /// still used verbatim.
    DescriptionTooLong {
        /// Path, source, or id of the offending document.
        source: String,
        /// Length of the explicit description, in characters.
        length: usize,
        /// The limit it was checked against.
        max: usize,
    },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::DescriptionTooLong { source, max, .. } => write!(
                f,
                "meta description longer than maximum of {max} characters [{source}]"
            ),
        }
    }
}

/// Receiver for [`Diagnostic`]s.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects diagnostics in report order.
impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Forwards every diagnostic to `log::warn!`.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        log::warn!("{diagnostic}");
    }
}
