//! Where the document builder sends diagnostics.

use sfz_lint_diagnostics::Diagnostic;

/// Receives each diagnostic as soon as it is detected.
///
/// Reporting never stops the build. Implementations must not assume any
/// ordering beyond document order.
pub trait DiagnosticSink {
    /// Accept one diagnostic.
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Discards everything.
impl DiagnosticSink for () {
    fn report(&mut self, _diagnostic: Diagnostic) {}
}

impl<S: DiagnosticSink + ?Sized> DiagnosticSink for &mut S {
    fn report(&mut self, diagnostic: Diagnostic) {
        (**self).report(diagnostic);
    }
}

/// Adapts a closure into a [`DiagnosticSink`].
///
/// ```
/// use sfz_lint_core::validate::{DiagnosticSink, FnSink};
/// use sfz_lint_core::{Diagnostic, codes};
///
/// let mut count = 0;
/// let mut sink = FnSink(|_d: Diagnostic| count += 1);
/// sink.report(Diagnostic::warn(codes::DUPLICATE_OPCODE, "duplicate", None));
/// drop(sink);
/// assert_eq!(count, 1);
/// ```
pub struct FnSink<F>(pub F);

impl<F: FnMut(Diagnostic)> DiagnosticSink for FnSink<F> {
    fn report(&mut self, diagnostic: Diagnostic) {
        (self.0)(diagnostic);
    }
}
