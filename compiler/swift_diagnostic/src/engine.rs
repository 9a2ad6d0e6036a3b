//! The diagnostic engine and its consumers.
//!
//! The engine is deliberately single-threaded: the driver constructs its
//! plan on one thread (interior `Cell`/`RefCell` state, no locks), so
//! emission can be called through a shared reference from anywhere in the
//! planning pipeline.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::diagnostic::{Diagnostic, Severity};

/// Receives every diagnostic the engine emits.
pub trait DiagnosticConsumer {
    fn handle(&self, diagnostic: &Diagnostic);
}

/// Default consumer: renders to stderr, one line per diagnostic.
///
/// Output is `location: severity: message`, the location prefix omitted
/// when unknown.
#[derive(Debug, Default)]
pub struct StderrDiagnosticConsumer;

impl DiagnosticConsumer for StderrDiagnosticConsumer {
    fn handle(&self, diagnostic: &Diagnostic) {
        if diagnostic.severity == Severity::Ignored {
            return;
        }
        eprintln!("{diagnostic}");
    }
}

/// Consumer that stores diagnostics for later inspection.
///
/// Used by tests and by embedders that render diagnostics themselves.
#[derive(Debug, Default)]
pub struct StoredDiagnosticConsumer {
    diagnostics: RefCell<Vec<Diagnostic>>,
}

impl StoredDiagnosticConsumer {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    /// Everything handled so far, in emission order.
    pub fn diagnostics(&self) -> Vec<Diagnostic> {
        self.diagnostics.borrow().clone()
    }

    /// True if any stored diagnostic's message contains `needle`.
    pub fn contains_message(&self, needle: &str) -> bool {
        self.diagnostics
            .borrow()
            .iter()
            .any(|d| d.message.contains(needle))
    }
}

impl DiagnosticConsumer for StoredDiagnosticConsumer {
    fn handle(&self, diagnostic: &Diagnostic) {
        self.diagnostics.borrow_mut().push(diagnostic.clone());
    }
}

/// Emission hub: counts by severity and forwards to the consumer.
pub struct DiagnosticEngine {
    consumer: Rc<dyn DiagnosticConsumer>,
    error_count: Cell<usize>,
    warning_count: Cell<usize>,
}

impl DiagnosticEngine {
    pub fn new(consumer: Rc<dyn DiagnosticConsumer>) -> Self {
        DiagnosticEngine {
            consumer,
            error_count: Cell::new(0),
            warning_count: Cell::new(0),
        }
    }

    /// Emit a fully-formed diagnostic.
    pub fn emit(&self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.error_count.set(self.error_count.get() + 1),
            Severity::Warning => self.warning_count.set(self.warning_count.get() + 1),
            _ => {}
        }
        self.consumer.handle(&diagnostic);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.emit(Diagnostic::error(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.emit(Diagnostic::warning(message));
    }

    pub fn note(&self, message: impl Into<String>) {
        self.emit(Diagnostic::note(message));
    }

    pub fn remark(&self, message: impl Into<String>) {
        self.emit(Diagnostic::remark(message));
    }

    pub fn has_errors(&self) -> bool {
        self.error_count.get() > 0
    }

    pub fn error_count(&self) -> usize {
        self.error_count.get()
    }

    pub fn warning_count(&self) -> usize {
        self.warning_count.get()
    }
}

impl std::fmt::Debug for DiagnosticEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DiagnosticEngine")
            .field("error_count", &self.error_count.get())
            .field("warning_count", &self.warning_count.get())
            .finish_non_exhaustive()
    }
}
