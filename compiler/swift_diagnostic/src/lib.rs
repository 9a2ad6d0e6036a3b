//! Diagnostics for the driver.
//!
//! A diagnostic is a severity, an optional source location, and a human
//! message. The driver routes every user-facing condition through a
//! [`DiagnosticEngine`], which forwards to a pluggable [`DiagnosticConsumer`].
//! Planning code emits warnings and remarks and keeps going; hard errors are
//! returned as `Err` values by the constructor instead of being emitted here.

mod diagnostic;
mod engine;

pub use diagnostic::{Diagnostic, Location, Severity};
pub use engine::{DiagnosticConsumer, DiagnosticEngine, StderrDiagnosticConsumer, StoredDiagnosticConsumer};
