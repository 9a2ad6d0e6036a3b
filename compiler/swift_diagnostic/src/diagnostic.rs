//! Diagnostic values.

use std::fmt;

/// Severity of a diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Severity {
    /// Fatal to the current operation.
    Error,
    /// Something is suspect but planning continues.
    Warning,
    /// Additional information attached to a previous diagnostic.
    Note,
    /// Informational, below warning.
    Remark,
    /// Suppressed entirely.
    Ignored,
}

impl Severity {
    /// The lowercase label used when rendering.
    pub fn label(self) -> &'static str {
        match self {
            Severity::Error => "error",
            Severity::Warning => "warning",
            Severity::Note => "note",
            Severity::Remark => "remark",
            Severity::Ignored => "ignored",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Where a diagnostic points.
///
/// The driver mostly diagnoses command-line conditions, so the common case
/// is [`Location::Unknown`]; file locations appear when a response file or
/// output file map is at fault.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Location {
    /// No usable location.
    Unknown,
    /// A file, with optional 1-based line/column.
    File {
        path: String,
        line: Option<u32>,
        column: Option<u32>,
    },
}

impl Location {
    /// A location naming a file with no position inside it.
    pub fn file(path: impl Into<String>) -> Self {
        Location::File {
            path: path.into(),
            line: None,
            column: None,
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Location::Unknown => Ok(()),
            Location::File { path, line, column } => {
                write!(f, "{path}")?;
                if let Some(line) = line {
                    write!(f, ":{line}")?;
                    if let Some(column) = column {
                        write!(f, ":{column}")?;
                    }
                }
                Ok(())
            }
        }
    }
}

/// A single rendered-to-the-user condition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: Location,
    pub message: String,
}

impl Diagnostic {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Diagnostic {
            severity,
            location: Location::Unknown,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Error, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Warning, message)
    }

    pub fn note(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Note, message)
    }

    pub fn remark(message: impl Into<String>) -> Self {
        Diagnostic::new(Severity::Remark, message)
    }

    /// Attach a location.
    #[must_use]
    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.location != Location::Unknown {
            write!(f, "{}: ", self.location)?;
        }
        write!(f, "{}: {}", self.severity, self.message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_labels() {
        assert_eq!(Severity::Error.label(), "error");
        assert_eq!(Severity::Remark.label(), "remark");
    }

    #[test]
    fn display_without_location() {
        let diag = Diagnostic::warning("unused option '-g'");
        assert_eq!(diag.to_string(), "warning: unused option '-g'");
    }

    #[test]
    fn display_with_location() {
        let diag = Diagnostic::error("bad entry").at(Location::File {
            path: "map.json".into(),
            line: Some(3),
            column: Some(7),
        });
        assert_eq!(diag.to_string(), "map.json:3:7: error: bad entry");
    }

    #[test]
    fn file_location_without_position() {
        let diag = Diagnostic::note("while expanding").at(Location::file("args.resp"));
        assert_eq!(diag.to_string(), "args.resp: note: while expanding");
    }
}
