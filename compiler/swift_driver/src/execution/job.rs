//! A planned tool invocation.

use std::fmt;

use crate::virtual_path::{TypedVirtualPath, VirtualPath};

/// What a job does, for display and dispatch decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobKind {
    Compile,
    ModuleWrap,
    Link,
    GeneratePch,
    Interpret,
    Repl,
    PrintTargetInfo,
    VersionRequest,
}

impl JobKind {
    /// The label used by `-driver-print-actions`.
    pub fn name(self) -> &'static str {
        match self {
            JobKind::Compile => "compile",
            JobKind::ModuleWrap => "modulewrap",
            JobKind::Link => "link",
            JobKind::GeneratePch => "generate-pch",
            JobKind::Interpret => "interpret",
            JobKind::Repl => "repl",
            JobKind::PrintTargetInfo => "print-target-info",
            JobKind::VersionRequest => "version-request",
        }
    }
}

impl fmt::Display for JobKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// One planned invocation of the frontend, the linker, or a helper tool.
#[derive(Debug, Clone, PartialEq)]
pub struct Job {
    pub kind: JobKind,
    /// The executable to run.
    pub tool: VirtualPath,
    /// Arguments, excluding the tool itself.
    pub command_line: Vec<String>,
    /// Inputs this job reads.
    pub inputs: Vec<TypedVirtualPath>,
    /// The subset of inputs this job is *about* (batch/primary semantics).
    pub primary_inputs: Vec<TypedVirtualPath>,
    /// Outputs this job produces.
    pub outputs: Vec<TypedVirtualPath>,
    /// The job must run in the driver's place (REPL, interpretation).
    pub requires_in_place_execution: bool,
}

impl Job {
    /// The command line as a single shell-safe string.
    pub fn rendered_command_line(&self) -> String {
        let mut parts = vec![shell_quote(&self.tool.path_string())];
        parts.extend(self.command_line.iter().map(|a| shell_quote(a)));
        parts.join(" ")
    }

    /// Basename of the tool, for `-driver-print-bindings`.
    pub fn tool_basename(&self) -> String {
        self.tool
            .basename_without_ext()
            .unwrap_or_else(|| self.tool.path_string())
    }
}

/// Quote an argument for display if it contains shell-significant bytes.
fn shell_quote(arg: &str) -> String {
    let needs_quoting = arg.is_empty()
        || arg
            .chars()
            .any(|c| c.is_whitespace() || matches!(c, '"' | '\'' | '\\' | '$' | '`' | '*' | '?'));
    if !needs_quoting {
        return arg.to_string();
    }
    let mut quoted = String::with_capacity(arg.len() + 2);
    quoted.push('"');
    for c in arg.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            quoted.push('\\');
        }
        quoted.push(c);
    }
    quoted.push('"');
    quoted
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::file_type::FileType;

    use super::*;

    #[test]
    fn rendering_quotes_only_when_needed() {
        let job = Job {
            kind: JobKind::Compile,
            tool: VirtualPath::Absolute(PathBuf::from("/usr/bin/swift-frontend")),
            command_line: vec![
                "-frontend".to_string(),
                "-c".to_string(),
                "my file.swift".to_string(),
            ],
            inputs: vec![],
            primary_inputs: vec![],
            outputs: vec![TypedVirtualPath::new(
                VirtualPath::Relative(PathBuf::from("a.o")),
                FileType::Object,
            )],
            requires_in_place_execution: false,
        };
        assert_eq!(
            job.rendered_command_line(),
            "/usr/bin/swift-frontend -frontend -c \"my file.swift\""
        );
        assert_eq!(job.tool_basename(), "swift-frontend");
    }
}
