//! Classifying the raw invocation before any option parsing.
//!
//! `swift` is both a compiler driver and a multiplexer: `swift build`
//! really means `swift-build`, and `swift -frontend …` is a request to run
//! the frontend directly. The classifier is pure; it never touches the
//! filesystem.

use std::path::Path;

use crate::error::DriverError;

/// What this process was actually asked to be.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvocationRunMode {
    /// Drive a compilation; `is_repl` when the `repl` word was given.
    Normal { is_repl: bool },
    /// Forward to the named executable.
    Subcommand(String),
}

/// Classify `argv`, returning the run mode and the (possibly rewritten)
/// argument vector. For subcommands, `argv[0..=1]` collapses into the
/// subcommand executable name.
pub fn invocation_run_mode(argv: &[String]) -> (InvocationRunMode, Vec<String>) {
    let Some(arg0) = argv.first() else {
        return (InvocationRunMode::Normal { is_repl: false }, argv.to_vec());
    };
    let basename = executable_basename(arg0);

    // Only the generic names multiplex.
    if basename != "swift" && basename != "swiftc" {
        return (InvocationRunMode::Normal { is_repl: false }, argv.to_vec());
    }

    let Some(first_arg) = argv.get(1) else {
        return (InvocationRunMode::Normal { is_repl: false }, argv.to_vec());
    };

    // Requests to run the frontend tool directly.
    if first_arg == "-frontend" {
        let mut rewritten = vec!["swift-frontend".to_string()];
        rewritten.extend(argv[2..].iter().cloned());
        return (
            InvocationRunMode::Subcommand("swift-frontend".to_string()),
            rewritten,
        );
    }
    if first_arg == "-modulewrap" {
        let mut rewritten = vec!["swift-frontend".to_string()];
        rewritten.extend(argv[1..].iter().cloned());
        return (
            InvocationRunMode::Subcommand("swift-frontend".to_string()),
            rewritten,
        );
    }

    // Options, slash-paths, and dotted file names are a normal compile.
    if first_arg.starts_with('-') || first_arg.starts_with('/') || first_arg.contains('.') {
        return (InvocationRunMode::Normal { is_repl: false }, argv.to_vec());
    }

    // `swift repl` is the driver itself.
    if first_arg == "repl" {
        let mut rewritten = vec![argv[0].clone()];
        rewritten.extend(argv[2..].iter().cloned());
        return (InvocationRunMode::Normal { is_repl: true }, rewritten);
    }

    // Any other bare word under `swift` is a subcommand.
    if basename == "swift" {
        let subcommand = format!("swift-{first_arg}");
        let mut rewritten = vec![subcommand.clone()];
        rewritten.extend(argv[2..].iter().cloned());
        return (InvocationRunMode::Subcommand(subcommand), rewritten);
    }

    (InvocationRunMode::Normal { is_repl: false }, argv.to_vec())
}

/// Which driver personality to use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriverKind {
    /// `swift`: run code, REPL by default.
    Interactive,
    /// `swiftc`: build artifacts.
    Batch,
}

impl DriverKind {
    /// Resolve from a driver name (`--driver-mode=` value or argv[0]
    /// basename).
    pub fn from_name(name: &str) -> Result<DriverKind, DriverError> {
        match name {
            "swift" => Ok(DriverKind::Interactive),
            "swiftc" => Ok(DriverKind::Batch),
            other => Err(DriverError::InvalidDriverName(other.to_string())),
        }
    }
}

fn executable_basename(arg0: &str) -> &str {
    Path::new(arg0)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or(arg0)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn bare_word_becomes_subcommand() {
        let (mode, rewritten) = invocation_run_mode(&argv(&["swift", "package", "build"]));
        assert_eq!(mode, InvocationRunMode::Subcommand("swift-package".into()));
        assert_eq!(rewritten, argv(&["swift-package", "build"]));
    }

    #[test]
    fn frontend_passthrough() {
        let (mode, rewritten) =
            invocation_run_mode(&argv(&["swift", "-frontend", "-c", "a.swift"]));
        assert_eq!(mode, InvocationRunMode::Subcommand("swift-frontend".into()));
        assert_eq!(rewritten, argv(&["swift-frontend", "-c", "a.swift"]));
    }

    #[test]
    fn modulewrap_keeps_its_flag() {
        let (mode, rewritten) =
            invocation_run_mode(&argv(&["swift", "-modulewrap", "a.swiftmodule"]));
        assert_eq!(mode, InvocationRunMode::Subcommand("swift-frontend".into()));
        assert_eq!(rewritten, argv(&["swift-frontend", "-modulewrap", "a.swiftmodule"]));
    }

    #[test]
    fn repl_word_sets_flag_and_drops_word() {
        let (mode, rewritten) = invocation_run_mode(&argv(&["swift", "repl"]));
        assert_eq!(mode, InvocationRunMode::Normal { is_repl: true });
        assert_eq!(rewritten, argv(&["swift"]));
    }

    #[test]
    fn dotted_and_dashed_args_stay_normal() {
        let (mode, _) = invocation_run_mode(&argv(&["swift", "a.swift"]));
        assert_eq!(mode, InvocationRunMode::Normal { is_repl: false });

        let (mode, _) = invocation_run_mode(&argv(&["swift", "-g", "x"]));
        assert_eq!(mode, InvocationRunMode::Normal { is_repl: false });

        let (mode, _) = invocation_run_mode(&argv(&["swift", "/tmp/x"]));
        assert_eq!(mode, InvocationRunMode::Normal { is_repl: false });
    }

    #[test]
    fn swiftc_never_multiplexes_bare_words() {
        let (mode, _) = invocation_run_mode(&argv(&["swiftc", "build"]));
        assert_eq!(mode, InvocationRunMode::Normal { is_repl: false });
    }

    #[test]
    fn specific_names_are_untouched() {
        let (mode, _) = invocation_run_mode(&argv(&["swift-help", "package"]));
        assert_eq!(mode, InvocationRunMode::Normal { is_repl: false });
    }

    #[test]
    fn driver_kind_resolution() {
        assert_eq!(DriverKind::from_name("swift").unwrap(), DriverKind::Interactive);
        assert_eq!(DriverKind::from_name("swiftc").unwrap(), DriverKind::Batch);
        assert!(matches!(
            DriverKind::from_name("swift-bogus"),
            Err(DriverError::InvalidDriverName(_))
        ));
    }
}
