//! The driver's error type.
//!
//! Every hard failure in the invocation-to-plan pipeline is one of these
//! variants. Warnings and remarks never appear here; they go through the
//! diagnostic engine and planning continues.

use std::fmt;

use swift_options::OptionParseError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DriverError {
    /// `--driver-mode=` or argv[0] named a driver we do not provide.
    InvalidDriverName(String),
    /// An input file could not be used.
    InvalidInput(String),
    /// A batch invocation arrived with nothing to compile.
    NoInputFiles,
    /// An option was given a value outside its domain.
    InvalidArgumentValue { option: String, value: String },
    /// `-driver-use-frontend-path` must name an absolute path.
    RelativeFrontendPath(String),
    /// The invocation was really a subcommand (`swift build`, `swift -frontend`);
    /// the caller should exec the named tool instead.
    SubcommandPassedToDriver(String),
    /// `-deprecated-integrated-repl` no longer exists.
    IntegratedReplRemoved,
    /// An option that was removed from the tool entirely.
    RemovedOption { option: String, instead: String },
    /// Two options that cannot be combined.
    ConflictingOptions { first: String, second: String },
    /// One option only makes sense in the presence of another.
    OptionRequiresAnother { option: String, required: String },
    UnableToLoadOutputFileMap { path: String, reason: String },
    /// The frontend's `-print-target-info` output did not decode.
    UnableToDecodeFrontendTargetInfo {
        output: String,
        arguments: Vec<String>,
        detail: String,
    },
    FailedToRetrieveFrontendTargetInfo,
    FailedToRunFrontendToRetrieveTargetInfo { code: i32, stderr: String },
    UnableToReadFrontendTargetInfo,
    /// A `-profile-use=` file does not exist.
    MissingProfilingData(String),
    ConditionalCompilationFlagHasRedundantPrefix(String),
    ConditionalCompilationFlagIsNotValidIdentifier(String),
    /// The target triple names a platform without a toolchain.
    UnsupportedTarget(String),
    /// Appending or extension-rewriting on standard input/output.
    InvalidVirtualPathOperation(String),

    // Explicit module builds.
    MalformedModuleDependency { module: String, detail: String },
    MissingPcmArguments(String),
    MissingModuleDependency(String),
    DependencyScanningFailure(String),
    MissingExternalDependency(String),

    OptionParse(OptionParseError),
    Io { path: String, error: String },
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DriverError::InvalidDriverName(name) => {
                write!(f, "invalid driver name: '{name}'")
            }
            DriverError::InvalidInput(path) => write!(f, "invalid input: '{path}'"),
            DriverError::NoInputFiles => write!(f, "no input files"),
            DriverError::InvalidArgumentValue { option, value } => {
                write!(f, "invalid value '{value}' in '{option}'")
            }
            DriverError::RelativeFrontendPath(path) => {
                write!(f, "relative frontend path: '{path}'")
            }
            DriverError::SubcommandPassedToDriver(tool) => {
                write!(f, "subcommand '{tool}' passed to the driver")
            }
            DriverError::IntegratedReplRemoved => {
                write!(f, "the integrated REPL has been removed; use the LLDB-enhanced REPL instead")
            }
            DriverError::RemovedOption { option, instead } => {
                write!(f, "the flag '{option}' is no longer required and has been removed; {instead}")
            }
            DriverError::ConflictingOptions { first, second } => {
                write!(f, "argument '{first}' is not allowed with '{second}'")
            }
            DriverError::OptionRequiresAnother { option, required } => {
                write!(f, "option '{option}' is missing a required argument ({required})")
            }
            DriverError::UnableToLoadOutputFileMap { path, reason } => {
                write!(f, "unable to load output file map '{path}': {reason}")
            }
            DriverError::UnableToDecodeFrontendTargetInfo { output, arguments, detail } => {
                write!(
                    f,
                    "could not decode frontend target info; compiler driver and frontend executables may be incompatible\n\
                     details: frontend: {arguments:?}\n\
                     output\n{output}\n\
                     interpretation error: {detail}"
                )
            }
            DriverError::FailedToRetrieveFrontendTargetInfo => {
                write!(f, "failed to retrieve frontend target info")
            }
            DriverError::FailedToRunFrontendToRetrieveTargetInfo { code, stderr } => {
                write!(
                    f,
                    "unable to execute the command to retrieve frontend target info (exit code {code}): {stderr}"
                )
            }
            DriverError::UnableToReadFrontendTargetInfo => {
                write!(f, "could not read frontend target info")
            }
            DriverError::MissingProfilingData(path) => {
                write!(f, "no profdata file exists at '{path}'")
            }
            DriverError::ConditionalCompilationFlagHasRedundantPrefix(flag) => {
                write!(f, "invalid argument '-D{flag}'; did you provide a redundant '-D' in your build settings?")
            }
            DriverError::ConditionalCompilationFlagIsNotValidIdentifier(flag) => {
                write!(f, "conditional compilation flags must be valid Swift identifiers (rather than '{flag}')")
            }
            DriverError::UnsupportedTarget(triple) => {
                write!(f, "unsupported target '{triple}'")
            }
            DriverError::InvalidVirtualPathOperation(detail) => {
                write!(f, "invalid path operation: {detail}")
            }
            DriverError::MalformedModuleDependency { module, detail } => {
                write!(f, "malformed module dependency '{module}': {detail}")
            }
            DriverError::MissingPcmArguments(module) => {
                write!(f, "missing extra PCM build arguments for module '{module}'")
            }
            DriverError::MissingModuleDependency(module) => {
                write!(f, "missing module dependency '{module}'")
            }
            DriverError::DependencyScanningFailure(detail) => {
                write!(f, "dependency scan failure: {detail}")
            }
            DriverError::MissingExternalDependency(path) => {
                write!(f, "missing external dependency '{path}'")
            }
            DriverError::OptionParse(err) => write!(f, "{err}"),
            DriverError::Io { path, error } => write!(f, "{path}: {error}"),
        }
    }
}

impl std::error::Error for DriverError {}

impl From<OptionParseError> for DriverError {
    fn from(err: OptionParseError) -> Self {
        DriverError::OptionParse(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_payloads() {
        let err = DriverError::InvalidArgumentValue {
            option: "-j".into(),
            value: "0".into(),
        };
        assert_eq!(err.to_string(), "invalid value '0' in '-j'");

        let err = DriverError::ConflictingOptions {
            first: "-static".into(),
            second: "-emit-executable".into(),
        };
        assert!(err.to_string().contains("not allowed with"));
    }
}
