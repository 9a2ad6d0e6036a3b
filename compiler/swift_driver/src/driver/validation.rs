//! Cross-option validation.
//!
//! Most of these route diagnostics through the sink and let planning
//! continue; the few that abort return errors.

use std::path::Path;

use rustc_hash::FxHashMap;
use swift_diagnostic::DiagnosticEngine;
use swift_options::{OptId, ParsedOptions};

use crate::driver::mode::CompilerMode;
use crate::error::DriverError;
use crate::sanitizer::Sanitizer;
use crate::toolchain::Toolchain;
use crate::triple::{OsFamily, Triple};

/// `-suppress-warnings` and `-warnings-as-errors` contradict each other.
pub fn validate_warning_options(parsed: &mut ParsedOptions, diagnostics: &DiagnosticEngine) {
    let suppress = parsed.has_argument(&[OptId::SuppressWarnings]);
    let as_errors = parsed.has_argument(&[OptId::WarningsAsErrors]);
    if suppress && as_errors {
        diagnostics.error(
            DriverError::ConflictingOptions {
                first: "-warnings-as-errors".to_string(),
                second: "-suppress-warnings".to_string(),
            }
            .to_string(),
        );
    }
}

/// Profiling: generation and use are exclusive, and used profiles must
/// exist on disk.
pub fn validate_profiling_options(
    parsed: &mut ParsedOptions,
    working_directory: Option<&Path>,
    diagnostics: &DiagnosticEngine,
) {
    let generate = parsed.has_argument(&[OptId::ProfileGenerate]);
    let uses = parsed.arguments(OptId::ProfileUse);
    if generate && !uses.is_empty() {
        diagnostics.error(
            DriverError::ConflictingOptions {
                first: "-profile-generate".to_string(),
                second: "-profile-use=".to_string(),
            }
            .to_string(),
        );
    }
    let base = working_directory
        .map(Path::to_path_buf)
        .or_else(|| std::env::current_dir().ok());
    for profile in uses.iter().flat_map(|opt| opt.argument.values()) {
        let resolved = match &base {
            Some(base) => base.join(profile),
            None => Path::new(profile).to_path_buf(),
        };
        if !resolved.exists() {
            diagnostics.error(DriverError::MissingProfilingData(profile.to_string()).to_string());
        }
    }
}

/// `-D` flags must be bare identifiers.
pub fn validate_conditional_compilation_flags(
    parsed: &mut ParsedOptions,
    diagnostics: &DiagnosticEngine,
) {
    for option in parsed.arguments(OptId::DefineConditional) {
        let Some(value) = option.value() else { continue };
        if value.contains('=') {
            diagnostics.warning(format!(
                "conditional compilation flags do not have values in Swift; they are either present or absent (rather than '{value}')"
            ));
            continue;
        }
        if value.starts_with("-D") {
            diagnostics.error(
                DriverError::ConditionalCompilationFlagHasRedundantPrefix(value.to_string())
                    .to_string(),
            );
            continue;
        }
        if !is_identifier(value) {
            diagnostics.error(
                DriverError::ConditionalCompilationFlagIsNotValidIdentifier(value.to_string())
                    .to_string(),
            );
        }
    }
}

/// Framework search paths should name directories *containing* frameworks.
pub fn validate_framework_search_paths(
    parsed: &mut ParsedOptions,
    diagnostics: &DiagnosticEngine,
) {
    for id in [OptId::FrameworkPath, OptId::SystemFrameworkPath] {
        for option in parsed.arguments(id) {
            let Some(value) = option.value() else { continue };
            let trimmed = value.trim_end_matches('/');
            if trimmed.ends_with(".framework") {
                diagnostics.warning(format!(
                    "framework search path ends in \".framework\"; add directory containing framework instead: {value}"
                ));
            }
        }
    }
}

/// `-debug-prefix-map` / `-coverage-prefix-map` entries are `old=new`.
pub fn validate_prefix_maps(parsed: &mut ParsedOptions, diagnostics: &DiagnosticEngine) {
    for id in [OptId::DebugPrefixMap, OptId::CoveragePrefixMap] {
        for option in parsed.arguments(id) {
            let Some(value) = option.value() else { continue };
            if value.split('=').count() != 2 {
                diagnostics.error(format!(
                    "values passed to '{}' must be in the format 'original=remapped'",
                    id.spelling()
                ));
            }
        }
    }
}

/// Resolve `-sanitize=` into the enabled set, checking platform support and
/// inter-sanitizer compatibility.
pub fn validate_sanitizers(
    parsed: &mut ParsedOptions,
    toolchain: Toolchain,
    triple: &Triple,
    resource_dir: Option<&Path>,
    diagnostics: &DiagnosticEngine,
) -> Vec<Sanitizer> {
    let requested: Vec<String> = parsed
        .arguments(OptId::Sanitize)
        .iter()
        .flat_map(|opt| opt.argument.values())
        .map(str::to_string)
        .collect();
    if requested.is_empty() {
        return Vec::new();
    }

    let os_supported = matches!(
        triple.os_family(),
        OsFamily::Darwin | OsFamily::Linux | OsFamily::Windows
    );

    let mut enabled = Vec::new();
    for name in &requested {
        let Some(sanitizer) = Sanitizer::parse(name) else {
            diagnostics.error(
                DriverError::InvalidArgumentValue {
                    option: "-sanitize=".to_string(),
                    value: name.clone(),
                }
                .to_string(),
            );
            continue;
        };
        if sanitizer == Sanitizer::Thread && !triple.arch_is_64bit() {
            diagnostics.error(format!(
                "thread sanitizer is only supported on 64-bit targets, not '{triple}'"
            ));
            continue;
        }
        if !os_supported
            || !toolchain.runtime_library_exists(sanitizer, triple, resource_dir)
        {
            diagnostics.error(format!(
                "unsupported option '-sanitize={name}' for target '{triple}'"
            ));
            continue;
        }
        if !enabled.contains(&sanitizer) {
            enabled.push(sanitizer);
        }
    }

    if enabled.contains(&Sanitizer::Address) && enabled.contains(&Sanitizer::Thread) {
        diagnostics.error(
            DriverError::ConflictingOptions {
                first: "-sanitize=thread".to_string(),
                second: "-sanitize=address".to_string(),
            }
            .to_string(),
        );
    }
    if enabled.contains(&Sanitizer::Scudo) {
        for other in [Sanitizer::Address, Sanitizer::Thread] {
            if enabled.contains(&other) {
                diagnostics.error(
                    DriverError::ConflictingOptions {
                        first: "-sanitize=scudo".to_string(),
                        second: format!("-sanitize={}", other.name()),
                    }
                    .to_string(),
                );
            }
        }
    }

    enabled
}

/// Coverage modifiers allowed besides the mandatory tracing mode.
const COVERAGE_MODIFIERS: &[&str] = &[
    "indirect-calls",
    "trace-bb",
    "trace-cmp",
    "trace-div",
    "trace-gep",
    "8bit-counters",
    "trace-pc",
    "trace-pc-guard",
    "inline-8bit-counters",
    "pc-table",
    "stack-depth",
];

/// `-sanitize-coverage=` needs a tracing mode, known modifiers, and at
/// least one active sanitizer.
pub fn validate_sanitizer_coverage(
    parsed: &mut ParsedOptions,
    enabled_sanitizers: &[Sanitizer],
    diagnostics: &DiagnosticEngine,
) {
    let values: Vec<String> = parsed
        .arguments(OptId::SanitizeCoverage)
        .iter()
        .flat_map(|opt| opt.argument.values())
        .map(str::to_string)
        .collect();
    if values.is_empty() {
        return;
    }

    let mut has_mode = false;
    for value in &values {
        match value.as_str() {
            "func" | "bb" | "edge" => has_mode = true,
            modifier if COVERAGE_MODIFIERS.contains(&modifier) => {}
            unknown => diagnostics.error(
                DriverError::InvalidArgumentValue {
                    option: "-sanitize-coverage=".to_string(),
                    value: unknown.to_string(),
                }
                .to_string(),
            ),
        }
    }
    if !has_mode {
        diagnostics.error(
            "option '-sanitize-coverage=' is missing a required argument ('func', 'bb', 'edge')",
        );
    }
    if enabled_sanitizers.is_empty() {
        diagnostics.error("option '-sanitize-coverage=' requires a sanitizer to be enabled; add '-sanitize=' to your command line");
    }
}

/// `-j`, clamped by `SWIFTC_MAXIMUM_DETERMINISM`.
pub fn compute_num_parallel_jobs(
    parsed: &mut ParsedOptions,
    env: &FxHashMap<String, String>,
    diagnostics: &DiagnosticEngine,
) -> usize {
    let requested = match parsed.get_last_argument(OptId::Jobs) {
        None => 1,
        Some(value) => match value.parse::<usize>() {
            Ok(n) if n >= 1 => n,
            _ => {
                diagnostics.error(
                    DriverError::InvalidArgumentValue {
                        option: "-j".to_string(),
                        value,
                    }
                    .to_string(),
                );
                1
            }
        },
    };
    if env
        .get("SWIFTC_MAXIMUM_DETERMINISM")
        .is_some_and(|v| !v.is_empty())
        && requested > 1
    {
        diagnostics.remark("SWIFTC_MAXIMUM_DETERMINISM overriding -j");
        return 1;
    }
    requested
}

/// `-num-threads`: non-negative, and meaningless in batch mode.
pub fn compute_num_threads(
    parsed: &mut ParsedOptions,
    mode: CompilerMode,
    diagnostics: &DiagnosticEngine,
) -> usize {
    let Some(value) = parsed.get_last_argument(OptId::NumThreads) else {
        return 0;
    };
    if mode.is_batch_compile() {
        diagnostics.warning("ignoring -num-threads argument; cannot multithread batch mode");
        return 0;
    }
    match value.parse::<usize>() {
        Ok(n) => n,
        Err(_) => {
            diagnostics.error(
                DriverError::InvalidArgumentValue {
                    option: "-num-threads".to_string(),
                    value,
                }
                .to_string(),
            );
            0
        }
    }
}

/// The argument-count threshold above which the planner moves inputs into
/// file lists.
pub fn compute_file_list_threshold(
    parsed: &mut ParsedOptions,
    diagnostics: &DiagnosticEngine,
) -> Result<usize, DriverError> {
    if let Some(value) = parsed.get_last_argument(OptId::DriverFilelistThreshold) {
        return value.parse().map_err(|_| DriverError::InvalidArgumentValue {
            option: "-driver-filelist-threshold".to_string(),
            value,
        });
    }
    if parsed.has_argument(&[OptId::DriverUseFilelists]) {
        diagnostics.warning("the option '-driver-use-filelists' is deprecated; use '-driver-filelist-threshold=0' instead");
        return Ok(0);
    }
    Ok(128)
}

/// Batch mode keeps going after errors regardless of the flag.
pub fn compute_continue_building_after_errors(
    parsed: &mut ParsedOptions,
    mode: CompilerMode,
) -> bool {
    mode.is_batch_compile() || parsed.has_argument(&[OptId::ContinueBuildingAfterErrors])
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
