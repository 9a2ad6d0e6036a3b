//! Compilation-mode resolution.
//!
//! A single deterministic decision tree over the mode flags, whole-module
//! optimization, index-file requests, and batch mode. The interactions are
//! the point: `-dump-ast` beats `-wmo`, `-wmo` beats batch mode, and each
//! override tells the user what it ignored.

use swift_diagnostic::DiagnosticEngine;
use swift_options::{OptId, ParsedOptions};
use tracing::debug;

use crate::driver::invocation::DriverKind;
use crate::error::DriverError;

/// Knobs for batch partitioning, forwarded to the job planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BatchModeInfo {
    pub seed: Option<i64>,
    pub count: Option<usize>,
    pub size_limit: Option<usize>,
}

/// How source files group into frontend invocations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompilerMode {
    /// One frontend job per primary file.
    StandardCompile,
    /// One frontend job for everything.
    SingleCompile,
    /// Primaries grouped into batches.
    BatchCompile(BatchModeInfo),
    /// Compile and run in place.
    Immediate,
    Repl,
    /// Precompile a Clang module.
    CompilePcm,
}

impl CompilerMode {
    pub fn is_single_compilation(self) -> bool {
        matches!(self, CompilerMode::SingleCompile | CompilerMode::CompilePcm)
    }

    pub fn is_batch_compile(self) -> bool {
        matches!(self, CompilerMode::BatchCompile(_))
    }

    /// Whether a bridging header may be precompiled in this mode.
    pub fn supports_bridging_pch(self) -> bool {
        !matches!(self, CompilerMode::Immediate | CompilerMode::Repl)
    }

    pub fn name(self) -> &'static str {
        match self {
            CompilerMode::StandardCompile => "standard compilation",
            CompilerMode::SingleCompile => "whole module optimization",
            CompilerMode::BatchCompile(_) => "batch compilation",
            CompilerMode::Immediate => "immediate compilation",
            CompilerMode::Repl => "repl",
            CompilerMode::CompilePcm => "compile Clang module",
        }
    }
}

/// Resolve the compilation mode. Consumes the options it decides by.
pub fn compute_compile_mode(
    driver_kind: DriverKind,
    parsed: &mut ParsedOptions,
    has_inputs: bool,
    diagnostics: &DiagnosticEngine,
) -> Result<CompilerMode, DriverError> {
    // Explicit mode flags take priority over everything.
    if parsed.has_argument(&[OptId::DeprecatedIntegratedRepl]) {
        return Err(DriverError::IntegratedReplRemoved);
    }
    if parsed.has_argument(&[OptId::EmitImportedModules]) {
        return Ok(CompilerMode::SingleCompile);
    }
    if parsed.has_argument(&[OptId::Repl, OptId::LldbRepl]) {
        return Ok(CompilerMode::Repl);
    }
    if parsed.has_argument(&[OptId::EmitPcm]) {
        return Ok(CompilerMode::CompilePcm);
    }

    if driver_kind == DriverKind::Interactive {
        return Ok(if has_inputs {
            CompilerMode::Immediate
        } else {
            CompilerMode::Repl
        });
    }

    let mut use_wmo = parsed.has_flag(
        OptId::WholeModuleOptimization,
        OptId::NoWholeModuleOptimization,
        false,
    );
    let mut has_index_file = parsed.has_argument(&[OptId::IndexFile]);
    let want_batch = parsed.has_flag(OptId::EnableBatchMode, OptId::DisableBatchMode, false);
    let dump_ast = parsed.has_argument(&[OptId::DumpAst]);

    if dump_ast && use_wmo {
        diagnostics.warning(
            "ignoring '-whole-module-optimization' because '-dump-ast' was also specified",
        );
        parsed.erase(OptId::WholeModuleOptimization);
        use_wmo = false;
    }
    if dump_ast && has_index_file {
        diagnostics.warning("ignoring '-index-file' because '-dump-ast' was also specified");
        parsed.erase(OptId::IndexFile);
        parsed.erase(OptId::IndexFilePath);
        parsed.erase(OptId::IndexStorePath);
        parsed.erase(OptId::IndexIgnoreSystemModules);
        has_index_file = false;
    }
    if dump_ast {
        return Ok(CompilerMode::StandardCompile);
    }

    if use_wmo || has_index_file {
        if want_batch {
            let cause = if use_wmo { "-whole-module-optimization" } else { "-index-file" };
            diagnostics.warning(format!(
                "ignoring '-enable-batch-mode' because '{cause}' was also specified"
            ));
        }
        return Ok(CompilerMode::SingleCompile);
    }

    if want_batch {
        let info = BatchModeInfo {
            seed: parse_int(parsed, OptId::DriverBatchSeed)?,
            count: parse_int(parsed, OptId::DriverBatchCount)?,
            size_limit: parse_int(parsed, OptId::DriverBatchSizeLimit)?,
        };
        debug!(?info, "batch mode enabled");
        return Ok(CompilerMode::BatchCompile(info));
    }

    Ok(CompilerMode::StandardCompile)
}

fn parse_int<T: std::str::FromStr>(
    parsed: &mut ParsedOptions,
    id: OptId,
) -> Result<Option<T>, DriverError> {
    match parsed.get_last_argument(id) {
        None => Ok(None),
        Some(value) => value.parse().map(Some).map_err(|_| {
            DriverError::InvalidArgumentValue {
                option: id.spelling().to_string(),
                value,
            }
        }),
    }
}
