//! Debug-info option resolution.

use swift_diagnostic::DiagnosticEngine;
use swift_options::{OptGroup, OptId, ParsedOptions};

use crate::error::DriverError;

/// Debug info container format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DebugInfoFormat {
    #[default]
    Dwarf,
    CodeView,
}

/// How much debug information to emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebugInfoLevel {
    /// Types described at the AST level (`-g`).
    AstTypes,
    /// Line tables only (`-gline-tables-only`).
    LineTables,
    /// Types lowered to DWARF (`-gdwarf-types`).
    DwarfTypes,
}

impl DebugInfoLevel {
    /// Levels that describe types need the module to do it.
    pub fn requires_module(self) -> bool {
        matches!(self, DebugInfoLevel::AstTypes | DebugInfoLevel::DwarfTypes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebugInfo {
    pub format: DebugInfoFormat,
    pub level: Option<DebugInfoLevel>,
    pub should_verify: bool,
}

/// Resolve the `-g` family, `-debug-info-format=`, and `-verify-debug-info`.
pub fn compute_debug_info(
    parsed: &mut ParsedOptions,
    diagnostics: &DiagnosticEngine,
) -> Result<DebugInfo, DriverError> {
    let level = match parsed.get_last_in_group(OptGroup::DebugLevel).map(|o| o.option) {
        Some(OptId::DebugInfo) => Some(DebugInfoLevel::AstTypes),
        Some(OptId::DebugLineTablesOnly) => Some(DebugInfoLevel::LineTables),
        Some(OptId::DebugDwarfTypes) => Some(DebugInfoLevel::DwarfTypes),
        Some(OptId::DebugNone) | None => None,
        Some(other) => unreachable!("{other:?} is not in the -g group"),
    };

    let mut should_verify = parsed.has_argument(&[OptId::VerifyDebugInfo]);
    if should_verify && level.is_none() {
        diagnostics
            .warning("ignoring '-verify-debug-info'; no debug info is being generated");
        should_verify = false;
    }

    let format = match parsed.get_last_argument(OptId::DebugInfoFormat) {
        None => DebugInfoFormat::Dwarf,
        Some(value) => {
            if level.is_none() {
                return Err(DriverError::OptionRequiresAnother {
                    option: format!("-debug-info-format={value}"),
                    required: "-g".to_string(),
                });
            }
            match value.as_str() {
                "dwarf" => DebugInfoFormat::Dwarf,
                "codeview" => DebugInfoFormat::CodeView,
                _ => {
                    return Err(DriverError::InvalidArgumentValue {
                        option: "-debug-info-format=".to_string(),
                        value,
                    })
                }
            }
        }
    };

    if format == DebugInfoFormat::CodeView {
        if let Some(level @ (DebugInfoLevel::LineTables | DebugInfoLevel::DwarfTypes)) = level {
            let spelling = match level {
                DebugInfoLevel::LineTables => "-gline-tables-only",
                _ => "-gdwarf-types",
            };
            return Err(DriverError::ConflictingOptions {
                first: "-debug-info-format=codeview".to_string(),
                second: spelling.to_string(),
            });
        }
    }

    Ok(DebugInfo {
        format,
        level,
        should_verify,
    })
}
