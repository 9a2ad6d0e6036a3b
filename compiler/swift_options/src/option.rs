//! Option identities and the static option table.

use std::sync::OnceLock;

use rustc_hash::FxHashMap;

/// How an option consumes its argument, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptKind {
    /// Bare flag, no argument.
    Flag,
    /// Argument glued after a spelling that ends in `=` (`-sanitize=address`).
    Joined,
    /// Argument is the following element of argv (`-module-name Foo`).
    Separate,
    /// Either glued (`-j4`) or following (`-j 4`). A single leading `=` in
    /// the glued form is stripped (`-working-directory=/x`).
    JoinedOrSeparate,
    /// Like `Joined` but the argument is a comma-separated list
    /// (`-sanitize=address,undefined` parses to two values).
    CommaJoined,
}

/// Option groups for `get_last_in_group` queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OptGroup {
    /// Mutually-exclusive compilation mode selectors (`-c`, `-emit-sil`, …).
    Modes,
    /// The `-g` family.
    DebugLevel,
}

/// Every option the driver understands. Closed set; positional arguments
/// parse as [`OptId::Input`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OptId {
    Input,

    // Mode selectors.
    EmitExecutable,
    EmitLibrary,
    EmitObject,
    EmitAssembly,
    EmitSil,
    EmitSilgen,
    EmitSib,
    EmitSibgen,
    EmitIr,
    EmitBc,
    DumpAst,
    DumpParse,
    PrintAst,
    Parse,
    Typecheck,
    EmitPcm,
    EmitImportedModules,
    IndexFile,
    UpdateCode,
    Repl,
    LldbRepl,
    DeprecatedIntegratedRepl,
    Interpret,
    ObsoleteI,
    ScanDependencies,
    ScanClangDependencies,

    // Module and supplementary emission.
    EmitModule,
    EmitModulePath,
    EmitObjcHeader,
    EmitObjcHeaderPath,
    EmitModuleInterface,
    EmitModuleInterfacePath,
    EmitPrivateModuleInterfacePath,
    EmitModuleDoc,
    EmitModuleDocPath,
    EmitModuleSourceInfo,
    EmitModuleSourceInfoPath,
    AvoidEmitModuleSourceInfo,
    EmitDependencies,
    EmitDependenciesPath,
    EmitLoadedModuleTrace,
    EmitLoadedModuleTracePath,
    EmitTbd,
    EmitTbdPath,
    SerializeDiagnostics,
    SerializeDiagnosticsPath,

    // Paths and identity.
    DriverMode,
    WorkingDirectory,
    Target,
    TargetVariant,
    Sdk,
    ResourceDir,
    ToolsDirectory,
    DriverUseFrontendPath,
    OutputFileMap,
    Output,
    ModuleName,
    ImportObjcHeader,
    PchOutputDir,
    IndexFilePath,
    IndexStorePath,
    IndexIgnoreSystemModules,
    RuntimeCompatibilityVersion,
    Static,
    StaticStdlib,
    ParseAsLibrary,
    ParseStdlib,

    // Compilation shape.
    WholeModuleOptimization,
    NoWholeModuleOptimization,
    EnableBatchMode,
    DisableBatchMode,
    DriverBatchSeed,
    DriverBatchCount,
    DriverBatchSizeLimit,
    Jobs,
    NumThreads,
    EnableBridgingPch,
    DisableBridgingPch,
    Incremental,

    // Instrumentation and hardening.
    Sanitize,
    SanitizeCoverage,
    ProfileGenerate,
    ProfileUse,
    CoveragePrefixMap,
    DebugPrefixMap,

    // Conditional compilation and search paths.
    DefineConditional,
    FrameworkPath,
    SystemFrameworkPath,

    // Debug info.
    DebugInfo,
    DebugLineTablesOnly,
    DebugDwarfTypes,
    DebugNone,
    DebugInfoFormat,
    VerifyDebugInfo,

    // Optimization artifacts.
    Lto,
    SaveOptimizationRecord,
    SaveOptimizationRecordEq,
    SaveOptimizationRecordPath,
    EmbedBitcode,
    EmbedBitcodeMarker,

    // Warnings and continuation.
    SuppressWarnings,
    WarningsAsErrors,
    ContinueBuildingAfterErrors,

    // Output and run policy.
    ParseableOutput,
    Verbose,
    Version,

    // Driver introspection.
    DriverPrintJobs,
    DriverPrintOutputFileMap,
    DriverPrintBindings,
    DriverPrintActions,
    DriverPrintGraphviz,
    DriverShowJobLifecycle,
    DriverWarnUnusedOptions,
    DriverForceResponseFiles,
    DriverUseFilelists,
    DriverFilelistThreshold,
}

/// One row of the option table.
#[derive(Debug, Clone, Copy)]
pub struct OptInfo {
    pub id: OptId,
    pub spelling: &'static str,
    pub kind: OptKind,
    pub group: Option<OptGroup>,
    /// Canonical option this spelling is an alias of (`-c` → `-emit-object`).
    pub alias_of: Option<OptId>,
    /// The argument is a filesystem path; rebased under `-working-directory`.
    pub takes_path: bool,
}

const fn flag(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Flag, group: None, alias_of: None, takes_path: false }
}

const fn mode_flag(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Flag, group: Some(OptGroup::Modes), alias_of: None, takes_path: false }
}

const fn mode_alias(id: OptId, spelling: &'static str, of: OptId) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Flag, group: Some(OptGroup::Modes), alias_of: Some(of), takes_path: false }
}

const fn g_flag(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Flag, group: Some(OptGroup::DebugLevel), alias_of: None, takes_path: false }
}

const fn separate(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Separate, group: None, alias_of: None, takes_path: false }
}

const fn separate_path(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Separate, group: None, alias_of: None, takes_path: true }
}

const fn joined(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Joined, group: None, alias_of: None, takes_path: false }
}

const fn joined_or_separate(id: OptId, spelling: &'static str, takes_path: bool) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::JoinedOrSeparate, group: None, alias_of: None, takes_path }
}

const fn comma_joined(id: OptId, spelling: &'static str) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::CommaJoined, group: None, alias_of: None, takes_path: false }
}

const fn alias(id: OptId, spelling: &'static str, of: OptId) -> OptInfo {
    OptInfo { id, spelling, kind: OptKind::Flag, group: None, alias_of: Some(of), takes_path: false }
}

/// The full option table. Order is irrelevant; lookup sorts by spelling
/// length so the longest match always wins.
pub static OPTION_TABLE: &[OptInfo] = &[
    // Mode selectors.
    mode_flag(OptId::EmitExecutable, "-emit-executable"),
    mode_flag(OptId::EmitLibrary, "-emit-library"),
    mode_flag(OptId::EmitObject, "-emit-object"),
    mode_alias(OptId::EmitObject, "-c", OptId::EmitObject),
    mode_flag(OptId::EmitAssembly, "-emit-assembly"),
    mode_alias(OptId::EmitAssembly, "-S", OptId::EmitAssembly),
    mode_flag(OptId::EmitSil, "-emit-sil"),
    mode_flag(OptId::EmitSilgen, "-emit-silgen"),
    mode_flag(OptId::EmitSib, "-emit-sib"),
    mode_flag(OptId::EmitSibgen, "-emit-sibgen"),
    mode_flag(OptId::EmitIr, "-emit-ir"),
    mode_flag(OptId::EmitBc, "-emit-bc"),
    mode_flag(OptId::DumpAst, "-dump-ast"),
    mode_flag(OptId::DumpParse, "-dump-parse"),
    mode_flag(OptId::PrintAst, "-print-ast"),
    mode_flag(OptId::Parse, "-parse"),
    mode_flag(OptId::Typecheck, "-typecheck"),
    mode_flag(OptId::EmitPcm, "-emit-pcm"),
    mode_flag(OptId::EmitImportedModules, "-emit-imported-modules"),
    mode_flag(OptId::IndexFile, "-index-file"),
    mode_flag(OptId::UpdateCode, "-update-code"),
    mode_flag(OptId::Repl, "-repl"),
    mode_flag(OptId::LldbRepl, "-lldb-repl"),
    mode_flag(OptId::DeprecatedIntegratedRepl, "-deprecated-integrated-repl"),
    mode_flag(OptId::Interpret, "-interpret"),
    mode_flag(OptId::ObsoleteI, "-i"),
    mode_flag(OptId::ScanDependencies, "-scan-dependencies"),
    mode_flag(OptId::ScanClangDependencies, "-scan-clang-dependencies"),

    // Module and supplementary emission.
    flag(OptId::EmitModule, "-emit-module"),
    joined_or_separate(OptId::EmitModulePath, "-emit-module-path", true),
    flag(OptId::EmitObjcHeader, "-emit-objc-header"),
    separate_path(OptId::EmitObjcHeaderPath, "-emit-objc-header-path"),
    flag(OptId::EmitModuleInterface, "-emit-module-interface"),
    separate_path(OptId::EmitModuleInterfacePath, "-emit-module-interface-path"),
    separate_path(OptId::EmitPrivateModuleInterfacePath, "-emit-private-module-interface-path"),
    flag(OptId::EmitModuleDoc, "-emit-module-doc"),
    separate_path(OptId::EmitModuleDocPath, "-emit-module-doc-path"),
    flag(OptId::EmitModuleSourceInfo, "-emit-module-source-info"),
    separate_path(OptId::EmitModuleSourceInfoPath, "-emit-module-source-info-path"),
    flag(OptId::AvoidEmitModuleSourceInfo, "-avoid-emit-module-source-info"),
    flag(OptId::EmitDependencies, "-emit-dependencies"),
    separate_path(OptId::EmitDependenciesPath, "-emit-dependencies-path"),
    flag(OptId::EmitLoadedModuleTrace, "-emit-loaded-module-trace"),
    separate_path(OptId::EmitLoadedModuleTracePath, "-emit-loaded-module-trace-path"),
    flag(OptId::EmitTbd, "-emit-tbd"),
    separate_path(OptId::EmitTbdPath, "-emit-tbd-path"),
    flag(OptId::SerializeDiagnostics, "-serialize-diagnostics"),
    separate_path(OptId::SerializeDiagnosticsPath, "-serialize-diagnostics-path"),

    // Paths and identity.
    joined(OptId::DriverMode, "--driver-mode="),
    separate_path(OptId::WorkingDirectory, "-working-directory"),
    joined(OptId::WorkingDirectory, "-working-directory="),
    separate(OptId::Target, "-target"),
    separate(OptId::TargetVariant, "-target-variant"),
    separate_path(OptId::Sdk, "-sdk"),
    separate_path(OptId::ResourceDir, "-resource-dir"),
    separate_path(OptId::ToolsDirectory, "-tools-directory"),
    separate(OptId::DriverUseFrontendPath, "-driver-use-frontend-path"),
    separate_path(OptId::OutputFileMap, "-output-file-map"),
    joined_or_separate(OptId::Output, "-o", true),
    separate(OptId::ModuleName, "-module-name"),
    separate_path(OptId::ImportObjcHeader, "-import-objc-header"),
    separate_path(OptId::PchOutputDir, "-pch-output-dir"),
    separate_path(OptId::IndexFilePath, "-index-file-path"),
    separate_path(OptId::IndexStorePath, "-index-store-path"),
    flag(OptId::IndexIgnoreSystemModules, "-index-ignore-system-modules"),
    separate(OptId::RuntimeCompatibilityVersion, "-runtime-compatibility-version"),
    flag(OptId::Static, "-static"),
    flag(OptId::StaticStdlib, "-static-stdlib"),
    flag(OptId::ParseAsLibrary, "-parse-as-library"),
    flag(OptId::ParseStdlib, "-parse-stdlib"),

    // Compilation shape.
    flag(OptId::WholeModuleOptimization, "-whole-module-optimization"),
    alias(OptId::WholeModuleOptimization, "-wmo", OptId::WholeModuleOptimization),
    flag(OptId::NoWholeModuleOptimization, "-no-whole-module-optimization"),
    flag(OptId::EnableBatchMode, "-enable-batch-mode"),
    flag(OptId::DisableBatchMode, "-disable-batch-mode"),
    separate(OptId::DriverBatchSeed, "-driver-batch-seed"),
    separate(OptId::DriverBatchCount, "-driver-batch-count"),
    separate(OptId::DriverBatchSizeLimit, "-driver-batch-size-limit"),
    joined_or_separate(OptId::Jobs, "-j", false),
    separate(OptId::NumThreads, "-num-threads"),
    flag(OptId::EnableBridgingPch, "-enable-bridging-pch"),
    flag(OptId::DisableBridgingPch, "-disable-bridging-pch"),
    flag(OptId::Incremental, "-incremental"),

    // Instrumentation and hardening.
    comma_joined(OptId::Sanitize, "-sanitize="),
    comma_joined(OptId::SanitizeCoverage, "-sanitize-coverage="),
    flag(OptId::ProfileGenerate, "-profile-generate"),
    comma_joined(OptId::ProfileUse, "-profile-use="),
    separate(OptId::CoveragePrefixMap, "-coverage-prefix-map"),
    separate(OptId::DebugPrefixMap, "-debug-prefix-map"),

    // Conditional compilation and search paths.
    joined_or_separate(OptId::DefineConditional, "-D", false),
    joined_or_separate(OptId::FrameworkPath, "-F", true),
    joined_or_separate(OptId::SystemFrameworkPath, "-Fsystem", true),

    // Debug info.
    g_flag(OptId::DebugInfo, "-g"),
    g_flag(OptId::DebugLineTablesOnly, "-gline-tables-only"),
    g_flag(OptId::DebugDwarfTypes, "-gdwarf-types"),
    g_flag(OptId::DebugNone, "-gnone"),
    joined(OptId::DebugInfoFormat, "-debug-info-format="),
    flag(OptId::VerifyDebugInfo, "-verify-debug-info"),

    // Optimization artifacts.
    joined(OptId::Lto, "-lto="),
    flag(OptId::SaveOptimizationRecord, "-save-optimization-record"),
    joined(OptId::SaveOptimizationRecordEq, "-save-optimization-record="),
    separate_path(OptId::SaveOptimizationRecordPath, "-save-optimization-record-path"),
    flag(OptId::EmbedBitcode, "-embed-bitcode"),
    flag(OptId::EmbedBitcodeMarker, "-embed-bitcode-marker"),

    // Warnings and continuation.
    flag(OptId::SuppressWarnings, "-suppress-warnings"),
    flag(OptId::WarningsAsErrors, "-warnings-as-errors"),
    flag(OptId::ContinueBuildingAfterErrors, "-continue-building-after-errors"),

    // Output and run policy.
    flag(OptId::ParseableOutput, "-parseable-output"),
    flag(OptId::Verbose, "-v"),
    flag(OptId::Version, "-version"),
    alias(OptId::Version, "--version", OptId::Version),

    // Driver introspection.
    flag(OptId::DriverPrintJobs, "-driver-print-jobs"),
    alias(OptId::DriverPrintJobs, "-###", OptId::DriverPrintJobs),
    flag(OptId::DriverPrintOutputFileMap, "-driver-print-output-file-map"),
    flag(OptId::DriverPrintBindings, "-driver-print-bindings"),
    flag(OptId::DriverPrintActions, "-driver-print-actions"),
    flag(OptId::DriverPrintGraphviz, "-driver-print-graphviz"),
    flag(OptId::DriverShowJobLifecycle, "-driver-show-job-lifecycle"),
    flag(OptId::DriverWarnUnusedOptions, "-driver-warn-unused-options"),
    flag(OptId::DriverForceResponseFiles, "-driver-force-response-files"),
    flag(OptId::DriverUseFilelists, "-driver-use-filelists"),
    separate(OptId::DriverFilelistThreshold, "-driver-filelist-threshold"),
    joined(OptId::DriverFilelistThreshold, "-driver-filelist-threshold="),
];

/// Table row for an option id (the canonical spelling, not an alias row).
pub fn option_info(id: OptId) -> &'static OptInfo {
    static INDEX: OnceLock<FxHashMap<OptId, &'static OptInfo>> = OnceLock::new();
    let index = INDEX.get_or_init(|| {
        let mut map = FxHashMap::default();
        for info in OPTION_TABLE {
            if info.alias_of.is_none() {
                map.entry(info.id).or_insert(info);
            }
        }
        map
    });
    index.get(&id).expect("every OptId has a table row")
}

/// Table rows ordered longest-spelling-first, for parsing.
pub(crate) fn rows_longest_first() -> &'static [&'static OptInfo] {
    static SORTED: OnceLock<Vec<&'static OptInfo>> = OnceLock::new();
    SORTED.get_or_init(|| {
        let mut rows: Vec<&'static OptInfo> = OPTION_TABLE.iter().collect();
        rows.sort_by(|a, b| b.spelling.len().cmp(&a.spelling.len()));
        rows
    })
}

impl OptId {
    /// The canonical spelling, for diagnostics.
    pub fn spelling(self) -> &'static str {
        if self == OptId::Input {
            return "<input>";
        }
        option_info(self).spelling
    }

    /// The group this option belongs to, if any.
    pub fn group(self) -> Option<OptGroup> {
        if self == OptId::Input {
            return None;
        }
        option_info(self).group
    }

    /// Whether the option's argument is a filesystem path.
    pub fn takes_path(self) -> bool {
        if self == OptId::Input {
            return false;
        }
        option_info(self).takes_path
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonical_spellings() {
        assert_eq!(OptId::EmitModulePath.spelling(), "-emit-module-path");
        assert_eq!(OptId::Sanitize.spelling(), "-sanitize=");
        assert_eq!(OptId::Jobs.spelling(), "-j");
    }

    #[test]
    fn alias_rows_do_not_shadow_canonical() {
        // `-c` aliases `-emit-object`; the canonical row must win the index.
        assert_eq!(OptId::EmitObject.spelling(), "-emit-object");
        assert_eq!(OptId::Version.spelling(), "-version");
    }

    #[test]
    fn longest_first_ordering() {
        let rows = rows_longest_first();
        // `-Fsystem` must come before `-F`, and every long emit path before
        // its flag prefix.
        let pos = |s: &str| rows.iter().position(|r| r.spelling == s).unwrap();
        assert!(pos("-Fsystem") < pos("-F"));
        assert!(pos("-emit-module-path") < pos("-emit-module"));
        assert!(pos("-working-directory=") < pos("-working-directory"));
    }

    #[test]
    fn groups() {
        assert_eq!(OptId::DumpAst.group(), Some(OptGroup::Modes));
        assert_eq!(OptId::DebugDwarfTypes.group(), Some(OptGroup::DebugLevel));
        assert_eq!(OptId::Target.group(), None);
    }
}
