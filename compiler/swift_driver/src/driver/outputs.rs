//! Primary and supplementary output planning.
//!
//! The primary outputs (what the compiler emits per input, and what the
//! linker produces from those) come from the mode option group. Every
//! side-band artifact then follows one shared placement rule, specialized
//! for the module-adjacent outputs that prefer to sit next to the module.

use std::path::Path;

use rustc_hash::FxHashMap;
use swift_diagnostic::DiagnosticEngine;
use swift_options::{OptGroup, OptId, ParsedOptions};
use tracing::debug;

use crate::driver::invocation::DriverKind;
use crate::driver::mode::CompilerMode;
use crate::error::DriverError;
use crate::file_type::FileType;
use crate::output_file_map::OutputFileMap;
use crate::virtual_path::VirtualPath;

/// What the link step produces, when there is one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutputType {
    Executable,
    DynamicLibrary,
    StaticLibrary,
}

/// Link-time optimization, which turns the object-like type into bitcode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LtoKind {
    LlvmThin,
    LlvmFull,
}

impl LtoKind {
    pub fn parse(value: &str) -> Option<LtoKind> {
        match value {
            "llvm-thin" => Some(LtoKind::LlvmThin),
            "llvm-full" => Some(LtoKind::LlvmFull),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrimaryOutputs {
    pub compiler_output_type: Option<FileType>,
    pub linker_output_type: Option<LinkOutputType>,
    pub lto: Option<LtoKind>,
}

/// Resolve the mode option group into the primary output pair.
pub fn compute_primary_outputs(
    parsed: &mut ParsedOptions,
    driver_kind: DriverKind,
    diagnostics: &DiagnosticEngine,
) -> Result<PrimaryOutputs, DriverError> {
    let lto = match parsed.get_last_argument(OptId::Lto) {
        None => None,
        Some(value) => Some(LtoKind::parse(&value).ok_or_else(|| {
            DriverError::InvalidArgumentValue {
                option: "-lto=".to_string(),
                value,
            }
        })?),
    };
    let object_like = if lto.is_some() {
        FileType::LlvmBitcode
    } else {
        FileType::Object
    };
    let is_static = parsed.has_argument(&[OptId::Static]);

    let mode_option = parsed.get_last_in_group(OptGroup::Modes).map(|o| o.option);
    let (compiler_output_type, linker_output_type) = match mode_option {
        Some(OptId::EmitExecutable) => {
            if is_static {
                return Err(DriverError::ConflictingOptions {
                    first: "-static".to_string(),
                    second: "-emit-executable".to_string(),
                });
            }
            (Some(object_like), Some(LinkOutputType::Executable))
        }
        Some(OptId::EmitLibrary) => {
            let link = if is_static {
                LinkOutputType::StaticLibrary
            } else {
                LinkOutputType::DynamicLibrary
            };
            (Some(object_like), Some(link))
        }
        Some(OptId::EmitObject) => (Some(FileType::Object), None),
        Some(OptId::EmitAssembly) => (Some(FileType::Assembly), None),
        Some(OptId::EmitSil) => (Some(FileType::Sil), None),
        Some(OptId::EmitSilgen) => (Some(FileType::RawSil), None),
        Some(OptId::EmitSib) => (Some(FileType::Sib), None),
        Some(OptId::EmitSibgen) => (Some(FileType::RawSib), None),
        Some(OptId::EmitIr) => (Some(FileType::LlvmIr), None),
        Some(OptId::EmitBc) => (Some(FileType::LlvmBitcode), None),
        Some(OptId::DumpAst) => (Some(FileType::Ast), None),
        Some(OptId::EmitPcm) => (Some(FileType::Pcm), None),
        Some(OptId::EmitImportedModules) => (Some(FileType::ImportedModules), None),
        Some(OptId::IndexFile) => (Some(FileType::IndexData), None),
        Some(OptId::UpdateCode) => (Some(FileType::Remap), None),
        Some(OptId::ScanDependencies) => (Some(FileType::JsonDependencies), None),
        Some(OptId::ScanClangDependencies) => (Some(FileType::JsonClangDependencies), None),
        Some(
            OptId::Parse
            | OptId::Typecheck
            | OptId::DumpParse
            | OptId::PrintAst
            | OptId::Repl
            | OptId::LldbRepl
            | OptId::DeprecatedIntegratedRepl
            | OptId::Interpret,
        ) => (None, None),
        Some(OptId::ObsoleteI) => {
            return Err(DriverError::RemovedOption {
                option: "-i".to_string(),
                instead: "use 'swift input-filename' to interpret a source file".to_string(),
            })
        }
        Some(other) => unreachable!("{other:?} is not a mode option"),
        None => {
            if parsed.has_argument(&[OptId::EmitModule, OptId::EmitModulePath]) {
                (Some(FileType::SwiftModule), None)
            } else if driver_kind == DriverKind::Interactive {
                (None, None)
            } else {
                (Some(object_like), Some(LinkOutputType::Executable))
            }
        }
    };

    if parsed.has_argument(&[OptId::EmbedBitcode, OptId::EmbedBitcodeMarker])
        && !matches!(
            compiler_output_type,
            Some(FileType::Object | FileType::LlvmBitcode)
        )
    {
        diagnostics.warning(
            "ignoring '-embed-bitcode' since no object file is being generated",
        );
        parsed.erase(OptId::EmbedBitcode);
        parsed.erase(OptId::EmbedBitcodeMarker);
    }

    debug!(?compiler_output_type, ?linker_output_type, "primary outputs");
    Ok(PrimaryOutputs {
        compiler_output_type,
        linker_output_type,
        lto,
    })
}

/// Every side-band artifact path the driver plans.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SupplementaryOutputPaths {
    pub dependencies_file: Option<VirtualPath>,
    pub serialized_diagnostics_file: Option<VirtualPath>,
    pub objc_generated_header: Option<VirtualPath>,
    pub module_interface_path: Option<VirtualPath>,
    pub private_module_interface_path: Option<VirtualPath>,
    pub module_doc_path: Option<VirtualPath>,
    pub module_source_info_path: Option<VirtualPath>,
    pub loaded_module_trace_path: Option<VirtualPath>,
    pub tbd_path: Option<VirtualPath>,
    pub optimization_record_path: Option<VirtualPath>,
    pub bridging_precompiled_header: Option<VirtualPath>,
}

/// Shared context for supplementary path decisions.
pub struct OutputContext<'a> {
    pub mode: CompilerMode,
    pub output_file_map: Option<&'a OutputFileMap>,
    /// The rebased `-o` path, if any.
    pub output: Option<&'a VirtualPath>,
    pub module_name: &'a str,
    /// The planned module output path, if a module is being emitted.
    pub module_output_path: Option<&'a VirtualPath>,
    pub compiler_output_type: Option<FileType>,
    pub working_directory: Option<&'a Path>,
    pub env: &'a FxHashMap<String, String>,
}

impl OutputContext<'_> {
    /// Rebase a freshly synthesized relative path under the working
    /// directory, when one is in effect.
    fn rebased(&self, path: VirtualPath) -> VirtualPath {
        match self.working_directory {
            Some(dir) => path.resolved_relative_to(dir),
            None => path,
        }
    }

    /// The general placement rule, steps 3–5: single-input map entry, then
    /// beside `-o`, then the module name in the current directory.
    fn default_path(&self, ty: FileType) -> Result<VirtualPath, DriverError> {
        if self.mode.is_single_compilation() {
            if let Some(path) = self
                .output_file_map
                .and_then(|map| map.existing_output_for_single_input(ty))
            {
                return Ok(path.clone());
            }
        }
        if let Some(output) = self.output {
            if self.compiler_output_type == Some(ty) {
                return Ok(output.clone());
            }
            let file_name = synthesized_name(self.module_name, ty);
            return match output.parent_directory() {
                Some(parent) => parent.appending(&file_name),
                None => Ok(self.rebased(VirtualPath::from_string(&file_name))),
            };
        }
        Ok(self.rebased(VirtualPath::from_string(&synthesized_name(
            self.module_name,
            ty,
        ))))
    }
}

/// `<module name>.<extension of ty>`.
fn synthesized_name(module_name: &str, ty: FileType) -> String {
    let ext = ty.extension();
    if ext.is_empty() {
        module_name.to_string()
    } else {
        format!("{module_name}.{ext}")
    }
}

/// The general rule for one output kind: explicit path wins and consumes
/// the request flags; otherwise the flags decide whether the output exists
/// at all.
fn supplementary_path(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
    ty: FileType,
    path_flag: OptId,
    is_output_flags: &[OptId],
) -> Result<Option<VirtualPath>, DriverError> {
    if let Some(path) = parsed.get_last_argument(path_flag) {
        parsed.has_argument(is_output_flags);
        return Ok(Some(VirtualPath::from_string(&path)));
    }
    if !parsed.has_argument(is_output_flags) {
        return Ok(None);
    }
    ctx.default_path(ty).map(Some)
}

/// Placement for module-adjacent outputs (docs, source-info, interfaces):
/// prefer swapping the module path's extension.
fn module_adjacent_path(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
    ty: FileType,
    path_flag: OptId,
    is_output_flags: &[OptId],
    implied_by_module: bool,
) -> Result<Option<VirtualPath>, DriverError> {
    if let Some(path) = parsed.get_last_argument(path_flag) {
        parsed.has_argument(is_output_flags);
        return Ok(Some(VirtualPath::from_string(&path)));
    }
    let requested = parsed.has_argument(is_output_flags);
    if !requested && !(implied_by_module && ctx.module_output_path.is_some()) {
        return Ok(None);
    }
    if let Some(module_path) = ctx.module_output_path {
        return module_path.replacing_extension(ty).map(Some);
    }
    ctx.default_path(ty).map(Some)
}

/// Compute the full supplementary output set.
pub fn compute_supplementary_outputs(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
) -> Result<SupplementaryOutputPaths, DriverError> {
    let dependencies_file = supplementary_path(
        parsed,
        ctx,
        FileType::Dependencies,
        OptId::EmitDependenciesPath,
        &[OptId::EmitDependencies],
    )?;
    let serialized_diagnostics_file = supplementary_path(
        parsed,
        ctx,
        FileType::Diagnostics,
        OptId::SerializeDiagnosticsPath,
        &[OptId::SerializeDiagnostics],
    )?;
    let objc_generated_header = supplementary_path(
        parsed,
        ctx,
        FileType::ObjcHeader,
        OptId::EmitObjcHeaderPath,
        &[OptId::EmitObjcHeader],
    )?;
    let tbd_path = supplementary_path(
        parsed,
        ctx,
        FileType::Tbd,
        OptId::EmitTbdPath,
        &[OptId::EmitTbd],
    )?;

    let module_interface_path = module_adjacent_path(
        parsed,
        ctx,
        FileType::SwiftInterface,
        OptId::EmitModuleInterfacePath,
        &[OptId::EmitModuleInterface],
        false,
    )?;
    let private_module_interface_path = module_adjacent_path(
        parsed,
        ctx,
        FileType::PrivateSwiftInterface,
        OptId::EmitPrivateModuleInterfacePath,
        &[],
        false,
    )?;
    let module_doc_path = module_adjacent_path(
        parsed,
        ctx,
        FileType::SwiftDocumentation,
        OptId::EmitModuleDocPath,
        &[OptId::EmitModuleDoc],
        true,
    )?;
    let module_source_info_path = compute_source_info_path(parsed, ctx)?;
    let loaded_module_trace_path = compute_module_trace_path(parsed, ctx)?;
    let optimization_record_path = compute_optimization_record_path(parsed, ctx)?;

    Ok(SupplementaryOutputPaths {
        dependencies_file,
        serialized_diagnostics_file,
        objc_generated_header,
        module_interface_path,
        private_module_interface_path,
        module_doc_path,
        module_source_info_path,
        loaded_module_trace_path,
        tbd_path,
        optimization_record_path,
        bridging_precompiled_header: None,
    })
}

/// Source info sits next to the module, or inside an existing `Project/`
/// directory beside it. `-avoid-emit-module-source-info` turns it off
/// entirely.
fn compute_source_info_path(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
) -> Result<Option<VirtualPath>, DriverError> {
    if parsed.has_argument(&[OptId::AvoidEmitModuleSourceInfo]) {
        // Consume the request flags so they do not show up as unused.
        let _ = parsed.get_last_argument(OptId::EmitModuleSourceInfoPath);
        parsed.has_argument(&[OptId::EmitModuleSourceInfo]);
        return Ok(None);
    }
    if let Some(path) = parsed.get_last_argument(OptId::EmitModuleSourceInfoPath) {
        parsed.has_argument(&[OptId::EmitModuleSourceInfo]);
        return Ok(Some(VirtualPath::from_string(&path)));
    }
    let requested = parsed.has_argument(&[OptId::EmitModuleSourceInfo]);
    if !requested && ctx.module_output_path.is_none() {
        return Ok(None);
    }
    if let Some(module_path) = ctx.module_output_path {
        if let Some(parent) = module_path.parent_directory() {
            let project = parent.appending("Project")?;
            if Path::new(&project.path_string()).is_dir() {
                let name = synthesized_name(
                    &module_path.basename_without_ext().unwrap_or_default(),
                    FileType::SwiftSourceInfo,
                );
                return project.appending(&name).map(Some);
            }
        }
        return module_path
            .replacing_extension(FileType::SwiftSourceInfo)
            .map(Some);
    }
    ctx.default_path(FileType::SwiftSourceInfo).map(Some)
}

/// The loaded module trace. `SWIFT_LOADED_MODULE_TRACE_FILE` both requests
/// the trace and names its path.
fn compute_module_trace_path(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
) -> Result<Option<VirtualPath>, DriverError> {
    if let Some(path) = ctx.env.get("SWIFT_LOADED_MODULE_TRACE_FILE") {
        parsed.has_argument(&[OptId::EmitLoadedModuleTrace]);
        let _ = parsed.get_last_argument(OptId::EmitLoadedModuleTracePath);
        return Ok(Some(VirtualPath::from_string(path)));
    }
    supplementary_path(
        parsed,
        ctx,
        FileType::ModuleTrace,
        OptId::EmitLoadedModuleTracePath,
        &[OptId::EmitLoadedModuleTrace],
    )
}

/// Optimization records: format chosen by `-save-optimization-record=`.
fn compute_optimization_record_path(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
) -> Result<Option<VirtualPath>, DriverError> {
    let ty = match parsed.get_last_argument(OptId::SaveOptimizationRecordEq) {
        None => FileType::YamlOptimizationRecord,
        Some(value) => match value.as_str() {
            "yaml" => FileType::YamlOptimizationRecord,
            "bitstream" => FileType::BitstreamOptimizationRecord,
            _ => {
                return Err(DriverError::InvalidArgumentValue {
                    option: "-save-optimization-record=".to_string(),
                    value,
                })
            }
        },
    };
    supplementary_path(
        parsed,
        ctx,
        ty,
        OptId::SaveOptimizationRecordPath,
        &[OptId::SaveOptimizationRecord, OptId::SaveOptimizationRecordEq],
    )
}

/// The bridging header PCH: only in modes that support it, only when a
/// header is imported, and only while `-enable-bridging-pch` (default on)
/// holds.
pub fn compute_bridging_precompiled_header(
    parsed: &mut ParsedOptions,
    ctx: &OutputContext<'_>,
) -> Result<Option<VirtualPath>, DriverError> {
    let Some(header) = parsed.get_last_argument(OptId::ImportObjcHeader) else {
        return Ok(None);
    };
    if !ctx.mode.supports_bridging_pch()
        || !parsed.has_flag(OptId::EnableBridgingPch, OptId::DisableBridgingPch, true)
    {
        return Ok(None);
    }

    let header_path = VirtualPath::from_string(&header);
    if let Some(map) = ctx.output_file_map {
        if let Some(existing) = map.existing_output(&header_path, FileType::Pch) {
            return Ok(Some(existing.clone()));
        }
    }

    let basename = header_path
        .basename_without_ext()
        .unwrap_or_else(|| "bridging-header".to_string());
    let pch_name = format!("{basename}.{}", FileType::Pch.extension());
    if let Some(dir) = parsed.get_last_argument(OptId::PchOutputDir) {
        return VirtualPath::from_string(&dir).appending(&pch_name).map(Some);
    }
    Ok(Some(VirtualPath::Temporary(pch_name.into())))
}
