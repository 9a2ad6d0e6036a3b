//! Module name and module-emission planning.

use std::path::Path;

use swift_diagnostic::DiagnosticEngine;
use swift_options::{OptId, ParsedOptions};
use tracing::debug;

use crate::driver::debug::DebugInfo;
use crate::driver::mode::CompilerMode;
use crate::driver::outputs::LinkOutputType;
use crate::error::DriverError;
use crate::file_type::FileType;
use crate::virtual_path::{TypedVirtualPath, VirtualPath};

/// The module artifact's place in the compilation.
#[derive(Debug, Clone, PartialEq)]
pub enum ModuleOutput {
    /// The module is a product the user asked for.
    TopLevel(VirtualPath),
    /// The module only exists to serve another output (debug info,
    /// interfaces); it lives in a temporary.
    Auxiliary(VirtualPath),
}

impl ModuleOutput {
    pub fn path(&self) -> &VirtualPath {
        match self {
            ModuleOutput::TopLevel(path) | ModuleOutput::Auxiliary(path) => path,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ModuleOutputInfo {
    pub output: Option<ModuleOutput>,
    pub name: String,
    /// The name came from the `main` fallback, not user intent.
    pub name_is_fallback: bool,
}

impl ModuleOutputInfo {
    pub fn path(&self) -> Option<&VirtualPath> {
        self.output.as_ref().map(ModuleOutput::path)
    }
}

/// The standard library's module name; only `-parse-stdlib` may claim it.
const STDLIB_MODULE_NAME: &str = "Swift";

/// Derive the module emission kind, name, and output path.
#[allow(clippy::too_many_arguments)]
pub fn compute_module_info(
    parsed: &mut ParsedOptions,
    mode: CompilerMode,
    debug_info: DebugInfo,
    linker_output_type: Option<LinkOutputType>,
    compiler_output_type: Option<FileType>,
    output: Option<&VirtualPath>,
    inputs: &[TypedVirtualPath],
    working_directory: Option<&Path>,
    diagnostics: &DiagnosticEngine,
) -> Result<ModuleOutputInfo, DriverError> {
    let explicit_module_path = parsed.get_last_argument(OptId::EmitModulePath);
    let emit_module_requested =
        parsed.has_argument(&[OptId::EmitModule]) || explicit_module_path.is_some();

    #[derive(PartialEq)]
    enum Kind {
        None,
        TopLevel,
        Auxiliary,
    }

    let mut kind = if emit_module_requested {
        Kind::TopLevel
    } else if debug_info.level.is_some_and(|l| l.requires_module()) && linker_output_type.is_some()
    {
        Kind::Auxiliary
    } else if mode != CompilerMode::SingleCompile
        && parsed.has_argument(&[
            OptId::EmitObjcHeader,
            OptId::EmitObjcHeaderPath,
            OptId::EmitModuleInterface,
            OptId::EmitModuleInterfacePath,
            OptId::EmitPrivateModuleInterfacePath,
        ])
    {
        Kind::Auxiliary
    } else {
        Kind::None
    };

    if matches!(mode, CompilerMode::Repl | CompilerMode::Immediate) && kind != Kind::None {
        diagnostics.error(format!("{} mode cannot emit a module", mode.name()));
        kind = Kind::None;
    }

    let (name, name_is_fallback) = derive_module_name(
        parsed,
        mode,
        linker_output_type,
        compiler_output_type,
        output,
        inputs,
        diagnostics,
    );
    debug!(name = %name, fallback = name_is_fallback, "module name");

    let module_file_name = format!("{name}.{}", FileType::SwiftModule.extension());
    let output = match kind {
        Kind::None => None,
        Kind::TopLevel => {
            let path = if let Some(path) = explicit_module_path {
                VirtualPath::from_string(&path)
            } else if let (Some(FileType::SwiftModule), Some(output)) =
                (compiler_output_type, output)
            {
                output.clone()
            } else if let Some(output) = output {
                match output.parent_directory() {
                    Some(parent) => parent.appending(&module_file_name)?,
                    None => VirtualPath::from_string(&module_file_name),
                }
            } else {
                VirtualPath::from_string(&module_file_name)
            };
            let path = match working_directory {
                Some(dir) => path.resolved_relative_to(dir),
                None => path,
            };
            Some(ModuleOutput::TopLevel(path))
        }
        Kind::Auxiliary => Some(ModuleOutput::Auxiliary(VirtualPath::Temporary(
            module_file_name.into(),
        ))),
    };

    Ok(ModuleOutputInfo {
        output,
        name,
        name_is_fallback,
    })
}

fn derive_module_name(
    parsed: &mut ParsedOptions,
    mode: CompilerMode,
    linker_output_type: Option<LinkOutputType>,
    compiler_output_type: Option<FileType>,
    output: Option<&VirtualPath>,
    inputs: &[TypedVirtualPath],
    diagnostics: &DiagnosticEngine,
) -> (String, bool) {
    let derived = if let Some(name) = parsed.get_last_argument(OptId::ModuleName) {
        name
    } else if mode == CompilerMode::Repl {
        "REPL".to_string()
    } else if let Some(output) = output {
        let stem = output.basename_without_ext().unwrap_or_default();
        let building_library = matches!(
            linker_output_type,
            Some(LinkOutputType::DynamicLibrary | LinkOutputType::StaticLibrary)
        );
        if building_library && output.extension().is_some() && stem.len() > 3 {
            stem.strip_prefix("lib").map_or(stem.clone(), str::to_string)
        } else {
            stem
        }
    } else if inputs.len() == 1 {
        inputs[0].file.basename_without_ext().unwrap_or_default()
    } else {
        String::new()
    };

    let parse_stdlib = parsed.has_argument(&[OptId::ParseStdlib]);
    let claims_stdlib = derived == STDLIB_MODULE_NAME && !parse_stdlib;
    if is_valid_identifier(&derived) && !claims_stdlib {
        return (derived, false);
    }

    // Prefer the resolved link output over guessing; "probably an
    // executable" only remains for runs with no output type at all.
    let maybe_building_executable =
        linker_output_type == Some(LinkOutputType::Executable) || compiler_output_type.is_none();
    if maybe_building_executable {
        return ("main".to_string(), true);
    }

    diagnostics.error(format!(
        "module name \"{derived}\" is not a valid identifier"
    ));
    ("__bad__".to_string(), false)
}

fn is_valid_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(c) if c.is_ascii_alphabetic() || c == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use swift_diagnostic::StoredDiagnosticConsumer;

    use super::*;

    fn parse(args: &[&str]) -> ParsedOptions {
        let strings: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
        ParsedOptions::parse(&strings).unwrap()
    }

    fn swift_input(path: &str) -> TypedVirtualPath {
        TypedVirtualPath::new(VirtualPath::from_string(path), FileType::Swift)
    }

    struct Setup {
        mode: CompilerMode,
        debug: DebugInfo,
        linker: Option<LinkOutputType>,
        compiler_output: Option<FileType>,
        output: Option<VirtualPath>,
        inputs: Vec<TypedVirtualPath>,
    }

    impl Default for Setup {
        fn default() -> Self {
            Setup {
                mode: CompilerMode::StandardCompile,
                debug: DebugInfo::default(),
                linker: Some(LinkOutputType::Executable),
                compiler_output: Some(FileType::Object),
                output: None,
                inputs: vec![swift_input("a.swift")],
            }
        }
    }

    fn compute(
        args: &[&str],
        setup: Setup,
    ) -> (ModuleOutputInfo, Rc<StoredDiagnosticConsumer>) {
        let mut parsed = parse(args);
        let stored = StoredDiagnosticConsumer::new();
        let diags = DiagnosticEngine::new(stored.clone());
        let info = compute_module_info(
            &mut parsed,
            setup.mode,
            setup.debug,
            setup.linker,
            setup.compiler_output,
            setup.output.as_ref(),
            &setup.inputs,
            None,
            &diags,
        )
        .unwrap();
        (info, stored)
    }

    #[test]
    fn library_output_strips_lib_prefix() {
        let (info, _) = compute(
            &[],
            Setup {
                linker: Some(LinkOutputType::DynamicLibrary),
                output: Some(VirtualPath::from_string("libfoo.dylib")),
                inputs: vec![swift_input("a.swift"), swift_input("b.swift")],
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "foo");
        assert!(!info.name_is_fallback);
    }

    #[test]
    fn extensionless_output_keeps_lib() {
        // No real extension, so the `lib` prefix is part of the name.
        let (info, _) = compute(
            &[],
            Setup {
                linker: Some(LinkOutputType::DynamicLibrary),
                output: Some(VirtualPath::from_string("libfoo")),
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "libfoo");
    }

    #[test]
    fn single_input_names_the_module() {
        let (info, _) = compute(&[], Setup::default());
        assert_eq!(info.name, "a");
        assert!(!info.name_is_fallback);
    }

    #[test]
    fn module_name_flag_wins() {
        let (info, _) = compute(&["-module-name", "Custom"], Setup::default());
        assert_eq!(info.name, "Custom");
    }

    #[test]
    fn invalid_name_falls_back_to_main_for_executables() {
        let (info, _) = compute(
            &[],
            Setup {
                inputs: vec![swift_input("my-file.swift")],
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "main");
        assert!(info.name_is_fallback);
    }

    #[test]
    fn invalid_name_is_an_error_for_libraries() {
        let (info, stored) = compute(
            &["-emit-module"],
            Setup {
                linker: None,
                compiler_output: Some(FileType::SwiftModule),
                inputs: vec![swift_input("my-file.swift")],
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "__bad__");
        assert!(stored.contains_message("not a valid identifier"));
    }

    #[test]
    fn stdlib_name_needs_parse_stdlib() {
        let (info, _) = compute(
            &["-module-name", "Swift"],
            Setup {
                linker: None,
                compiler_output: Some(FileType::SwiftModule),
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "__bad__");

        let (info, _) = compute(
            &["-module-name", "Swift", "-parse-stdlib"],
            Setup {
                linker: None,
                compiler_output: Some(FileType::SwiftModule),
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "Swift");
    }

    #[test]
    fn repl_module_is_named_repl() {
        let (info, _) = compute(
            &[],
            Setup {
                mode: CompilerMode::Repl,
                linker: None,
                compiler_output: None,
                inputs: vec![],
                ..Setup::default()
            },
        );
        assert_eq!(info.name, "REPL");
        assert!(info.output.is_none());
    }

    #[test]
    fn explicit_emit_module_path_wins() {
        let (info, _) = compute(
            &["-emit-module-path", "/out/M.swiftmodule", "-module-name", "M"],
            Setup::default(),
        );
        assert_eq!(
            info.output,
            Some(ModuleOutput::TopLevel(VirtualPath::from_string(
                "/out/M.swiftmodule"
            )))
        );
    }

    #[test]
    fn top_level_module_sits_beside_output() {
        let (info, _) = compute(
            &["-emit-module"],
            Setup {
                output: Some(VirtualPath::from_string("/build/app")),
                ..Setup::default()
            },
        );
        // `-o` also names the module, so the module sits beside it.
        assert_eq!(info.name, "app");
        assert_eq!(info.path().unwrap().path_string(), "/build/app.swiftmodule");
    }

    #[test]
    fn debug_info_forces_auxiliary_module() {
        use crate::driver::debug::{DebugInfoFormat, DebugInfoLevel};
        let (info, _) = compute(
            &[],
            Setup {
                debug: DebugInfo {
                    format: DebugInfoFormat::Dwarf,
                    level: Some(DebugInfoLevel::AstTypes),
                    should_verify: false,
                },
                ..Setup::default()
            },
        );
        let Some(ModuleOutput::Auxiliary(path)) = &info.output else {
            panic!("expected an auxiliary module, got {:?}", info.output);
        };
        assert!(path.is_temporary());
    }

    #[test]
    fn interface_request_forces_auxiliary_module_outside_wmo() {
        let (info, _) = compute(
            &["-emit-module-interface"],
            Setup {
                linker: None,
                ..Setup::default()
            },
        );
        assert!(matches!(info.output, Some(ModuleOutput::Auxiliary(_))));

        let (info, _) = compute(
            &["-emit-module-interface"],
            Setup {
                mode: CompilerMode::SingleCompile,
                linker: None,
                ..Setup::default()
            },
        );
        assert!(info.output.is_none());
    }

    #[test]
    fn repl_cannot_emit_modules() {
        let (info, stored) = compute(
            &["-emit-module"],
            Setup {
                mode: CompilerMode::Repl,
                linker: None,
                compiler_output: None,
                inputs: vec![],
                ..Setup::default()
            },
        );
        assert!(info.output.is_none());
        assert!(stored.contains_message("cannot emit a module"));
    }
}
