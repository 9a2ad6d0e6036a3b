//! The driver value and its construction pipeline.
//!
//! `Driver::new` is the whole invocation-to-plan pipeline: response files,
//! option parsing, invocation classification, working-directory rebasing,
//! input collection, the target-info sub-invocation, and every planner.
//! Construction is strictly sequential on one thread; the only
//! out-of-process step is the synchronous target-info job.

pub mod debug;
pub mod inputs;
pub mod invocation;
pub mod mode;
pub mod module_output;
pub mod outputs;
pub mod run;
pub mod validation;

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use rustc_hash::FxHashMap;
use swift_diagnostic::DiagnosticEngine;
use swift_options::{ArgumentValue, OptId, ParsedOptions};
use tracing::debug;

use crate::build_record::BuildRecord;
use crate::error::DriverError;
use crate::execution::{DriverExecutor, IncrementalCompilationState};
use crate::file_type::FileType;
use crate::output_file_map::OutputFileMap;
use crate::response_files::expand_response_files;
use crate::sanitizer::Sanitizer;
use crate::toolchain::target_info::FrontendTargetInfo;
use crate::toolchain::Toolchain;
use crate::triple::Triple;
use crate::virtual_path::{TypedVirtualPath, VirtualPath};

use debug::DebugInfo;
use invocation::{invocation_run_mode, DriverKind, InvocationRunMode};
use mode::CompilerMode;
use module_output::ModuleOutputInfo;
use outputs::{LinkOutputType, LtoKind, SupplementaryOutputPaths};

/// The fully-elaborated description of one compilation.
pub struct Driver {
    pub env: FxHashMap<String, String>,
    pub diagnostics: DiagnosticEngine,
    pub(crate) executor: Box<dyn DriverExecutor>,

    pub driver_kind: DriverKind,
    /// The expanded argument vector, argv[0] included.
    pub args: Vec<String>,
    pub parsed_options: ParsedOptions,

    pub working_directory: Option<PathBuf>,
    pub input_files: Vec<TypedVirtualPath>,
    /// Mtime of every input that existed at construction time.
    pub recorded_input_mtimes: Vec<(TypedVirtualPath, SystemTime)>,
    pub output_file_map: Option<OutputFileMap>,

    pub compiler_mode: CompilerMode,
    pub toolchain: Toolchain,
    pub target_triple: Triple,
    pub target_variant_triple: Option<Triple>,
    pub frontend_target_info: FrontendTargetInfo,
    pub sdk_path: Option<String>,
    /// The frontend executable, after `-tools-directory` and
    /// `-driver-use-frontend-path` are applied.
    pub frontend_path: VirtualPath,
    /// Arguments prepended to every frontend invocation.
    pub frontend_prefix_args: Vec<String>,

    pub compiler_output_type: Option<FileType>,
    pub linker_output_type: Option<LinkOutputType>,
    pub lto: Option<LtoKind>,
    /// The rebased `-o` path.
    pub output: Option<VirtualPath>,
    pub debug_info: DebugInfo,
    pub module_output_info: ModuleOutputInfo,
    pub supplementary_outputs: SupplementaryOutputPaths,
    /// The bridging header named by `-import-objc-header`.
    pub imported_objc_header: Option<VirtualPath>,
    pub enabled_sanitizers: Vec<Sanitizer>,

    pub num_parallel_jobs: usize,
    pub num_threads: usize,
    pub file_list_threshold: usize,
    pub continue_building_after_errors: bool,
    pub force_response_files: bool,
    pub incremental_state: Option<IncrementalCompilationState>,

    pub(crate) build_start_time: SystemTime,
}

impl std::fmt::Debug for Driver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Driver")
            .field("driver_kind", &self.driver_kind)
            .field("args", &self.args)
            .field("compiler_mode", &self.compiler_mode)
            .finish_non_exhaustive()
    }
}

impl Driver {
    /// Classify raw argv before constructing anything. Callers forward
    /// subcommands to the named tool with the rewritten arguments.
    pub fn invocation_run_mode(argv: &[String]) -> (InvocationRunMode, Vec<String>) {
        invocation_run_mode(argv)
    }

    /// Run the full pipeline.
    pub fn new(
        argv: Vec<String>,
        env: FxHashMap<String, String>,
        diagnostics: DiagnosticEngine,
        executor: Box<dyn DriverExecutor>,
    ) -> Result<Driver, DriverError> {
        let build_start_time = SystemTime::now();
        let expanded = expand_response_files(argv, &diagnostics);

        let (run_mode, args) = invocation_run_mode(&expanded);
        if let InvocationRunMode::Subcommand(tool) = run_mode {
            return Err(DriverError::SubcommandPassedToDriver(tool));
        }

        let mut parsed = ParsedOptions::parse(args.get(1..).unwrap_or(&[]))?;

        let driver_kind = match parsed.get_last_argument(OptId::DriverMode) {
            Some(mode_name) => DriverKind::from_name(&mode_name)?,
            None => {
                let basename = Path::new(args.first().map(String::as_str).unwrap_or("swift"))
                    .file_name()
                    .and_then(|n| n.to_str())
                    .unwrap_or("swift");
                DriverKind::from_name(basename)?
            }
        };

        let working_directory = match parsed.get_last_argument(OptId::WorkingDirectory) {
            Some(dir) => Some(absolute_directory(&dir)?),
            None => None,
        };
        if let Some(dir) = &working_directory {
            rebase_path_arguments(&mut parsed, dir);
        }

        let input_files = inputs::collect_inputs(&mut parsed);
        let recorded_input_mtimes = snapshot_input_mtimes(&input_files);

        let output_file_map = match parsed.get_last_argument(OptId::OutputFileMap) {
            Some(path) => {
                let map = OutputFileMap::load(Path::new(&path))?;
                Some(match &working_directory {
                    Some(dir) => map.resolve_relative_paths(dir),
                    None => map,
                })
            }
            None => None,
        };

        let wants_version = parsed.has_argument(&[OptId::Version]);
        let compiler_mode = mode::compute_compile_mode(
            driver_kind,
            &mut parsed,
            !input_files.is_empty(),
            &diagnostics,
        )?;
        debug!(mode = compiler_mode.name(), "compilation mode");

        if driver_kind == DriverKind::Batch
            && input_files.is_empty()
            && !wants_version
            && compiler_mode != CompilerMode::Repl
        {
            return Err(DriverError::NoInputFiles);
        }

        // Target, toolchain, and the frontend that answers for them.
        let target_triple = parsed
            .get_last_argument(OptId::Target)
            .map(|t| Triple::parse(&t))
            .unwrap_or_else(Triple::host_default);
        let target_variant_triple = parsed
            .get_last_argument(OptId::TargetVariant)
            .map(|t| Triple::parse(&t));
        let toolchain = Toolchain::for_triple(&target_triple)?;

        let tools_directory = parsed.get_last_argument(OptId::ToolsDirectory).map(PathBuf::from);
        let (frontend_path, frontend_prefix_args) =
            resolve_frontend(&mut parsed, toolchain, tools_directory.as_deref())?;

        let sdk_path = resolve_sdk(&mut parsed, &env, compiler_mode, toolchain, &diagnostics);
        let resource_dir = parsed.get_last_argument(OptId::ResourceDir);
        let use_static_resource_dir = parsed.has_argument(&[OptId::StaticStdlib]);
        let runtime_compat_request = parsed.get_last_argument(OptId::RuntimeCompatibilityVersion);

        let mut frontend_target_info = query_target_info(
            executor.as_ref(),
            &env,
            toolchain,
            &frontend_path,
            &frontend_prefix_args,
            &target_triple,
            target_variant_triple.as_ref(),
            sdk_path.as_deref(),
            resource_dir.as_deref(),
            runtime_compat_request.as_deref(),
            use_static_resource_dir,
        )?;

        if let Some(version) = runtime_compat_request {
            if is_runtime_compatibility_version(&version) {
                frontend_target_info.target.swift_runtime_compatibility_version =
                    Some(version.clone());
                if let Some(variant) = &mut frontend_target_info.target_variant {
                    variant.swift_runtime_compatibility_version = Some(version);
                }
            } else {
                diagnostics.error(
                    DriverError::InvalidArgumentValue {
                        option: "-runtime-compatibility-version".to_string(),
                        value: version,
                    }
                    .to_string(),
                );
            }
        }

        let frontend_triple = Triple::parse(&frontend_target_info.target.triple);
        if !target_triple.is_simulator() && frontend_triple.is_simulator() {
            diagnostics.warning(format!(
                "inferred simulator environment for target '{target_triple}'; use '{frontend_triple}' instead"
            ));
        }

        let primary =
            outputs::compute_primary_outputs(&mut parsed, driver_kind, &diagnostics)?;

        let output = parsed.get_last_argument(OptId::Output).map(|value| {
            if value == "-" {
                VirtualPath::StandardOutput
            } else {
                VirtualPath::from_string(&value)
            }
        });

        let debug_info = debug::compute_debug_info(&mut parsed, &diagnostics)?;

        let module_output_info = module_output::compute_module_info(
            &mut parsed,
            compiler_mode,
            debug_info,
            primary.linker_output_type,
            primary.compiler_output_type,
            output.as_ref(),
            &input_files,
            working_directory.as_deref(),
            &diagnostics,
        )?;

        // Peek without consuming: the bridging PCH planner owns the
        // consumption decision.
        let imported_objc_header = parsed
            .all()
            .iter()
            .rev()
            .find(|o| o.option == OptId::ImportObjcHeader)
            .and_then(|o| o.value())
            .map(VirtualPath::from_string);

        let output_context = outputs::OutputContext {
            mode: compiler_mode,
            output_file_map: output_file_map.as_ref(),
            output: output.as_ref(),
            module_name: &module_output_info.name,
            module_output_path: module_output_info.path(),
            compiler_output_type: primary.compiler_output_type,
            working_directory: working_directory.as_deref(),
            env: &env,
        };
        let mut supplementary_outputs =
            outputs::compute_supplementary_outputs(&mut parsed, &output_context)?;
        supplementary_outputs.bridging_precompiled_header =
            outputs::compute_bridging_precompiled_header(&mut parsed, &output_context)?;

        // Cross-option validation, all sink-routed.
        validation::validate_warning_options(&mut parsed, &diagnostics);
        validation::validate_profiling_options(
            &mut parsed,
            working_directory.as_deref(),
            &diagnostics,
        );
        validation::validate_conditional_compilation_flags(&mut parsed, &diagnostics);
        validation::validate_framework_search_paths(&mut parsed, &diagnostics);
        validation::validate_prefix_maps(&mut parsed, &diagnostics);
        let enabled_sanitizers = validation::validate_sanitizers(
            &mut parsed,
            toolchain,
            &target_triple,
            resource_dir.as_deref().map(Path::new),
            &diagnostics,
        );
        validation::validate_sanitizer_coverage(&mut parsed, &enabled_sanitizers, &diagnostics);

        let num_parallel_jobs =
            validation::compute_num_parallel_jobs(&mut parsed, &env, &diagnostics);
        let num_threads = validation::compute_num_threads(&mut parsed, compiler_mode, &diagnostics);
        let file_list_threshold =
            validation::compute_file_list_threshold(&mut parsed, &diagnostics)?;
        let continue_building_after_errors =
            validation::compute_continue_building_after_errors(&mut parsed, compiler_mode);
        let force_response_files = parsed.has_argument(&[OptId::DriverForceResponseFiles]);

        let incremental_state = if parsed.has_argument(&[OptId::Incremental]) {
            Some(IncrementalCompilationState::new())
        } else {
            None
        };

        Ok(Driver {
            env,
            diagnostics,
            executor,
            driver_kind,
            args,
            parsed_options: parsed,
            working_directory,
            input_files,
            recorded_input_mtimes,
            output_file_map,
            compiler_mode,
            toolchain,
            target_triple,
            target_variant_triple,
            frontend_target_info,
            sdk_path,
            frontend_path,
            frontend_prefix_args,
            compiler_output_type: primary.compiler_output_type,
            linker_output_type: primary.linker_output_type,
            lto: primary.lto,
            output,
            debug_info,
            module_output_info,
            supplementary_outputs,
            imported_objc_header,
            enabled_sanitizers,
            num_parallel_jobs,
            num_threads,
            file_list_threshold,
            continue_building_after_errors,
            force_response_files,
            incremental_state,
            build_start_time,
        })
    }

    /// The version banner printed for `-v` and `-version`.
    pub fn version_banner(&self) -> String {
        format!(
            "swift-driver version {} ({})",
            env!("CARGO_PKG_VERSION"),
            self.frontend_target_info.compiler_version
        )
    }

    /// Where the build record lives, when one is enabled: the whole-module
    /// `dependencies` entry of the output file map.
    pub(crate) fn build_record_path(&self) -> Option<VirtualPath> {
        self.incremental_state.as_ref()?;
        self.output_file_map
            .as_ref()
            .and_then(|map| map.existing_output_for_single_input(FileType::Dependencies))
            .cloned()
    }

    /// Write the build record after execution.
    pub(crate) fn write_build_record(&self) -> Result<(), DriverError> {
        let Some(path) = self.build_record_path() else {
            return Ok(());
        };
        let skipped = self
            .incremental_state
            .as_ref()
            .map(|state| state.skipped_inputs.clone())
            .unwrap_or_default();
        let record = BuildRecord::new(
            &self.frontend_target_info.compiler_version,
            self.args.get(1..).unwrap_or(&[]),
            self.build_start_time,
            &self.recorded_input_mtimes,
            &skipped,
        );
        record.write_to(Path::new(&path.path_string()))
    }
}

/// Make a working directory absolute against the process CWD.
fn absolute_directory(dir: &str) -> Result<PathBuf, DriverError> {
    let path = PathBuf::from(dir);
    if path.is_absolute() {
        return Ok(path);
    }
    std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .map_err(|e| DriverError::Io {
            path: dir.to_string(),
            error: e.to_string(),
        })
}

/// Rewrite every path-bearing option argument (and positional input) to be
/// relative to `directory`.
fn rebase_path_arguments(parsed: &mut ParsedOptions, directory: &Path) {
    parsed.modify_arguments(|option| {
        let is_path = option.option.takes_path() || option.option == OptId::Input;
        if !is_path {
            return;
        }
        let rebase = |value: &mut String| {
            if value == "-" {
                return;
            }
            let path = Path::new(value.as_str());
            if path.is_relative() {
                *value = directory.join(path).to_string_lossy().into_owned();
            }
        };
        match &mut option.argument {
            ArgumentValue::None => {}
            ArgumentValue::Single(value) => rebase(value),
            ArgumentValue::Multiple(values) => values.iter_mut().for_each(rebase),
        }
    });
}

/// Capture the modification time of every input that exists right now.
fn snapshot_input_mtimes(inputs: &[TypedVirtualPath]) -> Vec<(TypedVirtualPath, SystemTime)> {
    inputs
        .iter()
        .filter(|input| {
            !matches!(
                input.file,
                VirtualPath::StandardInput | VirtualPath::StandardOutput
            )
        })
        .filter_map(|input| {
            let metadata = std::fs::metadata(input.file.path_string()).ok()?;
            let mtime = metadata.modified().ok()?;
            Some((input.clone(), mtime))
        })
        .collect()
}

/// Apply `-driver-use-frontend-path` (an absolute command, optionally with
/// `;`-separated prefix arguments) or fall back to the toolchain's frontend.
fn resolve_frontend(
    parsed: &mut ParsedOptions,
    toolchain: Toolchain,
    tools_directory: Option<&Path>,
) -> Result<(VirtualPath, Vec<String>), DriverError> {
    match parsed.get_last_argument(OptId::DriverUseFrontendPath) {
        Some(override_value) => {
            let mut segments = override_value.split(';').map(str::to_string);
            let command = segments.next().unwrap_or_default();
            if !Path::new(&command).is_absolute() {
                return Err(DriverError::RelativeFrontendPath(command));
            }
            Ok((VirtualPath::from_string(&command), segments.collect()))
        }
        None => Ok((toolchain.frontend_path(tools_directory), Vec::new())),
    }
}

/// SDK priority: `-sdk`, then `SDKROOT`, then the toolchain default for
/// immediate/REPL runs. Empty values clear; a missing directory warns but
/// stays.
fn resolve_sdk(
    parsed: &mut ParsedOptions,
    env: &FxHashMap<String, String>,
    mode: CompilerMode,
    toolchain: Toolchain,
    diagnostics: &DiagnosticEngine,
) -> Option<String> {
    let explicit = parsed.get_last_argument(OptId::Sdk);
    let candidate = match explicit {
        Some(value) => {
            if value.is_empty() {
                return None;
            }
            Some(value)
        }
        None => match env.get("SDKROOT") {
            Some(root) if !root.is_empty() => Some(root.clone()),
            Some(_) => return None,
            None => {
                if matches!(mode, CompilerMode::Immediate | CompilerMode::Repl) {
                    toolchain
                        .default_sdk_path()
                        .map(|p| p.to_string_lossy().into_owned())
                } else {
                    None
                }
            }
        },
    };

    let sdk = candidate?;
    let sdk = sdk.strip_suffix('/').unwrap_or(&sdk).to_string();
    if !Path::new(&sdk).exists() {
        diagnostics.warning(format!("no such SDK: '{sdk}'"));
    }
    Some(sdk)
}

/// Is this a plausible `-runtime-compatibility-version` value?
fn is_runtime_compatibility_version(value: &str) -> bool {
    if value == "none" {
        return true;
    }
    !value.is_empty()
        && value
            .split('.')
            .all(|part| !part.is_empty() && part.chars().all(|c| c.is_ascii_digit()))
}

/// Run the target-info job and decode the answer.
#[allow(clippy::too_many_arguments)]
fn query_target_info(
    executor: &dyn DriverExecutor,
    env: &FxHashMap<String, String>,
    toolchain: Toolchain,
    frontend_path: &VirtualPath,
    frontend_prefix_args: &[String],
    target: &Triple,
    target_variant: Option<&Triple>,
    sdk_path: Option<&str>,
    resource_dir: Option<&str>,
    runtime_compatibility_version: Option<&str>,
    use_static_resource_dir: bool,
) -> Result<FrontendTargetInfo, DriverError> {
    let job = toolchain.print_target_info_job(
        frontend_path,
        frontend_prefix_args,
        target,
        target_variant,
        sdk_path,
        resource_dir,
        runtime_compatibility_version,
        use_static_resource_dir,
    );
    let result = executor.execute_and_capture(&job, env)?;
    if result.exit_code != 0 {
        return Err(DriverError::FailedToRunFrontendToRetrieveTargetInfo {
            code: result.exit_code,
            stderr: String::from_utf8_lossy(&result.stderr).into_owned(),
        });
    }
    let mut arguments = vec![job.tool.path_string()];
    arguments.extend(job.command_line.iter().cloned());
    FrontendTargetInfo::decode(&result.stdout, &arguments)
}

#[cfg(test)]
pub(crate) mod test_support {
    use rustc_hash::FxHashMap;

    use crate::error::DriverError;
    use crate::execution::{
        DriverExecutor, ExecutionPolicy, Job, JobKind, ProcessOutput, Workload,
    };

    pub const TARGET_INFO_JSON: &str = r#"{
        "compilerVersion": "Swift version 5.5 (test)",
        "target": {
            "triple": "x86_64-unknown-linux-gnu",
            "swiftRuntimeCompatibilityVersion": "5.3"
        }
    }"#;

    /// Executor that answers target-info queries from a fixture and records
    /// everything else.
    pub struct MockExecutor {
        pub target_info_json: String,
        pub executed: std::cell::RefCell<Vec<Job>>,
    }

    impl MockExecutor {
        pub fn new() -> Self {
            MockExecutor {
                target_info_json: TARGET_INFO_JSON.to_string(),
                executed: std::cell::RefCell::new(Vec::new()),
            }
        }

        pub fn with_target_info(json: &str) -> Self {
            MockExecutor {
                target_info_json: json.to_string(),
                executed: std::cell::RefCell::new(Vec::new()),
            }
        }
    }

    impl DriverExecutor for MockExecutor {
        fn execute_and_capture(
            &self,
            job: &Job,
            _env: &FxHashMap<String, String>,
        ) -> Result<ProcessOutput, DriverError> {
            assert_eq!(job.kind, JobKind::PrintTargetInfo);
            Ok(ProcessOutput {
                exit_code: 0,
                stdout: self.target_info_json.clone().into_bytes(),
                stderr: Vec::new(),
            })
        }

        fn execute(
            &self,
            job: &Job,
            _env: &FxHashMap<String, String>,
        ) -> Result<i32, DriverError> {
            self.executed.borrow_mut().push(job.clone());
            Ok(0)
        }

        fn execute_workload(
            &self,
            workload: &Workload,
            _policy: &ExecutionPolicy,
            _env: &FxHashMap<String, String>,
        ) -> Result<i32, DriverError> {
            self.executed.borrow_mut().extend(workload.jobs.clone());
            Ok(0)
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use swift_diagnostic::StoredDiagnosticConsumer;

    use super::test_support::MockExecutor;
    use super::*;

    fn make_driver(args: &[&str]) -> Result<Driver, DriverError> {
        make_driver_with_env(args, FxHashMap::default())
    }

    fn make_driver_with_env(
        args: &[&str],
        env: FxHashMap<String, String>,
    ) -> Result<Driver, DriverError> {
        let argv: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
        let stored = StoredDiagnosticConsumer::new();
        let diagnostics = DiagnosticEngine::new(stored);
        Driver::new(argv, env, diagnostics, Box::new(MockExecutor::new()))
    }

    #[test]
    fn subcommand_fails_construction() {
        let err = make_driver(&["swift", "package", "build"]).unwrap_err();
        assert_eq!(
            err,
            DriverError::SubcommandPassedToDriver("swift-package".into())
        );
    }

    #[test]
    fn batch_without_inputs_fails() {
        let err = make_driver(&["swiftc"]).unwrap_err();
        assert_eq!(err, DriverError::NoInputFiles);
    }

    #[test]
    fn version_alone_is_allowed() {
        let driver = make_driver(&["swiftc", "-version"]).unwrap();
        assert!(driver.input_files.is_empty());
    }

    #[test]
    fn basic_compile_shape() {
        let driver = make_driver(&["swiftc", "-target", "x86_64-unknown-linux-gnu", "a.swift"])
            .unwrap();
        assert_eq!(driver.driver_kind, DriverKind::Batch);
        assert_eq!(driver.compiler_mode, CompilerMode::StandardCompile);
        assert_eq!(driver.compiler_output_type, Some(FileType::Object));
        assert_eq!(
            driver.linker_output_type,
            Some(outputs::LinkOutputType::Executable)
        );
        assert_eq!(driver.module_output_info.name, "a");
        assert_eq!(
            driver.frontend_target_info.compiler_version,
            "Swift version 5.5 (test)"
        );
    }

    #[test]
    fn driver_mode_override_wins_over_argv0() {
        let driver = make_driver(&[
            "swift",
            "--driver-mode=swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
        ])
        .unwrap();
        assert_eq!(driver.driver_kind, DriverKind::Batch);
    }

    #[test]
    fn unknown_driver_mode_fails() {
        let err = make_driver(&["swift", "--driver-mode=swiftx", "a.swift"]).unwrap_err();
        assert!(matches!(err, DriverError::InvalidDriverName(_)));
    }

    #[test]
    fn working_directory_rebases_inputs_and_outputs() {
        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-working-directory",
            "/work",
            "a.swift",
            "-o",
            "out/a",
        ])
        .unwrap();
        assert_eq!(driver.input_files[0].file.path_string(), "/work/a.swift");
        assert_eq!(driver.output.unwrap().path_string(), "/work/out/a");
        // The module lands in the working directory too.
        assert_eq!(driver.working_directory.as_deref(), Some(Path::new("/work")));
    }

    #[test]
    fn runtime_compatibility_override() {
        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-runtime-compatibility-version",
            "5.0",
            "a.swift",
        ])
        .unwrap();
        assert_eq!(
            driver
                .frontend_target_info
                .target
                .swift_runtime_compatibility_version
                .as_deref(),
            Some("5.0")
        );
    }

    #[test]
    fn invalid_runtime_compatibility_is_diagnosed_not_applied() {
        let argv: Vec<String> = [
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-runtime-compatibility-version",
            "quux",
            "a.swift",
        ]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
        let stored = StoredDiagnosticConsumer::new();
        let diagnostics = DiagnosticEngine::new(stored.clone());
        let driver = Driver::new(
            argv,
            FxHashMap::default(),
            diagnostics,
            Box::new(MockExecutor::new()),
        )
        .unwrap();
        assert_eq!(
            driver
                .frontend_target_info
                .target
                .swift_runtime_compatibility_version
                .as_deref(),
            Some("5.3")
        );
        assert!(stored.contains_message("-runtime-compatibility-version"));
    }

    #[test]
    fn sdk_priority_and_trailing_slash() {
        let mut env = FxHashMap::default();
        env.insert("SDKROOT".to_string(), "/sdkroot/".to_string());
        let driver = make_driver_with_env(
            &["swiftc", "-target", "x86_64-unknown-linux-gnu", "a.swift"],
            env.clone(),
        )
        .unwrap();
        assert_eq!(driver.sdk_path.as_deref(), Some("/sdkroot"));

        let driver = make_driver_with_env(
            &[
                "swiftc",
                "-target",
                "x86_64-unknown-linux-gnu",
                "-sdk",
                "/explicit",
                "a.swift",
            ],
            env,
        )
        .unwrap();
        assert_eq!(driver.sdk_path.as_deref(), Some("/explicit"));

        // Explicit empty clears SDKROOT.
        let mut env = FxHashMap::default();
        env.insert("SDKROOT".to_string(), "/sdkroot".to_string());
        let driver = make_driver_with_env(
            &[
                "swiftc",
                "-target",
                "x86_64-unknown-linux-gnu",
                "-sdk",
                "",
                "a.swift",
            ],
            env,
        )
        .unwrap();
        assert_eq!(driver.sdk_path, None);
    }

    #[test]
    fn frontend_override_splits_prefix_args() {
        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-driver-use-frontend-path",
            "/opt/frontend;-wrap;-fast",
            "a.swift",
        ])
        .unwrap();
        assert_eq!(driver.frontend_path.path_string(), "/opt/frontend");
        assert_eq!(driver.frontend_prefix_args, vec!["-wrap", "-fast"]);

        let err = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-driver-use-frontend-path",
            "relative/frontend",
            "a.swift",
        ])
        .unwrap_err();
        assert!(matches!(err, DriverError::RelativeFrontendPath(_)));
    }

    #[test]
    fn mtime_snapshot_covers_existing_inputs_only() {
        let dir = tempfile::tempdir().unwrap();
        let existing = dir.path().join("a.swift");
        std::fs::write(&existing, "// swift").unwrap();
        let missing = dir.path().join("b.swift");

        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            existing.to_str().unwrap(),
            missing.to_str().unwrap(),
        ])
        .unwrap();
        assert_eq!(driver.input_files.len(), 2);
        assert_eq!(driver.recorded_input_mtimes.len(), 1);
        assert_eq!(
            driver.recorded_input_mtimes[0].0.file.path_string(),
            existing.display().to_string()
        );
    }

    #[test]
    fn incremental_flag_creates_state() {
        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-incremental",
            "a.swift",
        ])
        .unwrap();
        assert!(driver.incremental_state.is_some());
    }

    #[test]
    fn target_info_failure_modes() {
        let argv: Vec<String> = ["swiftc", "-target", "x86_64-unknown-linux-gnu", "a.swift"]
            .iter()
            .map(|s| (*s).to_string())
            .collect();
        let stored = StoredDiagnosticConsumer::new();
        let diagnostics = DiagnosticEngine::new(stored);
        let err = Driver::new(
            argv,
            FxHashMap::default(),
            diagnostics,
            Box::new(MockExecutor::with_target_info("not json")),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            DriverError::UnableToDecodeFrontendTargetInfo { .. }
        ));
    }

    #[test]
    fn windows_target_is_unsupported() {
        let err = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-windows-msvc",
            "a.swift",
        ])
        .unwrap_err();
        assert!(matches!(err, DriverError::UnsupportedTarget(_)));
    }

    #[test]
    fn unused_options_are_observable() {
        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-index-store-path",
            "/idx",
            "a.swift",
        ])
        .unwrap();
        let unconsumed = driver.parsed_options.unconsumed();
        assert!(unconsumed
            .iter()
            .any(|o| o.option == OptId::IndexStorePath));
    }

    #[test]
    fn stored_relative_paths_only_when_no_working_directory() {
        // Invariant: with a working directory set, every stored relative
        // path is either rebased or a temporary.
        let driver = make_driver(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-working-directory",
            "/work",
            "-g",
            "a.swift",
        ])
        .unwrap();
        for (input, _) in &driver.recorded_input_mtimes {
            assert!(input.file.absolute_path().is_some() || input.file.is_temporary());
        }
        for input in &driver.input_files {
            assert!(input.file.absolute_path().is_some() || input.file.is_temporary());
        }
        if let Some(path) = driver.module_output_info.path() {
            assert!(path.absolute_path().is_some() || path.is_temporary());
        }
    }
}
