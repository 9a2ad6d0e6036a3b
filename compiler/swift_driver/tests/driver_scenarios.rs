//! End-to-end scenarios for the invocation-to-plan pipeline, driving the
//! public API the way the binary does, with a mock executor standing in for
//! the frontend.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use swift_diagnostic::{DiagnosticEngine, StoredDiagnosticConsumer};
use swift_options::OptId;
use swift_driver::{
    CompilerMode, Driver, DriverError, DriverExecutor, ExecutionPolicy, InvocationRunMode, Job,
    JobKind, LinkOutputType, ProcessOutput, Sanitizer, Workload,
};

const TARGET_INFO_JSON: &str = r#"{
    "compilerVersion": "Swift version 5.5 (scenario-test)",
    "target": {
        "triple": "x86_64-unknown-linux-gnu",
        "swiftRuntimeCompatibilityVersion": "5.3"
    }
}"#;

/// Executor double: canned target info, records executed jobs.
#[derive(Default)]
struct RecordingExecutor {
    executed: RefCell<Vec<Job>>,
}

impl DriverExecutor for RecordingExecutor {
    fn execute_and_capture(
        &self,
        job: &Job,
        _env: &FxHashMap<String, String>,
    ) -> Result<ProcessOutput, DriverError> {
        assert_eq!(job.kind, JobKind::PrintTargetInfo);
        Ok(ProcessOutput {
            exit_code: 0,
            stdout: TARGET_INFO_JSON.as_bytes().to_vec(),
            stderr: Vec::new(),
        })
    }

    fn execute(&self, job: &Job, _env: &FxHashMap<String, String>) -> Result<i32, DriverError> {
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

fn argv(args: &[&str]) -> Vec<String> {
    args.iter().map(|s| (*s).to_string()).collect()
}

fn make_driver(
    args: &[&str],
    env: FxHashMap<String, String>,
) -> Result<(Driver, Rc<StoredDiagnosticConsumer>), DriverError> {
    let stored = StoredDiagnosticConsumer::new();
    let diagnostics = DiagnosticEngine::new(stored.clone());
    let driver = Driver::new(
        argv(args),
        env,
        diagnostics,
        Box::<RecordingExecutor>::default(),
    )?;
    Ok((driver, stored))
}

#[test]
fn subcommand_dispatch_rewrites_and_fails_construction() {
    // S1: `swift package build`.
    let (mode, rewritten) = Driver::invocation_run_mode(&argv(&["swift", "package", "build"]));
    assert_eq!(mode, InvocationRunMode::Subcommand("swift-package".into()));
    assert_eq!(rewritten, argv(&["swift-package", "build"]));

    let stored = StoredDiagnosticConsumer::new();
    let err = Driver::new(
        argv(&["swift", "package", "build"]),
        FxHashMap::default(),
        DiagnosticEngine::new(stored),
        Box::<RecordingExecutor>::default(),
    )
    .unwrap_err();
    assert_eq!(err, DriverError::SubcommandPassedToDriver("swift-package".into()));
}

#[test]
fn repl_word_is_the_driver_in_repl_mode() {
    // S2: `swift repl`.
    let (mode, rewritten) = Driver::invocation_run_mode(&argv(&["swift", "repl"]));
    assert_eq!(mode, InvocationRunMode::Normal { is_repl: true });
    assert_eq!(rewritten, argv(&["swift"]));

    let (driver, _) = make_driver(&["swift", "repl"], FxHashMap::default()).unwrap();
    assert_eq!(driver.compiler_mode, CompilerMode::Repl);
}

#[test]
fn frontend_passthrough_is_a_subcommand() {
    // S3: `swift -frontend -c a.swift`.
    let (mode, rewritten) =
        Driver::invocation_run_mode(&argv(&["swift", "-frontend", "-c", "a.swift"]));
    assert_eq!(mode, InvocationRunMode::Subcommand("swift-frontend".into()));
    assert_eq!(rewritten, argv(&["swift-frontend", "-c", "a.swift"]));
}

#[test]
fn response_file_expansion_feeds_the_parser() {
    // S4: tokens with quotes, comments, and escapes.
    let dir = tempfile::tempdir().unwrap();
    let rsp = dir.path().join("r.rsp");
    std::fs::write(
        &rsp,
        "-module-name\nResponses\n// a comment\n-D\nFLAG\\_ONE\n",
    )
    .unwrap();

    let (driver, _) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            &format!("@{}", rsp.display()),
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    assert_eq!(driver.module_output_info.name, "Responses");
}

#[test]
fn library_output_derives_module_name() {
    // S5: `-o libfoo.dylib -emit-library` strips `lib` because the name has
    // a real extension.
    let (driver, _) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
            "b.swift",
            "-o",
            "libfoo.dylib",
            "-emit-library",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    assert_eq!(driver.linker_output_type, Some(LinkOutputType::DynamicLibrary));
    assert_eq!(driver.module_output_info.name, "foo");
    assert!(!driver.module_output_info.name_is_fallback);
}

#[test]
fn dump_ast_beats_wmo_with_a_warning() {
    // S6: `-wmo -dump-ast` resolves to a standard compile.
    let (driver, stored) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-wmo",
            "-dump-ast",
            "x.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    assert_eq!(driver.compiler_mode, CompilerMode::StandardCompile);
    assert!(stored.contains_message("ignoring '-whole-module-optimization'"));
}

#[test]
fn sanitizer_conflict_reports_once_and_keeps_both() {
    // S7: address+thread on 64-bit Linux.
    let resource_dir = tempfile::tempdir().unwrap();
    let lib = resource_dir.path().join("clang/lib/linux");
    std::fs::create_dir_all(&lib).unwrap();
    std::fs::write(lib.join("libclang_rt.asan-x86_64.a"), b"").unwrap();
    std::fs::write(lib.join("libclang_rt.tsan-x86_64.a"), b"").unwrap();

    let (driver, stored) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-resource-dir",
            resource_dir.path().to_str().unwrap(),
            "-sanitize=address",
            "-sanitize=thread",
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();

    assert_eq!(
        driver.enabled_sanitizers,
        vec![Sanitizer::Address, Sanitizer::Thread]
    );
    let conflicts: Vec<_> = stored
        .diagnostics()
        .into_iter()
        .filter(|d| d.message.contains("not allowed with"))
        .collect();
    assert_eq!(conflicts.len(), 1);
}

#[test]
fn explicit_supplementary_path_is_verbatim_and_consumed() {
    // Invariant 4: `-emit-dependencies-path P` plans exactly P, and both
    // the path flag and the request flag count as used.
    let (mut driver, stored) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-emit-dependencies",
            "-emit-dependencies-path",
            "deps/custom.d",
            "-driver-warn-unused-options",
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    assert_eq!(
        driver
            .supplementary_outputs
            .dependencies_file
            .as_ref()
            .unwrap()
            .path_string(),
        "deps/custom.d"
    );

    let jobs = driver.plan_build().unwrap();
    driver.run(jobs).unwrap();
    assert!(!stored.contains_message("'-emit-dependencies' is unused"));
    assert!(!stored.contains_message("'-emit-dependencies-path' is unused"));
}

#[test]
fn unused_options_warn_once_each() {
    // Invariant 2: unconsumed options each produce one warning.
    let (mut driver, stored) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-index-store-path",
            "/idx",
            "-driver-warn-unused-options",
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    let jobs = driver.plan_build().unwrap();
    driver.run(jobs).unwrap();

    let unused: Vec<_> = stored
        .diagnostics()
        .into_iter()
        .filter(|d| d.message.contains("is unused"))
        .collect();
    assert_eq!(unused.len(), 1);
    assert!(unused[0].message.contains("-index-store-path"));
}

#[test]
fn print_jobs_renders_without_executing() {
    let stored = StoredDiagnosticConsumer::new();
    let executor = Box::<RecordingExecutor>::default();
    let mut driver = Driver::new(
        argv(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-driver-print-jobs",
            "a.swift",
        ]),
        FxHashMap::default(),
        DiagnosticEngine::new(stored),
        executor,
    )
    .unwrap();
    let jobs = driver.plan_build().unwrap();
    assert!(!jobs.is_empty());
    let code = driver.run(jobs).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn workload_reaches_the_executor() {
    let stored = StoredDiagnosticConsumer::new();
    let mut driver = Driver::new(
        argv(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
            "b.swift",
            "-j",
            "2",
        ]),
        FxHashMap::default(),
        DiagnosticEngine::new(stored),
        Box::<RecordingExecutor>::default(),
    )
    .unwrap();
    assert_eq!(driver.num_parallel_jobs, 2);
    let jobs = driver.plan_build().unwrap();
    let planned = jobs.len();
    assert!(planned > 1);
    let code = driver.run(jobs).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn output_file_map_routes_per_input_objects() {
    let dir = tempfile::tempdir().unwrap();
    let map_path = dir.path().join("ofm.json");
    std::fs::write(
        &map_path,
        r#"{
            "a.swift": {"object": "build/a.o"},
            "": {"dependencies": "build/master.d"}
        }"#,
    )
    .unwrap();

    let (mut driver, _) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-c",
            "-output-file-map",
            map_path.to_str().unwrap(),
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    let jobs = driver.plan_build().unwrap();
    let compile = jobs.iter().find(|j| j.kind == JobKind::Compile).unwrap();
    assert_eq!(compile.outputs[0].file.path_string(), "build/a.o");
}

#[test]
fn single_job_runs_in_place_without_parseable_output() {
    let (mut driver, _) = make_driver(
        &["swift", "-target", "x86_64-unknown-linux-gnu", "a.swift"],
        FxHashMap::default(),
    )
    .unwrap();
    let jobs = driver.plan_build().unwrap();
    assert_eq!(jobs.len(), 1);
    assert_eq!(jobs[0].kind, JobKind::Interpret);
    assert!(jobs[0].requires_in_place_execution);
    let code = driver.run(jobs).unwrap();
    assert_eq!(code, 0);
}

#[test]
fn batch_mode_implies_continue_after_errors() {
    let (driver, _) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-enable-batch-mode",
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    assert!(driver.compiler_mode.is_batch_compile());
    assert!(driver.continue_building_after_errors);
}

#[test]
fn determinism_env_forces_serial_builds() {
    let mut env = FxHashMap::default();
    env.insert("SWIFTC_MAXIMUM_DETERMINISM".to_string(), "1".to_string());
    let (driver, stored) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-j",
            "8",
            "a.swift",
        ],
        env,
    )
    .unwrap();
    assert_eq!(driver.num_parallel_jobs, 1);
    assert!(stored.contains_message("SWIFTC_MAXIMUM_DETERMINISM"));
}

#[test]
fn loaded_module_trace_env_is_honored() {
    let mut env = FxHashMap::default();
    env.insert(
        "SWIFT_LOADED_MODULE_TRACE_FILE".to_string(),
        "/tmp/trace.json".to_string(),
    );
    let (driver, _) = make_driver(
        &["swiftc", "-target", "x86_64-unknown-linux-gnu", "a.swift"],
        env,
    )
    .unwrap();
    assert_eq!(
        driver
            .supplementary_outputs
            .loaded_module_trace_path
            .as_ref()
            .unwrap()
            .path_string(),
        "/tmp/trace.json"
    );
}

#[test]
fn consumed_mode_options_do_not_warn_as_unused() {
    let (mut driver, stored) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-wmo",
            "-driver-warn-unused-options",
            "a.swift",
            "b.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    let jobs = driver.plan_build().unwrap();
    driver.run(jobs).unwrap();
    assert!(!stored.contains_message("is unused"));
}

#[test]
fn erased_options_cannot_resurface() {
    // After the dump-ast override erases `-wmo`, nothing downstream may see
    // it again.
    let (mut driver, _) = make_driver(
        &[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-wmo",
            "-dump-ast",
            "a.swift",
        ],
        FxHashMap::default(),
    )
    .unwrap();
    assert!(driver
        .parsed_options
        .get_last(OptId::WholeModuleOptimization)
        .is_none());
}
