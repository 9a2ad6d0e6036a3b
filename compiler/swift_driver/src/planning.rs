//! Minimal job synthesis.
//!
//! Enough of a planner that the driver is runnable end-to-end and the
//! dispatcher's print modes have real jobs to show: frontend jobs shaped by
//! the compilation mode, a module-wrap job when debugging needs one, and a
//! link job when a linker output is expected. The full planner, with
//! batching, merge-module scheduling, and toolchain-specific linker
//! synthesis, lives outside this crate.

use std::path::PathBuf;

use swift_options::OptId;
use tracing::debug;

use crate::driver::invocation::DriverKind;
use crate::driver::mode::CompilerMode;
use crate::driver::module_output::ModuleOutput;
use crate::driver::outputs::LinkOutputType;
use crate::driver::Driver;
use crate::error::DriverError;
use crate::execution::{Job, JobKind};
use crate::file_type::FileType;
use crate::virtual_path::{TypedVirtualPath, VirtualPath};

/// The frontend spelling of a compiler output type.
fn frontend_mode_flag(ty: FileType) -> Option<&'static str> {
    match ty {
        FileType::Object => Some("-c"),
        FileType::LlvmBitcode => Some("-emit-bc"),
        FileType::LlvmIr => Some("-emit-ir"),
        FileType::Assembly => Some("-S"),
        FileType::Sil => Some("-emit-sil"),
        FileType::RawSil => Some("-emit-silgen"),
        FileType::Sib => Some("-emit-sib"),
        FileType::RawSib => Some("-emit-sibgen"),
        FileType::SwiftModule => Some("-emit-module"),
        FileType::Ast => Some("-dump-ast"),
        FileType::Pcm => Some("-emit-pcm"),
        FileType::ImportedModules => Some("-emit-imported-modules"),
        FileType::IndexData => Some("-index-file"),
        FileType::Remap => Some("-update-code"),
        FileType::JsonDependencies => Some("-scan-dependencies"),
        FileType::JsonClangDependencies => Some("-scan-clang-dependencies"),
        _ => None,
    }
}

impl Driver {
    /// Plan the jobs for this invocation.
    pub fn plan_build(&mut self) -> Result<Vec<Job>, DriverError> {
        // A bare version request plans exactly one banner job.
        if self.parsed_options.has_argument(&[OptId::Version]) && self.input_files.is_empty() {
            return Ok(vec![self.version_request_job()]);
        }

        match self.compiler_mode {
            CompilerMode::Repl => Ok(vec![self.repl_job()]),
            CompilerMode::Immediate => Ok(vec![self.interpret_job()]),
            CompilerMode::CompilePcm => Ok(vec![self.whole_module_job()]),
            CompilerMode::SingleCompile => {
                let mut jobs = Vec::new();
                if let Some(pch) = self.pch_job() {
                    jobs.push(pch);
                }
                jobs.push(self.whole_module_job());
                self.append_link_jobs(&mut jobs);
                Ok(jobs)
            }
            CompilerMode::StandardCompile | CompilerMode::BatchCompile(_) => {
                let mut jobs = Vec::new();
                if let Some(pch) = self.pch_job() {
                    jobs.push(pch);
                }
                let swift_inputs: Vec<TypedVirtualPath> = self
                    .input_files
                    .iter()
                    .filter(|input| input.file_type.is_part_of_swift_compilation())
                    .cloned()
                    .collect();
                for input in &swift_inputs {
                    jobs.push(self.primary_compile_job(input, &swift_inputs));
                }
                self.append_link_jobs(&mut jobs);
                Ok(jobs)
            }
        }
    }

    fn frontend_invocation(&self) -> Vec<String> {
        let mut args = self.frontend_prefix_args.clone();
        args.push("-frontend".to_string());
        args
    }

    fn common_frontend_tail(&self, args: &mut Vec<String>) {
        args.push("-target".to_string());
        args.push(self.target_triple.to_string());
        if let Some(sdk) = &self.sdk_path {
            args.push("-sdk".to_string());
            args.push(sdk.clone());
        }
        args.push("-module-name".to_string());
        args.push(self.module_output_info.name.clone());
    }

    fn version_request_job(&self) -> Job {
        Job {
            kind: JobKind::VersionRequest,
            tool: self.frontend_path.clone(),
            command_line: vec!["-frontend".to_string(), "-version".to_string()],
            inputs: Vec::new(),
            primary_inputs: Vec::new(),
            outputs: Vec::new(),
            requires_in_place_execution: true,
        }
    }

    fn repl_job(&self) -> Job {
        let mut command_line = self.frontend_invocation();
        command_line.push("-repl".to_string());
        self.common_frontend_tail(&mut command_line);
        Job {
            kind: JobKind::Repl,
            tool: self.frontend_path.clone(),
            command_line,
            inputs: Vec::new(),
            primary_inputs: Vec::new(),
            outputs: Vec::new(),
            requires_in_place_execution: true,
        }
    }

    fn interpret_job(&self) -> Job {
        let mut command_line = self.frontend_invocation();
        command_line.push("-interpret".to_string());
        for input in &self.input_files {
            command_line.push(input.file.path_string());
        }
        self.common_frontend_tail(&mut command_line);
        Job {
            kind: JobKind::Interpret,
            tool: self.frontend_path.clone(),
            command_line,
            inputs: self.input_files.clone(),
            primary_inputs: self.input_files.clone(),
            outputs: Vec::new(),
            requires_in_place_execution: true,
        }
    }

    fn pch_job(&self) -> Option<Job> {
        let header = self.imported_objc_header.clone()?;
        let pch = self
            .supplementary_outputs
            .bridging_precompiled_header
            .clone()?;
        let mut command_line = self.frontend_invocation();
        command_line.push("-emit-pch".to_string());
        command_line.push(header.path_string());
        command_line.push("-o".to_string());
        command_line.push(pch.path_string());
        Some(Job {
            kind: JobKind::GeneratePch,
            tool: self.frontend_path.clone(),
            command_line,
            inputs: vec![TypedVirtualPath::new(header, FileType::ObjcHeader)],
            primary_inputs: Vec::new(),
            outputs: vec![TypedVirtualPath::new(pch, FileType::Pch)],
            requires_in_place_execution: false,
        })
    }

    /// The whole-module frontend job for single compilations.
    fn whole_module_job(&self) -> Job {
        let output_type = self.compiler_output_type.unwrap_or(FileType::Object);
        let mut command_line = self.frontend_invocation();
        if let Some(flag) = frontend_mode_flag(output_type) {
            command_line.push(flag.to_string());
        }
        for input in &self.input_files {
            command_line.push(input.file.path_string());
        }
        self.common_frontend_tail(&mut command_line);

        let output_path = self.whole_module_output_path(output_type);
        command_line.push("-o".to_string());
        command_line.push(output_path.path_string());

        let mut outputs = vec![TypedVirtualPath::new(output_path, output_type)];
        if let Some(ModuleOutput::TopLevel(path)) = &self.module_output_info.output {
            if output_type != FileType::SwiftModule {
                command_line.push("-emit-module-path".to_string());
                command_line.push(path.path_string());
                outputs.push(TypedVirtualPath::new(path.clone(), FileType::SwiftModule));
            }
        }

        debug!(outputs = outputs.len(), "planned whole-module job");
        Job {
            kind: JobKind::Compile,
            tool: self.frontend_path.clone(),
            command_line,
            inputs: self.input_files.clone(),
            primary_inputs: self.input_files.clone(),
            outputs,
            requires_in_place_execution: false,
        }
    }

    fn whole_module_output_path(&self, output_type: FileType) -> VirtualPath {
        if let Some(map) = &self.output_file_map {
            if let Some(path) = map.existing_output_for_single_input(output_type) {
                return path.clone();
            }
        }
        if self.linker_output_type.is_some() {
            return VirtualPath::Temporary(PathBuf::from(format!(
                "{}.{}",
                self.module_output_info.name,
                output_type.extension()
            )));
        }
        if let Some(output) = &self.output {
            return output.clone();
        }
        self.synthesized_output(&self.module_output_info.name, output_type)
    }

    /// A per-primary frontend job for standard and batch compilations.
    fn primary_compile_job(&self, primary: &TypedVirtualPath, all: &[TypedVirtualPath]) -> Job {
        let output_type = self.compiler_output_type.unwrap_or(FileType::Object);
        let mut command_line = self.frontend_invocation();
        if let Some(flag) = frontend_mode_flag(output_type) {
            command_line.push(flag.to_string());
        }
        command_line.push("-primary-file".to_string());
        command_line.push(primary.file.path_string());
        for input in all {
            command_line.push(input.file.path_string());
        }
        self.common_frontend_tail(&mut command_line);

        let output_path = self.primary_output_path(primary, output_type);
        command_line.push("-o".to_string());
        command_line.push(output_path.path_string());

        Job {
            kind: JobKind::Compile,
            tool: self.frontend_path.clone(),
            command_line,
            inputs: all.to_vec(),
            primary_inputs: vec![primary.clone()],
            outputs: vec![TypedVirtualPath::new(output_path, output_type)],
            requires_in_place_execution: false,
        }
    }

    fn primary_output_path(&self, primary: &TypedVirtualPath, output_type: FileType) -> VirtualPath {
        if let Some(map) = &self.output_file_map {
            if let Some(path) = map.existing_output(&primary.file, output_type) {
                return path.clone();
            }
        }
        let basename = primary
            .file
            .basename_without_ext()
            .unwrap_or_else(|| "main".to_string());
        if self.linker_output_type.is_some() {
            return VirtualPath::Temporary(PathBuf::from(format!(
                "{basename}.{}",
                output_type.extension()
            )));
        }
        if let Some(output) = &self.output {
            if self.input_files.len() == 1 {
                return output.clone();
            }
        }
        self.synthesized_output(&basename, output_type)
    }

    fn synthesized_output(&self, stem: &str, output_type: FileType) -> VirtualPath {
        let ext = output_type.extension();
        let name = if ext.is_empty() {
            stem.to_string()
        } else {
            format!("{stem}.{ext}")
        };
        let path = VirtualPath::from_string(&name);
        match &self.working_directory {
            Some(dir) => path.resolved_relative_to(dir),
            None => path,
        }
    }

    fn append_link_jobs(&self, jobs: &mut Vec<Job>) {
        let Some(link_type) = self.linker_output_type else {
            return;
        };

        let mut link_inputs: Vec<TypedVirtualPath> = jobs
            .iter()
            .flat_map(|job| job.outputs.iter())
            .filter(|out| {
                matches!(out.file_type, FileType::Object | FileType::LlvmBitcode)
            })
            .cloned()
            .collect();
        link_inputs.extend(
            self.input_files
                .iter()
                .filter(|input| input.file_type == FileType::Object)
                .cloned(),
        );

        // Debug info that describes types rides in the module; on ELF it is
        // wrapped into an object and linked in.
        if self.toolchain == crate::toolchain::Toolchain::GenericUnix
            && self.debug_info.level.is_some_and(|l| l.requires_module())
        {
            if let Some(module_path) = self.module_output_info.path() {
                let wrapped = VirtualPath::Temporary(PathBuf::from(format!(
                    "{}-wrapped.o",
                    self.module_output_info.name
                )));
                jobs.push(Job {
                    kind: JobKind::ModuleWrap,
                    tool: self.frontend_path.clone(),
                    command_line: {
                        let mut args = self.frontend_invocation();
                        args.push("-modulewrap".to_string());
                        args.push(module_path.path_string());
                        args.push("-o".to_string());
                        args.push(wrapped.path_string());
                        args
                    },
                    inputs: vec![TypedVirtualPath::new(
                        module_path.clone(),
                        FileType::SwiftModule,
                    )],
                    primary_inputs: Vec::new(),
                    outputs: vec![TypedVirtualPath::new(wrapped.clone(), FileType::Object)],
                    requires_in_place_execution: false,
                });
                link_inputs.push(TypedVirtualPath::new(wrapped, FileType::Object));
            }
        }

        let output = self.link_output_path(link_type);
        let mut command_line: Vec<String> =
            link_inputs.iter().map(|input| input.file.path_string()).collect();
        command_line.push("-target".to_string());
        command_line.push(self.target_triple.to_string());
        command_line.push("-o".to_string());
        command_line.push(output.path_string());

        jobs.push(Job {
            kind: JobKind::Link,
            tool: VirtualPath::Relative(PathBuf::from("clang")),
            command_line,
            inputs: link_inputs,
            primary_inputs: Vec::new(),
            outputs: vec![TypedVirtualPath::new(output, FileType::Image)],
            requires_in_place_execution: false,
        });
    }

    fn link_output_path(&self, link_type: LinkOutputType) -> VirtualPath {
        if let Some(output) = &self.output {
            return output.clone();
        }
        let name = &self.module_output_info.name;
        let file_name = match link_type {
            LinkOutputType::Executable => {
                if self.driver_kind == DriverKind::Batch && self.module_output_info.name_is_fallback
                {
                    // Nameless executables keep the traditional default.
                    "main".to_string()
                } else {
                    name.clone()
                }
            }
            LinkOutputType::DynamicLibrary => {
                let ext = if self.target_triple.is_darwin() { "dylib" } else { "so" };
                format!("lib{name}.{ext}")
            }
            LinkOutputType::StaticLibrary => format!("lib{name}.a"),
        };
        let path = VirtualPath::from_string(&file_name);
        match &self.working_directory {
            Some(dir) => path.resolved_relative_to(dir),
            None => path,
        }
    }
}

#[cfg(test)]
mod tests {
    use rustc_hash::FxHashMap;
    use swift_diagnostic::{DiagnosticEngine, StoredDiagnosticConsumer};

    use crate::driver::test_support::MockExecutor;
    use crate::driver::Driver;

    use super::*;

    fn plan(args: &[&str]) -> (Driver, Vec<Job>) {
        let argv: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
        let diagnostics = DiagnosticEngine::new(StoredDiagnosticConsumer::new());
        let mut driver = Driver::new(
            argv,
            FxHashMap::default(),
            diagnostics,
            Box::new(MockExecutor::new()),
        )
        .unwrap();
        let jobs = driver.plan_build().unwrap();
        (driver, jobs)
    }

    #[test]
    fn standard_compile_plans_one_job_per_swift_input_plus_link() {
        let (_, jobs) = plan(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
            "b.swift",
            "extra.o",
        ]);
        let compiles: Vec<&Job> = jobs.iter().filter(|j| j.kind == JobKind::Compile).collect();
        assert_eq!(compiles.len(), 2);
        assert!(compiles[0].command_line.contains(&"-primary-file".to_string()));

        let link = jobs.iter().find(|j| j.kind == JobKind::Link).unwrap();
        // Two compiled objects plus the object passed on the command line.
        assert_eq!(link.inputs.len(), 3);
        assert_eq!(link.outputs[0].file_type, FileType::Image);
    }

    #[test]
    fn wmo_plans_a_single_frontend_job() {
        let (_, jobs) = plan(&[
            "swiftc",
            "-wmo",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
            "b.swift",
        ]);
        let compiles: Vec<&Job> = jobs.iter().filter(|j| j.kind == JobKind::Compile).collect();
        assert_eq!(compiles.len(), 1);
        assert!(!compiles[0].command_line.contains(&"-primary-file".to_string()));
    }

    #[test]
    fn emit_object_without_linking_uses_dash_o() {
        let (_, jobs) = plan(&[
            "swiftc",
            "-c",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
            "-o",
            "custom.o",
        ]);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].outputs[0].file.path_string(), "custom.o");
        assert!(jobs.iter().all(|j| j.kind != JobKind::Link));
    }

    #[test]
    fn interactive_inputs_interpret_in_place() {
        let (_, jobs) = plan(&["swift", "-target", "x86_64-unknown-linux-gnu", "a.swift"]);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, JobKind::Interpret);
        assert!(jobs[0].requires_in_place_execution);
    }

    #[test]
    fn repl_plans_in_place() {
        let (_, jobs) = plan(&["swift", "-target", "x86_64-unknown-linux-gnu"]);
        assert_eq!(jobs[0].kind, JobKind::Repl);
        assert!(jobs[0].requires_in_place_execution);
    }

    #[test]
    fn debug_info_on_elf_adds_module_wrap() {
        let (_, jobs) = plan(&[
            "swiftc",
            "-g",
            "-target",
            "x86_64-unknown-linux-gnu",
            "a.swift",
        ]);
        assert!(jobs.iter().any(|j| j.kind == JobKind::ModuleWrap));
        let link = jobs.iter().find(|j| j.kind == JobKind::Link).unwrap();
        assert!(link
            .inputs
            .iter()
            .any(|i| i.file.path_string().ends_with("-wrapped.o")));
    }

    #[test]
    fn bridging_header_plans_a_pch_job() {
        let (_, jobs) = plan(&[
            "swiftc",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-import-objc-header",
            "App-Bridging.h",
            "a.swift",
        ]);
        assert_eq!(jobs[0].kind, JobKind::GeneratePch);
        assert_eq!(jobs[0].outputs[0].file_type, FileType::Pch);
    }

    #[test]
    fn version_request_with_no_inputs() {
        let (_, jobs) = plan(&["swiftc", "-version"]);
        assert_eq!(jobs.len(), 1);
        assert_eq!(jobs[0].kind, JobKind::VersionRequest);
    }

    #[test]
    fn library_link_names_follow_platform() {
        let (_, jobs) = plan(&[
            "swiftc",
            "-emit-library",
            "-target",
            "x86_64-unknown-linux-gnu",
            "-module-name",
            "Zoo",
            "a.swift",
        ]);
        let link = jobs.iter().find(|j| j.kind == JobKind::Link).unwrap();
        assert_eq!(link.outputs[0].file.path_string(), "libZoo.so");
    }
}
