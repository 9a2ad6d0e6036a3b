//! Toolchains.
//!
//! A toolchain knows where platform pieces live: the frontend executable,
//! the default SDK, sanitizer runtime libraries. Selection is by target
//! triple OS family; the capability set is a closed enum, dispatched with
//! plain matches.

pub mod target_info;

use std::path::{Path, PathBuf};

use crate::error::DriverError;
use crate::execution::{Job, JobKind};
use crate::sanitizer::Sanitizer;
use crate::triple::{OsFamily, Triple};
use crate::virtual_path::VirtualPath;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toolchain {
    Darwin,
    GenericUnix,
    WebAssembly,
}

impl Toolchain {
    /// Pick the toolchain for a target triple. Windows is recognized but has
    /// no toolchain here; unknown OSes are rejected outright.
    pub fn for_triple(triple: &Triple) -> Result<Toolchain, DriverError> {
        match triple.os_family() {
            OsFamily::Darwin => Ok(Toolchain::Darwin),
            OsFamily::Linux | OsFamily::FreeBsd | OsFamily::Haiku => Ok(Toolchain::GenericUnix),
            OsFamily::Wasi => Ok(Toolchain::WebAssembly),
            OsFamily::Windows | OsFamily::Unknown => {
                Err(DriverError::UnsupportedTarget(triple.to_string()))
            }
        }
    }

    /// The frontend executable's basename.
    pub fn frontend_executable(self) -> &'static str {
        "swift-frontend"
    }

    /// Where the frontend lives: the override, the tools directory, or the
    /// bare name for PATH lookup.
    pub fn frontend_path(self, tools_directory: Option<&Path>) -> VirtualPath {
        match tools_directory {
            Some(dir) => VirtualPath::Absolute(dir.join(self.frontend_executable())),
            None => VirtualPath::Relative(PathBuf::from(self.frontend_executable())),
        }
    }

    /// The platform's default SDK, consulted only for immediate/REPL runs.
    pub fn default_sdk_path(self) -> Option<PathBuf> {
        match self {
            Toolchain::Darwin => {
                let output = std::process::Command::new("xcrun")
                    .args(["--sdk", "macosx", "--show-sdk-path"])
                    .output()
                    .ok()?;
                if !output.status.success() {
                    return None;
                }
                let path = String::from_utf8_lossy(&output.stdout).trim().to_string();
                if path.is_empty() {
                    None
                } else {
                    Some(PathBuf::from(path))
                }
            }
            Toolchain::GenericUnix | Toolchain::WebAssembly => None,
        }
    }

    /// Whether the compiler-rt runtime for `sanitizer` exists for `triple`
    /// under `resource_dir`.
    pub fn runtime_library_exists(
        self,
        sanitizer: Sanitizer,
        triple: &Triple,
        resource_dir: Option<&Path>,
    ) -> bool {
        let Some(resource_dir) = resource_dir else {
            return false;
        };
        let clang_lib = resource_dir.join("clang").join("lib");
        let library = match self {
            Toolchain::Darwin => clang_lib.join("darwin").join(format!(
                "libclang_rt.{}_{}_dynamic.dylib",
                sanitizer.library_name(),
                darwin_library_os(triple),
            )),
            Toolchain::GenericUnix => clang_lib.join(triple.os_name()).join(format!(
                "libclang_rt.{}-{}.a",
                sanitizer.library_name(),
                triple.arch,
            )),
            Toolchain::WebAssembly => clang_lib.join("wasi").join(format!(
                "libclang_rt.{}-{}.a",
                sanitizer.library_name(),
                triple.arch,
            )),
        };
        library.exists()
    }

    /// The one-shot job that asks the frontend to describe the target.
    #[allow(clippy::too_many_arguments)]
    pub fn print_target_info_job(
        self,
        frontend: &VirtualPath,
        frontend_prefix_args: &[String],
        target: &Triple,
        target_variant: Option<&Triple>,
        sdk_path: Option<&str>,
        resource_dir: Option<&str>,
        runtime_compatibility_version: Option<&str>,
        use_static_resource_dir: bool,
    ) -> Job {
        let mut command_line: Vec<String> = frontend_prefix_args.to_vec();
        command_line.push("-frontend".to_string());
        command_line.push("-print-target-info".to_string());
        command_line.push("-target".to_string());
        command_line.push(target.to_string());
        if let Some(variant) = target_variant {
            command_line.push("-target-variant".to_string());
            command_line.push(variant.to_string());
        }
        if let Some(sdk) = sdk_path {
            command_line.push("-sdk".to_string());
            command_line.push(sdk.to_string());
        }
        if let Some(dir) = resource_dir {
            command_line.push("-resource-dir".to_string());
            command_line.push(dir.to_string());
        }
        if let Some(version) = runtime_compatibility_version {
            command_line.push("-runtime-compatibility-version".to_string());
            command_line.push(version.to_string());
        }
        if use_static_resource_dir {
            command_line.push("-use-static-resource-dir".to_string());
        }
        Job {
            kind: JobKind::PrintTargetInfo,
            tool: frontend.clone(),
            command_line,
            inputs: Vec::new(),
            primary_inputs: Vec::new(),
            outputs: Vec::new(),
            requires_in_place_execution: false,
        }
    }
}

/// The OS token inside Darwin compiler-rt library names.
fn darwin_library_os(triple: &Triple) -> &'static str {
    match triple.os_name() {
        "ios" => {
            if triple.is_simulator() {
                "iossim"
            } else {
                "ios"
            }
        }
        "tvos" => "tvos",
        "watchos" => "watchos",
        _ => "osx",
    }
}
