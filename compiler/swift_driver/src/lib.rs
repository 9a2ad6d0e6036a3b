//! The Swift compiler driver's invocation-to-plan pipeline.
//!
//! A [`Driver`] is built once per invocation: response files expand, options
//! parse into a consumption-tracked bag, the invocation classifies itself,
//! the frontend answers a target-info query, and the planners derive the
//! module plan, every supplementary output, and the execution policy. The
//! result is handed jobs and run at most once.
//!
//! Out-of-scope collaborators (the full job planner, the process-graph
//! executor, the incremental state engine) are reached through the narrow
//! interfaces in [`execution`].

pub mod build_record;
pub mod driver;
pub mod error;
pub mod execution;
pub mod file_type;
pub mod output_file_map;
pub mod planning;
pub mod response_files;
pub mod sanitizer;
pub mod toolchain;
pub mod tracing_setup;
pub mod triple;
pub mod virtual_path;

pub use driver::debug::{DebugInfo, DebugInfoFormat, DebugInfoLevel};
pub use driver::invocation::{DriverKind, InvocationRunMode};
pub use driver::mode::{BatchModeInfo, CompilerMode};
pub use driver::module_output::{ModuleOutput, ModuleOutputInfo};
pub use driver::outputs::{LinkOutputType, LtoKind, SupplementaryOutputPaths};
pub use driver::Driver;
pub use error::DriverError;
pub use execution::{
    DriverExecutor, ExecutionPolicy, IncrementalCompilationState, Job, JobKind, ProcessOutput,
    SubprocessExecutor, Workload,
};
pub use file_type::FileType;
pub use output_file_map::OutputFileMap;
pub use sanitizer::Sanitizer;
pub use toolchain::target_info::FrontendTargetInfo;
pub use toolchain::Toolchain;
pub use triple::Triple;
pub use virtual_path::{TypedVirtualPath, VirtualPath};
