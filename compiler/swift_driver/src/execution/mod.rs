//! Jobs and the executor capability.
//!
//! The driver plans [`Job`]s; something else runs them. That something is
//! any implementation of [`DriverExecutor`]. The built-in
//! [`SubprocessExecutor`] is a deliberately small one: synchronous capture
//! for the target-info sub-invocation, in-place execution for single jobs,
//! and a bounded thread loop for everything else.

mod executor;
mod incremental;
mod job;

pub use executor::{DriverExecutor, ExecutionPolicy, ProcessOutput, SubprocessExecutor, Workload};
pub use incremental::IncrementalCompilationState;
pub use job::{Job, JobKind};
