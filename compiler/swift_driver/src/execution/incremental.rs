//! Opaque handle to the incremental-compilation state engine.

use crate::virtual_path::TypedVirtualPath;

/// What the incremental engine decided about this build. The driver never
/// looks inside beyond the skipped-input list it forwards to the build
/// record.
#[derive(Debug, Clone, Default)]
pub struct IncrementalCompilationState {
    /// Inputs the engine proved unchanged; their jobs are not run.
    pub skipped_inputs: Vec<TypedVirtualPath>,
}

impl IncrementalCompilationState {
    pub fn new() -> Self {
        Self::default()
    }
}
