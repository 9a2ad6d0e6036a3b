//! The build record.
//!
//! A small JSON document written after an incremental-capable build: which
//! options produced it, when it started, and per input its modification
//! time and whether the incremental engine skipped it. The next build's
//! incremental state engine reads it back.

use std::collections::BTreeMap;
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::DriverError;
use crate::virtual_path::TypedVirtualPath;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecordInput {
    /// Seconds and nanoseconds since the epoch.
    pub mtime: (u64, u32),
    pub skipped: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildRecord {
    /// The compiler version that produced this record.
    pub version: String,
    /// Hash of the argument list; a mismatch invalidates the record.
    pub options_hash: String,
    /// Build start, seconds and nanoseconds since the epoch.
    pub build_start_time: (u64, u32),
    /// Input path → state at the start of the build.
    pub inputs: BTreeMap<String, BuildRecordInput>,
}

impl BuildRecord {
    pub fn new(
        version: &str,
        args: &[String],
        build_start_time: SystemTime,
        recorded_input_mtimes: &[(TypedVirtualPath, SystemTime)],
        skipped_inputs: &[TypedVirtualPath],
    ) -> BuildRecord {
        let inputs = recorded_input_mtimes
            .iter()
            .map(|(input, mtime)| {
                (
                    input.file.path_string(),
                    BuildRecordInput {
                        mtime: split_time(*mtime),
                        skipped: skipped_inputs.contains(input),
                    },
                )
            })
            .collect();
        BuildRecord {
            version: version.to_string(),
            options_hash: options_hash(args),
            build_start_time: split_time(build_start_time),
            inputs,
        }
    }

    pub fn write_to(&self, path: &Path) -> Result<(), DriverError> {
        let io_error = |e: std::io::Error| DriverError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).map_err(io_error)?;
            }
        }
        let rendered = serde_json::to_string_pretty(self).map_err(|e| DriverError::Io {
            path: path.display().to_string(),
            error: e.to_string(),
        })?;
        fs::write(path, rendered).map_err(io_error)
    }
}

fn split_time(time: SystemTime) -> (u64, u32) {
    match time.duration_since(UNIX_EPOCH) {
        Ok(duration) => (duration.as_secs(), duration.subsec_nanos()),
        Err(_) => (0, 0),
    }
}

fn options_hash(args: &[String]) -> String {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    for arg in args {
        arg.hash(&mut hasher);
    }
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use crate::file_type::FileType;
    use crate::virtual_path::VirtualPath;

    use super::*;

    fn input(path: &str) -> TypedVirtualPath {
        TypedVirtualPath::new(
            VirtualPath::Relative(PathBuf::from(path)),
            FileType::Swift,
        )
    }

    #[test]
    fn record_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let record_path = dir.path().join("build/record.json");

        let a = input("a.swift");
        let b = input("b.swift");
        let record = BuildRecord::new(
            "Swift version 5.5",
            &["a.swift".to_string(), "-c".to_string()],
            SystemTime::now(),
            &[(a.clone(), SystemTime::now()), (b.clone(), SystemTime::now())],
            &[b],
        );
        record.write_to(&record_path).unwrap();

        let reread: BuildRecord =
            serde_json::from_str(&fs::read_to_string(&record_path).unwrap()).unwrap();
        assert_eq!(reread.version, "Swift version 5.5");
        assert!(!reread.inputs["a.swift"].skipped);
        assert!(reread.inputs["b.swift"].skipped);
        assert_eq!(reread.options_hash, record.options_hash);
    }

    #[test]
    fn options_hash_is_stable_and_sensitive() {
        let args1 = vec!["a".to_string(), "b".to_string()];
        let args2 = vec!["a".to_string(), "c".to_string()];
        assert_eq!(options_hash(&args1), options_hash(&args1));
        assert_ne!(options_hash(&args1), options_hash(&args2));
    }
}
