//! The output file map.
//!
//! A declarative side table, loaded from JSON, mapping `(input path,
//! output type)` to a concrete path. The empty input key holds outputs for
//! the whole module in single-compilation modes.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use rustc_hash::FxHashMap;

use crate::error::DriverError;
use crate::file_type::FileType;
use crate::virtual_path::VirtualPath;

/// Key used for whole-module outputs.
const SINGLE_INPUT_KEY: &str = "";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct OutputFileMap {
    /// Input path → (output type → path). `BTreeMap` keeps dumps ordered.
    entries: BTreeMap<String, FxHashMap<FileType, VirtualPath>>,
}

impl OutputFileMap {
    /// Load from a JSON file: an object keyed by input path, each value an
    /// object keyed by output-type tag.
    pub fn load(path: &Path) -> Result<OutputFileMap, DriverError> {
        let fail = |reason: String| DriverError::UnableToLoadOutputFileMap {
            path: path.display().to_string(),
            reason,
        };

        let contents = fs::read_to_string(path).map_err(|e| fail(e.to_string()))?;
        let raw: BTreeMap<String, BTreeMap<String, String>> =
            serde_json::from_str(&contents).map_err(|e| fail(e.to_string()))?;

        let mut entries = BTreeMap::new();
        for (input, outputs) in raw {
            let mut typed = FxHashMap::default();
            for (tag, output_path) in outputs {
                let file_type = FileType::from_name(&tag)
                    .ok_or_else(|| fail(format!("unknown output type '{tag}'")))?;
                typed.insert(file_type, VirtualPath::from_string(&output_path));
            }
            entries.insert(input, typed);
        }
        Ok(OutputFileMap { entries })
    }

    /// The mapped output for `(input, output_type)`, if the map has one.
    pub fn existing_output(
        &self,
        input: &VirtualPath,
        output_type: FileType,
    ) -> Option<&VirtualPath> {
        self.entries
            .get(&input.path_string())
            .and_then(|outputs| outputs.get(&output_type))
    }

    /// The whole-module output for `output_type`, if the map has one.
    pub fn existing_output_for_single_input(&self, output_type: FileType) -> Option<&VirtualPath> {
        self.entries
            .get(SINGLE_INPUT_KEY)
            .and_then(|outputs| outputs.get(&output_type))
    }

    /// Rebase every relative path (keys and values) under `directory`.
    /// Pure, and idempotent: rebasing an already-rebased map is a no-op
    /// because every path is absolute afterwards. The single-input key is
    /// untouched.
    #[must_use]
    pub fn resolve_relative_paths(&self, directory: &Path) -> OutputFileMap {
        let entries = self
            .entries
            .iter()
            .map(|(input, outputs)| {
                let key = if input == SINGLE_INPUT_KEY {
                    input.clone()
                } else {
                    VirtualPath::from_string(input)
                        .resolved_relative_to(directory)
                        .path_string()
                };
                let values = outputs
                    .iter()
                    .map(|(ty, path)| (*ty, path.resolved_relative_to(directory)))
                    .collect();
                (key, values)
            })
            .collect();
        OutputFileMap { entries }
    }

    /// Render for `-driver-print-output-file-map`: one `input -> type: path`
    /// line per entry, deterministically ordered.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        for (input, outputs) in &self.entries {
            let mut lines: Vec<(&'static str, String)> = outputs
                .iter()
                .map(|(ty, path)| (ty.name(), path.path_string()))
                .collect();
            lines.sort();
            for (tag, path) in lines {
                out.push_str(&format!("{input} -> {tag}: \"{path}\"\n"));
            }
        }
        out
    }
}
