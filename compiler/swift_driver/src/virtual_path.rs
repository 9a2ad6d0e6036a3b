//! Logical paths.
//!
//! The driver plans against *virtual* paths: real absolute or relative
//! locations, temporaries that an executor materializes later, the standard
//! streams, and two planner-reserved cases (`FileList`,
//! `TemporaryWithKnownContents`). A `Temporary` always carries a relative
//! path; wherever it ends up on disk is the executor's business.

use std::fmt;
use std::path::{Path, PathBuf};

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::DriverError;
use crate::file_type::FileType;

/// Serialization format version for [`VirtualPath`].
const ENCODING_VERSION: u8 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum VirtualPath {
    Absolute(PathBuf),
    Relative(PathBuf),
    /// Materialized by the executor; the path is relative to a directory the
    /// executor chooses.
    Temporary(PathBuf),
    /// A temporary whose contents the planner already knows.
    TemporaryWithKnownContents(PathBuf, Vec<u8>),
    /// A response-file style list of other paths.
    FileList(PathBuf, Vec<VirtualPath>),
    StandardInput,
    StandardOutput,
}

impl VirtualPath {
    /// Build from a user-supplied string: absolute if the string is an
    /// absolute path, relative otherwise.
    pub fn from_string(s: &str) -> VirtualPath {
        let path = PathBuf::from(s);
        if path.is_absolute() {
            VirtualPath::Absolute(path)
        } else {
            VirtualPath::Relative(path)
        }
    }

    /// The underlying path, for every case that has one.
    fn path(&self) -> Option<&Path> {
        match self {
            VirtualPath::Absolute(p)
            | VirtualPath::Relative(p)
            | VirtualPath::Temporary(p)
            | VirtualPath::TemporaryWithKnownContents(p, _)
            | VirtualPath::FileList(p, _) => Some(p),
            VirtualPath::StandardInput | VirtualPath::StandardOutput => None,
        }
    }

    /// Extension without the dot, if any. The standard streams have none.
    pub fn extension(&self) -> Option<String> {
        self.path()?
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
    }

    /// Final path component without its extension.
    pub fn basename_without_ext(&self) -> Option<String> {
        self.path()?
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
    }

    pub fn is_temporary(&self) -> bool {
        matches!(
            self,
            VirtualPath::Temporary(_) | VirtualPath::TemporaryWithKnownContents(_, _)
        )
    }

    /// The concrete path, only when the case is `Absolute`.
    pub fn absolute_path(&self) -> Option<&Path> {
        match self {
            VirtualPath::Absolute(p) => Some(p),
            _ => None,
        }
    }

    /// The containing directory, staying in the same case. `None` for the
    /// standard streams and for paths with no parent.
    pub fn parent_directory(&self) -> Option<VirtualPath> {
        let parent = self.path()?.parent()?.to_path_buf();
        Some(match self {
            VirtualPath::Absolute(_) => VirtualPath::Absolute(parent),
            VirtualPath::Relative(_) => VirtualPath::Relative(parent),
            VirtualPath::FileList(_, _) => {
                if parent.is_absolute() {
                    VirtualPath::Absolute(parent)
                } else {
                    VirtualPath::Relative(parent)
                }
            }
            VirtualPath::Temporary(_) | VirtualPath::TemporaryWithKnownContents(_, _) => {
                VirtualPath::Temporary(parent)
            }
            VirtualPath::StandardInput | VirtualPath::StandardOutput => unreachable!(),
        })
    }

    /// The rendered path. The standard streams render as `-`.
    pub fn path_string(&self) -> String {
        match self.path() {
            Some(p) => p.to_string_lossy().into_owned(),
            None => "-".to_string(),
        }
    }

    /// Append a literal component. Appending to a standard stream is a
    /// programmer error, surfaced as a `DriverError` rather than a panic.
    pub fn appending(&self, component: &str) -> Result<VirtualPath, DriverError> {
        let rebuilt = |p: &Path| p.join(component);
        match self {
            VirtualPath::Absolute(p) => Ok(VirtualPath::Absolute(rebuilt(p))),
            VirtualPath::Relative(p) => Ok(VirtualPath::Relative(rebuilt(p))),
            VirtualPath::Temporary(p) => Ok(VirtualPath::Temporary(rebuilt(p))),
            VirtualPath::TemporaryWithKnownContents(p, contents) => Ok(
                VirtualPath::TemporaryWithKnownContents(rebuilt(p), contents.clone()),
            ),
            VirtualPath::FileList(p, entries) => {
                Ok(VirtualPath::FileList(rebuilt(p), entries.clone()))
            }
            VirtualPath::StandardInput | VirtualPath::StandardOutput => {
                Err(DriverError::InvalidVirtualPathOperation(format!(
                    "cannot append '{component}' to a standard stream"
                )))
            }
        }
    }

    /// Replace the extension with the one belonging to `file_type`.
    pub fn replacing_extension(&self, file_type: FileType) -> Result<VirtualPath, DriverError> {
        let path = self.path().ok_or_else(|| {
            DriverError::InvalidVirtualPathOperation(
                "cannot replace the extension of a standard stream".to_string(),
            )
        })?;
        let rebuilt = path.with_extension(file_type.extension());
        Ok(match self {
            VirtualPath::Absolute(_) => VirtualPath::Absolute(rebuilt),
            VirtualPath::Relative(_) => VirtualPath::Relative(rebuilt),
            VirtualPath::Temporary(_) => VirtualPath::Temporary(rebuilt),
            VirtualPath::TemporaryWithKnownContents(_, contents) => {
                VirtualPath::TemporaryWithKnownContents(rebuilt, contents.clone())
            }
            VirtualPath::FileList(_, entries) => VirtualPath::FileList(rebuilt, entries.clone()),
            VirtualPath::StandardInput | VirtualPath::StandardOutput => unreachable!(),
        })
    }

    /// Rebase a relative path under `directory`, leaving every other case
    /// alone. Temporaries are deliberately untouched.
    pub fn resolved_relative_to(&self, directory: &Path) -> VirtualPath {
        match self {
            VirtualPath::Relative(p) => VirtualPath::Absolute(directory.join(p)),
            other => other.clone(),
        }
    }
}

impl fmt::Display for VirtualPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path_string())
    }
}

/// Wire representation: a versioned, tagged record. Payload paths are
/// strings so the encoding is identical on every platform.
#[derive(Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
enum PathRepr {
    Absolute { path: String },
    Relative { path: String },
    Temporary { path: String },
    TemporaryWithKnownContents { path: String, contents: Vec<u8> },
    FileList { path: String, entries: Vec<VirtualPath> },
    StandardInput,
    StandardOutput,
}

#[derive(Serialize, Deserialize)]
struct VersionedPath {
    v: u8,
    #[serde(flatten)]
    repr: PathRepr,
}

impl Serialize for VirtualPath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let repr = match self {
            VirtualPath::Absolute(p) => PathRepr::Absolute {
                path: p.to_string_lossy().into_owned(),
            },
            VirtualPath::Relative(p) => PathRepr::Relative {
                path: p.to_string_lossy().into_owned(),
            },
            VirtualPath::Temporary(p) => PathRepr::Temporary {
                path: p.to_string_lossy().into_owned(),
            },
            VirtualPath::TemporaryWithKnownContents(p, contents) => {
                PathRepr::TemporaryWithKnownContents {
                    path: p.to_string_lossy().into_owned(),
                    contents: contents.clone(),
                }
            }
            VirtualPath::FileList(p, entries) => PathRepr::FileList {
                path: p.to_string_lossy().into_owned(),
                entries: entries.clone(),
            },
            VirtualPath::StandardInput => PathRepr::StandardInput,
            VirtualPath::StandardOutput => PathRepr::StandardOutput,
        };
        VersionedPath {
            v: ENCODING_VERSION,
            repr,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for VirtualPath {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let versioned = VersionedPath::deserialize(deserializer)?;
        if versioned.v != ENCODING_VERSION {
            return Err(D::Error::custom(format!(
                "unsupported virtual path encoding version {}",
                versioned.v
            )));
        }
        Ok(match versioned.repr {
            PathRepr::Absolute { path } => VirtualPath::Absolute(PathBuf::from(path)),
            PathRepr::Relative { path } => VirtualPath::Relative(PathBuf::from(path)),
            PathRepr::Temporary { path } => VirtualPath::Temporary(PathBuf::from(path)),
            PathRepr::TemporaryWithKnownContents { path, contents } => {
                VirtualPath::TemporaryWithKnownContents(PathBuf::from(path), contents)
            }
            PathRepr::FileList { path, entries } => {
                VirtualPath::FileList(PathBuf::from(path), entries)
            }
            PathRepr::StandardInput => VirtualPath::StandardInput,
            PathRepr::StandardOutput => VirtualPath::StandardOutput,
        })
    }
}

/// A path plus what kind of file lives there.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TypedVirtualPath {
    pub file: VirtualPath,
    pub file_type: FileType,
}

impl TypedVirtualPath {
    pub fn new(file: VirtualPath, file_type: FileType) -> Self {
        TypedVirtualPath { file, file_type }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn construction_classifies_absolute() {
        assert!(matches!(
            VirtualPath::from_string("/usr/bin/swift"),
            VirtualPath::Absolute(_)
        ));
        assert!(matches!(
            VirtualPath::from_string("a.swift"),
            VirtualPath::Relative(_)
        ));
    }

    #[test]
    fn standard_streams_have_no_structure() {
        assert_eq!(VirtualPath::StandardInput.extension(), None);
        assert_eq!(VirtualPath::StandardOutput.parent_directory(), None);
        assert_eq!(VirtualPath::StandardInput.path_string(), "-");
        assert!(VirtualPath::StandardOutput.appending("x").is_err());
        assert!(VirtualPath::StandardInput
            .replacing_extension(FileType::Object)
            .is_err());
    }

    #[test]
    fn extension_rewrite_keeps_case() {
        let p = VirtualPath::from_string("build/foo.swift")
            .replacing_extension(FileType::Object)
            .unwrap();
        assert_eq!(p, VirtualPath::Relative(PathBuf::from("build/foo.o")));

        let t = VirtualPath::Temporary(PathBuf::from("foo.swiftmodule"))
            .replacing_extension(FileType::SwiftDocumentation)
            .unwrap();
        assert!(t.is_temporary());
        assert_eq!(t.path_string(), "foo.swiftdoc");
    }

    #[test]
    fn temporary_survives_rebase() {
        let t = VirtualPath::Temporary(PathBuf::from("x.o"));
        assert_eq!(t.resolved_relative_to(Path::new("/w")), t);

        let r = VirtualPath::Relative(PathBuf::from("x.o"));
        assert_eq!(
            r.resolved_relative_to(Path::new("/w")),
            VirtualPath::Absolute(PathBuf::from("/w/x.o"))
        );
    }

    #[test]
    fn encode_decode_is_identity_on_every_case() {
        let cases = vec![
            VirtualPath::Absolute(PathBuf::from("/a/b.swift")),
            VirtualPath::Relative(PathBuf::from("b.swift")),
            VirtualPath::Temporary(PathBuf::from("sources-1234")),
            VirtualPath::TemporaryWithKnownContents(PathBuf::from("args"), b"abc".to_vec()),
            VirtualPath::FileList(
                PathBuf::from("list"),
                vec![VirtualPath::Relative(PathBuf::from("x.o"))],
            ),
            VirtualPath::StandardInput,
            VirtualPath::StandardOutput,
        ];
        for case in cases {
            let encoded = serde_json::to_string(&case).unwrap();
            let decoded: VirtualPath = serde_json::from_str(&encoded).unwrap();
            assert_eq!(decoded, case, "round trip failed for {encoded}");
        }
    }

    #[test]
    fn decode_rejects_future_versions() {
        let err = serde_json::from_str::<VirtualPath>(r#"{"v":9,"kind":"standard-input"}"#);
        assert!(err.is_err());
    }
}
