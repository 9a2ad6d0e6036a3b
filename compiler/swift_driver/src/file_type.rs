//! File types the driver plans around.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Everything the driver can consume or produce. Closed set; exhaustive
/// matching everywhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FileType {
    Swift,
    Object,
    LlvmBitcode,
    LlvmIr,
    Assembly,
    Sil,
    RawSil,
    Sib,
    RawSib,
    SwiftModule,
    SwiftDocumentation,
    SwiftSourceInfo,
    SwiftInterface,
    PrivateSwiftInterface,
    Pch,
    Ast,
    Pcm,
    ImportedModules,
    IndexData,
    Remap,
    Dependencies,
    Diagnostics,
    ObjcHeader,
    ModuleTrace,
    Tbd,
    YamlOptimizationRecord,
    BitstreamOptimizationRecord,
    JsonDependencies,
    JsonClangDependencies,
    /// A linked image (executable or library). Has no fixed extension.
    Image,
}

impl FileType {
    /// The tag used in output file maps, `-driver-print-actions`, and
    /// `-driver-print-bindings`.
    pub fn name(self) -> &'static str {
        match self {
            FileType::Swift => "swift",
            FileType::Object => "object",
            FileType::LlvmBitcode => "llvm-bc",
            FileType::LlvmIr => "llvm-ir",
            FileType::Assembly => "assembly",
            FileType::Sil => "sil",
            FileType::RawSil => "raw-sil",
            FileType::Sib => "sib",
            FileType::RawSib => "raw-sib",
            FileType::SwiftModule => "swiftmodule",
            FileType::SwiftDocumentation => "swiftdoc",
            FileType::SwiftSourceInfo => "swiftsourceinfo",
            FileType::SwiftInterface => "swiftinterface",
            FileType::PrivateSwiftInterface => "private-swiftinterface",
            FileType::Pch => "pch",
            FileType::Ast => "ast-dump",
            FileType::Pcm => "pcm",
            FileType::ImportedModules => "imported-modules",
            FileType::IndexData => "index-data",
            FileType::Remap => "remap",
            FileType::Dependencies => "dependencies",
            FileType::Diagnostics => "diagnostics",
            FileType::ObjcHeader => "objc-header",
            FileType::ModuleTrace => "module-trace",
            FileType::Tbd => "tbd",
            FileType::YamlOptimizationRecord => "yaml-opt-record",
            FileType::BitstreamOptimizationRecord => "bitstream-opt-record",
            FileType::JsonDependencies => "json-dependencies",
            FileType::JsonClangDependencies => "json-clang-dependencies",
            FileType::Image => "image",
        }
    }

    /// Inverse of [`FileType::name`], for output-file-map keys.
    pub fn from_name(name: &str) -> Option<FileType> {
        ALL.iter().copied().find(|ty| ty.name() == name)
    }

    /// The extension used when the driver synthesizes a path of this type.
    pub fn extension(self) -> &'static str {
        match self {
            FileType::Swift => "swift",
            FileType::Object => "o",
            FileType::LlvmBitcode => "bc",
            FileType::LlvmIr => "ll",
            FileType::Assembly => "s",
            FileType::Sil | FileType::RawSil => "sil",
            FileType::Sib | FileType::RawSib => "sib",
            FileType::SwiftModule => "swiftmodule",
            FileType::SwiftDocumentation => "swiftdoc",
            FileType::SwiftSourceInfo => "swiftsourceinfo",
            FileType::SwiftInterface => "swiftinterface",
            FileType::PrivateSwiftInterface => "private.swiftinterface",
            FileType::Pch => "pch",
            FileType::Ast => "ast",
            FileType::Pcm => "pcm",
            FileType::ImportedModules => "importedmodules",
            FileType::IndexData | FileType::Image => "",
            FileType::Remap => "remap",
            FileType::Dependencies => "d",
            FileType::Diagnostics => "dia",
            FileType::ObjcHeader => "h",
            FileType::ModuleTrace => "trace.json",
            FileType::Tbd => "tbd",
            FileType::YamlOptimizationRecord => "opt.yaml",
            FileType::BitstreamOptimizationRecord => "opt.bitstream",
            FileType::JsonDependencies => "dependencies.json",
            FileType::JsonClangDependencies => "clang-dependencies.json",
        }
    }

    /// Classify an input file by extension. Callers default unknown
    /// extensions to [`FileType::Object`] so linkable inputs pass through.
    pub fn from_extension(ext: &str) -> Option<FileType> {
        match ext {
            "swift" => Some(FileType::Swift),
            "o" => Some(FileType::Object),
            "bc" => Some(FileType::LlvmBitcode),
            "ll" => Some(FileType::LlvmIr),
            "s" => Some(FileType::Assembly),
            "sil" => Some(FileType::Sil),
            "sib" => Some(FileType::Sib),
            "swiftmodule" => Some(FileType::SwiftModule),
            "swiftdoc" => Some(FileType::SwiftDocumentation),
            "swiftsourceinfo" => Some(FileType::SwiftSourceInfo),
            "swiftinterface" => Some(FileType::SwiftInterface),
            "pch" => Some(FileType::Pch),
            "ast" => Some(FileType::Ast),
            "pcm" => Some(FileType::Pcm),
            "importedmodules" => Some(FileType::ImportedModules),
            "remap" => Some(FileType::Remap),
            "d" => Some(FileType::Dependencies),
            "dia" => Some(FileType::Diagnostics),
            "h" => Some(FileType::ObjcHeader),
            "tbd" => Some(FileType::Tbd),
            _ => None,
        }
    }

    /// True for inputs the frontend compiles (as opposed to linker fodder).
    pub fn is_part_of_swift_compilation(self) -> bool {
        matches!(
            self,
            FileType::Swift | FileType::Sil | FileType::Sib
        )
    }
}

const ALL: &[FileType] = &[
    FileType::Swift,
    FileType::Object,
    FileType::LlvmBitcode,
    FileType::LlvmIr,
    FileType::Assembly,
    FileType::Sil,
    FileType::RawSil,
    FileType::Sib,
    FileType::RawSib,
    FileType::SwiftModule,
    FileType::SwiftDocumentation,
    FileType::SwiftSourceInfo,
    FileType::SwiftInterface,
    FileType::PrivateSwiftInterface,
    FileType::Pch,
    FileType::Ast,
    FileType::Pcm,
    FileType::ImportedModules,
    FileType::IndexData,
    FileType::Remap,
    FileType::Dependencies,
    FileType::Diagnostics,
    FileType::ObjcHeader,
    FileType::ModuleTrace,
    FileType::Tbd,
    FileType::YamlOptimizationRecord,
    FileType::BitstreamOptimizationRecord,
    FileType::JsonDependencies,
    FileType::JsonClangDependencies,
    FileType::Image,
];

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_round_trips() {
        for ty in ALL {
            assert_eq!(FileType::from_name(ty.name()), Some(*ty));
        }
    }

    #[test]
    fn extension_classification() {
        assert_eq!(FileType::from_extension("swift"), Some(FileType::Swift));
        assert_eq!(FileType::from_extension("o"), Some(FileType::Object));
        assert_eq!(FileType::from_extension("dylib"), None);
    }

    #[test]
    fn compilation_membership() {
        assert!(FileType::Swift.is_part_of_swift_compilation());
        assert!(!FileType::Object.is_part_of_swift_compilation());
    }
}
