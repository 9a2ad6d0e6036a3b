//! Classifying positional inputs.

use swift_options::{OptId, ParsedOptions};

use crate::file_type::FileType;
use crate::virtual_path::{TypedVirtualPath, VirtualPath};

/// Turn every positional argument into a typed virtual path. `-` is
/// standard input read as Swift source; unknown extensions are linker
/// fodder and default to objects.
pub fn collect_inputs(parsed: &mut ParsedOptions) -> Vec<TypedVirtualPath> {
    parsed
        .arguments(OptId::Input)
        .into_iter()
        .filter_map(|opt| opt.value().map(str::to_string))
        .map(|value| {
            if value == "-" {
                return TypedVirtualPath::new(VirtualPath::StandardInput, FileType::Swift);
            }
            let file = VirtualPath::from_string(&value);
            let file_type = file
                .extension()
                .and_then(|ext| FileType::from_extension(&ext))
                .unwrap_or(FileType::Object);
            TypedVirtualPath::new(file, file_type)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inputs_for(args: &[&str]) -> Vec<TypedVirtualPath> {
        let strings: Vec<String> = args.iter().map(|s| (*s).to_string()).collect();
        let mut parsed = ParsedOptions::parse(&strings).unwrap();
        collect_inputs(&mut parsed)
    }

    #[test]
    fn classification_by_extension() {
        let inputs = inputs_for(&["a.swift", "b.o", "c.sil", "libz.dylib"]);
        assert_eq!(inputs[0].file_type, FileType::Swift);
        assert_eq!(inputs[1].file_type, FileType::Object);
        assert_eq!(inputs[2].file_type, FileType::Sil);
        // Unknown extension defaults to object.
        assert_eq!(inputs[3].file_type, FileType::Object);
    }

    #[test]
    fn stdin_is_swift_source() {
        let inputs = inputs_for(&["-"]);
        assert_eq!(inputs[0].file, VirtualPath::StandardInput);
        assert_eq!(inputs[0].file_type, FileType::Swift);
    }

    #[test]
    fn relative_inputs_stay_relative() {
        let inputs = inputs_for(&["sub/a.swift"]);
        assert!(matches!(inputs[0].file, VirtualPath::Relative(_)));
    }
}
