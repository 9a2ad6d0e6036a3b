//! Response file (`@file`) expansion.
//!
//! Every `@path` argument is replaced in place by the tokenized contents of
//! that file, recursively. A file that is already being expanded further up
//! the stack triggers one warning per re-entry and is skipped.

use std::fs;
use std::path::{Path, PathBuf};

use rustc_hash::FxHashSet;
use swift_diagnostic::DiagnosticEngine;
use tracing::debug;

/// Expand all `@file` arguments in `args`. Relative `@` paths are resolved
/// against the current working directory; arguments whose file cannot be
/// read are kept verbatim with a warning.
pub fn expand_response_files(args: Vec<String>, diagnostics: &DiagnosticEngine) -> Vec<String> {
    let mut visited = FxHashSet::default();
    let mut expanded = Vec::with_capacity(args.len());
    expand_into(args, diagnostics, &mut visited, &mut expanded);
    expanded
}

fn expand_into(
    args: Vec<String>,
    diagnostics: &DiagnosticEngine,
    visited: &mut FxHashSet<PathBuf>,
    out: &mut Vec<String>,
) {
    for arg in args {
        let Some(file) = arg.strip_prefix('@') else {
            out.push(arg);
            continue;
        };

        let path = absolute(Path::new(file));
        let Some(path) = path else {
            // No way to resolve it; leave the argument alone.
            out.push(arg);
            continue;
        };

        if visited.contains(&path) {
            diagnostics.warning(format!("response file '{}' is recursive", path.display()));
            continue;
        }

        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(err) => {
                diagnostics.warning(format!(
                    "unable to read response file '{}': {err}",
                    path.display()
                ));
                out.push(arg);
                continue;
            }
        };

        debug!(path = %path.display(), "expanding response file");
        visited.insert(path.clone());
        expand_into(tokenize(&contents), diagnostics, visited, out);
        visited.remove(&path);
    }
}

fn absolute(path: &Path) -> Option<PathBuf> {
    if path.is_absolute() {
        return Some(path.to_path_buf());
    }
    std::env::current_dir().ok().map(|cwd| cwd.join(path))
}

/// Tokenize response file contents.
///
/// Rules, per line: lines beginning with `//` are comments; `\` escapes the
/// next character; matched `'` or `"` enter a quoted mode where whitespace
/// is literal; otherwise unescaped whitespace separates tokens.
fn tokenize(contents: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    for line in contents.split(['\n', '\r']) {
        if line.starts_with("//") {
            continue;
        }
        let mut current = String::new();
        let mut in_quote: Option<char> = None;
        let mut escaped = false;
        for ch in line.chars() {
            if escaped {
                current.push(ch);
                escaped = false;
                continue;
            }
            match ch {
                '\\' => escaped = true,
                '\'' | '"' => match in_quote {
                    Some(q) if q == ch => in_quote = None,
                    Some(_) => current.push(ch),
                    None => in_quote = Some(ch),
                },
                c if c.is_whitespace() && in_quote.is_none() => {
                    if !current.is_empty() {
                        tokens.push(std::mem::take(&mut current));
                    }
                }
                c => current.push(c),
            }
        }
        if !current.is_empty() {
            tokens.push(current);
        }
    }
    tokens
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use swift_diagnostic::StoredDiagnosticConsumer;

    use super::*;

    fn engine() -> (DiagnosticEngine, Rc<StoredDiagnosticConsumer>) {
        let stored = StoredDiagnosticConsumer::new();
        (DiagnosticEngine::new(stored.clone()), stored)
    }

    fn strings(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| (*s).to_string()).collect()
    }

    #[test]
    fn tokenizer_rules() {
        let tokens = tokenize("\"foo bar\"\n-Dflag\n// ignored\nlast\\ arg");
        assert_eq!(tokens, vec!["foo bar", "-Dflag", "last arg"]);
    }

    #[test]
    fn tokenizer_quotes_and_escapes() {
        assert_eq!(tokenize("a 'b c' d"), vec!["a", "b c", "d"]);
        assert_eq!(tokenize("mixed'quo ted'token"), vec!["mixedquo tedtoken"]);
        assert_eq!(tokenize("a\\\\b"), vec!["a\\b"]);
        assert_eq!(tokenize("'\"' \"'\""), vec!["\"", "'"]);
    }

    #[test]
    fn tokenizer_splits_crlf() {
        assert_eq!(tokenize("a\r\nb\rc"), vec!["a", "b", "c"]);
    }

    #[test]
    fn expansion_inlines_file_contents() {
        let dir = tempfile::tempdir().unwrap();
        let rsp = dir.path().join("r.rsp");
        fs::write(&rsp, "\"foo bar\"\n-Dflag\n// ignored\nlast\\ arg").unwrap();

        let (diags, _) = engine();
        let args = expand_response_files(
            strings(&["swiftc", &format!("@{}", rsp.display())]),
            &diags,
        );
        assert_eq!(args, strings(&["swiftc", "foo bar", "-Dflag", "last arg"]));
    }

    #[test]
    fn expansion_is_recursive() {
        let dir = tempfile::tempdir().unwrap();
        let outer = dir.path().join("outer.rsp");
        let inner = dir.path().join("inner.rsp");
        fs::write(&outer, format!("-a @{} -c", inner.display())).unwrap();
        fs::write(&inner, "-b").unwrap();

        let (diags, _) = engine();
        let args = expand_response_files(strings(&[&format!("@{}", outer.display())]), &diags);
        assert_eq!(args, strings(&["-a", "-b", "-c"]));
    }

    #[test]
    fn cycles_warn_once_per_reentry_and_terminate() {
        let dir = tempfile::tempdir().unwrap();
        let a = dir.path().join("a.rsp");
        let b = dir.path().join("b.rsp");
        fs::write(&a, format!("-a @{}", b.display())).unwrap();
        fs::write(&b, format!("-b @{}", a.display())).unwrap();

        let (diags, stored) = engine();
        let args = expand_response_files(strings(&[&format!("@{}", a.display())]), &diags);
        assert_eq!(args, strings(&["-a", "-b"]));
        let warnings = stored.diagnostics();
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].message.contains("recursive"));
    }

    #[test]
    fn sibling_uses_of_one_file_both_expand() {
        // The same file used twice on non-overlapping paths is not a cycle.
        let dir = tempfile::tempdir().unwrap();
        let shared = dir.path().join("shared.rsp");
        fs::write(&shared, "-x").unwrap();

        let (diags, stored) = engine();
        let at = format!("@{}", shared.display());
        let args = expand_response_files(strings(&[&at, &at]), &diags);
        assert_eq!(args, strings(&["-x", "-x"]));
        assert!(stored.diagnostics().is_empty());
    }

    #[test]
    fn unreadable_file_is_kept_verbatim() {
        let (diags, stored) = engine();
        let args = expand_response_files(strings(&["@/no/such/file.rsp"]), &diags);
        assert_eq!(args, strings(&["@/no/such/file.rsp"]));
        assert!(stored.contains_message("unable to read response file"));
    }
}
