//! Sanitizer kinds.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Sanitizer {
    Address,
    Thread,
    Undefined,
    Scudo,
    Fuzzer,
}

impl Sanitizer {
    /// Parse a `-sanitize=` value.
    pub fn parse(name: &str) -> Option<Sanitizer> {
        match name {
            "address" => Some(Sanitizer::Address),
            "thread" => Some(Sanitizer::Thread),
            "undefined" => Some(Sanitizer::Undefined),
            "scudo" => Some(Sanitizer::Scudo),
            "fuzzer" => Some(Sanitizer::Fuzzer),
            _ => None,
        }
    }

    /// The user-facing spelling.
    pub fn name(self) -> &'static str {
        match self {
            Sanitizer::Address => "address",
            Sanitizer::Thread => "thread",
            Sanitizer::Undefined => "undefined",
            Sanitizer::Scudo => "scudo",
            Sanitizer::Fuzzer => "fuzzer",
        }
    }

    /// The short name used in runtime library file names.
    pub fn library_name(self) -> &'static str {
        match self {
            Sanitizer::Address => "asan",
            Sanitizer::Thread => "tsan",
            Sanitizer::Undefined => "ubsan",
            Sanitizer::Scudo => "scudo",
            Sanitizer::Fuzzer => "fuzzer",
        }
    }
}

impl fmt::Display for Sanitizer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
