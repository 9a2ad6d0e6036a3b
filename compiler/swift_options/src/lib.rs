//! The driver's option table and parsed-option storage.
//!
//! The table is a flat static array of [`OptInfo`] records; parsing walks it
//! longest-spelling-first so that `-emit-module-path` is never mistaken for
//! `-emit-module` plus garbage. The result of parsing is a [`ParsedOptions`]
//! bag: an ordered multiset that remembers, per entry, whether any planning
//! step has *committed* to it. Options nobody committed to are what
//! `-driver-warn-unused-options` reports.

mod option;
mod parsed;

pub use option::{OptGroup, OptId, OptInfo, OptKind, option_info};
pub use parsed::{ArgumentValue, OptionParseError, ParsedOption, ParsedOptions};
