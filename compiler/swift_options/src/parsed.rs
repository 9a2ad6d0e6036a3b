//! Parsing argv into an ordered, consumption-tracked option bag.

use std::fmt;

use crate::option::{rows_longest_first, OptGroup, OptId, OptKind};

/// The argument payload of a parsed option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArgumentValue {
    None,
    Single(String),
    Multiple(Vec<String>),
}

impl ArgumentValue {
    /// The single value, or the first of multiple.
    pub fn first(&self) -> Option<&str> {
        match self {
            ArgumentValue::None => None,
            ArgumentValue::Single(s) => Some(s),
            ArgumentValue::Multiple(v) => v.first().map(String::as_str),
        }
    }

    /// All values in order.
    pub fn values(&self) -> Vec<&str> {
        match self {
            ArgumentValue::None => Vec::new(),
            ArgumentValue::Single(s) => vec![s.as_str()],
            ArgumentValue::Multiple(v) => v.iter().map(String::as_str).collect(),
        }
    }
}

/// One option occurrence in command-line order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedOption {
    /// Canonical option id (aliases are resolved during parsing).
    pub option: OptId,
    pub argument: ArgumentValue,
    /// Position among parsed options, stable across erasure.
    pub index: usize,
}

impl ParsedOption {
    /// The single argument value, if there is exactly one.
    pub fn value(&self) -> Option<&str> {
        match &self.argument {
            ArgumentValue::Single(s) => Some(s),
            _ => None,
        }
    }
}

/// Errors from turning argv into options.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OptionParseError {
    UnknownOption(String),
    MissingArgument(String),
}

impl fmt::Display for OptionParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OptionParseError::UnknownOption(arg) => write!(f, "unknown argument: '{arg}'"),
            OptionParseError::MissingArgument(opt) => {
                write!(f, "missing argument value for '{opt}'")
            }
        }
    }
}

impl std::error::Error for OptionParseError {}

/// Ordered multiset of parsed options with per-entry consumption bits.
///
/// A query that *commits* the driver to an option (every `get_last`-family
/// call, `has_flag`, `arguments`) marks the matching entries consumed.
/// Entries nobody committed to are surfaced by [`ParsedOptions::unconsumed`]
/// for the `-driver-warn-unused-options` sweep.
#[derive(Debug, Clone, Default)]
pub struct ParsedOptions {
    options: Vec<ParsedOption>,
    consumed: Vec<bool>,
}

impl ParsedOptions {
    /// Parse an argument vector (excluding argv[0]).
    pub fn parse(args: &[String]) -> Result<ParsedOptions, OptionParseError> {
        let rows = rows_longest_first();
        let mut options = Vec::with_capacity(args.len());
        let mut i = 0;
        let mut push = |option: OptId, argument: ArgumentValue| {
            let index = options.len();
            options.push(ParsedOption { option, argument, index });
        };

        while i < args.len() {
            let arg = &args[i];
            // `-` alone is standard input, a positional.
            if arg == "-" || !arg.starts_with('-') {
                push(OptId::Input, ArgumentValue::Single(arg.clone()));
                i += 1;
                continue;
            }

            let mut matched = false;
            for row in rows {
                let canonical = row.alias_of.unwrap_or(row.id);
                match row.kind {
                    OptKind::Flag => {
                        if arg == row.spelling {
                            push(canonical, ArgumentValue::None);
                            matched = true;
                        }
                    }
                    OptKind::Joined => {
                        if let Some(rest) = arg.strip_prefix(row.spelling) {
                            push(canonical, ArgumentValue::Single(rest.to_string()));
                            matched = true;
                        }
                    }
                    OptKind::CommaJoined => {
                        if let Some(rest) = arg.strip_prefix(row.spelling) {
                            let values =
                                rest.split(',').map(str::to_string).collect::<Vec<_>>();
                            push(canonical, ArgumentValue::Multiple(values));
                            matched = true;
                        }
                    }
                    OptKind::Separate => {
                        if arg == row.spelling {
                            let value = args.get(i + 1).ok_or_else(|| {
                                OptionParseError::MissingArgument(row.spelling.to_string())
                            })?;
                            push(canonical, ArgumentValue::Single(value.clone()));
                            i += 1;
                            matched = true;
                        }
                    }
                    OptKind::JoinedOrSeparate => {
                        if arg == row.spelling {
                            let value = args.get(i + 1).ok_or_else(|| {
                                OptionParseError::MissingArgument(row.spelling.to_string())
                            })?;
                            push(canonical, ArgumentValue::Single(value.clone()));
                            i += 1;
                            matched = true;
                        } else if let Some(rest) = arg.strip_prefix(row.spelling) {
                            let rest = rest.strip_prefix('=').unwrap_or(rest);
                            if !rest.is_empty() {
                                push(canonical, ArgumentValue::Single(rest.to_string()));
                                matched = true;
                            }
                        }
                    }
                }
                if matched {
                    break;
                }
            }

            if !matched {
                return Err(OptionParseError::UnknownOption(arg.clone()));
            }
            i += 1;
        }

        let consumed = vec![false; options.len()];
        Ok(ParsedOptions { options, consumed })
    }

    /// All entries in command-line order, without consuming.
    pub fn all(&self) -> &[ParsedOption] {
        &self.options
    }

    fn mark(&mut self, position: usize) {
        self.consumed[position] = true;
    }

    /// Last occurrence of `id`; commits to every occurrence.
    pub fn get_last(&mut self, id: OptId) -> Option<ParsedOption> {
        let mut last = None;
        for pos in 0..self.options.len() {
            if self.options[pos].option == id {
                self.mark(pos);
                last = Some(self.options[pos].clone());
            }
        }
        last
    }

    /// Last occurrence among `ids`; commits to every occurrence of each.
    pub fn get_last_of(&mut self, ids: &[OptId]) -> Option<ParsedOption> {
        let mut last: Option<ParsedOption> = None;
        for pos in 0..self.options.len() {
            if ids.contains(&self.options[pos].option) {
                self.mark(pos);
                let candidate = &self.options[pos];
                if last.as_ref().is_none_or(|l| candidate.index > l.index) {
                    last = Some(candidate.clone());
                }
            }
        }
        last
    }

    /// Argument of the last occurrence of `id`.
    pub fn get_last_argument(&mut self, id: OptId) -> Option<String> {
        self.get_last(id)
            .and_then(|opt| opt.argument.first().map(str::to_string))
    }

    /// Whether any of `ids` occurs; commits to every occurrence.
    pub fn has_argument(&mut self, ids: &[OptId]) -> bool {
        let mut found = false;
        for pos in 0..self.options.len() {
            if ids.contains(&self.options[pos].option) {
                self.mark(pos);
                found = true;
            }
        }
        found
    }

    /// Resolve a positive/negative flag pair: the later occurrence wins,
    /// `default` if neither appears. Commits to both spellings.
    pub fn has_flag(&mut self, positive: OptId, negative: OptId, default: bool) -> bool {
        let pos = self.get_last(positive);
        let neg = self.get_last(negative);
        match (pos, neg) {
            (Some(p), Some(n)) => p.index > n.index,
            (Some(_), None) => true,
            (None, Some(_)) => false,
            (None, None) => default,
        }
    }

    /// Last occurrence of any option in `group`; commits to all of them.
    pub fn get_last_in_group(&mut self, group: OptGroup) -> Option<ParsedOption> {
        let mut last: Option<ParsedOption> = None;
        for pos in 0..self.options.len() {
            if self.options[pos].option.group() == Some(group) {
                self.mark(pos);
                let candidate = &self.options[pos];
                if last.as_ref().is_none_or(|l| candidate.index > l.index) {
                    last = Some(candidate.clone());
                }
            }
        }
        last
    }

    /// Every occurrence of `id`, in order; commits to each.
    pub fn arguments(&mut self, id: OptId) -> Vec<ParsedOption> {
        let mut result = Vec::new();
        for pos in 0..self.options.len() {
            if self.options[pos].option == id {
                self.mark(pos);
                result.push(self.options[pos].clone());
            }
        }
        result
    }

    /// Remove every occurrence of `id`. Indices of surviving entries keep
    /// their original values.
    pub fn erase(&mut self, id: OptId) {
        let mut pos = 0;
        while pos < self.options.len() {
            if self.options[pos].option == id {
                self.options.remove(pos);
                self.consumed.remove(pos);
            } else {
                pos += 1;
            }
        }
    }

    /// In-place rewrite of every entry (used for working-directory rebasing).
    /// Does not consume.
    pub fn modify_arguments(&mut self, mut f: impl FnMut(&mut ParsedOption)) {
        for option in &mut self.options {
            f(option);
        }
    }

    /// Entries no planning step committed to. Positional inputs are always
    /// considered used.
    pub fn unconsumed(&self) -> Vec<&ParsedOption> {
        self.options
            .iter()
            .zip(&self.consumed)
            .filter(|(opt, consumed)| !**consumed && opt.option != OptId::Input)
            .map(|(opt, _)| opt)
            .collect()
    }
}
