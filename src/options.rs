//! Per-command option schemas and the generic flag parser.
//!
//! A schema is an ordered list of [`FlagSpec`]s. Parsing walks the argument
//! tokens left to right, matching `-x`, `-xVALUE`, `-abc`, `--flag` and
//! `--flag=VALUE` forms. Anything else is a positional argument. Numeric and
//! range-shaped tokens such as `-1` or `-3..-1` stay positional; turning them
//! into numbers is up to the command.

use std::collections::{HashMap, HashSet};

use crate::error::OptionError;

/// Whether a flag stands alone or consumes the following value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    Switch,
    Value,
}

/// A single flag definition.
#[derive(Debug, Clone)]
pub struct FlagSpec {
    pub short: Option<char>,
    pub long: Option<String>,
    pub arity: Arity,
    pub default: Option<String>,
    pub help: String,
    is_help: bool,
}

impl FlagSpec {
    pub fn new(short: Option<char>, long: Option<&str>, arity: Arity, help: &str) -> Self {
        Self {
            short,
            long: long.map(str::to_string),
            arity,
            default: None,
            help: help.to_string(),
            is_help: false,
        }
    }

    /// Identifier under which parsed values are reported: the long form if
    /// there is one, otherwise the short letter.
    pub fn id(&self) -> String {
        match (&self.long, self.short) {
            (Some(long), _) => long.clone(),
            (None, Some(short)) => short.to_string(),
            (None, None) => String::new(),
        }
    }

    /// Human readable form used in error messages, e.g. `-f/--filter`.
    pub fn display(&self) -> String {
        match (self.short, &self.long) {
            (Some(s), Some(l)) => format!("-{s}/--{l}"),
            (Some(s), None) => format!("-{s}"),
            (None, Some(l)) => format!("--{l}"),
            (None, None) => String::new(),
        }
    }

    fn names(&self) -> Vec<String> {
        self.short
            .map(|c| c.to_string())
            .into_iter()
            .chain(self.long.clone())
            .collect()
    }
}

/// Ordered set of flags accepted by one command.
#[derive(Debug, Clone, Default)]
pub struct OptionSchema {
    flags: Vec<FlagSpec>,
}

impl OptionSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an arbitrary flag definition.
    pub fn flag(mut self, spec: FlagSpec) -> Self {
        self.flags.push(spec);
        self
    }

    /// Add a boolean flag.
    pub fn switch(self, short: char, long: &str, help: &str) -> Self {
        self.flag(FlagSpec::new(Some(short), Some(long), Arity::Switch, help))
    }

    /// Add a flag that consumes one value.
    pub fn value(self, short: char, long: &str, help: &str) -> Self {
        self.flag(FlagSpec::new(Some(short), Some(long), Arity::Value, help))
    }

    /// Add a value flag that reports `default` when absent.
    pub fn value_with_default(self, short: char, long: &str, default: &str, help: &str) -> Self {
        let mut spec = FlagSpec::new(Some(short), Some(long), Arity::Value, help);
        spec.default = Some(default.to_string());
        self.flag(spec)
    }

    /// Add the `-h/--help` flag. Its presence anywhere in the tokens stops
    /// parsing and marks the result as a help request.
    pub fn with_help(self) -> Self {
        let mut spec = FlagSpec::new(Some('h'), Some("help"), Arity::Switch, "This message.");
        spec.is_help = true;
        self.flag(spec)
    }

    pub fn is_empty(&self) -> bool {
        self.flags.is_empty()
    }

    pub fn flags(&self) -> &[FlagSpec] {
        &self.flags
    }

    /// Check that no short or long form is defined twice.
    pub fn validate(&self) -> Result<(), OptionError> {
        let mut shorts = HashSet::new();
        let mut longs = HashSet::new();
        for spec in &self.flags {
            if let Some(c) = spec.short
                && !shorts.insert(c)
            {
                return Err(OptionError::DuplicateFlag(format!("-{c}")));
            }
            if let Some(l) = &spec.long
                && !longs.insert(l.as_str())
            {
                return Err(OptionError::DuplicateFlag(format!("--{l}")));
            }
        }
        Ok(())
    }

    fn find_short(&self, c: char) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.short == Some(c))
    }

    fn find_long(&self, name: &str) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.long.as_deref() == Some(name))
    }

    fn help_flag(&self) -> Option<&FlagSpec> {
        self.flags.iter().find(|f| f.is_help)
    }

    /// Render one aligned line per flag, help flag last.
    pub fn usage(&self) -> String {
        let mut lines = Vec::new();
        let ordered = self
            .flags
            .iter()
            .filter(|f| !f.is_help)
            .chain(self.flags.iter().filter(|f| f.is_help));
        for spec in ordered {
            let mut forms = match (spec.short, &spec.long) {
                (Some(s), Some(l)) => format!("-{s}, --{l}"),
                (Some(s), None) => format!("-{s}"),
                (None, Some(l)) => format!("    --{l}"),
                (None, None) => continue,
            };
            if spec.arity == Arity::Value {
                forms.push_str(" VALUE");
            }
            let mut line = format!("    {forms:<32} {}", spec.help);
            if let Some(default) = &spec.default {
                line.push_str(&format!(" (default: {default:?})"));
            }
            lines.push(line);
        }
        lines.join("\n")
    }

    /// Parse `tokens` against this schema.
    ///
    /// Never touches session state. A help flag anywhere before `--` wins over
    /// every other token, including malformed ones.
    pub fn parse<S: AsRef<str>>(&self, tokens: &[S]) -> Result<ParsedOptions, OptionError> {
        let tokens: Vec<&str> = tokens.iter().map(AsRef::as_ref).collect();

        if self.mentions_help(&tokens) {
            return Ok(ParsedOptions {
                help_requested: true,
                ..ParsedOptions::default()
            });
        }

        let mut parsed = ParsedOptions::default();
        for spec in &self.flags {
            if let Some(default) = &spec.default {
                parsed.insert(spec, OptionValue::Text(default.clone()));
            }
        }

        let mut iter = tokens.into_iter();
        let mut only_positional = false;
        while let Some(token) = iter.next() {
            if only_positional || !self.looks_like_flag(token) {
                parsed.positionals.push(token.to_string());
                continue;
            }
            if token == "--" {
                only_positional = true;
                continue;
            }

            if let Some(body) = token.strip_prefix("--") {
                let (name, inline) = match body.split_once('=') {
                    Some((name, value)) => (name, Some(value)),
                    None => (body, None),
                };
                let spec = self
                    .find_long(name)
                    .ok_or_else(|| OptionError::UnknownOption(token.to_string()))?;
                let value = match (spec.arity, inline) {
                    (Arity::Switch, None) => OptionValue::Switch,
                    (Arity::Switch, Some(_)) => {
                        return Err(OptionError::UnexpectedValue(spec.display()));
                    }
                    (Arity::Value, Some(v)) => OptionValue::Text(v.to_string()),
                    (Arity::Value, None) => match iter.next() {
                        Some(v) => OptionValue::Text(v.to_string()),
                        None => return Err(OptionError::MissingValue(spec.display())),
                    },
                };
                parsed.insert(spec, value);
                continue;
            }

            let cluster: Vec<char> = token.chars().skip(1).collect();
            for (i, &c) in cluster.iter().enumerate() {
                let spec = self
                    .find_short(c)
                    .ok_or_else(|| OptionError::UnknownOption(format!("-{c}")))?;
                if spec.arity == Arity::Switch {
                    parsed.insert(spec, OptionValue::Switch);
                    continue;
                }
                let attached: String = cluster[i + 1..].iter().collect();
                let value = if !attached.is_empty() {
                    attached
                } else {
                    match iter.next() {
                        Some(v) => v.to_string(),
                        None => return Err(OptionError::MissingValue(spec.display())),
                    }
                };
                parsed.insert(spec, OptionValue::Text(value));
                break;
            }
        }

        Ok(parsed)
    }

    fn looks_like_flag(&self, token: &str) -> bool {
        let Some(rest) = token.strip_prefix('-') else {
            return false;
        };
        match rest.chars().next() {
            None => false,
            Some(c) if c.is_ascii_digit() || c == '.' => self.find_short(c).is_some(),
            Some(_) => true,
        }
    }

    /// Scan for the help flag the way [`parse`](Self::parse) reads tokens: a
    /// value flag swallows the rest of its cluster or the next token.
    fn mentions_help(&self, tokens: &[&str]) -> bool {
        let Some(help) = self.help_flag() else {
            return false;
        };
        let mut iter = tokens.iter();
        while let Some(&token) = iter.next() {
            if token == "--" {
                return false;
            }
            if !self.looks_like_flag(token) {
                continue;
            }
            if let Some(body) = token.strip_prefix("--") {
                if help.long.as_deref() == Some(body) {
                    return true;
                }
                if let Some(spec) = self.find_long(body)
                    && spec.arity == Arity::Value
                {
                    iter.next();
                }
                continue;
            }
            let cluster: Vec<char> = token.chars().skip(1).collect();
            for (i, &c) in cluster.iter().enumerate() {
                if help.short == Some(c) {
                    return true;
                }
                match self.find_short(c) {
                    Some(spec) if spec.arity == Arity::Value => {
                        if i + 1 == cluster.len() {
                            iter.next();
                        }
                        break;
                    }
                    _ => {}
                }
            }
        }
        false
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum OptionValue {
    Switch,
    Text(String),
}

/// Result of [`OptionSchema::parse`].
///
/// Values are reachable through both the short letter and the long name of a
/// flag, so `opts.present("v")` and `opts.present("verbose")` agree.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: HashMap<String, OptionValue>,
    positionals: Vec<String>,
    help_requested: bool,
}

impl ParsedOptions {
    /// Options for a command whose schema is empty: every token is positional.
    pub fn positional_only(tokens: Vec<String>) -> Self {
        Self {
            positionals: tokens,
            ..Self::default()
        }
    }

    fn insert(&mut self, spec: &FlagSpec, value: OptionValue) {
        for name in spec.names() {
            self.values.insert(name, value.clone());
        }
    }

    /// True if a switch was given or a value flag has a value (given or default).
    pub fn present(&self, flag: &str) -> bool {
        self.values.contains_key(flag)
    }

    /// The value of a value flag.
    pub fn value(&self, flag: &str) -> Option<&str> {
        match self.values.get(flag) {
            Some(OptionValue::Text(v)) => Some(v),
            _ => None,
        }
    }

    pub fn positionals(&self) -> &[String] {
        &self.positionals
    }

    pub fn help_requested(&self) -> bool {
        self.help_requested
    }
}
