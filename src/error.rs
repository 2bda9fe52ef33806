//! Error types for the dispatch engine.
//!
//! Every error here is recoverable: the read loop reports it to the output sink
//! and waits for the next line. Command bodies use [`anyhow`] and only the
//! [`EvaluationError`] is singled out again at the dispatch boundary.

use std::io;

/// Errors raised while adding commands or aliases to a registry.
#[derive(Debug, thiserror::Error)]
pub enum RegistryError {
    #[error("unknown command: {0}")]
    UnknownCommand(String),

    #[error("alias `{0}` would shadow a registered command")]
    AliasShadowsCommand(String),

    #[error("invalid options for `{command}`: {source}")]
    InvalidSchema {
        command: String,
        #[source]
        source: OptionError,
    },
}

/// Errors produced by the option parser or by schema validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("unknown option: {0}")]
    UnknownOption(String),

    #[error("missing value for option {0}")]
    MissingValue(String),

    #[error("option {0} does not take a value")]
    UnexpectedValue(String),

    #[error("option {0} is defined more than once")]
    DuplicateFlag(String),
}

/// Rejected breakout target.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NestingError {
    #[error("Invalid nest level. Must be between 0 and {max}. Got {requested}.")]
    InvalidNestingLevel { requested: i64, max: usize },
}

/// Failure reported by an [`Evaluator`](crate::eval::Evaluator).
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluationError {
    #[error("SyntaxError: {0}")]
    Syntax(String),

    #[error("NameError: undefined local variable or key `{0}`")]
    Name(String),

    #[error("IndexError: {0}")]
    Index(String),

    #[error("TypeError: {0}")]
    Type(String),

    /// The source is a prefix of a valid expression; more input is needed.
    #[error("SyntaxError: unexpected end of input")]
    Incomplete,
}

/// Errors of the argument tokenizer.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("unterminated quote")]
    UnfinishedQuote,

    #[error("trailing backslash")]
    DanglingEscape,
}

/// Errors while loading a [`ShellConfig`](crate::config::ShellConfig).
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("config I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("config parse error: {0}")]
    Parse(#[from] toml::de::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nesting_error_display() {
        let e = NestingError::InvalidNestingLevel {
            requested: 7,
            max: 2,
        };
        assert_eq!(
            format!("{e}"),
            "Invalid nest level. Must be between 0 and 2. Got 7."
        );
    }

    #[test]
    fn option_error_display() {
        let e = OptionError::UnknownOption("--bogus".into());
        assert_eq!(format!("{e}"), "unknown option: --bogus");
        let e = OptionError::MissingValue("--filter".into());
        assert_eq!(format!("{e}"), "missing value for option --filter");
    }

    #[test]
    fn registry_error_keeps_option_source() {
        use std::error::Error;

        let e = RegistryError::InvalidSchema {
            command: "ls".into(),
            source: OptionError::DuplicateFlag("-v".into()),
        };
        assert!(format!("{e}").contains("`ls`"));
        assert!(e.source().is_some());
    }

    #[test]
    fn evaluation_error_is_prefixed_with_kind() {
        let e = EvaluationError::Name("frobnicate".into());
        assert!(format!("{e}").starts_with("NameError: "));
    }

    #[test]
    fn io_error_converts_into_config_error() {
        let io_err = io::Error::new(io::ErrorKind::NotFound, "gone");
        let e: ConfigError = io_err.into();
        assert!(format!("{e}").contains("gone"));
    }
}
