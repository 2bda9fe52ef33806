//! Shell configuration loaded from TOML.

use crate::error::ConfigError;
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Environment variable naming a config file.
pub const CONFIG_ENV: &str = "SESSION_SHELL_CONFIG";

/// File name looked up in `$HOME`.
pub const CONFIG_FILE_NAME: &str = ".session_shell.toml";

/// User-tunable behavior of the interactive shell.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShellConfig {
    /// Color results and headings.
    pub color: bool,
    /// Start with the short `>> ` prompt.
    pub simple_prompt: bool,
    /// Maximum number of lines kept for `hist`.
    pub history_limit: usize,
    /// Hand lines that match no command to the evaluator.
    pub evaluate_unmatched: bool,
    /// Log a warning when a command is registered twice under the same name.
    pub warn_on_redefine: bool,
}

impl Default for ShellConfig {
    fn default() -> Self {
        Self {
            color: true,
            simple_prompt: false,
            history_limit: 1000,
            evaluate_unmatched: true,
            warn_on_redefine: false,
        }
    }
}

impl ShellConfig {
    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    /// Load the configuration.
    ///
    /// An explicit path must exist. Otherwise `$SESSION_SHELL_CONFIG` and then
    /// `$HOME/.session_shell.toml` are tried, and a missing file means defaults.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            log::debug!("loading config from {}", path.display());
            return Self::from_file(path);
        }
        match Self::default_path() {
            Some(path) if path.is_file() => {
                log::debug!("loading config from {}", path.display());
                Self::from_file(&path)
            }
            _ => Ok(Self::default()),
        }
    }

    fn default_path() -> Option<PathBuf> {
        if let Ok(path) = std::env::var(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        std::env::var_os("HOME").map(|home| PathBuf::from(home).join(CONFIG_FILE_NAME))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults() {
        let cfg = ShellConfig::default();
        assert!(cfg.color);
        assert!(!cfg.simple_prompt);
        assert_eq!(cfg.history_limit, 1000);
        assert!(cfg.evaluate_unmatched);
        assert!(!cfg.warn_on_redefine);
    }

    #[test]
    fn partial_toml_keeps_other_defaults() {
        let cfg = ShellConfig::from_toml("color = false\nhistory_limit = 5\n").unwrap();
        assert!(!cfg.color);
        assert_eq!(cfg.history_limit, 5);
        assert!(cfg.evaluate_unmatched);
    }

    #[test]
    fn bad_toml_is_a_parse_error() {
        let err = ShellConfig::from_toml("color = [").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn explicit_file_is_loaded() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "simple_prompt = true").unwrap();
        let cfg = ShellConfig::load(Some(file.path())).unwrap();
        assert!(cfg.simple_prompt);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ShellConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
