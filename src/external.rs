//! Shell escape: running command lines through the system shell.

use anyhow::{Context, Result};
use std::env;
use std::ffi::OsStr;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus};

/// Shell used for `.<command>` lines.
pub const SHELL: &str = "sh";

/// Run `command_line` with `sh -c`, copying its stdout and stderr to `output`.
///
/// Returns the exit code. `cd` is handled in-process so that it changes the
/// shell's own working directory.
pub fn run_shell(command_line: &str, output: &mut dyn Write) -> Result<i32> {
    let command_line = command_line.trim();
    if let Some(rest) = cd_target(command_line) {
        change_dir(rest)?;
        return Ok(0);
    }

    log::debug!("running `{command_line}` through {SHELL}");
    let result = Command::new(SHELL)
        .arg("-c")
        .arg(command_line)
        .output()
        .with_context(|| format!("failed to run {SHELL}"))?;
    output.write_all(&result.stdout)?;
    output.write_all(&result.stderr)?;
    Ok(match result.status.code() {
        Some(code) => code,
        None => signal_exit_code(result.status),
    })
}

fn cd_target(command_line: &str) -> Option<&str> {
    if command_line == "cd" {
        return Some("");
    }
    command_line.strip_prefix("cd ").map(str::trim)
}

/// Change the process working directory. No target or `~` means `$HOME`.
pub fn change_dir(target: &str) -> Result<PathBuf> {
    let target = match target {
        "" | "~" => home_dir().context("cd: no target and HOME not set")?,
        t => match t.strip_prefix("~/") {
            Some(rest) => home_dir().context("cd: HOME not set")?.join(rest),
            None => PathBuf::from(t),
        },
    };

    let new_dir = if target.is_absolute() {
        target
    } else {
        env::current_dir()?.join(target)
    };

    let canonical = fs::canonicalize(&new_dir)
        .with_context(|| format!("cd: can't canonicalize {}", new_dir.display()))?;
    env::set_current_dir(&canonical)
        .with_context(|| format!("cd: can't chdir to {}", canonical.display()))?;
    log::info!("working directory is now {}", canonical.display());
    Ok(canonical)
}

fn home_dir() -> Option<PathBuf> {
    env::var_os("HOME").map(PathBuf::from)
}

/// True if a command's required tool can be run.
///
/// A tool named with a path must exist there; a bare name is looked up on
/// `PATH`.
pub fn tool_available(tool: &str) -> bool {
    let search_paths = env::var_os("PATH").unwrap_or_default();
    locate_tool(&search_paths, tool).is_some()
}

fn locate_tool(search_paths: &OsStr, tool: &str) -> Option<PathBuf> {
    let path = Path::new(tool);
    if tool.is_empty() {
        return None;
    }
    if path.components().count() > 1 || path.is_absolute() {
        return path.exists().then(|| path.to_path_buf());
    }
    env::split_paths(search_paths)
        .map(|dir| dir.join(tool))
        .find(|candidate| candidate.is_file())
}

/// Exit code for a shell escape that ended without one.
#[cfg(unix)]
fn signal_exit_code(status: ExitStatus) -> i32 {
    use std::os::unix::process::ExitStatusExt;
    match status.signal() {
        Some(signal) => 128 + signal,
        None => -1,
    }
}

#[cfg(not(unix))]
fn signal_exit_code(_status: ExitStatus) -> i32 {
    -1
}
