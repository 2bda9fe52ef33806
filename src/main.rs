use anyhow::{Context, Result};
use argh::FromArgs;
use serde_json::Value;
use session_shell::render::view;
use session_shell::{EditorSource, Interpreter, ShellConfig};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(FromArgs)]
/// Interactive shell for exploring JSON documents in nested sessions.
struct Args {
    #[argh(option)]
    /// config file; defaults to $SESSION_SHELL_CONFIG or ~/.session_shell.toml
    config: Option<PathBuf>,

    #[argh(switch)]
    /// disable colored output
    no_color: bool,

    #[argh(switch)]
    /// start with the simple prompt
    simple_prompt: bool,

    #[argh(option)]
    /// line to run before reading input; may be repeated
    eval: Vec<String>,

    #[argh(positional)]
    /// JSON document to explore; an empty object when omitted
    file: Option<PathBuf>,
}

fn load_document(path: &Path) -> Result<Value> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("can't read {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("{} is not valid JSON", path.display()))
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let args: Args = argh::from_env();

    let mut config = ShellConfig::load(args.config.as_deref())?;
    if args.no_color {
        config.color = false;
    }
    if args.simple_prompt {
        config.simple_prompt = true;
    }

    let root = match &args.file {
        Some(path) => load_document(path)?,
        None => Value::Object(Default::default()),
    };
    let mut interp = Interpreter::with_defaults(root, &config, Box::new(std::io::stdout()))?;

    for line in &args.eval {
        if let Some(value) = interp.run_line(line)? {
            log::info!("session ended with {}", view(&value));
            return Ok(());
        }
        if interp.state().should_exit {
            return Ok(());
        }
    }

    let mut editor = EditorSource::new()?;
    let value = interp.repl(&mut editor)?;
    log::info!("session ended with {}", view(&value));
    Ok(())
}
