//! Commands every shell starts with.
//!
//! Each command is a plain function with the [`Handler`](crate::command::Handler)
//! signature; [`register_defaults`] wires them into a registry together with
//! their options and aliases. Registration order is the order `help` lists them.

use crate::command::{CommandDescriptor, ControlSignal, Matcher};
use crate::context::CommandContext;
use crate::external::{SHELL, run_shell, tool_available};
use crate::options::{OptionSchema, ParsedOptions};
use crate::registry::CommandRegistry;
use crate::render::{heading, render_pretty, view, view_clip};
use anyhow::{Context, Result, bail};
use regex::{Regex, RegexBuilder};
use serde_json::Value;
use std::io::Write;

/// `(alias, canonical)` pairs added after the commands.
const DEFAULT_ALIASES: &[(&str, &str)] = &[
    ("quit-program", "exit-program"),
    ("!!!", "exit-program"),
    ("!!@", "exit-all"),
    ("inspect", "cat"),
    ("quit", "exit"),
    ("back", "exit"),
];

/// Register the built-in command set and its aliases.
pub fn register_defaults(registry: &mut CommandRegistry) -> Result<()> {
    for descriptor in default_commands()? {
        registry.register(descriptor)?;
    }
    for (alias, canonical) in DEFAULT_ALIASES {
        registry.alias(alias, canonical)?;
    }
    Ok(())
}

fn default_commands() -> Result<Vec<CommandDescriptor>> {
    Ok(vec![
        CommandDescriptor::new("help", "Show a list of commands, or help for one command.", help)
            .usage("Usage: help [COMMAND]"),
        CommandDescriptor::new(
            "!",
            "Clear the input buffer. Useful if you get stuck in multi-line input.",
            clear_buffer,
        ),
        CommandDescriptor::new("!pry", "Start a nested session on the current receiver.", nest_here),
        CommandDescriptor::new(
            "shell-escape",
            "All text following a '.' is forwarded to the shell.",
            shell_escape,
        )
        .pattern(Regex::new(r"^\.(.*)$")?)
        .display_name(".<shell command>")
        .requires(SHELL),
        CommandDescriptor::new("hist", "Show and replay input history.", hist)
            .usage("Usage: hist [-r RANGE] [-c]")
            .options(
                OptionSchema::new()
                    .value('r', "replay", "The line (or range of lines, A..B) to replay.")
                    .switch('c', "clear", "Forget the history.")
                    .with_help(),
            ),
        CommandDescriptor::new(
            "exit-program",
            "End the shell. Aliases: quit-program, !!!",
            exit_program,
        ),
        CommandDescriptor::new("toggle-color", "Toggle colored output.", toggle_color),
        CommandDescriptor::new("simple-prompt", "Toggle the simple prompt.", simple_prompt),
        CommandDescriptor::new("nesting", "Show nesting information.", nesting),
        CommandDescriptor::new("status", "Show status information.", status),
        CommandDescriptor::new("version", "Show the shell version.", version),
        CommandDescriptor::new(
            "exit-all",
            "End all nested sessions. Accepts an optional return value. Aliases: !!@",
            exit_all,
        ),
        CommandDescriptor::new("ls", "List the keys of the receiver or of EXPR.", ls)
            .usage("Usage: ls [OPTIONS] [EXPR]")
            .options(
                OptionSchema::new()
                    .switch('v', "verbose", "Show values next to keys.")
                    .switch('l', "locals", "Show local variables.")
                    .value('f', "filter", "Regular expression to filter keys.")
                    .with_help(),
            ),
        CommandDescriptor::new("cat", "Pretty-print the value of EXPR. Aliases: inspect", cat)
            .usage("Usage: cat EXPR"),
        CommandDescriptor::new(
            "cd",
            "Start a session on EXPR (use `cd ..` to go back and `cd /` to return to the top level).",
            cd,
        )
        .usage("Usage: cd EXPR | .. | /")
        .keep_retval(),
        CommandDescriptor::new(
            "jump-to",
            "Jump to a session further up the stack, ending all sessions above it.",
            jump_to,
        )
        .usage("Usage: jump-to LEVEL"),
        CommandDescriptor::new(
            "exit",
            "End the current session. Accepts an optional return value. Aliases: quit, back",
            exit,
        ),
        CommandDescriptor::new("show-command", "Show how COMMAND is defined.", show_command)
            .usage("Usage: show-command COMMAND"),
        CommandDescriptor::new("alias", "Make NEW another name for EXISTING.", alias)
            .usage("Usage: alias NEW EXISTING"),
    ])
}

fn help(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
    if let Some(name) = opts.positionals().first() {
        let Some(descriptor) = ctx.registry.lookup(name) else {
            bail!("no such command: {name}");
        };
        let aliases = ctx.registry.aliases_of(descriptor.name());
        writeln!(ctx.output, "{}", heading(descriptor.shown_name(), ctx.state.color))?;
        if !aliases.is_empty() {
            writeln!(ctx.output, "Aliases: {}", aliases.join(", "))?;
        }
        write!(ctx.output, "{}", descriptor.help_text())?;
        return Ok(ControlSignal::done());
    }

    writeln!(ctx.output, "{}", heading("Command list:", ctx.state.color))?;
    writeln!(ctx.output, "--")?;
    for entry in ctx.registry.help_index() {
        let descriptor = &entry.descriptor;
        let mut line = descriptor.shown_name().to_string();
        if !entry.aliases.is_empty() {
            line.push_str(&format!(" (aliases: {})", entry.aliases.join(", ")));
        }
        line.push_str("  ");
        line.push_str(descriptor.description());
        if let Some(tool) = descriptor.required_tool()
            && !tool_available(tool)
        {
            line.push_str(&format!(" (requires {tool})"));
        }
        writeln!(ctx.output, "{line}")?;
    }
    Ok(ControlSignal::done())
}

fn clear_buffer(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    ctx.state.pending.clear();
    writeln!(ctx.output, "Input buffer cleared!")?;
    Ok(ControlSignal::done())
}

fn nest_here(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    let receiver = ctx.target().clone();
    ctx.enter(receiver, "!pry");
    Ok(ControlSignal::done())
}

fn shell_escape(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    if ctx.trailing.trim().is_empty() {
        bail!("no shell command given");
    }
    let code = run_shell(&ctx.trailing, ctx.output)?;
    if code != 0 {
        log::debug!("shell command exited with {code}");
    }
    Ok(ControlSignal::done())
}

fn hist(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
    if opts.present("clear") {
        ctx.state.history.clear();
        writeln!(ctx.output, "History cleared.")?;
        return Ok(ControlSignal::done());
    }

    if let Some(range) = opts.value("replay") {
        let (start, end) = parse_history_range(range, ctx.state.history.len())?;
        let lines = ctx.state.history.range(start, end);
        log::debug!("replaying {} history line(s)", lines.len());
        ctx.state.replay.extend(lines);
        return Ok(ControlSignal::done());
    }

    let width = ctx.state.history.len().to_string().len();
    for (i, line) in ctx.state.history.iter().enumerate() {
        writeln!(ctx.output, "{:>width$}: {line}", i + 1)?;
    }
    Ok(ControlSignal::done())
}

/// Parse `N` or `A..B` (1-based, negative counts from the end) into 0-based
/// inclusive bounds.
fn parse_history_range(text: &str, len: usize) -> Result<(usize, usize)> {
    let (first, last) = text.split_once("..").unwrap_or((text, text));
    let start = history_index(first, len)?;
    let end = history_index(last, len)?;
    if start > end {
        bail!("empty history range `{text}`");
    }
    Ok((start, end))
}

fn history_index(text: &str, len: usize) -> Result<usize> {
    let n: i64 = text
        .trim()
        .parse()
        .with_context(|| format!("invalid history index `{text}`"))?;
    let len = i64::try_from(len)?;
    let index = if n < 0 { len + n } else { n - 1 };
    if !(0..len).contains(&index) {
        bail!("history index {n} out of range (history has {len} lines)");
    }
    Ok(usize::try_from(index)?)
}

fn exit_program(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    ctx.state.should_exit = true;
    Ok(ControlSignal::done())
}

fn toggle_color(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    ctx.state.color = !ctx.state.color;
    let state = if ctx.state.color { "on" } else { "off" };
    writeln!(ctx.output, "Syntax highlighting {state}")?;
    Ok(ControlSignal::done())
}

fn simple_prompt(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    ctx.state.toggle_prompt();
    Ok(ControlSignal::done())
}

fn nesting(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    writeln!(ctx.output, "{}", heading("Nesting status:", ctx.state.color))?;
    writeln!(ctx.output, "--")?;
    for frame in ctx.state.nesting.frames() {
        let clip = view_clip(frame.receiver());
        if frame.level() == 0 {
            writeln!(ctx.output, "0. {clip} (top level)")?;
        } else {
            writeln!(ctx.output, "{}. {clip}", frame.level())?;
        }
    }
    Ok(ControlSignal::done())
}

fn status(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    writeln!(ctx.output, "{}", heading("Status:", ctx.state.color))?;
    writeln!(ctx.output, "--")?;
    writeln!(ctx.output, "Receiver: {}", view_clip(ctx.target()))?;
    writeln!(ctx.output, "Nesting level: {}", ctx.level())?;
    writeln!(ctx.output, "Version: {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(
        ctx.output,
        "Color: {}",
        if ctx.state.color { "on" } else { "off" }
    )?;
    writeln!(ctx.output, "Last result: {}", view(&ctx.state.last_result))?;
    Ok(ControlSignal::done())
}

fn version(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    writeln!(
        ctx.output,
        "{} version {}",
        env!("CARGO_PKG_NAME"),
        env!("CARGO_PKG_VERSION")
    )?;
    Ok(ControlSignal::done())
}

fn exit_all(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    let source = ctx.trailing.clone();
    let value = ctx.eval(&source)?;
    Ok(ControlSignal::breakout(0, value))
}

fn ls(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
    let filter = match opts.value("filter") {
        Some(pattern) => Some(
            RegexBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .with_context(|| format!("invalid filter `{pattern}`"))?,
        ),
        None => None,
    };

    let locals = opts.present("locals");
    let entries = if locals {
        ctx.evaluator.locals()
    } else if opts.positionals().is_empty() {
        members(ctx.target())
    } else {
        let subject = ctx.eval(&opts.positionals().join(" "))?;
        members(&subject)
    };
    let entries: Vec<(String, Value)> = entries
        .into_iter()
        .filter(|(name, _)| filter.as_ref().is_none_or(|re| re.is_match(name)))
        .collect();

    let title = if locals { "Local variables:" } else { "Keys:" };
    writeln!(ctx.output, "{}", heading(title, ctx.state.color))?;
    if opts.present("verbose") {
        for (name, value) in &entries {
            writeln!(ctx.output, "  {name}: {}", view_clip(value))?;
        }
    } else if !entries.is_empty() {
        let names: Vec<&str> = entries.iter().map(|(name, _)| name.as_str()).collect();
        writeln!(ctx.output, "  {}", names.join("  "))?;
    }
    Ok(ControlSignal::done())
}

/// Keys of an object or indices of an array, with their values.
fn members(value: &Value) -> Vec<(String, Value)> {
    match value {
        Value::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
        Value::Array(items) => items
            .iter()
            .enumerate()
            .map(|(i, v)| (i.to_string(), v.clone()))
            .collect(),
        _ => Vec::new(),
    }
}

fn cat(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    let source = ctx.trailing.trim().to_string();
    if source.is_empty() {
        writeln!(ctx.output, "Must provide an object.")?;
        return Ok(ControlSignal::done());
    }
    let value = ctx.eval(&source)?;
    writeln!(ctx.output, "{}", render_pretty(&value, ctx.state.color))?;
    Ok(ControlSignal::done())
}

fn cd(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    let source = ctx.trailing.trim().to_string();
    let level = ctx.level();
    match source.as_str() {
        "" => {
            writeln!(ctx.output, "Must provide an object.")?;
            Ok(ControlSignal::done())
        }
        ".." if level == 0 => {
            writeln!(ctx.output, "Already at the top level.")?;
            Ok(ControlSignal::done())
        }
        ".." => Ok(ControlSignal::breakout(level as i64, Value::Null)),
        "/" if level > 0 => Ok(ControlSignal::breakout(0, Value::Null)),
        "/" => Ok(ControlSignal::done()),
        expr => {
            let receiver = ctx.eval(expr)?;
            ctx.enter(receiver, expr);
            Ok(ControlSignal::done())
        }
    }
}

fn jump_to(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
    let Some(arg) = opts.positionals().first() else {
        bail!("{}: expected a nesting level", ctx.invoked_as);
    };
    let target: i64 = arg
        .parse()
        .with_context(|| format!("{}: invalid nesting level `{arg}`", ctx.invoked_as))?;
    let level = ctx.level();
    if target == level as i64 {
        writeln!(ctx.output, "Already at nesting level {level}")?;
        return Ok(ControlSignal::done());
    }
    Ok(ControlSignal::breakout(target, Value::Null))
}

fn exit(ctx: &mut CommandContext<'_>, _opts: &ParsedOptions) -> Result<ControlSignal> {
    let source = ctx.trailing.clone();
    let value = ctx.eval(&source)?;
    Ok(ControlSignal::breakout(ctx.level() as i64, value))
}

fn show_command(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
    let Some(name) = opts.positionals().first() else {
        bail!("expected a command name");
    };
    let Some(descriptor) = ctx.registry.lookup(name) else {
        bail!("no such command: {name}");
    };
    let aliases = ctx.registry.aliases_of(descriptor.name());
    let yes_no = |flag: bool| if flag { "yes" } else { "no" };

    let out = &mut *ctx.output;
    writeln!(out, "Name: {}", descriptor.name())?;
    if descriptor.shown_name() != descriptor.name() {
        writeln!(out, "Shown as: {}", descriptor.shown_name())?;
    }
    if !aliases.is_empty() {
        writeln!(out, "Aliases: {}", aliases.join(", "))?;
    }
    writeln!(out, "Description: {}", descriptor.description())?;
    match descriptor.matcher() {
        Matcher::Name => writeln!(out, "Matches: by name")?,
        Matcher::Pattern(re) => writeln!(out, "Matches: pattern {}", re.as_str())?,
    }
    writeln!(out, "Listed in help: {}", yes_no(!descriptor.is_hidden()))?;
    writeln!(out, "Keeps return value: {}", yes_no(descriptor.keeps_retval()))?;
    if let Some(tool) = descriptor.required_tool() {
        let found = if tool_available(tool) { "found" } else { "missing" };
        writeln!(out, "Requires: {tool} ({found})")?;
    }
    if !descriptor.schema().is_empty() {
        writeln!(out, "Options:")?;
        writeln!(out, "{}", descriptor.schema().usage())?;
    }
    Ok(ControlSignal::done())
}

fn alias(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
    let [new, existing] = opts.positionals() else {
        bail!("expected NEW and EXISTING command names");
    };
    ctx.registry.alias(new, existing)?;
    let canonical = ctx.registry.canonical_name(new).unwrap_or(existing.as_str());
    writeln!(ctx.output, "`{new}` is now an alias of `{canonical}`")?;
    Ok(ControlSignal::done())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ShellConfig;
    use crate::interpreter::Interpreter;
    use crate::io_adapters::MemWriter;
    use serde_json::json;

    fn run(root: Value, lines: &[&str]) -> (Interpreter, String) {
        let (out, handle) = MemWriter::with_handle();
        let config = ShellConfig {
            color: false,
            ..ShellConfig::default()
        };
        let mut interp = Interpreter::with_defaults(root, &config, Box::new(out)).unwrap();
        for line in lines {
            interp.run_line(line).unwrap();
        }
        let text = MemWriter::contents(&handle);
        (interp, text)
    }

    #[test]
    fn defaults_register_cleanly() {
        let mut registry = CommandRegistry::new();
        register_defaults(&mut registry).unwrap();
        assert_eq!(registry.canonical_name("!!!"), Some("exit-program"));
        assert_eq!(registry.canonical_name("back"), Some("exit"));
        assert!(registry.lookup("cd").unwrap().keeps_retval());
    }

    #[test]
    fn help_lists_commands_with_aliases() {
        let (_, out) = run(json!({}), &["help"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Command list:");
        assert_eq!(lines[1], "--");
        assert!(lines[2].starts_with("help  Show a list"));
        assert!(out.contains("\nexit (aliases: quit, back)  End the current session."));
        assert!(out.contains("\n.<shell command>  All text following"));
    }

    #[test]
    fn help_for_alias_shows_canonical_command() {
        let (_, by_alias) = run(json!({}), &["help quit"]);
        let (_, by_name) = run(json!({}), &["help exit"]);
        assert_eq!(by_alias, by_name);
        assert!(by_alias.starts_with("exit\nAliases: quit, back\n"));
    }

    #[test]
    fn clear_buffer_drops_pending_input() {
        let (interp, out) = run(json!({}), &["[1,", "!"]);
        assert!(interp.state().pending.is_empty());
        assert_eq!(out, "Input buffer cleared!\n");
    }

    #[test]
    fn cd_and_nesting() {
        let (interp, out) = run(
            json!({"a": {"b": [1, 2]}}),
            &["cd a", "cd b", "nesting"],
        );
        assert_eq!(interp.state().level(), 2);
        assert_eq!(
            out,
            "Nesting status:\n--\n0. {\"a\":{\"b\":[1,2]}} (top level)\n1. {\"b\":[1,2]}\n2. [1,2]\n"
        );
    }

    #[test]
    fn cd_dot_dot_returns_one_level() {
        let (interp, out) = run(json!({"a": {"b": {}}}), &["cd a", "cd b", "cd .."]);
        assert_eq!(interp.state().level(), 1);
        assert_eq!(out, "=> null\n");
    }

    #[test]
    fn cd_slash_returns_to_top() {
        let (interp, _) = run(json!({"a": {"b": {}}}), &["cd a", "cd b", "cd /"]);
        assert_eq!(interp.state().level(), 0);
    }

    #[test]
    fn cd_dot_dot_at_top_level_keeps_the_shell() {
        let (interp, out) = run(json!({}), &["cd .."]);
        assert_eq!(interp.state().level(), 0);
        assert_eq!(out, "Already at the top level.\n");
    }

    #[test]
    fn jump_to_levels() {
        let (interp, out) = run(
            json!({"a": {"b": {"c": {}}}}),
            &["cd a", "cd b", "cd c", "jump-to 3", "jump-to 1"],
        );
        assert!(out.starts_with("Already at nesting level 3\n"));
        assert_eq!(interp.state().level(), 1);
    }

    #[test]
    fn exit_all_unwinds_to_top_with_value() {
        let (interp, out) = run(json!({"a": {"b": {}}}), &["cd a", "cd b", "exit-all 7"]);
        assert_eq!(interp.state().level(), 0);
        assert_eq!(interp.state().last_result, json!(7));
        assert_eq!(out, "=> 7\n");
    }

    #[test]
    fn ls_lists_filters_and_shows_values() {
        let root = json!({"alpha": 1, "beta": "two", "Gamma": [3]});
        let (_, out) = run(root.clone(), &["ls"]);
        assert_eq!(out, "Keys:\n  Gamma  alpha  beta\n");
        let (_, out) = run(root.clone(), &["ls -f ^g"]);
        assert_eq!(out, "Keys:\n  Gamma\n");
        let (_, out) = run(root, &["ls -v -f ph|mm"]);
        assert_eq!(out, "Keys:\n  Gamma: [3]\n  alpha: 1\n");
    }

    #[test]
    fn ls_filter_may_contain_the_help_letter() {
        let (_, out) = run(json!({"hi": 1, "x": 2}), &["ls -fhi"]);
        assert_eq!(out, "Keys:\n  hi\n");
    }

    #[test]
    fn ls_locals_and_expressions() {
        let (_, out) = run(json!({"list": [5, 6]}), &["x = 1", "ls -l"]);
        assert!(out.ends_with("Local variables:\n  _  x\n"));
        let (_, out) = run(json!({"list": [5, 6]}), &["ls list"]);
        assert_eq!(out, "Keys:\n  0  1\n");
    }

    #[test]
    fn ls_rejects_bad_filter() {
        let (_, out) = run(json!({}), &["ls -f ("]);
        assert!(out.starts_with("Error: invalid filter `(`"));
    }

    #[test]
    fn cat_and_inspect_pretty_print() {
        let (_, out) = run(json!({"a": {"b": 1}}), &["cat a", "inspect a.b"]);
        assert_eq!(out, "{\n  \"b\": 1\n}\n1\n");
    }

    #[test]
    fn hist_lists_and_replays() {
        let (interp, out) = run(json!({}), &["version", "status", "hist"]);
        assert!(out.ends_with("1: version\n2: status\n"));
        assert_eq!(interp.state().history.len(), 3);

        let (interp, _) = run(json!({}), &["version", "status", "hist -r 1..-1"]);
        assert_eq!(
            interp.state().replay.iter().collect::<Vec<_>>(),
            ["version", "status"]
        );
    }

    #[test]
    fn hist_range_parsing() {
        assert_eq!(parse_history_range("2", 5).unwrap(), (1, 1));
        assert_eq!(parse_history_range("-3..-1", 5).unwrap(), (2, 4));
        assert!(parse_history_range("0", 5).is_err());
        assert!(parse_history_range("4..2", 5).is_err());
        assert!(parse_history_range("x", 5).is_err());
    }

    #[test]
    fn toggles_report_state() {
        let (interp, out) = run(json!({}), &["toggle-color", "simple-prompt"]);
        assert_eq!(out, "Syntax highlighting on\n");
        assert!(interp.state().color);
        assert_eq!(interp.prompt(), ">> ");
    }

    #[test]
    fn status_reports_level_and_last_result() {
        let (_, out) = run(json!({"a": {}}), &["5", "cd a", "status"]);
        assert!(out.contains("Receiver: {}\nNesting level: 1\n"));
        assert!(out.contains("Last result: 5\n"));
    }

    #[test]
    fn jump_to_names_itself_in_errors() {
        let (interp, out) = run(json!({}), &["jump-to", "jump-to up"]);
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines[0], "Error: jump-to: expected a nesting level");
        assert!(lines[1].starts_with("Error: jump-to: invalid nesting level `up`"));
        assert_eq!(interp.state().level(), 0);
    }

    #[test]
    fn exit_program_sets_flag() {
        let (interp, _) = run(json!({}), &["!!!"]);
        assert!(interp.state().should_exit);
    }

    #[test]
    fn nested_pry_session_on_same_receiver() {
        let (interp, _) = run(json!({"k": 1}), &["!pry"]);
        assert_eq!(interp.state().level(), 1);
        assert_eq!(interp.state().nesting.current().receiver(), &json!({"k": 1}));
    }

    #[test]
    fn runtime_alias() {
        let (interp, out) = run(json!({}), &["alias q! exit-program", "q!"]);
        assert_eq!(out, "`q!` is now an alias of `exit-program`\n");
        assert!(interp.state().should_exit);

        let (_, out) = run(json!({}), &["alias nope missing"]);
        assert_eq!(out, "Error: unknown command: missing\n");
    }

    #[test]
    fn show_command_describes_descriptor() {
        let (_, out) = run(json!({}), &["show-command inspect"]);
        assert!(out.starts_with("Name: cat\nAliases: inspect\n"));
        assert!(out.contains("Matches: by name\n"));
        let (_, out) = run(json!({}), &["show-command ls"]);
        assert!(out.contains("Options:\n"));
        assert!(out.contains("-f, --filter VALUE"));
    }

    #[test]
    #[cfg(unix)]
    fn shell_escape_forwards_text() {
        let (_, out) = run(json!({}), &[".echo 'hi  there'"]);
        assert_eq!(out, "hi  there\n");
    }
}
