use crate::builtin;
use crate::command::{CommandDescriptor, ControlSignal, Matcher};
use crate::config::ShellConfig;
use crate::context::CommandContext;
use crate::error::{EvaluationError, RegistryError};
use crate::eval::{Evaluator, JsonEvaluator};
use crate::external::tool_available;
use crate::io_adapters::LineSource;
use crate::lexer::{split_args, split_first_word};
use crate::matcher::match_line;
use crate::options::ParsedOptions;
use crate::registry::CommandRegistry;
use crate::render::{render_error, render_result};
use crate::state::SessionState;
use anyhow::Result;
use serde_json::Value;
use std::io::Write;
use std::rc::Rc;

/// What [`Interpreter::dispatch`] made of a line.
#[derive(Debug, Clone, PartialEq)]
pub enum DispatchOutcome {
    /// A command ran (or printed its usage) and produced this signal.
    Handled(ControlSignal),
    /// No name, alias or pattern matched. Carries the first word of the line.
    NoSuchCommand(String),
    /// The command matched but its arguments did not parse; the body did not run.
    ParseFailure(String),
}

/// The command-dispatch and nested-session engine.
///
/// Owns the registry, the shared session state, the evaluator and the output
/// sink. [`Interpreter::run_line`] handles one input line completely;
/// [`Interpreter::repl`] drives it from a [`LineSource`] until the top-level
/// session ends.
pub struct Interpreter {
    registry: CommandRegistry,
    state: SessionState,
    evaluator: Box<dyn Evaluator>,
    output: Box<dyn Write>,
}

impl Interpreter {
    /// Create an interpreter with an empty registry.
    pub fn new(
        root: Value,
        config: &ShellConfig,
        evaluator: Box<dyn Evaluator>,
        output: Box<dyn Write>,
    ) -> Self {
        let mut registry = CommandRegistry::new();
        registry.set_warn_on_redefine(config.warn_on_redefine);
        Self {
            registry,
            state: SessionState::new(root, config),
            evaluator,
            output,
        }
    }

    /// Create an interpreter with the built-in commands and the JSON evaluator.
    pub fn with_defaults(root: Value, config: &ShellConfig, output: Box<dyn Write>) -> Result<Self> {
        let mut interp = Self::new(root, config, Box::new(JsonEvaluator::new()), output);
        builtin::register_defaults(&mut interp.registry)?;
        Ok(interp)
    }

    pub fn register_command(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        self.registry.register(descriptor)
    }

    pub fn register_alias(&mut self, alias: &str, canonical: &str) -> Result<(), RegistryError> {
        self.registry.alias(alias, canonical)
    }

    pub fn list_commands(&self, include_hidden: bool) -> Vec<Rc<CommandDescriptor>> {
        self.registry.list(include_hidden)
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn prompt(&self) -> String {
        self.state.prompt_text()
    }

    /// Match `line` to a command, parse its options and run its body.
    ///
    /// Failures inside the body are reported to the output and turned into
    /// `Skip`; they never escape as errors. The returned `Err` is reserved for
    /// a broken output sink.
    pub fn dispatch(&mut self, line: &str) -> Result<DispatchOutcome> {
        let Some(found) = match_line(&self.registry, line) else {
            let (word, _) = split_first_word(line);
            log::debug!("no command matches `{word}`");
            return Ok(DispatchOutcome::NoSuchCommand(word.to_string()));
        };
        let descriptor = found.descriptor;
        let name = descriptor.name().to_string();

        if let Some(tool) = descriptor.required_tool()
            && !tool_available(tool)
        {
            log::warn!("`{name}` requires `{tool}`, which was not found on PATH");
        }

        let args = match descriptor.matcher() {
            Matcher::Pattern(_) => Vec::new(),
            Matcher::Name => match split_args(&found.remainder) {
                Ok(tokens) => tokens,
                Err(err) => {
                    return Ok(DispatchOutcome::ParseFailure(format!("{name}: {err}")));
                }
            },
        };

        let opts = if descriptor.schema().is_empty() {
            ParsedOptions::positional_only(args.clone())
        } else {
            match descriptor.schema().parse(&args) {
                Ok(opts) => opts,
                Err(err) => {
                    log::debug!("option parsing failed for `{name}`: {err}");
                    return Ok(DispatchOutcome::ParseFailure(format!("{name}: {err}")));
                }
            }
        };

        if opts.help_requested() {
            write!(self.output, "{}", descriptor.help_text())?;
            return Ok(DispatchOutcome::Handled(ControlSignal::Skip));
        }

        log::debug!("running `{name}` as `{}`", found.invoked_as);
        let handler = descriptor.handler();
        let result = {
            let mut ctx = CommandContext {
                output: &mut *self.output,
                evaluator: &mut *self.evaluator,
                registry: &mut self.registry,
                state: &mut self.state,
                args,
                trailing: found.remainder,
                invoked_as: found.invoked_as,
                keep_retval: descriptor.keeps_retval(),
            };
            handler.call(&mut ctx, &opts)
        };

        let signal = match result {
            Ok(signal) => signal,
            Err(err) => {
                log::debug!("`{name}` failed: {err:#}");
                writeln!(self.output, "{}", render_error(&err))?;
                ControlSignal::Skip
            }
        };

        if let ControlSignal::Continue(Some(value)) = &signal {
            self.record_result(value.clone(), descriptor.keeps_retval())?;
        }
        Ok(DispatchOutcome::Handled(signal))
    }

    /// Handle one line of input and record it in the history.
    ///
    /// Returns `Some(value)` when the line ended the top-level session.
    pub fn run_line(&mut self, line: &str) -> Result<Option<Value>> {
        let outcome = self.execute_line(line);
        self.state.history.push(line);
        outcome
    }

    fn execute_line(&mut self, line: &str) -> Result<Option<Value>> {
        if line.trim().is_empty() && self.state.pending.is_empty() {
            return Ok(None);
        }

        match self.dispatch(line)? {
            DispatchOutcome::Handled(signal) => self.apply_signal(signal),
            DispatchOutcome::ParseFailure(reason) => {
                writeln!(self.output, "Error: {reason}")?;
                Ok(None)
            }
            DispatchOutcome::NoSuchCommand(word) => {
                if self.state.evaluate_unmatched {
                    self.evaluate_input(line)?;
                } else {
                    writeln!(self.output, "Error: no such command `{word}`")?;
                }
                Ok(None)
            }
        }
    }

    /// Feed `line` to the evaluator, accumulating multi-line input.
    fn evaluate_input(&mut self, line: &str) -> Result<()> {
        self.state.pending.push_str(line);
        self.state.pending.push('\n');

        let evaluated = self
            .evaluator
            .evaluate(self.state.nesting.current().receiver(), &self.state.pending);
        match evaluated {
            Err(EvaluationError::Incomplete) => {
                log::debug!("input incomplete, waiting for more");
                Ok(())
            }
            Err(err) => {
                self.state.pending.clear();
                writeln!(self.output, "{err}")?;
                Ok(())
            }
            Ok(value) => {
                self.state.pending.clear();
                self.record_result(value, true)
            }
        }
    }

    /// Act on a command's control signal.
    ///
    /// A breakout to the current level completes the current session: a
    /// nested one is popped and its value handed to the level below, the
    /// top-level one ends the shell. An invalid target is reported and
    /// changes nothing.
    fn apply_signal(&mut self, signal: ControlSignal) -> Result<Option<Value>> {
        let ControlSignal::Breakout { level, value } = signal else {
            return Ok(None);
        };

        let unwind = match self.state.nesting.breakout(level, value) {
            Ok(unwind) => unwind,
            Err(err) => {
                log::debug!("rejected breakout: {err}");
                writeln!(self.output, "{err}")?;
                return Ok(None);
            }
        };
        self.state.pending.clear();

        let show = if unwind.is_current_level() {
            match self.state.nesting.leave() {
                Some(frame) => frame.keeps_retval(),
                None => {
                    log::info!("top-level session ended");
                    return Ok(Some(unwind.value));
                }
            }
        } else {
            unwind.discarded.first().is_some_and(|f| f.keeps_retval())
        };
        self.record_result(unwind.value, show)?;
        Ok(None)
    }

    /// Store `value` as the last result and optionally print it.
    fn record_result(&mut self, value: Value, show: bool) -> Result<()> {
        if show {
            writeln!(self.output, "{}", render_result(&value, self.state.color))?;
        }
        self.evaluator.set_local("_", value.clone());
        self.state.last_result = value;
        Ok(())
    }

    /// Read and run lines until the top-level session ends, `exit-program`
    /// is used, or input runs out.
    ///
    /// Returns the value the top-level session ended with, `null` otherwise.
    pub fn repl(&mut self, source: &mut dyn LineSource) -> Result<Value> {
        loop {
            self.output.flush()?;
            if self.state.should_exit {
                log::info!("exit requested");
                return Ok(Value::Null);
            }

            let prompt = self.prompt();
            let ended = match self.state.replay.pop_front() {
                Some(line) => {
                    writeln!(self.output, "{prompt}{line}")?;
                    self.execute_line(&line)?
                }
                None => match source.next_line(&prompt)? {
                    Some(line) => self.run_line(&line)?,
                    None => return Ok(Value::Null),
                },
            };

            if let Some(value) = ended {
                self.output.flush()?;
                return Ok(value);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::io_adapters::{MemWriter, ScriptSource};
    use crate::options::OptionSchema;
    use serde_json::json;
    use std::cell::RefCell;

    fn shell(root: Value) -> (Interpreter, Rc<RefCell<Vec<u8>>>) {
        let (out, handle) = MemWriter::with_handle();
        let config = ShellConfig {
            color: false,
            ..ShellConfig::default()
        };
        let interp = Interpreter::with_defaults(root, &config, Box::new(out)).unwrap();
        (interp, handle)
    }

    fn text(handle: &Rc<RefCell<Vec<u8>>>) -> String {
        MemWriter::contents(handle)
    }

    fn report(ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
        writeln!(
            ctx.output,
            "verbose={} filter={:?} rest={:?}",
            opts.present("verbose"),
            opts.value("filter"),
            opts.positionals()
        )?;
        Ok(ControlSignal::done())
    }

    #[test]
    fn config_turns_on_redefinition_warnings() {
        let config = ShellConfig {
            warn_on_redefine: true,
            ..ShellConfig::default()
        };
        let mut interp =
            Interpreter::with_defaults(json!({}), &config, Box::new(MemWriter::new())).unwrap();
        assert!(interp.registry().warns_on_redefine());
        interp
            .register_command(CommandDescriptor::new("version", "Replaced.", report))
            .unwrap();
        interp
            .register_command(CommandDescriptor::new("version", "Replaced again.", report))
            .unwrap();
        let found = interp.registry().lookup("version").unwrap();
        assert_eq!(found.description(), "Replaced again.");
    }

    #[test]
    fn unknown_command_leaves_state_untouched() {
        let (out, _handle) = MemWriter::with_handle();
        let mut interp = Interpreter::new(
            json!({}),
            &ShellConfig::default(),
            Box::new(JsonEvaluator::new()),
            Box::new(out),
        );
        let before = interp.list_commands(true).len();
        assert_eq!(
            interp.dispatch("frobnicate").unwrap(),
            DispatchOutcome::NoSuchCommand("frobnicate".into())
        );
        assert_eq!(interp.list_commands(true).len(), before);
        assert_eq!(interp.state().level(), 0);
    }

    #[test]
    fn options_are_parsed_before_the_body_runs() {
        let (mut interp, handle) = shell(json!({}));
        interp
            .register_command(
                CommandDescriptor::new("report", "", report).options(
                    OptionSchema::new()
                        .switch('v', "verbose", "")
                        .value('f', "filter", "")
                        .with_help(),
                ),
            )
            .unwrap();
        interp.run_line("report -v -f foo").unwrap();
        assert_eq!(
            text(&handle),
            "verbose=true filter=Some(\"foo\") rest=[]\n"
        );
    }

    #[test]
    fn help_flag_prevents_the_body_from_running() {
        let (mut interp, handle) = shell(json!({}));
        interp
            .register_command(
                CommandDescriptor::new("report", "Report things.", report)
                    .usage("Usage: report [OPTIONS]")
                    .options(OptionSchema::new().switch('v', "verbose", "").with_help()),
            )
            .unwrap();
        let outcome = interp.dispatch("report -v --help").unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled(ControlSignal::Skip));
        let out = text(&handle);
        assert!(out.starts_with("Usage: report [OPTIONS]\nReport things.\n"));
        assert!(!out.contains("verbose="));
    }

    #[test]
    fn unknown_option_is_a_parse_failure() {
        let (mut interp, handle) = shell(json!({}));
        interp
            .register_command(
                CommandDescriptor::new("report", "", report)
                    .options(OptionSchema::new().value('f', "filter", "")),
            )
            .unwrap();
        assert_eq!(
            interp.dispatch("report -x").unwrap(),
            DispatchOutcome::ParseFailure("report: unknown option: -x".into())
        );
        assert_eq!(
            interp.dispatch("report -f").unwrap(),
            DispatchOutcome::ParseFailure("report: missing value for option -f/--filter".into())
        );
        assert!(text(&handle).is_empty());
    }

    #[test]
    fn quit_and_exit_break_out_of_the_current_level() {
        let (mut interp, _handle) = shell(json!({"a": {"b": {"c": 1}}}));
        interp.run_line("cd a").unwrap();
        interp.run_line("cd b").unwrap();
        assert_eq!(interp.state().level(), 2);

        let outcome = interp.dispatch("quit 5").unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Handled(ControlSignal::breakout(2, json!(5)))
        );
        let outcome = interp.dispatch("exit 5").unwrap();
        assert_eq!(
            outcome,
            DispatchOutcome::Handled(ControlSignal::breakout(2, json!(5)))
        );
    }

    #[test]
    fn exit_in_nested_session_shows_value_below() {
        let (mut interp, handle) = shell(json!({"a": {"b": 2}}));
        interp.run_line("cd a").unwrap();
        assert_eq!(interp.run_line("exit b").unwrap(), None);
        assert_eq!(interp.state().level(), 0);
        assert_eq!(interp.state().last_result, json!(2));
        assert!(text(&handle).ends_with("=> 2\n"));
    }

    #[test]
    fn invalid_breakout_is_reported_and_ignored() {
        let (mut interp, handle) = shell(json!({"a": {}}));
        interp.run_line("cd a").unwrap();
        interp.run_line("jump-to 5").unwrap();
        assert_eq!(interp.state().level(), 1);
        assert!(text(&handle).contains("Invalid nest level. Must be between 0 and 1. Got 5."));
    }

    #[test]
    fn exit_at_top_level_ends_the_shell() {
        let (mut interp, _handle) = shell(json!({}));
        assert_eq!(interp.run_line("exit 42").unwrap(), Some(json!(42)));
    }

    #[test]
    fn body_errors_become_diagnostics() {
        let (mut interp, handle) = shell(json!({}));
        let outcome = interp.dispatch("cat missing").unwrap();
        assert_eq!(outcome, DispatchOutcome::Handled(ControlSignal::Skip));
        assert_eq!(
            text(&handle),
            "NameError: undefined local variable or key `missing`\n"
        );
    }

    #[test]
    fn unmatched_input_is_evaluated_across_lines() {
        let (mut interp, handle) = shell(json!({}));
        interp.run_line("[1,").unwrap();
        assert_eq!(interp.state().pending, "[1,\n");
        assert!(interp.prompt().ends_with("* "));
        interp.run_line("3]").unwrap();
        assert!(interp.state().pending.is_empty());
        assert_eq!(interp.state().last_result, json!([1, 3]));
        assert_eq!(text(&handle), "=> [\n  1,\n  3\n]\n");
    }

    #[test]
    fn unmatched_input_can_be_rejected() {
        let (out, handle) = MemWriter::with_handle();
        let config = ShellConfig {
            evaluate_unmatched: false,
            ..ShellConfig::default()
        };
        let mut interp = Interpreter::with_defaults(json!({}), &config, Box::new(out)).unwrap();
        interp.run_line("frobnicate").unwrap();
        assert_eq!(text(&handle), "Error: no such command `frobnicate`\n");
    }

    #[test]
    fn repl_stops_on_exit_program() {
        let (mut interp, handle) = shell(json!({}));
        let mut src = ScriptSource::new(["version", "exit-program", "version"]);
        assert_eq!(interp.repl(&mut src).unwrap(), Value::Null);
        assert_eq!(src.remaining(), 1);
        assert_eq!(text(&handle).matches("session_shell").count(), 1);
    }

    #[test]
    fn repl_runs_replayed_lines_first() {
        let (mut interp, handle) = shell(json!({"x": 1}));
        let mut src = ScriptSource::new(["x", "hist -r 1", "exit"]);
        interp.repl(&mut src).unwrap();
        assert_eq!(text(&handle).matches("=> 1").count(), 2);
    }
}
