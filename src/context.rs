use crate::error::EvaluationError;
use crate::eval::Evaluator;
use crate::registry::CommandRegistry;
use crate::state::SessionState;
use serde_json::Value;
use std::io::Write;

/// Everything a command body can see and change during one invocation.
///
/// Built by the dispatcher for a single call and dropped when it returns.
pub struct CommandContext<'a> {
    pub output: &'a mut dyn Write,
    pub evaluator: &'a mut dyn Evaluator,
    pub registry: &'a mut CommandRegistry,
    pub state: &'a mut SessionState,
    /// Raw argument tokens, before option parsing.
    pub args: Vec<String>,
    /// The line text after the command token, untouched by the tokenizer.
    pub trailing: String,
    /// Name, alias or pattern text that selected the command.
    pub invoked_as: String,
    pub(crate) keep_retval: bool,
}

impl CommandContext<'_> {
    /// Receiver of the current session.
    pub fn target(&self) -> &Value {
        self.state.nesting.current().receiver()
    }

    pub fn level(&self) -> usize {
        self.state.nesting.depth()
    }

    /// Evaluate `source` against the current receiver.
    pub fn eval(&mut self, source: &str) -> Result<Value, EvaluationError> {
        self.evaluator
            .evaluate(self.state.nesting.current().receiver(), source)
    }

    /// Open a nested session on `receiver`.
    ///
    /// The new frame remembers whether this command retains return values, so
    /// the value the session ends with is shown when control comes back.
    pub fn enter(&mut self, receiver: Value, label: impl Into<String>) -> usize {
        self.state.pending.clear();
        self.state.nesting.push(receiver, label, self.keep_retval)
    }
}
