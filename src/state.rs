use crate::config::ShellConfig;
use crate::render::view_clip;
use crate::session::SessionStack;
use serde_json::Value;
use std::collections::VecDeque;

/// Which prompt the read loop shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PromptStyle {
    /// `session(<receiver>):<level>> `
    Default,
    /// `>> `
    Simple,
}

/// Input lines seen so far, oldest first, capped at `limit` entries.
#[derive(Debug, Clone)]
pub struct History {
    lines: VecDeque<String>,
    limit: usize,
}

impl History {
    pub fn new(limit: usize) -> Self {
        Self {
            lines: VecDeque::new(),
            limit,
        }
    }

    pub fn push(&mut self, line: &str) {
        if self.limit == 0 || line.trim().is_empty() {
            return;
        }
        if self.lines.len() == self.limit {
            self.lines.pop_front();
        }
        self.lines.push_back(line.to_string());
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    /// Lines `start..=end`, 0-based; out-of-range ends are clamped.
    pub fn range(&self, start: usize, end: usize) -> Vec<String> {
        self.lines
            .iter()
            .skip(start)
            .take(end.saturating_sub(start) + 1)
            .cloned()
            .collect()
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }
}

/// Mutable shell state shared by every command invocation.
///
/// One instance exists per running shell; the read loop owns it and lends it to
/// each dispatch through a [`CommandContext`](crate::context::CommandContext).
#[derive(Debug, Clone)]
pub struct SessionState {
    pub nesting: SessionStack,
    /// Unfinished multi-line input waiting for more text.
    pub pending: String,
    pub color: bool,
    pub prompt: PromptStyle,
    /// Set by `exit-program`; the read loop stops before the next line.
    pub should_exit: bool,
    pub history: History,
    /// Lines queued by `hist --replay`, run before the line source is asked.
    pub replay: VecDeque<String>,
    pub last_result: Value,
    pub evaluate_unmatched: bool,
}

impl SessionState {
    pub fn new(root: Value, config: &ShellConfig) -> Self {
        Self {
            nesting: SessionStack::new(root),
            pending: String::new(),
            color: config.color,
            prompt: if config.simple_prompt {
                PromptStyle::Simple
            } else {
                PromptStyle::Default
            },
            should_exit: false,
            history: History::new(config.history_limit),
            replay: VecDeque::new(),
            last_result: Value::Null,
            evaluate_unmatched: config.evaluate_unmatched,
        }
    }

    pub fn level(&self) -> usize {
        self.nesting.depth()
    }

    /// Prompt for the next line, with the continuation form while input is pending.
    pub fn prompt_text(&self) -> String {
        let waiting = !self.pending.is_empty();
        match self.prompt {
            PromptStyle::Simple if waiting => " | ".to_string(),
            PromptStyle::Simple => ">> ".to_string(),
            PromptStyle::Default => {
                let clip = view_clip(self.nesting.current().receiver());
                let level = match self.level() {
                    0 => String::new(),
                    n => format!(":{n}"),
                };
                let marker = if waiting { '*' } else { '>' };
                format!("session({clip}){level}{marker} ")
            }
        }
    }

    pub fn toggle_prompt(&mut self) -> PromptStyle {
        self.prompt = match self.prompt {
            PromptStyle::Default => PromptStyle::Simple,
            PromptStyle::Simple => PromptStyle::Default,
        };
        self.prompt
    }
}
