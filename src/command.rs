use crate::context::CommandContext;
use crate::options::{OptionSchema, ParsedOptions};
use anyhow::Result;
use regex::Regex;
use serde_json::Value;
use std::fmt;
use std::rc::Rc;

/// What a command body asks the read loop to do next.
#[derive(Debug, Clone, PartialEq)]
pub enum ControlSignal {
    /// Ordinary completion, optionally carrying the body's natural result.
    ///
    /// The result is only shown when the descriptor retains return values.
    Continue(Option<Value>),
    /// Stop here and read the next line at the same nesting level.
    Skip,
    /// Unwind to `level`, delivering `value` there.
    ///
    /// The level is signed so that a body can forward whatever the user typed;
    /// validation happens in [`SessionStack::breakout`](crate::session::SessionStack::breakout).
    Breakout { level: i64, value: Value },
}

impl ControlSignal {
    /// Plain completion without a value.
    pub fn done() -> Self {
        ControlSignal::Continue(None)
    }

    pub fn breakout(level: impl Into<i64>, value: Value) -> Self {
        ControlSignal::Breakout {
            level: level.into(),
            value,
        }
    }
}

/// The single operation every command body implements.
///
/// Closures and plain functions with the right signature implement it through
/// the blanket impl below, so a command is usually just a `fn`.
pub trait Handler {
    fn call(&self, ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal>;
}

impl<F> Handler for F
where
    F: Fn(&mut CommandContext<'_>, &ParsedOptions) -> Result<ControlSignal>,
{
    fn call(&self, ctx: &mut CommandContext<'_>, opts: &ParsedOptions) -> Result<ControlSignal> {
        self(ctx, opts)
    }
}

/// Whether a command shows up in `help`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Listing {
    Visible,
    Hidden,
}

/// How the input matcher recognises a command.
#[derive(Debug, Clone)]
pub enum Matcher {
    /// The first word of the line equals the name or one of its aliases.
    Name,
    /// Tried only after every name and alias failed. Capture group 1, if any,
    /// is the remainder; otherwise the text after the match is.
    Pattern(Regex),
}

/// Registered definition of one command.
#[derive(Clone)]
pub struct CommandDescriptor {
    name: String,
    display_name: Option<String>,
    description: String,
    banner: Option<String>,
    listing: Listing,
    options: OptionSchema,
    requires: Option<String>,
    keep_retval: bool,
    matcher: Matcher,
    handler: Rc<dyn Handler>,
}

impl CommandDescriptor {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        handler: impl Handler + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: None,
            description: description.into(),
            banner: None,
            listing: Listing::Visible,
            options: OptionSchema::new(),
            requires: None,
            keep_retval: false,
            matcher: Matcher::Name,
            handler: Rc::new(handler),
        }
    }

    /// Keep the command out of `help`.
    pub fn hidden(mut self) -> Self {
        self.listing = Listing::Hidden;
        self
    }

    pub fn options(mut self, schema: OptionSchema) -> Self {
        self.options = schema;
        self
    }

    /// Usage banner printed above the option lines, e.g. `Usage: ls [OPTIONS]`.
    pub fn usage(mut self, banner: impl Into<String>) -> Self {
        self.banner = Some(banner.into());
        self
    }

    /// Advisory: the command needs an external tool to do its work.
    pub fn requires(mut self, tool: impl Into<String>) -> Self {
        self.requires = Some(tool.into());
        self
    }

    /// Show the body's result (or the result of the session it opens) as `=> value`.
    pub fn keep_retval(mut self) -> Self {
        self.keep_retval = true;
        self
    }

    /// Match lines by regular expression instead of by name.
    pub fn pattern(mut self, regex: Regex) -> Self {
        self.matcher = Matcher::Pattern(regex);
        self
    }

    /// Name shown in listings when it differs from the registry key.
    pub fn display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn shown_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.name)
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    pub fn listing(&self) -> Listing {
        self.listing
    }

    pub fn is_hidden(&self) -> bool {
        self.listing == Listing::Hidden
    }

    pub fn schema(&self) -> &OptionSchema {
        &self.options
    }

    pub fn required_tool(&self) -> Option<&str> {
        self.requires.as_deref()
    }

    pub fn keeps_retval(&self) -> bool {
        self.keep_retval
    }

    pub fn matcher(&self) -> &Matcher {
        &self.matcher
    }

    pub fn handler(&self) -> Rc<dyn Handler> {
        Rc::clone(&self.handler)
    }

    /// Usage text: banner followed by the option lines.
    pub fn help_text(&self) -> String {
        let mut text = String::new();
        if let Some(banner) = &self.banner {
            text.push_str(banner);
            text.push('\n');
        }
        if !self.description.is_empty() {
            text.push_str(&self.description);
            text.push('\n');
        }
        if !self.options.is_empty() {
            text.push_str("--\n");
            text.push_str(&self.options.usage());
            text.push('\n');
        }
        text
    }
}

impl fmt::Debug for CommandDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CommandDescriptor")
            .field("name", &self.name)
            .field("listing", &self.listing)
            .field("requires", &self.requires)
            .field("keep_retval", &self.keep_retval)
            .field("matcher", &self.matcher)
            .finish_non_exhaustive()
    }
}
