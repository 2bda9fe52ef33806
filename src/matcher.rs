//! Deciding which command, if any, handles an input line.

use crate::command::{CommandDescriptor, Matcher};
use crate::lexer::split_first_word;
use crate::registry::CommandRegistry;
use std::rc::Rc;

/// A line resolved to a command.
#[derive(Debug, Clone)]
pub struct LineMatch {
    pub descriptor: Rc<CommandDescriptor>,
    /// The word the user typed to invoke the command (a name, an alias, or
    /// the whole matched prefix for pattern commands).
    pub invoked_as: String,
    /// Everything after the command token.
    pub remainder: String,
}

/// Match `line` against the registry.
///
/// Names and aliases are tried first, on the first blank-delimited word.
/// Pattern commands are only consulted when that fails, in registration order.
pub fn match_line(registry: &CommandRegistry, line: &str) -> Option<LineMatch> {
    let (word, rest) = split_first_word(line);
    if word.is_empty() {
        return None;
    }

    if let Some(descriptor) = registry.lookup(word)
        && matches!(descriptor.matcher(), Matcher::Name)
    {
        log::debug!("`{word}` matched command `{}`", descriptor.name());
        return Some(LineMatch {
            descriptor,
            invoked_as: word.to_string(),
            remainder: rest.to_string(),
        });
    }

    let line = line.trim();
    for descriptor in registry.list(true) {
        let Matcher::Pattern(regex) = descriptor.matcher() else {
            continue;
        };
        let Some(captures) = regex.captures(line) else {
            continue;
        };
        let Some(whole) = captures.get(0) else {
            continue;
        };
        let remainder = match captures.get(1) {
            Some(group) => group.as_str(),
            None => &line[whole.end()..],
        };
        log::debug!("line matched pattern command `{}`", descriptor.name());
        return Some(LineMatch {
            invoked_as: whole.as_str().to_string(),
            remainder: remainder.trim().to_string(),
            descriptor,
        });
    }

    None
}
