//! Command registry: canonical names, aliases and listing order.

use crate::command::CommandDescriptor;
use crate::error::RegistryError;
use std::collections::HashMap;
use std::rc::Rc;

/// Table of registered commands.
///
/// Descriptors are keyed by canonical name and kept in registration order.
/// Aliases store the canonical *name*, so redefining a command rebinds every
/// alias that points at it.
#[derive(Default)]
pub struct CommandRegistry {
    commands: Vec<Rc<CommandDescriptor>>,
    index: HashMap<String, usize>,
    aliases: HashMap<String, String>,
    alias_order: Vec<String>,
    warn_on_redefine: bool,
}

/// One row of the help index.
#[derive(Debug, Clone)]
pub struct HelpEntry {
    pub descriptor: Rc<CommandDescriptor>,
    pub aliases: Vec<String>,
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Log a warning whenever a registration replaces an existing command.
    pub fn set_warn_on_redefine(&mut self, warn: bool) {
        self.warn_on_redefine = warn;
    }

    pub fn warns_on_redefine(&self) -> bool {
        self.warn_on_redefine
    }

    /// Insert `descriptor`, replacing any command registered under the same name.
    ///
    /// A replaced command keeps its place in the listing order. An alias with
    /// the same name as the new command is dropped, since canonical names win.
    pub fn register(&mut self, descriptor: CommandDescriptor) -> Result<(), RegistryError> {
        descriptor
            .schema()
            .validate()
            .map_err(|source| RegistryError::InvalidSchema {
                command: descriptor.name().to_string(),
                source,
            })?;

        let name = descriptor.name().to_string();
        if self.aliases.remove(&name).is_some() {
            self.alias_order.retain(|a| *a != name);
            log::debug!("command `{name}` replaces an alias of the same name");
        }

        let descriptor = Rc::new(descriptor);
        match self.index.get(&name) {
            Some(&pos) => {
                if self.warn_on_redefine {
                    log::warn!("redefining command `{name}`");
                } else {
                    log::debug!("redefining command `{name}`");
                }
                self.commands[pos] = descriptor;
            }
            None => {
                log::debug!("registering command `{name}`");
                self.index.insert(name, self.commands.len());
                self.commands.push(descriptor);
            }
        }
        Ok(())
    }

    /// Make `alias` resolve to `canonical`.
    ///
    /// If `canonical` is itself an alias, the new alias points at its target,
    /// so alias chains never form.
    pub fn alias(&mut self, alias: &str, canonical: &str) -> Result<(), RegistryError> {
        let target = self.canonical_name(canonical).map(str::to_string);
        let Some(target) = target else {
            return Err(RegistryError::UnknownCommand(canonical.to_string()));
        };
        if self.index.contains_key(alias) {
            return Err(RegistryError::AliasShadowsCommand(alias.to_string()));
        }
        if self.aliases.insert(alias.to_string(), target).is_none() {
            self.alias_order.push(alias.to_string());
        }
        Ok(())
    }

    /// Canonical name for `name`, which may be an alias.
    pub fn canonical_name<'a>(&'a self, name: &'a str) -> Option<&'a str> {
        if self.index.contains_key(name) {
            return Some(name);
        }
        self.aliases.get(name).map(String::as_str)
    }

    /// Resolve aliases and return the descriptor.
    pub fn lookup(&self, name: &str) -> Option<Rc<CommandDescriptor>> {
        let canonical = self.canonical_name(name)?;
        let &pos = self.index.get(canonical)?;
        Some(Rc::clone(&self.commands[pos]))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.canonical_name(name).is_some()
    }

    /// Descriptors in registration order.
    pub fn list(&self, include_hidden: bool) -> Vec<Rc<CommandDescriptor>> {
        self.commands
            .iter()
            .filter(|d| include_hidden || !d.is_hidden())
            .cloned()
            .collect()
    }

    /// Aliases of `name` in the order they were added.
    pub fn aliases_of(&self, name: &str) -> Vec<String> {
        let Some(canonical) = self.canonical_name(name) else {
            return Vec::new();
        };
        self.alias_order
            .iter()
            .filter(|a| self.aliases.get(*a).map(String::as_str) == Some(canonical))
            .cloned()
            .collect()
    }

    /// Visible commands with their aliases, in registration order.
    pub fn help_index(&self) -> Vec<HelpEntry> {
        self.list(false)
            .into_iter()
            .map(|descriptor| HelpEntry {
                aliases: self.aliases_of(descriptor.name()),
                descriptor,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}
