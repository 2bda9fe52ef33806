//! An interactive shell with an extensible command set and nested sessions.
//!
//! Every input line is first offered to the [`CommandRegistry`]: a matching
//! command has its options parsed against its schema and its body run against
//! a [`CommandContext`]. The body answers with a [`ControlSignal`], which may
//! ask the [`SessionStack`] to unwind to an outer session. Lines that match no
//! command go to an [`Evaluator`]; the shell ships [`JsonEvaluator`], which
//! navigates JSON documents.
//!
//! [`Interpreter`] ties the pieces together and is the usual entry point.

mod builtin;
pub mod command;
pub mod config;
pub mod context;
pub mod error;
pub mod eval;
pub mod external;
mod interpreter;
pub mod io_adapters;
mod lexer;
pub mod matcher;
pub mod options;
pub mod registry;
pub mod render;
pub mod session;
pub mod state;

pub use builtin::register_defaults;
pub use command::{CommandDescriptor, ControlSignal, Handler};
pub use config::ShellConfig;
pub use context::CommandContext;
pub use eval::{Evaluator, JsonEvaluator};
pub use interpreter::{DispatchOutcome, Interpreter};
pub use io_adapters::{EditorSource, LineSource, MemWriter, ScriptSource};
pub use options::{OptionSchema, ParsedOptions};
pub use registry::CommandRegistry;
pub use session::SessionStack;
pub use state::SessionState;
