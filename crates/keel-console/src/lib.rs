//! Command engine for the KEEL cluster console.
//!
//! Operator input flows through a chain of stages, each running as its own
//! tokio task: the filter drops blank and comment lines, the tokenizer
//! splits the line into tokens, the resolver asks the registry which
//! registered command the tokens name and validates its options, and the
//! executor routes the resulting command to the handler that owns it.
//! Everything the handlers produce is rendered by the console loop.

pub mod actor;
pub mod command;
pub mod console;
pub mod executor;
pub mod filter;
pub mod handler;
pub mod input;
pub mod options;
pub mod output;
pub mod path;
pub mod pipeline;
pub mod registration;
pub mod registry;
pub mod resolver;
pub mod tokenizer;

/// Typed address of a stage's mailbox.
pub use actor::{Addr, Recipient};
/// A resolved, validated command invocation.
pub use command::Command;
/// The interactive read/render loop.
pub use console::Console;
/// Trait implemented by command handlers, and the context they run with.
pub use handler::{CommandHandler, HandlerContext};
/// A raw input line and its tokens.
pub use input::{TokenizedInput, UserInput};
/// Declarative command options.
pub use options::{CliOption, OptionDef, OptionError, OptionSet, ParsedOptions};
/// Messages rendered by the console.
pub use output::{ConsoleEvent, ConsoleOutput, InvalidInput, UnrecognizedCommand};
/// Sequence of command name segments.
pub use path::CommandPath;
/// Pipeline construction.
pub use pipeline::{Pipeline, PipelineBuilder};
/// Command registrations and the handler protocol.
pub use registration::{
    HandlerMsg, HandlerRef, Registration, RegistrationLookup, RegistrationReply,
    RegistrationRequest, RegistrationResponse,
};
/// Registry inbox.
pub use registry::RegistryMsg;
/// Split a line into tokens.
pub use tokenizer::{TokenizeError, tokenize};
