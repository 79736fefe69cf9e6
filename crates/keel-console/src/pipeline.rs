//! Wiring of the pipeline stages.
//!
//! ```text
//! line -> filter -> tokenizer -> resolver <-> registry
//!                                   |
//!                                   v
//!                               executor -> handler -> console
//! ```
//!
//! [`PipelineBuilder`] creates every mailbox up front so handlers can be
//! given the console and registry addresses before anything runs;
//! [`PipelineBuilder::start`] spawns the stages.

use tokio::io::{AsyncBufRead, AsyncWrite};

use crate::actor::{Addr, Mailbox, Recipient};
use crate::console::Console;
use crate::executor::{ExecutorMsg, run_executor};
use crate::filter::run_filter;
use crate::handler::{CommandHandler, spawn_handler};
use crate::input::UserInput;
use crate::output::ConsoleEvent;
use crate::registration::HandlerRef;
use crate::registry::{RegistryMsg, run_registry};
use crate::resolver::{Resolver, ResolverMsg, run_resolver};
use crate::tokenizer::run_tokenizer;

/// A stage's address together with the mailbox it will drain.
struct Stage<M> {
    addr: Addr<M>,
    mailbox: Mailbox<M>,
}

impl<M: Send + 'static> Stage<M> {
    fn new(name: &str) -> Self {
        let (addr, mailbox) = Addr::new(name);
        Self { addr, mailbox }
    }
}

/// Collects handlers, then starts the pipeline.
pub struct PipelineBuilder {
    filter: Stage<UserInput>,
    tokenizer: Stage<UserInput>,
    resolver: Stage<ResolverMsg>,
    registry: Stage<RegistryMsg>,
    executor: Stage<ExecutorMsg>,
    console: Stage<ConsoleEvent>,
    handlers: Vec<HandlerRef>,
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            filter: Stage::new("filter"),
            tokenizer: Stage::new("tokenizer"),
            resolver: Stage::new("resolver"),
            registry: Stage::new("registry"),
            executor: Stage::new("executor"),
            console: Stage::new("console"),
            handlers: Vec::new(),
        }
    }

    /// Where handler output goes.
    pub fn console(&self) -> Recipient<ConsoleEvent> {
        self.console.addr.recipient()
    }

    pub fn registry(&self) -> Addr<RegistryMsg> {
        self.registry.addr.clone()
    }

    /// Add an already running handler to the registration broadcast.
    pub fn add_handler(&mut self, handler: HandlerRef) {
        self.handlers.push(handler);
    }

    /// Spawn `handler` and add it to the registration broadcast.
    pub fn spawn_handler<H: CommandHandler>(&mut self, handler: H) -> HandlerRef {
        let handler = spawn_handler(handler, self.console(), self.registry());
        self.add_handler(handler.clone());
        handler
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    /// Spawn every stage. Must be called from within a tokio runtime.
    pub fn start(self, await_registrations: bool) -> Pipeline {
        let Self {
            filter,
            tokenizer,
            resolver,
            registry,
            executor,
            console,
            handlers,
        } = self;
        log::info!(
            "Starting pipeline with {} handler(s), registration barrier {}",
            handlers.len(),
            if await_registrations { "on" } else { "off" }
        );

        tokio::spawn(run_registry(
            registry.mailbox,
            registry.addr.recipient(),
            handlers,
            await_registrations,
        ));
        tokio::spawn(run_resolver(
            resolver.mailbox,
            Resolver::new(
                registry.addr,
                tokenizer.addr.clone(),
                executor.addr.clone(),
                resolver.addr.recipient(),
            ),
        ));
        tokio::spawn(run_tokenizer(
            tokenizer.mailbox,
            resolver.addr,
            executor.addr.clone(),
        ));
        tokio::spawn(run_filter(
            filter.mailbox,
            tokenizer.addr,
            console.addr.recipient(),
        ));
        tokio::spawn(run_executor(executor.mailbox, console.addr.recipient()));

        Pipeline {
            input: filter.addr,
            events: console.mailbox,
        }
    }
}

/// A running pipeline: lines in, console events out.
pub struct Pipeline {
    input: Addr<UserInput>,
    events: Mailbox<ConsoleEvent>,
}

impl Pipeline {
    /// Feed one raw line.
    pub fn submit(&self, line: &str) {
        self.input.tell(UserInput::new(line));
    }

    /// Next event for the console, or `None` once every sender is gone.
    pub async fn next_event(&mut self) -> Option<ConsoleEvent> {
        self.events.recv().await
    }

    /// Attach the pipeline to a reader and a writer.
    pub fn into_console<R, W>(self, reader: R, writer: W) -> Console<R, W>
    where
        R: AsyncBufRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        Console::new(reader, writer, self.input, self.events)
    }
}
