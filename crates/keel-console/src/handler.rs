//! Command handlers.
//!
//! A handler is any type implementing [`CommandHandler`]. [`spawn_handler`]
//! runs it as its own task: it answers the registry's startup broadcast
//! with [`CommandHandler::registrations`], runs each resolved command with
//! [`CommandHandler::execute`], and feeds replies from collaborators it
//! talks to back through [`CommandHandler::on_reply`].

use keel_types::error::{KeelError, Result};

use crate::actor::{Addr, Mailbox, Recipient};
use crate::command::Command;
use crate::output::{ConsoleEvent, ConsoleOutput};
use crate::registration::{HandlerMsg, HandlerRef, Registration, RegistrationResponse};
use crate::registry::RegistryMsg;

/// A command implementation.
pub trait CommandHandler: Send + 'static {
    /// Replies this handler expects from collaborators (the registry, the
    /// persistence layer). Use `()` when it talks to nobody.
    type Reply: Send + 'static;

    /// Task name, used in logs.
    fn name(&self) -> &str;

    /// Commands implemented by this handler. `handler` is the reference to
    /// put in each registration.
    fn registrations(&self, handler: &HandlerRef) -> Result<Vec<Registration>>;

    /// Run one command. Output goes through `ctx`; every command must end
    /// with output that does not have more to follow.
    fn execute(&mut self, command: Command, ctx: &HandlerContext<Self::Reply>) -> Result<()>;

    /// A collaborator answered.
    fn on_reply(&mut self, reply: Self::Reply, ctx: &HandlerContext<Self::Reply>) -> Result<()> {
        let _ = (reply, ctx);
        Ok(())
    }
}

/// What a running handler can talk to.
pub struct HandlerContext<R> {
    console: Recipient<ConsoleEvent>,
    registry: Addr<RegistryMsg>,
    reply_to: Recipient<R>,
}

impl<R: 'static> HandlerContext<R> {
    pub fn new(
        console: Recipient<ConsoleEvent>,
        registry: Addr<RegistryMsg>,
        reply_to: Recipient<R>,
    ) -> Self {
        Self {
            console,
            registry,
            reply_to,
        }
    }

    pub fn emit(&self, event: impl Into<ConsoleEvent>) {
        self.console.tell(event.into());
    }

    /// A line with more output to follow.
    pub fn line(&self, text: impl Into<String>) {
        self.emit(ConsoleOutput::line(text));
    }

    /// The final line of a response.
    pub fn last(&self, text: impl Into<String>) {
        self.emit(ConsoleOutput::last(text));
    }

    /// End the response without further text.
    pub fn done(&self) {
        self.emit(ConsoleOutput::accept_input());
    }

    pub fn terminate(&self, text: Option<String>) {
        self.emit(ConsoleOutput::terminate(text));
    }

    pub fn registry(&self) -> &Addr<RegistryMsg> {
        &self.registry
    }

    /// Address for collaborator replies to this handler.
    pub fn reply_to(&self) -> &Recipient<R> {
        &self.reply_to
    }
}

enum Envelope<R> {
    Core(HandlerMsg),
    Reply(R),
}

/// Run `handler` as a task and return its reference.
///
/// Must be called from within a tokio runtime.
pub fn spawn_handler<H: CommandHandler>(
    handler: H,
    console: Recipient<ConsoleEvent>,
    registry: Addr<RegistryMsg>,
) -> HandlerRef {
    let (addr, mailbox) = Addr::<Envelope<H::Reply>>::new(handler.name());
    let this = addr.recipient_with(Envelope::Core);
    let ctx = HandlerContext::new(console, registry, addr.recipient_with(Envelope::Reply));
    tokio::spawn(run_handler(handler, mailbox, this.clone(), ctx));
    this
}

async fn run_handler<H: CommandHandler>(
    mut handler: H,
    mut mailbox: Mailbox<Envelope<H::Reply>>,
    this: HandlerRef,
    ctx: HandlerContext<H::Reply>,
) {
    while let Some(envelope) = mailbox.recv().await {
        match envelope {
            Envelope::Core(HandlerMsg::Register { reply_to, .. }) => {
                let response = match handler.registrations(&this) {
                    Ok(registrations) => RegistrationResponse::new(registrations),
                    Err(e) => {
                        log::error!("{}: registration failed: {e}", handler.name());
                        RegistrationResponse::default()
                    },
                };
                log::debug!("{}: registering {} command(s)", handler.name(), response.len());
                reply_to.send(response);
            },
            Envelope::Core(HandlerMsg::Execute(command)) => {
                log::debug!("{}: running '{}'", handler.name(), command.path());
                if let Err(e) = handler.execute(command, &ctx) {
                    report(handler.name(), &e, &ctx);
                }
            },
            Envelope::Reply(reply) => {
                if let Err(e) = handler.on_reply(reply, &ctx) {
                    report(handler.name(), &e, &ctx);
                }
            },
        }
    }
    log::debug!("{} stopped", handler.name());
}

fn report<R: 'static>(name: &str, err: &KeelError, ctx: &HandlerContext<R>) {
    log::warn!("{name}: {err}");
    ctx.last(format!("error: {err}"));
}
