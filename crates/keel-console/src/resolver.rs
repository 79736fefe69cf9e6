//! Resolver: turns tokenized input into a validated [`Command`].
//!
//! For each input the resolver asks the registry for the registrations
//! selected by the input's path, then acts on the answer:
//!
//! - no match: the input is unrecognized;
//! - several matches: the line is re-submitted as `help <line>`;
//! - one match: a command is built and its options are validated. Valid
//!   commands go to the executor, invalid ones are reported.

use crate::actor::{Addr, Mailbox, Recipient};
use crate::command::Command;
use crate::executor::ExecutorMsg;
use crate::input::{TokenizedInput, UserInput};
use crate::output::{InvalidInput, UnrecognizedCommand};
use crate::registration::{RegistrationLookup, RegistrationResponse};
use crate::registry::RegistryMsg;

/// Prefix used to turn an ambiguous line into a help request.
pub const HELP_PREFIX: &str = "help ";

/// Resolver inbox.
#[derive(Debug)]
pub enum ResolverMsg {
    Input(TokenizedInput),
    Matched(RegistrationResponse),
}

impl From<TokenizedInput> for ResolverMsg {
    fn from(input: TokenizedInput) -> Self {
        ResolverMsg::Input(input)
    }
}

impl From<RegistrationResponse> for ResolverMsg {
    fn from(response: RegistrationResponse) -> Self {
        ResolverMsg::Matched(response)
    }
}

/// Resolver stage state.
pub struct Resolver {
    registry: Addr<RegistryMsg>,
    tokenizer: Addr<UserInput>,
    executor: Addr<ExecutorMsg>,
    /// Where the registry should send lookup results.
    matches: Recipient<RegistrationResponse>,
}

impl Resolver {
    pub fn new(
        registry: Addr<RegistryMsg>,
        tokenizer: Addr<UserInput>,
        executor: Addr<ExecutorMsg>,
        matches: Recipient<RegistrationResponse>,
    ) -> Self {
        Self {
            registry,
            tokenizer,
            executor,
            matches,
        }
    }

    pub fn handle(&self, msg: ResolverMsg) {
        match msg {
            ResolverMsg::Input(input) => self.lookup(input),
            ResolverMsg::Matched(response) => self.resolve(response),
        }
    }

    fn lookup(&self, input: TokenizedInput) {
        match RegistrationLookup::for_input(input.clone()) {
            Ok(lookup) => {
                log::debug!("looking up {:?}", lookup.paths());
                self.registry.tell(RegistryMsg::Lookup {
                    lookup,
                    reply_to: self.matches.clone(),
                });
            },
            Err(e) => {
                log::debug!("no command path in {:?}: {e}", input.input().text());
                self.executor.tell(UnrecognizedCommand::new(input));
            },
        }
    }

    fn resolve(&self, response: RegistrationResponse) {
        let Some(origin) = response.origin().cloned() else {
            log::warn!("registry response without originating input ignored");
            return;
        };

        let mut registrations = response.into_registrations().into_iter();
        match (registrations.next(), registrations.next()) {
            (None, _) => {
                log::debug!("no command matches {:?}", origin.input().text());
                self.executor.tell(UnrecognizedCommand::new(origin));
            },
            (Some(_), Some(_)) => {
                let retry = format!("{HELP_PREFIX}{}", origin.input().text());
                log::debug!("ambiguous input {:?}, retrying as {retry:?}", origin.input().text());
                self.tokenizer.tell(UserInput::new(&retry));
            },
            (Some(registration), None) => {
                let user_input = origin.input().clone();
                let command = match Command::new(registration, origin) {
                    Ok(command) => command,
                    Err(e) => {
                        self.executor.tell(InvalidInput::new(user_input, e.to_string(), None));
                        return;
                    },
                };
                match command.parse_options() {
                    Ok(_) => {
                        log::debug!(
                            "resolved {:?} to '{}'",
                            user_input.text(),
                            command.registration().path()
                        );
                        self.executor.tell(command);
                    },
                    Err(e) => self.executor.tell(InvalidInput::options(user_input, &e)),
                }
            },
        }
    }
}

/// Resolver task.
pub async fn run_resolver(mut mailbox: Mailbox<ResolverMsg>, resolver: Resolver) {
    while let Some(msg) = mailbox.recv().await {
        resolver.handle(msg);
    }
    log::debug!("resolver stopped");
}
