//! The registry: sole owner of every command registration.
//!
//! At startup the registry asks each handler for its registrations and folds
//! the answers into an ordered map keyed by path (last writer wins). It then
//! answers lookups with every registration whose path is selected by one of
//! the looked-up paths, and listing requests with everything it holds.
//!
//! With the registration barrier enabled, lookups and listings that arrive
//! before every handler has answered are held back in arrival order and
//! answered as soon as the last handler reports in. With it disabled, early
//! queries see whatever has been registered so far.

use std::collections::{BTreeMap, VecDeque};

use crate::actor::{Mailbox, Recipient};
use crate::path::CommandPath;
use crate::registration::{
    HandlerMsg, HandlerRef, Registration, RegistrationLookup, RegistrationReply,
    RegistrationRequest, RegistrationResponse,
};

/// Registry inbox.
#[derive(Debug)]
pub enum RegistryMsg {
    /// A handler's answer to the startup broadcast.
    Registered(RegistrationResponse),
    /// Registrations matching the lookup's paths.
    Lookup {
        lookup: RegistrationLookup,
        reply_to: Recipient<RegistrationResponse>,
    },
    /// Every registration.
    List {
        request: RegistrationRequest,
        reply_to: Recipient<RegistrationResponse>,
    },
}

impl From<RegistrationResponse> for RegistryMsg {
    fn from(response: RegistrationResponse) -> Self {
        RegistryMsg::Registered(response)
    }
}

/// A query waiting for the barrier. `lookup == None` is a listing.
#[derive(Debug)]
struct HeldQuery {
    lookup: Option<RegistrationLookup>,
    reply_to: Recipient<RegistrationResponse>,
}

/// Registry state. Owned by exactly one task.
#[derive(Debug, Default)]
pub struct Registry {
    entries: BTreeMap<CommandPath, Registration>,
    awaiting: usize,
    barrier: bool,
    held: VecDeque<HeldQuery>,
}

impl Registry {
    pub fn new(await_registrations: bool) -> Self {
        Self {
            barrier: await_registrations,
            ..Self::default()
        }
    }

    /// Record that `count` more handlers were asked to register.
    pub fn expect(&mut self, count: usize) {
        self.awaiting += count;
    }

    /// Whether queries are answered immediately.
    pub fn is_ready(&self) -> bool {
        !self.barrier || self.awaiting == 0
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Fold registrations in. A path registered twice keeps the later one.
    pub fn register(&mut self, response: RegistrationResponse) {
        for registration in response.into_registrations() {
            log::debug!("registered command '{}'", registration.path());
            if let Some(prev) = self
                .entries
                .insert(registration.path().clone(), registration)
            {
                log::debug!("command '{}' re-registered, replacing previous", prev.path());
            }
        }
    }

    pub fn lookup(&self, lookup: &RegistrationLookup) -> RegistrationResponse {
        RegistrationResponse::new(
            self.entries
                .values()
                .filter(|r| lookup.selects(r.path()))
                .cloned(),
        )
        .with_origin(lookup.origin().cloned())
    }

    pub fn list(&self) -> RegistrationResponse {
        RegistrationResponse::new(self.entries.values().cloned())
    }

    /// Apply one inbox message.
    pub fn handle(&mut self, msg: RegistryMsg) {
        match msg {
            RegistryMsg::Registered(response) => {
                self.register(response);
                let was_ready = self.is_ready();
                self.awaiting = self.awaiting.saturating_sub(1);
                if !was_ready && self.is_ready() {
                    log::info!(
                        "All handlers registered ({} commands), answering {} held queries",
                        self.entries.len(),
                        self.held.len()
                    );
                    while let Some(query) = self.held.pop_front() {
                        self.answer(query);
                    }
                }
            },
            RegistryMsg::Lookup { lookup, reply_to } => self.query(HeldQuery {
                lookup: Some(lookup),
                reply_to,
            }),
            RegistryMsg::List { reply_to, .. } => self.query(HeldQuery {
                lookup: None,
                reply_to,
            }),
        }
    }

    fn query(&mut self, query: HeldQuery) {
        if self.is_ready() {
            self.answer(query);
        } else {
            log::debug!("registry not ready, holding query");
            self.held.push_back(query);
        }
    }

    fn answer(&self, query: HeldQuery) {
        let response = match &query.lookup {
            Some(lookup) => self.lookup(lookup),
            None => self.list(),
        };
        query.reply_to.tell(response);
    }
}

/// Send the registration request to every handler.
pub fn broadcast(handlers: &[HandlerRef], reply_to: &Recipient<RegistrationResponse>) {
    for handler in handlers {
        handler.tell(HandlerMsg::Register {
            request: RegistrationRequest,
            reply_to: RegistrationReply::new(reply_to.clone()),
        });
    }
}

/// Registry task: broadcast to `handlers`, then serve the mailbox.
///
/// `reply_to` must deliver into `mailbox`.
pub async fn run_registry(
    mut mailbox: Mailbox<RegistryMsg>,
    reply_to: Recipient<RegistrationResponse>,
    handlers: Vec<HandlerRef>,
    await_registrations: bool,
) {
    let mut registry = Registry::new(await_registrations);
    registry.expect(handlers.len());
    broadcast(&handlers, &reply_to);
    drop(reply_to);
    log::info!("Registration requested from {} handler(s)", handlers.len());

    while let Some(msg) = mailbox.recv().await {
        registry.handle(msg);
    }
    log::debug!("registry stopped");
}
