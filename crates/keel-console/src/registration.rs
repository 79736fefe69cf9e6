//! Command registrations and the registration protocol messages.

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::hash::{Hash, Hasher};

use crate::actor::Recipient;
use crate::command::Command;
use crate::input::TokenizedInput;
use crate::options::OptionSet;
use crate::path::{CommandPath, PathError};

/// Messages every command handler understands.
#[derive(Debug)]
pub enum HandlerMsg {
    /// Startup broadcast: answer with the handler's registrations.
    Register {
        request: RegistrationRequest,
        reply_to: RegistrationReply,
    },
    /// Run a resolved, validated command.
    Execute(Command),
}

/// Routable reference to the handler that owns a registration.
pub type HandlerRef = Recipient<HandlerMsg>;

/// Where a handler sends its answer to the startup broadcast.
///
/// Dropped without an answer (the handler stopped before or while handling
/// the request), it reports an empty response so the registry does not wait
/// on that handler.
#[derive(Debug)]
pub struct RegistrationReply {
    reply_to: Option<Recipient<RegistrationResponse>>,
}

impl RegistrationReply {
    pub fn new(reply_to: Recipient<RegistrationResponse>) -> Self {
        Self {
            reply_to: Some(reply_to),
        }
    }

    pub fn send(mut self, response: RegistrationResponse) {
        if let Some(reply_to) = self.reply_to.take() {
            reply_to.tell(response);
        }
    }
}

impl Drop for RegistrationReply {
    fn drop(&mut self) {
        if let Some(reply_to) = self.reply_to.take() {
            log::warn!("registration request dropped unanswered");
            reply_to.tell(RegistrationResponse::default());
        }
    }
}

/// Binding of a command path to the handler that implements it.
///
/// Equality, ordering and hashing consider the path only: the registry
/// stores at most one registration per path.
#[derive(Debug, Clone)]
pub struct Registration {
    handler: HandlerRef,
    path: CommandPath,
    options: Option<OptionSet>,
    description: Option<String>,
}

impl Registration {
    pub fn new(handler: HandlerRef, path: CommandPath) -> Self {
        Self {
            handler,
            path,
            options: None,
            description: None,
        }
    }

    pub fn with_options(mut self, options: OptionSet) -> Self {
        self.options = Some(options);
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn handler(&self) -> &HandlerRef {
        &self.handler
    }

    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    pub fn options(&self) -> Option<&OptionSet> {
        self.options.as_ref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl PartialEq for Registration {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
    }
}

impl Eq for Registration {}

impl PartialOrd for Registration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Registration {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path.cmp(&other.path)
    }
}

impl Hash for Registration {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.path.hash(state);
    }
}

/// "What do you implement?" Sent to every handler at startup, and to the
/// registry to list everything it holds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistrationRequest;

/// A set of registrations, optionally answering a lookup for some input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationResponse {
    registrations: BTreeSet<Registration>,
    origin: Option<TokenizedInput>,
}

impl RegistrationResponse {
    /// A path given twice keeps the later registration, as in the registry.
    pub fn new(registrations: impl IntoIterator<Item = Registration>) -> Self {
        let mut set = BTreeSet::new();
        for registration in registrations {
            set.replace(registration);
        }
        Self {
            registrations: set,
            origin: None,
        }
    }

    pub fn with_origin(mut self, origin: Option<TokenizedInput>) -> Self {
        self.origin = origin;
        self
    }

    pub fn registrations(&self) -> &BTreeSet<Registration> {
        &self.registrations
    }

    pub fn into_registrations(self) -> BTreeSet<Registration> {
        self.registrations
    }

    pub fn origin(&self) -> Option<&TokenizedInput> {
        self.origin.as_ref()
    }

    pub fn len(&self) -> usize {
        self.registrations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.registrations.is_empty()
    }
}

/// Query for registrations matching one or more paths.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegistrationLookup {
    paths: Vec<CommandPath>,
    origin: Option<TokenizedInput>,
}

impl RegistrationLookup {
    pub fn new(paths: impl IntoIterator<Item = CommandPath>) -> Result<Self, PathError> {
        let paths: Vec<CommandPath> = paths.into_iter().collect();
        if paths.is_empty() {
            return Err(PathError::Empty);
        }
        Ok(Self {
            paths,
            origin: None,
        })
    }

    /// Lookup for the path spelled by the input's leading tokens.
    pub fn for_input(input: TokenizedInput) -> Result<Self, PathError> {
        let path = CommandPath::from_tokens(input.tokens())?;
        Ok(Self {
            paths: vec![path],
            origin: Some(input),
        })
    }

    pub fn paths(&self) -> &[CommandPath] {
        &self.paths
    }

    pub fn origin(&self) -> Option<&TokenizedInput> {
        self.origin.as_ref()
    }

    /// Whether a registration stored under `path` answers this lookup.
    pub fn selects(&self, path: &CommandPath) -> bool {
        self.paths.iter().any(|query| path.is_prefix(query))
    }
}
