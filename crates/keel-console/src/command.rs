//! A fully resolved command invocation.

use std::cmp::Ordering;

use crate::input::TokenizedInput;
use crate::options::{OptionError, ParsedOptions, parse_options};
use crate::path::{CommandPath, PathError};
use crate::registration::Registration;

/// The path the operator typed, the registration it resolved to, and the
/// input it came from.
#[derive(Debug, Clone)]
pub struct Command {
    path: CommandPath,
    registration: Registration,
    input: TokenizedInput,
}

impl Command {
    /// Bind `input` to `registration`. The command path is derived from the
    /// input's own tokens, so abbreviated segments are kept as typed.
    pub fn new(registration: Registration, input: TokenizedInput) -> Result<Self, PathError> {
        let path = CommandPath::from_tokens(input.tokens())?;
        Ok(Self {
            path,
            registration,
            input,
        })
    }

    pub fn path(&self) -> &CommandPath {
        &self.path
    }

    pub fn registration(&self) -> &Registration {
        &self.registration
    }

    pub fn input(&self) -> &TokenizedInput {
        &self.input
    }

    /// Tokens following the path segments.
    pub fn option_tokens(&self) -> &[String] {
        &self.input.tokens()[self.path.len()..]
    }

    /// Parse the option tokens against the registration's option set.
    pub fn parse_options(&self) -> Result<ParsedOptions, OptionError> {
        parse_options(self.registration.options(), self.option_tokens())
    }
}

impl PartialEq for Command {
    fn eq(&self, other: &Self) -> bool {
        self.path == other.path
            && self.registration == other.registration
            && self.input == other.input
    }
}

impl Eq for Command {}

impl PartialOrd for Command {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Command {
    fn cmp(&self, other: &Self) -> Ordering {
        self.path
            .cmp(&other.path)
            .then_with(|| self.registration.cmp(&other.registration))
            .then_with(|| self.input.cmp(&other.input))
    }
}
