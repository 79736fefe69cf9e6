//! Messages delivered to the console loop.

use crate::input::{TokenizedInput, UserInput};
use crate::options::OptionError;
use crate::tokenizer::TokenizeError;

/// One unit of command output.
///
/// The default value (no text, no more output, no termination) marks the
/// end of a response: the console goes back to reading input.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConsoleOutput {
    text: Option<String>,
    has_more: bool,
    terminate: bool,
}

impl ConsoleOutput {
    pub fn new(text: Option<String>, has_more: bool, terminate: bool) -> Self {
        Self {
            text,
            has_more,
            terminate,
        }
    }

    /// End of response; accept new input.
    pub fn accept_input() -> Self {
        Self::default()
    }

    /// A line of output with more to follow.
    pub fn line(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()), true, false)
    }

    /// The final line of a response.
    pub fn last(text: impl Into<String>) -> Self {
        Self::new(Some(text.into()), false, false)
    }

    /// End the session after showing `text`.
    pub fn terminate(text: Option<String>) -> Self {
        Self::new(text, false, true)
    }

    pub fn text(&self) -> Option<&str> {
        self.text.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    pub fn terminates(&self) -> bool {
        self.terminate
    }
}

/// No registration matched the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnrecognizedCommand {
    input: TokenizedInput,
    message: String,
}

impl UnrecognizedCommand {
    pub fn new(input: TokenizedInput) -> Self {
        let message = format!("Unrecognized command: {}", input.input().text());
        Self { input, message }
    }

    pub fn input(&self) -> &TokenizedInput {
        &self.input
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// The input was rejected by the tokenizer or by option validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidInput {
    input: UserInput,
    message: String,
    offset: Option<usize>,
}

impl InvalidInput {
    pub fn new(input: UserInput, message: impl Into<String>, offset: Option<usize>) -> Self {
        Self {
            input,
            message: message.into(),
            offset,
        }
    }

    /// A lexical error, positioned at the character where it was found.
    pub fn lexical(input: UserInput, err: TokenizeError) -> Self {
        Self::new(input, err.kind.to_string(), Some(err.offset))
    }

    /// An option-parse error. These carry no position.
    pub fn options(input: UserInput, err: &OptionError) -> Self {
        Self::new(input, err.to_string(), None)
    }

    pub fn input(&self) -> &UserInput {
        &self.input
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn offset(&self) -> Option<usize> {
        self.offset
    }
}

/// Everything the console loop can receive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsoleEvent {
    Output(ConsoleOutput),
    Unrecognized(UnrecognizedCommand),
    Invalid(InvalidInput),
}

impl From<ConsoleOutput> for ConsoleEvent {
    fn from(output: ConsoleOutput) -> Self {
        ConsoleEvent::Output(output)
    }
}

impl From<UnrecognizedCommand> for ConsoleEvent {
    fn from(u: UnrecognizedCommand) -> Self {
        ConsoleEvent::Unrecognized(u)
    }
}

impl From<InvalidInput> for ConsoleEvent {
    fn from(i: InvalidInput) -> Self {
        ConsoleEvent::Invalid(i)
    }
}
