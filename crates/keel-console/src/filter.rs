//! Input filter: blank lines and `#` comments never reach the tokenizer.

use crate::actor::{Addr, Mailbox, Recipient};
use crate::input::UserInput;
use crate::output::{ConsoleEvent, ConsoleOutput};

/// Forward `input` to the tokenizer, or tell the console to read the next
/// line if there is nothing to run.
pub fn filter(input: UserInput, tokenizer: &Addr<UserInput>, console: &Recipient<ConsoleEvent>) {
    if input.is_empty() || input.is_comment() {
        console.tell(ConsoleOutput::accept_input().into());
    } else {
        tokenizer.tell(input);
    }
}

/// Filter task.
pub async fn run_filter(
    mut mailbox: Mailbox<UserInput>,
    tokenizer: Addr<UserInput>,
    console: Recipient<ConsoleEvent>,
) {
    while let Some(input) = mailbox.recv().await {
        filter(input, &tokenizer, &console);
    }
    log::debug!("filter stopped");
}
