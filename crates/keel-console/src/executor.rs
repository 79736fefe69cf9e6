//! Executor: last hop of the pipeline.
//!
//! A resolved command goes to the handler named by its registration;
//! anything else is passed through to the console untouched.

use crate::actor::{Mailbox, Recipient};
use crate::command::Command;
use crate::output::{ConsoleEvent, ConsoleOutput, InvalidInput, UnrecognizedCommand};
use crate::registration::HandlerMsg;

/// Executor inbox.
#[derive(Debug)]
pub enum ExecutorMsg {
    Execute(Command),
    Forward(ConsoleEvent),
}

impl From<Command> for ExecutorMsg {
    fn from(command: Command) -> Self {
        ExecutorMsg::Execute(command)
    }
}

impl From<ConsoleEvent> for ExecutorMsg {
    fn from(event: ConsoleEvent) -> Self {
        ExecutorMsg::Forward(event)
    }
}

impl From<ConsoleOutput> for ExecutorMsg {
    fn from(output: ConsoleOutput) -> Self {
        ExecutorMsg::Forward(output.into())
    }
}

impl From<UnrecognizedCommand> for ExecutorMsg {
    fn from(u: UnrecognizedCommand) -> Self {
        ExecutorMsg::Forward(u.into())
    }
}

impl From<InvalidInput> for ExecutorMsg {
    fn from(i: InvalidInput) -> Self {
        ExecutorMsg::Forward(i.into())
    }
}

/// Route one message.
pub fn dispatch(msg: ExecutorMsg, console: &Recipient<ConsoleEvent>) {
    match msg {
        ExecutorMsg::Execute(command) => {
            let handler = command.registration().handler().clone();
            log::debug!("executing '{}' on {}", command.path(), handler.name());
            handler.tell(HandlerMsg::Execute(command));
        },
        ExecutorMsg::Forward(event) => console.tell(event),
    }
}

/// Executor task.
pub async fn run_executor(mut mailbox: Mailbox<ExecutorMsg>, console: Recipient<ConsoleEvent>) {
    while let Some(msg) = mailbox.recv().await {
        dispatch(msg, &console);
    }
    log::debug!("executor stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::Addr;
    use crate::input::{TokenizedInput, UserInput};
    use crate::registration::Registration;

    #[test]
    fn command_goes_to_its_handler() {
        let (handler, mut handler_rx) = Addr::<HandlerMsg>::new("cluster");
        let (console, mut console_rx) = Addr::<ConsoleEvent>::new("console");
        let reg = Registration::new(handler.recipient(), "cluster list".parse().unwrap());
        let input = TokenizedInput::new(
            UserInput::new("cluster list"),
            vec!["cluster".into(), "list".into()],
        );
        let command = Command::new(reg, input).unwrap();

        dispatch(command.clone().into(), &console.recipient());

        match handler_rx.try_recv().unwrap() {
            HandlerMsg::Execute(received) => assert_eq!(received, command),
            other => panic!("unexpected {other:?}"),
        }
        assert!(console_rx.try_recv().is_err());
    }

    #[test]
    fn everything_else_goes_to_console() {
        let (console, mut console_rx) = Addr::<ConsoleEvent>::new("console");
        let invalid = InvalidInput::new(UserInput::new("x"), "bad", Some(0));
        dispatch(invalid.clone().into(), &console.recipient());
        dispatch(ConsoleOutput::accept_input().into(), &console.recipient());
        assert_eq!(console_rx.try_recv().unwrap(), ConsoleEvent::Invalid(invalid));
        assert_eq!(
            console_rx.try_recv().unwrap(),
            ConsoleEvent::Output(ConsoleOutput::accept_input())
        );
    }
}
