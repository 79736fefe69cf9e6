//! cluster list: show the current cluster membership.

use std::sync::Arc;

use keel_console::command::Command;
use keel_console::handler::{CommandHandler, HandlerContext};
use keel_console::registration::{HandlerRef, Registration};
use keel_types::error::Result;
use keel_types::model::ClusterView;

use crate::command_path;

pub struct ClusterHandler {
    view: Arc<dyn ClusterView>,
}

impl ClusterHandler {
    pub fn new(view: Arc<dyn ClusterView>) -> Self {
        Self { view }
    }
}

impl CommandHandler for ClusterHandler {
    type Reply = ();

    fn name(&self) -> &str {
        "cluster"
    }

    fn registrations(&self, handler: &HandlerRef) -> Result<Vec<Registration>> {
        Ok(vec![
            Registration::new(handler.clone(), command_path("cluster list")?)
                .with_description("List cluster members"),
        ])
    }

    fn execute(&mut self, _command: Command, ctx: &HandlerContext<()>) -> Result<()> {
        let members = self.view.members();
        if members.is_empty() {
            ctx.last("No cluster members known.");
            return Ok(());
        }
        for member in &members {
            ctx.line(member.to_string());
        }
        ctx.done();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use keel_console::actor::{Addr, Recipient};
    use keel_console::input::{TokenizedInput, UserInput};
    use keel_console::output::{ConsoleEvent, ConsoleOutput};
    use keel_console::registration::HandlerMsg;
    use keel_console::registry::RegistryMsg;
    use keel_console::tokenizer::tokenize;
    use keel_types::model::{ClusterMember, StaticClusterView};

    fn member(address: &str) -> ClusterMember {
        ClusterMember {
            address: address.to_string(),
            protocol: "tcp".to_string(),
            status: "up".to_string(),
            roles: Vec::new(),
        }
    }

    /// Run `cluster list` against `members` and collect what reaches the console.
    fn run(members: Vec<ClusterMember>) -> Vec<ConsoleEvent> {
        let handler_ref = Recipient::from_fn("cluster", |_: HandlerMsg| true);
        let (console, mut console_rx) = Addr::<ConsoleEvent>::new("console");
        let (registry, _registry_rx) = Addr::<RegistryMsg>::new("registry");
        let (replies, _replies_rx) = Addr::<()>::new("cluster");
        let ctx = HandlerContext::new(console.recipient(), registry, replies.recipient());

        let mut handler = ClusterHandler::new(Arc::new(StaticClusterView::new(members)));
        let registration = handler.registrations(&handler_ref).unwrap().remove(0);
        let line = "cluster list";
        let input = TokenizedInput::new(UserInput::new(line), tokenize(line).unwrap());
        handler
            .execute(Command::new(registration, input).unwrap(), &ctx)
            .unwrap();

        let mut events = Vec::new();
        while let Ok(event) = console_rx.try_recv() {
            events.push(event);
        }
        events
    }

    #[test]
    fn one_line_per_member_then_accept_input() {
        let events = run(vec![member("a:1"), member("b:2")]);
        assert_eq!(
            events,
            [
                ConsoleEvent::Output(ConsoleOutput::line("tcp://a:1 [up]")),
                ConsoleEvent::Output(ConsoleOutput::line("tcp://b:2 [up]")),
                ConsoleEvent::Output(ConsoleOutput::accept_input()),
            ]
        );
    }

    #[test]
    fn no_members_is_a_single_final_line() {
        assert_eq!(
            run(Vec::new()),
            [ConsoleEvent::Output(ConsoleOutput::last(
                "No cluster members known."
            ))]
        );
    }
}
