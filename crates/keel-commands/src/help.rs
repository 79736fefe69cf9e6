//! help: list every registered command.

use keel_console::command::Command;
use keel_console::handler::{CommandHandler, HandlerContext};
use keel_console::registration::{
    HandlerRef, Registration, RegistrationRequest, RegistrationResponse,
};
use keel_console::registry::RegistryMsg;
use keel_types::error::Result;

use crate::command_path;

/// Width of the command column.
const PATH_WIDTH: usize = 16;

pub struct HelpHandler;

impl CommandHandler for HelpHandler {
    type Reply = RegistrationResponse;

    fn name(&self) -> &str {
        "help"
    }

    fn registrations(&self, handler: &HandlerRef) -> Result<Vec<Registration>> {
        Ok(vec![
            Registration::new(handler.clone(), command_path("help")?)
                .with_description("List available commands"),
        ])
    }

    fn execute(&mut self, _command: Command, ctx: &HandlerContext<Self::Reply>) -> Result<()> {
        ctx.registry().tell(RegistryMsg::List {
            request: RegistrationRequest,
            reply_to: ctx.reply_to().clone(),
        });
        Ok(())
    }

    fn on_reply(
        &mut self,
        reply: RegistrationResponse,
        ctx: &HandlerContext<Self::Reply>,
    ) -> Result<()> {
        ctx.line("Available commands:");
        for line in render(&reply) {
            ctx.line(line);
        }
        ctx.done();
        Ok(())
    }
}

/// One line per command, followed by one per option.
fn render(response: &RegistrationResponse) -> Vec<String> {
    let mut lines = Vec::new();
    for reg in response.registrations() {
        let path = reg.path().to_string();
        match reg.description() {
            Some(desc) => lines.push(format!("  {path:<PATH_WIDTH$} {desc}")),
            None => lines.push(format!("  {path}")),
        }
        for opt in reg.options().into_iter().flat_map(|set| set.iter()) {
            let required = if opt.is_required() { " (required)" } else { "" };
            lines.push(format!(
                "      {:<24} {}{required}",
                opt.usage(),
                opt.description()
            ));
        }
    }
    lines
}
