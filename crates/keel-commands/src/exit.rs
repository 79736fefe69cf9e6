//! exit / quit: end the session.

use keel_console::command::Command;
use keel_console::handler::{CommandHandler, HandlerContext};
use keel_console::registration::{HandlerRef, Registration};
use keel_types::error::Result;

use crate::command_path;

pub const FAREWELL: &str = "Goodbye.";

pub struct ExitHandler;

impl CommandHandler for ExitHandler {
    type Reply = ();

    fn name(&self) -> &str {
        "exit"
    }

    fn registrations(&self, handler: &HandlerRef) -> Result<Vec<Registration>> {
        ["exit", "quit"]
            .into_iter()
            .map(|path| {
                Ok(Registration::new(handler.clone(), command_path(path)?)
                    .with_description("Leave the console"))
            })
            .collect()
    }

    fn execute(&mut self, _command: Command, ctx: &HandlerContext<()>) -> Result<()> {
        ctx.terminate(Some(FAREWELL.to_string()));
        Ok(())
    }
}
