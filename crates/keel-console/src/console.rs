//! The console I/O loop.
//!
//! Reads one line, hands it to the pipeline and renders events until the
//! pipeline asks for the next line. This is the only stage that does I/O.

use keel_types::error::{KeelError, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};

use crate::actor::{Addr, Mailbox};
use crate::input::UserInput;
use crate::output::{ConsoleEvent, ConsoleOutput, InvalidInput, UnrecognizedCommand};

/// Printed after an unrecognized command.
pub const HELP_HINT: &str = "Type 'help' to list available commands.";

/// What the loop does after rendering an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Next {
    Wait,
    Read,
    Stop,
}

/// Interactive session over a reader and a writer.
pub struct Console<R, W> {
    reader: R,
    writer: W,
    prompt: String,
    banner: Option<String>,
    filter: Addr<UserInput>,
    events: Mailbox<ConsoleEvent>,
}

impl<R, W> Console<R, W>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    /// `filter` receives every line read; `events` is the console's inbox.
    pub fn new(reader: R, writer: W, filter: Addr<UserInput>, events: Mailbox<ConsoleEvent>) -> Self {
        Self {
            reader,
            writer,
            prompt: "> ".to_string(),
            banner: None,
            filter,
            events,
        }
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = prompt.into();
        self
    }

    pub fn with_banner(mut self, banner: Option<String>) -> Self {
        self.banner = banner;
        self
    }

    /// Run until a terminating output or the end of input. Returns the
    /// writer so callers can inspect what was written.
    pub async fn run(mut self) -> Result<W> {
        if let Some(banner) = self.banner.take() {
            self.write_line(&banner).await?;
        }
        log::info!("Console session started");

        loop {
            self.writer.write_all(self.prompt.as_bytes()).await?;
            self.writer.flush().await?;

            let mut line = String::new();
            let next = if self.reader.read_line(&mut line).await? == 0 {
                log::info!("End of input");
                self.writer.write_all(b"\n").await?;
                self.render_output(ConsoleOutput::terminate(None)).await?
            } else {
                self.filter.tell(UserInput::new(&line));
                self.await_response().await?
            };

            if next == Next::Stop {
                break;
            }
        }

        self.writer.flush().await?;
        log::info!("Console session ended");
        Ok(self.writer)
    }

    async fn await_response(&mut self) -> Result<Next> {
        loop {
            let event = self
                .events
                .recv()
                .await
                .ok_or_else(|| KeelError::MailboxClosed("console".into()))?;
            let next = self.render(event).await?;
            if next != Next::Wait {
                return Ok(next);
            }
        }
    }

    async fn render(&mut self, event: ConsoleEvent) -> Result<Next> {
        match event {
            ConsoleEvent::Output(output) => self.render_output(output).await,
            ConsoleEvent::Unrecognized(u) => self.render_unrecognized(&u).await,
            ConsoleEvent::Invalid(i) => self.render_invalid(&i).await,
        }
    }

    async fn render_output(&mut self, output: ConsoleOutput) -> Result<Next> {
        if let Some(text) = output.text() {
            self.write_line(text).await?;
        }
        Ok(if output.terminates() {
            Next::Stop
        } else if output.has_more() {
            Next::Wait
        } else {
            Next::Read
        })
    }

    async fn render_unrecognized(&mut self, u: &UnrecognizedCommand) -> Result<Next> {
        self.write_line(u.message()).await?;
        self.write_line(HELP_HINT).await?;
        Ok(Next::Read)
    }

    async fn render_invalid(&mut self, invalid: &InvalidInput) -> Result<Next> {
        self.write_line(invalid.message()).await?;
        if let Some(offset) = invalid.offset() {
            self.write_line(&format!("  {}", invalid.input().text())).await?;
            self.write_line(&format!("  {}^", " ".repeat(offset))).await?;
        }
        Ok(Next::Read)
    }

    async fn write_line(&mut self, text: &str) -> Result<()> {
        self.writer.write_all(text.as_bytes()).await?;
        self.writer.write_all(b"\n").await?;
        Ok(())
    }
}
