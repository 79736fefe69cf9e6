//! config: show the running configuration as TOML.

use keel_console::command::Command;
use keel_console::handler::{CommandHandler, HandlerContext};
use keel_console::options::{CliOption, OptionSet};
use keel_console::registration::{HandlerRef, Registration};
use keel_types::config::KeelConfig;
use keel_types::error::{KeelError, Result};

use crate::{command_path, option_error};

pub struct ConfigHandler {
    config: KeelConfig,
}

impl ConfigHandler {
    pub fn new(config: KeelConfig) -> Self {
        Self { config }
    }

    /// The whole configuration, or only the top-level `key`.
    fn render(&self, key: Option<&str>) -> Result<Option<String>> {
        let Some(key) = key else {
            return self.config.to_toml().map(Some);
        };
        let toml::Value::Table(table) = toml::Value::try_from(&self.config)? else {
            return Err(KeelError::Config("configuration is not a table".into()));
        };
        let Some(value) = table.get(key) else {
            return Ok(None);
        };
        let mut single = toml::Table::new();
        single.insert(key.to_string(), value.clone());
        Ok(Some(toml::to_string_pretty(&single)?))
    }
}

impl CommandHandler for ConfigHandler {
    type Reply = ();

    fn name(&self) -> &str {
        "config"
    }

    fn registrations(&self, handler: &HandlerRef) -> Result<Vec<Registration>> {
        let options = CliOption::with_arg('k', "key", "KEY", false, "Show a single top-level key")
            .and_then(|key| OptionSet::new([key]))
            .map_err(option_error)?;
        Ok(vec![
            Registration::new(handler.clone(), command_path("config")?)
                .with_options(options)
                .with_description("Show the console configuration"),
        ])
    }

    fn execute(&mut self, command: Command, ctx: &HandlerContext<()>) -> Result<()> {
        let parsed = command.parse_options().map_err(option_error)?;
        let key = parsed.value('k');
        match self.render(key)? {
            Some(text) => {
                for line in text.lines() {
                    ctx.line(line);
                }
                ctx.done();
            },
            None => ctx.last(format!("No such configuration key: {}", key.unwrap_or_default())),
        }
        Ok(())
    }
}
