//! database: read and modify records through the persistence service.
//!
//! ```text
//! database -t <TYPE> -g [IDS] [-s active|inactive]
//! database -t <TYPE> -a <JSON> [-s active|inactive]
//! database -t <TYPE> -d <IDS>
//! ```

use keel_console::command::Command;
use keel_console::handler::{CommandHandler, HandlerContext};
use keel_console::options::{CliOption, OptionDef, OptionError, OptionSet, ParsedOptions};
use keel_console::registration::{HandlerRef, Registration};
use keel_types::error::{KeelError, Result};
use keel_types::manifest::WireEnvelope;
use keel_types::model::{DataType, PersistenceReply, PersistenceRequest, Record};

use crate::persistence::{PersistenceCall, PersistenceRef};
use crate::{command_path, option_error};

pub struct DatabaseHandler {
    persistence: PersistenceRef,
    /// Status filter applied to the reply of a `--get` without ids.
    status_filter: Option<bool>,
}

impl DatabaseHandler {
    pub fn new(persistence: PersistenceRef) -> Self {
        Self {
            persistence,
            status_filter: None,
        }
    }
}

fn options() -> Result<OptionSet> {
    option_set().map_err(option_error)
}

fn option_set() -> std::result::Result<OptionSet, OptionError> {
    OptionSet::new([
        CliOption::with_arg('t', "type", "TYPE", true, "Data type: company or record")?,
        CliOption::new(OptionDef {
            short: 'g',
            long: Some("get".into()),
            arg_name: Some("IDS".into()),
            args: 1,
            optional_arg: true,
            description: "Show records, all or by comma-separated ids".into(),
            ..OptionDef::default()
        })?,
        CliOption::with_arg('a', "add", "JSON", false, "Add a record with a JSON payload")?,
        CliOption::with_arg('d', "delete", "IDS", false, "Delete records by comma-separated ids")?,
        CliOption::with_arg('s', "status", "STATUS", false, "Record status: active or inactive")?,
    ])
}

fn parse_ids(text: &str) -> Result<Vec<u64>> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse()
                .map_err(|_| KeelError::Handler(format!("invalid id: {s}")))
        })
        .collect()
}

fn parse_status(text: &str) -> Result<bool> {
    match text.to_ascii_lowercase().as_str() {
        "active" => Ok(true),
        "inactive" => Ok(false),
        other => Err(KeelError::Handler(format!(
            "invalid status: {other} (expected active or inactive)"
        ))),
    }
}

/// Translate parsed flags into a persistence request.
fn request(parsed: &ParsedOptions) -> Result<PersistenceRequest> {
    let data_type: DataType = parsed
        .value('t')
        .ok_or_else(|| KeelError::Handler("missing data type".into()))?
        .parse()?;
    let status = parsed.value('s').map(parse_status).transpose()?;

    let actions = ['g', 'a', 'd'].iter().filter(|c| parsed.has(**c)).count();
    if actions != 1 {
        return Err(KeelError::Handler(
            "exactly one of --get, --add or --delete is required".into(),
        ));
    }

    if parsed.has('g') {
        return Ok(match parsed.value('g') {
            Some(ids) => PersistenceRequest::GetByIds {
                data_type,
                ids: parse_ids(ids)?,
                active: status,
            },
            None => PersistenceRequest::GetAll { data_type },
        });
    }
    if let Some(json) = parsed.value('a') {
        return Ok(PersistenceRequest::Add {
            data_type,
            active: status.unwrap_or(true),
            data: serde_json::from_str(json)?,
        });
    }
    let ids = parse_ids(parsed.value('d').unwrap_or_default())?;
    if ids.is_empty() {
        return Err(KeelError::Handler("no ids to delete".into()));
    }
    Ok(PersistenceRequest::Delete { data_type, ids })
}

fn render_record(record: &Record) -> String {
    let status = if record.active { "active" } else { "inactive" };
    format!(
        "{:>6}  {:<8} {:<9} {}",
        record.id,
        record.data_type.as_str(),
        status,
        record.data
    )
}

impl CommandHandler for DatabaseHandler {
    type Reply = WireEnvelope;

    fn name(&self) -> &str {
        "database"
    }

    fn registrations(&self, handler: &HandlerRef) -> Result<Vec<Registration>> {
        Ok(vec![
            Registration::new(handler.clone(), command_path("database")?)
                .with_options(options()?)
                .with_description("Query and modify stored records"),
        ])
    }

    fn execute(&mut self, command: Command, ctx: &HandlerContext<WireEnvelope>) -> Result<()> {
        let parsed = command.parse_options().map_err(option_error)?;
        let request = request(&parsed)?;
        self.status_filter = match request {
            PersistenceRequest::GetAll { .. } => parsed.value('s').map(parse_status).transpose()?,
            _ => None,
        };
        if self.persistence.is_closed() {
            return Err(KeelError::MailboxClosed("persistence".into()));
        }
        log::debug!("database request for {}", request.data_type());
        self.persistence.tell(PersistenceCall {
            request: WireEnvelope::encode(&request)?,
            reply_to: ctx.reply_to().clone(),
        });
        Ok(())
    }

    fn on_reply(&mut self, reply: WireEnvelope, ctx: &HandlerContext<WireEnvelope>) -> Result<()> {
        match reply.open::<PersistenceReply>()? {
            PersistenceReply::Records { records } => {
                let filter = self.status_filter.take();
                let shown: Vec<&Record> = records
                    .iter()
                    .filter(|r| filter.is_none_or(|active| r.active == active))
                    .collect();
                if shown.is_empty() {
                    ctx.last("No records.");
                    return Ok(());
                }
                for record in shown {
                    ctx.line(render_record(record));
                }
                ctx.done();
            },
            PersistenceReply::Failure { message } => {
                self.status_filter = None;
                ctx.last(format!("database error: {message}"));
            },
        }
        Ok(())
    }
}
