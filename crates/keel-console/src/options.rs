//! Declarative command options and their conversion to a `clap` parser.
//!
//! A command declares the flags it accepts as an [`OptionSet`]. When a line
//! resolves to that command, the tokens after the command path are parsed
//! against a `clap::Command` built from the set. Tokens that are not flags
//! or flag values are collected as positional arguments.

use std::collections::{BTreeMap, BTreeSet};

use clap::error::{ContextKind, ContextValue, ErrorKind};
use clap::parser::ValueSource;
use clap::{Arg, ArgAction};

/// Id of the positional catch-all argument. Option ids are a single
/// character, so this cannot collide.
const ARGS_ID: &str = "ARGS";

/// Errors from defining options or parsing tokens against them.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum OptionError {
    #[error("invalid short option name: {0:?}")]
    InvalidShort(char),
    #[error("invalid long option name: {0:?}")]
    InvalidLong(String),
    #[error("option -{0} takes an optional argument but declares no arguments")]
    OptionalWithoutArgs(char),
    #[error("conflicting option definitions for {0}")]
    Conflict(String),
    #[error("option set is empty")]
    EmptySet,
    #[error("{}", missing_message(.0))]
    MissingRequired(Vec<char>),
    #[error("Unrecognized option: {0}")]
    Unrecognized(String),
    #[error("Missing argument for option: {0}")]
    MissingArgument(String),
    #[error("Option specified more than once: {0}")]
    Duplicate(String),
    #[error("{0}")]
    Parse(String),
}

fn missing_message(shorts: &[char]) -> String {
    let names: Vec<String> = shorts.iter().map(char::to_string).collect();
    if names.len() == 1 {
        format!("Missing required option: {}", names[0])
    } else {
        format!("Missing required options: {}", names.join(", "))
    }
}

impl OptionError {
    fn from_clap(err: &clap::Error) -> Self {
        let arg = match err.get(ContextKind::InvalidArg) {
            Some(ContextValue::String(s)) => s.clone(),
            Some(ContextValue::Strings(v)) => v.join(", "),
            _ => String::new(),
        };
        match err.kind() {
            ErrorKind::UnknownArgument => OptionError::Unrecognized(arg),
            ErrorKind::InvalidValue
            | ErrorKind::NoEquals
            | ErrorKind::TooFewValues
            | ErrorKind::WrongNumberOfValues => OptionError::MissingArgument(arg),
            ErrorKind::ArgumentConflict => OptionError::Duplicate(arg),
            kind => OptionError::Parse(kind.to_string()),
        }
    }
}

/// Field values for [`CliOption::new`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OptionDef {
    pub short: char,
    pub long: Option<String>,
    /// Name shown for the argument in help output.
    pub arg_name: Option<String>,
    /// Number of arguments the option takes.
    pub args: usize,
    pub required: bool,
    /// The arguments may be omitted.
    pub optional_arg: bool,
    pub description: String,
}

/// One flag a command accepts.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CliOption {
    short: char,
    long: Option<String>,
    arg_name: Option<String>,
    args: usize,
    required: bool,
    optional_arg: bool,
    description: String,
}

impl CliOption {
    /// Validate a definition.
    pub fn new(def: OptionDef) -> Result<Self, OptionError> {
        if !def.short.is_ascii_alphanumeric() {
            return Err(OptionError::InvalidShort(def.short));
        }
        if let Some(long) = &def.long {
            let valid = !long.is_empty()
                && !long.starts_with('-')
                && long.chars().all(|c| c.is_ascii_alphanumeric() || c == '-');
            if !valid {
                return Err(OptionError::InvalidLong(long.clone()));
            }
        }
        if def.optional_arg && def.args == 0 {
            return Err(OptionError::OptionalWithoutArgs(def.short));
        }
        Ok(Self {
            short: def.short,
            long: def.long,
            arg_name: def.arg_name,
            args: def.args,
            required: def.required,
            optional_arg: def.optional_arg,
            description: def.description,
        })
    }

    /// A boolean flag with no arguments.
    pub fn flag(short: char, long: &str, description: &str) -> Result<Self, OptionError> {
        Self::new(OptionDef {
            short,
            long: Some(long.to_string()),
            description: description.to_string(),
            ..OptionDef::default()
        })
    }

    /// An option taking exactly one argument.
    pub fn with_arg(
        short: char,
        long: &str,
        arg_name: &str,
        required: bool,
        description: &str,
    ) -> Result<Self, OptionError> {
        Self::new(OptionDef {
            short,
            long: Some(long.to_string()),
            arg_name: Some(arg_name.to_string()),
            args: 1,
            required,
            description: description.to_string(),
            ..OptionDef::default()
        })
    }

    pub fn short(&self) -> char {
        self.short
    }

    pub fn long(&self) -> Option<&str> {
        self.long.as_deref()
    }

    pub fn args(&self) -> usize {
        self.args
    }

    pub fn is_required(&self) -> bool {
        self.required
    }

    pub fn has_optional_arg(&self) -> bool {
        self.optional_arg
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    fn id(&self) -> String {
        self.short.to_string()
    }

    fn arg_name(&self) -> &str {
        self.arg_name.as_deref().unwrap_or("ARG")
    }

    /// Usage fragment such as `-t, --type <TYPE>` or `-g, --get [IDS]`.
    pub fn usage(&self) -> String {
        let mut out = format!("-{}", self.short);
        if let Some(long) = &self.long {
            out.push_str(&format!(", --{long}"));
        }
        for _ in 0..self.args {
            if self.optional_arg {
                out.push_str(&format!(" [{}]", self.arg_name()));
            } else {
                out.push_str(&format!(" <{}>", self.arg_name()));
            }
        }
        out
    }

    /// The `clap` argument for this option.
    ///
    /// `required` is not passed to clap: missing required options are
    /// reported together after parsing.
    pub fn to_arg(&self) -> Arg {
        let mut arg = Arg::new(self.id()).short(self.short).required(false);
        if let Some(long) = &self.long {
            arg = arg.long(long.clone());
        }
        arg = if self.args == 0 {
            arg.action(ArgAction::SetTrue)
        } else {
            let min = if self.optional_arg { 0 } else { self.args };
            arg.action(ArgAction::Append)
                .num_args(min..=self.args)
                .value_name(self.arg_name().to_string())
        };
        arg.help(self.description.clone())
    }
}

/// The options a command accepts. Never empty; short and long names are
/// unique within the set.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct OptionSet {
    options: BTreeSet<CliOption>,
}

impl OptionSet {
    pub fn new(options: impl IntoIterator<Item = CliOption>) -> Result<Self, OptionError> {
        let options: BTreeSet<CliOption> = options.into_iter().collect();
        if options.is_empty() {
            return Err(OptionError::EmptySet);
        }
        let mut shorts = BTreeSet::new();
        let mut longs = BTreeSet::new();
        for opt in &options {
            if !shorts.insert(opt.short) {
                return Err(OptionError::Conflict(format!("-{}", opt.short)));
            }
            if let Some(long) = &opt.long {
                if !longs.insert(long.as_str()) {
                    return Err(OptionError::Conflict(format!("--{long}")));
                }
            }
        }
        Ok(Self { options })
    }

    pub fn iter(&self) -> impl Iterator<Item = &CliOption> {
        self.options.iter()
    }

    pub fn len(&self) -> usize {
        self.options.len()
    }

    pub fn is_empty(&self) -> bool {
        self.options.is_empty()
    }

    /// A `clap` command accepting every option in the set.
    pub fn to_command(&self) -> clap::Command {
        flag_parser(self.options.iter())
    }

    /// Parse option tokens against this set.
    pub fn parse(&self, tokens: &[String]) -> Result<ParsedOptions, OptionError> {
        parse_options(Some(self), tokens)
    }
}

fn flag_parser<'a>(options: impl Iterator<Item = &'a CliOption>) -> clap::Command {
    clap::Command::new("keel")
        .no_binary_name(true)
        .disable_help_flag(true)
        .disable_version_flag(true)
        .args(options.map(CliOption::to_arg))
        .arg(
            Arg::new(ARGS_ID)
                .action(ArgAction::Append)
                .num_args(0..)
                .value_name(ARGS_ID),
        )
}

/// Parse option tokens for a command that may declare no options at all.
///
/// Without an option set every flag-looking token is unrecognized and the
/// remaining tokens become positional arguments.
pub fn parse_options(
    options: Option<&OptionSet>,
    tokens: &[String],
) -> Result<ParsedOptions, OptionError> {
    let declared: Vec<&CliOption> = options.map(|set| set.iter().collect()).unwrap_or_default();
    let matches = flag_parser(declared.iter().copied())
        .try_get_matches_from(tokens)
        .map_err(|e| OptionError::from_clap(&e))?;

    let mut values = BTreeMap::new();
    let mut missing = Vec::new();
    for opt in declared {
        let id = opt.id();
        if matches.value_source(&id) != Some(ValueSource::CommandLine) {
            if opt.required {
                missing.push(opt.short);
            }
            continue;
        }
        let given: Vec<String> = if opt.args == 0 {
            Vec::new()
        } else {
            matches
                .get_many::<String>(&id)
                .map(|v| v.cloned().collect())
                .unwrap_or_default()
        };
        values.insert(opt.short, given);
    }
    if !missing.is_empty() {
        return Err(OptionError::MissingRequired(missing));
    }

    let args = matches
        .get_many::<String>(ARGS_ID)
        .map(|v| v.cloned().collect())
        .unwrap_or_default();
    Ok(ParsedOptions { values, args })
}

/// Flags present on a command line, with their values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParsedOptions {
    values: BTreeMap<char, Vec<String>>,
    args: Vec<String>,
}

impl ParsedOptions {
    /// Whether the flag was given.
    pub fn has(&self, short: char) -> bool {
        self.values.contains_key(&short)
    }

    /// First value of the flag, if it was given with one.
    pub fn value(&self, short: char) -> Option<&str> {
        self.values
            .get(&short)
            .and_then(|v| v.first())
            .map(String::as_str)
    }

    /// All values of the flag (empty if absent or valueless).
    pub fn values(&self, short: char) -> &[String] {
        self.values.get(&short).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Tokens that were neither flags nor flag values.
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toks(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    fn reason_required() -> OptionSet {
        OptionSet::new([CliOption::with_arg('r', "reason", "REASON", true, "Why").unwrap()])
            .unwrap()
    }

    fn database_like() -> OptionSet {
        OptionSet::new([
            CliOption::with_arg('t', "type", "TYPE", true, "Data type").unwrap(),
            CliOption::new(OptionDef {
                short: 'g',
                long: Some("get".into()),
                arg_name: Some("IDS".into()),
                args: 1,
                optional_arg: true,
                description: "Fetch records".into(),
                ..OptionDef::default()
            })
            .unwrap(),
            CliOption::flag('v', "verbose", "More output").unwrap(),
            CliOption::new(OptionDef {
                short: 'p',
                long: Some("pair".into()),
                args: 2,
                description: "Two values".into(),
                ..OptionDef::default()
            })
            .unwrap(),
        ])
        .unwrap()
    }

    #[test]
    fn invalid_short_name_rejected() {
        assert_eq!(
            CliOption::flag('-', "dash", "").unwrap_err(),
            OptionError::InvalidShort('-')
        );
    }

    #[test]
    fn invalid_long_name_rejected() {
        assert!(matches!(
            CliOption::flag('a', "--all", ""),
            Err(OptionError::InvalidLong(_))
        ));
        assert!(matches!(
            CliOption::flag('a', "", ""),
            Err(OptionError::InvalidLong(_))
        ));
    }

    #[test]
    fn optional_arg_needs_args() {
        let err = CliOption::new(OptionDef {
            short: 'o',
            optional_arg: true,
            ..OptionDef::default()
        })
        .unwrap_err();
        assert_eq!(err, OptionError::OptionalWithoutArgs('o'));
    }

    #[test]
    fn empty_set_rejected() {
        assert_eq!(OptionSet::new([]).unwrap_err(), OptionError::EmptySet);
    }

    #[test]
    fn identical_options_collapse() {
        let a = CliOption::flag('a', "all", "All").unwrap();
        let set = OptionSet::new([a.clone(), a]).unwrap();
        assert_eq!(set.len(), 1);
        assert!(!set.is_empty());
    }

    #[test]
    fn conflicting_short_names_rejected() {
        let err = OptionSet::new([
            CliOption::flag('a', "all", "All").unwrap(),
            CliOption::flag('a', "any", "Any").unwrap(),
        ])
        .unwrap_err();
        assert_eq!(err, OptionError::Conflict("-a".into()));
    }

    #[test]
    fn conflicting_long_names_rejected() {
        let err = OptionSet::new([
            CliOption::flag('a', "all", "All").unwrap(),
            CliOption::flag('b', "all", "Also all").unwrap(),
        ])
        .unwrap_err();
        assert_eq!(err, OptionError::Conflict("--all".into()));
    }

    #[test]
    fn missing_required_option() {
        let err = reason_required().parse(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required option: r");
    }

    #[test]
    fn missing_required_options_plural() {
        let set = OptionSet::new([
            CliOption::with_arg('r', "reason", "R", true, "").unwrap(),
            CliOption::with_arg('s', "scope", "S", true, "").unwrap(),
        ])
        .unwrap();
        let err = set.parse(&[]).unwrap_err();
        assert_eq!(err.to_string(), "Missing required options: r, s");
    }

    #[test]
    fn short_and_long_forms_parse() {
        let set = reason_required();
        let short = set.parse(&toks(&["-r", "maintenance"])).unwrap();
        let long = set.parse(&toks(&["--reason", "maintenance"])).unwrap();
        assert_eq!(short.value('r'), Some("maintenance"));
        assert_eq!(short, long);
    }

    #[test]
    fn unknown_option_rejected() {
        let err = reason_required()
            .parse(&toks(&["-r", "x", "-z"]))
            .unwrap_err();
        assert!(matches!(err, OptionError::Unrecognized(ref arg) if arg == "-z"));
        assert!(err.to_string().starts_with("Unrecognized option"));
    }

    #[test]
    fn missing_argument_rejected() {
        let err = reason_required().parse(&toks(&["-r"])).unwrap_err();
        assert!(matches!(err, OptionError::MissingArgument(_)));
    }

    #[test]
    fn optional_argument_may_be_omitted() {
        let set = database_like();
        let parsed = set.parse(&toks(&["-t", "company", "-g"])).unwrap();
        assert!(parsed.has('g'));
        assert_eq!(parsed.value('g'), None);
        let parsed = set.parse(&toks(&["-t", "company", "-g", "1,2"])).unwrap();
        assert_eq!(parsed.value('g'), Some("1,2"));
    }

    #[test]
    fn flags_and_multi_value_options() {
        let parsed = database_like()
            .parse(&toks(&["-v", "--type", "record", "-p", "a", "b", "rest"]))
            .unwrap();
        assert!(parsed.has('v'));
        assert!(parsed.values('v').is_empty());
        assert_eq!(parsed.values('p'), ["a", "b"]);
        assert_eq!(parsed.args(), ["rest"]);
        assert!(!parsed.has('g'));
    }

    #[test]
    fn no_option_set_collects_positionals() {
        let parsed = parse_options(None, &toks(&["one", "two"])).unwrap();
        assert_eq!(parsed.args(), ["one", "two"]);
        assert!(parse_options(None, &[]).unwrap().args().is_empty());
    }

    #[test]
    fn no_option_set_rejects_flags() {
        let err = parse_options(None, &toks(&["--force"])).unwrap_err();
        assert!(matches!(err, OptionError::Unrecognized(_)));
    }

    #[test]
    fn usage_fragments() {
        let set = database_like();
        let usages: Vec<String> = set.iter().map(CliOption::usage).collect();
        assert!(usages.contains(&"-t, --type <TYPE>".to_string()));
        assert!(usages.contains(&"-g, --get [IDS]".to_string()));
        assert!(usages.contains(&"-v, --verbose".to_string()));
        assert!(usages.contains(&"-p, --pair <ARG> <ARG>".to_string()));
    }

    #[test]
    fn to_command_declares_every_option() {
        let cmd = database_like().to_command();
        let ids: Vec<String> = cmd.get_arguments().map(|a| a.get_id().to_string()).collect();
        for id in ["t", "g", "v", "p", ARGS_ID] {
            assert!(ids.contains(&id.to_string()), "missing {id}");
        }
    }
}
