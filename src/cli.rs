//! Clap adapter: one `--<name>` flag per config entry.
//!
//! Compiled only when the `clap` Cargo feature is enabled (on by default).
//! The command is generated from the extracted entries, so every entry gets a
//! flag with its description and default in the help text:
//!
//! - boolean entries accept a bare `--flag` as `true`
//! - list entries may be repeated; a single occurrence stays text and is
//!   split or decoded later
//! - only values typed on the command line count as set
//!
//! `--help` surfaces as [`BindError::Cli`](crate::BindError::Cli); call
//! `exit()` on the inner clap error to print it.

use std::ffi::OsString;
use std::path::PathBuf;

use clap::parser::ValueSource;
use clap::{Arg, ArgAction, ArgMatches, Command};

use crate::entry::ConfigEntry;
use crate::error::BindError;
use crate::shape::{ScalarKind, Shape};
use crate::value::Value;

/// Values taken from the command line.
#[derive(Debug, Default, PartialEq)]
pub struct CliValues {
    /// `(entry name, value)` in entry order.
    pub values: Vec<(String, Value)>,
    /// The config file flag, when given.
    pub config_file: Option<PathBuf>,
}

fn help_text(entry: &ConfigEntry) -> String {
    let mut help = entry.description.clone();
    if !help.is_empty() {
        help.push(' ');
    }
    match &entry.default {
        Some(default) => help.push_str(&format!("[default: {default}]")),
        None => help.push_str("[required]"),
    }
    help
}

fn value_name(shape: &Shape) -> &'static str {
    match shape.inner() {
        Shape::List(_) => "LIST",
        Shape::Scalar(ScalarKind::Bool) => "BOOL",
        Shape::Scalar(ScalarKind::Int) => "INT",
        Shape::Scalar(ScalarKind::Float) => "FLOAT",
        Shape::Scalar(ScalarKind::Path) => "PATH",
        Shape::Scalar(ScalarKind::Duration) => "DURATION",
        _ => "STRING",
    }
}

/// Build the clap command for `entries`. `config_flag` names the flag that
/// points at a config file; it is only added when no entry has that name.
pub fn build_command(app_name: &str, entries: &[ConfigEntry], config_flag: &str) -> Command {
    let mut cmd = Command::new(app_name.to_string()).no_binary_name(true);

    for entry in entries {
        let mut arg = Arg::new(entry.name.clone())
            .long(entry.name.clone())
            .help(help_text(entry))
            .value_name(value_name(&entry.shape));

        arg = if entry.shape.is_bool() {
            arg.num_args(0..=1)
                .default_missing_value("true")
                .action(ArgAction::Set)
        } else if entry.shape.is_list() {
            arg.action(ArgAction::Append)
        } else {
            arg.action(ArgAction::Set)
        };
        cmd = cmd.arg(arg);
    }

    if !entries.iter().any(|e| e.name == config_flag) {
        cmd = cmd.arg(
            Arg::new(config_flag.to_string())
                .long(config_flag.to_string())
                .value_name("FILE")
                .help("Path to the config file")
                .action(ArgAction::Set),
        );
    }
    cmd
}

fn from_command_line(matches: &ArgMatches, id: &str) -> bool {
    matches.value_source(id) == Some(ValueSource::CommandLine)
}

/// Parse `args` (without the binary name) against the entries.
pub fn parse_args<I, T>(
    app_name: &str,
    entries: &[ConfigEntry],
    config_flag: &str,
    args: I,
) -> Result<CliValues, BindError>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let matches = build_command(app_name, entries, config_flag).try_get_matches_from(args)?;
    let mut out = CliValues::default();

    for entry in entries {
        if !from_command_line(&matches, &entry.name) {
            continue;
        }
        let Some(raw) = matches.get_many::<String>(&entry.name) else {
            continue;
        };
        let mut raw: Vec<String> = raw.cloned().collect();
        let value = if raw.len() == 1 {
            Value::String(raw.remove(0))
        } else {
            Value::Sequence(raw.into_iter().map(Value::String).collect())
        };
        out.values.push((entry.name.clone(), value));
    }

    if from_command_line(&matches, config_flag)
        && let Some(path) = matches.get_one::<String>(config_flag)
    {
        out.config_file = Some(PathBuf::from(path));
    }
    Ok(out)
}
