//! Argument parsing and dispatch

use std::path::PathBuf;

use anyhow::{bail, Result};
use cachegroup_schema::SchemaRegistry;
use cachegroup_upgrade::UpgradeChain;
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::commands;
use crate::logging::LogFormat;

fn file_arg() -> Arg {
    Arg::new("file")
        .required(true)
        .value_parser(value_parser!(PathBuf))
        .help("Input file (.json, .yaml, .yml or .toml)")
}

fn version_arg() -> Arg {
    Arg::new("schema-version")
        .long("schema-version")
        .value_parser(value_parser!(u32))
        .help("Schema version (defaults to current)")
}

/// Build the `cachegroup` command
#[must_use]
pub fn command() -> Command {
    Command::new("cachegroup")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Validate, normalize and upgrade cache replication group configs")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("log-format")
                .long("log-format")
                .global(true)
                .default_value("text")
                .value_parser(["text", "json"])
                .help("Log line format on stderr"),
        )
        .subcommand(
            Command::new("schema")
                .about("List attribute definitions")
                .arg(version_arg())
                .arg(
                    Arg::new("json")
                        .long("json")
                        .action(ArgAction::SetTrue)
                        .help("Output as JSON"),
                ),
        )
        .subcommand(
            Command::new("validate")
                .about("Validate a config and print every violation")
                .arg(file_arg())
                .arg(version_arg()),
        )
        .subcommand(
            Command::new("normalize")
                .about("Print the normalized config")
                .arg(file_arg())
                .arg(version_arg())
                .arg(
                    Arg::new("defaults")
                        .long("defaults")
                        .action(ArgAction::SetTrue)
                        .help("Also insert static defaults for absent attributes"),
                ),
        )
        .subcommand(
            Command::new("upgrade")
                .about("Upgrade a persisted state snapshot")
                .arg(file_arg())
                .arg(
                    Arg::new("from")
                        .long("from")
                        .required(true)
                        .value_parser(value_parser!(u32))
                        .help("Version the state was recorded under"),
                )
                .arg(
                    Arg::new("to")
                        .long("to")
                        .value_parser(value_parser!(u32))
                        .help("Target version (defaults to current)"),
                ),
        )
}

/// Log format chosen on the command line
///
/// # Errors
/// Fails for values the parser should already have rejected.
pub fn log_format(matches: &ArgMatches) -> Result<LogFormat> {
    matches
        .get_one::<String>("log-format")
        .map_or(Ok(LogFormat::default()), |s| s.parse())
}

/// Run the selected subcommand and return its stdout text
///
/// # Errors
/// Returns any load, decode, validation or upgrade failure.
pub fn run(matches: &ArgMatches) -> Result<String> {
    let registry = SchemaRegistry::replication_group()?;

    match matches.subcommand() {
        Some(("schema", args)) => commands::schema(
            &registry,
            args.get_one::<u32>("schema-version").copied(),
            args.get_flag("json"),
        ),
        Some(("validate", args)) => commands::validate(
            &registry,
            required_path(args)?,
            args.get_one::<u32>("schema-version").copied(),
        ),
        Some(("normalize", args)) => commands::normalize(
            &registry,
            required_path(args)?,
            args.get_one::<u32>("schema-version").copied(),
            args.get_flag("defaults"),
        ),
        Some(("upgrade", args)) => {
            let chain = UpgradeChain::replication_group()?;
            let Some(from) = args.get_one::<u32>("from").copied() else {
                bail!("--from is required");
            };
            commands::upgrade(
                &registry,
                &chain,
                required_path(args)?,
                from,
                args.get_one::<u32>("to").copied(),
            )
        }
        Some((other, _)) => bail!("unknown command '{other}'"),
        None => bail!("no command given"),
    }
}

fn required_path(args: &ArgMatches) -> Result<&PathBuf> {
    match args.get_one::<PathBuf>("file") {
        Some(path) => Ok(path),
        None => bail!("an input file is required"),
    }
}
