//! Command line interface definition

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgMatches, Command};

/// Parsed command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliArgs {
    pub source: String,
    pub target: String,
    pub query: String,
    pub debug: bool,
    pub config: Option<PathBuf>,
    pub numbered_markers: bool,
    pub dry_run: bool,
}

pub fn command() -> Command {
    Command::new("gtrans")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Translate text with Google Translate, keeping placeholders and markup intact")
        .after_help(
            "Markup (<b>), placeholders ({name}, [count]), format specifiers (%s, %d) and a \
             leading Module::method prefix are never sent for translation.\n\n\
             Credentials come from GTRANS_ACCESS_TOKEN or from \
             `gcloud auth application-default print-access-token` \
             (reads GOOGLE_APPLICATION_CREDENTIALS).",
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .value_name("LANG")
                .help("Source language code (e.g., en)")
                .required(true),
        )
        .arg(
            Arg::new("target")
                .long("target")
                .short('t')
                .value_name("LANG")
                .help("Target language code (e.g., fr, es, de)")
                .required(true),
        )
        .arg(
            Arg::new("query")
                .long("query")
                .short('q')
                .value_name("TEXT")
                .help("Text to translate")
                .required(true),
        )
        .arg(
            Arg::new("debug")
                .long("debug")
                .short('d')
                .help("Log every pipeline step to stderr")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .value_name("FILE")
                .env("GTRANS_CONFIG")
                .help("TOML configuration file")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("numbered-markers")
                .long("numbered-markers")
                .help("Give each protected span its own marker and fail if one is lost")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .help("Use an identity translator instead of the service (combine with --debug)")
                .action(ArgAction::SetTrue),
        )
}

impl CliArgs {
    /// Parse the process arguments; usage errors print help and exit
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    pub fn try_parse_from<I, T>(args: I) -> Result<Self, clap::Error>
    where
        I: IntoIterator<Item = T>,
        T: Into<std::ffi::OsString> + Clone,
    {
        Ok(Self::from_matches(&command().try_get_matches_from(args)?))
    }

    fn from_matches(matches: &ArgMatches) -> Self {
        let string = |id: &str| matches.get_one::<String>(id).cloned().unwrap_or_default();
        CliArgs {
            source: string("source"),
            target: string("target"),
            query: string("query"),
            debug: matches.get_flag("debug"),
            config: matches.get_one::<PathBuf>("config").cloned(),
            numbered_markers: matches.get_flag("numbered-markers"),
            dry_run: matches.get_flag("dry-run"),
        }
    }
}
