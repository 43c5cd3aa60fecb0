use crate::constants::{exit_codes, verbosity};
use clap::{error::ErrorKind, CommandFactory, Parser};
use log::LevelFilter;
use std::path::PathBuf;

const HELP_TEMPLATE: &str = r#"{about-section}
{usage-heading} {usage}

{all-args}
{after-help}
"#;

/// CLI arguments for viewrender.
#[derive(Parser, Debug, Clone)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Template identifier, or template source with `--from-string`.
    #[arg(value_name = "TEMPLATE")]
    pub template: String,

    /// Directory template identifiers are resolved against.
    #[arg(long = "views", value_name = "DIR")]
    pub views: Option<PathBuf>,

    /// Helper file or directory (repeatable).
    #[arg(long = "helpers", value_name = "PATH")]
    pub helpers: Vec<PathBuf>,

    /// Configuration object in a `.json`, `.yaml` or `.yml` file.
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Locals as a JSON object, or `-` to read them from stdin.
    #[arg(short, long)]
    pub locals: Option<String>,

    /// Treat TEMPLATE as template source.
    #[arg(long = "from-string")]
    pub from_string: bool,

    /// Compile the template even if it is cached.
    #[arg(long = "no-cache")]
    pub no_cache: bool,

    /// Pretty output and debug information in template errors.
    #[arg(long)]
    pub debug: bool,

    /// Write the output to a file instead of stdout.
    #[arg(short, long, value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Increase logging verbosity (`-v`, `-vv`, `-vvv`).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// Parse command line arguments with custom handling for missing required inputs.
pub fn get_args() -> Args {
    Args::try_parse().unwrap_or_else(|e| {
        if e.kind() == ErrorKind::MissingRequiredArgument {
            let mut command = Args::command().help_template(HELP_TEMPLATE);
            if let Err(print_err) = command.print_help() {
                eprintln!("Failed to display help information: {print_err}");
            } else {
                println!();
            }
            std::process::exit(exit_codes::FAILURE);
        } else {
            e.exit();
        }
    })
}

/// Map `-v` counts to the appropriate log level.
pub fn get_log_level_from_verbose(verbose_count: u8) -> LevelFilter {
    match verbose_count {
        verbosity::OFF => LevelFilter::Warn,
        verbosity::INFO => LevelFilter::Info,
        verbosity::DEBUG => LevelFilter::Debug,
        verbosity::TRACE.. => LevelFilter::Trace,
    }
}
