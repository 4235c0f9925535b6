//! The Fragment command-line driver: the only place in this crate that
//! turns an [`fragment::error::Error`] into a printed diagnostic and a
//! process exit code (`spec.md` §6/§7).

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, ValueEnum};
use log::debug;

use fragment::error::Error;
use fragment::Program;

/// Interpreter for Fragment, a small dynamically-typed Lisp-like
/// language.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, disable_version_flag = true)]
struct Cli {
    /// Path to the Fragment source file to execute.
    file: PathBuf,

    /// Print version information and exit.
    #[arg(short = 'v', long = "version", action = clap::ArgAction::Version)]
    version: Option<bool>,

    /// How much internal pipeline detail to log to stderr.
    #[arg(value_enum, long, default_value_t = LogLevel::default())]
    verbosity: LogLevel,
}

/// Trimmed to the levels this crate's modules actually emit (no `Info`).
#[derive(ValueEnum, Clone, Default, Debug)]
enum LogLevel {
    #[default]
    #[value(alias("0"))]
    Warn,

    #[value(alias("1"))]
    Debug,

    #[value(alias("2"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

fn main() -> ExitCode {
    let args = Cli::parse();
    simple_logger::init_with_level(log::Level::from(&args.verbosity)).ok();

    let path = args.file.to_string_lossy().to_string();

    debug!("reading source file '{path}'");
    let source = match std::fs::read_to_string(&args.file) {
        Ok(source) => source,
        Err(io_error) => {
            let error = Error::from(io_error);
            eprint!("{}", error.report(&path));
            return ExitCode::FAILURE;
        }
    };

    let program = Program::new();
    match program.run_source(&source, &path) {
        Ok(_) => ExitCode::SUCCESS,
        Err(error) => {
            eprint!("{}", error.report(&path));
            ExitCode::FAILURE
        }
    }
}
