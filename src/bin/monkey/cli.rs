//! # Cli
//!
//! This module contains everything needed for parsing the CLI arguments for
//! the Monkey interpreter.

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Struct containing the CLI configuration for Monkey.
#[derive(Parser, Debug)]
#[command(author, version, about)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Specify the log level of the interpreter.
    #[arg(value_enum, short, long, default_value_t = LogLevel::default())]
    pub verbosity: LogLevel,
}

impl Cli {
    pub fn init() -> Self {
        Cli::parse()
    }
}

/// Enum for specifying the log level of Monkey.
#[derive(ValueEnum, Clone, Default, Debug)]
pub enum LogLevel {
    /// The default log level. Only critical errors will be logged.
    #[default]
    #[value(alias("0"))]
    Error,

    /// A log level, where also warnings are logged.
    #[value(alias("1"))]
    Warn,

    /// Also log information about the general state of the interpreter,
    /// e.g., which stage is running.
    #[value(alias("2"))]
    Info,

    /// Log everything which happens internally in the interpreter.
    #[value(alias("3"))]
    Debug,

    /// Log extra information, including non-important errors.
    #[value(alias("4"))]
    Trace,
}

impl From<&LogLevel> for log::Level {
    fn from(value: &LogLevel) -> Self {
        match value {
            LogLevel::Error => log::Level::Error,
            LogLevel::Warn => log::Level::Warn,
            LogLevel::Info => log::Level::Info,
            LogLevel::Debug => log::Level::Debug,
            LogLevel::Trace => log::Level::Trace,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run a Monkey script.
    Run(RunArgs),

    /// Start an interactive session.
    Repl,
}

#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// The path to the Monkey source file.
    #[arg(index = 1)]
    pub file: std::path::PathBuf,

    /// The engine executing the program.
    #[arg(value_enum, short, long, default_value_t = Engine::default())]
    pub engine: Engine,

    /// Whether to dump the parsed program as JSON (for debugging).
    #[arg(long)]
    pub dump_ast: bool,

    /// Whether to dump the compiled instructions and constants (for
    /// debugging).
    #[arg(long)]
    pub dump_bytecode: bool,
}

/// Enum for selecting the execution engine.
#[derive(ValueEnum, Clone, Copy, Default, Debug)]
pub enum Engine {
    /// Compile to bytecode and run it on the stack machine.
    #[default]
    Vm,

    /// Walk the syntax tree directly.
    Eval,
}
