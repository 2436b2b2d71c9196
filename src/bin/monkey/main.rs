//! # Monkey
//!
//! This binary is the interpreter of Monkey. It combines the parser, the
//! bytecode compiler, the stack VM and the tree-walking evaluator into a
//! single application.

mod cli;
mod commands;

use cli::*;

use std::error::Error;
use std::io::{stdin, stdout};

use commands::run_script;
use monkey_lang::repl;

fn main() -> Result<(), Box<dyn Error>> {
    let args = Cli::init();

    simple_logger::init_with_level((&args.verbosity).into())?;

    match &args.command {
        Commands::Run(run_args) => run_script(run_args)?,
        Commands::Repl => {
            let stdin = stdin();
            let mut stdout = stdout();

            repl::start(stdin.lock(), &mut stdout)?;
        }
    }

    Ok(())
}
