use std::{error::Error, fs};

use log::{debug, error};
use monkey_lang::{
    compiler::Compiler,
    evaluator,
    lexer::Lexer,
    object::{Environment, Object},
    parser::Parser,
    vm::Vm,
};

use crate::cli::{Engine, RunArgs};

pub fn run_script(args: &RunArgs) -> Result<(), Box<dyn Error>> {
    let source = fs::read_to_string(&args.file)?;

    let lexer = Lexer::new(&source);
    let mut parser = Parser::new(lexer);

    let program = parser.parse_program();
    if !parser.errors().is_empty() {
        for parse_error in parser.errors() {
            error!("{parse_error}");
        }
        std::process::exit(-1);
    }

    if args.dump_ast {
        println!("{}", serde_json::to_string_pretty(&program)?);
    }

    match args.engine {
        Engine::Vm => {
            let mut compiler = Compiler::new();
            if let Err(compile_error) = compiler.compile(&program) {
                error!("{compile_error}");
                std::process::exit(-1);
            }

            let bytecode = compiler.bytecode();
            debug!(
                "compiled {} instruction bytes, {} constants",
                bytecode.instructions.len(),
                bytecode.constants.len()
            );

            if args.dump_bytecode {
                print!("{}", bytecode.instructions);
                for (index, constant) in bytecode.constants.iter().enumerate() {
                    println!("CONSTANT {index}: {}", constant.inspect());
                }
            }

            let mut machine = Vm::new(bytecode);
            if let Err(runtime_error) = machine.run() {
                error!("{runtime_error}");
                std::process::exit(-1);
            }
        }
        Engine::Eval => {
            let env = Environment::new();

            if let Object::Error(message) = evaluator::eval_program(&program, &env) {
                error!("{message}");
                std::process::exit(-1);
            }
        }
    }

    Ok(())
}
