use std::io::{BufRead, Write};

use colored::Colorize;

use crate::compiler::{Compiler, SymbolTable};
use crate::lexer::Lexer;
use crate::object::{Object, BUILTINS};
use crate::parser::{ParseError, Parser};
use crate::vm::{Vm, GLOBALS_SIZE};

const PROMPT: &str = ">> ";

const MONKEY_FACE: &str = r#"            __,__
   .--.  .-"     "-.  .--.
  / .. \/  .-. .-.  \/ .. \
 | |  '|  /   Y   \  |'  | |
 | \   \  \ 0 | 0 /  /   / |
  \ '- ,\.-"""""""-./, -' /
   ''-' /_   ^ ^   _\ '-''
       |  \._   _./  |
       \   \ '~' /   /
        '._ '-=-' _.'
           '-----'
"#;

/// The interactive loop. Constants, globals and the symbol table survive
/// from line to line, so definitions stay usable; builtins are predefined
/// so their indices never shift between lines.
pub fn start(input: impl BufRead, output: &mut impl Write) -> std::io::Result<()> {
    let mut constants: Vec<Object> = vec![];
    let mut globals = vec![Object::Null; GLOBALS_SIZE];

    let mut symbol_table = SymbolTable::new();
    for (index, builtin) in BUILTINS.iter().enumerate() {
        symbol_table.define_builtin(index, builtin.name);
    }

    write!(output, "{PROMPT}")?;
    output.flush()?;

    for line in input.lines() {
        let line = line?;

        let lexer = Lexer::new(&line);
        let mut parser = Parser::new(lexer);

        let program = parser.parse_program();
        if !parser.errors().is_empty() {
            print_parser_errors(output, parser.errors())?;
            write!(output, "{PROMPT}")?;
            output.flush()?;
            continue;
        }

        let mut compiler = Compiler::new_with_state(symbol_table, constants);
        let compiled = compiler.compile(&program);
        let bytecode = compiler.bytecode();
        (symbol_table, constants) = compiler.into_state();

        if let Err(error) = compiled {
            writeln!(output, "Woops! Compilation failed:\n {error}")?;
            write!(output, "{PROMPT}")?;
            output.flush()?;
            continue;
        }

        let mut machine = Vm::new_with_globals_store(bytecode, globals);
        let executed = machine.run();
        let result = machine.last_popped_stack_elem();
        globals = machine.into_globals();

        match executed {
            Ok(()) => writeln!(output, "{}", result.inspect())?,
            Err(error) => writeln!(output, "Woops! Executing bytecode failed:\n {error}")?,
        }

        write!(output, "{PROMPT}")?;
        output.flush()?;
    }

    Ok(())
}

fn print_parser_errors(output: &mut impl Write, errors: &[ParseError]) -> std::io::Result<()> {
    write!(output, "{MONKEY_FACE}")?;
    writeln!(
        output,
        "{}",
        "Woops! We ran into some monkey business here!".red()
    )?;
    writeln!(output, " parser errors:")?;

    for error in errors {
        writeln!(output, "\t{error}")?;
    }

    Ok(())
}
