mod scope;
mod symbols;

pub use symbols::*;

use std::rc::Rc;
use std::{error::Error, fmt::Display};

use crate::bytecode::{make, Instructions, Opcode};
use crate::object::{CompiledFn, Object, BUILTINS};
use crate::parser::ast::{
    BlockStatement, Expression, HashLiteral, IfExpression, Program, Statement,
};

use self::scope::{CompilationScope, EmittedInstruction};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompileError(pub String);

impl Display for CompileError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for CompileError {}

/// The executable output of a compilation: the main instruction buffer and
/// the constant pool it references.
#[derive(Debug, Clone, Default)]
pub struct Bytecode {
    pub instructions: Instructions,
    pub constants: Vec<Object>,
}

/// Translates a program into bytecode.
///
/// Function literals open a fresh compilation scope and symbol table level;
/// leaving the scope yields the function's instruction buffer, which is
/// stored in the constant pool and referenced by `OpClosure`.
pub struct Compiler {
    constants: Vec<Object>,
    symbol_table: SymbolTable,
    scopes: Vec<CompilationScope>,
}

impl Default for Compiler {
    fn default() -> Self {
        Self::new()
    }
}

impl Compiler {
    pub fn new() -> Compiler {
        let mut symbol_table = SymbolTable::new();

        for (index, builtin) in BUILTINS.iter().enumerate() {
            symbol_table.define_builtin(index, builtin.name);
        }

        Compiler::new_with_state(symbol_table, vec![])
    }

    /// Continue compiling against an existing symbol table and constant
    /// pool; this is how the REPL keeps definitions across lines.
    pub fn new_with_state(symbol_table: SymbolTable, constants: Vec<Object>) -> Compiler {
        Compiler {
            constants,
            symbol_table,
            scopes: vec![CompilationScope::default()],
        }
    }

    pub fn compile(&mut self, program: &Program) -> Result<(), CompileError> {
        for statement in &program.statements {
            self.compile_statement(statement)?;
        }

        Ok(())
    }

    pub fn bytecode(&self) -> Bytecode {
        Bytecode {
            instructions: self.scopes[0].instructions.clone(),
            constants: self.constants.clone(),
        }
    }

    /// Hand back the state a REPL needs to carry into the next line.
    pub fn into_state(self) -> (SymbolTable, Vec<Object>) {
        (self.symbol_table, self.constants)
    }

    fn compile_statement(&mut self, statement: &Statement) -> Result<(), CompileError> {
        match statement {
            Statement::Expression(expression_statement) => {
                self.compile_expression(&expression_statement.expression)?;
                self.emit(Opcode::Pop, &[]);
            }
            Statement::Let(let_statement) => {
                self.compile_expression(&let_statement.value)?;

                let symbol = self.symbol_table.define(&let_statement.name.value);
                match symbol.scope {
                    SymbolScope::Global => self.emit(Opcode::SetGlobal, &[symbol.index]),
                    _ => self.emit(Opcode::SetLocal, &[symbol.index]),
                };
            }
            Statement::Return(return_statement) => {
                self.compile_expression(&return_statement.return_value)?;
                self.emit(Opcode::ReturnValue, &[]);
            }
        }

        Ok(())
    }

    fn compile_block(&mut self, block: &BlockStatement) -> Result<(), CompileError> {
        for statement in &block.statements {
            self.compile_statement(statement)?;
        }

        Ok(())
    }

    fn compile_expression(&mut self, expression: &Expression) -> Result<(), CompileError> {
        match expression {
            Expression::Integer(integer) => {
                let constant = self.add_constant(Object::Int(integer.value));
                self.emit(Opcode::Constant, &[constant]);
            }
            Expression::Str(string) => {
                let constant = self.add_constant(Object::Str(string.value.clone()));
                self.emit(Opcode::Constant, &[constant]);
            }
            Expression::Boolean(boolean) => {
                if boolean.value {
                    self.emit(Opcode::True, &[]);
                } else {
                    self.emit(Opcode::False, &[]);
                }
            }
            Expression::Prefix(prefix) => {
                self.compile_expression(&prefix.right)?;

                match prefix.operator.as_str() {
                    "!" => self.emit(Opcode::Bang, &[]),
                    "-" => self.emit(Opcode::Minus, &[]),
                    operator => {
                        return Err(CompileError(format!("unknown operator {operator}")))
                    }
                };
            }
            Expression::Infix(infix) => {
                // `<` has no opcode of its own: the operands are compiled in
                // swapped order and compared with `OpGreaterThan`, so the
                // right-hand side runs first.
                if infix.operator == "<" {
                    self.compile_expression(&infix.right)?;
                    self.compile_expression(&infix.left)?;
                    self.emit(Opcode::GreaterThan, &[]);
                    return Ok(());
                }

                self.compile_expression(&infix.left)?;
                self.compile_expression(&infix.right)?;

                match infix.operator.as_str() {
                    "+" => self.emit(Opcode::Add, &[]),
                    "-" => self.emit(Opcode::Sub, &[]),
                    "*" => self.emit(Opcode::Mul, &[]),
                    "/" => self.emit(Opcode::Div, &[]),
                    ">" => self.emit(Opcode::GreaterThan, &[]),
                    "==" => self.emit(Opcode::Equal, &[]),
                    "!=" => self.emit(Opcode::NotEqual, &[]),
                    operator => {
                        return Err(CompileError(format!("unknown operator {operator}")))
                    }
                };
            }
            Expression::If(if_expression) => self.compile_if_expression(if_expression)?,
            Expression::Identifier(identifier) => {
                let Some(symbol) = self.symbol_table.resolve(&identifier.value) else {
                    return Err(CompileError(format!(
                        "undefined variable {}",
                        identifier.value
                    )));
                };

                self.load_symbol(&symbol);
            }
            Expression::Array(array) => {
                for element in &array.elements {
                    self.compile_expression(element)?;
                }

                self.emit(Opcode::Array, &[array.elements.len()]);
            }
            Expression::Hash(hash) => self.compile_hash_literal(hash)?,
            Expression::Index(index) => {
                self.compile_expression(&index.left)?;
                self.compile_expression(&index.index)?;
                self.emit(Opcode::Index, &[]);
            }
            Expression::Function(function) => {
                self.enter_scope();

                if let Some(name) = &function.name {
                    self.symbol_table.define_function_name(name);
                }

                for parameter in &function.parameters {
                    self.symbol_table.define(&parameter.value);
                }

                self.compile_block(&function.body)?;

                // A body ending in an expression statement returns that
                // value; an empty or non-returning body returns null.
                if self.last_instruction_is(Opcode::Pop) {
                    self.replace_last_pop_with_return();
                }
                if !self.last_instruction_is(Opcode::ReturnValue) {
                    self.emit(Opcode::Return, &[]);
                }

                let free_symbols = self.symbol_table.free_symbols.clone();
                let num_locals = self.symbol_table.num_definitions();
                let instructions = self.leave_scope();

                for symbol in &free_symbols {
                    self.load_symbol(symbol);
                }

                let constant = self.add_constant(Object::CompiledFn(Rc::new(CompiledFn {
                    instructions,
                    num_locals,
                    num_params: function.parameters.len(),
                })));
                self.emit(Opcode::Closure, &[constant, free_symbols.len()]);
            }
            Expression::Call(call) => {
                self.compile_expression(&call.function)?;

                for argument in &call.arguments {
                    self.compile_expression(argument)?;
                }

                self.emit(Opcode::Call, &[call.arguments.len()]);
            }
        }

        Ok(())
    }

    fn compile_if_expression(&mut self, if_expression: &IfExpression) -> Result<(), CompileError> {
        self.compile_expression(&if_expression.condition)?;

        // operand is patched once the consequence is compiled
        let jump_not_truthy = self.emit(Opcode::JumpNotTruthy, &[9999]);

        self.compile_block(&if_expression.consequence)?;
        if self.last_instruction_is(Opcode::Pop) {
            self.remove_last_pop();
        }

        let jump = self.emit(Opcode::Jump, &[9999]);

        let after_consequence = self.current_instructions().len();
        self.change_operand(jump_not_truthy, after_consequence);

        match &if_expression.alternative {
            Some(alternative) => {
                self.compile_block(alternative)?;
                if self.last_instruction_is(Opcode::Pop) {
                    self.remove_last_pop();
                }
            }
            None => {
                self.emit(Opcode::Null, &[]);
            }
        }

        let after_alternative = self.current_instructions().len();
        self.change_operand(jump, after_alternative);

        Ok(())
    }

    fn compile_hash_literal(&mut self, hash: &HashLiteral) -> Result<(), CompileError> {
        // emit pairs ordered by the printed form of their keys, so the same
        // program always compiles to the same bytes
        let mut pairs = hash.pairs.clone();
        pairs.sort_by(|left, right| left.0.to_string().cmp(&right.0.to_string()));

        for (key, value) in &pairs {
            self.compile_expression(key)?;
            self.compile_expression(value)?;
        }

        self.emit(Opcode::Hash, &[pairs.len() * 2]);

        Ok(())
    }

    fn load_symbol(&mut self, symbol: &Symbol) {
        match symbol.scope {
            SymbolScope::Global => self.emit(Opcode::GetGlobal, &[symbol.index]),
            SymbolScope::Local => self.emit(Opcode::GetLocal, &[symbol.index]),
            SymbolScope::Builtin => self.emit(Opcode::GetBuiltin, &[symbol.index]),
            SymbolScope::Free => self.emit(Opcode::GetFree, &[symbol.index]),
            SymbolScope::Function => self.emit(Opcode::CurrentClosure, &[]),
        };
    }

    fn add_constant(&mut self, object: Object) -> usize {
        self.constants.push(object);
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Opcode, operands: &[usize]) -> usize {
        let instruction = make(op, operands);
        let position = self.add_instruction(&instruction);

        self.set_last_instruction(op, position);

        position
    }

    fn add_instruction(&mut self, instruction: &[u8]) -> usize {
        let scope = self.current_scope();
        let position = scope.instructions.len();

        scope.instructions.0.extend_from_slice(instruction);

        position
    }

    fn set_last_instruction(&mut self, opcode: Opcode, position: usize) {
        let scope = self.current_scope();

        scope.previous_instruction = scope.last_instruction;
        scope.last_instruction = Some(EmittedInstruction { opcode, position });
    }

    fn last_instruction_is(&self, op: Opcode) -> bool {
        self.scopes[self.scopes.len() - 1]
            .last_instruction
            .is_some_and(|last| last.opcode == op)
    }

    fn remove_last_pop(&mut self) {
        let scope = self.current_scope();

        if let Some(last) = scope.last_instruction {
            scope.instructions.0.truncate(last.position);
            scope.last_instruction = scope.previous_instruction;
        }
    }

    fn replace_instruction(&mut self, position: usize, new_instruction: &[u8]) {
        let instructions = &mut self.current_scope().instructions.0;
        instructions[position..position + new_instruction.len()].copy_from_slice(new_instruction);
    }

    fn change_operand(&mut self, position: usize, operand: usize) {
        let Some(op) = Opcode::from_byte(self.current_instructions().0[position]) else {
            return;
        };

        self.replace_instruction(position, &make(op, &[operand]));
    }

    fn replace_last_pop_with_return(&mut self) {
        let Some(last) = self.current_scope().last_instruction else {
            return;
        };

        self.replace_instruction(last.position, &make(Opcode::ReturnValue, &[]));

        if let Some(last) = &mut self.current_scope().last_instruction {
            last.opcode = Opcode::ReturnValue;
        }
    }

    fn enter_scope(&mut self) {
        self.scopes.push(CompilationScope::default());

        let outer = std::mem::take(&mut self.symbol_table);
        self.symbol_table = SymbolTable::new_enclosed(outer);
    }

    fn leave_scope(&mut self) -> Instructions {
        let scope = self.scopes.pop().unwrap_or_default();

        if let Some(outer) = std::mem::take(&mut self.symbol_table).into_outer() {
            self.symbol_table = outer;
        }

        scope.instructions
    }

    fn current_scope(&mut self) -> &mut CompilationScope {
        let index = self.scopes.len() - 1;
        &mut self.scopes[index]
    }

    fn current_instructions(&self) -> &Instructions {
        &self.scopes[self.scopes.len() - 1].instructions
    }
}
