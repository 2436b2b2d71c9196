mod frame;

use std::collections::HashMap;
use std::rc::Rc;
use std::{error::Error, fmt::Display};

use crate::bytecode::{read_u16, Opcode};
use crate::compiler::Bytecode;
use crate::object::{Builtin, Closure, CompiledFn, HashPair, Object, BUILTINS};

use self::frame::Frame;

pub const STACK_SIZE: usize = 2048;
pub const GLOBALS_SIZE: usize = 65536;
pub const MAX_FRAMES: usize = 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RuntimeError(pub String);

impl Display for RuntimeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.0.as_str())
    }
}

impl Error for RuntimeError {}

pub type VmResult<T> = Result<T, RuntimeError>;

/// The stack machine. The compiled main program runs as a closure in the
/// bottom frame; calls push further frames whose locals live directly on
/// the operand stack above their base pointer.
pub struct Vm {
    constants: Vec<Object>,
    stack: Vec<Object>,
    sp: usize,
    globals: Vec<Object>,
    frames: Vec<Frame>,
}

impl Vm {
    pub fn new(bytecode: Bytecode) -> Vm {
        Vm::new_with_globals_store(bytecode, vec![Object::Null; GLOBALS_SIZE])
    }

    /// Run against an existing globals store, so bindings survive from one
    /// compile-run cycle to the next (the REPL relies on this).
    pub fn new_with_globals_store(bytecode: Bytecode, globals: Vec<Object>) -> Vm {
        let main_fn = CompiledFn {
            instructions: bytecode.instructions,
            num_locals: 0,
            num_params: 0,
        };
        let main_closure = Closure {
            func: Rc::new(main_fn),
            free: vec![],
        };

        Vm {
            constants: bytecode.constants,
            stack: vec![Object::Null; STACK_SIZE],
            sp: 0,
            globals,
            frames: vec![Frame::new(main_closure, 0)],
        }
    }

    /// Hand the globals store back for the next cycle.
    pub fn into_globals(self) -> Vec<Object> {
        self.globals
    }

    /// The value most recently popped off the stack. Expression statements
    /// end in `OpPop`, so after a run this is the program's result.
    pub fn last_popped_stack_elem(&self) -> Object {
        self.stack.get(self.sp).cloned().unwrap_or(Object::Null)
    }

    pub fn run(&mut self) -> VmResult<()> {
        while self.current_frame().ip < self.current_frame().instructions().len() {
            let ip = self.current_frame().ip;
            let function = Rc::clone(&self.current_frame().closure.func);
            let ins = &function.instructions.0;

            let Some(op) = Opcode::from_byte(ins[ip]) else {
                return Err(RuntimeError(format!("OpCode {} undefined", ins[ip])));
            };
            self.current_frame_mut().ip += 1;

            match op {
                Opcode::Constant => {
                    let index = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip += 2;

                    let constant = self.constants[index].clone();
                    self.push(constant)?;
                }
                Opcode::Pop => {
                    self.pop();
                }
                Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Div => {
                    self.execute_binary_operation(op)?;
                }
                Opcode::True => self.push(Object::Bool(true))?,
                Opcode::False => self.push(Object::Bool(false))?,
                Opcode::Equal | Opcode::NotEqual | Opcode::GreaterThan => {
                    self.execute_comparison(op)?;
                }
                Opcode::Bang => {
                    let operand = self.pop();
                    self.push(Object::Bool(!is_truthy(&operand)))?;
                }
                Opcode::Minus => {
                    let operand = self.pop();
                    let Object::Int(value) = operand else {
                        return Err(RuntimeError(format!(
                            "unsupported type for negation: {}",
                            operand.kind()
                        )));
                    };
                    self.push(Object::Int(value.wrapping_neg()))?;
                }
                Opcode::Jump => {
                    let position = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip = position;
                }
                Opcode::JumpNotTruthy => {
                    let position = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip += 2;

                    let condition = self.pop();
                    if !is_truthy(&condition) {
                        self.current_frame_mut().ip = position;
                    }
                }
                Opcode::Null => self.push(Object::Null)?,
                Opcode::SetGlobal => {
                    let index = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip += 2;

                    self.globals[index] = self.pop();
                }
                Opcode::GetGlobal => {
                    let index = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip += 2;

                    let value = self.globals[index].clone();
                    self.push(value)?;
                }
                Opcode::SetLocal => {
                    let index = ins[ip + 1] as usize;
                    self.current_frame_mut().ip += 1;

                    let base_pointer = self.current_frame().base_pointer;
                    self.stack[base_pointer + index] = self.pop();
                }
                Opcode::GetLocal => {
                    let index = ins[ip + 1] as usize;
                    self.current_frame_mut().ip += 1;

                    let base_pointer = self.current_frame().base_pointer;
                    let value = self.stack[base_pointer + index].clone();
                    self.push(value)?;
                }
                Opcode::GetBuiltin => {
                    let index = ins[ip + 1] as usize;
                    self.current_frame_mut().ip += 1;

                    self.push(Object::Builtin(BUILTINS[index]))?;
                }
                Opcode::Array => {
                    let length = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip += 2;

                    let elements = self.stack[self.sp - length..self.sp].to_vec();
                    self.sp -= length;
                    self.push(Object::Array(elements))?;
                }
                Opcode::Hash => {
                    let length = read_u16(&ins[ip + 1..]) as usize;
                    self.current_frame_mut().ip += 2;

                    let hash = self.build_hash(length)?;
                    self.sp -= length;
                    self.push(hash)?;
                }
                Opcode::Index => {
                    let index = self.pop();
                    let left = self.pop();

                    self.execute_index_expression(left, index)?;
                }
                Opcode::Call => {
                    let num_args = ins[ip + 1] as usize;
                    self.current_frame_mut().ip += 1;

                    self.execute_call(num_args)?;
                }
                Opcode::ReturnValue => {
                    let return_value = self.pop();
                    self.return_from_frame(return_value)?;
                }
                Opcode::Return => {
                    self.return_from_frame(Object::Null)?;
                }
                Opcode::Closure => {
                    let constant = read_u16(&ins[ip + 1..]) as usize;
                    let num_free = ins[ip + 3] as usize;
                    self.current_frame_mut().ip += 3;

                    self.push_closure(constant, num_free)?;
                }
                Opcode::GetFree => {
                    let index = ins[ip + 1] as usize;
                    self.current_frame_mut().ip += 1;

                    let value = self.current_frame().closure.free[index].clone();
                    self.push(value)?;
                }
                Opcode::CurrentClosure => {
                    let closure = self.current_frame().closure.clone();
                    self.push(Object::Closure(closure))?;
                }
            }
        }

        Ok(())
    }

    fn execute_binary_operation(&mut self, op: Opcode) -> VmResult<()> {
        let right = self.pop();
        let left = self.pop();

        match (left, right) {
            (Object::Int(left), Object::Int(right)) => {
                let result = match op {
                    Opcode::Add => left.wrapping_add(right),
                    Opcode::Sub => left.wrapping_sub(right),
                    Opcode::Mul => left.wrapping_mul(right),
                    Opcode::Div => {
                        if right == 0 {
                            return Err(RuntimeError("division by zero".into()));
                        }
                        left.wrapping_div(right)
                    }
                    op => {
                        return Err(RuntimeError(format!(
                            "unknown integer operator: {}",
                            op as u8
                        )))
                    }
                };

                self.push(Object::Int(result))
            }
            (Object::Str(left), Object::Str(right)) => {
                if op != Opcode::Add {
                    return Err(RuntimeError(format!(
                        "unknown string operator: {}",
                        op as u8
                    )));
                }

                self.push(Object::Str(left + &right))
            }
            (left, right) => Err(RuntimeError(format!(
                "unsupported types for binary operation: {} {}",
                left.kind(),
                right.kind()
            ))),
        }
    }

    fn execute_comparison(&mut self, op: Opcode) -> VmResult<()> {
        let right = self.pop();
        let left = self.pop();

        if let (Object::Int(left), Object::Int(right)) = (&left, &right) {
            let result = match op {
                Opcode::Equal => left == right,
                Opcode::NotEqual => left != right,
                _ => left > right,
            };

            return self.push(Object::Bool(result));
        }

        match op {
            Opcode::Equal => {
                let result = objects_equal(&left, &right);
                self.push(Object::Bool(result))
            }
            Opcode::NotEqual => {
                let result = !objects_equal(&left, &right);
                self.push(Object::Bool(result))
            }
            _ => Err(RuntimeError(format!(
                "unsupported types for binary operation: {} {}",
                left.kind(),
                right.kind()
            ))),
        }
    }

    fn build_hash(&mut self, length: usize) -> VmResult<Object> {
        let mut pairs = HashMap::new();

        let mut index = self.sp - length;
        while index < self.sp {
            let key = self.stack[index].clone();
            let value = self.stack[index + 1].clone();

            let Some(hash_key) = key.hash_key() else {
                return Err(RuntimeError(format!(
                    "unusable as hash key: {}",
                    key.kind()
                )));
            };

            pairs.insert(hash_key, HashPair { key, value });
            index += 2;
        }

        Ok(Object::Hash(pairs))
    }

    fn execute_index_expression(&mut self, left: Object, index: Object) -> VmResult<()> {
        match (left, index) {
            (Object::Array(elements), Object::Int(index)) => {
                let max = elements.len() as i64 - 1;

                if index < 0 || index > max {
                    return self.push(Object::Null);
                }

                self.push(elements[index as usize].clone())
            }
            (Object::Hash(pairs), index) => {
                let Some(hash_key) = index.hash_key() else {
                    return Err(RuntimeError(format!(
                        "unusable as hash key: {}",
                        index.kind()
                    )));
                };

                match pairs.get(&hash_key) {
                    Some(pair) => self.push(pair.value.clone()),
                    None => self.push(Object::Null),
                }
            }
            (left, _) => Err(RuntimeError(format!(
                "index operator not supported: {}",
                left.kind()
            ))),
        }
    }

    fn execute_call(&mut self, num_args: usize) -> VmResult<()> {
        let callee = self.stack[self.sp - 1 - num_args].clone();

        match callee {
            Object::Closure(closure) => self.call_closure(closure, num_args),
            Object::Builtin(builtin) => self.call_builtin(builtin, num_args),
            _ => Err(RuntimeError(
                "calling non-function and non-builtin".into(),
            )),
        }
    }

    fn call_closure(&mut self, closure: Closure, num_args: usize) -> VmResult<()> {
        if num_args != closure.func.num_params {
            return Err(RuntimeError(format!(
                "wrong number of arguments: want={}, got={}",
                closure.func.num_params, num_args
            )));
        }

        if self.frames.len() >= MAX_FRAMES {
            return Err(RuntimeError("frames stack overflow".into()));
        }

        // the arguments already sit on the stack and become locals 0..argc
        let base_pointer = self.sp - num_args;
        let num_locals = closure.func.num_locals;

        if base_pointer + num_locals > STACK_SIZE {
            return Err(RuntimeError("stack overflow".into()));
        }

        self.frames.push(Frame::new(closure, base_pointer));
        self.sp = base_pointer + num_locals;

        Ok(())
    }

    fn call_builtin(&mut self, builtin: Builtin, num_args: usize) -> VmResult<()> {
        let args = self.stack[self.sp - num_args..self.sp].to_vec();

        let result = (builtin.func)(args);

        // drop the arguments and the callee; a builtin's error object is
        // the call's result, not a machine failure
        self.sp = self.sp - num_args - 1;
        self.push(result)
    }

    fn return_from_frame(&mut self, return_value: Object) -> VmResult<()> {
        if self.frames.len() == 1 {
            // `return` at the top level: end the program with that value as
            // the last popped element
            let end = self.current_frame().instructions().len();
            self.current_frame_mut().ip = end;

            self.push(return_value)?;
            self.pop();

            return Ok(());
        }

        let Some(frame) = self.frames.pop() else {
            return Err(RuntimeError("frames stack underflow".into()));
        };

        self.sp = frame.base_pointer - 1;
        self.push(return_value)
    }

    fn push_closure(&mut self, constant: usize, num_free: usize) -> VmResult<()> {
        let object = self.constants[constant].clone();

        let Object::CompiledFn(func) = object else {
            return Err(RuntimeError(format!(
                "not a function: {}",
                object.inspect()
            )));
        };

        let free = self.stack[self.sp - num_free..self.sp].to_vec();
        self.sp -= num_free;

        self.push(Object::Closure(Closure { func, free }))
    }

    fn push(&mut self, object: Object) -> VmResult<()> {
        if self.sp >= STACK_SIZE {
            return Err(RuntimeError("stack overflow".into()));
        }

        self.stack[self.sp] = object;
        self.sp += 1;

        Ok(())
    }

    fn pop(&mut self) -> Object {
        self.sp -= 1;
        self.stack[self.sp].clone()
    }

    fn current_frame(&self) -> &Frame {
        &self.frames[self.frames.len() - 1]
    }

    fn current_frame_mut(&mut self) -> &mut Frame {
        let index = self.frames.len() - 1;
        &mut self.frames[index]
    }
}

fn is_truthy(object: &Object) -> bool {
    match object {
        Object::Bool(value) => *value,
        Object::Null => false,
        _ => true,
    }
}

/// Equality over non-integer operands: booleans, null and strings compare
/// by value, everything else compares unequal.
fn objects_equal(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Bool(left), Object::Bool(right)) => left == right,
        (Object::Str(left), Object::Str(right)) => left == right,
        (Object::Null, Object::Null) => true,
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use crate::compiler::Compiler;
    use crate::lexer::Lexer;
    use crate::parser::Parser;

    use super::*;

    fn run(input: &str) -> Result<Vm, RuntimeError> {
        let mut parser = Parser::new(Lexer::new(input));
        let program = parser.parse_program();
        assert!(parser.errors().is_empty(), "parser errors for {input:?}");

        let mut compiler = Compiler::new();
        compiler
            .compile(&program)
            .unwrap_or_else(|error| panic!("compilation of {input:?} failed: {error}"));

        let mut vm = Vm::new(compiler.bytecode());
        vm.run()?;

        Ok(vm)
    }

    fn run_vm_test(input: &str, expected: Object) {
        let vm = match run(input) {
            Ok(vm) => vm,
            Err(error) => panic!("vm error for {input:?}: {error}"),
        };

        assert_eq!(
            expected,
            vm.last_popped_stack_elem(),
            "wrong result for {input:?}"
        );

        // the machine must come to rest cleanly
        assert_eq!(0, vm.sp, "stack not empty after {input:?}");
        assert_eq!(1, vm.frames.len(), "frames left over after {input:?}");
    }

    fn run_vm_error_test(input: &str, message: &str) {
        match run(input) {
            Ok(_) => panic!("expected vm error for {input:?}"),
            Err(error) => assert_eq!(message, error.to_string(), "for input {input:?}"),
        }
    }

    fn int_array(values: &[i64]) -> Object {
        Object::Array(values.iter().copied().map(Object::Int).collect())
    }

    fn int_hash(pairs: &[(i64, i64)]) -> Object {
        let mut result = HashMap::new();

        for (key, value) in pairs {
            let key = Object::Int(*key);
            let Some(hash_key) = key.hash_key() else {
                unreachable!();
            };
            result.insert(
                hash_key,
                HashPair {
                    key,
                    value: Object::Int(*value),
                },
            );
        }

        Object::Hash(result)
    }

    #[test]
    fn test_integer_arithmetic() {
        let cases = [
            ("1", 1),
            ("2", 2),
            ("1 + 2", 3),
            ("1 - 2", -1),
            ("1 * 2", 2),
            ("4 / 2", 2),
            ("50 / 2 * 2 + 10 - 5", 55),
            ("5 * (2 + 10)", 60),
            ("-5", -5),
            ("-50 + 100 + -50", 0),
            ("(5 + 10 * 2 + 15 / 3) * 2 + -10", 50),
            ("7 / 2", 3),
            ("-7 / 2", -3),
        ];

        for (input, expected) in cases {
            run_vm_test(input, Object::Int(expected));
        }
    }

    #[test]
    fn test_boolean_expressions() {
        let cases = [
            ("true", true),
            ("false", false),
            ("1 < 2", true),
            ("1 > 2", false),
            ("1 == 1", true),
            ("1 != 1", false),
            ("true == true", true),
            ("false == false", true),
            ("true == false", false),
            ("true != false", true),
            ("(1 < 2) == true", true),
            ("(1 > 2) == true", false),
            ("!true", false),
            ("!false", true),
            ("!5", false),
            ("!!true", true),
            ("!!5", true),
            ("!(if (false) { 5; })", true),
        ];

        for (input, expected) in cases {
            run_vm_test(input, Object::Bool(expected));
        }
    }

    #[test]
    fn test_conditionals() {
        let cases = [
            ("if (true) { 10 }", Object::Int(10)),
            ("if (true) { 10 } else { 20 }", Object::Int(10)),
            ("if (false) { 10 } else { 20 }", Object::Int(20)),
            ("if (1) { 10 }", Object::Int(10)),
            ("if (1 < 2) { 10 }", Object::Int(10)),
            ("if (1 > 2) { 10 } else { 20 }", Object::Int(20)),
            ("if (false) { 10 }", Object::Null),
            ("if (1 > 2) { 10 }", Object::Null),
            (
                "if ((if (false) { 10 })) { 10 } else { 20 }",
                Object::Int(20),
            ),
        ];

        for (input, expected) in cases {
            run_vm_test(input, expected);
        }
    }

    #[test]
    fn test_global_let_statements() {
        let cases = [
            ("let one = 1; one", 1),
            ("let one = 1; let two = 2; one + two", 3),
            ("let one = 1; let two = one + one; one + two", 3),
        ];

        for (input, expected) in cases {
            run_vm_test(input, Object::Int(expected));
        }
    }

    #[test]
    fn test_rebinding_resolves_against_compile_time_bindings() {
        // the function body was compiled against the first `x`; the second
        // `let x` occupies a fresh slot
        run_vm_test(
            "let x = 0; let f = fn() { x }; let x = 1; f();",
            Object::Int(0),
        );
    }

    #[test]
    fn test_string_expressions() {
        run_vm_test("\"monkey\"", Object::Str("monkey".into()));
        run_vm_test("\"mon\" + \"key\"", Object::Str("monkey".into()));
        run_vm_test(
            "\"mon\" + \"key\" + \"banana\"",
            Object::Str("monkeybanana".into()),
        );
        run_vm_test("\"a\" == \"a\"", Object::Bool(true));
        run_vm_test("\"a\" == \"b\"", Object::Bool(false));
        run_vm_test("\"a\" != \"b\"", Object::Bool(true));
    }

    #[test]
    fn test_array_literals() {
        run_vm_test("[]", int_array(&[]));
        run_vm_test("[1, 2, 3]", int_array(&[1, 2, 3]));
        run_vm_test("[1 + 2, 3 * 4, 5 + 6]", int_array(&[3, 12, 11]));
    }

    #[test]
    fn test_hash_literals() {
        run_vm_test("{}", int_hash(&[]));
        run_vm_test("{1: 2, 2: 3}", int_hash(&[(1, 2), (2, 3)]));
        run_vm_test("{1 + 1: 2 * 2, 3 + 3: 4 * 4}", int_hash(&[(2, 4), (6, 16)]));
    }

    #[test]
    fn test_index_expressions() {
        let cases = [
            ("[1, 2, 3][1]", Object::Int(2)),
            ("[1, 2, 3][0 + 2]", Object::Int(3)),
            ("[[1, 1, 1]][0][0]", Object::Int(1)),
            ("[][0]", Object::Null),
            ("[1, 2, 3][99]", Object::Null),
            ("[1][-1]", Object::Null),
            ("{1: 1, 2: 2}[1]", Object::Int(1)),
            ("{1: 1, 2: 2}[2]", Object::Int(2)),
            ("{1: 1}[0]", Object::Null),
            ("{}[0]", Object::Null),
        ];

        for (input, expected) in cases {
            run_vm_test(input, expected);
        }
    }

    #[test]
    fn test_calling_functions() {
        let cases = [
            ("let fivePlusTen = fn() { 5 + 10; }; fivePlusTen();", 15),
            ("let one = fn() { 1; }; let two = fn() { 2; }; one() + two()", 3),
            (
                "let a = fn() { 1 }; let b = fn() { a() + 1 }; let c = fn() { b() + 1 }; c();",
                3,
            ),
            ("let earlyExit = fn() { return 99; 100; }; earlyExit();", 99),
            ("let identity = fn(a) { a; }; identity(4);", 4),
            ("let sum = fn(a, b) { a + b; }; sum(1, 2);", 3),
            (
                "let sum = fn(a, b) { let c = a + b; c; }; sum(1, 2) + sum(3, 4);",
                10,
            ),
            (
                "let globalNum = 10;
                 let sum = fn(a, b) { let c = a + b; c + globalNum; };
                 sum(1, 2) + sum(3, 4) + globalNum;",
                50,
            ),
        ];

        for (input, expected) in cases {
            run_vm_test(input, Object::Int(expected));
        }
    }

    #[test]
    fn test_functions_without_return_value() {
        run_vm_test("let noReturn = fn() { }; noReturn();", Object::Null);
        run_vm_test(
            "let noReturn = fn() { }; let noReturnTwo = fn() { noReturn(); }; noReturn(); noReturnTwo();",
            Object::Null,
        );
    }

    #[test]
    fn test_first_class_functions() {
        run_vm_test(
            "let returnsOneReturner = fn() { let returnsOne = fn() { 1; }; returnsOne; };
             returnsOneReturner()();",
            Object::Int(1),
        );
    }

    #[test]
    fn test_calling_functions_with_wrong_arguments() {
        let cases = [
            ("fn() { 1; }(1);", "wrong number of arguments: want=0, got=1"),
            ("fn(a) { a; }();", "wrong number of arguments: want=1, got=0"),
            (
                "fn(a, b) { a + b; }(1);",
                "wrong number of arguments: want=2, got=1",
            ),
        ];

        for (input, message) in cases {
            run_vm_error_test(input, message);
        }
    }

    #[test]
    fn test_builtin_functions() {
        let cases = [
            ("len(\"\")", Object::Int(0)),
            ("len(\"four\")", Object::Int(4)),
            ("len(\"hello world\")", Object::Int(11)),
            ("len([1, 2, 3])", Object::Int(3)),
            ("len([])", Object::Int(0)),
            (
                "len(1)",
                Object::Error("Argument to `len` not supported, got INT".into()),
            ),
            (
                "len(\"one\", \"two\")",
                Object::Error("Wrong number of arguments. got=2, want=1".into()),
            ),
            ("puts(\"hello\", \"world\")", Object::Null),
            ("first([1, 2, 3])", Object::Int(1)),
            ("first([])", Object::Null),
            (
                "first(1)",
                Object::Error("Argument to `first` must be ARRAY, got INT".into()),
            ),
            ("last([1, 2, 3])", Object::Int(3)),
            ("last([])", Object::Null),
            ("rest([1, 2, 3])", int_array(&[2, 3])),
            ("rest([])", Object::Null),
            ("push([], 1)", int_array(&[1])),
            (
                "push(1, 1)",
                Object::Error("Argument to `push` must be ARRAY, got INT".into()),
            ),
        ];

        for (input, expected) in cases {
            run_vm_test(input, expected);
        }
    }

    #[test]
    fn test_push_leaves_the_original_array_untouched() {
        run_vm_test(
            "let arr = [1, 2, 3]; push(arr, 4); arr;",
            int_array(&[1, 2, 3]),
        );
        run_vm_test(
            "let arr = [1, 2, 3]; push(arr, 4);",
            int_array(&[1, 2, 3, 4]),
        );
    }

    #[test]
    fn test_closures() {
        run_vm_test(
            "let newClosure = fn(a) { fn() { a; }; }; let closure = newClosure(99); closure();",
            Object::Int(99),
        );
        run_vm_test(
            "let newAdder = fn(a, b) { fn(c) { a + b + c }; }; let adder = newAdder(1, 2); adder(8);",
            Object::Int(11),
        );
        run_vm_test(
            "let newAdder = fn(a, b) { let c = a + b; fn(d) { c + d }; };
             let adder = newAdder(1, 2); adder(8);",
            Object::Int(11),
        );
        run_vm_test(
            "let newAdderOuter = fn(a, b) {
                 let c = a + b;
                 fn(d) { let e = d + c; fn(f) { e + f; }; };
             };
             let newAdderInner = newAdderOuter(1, 2);
             let adder = newAdderInner(3);
             adder(8);",
            Object::Int(14),
        );
        run_vm_test(
            "let newAdder = fn(a) { fn(b) { a + b; }; }; let addTwo = newAdder(2); addTwo(3);",
            Object::Int(5),
        );
    }

    #[test]
    fn test_recursive_functions() {
        run_vm_test(
            "let countDown = fn(x) { if (x == 0) { return 0; } else { countDown(x - 1); } };
             countDown(1);",
            Object::Int(0),
        );
        run_vm_test(
            "let wrapper = fn() {
                 let countDown = fn(x) { if (x == 0) { return 0; } else { countDown(x - 1); } };
                 countDown(1);
             };
             wrapper();",
            Object::Int(0),
        );
    }

    #[test]
    fn test_recursive_fibonacci() {
        run_vm_test(
            "let fibonacci = fn(x) {
                 if (x == 0) { return 0; }
                 if (x == 1) { return 1; }
                 fibonacci(x - 1) + fibonacci(x - 2);
             };
             fibonacci(15);",
            Object::Int(610),
        );
    }

    #[test]
    fn test_shadowing_inside_a_closure_counts_from_the_captured_value() {
        // the inner `let i` shadows the captured one, so every call
        // observes the original snapshot
        run_vm_test(
            "let counter = fn() {
                 let i = 0;
                 let inc = fn() { let i = i + 1; i; };
                 inc(); inc(); inc();
             };
             counter();",
            Object::Int(1),
        );
    }

    #[test]
    fn test_top_level_return() {
        run_vm_test("return 5; 99;", Object::Int(5));
        run_vm_test("if (true) { return 42; } 99;", Object::Int(42));
    }

    #[test]
    fn test_runtime_errors() {
        let cases = [
            ("5 + true;", "unsupported types for binary operation: INT BOOL"),
            ("true + false;", "unsupported types for binary operation: BOOL BOOL"),
            ("true > false;", "unsupported types for binary operation: BOOL BOOL"),
            ("-true", "unsupported type for negation: BOOL"),
            ("5 / 0", "division by zero"),
            ("1(2)", "calling non-function and non-builtin"),
            ("\"name\"[0]", "index operator not supported: STRING"),
            ("{[1]: 2}", "unusable as hash key: ARRAY"),
            ("{1: 2}[fn(x) { x }]", "unusable as hash key: CLOSURE"),
        ];

        for (input, message) in cases {
            run_vm_error_test(input, message);
        }
    }

    #[test]
    fn test_unbounded_recursion_is_a_fatal_error() {
        run_vm_error_test(
            "let loop = fn() { loop(); }; loop();",
            "frames stack overflow",
        );
    }

    #[test]
    fn test_globals_store_survives_across_machines() {
        use crate::compiler::SymbolTable;

        fn compile_line(
            input: &str,
            symbol_table: SymbolTable,
            constants: Vec<Object>,
        ) -> (Bytecode, SymbolTable, Vec<Object>) {
            let mut parser = Parser::new(Lexer::new(input));
            let program = parser.parse_program();

            let mut compiler = Compiler::new_with_state(symbol_table, constants);
            compiler.compile(&program).unwrap();

            let bytecode = compiler.bytecode();
            let (symbol_table, constants) = compiler.into_state();

            (bytecode, symbol_table, constants)
        }

        let (bytecode, symbol_table, constants) =
            compile_line("let one = 1;", SymbolTable::new(), vec![]);
        let mut vm = Vm::new_with_globals_store(bytecode, vec![Object::Null; GLOBALS_SIZE]);
        vm.run().unwrap();
        let globals = vm.into_globals();

        assert_eq!(Object::Int(1), globals[0]);

        let (bytecode, _, _) = compile_line("one + one;", symbol_table, constants);
        let mut vm = Vm::new_with_globals_store(bytecode, globals);
        vm.run().unwrap();

        assert_eq!(Object::Int(2), vm.last_popped_stack_elem());
    }
}
