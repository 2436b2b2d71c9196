use std::cell::RefCell;
use std::rc::Rc;

use crate::object::{lookup_builtin, Environment, Function, HashPair, Object};
use crate::parser::ast::{
    BlockStatement, Expression, HashLiteral, IfExpression, Program, Statement,
};

/// The tree-walking reference interpreter. Errors are ordinary objects that
/// short-circuit evaluation; `return` travels as a wrapper object that the
/// nearest function body (or the program itself) unwraps.
pub fn eval_program(program: &Program, env: &Rc<RefCell<Environment>>) -> Object {
    let mut result = Object::Null;

    for statement in &program.statements {
        result = eval_statement(statement, env);

        match result {
            Object::ReturnValue(value) => return *value,
            Object::Error(_) => return result,
            _ => {}
        }
    }

    result
}

fn eval_statement(statement: &Statement, env: &Rc<RefCell<Environment>>) -> Object {
    match statement {
        Statement::Expression(expression_statement) => {
            eval_expression(&expression_statement.expression, env)
        }
        Statement::Return(return_statement) => {
            let value = eval_expression(&return_statement.return_value, env);
            if is_error(&value) {
                return value;
            }

            Object::ReturnValue(Box::new(value))
        }
        Statement::Let(let_statement) => {
            let value = eval_expression(&let_statement.value, env);
            if is_error(&value) {
                return value;
            }

            env.borrow_mut().set(&let_statement.name.value, value);

            Object::Null
        }
    }
}

fn eval_block(block: &BlockStatement, env: &Rc<RefCell<Environment>>) -> Object {
    let mut result = Object::Null;

    for statement in &block.statements {
        result = eval_statement(statement, env);

        if matches!(result, Object::ReturnValue(_) | Object::Error(_)) {
            return result;
        }
    }

    result
}

fn eval_expression(expression: &Expression, env: &Rc<RefCell<Environment>>) -> Object {
    match expression {
        Expression::Integer(integer) => Object::Int(integer.value),
        Expression::Str(string) => Object::Str(string.value.clone()),
        Expression::Boolean(boolean) => Object::Bool(boolean.value),
        Expression::Prefix(prefix) => {
            let right = eval_expression(&prefix.right, env);
            if is_error(&right) {
                return right;
            }

            eval_prefix_expression(&prefix.operator, right)
        }
        Expression::Infix(infix) => {
            let left = eval_expression(&infix.left, env);
            if is_error(&left) {
                return left;
            }

            let right = eval_expression(&infix.right, env);
            if is_error(&right) {
                return right;
            }

            eval_infix_expression(&infix.operator, left, right)
        }
        Expression::If(if_expression) => eval_if_expression(if_expression, env),
        Expression::Identifier(identifier) => {
            if let Some(value) = env.borrow().get(&identifier.value) {
                return value;
            }

            if let Some(builtin) = lookup_builtin(&identifier.value) {
                return Object::Builtin(builtin);
            }

            Object::Error(format!("Identifier not found: {}", identifier.value))
        }
        Expression::Function(function) => Object::Function(Function {
            parameters: function.parameters.clone(),
            body: function.body.clone(),
            env: Rc::clone(env),
        }),
        Expression::Call(call) => {
            let function = eval_expression(&call.function, env);
            if is_error(&function) {
                return function;
            }

            match eval_expressions(&call.arguments, env) {
                Ok(args) => apply_function(function, args),
                Err(error) => error,
            }
        }
        Expression::Array(array) => match eval_expressions(&array.elements, env) {
            Ok(elements) => Object::Array(elements),
            Err(error) => error,
        },
        Expression::Hash(hash) => eval_hash_literal(hash, env),
        Expression::Index(index) => {
            let left = eval_expression(&index.left, env);
            if is_error(&left) {
                return left;
            }

            let index = eval_expression(&index.index, env);
            if is_error(&index) {
                return index;
            }

            eval_index_expression(left, index)
        }
    }
}

fn eval_prefix_expression(operator: &str, right: Object) -> Object {
    match operator {
        "!" => Object::Bool(!is_truthy(&right)),
        "-" => match right {
            Object::Int(value) => Object::Int(value.wrapping_neg()),
            right => Object::Error(format!("Unknown operator: -{}", right.kind())),
        },
        operator => Object::Error(format!("Unknown operator: {operator}{}", right.kind())),
    }
}

fn eval_infix_expression(operator: &str, left: Object, right: Object) -> Object {
    match (left, right) {
        (Object::Int(left), Object::Int(right)) => {
            eval_integer_infix_expression(operator, left, right)
        }
        (Object::Str(left), Object::Str(right)) => {
            eval_string_infix_expression(operator, left, right)
        }
        (left, right) => match operator {
            "==" => Object::Bool(objects_identical(&left, &right)),
            "!=" => Object::Bool(!objects_identical(&left, &right)),
            operator if left.kind() != right.kind() => Object::Error(format!(
                "type mismatch: {} {operator} {}",
                left.kind(),
                right.kind()
            )),
            operator => Object::Error(format!(
                "Unknown operator: {} {operator} {}",
                left.kind(),
                right.kind()
            )),
        },
    }
}

fn eval_integer_infix_expression(operator: &str, left: i64, right: i64) -> Object {
    match operator {
        "+" => Object::Int(left.wrapping_add(right)),
        "-" => Object::Int(left.wrapping_sub(right)),
        "*" => Object::Int(left.wrapping_mul(right)),
        "/" => {
            if right == 0 {
                return Object::Error("division by zero".into());
            }
            Object::Int(left.wrapping_div(right))
        }
        "<" => Object::Bool(left < right),
        ">" => Object::Bool(left > right),
        "==" => Object::Bool(left == right),
        "!=" => Object::Bool(left != right),
        operator => Object::Error(format!("Unknown operator: INT {operator} INT")),
    }
}

fn eval_string_infix_expression(operator: &str, left: String, right: String) -> Object {
    match operator {
        "+" => Object::Str(left + &right),
        "==" => Object::Bool(left == right),
        "!=" => Object::Bool(left != right),
        operator => Object::Error(format!("Unknown operator: STRING {operator} STRING")),
    }
}

fn eval_if_expression(if_expression: &IfExpression, env: &Rc<RefCell<Environment>>) -> Object {
    let condition = eval_expression(&if_expression.condition, env);
    if is_error(&condition) {
        return condition;
    }

    if is_truthy(&condition) {
        eval_block(&if_expression.consequence, env)
    } else if let Some(alternative) = &if_expression.alternative {
        eval_block(alternative, env)
    } else {
        Object::Null
    }
}

fn eval_expressions(
    expressions: &[Expression],
    env: &Rc<RefCell<Environment>>,
) -> Result<Vec<Object>, Object> {
    let mut results = vec![];

    for expression in expressions {
        let result = eval_expression(expression, env);
        if is_error(&result) {
            return Err(result);
        }

        results.push(result);
    }

    Ok(results)
}

fn eval_hash_literal(hash: &HashLiteral, env: &Rc<RefCell<Environment>>) -> Object {
    let mut pairs = std::collections::HashMap::new();

    for (key_expression, value_expression) in &hash.pairs {
        let key = eval_expression(key_expression, env);
        if is_error(&key) {
            return key;
        }

        let Some(hash_key) = key.hash_key() else {
            return Object::Error(format!("unusable as hash key: {}", key.kind()));
        };

        let value = eval_expression(value_expression, env);
        if is_error(&value) {
            return value;
        }

        pairs.insert(hash_key, HashPair { key, value });
    }

    Object::Hash(pairs)
}

fn eval_index_expression(left: Object, index: Object) -> Object {
    match (left, index) {
        (Object::Array(elements), Object::Int(index)) => {
            let max = elements.len() as i64 - 1;

            if index < 0 || index > max {
                return Object::Null;
            }

            elements[index as usize].clone()
        }
        (Object::Hash(pairs), index) => {
            let Some(hash_key) = index.hash_key() else {
                return Object::Error(format!("unusable as hash key: {}", index.kind()));
            };

            match pairs.get(&hash_key) {
                Some(pair) => pair.value.clone(),
                None => Object::Null,
            }
        }
        (left, _) => Object::Error(format!("Index operator not supported: {}", left.kind())),
    }
}

fn apply_function(function: Object, args: Vec<Object>) -> Object {
    match function {
        Object::Function(function) => {
            if args.len() != function.parameters.len() {
                return Object::Error(format!(
                    "wrong number of arguments: want={}, got={}",
                    function.parameters.len(),
                    args.len()
                ));
            }

            let env = Environment::new_enclosed(Rc::clone(&function.env));
            for (parameter, arg) in function.parameters.iter().zip(args) {
                env.borrow_mut().set(&parameter.value, arg);
            }

            unwrap_return_value(eval_block(&function.body, &env))
        }
        Object::Builtin(builtin) => (builtin.func)(args),
        function => Object::Error(format!("Not a function: {}", function.kind())),
    }
}

fn unwrap_return_value(object: Object) -> Object {
    match object {
        Object::ReturnValue(value) => *value,
        object => object,
    }
}

fn is_truthy(object: &Object) -> bool {
    match object {
        Object::Bool(value) => *value,
        Object::Null => false,
        _ => true,
    }
}

fn objects_identical(left: &Object, right: &Object) -> bool {
    match (left, right) {
        (Object::Bool(left), Object::Bool(right)) => left == right,
        (Object::Null, Object::Null) => true,
        _ => false,
    }
}

fn is_error(object: &Object) -> bool {
    matches!(object, Object::Error(_))
}
