mod builtins;
mod environment;

pub use builtins::*;
pub use environment::*;

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt::Debug;
use std::rc::Rc;

use crate::bytecode::Instructions;
use crate::parser::ast::{BlockStatement, Identifier};

const FNV_OFFSET_BASIS: u64 = 14695981039346656037;
const FNV_PRIME: u64 = 1099511628211;

/// A runtime value. `ReturnValue` and `Error` are control-flow carriers of
/// the tree evaluator and never escape a finished evaluation unwrapped.
#[derive(Debug, Clone)]
pub enum Object {
    Null,
    Int(i64),
    Bool(bool),
    Str(String),
    Array(Vec<Object>),
    Hash(HashMap<HashKey, HashPair>),
    Function(Function),
    CompiledFn(Rc<CompiledFn>),
    Closure(Closure),
    Builtin(Builtin),
    ReturnValue(Box<Object>),
    Error(String),
}

impl Object {
    /// The type tag used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Object::Null => "NULL",
            Object::Int(_) => "INT",
            Object::Bool(_) => "BOOL",
            Object::Str(_) => "STRING",
            Object::Array(_) => "ARRAY",
            Object::Hash(_) => "HASH",
            Object::Function(_) => "FN",
            Object::CompiledFn(_) => "COMPILED_FN",
            Object::Closure(_) => "CLOSURE",
            Object::Builtin(_) => "BUILTIN",
            Object::ReturnValue(_) => "RETURN_VALUE",
            Object::Error(_) => "ERROR",
        }
    }

    /// The user-facing printed form.
    pub fn inspect(&self) -> String {
        match self {
            Object::Null => "null".into(),
            Object::Int(value) => value.to_string(),
            Object::Bool(value) => value.to_string(),
            Object::Str(value) => value.clone(),
            Object::Array(elements) => {
                let elements = elements
                    .iter()
                    .map(|element| element.inspect())
                    .collect::<Vec<_>>();
                format!("[{}]", elements.join(", "))
            }
            Object::Hash(pairs) => {
                let pairs = pairs
                    .values()
                    .map(|pair| format!("{}: {}", pair.key.inspect(), pair.value.inspect()))
                    .collect::<Vec<_>>();
                format!("{{{}}}", pairs.join(", "))
            }
            Object::Function(function) => {
                let parameters = function
                    .parameters
                    .iter()
                    .map(|parameter| parameter.to_string())
                    .collect::<Vec<_>>();
                format!("fn({}) {{\n{}\n}}", parameters.join(", "), function.body)
            }
            Object::CompiledFn(function) => {
                format!("CompiledFunction[{:p}]", Rc::as_ptr(function))
            }
            Object::Closure(closure) => format!("Closure[{:p}]", Rc::as_ptr(&closure.func)),
            Object::Builtin(_) => "builtin function".into(),
            Object::ReturnValue(value) => value.inspect(),
            Object::Error(message) => format!("Error: {message}"),
        }
    }

    /// Only booleans, integers and strings can key a hash.
    pub fn hash_key(&self) -> Option<HashKey> {
        let value = match self {
            Object::Bool(value) => u64::from(*value),
            Object::Int(value) => *value as u64,
            Object::Str(value) => fnv1a_64(value.as_bytes()),
            _ => return None,
        };

        Some(HashKey {
            kind: self.kind(),
            value,
        })
    }
}

impl PartialEq for Object {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Object::Null, Object::Null) => true,
            (Object::Int(left), Object::Int(right)) => left == right,
            (Object::Bool(left), Object::Bool(right)) => left == right,
            (Object::Str(left), Object::Str(right)) => left == right,
            (Object::Array(left), Object::Array(right)) => left == right,
            (Object::Hash(left), Object::Hash(right)) => left == right,
            (Object::ReturnValue(left), Object::ReturnValue(right)) => left == right,
            (Object::Error(left), Object::Error(right)) => left == right,
            (Object::Builtin(left), Object::Builtin(right)) => left.name == right.name,
            (Object::CompiledFn(left), Object::CompiledFn(right)) => Rc::ptr_eq(left, right),
            (Object::Closure(left), Object::Closure(right)) => {
                Rc::ptr_eq(&left.func, &right.func) && left.free == right.free
            }
            (Object::Function(left), Object::Function(right)) => {
                Rc::ptr_eq(&left.env, &right.env)
                    && left.parameters == right.parameters
                    && left.body == right.body
            }
            _ => false,
        }
    }
}

/// Key under which a hashable object is stored, derived from its value so
/// that equal values collide and distinct values (almost surely) do not.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HashKey {
    pub kind: &'static str,
    pub value: u64,
}

/// The original key object is kept next to the value for `inspect`.
#[derive(Debug, Clone, PartialEq)]
pub struct HashPair {
    pub key: Object,
    pub value: Object,
}

/// A user-defined function of the tree evaluator, closing over the
/// environment it was created in.
#[derive(Clone)]
pub struct Function {
    pub parameters: Vec<Identifier>,
    pub body: BlockStatement,
    pub env: Rc<RefCell<Environment>>,
}

impl Debug for Function {
    // The captured environment may transitively contain this function, so
    // it is left out of the debug output.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("parameters", &self.parameters)
            .field("body", &self.body)
            .finish_non_exhaustive()
    }
}

/// The compiled form of a function literal: its instruction buffer plus the
/// stack space it needs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompiledFn {
    pub instructions: Instructions,
    pub num_locals: usize,
    pub num_params: usize,
}

/// A compiled function paired with the values of its free variables,
/// snapshotted when the closure is created.
#[derive(Debug, Clone)]
pub struct Closure {
    pub func: Rc<CompiledFn>,
    pub free: Vec<Object>,
}

fn fnv1a_64(bytes: &[u8]) -> u64 {
    let mut hash = FNV_OFFSET_BASIS;

    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    hash
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_string_hash_keys() {
        let hello1 = Object::Str("Hello World".into());
        let hello2 = Object::Str("Hello World".into());
        let diff1 = Object::Str("My name is johnny".into());
        let diff2 = Object::Str("My name is johnny".into());

        assert_eq!(hello1.hash_key(), hello2.hash_key());
        assert_eq!(diff1.hash_key(), diff2.hash_key());
        assert_ne!(hello1.hash_key(), diff1.hash_key());
    }

    #[test]
    fn test_boolean_hash_keys() {
        assert_eq!(
            Object::Bool(true).hash_key(),
            Object::Bool(true).hash_key()
        );
        assert_ne!(
            Object::Bool(true).hash_key(),
            Object::Bool(false).hash_key()
        );
    }

    #[test]
    fn test_integer_hash_keys() {
        assert_eq!(Object::Int(1).hash_key(), Object::Int(1).hash_key());
        assert_ne!(Object::Int(1).hash_key(), Object::Int(2).hash_key());
    }

    #[test]
    fn test_hash_keys_do_not_collide_across_types() {
        assert_ne!(Object::Int(1).hash_key(), Object::Bool(true).hash_key());
    }

    #[test]
    fn test_unhashable_objects() {
        assert_eq!(None, Object::Null.hash_key());
        assert_eq!(None, Object::Array(vec![]).hash_key());
    }

    #[test]
    fn test_inspect() {
        assert_eq!("null", Object::Null.inspect());
        assert_eq!("42", Object::Int(42).inspect());
        assert_eq!("true", Object::Bool(true).inspect());
        assert_eq!("monkey", Object::Str("monkey".into()).inspect());
        assert_eq!(
            "[1, 2]",
            Object::Array(vec![Object::Int(1), Object::Int(2)]).inspect()
        );
        assert_eq!(
            "Error: something went bananas",
            Object::Error("something went bananas".into()).inspect()
        );
    }
}
