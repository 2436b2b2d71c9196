use super::Object;

pub type BuiltinFn = fn(Vec<Object>) -> Object;

/// A native function exposed to Monkey programs.
#[derive(Debug, Clone, Copy)]
pub struct Builtin {
    pub name: &'static str,
    pub func: BuiltinFn,
}

/// The builtin catalogue. The position of an entry is the operand of
/// `OpGetBuiltin`, so the order is part of the bytecode contract.
pub const BUILTINS: &[Builtin] = &[
    Builtin {
        name: "len",
        func: builtin_len,
    },
    Builtin {
        name: "puts",
        func: builtin_puts,
    },
    Builtin {
        name: "first",
        func: builtin_first,
    },
    Builtin {
        name: "last",
        func: builtin_last,
    },
    Builtin {
        name: "rest",
        func: builtin_rest,
    },
    Builtin {
        name: "push",
        func: builtin_push,
    },
];

pub fn lookup_builtin(name: &str) -> Option<Builtin> {
    BUILTINS
        .iter()
        .copied()
        .find(|builtin| builtin.name == name)
}

fn wrong_argument_count(got: usize, want: usize) -> Object {
    Object::Error(format!("Wrong number of arguments. got={got}, want={want}"))
}

fn builtin_len(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_argument_count(args.len(), 1);
    }

    match &args[0] {
        Object::Str(value) => Object::Int(value.len() as i64),
        Object::Array(elements) => Object::Int(elements.len() as i64),
        other => Object::Error(format!(
            "Argument to `len` not supported, got {}",
            other.kind()
        )),
    }
}

fn builtin_puts(args: Vec<Object>) -> Object {
    for arg in &args {
        println!("{}", arg.inspect());
    }

    Object::Null
}

fn builtin_first(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_argument_count(args.len(), 1);
    }

    let Object::Array(elements) = &args[0] else {
        return Object::Error(format!(
            "Argument to `first` must be ARRAY, got {}",
            args[0].kind()
        ));
    };

    elements.first().cloned().unwrap_or(Object::Null)
}

fn builtin_last(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_argument_count(args.len(), 1);
    }

    let Object::Array(elements) = &args[0] else {
        return Object::Error(format!(
            "Argument to `last` must be ARRAY, got {}",
            args[0].kind()
        ));
    };

    elements.last().cloned().unwrap_or(Object::Null)
}

fn builtin_rest(args: Vec<Object>) -> Object {
    if args.len() != 1 {
        return wrong_argument_count(args.len(), 1);
    }

    let Object::Array(elements) = &args[0] else {
        return Object::Error(format!(
            "Argument to `rest` must be ARRAY, got {}",
            args[0].kind()
        ));
    };

    if elements.is_empty() {
        return Object::Null;
    }

    Object::Array(elements[1..].to_vec())
}

fn builtin_push(args: Vec<Object>) -> Object {
    if args.len() != 2 {
        return wrong_argument_count(args.len(), 2);
    }

    let Object::Array(elements) = &args[0] else {
        return Object::Error(format!(
            "Argument to `push` must be ARRAY, got {}",
            args[0].kind()
        ));
    };

    let mut elements = elements.clone();
    elements.push(args[1].clone());

    Object::Array(elements)
}
