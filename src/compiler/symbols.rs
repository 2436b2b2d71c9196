use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolScope {
    Global,
    Local,
    Builtin,
    Free,
    Function,
}

/// A resolved name: where it lives and at which slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Symbol {
    pub name: String,
    pub scope: SymbolScope,
    pub index: usize,
}

/// Compile-time name resolution. Tables nest per function scope; resolving
/// a name bound in an enclosing function turns it into a free symbol of the
/// current scope, which is how closures learn what to capture.
#[derive(Debug, Default)]
pub struct SymbolTable {
    outer: Option<Box<SymbolTable>>,
    pub free_symbols: Vec<Symbol>,
    store: HashMap<String, Symbol>,
    num_definitions: usize,
}

impl SymbolTable {
    pub fn new() -> SymbolTable {
        SymbolTable::default()
    }

    pub fn new_enclosed(outer: SymbolTable) -> SymbolTable {
        SymbolTable {
            outer: Some(Box::new(outer)),
            ..SymbolTable::default()
        }
    }

    /// Drop this scope, handing back the enclosing table.
    pub fn into_outer(self) -> Option<SymbolTable> {
        self.outer.map(|outer| *outer)
    }

    pub fn is_global(&self) -> bool {
        self.outer.is_none()
    }

    pub fn num_definitions(&self) -> usize {
        self.num_definitions
    }

    /// Bind a name in the current scope. Rebinding an existing name is
    /// allowed and consumes a fresh index; the old slot becomes unreachable.
    pub fn define(&mut self, name: &str) -> Symbol {
        let scope = if self.is_global() {
            SymbolScope::Global
        } else {
            SymbolScope::Local
        };

        let symbol = Symbol {
            name: name.into(),
            scope,
            index: self.num_definitions,
        };

        self.store.insert(name.into(), symbol.clone());
        self.num_definitions += 1;

        symbol
    }

    pub fn define_builtin(&mut self, index: usize, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.into(),
            scope: SymbolScope::Builtin,
            index,
        };

        self.store.insert(name.into(), symbol.clone());

        symbol
    }

    /// Bind the name of the function currently being compiled so its body
    /// can refer to itself.
    pub fn define_function_name(&mut self, name: &str) -> Symbol {
        let symbol = Symbol {
            name: name.into(),
            scope: SymbolScope::Function,
            index: 0,
        };

        self.store.insert(name.into(), symbol.clone());

        symbol
    }

    pub fn resolve(&mut self, name: &str) -> Option<Symbol> {
        if let Some(symbol) = self.store.get(name) {
            return Some(symbol.clone());
        }

        let resolved = self.outer.as_mut()?.resolve(name)?;

        match resolved.scope {
            SymbolScope::Global | SymbolScope::Builtin => Some(resolved),
            _ => Some(self.define_free(resolved)),
        }
    }

    fn define_free(&mut self, original: Symbol) -> Symbol {
        self.free_symbols.push(original.clone());

        let symbol = Symbol {
            name: original.name.clone(),
            scope: SymbolScope::Free,
            index: self.free_symbols.len() - 1,
        };

        self.store.insert(original.name, symbol.clone());

        symbol
    }
}
