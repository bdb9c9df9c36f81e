use std::collections::HashMap;

use crate::{
    symbols::{well_known, Function, Variable},
    util::intern::Interned,
};

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScopeKind {
    Global,
    Function,
    Block,
}

/// A lexical scope. Each one owns its own symbols and borrows its parent, so
/// the chain lives exactly as long as the recursive bind that builds it.
pub struct Scope<'parent> {
    kind: ScopeKind,
    parent: Option<&'parent Scope<'parent>>,
    variables: HashMap<Interned<str>, Variable>,
    functions: HashMap<Interned<str>, Function>,
    it: Variable,
}

impl<'parent> Scope<'parent> {
    pub fn global(it: Variable) -> Scope<'static> {
        Scope {
            kind: ScopeKind::Global,
            parent: None,
            variables: HashMap::new(),
            functions: HashMap::new(),
            it,
        }
    }

    /// A function body's scope. Functions get their own `IT`.
    pub fn function(parent: &'parent Scope<'parent>, it: Variable) -> Scope<'parent> {
        Scope {
            kind: ScopeKind::Function,
            parent: Some(parent),
            variables: HashMap::new(),
            functions: HashMap::new(),
            it,
        }
    }

    /// A nested block's scope, sharing the enclosing `IT`.
    pub fn block(parent: &'parent Scope<'parent>) -> Scope<'parent> {
        Scope {
            kind: ScopeKind::Block,
            parent: Some(parent),
            variables: HashMap::new(),
            functions: HashMap::new(),
            it: parent.it.clone(),
        }
    }

    pub fn it(&self) -> &Variable {
        &self.it
    }

    /// Declares `variable` in this scope. If the name is already taken here,
    /// returns the existing declaration and leaves the scope unchanged.
    /// Declarations in outer scopes are shadowed instead.
    pub fn declare(&mut self, variable: Variable) -> Result<(), Variable> {
        let name = variable.name();
        if name == well_known::IT && self.is_boundary() {
            return Err(self.it.clone());
        }
        if let Some(existing) = self.variables.get(&name) {
            return Err(existing.clone());
        }
        self.variables.insert(name, variable);
        Ok(())
    }

    pub fn declare_function(&mut self, function: Function) -> Result<(), Function> {
        if let Some(existing) = self.functions.get(&function.name()) {
            return Err(existing.clone());
        }
        self.functions.insert(function.name(), function);
        Ok(())
    }

    /// Resolves a variable, looking no further than the nearest function (or
    /// global) scope.
    pub fn lookup(&self, name: Interned<str>) -> Option<&Variable> {
        let mut curr = self;
        loop {
            if let Some(variable) = curr.variables.get(&name) {
                return Some(variable);
            }
            if curr.is_boundary() {
                return (name == well_known::IT).then_some(&curr.it);
            }
            curr = curr.parent?;
        }
    }

    /// Resolves a function through the whole scope chain.
    pub fn lookup_function(&self, name: Interned<str>) -> Option<&Function> {
        let mut curr = self;
        loop {
            if let Some(function) = curr.functions.get(&name) {
                return Some(function);
            }
            curr = curr.parent?;
        }
    }

    fn is_boundary(&self) -> bool {
        matches!(self.kind, ScopeKind::Global | ScopeKind::Function)
    }
}
