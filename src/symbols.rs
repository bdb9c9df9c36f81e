use std::{fmt, rc::Rc};

use crate::{token::Span, util::intern::Interned};

/// Hands out the unique ids symbols are compared by. One per compilation.
#[derive(Debug, Default)]
pub struct SymbolIds {
    next: u32,
}

impl SymbolIds {
    pub fn next(&mut self) -> u32 {
        let id = self.next;
        self.next += 1;
        id
    }
}

/// A storage location: a declared variable, a parameter's backing variable,
/// a loop control variable, or some scope's implicit `IT`.
#[derive(Clone)]
pub struct Variable(Rc<VariableInner>);

struct VariableInner {
    id: u32,
    name: Interned<str>,
    /// Declaration site.
    span: Span,
}

impl Variable {
    pub fn new(ids: &mut SymbolIds, name: Interned<str>, span: Span) -> Variable {
        Variable(Rc::new(VariableInner {
            id: ids.next(),
            name,
            span,
        }))
    }

    pub fn new_it(ids: &mut SymbolIds, span: Span) -> Variable {
        Variable(Rc::new(VariableInner {
            id: ids.next(),
            name: well_known::IT,
            span,
        }))
    }

    pub fn id(&self) -> u32 {
        self.0.id
    }

    pub fn name(&self) -> Interned<str> {
        self.0.name
    }

    pub fn span(&self) -> Span {
        self.0.span
    }
}

impl PartialEq for Variable {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Variable {}

impl fmt::Debug for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Variable({:?}#{})", self.name(), self.id())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Parameter {
    pub name: Interned<str>,
    pub ordinal: usize,
    pub variable: Variable,
}

#[derive(Clone)]
pub struct Function(Rc<FunctionInner>);

struct FunctionInner {
    id: u32,
    name: Interned<str>,
    span: Span,
    params: Box<[Parameter]>,
}

impl Function {
    pub fn new(
        ids: &mut SymbolIds,
        name: Interned<str>,
        span: Span,
        params: impl IntoIterator<Item = (Interned<str>, Span)>,
    ) -> Function {
        let id = ids.next();
        let params = params
            .into_iter()
            .enumerate()
            .map(|(ordinal, (name, span))| Parameter {
                name,
                ordinal,
                variable: Variable::new(ids, name, span),
            })
            .collect();
        Function(Rc::new(FunctionInner {
            id,
            name,
            span,
            params,
        }))
    }

    pub fn id(&self) -> u32 {
        self.0.id
    }

    pub fn name(&self) -> Interned<str> {
        self.0.name
    }

    /// Definition site.
    pub fn span(&self) -> Span {
        self.0.span
    }

    pub fn params(&self) -> &[Parameter] {
        &self.0.params
    }

    pub fn arity(&self) -> usize {
        self.0.params.len()
    }
}

impl PartialEq for Function {
    fn eq(&self, other: &Self) -> bool {
        self.id() == other.id()
    }
}

impl Eq for Function {}

impl fmt::Debug for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Function({:?}#{})", self.name(), self.id())
    }
}

/// Names every compilation knows about before reading the source. They are
/// interned first, in this order, so their handles are constants.
pub mod well_known {
    use std::num::NonZeroU32;

    use crate::util::intern::Interned;

    pub const IT: Interned<str> = Interned::unchecked_new(NonZeroU32::MIN);

    pub const ALL: &[(Interned<str>, &str)] = &[(IT, "IT")];
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::intern::Interner;

    #[test]
    fn symbols_compare_by_id() {
        let mut i = Interner::with_capacity(4);
        let ids = &mut SymbolIds::default();
        let x = i.intern("x");
        let span = Span::new_of_length(0, 1);

        let a = Variable::new(ids, x, span);
        let b = Variable::new(ids, x, span);
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn parameters_get_backing_variables() {
        let mut i = Interner::with_capacity(4);
        let ids = &mut SymbolIds::default();
        let (f, n, m) = (i.intern("f"), i.intern("n"), i.intern("m"));
        let span = Span::new_of_length(0, 1);

        let function = Function::new(ids, f, span, [(n, span), (m, span)]);
        assert_eq!(function.id(), 0);
        assert_eq!(function.arity(), 2);
        let params = function.params();
        assert_eq!((params[0].name, params[0].ordinal), (n, 0));
        assert_eq!((params[1].name, params[1].ordinal), (m, 1));
        assert_eq!(params[0].variable.id(), 1);
        assert_eq!(params[1].variable.id(), 2);
    }
}
