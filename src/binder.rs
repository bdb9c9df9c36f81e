use runtime::Value;

use crate::{
    ast::{
        Block, Expr, ExprKind, Function, Ident, Program, Stmt, StmtKind, VariadicOperator,
    },
    bound::{
        BoundBlock, BoundCase, BoundElseIf, BoundExpr, BoundExprKind, BoundFunction,
        BoundLoop, BoundLoopCondition, BoundLoopUpdate, BoundProgram, BoundStmt, BoundStmtKind,
        BreakTarget,
    },
    symbols::{self, SymbolIds, Variable},
    token::{Literal, Segment, Span, Spanned, Text},
    util::intern::{Interned, Interner},
};

pub mod scope;

use scope::Scope;

pub type BindResult = Result<BoundProgram, (BoundProgram, Vec<Spanned<Error>>)>;

/// Resolves every name of `program` to a symbol, in two passes: the first
/// one registers all top-level functions (so they may be called before their
/// definition), the second binds every statement in order.
pub fn bind(program: Program, ident_interner: &Interner<str>) -> BindResult {
    let binder = Binder {
        ident_interner,
        ids: SymbolIds::default(),
        contexts: Vec::with_capacity(8),
        errors: Vec::with_capacity(8),
    };
    binder.bind(program)
}

struct Binder<'ident> {
    ident_interner: &'ident Interner<str>,
    ids: SymbolIds,
    /// Enclosing constructs a `GTFO` may leave, innermost last.
    contexts: Vec<BreakTarget>,
    errors: Vec<Spanned<Error>>,
}

impl Binder<'_> {
    fn bind(mut self, program: Program) -> BindResult {
        let it = Variable::new_it(&mut self.ids, Span::new_of_length(0, 0));
        let mut global = Scope::global(it.clone());

        let symbols = self.declare_functions(&mut global, &program.statements);
        let mut symbols = symbols.into_iter();

        let mut functions = Vec::with_capacity(symbols.len());
        let mut statements = Vec::with_capacity(program.statements.len());
        for stmt in program.statements {
            match stmt.kind {
                StmtKind::Function(function) => {
                    let symbol = symbols.next().flatten();
                    let bound = self.bind_function(&global, symbol, function, stmt.span);
                    functions.extend(bound);
                }
                kind => {
                    let stmt = Stmt {
                        kind,
                        span: stmt.span,
                    };
                    statements.push(self.bind_statement(&mut global, stmt));
                }
            }
        }
        log::trace!("bound {} functions", functions.len());

        let program = BoundProgram {
            functions,
            statements,
            it,
            span: program.span,
        };
        if self.errors.is_empty() {
            Ok(program)
        } else {
            Err((program, self.errors))
        }
    }

    /// First pass. Returns the symbol of each top-level function definition,
    /// in order, or `None` for the ones that clash with an earlier one.
    fn declare_functions(
        &mut self,
        global: &mut Scope<'_>,
        statements: &[Stmt],
    ) -> Vec<Option<symbols::Function>> {
        let mut declared = Vec::new();
        for stmt in statements {
            let StmtKind::Function(function) = &stmt.kind else {
                continue;
            };

            let mut params: Vec<Ident> = Vec::with_capacity(function.params.len());
            for &param in &function.params {
                if params.iter().any(|other| other.name == param.name) {
                    let error = Error::DuplicateParameter { name: param.name };
                    self.errors.push(param.span.wrap(error));
                    continue;
                }
                params.push(param);
            }

            let symbol = symbols::Function::new(
                &mut self.ids,
                function.name.name,
                function.name.span,
                params.iter().map(|param| (param.name, param.span)),
            );
            match global.declare_function(symbol.clone()) {
                Ok(()) => declared.push(Some(symbol)),
                Err(existing) => {
                    let error = Error::DuplicateFunction {
                        name: function.name.name,
                        other_definition_span: existing.span(),
                    };
                    self.errors.push(function.name.span.wrap(error));
                    declared.push(None);
                }
            }
        }
        declared
    }

    /// Binds a function body. Clashing definitions are still bound, so that
    /// their bodies get diagnosed, but are not part of the program.
    fn bind_function(
        &mut self,
        global: &Scope<'_>,
        symbol: Option<symbols::Function>,
        function: Function,
        span: Span,
    ) -> Option<BoundFunction> {
        let it = Variable::new_it(&mut self.ids, function.name.span);
        let mut scope = Scope::function(global, it.clone());
        if let Some(symbol) = &symbol {
            for param in symbol.params() {
                // Duplicates were reported by the first pass.
                _ = scope.declare(param.variable.clone());
            }
        }

        self.contexts.push(BreakTarget::Function);
        let body = self.bind_statements(&mut scope, function.body);
        self.contexts.pop();

        Some(BoundFunction {
            symbol: symbol?,
            it,
            body,
            span,
        })
    }

    fn bind_block(&mut self, parent: &Scope<'_>, block: Block) -> BoundBlock {
        let mut scope = Scope::block(parent);
        self.bind_statements(&mut scope, block)
    }

    fn bind_statements(&mut self, scope: &mut Scope<'_>, block: Block) -> BoundBlock {
        let statements = block
            .statements
            .into_iter()
            .map(|stmt| self.bind_statement(scope, stmt))
            .collect();
        BoundBlock {
            statements,
            span: block.span,
        }
    }

    fn bind_statement(&mut self, scope: &mut Scope<'_>, stmt: Stmt) -> BoundStmt {
        let span = stmt.span;
        let kind = match stmt.kind {
            StmtKind::Declaration { name, initializer } => {
                // The initializer can't see the variable it initializes.
                let initializer = initializer.map(|expr| self.bind_expr(scope, expr));
                let variable = Variable::new(&mut self.ids, name.name, name.span);
                if let Err(existing) = scope.declare(variable.clone()) {
                    let error = Error::Redeclaration {
                        name: name.name,
                        other_definition_span: existing.span(),
                    };
                    self.errors.push(name.span.wrap(error));
                }
                BoundStmtKind::Declaration {
                    variable,
                    initializer,
                }
            }
            StmtKind::Assignment { target, value } => {
                let value = self.bind_expr(scope, value);
                match self.resolve_variable(scope, target) {
                    Some(variable) => BoundStmtKind::Assignment { variable, value },
                    None => BoundStmtKind::Nop,
                }
            }
            StmtKind::CastInPlace { target, ty } => match self.resolve_variable(scope, target) {
                Some(variable) => BoundStmtKind::CastInPlace {
                    variable,
                    kind: ty.kind,
                },
                None => BoundStmtKind::Nop,
            },
            StmtKind::Visible { args, newline } => BoundStmtKind::Visible {
                args: self.bind_exprs(scope, args),
                newline,
            },
            StmtKind::Gimmeh { target } => match self.resolve_variable(scope, target) {
                Some(variable) => BoundStmtKind::Gimmeh { variable },
                None => BoundStmtKind::Nop,
            },
            StmtKind::Import { .. } | StmtKind::Dummy => BoundStmtKind::Nop,
            StmtKind::Expression(expr) => BoundStmtKind::Expression {
                it: scope.it().clone(),
                expr: self.bind_expr(scope, expr),
            },
            StmtKind::Conditional {
                then_block,
                else_ifs,
                else_block,
            } => BoundStmtKind::Conditional {
                it: scope.it().clone(),
                then_block: self.bind_block(scope, then_block),
                else_ifs: else_ifs
                    .into_iter()
                    .map(|else_if| BoundElseIf {
                        condition: self.bind_expr(scope, else_if.condition),
                        body: self.bind_block(scope, else_if.body),
                    })
                    .collect(),
                else_block: else_block.map(|block| self.bind_block(scope, block)),
            },
            StmtKind::Switch { cases, default } => {
                self.contexts.push(BreakTarget::Switch);
                let mut labels = Vec::with_capacity(cases.len());
                let cases = cases
                    .into_iter()
                    .map(|case| BoundCase {
                        label: self.bind_case_label(scope, case.label, &mut labels),
                        body: self.bind_block(scope, case.body),
                    })
                    .collect();
                let default = default.map(|block| self.bind_block(scope, block));
                self.contexts.pop();
                BoundStmtKind::Switch {
                    it: scope.it().clone(),
                    cases,
                    default,
                }
            }
            StmtKind::Loop(ast_loop) => {
                let mut loop_scope = Scope::block(scope);
                let update = ast_loop.update.map(|update| {
                    let variable = Variable::new(
                        &mut self.ids,
                        update.variable.name,
                        update.variable.span,
                    );
                    // A fresh scope, so this only ever shadows.
                    _ = loop_scope.declare(variable.clone());
                    BoundLoopUpdate {
                        op: update.op,
                        variable,
                    }
                });
                let condition = ast_loop.condition.map(|condition| BoundLoopCondition {
                    kind: condition.kind,
                    expr: self.bind_expr(&loop_scope, condition.expr),
                });
                self.contexts.push(BreakTarget::Loop);
                let body = self.bind_block(&loop_scope, ast_loop.body);
                self.contexts.pop();
                BoundStmtKind::Loop(BoundLoop {
                    update,
                    condition,
                    body,
                })
            }
            StmtKind::Function(function) => {
                let error = Error::NestedFunction {
                    name: function.name.name,
                };
                self.errors.push(function.name.span.wrap(error));
                BoundStmtKind::Nop
            }
            StmtKind::Break => match self.contexts.last() {
                Some(&target) => BoundStmtKind::Break(target),
                None => {
                    self.errors.push(span.wrap(Error::MisplacedBreak));
                    BoundStmtKind::Nop
                }
            },
            StmtKind::Return(expr) => {
                let expr = self.bind_expr(scope, expr);
                if self.contexts.contains(&BreakTarget::Function) {
                    BoundStmtKind::Return(expr)
                } else {
                    self.errors.push(span.wrap(Error::MisplacedReturn));
                    BoundStmtKind::Nop
                }
            }
        };
        BoundStmt { kind, span }
    }

    /// Binds an `OMG` label, which must be a literal no earlier case of the
    /// same switch used. `seen` holds the earlier labels.
    fn bind_case_label(
        &mut self,
        scope: &Scope<'_>,
        label: Expr,
        seen: &mut Vec<(Value, Span)>,
    ) -> BoundExpr {
        let span = label.span;
        match &label.kind {
            ExprKind::Literal(literal) => match constant(literal) {
                Some(value) => {
                    let first = seen
                        .iter()
                        .find(|(other, _)| *other == value)
                        .map(|&(_, other_span)| other_span);
                    match first {
                        Some(other_span) => {
                            let error = Error::DuplicateCaseLabel { other_span };
                            self.errors.push(span.wrap(error));
                        }
                        None => seen.push((value, span)),
                    }
                }
                None => self.errors.push(span.wrap(Error::NonLiteralCaseLabel)),
            },
            // Already reported by the parser.
            ExprKind::Dummy => {}
            _ => self.errors.push(span.wrap(Error::NonLiteralCaseLabel)),
        }
        self.bind_expr(scope, label)
    }

    fn bind_exprs(&mut self, scope: &Scope<'_>, exprs: Vec<Expr>) -> Vec<BoundExpr> {
        exprs
            .into_iter()
            .map(|expr| self.bind_expr(scope, expr))
            .collect()
    }

    fn bind_expr(&mut self, scope: &Scope<'_>, expr: Expr) -> BoundExpr {
        let span = expr.span;
        let kind = match expr.kind {
            ExprKind::Literal(Literal::Text(text)) => return self.bind_text(scope, &text, span),
            ExprKind::Literal(literal) => match constant(&literal) {
                Some(value) => BoundExprKind::Literal(value),
                None => BoundExprKind::Error,
            },
            ExprKind::Variable(ident) => match self.resolve_variable(scope, ident) {
                Some(variable) => BoundExprKind::Variable(variable),
                None => BoundExprKind::Error,
            },
            ExprKind::Binary { op, lhs, rhs } => BoundExprKind::Binary {
                op,
                lhs: Box::new(self.bind_expr(scope, *lhs)),
                rhs: Box::new(self.bind_expr(scope, *rhs)),
            },
            ExprKind::Not(expr) => BoundExprKind::Not(Box::new(self.bind_expr(scope, *expr))),
            ExprKind::Variadic { op, args } => BoundExprKind::Variadic {
                op,
                args: self.bind_exprs(scope, args),
            },
            ExprKind::Cast { expr, ty } => BoundExprKind::Cast {
                expr: Box::new(self.bind_expr(scope, *expr)),
                kind: ty.kind,
            },
            ExprKind::Call { function, args } => {
                let args = self.bind_exprs(scope, args);
                match scope.lookup_function(function.name) {
                    Some(symbol) if symbol.arity() == args.len() => BoundExprKind::Call {
                        function: symbol.clone(),
                        args,
                    },
                    Some(symbol) => {
                        let error = Error::ArgumentCount {
                            function: function.name,
                            expected: symbol.arity(),
                            actual: args.len(),
                        };
                        self.errors.push(span.wrap(error));
                        BoundExprKind::Error
                    }
                    None => {
                        let error = Error::UndefinedFunction(function.name);
                        self.errors.push(function.span.wrap(error));
                        BoundExprKind::Error
                    }
                }
            }
            ExprKind::Dummy => BoundExprKind::Error,
        };
        BoundExpr { kind, span }
    }

    /// Expands `"a :{x} b"` into `SMOOSH "a " AN x AN " b" MKAY`. A marker
    /// naming no visible variable stays in the text as written.
    fn bind_text(&mut self, scope: &Scope<'_>, text: &Text, span: Span) -> BoundExpr {
        if let Some(plain) = text.as_plain() {
            return BoundExpr {
                kind: BoundExprKind::Literal(Value::yarn(plain)),
                span,
            };
        }
        let args = text
            .segments
            .iter()
            .map(|segment| {
                let kind = match segment {
                    Segment::Raw(raw) => BoundExprKind::Literal(Value::yarn(&**raw)),
                    Segment::Interpolation { name, raw } => match self
                        .ident_interner
                        .lookup(name)
                        .and_then(|name| scope.lookup(name))
                    {
                        Some(variable) => BoundExprKind::Variable(variable.clone()),
                        None => BoundExprKind::Literal(Value::yarn(&**raw)),
                    },
                };
                BoundExpr { kind, span }
            })
            .collect();
        BoundExpr {
            kind: BoundExprKind::Variadic {
                op: VariadicOperator::Smoosh,
                args,
            },
            span,
        }
    }

    fn resolve_variable(&mut self, scope: &Scope<'_>, ident: Ident) -> Option<Variable> {
        let variable = scope.lookup(ident.name).cloned();
        if variable.is_none() {
            let error = Error::UndeclaredVariable(ident.name);
            self.errors.push(ident.span.wrap(error));
        }
        variable
    }
}

/// The value of a literal, if it is a constant (interpolated text isn't).
fn constant(literal: &Literal) -> Option<Value> {
    match literal {
        Literal::Integer(n) => Some(Value::Numbr(*n)),
        Literal::Float(n) => Some(Value::Numbar(*n)),
        Literal::Bool(b) => Some(Value::Troof(*b)),
        Literal::Text(text) => text.as_plain().map(Value::yarn),
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    DuplicateFunction {
        name: Interned<str>,
        other_definition_span: Span,
    },
    DuplicateParameter {
        name: Interned<str>,
    },
    Redeclaration {
        name: Interned<str>,
        other_definition_span: Span,
    },
    UndeclaredVariable(Interned<str>),
    UndefinedFunction(Interned<str>),
    ArgumentCount {
        function: Interned<str>,
        expected: usize,
        actual: usize,
    },
    /// `GTFO` outside of any loop, switch or function.
    MisplacedBreak,
    /// `FOUND YR` outside of a function.
    MisplacedReturn,
    NonLiteralCaseLabel,
    DuplicateCaseLabel {
        other_span: Span,
    },
    /// `HOW IZ I` anywhere but at the top level.
    NestedFunction {
        name: Interned<str>,
    },
}

#[cfg(test)]
mod tests;
