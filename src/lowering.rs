//! Rewrites a bound program into an equivalent one before code generation.
//!
//! Every node currently folds to itself. Desugarings go here, each one as an
//! override of the matching `fold_*` method.

use crate::bound::*;

pub fn lower(program: BoundProgram) -> BoundProgram {
    Identity.fold_program(program)
}

struct Identity;

impl Fold for Identity {}

/// A structural fold over the bound tree. The default methods rebuild each
/// node from its folded children.
pub trait Fold {
    fn fold_program(&mut self, program: BoundProgram) -> BoundProgram {
        BoundProgram {
            functions: program
                .functions
                .into_iter()
                .map(|function| self.fold_function(function))
                .collect(),
            statements: self.fold_stmts(program.statements),
            it: program.it,
            span: program.span,
        }
    }

    fn fold_function(&mut self, function: BoundFunction) -> BoundFunction {
        BoundFunction {
            body: self.fold_block(function.body),
            ..function
        }
    }

    fn fold_block(&mut self, block: BoundBlock) -> BoundBlock {
        BoundBlock {
            statements: self.fold_stmts(block.statements),
            span: block.span,
        }
    }

    fn fold_stmts(&mut self, stmts: Vec<BoundStmt>) -> Vec<BoundStmt> {
        stmts.into_iter().map(|stmt| self.fold_stmt(stmt)).collect()
    }

    fn fold_stmt(&mut self, stmt: BoundStmt) -> BoundStmt {
        let kind = match stmt.kind {
            BoundStmtKind::Declaration {
                variable,
                initializer,
            } => BoundStmtKind::Declaration {
                variable,
                initializer: initializer.map(|expr| self.fold_expr(expr)),
            },
            BoundStmtKind::Assignment { variable, value } => BoundStmtKind::Assignment {
                variable,
                value: self.fold_expr(value),
            },
            BoundStmtKind::Visible { args, newline } => BoundStmtKind::Visible {
                args: self.fold_exprs(args),
                newline,
            },
            BoundStmtKind::Expression { it, expr } => BoundStmtKind::Expression {
                it,
                expr: self.fold_expr(expr),
            },
            BoundStmtKind::Conditional {
                it,
                then_block,
                else_ifs,
                else_block,
            } => BoundStmtKind::Conditional {
                it,
                then_block: self.fold_block(then_block),
                else_ifs: else_ifs
                    .into_iter()
                    .map(|else_if| BoundElseIf {
                        condition: self.fold_expr(else_if.condition),
                        body: self.fold_block(else_if.body),
                    })
                    .collect(),
                else_block: else_block.map(|block| self.fold_block(block)),
            },
            BoundStmtKind::Switch { it, cases, default } => BoundStmtKind::Switch {
                it,
                cases: cases
                    .into_iter()
                    .map(|case| BoundCase {
                        label: self.fold_expr(case.label),
                        body: self.fold_block(case.body),
                    })
                    .collect(),
                default: default.map(|block| self.fold_block(block)),
            },
            BoundStmtKind::Loop(BoundLoop {
                update,
                condition,
                body,
            }) => BoundStmtKind::Loop(BoundLoop {
                update,
                condition: condition.map(|condition| BoundLoopCondition {
                    kind: condition.kind,
                    expr: self.fold_expr(condition.expr),
                }),
                body: self.fold_block(body),
            }),
            BoundStmtKind::Return(expr) => BoundStmtKind::Return(self.fold_expr(expr)),
            kind @ (BoundStmtKind::CastInPlace { .. }
            | BoundStmtKind::Gimmeh { .. }
            | BoundStmtKind::Break(_)
            | BoundStmtKind::Nop) => kind,
        };
        BoundStmt {
            kind,
            span: stmt.span,
        }
    }

    fn fold_exprs(&mut self, exprs: Vec<BoundExpr>) -> Vec<BoundExpr> {
        exprs.into_iter().map(|expr| self.fold_expr(expr)).collect()
    }

    fn fold_expr(&mut self, expr: BoundExpr) -> BoundExpr {
        let kind = match expr.kind {
            BoundExprKind::Binary { op, lhs, rhs } => BoundExprKind::Binary {
                op,
                lhs: Box::new(self.fold_expr(*lhs)),
                rhs: Box::new(self.fold_expr(*rhs)),
            },
            BoundExprKind::Not(inner) => BoundExprKind::Not(Box::new(self.fold_expr(*inner))),
            BoundExprKind::Variadic { op, args } => BoundExprKind::Variadic {
                op,
                args: self.fold_exprs(args),
            },
            BoundExprKind::Cast { expr: inner, kind } => BoundExprKind::Cast {
                expr: Box::new(self.fold_expr(*inner)),
                kind,
            },
            BoundExprKind::Call { function, args } => BoundExprKind::Call {
                function,
                args: self.fold_exprs(args),
            },
            kind @ (BoundExprKind::Literal(_)
            | BoundExprKind::Variable(_)
            | BoundExprKind::Error) => kind,
        };
        BoundExpr {
            kind,
            span: expr.span,
        }
    }
}
