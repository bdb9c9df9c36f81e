//! The bound tree: the syntax tree with every name resolved to a symbol and
//! every `GTFO` resolved to the construct it leaves.

use runtime::{Kind, Value};

use crate::{
    ast::{BinaryOperator, ConditionKind, StepOperator, VariadicOperator},
    symbols::{Function, Variable},
    token::Span,
};

#[derive(Debug, PartialEq)]
pub struct BoundProgram {
    pub functions: Vec<BoundFunction>,
    pub statements: Vec<BoundStmt>,
    /// The global scope's `IT`.
    pub it: Variable,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct BoundFunction {
    pub symbol: Function,
    /// The function's own `IT`, which it returns when its body falls off the
    /// end.
    pub it: Variable,
    pub body: BoundBlock,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct BoundBlock {
    pub statements: Vec<BoundStmt>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct BoundStmt {
    pub kind: BoundStmtKind,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub enum BoundStmtKind {
    Declaration {
        variable: Variable,
        initializer: Option<BoundExpr>,
    },
    Assignment {
        variable: Variable,
        value: BoundExpr,
    },
    CastInPlace {
        variable: Variable,
        kind: Kind,
    },
    Visible {
        args: Vec<BoundExpr>,
        newline: bool,
    },
    Gimmeh {
        variable: Variable,
    },
    Expression {
        it: Variable,
        expr: BoundExpr,
    },
    Conditional {
        it: Variable,
        then_block: BoundBlock,
        else_ifs: Vec<BoundElseIf>,
        else_block: Option<BoundBlock>,
    },
    Switch {
        it: Variable,
        cases: Vec<BoundCase>,
        default: Option<BoundBlock>,
    },
    Loop(BoundLoop),
    Break(BreakTarget),
    Return(BoundExpr),
    /// Statements with nothing to execute (`CAN HAS`, or ones that failed to
    /// bind).
    Nop,
}

#[derive(Debug, PartialEq)]
pub struct BoundElseIf {
    pub condition: BoundExpr,
    pub body: BoundBlock,
}

#[derive(Debug, PartialEq)]
pub struct BoundCase {
    pub label: BoundExpr,
    pub body: BoundBlock,
}

#[derive(Debug, PartialEq)]
pub struct BoundLoop {
    pub update: Option<BoundLoopUpdate>,
    pub condition: Option<BoundLoopCondition>,
    pub body: BoundBlock,
}

#[derive(Debug, PartialEq)]
pub struct BoundLoopUpdate {
    pub op: StepOperator,
    /// Declared fresh in the loop's own scope.
    pub variable: Variable,
}

#[derive(Debug, PartialEq)]
pub struct BoundLoopCondition {
    pub kind: ConditionKind,
    pub expr: BoundExpr,
}

/// The construct a `GTFO` leaves: the innermost one enclosing it.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BreakTarget {
    Loop,
    Switch,
    /// Returns NOOB from the enclosing function.
    Function,
}

#[derive(Debug, PartialEq)]
pub struct BoundExpr {
    pub kind: BoundExprKind,
    pub span: Span,
}

impl BoundExpr {
    pub fn error(span: Span) -> BoundExpr {
        BoundExpr {
            kind: BoundExprKind::Error,
            span,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum BoundExprKind {
    Literal(Value),
    Variable(Variable),
    Binary {
        op: BinaryOperator,
        lhs: Box<BoundExpr>,
        rhs: Box<BoundExpr>,
    },
    Not(Box<BoundExpr>),
    /// Interpolated text literals are expanded into a `Smoosh` of their
    /// pieces.
    Variadic {
        op: VariadicOperator,
        args: Vec<BoundExpr>,
    },
    Cast {
        expr: Box<BoundExpr>,
        kind: Kind,
    },
    Call {
        function: Function,
        args: Vec<BoundExpr>,
    },
    /// An expression which failed to bind. Never reaches code generation.
    Error,
}
