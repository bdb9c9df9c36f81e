// program   ::= HAI [version] BREAK block KTHXBYE BREAK* EOF
// statement ::= I HAS A ID [ITZ expr]
//             | ID R expr
//             | ID IS NOW A type
//             | VISIBLE expr ([AN] expr)* ['!']
//             | GIMMEH ID
//             | CAN HAS ID ['?']
//             | O RLY? BREAK YA RLY BREAK block
//                 (MEBBE expr BREAK block)* [NO WAI BREAK block] OIC
//             | WTF? BREAK (OMG literal BREAK block)+ [OMGWTF BREAK block] OIC
//             | IM IN YR ID [(UPPIN | NERFIN) YR ID] [(TIL | WILE) expr]
//                 BREAK block IM OUTTA YR ID
//             | HOW IZ I ID [YR ID (AN YR ID)*] BREAK block IF U SAY SO
//             | GTFO
//             | FOUND YR expr
//             | expr
// expr      ::= literal
//             | ID
//             | binop OF expr [AN] expr
//             | (BOTH SAEM | DIFFRINT) expr [AN] expr
//             | NOT expr
//             | (ALL OF | ANY OF | SMOOSH) expr ([AN] expr)* [MKAY]
//             | MAEK expr [A] type
//             | I IZ ID [YR expr ([AN] [YR] expr)*] [MKAY]
// binop     ::= SUM | DIFF | PRODUKT | QUOSHUNT | MOD | BIGGR | SMALLR
//             | BOTH | EITHER | WON
// type      ::= NOOB | TROOF | NUMBR | NUMBAR | YARN
//
// BREAK is a newline or a comma.

use runtime::Kind;

use crate::{
    token::{Literal, Span},
    util::intern::Interned,
};

#[derive(Debug, PartialEq)]
pub struct Program {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

impl Program {
    pub fn dummy() -> Program {
        Program {
            statements: Vec::new(),
            span: Span::new_of_length(0, 0),
        }
    }
}

#[derive(Debug, PartialEq)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, PartialEq)]
pub struct Stmt {
    pub kind: StmtKind,
    pub span: Span,
}

impl Stmt {
    pub fn dummy(span: Span) -> Stmt {
        Stmt {
            kind: StmtKind::Dummy,
            span,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum StmtKind {
    Declaration {
        name: Ident,
        initializer: Option<Expr>,
    },
    Assignment {
        target: Ident,
        value: Expr,
    },
    /// `ID IS NOW A type`
    CastInPlace {
        target: Ident,
        ty: TypeName,
    },
    Visible {
        args: Vec<Expr>,
        /// False when the statement ends in `!`.
        newline: bool,
    },
    Gimmeh {
        target: Ident,
    },
    /// `CAN HAS library?`. Accepted and ignored.
    Import {
        library: Ident,
    },
    /// A bare expression, whose value is stored into IT.
    Expression(Expr),
    /// `O RLY?`, which tests IT.
    Conditional {
        then_block: Block,
        else_ifs: Vec<ElseIf>,
        else_block: Option<Block>,
    },
    /// `WTF?`, which compares IT against each case label.
    Switch {
        /// Non empty list of cases.
        cases: Vec<SwitchCase>,
        default: Option<Block>,
    },
    Loop(Loop),
    Function(Function),
    /// `GTFO`
    Break,
    /// `FOUND YR expr`
    Return(Expr),
    Dummy,
}

#[derive(Debug, PartialEq)]
pub struct ElseIf {
    pub condition: Expr,
    pub body: Block,
}

#[derive(Debug, PartialEq)]
pub struct SwitchCase {
    pub label: Expr,
    pub body: Block,
}

#[derive(Debug, PartialEq)]
pub struct Loop {
    pub label: Ident,
    pub update: Option<LoopUpdate>,
    pub condition: Option<LoopCondition>,
    pub body: Block,
}

#[derive(Debug, PartialEq)]
pub struct LoopUpdate {
    pub op: StepOperator,
    pub variable: Ident,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum StepOperator {
    /// `UPPIN`, adds one.
    Uppin,
    /// `NERFIN`, subtracts one.
    Nerfin,
}

#[derive(Debug, PartialEq)]
pub struct LoopCondition {
    pub kind: ConditionKind,
    pub expr: Expr,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ConditionKind {
    /// Loop until the expression is truthy.
    Til,
    /// Loop while the expression is truthy.
    Wile,
}

#[derive(Debug, PartialEq)]
pub struct Function {
    pub name: Ident,
    /// List of parameters, in declaration order.
    pub params: Vec<Ident>,
    pub body: Block,
}

#[derive(Debug, PartialEq)]
pub struct Expr {
    pub kind: ExprKind,
    pub span: Span,
}

impl Expr {
    pub fn dummy(span: Span) -> Expr {
        Expr {
            kind: ExprKind::Dummy,
            span,
        }
    }
}

#[derive(Debug, PartialEq)]
pub enum ExprKind {
    Literal(Literal),
    Variable(Ident),
    Binary {
        op: BinaryOperator,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Not(Box<Expr>),
    Variadic {
        op: VariadicOperator,
        /// Non empty list of operands.
        args: Vec<Expr>,
    },
    /// `MAEK expr A type`
    Cast {
        expr: Box<Expr>,
        ty: TypeName,
    },
    Call {
        function: Ident,
        args: Vec<Expr>,
    },
    Dummy,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BinaryOperator {
    Sum,
    Diff,
    Produkt,
    Quoshunt,
    Mod,
    Biggr,
    Smallr,
    BothOf,
    EitherOf,
    WonOf,
    BothSaem,
    Diffrint,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum VariadicOperator {
    /// `ALL OF`
    All,
    /// `ANY OF`
    Any,
    Smoosh,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct TypeName {
    pub kind: Kind,
    pub span: Span,
}

#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ident {
    pub name: Interned<str>,
    pub span: Span,
}

impl From<Ident> for Interned<str> {
    fn from(value: Ident) -> Self {
        value.name
    }
}

impl From<&Ident> for Interned<str> {
    fn from(value: &Ident) -> Self {
        value.name
    }
}
