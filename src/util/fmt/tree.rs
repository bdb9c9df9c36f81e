use std::io::Write;

use runtime::Value;

use crate::{
    ast::*,
    bound::*,
    symbols::Variable,
    token::{Literal, Segment},
    util::intern::Interner,
};

const INDENT_WIDTH: usize = 2;

pub fn print_program_string(idents: &Interner<str>, program: &Program) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_expr_string(idents: &Interner<str>, expr: &Expr) -> String {
    let mut buf = Vec::with_capacity(512);
    print_expr(&mut buf, idents, 0, expr).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_bound_program_string(idents: &Interner<str>, program: &BoundProgram) -> String {
    let mut buf = Vec::with_capacity(1024);
    print_bound_program(&mut buf, idents, program).unwrap();
    String::from_utf8(buf).unwrap()
}

pub fn print_program(
    w: &mut impl Write,
    idents: &Interner<str>,
    program: &Program,
) -> std::io::Result<()> {
    for stmt in &program.statements {
        print_stmt(w, idents, 0, stmt)?;
    }
    Ok(())
}

fn print_block(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    block: &Block,
) -> std::io::Result<()> {
    for stmt in &block.statements {
        print_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

pub fn print_stmt(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    stmt: &Stmt,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = stmt.span;
    match &stmt.kind {
        StmtKind::Declaration { name, initializer } => {
            writeln!(w, "declare {} ({span})", idents.get(name))?;
            if let Some(initializer) = initializer {
                print_expr(w, idents, i + 1, initializer)?;
            }
        }
        StmtKind::Assignment { target, value } => {
            writeln!(w, "assign {} ({span})", idents.get(target))?;
            print_expr(w, idents, i + 1, value)?;
        }
        StmtKind::CastInPlace { target, ty } => {
            writeln!(w, "cast {} to {} ({span})", idents.get(target), ty.kind)?;
        }
        StmtKind::Visible { args, newline } => {
            let suffix = if *newline { "" } else { " no newline" };
            writeln!(w, "visible{suffix} ({span})")?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
        StmtKind::Gimmeh { target } => {
            writeln!(w, "gimmeh {} ({span})", idents.get(target))?;
        }
        StmtKind::Import { library } => {
            writeln!(w, "import {} ({span})", idents.get(library))?;
        }
        StmtKind::Expression(expr) => {
            writeln!(w, "expression ({span})")?;
            print_expr(w, idents, i + 1, expr)?;
        }
        StmtKind::Conditional {
            then_block,
            else_ifs,
            else_block,
        } => {
            writeln!(w, "conditional ({span})")?;
            header(w, i + 1, "then")?;
            print_block(w, idents, i + 2, then_block)?;
            for else_if in else_ifs {
                header(w, i + 1, "else if")?;
                print_expr(w, idents, i + 2, &else_if.condition)?;
                print_block(w, idents, i + 2, &else_if.body)?;
            }
            if let Some(else_block) = else_block {
                header(w, i + 1, "else")?;
                print_block(w, idents, i + 2, else_block)?;
            }
        }
        StmtKind::Switch { cases, default } => {
            writeln!(w, "switch ({span})")?;
            for case in cases {
                header(w, i + 1, "case")?;
                print_expr(w, idents, i + 2, &case.label)?;
                print_block(w, idents, i + 2, &case.body)?;
            }
            if let Some(default) = default {
                header(w, i + 1, "default")?;
                print_block(w, idents, i + 2, default)?;
            }
        }
        StmtKind::Loop(Loop {
            label,
            update,
            condition,
            body,
        }) => {
            write!(w, "loop {}", idents.get(label))?;
            if let Some(update) = update {
                write!(w, " {} {}", step(update.op), idents.get(update.variable))?;
            }
            if let Some(condition) = condition {
                write!(w, " {}", condition_kind(condition.kind))?;
            }
            writeln!(w, " ({span})")?;
            if let Some(condition) = condition {
                header(w, i + 1, "condition")?;
                print_expr(w, idents, i + 2, &condition.expr)?;
            }
            header(w, i + 1, "body")?;
            print_block(w, idents, i + 2, body)?;
        }
        StmtKind::Function(Function { name, params, body }) => {
            write!(w, "function {}(", idents.get(name))?;
            for (idx, param) in params.iter().enumerate() {
                if idx > 0 {
                    write!(w, ", ")?;
                }
                write!(w, "{}", idents.get(param))?;
            }
            writeln!(w, ") ({span})")?;
            print_block(w, idents, i + 1, body)?;
        }
        StmtKind::Break => writeln!(w, "break ({span})")?,
        StmtKind::Return(expr) => {
            writeln!(w, "return ({span})")?;
            print_expr(w, idents, i + 1, expr)?;
        }
        StmtKind::Dummy => writeln!(w, "dummy ({span})")?,
    }
    Ok(())
}

pub fn print_expr(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    expr: &Expr,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        ExprKind::Literal(Literal::Integer(val)) => writeln!(w, "integer {val} ({span})")?,
        ExprKind::Literal(Literal::Float(val)) => writeln!(w, "float {val} ({span})")?,
        ExprKind::Literal(Literal::Bool(val)) => writeln!(w, "bool {val} ({span})")?,
        ExprKind::Literal(Literal::Text(text)) => {
            if let Some(plain) = text.as_plain() {
                writeln!(w, "text {plain:?} ({span})")?;
            } else {
                writeln!(w, "text ({span})")?;
                for segment in &text.segments {
                    sp(w, i + 1)?;
                    match segment {
                        Segment::Raw(raw) => writeln!(w, "raw {raw:?}")?,
                        Segment::Interpolation { name, raw } => {
                            writeln!(w, "interpolation {name} {raw:?}")?;
                        }
                    }
                }
            }
        }
        ExprKind::Variable(ident) => writeln!(w, "ident {} ({span})", idents.get(ident))?,
        ExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span})")?;
            print_expr(w, idents, i + 1, lhs)?;
            print_expr(w, idents, i + 1, rhs)?;
        }
        ExprKind::Not(inner) => {
            writeln!(w, "not ({span})")?;
            print_expr(w, idents, i + 1, inner)?;
        }
        ExprKind::Variadic { op, args } => {
            writeln!(w, "variadic {op:?} ({span})")?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
        ExprKind::Cast { expr: inner, ty } => {
            writeln!(w, "cast {} ({span})", ty.kind)?;
            print_expr(w, idents, i + 1, inner)?;
        }
        ExprKind::Call { function, args } => {
            writeln!(w, "call {} ({span})", idents.get(function))?;
            for arg in args {
                print_expr(w, idents, i + 1, arg)?;
            }
        }
        ExprKind::Dummy => writeln!(w, "dummy ({span})")?,
    }
    Ok(())
}

pub fn print_bound_program(
    w: &mut impl Write,
    idents: &Interner<str>,
    program: &BoundProgram,
) -> std::io::Result<()> {
    for function in &program.functions {
        let symbol = &function.symbol;
        sp(w, 0)?;
        write!(w, "function {}#{}(", idents.get(symbol.name()), symbol.id())?;
        for (idx, param) in symbol.params().iter().enumerate() {
            if idx > 0 {
                write!(w, ", ")?;
            }
            write!(w, "{}", var(idents, &param.variable))?;
        }
        writeln!(w, ") {} ({})", var(idents, &function.it), function.span)?;
        print_bound_block(w, idents, 1, &function.body)?;
    }
    for stmt in &program.statements {
        print_bound_stmt(w, idents, 0, stmt)?;
    }
    Ok(())
}

fn print_bound_block(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    block: &BoundBlock,
) -> std::io::Result<()> {
    for stmt in &block.statements {
        print_bound_stmt(w, idents, i, stmt)?;
    }
    Ok(())
}

fn print_bound_stmt(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    stmt: &BoundStmt,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = stmt.span;
    match &stmt.kind {
        BoundStmtKind::Declaration {
            variable,
            initializer,
        } => {
            writeln!(w, "declare {} ({span})", var(idents, variable))?;
            if let Some(initializer) = initializer {
                print_bound_expr(w, idents, i + 1, initializer)?;
            }
        }
        BoundStmtKind::Assignment { variable, value } => {
            writeln!(w, "assign {} ({span})", var(idents, variable))?;
            print_bound_expr(w, idents, i + 1, value)?;
        }
        BoundStmtKind::CastInPlace { variable, kind } => {
            writeln!(w, "cast {} to {kind} ({span})", var(idents, variable))?;
        }
        BoundStmtKind::Visible { args, newline } => {
            let suffix = if *newline { "" } else { " no newline" };
            writeln!(w, "visible{suffix} ({span})")?;
            for arg in args {
                print_bound_expr(w, idents, i + 1, arg)?;
            }
        }
        BoundStmtKind::Gimmeh { variable } => {
            writeln!(w, "gimmeh {} ({span})", var(idents, variable))?;
        }
        BoundStmtKind::Expression { it, expr } => {
            writeln!(w, "expression into {} ({span})", var(idents, it))?;
            print_bound_expr(w, idents, i + 1, expr)?;
        }
        BoundStmtKind::Conditional {
            it,
            then_block,
            else_ifs,
            else_block,
        } => {
            writeln!(w, "conditional on {} ({span})", var(idents, it))?;
            header(w, i + 1, "then")?;
            print_bound_block(w, idents, i + 2, then_block)?;
            for else_if in else_ifs {
                header(w, i + 1, "else if")?;
                print_bound_expr(w, idents, i + 2, &else_if.condition)?;
                print_bound_block(w, idents, i + 2, &else_if.body)?;
            }
            if let Some(else_block) = else_block {
                header(w, i + 1, "else")?;
                print_bound_block(w, idents, i + 2, else_block)?;
            }
        }
        BoundStmtKind::Switch { it, cases, default } => {
            writeln!(w, "switch on {} ({span})", var(idents, it))?;
            for case in cases {
                header(w, i + 1, "case")?;
                print_bound_expr(w, idents, i + 2, &case.label)?;
                print_bound_block(w, idents, i + 2, &case.body)?;
            }
            if let Some(default) = default {
                header(w, i + 1, "default")?;
                print_bound_block(w, idents, i + 2, default)?;
            }
        }
        BoundStmtKind::Loop(BoundLoop {
            update,
            condition,
            body,
        }) => {
            write!(w, "loop")?;
            if let Some(update) = update {
                write!(w, " {} {}", step(update.op), var(idents, &update.variable))?;
            }
            if let Some(condition) = condition {
                write!(w, " {}", condition_kind(condition.kind))?;
            }
            writeln!(w, " ({span})")?;
            if let Some(condition) = condition {
                header(w, i + 1, "condition")?;
                print_bound_expr(w, idents, i + 2, &condition.expr)?;
            }
            header(w, i + 1, "body")?;
            print_bound_block(w, idents, i + 2, body)?;
        }
        BoundStmtKind::Break(target) => {
            let target = match target {
                BreakTarget::Loop => "loop",
                BreakTarget::Switch => "switch",
                BreakTarget::Function => "function",
            };
            writeln!(w, "break {target} ({span})")?;
        }
        BoundStmtKind::Return(expr) => {
            writeln!(w, "return ({span})")?;
            print_bound_expr(w, idents, i + 1, expr)?;
        }
        BoundStmtKind::Nop => writeln!(w, "nop ({span})")?,
    }
    Ok(())
}

fn print_bound_expr(
    w: &mut impl Write,
    idents: &Interner<str>,
    i: usize,
    expr: &BoundExpr,
) -> std::io::Result<()> {
    sp(w, i)?;
    let span = expr.span;
    match &expr.kind {
        BoundExprKind::Literal(value) => {
            let kind = value.kind();
            match value {
                Value::Yarn(text) => writeln!(w, "literal {kind} {text:?} ({span})")?,
                value => writeln!(w, "literal {kind} {value} ({span})")?,
            }
        }
        BoundExprKind::Variable(variable) => {
            writeln!(w, "variable {} ({span})", var(idents, variable))?;
        }
        BoundExprKind::Binary { op, lhs, rhs } => {
            writeln!(w, "binary {op:?} ({span})")?;
            print_bound_expr(w, idents, i + 1, lhs)?;
            print_bound_expr(w, idents, i + 1, rhs)?;
        }
        BoundExprKind::Not(inner) => {
            writeln!(w, "not ({span})")?;
            print_bound_expr(w, idents, i + 1, inner)?;
        }
        BoundExprKind::Variadic { op, args } => {
            writeln!(w, "variadic {op:?} ({span})")?;
            for arg in args {
                print_bound_expr(w, idents, i + 1, arg)?;
            }
        }
        BoundExprKind::Cast { expr: inner, kind } => {
            writeln!(w, "cast {kind} ({span})")?;
            print_bound_expr(w, idents, i + 1, inner)?;
        }
        BoundExprKind::Call { function, args } => {
            let name = idents.get(function.name());
            writeln!(w, "call {name}#{} ({span})", function.id())?;
            for arg in args {
                print_bound_expr(w, idents, i + 1, arg)?;
            }
        }
        BoundExprKind::Error => writeln!(w, "error ({span})")?,
    }
    Ok(())
}

/// `x#3`: the variable's name and its unique id, which tells shadowed
/// variables apart.
fn var(idents: &Interner<str>, variable: &Variable) -> String {
    format!("{}#{}", idents.get(variable.name()), variable.id())
}

fn step(op: StepOperator) -> &'static str {
    match op {
        StepOperator::Uppin => "uppin",
        StepOperator::Nerfin => "nerfin",
    }
}

fn condition_kind(kind: ConditionKind) -> &'static str {
    match kind {
        ConditionKind::Til => "til",
        ConditionKind::Wile => "wile",
    }
}

fn header(w: &mut impl Write, i: usize, name: &str) -> std::io::Result<()> {
    sp(w, i)?;
    writeln!(w, "{name}")
}

fn sp(w: &mut impl Write, i: usize) -> std::io::Result<()> {
    write!(w, "{:width$}", "", width = i * INDENT_WIDTH)
}
