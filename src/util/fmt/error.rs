#![allow(clippy::items_after_statements)]

use super::{write_span_prefix, Context, Show};
use crate::{binder, lexer, parser, token::Spanned};

impl Show for Spanned<binder::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        write_span_prefix(f, *span)?;

        use binder::Error::*;
        match error {
            DuplicateFunction {
                name,
                other_definition_span,
            } => {
                let name = ctx.ident(name);
                write!(f, "function {name} already defined at {other_definition_span}")
            }
            DuplicateParameter { name } => {
                let name = ctx.ident(name);
                write!(f, "parameter {name} already declared")
            }
            Redeclaration {
                name,
                other_definition_span,
            } => {
                let name = ctx.ident(name);
                write!(f, "{name} already declared at {other_definition_span}")
            }
            UndeclaredVariable(name) => {
                let name = ctx.ident(name);
                write!(f, "{name} is not declared")
            }
            UndefinedFunction(name) => {
                let name = ctx.ident(name);
                write!(f, "function {name} is not defined")
            }
            ArgumentCount {
                function,
                expected,
                actual,
            } => {
                let function = ctx.ident(function);
                write!(
                    f,
                    "incorrect number of arguments to {function}. expected {expected}, but got {actual}"
                )
            }
            MisplacedBreak => write!(f, "GTFO outside of a loop, switch or function"),
            MisplacedReturn => write!(f, "FOUND YR outside of a function"),
            NonLiteralCaseLabel => write!(f, "OMG label is not a literal"),
            DuplicateCaseLabel { other_span } => {
                write!(f, "OMG label already used at {other_span}")
            }
            NestedFunction { name } => {
                let name = ctx.ident(name);
                write!(f, "function {name} must be defined at the top level")
            }
        }
    }
}

impl Show for Spanned<parser::Error> {
    fn show(&self, f: &mut std::fmt::Formatter<'_>, ctx: &Context<'_>) -> std::fmt::Result {
        let Spanned { span, inner: error } = self;

        write_span_prefix(f, *span)?;

        use parser::Error::*;
        match error {
            Lexer(lexer::Error::UnexpectedChar(c)) => write!(f, "unexpected character {c:?}"),
            Lexer(lexer::Error::UnclosedText) => write!(f, "unclosed text literal"),
            Lexer(lexer::Error::BadNumber) => write!(f, "malformed number"),
            Lexer(lexer::Error::BadEscape) => write!(f, "invalid escape sequence"),
            Lexer(lexer::Error::UnclosedComment) => write!(f, "unclosed OBTW comment"),
            UnexpectedTokenInExpr { token } => write!(f, "unexpected {token} in expression"),
            UnexpectedTokenInStatement { token } => {
                write!(f, "unexpected {token} at the start of a statement")
            }
            Unexpected { actual, expected } => write!(f, "expected {expected}, but got {actual}"),
            UnexpectedAny { actual, expected } => {
                write!(f, "expected one of ")?;
                for (idx, kind) in expected.iter().enumerate() {
                    if idx > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{kind}")?;
                }
                write!(f, ", but got {actual}")
            }
            ExpectedLineBreak { actual } => write!(f, "expected line break, but got {actual}"),
            LoopLabelMismatch { label, end } => {
                let label = ctx.ident(label);
                let end = ctx.ident(end);
                write!(f, "loop {label} closed as {end}")
            }
            EmptySwitch => write!(f, "WTF? without any OMG case"),
            TrailingInput { token } => write!(f, "unexpected input after the end: {token}"),
            UnsupportedVersion => write!(f, "unsupported version, expected 1.2"),
        }
    }
}
