//! Formatting of compiler data that refers to interned identifiers, which
//! can't implement [`std::fmt::Display`] on their own.

use std::fmt;

use crate::{
    token::Span,
    util::intern::{Interned, Interner},
};

pub mod error;
pub mod tree;

pub struct Context<'ident> {
    pub ident_interner: &'ident Interner<str>,
}

impl<'ident> Context<'ident> {
    pub fn new(ident_interner: &'ident Interner<str>) -> Context<'ident> {
        Context { ident_interner }
    }

    pub fn ident(&self, name: impl Into<Interned<str>>) -> &'ident str {
        self.ident_interner.get(name)
    }
}

/// Analogous to [`std::fmt::Display`], but also receives a [`Context`] to
/// resolve identifiers through.
///
/// Diagnostics written with the alternate flag (`{:#}`) are prefixed by
/// their span.
pub trait Show {
    fn show(&self, f: &mut fmt::Formatter<'_>, ctx: &Context<'_>) -> fmt::Result;

    /// Returns a type which can be displayed.
    fn display(&self, ctx: &Context<'_>) -> impl fmt::Display
    where
        Self: Sized,
    {
        Display(self, ctx)
    }
}

struct Display<'this, 'ctx, 'ident, T: Show>(&'this T, &'ctx Context<'ident>);

impl<T: Show> fmt::Display for Display<'_, '_, '_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Display(this, ctx) = self;
        this.show(f, ctx)
    }
}

fn write_span_prefix(f: &mut fmt::Formatter<'_>, span: Span) -> fmt::Result {
    if f.alternate() {
        write!(f, "{span}: ")?;
    }
    Ok(())
}
