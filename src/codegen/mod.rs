use crate::{bound::BoundProgram, token::Spanned, util::intern::Interner};

pub mod assemble;
pub mod generator;
pub mod ir;

pub use assemble::{Artifact, Code, Op};

/// Code generation only fails on inconsistencies in its input, never on
/// anything a well-bound program can contain.
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("runtime operation `{0}` could not be resolved")]
    UnresolvedRuntimeOperation(&'static str),

    #[error("no storage slot for `{0}`")]
    MissingSlot(Box<str>),

    #[error("call to unknown procedure `{0}`")]
    UnknownProcedure(Box<str>),

    #[error("GTFO has nothing to leave")]
    DanglingBreak,

    #[error("FOUND YR outside of a function")]
    ReturnOutsideFunction,

    #[error("expression failed to bind")]
    UnboundExpression,

    #[error("block b{block} of `{procedure}` has no terminator")]
    UnterminatedBlock { procedure: Box<str>, block: usize },

    #[error("block b{block} of `{procedure}` jumps to missing block b{target}")]
    MissingBlock {
        procedure: Box<str>,
        block: usize,
        target: usize,
    },
}

/// Generates the basic-block IR of `program` and assembles it.
pub fn generate(
    program: &BoundProgram,
    ident_interner: &Interner<str>,
) -> Result<Artifact, Spanned<Error>> {
    let ir = generator::generate(program, ident_interner)?;
    log::trace!(
        "generated {} procedures, {} blocks",
        ir.functions.len() + 1,
        ir.functions
            .iter()
            .chain([&ir.entry])
            .map(|p| p.blocks.len())
            .sum::<usize>(),
    );
    Ok(assemble::assemble(&ir))
}
