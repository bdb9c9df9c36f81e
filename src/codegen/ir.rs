//! A stack-machine IR of basic blocks. Each block is a run of instructions
//! ended by exactly one terminator; only terminators transfer control.

use std::fmt;

use runtime::{Builtin, Value};

use crate::token::{Span, Spanned};

/// Index of a block within its procedure.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct BlockId(pub usize);

/// Index of a storage slot within its procedure's frame.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct Slot(pub usize);

/// Index of a function procedure within the program.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct ProcId(pub usize);

#[derive(Debug)]
pub struct Program {
    pub entry: Procedure,
    pub functions: Vec<Procedure>,
}

#[derive(Debug)]
pub struct Procedure {
    pub name: Box<str>,
    pub params: usize,
    /// Frame size. Parameters occupy the first `params` slots.
    pub slots: usize,
    pub blocks: Vec<BasicBlock>,
    pub span: Span,
}

#[derive(Debug)]
pub struct BasicBlock {
    pub instructions: Vec<Spanned<Instruction>>,
    pub terminator: Spanned<Terminator>,
}

/// Stack effects are noted as `[popped] -> [pushed]`.
#[derive(Clone, Debug, PartialEq)]
pub enum Instruction {
    /// `[] -> [value]`
    Const(Value),
    /// `[] -> [slot]`
    Load(Slot),
    /// `[value] -> []`
    Store(Slot),
    /// `[operands; arity] -> [result]`
    Runtime(Builtin),
    /// `[args; argc] -> [result]`
    Call { procedure: ProcId, argc: usize },
    /// `[values; count] -> []`
    Print { count: usize, newline: bool },
    /// `[] -> [line]`
    ReadLine,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Terminator {
    Jump(BlockId),
    /// `[condition] -> []`, taking `then` if the condition is truthy.
    Branch { then: BlockId, otherwise: BlockId },
    /// `[value] -> []`, returning the value to the caller.
    Return,
}

impl Terminator {
    pub fn successors(self) -> impl Iterator<Item = BlockId> {
        let (a, b) = match self {
            Terminator::Jump(target) => (Some(target), None),
            Terminator::Branch { then, otherwise } => (Some(then), Some(otherwise)),
            Terminator::Return => (None, None),
        };
        a.into_iter().chain(b)
    }
}

impl fmt::Display for Procedure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "proc {}({}) slots={}", self.name, self.params, self.slots)?;
        for (id, block) in self.blocks.iter().enumerate() {
            writeln!(f, "b{id}:")?;
            for instruction in &block.instructions {
                write!(f, "  ")?;
                match &instruction.inner {
                    Instruction::Const(Value::Noob) => writeln!(f, "const NOOB")?,
                    Instruction::Const(Value::Yarn(text)) => writeln!(f, "const {text:?}")?,
                    Instruction::Const(value) => writeln!(f, "const {value}")?,
                    Instruction::Load(Slot(slot)) => writeln!(f, "load {slot}")?,
                    Instruction::Store(Slot(slot)) => writeln!(f, "store {slot}")?,
                    Instruction::Runtime(op) => writeln!(f, "runtime {}", op.name())?,
                    Instruction::Call {
                        procedure: ProcId(procedure),
                        argc,
                    } => writeln!(f, "call f{procedure} {argc}")?,
                    Instruction::Print { count, newline } => {
                        writeln!(f, "print {count}{}", if *newline { "" } else { "!" })?;
                    }
                    Instruction::ReadLine => writeln!(f, "readline")?,
                }
            }
            match block.terminator.inner {
                Terminator::Jump(BlockId(target)) => writeln!(f, "  jump b{target}")?,
                Terminator::Branch {
                    then: BlockId(then),
                    otherwise: BlockId(otherwise),
                } => writeln!(f, "  branch b{then} b{otherwise}")?,
                Terminator::Return => writeln!(f, "  return")?,
            }
        }
        Ok(())
    }
}
