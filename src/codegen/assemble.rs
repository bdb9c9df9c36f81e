//! Lays the basic blocks of each procedure out as one flat run of ops and
//! resolves block references into op addresses.

use std::fmt;

use runtime::{Builtin, Value};

use crate::{
    codegen::ir::{self, BlockId, Instruction, ProcId, Slot, Terminator},
    token::Span,
};

/// The executable form of a whole program.
#[derive(Debug)]
pub struct Artifact {
    pub entry: Code,
    pub functions: Vec<Code>,
    /// Shared by every procedure, indexed by [`Op::Const`].
    pub constants: Vec<Value>,
}

impl Artifact {
    pub fn function(&self, name: &str) -> Option<(usize, &Code)> {
        self.functions
            .iter()
            .enumerate()
            .find(|(_, code)| &*code.name == name)
    }
}

#[derive(Debug)]
pub struct Code {
    pub name: Box<str>,
    pub params: usize,
    pub slots: usize,
    pub ops: Vec<Op>,
    /// Source span of each op, parallel to `ops`.
    pub spans: Vec<Span>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Op {
    Const(usize),
    Load(usize),
    Store(usize),
    Runtime(Builtin),
    Call { procedure: usize, argc: usize },
    Print { count: usize, newline: bool },
    ReadLine,
    Jump(usize),
    /// Pops the condition, jumping if it is not truthy.
    JumpIfFalse(usize),
    Return,
}

pub fn assemble(program: &ir::Program) -> Artifact {
    let mut constants = Vec::new();
    let entry = Assembler::new(&mut constants).assemble(&program.entry);
    let functions = program
        .functions
        .iter()
        .map(|procedure| Assembler::new(&mut constants).assemble(procedure))
        .collect();
    Artifact {
        entry,
        functions,
        constants,
    }
}

struct Assembler<'a> {
    constants: &'a mut Vec<Value>,
    ops: Vec<Op>,
    spans: Vec<Span>,
    /// Jumps whose target block had no address yet, as `(op, block)`.
    patches: Vec<(usize, BlockId)>,
}

impl<'a> Assembler<'a> {
    fn new(constants: &'a mut Vec<Value>) -> Assembler<'a> {
        Assembler {
            constants,
            ops: Vec::new(),
            spans: Vec::new(),
            patches: Vec::new(),
        }
    }

    fn assemble(mut self, procedure: &ir::Procedure) -> Code {
        let order = reachable(procedure);
        let mut addresses = vec![None; procedure.blocks.len()];

        for (position, &BlockId(id)) in order.iter().enumerate() {
            let block = &procedure.blocks[id];
            addresses[id] = Some(self.ops.len());
            for instruction in &block.instructions {
                let op = self.lower(&instruction.inner);
                self.emit(op, instruction.span);
            }

            let next = order.get(position + 1).copied();
            let span = block.terminator.span;
            match block.terminator.inner {
                Terminator::Jump(target) if Some(target) == next => {}
                Terminator::Jump(target) => self.emit_jump(Op::Jump, target, span),
                Terminator::Branch { then, otherwise } => {
                    self.emit_jump(Op::JumpIfFalse, otherwise, span);
                    if Some(then) != next {
                        self.emit_jump(Op::Jump, then, span);
                    }
                }
                Terminator::Return => self.emit(Op::Return, span),
            }
        }

        for (op, BlockId(target)) in self.patches {
            // Every jump target is reachable, hence laid out.
            let address = addresses[target].unwrap_or_default();
            match &mut self.ops[op] {
                Op::Jump(dest) | Op::JumpIfFalse(dest) => *dest = address,
                _ => {}
            }
        }

        Code {
            name: procedure.name.clone(),
            params: procedure.params,
            slots: procedure.slots,
            ops: self.ops,
            spans: self.spans,
        }
    }

    fn lower(&mut self, instruction: &Instruction) -> Op {
        match instruction {
            Instruction::Const(value) => Op::Const(self.add_constant(value)),
            Instruction::Load(Slot(slot)) => Op::Load(*slot),
            Instruction::Store(Slot(slot)) => Op::Store(*slot),
            Instruction::Runtime(op) => Op::Runtime(*op),
            Instruction::Call {
                procedure: ProcId(procedure),
                argc,
            } => Op::Call {
                procedure: *procedure,
                argc: *argc,
            },
            Instruction::Print { count, newline } => Op::Print {
                count: *count,
                newline: *newline,
            },
            Instruction::ReadLine => Op::ReadLine,
        }
    }

    fn add_constant(&mut self, value: &Value) -> usize {
        if let Some(idx) = self.constants.iter().position(|c| c == value) {
            return idx;
        }
        self.constants.push(value.clone());
        self.constants.len() - 1
    }

    fn emit(&mut self, op: Op, span: Span) {
        self.ops.push(op);
        self.spans.push(span);
    }

    fn emit_jump(&mut self, op: fn(usize) -> Op, target: BlockId, span: Span) {
        self.patches.push((self.ops.len(), target));
        self.emit(op(0), span);
    }
}

/// Blocks reachable from the first one, in their original order.
fn reachable(procedure: &ir::Procedure) -> Vec<BlockId> {
    let mut seen = vec![false; procedure.blocks.len()];
    let mut pending = vec![BlockId(0)];
    while let Some(BlockId(id)) = pending.pop() {
        if std::mem::replace(&mut seen[id], true) {
            continue;
        }
        pending.extend(procedure.blocks[id].terminator.inner.successors());
    }
    seen.iter()
        .enumerate()
        .filter(|(_, seen)| **seen)
        .map(|(id, _)| BlockId(id))
        .collect()
}

impl fmt::Display for Code {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "code {}({}) slots={}", self.name, self.params, self.slots)?;
        for (addr, op) in self.ops.iter().enumerate() {
            write!(f, "{addr:4} ")?;
            match op {
                Op::Const(idx) => writeln!(f, "const #{idx}")?,
                Op::Load(slot) => writeln!(f, "load {slot}")?,
                Op::Store(slot) => writeln!(f, "store {slot}")?,
                Op::Runtime(op) => writeln!(f, "runtime {}", op.name())?,
                Op::Call { procedure, argc } => writeln!(f, "call f{procedure} {argc}")?,
                Op::Print { count, newline } => {
                    writeln!(f, "print {count}{}", if *newline { "" } else { "!" })?;
                }
                Op::ReadLine => writeln!(f, "readline")?,
                Op::Jump(addr) => writeln!(f, "jump {addr}")?,
                Op::JumpIfFalse(addr) => writeln!(f, "jump_if_false {addr}")?,
                Op::Return => writeln!(f, "return")?,
            }
        }
        Ok(())
    }
}
