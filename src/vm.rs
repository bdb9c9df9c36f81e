//! Executes an assembled [`Artifact`].
//!
//! All procedures share one operand stack. A call leaves its arguments on the
//! stack for the callee's prologue to store, and the callee leaves its result
//! in their place. Each activation has its own frame of slots, all starting
//! as NOOB.

use std::io::{BufRead, Write};

use runtime::{cast::truthy, Value};

use crate::{
    codegen::{Artifact, Code, Op},
    token::Span,
};

#[cfg(test)]
mod tests;

#[derive(Copy, Clone, Debug)]
pub struct Limits {
    /// Nesting depth of active procedures, the entry one included.
    pub max_call_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Limits {
            max_call_depth: 512,
        }
    }
}

/// What aborted a running program.
#[derive(Debug, PartialEq, thiserror::Error)]
pub enum Trap {
    #[error(transparent)]
    Runtime(#[from] runtime::Error),

    #[error("operand stack underflow")]
    StackUnderflow,

    #[error("no function named {0}")]
    UnknownFunction(Box<str>),

    #[error("{function} takes {expected} arguments, but got {actual}")]
    ArgumentCount {
        function: Box<str>,
        expected: usize,
        actual: usize,
    },
}

/// A trap, along with where it happened.
#[derive(Debug, PartialEq, thiserror::Error)]
#[error("{trap}")]
pub struct Fault {
    pub trap: Trap,
    pub procedure: Box<str>,
    /// Span of the instruction that trapped.
    pub span: Span,
}

enum Flow {
    Next,
    Jump(usize),
    Call { procedure: usize, argc: usize },
    Return(Value),
}

pub struct Machine<'a, R, W> {
    artifact: &'a Artifact,
    input: R,
    output: W,
    limits: Limits,
    stack: Vec<Value>,
    depth: usize,
}

impl<'a, R, W> Machine<'a, R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(artifact: &'a Artifact, input: R, output: W) -> Machine<'a, R, W> {
        Machine {
            artifact,
            input,
            output,
            limits: Limits::default(),
            stack: Vec::with_capacity(64),
            depth: 0,
        }
    }

    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Runs the top-level statements.
    pub fn run(&mut self) -> Result<Value, Fault> {
        let artifact = self.artifact;
        let entry = &artifact.entry;
        self.execute(entry, entry.spans.first().copied().unwrap_or_default())
    }

    /// Calls the function named `name` with `args`, returning its result.
    pub fn call(&mut self, name: &str, args: Vec<Value>) -> Result<Value, Fault> {
        let artifact = self.artifact;
        let fault = |trap| Fault {
            trap,
            procedure: name.into(),
            span: Span::default(),
        };
        let Some((_, code)) = artifact.function(name) else {
            return Err(fault(Trap::UnknownFunction(name.into())));
        };
        if args.len() != code.params {
            return Err(fault(Trap::ArgumentCount {
                function: name.into(),
                expected: code.params,
                actual: args.len(),
            }));
        }
        self.stack.extend(args);
        self.execute(code, Span::default())
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Activates `code`, whose call site is at `span`.
    fn execute(&mut self, code: &'a Code, span: Span) -> Result<Value, Fault> {
        if self.depth >= self.limits.max_call_depth {
            let limit = self.limits.max_call_depth;
            return Err(Fault {
                trap: runtime::Error::CallDepthExceeded { limit }.into(),
                procedure: code.name.clone(),
                span,
            });
        }
        self.depth += 1;
        let result = self.frame(code);
        self.depth -= 1;
        result
    }

    fn frame(&mut self, code: &'a Code) -> Result<Value, Fault> {
        let artifact = self.artifact;
        let mut slots = vec![Value::Noob; code.slots];
        let mut ip = 0;
        let fault = |trap, ip: usize| Fault {
            trap,
            procedure: code.name.clone(),
            span: code.spans[ip],
        };

        while let Some(&op) = code.ops.get(ip) {
            let flow = self.step(op, &mut slots).map_err(|trap| fault(trap, ip))?;
            match flow {
                Flow::Next => ip += 1,
                Flow::Jump(target) => ip = target,
                Flow::Call { procedure, argc } => {
                    let Some(callee) = artifact.functions.get(procedure) else {
                        let trap = Trap::UnknownFunction(format!("#{procedure}").into());
                        return Err(fault(trap, ip));
                    };
                    if argc != callee.params {
                        let trap = Trap::ArgumentCount {
                            function: callee.name.clone(),
                            expected: callee.params,
                            actual: argc,
                        };
                        return Err(fault(trap, ip));
                    }
                    if self.stack.len() < argc {
                        return Err(fault(Trap::StackUnderflow, ip));
                    }
                    log::trace!("call {} with {argc} args at depth {}", callee.name, self.depth);
                    let value = self.execute(callee, code.spans[ip])?;
                    self.stack.push(value);
                    ip += 1;
                }
                Flow::Return(value) => return Ok(value),
            }
        }
        Ok(Value::Noob)
    }

    fn step(&mut self, op: Op, slots: &mut [Value]) -> Result<Flow, Trap> {
        match op {
            Op::Const(idx) => self.stack.push(self.artifact.constants[idx].clone()),
            Op::Load(slot) => self.stack.push(slots[slot].clone()),
            Op::Store(slot) => slots[slot] = self.pop()?,
            Op::Runtime(builtin) => {
                let operands = self.pop_n(builtin.arity())?;
                self.stack.push(builtin.call(&operands)?);
            }
            Op::Call { procedure, argc } => return Ok(Flow::Call { procedure, argc }),
            Op::Print { count, newline } => {
                let values = self.pop_n(count)?;
                runtime::io::print(&mut self.output, &values, newline)?;
            }
            Op::ReadLine => {
                let line = runtime::io::read_line(&mut self.input)?;
                self.stack.push(line);
            }
            Op::Jump(target) => return Ok(Flow::Jump(target)),
            Op::JumpIfFalse(target) => {
                if !truthy(&self.pop()?) {
                    return Ok(Flow::Jump(target));
                }
            }
            Op::Return => return Ok(Flow::Return(self.pop()?)),
        }
        Ok(Flow::Next)
    }

    fn pop(&mut self) -> Result<Value, Trap> {
        self.stack.pop().ok_or(Trap::StackUnderflow)
    }

    /// Pops `n` values, returned in the order they were pushed.
    fn pop_n(&mut self, n: usize) -> Result<Vec<Value>, Trap> {
        let Some(at) = self.stack.len().checked_sub(n) else {
            return Err(Trap::StackUnderflow);
        };
        Ok(self.stack.split_off(at))
    }
}
