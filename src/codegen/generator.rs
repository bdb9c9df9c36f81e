use std::collections::HashMap;

use runtime::{Builtin, Kind, Value};

use crate::{
    ast::{BinaryOperator, ConditionKind, StepOperator, VariadicOperator},
    bound::*,
    codegen::{
        ir::{self, BasicBlock, BlockId, Instruction, ProcId, Procedure, Slot, Terminator},
        Error,
    },
    symbols::Variable,
    token::{Span, Spanned},
    util::intern::Interner,
};

type Result<T, E = Spanned<Error>> = std::result::Result<T, E>;

/// Name of the procedure that runs the top-level statements. Being a
/// keyword, no function can take it.
pub const ENTRY_NAME: &str = "HAI";

pub fn generate(program: &BoundProgram, idents: &Interner<str>) -> Result<ir::Program> {
    let procedures: HashMap<u32, ProcId> = program
        .functions
        .iter()
        .enumerate()
        .map(|(i, function)| (function.symbol.id(), ProcId(i)))
        .collect();

    let entry = {
        let mut g = Generator::new(idents, &procedures, ENTRY_NAME.into(), 0);
        g.declare(&program.it);
        g.gen_stmts(&program.statements)?;
        let end = program.span.after();
        g.emit(Instruction::Const(Value::Noob), end);
        g.terminate(Terminator::Return, end);
        g.finish(program.span)?
    };

    let functions = program
        .functions
        .iter()
        .map(|function| {
            let name = idents.get(function.symbol.name()).into();
            let g = Generator::new(idents, &procedures, name, function.symbol.arity());
            g.gen_function(function)
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(ir::Program { entry, functions })
}

struct PendingBlock {
    instructions: Vec<Spanned<Instruction>>,
    terminator: Option<Spanned<Terminator>>,
}

/// Where every return path of a function converges.
#[derive(Copy, Clone)]
struct Exit {
    slot: Slot,
    block: BlockId,
}

/// Builds one procedure.
struct Generator<'a> {
    idents: &'a Interner<str>,
    procedures: &'a HashMap<u32, ProcId>,
    name: Box<str>,
    params: usize,
    slots: HashMap<u32, Slot>,
    slot_count: usize,
    blocks: Vec<PendingBlock>,
    current: BlockId,
    /// Targets of `GTFO` for the enclosing loops, innermost last.
    loop_breaks: Vec<BlockId>,
    /// Targets of `GTFO` for the enclosing switches, innermost last.
    switch_breaks: Vec<BlockId>,
    exit: Option<Exit>,
}

impl<'a> Generator<'a> {
    fn new(
        idents: &'a Interner<str>,
        procedures: &'a HashMap<u32, ProcId>,
        name: Box<str>,
        params: usize,
    ) -> Generator<'a> {
        let mut g = Generator {
            idents,
            procedures,
            name,
            params,
            slots: HashMap::new(),
            slot_count: 0,
            blocks: Vec::with_capacity(8),
            current: BlockId(0),
            loop_breaks: Vec::new(),
            switch_breaks: Vec::new(),
            exit: None,
        };
        g.current = g.new_block();
        g
    }

    fn gen_function(mut self, function: &BoundFunction) -> Result<Procedure> {
        let span = function.span;
        let params: Vec<Slot> = function
            .symbol
            .params()
            .iter()
            .map(|param| self.declare(&param.variable))
            .collect();
        let it = self.declare(&function.it);
        let exit = Exit {
            slot: self.hidden_slot(),
            block: self.new_block(),
        };
        self.exit = Some(exit);

        // Prologue: the arguments arrive on the stack, last one on top.
        for &slot in params.iter().rev() {
            self.emit(Instruction::Store(slot), span);
        }

        self.gen_stmts(&function.body.statements)?;

        // Falling off the end returns the function's own IT.
        let end = function.body.span.after();
        self.emit(Instruction::Load(it), end);
        self.emit(Instruction::Store(exit.slot), end);
        self.terminate(Terminator::Jump(exit.block), end);

        self.switch_to(exit.block);
        self.emit(Instruction::Load(exit.slot), span);
        self.terminate(Terminator::Return, span);

        self.finish(span)
    }

    fn gen_stmts(&mut self, stmts: &[BoundStmt]) -> Result<()> {
        for stmt in stmts {
            self.gen_stmt(stmt)?;
        }
        Ok(())
    }

    fn gen_stmt(&mut self, stmt: &BoundStmt) -> Result<()> {
        let span = stmt.span;
        match &stmt.kind {
            BoundStmtKind::Declaration {
                variable,
                initializer,
            } => {
                match initializer {
                    Some(expr) => self.gen_expr(expr)?,
                    None => self.emit(Instruction::Const(Value::Noob), span),
                }
                let slot = self.declare(variable);
                self.emit(Instruction::Store(slot), span);
            }
            BoundStmtKind::Assignment { variable, value } => {
                self.gen_expr(value)?;
                let slot = self.slot(variable, span)?;
                self.emit(Instruction::Store(slot), span);
            }
            BoundStmtKind::CastInPlace { variable, kind } => {
                let slot = self.slot(variable, span)?;
                self.emit(Instruction::Load(slot), span);
                self.runtime(cast_operation_name(*kind), span)?;
                self.emit(Instruction::Store(slot), span);
            }
            BoundStmtKind::Visible { args, newline } => {
                for arg in args {
                    self.gen_expr(arg)?;
                }
                let print = Instruction::Print {
                    count: args.len(),
                    newline: *newline,
                };
                self.emit(print, span);
            }
            BoundStmtKind::Gimmeh { variable } => {
                let slot = self.slot(variable, span)?;
                self.emit(Instruction::ReadLine, span);
                self.emit(Instruction::Store(slot), span);
            }
            BoundStmtKind::Expression { it, expr } => {
                self.gen_expr(expr)?;
                let slot = self.slot(it, span)?;
                self.emit(Instruction::Store(slot), span);
            }
            BoundStmtKind::Conditional {
                it,
                then_block,
                else_ifs,
                else_block,
            } => self.gen_conditional(it, then_block, else_ifs, else_block.as_ref(), span)?,
            BoundStmtKind::Switch { it, cases, default } => {
                self.gen_switch(it, cases, default.as_ref(), span)?;
            }
            BoundStmtKind::Loop(bound_loop) => self.gen_loop(bound_loop, span)?,
            BoundStmtKind::Break(target) => {
                let target = match target {
                    BreakTarget::Loop => self.loop_breaks.last().copied(),
                    BreakTarget::Switch => self.switch_breaks.last().copied(),
                    BreakTarget::Function => {
                        let exit = self.function_exit(span)?;
                        self.emit(Instruction::Const(Value::Noob), span);
                        self.emit(Instruction::Store(exit.slot), span);
                        Some(exit.block)
                    }
                };
                let target = target.ok_or_else(|| span.wrap(Error::DanglingBreak))?;
                self.terminate(Terminator::Jump(target), span);
                let dead = self.new_block();
                self.switch_to(dead);
            }
            BoundStmtKind::Return(expr) => {
                let exit = self.function_exit(span)?;
                self.gen_expr(expr)?;
                self.emit(Instruction::Store(exit.slot), span);
                self.terminate(Terminator::Jump(exit.block), span);
                let dead = self.new_block();
                self.switch_to(dead);
            }
            BoundStmtKind::Nop => {}
        }
        Ok(())
    }

    /// Tests IT first, then each `MEBBE` condition in order.
    fn gen_conditional(
        &mut self,
        it: &Variable,
        then_block: &BoundBlock,
        else_ifs: &[BoundElseIf],
        else_block: Option<&BoundBlock>,
        span: Span,
    ) -> Result<()> {
        let end = self.new_block();

        let it = self.slot(it, span)?;
        self.emit(Instruction::Load(it), span);
        let mut next = self.branch_into(then_block, end, span)?;

        for else_if in else_ifs {
            self.switch_to(next);
            self.gen_expr(&else_if.condition)?;
            next = self.branch_into(&else_if.body, end, else_if.condition.span)?;
        }

        self.switch_to(next);
        if let Some(else_block) = else_block {
            self.gen_stmts(&else_block.statements)?;
        }
        self.terminate(Terminator::Jump(end), span);
        self.switch_to(end);
        Ok(())
    }

    /// Pops a condition and branches on it: if truthy, runs `body` and jumps
    /// to `end`. Returns the block taken otherwise, left unterminated.
    fn branch_into(&mut self, body: &BoundBlock, end: BlockId, span: Span) -> Result<BlockId> {
        let then = self.new_block();
        let otherwise = self.new_block();
        self.terminate(Terminator::Branch { then, otherwise }, span);

        self.switch_to(then);
        self.gen_stmts(&body.statements)?;
        self.terminate(Terminator::Jump(end), body.span);
        Ok(otherwise)
    }

    /// Once a case matches, every following body runs (a hidden "matched"
    /// flag skips the remaining comparisons) until a `GTFO` leaves the
    /// switch. The default body is reached both by falling through and when
    /// no case matches.
    fn gen_switch(
        &mut self,
        it: &Variable,
        cases: &[BoundCase],
        default: Option<&BoundBlock>,
        span: Span,
    ) -> Result<()> {
        let it = self.slot(it, span)?;
        let matched = self.hidden_slot();
        let end = self.new_block();

        self.emit(Instruction::Const(Value::FAIL), span);
        self.emit(Instruction::Store(matched), span);

        self.switch_breaks.push(end);
        for case in cases {
            let label_span = case.label.span;
            let body = self.new_block();
            let compare = self.new_block();
            let next = self.new_block();

            self.emit(Instruction::Load(matched), label_span);
            self.terminate(
                Terminator::Branch {
                    then: body,
                    otherwise: compare,
                },
                label_span,
            );

            self.switch_to(compare);
            self.emit(Instruction::Load(it), label_span);
            self.gen_expr(&case.label)?;
            self.runtime(binary_operation_name(BinaryOperator::BothSaem), label_span)?;
            self.terminate(
                Terminator::Branch {
                    then: body,
                    otherwise: next,
                },
                label_span,
            );

            self.switch_to(body);
            self.emit(Instruction::Const(Value::WIN), label_span);
            self.emit(Instruction::Store(matched), label_span);
            self.gen_stmts(&case.body.statements)?;
            self.terminate(Terminator::Jump(next), case.body.span);

            self.switch_to(next);
        }
        if let Some(default) = default {
            self.gen_stmts(&default.statements)?;
        }
        self.switch_breaks.pop();

        self.terminate(Terminator::Jump(end), span);
        self.switch_to(end);
        Ok(())
    }

    /// ```text
    ///   init:   var = 0
    ///   header: test the condition, to body or exit
    ///   body:   ...
    ///   step:   var = var +/- 1, to header
    ///   exit:
    /// ```
    fn gen_loop(&mut self, bound_loop: &BoundLoop, span: Span) -> Result<()> {
        let header = self.new_block();
        let body = self.new_block();
        let step = self.new_block();
        let exit = self.new_block();

        let variable = match &bound_loop.update {
            Some(update) => {
                let slot = self.declare(&update.variable);
                self.emit(Instruction::Const(Value::Numbr(0)), span);
                self.emit(Instruction::Store(slot), span);
                Some((update.op, slot))
            }
            None => None,
        };
        self.terminate(Terminator::Jump(header), span);

        self.switch_to(header);
        match &bound_loop.condition {
            Some(condition) => {
                self.gen_expr(&condition.expr)?;
                let branch = match condition.kind {
                    ConditionKind::Til => Terminator::Branch {
                        then: exit,
                        otherwise: body,
                    },
                    ConditionKind::Wile => Terminator::Branch {
                        then: body,
                        otherwise: exit,
                    },
                };
                self.terminate(branch, condition.expr.span);
            }
            None => self.terminate(Terminator::Jump(body), span),
        }

        self.switch_to(body);
        self.loop_breaks.push(exit);
        self.gen_stmts(&bound_loop.body.statements)?;
        self.loop_breaks.pop();
        self.terminate(Terminator::Jump(step), bound_loop.body.span);

        self.switch_to(step);
        if let Some((op, slot)) = variable {
            let name = match op {
                StepOperator::Uppin => binary_operation_name(BinaryOperator::Sum),
                StepOperator::Nerfin => binary_operation_name(BinaryOperator::Diff),
            };
            self.emit(Instruction::Load(slot), span);
            self.emit(Instruction::Const(Value::Numbr(1)), span);
            self.runtime(name, span)?;
            self.emit(Instruction::Store(slot), span);
        }
        self.terminate(Terminator::Jump(header), span);

        self.switch_to(exit);
        Ok(())
    }

    fn gen_expr(&mut self, expr: &BoundExpr) -> Result<()> {
        let span = expr.span;
        match &expr.kind {
            BoundExprKind::Literal(value) => self.emit(Instruction::Const(value.clone()), span),
            BoundExprKind::Variable(variable) => {
                let slot = self.slot(variable, span)?;
                self.emit(Instruction::Load(slot), span);
            }
            BoundExprKind::Binary { op, lhs, rhs } => {
                self.gen_expr(lhs)?;
                self.gen_expr(rhs)?;
                self.runtime(binary_operation_name(*op), span)?;
            }
            BoundExprKind::Not(inner) => {
                self.gen_expr(inner)?;
                self.runtime("not", span)?;
            }
            BoundExprKind::Variadic { op, args } => self.gen_variadic(*op, args, span)?,
            BoundExprKind::Cast { expr: inner, kind } => {
                self.gen_expr(inner)?;
                self.runtime(cast_operation_name(*kind), span)?;
            }
            BoundExprKind::Call { function, args } => {
                let Some(&procedure) = self.procedures.get(&function.id()) else {
                    let name = self.idents.get(function.name()).into();
                    return Err(span.wrap(Error::UnknownProcedure(name)));
                };
                for arg in args {
                    self.gen_expr(arg)?;
                }
                let call = Instruction::Call {
                    procedure,
                    argc: args.len(),
                };
                self.emit(call, span);
            }
            BoundExprKind::Error => return Err(span.wrap(Error::UnboundExpression)),
        }
        Ok(())
    }

    /// Folds the operands left to right with the matching binary operation.
    /// A single operand is still converted to the result's kind.
    fn gen_variadic(
        &mut self,
        op: VariadicOperator,
        args: &[BoundExpr],
        span: Span,
    ) -> Result<()> {
        let (fold, kind, empty) = match op {
            VariadicOperator::All => (
                binary_operation_name(BinaryOperator::BothOf),
                Kind::Troof,
                Value::WIN,
            ),
            VariadicOperator::Any => (
                binary_operation_name(BinaryOperator::EitherOf),
                Kind::Troof,
                Value::FAIL,
            ),
            VariadicOperator::Smoosh => ("smoosh", Kind::Yarn, Value::yarn("")),
        };
        let Some((first, rest)) = args.split_first() else {
            self.emit(Instruction::Const(empty), span);
            return Ok(());
        };
        self.gen_expr(first)?;
        if rest.is_empty() {
            self.runtime(cast_operation_name(kind), span)?;
        }
        for arg in rest {
            self.gen_expr(arg)?;
            self.runtime(fold, span)?;
        }
        Ok(())
    }
}

// Block and slot bookkeeping.
impl Generator<'_> {
    fn new_block(&mut self) -> BlockId {
        self.blocks.push(PendingBlock {
            instructions: Vec::new(),
            terminator: None,
        });
        BlockId(self.blocks.len() - 1)
    }

    fn switch_to(&mut self, block: BlockId) {
        self.current = block;
    }

    fn emit(&mut self, instruction: Instruction, span: Span) {
        self.blocks[self.current.0]
            .instructions
            .push(span.wrap(instruction));
    }

    fn terminate(&mut self, terminator: Terminator, span: Span) {
        self.blocks[self.current.0].terminator = Some(span.wrap(terminator));
    }

    /// Allocates the slot backing `variable`. Each declaration gets a slot of
    /// its own, even when it shadows another variable.
    fn declare(&mut self, variable: &Variable) -> Slot {
        let slot = self.hidden_slot();
        self.slots.insert(variable.id(), slot);
        slot
    }

    /// A slot no variable names.
    fn hidden_slot(&mut self) -> Slot {
        let slot = Slot(self.slot_count);
        self.slot_count += 1;
        slot
    }

    fn slot(&self, variable: &Variable, span: Span) -> Result<Slot> {
        self.slots.get(&variable.id()).copied().ok_or_else(|| {
            let name = self.idents.get(variable.name()).into();
            span.wrap(Error::MissingSlot(name))
        })
    }

    fn function_exit(&self, span: Span) -> Result<Exit> {
        self.exit
            .ok_or_else(|| span.wrap(Error::ReturnOutsideFunction))
    }

    /// Emits a call to the runtime operation named `name`.
    fn runtime(&mut self, name: &'static str, span: Span) -> Result<()> {
        let op = Builtin::resolve(name)
            .ok_or_else(|| span.wrap(Error::UnresolvedRuntimeOperation(name)))?;
        self.emit(Instruction::Runtime(op), span);
        Ok(())
    }

    fn finish(self, span: Span) -> Result<Procedure> {
        let count = self.blocks.len();
        let blocks = self
            .blocks
            .into_iter()
            .enumerate()
            .map(|(id, block)| {
                let Some(terminator) = block.terminator else {
                    return Err(span.wrap(Error::UnterminatedBlock {
                        procedure: self.name.clone(),
                        block: id,
                    }));
                };
                if let Some(BlockId(target)) =
                    terminator.inner.successors().find(|target| target.0 >= count)
                {
                    return Err(terminator.span.wrap(Error::MissingBlock {
                        procedure: self.name.clone(),
                        block: id,
                        target,
                    }));
                }
                Ok(BasicBlock {
                    instructions: block.instructions,
                    terminator,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Procedure {
            name: self.name,
            params: self.params,
            slots: self.slot_count,
            blocks,
            span,
        })
    }
}

fn binary_operation_name(op: BinaryOperator) -> &'static str {
    match op {
        BinaryOperator::Sum => "sum_of",
        BinaryOperator::Diff => "diff_of",
        BinaryOperator::Produkt => "produkt_of",
        BinaryOperator::Quoshunt => "quoshunt_of",
        BinaryOperator::Mod => "mod_of",
        BinaryOperator::Biggr => "biggr_of",
        BinaryOperator::Smallr => "smallr_of",
        BinaryOperator::BothOf => "both_of",
        BinaryOperator::EitherOf => "either_of",
        BinaryOperator::WonOf => "won_of",
        BinaryOperator::BothSaem => "both_saem",
        BinaryOperator::Diffrint => "diffrint",
    }
}

fn cast_operation_name(kind: Kind) -> &'static str {
    match kind {
        Kind::Noob => "maek_noob",
        Kind::Troof => "maek_troof",
        Kind::Numbr => "maek_numbr",
        Kind::Numbar => "maek_numbar",
        Kind::Yarn => "maek_yarn",
    }
}
