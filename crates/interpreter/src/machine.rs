use ir::{
    interpret::{EvalError, Interpret, Locals},
    Immediate,
};
use stackify_codegen::{StackCode, StackOp};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MachineError {
    #[error("stack underflow at op {pc}")]
    StackUnderflow { pc: usize },

    #[error("`local.get {slot}` at op {pc} reads a slot that was never written")]
    UnsetSlot { pc: usize, slot: u32 },

    #[error("op {pc} failed: {source}")]
    Eval {
        pc: usize,
        #[source]
        source: EvalError,
    },

    #[error("{depth} values left on the stack")]
    UnbalancedStack { depth: usize },
}

pub struct Machine<'a> {
    locals: &'a mut Locals,
    stack: Vec<Immediate>,
}

impl<'a> Machine<'a> {
    pub fn new(locals: &'a mut Locals) -> Self {
        Self {
            locals,
            stack: Vec::new(),
        }
    }

    /// Executes every op of `code` in order. The stack must be empty at the end.
    pub fn run(&mut self, code: &StackCode) -> Result<(), MachineError> {
        self.stack.clear();
        for (pc, &op) in code.ops().iter().enumerate() {
            tracing::trace!(pc, %op, depth = self.stack.len(), "step");
            self.step(pc, op)?;
        }

        if self.stack.is_empty() {
            Ok(())
        } else {
            Err(MachineError::UnbalancedStack {
                depth: self.stack.len(),
            })
        }
    }

    pub fn stack(&self) -> &[Immediate] {
        &self.stack
    }

    fn step(&mut self, pc: usize, op: StackOp) -> Result<(), MachineError> {
        match op {
            StackOp::Push(imm) => self.stack.push(imm),

            StackOp::Inst(opcode) => {
                let arity = opcode.arity();
                if self.stack.len() < arity {
                    return Err(MachineError::StackUnderflow { pc });
                }
                let args = self.stack.split_off(self.stack.len() - arity);
                let result = opcode
                    .interpret(&args, &mut *self.locals)
                    .map_err(|source| MachineError::Eval { pc, source })?;
                if let Some(value) = result {
                    self.stack.push(value);
                }
            }

            StackOp::LocalGet(slot) => {
                let value = self
                    .locals
                    .get_slot(slot)
                    .ok_or(MachineError::UnsetSlot { pc, slot })?;
                self.stack.push(value);
            }

            StackOp::LocalSet(slot) => {
                let value = self.pop(pc)?;
                self.locals.set_slot(slot, value);
            }

            StackOp::LocalTee(slot) => {
                let value = *self
                    .stack
                    .last()
                    .ok_or(MachineError::StackUnderflow { pc })?;
                self.locals.set_slot(slot, value);
            }

            StackOp::Drop => {
                self.pop(pc)?;
            }
        }

        Ok(())
    }

    fn pop(&mut self, pc: usize) -> Result<Immediate, MachineError> {
        self.stack.pop().ok_or(MachineError::StackUnderflow { pc })
    }
}
