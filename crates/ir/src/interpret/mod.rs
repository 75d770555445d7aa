//! Reference semantics for block instructions.
//!
//! The stack machine and the direct block evaluator both go through [`Interpret`], so the two
//! only differ in how operands reach an instruction.
use std::collections::BTreeMap;

use cranelift_entity::SecondaryMap;
use thiserror::Error;

use crate::{
    block::Block,
    inst::{InstId, Opcode},
    value::{Immediate, Operand},
};

mod arith;
mod cmp;
mod data;
mod logic;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EvalError {
    #[error("division by zero")]
    DivisionByZero,

    #[error("invalid local index `{0}`")]
    InvalidLocal(Immediate),

    #[error("`{0}` has no value")]
    Undefined(InstId),

    #[error("`{opcode}` expects {expected} operands, but {actual} given")]
    ArgCount {
        opcode: Opcode,
        expected: usize,
        actual: usize,
    },
}

pub trait State {
    /// Reads a program local. Locals that were never written read as zero.
    fn load_local(&mut self, local: u32) -> Immediate;

    fn store_local(&mut self, local: u32, value: Immediate);
}

pub trait Interpret {
    /// Evaluates with already computed operand values, leftmost operand first.
    ///
    /// Returns `None` for instructions without a result.
    fn interpret(
        &self,
        args: &[Immediate],
        state: &mut dyn State,
    ) -> Result<Option<Immediate>, EvalError>;
}

impl Interpret for Opcode {
    fn interpret(
        &self,
        args: &[Immediate],
        state: &mut dyn State,
    ) -> Result<Option<Immediate>, EvalError> {
        let opcode = *self;
        if args.len() != opcode.arity() {
            return Err(EvalError::ArgCount {
                opcode,
                expected: opcode.arity(),
                actual: args.len(),
            });
        }

        let value = match opcode {
            Opcode::Neg | Opcode::Add | Opcode::Sub | Opcode::Mul | Opcode::Sdiv | Opcode::Smod => {
                arith::eval(opcode, args)?
            }
            Opcode::Not
            | Opcode::IsZero
            | Opcode::Shl
            | Opcode::Shr
            | Opcode::And
            | Opcode::Or
            | Opcode::Xor
            | Opcode::Select => logic::eval(opcode, args),
            Opcode::Eq | Opcode::Ne | Opcode::Lt | Opcode::Gt | Opcode::Le | Opcode::Ge => {
                cmp::eval(opcode, args)
            }
            Opcode::LoadLocal => data::load_local(args[0], state)?,
            Opcode::StoreLocal => {
                data::store_local(args[0], args[1], state)?;
                return Ok(None);
            }
        };

        Ok(Some(value))
    }
}

/// Program locals plus the spill slots written by a stack machine.
///
/// Every `store_local` executed by an instruction is appended to an ordered log, which makes
/// the observable effect of a block comparable across execution strategies. Slot traffic goes
/// through [`Locals::set_slot`] and is not logged.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Locals {
    values: BTreeMap<u32, Immediate>,
    log: Vec<(u32, Immediate)>,
}

impl Locals {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_values(values: impl IntoIterator<Item = (u32, Immediate)>) -> Self {
        Self {
            values: values.into_iter().collect(),
            log: Vec::new(),
        }
    }

    pub fn get(&self, local: u32) -> Option<Immediate> {
        self.values.get(&local).copied()
    }

    pub fn set_slot(&mut self, slot: u32, value: Immediate) {
        self.values.insert(slot, value);
    }

    pub fn get_slot(&self, slot: u32) -> Option<Immediate> {
        self.get(slot)
    }

    /// Ordered `(local, value)` pairs written by `store_local`.
    pub fn log(&self) -> &[(u32, Immediate)] {
        &self.log
    }

    /// The locals below `base`, i.e. those owned by the program rather than by spill slots.
    pub fn program_locals(&self, base: u32) -> BTreeMap<u32, Immediate> {
        self.values.range(..base).map(|(&k, &v)| (k, v)).collect()
    }
}

impl State for Locals {
    fn load_local(&mut self, local: u32) -> Immediate {
        self.get(local).unwrap_or_default()
    }

    fn store_local(&mut self, local: u32, value: Immediate) {
        self.values.insert(local, value);
        self.log.push((local, value));
    }
}

/// Evaluates `block` in position order and returns every instruction's result.
pub fn evaluate_block(
    block: &Block,
    state: &mut dyn State,
) -> Result<SecondaryMap<InstId, Option<Immediate>>, EvalError> {
    let mut results: SecondaryMap<InstId, Option<Immediate>> = SecondaryMap::new();
    let mut args = Vec::new();

    for (inst, data) in block.iter() {
        args.clear();
        for op in &data.operands {
            let value = match *op {
                Operand::Const(imm) => imm,
                Operand::Ref(arg) => {
                    if arg >= inst {
                        return Err(EvalError::Undefined(arg));
                    }
                    results[arg].ok_or(EvalError::Undefined(arg))?
                }
            };
            args.push(value);
        }
        results[inst] = data.opcode.interpret(&args, state)?;
    }

    Ok(results)
}
