mod opcode;

use std::fmt;

use cranelift_entity::entity_impl;
use smallvec::SmallVec;

use crate::value::Operand;

pub use opcode::{Opcode, UnknownOpcode};

/// Position of an instruction within its block.
///
/// An instruction's result has no identity of its own: it is named by the position of the
/// instruction that produces it.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InstId(u32);
entity_impl!(InstId, "v");

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InstData {
    pub opcode: Opcode,
    pub operands: SmallVec<[Operand; 3]>,
}

impl InstData {
    pub fn new(opcode: Opcode, operands: impl IntoIterator<Item = Operand>) -> Self {
        Self {
            opcode,
            operands: operands.into_iter().collect(),
        }
    }

    pub fn has_result(&self) -> bool {
        self.opcode.has_result()
    }

    /// Iterates over the instructions referenced by this instruction, left to right.
    pub fn refs(&self) -> impl Iterator<Item = InstId> + '_ {
        self.operands.iter().filter_map(|op| op.as_inst())
    }
}

impl fmt::Display for InstData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.opcode)?;
        for (i, op) in self.operands.iter().enumerate() {
            let delim = if i == 0 { " " } else { ", " };
            write!(f, "{delim}{op}")?;
        }
        Ok(())
    }
}
