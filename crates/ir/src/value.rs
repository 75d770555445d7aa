//! This module contains the operand encoding of a block instruction.
use std::fmt;

use crate::inst::InstId;

/// Literal carried by a [`Operand::Const`].
pub type Immediate = i64;

/// An instruction operand.
///
/// Operands either name the result of an earlier instruction of the same block or carry an
/// immediate literal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operand {
    /// The result of the instruction at the given position.
    Ref(InstId),
    /// An immediate literal.
    Const(Immediate),
}

impl Operand {
    pub fn as_inst(self) -> Option<InstId> {
        match self {
            Self::Ref(inst) => Some(inst),
            Self::Const(_) => None,
        }
    }

    pub fn as_imm(self) -> Option<Immediate> {
        match self {
            Self::Const(imm) => Some(imm),
            Self::Ref(_) => None,
        }
    }
}

impl From<InstId> for Operand {
    fn from(inst: InstId) -> Self {
        Self::Ref(inst)
    }
}

impl From<Immediate> for Operand {
    fn from(imm: Immediate) -> Self {
        Self::Const(imm)
    }
}

impl fmt::Display for Operand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ref(inst) => write!(f, "{inst}"),
            Self::Const(imm) => write!(f, "{imm}"),
        }
    }
}
