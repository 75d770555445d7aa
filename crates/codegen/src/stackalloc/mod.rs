//! Conversion of a straight-line block into stack-machine form.
//!
//! - Every instruction whose result is used exactly once, by the instruction being closed out,
//!   and which sits immediately before the run already folded into that instruction, is
//!   computed in place instead of being named.
//! - Scanning a consumer's operands right to left, the first operand that cannot be folded
//!   stops folding for every operand to its left. Folding any of them would move its
//!   evaluation after the unfolded operand.
//! - Values that stay named are spilled to local slots allocated on first use. A spill store
//!   directly followed by a reload of the same slot becomes a single `local.tee`.
//!
//! The same decisions yield two views of a block: a [`Forest`] of expression trees and a flat
//! [`StackCode`] sequence.

use std::fmt;

use ir::{Immediate, Opcode};

mod stackify;

pub use stackify::{
    stackify, stackify_with_trace, Boundary, ExprTree, Forest, Node, StackCode, Stackified,
    StackifyConfig, StackifyError, UseCounts,
};

/// A single stack-machine operation.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum StackOp {
    /// Push an immediate.
    Push(Immediate),
    /// Pop the opcode's operands (leftmost deepest) and push its result, if any.
    Inst(Opcode),
    LocalGet(u32),
    LocalSet(u32),
    /// Store the top of the stack to a slot without popping it.
    LocalTee(u32),
    Drop,
}

impl StackOp {
    /// Number of values popped and pushed by this operation.
    pub fn stack_effect(self) -> (usize, usize) {
        match self {
            Self::Push(_) | Self::LocalGet(_) => (0, 1),
            Self::Inst(opcode) => (opcode.arity(), opcode.has_result() as usize),
            Self::LocalSet(_) | Self::Drop => (1, 0),
            Self::LocalTee(_) => (1, 1),
        }
    }

    pub fn is_local_access(self) -> bool {
        matches!(self, Self::LocalGet(_) | Self::LocalSet(_) | Self::LocalTee(_))
    }
}

impl fmt::Display for StackOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Push(imm) => write!(f, "push {imm}"),
            Self::Inst(opcode) => write!(f, "{opcode}"),
            Self::LocalGet(slot) => write!(f, "local.get {slot}"),
            Self::LocalSet(slot) => write!(f, "local.set {slot}"),
            Self::LocalTee(slot) => write!(f, "local.tee {slot}"),
            Self::Drop => write!(f, "drop"),
        }
    }
}
