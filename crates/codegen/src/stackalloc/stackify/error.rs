use ir::{InstId, Opcode};
use thiserror::Error;

/// A malformed block. Empty blocks are not an error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StackifyError {
    #[error("operand {operand} of `{inst}` refers to `{target}`, which is not defined before it")]
    InvalidReference {
        inst: InstId,
        operand: usize,
        target: InstId,
    },

    #[error("operand {operand} of `{inst}` refers to `{target}`, which has no result")]
    VoidReference {
        inst: InstId,
        operand: usize,
        target: InstId,
    },

    #[error("`{inst}` (`{opcode}`) expects {expected} operands, but {actual} given")]
    ArityMismatch {
        inst: InstId,
        opcode: Opcode,
        expected: usize,
        actual: usize,
    },

    #[error("use table covers {actual} instructions, but the block has {expected}")]
    UseTableMismatch { expected: usize, actual: usize },
}
