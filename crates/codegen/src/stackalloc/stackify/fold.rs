//! The folding policy shared by tree recovery and stack emission.
use std::fmt;

use ir::{Block, Immediate, InstData, InstId, Operand};

use super::{uses::check_ref, StackifyError, UseCounts};

/// Why an operand stays a named value instead of being folded into its consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Boundary {
    /// An operand to the right was not folded.
    Stopped,
    /// The value has this many uses.
    MultiUse(u32),
    /// The value is not defined right before the run already folded into the consumer.
    NotAdjacent,
}

impl fmt::Display for Boundary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Stopped => write!(f, "stopped"),
            Self::MultiUse(n) => write!(f, "{n} uses"),
            Self::NotAdjacent => write!(f, "not adjacent"),
        }
    }
}

pub(super) enum Fold {
    Inline,
    Reference(Boundary),
}

/// Tracks the lowest position claimed by the root currently being closed out.
///
/// Folding only ever claims the position right below `low`, so the instructions folded into a
/// root always form a contiguous run ending at the root.
pub(super) struct FoldCursor<'a> {
    uses: &'a UseCounts,
    low: InstId,
}

impl<'a> FoldCursor<'a> {
    pub(super) fn new(uses: &'a UseCounts, root: InstId) -> Self {
        Self { uses, low: root }
    }

    /// `stopped` is the flag of the consumer whose operand `arg` is; it is set once an operand
    /// stays named and never cleared.
    pub(super) fn decide(&mut self, arg: InstId, stopped: &mut bool) -> Fold {
        let boundary = if *stopped {
            Boundary::Stopped
        } else if !self.uses.is_single_use(arg) {
            Boundary::MultiUse(self.uses.get(arg))
        } else if arg.as_u32() + 1 != self.low.as_u32() {
            Boundary::NotAdjacent
        } else {
            self.low = arg;
            return Fold::Inline;
        };

        *stopped = true;
        Fold::Reference(boundary)
    }

    /// The next root candidate: the position right below everything claimed so far.
    pub(super) fn next_root(&self) -> Option<InstId> {
        self.low.as_u32().checked_sub(1).map(InstId::from_u32)
    }
}

/// Receives the traversal of [`walk`].
///
/// Events arrive in backward order: roots from last to first, and within an instruction its
/// operands from right to left. `leave` is called once all operands have been visited.
pub(super) trait FoldVisitor {
    /// `consumer` is the instruction `inst` is folded into, or `None` for a root.
    fn enter(&mut self, inst: InstId, data: &InstData, consumer: Option<InstId>);

    fn constant(&mut self, imm: Immediate);

    fn reference(&mut self, consumer: InstId, arg: InstId, boundary: Boundary);

    fn leave(&mut self, inst: InstId);
}

struct Frame {
    inst: InstId,
    remaining: usize,
    stopped: bool,
}

/// Walks `block` from its last instruction to its first, folding operands per the policy of
/// [`FoldCursor`].
///
/// Uses an explicit frame stack, so the block length is not bounded by the native call stack.
pub(super) fn walk<V: FoldVisitor>(
    block: &Block,
    uses: &UseCounts,
    visitor: &mut V,
) -> Result<(), StackifyError> {
    uses.check_block(block)?;

    let mut next = block.last_inst();
    let mut stack: Vec<Frame> = Vec::new();

    while let Some(root) = next {
        let mut cursor = FoldCursor::new(uses, root);
        visitor.enter(root, &block[root], None);
        stack.push(Frame {
            inst: root,
            remaining: block[root].operands.len(),
            stopped: false,
        });

        while let Some(frame) = stack.last_mut() {
            if frame.remaining == 0 {
                visitor.leave(frame.inst);
                stack.pop();
                continue;
            }

            frame.remaining -= 1;
            let consumer = frame.inst;
            let operand = frame.remaining;
            match block[consumer].operands[operand] {
                Operand::Const(imm) => visitor.constant(imm),
                Operand::Ref(arg) => {
                    check_ref(consumer, operand, arg)?;
                    match cursor.decide(arg, &mut frame.stopped) {
                        Fold::Inline => {
                            tracing::trace!(%consumer, %arg, "fold");
                            visitor.enter(arg, &block[arg], Some(consumer));
                            stack.push(Frame {
                                inst: arg,
                                remaining: block[arg].operands.len(),
                                stopped: false,
                            });
                        }
                        Fold::Reference(boundary) => {
                            tracing::trace!(%consumer, %arg, %boundary, "keep named");
                            visitor.reference(consumer, arg, boundary);
                        }
                    }
                }
            }
        }

        next = cursor.next_root();
    }

    Ok(())
}
