use cranelift_entity::SecondaryMap;
use ir::{Block, InstData, InstId, Operand};

use super::StackifyError;

/// Number of `Ref` operands naming each instruction of a block.
///
/// A count of exactly one is necessary, but not sufficient, for a value to be folded into its
/// consumer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UseCounts {
    counts: SecondaryMap<InstId, u32>,
    len: usize,
}

impl UseCounts {
    /// Tallies the uses of every instruction, rejecting malformed instructions.
    pub fn compute(block: &Block) -> Result<Self, StackifyError> {
        let mut counts = SecondaryMap::with_capacity(block.len());
        for (inst, data) in block.iter() {
            verify_inst(block, inst, data)?;
            for arg in data.refs() {
                counts[arg] += 1;
            }
        }

        Ok(Self {
            counts,
            len: block.len(),
        })
    }

    pub fn get(&self, inst: InstId) -> u32 {
        self.counts[inst]
    }

    pub fn is_single_use(&self, inst: InstId) -> bool {
        self.get(inst) == 1
    }

    /// Number of instructions covered by the table.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn iter(&self) -> impl Iterator<Item = (InstId, u32)> + '_ {
        (0..self.len).map(|i| {
            let inst = InstId::from_u32(i as u32);
            (inst, self.get(inst))
        })
    }

    pub(super) fn check_block(&self, block: &Block) -> Result<(), StackifyError> {
        if self.len == block.len() {
            Ok(())
        } else {
            Err(StackifyError::UseTableMismatch {
                expected: block.len(),
                actual: self.len,
            })
        }
    }
}

/// Checks that operand `operand` of `inst` names a strictly earlier instruction.
pub(super) fn check_ref(inst: InstId, operand: usize, target: InstId) -> Result<(), StackifyError> {
    if target < inst {
        Ok(())
    } else {
        Err(StackifyError::InvalidReference {
            inst,
            operand,
            target,
        })
    }
}

fn verify_inst(block: &Block, inst: InstId, data: &InstData) -> Result<(), StackifyError> {
    let expected = data.opcode.arity();
    if data.operands.len() != expected {
        return Err(StackifyError::ArityMismatch {
            inst,
            opcode: data.opcode,
            expected,
            actual: data.operands.len(),
        });
    }

    for (operand, op) in data.operands.iter().enumerate() {
        let Operand::Ref(target) = *op else {
            continue;
        };
        check_ref(inst, operand, target)?;
        if !block[target].has_result() {
            return Err(StackifyError::VoidReference {
                inst,
                operand,
                target,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use ir::{BlockBuilder, Opcode};

    use super::*;

    #[test]
    fn counts_every_reference() {
        let mut b = BlockBuilder::new();
        let v0 = b.load_local(0);
        let v1 = b.add(v0, v0);
        let v2 = b.mul(v1, v0);
        let v3 = b.store_local(1, v2);
        let uses = UseCounts::compute(&b.build()).unwrap();

        assert_eq!(uses.get(v0), 3);
        assert_eq!(uses.get(v1), 1);
        assert_eq!(uses.get(v2), 1);
        assert_eq!(uses.get(v3), 0);
        assert_eq!(uses.len(), 4);
        assert_eq!(
            uses.iter().map(|(_, n)| n).collect::<Vec<_>>(),
            vec![3, 1, 1, 0]
        );
    }

    #[test]
    fn empty_block() {
        let uses = UseCounts::compute(&Block::new()).unwrap();
        assert!(uses.is_empty());
    }

    #[test]
    fn rejects_self_and_forward_references() {
        let mut block = Block::new();
        let v0 = block.make_inst(Opcode::Neg, [Operand::Const(1)]);
        let v1 = InstId::from_u32(1);
        block.make_inst(Opcode::Add, [Operand::Ref(v0), Operand::Ref(v1)]);

        assert_eq!(
            UseCounts::compute(&block),
            Err(StackifyError::InvalidReference {
                inst: v1,
                operand: 1,
                target: v1,
            })
        );

        let mut block = Block::new();
        block.make_inst(Opcode::Neg, [Operand::Ref(InstId::from_u32(5))]);
        assert!(matches!(
            UseCounts::compute(&block),
            Err(StackifyError::InvalidReference { .. })
        ));
    }

    #[test]
    fn rejects_void_references_and_bad_arity() {
        let mut b = BlockBuilder::new();
        let v0 = b.store_local(0, 1i64);
        let v1 = b.neg(v0);
        assert_eq!(
            UseCounts::compute(&b.build()),
            Err(StackifyError::VoidReference {
                inst: v1,
                operand: 0,
                target: v0,
            })
        );

        let mut block = Block::new();
        let v0 = block.make_inst(Opcode::Add, [Operand::Const(1)]);
        assert_eq!(
            UseCounts::compute(&block),
            Err(StackifyError::ArityMismatch {
                inst: v0,
                opcode: Opcode::Add,
                expected: 2,
                actual: 1,
            })
        );
    }
}
