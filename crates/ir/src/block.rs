//! This module contains the straight-line block consumed by the stackify pass.
use std::ops::Index;

use cranelift_entity::PrimaryMap;

use crate::{
    inst::{InstData, InstId, Opcode},
    value::Operand,
};

/// An ordered basic block of single-assignment instructions.
///
/// Construction performs no validation. Operands are expected to name strictly earlier
/// positions, but checking that is left to the consumer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Block {
    insts: PrimaryMap<InstId, InstData>,
}

impl Block {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, data: InstData) -> InstId {
        self.insts.push(data)
    }

    pub fn make_inst(
        &mut self,
        opcode: Opcode,
        operands: impl IntoIterator<Item = Operand>,
    ) -> InstId {
        self.push(InstData::new(opcode, operands))
    }

    pub fn inst(&self, inst: InstId) -> &InstData {
        &self.insts[inst]
    }

    pub fn len(&self) -> usize {
        self.insts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.insts.is_empty()
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = (InstId, &InstData)> {
        self.insts.iter()
    }

    pub fn inst_ids(&self) -> impl DoubleEndedIterator<Item = InstId> {
        self.insts.keys()
    }

    pub fn last_inst(&self) -> Option<InstId> {
        self.insts.keys().next_back()
    }
}

impl Index<InstId> for Block {
    type Output = InstData;

    fn index(&self, inst: InstId) -> &InstData {
        self.inst(inst)
    }
}
