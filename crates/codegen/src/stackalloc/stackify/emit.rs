use std::fmt;

use cranelift_entity::SecondaryMap;
use ir::{Block, Immediate, InstData, InstId};

use super::{
    fold::{walk, Boundary, FoldVisitor},
    slots::SlotState,
    trace::{NullObserver, StackifyObserver},
    StackifyConfig, StackifyError, UseCounts,
};
use crate::stackalloc::StackOp;

/// A block lowered to stack-machine operations, in execution order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackCode {
    pub ops: Vec<StackOp>,
    /// Instruction -> spill slot, for every value that stayed named.
    pub slot_of: SecondaryMap<InstId, Option<u32>>,
    pub local_base: u32,
    /// Number of spill slots used, starting at `local_base`.
    pub frame_size_slots: u32,
}

impl StackCode {
    pub fn emit(
        block: &Block,
        uses: &UseCounts,
        config: &StackifyConfig,
    ) -> Result<Self, StackifyError> {
        Self::emit_with_observer(block, uses, config, &mut NullObserver)
    }

    pub(super) fn emit_with_observer<O: StackifyObserver>(
        block: &Block,
        uses: &UseCounts,
        config: &StackifyConfig,
        observer: &mut O,
    ) -> Result<Self, StackifyError> {
        // Spill slots never share a number with a local the block names itself.
        let local_base = config
            .local_base
            .max(StackifyConfig::for_block(block).local_base);
        let mut emitter = Emitter {
            uses,
            config,
            slots: SlotState::new(local_base),
            rev_ops: Vec::new(),
            observer,
        };
        walk(block, uses, &mut emitter)?;

        let Emitter {
            mut slots,
            mut rev_ops,
            ..
        } = emitter;
        rev_ops.reverse();

        Ok(Self {
            ops: rev_ops,
            frame_size_slots: slots.frame_size_slots(),
            slot_of: slots.take_slot_map(),
            local_base,
        })
    }

    pub fn ops(&self) -> &[StackOp] {
        &self.ops
    }

    pub fn slot_of(&self, inst: InstId) -> Option<u32> {
        self.slot_of[inst]
    }

    /// Deepest evaluation stack reached while running the sequence from an empty stack.
    pub fn max_stack_depth(&self) -> usize {
        let mut depth = 0usize;
        let mut max = 0;
        for op in &self.ops {
            let (pops, pushes) = op.stack_effect();
            depth = depth.saturating_sub(pops) + pushes;
            max = max.max(depth);
        }
        max
    }
}

impl fmt::Display for StackCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for op in &self.ops {
            writeln!(f, "{op}")?;
        }
        Ok(())
    }
}

/// Builds the operation sequence back to front.
///
/// Events arrive last instruction first, so pushing onto `rev_ops` yields the reversed
/// execution order; the last pushed op is the one executed right after the current point.
struct Emitter<'a, O> {
    uses: &'a UseCounts,
    config: &'a StackifyConfig,
    slots: SlotState,
    rev_ops: Vec<StackOp>,
    observer: &'a mut O,
}

impl<O: StackifyObserver> FoldVisitor for Emitter<'_, O> {
    fn enter(&mut self, inst: InstId, data: &InstData, consumer: Option<InstId>) {
        match consumer {
            Some(consumer) => self.observer.on_fold(consumer, inst),
            None => self.observer.on_root(inst),
        }

        if let Some(slot) = self.slots.slot_of(inst) {
            self.store_result(inst, slot);
        } else if data.has_result() && self.uses.get(inst) == 0 {
            self.rev_ops.push(StackOp::Drop);
            self.observer.on_drop(inst);
        }
        self.rev_ops.push(StackOp::Inst(data.opcode));
    }

    fn constant(&mut self, imm: Immediate) {
        self.rev_ops.push(StackOp::Push(imm));
    }

    fn reference(&mut self, consumer: InstId, arg: InstId, boundary: Boundary) {
        let (slot, fresh) = self.slots.ensure_slot(arg);
        if fresh {
            tracing::debug!(inst = %arg, slot, "allocate spill slot");
            self.observer.on_slot(arg, slot);
        }
        self.observer.on_reference(consumer, arg, boundary);
        self.rev_ops.push(StackOp::LocalGet(slot));
    }

    fn leave(&mut self, _inst: InstId) {}
}

impl<O: StackifyObserver> Emitter<'_, O> {
    /// Stores the result of `inst`, just produced, to its slot.
    fn store_result(&mut self, inst: InstId, slot: u32) {
        let reload = StackOp::LocalGet(slot);
        match self.rev_ops.last_mut() {
            Some(next) if self.config.fuse_tee && *next == reload => {
                *next = StackOp::LocalTee(slot);
                self.observer.on_store(inst, slot, true);
            }
            _ => {
                self.rev_ops.push(StackOp::LocalSet(slot));
                self.observer.on_store(inst, slot, false);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use ir::BlockBuilder;

    use super::*;

    fn emit(block: &Block, config: &StackifyConfig) -> StackCode {
        let uses = UseCounts::compute(block).unwrap();
        StackCode::emit(block, &uses, config).unwrap()
    }

    fn increment_block(extra_use: bool) -> Block {
        let mut b = BlockBuilder::new();
        let v0 = b.load_local(0);
        let v1 = b.add(v0, 1i64);
        let v2 = b.add(2i64, 3i64);
        let v3 = b.add(v1, v2);
        b.store_local(0, v3);
        if extra_use {
            b.store_local(1, v1);
        }
        b.build()
    }

    #[test]
    fn single_use_chain_needs_no_spills() {
        let code = emit(&increment_block(false), &StackifyConfig::for_locals(2));
        insta::assert_snapshot!(code, @r"
        push 0
        push 0
        load_local
        push 1
        add
        push 2
        push 3
        add
        add
        store_local
        ");
        assert!(!code.ops.iter().any(|op| op.is_local_access()));
        assert_eq!(code.frame_size_slots, 0);
        assert_eq!(code.max_stack_depth(), 4);
    }

    #[test]
    fn multi_use_value_is_spilled() {
        let block = increment_block(true);
        let code = emit(&block, &StackifyConfig::for_locals(2));
        insta::assert_snapshot!(code, @r"
        push 0
        load_local
        push 1
        add
        local.set 2
        push 0
        local.get 2
        push 2
        push 3
        add
        add
        store_local
        push 1
        local.get 2
        store_local
        ");
        assert_eq!(code.slot_of(InstId::from_u32(1)), Some(2));
        assert_eq!(code.frame_size_slots, 1);
    }

    #[test]
    fn multi_use_rightmost_operand_keeps_siblings_named() {
        // `v2` is also stored to local 1. `v1` is single use and adjacent, but stays named
        // because `v2` to its right does.
        let mut b = BlockBuilder::new();
        let v0 = b.load_local(0);
        let v1 = b.add(v0, 1i64);
        let v2 = b.add(2i64, 3i64);
        let v3 = b.add(v1, v2);
        b.store_local(0, v3);
        b.store_local(1, v2);
        let block = b.build();

        let code = emit(&block, &StackifyConfig::for_locals(2));
        insta::assert_snapshot!(code, @r"
        push 0
        load_local
        push 1
        add
        local.set 3
        push 2
        push 3
        add
        local.set 2
        push 0
        local.get 3
        local.get 2
        add
        store_local
        push 1
        local.get 2
        store_local
        ");
        assert_eq!(code.slot_of(v2), Some(2));
        assert_eq!(code.slot_of(v1), Some(3));
        assert_eq!(code.slot_of(v0), None);
        assert!(!code.ops.iter().any(|op| matches!(op, StackOp::LocalTee(_))));
        assert_eq!(code.frame_size_slots, 2);
    }

    #[test]
    fn spill_slots_skip_named_locals() {
        let mut b = BlockBuilder::new();
        let v0 = b.load_local(0);
        b.store_local(0, 5i64);
        b.store_local(1, v0);
        let block = b.build();

        let code = emit(&block, &StackifyConfig::default());
        insta::assert_snapshot!(code, @r"
        push 0
        load_local
        local.set 2
        push 0
        push 5
        store_local
        push 1
        local.get 2
        store_local
        ");
        assert_eq!(code.local_base, 2);
        assert_eq!(code.slot_of(v0), Some(2));
    }

    #[test]
    fn immediate_reload_becomes_tee() {
        let mut b = BlockBuilder::new();
        let v0 = b.load_local(0);
        let v1 = b.mul(v0, v0);
        b.sub(v1, 1i64);
        let block = b.build();

        let code = emit(&block, &StackifyConfig::for_locals(1));
        insta::assert_snapshot!(code, @r"
        push 0
        load_local
        local.tee 1
        local.get 1
        mul
        push 1
        sub
        drop
        ");

        let config = StackifyConfig {
            fuse_tee: false,
            ..StackifyConfig::for_locals(1)
        };
        let unfused = emit(&block, &config);
        assert_eq!(
            unfused.ops[2..4],
            [StackOp::LocalSet(1), StackOp::LocalGet(1)]
        );
        assert_eq!(unfused.ops.len(), code.ops.len() + 1);
    }

    #[test]
    fn pushes_between_store_and_reload_prevent_fusion() {
        let mut b = BlockBuilder::new();
        let v0 = b.load_local(0);
        let v1 = b.add(7i64, v0);
        b.store_local(1, v1);
        b.store_local(2, v0);
        let block = b.build();

        let code = emit(&block, &StackifyConfig::for_locals(3));
        insta::assert_snapshot!(code, @r"
        push 0
        load_local
        local.set 3
        push 1
        push 7
        local.get 3
        add
        store_local
        push 2
        local.get 3
        store_local
        ");
    }

    #[test]
    fn unused_result_is_dropped() {
        let mut b = BlockBuilder::new();
        b.add(1i64, 2i64);
        b.store_local(0, 3i64);
        let code = emit(&b.build(), &StackifyConfig::default());
        insta::assert_snapshot!(code, @r"
        push 1
        push 2
        add
        drop
        push 0
        push 3
        store_local
        ");
    }

    #[test]
    fn empty_block_emits_nothing() {
        let code = emit(&Block::new(), &StackifyConfig::default());
        assert!(code.ops.is_empty());
        assert_eq!(code.max_stack_depth(), 0);
    }
}
