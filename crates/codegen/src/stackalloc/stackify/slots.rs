use cranelift_entity::SecondaryMap;
use ir::InstId;

/// Spill slot assignment for one block.
///
/// Slots are handed out lazily, the first time a value has to be referenced by name, and are
/// never reused within the block.
#[derive(Debug, Clone)]
pub(super) struct SlotState {
    slot_of: SecondaryMap<InstId, Option<u32>>,
    base: u32,
    next_slot: u32,
}

impl SlotState {
    pub(super) fn new(base: u32) -> Self {
        Self {
            slot_of: SecondaryMap::new(),
            base,
            next_slot: base,
        }
    }

    pub(super) fn frame_size_slots(&self) -> u32 {
        self.next_slot - self.base
    }

    pub(super) fn slot_of(&self, inst: InstId) -> Option<u32> {
        self.slot_of[inst]
    }

    /// Return the slot for `inst`, allocating one if needed. The flag is `true` for a fresh
    /// allocation.
    pub(super) fn ensure_slot(&mut self, inst: InstId) -> (u32, bool) {
        if let Some(slot) = self.slot_of[inst] {
            return (slot, false);
        }

        let slot = self.next_slot;
        self.next_slot = self
            .next_slot
            .checked_add(1)
            .expect("frame slot index overflow");
        self.slot_of[inst] = Some(slot);
        (slot, true)
    }

    pub(super) fn take_slot_map(&mut self) -> SecondaryMap<InstId, Option<u32>> {
        std::mem::take(&mut self.slot_of)
    }
}
