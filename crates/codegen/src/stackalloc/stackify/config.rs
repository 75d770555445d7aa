use ir::{Block, Opcode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StackifyConfig {
    /// First spill slot number. The program's own locals are `0..local_base`.
    ///
    /// Emission raises it above every local the block names with a constant index.
    pub local_base: u32,
    /// Fuse a spill store that is immediately reloaded into `local.tee`.
    pub fuse_tee: bool,
}

impl StackifyConfig {
    pub fn for_locals(num_locals: u32) -> Self {
        Self {
            local_base: num_locals,
            ..Self::default()
        }
    }

    /// A config whose spill slots start above every local `block` names with a constant index.
    pub fn for_block(block: &Block) -> Self {
        let num_locals = block
            .iter()
            .filter(|(_, data)| matches!(data.opcode, Opcode::LoadLocal | Opcode::StoreLocal))
            .filter_map(|(_, data)| data.operands.first()?.as_imm())
            .filter_map(|local| u32::try_from(local).ok())
            .map(|local| local.saturating_add(1))
            .max()
            .unwrap_or(0);
        Self::for_locals(num_locals)
    }
}

impl Default for StackifyConfig {
    fn default() -> Self {
        Self {
            local_base: 0,
            fuse_tee: true,
        }
    }
}
