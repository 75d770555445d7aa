//! Text form of a block, the same syntax the parser accepts.
use std::fmt;

use crate::block::Block;

pub struct BlockWriter<'a> {
    block: &'a Block,
}

impl<'a> BlockWriter<'a> {
    pub fn new(block: &'a Block) -> Self {
        Self { block }
    }
}

impl fmt::Display for BlockWriter<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (inst, data) in self.block.iter() {
            if data.has_result() {
                write!(f, "{inst} = ")?;
            }
            writeln!(f, "{data}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", BlockWriter::new(self))
    }
}
