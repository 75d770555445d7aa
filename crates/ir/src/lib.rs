pub mod block;
pub mod builder;
pub mod inst;
pub mod interpret;
pub mod ir_writer;
pub mod value;

pub use block::Block;
pub use builder::BlockBuilder;
pub use inst::{InstData, InstId, Opcode};
pub use value::{Immediate, Operand};
