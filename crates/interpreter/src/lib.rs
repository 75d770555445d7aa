//! A small operand-stack machine for stackified blocks.
//!
//! Program locals and spill slots share one [`ir::interpret::Locals`] store. Only
//! `store_local` instructions are logged, so a run can be compared against
//! [`ir::interpret::evaluate_block`] on the same initial locals.
mod machine;

pub use machine::{Machine, MachineError};
