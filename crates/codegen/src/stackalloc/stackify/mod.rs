mod config;
mod emit;
mod error;
mod fold;
mod slots;
mod trace;
mod tree;
mod uses;

use ir::Block;

pub use config::StackifyConfig;
pub use emit::StackCode;
pub use error::StackifyError;
pub use fold::Boundary;
pub use tree::{ExprTree, Forest, Node};
pub use uses::UseCounts;

use trace::StackifyTrace;

/// Both views of a stackified block.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stackified {
    pub uses: UseCounts,
    pub forest: Forest,
    pub code: StackCode,
}

/// Counts uses, then recovers the expression forest and emits the stack code of `block`.
pub fn stackify(block: &Block, config: &StackifyConfig) -> Result<Stackified, StackifyError> {
    let uses = UseCounts::compute(block)?;
    let forest = Forest::recover(block, &uses)?;
    let code = StackCode::emit(block, &uses, config)?;
    Ok(Stackified { uses, forest, code })
}

/// Like [`stackify`], and also renders a human-oriented trace of the emission decisions.
pub fn stackify_with_trace(
    block: &Block,
    config: &StackifyConfig,
) -> Result<(Stackified, String), StackifyError> {
    let uses = UseCounts::compute(block)?;
    let forest = Forest::recover(block, &uses)?;
    let mut trace = StackifyTrace::default();
    let code = StackCode::emit_with_observer(block, &uses, config, &mut trace)?;
    let trace = trace.render(&code);
    Ok((Stackified { uses, forest, code }, trace))
}
