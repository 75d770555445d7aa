pub mod stackalloc;

pub use stackalloc::{
    stackify, stackify_with_trace, Boundary, ExprTree, Forest, Node, StackCode, StackOp,
    Stackified, StackifyConfig, StackifyError, UseCounts,
};
