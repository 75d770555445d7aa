use std::fmt;

use ir::{Block, Immediate, InstData, InstId, Opcode};

use super::{
    fold::{walk, Boundary, FoldVisitor},
    StackifyError, UseCounts,
};

/// A child of an [`ExprTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Const(Immediate),
    /// The root of another tree, whose value stays named.
    BackRef(InstId),
    Tree(Box<ExprTree>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExprTree {
    pub inst: InstId,
    pub opcode: Opcode,
    pub children: Vec<Node>,
}

impl ExprTree {
    /// Instructions covered by this tree, root first, in pre-order.
    pub fn insts(&self) -> Vec<InstId> {
        let mut insts = Vec::new();
        let mut stack = vec![self];
        while let Some(tree) = stack.pop() {
            insts.push(tree.inst);
            for child in tree.children.iter().rev() {
                if let Node::Tree(sub) = child {
                    stack.push(sub);
                }
            }
        }
        insts
    }

    /// Trees nested in this one, excluding itself.
    pub fn nested(&self) -> impl Iterator<Item = &ExprTree> {
        let mut stack: Vec<&ExprTree> = self.subtrees().collect();
        std::iter::from_fn(move || {
            let tree = stack.pop()?;
            stack.extend(tree.subtrees());
            Some(tree)
        })
    }

    /// Back-references made anywhere in this tree.
    pub fn back_refs(&self) -> Vec<InstId> {
        std::iter::once(self)
            .chain(self.nested())
            .flat_map(|tree| &tree.children)
            .filter_map(|child| match child {
                Node::BackRef(inst) => Some(*inst),
                _ => None,
            })
            .collect()
    }

    fn subtrees(&self) -> impl Iterator<Item = &ExprTree> {
        self.children.iter().filter_map(|child| match child {
            Node::Tree(sub) => Some(sub.as_ref()),
            _ => None,
        })
    }
}

/// The expression trees of a block, one per instruction that was not folded into another.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Forest {
    /// Trees in increasing root position.
    pub roots: Vec<ExprTree>,
}

impl Forest {
    pub fn recover(block: &Block, uses: &UseCounts) -> Result<Self, StackifyError> {
        let mut builder = TreeBuilder::default();
        walk(block, uses, &mut builder)?;

        let mut roots = builder.roots;
        roots.reverse();
        Ok(Self { roots })
    }

    pub fn roots(&self) -> &[ExprTree] {
        &self.roots
    }

    pub fn root(&self, inst: InstId) -> Option<&ExprTree> {
        self.roots
            .binary_search_by_key(&inst, |tree| tree.inst)
            .ok()
            .map(|idx| &self.roots[idx])
    }

    /// Every instruction of the block, each as it appears in the forest.
    pub fn covered(&self) -> Vec<InstId> {
        let mut insts: Vec<_> = self.roots.iter().flat_map(ExprTree::insts).collect();
        insts.sort_unstable();
        insts
    }
}

#[derive(Default)]
struct TreeBuilder {
    /// Open trees; children are collected right to left.
    open: Vec<ExprTree>,
    /// Finished roots, last root first.
    roots: Vec<ExprTree>,
}

impl FoldVisitor for TreeBuilder {
    fn enter(&mut self, inst: InstId, data: &InstData, _consumer: Option<InstId>) {
        self.open.push(ExprTree {
            inst,
            opcode: data.opcode,
            children: Vec::with_capacity(data.operands.len()),
        });
    }

    fn constant(&mut self, imm: Immediate) {
        self.push_child(Node::Const(imm));
    }

    fn reference(&mut self, _consumer: InstId, arg: InstId, _boundary: Boundary) {
        self.push_child(Node::BackRef(arg));
    }

    fn leave(&mut self, inst: InstId) {
        let Some(mut tree) = self.open.pop() else {
            unreachable!("`leave` without a matching `enter`");
        };
        debug_assert_eq!(tree.inst, inst);
        tree.children.reverse();

        if self.open.is_empty() {
            self.roots.push(tree);
        } else {
            self.push_child(Node::Tree(Box::new(tree)));
        }
    }
}

impl TreeBuilder {
    fn push_child(&mut self, node: Node) {
        let Some(parent) = self.open.last_mut() else {
            unreachable!("operand visited outside of an instruction");
        };
        parent.children.push(node);
    }
}

impl fmt::Display for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Const(imm) => write!(f, "{imm}"),
            Self::BackRef(inst) => write!(f, "{inst}"),
            Self::Tree(tree) => write!(f, "{tree}"),
        }
    }
}

impl fmt::Display for ExprTree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.opcode)?;
        for child in &self.children {
            write!(f, " {child}")?;
        }
        write!(f, ")")
    }
}

impl fmt::Display for Forest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for tree in &self.roots {
            writeln!(f, "{}: {tree}", tree.inst)?;
        }
        Ok(())
    }
}
