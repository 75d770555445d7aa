//! A convenience front end for constructing blocks.
use crate::{
    block::Block,
    inst::{InstId, Opcode},
    value::{Immediate, Operand},
};

#[derive(Debug, Default)]
pub struct BlockBuilder {
    block: Block,
}

macro_rules! impl_unary {
    ($($name:ident => $opcode:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, arg: impl Into<Operand>) -> InstId {
                self.inst(Opcode::$opcode, [arg.into()])
            }
        )*
    };
}

macro_rules! impl_binary {
    ($($name:ident => $opcode:ident),* $(,)?) => {
        $(
            pub fn $name(&mut self, lhs: impl Into<Operand>, rhs: impl Into<Operand>) -> InstId {
                self.inst(Opcode::$opcode, [lhs.into(), rhs.into()])
            }
        )*
    };
}

impl BlockBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an instruction without checking its operands.
    pub fn inst(&mut self, opcode: Opcode, operands: impl IntoIterator<Item = Operand>) -> InstId {
        self.block.make_inst(opcode, operands)
    }

    impl_unary! {
        neg => Neg,
        not => Not,
        is_zero => IsZero,
    }

    impl_binary! {
        add => Add,
        sub => Sub,
        mul => Mul,
        sdiv => Sdiv,
        smod => Smod,
        shl => Shl,
        shr => Shr,
        and => And,
        or => Or,
        xor => Xor,
        eq => Eq,
        ne => Ne,
        lt => Lt,
        gt => Gt,
        le => Le,
        ge => Ge,
    }

    pub fn select(
        &mut self,
        cond: impl Into<Operand>,
        then: impl Into<Operand>,
        els: impl Into<Operand>,
    ) -> InstId {
        self.inst(Opcode::Select, [cond.into(), then.into(), els.into()])
    }

    pub fn load_local(&mut self, local: Immediate) -> InstId {
        self.inst(Opcode::LoadLocal, [Operand::Const(local)])
    }

    pub fn store_local(&mut self, local: Immediate, value: impl Into<Operand>) -> InstId {
        self.inst(Opcode::StoreLocal, [Operand::Const(local), value.into()])
    }

    pub fn build(self) -> Block {
        self.block
    }
}
