use std::{fmt, str::FromStr};

use thiserror::Error;

/// Operation performed by an instruction.
///
/// Each opcode has a fixed arity; `store_local` is the only opcode without a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Opcode {
    Neg,
    Not,
    IsZero,

    Add,
    Sub,
    Mul,
    Sdiv,
    Smod,
    Shl,
    Shr,

    And,
    Or,
    Xor,

    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,

    /// `select cond, then, else`
    Select,

    /// `load_local index`
    LoadLocal,
    /// `store_local index, value`
    StoreLocal,
}

impl Opcode {
    pub const ALL: [Opcode; 22] = [
        Self::Neg,
        Self::Not,
        Self::IsZero,
        Self::Add,
        Self::Sub,
        Self::Mul,
        Self::Sdiv,
        Self::Smod,
        Self::Shl,
        Self::Shr,
        Self::And,
        Self::Or,
        Self::Xor,
        Self::Eq,
        Self::Ne,
        Self::Lt,
        Self::Gt,
        Self::Le,
        Self::Ge,
        Self::Select,
        Self::LoadLocal,
        Self::StoreLocal,
    ];

    pub fn arity(self) -> usize {
        match self {
            Self::Neg | Self::Not | Self::IsZero | Self::LoadLocal => 1,
            Self::Select => 3,
            _ => 2,
        }
    }

    pub fn has_result(self) -> bool {
        !matches!(self, Self::StoreLocal)
    }

    pub fn as_text(self) -> &'static str {
        match self {
            Self::Neg => "neg",
            Self::Not => "not",
            Self::IsZero => "is_zero",
            Self::Add => "add",
            Self::Sub => "sub",
            Self::Mul => "mul",
            Self::Sdiv => "sdiv",
            Self::Smod => "smod",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::And => "and",
            Self::Or => "or",
            Self::Xor => "xor",
            Self::Eq => "eq",
            Self::Ne => "ne",
            Self::Lt => "lt",
            Self::Gt => "gt",
            Self::Le => "le",
            Self::Ge => "ge",
            Self::Select => "select",
            Self::LoadLocal => "load_local",
            Self::StoreLocal => "store_local",
        }
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_text())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown opcode `{0}`")]
pub struct UnknownOpcode(pub String);

impl FromStr for Opcode {
    type Err = UnknownOpcode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.as_text() == s)
            .ok_or_else(|| UnknownOpcode(s.to_string()))
    }
}
