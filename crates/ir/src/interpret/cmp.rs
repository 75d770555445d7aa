use crate::{inst::Opcode, value::Immediate};

pub(super) fn eval(opcode: Opcode, args: &[Immediate]) -> Immediate {
    let (lhs, rhs) = (args[0], args[1]);
    let holds = match opcode {
        Opcode::Eq => lhs == rhs,
        Opcode::Ne => lhs != rhs,
        Opcode::Lt => lhs < rhs,
        Opcode::Gt => lhs > rhs,
        Opcode::Le => lhs <= rhs,
        Opcode::Ge => lhs >= rhs,
        _ => unreachable!("`{opcode}` is not a comparison"),
    };
    holds as Immediate
}
