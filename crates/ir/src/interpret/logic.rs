use crate::{inst::Opcode, value::Immediate};

pub(super) fn eval(opcode: Opcode, args: &[Immediate]) -> Immediate {
    match (opcode, args) {
        (Opcode::Not, &[arg]) => !arg,
        (Opcode::IsZero, &[arg]) => (arg == 0) as Immediate,
        (Opcode::Shl, &[lhs, rhs]) => lhs.wrapping_shl(rhs as u32),
        (Opcode::Shr, &[lhs, rhs]) => lhs.wrapping_shr(rhs as u32),
        (Opcode::And, &[lhs, rhs]) => lhs & rhs,
        (Opcode::Or, &[lhs, rhs]) => lhs | rhs,
        (Opcode::Xor, &[lhs, rhs]) => lhs ^ rhs,
        (Opcode::Select, &[cond, then, els]) => {
            if cond != 0 {
                then
            } else {
                els
            }
        }
        _ => unreachable!("`{opcode}` is not a logic op"),
    }
}
