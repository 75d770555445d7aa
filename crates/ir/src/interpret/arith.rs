use super::EvalError;
use crate::{inst::Opcode, value::Immediate};

pub(super) fn eval(opcode: Opcode, args: &[Immediate]) -> Result<Immediate, EvalError> {
    if let &[arg] = args {
        debug_assert_eq!(opcode, Opcode::Neg);
        return Ok(arg.wrapping_neg());
    }

    let (lhs, rhs) = (args[0], args[1]);
    let value = match opcode {
        Opcode::Add => lhs.wrapping_add(rhs),
        Opcode::Sub => lhs.wrapping_sub(rhs),
        Opcode::Mul => lhs.wrapping_mul(rhs),
        Opcode::Sdiv => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs.wrapping_div(rhs)
        }
        Opcode::Smod => {
            if rhs == 0 {
                return Err(EvalError::DivisionByZero);
            }
            lhs.wrapping_rem(rhs)
        }
        _ => unreachable!("`{opcode}` is not an arithmetic op"),
    };

    Ok(value)
}
