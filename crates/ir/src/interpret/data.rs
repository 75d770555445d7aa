use super::{EvalError, State};
use crate::value::Immediate;

fn local_index(local: Immediate) -> Result<u32, EvalError> {
    u32::try_from(local).map_err(|_| EvalError::InvalidLocal(local))
}

pub(super) fn load_local(local: Immediate, state: &mut dyn State) -> Result<Immediate, EvalError> {
    Ok(state.load_local(local_index(local)?))
}

pub(super) fn store_local(
    local: Immediate,
    value: Immediate,
    state: &mut dyn State,
) -> Result<(), EvalError> {
    state.store_local(local_index(local)?, value);
    Ok(())
}
