use crate::bytecode::Instructions;
use crate::object::Closure;

/// An active call: the closure being executed, the instruction pointer into
/// its buffer, and the stack index where its locals start.
#[derive(Debug)]
pub(super) struct Frame {
    pub closure: Closure,
    pub ip: usize,
    pub base_pointer: usize,
}

impl Frame {
    pub fn new(closure: Closure, base_pointer: usize) -> Frame {
        Frame {
            closure,
            ip: 0,
            base_pointer,
        }
    }

    pub fn instructions(&self) -> &Instructions {
        &self.closure.func.instructions
    }
}
