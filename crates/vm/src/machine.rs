//! VM state management: operand stack, variable and function tables, call
//! stack, exception handler stack.

use crate::error::FaultKind;
use crate::stack::OperandStack;
use chroma_common::Program;

/// Number of addressable variable and function slots.
pub const SLOT_COUNT: usize = 256;

/// An active TRY scope.
#[derive(Debug, Clone)]
pub(crate) struct Handler {
    /// Position of the scope's first CATCH clause.
    pub catch_pc: usize,
    /// Operand stack depth when TRY executed.
    pub stack_depth: usize,
    /// Call stack depth when TRY executed.
    pub call_depth: usize,
    /// Types declared by the most recently executed CATCH of this scope.
    /// Empty until a CATCH runs, and for catch-all clauses.
    pub accepts: Vec<u8>,
    /// Set once an exception has been routed into this scope's catch body.
    /// A catching scope never catches a second time.
    pub catching: bool,
}

/// The Chroma virtual machine.
///
/// All state is rebuilt at the start of every run, so one machine can run
/// any number of programs back to back. State from the last run stays
/// readable until the next one starts.
#[derive(Debug)]
pub struct VM {
    /// Operand stack.
    pub(crate) stack: OperandStack,
    /// Variable slots written by STORE.
    pub(crate) variables: [Option<f64>; SLOT_COUNT],
    /// Function entry positions registered by FUNC.
    pub(crate) functions: [Option<usize>; SLOT_COUNT],
    /// Return addresses pushed by CALL.
    pub(crate) call_stack: Vec<usize>,
    /// Open TRY scopes, innermost last.
    pub(crate) handlers: Vec<Handler>,
    /// Position of the next byte to read.
    pub(crate) pc: usize,
    /// Cleared by HALT and top-level RETURN.
    pub(crate) running: bool,
    /// Set while control is travelling to a resolved CATCH clause.
    pub(crate) unwinding: bool,
}

impl Default for VM {
    fn default() -> Self {
        Self::new()
    }
}

impl VM {
    /// Create a new VM with empty state.
    pub fn new() -> Self {
        Self {
            stack: OperandStack::new(),
            variables: [None; SLOT_COUNT],
            functions: [None; SLOT_COUNT],
            call_stack: Vec::new(),
            handlers: Vec::new(),
            pc: 0,
            running: false,
            unwinding: false,
        }
    }

    /// Reset every piece of mutable state for a fresh run.
    pub(crate) fn reset(&mut self) {
        self.stack.clear();
        self.variables = [None; SLOT_COUNT];
        self.functions = [None; SLOT_COUNT];
        self.call_stack.clear();
        self.handlers.clear();
        self.pc = 0;
        self.running = true;
        self.unwinding = false;
    }

    /// Advance past the operand byte at the current position and read it.
    ///
    /// The counter moves even when the operand is missing, so a fault
    /// reports the position the operand should have occupied.
    pub(crate) fn operand(&mut self, program: &Program) -> Result<u8, FaultKind> {
        self.pc += 1;
        program.get(self.pc - 1).ok_or(FaultKind::MissingOperand)
    }

    /// Operand stack contents, bottom first.
    pub fn stack(&self) -> &[f64] {
        self.stack.as_slice()
    }

    /// Value of a variable slot, if set.
    pub fn variable(&self, id: u8) -> Option<f64> {
        self.variables[usize::from(id)]
    }

    /// Entry position of a registered function, if any.
    pub fn function(&self, id: u8) -> Option<usize> {
        self.functions[usize::from(id)]
    }

    /// Number of TRY scopes still open.
    pub fn open_handlers(&self) -> usize {
        self.handlers.len()
    }

    /// Depth of the call stack.
    pub fn call_depth(&self) -> usize {
        self.call_stack.len()
    }
}
