//! Operand stack.

use crate::error::FaultKind;

/// LIFO of numeric values. Empty pops and peeks are faults, never defaults.
#[derive(Debug, Clone, Default)]
pub struct OperandStack {
    items: Vec<f64>,
}

impl OperandStack {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, value: f64) {
        self.items.push(value);
    }

    pub fn pop(&mut self) -> Result<f64, FaultKind> {
        self.items.pop().ok_or(FaultKind::StackUnderflow)
    }

    pub fn peek(&self) -> Result<f64, FaultKind> {
        self.items.last().copied().ok_or(FaultKind::StackUnderflow)
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Drop everything above `depth`. Used when unwinding to a handler.
    pub fn truncate(&mut self, depth: usize) {
        self.items.truncate(depth);
    }

    /// Contents, bottom first.
    pub fn as_slice(&self) -> &[f64] {
        &self.items
    }
}
