//! Structured exception handling: TRY/CATCH/END_TRY and raising.
//!
//! Scope boundaries are found by scanning forward over the immutable byte
//! stream with a nesting counter. The scans step instruction by instruction
//! (see [`Program::step`]), so operand bytes are never mistaken for
//! opcodes.

use chroma_common::{ExceptionType, Opcode, Program};
use tracing::debug;

use crate::error::FaultKind;
use crate::machine::{Handler, VM};

const TRY: u8 = Opcode::Try as u8;
const CATCH: u8 = Opcode::Catch as u8;
const END_TRY: u8 = Opcode::EndTry as u8;
const RETURN: u8 = Opcode::Return as u8;

/// Position of the first RETURN at or after `from`.
pub fn find_return(program: &Program, from: usize) -> Option<usize> {
    let mut pc = from;
    while let Some(byte) = program.get(pc) {
        if byte == RETURN {
            return Some(pc);
        }
        pc = program.step(pc);
    }
    None
}

/// Position of the CATCH that belongs to the scope opened just before
/// `from`.
///
/// Nested scopes are skipped. An END_TRY that closes this scope before any
/// CATCH means the scope has none.
pub fn find_catch(program: &Program, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pc = from;
    while let Some(byte) = program.get(pc) {
        match byte {
            TRY => depth += 1,
            END_TRY if depth == 0 => return None,
            END_TRY => depth -= 1,
            CATCH if depth == 0 => return Some(pc),
            _ => {}
        }
        pc = program.step(pc);
    }
    None
}

/// Position of the next CATCH or END_TRY of the current scope at or after
/// `from`.
pub fn find_clause_end(program: &Program, from: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut pc = from;
    while let Some(byte) = program.get(pc) {
        match byte {
            TRY => depth += 1,
            CATCH | END_TRY if depth == 0 => return Some(pc),
            END_TRY => depth -= 1,
            _ => {}
        }
        pc = program.step(pc);
    }
    None
}

/// Walk the catch clauses of one scope, starting at its first CATCH, and
/// return the first clause that accepts `raised`.
///
/// A clause with no declared types accepts everything. `Ok(None)` means
/// the scope's END_TRY was reached without a match.
pub fn resolve_catch(
    program: &Program,
    catch_pc: usize,
    raised: ExceptionType,
) -> Result<Option<usize>, FaultKind> {
    let mut pc = catch_pc;
    loop {
        let count = usize::from(program.get(pc + 1).ok_or(FaultKind::MissingOperand)?);
        if count == 0 {
            return Ok(Some(pc));
        }
        for offset in 0..count {
            let declared = program
                .get(pc + 2 + offset)
                .ok_or(FaultKind::MissingOperand)?;
            if declared == raised.code() {
                return Ok(Some(pc));
            }
        }

        let next = find_clause_end(program, program.step(pc))
            .ok_or(FaultKind::MissingCatchOrEndTry)?;
        if program.get(next) == Some(END_TRY) {
            return Ok(None);
        }
        pc = next;
    }
}

impl VM {
    /// TRY: open a scope whose first catch clause is located ahead of time.
    pub(crate) fn exec_try(&mut self, program: &Program) -> Result<(), FaultKind> {
        let catch_pc = find_catch(program, self.pc).ok_or(FaultKind::MissingCatch)?;
        self.handlers.push(Handler {
            catch_pc,
            stack_depth: self.stack.len(),
            call_depth: self.call_stack.len(),
            accepts: Vec::new(),
            catching: false,
        });
        Ok(())
    }

    /// CATCH count type*: enter the body when an unwind targeted this
    /// clause, otherwise jump to the next clause or END_TRY.
    pub(crate) fn exec_catch(&mut self, program: &Program) -> Result<(), FaultKind> {
        if self.handlers.is_empty() {
            return Err(FaultKind::MisplacedCatch);
        }

        let count = self.operand(program)?;
        let mut accepts = Vec::with_capacity(usize::from(count));
        for _ in 0..count {
            accepts.push(self.operand(program)?);
        }

        let unwinding = self.unwinding;
        let Some(handler) = self.handlers.last_mut() else {
            return Err(FaultKind::MisplacedCatch);
        };
        handler.accepts = accepts;

        if unwinding {
            debug!(pc = self.pc, accepts = ?handler.accepts, "entering catch body");
            self.unwinding = false;
        } else {
            self.pc = find_clause_end(program, self.pc).ok_or(FaultKind::MissingCatchOrEndTry)?;
        }
        Ok(())
    }

    /// END_TRY: close the innermost scope.
    pub(crate) fn exec_end_try(&mut self) {
        self.handlers.pop();
        self.unwinding = false;
    }

    /// Route a raised exception to the innermost handler that accepts it.
    ///
    /// Handlers that do not accept it are discarded on the way out. On a
    /// match the operand and call stacks are cut back to their depths at
    /// TRY time and execution resumes at the matching CATCH.
    pub(crate) fn raise(
        &mut self,
        program: &Program,
        exception: ExceptionType,
    ) -> Result<(), FaultKind> {
        debug!(exception = %exception, pc = self.pc, "raise");

        while let Some(handler) = self.handlers.last_mut() {
            if !handler.catching {
                if let Some(target) = resolve_catch(program, handler.catch_pc, exception)? {
                    handler.catching = true;
                    let stack_depth = handler.stack_depth;
                    let call_depth = handler.call_depth;

                    self.stack.truncate(stack_depth);
                    self.call_stack.truncate(call_depth);
                    self.unwinding = true;
                    self.pc = target;
                    debug!(target, stack_depth, "exception handled");
                    return Ok(());
                }
            }
            self.handlers.pop();
        }

        Err(FaultKind::UnhandledException(exception))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn program(bytes: &[u8]) -> Program {
        Program::from(bytes)
    }

    #[test]
    fn find_return_skips_operands() {
        // PUSH 0x51, RETURN
        let p = program(&[0x01, 0x51, 0x51]);
        assert_eq!(find_return(&p, 0), Some(2));
        assert_eq!(find_return(&p, 3), None);
    }

    #[test]
    fn find_catch_skips_nested_scope() {
        // TRY | TRY CATCH 0 END_TRY | CATCH 0 END_TRY
        let p = program(&[0x70, 0x70, 0x71, 0x00, 0x72, 0x71, 0x00, 0x72]);
        assert_eq!(find_catch(&p, 1), Some(5));
        assert_eq!(find_catch(&p, 2), Some(2));
    }

    #[test]
    fn find_catch_stops_at_own_end_try() {
        let p = program(&[0x70, 0x72, 0x71, 0x00]);
        assert_eq!(find_catch(&p, 1), None);
        assert_eq!(find_catch(&program(&[0x70, 0x01, 0x71]), 1), None);
    }

    #[test]
    fn find_clause_end_stops_at_catch_or_end_try() {
        // body: PUSH 0x72, TRY CATCH 0 END_TRY, CATCH 0
        let p = program(&[0x01, 0x72, 0x70, 0x71, 0x00, 0x72, 0x71, 0x00]);
        assert_eq!(find_clause_end(&p, 0), Some(6));
        assert_eq!(find_clause_end(&p, 7), None);
    }

    #[test]
    fn resolve_picks_matching_clause() {
        // CATCH 1 0x05, PUSH 1, CATCH 1 0x01, PUSH 2, END_TRY
        let p = program(&[0x71, 0x01, 0x05, 0x01, 0x01, 0x71, 0x01, 0x01, 0x01, 0x02, 0x72]);
        assert_eq!(
            resolve_catch(&p, 0, ExceptionType::DIVISION_BY_ZERO),
            Ok(Some(5))
        );
        assert_eq!(resolve_catch(&p, 0, ExceptionType(0x05)), Ok(Some(0)));
        assert_eq!(resolve_catch(&p, 0, ExceptionType(0x09)), Ok(None));
    }

    #[test]
    fn resolve_catch_all() {
        let p = program(&[0x71, 0x00, 0x72]);
        assert_eq!(resolve_catch(&p, 0, ExceptionType(0x33)), Ok(Some(0)));
    }

    #[test]
    fn resolve_unterminated_scope() {
        let p = program(&[0x71, 0x01, 0x05, 0x01, 0x01]);
        assert_eq!(
            resolve_catch(&p, 0, ExceptionType::DIVISION_BY_ZERO),
            Err(FaultKind::MissingCatchOrEndTry)
        );
        assert_eq!(
            resolve_catch(&program(&[0x71, 0x02, 0x05]), 0, ExceptionType(0x01)),
            Err(FaultKind::MissingOperand)
        );
    }
}
