//! Main execution loop and opcode dispatch for the Chroma VM.

use std::io::Write;

use chroma_common::{ExceptionType, Opcode, Program};
use tracing::{debug, trace};

use crate::error::{Fault, FaultKind, RuntimeError, Trap};
use crate::exceptions::find_return;
use crate::machine::VM;

impl VM {
    /// Run `program` from position 0 until HALT, a top-level RETURN, or
    /// the end of the byte stream.
    ///
    /// Printed text goes to `out`. A fault is written to `err` as a single
    /// diagnostic and also returned. `out` is flushed before the
    /// diagnostic, so text printed ahead of a fault is never lost.
    ///
    /// # Errors
    ///
    /// [`RuntimeError::Fault`] when the program faults,
    /// [`RuntimeError::Sink`] when either sink cannot be written.
    pub fn run<O, E>(&mut self, program: &Program, out: &mut O, err: &mut E) -> Result<(), RuntimeError>
    where
        O: Write + ?Sized,
        E: Write + ?Sized,
    {
        match self.execute(program, out) {
            Err(RuntimeError::Fault(fault)) => {
                out.flush()?;
                writeln!(err, "{fault}")?;
                err.flush()?;
                Err(RuntimeError::Fault(fault))
            }
            other => other,
        }
    }

    /// The fetch-execute loop. Faults are returned, not reported.
    pub fn execute<O>(&mut self, program: &Program, out: &mut O) -> Result<(), RuntimeError>
    where
        O: Write + ?Sized,
    {
        self.reset();
        debug!(len = program.len(), "run started");

        while self.running {
            let Some(byte) = program.get(self.pc) else {
                break;
            };
            self.pc += 1;

            if let Err(trap) = self.dispatch(program, byte, out) {
                self.running = false;
                return Err(match trap {
                    // The counter sits on the last byte the instruction consumed.
                    Trap::Fault(kind) => {
                        let pc = self.pc - 1;
                        debug!(%kind, pc, "fault");
                        Fault::new(kind, byte, pc, self.stack.as_slice()).into()
                    }
                    Trap::Sink(e) => RuntimeError::Sink(e),
                });
            }
        }

        out.flush()?;
        debug!(pc = self.pc, depth = self.stack.len(), "run finished");
        Ok(())
    }

    fn dispatch<O>(&mut self, program: &Program, byte: u8, out: &mut O) -> Result<(), Trap>
    where
        O: Write + ?Sized,
    {
        let Ok(opcode) = Opcode::try_from(byte) else {
            trace!(pc = self.pc - 1, byte, "skipping unknown byte");
            return Ok(());
        };
        trace!(pc = self.pc - 1, op = opcode.mnemonic(), depth = self.stack.len(), "dispatch");

        match opcode {
            // Stack
            Opcode::Push => {
                let value = self.operand(program)?;
                self.stack.push(f64::from(value));
            }
            Opcode::Pop => {
                self.stack.pop()?;
            }
            Opcode::Dup => {
                let top = self.stack.peek()?;
                self.stack.push(top);
            }

            // Arithmetic
            Opcode::Add => self.exec_binary(|a, b| b + a)?,
            Opcode::Sub => self.exec_binary(|a, b| b - a)?,
            Opcode::Mul => self.exec_binary(|a, b| b * a)?,
            Opcode::Div => self.exec_division(program, |a, b| b / a)?,
            Opcode::Mod => self.exec_division(program, |a, b| b % a)?,
            Opcode::Exp => self.exec_binary(|a, b| b.powf(a))?,

            // Control
            Opcode::Halt => {
                debug!(pc = self.pc - 1, "halt");
                self.running = false;
            }

            // Variables
            Opcode::Store => {
                let id = self.operand(program)?;
                let value = self.stack.pop()?;
                self.variables[usize::from(id)] = Some(value);
            }
            Opcode::Load => {
                let id = self.operand(program)?;
                let value = self.variables[usize::from(id)].ok_or(FaultKind::UndefinedVariable)?;
                self.stack.push(value);
            }

            // Functions
            Opcode::Func => self.exec_func(program)?,
            Opcode::Call => self.exec_call(program)?,
            Opcode::Return => self.exec_return(),

            // I/O
            Opcode::PrintNum => {
                let value = self.stack.pop()?;
                write!(out, "{}", crate::format_number(value))?;
            }
            Opcode::PrintChar => {
                let value = self.stack.pop()?;
                write!(out, "{}", crate::to_char(value))?;
            }
            Opcode::PrintlnNum => {
                let value = self.stack.pop()?;
                writeln!(out, "{}", crate::format_number(value))?;
            }
            Opcode::PrintlnChar => {
                let value = self.stack.pop()?;
                writeln!(out, "{}", crate::to_char(value))?;
            }

            // Exception handling
            Opcode::Try => self.exec_try(program)?,
            Opcode::Catch => self.exec_catch(program)?,
            Opcode::EndTry => self.exec_end_try(),
        }

        Ok(())
    }

    // ---- Arithmetic ----

    /// Pop `a`, then `b`, push `op(a, b)`.
    fn exec_binary(&mut self, op: fn(f64, f64) -> f64) -> Result<(), FaultKind> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        self.stack.push(op(a, b));
        Ok(())
    }

    /// Like [`Self::exec_binary`], but a zero divisor raises
    /// `DivisionByZero` instead of pushing.
    fn exec_division(&mut self, program: &Program, op: fn(f64, f64) -> f64) -> Result<(), FaultKind> {
        let a = self.stack.pop()?;
        let b = self.stack.pop()?;
        if a == 0.0 {
            return self.raise(program, ExceptionType::DIVISION_BY_ZERO);
        }
        self.stack.push(op(a, b));
        Ok(())
    }

    // ---- Functions ----

    /// FUNC id: register the body that starts after the id operand, then
    /// continue after its RETURN.
    fn exec_func(&mut self, program: &Program) -> Result<(), FaultKind> {
        let id = self.operand(program)?;
        let entry = self.pc;
        let ret = find_return(program, entry).ok_or(FaultKind::MissingReturn)?;

        self.functions[usize::from(id)] = Some(entry);
        self.pc = ret + 1;
        debug!(id, entry, "function registered");
        Ok(())
    }

    fn exec_call(&mut self, program: &Program) -> Result<(), FaultKind> {
        let id = self.operand(program)?;
        let entry = self.functions[usize::from(id)].ok_or(FaultKind::UndefinedFunction)?;

        self.call_stack.push(self.pc);
        self.pc = entry;
        Ok(())
    }

    /// RETURN with an empty call stack ends the program.
    fn exec_return(&mut self) {
        match self.call_stack.pop() {
            Some(addr) => self.pc = addr,
            None => {
                debug!(pc = self.pc - 1, "top-level return");
                self.running = false;
            }
        }
    }
}
