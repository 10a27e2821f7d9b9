//! Disassembler: byte stream → canonical assembly text.
//!
//! Output format is flat text, one instruction per line, operands in
//! decimal. Bytes that do not form a complete instruction come out as
//! `BYTE 0x..` lines so the text always reassembles to the same bytes.

use crate::parser::BYTE;
use chroma_common::{Opcode, Program};

/// Disassemble a program into canonical assembly text.
///
/// The output is guaranteed to reassemble to identical bytes
/// (`assemble(disassemble(program)) == program`).
pub fn disassemble(program: &Program) -> String {
    let bytes = program.as_bytes();
    let mut text = String::new();
    let mut pc = 0;

    while pc < bytes.len() {
        let next = program.step(pc);
        let Some(instr) = bytes.get(pc..next) else {
            // Operands run past the end; emit what is left byte by byte.
            for byte in &bytes[pc..] {
                text.push_str(&format!("{BYTE} 0x{byte:02x}\n"));
            }
            break;
        };

        let line = match Opcode::try_from(instr[0]) {
            Ok(opcode) if instr.len() == 1 => opcode.mnemonic().to_string(),
            Ok(Opcode::Catch) => {
                let mut line = Opcode::Catch.mnemonic().to_string();
                for ty in &instr[2..] {
                    line.push_str(&format!(" {ty}"));
                }
                line
            }
            Ok(opcode) => format!("{} {}", opcode.mnemonic(), instr[1]),
            Err(_) => format!("{BYTE} 0x{:02x}", instr[0]),
        };
        text.push_str(&line);
        text.push('\n');
        pc = next;
    }

    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_program() {
        assert_eq!(disassemble(&Program::default()), "");
    }

    #[test]
    fn operands_in_decimal() {
        let program = Program::new(vec![0x01, 0x0A, 0x40, 3, 0x62]);
        assert_eq!(disassemble(&program), "PUSH 10\nSTORE 3\nPRINTLN_NUM\n");
    }

    #[test]
    fn catch_lists_types() {
        let program = Program::new(vec![0x71, 0, 0x71, 2, 1, 7]);
        assert_eq!(disassemble(&program), "CATCH\nCATCH 1 7\n");
    }

    #[test]
    fn unknown_bytes_as_raw() {
        let program = Program::new(vec![0x00, 0xFF]);
        assert_eq!(disassemble(&program), "BYTE 0x00\nBYTE 0xff\n");
    }

    #[test]
    fn truncated_tail_as_raw() {
        let program = Program::new(vec![0x32, 0x71, 3, 1]);
        assert_eq!(disassemble(&program), "HALT\nBYTE 0x71\nBYTE 0x03\nBYTE 0x01\n");
    }
}
