//! Chroma assembler: bidirectional text ↔ bytecode translation.
//!
//! Each line holds one instruction. The translation is mechanical: a
//! mnemonic becomes its opcode byte and each argument becomes one operand
//! byte. `BYTE n` emits a raw byte for anything the mnemonics cannot say.
//!
//! # Usage
//!
//! ```
//! use chroma_assembler::{assemble, disassemble};
//!
//! let text = "PUSH 42\nPRINTLN_NUM\nHALT\n";
//! let program = assemble(text).unwrap();
//! assert_eq!(program.as_bytes(), &[0x01, 42, 0x62, 0x32]);
//! assert_eq!(disassemble(&program), text);
//! ```
//!
//! # Roundtrip Guarantee
//!
//! `assemble(disassemble(program)) == program` holds for every byte
//! sequence, including ones the VM would fault on. The assembler also
//! accepts non-canonical input (hex operands, character literals,
//! exception names in CATCH clauses).

pub mod error;

mod disassembler;
mod lexer;
mod parser;

pub use disassembler::disassemble;
pub use error::AsmError;

use chroma_common::Program;
use lexer::tokenize_line;
use parser::parse_line;

/// Assemble text into a program.
///
/// Returns the first error encountered.
pub fn assemble(text: &str) -> Result<Program, AsmError> {
    let mut bytes = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line_num = idx + 1;
        let tokens = tokenize_line(line, line_num)?;
        parse_line(&tokens, line_num, &mut bytes)?;
    }

    Ok(Program::new(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chroma_common::opcode::ALL_OPCODES;
    use chroma_common::Opcode;

    #[test]
    fn assemble_with_comments_and_blanks() {
        let text = "\
; greet
PUSH 'H'   ; 72
PRINT_CHAR

HALT
";
        let program = assemble(text).unwrap();
        assert_eq!(program.as_bytes(), &[0x01, 72, 0x61, 0x32]);
    }

    #[test]
    fn decimal_hex_and_char_agree() {
        let dec = assemble("PUSH 65\n").unwrap();
        let hex = assemble("push 0x41\n").unwrap();
        let chr = assemble("PUSH 'A'\n").unwrap();
        assert_eq!(dec, hex);
        assert_eq!(dec, chr);
    }

    #[test]
    fn error_reports_correct_line() {
        let err = assemble("HALT\nFOOBAR\n").unwrap_err();
        assert!(matches!(err, AsmError::UnknownOpcode { line: 2, .. }));
    }

    #[test]
    fn error_missing_argument() {
        let err = assemble("STORE\n").unwrap_err();
        assert!(matches!(
            err,
            AsmError::MissingArgument {
                line: 1,
                opcode: "STORE",
                expected: 1
            }
        ));
    }

    #[test]
    fn every_mnemonic_roundtrips() {
        for opcode in ALL_OPCODES {
            let text = match opcode.fixed_operands() {
                0 => format!("{}\n", opcode.mnemonic()),
                _ if opcode == Opcode::Catch => "CATCH 1 2\n".to_string(),
                _ => format!("{} 7\n", opcode.mnemonic()),
            };
            let program = assemble(&text).unwrap();
            assert_eq!(disassemble(&program), text, "roundtrip failed for {opcode:?}");
        }
    }

    #[test]
    fn canonicalizes_exception_names() {
        let program = assemble("TRY\nCATCH DivisionByZero\nEND_TRY\n").unwrap();
        assert_eq!(disassemble(&program), "TRY\nCATCH 1\nEND_TRY\n");
    }
}
