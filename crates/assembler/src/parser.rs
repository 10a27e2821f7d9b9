//! Parser for Chroma assembly tokens → bytes.
//!
//! Dispatches on the opcode to one of three argument patterns: no
//! operands, one byte operand, or a CATCH type list.

use crate::error::AsmError;
use crate::lexer::Token;
use chroma_common::{ExceptionType, Opcode};

/// Pseudo-mnemonic that emits one raw byte.
pub(crate) const BYTE: &str = "BYTE";

/// Parse a sequence of tokens from a single line and append the encoded
/// bytes to `out`.
///
/// Blank lines (empty token list) append nothing.
pub(crate) fn parse_line(tokens: &[Token], line_num: usize, out: &mut Vec<u8>) -> Result<(), AsmError> {
    let Some(first) = tokens.first() else {
        return Ok(());
    };

    let mnemonic = match first {
        Token::Ident(s) => s.as_str(),
        Token::Number(n) => {
            return Err(AsmError::UnexpectedToken {
                line: line_num,
                token: n.to_string(),
            })
        }
    };
    let args = &tokens[1..];

    if mnemonic == BYTE {
        let value = expect_byte(args, line_num, BYTE)?;
        expect_end(&args[1..], line_num)?;
        out.push(value);
        return Ok(());
    }

    let opcode = Opcode::from_mnemonic(mnemonic).ok_or_else(|| AsmError::UnknownOpcode {
        line: line_num,
        token: mnemonic.to_string(),
    })?;

    match opcode {
        // No operands
        Opcode::Pop
        | Opcode::Dup
        | Opcode::Add
        | Opcode::Sub
        | Opcode::Mul
        | Opcode::Div
        | Opcode::Mod
        | Opcode::Exp
        | Opcode::Halt
        | Opcode::Return
        | Opcode::PrintNum
        | Opcode::PrintChar
        | Opcode::PrintlnNum
        | Opcode::PrintlnChar
        | Opcode::Try
        | Opcode::EndTry => {
            expect_end(args, line_num)?;
            out.push(opcode as u8);
        }

        // One byte operand
        Opcode::Push | Opcode::Store | Opcode::Load | Opcode::Call | Opcode::Func => {
            let operand = expect_byte(args, line_num, opcode.mnemonic())?;
            expect_end(&args[1..], line_num)?;
            out.extend_from_slice(&[opcode as u8, operand]);
        }

        // Type list; the count byte is implied by the number of types.
        Opcode::Catch => {
            if args.len() > usize::from(u8::MAX) {
                return Err(AsmError::TooManyTypes {
                    line: line_num,
                    count: args.len(),
                });
            }
            out.push(opcode as u8);
            out.push(args.len() as u8);
            for arg in args {
                out.push(exception_type(arg, line_num)?);
            }
        }
    }

    Ok(())
}

/// First argument as a byte.
fn expect_byte(args: &[Token], line_num: usize, opcode: &'static str) -> Result<u8, AsmError> {
    match args.first() {
        Some(Token::Number(n)) => u8::try_from(*n).map_err(|_| AsmError::InvalidNumber {
            line: line_num,
            token: n.to_string(),
        }),
        Some(Token::Ident(s)) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: s.clone(),
        }),
        None => Err(AsmError::MissingArgument {
            line: line_num,
            opcode,
            expected: 1,
        }),
    }
}

/// A CATCH argument: a type byte or a known exception name.
fn exception_type(token: &Token, line_num: usize) -> Result<u8, AsmError> {
    match token {
        Token::Number(n) => u8::try_from(*n).map_err(|_| AsmError::InvalidNumber {
            line: line_num,
            token: n.to_string(),
        }),
        Token::Ident(name) => ExceptionType::from_name(name)
            .map(ExceptionType::code)
            .ok_or_else(|| AsmError::UnknownException {
                line: line_num,
                token: name.clone(),
            }),
    }
}

fn expect_end(rest: &[Token], line_num: usize) -> Result<(), AsmError> {
    match rest.first() {
        None => Ok(()),
        Some(tok) => Err(AsmError::UnexpectedToken {
            line: line_num,
            token: match tok {
                Token::Ident(s) => s.clone(),
                Token::Number(n) => n.to_string(),
            },
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ident(s: &str) -> Token {
        Token::Ident(s.to_string())
    }

    fn parse(tokens: &[Token]) -> Result<Vec<u8>, AsmError> {
        let mut out = Vec::new();
        parse_line(tokens, 1, &mut out)?;
        Ok(out)
    }

    #[test]
    fn blank_line_emits_nothing() {
        assert_eq!(parse(&[]), Ok(vec![]));
    }

    #[test]
    fn no_operand_opcode() {
        assert_eq!(parse(&[ident("END_TRY")]), Ok(vec![0x72]));
    }

    #[test]
    fn one_operand_opcode() {
        assert_eq!(parse(&[ident("LOAD"), Token::Number(255)]), Ok(vec![0x41, 255]));
    }

    #[test]
    fn operand_out_of_range() {
        assert_eq!(
            parse(&[ident("PUSH"), Token::Number(256)]),
            Err(AsmError::InvalidNumber {
                line: 1,
                token: "256".to_string()
            })
        );
    }

    #[test]
    fn catch_counts_its_types() {
        assert_eq!(parse(&[ident("CATCH")]), Ok(vec![0x71, 0]));
        assert_eq!(
            parse(&[ident("CATCH"), ident("DIVISIONBYZERO"), Token::Number(9)]),
            Ok(vec![0x71, 2, 1, 9])
        );
    }

    #[test]
    fn catch_rejects_unknown_name() {
        assert!(matches!(
            parse(&[ident("CATCH"), ident("OVERFLOW")]),
            Err(AsmError::UnknownException { .. })
        ));
    }

    #[test]
    fn raw_byte() {
        assert_eq!(parse(&[ident("BYTE"), Token::Number(0xAB)]), Ok(vec![0xAB]));
    }

    #[test]
    fn leading_number_is_unexpected() {
        assert!(matches!(
            parse(&[Token::Number(1)]),
            Err(AsmError::UnexpectedToken { .. })
        ));
    }

    #[test]
    fn trailing_token_is_unexpected() {
        assert!(matches!(
            parse(&[ident("ADD"), Token::Number(1)]),
            Err(AsmError::UnexpectedToken { .. })
        ));
    }
}
