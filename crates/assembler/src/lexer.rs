//! Tokenizer for Chroma assembly text.

use crate::error::AsmError;

/// A single token from an assembly line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Token {
    /// An identifier (opcode mnemonic, exception name). Always uppercase.
    Ident(String),
    /// A numeric literal (decimal or hex). Range is checked by the parser.
    Number(u64),
}

/// Tokenize a single line of assembly text.
///
/// Returns an empty Vec for blank lines and comment-only lines.
/// Comments start with `;` outside a character literal and extend to end
/// of line. Besides decimal and `0x` hex numbers, a quoted ASCII character
/// such as `'H'` or `';'` is a number holding its code.
pub(crate) fn tokenize_line(line: &str, line_num: usize) -> Result<Vec<Token>, AsmError> {
    let code = strip_comment(line);

    code.split_whitespace()
        .map(|word| {
            let invalid = || AsmError::InvalidNumber {
                line: line_num,
                token: word.to_string(),
            };

            if let Some(hex) = word.strip_prefix("0x").or_else(|| word.strip_prefix("0X")) {
                u64::from_str_radix(hex, 16).map(Token::Number).map_err(|_| invalid())
            } else if word.starts_with(|c: char| c.is_ascii_digit()) {
                word.parse().map(Token::Number).map_err(|_| invalid())
            } else if word.starts_with('\'') {
                char_literal(word).map(Token::Number).ok_or_else(invalid)
            } else {
                Ok(Token::Ident(word.to_uppercase()))
            }
        })
        .collect()
}

/// The part of `line` before its comment.
fn strip_comment(line: &str) -> &str {
    let mut quoted = false;
    for (i, c) in line.char_indices() {
        match c {
            '\'' => quoted = !quoted,
            ';' if !quoted => return &line[..i],
            _ => {}
        }
    }
    line
}

/// Value of a `'c'` literal. Only single printable ASCII characters.
fn char_literal(word: &str) -> Option<u64> {
    let inner = word.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut chars = inner.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) if c.is_ascii_graphic() => Some(u64::from(c)),
        _ => None,
    }
}
