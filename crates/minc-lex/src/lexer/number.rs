//! Number literal lexing.
//!
//! Decimal digits accumulate into a `u64`; an `L`, `f` or `d` suffix selects
//! the numeric sub-type. Hex and binary literals arrive indirectly: by the
//! time the `x`/`b` is seen, the leading `0` has already been emitted as a
//! number token, so the lexer pops it and re-reads the digits in the new
//! base. An `x`/`b` without that zero in front is an ordinary identifier.

use minc_util::{CompileError, Pos, Result};

use crate::lexer::LexProcess;
use crate::source::CharSource;
use crate::token::{NumberKind, Token, TokenKind};

impl<S: CharSource> LexProcess<S> {
    /// Reads a decimal number literal.
    pub(crate) fn read_number_token(&mut self, pos: Pos) -> Result<Token> {
        let digits = self.read_number_string();
        let value: u64 = digits
            .parse()
            .map_err(|_| CompileError::lexical(format!("Number literal '{digits}' is too large"), pos))?;
        Ok(self.make_number_token(value, pos))
    }

    /// Consumes a run of decimal digit characters.
    pub(crate) fn read_number_string(&mut self) -> String {
        let mut digits = String::new();
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_digit() {
                break;
            }
            digits.push(c);
            self.next_char();
        }
        digits
    }

    /// Builds a number token, consuming a trailing `L`/`f`/`d` suffix.
    pub(crate) fn make_number_token(&mut self, value: u64, pos: Pos) -> Token {
        let kind = match self.peek_char() {
            Some('L') => NumberKind::Long,
            Some('f') => NumberKind::Float,
            Some('d') => NumberKind::Double,
            _ => NumberKind::Int,
        };
        if kind != NumberKind::Int {
            self.next_char();
        }
        self.finish_token(TokenKind::Number { value, kind }, pos)
    }

    /// Handles `x`/`b` in dispatch position: a hex or binary literal when the
    /// previous token is a zero-valued number, an identifier otherwise.
    pub(crate) fn read_special_number_token(&mut self, prefix: char, pos: Pos) -> Result<Token> {
        match self.tokens.pop() {
            Some(zero @ Token { kind: TokenKind::Number { value: 0, .. }, .. }) => {
                // The new literal spans from the popped zero.
                self.pending_whitespace = self.pending_whitespace || zero.is_whitespace;
                self.next_char();
                if prefix == 'x' {
                    self.read_hexadecimal_token(zero.pos)
                } else {
                    self.read_binary_token(zero.pos)
                }
            }
            last => {
                if let Some(token) = last {
                    self.tokens.push(token);
                }
                Ok(self.read_identifier_or_keyword_token(pos))
            }
        }
    }

    /// Reads the digits of a hexadecimal literal after the `0x` prefix.
    fn read_hexadecimal_token(&mut self, pos: Pos) -> Result<Token> {
        let mut digits = String::new();
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_hexdigit() {
                break;
            }
            digits.push(c);
            self.next_char();
        }
        let value = if digits.is_empty() {
            0
        } else {
            u64::from_str_radix(&digits, 16)
                .map_err(|_| CompileError::lexical(format!("Number literal '0x{digits}' is too large"), pos))?
        };
        Ok(self.finish_token(TokenKind::Number { value, kind: NumberKind::Int }, pos))
    }

    /// Reads the digits of a binary literal after the `0b` prefix.
    fn read_binary_token(&mut self, pos: Pos) -> Result<Token> {
        let digits = self.read_number_string();
        if digits.chars().any(|c| c != '0' && c != '1') {
            return Err(CompileError::lexical("Invalid binary number", pos));
        }
        let value = if digits.is_empty() {
            0
        } else {
            u64::from_str_radix(&digits, 2)
                .map_err(|_| CompileError::lexical(format!("Number literal '0b{digits}' is too large"), pos))?
        };
        Ok(self.make_number_token(value, pos))
    }
}

#[cfg(test)]
mod tests {
    use crate::lex_string;
    use crate::token::{NumberKind, TokenKind};

    fn single_number(source: &str) -> (u64, NumberKind) {
        let tokens = lex_string(source, "t.c").unwrap();
        assert_eq!(tokens.len(), 1, "expected one token for {source:?}");
        match tokens[0].kind {
            TokenKind::Number { value, kind } => (value, kind),
            ref other => panic!("expected number, got {other:?}"),
        }
    }

    #[test]
    fn test_decimal() {
        assert_eq!(single_number("0"), (0, NumberKind::Int));
        assert_eq!(single_number("42"), (42, NumberKind::Int));
        assert_eq!(single_number("18446744073709551615"), (u64::MAX, NumberKind::Int));
    }

    #[test]
    fn test_suffixes() {
        assert_eq!(single_number("10L"), (10, NumberKind::Long));
        assert_eq!(single_number("10f"), (10, NumberKind::Float));
        assert_eq!(single_number("10d"), (10, NumberKind::Double));
    }

    #[test]
    fn test_overflow_is_fatal() {
        let err = lex_string("18446744073709551616", "t.c").unwrap_err();
        assert!(err.to_string().contains("too large"));
    }

    #[test]
    fn test_hexadecimal() {
        assert_eq!(single_number("0x0"), (0, NumberKind::Int));
        assert_eq!(single_number("0xFF"), (255, NumberKind::Int));
        assert_eq!(single_number("0xdeadBEEF"), (0xdead_beef, NumberKind::Int));
    }

    #[test]
    fn test_binary() {
        assert_eq!(single_number("0b0"), (0, NumberKind::Int));
        assert_eq!(single_number("0b1010"), (10, NumberKind::Int));
    }

    #[test]
    fn test_binary_with_suffix() {
        assert_eq!(single_number("0b11L"), (3, NumberKind::Long));
    }

    #[test]
    fn test_invalid_binary_digit_is_fatal() {
        let err = lex_string("0b1012", "t.c").unwrap_err();
        assert!(err.to_string().contains("Invalid binary number"));
    }

    #[test]
    fn test_x_without_zero_is_identifier() {
        let tokens = lex_string("xFF", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Identifier(s) if s.as_str() == "xFF"));
    }

    #[test]
    fn test_b_without_zero_is_identifier() {
        let tokens = lex_string("bar", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Identifier(s) if s.as_str() == "bar"));
    }

    #[test]
    fn test_hex_token_spans_from_zero() {
        let tokens = lex_string("  0xFF", "t.c").unwrap();
        assert_eq!(tokens.len(), 1);
        assert_eq!(tokens[0].pos.column, 3);
        assert!(tokens[0].is_whitespace);
    }
}
