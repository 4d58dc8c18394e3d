//! String and character literal lexing.
//!
//! The same reader serves `"..."` strings and the `include <...>` form - only
//! the delimiters differ. Character literals become number tokens carrying
//! the character value.

use minc_util::{CompileError, Pos, Result};

use crate::lexer::LexProcess;
use crate::source::CharSource;
use crate::token::{NumberKind, Token, TokenKind};

/// Applies an escape sequence character.
///
/// Subset: `\n`, `\t`, `\\`, `\'`. Anything else maps to NUL.
fn escape_character(c: char) -> char {
    match c {
        'n' => '\n',
        't' => '\t',
        '\\' => '\\',
        '\'' => '\'',
        _ => '\0',
    }
}

impl<S: CharSource> LexProcess<S> {
    /// Reads a string literal between `start` and `end` delimiters.
    pub(crate) fn read_string_token(&mut self, start: char, end: char, pos: Pos) -> Result<Token> {
        debug_assert_eq!(self.peek_char(), Some(start));
        self.next_char();
        let mut text = String::new();
        loop {
            let Some(c) = self.next_char() else {
                return Err(CompileError::lexical("Unterminated string literal", pos));
            };
            if c == end {
                break;
            }
            if c == '\\' {
                let Some(escaped) = self.next_char() else {
                    return Err(CompileError::lexical("Unterminated string literal", pos));
                };
                text.push(escape_character(escaped));
                continue;
            }
            text.push(c);
        }
        Ok(self.finish_token(TokenKind::Str(text), pos))
    }

    /// Reads a character literal, producing a number token.
    pub(crate) fn read_quote_token(&mut self, pos: Pos) -> Result<Token> {
        self.next_char();
        let Some(mut c) = self.next_char() else {
            return Err(CompileError::lexical("Did not close the opened quote", pos));
        };
        if c == '\\' {
            let Some(escaped) = self.next_char() else {
                return Err(CompileError::lexical("Did not close the opened quote", pos));
            };
            c = escape_character(escaped);
        }
        if self.next_char() != Some('\'') {
            return Err(CompileError::lexical("Did not close the opened quote", pos));
        }
        Ok(self.finish_token(TokenKind::Number { value: c as u64, kind: NumberKind::Int }, pos))
    }
}
