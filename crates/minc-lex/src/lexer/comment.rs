//! Comment lexing.
//!
//! `//` consumes to end of line, `/* */` consumes to the closing marker.
//! A lone `/` is flushed back and handled as an operator.

use minc_util::{CompileError, Pos, Result};

use crate::lexer::LexProcess;
use crate::source::CharSource;
use crate::token::{Token, TokenKind};

impl<S: CharSource> LexProcess<S> {
    /// Tries to read a comment at a `/`.
    ///
    /// Returns `None` (with the `/` pushed back) when the slash is a plain
    /// operator.
    pub(crate) fn read_comment_token(&mut self, pos: Pos) -> Result<Option<Token>> {
        self.next_char();
        match self.peek_char() {
            Some('/') => {
                self.next_char();
                Ok(Some(self.read_line_comment(pos)))
            }
            Some('*') => {
                self.next_char();
                self.read_block_comment(pos).map(Some)
            }
            _ => {
                self.push_char('/');
                Ok(None)
            }
        }
    }

    /// Consumes until newline or end of input.
    fn read_line_comment(&mut self, pos: Pos) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if c == '\n' {
                break;
            }
            text.push(c);
            self.next_char();
        }
        self.finish_token(TokenKind::Comment(text), pos)
    }

    /// Consumes until the matching `*/`; end of input is fatal.
    fn read_block_comment(&mut self, pos: Pos) -> Result<Token> {
        let mut text = String::new();
        loop {
            let Some(c) = self.next_char() else {
                return Err(CompileError::lexical("Unexpected end of file in multi-line comment", pos));
            };
            if c == '*' && self.peek_char() == Some('/') {
                self.next_char();
                break;
            }
            text.push(c);
        }
        Ok(self.finish_token(TokenKind::Comment(text), pos))
    }
}

#[cfg(test)]
mod tests {
    use crate::lex_string;
    use crate::token::TokenKind;

    #[test]
    fn test_line_comment() {
        let tokens = lex_string("a // trailing\nb", "t.c").unwrap();
        assert!(matches!(&tokens[1].kind, TokenKind::Comment(text) if text == " trailing"));
    }

    #[test]
    fn test_line_comment_at_eof() {
        let tokens = lex_string("// only", "t.c").unwrap();
        assert_eq!(tokens.len(), 1);
        assert!(matches!(&tokens[0].kind, TokenKind::Comment(text) if text == " only"));
    }

    #[test]
    fn test_block_comment() {
        let tokens = lex_string("a /* middle */ b", "t.c").unwrap();
        assert_eq!(tokens.len(), 3);
        assert!(matches!(&tokens[1].kind, TokenKind::Comment(text) if text == " middle "));
    }

    #[test]
    fn test_block_comment_spanning_lines() {
        let tokens = lex_string("/* one\ntwo */ x", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Comment(text) if text == " one\ntwo "));
    }

    #[test]
    fn test_unterminated_block_comment_is_fatal() {
        let err = lex_string("/* never closed", "t.c").unwrap_err();
        assert!(err.to_string().contains("multi-line comment"));
    }

    #[test]
    fn test_lone_slash_is_division() {
        let tokens = lex_string("a/b", "t.c").unwrap();
        assert!(tokens[1].is_operator("/"));
    }
}
