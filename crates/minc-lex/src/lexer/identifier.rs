//! Identifier and keyword lexing.

use minc_util::{Pos, Symbol};

use crate::lexer::LexProcess;
use crate::source::CharSource;
use crate::token::{is_keyword, Token, TokenKind};

impl<S: CharSource> LexProcess<S> {
    /// Reads `[a-zA-Z0-9_]+` and classifies it as keyword or identifier.
    pub(crate) fn read_identifier_or_keyword_token(&mut self, pos: Pos) -> Token {
        let mut text = String::new();
        while let Some(c) = self.peek_char() {
            if !c.is_ascii_alphanumeric() && c != '_' {
                break;
            }
            text.push(c);
            self.next_char();
        }
        let symbol = Symbol::intern(&text);
        let kind = if is_keyword(&text) { TokenKind::Keyword(symbol) } else { TokenKind::Identifier(symbol) };
        self.finish_token(kind, pos)
    }
}

#[cfg(test)]
mod tests {
    use crate::lex_string;
    use crate::token::TokenKind;

    #[test]
    fn test_identifier() {
        let tokens = lex_string("main_2", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Identifier(s) if s.as_str() == "main_2"));
    }

    #[test]
    fn test_leading_underscore() {
        let tokens = lex_string("_private", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Identifier(s) if s.as_str() == "_private"));
    }

    #[test]
    fn test_keywords_classify() {
        let tokens = lex_string("struct point", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Keyword(s) if s.as_str() == "struct"));
        assert!(matches!(&tokens[1].kind, TokenKind::Identifier(_)));
    }

    #[test]
    fn test_keyword_prefix_is_identifier() {
        let tokens = lex_string("interior", "t.c").unwrap();
        assert!(matches!(&tokens[0].kind, TokenKind::Identifier(s) if s.as_str() == "interior"));
    }
}
