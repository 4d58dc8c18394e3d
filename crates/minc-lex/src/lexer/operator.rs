//! Operator reading and parenthesis nesting.
//!
//! Operators use maximal munch: read one character, peek a second, keep the
//! pair only when it spells a recognized operator, otherwise push the second
//! character back. Emitting `(` opens an expression nesting level; the
//! matching `)` symbol closes it.

use minc_util::{Pos, Result, Symbol};

use crate::lexer::LexProcess;
use crate::source::CharSource;
use crate::token::{is_operator_char, is_operator_valid, Token, TokenKind};

impl<S: CharSource> LexProcess<S> {
    /// Reads an operator token, or a string literal when `<` follows the
    /// keyword `include`.
    pub(crate) fn read_operator_or_string_token(&mut self, first: char, pos: Pos) -> Result<Token> {
        if first == '<' && self.tokens.last().is_some_and(|t| t.is_keyword("include")) {
            return self.read_string_token('<', '>', pos);
        }
        let op = self.read_operator(first);
        let token = self.finish_token(TokenKind::Operator(Symbol::intern(&op)), pos);
        if op == "(" {
            self.begin_expression();
        }
        Ok(token)
    }

    /// Reads an operator spelling with maximal munch.
    ///
    /// `first` is the already-peeked first character.
    fn read_operator(&mut self, first: char) -> String {
        self.next_char();
        let mut op = String::from(first);
        if let Some(next) = self.peek_char() {
            if is_operator_char(next) {
                op.push(next);
                self.next_char();
            }
        }
        if op.len() > 1 && !is_operator_valid(&op) {
            // Flush back everything except the first character.
            while op.len() > 1 {
                let c = op.pop().unwrap_or_default();
                self.push_char(c);
            }
        }
        op
    }

    /// Reads a symbol token; a `)` closes the current expression nesting.
    pub(crate) fn read_symbol_token(&mut self, symbol: char, pos: Pos) -> Result<Token> {
        self.next_char();
        if symbol == ')' {
            self.end_expression(pos)?;
        }
        Ok(self.finish_token(TokenKind::Symbol(symbol), pos))
    }
}

#[cfg(test)]
mod tests {
    use crate::lex_string;
    use crate::token::TokenKind;

    fn operators(source: &str) -> Vec<String> {
        lex_string(source, "t.c")
            .unwrap()
            .into_iter()
            .filter_map(|t| match t.kind {
                TokenKind::Operator(sym) => Some(sym.as_str().to_string()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn test_single_operators() {
        assert_eq!(operators("a + b"), vec!["+"]);
        assert_eq!(operators("a = b"), vec!["="]);
    }

    #[test]
    fn test_maximal_munch_pairs() {
        assert_eq!(operators("a += b"), vec!["+="]);
        assert_eq!(operators("a == b"), vec!["=="]);
        assert_eq!(operators("a && b"), vec!["&&"]);
        assert_eq!(operators("a << b"), vec!["<<"]);
        assert_eq!(operators("p -> q"), vec!["->"]);
    }

    #[test]
    fn test_invalid_pair_splits() {
        // `=!` is not an operator: the `!` is flushed back and re-read.
        assert_eq!(operators("a =!b"), vec!["=", "!"]);
        assert_eq!(operators("a +* b"), vec!["+", "*"]);
    }

    #[test]
    fn test_adjacent_plus_signs() {
        assert_eq!(operators("a+++b"), vec!["++", "+"]);
    }

    #[test]
    fn test_division_is_an_operator() {
        assert_eq!(operators("a / b"), vec!["/"]);
        assert_eq!(operators("a /= b"), vec!["/="]);
    }

    #[test]
    fn test_parenthesis_pairing() {
        let tokens = lex_string("((a))", "t.c").unwrap();
        assert!(tokens[0].is_operator("("));
        assert!(tokens[4].is_symbol(')'));
        // Both groups closed: the last token carries no bracket context.
        assert_eq!(tokens[4].between_brackets, None);
    }
}
