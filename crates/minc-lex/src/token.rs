//! Token model.
//!
//! Tokens carry their payload, their position, a flag telling whether
//! whitespace preceded them, and - when they were produced inside a
//! parenthesis group - the raw text captured so far for that group.
//! The recognized keyword and operator sets live here, in one place, so the
//! lexer predicates and the parser agree on them by construction.

use minc_util::{Pos, Symbol};

/// Sub-type of a number literal, selected by its suffix.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NumberKind {
    /// No suffix.
    Int,
    /// `L` suffix.
    Long,
    /// `f` suffix.
    Float,
    /// `d` suffix.
    Double,
}

/// The payload of a token.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenKind {
    /// A name that is not a keyword.
    Identifier(Symbol),
    /// A reserved word.
    Keyword(Symbol),
    /// An operator spelling, e.g. `+`, `<<=`, `(`.
    Operator(Symbol),
    /// A structural single character: one of `{ } : ; # ) ] \`.
    Symbol(char),
    /// A string literal, escapes already applied.
    Str(String),
    /// A comment's text, without the comment markers.
    Comment(String),
    /// A line break.
    Newline,
    /// A number literal; character literals land here with their char value.
    Number { value: u64, kind: NumberKind },
}

/// A lexed token.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    /// What the token is.
    pub kind: TokenKind,
    /// Where the token starts.
    pub pos: Pos,
    /// True if whitespace (space, tab or newline) separates this token from
    /// the previous one.
    pub is_whitespace: bool,
    /// Raw text captured between the innermost still-open `(` and this
    /// token. `Some` exactly when the token was produced at parenthesis
    /// nesting depth > 0.
    pub between_brackets: Option<String>,
}

impl Token {
    /// True if this token is the keyword `value`.
    pub fn is_keyword(&self, value: &str) -> bool {
        matches!(&self.kind, TokenKind::Keyword(sym) if sym.as_str() == value)
    }

    /// True if this token is the symbol `symbol`.
    pub fn is_symbol(&self, symbol: char) -> bool {
        matches!(&self.kind, TokenKind::Symbol(c) if *c == symbol)
    }

    /// True if this token is the operator `value`.
    pub fn is_operator(&self, value: &str) -> bool {
        matches!(&self.kind, TokenKind::Operator(sym) if sym.as_str() == value)
    }

    /// True for the primitive type keywords
    /// (`int char float double void long short`).
    pub fn is_primitive_keyword(&self) -> bool {
        matches!(&self.kind, TokenKind::Keyword(sym)
            if matches!(sym.as_str(), "int" | "char" | "float" | "double" | "void" | "long" | "short"))
    }

    /// True for the tokens the parser's cursor skips: newlines, comments and
    /// the `\` line-continuation symbol.
    pub fn is_parser_skippable(&self) -> bool {
        matches!(self.kind, TokenKind::Newline | TokenKind::Comment(_)) || self.is_symbol('\\')
    }
}

/// The reserved words of the accepted language.
pub fn is_keyword(value: &str) -> bool {
    matches!(
        value,
        "unsigned"
            | "signed"
            | "char"
            | "short"
            | "int"
            | "float"
            | "double"
            | "long"
            | "void"
            | "struct"
            | "union"
            | "static"
            | "__ignore_typecheck__"
            | "return"
            | "include"
            | "sizeof"
            | "if"
            | "else"
            | "while"
            | "for"
            | "do"
            | "break"
            | "continue"
            | "switch"
            | "case"
            | "default"
            | "goto"
            | "typedef"
            | "const"
            | "extern"
            | "restrict"
    )
}

/// True for characters that can start or continue an operator.
pub fn is_operator_char(c: char) -> bool {
    matches!(
        c,
        '+' | '-' | '*' | '/' | '%' | '=' | '!' | '&' | '|' | '^' | '<' | '>' | '?' | '~' | '[' | '(' | ',' | '.'
    )
}

/// True for operator spellings the lexer may emit.
pub fn is_operator_valid(op: &str) -> bool {
    matches!(
        op,
        // Single-character operators
        "+" | "-" | "*" | "/" | "%" | "=" | "!" | "&" | "|" | "^" | "<" | ">" | "?" | "~" | "[" | "(" | "{" | ","
            | "." | ":" | ";"
            // Multi-character operators
            | "+=" | "-=" | "*=" | "/=" | "%=" | "==" | "!=" | "&&" | "||" | "++" | "--" | "<<" | ">>" | "<=" | ">="
            | "<<=" | ">>=" | "->" | "->*" | "::" | ".*" | "..." | "<=>" | "?:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use minc_util::Pos;

    fn token(kind: TokenKind) -> Token {
        Token { kind, pos: Pos::start(Symbol::intern("t.c")), is_whitespace: false, between_brackets: None }
    }

    #[test]
    fn test_is_keyword_predicate() {
        let t = token(TokenKind::Keyword(Symbol::intern("struct")));
        assert!(t.is_keyword("struct"));
        assert!(!t.is_keyword("union"));
        assert!(!token(TokenKind::Identifier(Symbol::intern("struct"))).is_keyword("struct"));
    }

    #[test]
    fn test_is_symbol_predicate() {
        let t = token(TokenKind::Symbol(';'));
        assert!(t.is_symbol(';'));
        assert!(!t.is_symbol('{'));
    }

    #[test]
    fn test_is_operator_predicate() {
        let t = token(TokenKind::Operator(Symbol::intern("+=")));
        assert!(t.is_operator("+="));
        assert!(!t.is_operator("+"));
    }

    #[test]
    fn test_primitive_keywords() {
        assert!(token(TokenKind::Keyword(Symbol::intern("int"))).is_primitive_keyword());
        assert!(token(TokenKind::Keyword(Symbol::intern("short"))).is_primitive_keyword());
        assert!(!token(TokenKind::Keyword(Symbol::intern("struct"))).is_primitive_keyword());
    }

    #[test]
    fn test_parser_skippable() {
        assert!(token(TokenKind::Newline).is_parser_skippable());
        assert!(token(TokenKind::Comment(String::from(" c "))).is_parser_skippable());
        assert!(token(TokenKind::Symbol('\\')).is_parser_skippable());
        assert!(!token(TokenKind::Symbol(';')).is_parser_skippable());
    }

    #[test]
    fn test_keyword_set() {
        for kw in ["unsigned", "__ignore_typecheck__", "goto", "restrict", "sizeof", "include"] {
            assert!(is_keyword(kw), "{kw} should be a keyword");
        }
        assert!(!is_keyword("main"));
        assert!(!is_keyword(""));
    }

    #[test]
    fn test_operator_sets_are_consistent() {
        // Every single operator character is a valid one-character operator
        // spelling, except the bracket-like ones handled structurally.
        for c in ['+', '-', '*', '/', '%', '=', '!', '&', '|', '^', '<', '>', '?', '~', '[', '(', ',', '.'] {
            assert!(is_operator_char(c));
            assert!(is_operator_valid(&c.to_string()), "{c} should be valid alone");
        }
        assert!(!is_operator_char(';'));
    }

    #[test]
    fn test_multi_operator_validity() {
        for op in ["<<=", ">>=", "->", "...", "<=>", "?:", "::", ".*", "->*"] {
            assert!(is_operator_valid(op), "{op} should be valid");
        }
        assert!(!is_operator_valid("+*"));
        assert!(!is_operator_valid("=!"));
    }
}
