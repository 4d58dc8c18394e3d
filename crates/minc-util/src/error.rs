//! Core error type for the compiler.
//!
//! All fatal conditions are values of [`CompileError`] and propagate with `?`
//! up to the driver; nothing below the driver terminates the process. The
//! three variants match the error classes of the front end: lexical,
//! syntactic and semantic. Warnings are not errors - see
//! [`crate::diagnostic::Handler`].

use thiserror::Error;

use crate::pos::Pos;

/// A fatal compilation error with its source position.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    /// The lexer could not classify the input (unknown character,
    /// unterminated literal or comment, invalid binary digit, unmatched
    /// closing parenthesis).
    #[error("Error: {message} on {pos}")]
    Lexical { message: String, pos: Pos },

    /// The parser met a token where a specific symbol, operator or keyword
    /// was required.
    #[error("Error: {message} on {pos}")]
    Syntactic { message: String, pos: Pos },

    /// A rule about meaning was violated: duplicate symbol in a frame,
    /// disallowed secondary type, unresolved aggregate at end of parse.
    #[error("Error: {message} on {pos}")]
    Semantic { message: String, pos: Pos },
}

impl CompileError {
    /// Creates a lexical error.
    pub fn lexical(message: impl Into<String>, pos: Pos) -> CompileError {
        CompileError::Lexical { message: message.into(), pos }
    }

    /// Creates a syntactic error.
    pub fn syntactic(message: impl Into<String>, pos: Pos) -> CompileError {
        CompileError::Syntactic { message: message.into(), pos }
    }

    /// Creates a semantic error.
    pub fn semantic(message: impl Into<String>, pos: Pos) -> CompileError {
        CompileError::Semantic { message: message.into(), pos }
    }

    /// The position the error points at.
    pub fn pos(&self) -> Pos {
        match self {
            CompileError::Lexical { pos, .. }
            | CompileError::Syntactic { pos, .. }
            | CompileError::Semantic { pos, .. } => *pos,
        }
    }
}

/// Result alias used throughout the compiler.
pub type Result<T> = std::result::Result<T, CompileError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::Symbol;

    #[test]
    fn test_error_display_format() {
        let err = CompileError::lexical("Unknown character", Pos::new(4, 1, Symbol::intern("bad.c")));
        assert_eq!(err.to_string(), "Error: Unknown character on line 4, column 1 in file bad.c");
    }

    #[test]
    fn test_pos_accessor() {
        let pos = Pos::new(1, 2, Symbol::intern("x.c"));
        assert_eq!(CompileError::semantic("dup", pos).pos(), pos);
    }
}
