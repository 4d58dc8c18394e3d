//! minc-lex - Lexical Analyzer (Lexer/Tokenizer)
//!
//! ============================================================================
//! LEXICAL ANALYSIS OVERVIEW
//! ============================================================================
//!
//! Lexical analysis is the first phase of compilation: it transforms a stream
//! of characters into a stream of tokens. The lexer here is direct-coded
//! (each token family has its own function) rather than table-driven, which
//! keeps the context-sensitive corners of the accepted C subset easy to
//! express:
//!
//! - `include <stdio.h>`: after the keyword `include`, a `<` does not start
//!   an operator - it starts a string literal delimited by `<` and `>`.
//! - `0xFF` / `0b1010`: the `0` has already been emitted as a number token
//!   when the `x`/`b` is seen; the lexer pops it back off the token stream
//!   and re-reads the digits in the indicated base.
//! - bracket context: while at least one `(` is open, every consumed
//!   character is also captured so each token can carry the raw text of its
//!   innermost enclosing parenthesis group.
//!
//! TOKEN CATEGORIES:
//! -----------------
//! 1. KEYWORDS      reserved words of the C subset (`int`, `struct`, ...)
//! 2. IDENTIFIERS   `[a-zA-Z_][a-zA-Z0-9_]*`
//! 3. NUMBERS       decimal, hex (`0x`), binary (`0b`); suffixes `L f d`;
//!                  character literals also become number tokens
//! 4. OPERATORS     the C operator family, longest match first
//! 5. SYMBOLS       structural single characters: `{ } : ; # ) ] \`
//! 6. STRINGS       `"..."` and the include form `<...>`
//! 7. COMMENTS      `// ...` and `/* ... */`, kept as tokens
//! 8. NEWLINES      kept as tokens (the parser skips them)
//!
//! MAXIMAL MUNCH:
//! --------------
//! Operators are recognized longest-first: the lexer reads one operator
//! character, peeks a second, and keeps the pair only when the two-character
//! spelling is in the recognized set. Otherwise the second character is
//! pushed back into the source and the single-character operator is emitted.
//! This is why `a+++b` lexes as `a ++ + b` and `a+ +b` lexes as `a + + b`.
//!
//! INPUT ABSTRACTION:
//! ------------------
//! The lexer reads through the [`CharSource`] capability (next / peek /
//! push-back), with a file-backed and a buffer-backed implementation, so the
//! same lexer serves whole files and in-memory strings.
//!
//! ERROR MODEL:
//! ------------
//! Every failure is fatal and positioned: an unknown character, an
//! unterminated comment or literal, an invalid binary digit and an unmatched
//! closing parenthesis all abort lexing with a [`minc_util::CompileError`].

pub mod lexer;
pub mod source;
pub mod token;

mod edge_cases;

pub use lexer::LexProcess;
pub use source::{BufferSource, CharSource, FileSource};
pub use token::{NumberKind, Token, TokenKind};

use minc_util::{Result, Symbol};

/// Lexes an in-memory string, the `yy_scan_string` analogue.
///
/// `file` is the name attached to token positions.
///
/// # Example
///
/// ```
/// use minc_lex::{lex_string, TokenKind};
///
/// let tokens = lex_string("int a;", "snippet.c").unwrap();
/// assert!(matches!(tokens[0].kind, TokenKind::Keyword(_)));
/// ```
pub fn lex_string(text: &str, file: &str) -> Result<Vec<Token>> {
    let file = Symbol::intern(file);
    LexProcess::new(BufferSource::new(text), file).lex()
}
