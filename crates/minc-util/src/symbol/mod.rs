//! Symbol module - String interning for identifiers, keywords and file names.
//!
//! This module provides the [`Symbol`] type, a compact (4-byte) handle to an
//! interned string. Symbols enable O(1) string comparison and remove per-token
//! allocation from the lexer.
//!
//! # Overview
//!
//! - **Memory efficiency**: each unique string is stored exactly once
//! - **Fast comparison**: symbol comparison is an index comparison
//! - **Thread safety**: the interner is safe to use from multiple threads
//! - **Stable handles**: symbols remain valid for the program lifetime
//!
//! # Memory Model
//!
//! Interned strings are heap-allocated and leaked to obtain a `'static`
//! lifetime. This is acceptable for a compiler: the process is short-lived
//! and the total is bounded by the size of the source text.
//!
//! # Examples
//!
//! ```
//! use minc_util::Symbol;
//!
//! let a = Symbol::intern("main");
//! let b = Symbol::intern("main");
//! let c = Symbol::intern("other");
//!
//! assert_eq!(a, b);
//! assert_ne!(a, c);
//! assert_eq!(a.as_str(), "main");
//! ```
//!
//! The accepted language's keywords are pre-interned so they can be referred
//! to as constants:
//!
//! ```
//! use minc_util::symbol::{kw, Symbol};
//!
//! assert_eq!(kw::STRUCT, Symbol::intern("struct"));
//! assert_eq!(kw::STRUCT.as_str(), "struct");
//! ```

mod interner;

use std::fmt;

use interner::with_table;

/// A compact handle to an interned string.
///
/// Two symbols are equal iff the strings they intern are equal, so symbol
/// comparison never touches the string data.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Symbol(u32);

static_assertions::assert_eq_size!(Symbol, u32);

impl Symbol {
    /// Interns a string, returning its symbol.
    ///
    /// Interning the same string twice returns the same symbol.
    pub fn intern(string: &str) -> Symbol {
        with_table(|table| table.intern(string))
    }

    /// Returns the interned string.
    ///
    /// The returned reference is `'static`: interned strings live for the
    /// rest of the process.
    pub fn as_str(self) -> &'static str {
        with_table(|table| table.resolve(self.0))
    }

    /// The raw index of this symbol in the string table.
    #[inline]
    pub fn index(self) -> u32 {
        self.0
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Debug for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({}: {:?})", self.0, self.as_str())
    }
}

macro_rules! known_symbols {
    ($(($index:expr, $name:ident, $text:expr)),* $(,)?) => {
        /// Pre-interned keywords of the accepted language.
        ///
        /// The indices are fixed by [`KNOWN_SYMBOLS`]; the interner seeds its
        /// table with that list so these constants compare equal to the
        /// symbols the lexer produces.
        pub mod kw {
            use super::Symbol;
            $(pub const $name: Symbol = Symbol($index);)*
        }

        /// Strings pre-interned at table construction, in index order.
        pub(crate) const KNOWN_SYMBOLS: &[&str] = &[$($text),*];
    };
}

known_symbols! {
    (0, VOID, "void"),
    (1, CHAR, "char"),
    (2, SHORT, "short"),
    (3, INT, "int"),
    (4, LONG, "long"),
    (5, FLOAT, "float"),
    (6, DOUBLE, "double"),
    (7, SIGNED, "signed"),
    (8, UNSIGNED, "unsigned"),
    (9, STRUCT, "struct"),
    (10, UNION, "union"),
    (11, STATIC, "static"),
    (12, CONST, "const"),
    (13, EXTERN, "extern"),
    (14, RESTRICT, "restrict"),
    (15, IGNORE_TYPECHECK, "__ignore_typecheck__"),
    (16, RETURN, "return"),
    (17, INCLUDE, "include"),
    (18, SIZEOF, "sizeof"),
    (19, IF, "if"),
    (20, ELSE, "else"),
    (21, WHILE, "while"),
    (22, FOR, "for"),
    (23, DO, "do"),
    (24, BREAK, "break"),
    (25, CONTINUE, "continue"),
    (26, SWITCH, "switch"),
    (27, CASE, "case"),
    (28, DEFAULT, "default"),
    (29, GOTO, "goto"),
    (30, TYPEDEF, "typedef"),
}
