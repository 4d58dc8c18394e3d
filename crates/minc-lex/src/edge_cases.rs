//! Edge case and property tests for minc-lex.
