//! minc-sem - Scopes, Symbols and Fix-ups
//!
//! ============================================================================
//! NAME AND LAYOUT BOOKKEEPING
//! ============================================================================
//!
//! This crate holds the three bookkeeping structures the parser drives while
//! it walks the token stream:
//!
//! 1. SCOPE STACK ([`ScopeStack`])
//!    A LIFO stack of lexical scopes. Each scope carries an ordered entity
//!    list and a running byte total. The parser pushes one entity per
//!    declared variable; walking the stack backwards is how stack offsets
//!    and struct field offsets find the previous declaration. The stack is
//!    generic over the entity type - the parser supplies its own record
//!    linking a variable node to its offset.
//!
//! 2. SYMBOL TABLE ([`SymbolTable`])
//!    A stack of flat name-to-symbol frames. A new frame is pushed on
//!    function and aggregate entry and popped on exit; lookup scans the
//!    ACTIVE frame only, never older frames. Native functions are a
//!    distinct symbol kind the parser uses to mark functions.
//!
//! 3. FIX-UP SYSTEM ([`FixupSystem`])
//!    A registry of deferred completions. A variable may name `struct S`
//!    before `S` is defined; the parser registers a fix-up that re-resolves
//!    the type later. Fix-ups are retried until fixpoint; anything still
//!    unresolved at end of parse is promoted to a fatal error by the caller.
//!
//! All three are plain owned values threaded through the parser context -
//! there is no global state and no interior mutability here.

pub mod fixup;
pub mod scope;
pub mod symtab;

pub use fixup::{Fixup, FixupSystem};
pub use scope::{Scope, ScopeStack};
pub use symtab::{SymbolEntry, SymbolKind, SymbolTable};
