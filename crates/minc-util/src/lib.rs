//! minc-util - Core Utilities and Foundation Types
//!
//! ============================================================================
//! MODULE OVERVIEW
//! ============================================================================
//!
//! This crate provides the foundation types shared by every phase of the minc
//! compiler. The goal is the same as in any production compiler: cheap handles
//! instead of owned strings and pointers, so the hot lexer/parser loops never
//! allocate for the common cases.
//!
//! WHAT LIVES HERE:
//! ----------------
//! 1. STRING INTERNING ([`Symbol`])
//!    Identifiers, keywords, operator spellings and file names all appear
//!    thousands of times in a compilation. Interning stores each distinct
//!    string once and hands out a 4-byte index, making equality O(1).
//!
//! 2. TYPED INDICES ([`Idx`], [`IndexVec`], [`NodeId`])
//!    The AST is held in an arena (a vector of nodes) and every cross
//!    reference between nodes is a [`NodeId`] into that arena. Typed indices
//!    prevent mixing up id spaces at compile time, and stable indices are
//!    what make the AST's back-edges (node -> enclosing body -> node)
//!    representable without reference cycles.
//!
//! 3. SOURCE POSITIONS ([`Pos`])
//!    A 1-based line/column pair plus the interned file name. Every token
//!    and every node carries one; every diagnostic renders one.
//!
//! 4. DIAGNOSTICS ([`Level`], [`Diagnostic`], [`Handler`])
//!    Warnings are collected by a [`Handler`] and never abort. Fatal errors
//!    are values: [`CompileError`] propagates with `?` up to the driver,
//!    which renders it and terminates exactly once.
//!
//! 5. SIZES AND ALIGNMENT ([`align`])
//!    The byte-size constants of the target model and the padding math used
//!    for struct layout and stack offsets.
//!
//! DESIGN PRINCIPLES:
//! ------------------
//! - Zero-cost abstractions: `Symbol`, `Pos` and `NodeId` are `Copy` and at
//!   most 12 bytes; passing them around costs the same as the raw integers.
//! - No global mutable compiler state: everything stateful is owned by the
//!   compile session and threaded explicitly. The single exception is the
//!   string table, which is append-only and thread-safe.

pub mod align;
pub mod diagnostic;
pub mod error;
pub mod index_vec;
pub mod node_id;
pub mod pos;
pub mod symbol;

pub use align::{align_value, align_value_as_positive, padding};
pub use align::{DATA_SIZE_BYTE, DATA_SIZE_DDWORD, DATA_SIZE_DWORD, DATA_SIZE_WORD, DATA_SIZE_ZERO, STACK_ALIGNMENT};
pub use diagnostic::{Diagnostic, Handler, Level};
pub use error::{CompileError, Result};
pub use index_vec::{Idx, IndexVec};
pub use node_id::NodeId;
pub use pos::Pos;
pub use symbol::Symbol;
