//! Symbol table frames.
//!
//! Symbols live in a stack of flat name-to-entry tables. The parser pushes a
//! new frame when it enters a function or an aggregate body and pops it on
//! exit; lookup scans the active frame only. Registering a name twice in one
//! frame is rejected - the parser turns that into a positioned error.

use indexmap::IndexMap;
use minc_util::{NodeId, Symbol};

/// What a symbol stands for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SymbolKind {
    /// A parsed node: a struct, union or function definition.
    Node(NodeId),
    /// A function provided by the runtime rather than the source.
    NativeFunction,
    /// Reserved for callers that need a placeholder.
    Unknown,
}

/// A registered symbol.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SymbolEntry {
    /// The symbol's name.
    pub name: Symbol,
    /// What the name refers to.
    pub kind: SymbolKind,
}

/// A stack of symbol frames; the bottom frame is the global one.
#[derive(Debug)]
pub struct SymbolTable {
    frames: Vec<IndexMap<Symbol, SymbolEntry>>,
}

impl SymbolTable {
    /// Creates a table with the global frame active.
    pub fn new() -> SymbolTable {
        SymbolTable { frames: vec![IndexMap::new()] }
    }

    /// Pushes a fresh active frame.
    pub fn push_frame(&mut self) {
        self.frames.push(IndexMap::new());
    }

    /// Pops the active frame, restoring the previous one.
    pub fn pop_frame(&mut self) {
        debug_assert!(self.frames.len() > 1, "pop_frame on the global frame");
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    fn active(&self) -> &IndexMap<Symbol, SymbolEntry> {
        self.frames.last().expect("symbol table always holds the global frame")
    }

    /// Looks `name` up in the active frame only.
    pub fn get(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.active().get(&name)
    }

    /// Looks `name` up and returns it only when it is a native function.
    pub fn get_native_function(&self, name: Symbol) -> Option<&SymbolEntry> {
        self.get(name).filter(|entry| entry.kind == SymbolKind::NativeFunction)
    }

    /// Registers `name` in the active frame.
    ///
    /// Returns `false` when the name is already present there; the caller
    /// reports the duplicate.
    pub fn register(&mut self, name: Symbol, kind: SymbolKind) -> bool {
        let frame = self.frames.last_mut().expect("symbol table always holds the global frame");
        if frame.contains_key(&name) {
            return false;
        }
        frame.insert(name, SymbolEntry { name, kind });
        true
    }

    /// Registers a native function name in the active frame.
    pub fn register_native_function(&mut self, name: Symbol) -> bool {
        self.register(name, SymbolKind::NativeFunction)
    }

    /// The node a symbol resolves to, if it is a node symbol.
    pub fn get_node(&self, name: Symbol) -> Option<NodeId> {
        match self.get(name)?.kind {
            SymbolKind::Node(node) => Some(node),
            _ => None,
        }
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}
