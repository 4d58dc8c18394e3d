//! String interner backed by a lock-free map.
//!
//! The table maps string contents to indices through a `DashMap` (hashed with
//! `ahash`), so concurrent interning never blocks on a global lock in the
//! common already-interned case. Index-to-string resolution goes through a
//! plain `RwLock<Vec>` - resolution is rare compared to interning.

use ahash::RandomState;
use dashmap::DashMap;
use std::sync::{LazyLock, RwLock};

use super::KNOWN_SYMBOLS;

/// The global string table.
///
/// Seeded with [`KNOWN_SYMBOLS`] so the keyword constants in
/// [`super::kw`] have stable, predictable indices.
static STRING_TABLE: LazyLock<StringTable> = LazyLock::new(StringTable::new);

/// Runs `f` with the global string table.
pub(super) fn with_table<R>(f: impl FnOnce(&StringTable) -> R) -> R {
    f(&STRING_TABLE)
}

/// Append-only string table.
pub(super) struct StringTable {
    /// Maps string contents to table index.
    names: DashMap<&'static str, u32, RandomState>,

    /// Index to string, in interning order.
    strings: RwLock<Vec<&'static str>>,
}

impl StringTable {
    fn new() -> Self {
        let table = StringTable {
            names: DashMap::with_hasher(RandomState::new()),
            strings: RwLock::new(Vec::with_capacity(256)),
        };
        for &known in KNOWN_SYMBOLS {
            table.intern(known);
        }
        table
    }

    /// Interns `string`, returning its index.
    pub(super) fn intern(&self, string: &str) -> super::Symbol {
        if let Some(index) = self.names.get(string) {
            return super::Symbol(*index);
        }

        let mut strings = self.strings.write().expect("string table poisoned");
        // Recheck under the write lock: another thread may have raced us here.
        if let Some(index) = self.names.get(string) {
            return super::Symbol(*index);
        }

        let leaked: &'static str = Box::leak(string.to_owned().into_boxed_str());
        let index = u32::try_from(strings.len()).expect("string table overflow");
        strings.push(leaked);
        self.names.insert(leaked, index);
        super::Symbol(index)
    }

    /// Resolves an index back to its string.
    pub(super) fn resolve(&self, index: u32) -> &'static str {
        self.strings.read().expect("string table poisoned")[index as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::super::Symbol;

    #[test]
    fn test_interner_is_deduplicating() {
        let first = Symbol::intern("dedup_probe");
        let second = Symbol::intern("dedup_probe");
        assert_eq!(first.index(), second.index());
    }

    #[test]
    fn test_interner_assigns_fresh_indices() {
        let a = Symbol::intern("fresh_index_a");
        let b = Symbol::intern("fresh_index_b");
        assert_ne!(a.index(), b.index());
    }
}
