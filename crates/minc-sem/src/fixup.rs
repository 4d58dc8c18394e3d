//! Fix-up system: deferred validations retried until fixpoint.
//!
//! A fix-up is a completion that could not run at its registration point -
//! the canonical case is a variable whose struct type is not yet defined.
//! Each fix-up's `fix` is retried until it reports success; the system is
//! resolved when nothing unresolved remains. The context type `C` is
//! whatever state the fix-ups need - the parser passes its arena and symbol
//! table.

/// A deferred completion.
pub trait Fixup<C> {
    /// Attempts the completion. Returning `true` marks this fix-up resolved.
    fn fix(&mut self, cx: &mut C) -> bool;

    /// Teardown hook, called once when the system finishes.
    fn end(&mut self, _cx: &mut C) {}
}

struct FixupEntry<C> {
    fixup: Box<dyn Fixup<C>>,
    resolved: bool,
}

/// Registry of fix-ups.
pub struct FixupSystem<C> {
    fixups: Vec<FixupEntry<C>>,
}

impl<C> FixupSystem<C> {
    /// Creates an empty system.
    pub fn new() -> FixupSystem<C> {
        FixupSystem { fixups: Vec::new() }
    }

    /// Registers a fix-up.
    pub fn register(&mut self, fixup: Box<dyn Fixup<C>>) {
        self.fixups.push(FixupEntry { fixup, resolved: false });
    }

    /// Retries every unresolved fix-up until fixpoint.
    ///
    /// Returns `true` when the system is resolved. A pass that resolves
    /// nothing ends the iteration - the remaining fix-ups can never succeed.
    pub fn resolve_all(&mut self, cx: &mut C) -> bool {
        loop {
            let mut progressed = false;
            for entry in self.fixups.iter_mut().filter(|entry| !entry.resolved) {
                if entry.fixup.fix(cx) {
                    entry.resolved = true;
                    progressed = true;
                }
            }
            if self.is_resolved() {
                return true;
            }
            if !progressed {
                return false;
            }
        }
    }

    /// Number of fix-ups that have not resolved.
    pub fn unresolved_count(&self) -> usize {
        self.fixups.iter().filter(|entry| !entry.resolved).count()
    }

    /// True when no unresolved fix-up remains.
    pub fn is_resolved(&self) -> bool {
        self.unresolved_count() == 0
    }

    /// Total number of registered fix-ups.
    pub fn len(&self) -> usize {
        self.fixups.len()
    }

    /// True when nothing was registered.
    pub fn is_empty(&self) -> bool {
        self.fixups.is_empty()
    }

    /// Runs every fix-up's `end` hook and clears the registry.
    pub fn finish(&mut self, cx: &mut C) {
        for entry in &mut self.fixups {
            entry.fixup.end(cx);
        }
        self.fixups.clear();
    }
}

impl<C> Default for FixupSystem<C> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Context: the set of "defined" values fix-ups wait for.
    struct Defined(Vec<u32>);

    struct WaitFor {
        target: u32,
        ended: bool,
    }

    impl Fixup<Defined> for WaitFor {
        fn fix(&mut self, cx: &mut Defined) -> bool {
            cx.0.contains(&self.target)
        }

        fn end(&mut self, _cx: &mut Defined) {
            self.ended = true;
        }
    }

    #[test]
    fn test_empty_system_is_resolved() {
        let mut system: FixupSystem<Defined> = FixupSystem::new();
        assert!(system.is_resolved());
        assert!(system.resolve_all(&mut Defined(vec![])));
    }

    #[test]
    fn test_resolves_when_target_appears() {
        let mut system = FixupSystem::new();
        system.register(Box::new(WaitFor { target: 7, ended: false }));
        assert!(!system.resolve_all(&mut Defined(vec![])));
        assert_eq!(system.unresolved_count(), 1);

        assert!(system.resolve_all(&mut Defined(vec![7])));
        assert!(system.is_resolved());
    }

    #[test]
    fn test_resolved_fixups_not_retried() {
        struct CountingFixup {
            calls: std::rc::Rc<std::cell::Cell<u32>>,
        }
        impl Fixup<()> for CountingFixup {
            fn fix(&mut self, _cx: &mut ()) -> bool {
                self.calls.set(self.calls.get() + 1);
                true
            }
        }

        let calls = std::rc::Rc::new(std::cell::Cell::new(0));
        let mut system = FixupSystem::new();
        system.register(Box::new(CountingFixup { calls: calls.clone() }));
        assert!(system.resolve_all(&mut ()));
        assert!(system.resolve_all(&mut ()));
        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn test_partial_resolution_reported() {
        let mut system = FixupSystem::new();
        system.register(Box::new(WaitFor { target: 1, ended: false }));
        system.register(Box::new(WaitFor { target: 2, ended: false }));
        assert!(!system.resolve_all(&mut Defined(vec![1])));
        assert_eq!(system.unresolved_count(), 1);
    }

    #[test]
    fn test_finish_clears_registry() {
        let mut system = FixupSystem::new();
        system.register(Box::new(WaitFor { target: 1, ended: false }));
        system.finish(&mut Defined(vec![]));
        assert!(system.is_empty());
    }
}
