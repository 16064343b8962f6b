//! Identifier interning.
//!
//! spec.md §5 fixes the whole pipeline as single-threaded cooperative, so
//! unlike the teacher's `DashMap`-backed interner (built for concurrent
//! compilation units) this one is a plain owned table: an [`Interner`] is
//! created once by the driver and threaded through the passes that need to
//! turn an identifier into a [`Name`] or back.

use rustc_hash::FxHashMap;

/// A compact, `Copy` handle to an interned identifier string.
///
/// Two `Name`s compare equal iff they were interned from equal strings;
/// comparison is a `u32` comparison, never a string comparison.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Name(u32);

impl std::fmt::Debug for Name {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Name({})", self.0)
    }
}

/// Owns the string table identifiers are interned into.
#[derive(Default)]
pub struct Interner {
    strings: Vec<Box<str>>,
    lookup: FxHashMap<Box<str>, Name>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Intern `text`, returning its (possibly newly allocated) `Name`.
    pub fn intern(&mut self, text: &str) -> Name {
        if let Some(&name) = self.lookup.get(text) {
            return name;
        }
        let name = Name(self.strings.len() as u32);
        let boxed: Box<str> = text.into();
        self.strings.push(boxed.clone());
        self.lookup.insert(boxed, name);
        name
    }

    /// Resolve a `Name` back to its text.
    ///
    /// Panics if `name` was not produced by this interner (the analogue of
    /// dereferencing a dangling handle — a programmer bug, not a user
    /// error).
    pub fn resolve(&self, name: Name) -> &str {
        &self.strings[name.0 as usize]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_same_text_returns_same_name() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("foo");
        assert_eq!(a, b);
    }

    #[test]
    fn interning_distinct_text_returns_distinct_names() {
        let mut interner = Interner::new();
        let a = interner.intern("foo");
        let b = interner.intern("bar");
        assert_ne!(a, b);
    }

    #[test]
    fn resolve_round_trips() {
        let mut interner = Interner::new();
        let name = interner.intern("hello");
        assert_eq!(interner.resolve(name), "hello");
    }

    #[quickcheck_macros::quickcheck]
    fn intern_resolve_is_identity(text: String) -> bool {
        let mut interner = Interner::new();
        let name = interner.intern(&text);
        interner.resolve(name) == text
    }
}
