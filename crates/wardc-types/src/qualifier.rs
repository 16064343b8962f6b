//! Qualifier sets (spec.md §3 "A qualified type is `(bare type, qualifier
//! set ⊆ {@cst, @mut})`").

/// One of the two surface qualifiers. `@cst` = immutable ownership,
/// `@mut` = exclusive-mutable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Qualifier {
    Cst,
    Mut,
}

/// A subset of `{@cst, @mut}`, stored as a two-bit set.
///
/// The empty set means "unresolved" (spec.md §3): inference has not yet
/// picked a qualifier for this use site.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub struct QualifierSet(u8);

const CST_BIT: u8 = 0b01;
const MUT_BIT: u8 = 0b10;

impl QualifierSet {
    pub const fn empty() -> Self {
        Self(0)
    }

    pub fn cst() -> Self {
        Self(CST_BIT)
    }

    pub fn mutable() -> Self {
        Self(MUT_BIT)
    }

    pub fn is_unresolved(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, q: Qualifier) -> bool {
        match q {
            Qualifier::Cst => self.0 & CST_BIT != 0,
            Qualifier::Mut => self.0 & MUT_BIT != 0,
        }
    }

    pub fn insert(self, q: Qualifier) -> Self {
        match q {
            Qualifier::Cst => Self(self.0 | CST_BIT),
            Qualifier::Mut => Self(self.0 | MUT_BIT),
        }
    }

    pub fn union(self, other: Self) -> Self {
        Self(self.0 | other.0)
    }

    pub fn is_mutable(self) -> bool {
        self.contains(Qualifier::Mut)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_is_unresolved() {
        assert!(QualifierSet::empty().is_unresolved());
        assert!(!QualifierSet::cst().is_unresolved());
    }

    #[test]
    fn insert_and_contains() {
        let q = QualifierSet::empty().insert(Qualifier::Mut);
        assert!(q.contains(Qualifier::Mut));
        assert!(!q.contains(Qualifier::Cst));
    }
}
