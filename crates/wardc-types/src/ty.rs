//! The hash-consed type universe (spec.md §4.1).
//!
//! Grounded on `faxc-sem/src/types.rs`'s `Type` enum, kept variant-for-
//! variant where a teacher variant maps onto a spec.md kind, combined with
//! `faxc-util/src/symbol/interner.rs`'s intern-by-structural-hash pattern
//! (bucket + linear probe) applied to type structure instead of strings.

use crate::qualifier::QualifierSet;
use rustc_hash::{FxHashMap, FxHasher};
use smallvec::SmallVec;
use std::hash::{Hash, Hasher};
use wardc_util::{define_idx, Idx, IndexVec, Name};

define_idx!(
    /// A handle into [`TypeContext`]'s arena. Two `TypeId`s compare equal
    /// iff they name the same interned type (spec.md §3 invariant 1).
    TypeId
);

define_idx!(TypeVarId);

/// Opaque identity for a generic parameter's originating declaration.
/// `wardc-types` sits below `wardc-ast`, so it cannot name a `DeclId`
/// directly; callers (the AST and later passes) mint this from whatever
/// handle they already have (typically a `DeclId` cast to `u64`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlaceholderKey(pub u64);

/// Opaque identity for a nominal type's originating declaration (struct,
/// union or interface), same rationale as [`PlaceholderKey`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NominalKey(pub u64);

/// Opaque identity for a member declaration stored in a
/// [`MemberLookupTable`]; again a handle minted by the caller.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MemberKey(pub u64);

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum NominalKind {
    Struct,
    Union,
    Interface,
}

/// `(bare type, qualifier set)` — spec.md §3 "qualified type".
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct QualifiedType {
    pub base: TypeId,
    pub qualifiers: QualifierSet,
}

impl QualifiedType {
    pub fn new(base: TypeId, qualifiers: QualifierSet) -> Self {
        Self { base, qualifiers }
    }

    pub fn unresolved(base: TypeId) -> Self {
        Self { base, qualifiers: QualifierSet::empty() }
    }
}

/// One parameter slot of a function type: an optional argument label plus
/// the parameter's qualified type.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FunctionParam {
    pub label: Option<Name>,
    pub ty: QualifiedType,
}

/// The structural content of one interned type. Two `TypeData` values that
/// are `==` are always interned to the same [`TypeId`] (spec.md §3
/// invariant 1); nested types are referenced by already-interned `TypeId`s
/// so equality here never recurses more than one level deep.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum TypeData {
    /// "The type of a type" — used for type-member constraints (`T::name`).
    Kind(TypeId),
    Var(TypeVarId),
    Placeholder(PlaceholderKey),
    /// Invariant: `base` is never itself `BoundGeneric` (merged on
    /// construction, spec.md §3 invariant 2). `bindings` is kept sorted by
    /// `PlaceholderKey` so structurally-equal substitutions hash/compare
    /// equal regardless of construction order.
    BoundGeneric { base: TypeId, bindings: SmallVec<[(PlaceholderKey, TypeId); 4]> },
    Function {
        generic_params: SmallVec<[PlaceholderKey; 2]>,
        domain: SmallVec<[FunctionParam; 4]>,
        codomain: QualifiedType,
    },
    Nominal { kind: NominalKind, key: NominalKey },
    Builtin(Name),
    Error,
}

/// A per-nominal-type cache from member name to the declarations that
/// provide it, merged from the type body and all extensions (spec.md §3
/// "Member-lookup table").
#[derive(Clone, Debug, Default)]
pub struct MemberLookupTable {
    generation: u32,
    members: FxHashMap<Name, SmallVec<[MemberKey; 2]>>,
}

impl MemberLookupTable {
    pub fn get(&self, name: Name) -> &[MemberKey] {
        self.members.get(&name).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

fn structural_hash(data: &TypeData) -> u64 {
    let mut hasher = FxHasher::default();
    data.hash(&mut hasher);
    hasher.finish()
}

/// Context-owned hash-consing table for [`TypeData`], plus the member
/// lookup cache and generation counter spec.md §5 assigns to the shared
/// compiler context.
pub struct TypeContext {
    arena: IndexVec<TypeId, TypeData>,
    buckets: FxHashMap<u64, SmallVec<[TypeId; 4]>>,
    next_var: u32,
    error_type: TypeId,
    generation: u32,
    member_tables: FxHashMap<NominalKey, MemberLookupTable>,
}

impl Default for TypeContext {
    fn default() -> Self {
        Self::new()
    }
}

impl TypeContext {
    pub fn new() -> Self {
        let mut arena = IndexVec::new();
        let error_type = arena.push(TypeData::Error);
        let mut buckets: FxHashMap<u64, SmallVec<[TypeId; 4]>> = FxHashMap::default();
        buckets.entry(structural_hash(&TypeData::Error)).or_default().push(error_type);
        Self { arena, buckets, next_var: 0, error_type, generation: 0, member_tables: FxHashMap::default() }
    }

    pub fn error_type(&self) -> TypeId {
        self.error_type
    }

    pub fn data(&self, id: TypeId) -> &TypeData {
        &self.arena[id]
    }

    pub fn generation(&self) -> u32 {
        self.generation
    }

    /// Admit a type extension: bumps the *global* generation counter,
    /// invalidating every cached member-lookup table (spec.md §9 Open
    /// Question (a), resolved in SPEC_FULL.md §3).
    pub fn bump_generation(&mut self) {
        self.generation += 1;
    }

    /// The structural hash-consing constructor every `get_*` below funnels
    /// through: hash the content, linear-probe the bucket for a
    /// structurally equal entry, otherwise insert (spec.md §4.1
    /// "Interning rule").
    fn intern(&mut self, data: TypeData) -> TypeId {
        let hash = structural_hash(&data);
        let bucket = self.buckets.entry(hash).or_default();
        for &existing in bucket.iter() {
            if self.arena[existing] == data {
                return existing;
            }
        }
        let id = self.arena.push(data);
        self.buckets.entry(hash).or_default().push(id);
        id
    }

    pub fn get_kind(&mut self, of: TypeId) -> TypeId {
        self.intern(TypeData::Kind(of))
    }

    pub fn get_type_var(&mut self) -> TypeId {
        let id = TypeVarId(self.next_var);
        self.next_var += 1;
        // Each fresh variable is structurally distinct (distinct id), so
        // this never collides with a previously interned variable.
        self.intern(TypeData::Var(id))
    }

    pub fn get_placeholder(&mut self, key: PlaceholderKey) -> TypeId {
        self.intern(TypeData::Placeholder(key))
    }

    /// Build a bound generic, merging into the base if it is itself bound
    /// (spec.md §3 invariant 2: "A bound generic's base type is never
    /// itself a bound generic").
    pub fn get_bound_generic(&mut self, base: TypeId, bindings: &[(PlaceholderKey, TypeId)]) -> TypeId {
        let mut merged: SmallVec<[(PlaceholderKey, TypeId); 4]> = SmallVec::new();
        let real_base = match self.data(base).clone() {
            TypeData::BoundGeneric { base: inner_base, bindings: inner_bindings } => {
                merged.extend(inner_bindings);
                inner_base
            }
            _ => base,
        };
        merged.extend(bindings.iter().copied());
        // Later bindings (the new ones) win over inherited ones for the
        // same placeholder.
        merged.sort_by_key(|(k, _)| k.0);
        merged.dedup_by(|a, b| {
            if a.0 == b.0 {
                // keep the later entry (which, after a stable sort_by_key,
                // is `b`); `dedup_by` keeps the first of a pair, so copy.
                b.1 = a.1;
                true
            } else {
                false
            }
        });
        self.intern(TypeData::BoundGeneric { base: real_base, bindings: merged })
    }

    pub fn get_function(
        &mut self,
        generic_params: &[PlaceholderKey],
        domain: &[FunctionParam],
        codomain: QualifiedType,
    ) -> TypeId {
        self.intern(TypeData::Function {
            generic_params: generic_params.iter().copied().collect(),
            domain: domain.iter().cloned().collect(),
            codomain,
        })
    }

    fn get_nominal(&mut self, kind: NominalKind, key: NominalKey) -> TypeId {
        self.intern(TypeData::Nominal { kind, key })
    }

    pub fn get_interface(&mut self, key: NominalKey) -> TypeId {
        self.get_nominal(NominalKind::Interface, key)
    }

    pub fn get_struct(&mut self, key: NominalKey) -> TypeId {
        self.get_nominal(NominalKind::Struct, key)
    }

    pub fn get_union(&mut self, key: NominalKey) -> TypeId {
        self.get_nominal(NominalKind::Union, key)
    }

    pub fn get_builtin(&mut self, name: Name) -> TypeId {
        self.intern(TypeData::Builtin(name))
    }

    /// The info word (spec.md §6): low bits = boolean properties, high 16
    /// bits = the variable id when `ty` is itself a type variable.
    pub fn info_word(&self, ty: TypeId) -> u64 {
        const HAS_TYPE_VAR: u64 = 1 << 0;
        const HAS_PLACEHOLDER: u64 = 1 << 1;

        fn visit(ctx: &TypeContext, ty: TypeId, seen: &mut rustc_hash::FxHashSet<TypeId>) -> (bool, bool) {
            if !seen.insert(ty) {
                return (false, false);
            }
            match ctx.data(ty) {
                TypeData::Var(_) => (true, false),
                TypeData::Placeholder(_) => (false, true),
                TypeData::Kind(inner) => visit(ctx, *inner, seen),
                TypeData::BoundGeneric { base, bindings } => {
                    let (mut hv, mut hp) = visit(ctx, *base, seen);
                    for (_, t) in bindings {
                        let (v, p) = visit(ctx, *t, seen);
                        hv |= v;
                        hp |= p;
                    }
                    (hv, hp)
                }
                TypeData::Function { domain, codomain, .. } => {
                    let (mut hv, mut hp) = visit(ctx, codomain.base, seen);
                    for p in domain {
                        let (v, ph) = visit(ctx, p.ty.base, seen);
                        hv |= v;
                        hp |= ph;
                    }
                    (hv, hp)
                }
                TypeData::Nominal { .. } | TypeData::Builtin(_) | TypeData::Error => (false, false),
            }
        }

        let mut seen = rustc_hash::FxHashSet::default();
        let (has_var, has_placeholder) = visit(self, ty, &mut seen);
        let mut word = 0u64;
        if has_var {
            word |= HAS_TYPE_VAR;
        }
        if has_placeholder {
            word |= HAS_PLACEHOLDER;
        }
        if let TypeData::Var(id) = self.data(ty) {
            word |= (id.0 as u64) << 16;
        }
        word
    }

    pub fn has_type_var(&self, ty: TypeId) -> bool {
        self.info_word(ty) & 1 != 0
    }

    pub fn has_placeholder(&self, ty: TypeId) -> bool {
        self.info_word(ty) & 2 != 0
    }

    /// Fetch (rebuilding if stale) the member-lookup table for a nominal
    /// type. `rebuild` is called only when the cached table's generation
    /// doesn't match the context's current generation (spec.md §3
    /// invariant 5).
    pub fn member_table(
        &mut self,
        nominal: NominalKey,
        rebuild: impl FnOnce() -> FxHashMap<Name, SmallVec<[MemberKey; 2]>>,
    ) -> &MemberLookupTable {
        let current_gen = self.generation;
        let needs_rebuild = match self.member_tables.get(&nominal) {
            Some(table) => table.generation != current_gen,
            None => true,
        };
        if needs_rebuild {
            let members = rebuild();
            self.member_tables.insert(nominal, MemberLookupTable { generation: current_gen, members });
        }
        self.member_tables.get(&nominal).expect("just inserted")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_util::Interner;

    #[test]
    fn structurally_equal_types_share_identity() {
        let mut interner = Interner::new();
        let int_name = interner.intern("Int");
        let mut ctx = TypeContext::new();
        let a = ctx.get_builtin(int_name);
        let b = ctx.get_builtin(int_name);
        assert_eq!(a, b);
    }

    #[test]
    fn distinct_builtins_are_distinct() {
        let mut interner = Interner::new();
        let int_name = interner.intern("Int");
        let bool_name = interner.intern("Bool");
        let mut ctx = TypeContext::new();
        let a = ctx.get_builtin(int_name);
        let b = ctx.get_builtin(bool_name);
        assert_ne!(a, b);
    }

    #[test]
    fn bound_generic_base_is_never_itself_bound_generic() {
        let mut interner = Interner::new();
        let name = interner.intern("T");
        let mut ctx = TypeContext::new();
        let inner = ctx.get_builtin(name);
        let ph1 = PlaceholderKey(1);
        let ph2 = PlaceholderKey(2);
        let once = ctx.get_bound_generic(inner, &[(ph1, inner)]);
        let twice = ctx.get_bound_generic(once, &[(ph2, inner)]);
        match ctx.data(twice) {
            TypeData::BoundGeneric { base, bindings } => {
                assert_eq!(*base, inner);
                assert_eq!(bindings.len(), 2);
            }
            other => panic!("expected BoundGeneric, got {:?}", other),
        }
    }

    #[test]
    fn fresh_type_vars_are_distinct() {
        let mut ctx = TypeContext::new();
        let a = ctx.get_type_var();
        let b = ctx.get_type_var();
        assert_ne!(a, b);
    }

    #[test]
    fn info_word_flags_type_var() {
        let mut ctx = TypeContext::new();
        let v = ctx.get_type_var();
        assert!(ctx.has_type_var(v));
        assert!(!ctx.has_placeholder(v));
    }

    #[test]
    fn info_word_flags_placeholder_through_function() {
        let mut interner = Interner::new();
        let int_name = interner.intern("Int");
        let mut ctx = TypeContext::new();
        let ph = ctx.get_placeholder(PlaceholderKey(1));
        let int_ty = ctx.get_builtin(int_name);
        let f = ctx.get_function(
            &[PlaceholderKey(1)],
            &[FunctionParam { label: None, ty: QualifiedType::unresolved(ph) }],
            QualifiedType::unresolved(int_ty),
        );
        assert!(ctx.has_placeholder(f));
        assert!(!ctx.has_type_var(f));
    }

    #[test]
    fn member_table_rebuilds_only_when_generation_changes() {
        let mut ctx = TypeContext::new();
        let nominal = NominalKey(1);
        let mut build_calls = 0;
        {
            let _t = ctx.member_table(nominal, || {
                build_calls += 1;
                FxHashMap::default()
            });
        }
        {
            let _t = ctx.member_table(nominal, || {
                build_calls += 1;
                FxHashMap::default()
            });
        }
        assert_eq!(build_calls, 1);
        ctx.bump_generation();
        {
            let _t = ctx.member_table(nominal, || {
                build_calls += 1;
                FxHashMap::default()
            });
        }
        assert_eq!(build_calls, 2);
    }
}
