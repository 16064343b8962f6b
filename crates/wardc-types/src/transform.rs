//! Type transformers (spec.md §4.1): the **opener** and the **reifier**,
//! both built as instances of one generic recursive-descent transformer so
//! the two share the structural-walk logic.

use crate::ty::{FunctionParam, PlaceholderKey, QualifiedType, TypeContext, TypeData, TypeId, TypeVarId};
use rustc_hash::FxHashMap;

/// Recursively rebuilds `ty`'s structure, asking `leaf` to decide what a
/// `Var`/`Placeholder` leaf becomes, and re-interning composite nodes.
/// Shared by [`open`] and [`Reifier::reify`].
fn rewrite(
    ctx: &mut TypeContext,
    ty: TypeId,
    leaf: &mut impl FnMut(&mut TypeContext, TypeId) -> Option<TypeId>,
) -> Option<TypeId> {
    if let Some(replaced) = leaf(ctx, ty) {
        return Some(replaced);
    }
    match ctx.data(ty).clone() {
        TypeData::Var(_) | TypeData::Placeholder(_) => unreachable!("leaf() handles these variants"),
        TypeData::Kind(inner) => {
            let inner = rewrite(ctx, inner, leaf)?;
            Some(ctx.get_kind(inner))
        }
        TypeData::BoundGeneric { base, bindings } => {
            let base = rewrite(ctx, base, leaf)?;
            let mut new_bindings = Vec::with_capacity(bindings.len());
            for (k, v) in bindings {
                new_bindings.push((k, rewrite(ctx, v, leaf)?));
            }
            Some(ctx.get_bound_generic(base, &new_bindings))
        }
        TypeData::Function { generic_params, domain, codomain } => {
            let mut new_domain = Vec::with_capacity(domain.len());
            for p in domain {
                let base = rewrite(ctx, p.ty.base, leaf)?;
                new_domain.push(FunctionParam { label: p.label, ty: QualifiedType::new(base, p.ty.qualifiers) });
            }
            let codomain_base = rewrite(ctx, codomain.base, leaf)?;
            let codomain = QualifiedType::new(codomain_base, codomain.qualifiers);
            Some(ctx.get_function(&generic_params, &new_domain, codomain))
        }
        TypeData::Nominal { .. } | TypeData::Builtin(_) | TypeData::Error => Some(ty),
    }
}

/// Opens a generic type: replaces each unbound placeholder with a fresh
/// type variable, memoizing so every occurrence of the same placeholder
/// maps to the same fresh variable within one call.
///
/// Contract (spec.md §4.1): opening a type with no placeholders is the
/// identity. We honor this both semantically (the rewrite is a no-op when
/// there is nothing to replace) and for performance, via the info-word
/// short circuit.
pub fn open(ctx: &mut TypeContext, ty: TypeId) -> TypeId {
    let mut scratch = std::collections::HashSet::new();
    open_tracked(ctx, ty, &mut scratch)
}

/// Same contract as [`open`], but records every freshly minted type
/// variable into `created`. A solver that wants to tell "this variable
/// stands for a generic parameter opened at one use site" (and so may
/// join rather than fail on a non-linear conflict) from "this variable is
/// an ordinary inference variable" needs that provenance; plain `open`
/// throws it away for callers that don't care.
pub fn open_tracked(ctx: &mut TypeContext, ty: TypeId, created: &mut std::collections::HashSet<TypeVarId>) -> TypeId {
    if !ctx.has_placeholder(ty) {
        return ty;
    }
    let mut mapping: FxHashMap<PlaceholderKey, TypeId> = FxHashMap::default();
    let mut leaf = |ctx: &mut TypeContext, t: TypeId| -> Option<TypeId> {
        match ctx.data(t).clone() {
            TypeData::Placeholder(key) => {
                if let Some(&var) = mapping.get(&key) {
                    Some(var)
                } else {
                    let var = ctx.get_type_var();
                    mapping.insert(key, var);
                    if let TypeData::Var(id) = ctx.data(var) {
                        created.insert(*id);
                    }
                    Some(var)
                }
            }
            TypeData::Var(_) => Some(t),
            _ => None,
        }
    };
    rewrite(ctx, ty, &mut leaf).expect("open() never fails: leaf always returns Some for var/placeholder")
}

/// After solving, walks a type replacing each variable with its assigned
/// type (transitively through chains of variables), re-interning the
/// result. Returns `None` ("fails, returns the error type" per spec.md
/// §4.1 — callers that want the sentinel should map `None` to
/// `ctx.error_type()`) if any variable remains unbound.
pub struct Reifier<'a> {
    pub sigma: &'a FxHashMap<TypeVarId, TypeId>,
}

impl<'a> Reifier<'a> {
    pub fn new(sigma: &'a FxHashMap<TypeVarId, TypeId>) -> Self {
        Self { sigma }
    }

    pub fn reify(&mut self, ctx: &mut TypeContext, ty: TypeId) -> Option<TypeId> {
        let mut failed = false;
        let mut visiting = std::collections::HashSet::new();
        let result = Self::reify_inner(ctx, ty, self.sigma, &mut visiting, &mut failed);
        if failed {
            None
        } else {
            Some(result)
        }
    }

    /// Recurses structurally, setting `failed` the first time an unbound
    /// (or cyclic) variable is hit. Once `failed` is set the return value
    /// is meaningless filler (the error type) — callers must check the
    /// flag via [`Self::reify`], not the return value, which is why this
    /// helper is private.
    fn reify_inner(
        ctx: &mut TypeContext,
        ty: TypeId,
        sigma: &FxHashMap<TypeVarId, TypeId>,
        visiting: &mut std::collections::HashSet<TypeVarId>,
        failed: &mut bool,
    ) -> TypeId {
        if !ctx.has_type_var(ty) {
            return ty;
        }
        if *failed {
            return ctx.error_type();
        }
        match ctx.data(ty).clone() {
            TypeData::Var(id) => {
                if !visiting.insert(id) {
                    *failed = true;
                    return ctx.error_type();
                }
                let resolved = match sigma.get(&id).copied() {
                    Some(r) => r,
                    None => {
                        *failed = true;
                        visiting.remove(&id);
                        return ctx.error_type();
                    }
                };
                let result = Self::reify_inner(ctx, resolved, sigma, visiting, failed);
                visiting.remove(&id);
                result
            }
            TypeData::Placeholder(_) => ty,
            TypeData::Kind(inner) => {
                let inner = Self::reify_inner(ctx, inner, sigma, visiting, failed);
                ctx.get_kind(inner)
            }
            TypeData::BoundGeneric { base, bindings } => {
                let base = Self::reify_inner(ctx, base, sigma, visiting, failed);
                let new_bindings: Vec<_> = bindings
                    .into_iter()
                    .map(|(k, v)| (k, Self::reify_inner(ctx, v, sigma, visiting, failed)))
                    .collect();
                ctx.get_bound_generic(base, &new_bindings)
            }
            TypeData::Function { generic_params, domain, codomain } => {
                let new_domain: Vec<_> = domain
                    .into_iter()
                    .map(|p| {
                        let base = Self::reify_inner(ctx, p.ty.base, sigma, visiting, failed);
                        FunctionParam { label: p.label, ty: QualifiedType::new(base, p.ty.qualifiers) }
                    })
                    .collect();
                let codomain_base = Self::reify_inner(ctx, codomain.base, sigma, visiting, failed);
                let codomain = QualifiedType::new(codomain_base, codomain.qualifiers);
                ctx.get_function(&generic_params, &new_domain, codomain)
            }
            TypeData::Nominal { .. } | TypeData::Builtin(_) | TypeData::Error => ty,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ty::NominalKey;
    use wardc_util::Interner;

    #[test]
    fn opening_non_generic_type_is_identity() {
        let mut interner = Interner::new();
        let name = interner.intern("Int");
        let mut ctx = TypeContext::new();
        let builtin = ctx.get_builtin(name);
        assert_eq!(open(&mut ctx, builtin), builtin);
    }

    #[test]
    fn opening_replaces_placeholder_with_fresh_var() {
        let mut ctx = TypeContext::new();
        let ph = ctx.get_placeholder(PlaceholderKey(7));
        let opened = open(&mut ctx, ph);
        assert_ne!(opened, ph);
        assert!(ctx.has_type_var(opened));
    }

    #[test]
    fn opening_same_placeholder_twice_in_one_call_shares_the_variable() {
        let mut ctx = TypeContext::new();
        let ph = ctx.get_placeholder(PlaceholderKey(1));
        let struct_key = NominalKey(1);
        let nominal = ctx.get_struct(struct_key);
        let f = ctx.get_function(
            &[PlaceholderKey(1)],
            &[
                FunctionParam { label: None, ty: QualifiedType::unresolved(ph) },
                FunctionParam { label: None, ty: QualifiedType::unresolved(ph) },
            ],
            QualifiedType::unresolved(nominal),
        );
        let opened = open(&mut ctx, f);
        match ctx.data(opened).clone() {
            TypeData::Function { domain, .. } => {
                assert_eq!(domain[0].ty.base, domain[1].ty.base);
            }
            other => panic!("expected function, got {:?}", other),
        }
    }

    #[test]
    fn reifying_with_empty_substitution_is_identity_on_var_free_types() {
        let mut interner = Interner::new();
        let name = interner.intern("Int");
        let mut ctx = TypeContext::new();
        let builtin = ctx.get_builtin(name);
        let sigma = FxHashMap::default();
        let mut reifier = Reifier::new(&sigma);
        assert_eq!(reifier.reify(&mut ctx, builtin), Some(builtin));
    }

    #[test]
    fn reifying_unbound_variable_fails() {
        let mut ctx = TypeContext::new();
        let var = ctx.get_type_var();
        let sigma = FxHashMap::default();
        let mut reifier = Reifier::new(&sigma);
        assert_eq!(reifier.reify(&mut ctx, var), None);
    }

    #[test]
    fn reifying_bound_variable_substitutes() {
        let mut interner = Interner::new();
        let name = interner.intern("Int");
        let mut ctx = TypeContext::new();
        let builtin = ctx.get_builtin(name);
        let var_ty = ctx.get_type_var();
        let var_id = match ctx.data(var_ty) {
            TypeData::Var(id) => *id,
            _ => unreachable!(),
        };
        let mut sigma = FxHashMap::default();
        sigma.insert(var_id, builtin);
        let mut reifier = Reifier::new(&sigma);
        assert_eq!(reifier.reify(&mut ctx, var_ty), Some(builtin));
    }

    #[test]
    fn reifying_twice_is_idempotent() {
        let mut interner = Interner::new();
        let name = interner.intern("Int");
        let mut ctx = TypeContext::new();
        let builtin = ctx.get_builtin(name);
        let var_ty = ctx.get_type_var();
        let var_id = match ctx.data(var_ty) {
            TypeData::Var(id) => *id,
            _ => unreachable!(),
        };
        let mut sigma = FxHashMap::default();
        sigma.insert(var_id, builtin);
        let mut reifier = Reifier::new(&sigma);
        let once = reifier.reify(&mut ctx, var_ty);
        let twice = reifier.reify(&mut ctx, once.unwrap());
        assert_eq!(once, twice);
    }
}
