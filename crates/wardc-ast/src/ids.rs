//! Arena handles (spec.md §9: cyclic graphs implemented as "arena +
//! index"). Every node category gets its own typed id so a transformer
//! can never plug, say, an `ExprId` into a field that expects a `SigId` —
//! the variant-acceptability check spec.md §4.2 calls for is therefore
//! enforced by the Rust type system at the category level; only
//! *same-category* variant mismatches need the runtime check (see
//! `transform.rs`).

use wardc_util::define_idx;

define_idx!(
    /// One module admitted to a compilation (spec.md §3: "a module's
    /// declaration context has no parent").
    ModuleId
);

define_idx!(DeclId);
define_idx!(SigId);
define_idx!(StmtId);
define_idx!(ExprId);
define_idx!(DeclContextId);
define_idx!(ScopeId);
define_idx!(SymbolId);

impl DeclId {
    /// `wardc-types` placeholders/nominals are identified by an opaque
    /// `u64` key (it cannot name `DeclId` directly); this is the
    /// canonical conversion every later pass uses.
    pub fn as_key(self) -> u64 {
        self.0 as u64
    }
}
