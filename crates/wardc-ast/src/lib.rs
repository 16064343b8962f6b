//! The AST and scope model a module is built from once parsing has
//! produced one: declarations, signatures, statements and expressions
//! live in per-category arenas owned by [`module::Module`], addressed by
//! the typed ids in [`ids`]. `visit`/`transform` give every later pass
//! (binding, constraint generation, lowering) a uniform way to walk or
//! rewrite that tree without each one re-deriving traversal order.

pub mod attr;
pub mod decl;
pub mod expr;
pub mod ids;
pub mod module;
pub mod ops;
pub mod scope;
pub mod sig;
pub mod stmt;
pub mod transform;
pub mod visit;

pub use attr::{Attribute, Modifier};
pub use decl::{Decl, DeclKind};
pub use expr::{Expr, ExprKind};
pub use ids::{DeclContextId, DeclId, ExprId, ModuleId, ScopeId, SigId, StmtId, SymbolId};
pub use module::Module;
pub use ops::AssignKind;
pub use scope::{ContextTree, DeclContext, Scope, Symbol, SymbolAttrs};
pub use sig::{ParameterSig, Sig, SigKind};
pub use stmt::{Stmt, StmtKind};
pub use transform::Transformer;
pub use visit::Visitor;
