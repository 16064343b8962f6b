//! A tree-walking interpreter for the register IR `wardc-ir` produces
//! (spec.md §4.7): runs a [`wardc_ir::Unit`] starting from a named entry
//! function and reports the result or the first [`InterpError`]
//! encountered.
//!
//! Grounded on `examples/H1ghBre4k3r-y-lang`'s `interpreter` module — a
//! scope-stack tree-walker over its own bytecode-free AST — retargeted
//! here to walk flattened IR blocks instead of AST statements, since
//! spec.md §4.6 already lowers control flow to `branch`/`jump`/`return`.

pub mod builtins;
pub mod error;
pub mod frame;
pub mod interp;
pub mod value;

pub use error::InterpError;
pub use interp::Interpreter;
pub use value::Value;

use wardc_ir::Unit;

/// Run `entry` in `unit` with no arguments, the shape every spec.md §8
/// scenario uses (`main` takes nothing).
pub fn run(unit: &Unit, entry: &str) -> Result<Value, InterpError> {
    Interpreter::new(unit).run(entry, Vec::new())
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_ast::{Decl, DeclKind, Module, ModuleId, Stmt, StmtKind};
    use wardc_ir::{lower_module, BasicBlock, Function};
    use wardc_sem::analyze_module;
    use wardc_types::TypeContext;
    use wardc_util::{Interner, SourceRange};

    /// End-to-end: an empty `main` body, bound, solved, lowered and
    /// interpreted, completing with no error.
    #[test]
    fn empty_main_program_runs_to_completion() {
        let mut interner = Interner::new();
        let mut types = TypeContext::new();
        let name = interner.intern("prog");
        let mut module = Module::new(ModuleId(0), name);

        let root = module.root_context;
        let body_context = module.contexts.new_context(Some(root));
        let body = module.alloc_stmt(Stmt {
            range: SourceRange::synthetic(),
            kind: StmtKind::Brace { context: body_context, stmts: Vec::new() },
        });

        let main_decl = module.alloc_decl(Decl {
            range: SourceRange::synthetic(),
            name: None,
            modifiers: Vec::new(),
            attrs: Vec::new(),
            kind: DeclKind::MainCode { context: body_context, body },
        });
        module.add_top_level(main_decl);

        let solved = analyze_module(&mut module, &mut types, &mut interner);
        let unit = lower_module(&mut module, &mut types, &solved, &interner);

        let result = run(&unit, "main");
        assert!(result.is_ok());
    }

    #[test]
    fn hand_built_unit_runs_directly() {
        let types = TypeContext::new();
        let mut f = Function::new("main", types.error_type());
        f.entry = "entry".to_string();
        let mut entry = BasicBlock::new("entry");
        entry.instructions.push(wardc_ir::Instr::Return { value: Some(wardc_ir::Operand::Const(wardc_ir::Const::Int(7))) });
        f.blocks.insert("entry".to_string(), entry);
        let mut unit = Unit::new();
        unit.functions.insert(f.name.clone(), f);

        assert_eq!(run(&unit, "main").unwrap(), Value::Int(7));
    }
}
