//! The tree-walking IR interpreter (spec.md §4.7): a frame stack plus a
//! cursor over the current function's blocks, executing one
//! [`wardc_ir::Instr`] at a time.
//!
//! Grounded on `examples/H1ghBre4k3r-y-lang/src/interpreter/mod.rs`'s
//! `Interpreter::run`/`run_statement` dispatch loop, retargeted from a
//! tree of statements to a flat block/instruction cursor (spec.md §4.6's
//! IR has already flattened control flow into `branch`/`jump`/`return`).

use std::rc::Rc;

use tracing::{debug, trace};
use wardc_ir::{AssignOp, Const, Instr, Operand, Unit};

use crate::builtins;
use crate::error::InterpError;
use crate::frame::Frame;
use crate::value::Value;

/// One of the three outcomes stepping through a block can produce: stay
/// in the same frame, call into (or return from) another, or the whole
/// program is done.
enum Step {
    Continue,
    Return(Value),
}

pub struct Interpreter<'u> {
    unit: &'u Unit,
    frames: Vec<Frame>,
}

impl<'u> Interpreter<'u> {
    pub fn new(unit: &'u Unit) -> Self {
        Self { unit, frames: Vec::new() }
    }

    /// Run `function` to completion with `args` bound to its first
    /// `args.len()` registers (spec.md §4.6's calling convention: a
    /// function's parameters occupy its lowest-numbered registers, in
    /// declaration order).
    pub fn run(&mut self, function: &str, args: Vec<Value>) -> Result<Value, InterpError> {
        let func = self.unit.function(function).ok_or_else(|| InterpError::UnknownFunction(function.to_string()))?;
        let mut frame = Frame::new(function, func.entry.clone());
        for (i, arg) in args.into_iter().enumerate() {
            frame.write(wardc_ir::Register(i as u32), arg);
        }
        self.frames.push(frame);
        self.run_to_completion()
    }

    fn run_to_completion(&mut self) -> Result<Value, InterpError> {
        loop {
            match self.step()? {
                Step::Continue => continue,
                Step::Return(value) => {
                    self.frames.pop();
                    if self.frames.is_empty() {
                        return Ok(value);
                    }
                    // A nested call returned to its caller: the caller's
                    // `apply`/`partial_apply` instruction already
                    // requested the callee be run synchronously via
                    // `call_function`, so control never actually reaches
                    // here for inter-frame calls (see `call_function`
                    // below) — this branch only fires for the outermost
                    // frame, handled above.
                    return Ok(value);
                }
            }
        }
    }

    /// The active frame. Every public entry point pushes a frame before
    /// stepping and this crate never calls `step`/`exec` except from
    /// within that window, so this should always find one — but the
    /// check is a real `Result`, not a panic, since spec.md §4.7 treats
    /// frame-stack underflow as a runtime error like any other.
    fn current(&mut self) -> Result<&mut Frame, InterpError> {
        self.frames.last_mut().ok_or(InterpError::FrameUnderflow)
    }

    fn step(&mut self) -> Result<Step, InterpError> {
        let frame = self.frames.last().ok_or(InterpError::FrameUnderflow)?;
        let func = self.unit.function(&frame.function).expect("frame names a real function");
        let block = func.block(&frame.block).ok_or_else(|| InterpError::UnknownBlock(frame.block.clone(), frame.function.clone()))?;
        let Some(instr) = block.instructions.get(frame.pc).cloned() else {
            return Err(InterpError::MissingTerminator(frame.block.clone()));
        };
        trace!(function = %frame.function, block = %frame.block, pc = frame.pc, ?instr, "executing");
        self.current()?.pc += 1;
        self.exec(&instr)
    }

    fn operand_value(&mut self, op: &Operand) -> Result<Value, InterpError> {
        match op {
            Operand::Register(r) => self.current()?.read(*r),
            Operand::Const(c) => Ok(const_value(c)),
        }
    }

    fn exec(&mut self, instr: &Instr) -> Result<Step, InterpError> {
        match instr {
            Instr::Alloc { dst, .. } | Instr::MakeRef { dst, .. } => {
                self.current()?.reserve(*dst);
                Ok(Step::Continue)
            }
            Instr::Assign { op, dst, src } => {
                match (op, src) {
                    (AssignOp::Move, Operand::Register(r)) | (AssignOp::Bind, Operand::Register(r)) => {
                        let r = *r;
                        self.current()?.alias(*dst, r);
                    }
                    _ => {
                        let value = self.operand_value(src)?;
                        self.current()?.write(*dst, value);
                    }
                }
                Ok(Step::Continue)
            }
            Instr::Apply { dst, callee, args } => {
                let callee_value = self.operand_value(callee)?;
                let arg_values = args.iter().map(|a| self.operand_value(a)).collect::<Result<Vec<_>, _>>()?;
                let result = self.call(&callee_value, arg_values)?;
                self.current()?.write(*dst, result);
                Ok(Step::Continue)
            }
            Instr::PartialApply { dst, func, captured } => {
                let captured_values = captured.iter().map(|a| self.operand_value(a)).collect::<Result<Vec<_>, _>>()?;
                let value = Value::Closure { func: func.as_str().into(), captured: Rc::new(captured_values) };
                self.current()?.write(*dst, value);
                Ok(Step::Continue)
            }
            Instr::Extract { dst, src, index } => {
                let value = self.operand_value(src)?;
                let extracted = match value {
                    Value::Struct(fields) => fields.get(*index as usize).cloned().unwrap_or(Value::Null),
                    _ => Value::Null,
                };
                self.current()?.write(*dst, extracted);
                Ok(Step::Continue)
            }
            Instr::Drop { .. } => Ok(Step::Continue),
            Instr::Branch { cond, then_label, else_label } => {
                let cond = self.operand_value(cond)?;
                let target = if cond.truthy() { then_label } else { else_label };
                self.current()?.jump_to(target.clone());
                Ok(Step::Continue)
            }
            Instr::Jump { label } => {
                self.current()?.jump_to(label.clone());
                Ok(Step::Continue)
            }
            Instr::Return { value } => {
                let value = match value {
                    Some(v) => self.operand_value(v)?,
                    None => Value::Null,
                };
                Ok(Step::Return(value))
            }
        }
    }

    /// Calls a value that should be callable: either a built-in
    /// (dispatched by name, no frame pushed) or a [`Value::Closure`] (a
    /// fresh frame pushed, run synchronously to completion, and popped
    /// before returning — the interpreter has no concurrency of its own,
    /// per spec.md §5's single-threaded pipeline).
    fn call(&mut self, callee: &Value, args: Vec<Value>) -> Result<Value, InterpError> {
        match callee {
            Value::Str(name) if builtins::is_builtin(name) => builtins::call(name, &args),
            Value::Closure { func, captured } => self.call_function(func, captured, args),
            other => Err(InterpError::NotCallable(other.to_string())),
        }
    }

    fn call_function(&mut self, func: &str, captured: &[Value], args: Vec<Value>) -> Result<Value, InterpError> {
        let function = self.unit.function(func).ok_or_else(|| InterpError::UnknownFunction(func.to_string()))?;
        debug!(function = %func, "calling");
        let mut frame = Frame::new(func, function.entry.clone());
        let mut i = 0u32;
        for value in captured.iter().cloned() {
            frame.write(wardc_ir::Register(i), value);
            i += 1;
        }
        for value in args {
            frame.write(wardc_ir::Register(i), value);
            i += 1;
        }
        self.frames.push(frame);
        loop {
            match self.step()? {
                Step::Continue => continue,
                Step::Return(value) => {
                    self.frames.pop();
                    return Ok(value);
                }
            }
        }
    }
}

fn const_value(c: &Const) -> Value {
    match c {
        Const::Null => Value::Null,
        Const::Bool(b) => Value::Bool(*b),
        Const::Int(i) => Value::Int(*i),
        Const::Float(x) => Value::Float(*x),
        Const::Str(s) => Value::Str(s.as_str().into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wardc_ir::{AssignOp, BasicBlock, Function, Instr, Operand, Register};
    use wardc_types::TypeId;
    use wardc_util::Idx;

    fn unit_with(f: Function) -> Unit {
        let mut unit = Unit::new();
        unit.functions.insert(f.name.clone(), f);
        unit
    }

    #[test]
    fn returns_constant() {
        let mut f = Function::new("main", TypeId::from_usize(0));
        f.entry = "entry".to_string();
        let mut entry = BasicBlock::new("entry");
        entry.instructions.push(Instr::Return { value: Some(Operand::Const(Const::Int(42))) });
        f.blocks.insert("entry".to_string(), entry);
        let unit = unit_with(f);

        let mut interp = Interpreter::new(&unit);
        assert_eq!(interp.run("main", vec![]).unwrap(), Value::Int(42));
    }

    #[test]
    fn branch_follows_true_arm() {
        let mut f = Function::new("main", TypeId::from_usize(0));
        f.entry = "entry".to_string();
        let mut entry = BasicBlock::new("entry");
        entry.instructions.push(Instr::Branch {
            cond: Operand::Const(Const::Bool(true)),
            then_label: "t".to_string(),
            else_label: "e".to_string(),
        });
        let mut then_block = BasicBlock::new("t");
        then_block.instructions.push(Instr::Return { value: Some(Operand::Const(Const::Int(1))) });
        let mut else_block = BasicBlock::new("e");
        else_block.instructions.push(Instr::Return { value: Some(Operand::Const(Const::Int(0))) });
        f.blocks.insert("entry".to_string(), entry);
        f.blocks.insert("t".to_string(), then_block);
        f.blocks.insert("e".to_string(), else_block);
        let unit = unit_with(f);

        let mut interp = Interpreter::new(&unit);
        assert_eq!(interp.run("main", vec![]).unwrap(), Value::Int(1));
    }

    #[test]
    fn apply_dispatches_builtin_without_pushing_a_frame() {
        let mut f = Function::new("main", TypeId::from_usize(0));
        f.entry = "entry".to_string();
        let mut entry = BasicBlock::new("entry");
        entry.instructions.push(Instr::Apply {
            dst: Register(0),
            callee: Operand::Const(Const::Str("__builtin_add".to_string())),
            args: vec![Operand::Const(Const::Int(1)), Operand::Const(Const::Int(2))],
        });
        entry.instructions.push(Instr::Return { value: Some(Operand::Register(Register(0))) });
        f.blocks.insert("entry".to_string(), entry);
        let unit = unit_with(f);

        let mut interp = Interpreter::new(&unit);
        assert_eq!(interp.run("main", vec![]).unwrap(), Value::Int(3));
    }

    #[test]
    fn calling_a_closure_runs_the_target_function() {
        let mut callee = Function::new("add_one", TypeId::from_usize(0));
        callee.entry = "entry".to_string();
        let mut callee_entry = BasicBlock::new("entry");
        callee_entry.instructions.push(Instr::Apply {
            dst: Register(1),
            callee: Operand::Const(Const::Str("__builtin_add".to_string())),
            args: vec![Operand::Register(Register(0)), Operand::Const(Const::Int(1))],
        });
        callee_entry.instructions.push(Instr::Return { value: Some(Operand::Register(Register(1))) });
        callee.blocks.insert("entry".to_string(), callee_entry);

        let mut main = Function::new("main", TypeId::from_usize(0));
        main.entry = "entry".to_string();
        let mut main_entry = BasicBlock::new("entry");
        main_entry.instructions.push(Instr::PartialApply { dst: Register(0), func: "add_one".to_string(), captured: vec![] });
        main_entry.instructions.push(Instr::Apply {
            dst: Register(1),
            callee: Operand::Register(Register(0)),
            args: vec![Operand::Const(Const::Int(4))],
        });
        main_entry.instructions.push(Instr::Return { value: Some(Operand::Register(Register(1))) });
        main.blocks.insert("entry".to_string(), main_entry);

        let mut unit = Unit::new();
        unit.functions.insert(callee.name.clone(), callee);
        unit.functions.insert(main.name.clone(), main);

        let mut interp = Interpreter::new(&unit);
        assert_eq!(interp.run("main", vec![]).unwrap(), Value::Int(5));
    }

    #[test]
    fn bind_aliases_the_same_cell() {
        let mut f = Function::new("main", TypeId::from_usize(0));
        f.entry = "entry".to_string();
        let mut entry = BasicBlock::new("entry");
        entry.instructions.push(Instr::Alloc { dst: Register(0), ty: TypeId::from_usize(0) });
        entry.instructions.push(Instr::Assign { op: AssignOp::Copy, dst: Register(0), src: Operand::Const(Const::Int(1)) });
        entry.instructions.push(Instr::Assign { op: AssignOp::Bind, dst: Register(1), src: Operand::Register(Register(0)) });
        entry.instructions.push(Instr::Assign { op: AssignOp::Copy, dst: Register(1), src: Operand::Const(Const::Int(9)) });
        entry.instructions.push(Instr::Return { value: Some(Operand::Register(Register(0))) });
        f.blocks.insert("entry".to_string(), entry);
        let unit = unit_with(f);

        let mut interp = Interpreter::new(&unit);
        assert_eq!(interp.run("main", vec![]).unwrap(), Value::Int(9));
    }

    #[test]
    fn reading_an_allocated_but_unwritten_register_is_an_error() {
        // spec.md §4.7: "uninitialized register read" is one of the
        // runtime errors the interpreter may surface. `alloc` reserves
        // storage without giving it a value, so reading it back before
        // any `copy`/`move`/`bind` must fail rather than silently
        // producing `Null`.
        let mut f = Function::new("main", TypeId::from_usize(0));
        f.entry = "entry".to_string();
        let mut entry = BasicBlock::new("entry");
        entry.instructions.push(Instr::Alloc { dst: Register(0), ty: TypeId::from_usize(0) });
        entry.instructions.push(Instr::Return { value: Some(Operand::Register(Register(0))) });
        f.blocks.insert("entry".to_string(), entry);
        let unit = unit_with(f);

        let mut interp = Interpreter::new(&unit);
        assert_eq!(interp.run("main", vec![]), Err(InterpError::UninitializedRegister(Register(0))));
    }
}
