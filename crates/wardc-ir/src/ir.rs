//! The register IR itself (spec.md §4.6 "low-form"): a *unit* owning
//! *functions*, each an ordered map of block-label to *basic block*, each
//! a flat instruction list. SSA-like: every [`Register`] is produced by
//! exactly one instruction in its owning function.
//!
//! Grounded on `faxc-mir/src/mir.rs`'s `Function`/`BasicBlock` shape
//! (`IndexVec`-backed blocks, a builder with a "current block" cursor),
//! narrowed from MIR's place/rvalue/projection richness down to spec.md
//! §4.6's fixed instruction set.

use indexmap::IndexMap;
use wardc_types::TypeId;

/// A single-assignment register, unique within its owning function.
/// Displays as `%<n>` in the textual form (spec.md §6).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Register(pub u32);

impl std::fmt::Display for Register {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "%{}", self.0)
    }
}

/// A compile-time constant value, usable as an instruction operand
/// without its own defining instruction (spec.md §8 scenario 1: "IR
/// contains `make_ref Int` then `copy <int-1> -> %x`" — the `1` never
/// gets a register of its own).
#[derive(Clone, Debug, PartialEq)]
pub enum Const {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl std::fmt::Display for Const {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Const::Null => write!(f, "null"),
            Const::Bool(b) => write!(f, "{b}"),
            Const::Int(i) => write!(f, "{i}"),
            Const::Float(x) => write!(f, "{x}"),
            Const::Str(s) => write!(f, "{s:?}"),
        }
    }
}

/// An instruction operand: either a register already holding a value, or
/// an inline constant.
#[derive(Clone, Debug, PartialEq)]
pub enum Operand {
    Register(Register),
    Const(Const),
}

impl std::fmt::Display for Operand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operand::Register(r) => write!(f, "{r}"),
            Operand::Const(c) => write!(f, "{c}"),
        }
    }
}

impl From<Register> for Operand {
    fn from(r: Register) -> Self {
        Operand::Register(r)
    }
}

/// One of the three surface assignment flavors an IR `copy`/`move`/`bind`
/// instruction mirrors (spec.md §4.6).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AssignOp {
    Copy,
    Move,
    Bind,
}

impl std::fmt::Display for AssignOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AssignOp::Copy => write!(f, "copy"),
            AssignOp::Move => write!(f, "move"),
            AssignOp::Bind => write!(f, "bind"),
        }
    }
}

/// One instruction of spec.md §4.6's fixed set.
#[derive(Clone, Debug, PartialEq)]
pub enum Instr {
    /// `alloc <type>` — allocate uninitialized storage, produce a register.
    Alloc { dst: Register, ty: TypeId },
    /// `make_ref <type>` — create a reference register (no storage yet).
    MakeRef { dst: Register, ty: TypeId },
    /// `copy`/`move`/`bind src -> dst` — the three assignment flavors.
    Assign { op: AssignOp, dst: Register, src: Operand },
    /// `apply callee, args... ` — total function call producing a register.
    Apply { dst: Register, callee: Operand, args: Vec<Operand> },
    /// `partial_apply f, captured...` — produce a closure value.
    PartialApply { dst: Register, func: String, captured: Vec<Operand> },
    /// `extract src, i` — load the i-th field of a struct register.
    Extract { dst: Register, src: Operand, index: u32 },
    /// `drop r` — end-of-scope release of a reference.
    Drop { reg: Register },
    /// `branch cond, then-label, else-label`.
    Branch { cond: Operand, then_label: String, else_label: String },
    /// `jump label`.
    Jump { label: String },
    /// `return` / `return v`.
    Return { value: Option<Operand> },
}

impl Instr {
    /// The register this instruction defines, if any (spec.md §4.6:
    /// "each register has exactly one defining instruction").
    pub fn defines(&self) -> Option<Register> {
        match self {
            Instr::Alloc { dst, .. }
            | Instr::MakeRef { dst, .. }
            | Instr::Apply { dst, .. }
            | Instr::PartialApply { dst, .. }
            | Instr::Extract { dst, .. } => Some(*dst),
            Instr::Assign { .. }
            | Instr::Drop { .. }
            | Instr::Branch { .. }
            | Instr::Jump { .. }
            | Instr::Return { .. } => None,
        }
    }

    /// Whether this instruction ends a basic block (spec.md §4.6:
    /// `branch`/`jump`/`return` are the only terminators).
    pub fn is_terminator(&self) -> bool {
        matches!(self, Instr::Branch { .. } | Instr::Jump { .. } | Instr::Return { .. })
    }
}

/// A basic block: a flat, ordered instruction list belonging to exactly
/// one function (spec.md §4.6).
#[derive(Clone, Debug, Default)]
pub struct BasicBlock {
    pub label: String,
    pub instructions: Vec<Instr>,
}

impl BasicBlock {
    pub fn new(label: impl Into<String>) -> Self {
        Self { label: label.into(), instructions: Vec::new() }
    }

    pub fn has_terminator(&self) -> bool {
        self.instructions.last().is_some_and(Instr::is_terminator)
    }
}

/// A function: a function-type, a (mangled) name, and blocks keyed by
/// label, in declaration order (spec.md §4.6).
#[derive(Clone, Debug)]
pub struct Function {
    pub name: String,
    pub ty: TypeId,
    pub entry: String,
    pub blocks: IndexMap<String, BasicBlock>,
    next_register: u32,
}

impl Function {
    pub fn new(name: impl Into<String>, ty: TypeId) -> Self {
        Self { name: name.into(), ty, entry: String::new(), blocks: IndexMap::new(), next_register: 0 }
    }

    pub fn fresh_register(&mut self) -> Register {
        let r = Register(self.next_register);
        self.next_register += 1;
        r
    }

    pub fn block(&self, label: &str) -> Option<&BasicBlock> {
        self.blocks.get(label)
    }

    pub fn block_mut(&mut self, label: &str) -> Option<&mut BasicBlock> {
        self.blocks.get_mut(label)
    }
}

/// A compilation unit: mangled-name -> function (spec.md §4.6).
#[derive(Clone, Debug, Default)]
pub struct Unit {
    pub functions: IndexMap<String, Function>,
}

impl Unit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }
}
