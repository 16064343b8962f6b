//! Call-frame bookkeeping for the tree-walking interpreter (spec.md
//! §4.7).
//!
//! Grounded on `examples/H1ghBre4k3r-y-lang/src/interpreter/mod.rs`'s
//! `Scope { scope_stack: Vec<HashMap<String, VariableType>>> }`
//! push/pop convention, narrowed from a name-keyed stack of scopes down
//! to a register-keyed single map per call (the IR has already resolved
//! every name to a register; there is no further scoping to walk at this
//! layer) and a cursor that tracks "which instruction in which block"
//! instead of "which statement in the AST".
//!
//! Every register holds a `Rc<RefCell<Option<Value>>>` cell rather than a
//! bare `Value`: `alloc`/`make_ref` hand out a fresh, empty cell that
//! `copy`/`move`/`bind` write into later, modeling the IR's
//! reference/value duality (spec.md §4.6) without a separate `Reference`
//! value variant — reading a register clones its cell's current contents,
//! or fails if nothing has been written into it yet.

use std::cell::RefCell;
use std::rc::Rc;

use rustc_hash::FxHashMap;
use wardc_ir::Register;

use crate::error::InterpError;
use crate::value::Value;

/// One call's register file plus its "program counter": the block it is
/// currently executing and its position within that block's instruction
/// list.
///
/// A register's cell holds `None` from the moment `alloc`/`make_ref`
/// reserves it until a `copy`/`move`/`bind` first writes through it —
/// storage exists, but reading it is a genuine interpreter error (spec.md
/// §4.7: "uninitialized register read"), distinct from a register holding
/// the `Null` *value*.
pub struct Frame {
    pub function: String,
    pub registers: FxHashMap<Register, Rc<RefCell<Option<Value>>>>,
    pub block: String,
    pub pc: usize,
}

impl Frame {
    pub fn new(function: impl Into<String>, entry_block: impl Into<String>) -> Self {
        Self { function: function.into(), registers: FxHashMap::default(), block: entry_block.into(), pc: 0 }
    }

    /// Jump to the start of a new block, resetting the cursor.
    pub fn jump_to(&mut self, block: impl Into<String>) {
        self.block = block.into();
        self.pc = 0;
    }

    fn cell(&mut self, reg: Register) -> Rc<RefCell<Option<Value>>> {
        self.registers.entry(reg).or_insert_with(|| Rc::new(RefCell::new(None))).clone()
    }

    /// Reserves storage for `reg` without giving it a value yet (`alloc`/
    /// `make_ref`). A register left in this state is uninitialized: a
    /// later `read` of it fails rather than returning `Null`.
    pub fn reserve(&mut self, reg: Register) {
        self.cell(reg);
    }

    pub fn read(&mut self, reg: Register) -> Result<Value, InterpError> {
        self.cell(reg).borrow().clone().ok_or(InterpError::UninitializedRegister(reg))
    }

    pub fn write(&mut self, reg: Register, value: Value) {
        *self.cell(reg).borrow_mut() = Some(value);
    }

    /// `move`/`bind` both hand the same cell identity to `dst` as
    /// `src` already has, rather than copying its contents, so later
    /// writes through either register are visible through the other —
    /// the alias spec.md §4.4's `AssignKind::Alias` and the IR's `bind`
    /// opcode are meant to establish.
    pub fn alias(&mut self, dst: Register, src: Register) {
        let cell = self.cell(src);
        self.registers.insert(dst, cell);
    }
}
