//! Runtime values (spec.md §4.7).
//!
//! Grounded on `examples/H1ghBre4k3r-y-lang/src/interpreter/mod.rs`'s
//! `VariableType` enum (`Void`, `Bool`, `Str`, `Int`, `Func`), extended
//! with `Float` (spec.md §4.1 names `Float` among the builtin scalars)
//! and `Struct`/`Closure` to carry the IR's `extract`/`partial_apply`
//! results.

use std::rc::Rc;

/// A runtime value. `Closure` is what every `partial_apply` produces —
/// the function it names plus whatever it has already captured, in
/// capture order, ahead of whatever arguments a later `apply` supplies
/// (spec.md §4.6: "partial_apply produces a callable value").
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(Rc<str>),
    /// A struct/union payload, fields in declaration order — what
    /// `extract` indexes into.
    Struct(Rc<Vec<Value>>),
    Closure { func: Rc<str>, captured: Rc<Vec<Value>> },
}

impl Value {
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Null => "Nothing",
            Value::Bool(_) => "Bool",
            Value::Int(_) => "Int",
            Value::Float(_) => "Float",
            Value::Str(_) => "String",
            Value::Struct(_) => "struct",
            Value::Closure { .. } => "function",
        }
    }

    pub fn truthy(&self) -> bool {
        matches!(self, Value::Bool(true))
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(b) => write!(f, "{b}"),
            Value::Int(i) => write!(f, "{i}"),
            Value::Float(x) => write!(f, "{x}"),
            Value::Str(s) => write!(f, "{s}"),
            Value::Struct(fields) => {
                write!(f, "(")?;
                for (i, v) in fields.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{v}")?;
                }
                write!(f, ")")
            }
            Value::Closure { func, .. } => write!(f, "<function {func}>"),
        }
    }
}
