//! Interpreter errors (spec.md §7's ambient error-handling policy,
//! carried into `wardc-interp` the way `wardc-util::UtilError` carries it
//! into the lower crates: a `thiserror` enum of everything that can make
//! evaluation stop, as opposed to the compiler issues a bad *program*
//! produces — those are `wardc-util::Issue`s and never reach this far).

use thiserror::Error;
use wardc_ir::Register;

#[derive(Debug, Error, PartialEq)]
pub enum InterpError {
    #[error("function `{0}` is not defined in this unit")]
    UnknownFunction(String),
    #[error("register {0} was read before being written")]
    UninitializedRegister(Register),
    #[error("block `{0}` does not exist in function `{1}`")]
    UnknownBlock(String, String),
    #[error("`{0}` is not callable")]
    NotCallable(String),
    #[error("built-in `{0}` called with the wrong argument types")]
    BuiltinTypeMismatch(String),
    #[error("built-in `{0}` expected {1} argument(s), got {2}")]
    BuiltinArity(String, usize, usize),
    #[error("unknown built-in `{0}`")]
    UnknownBuiltin(String),
    #[error("frame stack underflow: returned with no caller")]
    FrameUnderflow,
    #[error("block `{0}` fell off the end without a terminator")]
    MissingTerminator(String),
}
