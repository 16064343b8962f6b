//! Fallible-operation error enum, grounded on `faxc-util/src/error.rs`.
//!
//! These are library-level `Result` errors for malformed *use* of
//! `wardc-util`'s own data structures (a dangling index, an unknown
//! buffer). They are distinct from [`crate::diagnostic::Issue`], which
//! models user-facing compiler diagnostics, not internal API misuse.

use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum UtilError {
    #[error("buffer id {0:?} is not registered in this source map")]
    UnknownBuffer(u32),

    #[error("name handle does not belong to this interner")]
    ForeignName,
}
