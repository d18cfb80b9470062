//! Crate-wide error taxonomy.
//!
//! Programmer-error conditions (deleting an out-of-range dot, violating a
//! quad-tree safety invariant) are not represented here: they `panic!`,
//! since they indicate a broken caller invariant rather than a recoverable
//! input error.

/// Errors surfaced by the public API. All are recoverable: the caller gave
/// bad input or called an operation out of order.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("symbol '{0}' not in alphabet")]
    InvalidSymbol(char),

    #[error("sequence of length {len} too short for k-tuple size {k}")]
    SequenceTooShort { len: usize, k: usize },

    #[error("invalid parameter: {0}")]
    InvalidParameter(&'static str),

    #[error("operation requires a built index")]
    IndexRequired,

    #[error("dot not found at the given coordinates")]
    NotFound,
}

pub type Result<T> = std::result::Result<T, Error>;
