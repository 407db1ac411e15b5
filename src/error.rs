//! Error type shared by every construction entry point.

use thiserror::Error;

/// Errors raised while building automata.
///
/// These are argument errors: the offending value or pattern position is
/// carried in the variant, and nothing is partially built.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AutomatonError {
    #[error("invalid range: from ({from}) cannot be > to ({to})")]
    InvalidRange { from: u32, to: u32 },

    #[error("code point {code_point:#x} exceeds alphabet maximum {max:#x}")]
    SymbolOutOfRange { code_point: u32, max: u32 },

    #[error("edit distance {0} is not supported (maximum is 2)")]
    UnsupportedDistance(u32),

    #[error("{message} at position {position}")]
    Syntax { message: String, position: usize },

    #[error("input must be in sorted order: {previous:?} >= {current:?}")]
    UnsortedInput { previous: String, current: String },

    #[error("'{0}' not found")]
    UnknownAutomaton(String),

    #[error("invalid interval: {0}")]
    InvalidInterval(String),

    #[error("invalid UTF-8")]
    InvalidUtf8,
}

pub type Result<T, E = AutomatonError> = std::result::Result<T, E>;
