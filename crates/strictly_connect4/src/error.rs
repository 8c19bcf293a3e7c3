//! Error types for board operations.

use crate::types::Column;

/// A column number outside the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum ColumnError {
    /// The 1-based column number is not in 1..=7.
    #[display("Column {} is out of range (must be 1-7)", _0)]
    OutOfRange(usize),
}

impl std::error::Error for ColumnError {}

/// Error raised when placing a token.
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::Display)]
pub enum BoardError {
    /// The top cell of the column is occupied.
    #[display("Column {} is full", _0)]
    ColumnFull(Column),
}

impl std::error::Error for BoardError {}
