//! The gravity board.

use crate::error::BoardError;
use crate::types::{COLS, Cell, Column, Player, ROWS};
use serde::{Deserialize, Serialize};
use tracing::{instrument, trace};

/// 6x7 connect-four board.
///
/// Row 0 is the top row, row 5 the bottom. Every occupied cell sits on top of
/// occupied cells, so a column is open exactly when its top cell is empty.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Board {
    cells: [[Cell; COLS]; ROWS],
}

impl Board {
    /// Creates an empty board.
    pub fn new() -> Self {
        Self {
            cells: [[Cell::Empty; COLS]; ROWS],
        }
    }

    /// Gets the cell at `row` (0 = top) and `col` (0-based).
    ///
    /// Returns `None` outside the grid.
    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        self.cells.get(row).and_then(|r| r.get(col)).copied()
    }

    /// All rows, top to bottom.
    pub fn rows(&self) -> &[[Cell; COLS]; ROWS] {
        &self.cells
    }

    /// Whether a token can still be dropped into `column`.
    pub fn is_column_open(&self, column: Column) -> bool {
        self.cells[0][column.index()].is_empty()
    }

    /// Open columns in ascending order.
    pub fn open_columns(&self) -> Vec<Column> {
        Column::all().filter(|c| self.is_column_open(*c)).collect()
    }

    /// Whether no column is open.
    pub fn is_full(&self) -> bool {
        self.cells[0].iter().all(|cell| !cell.is_empty())
    }

    /// Number of tokens on the board.
    pub fn token_count(&self) -> usize {
        self.cells
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }

    /// Drops a token into `column`, returning the resulting board.
    ///
    /// The receiver is left untouched.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ColumnFull`] if the top cell is occupied.
    #[instrument(skip(self))]
    pub fn drop_token(&self, column: Column, player: Player) -> Result<Board, BoardError> {
        let mut next = *self;
        next.place(column, player)?;
        Ok(next)
    }

    /// Drops a token into `column` in place, returning the row it landed on.
    ///
    /// # Errors
    ///
    /// Returns [`BoardError::ColumnFull`] if the top cell is occupied.
    pub fn place(&mut self, column: Column, player: Player) -> Result<usize, BoardError> {
        let col = column.index();
        let row = (0..ROWS)
            .rev()
            .find(|&row| self.cells[row][col].is_empty())
            .ok_or(BoardError::ColumnFull(column))?;
        self.cells[row][col] = Cell::Occupied(player);
        trace!(row, col, ?player, "Token placed");
        Ok(row)
    }

    /// Formats the board as a human-readable grid with 1-based column headers.
    pub fn display(&self) -> String {
        let mut result = String::new();
        for number in 1..=COLS {
            result.push_str(&format!(" {}", number));
        }
        result.push('\n');
        for row in &self.cells {
            result.push('|');
            for cell in row {
                let symbol = match cell {
                    Cell::Empty => '.',
                    Cell::Occupied(player) => player.token(),
                };
                result.push(symbol);
                result.push('|');
            }
            result.push('\n');
        }
        result
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
