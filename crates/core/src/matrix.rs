use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Canonical deck size for production opponent data. Core types take their
/// working size from the matrix itself so small fixtures stay expressible;
/// the data loader enforces this constant at the boundary.
pub const DECK_SIZE: usize = 50;

#[derive(Debug, Error)]
pub enum MatrixError {
    #[error("opponent matrix is empty")]
    Empty,
    #[error("opponent row {row} has {found} columns, expected {expected}")]
    RaggedRow {
        row: usize,
        expected: usize,
        found: usize,
    },
}

/// Square grid of opponent card values, one row per opponent deck.
/// Immutable after construction and shared read-only across every search.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpponentMatrix {
    size: usize,
    cells: Vec<i32>,
}

impl OpponentMatrix {
    pub fn from_rows(rows: Vec<Vec<i32>>) -> Result<Self, MatrixError> {
        let size = rows.len();
        if size == 0 {
            return Err(MatrixError::Empty);
        }
        let mut cells = Vec::with_capacity(size * size);
        for (row, values) in rows.iter().enumerate() {
            if values.len() != size {
                return Err(MatrixError::RaggedRow {
                    row,
                    expected: size,
                    found: values.len(),
                });
            }
            cells.extend_from_slice(values);
        }
        Ok(Self { size, cells })
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn value(&self, row: usize, col: usize) -> i32 {
        self.cells[row * self.size + col]
    }

    /// Position-wise wins plus half-credit ties against every opponent row.
    /// Higher card value wins a position.
    pub fn score_deck(&self, cards: &[i32]) -> f64 {
        let mut score = 0.0;
        for row in self.cells.chunks_exact(self.size) {
            for (theirs, mine) in row.iter().zip(cards) {
                if theirs < mine {
                    score += 1.0;
                } else if theirs == mine {
                    score += 0.5;
                }
            }
        }
        score
    }
}
