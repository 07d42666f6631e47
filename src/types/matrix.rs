//! Dense boolean matrices.
//!
//! Used both for graph adjacency (square, indexed by dense node index) and for
//! the assignment matrices produced by subgraph search (pattern rows, host
//! columns).

use serde::{Deserialize, Serialize};

/// Row-major boolean matrix.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct BitMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<bool>,
}

impl BitMatrix {
    /// Create an all-zero matrix.
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![false; rows * cols],
        }
    }

    /// Create an all-zero square matrix.
    pub fn square(n: usize) -> Self {
        Self::new(n, n)
    }

    /// Number of rows.
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Read a cell. Out-of-range reads are `false`.
    pub fn get(&self, row: usize, col: usize) -> bool {
        row < self.rows && col < self.cols && self.cells[row * self.cols + col]
    }

    /// Write a cell.
    ///
    /// # Panics
    ///
    /// Panics if the cell is out of range.
    pub fn set(&mut self, row: usize, col: usize, value: bool) {
        assert!(row < self.rows && col < self.cols, "cell ({row}, {col}) out of range");
        self.cells[row * self.cols + col] = value;
    }

    /// Extend a square matrix by one zero row and one zero column.
    pub fn grow(&mut self) {
        let (rows, cols) = (self.rows + 1, self.cols + 1);
        let mut cells = vec![false; rows * cols];
        for r in 0..self.rows {
            let src = &self.cells[r * self.cols..(r + 1) * self.cols];
            cells[r * cols..r * cols + self.cols].copy_from_slice(src);
        }
        self.rows = rows;
        self.cols = cols;
        self.cells = cells;
    }

    /// Column indices set in a row, ascending.
    pub fn row_ones(&self, row: usize) -> impl Iterator<Item = usize> + '_ {
        (0..self.cols).filter(move |&c| self.get(row, c))
    }

    /// All set cells as `(row, col)`, row-major.
    pub fn ones(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        (0..self.rows).flat_map(move |r| self.row_ones(r).map(move |c| (r, c)))
    }

    /// Number of set cells.
    pub fn count_ones(&self) -> usize {
        self.cells.iter().filter(|&&c| c).count()
    }

    /// Transposed copy.
    pub fn transpose(&self) -> Self {
        let mut out = Self::new(self.cols, self.rows);
        for (r, c) in self.ones() {
            out.set(c, r, true);
        }
        out
    }
}
