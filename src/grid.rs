// src/grid.rs

use crate::error::{Result, SimError};

/// Dense N×N grid of reals, stored row-major.
///
/// Used for both the Preisach relay states and the weight density. Only the
/// upper-left triangle (row + col < N) takes part in the weighted sum; the rest
/// is kept so rows and columns can be filled in one pass.
#[derive(Debug, Clone, PartialEq)]
pub struct SquareGrid {
    n: usize,
    data: Vec<f64>,
}

impl SquareGrid {
    /// Create an n×n grid with every cell set to `value`.
    pub fn filled(n: usize, value: f64) -> Self {
        Self {
            n,
            data: vec![value; n * n],
        }
    }

    pub fn zeros(n: usize) -> Self {
        Self::filled(n, 0.0)
    }

    pub fn ones(n: usize) -> Self {
        Self::filled(n, 1.0)
    }

    /// Grid whose cell (i, j) holds `1 - |i - j| / falloff`.
    ///
    /// The main diagonal is 1 and each step away from it loses `1 / falloff`.
    pub fn diagonal_gradient(n: usize, falloff: f64) -> Self {
        let mut g = Self::zeros(n);
        for i in 0..n {
            for j in 0..n {
                let offset = i.abs_diff(j) as f64;
                g.set(i, j, 1.0 - offset / falloff);
            }
        }
        g
    }

    /// Side length.
    #[inline]
    pub fn size(&self) -> usize {
        self.n
    }

    /// Convert (row, col) to a flat index into `data`.
    #[inline]
    pub fn idx(&self, row: usize, col: usize) -> usize {
        debug_assert!(row < self.n && col < self.n);
        row * self.n + col
    }

    #[inline]
    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.data[self.idx(row, col)]
    }

    #[inline]
    pub fn set(&mut self, row: usize, col: usize, value: f64) {
        let k = self.idx(row, col);
        self.data[k] = value;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.data[row * self.n..(row + 1) * self.n]
    }

    pub fn fill_row(&mut self, row: usize, value: f64) {
        let n = self.n;
        self.data[row * n..(row + 1) * n].fill(value);
    }

    pub fn fill_col(&mut self, col: usize, value: f64) {
        for row in 0..self.n {
            self.set(row, col, value);
        }
    }

    /// Multiply every cell by `factor`.
    pub fn scale(&mut self, factor: f64) {
        for v in &mut self.data {
            *v *= factor;
        }
    }

    /// Full sum over the block [row0, row0 + len) × [col0, col0 + len).
    pub fn block_sum(&self, row0: usize, col0: usize, len: usize) -> f64 {
        (row0..row0 + len)
            .map(|r| self.row(r)[col0..col0 + len].iter().sum::<f64>())
            .sum()
    }

    /// Copy `block` into this grid with its (0, 0) cell landing at (row0, col0).
    pub fn paste(&mut self, block: &SquareGrid, row0: usize, col0: usize) {
        for r in 0..block.n {
            for c in 0..block.n {
                self.set(row0 + r, col0 + c, block.get(r, c));
            }
        }
    }

    pub fn is_symmetric(&self, tol: f64) -> bool {
        (0..self.n).all(|i| (0..i).all(|j| (self.get(i, j) - self.get(j, i)).abs() <= tol))
    }

    /// Render the upper-left triangle, one row per line.
    pub fn format_upper_triangle(&self) -> String {
        let mut out = String::new();
        for r in 0..self.n {
            let cells: Vec<String> = self.row(r)[..self.n - r]
                .iter()
                .map(|v| format!("{:.4}", v))
                .collect();
            out.push('[');
            out.push_str(&cells.join(" "));
            out.push_str("]\n");
        }
        out
    }
}

/// Scalar product of two grids restricted to their upper-left triangle.
///
/// Row `r` contributes the dot product of its first `N - r` entries, which keeps
/// exactly the cells with row + col < N.
pub fn triangle_weighted_sum(a: &SquareGrid, b: &SquareGrid) -> Result<f64> {
    if a.size() != b.size() {
        return Err(SimError::ShapeMismatch {
            left: format!("{}x{}", a.size(), a.size()),
            right: format!("{}x{}", b.size(), b.size()),
        });
    }

    let n = a.size();
    let mut total = 0.0;
    for r in 0..n {
        let ra = &a.row(r)[..n - r];
        let rb = &b.row(r)[..n - r];
        total += ra.iter().zip(rb).map(|(x, y)| x * y).sum::<f64>();
    }
    Ok(total)
}
