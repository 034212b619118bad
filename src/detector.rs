// src/detector.rs

use log::debug;

use crate::error::{Result, SimError};
use crate::params::DetectorParams;
use crate::resonator::{Resonator, ResonatorState};

/// `count` evenly spaced values from `start` to `stop` inclusive.
pub fn linspace(start: f64, stop: f64, count: usize) -> Vec<f64> {
    match count {
        0 => Vec::new(),
        1 => vec![start],
        _ => {
            let step = (stop - start) / (count - 1) as f64;
            let mut v: Vec<f64> = (0..count).map(|k| start + step * k as f64).collect();
            v[count - 1] = stop;
            v
        }
    }
}

/// Crossbar array of resonators.
///
/// Every cell sees the sum of its row current and its column current, so
/// driving one line disturbs every resonator on it.
#[derive(Debug, Clone)]
pub struct Detector {
    params: DetectorParams,
    row_currents: Vec<f64>,
    col_currents: Vec<f64>,
    frequency_plan: Vec<Vec<f64>>,
    resonators: Vec<Vec<Resonator>>,
}

impl Detector {
    pub fn new(params: DetectorParams) -> Result<Self> {
        if params.rows == 0 || params.cols == 0 {
            return Err(SimError::InvalidParameter(format!(
                "detector needs at least one row and column, got {}x{}",
                params.rows, params.cols
            )));
        }
        if !(params.fstart.is_finite() && params.fstop.is_finite()) {
            return Err(SimError::InvalidParameter(format!(
                "frequency range must be finite, got [{}, {}]",
                params.fstart, params.fstop
            )));
        }

        let rows = params.rows;
        let cols = params.cols;
        let plan = linspace(params.fstart, params.fstop, rows * cols);

        let mut frequency_plan = Vec::with_capacity(rows);
        let mut resonators = Vec::with_capacity(rows);
        for r in 0..rows {
            let row_plan = plan[r * cols..(r + 1) * cols].to_vec();
            let mut row = Vec::with_capacity(cols);
            for &f0 in &row_plan {
                row.push(Resonator::with_params(f0, params.resonator.clone())?);
            }
            frequency_plan.push(row_plan);
            resonators.push(row);
        }

        debug!(
            "detector {}x{} plan [{}, {}]",
            rows, cols, params.fstart, params.fstop
        );

        Ok(Self {
            row_currents: vec![0.0; rows],
            col_currents: vec![0.0; cols],
            params,
            frequency_plan,
            resonators,
        })
    }

    /// Drive row `row` with `current` and refresh every cell on it.
    pub fn set_row_current(&mut self, current: f64, row: usize) -> Result<()> {
        check_index("row", row, self.params.rows)?;
        self.row_currents[row] = current;
        for col in 0..self.params.cols {
            self.update_cell(row, col)?;
        }
        Ok(())
    }

    /// Drive column `col` with `current` and refresh every cell on it.
    pub fn set_col_current(&mut self, current: f64, col: usize) -> Result<()> {
        check_index("column", col, self.params.cols)?;
        self.col_currents[col] = current;
        for row in 0..self.params.rows {
            self.update_cell(row, col)?;
        }
        Ok(())
    }

    fn update_cell(&mut self, row: usize, col: usize) -> Result<()> {
        let current = self.row_currents[row] + self.col_currents[col];
        self.resonators[row][col].set_current(current)?;
        Ok(())
    }

    pub fn rows(&self) -> usize {
        self.params.rows
    }

    pub fn cols(&self) -> usize {
        self.params.cols
    }

    pub fn params(&self) -> &DetectorParams {
        &self.params
    }

    pub fn row_currents(&self) -> &[f64] {
        &self.row_currents
    }

    pub fn col_currents(&self) -> &[f64] {
        &self.col_currents
    }

    /// Base frequency assigned to each cell at construction.
    pub fn frequency_plan(&self) -> &[Vec<f64>] {
        &self.frequency_plan
    }

    pub fn resonator(&self, row: usize, col: usize) -> Result<&Resonator> {
        check_index("row", row, self.params.rows)?;
        check_index("column", col, self.params.cols)?;
        Ok(&self.resonators[row][col])
    }

    /// Present resonant frequency of every cell.
    pub fn frequencies(&self) -> Vec<Vec<f64>> {
        self.resonators
            .iter()
            .map(|row| row.iter().map(Resonator::freq).collect())
            .collect()
    }

    pub fn states(&self) -> Vec<Vec<ResonatorState>> {
        self.resonators
            .iter()
            .map(|row| row.iter().map(Resonator::state).collect())
            .collect()
    }
}

fn check_index(axis: &'static str, index: usize, len: usize) -> Result<()> {
    if index >= len {
        return Err(SimError::OutOfBounds { axis, index, len });
    }
    Ok(())
}
