// src/hysteresis.rs
//
// Discretized Preisach hysteresis operator.
//
// The Preisach plane is an N×N grid of relays. Rows index the "up" threshold
// (top row = highest), columns index the "down" threshold. Only the upper-left
// triangle (row + col < N) is physical: it holds relays whose up threshold is
// at or above their down threshold. The output is the weighted sum of relay
// states over that triangle.
//
// The input is quantised to integer coordinates x in [-N/2, N/2]. Each unit
// step up switches one row of relays to +1, each unit step down switches one
// column to -1. Because a sweep up and a sweep down touch different sets of
// relays, the final state depends on the path taken, not only on the end point.

use std::fmt;
use std::str::FromStr;

use log::{debug, trace};

use crate::error::{Result, SimError};
use crate::grid::{SquareGrid, triangle_weighted_sum};
use crate::params::HysteresisParams;

/// Unit step direction along the input axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Down => "down",
        }
    }
}

impl FromStr for Direction {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "up" => Ok(Self::Up),
            "down" => Ok(Self::Down),
            _ => Err(SimError::InvalidDirection(s.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preisach hysteresis engine with path memory.
#[derive(Debug, Clone)]
pub struct HysteresisEngine {
    params: HysteresisParams,
    relays: SquareGrid,
    weights: SquareGrid,
    x_scale: f64,
    y_max: f64,
    x: i64,
    y: f64,
    history: Vec<(f64, f64)>,
}

impl HysteresisEngine {
    pub fn new(params: HysteresisParams) -> Result<Self> {
        validate(&params)?;

        let n = params.size;
        let weights = build_weights(&params)?;
        let x_scale = (n / 2) as f64 / params.x_saturation;
        let y_max = triangle_weighted_sum(&weights, &SquareGrid::ones(n))?;

        let relays = virgin_relays(n);
        let y = triangle_weighted_sum(&relays, &weights)?;

        debug!(
            "preisach plane N={} x_sat={:.4e} y_sat={:.4e} y_rem={:.4e} x_scale={:.4e} y0={:.4e}",
            n, params.x_saturation, params.y_saturation, params.y_remanence, x_scale, y
        );
        debug!("weight triangle:\n{}", weights.format_upper_triangle());

        Ok(Self {
            params,
            relays,
            weights,
            x_scale,
            y_max,
            x: 0,
            y,
            history: vec![(0.0, y)],
        })
    }

    /// Drive the input to `field` and return the resulting output.
    ///
    /// The plane is walked one unit at a time from the current coordinate to the
    /// target; every intermediate step switches relays.
    pub fn set_x(&mut self, field: f64) -> Result<f64> {
        if !field.is_finite() {
            return Err(SimError::InvalidParameter(format!(
                "applied field must be finite, got {}",
                field
            )));
        }
        let target = (field * self.x_scale).floor() as i64;

        while self.x < target {
            self.increment(Direction::Up)?;
        }
        while self.x > target {
            self.increment(Direction::Down)?;
        }

        Ok(self.y)
    }

    /// Move the input coordinate by a single unit.
    ///
    /// Outside the active range [-N/2, N/2] the coordinate still moves but no
    /// relay switches: the output sits on its saturation plateau.
    pub fn increment(&mut self, direction: Direction) -> Result<()> {
        let half = (self.params.size / 2) as i64;

        match direction {
            Direction::Up => {
                if self.x >= -half && self.x < half {
                    let row = (half - self.x - 1) as usize;
                    self.relays.fill_row(row, 1.0);
                }
                self.x += 1;
            }
            Direction::Down => {
                if self.x > -half && self.x <= half {
                    let col = (self.x + half - 1) as usize;
                    self.relays.fill_col(col, -1.0);
                }
                self.x -= 1;
            }
        }

        self.y = triangle_weighted_sum(&self.relays, &self.weights)?;
        self.history.push((self.x as f64 / self.x_scale, self.y));
        trace!("step {} -> x={} y={:.6e}", direction, self.x, self.y);

        Ok(())
    }

    /// Full (input, output) trace since construction.
    pub fn history(&self) -> &[(f64, f64)] {
        &self.history
    }

    pub fn x(&self) -> i64 {
        self.x
    }

    /// Current input in field units.
    pub fn field(&self) -> f64 {
        self.x as f64 / self.x_scale
    }

    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn x_scale(&self) -> f64 {
        self.x_scale
    }

    /// Largest output magnitude the plane can produce.
    pub fn y_max(&self) -> f64 {
        self.y_max
    }

    pub fn size(&self) -> usize {
        self.params.size
    }

    pub fn params(&self) -> &HysteresisParams {
        &self.params
    }

    pub fn relays(&self) -> &SquareGrid {
        &self.relays
    }

    pub fn weights(&self) -> &SquareGrid {
        &self.weights
    }
}

fn validate(params: &HysteresisParams) -> Result<()> {
    if params.size == 0 || params.size % 2 != 0 {
        return Err(SimError::InvalidParameter(format!(
            "plane size must be even and positive, got {}",
            params.size
        )));
    }
    if !(params.y_saturation > params.y_remanence) {
        return Err(SimError::InvalidParameter(format!(
            "remanence ({}) must be lower than saturation ({})",
            params.y_remanence, params.y_saturation
        )));
    }
    if !(params.x_saturation.is_finite() && params.x_saturation > 0.0) {
        return Err(SimError::InvalidParameter(format!(
            "x saturation must be finite and positive, got {}",
            params.x_saturation
        )));
    }
    Ok(())
}

/// Weight density: a diagonal gradient scaled so the upper-left quadrant holds
/// the remanence, with the off-diagonal quadrants carrying the remaining
/// saturation step.
fn build_weights(params: &HysteresisParams) -> Result<SquareGrid> {
    let n = params.size;
    let half = n / 2;
    let falloff = (n - 1) as f64;

    let mut weights = SquareGrid::diagonal_gradient(n, falloff);
    let quadrant = weights.block_sum(0, 0, half);
    weights.scale(params.y_remanence / quadrant);

    let mut sat_adjust = SquareGrid::diagonal_gradient(half, falloff);
    let sat_triangle = triangle_weighted_sum(&sat_adjust, &SquareGrid::ones(half))?;
    sat_adjust.scale((params.y_saturation - params.y_remanence) / (2.0 * sat_triangle));

    weights.paste(&sat_adjust, 0, half);
    weights.paste(&sat_adjust, half, 0);

    Ok(weights)
}

/// Demagnetised start: +1 strictly below the main diagonal, -1 on and above it.
fn virgin_relays(n: usize) -> SquareGrid {
    let mut relays = SquareGrid::zeros(n);
    for i in 0..n {
        for j in 0..n {
            relays.set(i, j, if i > j { 1.0 } else { -1.0 });
        }
    }
    relays
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx_eq(a: f64, b: f64, tol: f64) -> bool {
        (a - b).abs() <= tol
    }

    fn engine() -> HysteresisEngine {
        HysteresisEngine::new(HysteresisParams::new(1.0, 1.0, 0.5, 10)).unwrap()
    }

    #[test]
    fn rejects_odd_zero_and_inverted_parameters() {
        for params in [
            HysteresisParams::new(1.0, 1.0, 0.5, 9),
            HysteresisParams::new(1.0, 1.0, 0.5, 0),
            HysteresisParams::new(1.0, 0.5, 0.5, 10),
            HysteresisParams::new(1.0, 0.4, 0.5, 10),
            HysteresisParams::new(0.0, 1.0, 0.5, 10),
        ] {
            assert!(
                matches!(HysteresisEngine::new(params.clone()), Err(SimError::InvalidParameter(_))),
                "expected InvalidParameter for {:?}",
                params
            );
        }
    }

    #[test]
    fn direction_parses_names() {
        assert_eq!("up".parse::<Direction>().unwrap(), Direction::Up);
        assert_eq!("DOWN".parse::<Direction>().unwrap(), Direction::Down);
        assert!(matches!(
            "sideways".parse::<Direction>(),
            Err(SimError::InvalidDirection(_))
        ));
    }

    #[test]
    fn virgin_state_splits_on_diagonal() {
        let e = engine();
        assert_eq!(e.relays().get(0, 0), -1.0);
        assert_eq!(e.relays().get(1, 0), 1.0);
        assert_eq!(e.relays().get(0, 1), -1.0);
        assert_eq!(e.x(), 0);
        assert_eq!(e.history(), &[(0.0, e.y())]);
    }

    #[test]
    fn weights_are_symmetric_and_quadrant_holds_remanence() {
        let e = engine();
        let w = e.weights();
        assert!(w.is_symmetric(1e-15));
        assert!(approx_eq(w.block_sum(0, 0, 5), 0.5, 1e-12));
        for i in 0..10 {
            for j in 0..10 {
                assert!(w.get(i, j) >= 0.0);
            }
        }
    }

    #[test]
    fn y_max_equals_saturation() {
        let e = engine();
        assert!(approx_eq(e.y_max(), 1.0, 1e-12), "y_max={}", e.y_max());
    }

    #[test]
    fn up_step_fills_row_and_down_step_fills_column() {
        let mut e = engine();
        e.increment(Direction::Up).unwrap();
        // x = 0 -> row N/2 - 1 = 4
        assert!(e.relays().row(4).iter().all(|&v| v == 1.0));
        assert_eq!(e.x(), 1);

        e.increment(Direction::Down).unwrap();
        // x = 1 -> column 1 + 5 - 1 = 5
        assert!((0..10).all(|r| e.relays().get(r, 5) == -1.0));
        assert_eq!(e.x(), 0);
        assert_eq!(e.history().len(), 3);
    }

    #[test]
    fn plateau_beyond_active_range() {
        let mut e = engine();
        e.set_x(1.0).unwrap();
        assert_eq!(e.x(), 5);
        let relays = e.relays().clone();
        let y = e.y();

        for _ in 0..4 {
            e.increment(Direction::Up).unwrap();
            assert_eq!(e.relays(), &relays);
            assert_eq!(e.y(), y);
        }
        assert_eq!(e.x(), 9);
    }

    #[test]
    fn major_loop_reaches_saturation_and_remanence() {
        let mut e = engine();
        assert!(approx_eq(e.set_x(1.0).unwrap(), 1.0, 1e-12));
        assert!(approx_eq(e.set_x(0.0).unwrap(), 0.5, 1e-12));
        assert!(approx_eq(e.set_x(-1.0).unwrap(), -1.0, 1e-12));
        assert!(approx_eq(e.set_x(0.0).unwrap(), -0.5, 1e-12));
    }

    #[test]
    fn negative_fields_round_toward_minus_infinity() {
        let mut e = engine();
        // -0.1 * 5 = -0.5 -> coordinate -1
        e.set_x(-0.1).unwrap();
        assert_eq!(e.x(), -1);
    }

    #[test]
    fn history_records_field_units() {
        let mut e = engine();
        e.set_x(0.4).unwrap();
        let last = *e.history().last().unwrap();
        assert!(approx_eq(last.0, 0.4, 1e-12));
        assert!(approx_eq(e.field(), 0.4, 1e-12));
    }
}
