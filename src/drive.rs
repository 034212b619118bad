// src/drive.rs
//
// Drive programs: sequences of input values fed to a hysteresis engine,
// a resonator or a detector line, one value per update.

use serde::{Deserialize, Serialize};

use crate::error::{Result, SimError};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Waveform {
    /// 0 -> +A -> -A -> +A, `points_per_leg` samples per quarter swing.
    Triangle { amplitude: f64, points_per_leg: usize },
    /// Alternating sweeps whose amplitude shrinks by `decay` each half cycle,
    /// ending at zero. Leaves the magnet close to its demagnetised state.
    Decaying {
        amplitude: f64,
        decay: f64,
        cycles: usize,
        points_per_leg: usize,
    },
    /// Explicit list of values.
    Points { values: Vec<f64> },
}

impl Waveform {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Triangle { .. } => "triangle",
            Self::Decaying { .. } => "decaying",
            Self::Points { .. } => "points",
        }
    }

    /// Expand the program into the samples to apply, in order.
    pub fn samples(&self) -> Result<Vec<f64>> {
        match *self {
            Self::Triangle {
                amplitude,
                points_per_leg,
            } => {
                check_leg(points_per_leg)?;
                let mut out = vec![0.0];
                ramp(&mut out, 0.0, amplitude, points_per_leg);
                ramp(&mut out, amplitude, -amplitude, 2 * points_per_leg);
                ramp(&mut out, -amplitude, amplitude, 2 * points_per_leg);
                Ok(out)
            }
            Self::Decaying {
                amplitude,
                decay,
                cycles,
                points_per_leg,
            } => {
                check_leg(points_per_leg)?;
                if !(decay > 0.0 && decay < 1.0) {
                    return Err(SimError::InvalidParameter(format!(
                        "decay must lie in (0, 1), got {}",
                        decay
                    )));
                }
                let mut out = vec![0.0];
                let mut from = 0.0;
                let mut a = amplitude;
                for _ in 0..2 * cycles {
                    ramp(&mut out, from, a, points_per_leg);
                    from = a;
                    a = -a * decay;
                }
                ramp(&mut out, from, 0.0, points_per_leg);
                Ok(out)
            }
            Self::Points { ref values } => Ok(values.clone()),
        }
    }
}

fn check_leg(points_per_leg: usize) -> Result<()> {
    if points_per_leg == 0 {
        return Err(SimError::InvalidParameter(
            "points_per_leg must be positive".to_string(),
        ));
    }
    Ok(())
}

// Appends `n` samples from just past `from` up to and including `to`.
fn ramp(out: &mut Vec<f64>, from: f64, to: f64, n: usize) {
    for k in 1..=n {
        out.push(from + (to - from) * k as f64 / n as f64);
    }
}
