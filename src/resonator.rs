// src/resonator.rs

use log::debug;
use serde::Serialize;

use crate::error::Result;
use crate::hysteresis::HysteresisEngine;
use crate::params::{HysteresisParams, MU_0, ResonatorParams};

/// On-axis field of `n` circular loops of radius `r` carrying current `i`,
/// at distance `z` from the loop plane.
///
/// B = n * mu0/2 * r^2 i / (z^2 + r^2)^(3/2)
#[inline]
pub fn loop_field(i: f64, r: f64, z: f64, n: f64) -> f64 {
    n * (MU_0 / 2.0) * (r * r * i) / (z * z + r * r).powf(1.5)
}

/// Snapshot of a resonator after its last drive update.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ResonatorState {
    pub freq: f64,
    pub mag: f64,
    pub field_at_magnet: f64,
    pub field_at_res: f64,
    pub current: f64,
}

/// A magneto-mechanical resonator tuned by a hysteretic magnet.
///
/// A drive loop sets the field at the magnet, the magnet's Preisach response
/// gives its magnetisation, and the stray field at the resonator shifts the
/// resonant frequency by the square of that field.
#[derive(Debug, Clone)]
pub struct Resonator {
    base_freq: f64,
    params: ResonatorParams,
    sat_field: f64,
    magnet: HysteresisEngine,
    state: ResonatorState,
}

impl Resonator {
    pub fn new(base_freq: f64) -> Result<Self> {
        Self::with_params(base_freq, ResonatorParams::default())
    }

    pub fn with_params(base_freq: f64, params: ResonatorParams) -> Result<Self> {
        let sat_field = loop_field(
            params.sat_current,
            params.loop_radius,
            params.dist_loop_mag,
            params.n_loops,
        );

        let magnet = HysteresisEngine::new(
            HysteresisParams::new(sat_field, params.sat_mag, params.remanence, params.size)
                .with_labels("Applied Field (T)", "Magnetization (A/m)"),
        )?;

        debug!(
            "resonator f0={:.4} sat_current={:.3e} A sat_field={:.4e} T",
            base_freq, params.sat_current, sat_field
        );

        Ok(Self {
            base_freq,
            params,
            sat_field,
            magnet,
            state: ResonatorState {
                freq: base_freq,
                mag: 0.0,
                field_at_magnet: 0.0,
                field_at_res: 0.0,
                current: 0.0,
            },
        })
    }

    /// Apply a drive current and return the new resonant frequency.
    pub fn set_current(&mut self, current: f64) -> Result<f64> {
        let p = &self.params;
        let field_at_magnet = loop_field(current, p.loop_radius, p.dist_loop_mag, p.n_loops);
        let mag = self.magnet.set_x(field_at_magnet)?;
        let field_at_res = MU_0 * mag;

        self.state = ResonatorState {
            freq: self.base_freq + field_to_freq_shift(field_at_res),
            mag,
            field_at_magnet,
            field_at_res,
            current,
        };
        Ok(self.state.freq)
    }

    pub fn state(&self) -> ResonatorState {
        self.state
    }

    pub fn freq(&self) -> f64 {
        self.state.freq
    }

    pub fn base_freq(&self) -> f64 {
        self.base_freq
    }

    /// Field at the magnet that drives it into saturation.
    pub fn sat_field(&self) -> f64 {
        self.sat_field
    }

    pub fn params(&self) -> &ResonatorParams {
        &self.params
    }

    /// Read-only view of the magnet, e.g. for plotting its loop.
    pub fn hysteresis(&self) -> &HysteresisEngine {
        &self.magnet
    }
}

// Quadratic in the stray field.
#[inline]
fn field_to_freq_shift(h: f64) -> f64 {
    h * h
}
