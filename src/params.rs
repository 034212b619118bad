// src/params.rs

use serde::{Deserialize, Serialize};

/// Vacuum permeability (H/m), CODATA 2018.
pub const MU_0: f64 = 1.256_637_062_12e-6;

/// Parameters of a discretized Preisach plane.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HysteresisParams {
    pub x_saturation: f64, // input at which the major loop closes
    pub y_saturation: f64, // output at saturation
    pub y_remanence: f64,  // output left at zero input after saturation
    pub size: usize,       // plane dimension N (even)
    #[serde(default)]
    pub x_label: String,
    #[serde(default)]
    pub y_label: String,
}

impl HysteresisParams {
    pub fn new(x_saturation: f64, y_saturation: f64, y_remanence: f64, size: usize) -> Self {
        Self {
            x_saturation,
            y_saturation,
            y_remanence,
            size,
            x_label: String::new(),
            y_label: String::new(),
        }
    }

    pub fn with_labels(mut self, x_label: &str, y_label: &str) -> Self {
        self.x_label = x_label.to_string();
        self.y_label = y_label.to_string();
        self
    }
}

impl Default for HysteresisParams {
    fn default() -> Self {
        Self::new(1.0, 1.0, 0.5, 10)
    }
}

/// Drive loop and magnet of a single resonator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResonatorParams {
    pub n_loops: f64,
    pub loop_radius: f64,   // m
    pub dist_loop_mag: f64, // loop plane to magnet, m
    pub sat_current: f64,   // A
    pub sat_mag: f64,       // A/m
    pub remanence: f64,     // A/m
    pub size: usize,        // Preisach plane dimension
}

impl Default for ResonatorParams {
    fn default() -> Self {
        Self {
            n_loops: 1.0,
            loop_radius: 1.0,
            dist_loop_mag: 0.0,
            sat_current: 0.020,
            sat_mag: 1401.4,
            remanence: 949.36,
            size: 100,
        }
    }
}

/// Crossbar array layout and frequency plan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorParams {
    pub rows: usize,
    pub cols: usize,
    pub fstart: f64,
    pub fstop: f64,
    #[serde(default)]
    pub resonator: ResonatorParams,
}

impl Default for DetectorParams {
    fn default() -> Self {
        Self {
            rows: 9,
            cols: 10,
            fstart: 0.0,
            fstop: 20.0,
            resonator: ResonatorParams::default(),
        }
    }
}
