// src/lib.rs

pub mod config;
pub mod detector;
pub mod drive;
pub mod error;
pub mod grid;
pub mod hysteresis;
pub mod output;
pub mod params;
pub mod resonator;
pub mod visualisation;

pub use detector::Detector;
pub use error::{Result, SimError};
pub use hysteresis::{Direction, HysteresisEngine};
pub use resonator::Resonator;
