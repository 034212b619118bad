// src/output.rs
//
// CSV tables for hysteresis traces and detector frequency maps.

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::resonator::ResonatorState;

fn ensure_parent_dir(path: &Path) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    Ok(())
}

/// Write an (x, y) trace, one row per unit step.
pub fn write_history_csv(path: &Path, history: &[(f64, f64)], header: (&str, &str)) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut w = BufWriter::new(File::create(path)?);

    writeln!(w, "step,{},{}", header.0, header.1)?;
    for (k, (x, y)) in history.iter().enumerate() {
        writeln!(w, "{},{:.16e},{:.16e}", k, x, y)?;
    }
    w.flush()?;
    Ok(())
}

/// Write one row per detector cell with its base frequency and last state.
pub fn write_detector_csv(
    path: &Path,
    plan: &[Vec<f64>],
    states: &[Vec<ResonatorState>],
) -> Result<()> {
    ensure_parent_dir(path)?;
    let mut w = BufWriter::new(File::create(path)?);

    writeln!(w, "row,col,base_freq,current,field_at_magnet,mag,field_at_res,freq")?;
    for (r, (plan_row, state_row)) in plan.iter().zip(states).enumerate() {
        for (c, (f0, s)) in plan_row.iter().zip(state_row).enumerate() {
            writeln!(
                w,
                "{},{},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e},{:.16e}",
                r, c, f0, s.current, s.field_at_magnet, s.mag, s.field_at_res, s.freq
            )?;
        }
    }
    w.flush()?;
    Ok(())
}
