// src/bin/hysteresis_loop.rs
//
// Major loop plus a family of first-order reversal curves (FORCs) of a bare
// Preisach plane. Each FORC starts from positive saturation, comes down to a
// reversal field, then sweeps back up to saturation.
//
// Run:
//   cargo run --bin hysteresis_loop
//
// Output:
//   out/hysteresis_loop/
//     ├── config.json
//     ├── major_loop.csv
//     ├── major_loop.png
//     └── forc.csv

use std::fs::{File, create_dir_all};
use std::io::{BufWriter, Write};
use std::path::Path;

use log::info;

use pmm_sim::config::{DriveConfig, ModelConfig, RunConfig, RunInfo};
use pmm_sim::drive::Waveform;
use pmm_sim::hysteresis::HysteresisEngine;
use pmm_sim::output::write_history_csv;
use pmm_sim::params::HysteresisParams;
use pmm_sim::visualisation::save_hysteresis_plot;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // --- benchmark parameters ---
    let size = 40;
    let x_sat = 1.0_f64;
    let y_sat = 1.0_f64;
    let y_rem = 0.6_f64;
    let points_per_leg = 40;
    let n_reversals = 10;
    // ----------------------------

    let params = HysteresisParams::new(x_sat, y_sat, y_rem, size).with_labels("H (arb.)", "M (arb.)");
    let waveform = Waveform::Triangle {
        amplitude: 1.25 * x_sat,
        points_per_leg,
    };

    let out_dir = Path::new("out").join("hysteresis_loop");
    create_dir_all(&out_dir)?;

    RunConfig {
        model: ModelConfig::Hysteresis(params.clone()),
        drive: DriveConfig {
            waveform: waveform.clone(),
            line: None,
            biases: Vec::new(),
        },
        run: RunInfo::new("hysteresis_loop", "hysteresis_loop"),
    }
    .write_to_dir(&out_dir)?;

    // -------------------------------------------------
    // Major loop
    // -------------------------------------------------
    let mut engine = HysteresisEngine::new(params.clone())?;
    for x in waveform.samples()? {
        engine.set_x(x)?;
    }
    write_history_csv(&out_dir.join("major_loop.csv"), engine.history(), ("H", "M"))?;
    save_hysteresis_plot(&engine, &out_dir.join("major_loop.png").to_string_lossy())?;

    // Coercive field on the descending branch: first sample where M < 0.
    let descending = engine
        .history()
        .windows(2)
        .find(|w| w[1].0 < w[0].0 && w[0].1 >= 0.0 && w[1].1 < 0.0)
        .map(|w| w[1].0);
    info!("descending coercive field ~ {:?}", descending);

    // -------------------------------------------------
    // First-order reversal curves
    // -------------------------------------------------
    let file = File::create(out_dir.join("forc.csv"))?;
    let mut w = BufWriter::new(file);
    writeln!(w, "h_reversal,h,m")?;

    for k in 0..n_reversals {
        let h_r = x_sat * (1.0 - 2.0 * k as f64 / (n_reversals - 1) as f64);

        let mut e = HysteresisEngine::new(params.clone())?;
        e.set_x(1.25 * x_sat)?;
        e.set_x(h_r)?;

        for j in 0..=points_per_leg {
            let h = h_r + (1.25 * x_sat - h_r) * j as f64 / points_per_leg as f64;
            let m = e.set_x(h)?;
            writeln!(w, "{:.16e},{:.16e},{:.16e}", h_r, h, m)?;
        }
    }
    w.flush()?;

    println!("Wrote outputs to {:?}", out_dir);
    println!(
        "Saturation {:.4}, remanence {:.4}, y_max {:.4}",
        y_sat,
        y_rem,
        engine.y_max()
    );

    Ok(())
}
