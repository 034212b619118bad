// src/main.rs
//
// Exploratory driver for the Preisach resonator model.
//
// Outputs from this driver are written to `runs/` (or the directory
// specified via `out=`) and are not committed to version control.
//
// Examples:
//
//   cargo run --release -- loop size=20 xsat=1 ysat=1 yrem=0.5 amp=1.5
//       -> major loop of a bare Preisach plane, history CSV and PNG.
//
//   cargo run --release -- resonator f0=5 amp=0.03 waveform=decaying decay=0.7
//       -> one resonator driven through a demagnetising current sweep.
//
//   cargo run --release -- detector rows=4 cols=5 line=row:2 amp=0.02 bias=col:1:0.01
//       -> crossbar array; one column biased, one row swept, frequency map PNG.
//
//   cargo run --release -- config=runs/<run_id>/config.json
//       -> replay a previous run from its config.json.
//
// Typical outputs (per run directory):
//   runs/<run_id>/
//     ├── config.json
//     ├── history.csv
//     ├── hysteresis.png
//     ├── detector.csv       (detector runs only)
//     └── freq_map.png       (detector runs only)
//
// Set RUST_LOG=debug to see the weight triangle and per-construction summaries.

use std::env;
use std::fs::create_dir_all;
use std::iter;
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use log::{info, warn};

use pmm_sim::config::{DriveConfig, Line, LineBias, ModelConfig, RunConfig, RunInfo};
use pmm_sim::detector::Detector;
use pmm_sim::drive::Waveform;
use pmm_sim::hysteresis::HysteresisEngine;
use pmm_sim::output::{write_detector_csv, write_history_csv};
use pmm_sim::params::{DetectorParams, HysteresisParams, ResonatorParams};
use pmm_sim::resonator::Resonator;
use pmm_sim::visualisation::{save_frequency_map, save_hysteresis_plot};
use pmm_sim::SimError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Target {
    Loop,
    Resonator,
    Detector,
}

impl Target {
    fn from_arg(s: &str) -> Option<Self> {
        match s {
            "loop" | "hysteresis" => Some(Self::Loop),
            "resonator" | "res" => Some(Self::Resonator),
            "detector" | "crossbar" => Some(Self::Detector),
            _ => None,
        }
    }

    fn as_str(&self) -> &'static str {
        match self {
            Self::Loop => "loop",
            Self::Resonator => "resonator",
            Self::Detector => "detector",
        }
    }
}

// Arguments whose value is not a number.
const TEXT_KEYS: [&str; 6] = ["config", "waveform", "line", "bias", "out", "run"];

// Arguments that take a count or a size.
const USIZE_KEYS: [&str; 6] = ["size", "ressize", "rows", "cols", "points", "cycles"];

/// True when `v` is not a usable value for `key`, so the previous value stays.
fn rejects_value(key: &str, v: &str) -> bool {
    if TEXT_KEYS.contains(&key) {
        false
    } else if USIZE_KEYS.contains(&key) {
        v.parse::<usize>().is_err()
    } else {
        v.parse::<f64>().is_err()
    }
}

fn print_usage() {
    eprintln!(
        r#"Usage:
  cargo run -- [loop|resonator|detector]
             [size=N] [xsat=VAL] [ysat=VAL] [yrem=VAL]           (loop)
             [f0=VAL] [satcurrent=VAL]                            (resonator/detector)
             [rows=N] [cols=N] [fstart=VAL] [fstop=VAL]
             [line=row:N|col:N] [bias=row:N:I|col:N:I]            (detector)
             [waveform=triangle|decaying] [amp=VAL] [points=N] [decay=VAL] [cycles=N]
             [out=DIR] [run=RUN_ID] [noplot]
  cargo run -- config=PATH/config.json [out=DIR] [run=RUN_ID] [noplot]

Notes:
  - amp is a field (loop) or a drive current in A (resonator/detector).
  - history.csv holds one row per unit step of the Preisach plane, not per drive sample.
"#
    );
}

/// Run ids become directory names: anything outside [A-Za-z0-9_.-] turns into '_'.
fn sanitize_run_id(s: &str) -> String {
    let id = s
        .trim()
        .replace(|c: char| !(c.is_ascii_alphanumeric() || "_-.".contains(c)), "_");
    if id.is_empty() { "run".to_string() } else { id }
}

fn default_run_id(target: &str, waveform: &Waveform) -> String {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_else(|_| std::time::Duration::from_secs(0));
    let ts = format!("{}{:03}", now.as_secs(), now.subsec_millis());
    format!("{}_{}_{}", ts, target, waveform.kind())
}

/// `<out_root>/<run_id>`, or the first free `<run_id>_k` next to it.
fn unique_run_dir(out_root: &Path, run_id: &str) -> Result<PathBuf, SimError> {
    iter::once(run_id.to_string())
        .chain((1..1000).map(|k| format!("{run_id}_{k}")))
        .map(|name| out_root.join(name))
        .find(|dir| !dir.exists())
        .ok_or_else(|| {
            SimError::InvalidParameter(format!(
                "no free run directory for '{run_id}' under {}",
                out_root.display()
            ))
        })
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let argv: Vec<String> = env::args().collect();

    let mut target = Target::Loop;
    let mut plot = true;
    let mut config_path: Option<PathBuf> = None;

    let mut hyst = HysteresisParams::default().with_labels("x", "y");
    let mut res = ResonatorParams::default();
    let mut det = DetectorParams::default();
    let mut base_freq = 0.0;

    let mut waveform_kind = "triangle".to_string();
    let mut amp: Option<f64> = None;
    let mut points: usize = 50;
    let mut decay: f64 = 0.8;
    let mut cycles: usize = 6;
    let mut line: Option<Line> = None;
    let mut biases: Vec<LineBias> = Vec::new();

    let mut out_root = "runs".to_string();
    let mut run_id_override: Option<String> = None;

    for arg in argv.iter().skip(1) {
        if arg == "-h" || arg == "--help" || arg == "help" {
            print_usage();
            return Ok(());
        }
        if let Some(t) = Target::from_arg(arg) {
            target = t;
            continue;
        }
        if arg == "noplot" {
            plot = false;
            continue;
        }

        let Some((key, v)) = arg.split_once('=') else {
            warn!("ignoring unknown argument '{arg}'");
            continue;
        };
        let v = v.trim();
        let parsed_f64 = v.parse::<f64>().ok();
        let parsed_usize = v.parse::<usize>().ok();

        match key {
            "config" => config_path = Some(PathBuf::from(v)),
            "size" => hyst.size = parsed_usize.unwrap_or(hyst.size),
            "xsat" => hyst.x_saturation = parsed_f64.unwrap_or(hyst.x_saturation),
            "ysat" => hyst.y_saturation = parsed_f64.unwrap_or(hyst.y_saturation),
            "yrem" => hyst.y_remanence = parsed_f64.unwrap_or(hyst.y_remanence),
            "f0" => base_freq = parsed_f64.unwrap_or(base_freq),
            "satcurrent" => res.sat_current = parsed_f64.unwrap_or(res.sat_current),
            "ressize" => res.size = parsed_usize.unwrap_or(res.size),
            "rows" => det.rows = parsed_usize.unwrap_or(det.rows),
            "cols" => det.cols = parsed_usize.unwrap_or(det.cols),
            "fstart" => det.fstart = parsed_f64.unwrap_or(det.fstart),
            "fstop" => det.fstop = parsed_f64.unwrap_or(det.fstop),
            "waveform" => waveform_kind = v.to_string(),
            "amp" => amp = parsed_f64,
            "points" => points = parsed_usize.unwrap_or(points),
            "decay" => decay = parsed_f64.unwrap_or(decay),
            "cycles" => cycles = parsed_usize.unwrap_or(cycles),
            "line" => line = Some(v.parse()?),
            "bias" => biases.push(v.parse()?),
            "out" => out_root = v.to_string(),
            "run" => run_id_override = Some(v.to_string()),
            _ => {
                warn!("ignoring unknown argument '{arg}'");
                continue;
            }
        }
        if rejects_value(key, v) {
            warn!("could not parse value for '{key}': '{v}', keeping previous");
        }
    }

    let mut cfg = match config_path {
        Some(path) => {
            info!("loading {}", path.display());
            RunConfig::read_from_path(&path)?
        }
        None => {
            det.resonator = res.clone();

            let default_amp = match target {
                Target::Loop => 1.5 * hyst.x_saturation,
                _ => 1.5 * res.sat_current,
            };
            let amplitude = amp.unwrap_or(default_amp);
            let waveform = match waveform_kind.as_str() {
                "decaying" | "demag" => Waveform::Decaying {
                    amplitude,
                    decay,
                    cycles,
                    points_per_leg: points,
                },
                other => {
                    if other != "triangle" {
                        warn!("unknown waveform '{other}', using triangle");
                    }
                    Waveform::Triangle {
                        amplitude,
                        points_per_leg: points,
                    }
                }
            };

            if target != Target::Detector && (line.is_some() || !biases.is_empty()) {
                warn!("line= and bias= only apply to detector runs, ignoring them");
                line = None;
                biases.clear();
            }

            let model = match target {
                Target::Loop => ModelConfig::Hysteresis(hyst),
                Target::Resonator => ModelConfig::Resonator {
                    base_freq,
                    resonator: res,
                },
                Target::Detector => ModelConfig::Detector(det),
            };

            RunConfig {
                model,
                drive: DriveConfig {
                    waveform,
                    line,
                    biases,
                },
                run: RunInfo::new("pmm-sim", ""),
            }
        }
    };

    cfg.check_replayable()?;

    let target_name = match cfg.model {
        ModelConfig::Hysteresis(_) => Target::Loop.as_str(),
        ModelConfig::Resonator { .. } => Target::Resonator.as_str(),
        ModelConfig::Detector(_) => Target::Detector.as_str(),
    };
    let run_id = sanitize_run_id(
        &run_id_override.unwrap_or_else(|| default_run_id(target_name, &cfg.drive.waveform)),
    );
    cfg.run.run_id = run_id.clone();

    let out_dir = unique_run_dir(Path::new(&out_root), &run_id)?;
    create_dir_all(&out_dir)?;
    cfg.write_to_dir(&out_dir)?;

    let samples = cfg.drive.waveform.samples()?;
    info!(
        "run {} ({}), {} drive samples -> {}",
        run_id,
        target_name,
        samples.len(),
        out_dir.display()
    );

    match &cfg.model {
        ModelConfig::Hysteresis(p) => {
            let mut engine = HysteresisEngine::new(p.clone())?;
            for &x in &samples {
                engine.set_x(x)?;
            }
            finish_engine(&engine, &out_dir, plot)?;
        }
        ModelConfig::Resonator {
            base_freq,
            resonator,
        } => {
            let mut r = Resonator::with_params(*base_freq, resonator.clone())?;
            let mut f_min = f64::INFINITY;
            let mut f_max = f64::NEG_INFINITY;
            for &i in &samples {
                let f = r.set_current(i)?;
                f_min = f_min.min(f);
                f_max = f_max.max(f);
            }
            info!(
                "frequency range [{:.9e}, {:.9e}], final {:.9e}",
                f_min,
                f_max,
                r.freq()
            );
            finish_engine(r.hysteresis(), &out_dir, plot)?;
        }
        ModelConfig::Detector(p) => {
            let mut d = Detector::new(p.clone())?;

            for b in &cfg.drive.biases {
                b.line.drive(&mut d, b.current)?;
                info!("bias {} = {:.4e} A", b.line, b.current);
            }

            let swept = cfg.drive.swept_line();
            for &i in &samples {
                swept.drive(&mut d, i)?;
            }

            write_detector_csv(&out_dir.join("detector.csv"), d.frequency_plan(), &d.states())?;

            // Loop of the first cell on the swept line.
            let (r, c) = swept.first_cell();
            finish_engine(d.resonator(r, c)?.hysteresis(), &out_dir, plot)?;

            if plot {
                let path = out_dir.join("freq_map.png");
                save_frequency_map(&d.frequencies(), &path.to_string_lossy())?;
            }
        }
    }

    info!("wrote outputs to {}", out_dir.display());
    Ok(())
}

fn finish_engine(
    engine: &HysteresisEngine,
    out_dir: &Path,
    plot: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let p = engine.params();
    let header = (
        if p.x_label.is_empty() { "x" } else { p.x_label.as_str() },
        if p.y_label.is_empty() { "y" } else { p.y_label.as_str() },
    );
    write_history_csv(&out_dir.join("history.csv"), engine.history(), header)?;
    info!(
        "{} unit steps, final x = {:.6e}, y = {:.6e} (y_max {:.6e})",
        engine.history().len() - 1,
        engine.field(),
        engine.y(),
        engine.y_max()
    );

    if plot {
        let path = out_dir.join("hysteresis.png");
        save_hysteresis_plot(engine, &path.to_string_lossy())?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_keys_reject_fractional_and_negative_values() {
        assert!(rejects_value("size", "3.5"));
        assert!(rejects_value("rows", "-1"));
        assert!(rejects_value("points", "2.5"));
        assert!(!rejects_value("cycles", "4"));

        assert!(rejects_value("xsat", "abc"));
        assert!(!rejects_value("xsat", "2.5"));
        assert!(!rejects_value("line", "row:1"));
    }

    #[test]
    fn run_ids_are_safe_directory_names() {
        assert_eq!(sanitize_run_id("a b/c"), "a_b_c");
        assert_eq!(sanitize_run_id(" loop-1.v2 "), "loop-1.v2");
        assert_eq!(sanitize_run_id("  "), "run");
    }

    #[test]
    fn taken_run_dirs_get_a_suffix() {
        let root = env::temp_dir().join(format!("pmm_sim_runs_{}", std::process::id()));
        create_dir_all(root.join("demo")).unwrap();
        create_dir_all(root.join("demo_1")).unwrap();

        assert_eq!(unique_run_dir(&root, "fresh").unwrap(), root.join("fresh"));
        assert_eq!(unique_run_dir(&root, "demo").unwrap(), root.join("demo_2"));

        std::fs::remove_dir_all(&root).ok();
    }
}
