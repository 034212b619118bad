// src/config.rs
//
// Run provenance written next to every set of outputs as config.json.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::str::FromStr;

use crate::detector::Detector;
use crate::drive::Waveform;
use crate::error::{Result, SimError};
use crate::params::{DetectorParams, HysteresisParams, ResonatorParams};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunConfig {
    pub model: ModelConfig,
    pub drive: DriveConfig,
    pub run: RunInfo,
}

/// Which layer of the model a run drives.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "target", rename_all = "snake_case")]
pub enum ModelConfig {
    Hysteresis(HysteresisParams),
    Resonator {
        base_freq: f64,
        resonator: ResonatorParams,
    },
    Detector(DetectorParams),
}

/// One detector drive line, written as "row:N" or "col:N".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Line {
    Row(usize),
    Col(usize),
}

impl Line {
    /// Set the current on this line of `detector`.
    pub fn drive(self, detector: &mut Detector, current: f64) -> Result<()> {
        match self {
            Self::Row(k) => detector.set_row_current(current, k),
            Self::Col(k) => detector.set_col_current(current, k),
        }
    }

    /// First cell on the line.
    pub fn first_cell(self) -> (usize, usize) {
        match self {
            Self::Row(k) => (k, 0),
            Self::Col(k) => (0, k),
        }
    }
}

impl FromStr for Line {
    type Err = SimError;

    fn from_str(s: &str) -> Result<Self> {
        let (axis, idx) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| SimError::InvalidParameter(format!("line '{s}' must look like row:N or col:N")))?;
        let idx = idx
            .parse::<usize>()
            .map_err(|_| SimError::InvalidParameter(format!("bad line index '{idx}'")))?;
        match axis {
            "row" => Ok(Self::Row(idx)),
            "col" | "column" => Ok(Self::Col(idx)),
            _ => Err(SimError::InvalidParameter(format!("unknown line axis '{axis}'"))),
        }
    }
}

impl TryFrom<String> for Line {
    type Error = SimError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl fmt::Display for Line {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Row(k) => write!(f, "row:{k}"),
            Self::Col(k) => write!(f, "col:{k}"),
        }
    }
}

impl From<Line> for String {
    fn from(line: Line) -> Self {
        line.to_string()
    }
}

/// A constant current held on one detector line for the whole run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LineBias {
    pub line: Line,
    pub current: f64,
}

impl FromStr for LineBias {
    type Err = SimError;

    /// "row:N:I" or "col:N:I", current in A.
    fn from_str(s: &str) -> Result<Self> {
        let (line, current) = s
            .rsplit_once(':')
            .ok_or_else(|| SimError::InvalidParameter(format!("bias '{s}' must look like row:N:I")))?;
        let current = current
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|i| i.is_finite())
            .ok_or_else(|| SimError::InvalidParameter(format!("bad bias current '{current}'")))?;
        Ok(Self {
            line: line.parse()?,
            current,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    pub waveform: Waveform,
    /// Detector line the waveform is applied to. Defaults to row 0.
    #[serde(default)]
    pub line: Option<Line>,
    /// Detector lines held at a fixed current before the sweep starts.
    #[serde(default)]
    pub biases: Vec<LineBias>,
}

impl DriveConfig {
    pub fn swept_line(&self) -> Line {
        self.line.unwrap_or(Line::Row(0))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunInfo {
    pub binary: String,
    pub run_id: String,

    /// False for runs whose drive cannot be reproduced by the `pmm-sim`
    /// driver from this file alone (e.g. multi-line scans).
    #[serde(default = "default_replayable")]
    pub replayable: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    // Optional provenance (can be filled later)
    pub git_commit: Option<String>,
    pub timestamp_utc: Option<String>,
}

fn default_replayable() -> bool {
    true
}

impl RunInfo {
    pub fn new(binary: &str, run_id: &str) -> Self {
        Self {
            binary: binary.to_string(),
            run_id: run_id.to_string(),
            replayable: true,
            note: None,
            git_commit: None,
            timestamp_utc: None,
        }
    }
}

impl RunConfig {
    pub fn write_to_dir(&self, out_dir: &Path) -> Result<()> {
        let path = out_dir.join("config.json");
        let file = File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }

    pub fn read_from_path(path: &Path) -> Result<Self> {
        let file = File::open(path)?;
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    /// Fail if the `pmm-sim` driver cannot rerun this config as recorded.
    pub fn check_replayable(&self) -> Result<()> {
        if !self.run.replayable {
            let note = self.run.note.as_deref().unwrap_or("no description");
            return Err(SimError::InvalidParameter(format!(
                "run '{}' from {} cannot be replayed ({note})",
                self.run.run_id, self.run.binary
            )));
        }
        let uses_lines = self.drive.line.is_some() || !self.drive.biases.is_empty();
        if uses_lines && !matches!(self.model, ModelConfig::Detector(_)) {
            return Err(SimError::InvalidParameter(
                "line and bias only apply to detector runs".to_string(),
            ));
        }
        Ok(())
    }
}
