use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use ndarray::{Array, Array2};
use serde::{Deserialize, Serialize};

use crate::error::OxidationError;

/// Concentration of the oxidizing species over the grid.
///
/// The field is fixed for the whole run. Rows are indexed from the surface
/// (row 0) into the bulk.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ConcentrationProfile {
    Uniform { value: f64 },
    Linear { surface: f64, bulk: f64 },
}

impl Default for ConcentrationProfile {
    fn default() -> Self {
        ConcentrationProfile::Uniform { value: 1.0 }
    }
}

impl ConcentrationProfile {
    pub fn field(&self, (rows, cols): (usize, usize)) -> Array2<f64> {
        match *self {
            ConcentrationProfile::Uniform { value } => Array::from_elem((rows, cols), value),
            ConcentrationProfile::Linear { surface, bulk } => {
                let depth = rows.saturating_sub(1).max(1) as f64;
                Array::from_shape_fn((rows, cols), |(i, _)| {
                    surface + (bulk - surface) * i as f64 / depth
                })
            }
        }
    }

    fn validate(&self) -> Result<(), OxidationError> {
        match *self {
            ConcentrationProfile::Uniform { value } => non_negative("concentration", value),
            ConcentrationProfile::Linear { surface, bulk } => {
                non_negative("surface concentration", surface)?;
                non_negative("bulk concentration", bulk)
            }
        }
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), OxidationError> {
    if !value.is_finite() || value < 0.0 {
        return Err(OxidationError::config(format!(
            "{} must be finite and non-negative, got {}",
            name, value
        )));
    }
    Ok(())
}

/// Physical constants, grid shape and schedule of a run.
///
/// Temperature is absolute (Kelvin). The defaults describe copper at
/// 1000 °C on a 100 x 100 grid for one hour in 1 s ticks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationParameters {
    /// Kelvin
    pub temperature: f64,
    /// Pre-exponential factor, m^2/s
    pub d0: f64,
    /// J/mol
    pub activation_energy: f64,
    /// J/(mol K)
    pub gas_constant: f64,
    /// m
    pub cell_radius: f64,
    pub molar_mass: f64,
    /// s
    pub time_step: f64,
    /// s
    pub duration: f64,
    pub rows: usize,
    pub cols: usize,
    /// Hand a snapshot to the observer every this many ticks.
    pub report_every: usize,
    pub seed: Option<u64>,
    pub concentration: ConcentrationProfile,
}

impl Default for SimulationParameters {
    fn default() -> Self {
        SimulationParameters {
            temperature: 1273.15,
            d0: 1e-4,
            activation_energy: 80e3,
            gas_constant: 8.31,
            cell_radius: 1e-7,
            molar_mass: 63.55,
            time_step: 1.0,
            duration: 3600.0,
            rows: 100,
            cols: 100,
            report_every: 3600,
            seed: None,
            concentration: ConcentrationProfile::default(),
        }
    }
}

impl SimulationParameters {
    pub fn from_json_str(s: &str) -> Result<Self, OxidationError> {
        let params: Self = serde_json::from_str(s)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, OxidationError> {
        let params: Self = serde_json::from_reader(reader)?;
        params.validate()?;
        Ok(params)
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, OxidationError> {
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Reject parameters that would put NaN or Inf into the tick loop.
    pub fn validate(&self) -> Result<(), OxidationError> {
        let constants = [
            ("temperature", self.temperature),
            ("d0", self.d0),
            ("activation_energy", self.activation_energy),
            ("gas_constant", self.gas_constant),
            ("cell_radius", self.cell_radius),
            ("molar_mass", self.molar_mass),
            ("time_step", self.time_step),
            ("duration", self.duration),
        ];

        for &(name, value) in constants.iter() {
            if !value.is_finite() || value <= 0.0 {
                return Err(OxidationError::config(format!(
                    "{} must be finite and positive, got {}",
                    name, value
                )));
            }
        }

        if self.rows == 0 || self.cols == 0 {
            return Err(OxidationError::config(format!(
                "grid must have at least one cell, got {} x {}",
                self.rows, self.cols
            )));
        }

        let ratio = self.tick_ratio();
        if !ratio.is_finite() || ratio >= usize::MAX as f64 {
            return Err(OxidationError::config(format!(
                "duration {} spans too many time steps of {}",
                self.duration, self.time_step
            )));
        }

        if self.ticks() == 0 {
            return Err(OxidationError::config(format!(
                "duration {} is shorter than one time step {}",
                self.duration, self.time_step
            )));
        }

        if self.report_every == 0 {
            return Err(OxidationError::config("report_every must be at least 1"));
        }

        self.concentration.validate()
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows, self.cols)
    }

    /// `duration / time_step`, snapped to the nearest whole number when it
    /// is only off by rounding.
    fn tick_ratio(&self) -> f64 {
        let n = self.duration / self.time_step;
        let whole = n.round();

        if (n - whole).abs() <= 1e-9 * whole.max(1.0) {
            whole
        } else {
            n.floor()
        }
    }

    /// Number of whole ticks in `duration`.
    pub fn ticks(&self) -> usize {
        self.tick_ratio() as usize
    }
}
