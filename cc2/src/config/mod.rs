//! Configuration management for coupled-cluster calculations
//!
//! This module handles configuration structures, defaults, and validation
//! for the diagram engine and the demonstration solver.

mod args;

pub use args::Args;

use serde::{Deserialize, Serialize};

/// Resolved engine parameters handed to the diagram engine.
#[derive(Debug, Clone)]
pub struct CcParams {
    /// Number of frozen (inactive) occupied orbitals.
    pub freeze: usize,
    /// Truncation tolerance for one-particle functions.
    pub thresh_3d: f64,
    /// Truncation tolerance for pair functions.
    pub thresh_6d: f64,
    /// Energy convergence threshold.
    pub econv: f64,
    /// Amplitude (rms) convergence threshold.
    pub dconv: f64,
    pub max_macro_iterations: usize,
    pub max_micro_iterations: usize,
}

impl Default for CcParams {
    fn default() -> Self {
        CcParams {
            freeze: 0,
            thresh_3d: 1e-7,
            thresh_6d: 1e-5,
            econv: 1e-6,
            dconv: 1e-5,
            max_macro_iterations: 20,
            max_micro_iterations: 10,
        }
    }
}

/// Main configuration structure
#[derive(Debug, Deserialize, Serialize)]
pub struct Config {
    pub model: ModelParams,
    pub cc: Option<CcSection>,
}

/// Parameters of the lattice model reference
#[derive(Debug, Deserialize, Serialize)]
pub struct ModelParams {
    pub grid_points: Option<usize>,
    pub extent: Option<f64>,
    /// Length scale of the Slater correlation factor.
    pub gamma: Option<f64>,
    /// Number of occupied reference orbitals.
    pub occupied: Option<usize>,
    /// Canonical orbital energies; must be negative for bound states.
    pub orbital_energies: Option<Vec<f64>>,
}

impl Default for ModelParams {
    fn default() -> Self {
        ModelParams {
            grid_points: Some(48),
            extent: Some(5.0),
            gamma: Some(1.4),
            occupied: Some(2),
            orbital_energies: None,
        }
    }
}

impl ModelParams {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.grid_points.is_none() {
            self.grid_points = defaults.grid_points;
        }
        if self.extent.is_none() {
            self.extent = defaults.extent;
        }
        if self.gamma.is_none() {
            self.gamma = defaults.gamma;
        }
        if self.occupied.is_none() {
            self.occupied = defaults.occupied;
        }
        self
    }
}

/// Coupled-cluster section of the configuration file
#[derive(Debug, Deserialize, Serialize)]
pub struct CcSection {
    pub freeze: Option<usize>,
    pub thresh_3d: Option<f64>,
    pub thresh_6d: Option<f64>,
    pub econv: Option<f64>,
    pub dconv: Option<f64>,
    pub max_macro_iterations: Option<usize>,
    pub max_micro_iterations: Option<usize>,
}

impl Default for CcSection {
    fn default() -> Self {
        let p = CcParams::default();
        CcSection {
            freeze: Some(p.freeze),
            thresh_3d: Some(p.thresh_3d),
            thresh_6d: Some(p.thresh_6d),
            econv: Some(p.econv),
            dconv: Some(p.dconv),
            max_macro_iterations: Some(p.max_macro_iterations),
            max_micro_iterations: Some(p.max_micro_iterations),
        }
    }
}

impl CcSection {
    /// Apply default values to any missing parameters
    pub fn with_defaults(mut self) -> Self {
        let defaults = Self::default();
        if self.freeze.is_none() {
            self.freeze = defaults.freeze;
        }
        if self.thresh_3d.is_none() {
            self.thresh_3d = defaults.thresh_3d;
        }
        if self.thresh_6d.is_none() {
            self.thresh_6d = defaults.thresh_6d;
        }
        if self.econv.is_none() {
            self.econv = defaults.econv;
        }
        if self.dconv.is_none() {
            self.dconv = defaults.dconv;
        }
        if self.max_macro_iterations.is_none() {
            self.max_macro_iterations = defaults.max_macro_iterations;
        }
        if self.max_micro_iterations.is_none() {
            self.max_micro_iterations = defaults.max_micro_iterations;
        }
        self
    }
}

impl Config {
    /// Apply defaults to all configuration sections
    pub fn with_defaults(mut self) -> Self {
        self.model = self.model.with_defaults();
        self.cc = Some(self.cc.take().unwrap_or_default().with_defaults());
        self
    }

    pub fn grid_points(&self) -> usize {
        self.model.grid_points.unwrap_or(48)
    }

    pub fn extent(&self) -> f64 {
        self.model.extent.unwrap_or(5.0)
    }

    pub fn gamma(&self) -> f64 {
        self.model.gamma.unwrap_or(1.4)
    }

    pub fn occupied(&self) -> usize {
        self.model.occupied.unwrap_or(2)
    }

    /// Resolved engine parameters, with command-line overrides applied.
    pub fn to_params(&self, args: &Args) -> CcParams {
        let defaults = CcParams::default();
        let cc = self.cc.as_ref();
        CcParams {
            freeze: args
                .freeze
                .or_else(|| cc.and_then(|c| c.freeze))
                .unwrap_or(defaults.freeze),
            thresh_3d: cc.and_then(|c| c.thresh_3d).unwrap_or(defaults.thresh_3d),
            thresh_6d: cc.and_then(|c| c.thresh_6d).unwrap_or(defaults.thresh_6d),
            econv: args
                .econv
                .or_else(|| cc.and_then(|c| c.econv))
                .unwrap_or(defaults.econv),
            dconv: args
                .dconv
                .or_else(|| cc.and_then(|c| c.dconv))
                .unwrap_or(defaults.dconv),
            max_macro_iterations: args
                .max_macro_iterations
                .or_else(|| cc.and_then(|c| c.max_macro_iterations))
                .unwrap_or(defaults.max_macro_iterations),
            max_micro_iterations: cc
                .and_then(|c| c.max_micro_iterations)
                .unwrap_or(defaults.max_micro_iterations),
        }
    }
}
