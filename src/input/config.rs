/*
MIT License

Copyright (c) 2025 Ameyanagi
*/

//! Configuration for the CRYSTAL output parser

use super::errors::{InputError, Result};
use serde::Serialize;
use std::path::PathBuf;

/// Default norm (in the length unit of the file) above which a lattice vector
/// is treated as a filler for a suppressed periodic direction.
pub const DEFAULT_LATTICE_THRESHOLD: f64 = 50.0;

/// Default marker substring flagging a spin-orbit calculation
pub const DEFAULT_SOC_MARKER: &str = "TWOCOMPON";

/// What to do with Fock matrices read while the spin-orbit flag is set
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum SocPolicy {
    /// Fail on the first spin-orbit Fock matrix
    #[default]
    Reject,
    /// Consume the matrix and drop it
    Discard,
}

/// CRYSTAL output parser configuration
#[derive(Debug, Clone)]
pub struct ParserConfig {
    /// Path to the output file
    pub input_path: PathBuf,
    /// Highest unit-cell index whose matrices are kept
    pub ncells: usize,
    /// Lattice vectors with a larger norm are discarded
    pub lattice_threshold: f64,
    /// Shift the motif so that the first atom sits at the origin
    pub recenter_motif: bool,
    /// Fail when a matrix dump does not write every entry
    pub require_complete_matrices: bool,
    /// Handling of spin-orbit Fock matrices
    pub soc_policy: SocPolicy,
    /// Marker substring flagging a spin-orbit calculation
    pub soc_marker: String,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from("crystal.outp"),
            ncells: 1,
            lattice_threshold: DEFAULT_LATTICE_THRESHOLD,
            recenter_motif: false,
            require_complete_matrices: true,
            soc_policy: SocPolicy::Reject,
            soc_marker: DEFAULT_SOC_MARKER.to_string(),
        }
    }
}

impl ParserConfig {
    /// Configuration keeping cells up to `ncells`, defaults elsewhere
    pub fn new(ncells: usize) -> Self {
        Self {
            ncells,
            ..Self::default()
        }
    }

    pub fn with_input_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.input_path = path.into();
        self
    }

    pub fn with_lattice_threshold(mut self, threshold: f64) -> Self {
        self.lattice_threshold = threshold;
        self
    }

    pub fn with_recentered_motif(mut self, recenter: bool) -> Self {
        self.recenter_motif = recenter;
        self
    }

    pub fn with_complete_matrices(mut self, require: bool) -> Self {
        self.require_complete_matrices = require;
        self
    }

    pub fn with_soc_policy(mut self, policy: SocPolicy) -> Self {
        self.soc_policy = policy;
        self
    }

    pub fn with_soc_marker(mut self, marker: impl Into<String>) -> Self {
        self.soc_marker = marker.into();
        self
    }

    /// Check that the configuration can drive a parse
    pub fn validate(&self) -> Result<()> {
        if self.ncells == 0 {
            return Err(InputError::InvalidConfig(
                "ncells must be at least 1".to_string(),
            ));
        }
        if !self.lattice_threshold.is_finite() || self.lattice_threshold <= 0.0 {
            return Err(InputError::InvalidConfig(format!(
                "lattice threshold must be positive and finite, got {}",
                self.lattice_threshold
            )));
        }
        if self.soc_marker.trim().is_empty() {
            return Err(InputError::InvalidConfig(
                "spin-orbit marker must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}
