use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required parameter: {0}")]
    MissingParameter(&'static str),
    #[error("Invalid value for '{name}': {reason}")]
    InvalidValue { name: &'static str, reason: String },
    #[error("File I/O error for '{path}': {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
    #[error("TOML parsing error for '{path}': {source}")]
    Toml {
        path: String,
        source: toml::de::Error,
    },
}

/// Parameters of a clash scan.
///
/// Every field has a default; a TOML file only needs to list what it changes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ClashConfig {
    /// Allow bonded atoms to sit on special positions, where they would otherwise form
    /// a polymer bonded across the symmetry element.
    pub allow_polymer_cross_special_position: bool,
    /// Distance (Å) under which [`check_nonbonded_distance_guard`] rejects a model.
    /// `None` disables the guard.
    ///
    /// [`check_nonbonded_distance_guard`]: crate::workflows::clashes::check_nonbonded_distance_guard
    pub nonbonded_distance_threshold: Option<f64>,
    /// Treat the model as having no hydrogens and use implicit-hydrogen radii.
    pub assume_hydrogens_all_missing: bool,
    /// Pairs closer than this (Å) are reported as `BelowHardMinimum`, not as clashes.
    pub hard_minimum_nonbonded_distance: f64,
    /// A pair overlaps when its distance is below the combined radius minus this value.
    pub overlap_tolerance: f64,
    /// Reduction of the combined radius for donor/acceptor pairs.
    pub donor_acceptor_shrink: f64,
    /// Distance (Å) under which a symmetry copy of an atom onto itself is a special position.
    pub special_position_tolerance: f64,
}

impl Default for ClashConfig {
    fn default() -> Self {
        Self {
            allow_polymer_cross_special_position: false,
            nonbonded_distance_threshold: None,
            assume_hydrogens_all_missing: false,
            hard_minimum_nonbonded_distance: 0.0,
            overlap_tolerance: 0.4,
            donor_acceptor_shrink: 0.6,
            special_position_tolerance: 0.5,
        }
    }
}

impl ClashConfig {
    pub fn builder() -> ClashConfigBuilder {
        ClashConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            (
                "hard_minimum_nonbonded_distance",
                self.hard_minimum_nonbonded_distance,
            ),
            ("overlap_tolerance", self.overlap_tolerance),
            ("donor_acceptor_shrink", self.donor_acceptor_shrink),
            ("special_position_tolerance", self.special_position_tolerance),
        ];
        for (name, value) in non_negative {
            if !value.is_finite() || value < 0.0 {
                return Err(ConfigError::InvalidValue {
                    name,
                    reason: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        if let Some(threshold) = self.nonbonded_distance_threshold {
            if !threshold.is_finite() || threshold <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    name: "nonbonded_distance_threshold",
                    reason: format!("must be a positive number, got {}", threshold),
                });
            }
        }
        Ok(())
    }

    pub fn from_toml_str(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        let config = Self::from_toml_str(&content).map_err(|e| ConfigError::Toml {
            path: path.to_string_lossy().to_string(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }
}

/// Builds a [`ClashConfig`].
///
/// The three mode switches (special positions, hydrogen treatment and the hard
/// minimum) must be set explicitly; the tolerances fall back to their defaults.
#[derive(Default)]
pub struct ClashConfigBuilder {
    allow_polymer_cross_special_position: Option<bool>,
    nonbonded_distance_threshold: Option<f64>,
    assume_hydrogens_all_missing: Option<bool>,
    hard_minimum_nonbonded_distance: Option<f64>,
    overlap_tolerance: Option<f64>,
    donor_acceptor_shrink: Option<f64>,
    special_position_tolerance: Option<f64>,
}

impl ClashConfigBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_polymer_cross_special_position(mut self, allow: bool) -> Self {
        self.allow_polymer_cross_special_position = Some(allow);
        self
    }
    pub fn nonbonded_distance_threshold(mut self, threshold: f64) -> Self {
        self.nonbonded_distance_threshold = Some(threshold);
        self
    }
    pub fn assume_hydrogens_all_missing(mut self, missing: bool) -> Self {
        self.assume_hydrogens_all_missing = Some(missing);
        self
    }
    pub fn hard_minimum_nonbonded_distance(mut self, distance: f64) -> Self {
        self.hard_minimum_nonbonded_distance = Some(distance);
        self
    }
    pub fn overlap_tolerance(mut self, tolerance: f64) -> Self {
        self.overlap_tolerance = Some(tolerance);
        self
    }
    pub fn donor_acceptor_shrink(mut self, shrink: f64) -> Self {
        self.donor_acceptor_shrink = Some(shrink);
        self
    }
    pub fn special_position_tolerance(mut self, tolerance: f64) -> Self {
        self.special_position_tolerance = Some(tolerance);
        self
    }

    pub fn build(self) -> Result<ClashConfig, ConfigError> {
        let defaults = ClashConfig::default();
        let config = ClashConfig {
            allow_polymer_cross_special_position: self.allow_polymer_cross_special_position.ok_or(
                ConfigError::MissingParameter("allow_polymer_cross_special_position"),
            )?,
            nonbonded_distance_threshold: self.nonbonded_distance_threshold,
            assume_hydrogens_all_missing: self
                .assume_hydrogens_all_missing
                .ok_or(ConfigError::MissingParameter("assume_hydrogens_all_missing"))?,
            hard_minimum_nonbonded_distance: self
                .hard_minimum_nonbonded_distance
                .ok_or(ConfigError::MissingParameter(
                    "hard_minimum_nonbonded_distance",
                ))?,
            overlap_tolerance: self.overlap_tolerance.unwrap_or(defaults.overlap_tolerance),
            donor_acceptor_shrink: self
                .donor_acceptor_shrink
                .unwrap_or(defaults.donor_acceptor_shrink),
            special_position_tolerance: self
                .special_position_tolerance
                .unwrap_or(defaults.special_position_tolerance),
        };
        config.validate()?;
        Ok(config)
    }
}
