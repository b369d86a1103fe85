//! Configuration types.
//!
//! # JSON shape
//!
//! ```json
//! {
//!   "damping": 0.85,
//!   "tolerance": 1e-6,
//!   "max_iterations": 100,
//!   "method": "classical"
//! }
//! ```
//!
//! Every field is optional and falls back to [`PageRankConfig::default`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::errors::{PageRankError, Result};

/// Solver strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Method {
    /// Constant damping, constant tolerance.
    #[default]
    Classical,
    /// Damping raised toward 1 on a fixed schedule.
    Iterative,
    /// Damping and tolerance tightened together in rounds.
    Adaptive,
}

impl Method {
    /// All recognized methods, in declaration order.
    pub const ALL: [Method; 3] = [Method::Classical, Method::Iterative, Method::Adaptive];

    /// Returns the user-facing name used in JSON and error messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Classical => "classical",
            Self::Iterative => "iterative",
            Self::Adaptive => "adaptive",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = PageRankError;

    fn from_str(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "classical" => Ok(Method::Classical),
            "iterative" => Ok(Method::Iterative),
            "adaptive" => Ok(Method::Adaptive),
            _ => Err(PageRankError::UnknownMethod(value.to_string())),
        }
    }
}

/// Parameters of one PageRank computation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PageRankConfig {
    /// Damping applied at convergence (typically 0.85).
    pub damping: f64,
    /// L1 convergence threshold.
    pub tolerance: f64,
    /// Hard cap on the number of matrix-vector products.
    pub max_iterations: usize,
    /// Which schedule to run.
    pub method: Method,
}

impl Default for PageRankConfig {
    fn default() -> Self {
        Self {
            damping: 0.85,
            tolerance: 1e-6,
            max_iterations: 100,
            method: Method::Classical,
        }
    }
}

impl PageRankConfig {
    /// Create a config with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the damping factor
    pub fn with_damping(mut self, damping: f64) -> Self {
        self.damping = damping;
        self
    }

    /// Set the convergence tolerance
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the maximum iterations
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the solver strategy
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = method;
        self
    }

    /// Parse a config from JSON.
    ///
    /// Missing fields take their default value; unknown fields are rejected.
    /// An unrecognized `method` string surfaces as
    /// [`PageRankError::UnknownMethod`] rather than a generic parse error.
    pub fn from_json(json: &str) -> Result<Self> {
        let raw: RawConfig = serde_json::from_str(json)?;
        let defaults = Self::default();

        let method = match raw.method {
            Some(name) => name.parse()?,
            None => defaults.method,
        };

        let config = Self {
            damping: raw.damping.unwrap_or(defaults.damping),
            tolerance: raw.tolerance.unwrap_or(defaults.tolerance),
            max_iterations: raw.max_iterations.unwrap_or(defaults.max_iterations),
            method,
        };
        config.validate()?;
        Ok(config)
    }

    /// Check every field is in range.
    pub fn validate(&self) -> Result<()> {
        if !(self.damping > 0.0 && self.damping < 1.0) {
            return Err(PageRankError::invalid_config(
                "damping",
                format!("must lie in (0, 1), got {}", self.damping),
            ));
        }
        if !(self.tolerance.is_finite() && self.tolerance > 0.0) {
            return Err(PageRankError::invalid_config(
                "tolerance",
                format!("must be positive and finite, got {}", self.tolerance),
            ));
        }
        if self.max_iterations == 0 {
            return Err(PageRankError::invalid_config(
                "max_iterations",
                "must be at least 1",
            ));
        }
        Ok(())
    }
}

/// Wire form of [`PageRankConfig`], with the method kept as a string so the
/// name can be checked by [`Method::from_str`].
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawConfig {
    #[serde(default)]
    damping: Option<f64>,
    #[serde(default)]
    tolerance: Option<f64>,
    #[serde(default)]
    max_iterations: Option<usize>,
    #[serde(default)]
    method: Option<String>,
}
