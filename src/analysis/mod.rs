//! Thermocline detection.
//!
//! This module provides:
//! - Forward-difference temperature gradient over depth
//! - Threshold flags against the mean gradient magnitude
//! - Run scanning and longest-run selection
//! - [`ThermoclineDetector`], which chains these with optional smoothing
//!
//! # Method
//!
//! ```text
//! g[i]    = (T[i+1] - T[i]) / (z[i+1] - z[i])
//! flag[i] = |g[i]| >= |mean(g)|
//! ```
//!
//! Every maximal run of set flags is a candidate layer. The candidate with
//! the largest depth extent is reported as the thermocline, with its first
//! depth as `top` and its last depth as `bottom`.
//!
//! # Example
//!
//! ```
//! use thermocline_rs::analysis::{DetectionConfig, ThermoclineDetector};
//! use thermocline_rs::filter::SmoothingMode;
//! use thermocline_rs::profile::Profile;
//!
//! let depth: Vec<f64> = (0..120).map(|i| -0.25 * i as f64).collect();
//! let temp: Vec<f64> = depth.iter().map(|&z| 15.0 + 5.0 * ((z + 12.0) / 2.0).tanh()).collect();
//! let profile = Profile::new(&depth, &temp).unwrap().with_name("synthetic");
//!
//! let config = DetectionConfig::default().with_smoothing(SmoothingMode::Lowpass);
//! let result = ThermoclineDetector::new(config).detect(&profile).unwrap();
//!
//! println!("{}", result.report());
//! assert!(result.boundary.top > -12.0 && result.boundary.bottom < -12.0);
//! ```

mod boundary;
mod detector;
mod gradient;

pub use boundary::{
    Run, RunEdges, ThermoclineBoundary, ThresholdFlags, detect_boundary, find_runs, pair_runs,
    scan_runs, select_longest, threshold_flags,
};
pub use detector::{DetectionConfig, DetectionResult, ThermoclineDetector};
pub use gradient::{GradientError, forward_difference, mean};

use thiserror::Error;

use crate::filter::FilterError;
use crate::profile::ProfileError;

/// Error type for thermocline detection.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum DetectionError {
    /// Invalid profile
    #[error("invalid profile: {0}")]
    Profile(#[from] ProfileError),

    /// Gradient could not be computed
    #[error("gradient failed: {0}")]
    Gradient(#[from] GradientError),

    /// Smoothing failed
    #[error("smoothing failed: {0}")]
    Filter(#[from] FilterError),

    /// Nothing to threshold
    #[error("flag sequence is empty")]
    EmptyFlags,

    /// Depth column does not line up with the flags
    #[error("{depth} depths cannot be aligned with {flags} flags")]
    ShapeMismatch { depth: usize, flags: usize },

    /// Run starts and ends cannot be paired
    #[error("{starts} run starts cannot be paired with {ends} run ends")]
    UnpairedRuns { starts: usize, ends: usize },

    /// No gradient sample reaches the mean magnitude
    #[error("no thermocline detected")]
    NoThermocline,
}
