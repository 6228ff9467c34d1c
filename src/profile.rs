//! Temperature-depth profiles.
//!
//! A [`Profile`] is an ordered sequence of (depth, temperature) samples from a
//! single cast. Depth may run in either direction (surface-down with positive
//! depths, or `z` coordinates that become more negative downwards), but it
//! must be strictly monotonic so that every forward difference is defined.
//!
//! # Example
//!
//! ```
//! use thermocline_rs::profile::Profile;
//!
//! let depth = vec![0.0, -1.0, -2.0, -3.0];
//! let temp = vec![20.0, 19.5, 15.0, 12.0];
//! let profile = Profile::new(&depth, &temp).unwrap().with_name("cast-01");
//!
//! assert_eq!(profile.len(), 4);
//! assert_eq!(profile.name(), Some("cast-01"));
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Minimum number of samples needed to run thermocline detection.
pub const MIN_PROFILE_LEN: usize = 3;

/// Error type for profile construction and validation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ProfileError {
    /// Depth and temperature columns differ in length
    #[error("depth has {depth} samples but temperature has {temperature}")]
    LengthMismatch { depth: usize, temperature: usize },

    /// Not enough samples
    #[error("profile has {len} samples, at least {min} required")]
    TooShort { len: usize, min: usize },

    /// NaN or infinite value
    #[error("non-finite value at sample {index}")]
    NonFinite { index: usize },

    /// Two adjacent samples at the same depth
    #[error("duplicate depth at sample {index}")]
    DuplicateDepth { index: usize },

    /// Depth changes direction
    #[error("non-monotonic depth at sample {index}")]
    NonMonotonic { index: usize },
}

/// A single profile sample.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ProfilePoint {
    /// Depth coordinate (m)
    pub depth: f64,
    /// Temperature (°C)
    pub temperature: f64,
}

/// Validated temperature-depth profile.
///
/// Only built through [`Profile::new`] or [`Profile::from_points`], so every
/// instance has at least [`MIN_PROFILE_LEN`] finite samples on a strictly
/// monotonic depth axis.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Profile {
    points: Vec<ProfilePoint>,
    name: Option<String>,
}

impl Profile {
    /// Build a profile from parallel depth and temperature columns.
    ///
    /// # Errors
    /// - `LengthMismatch` if the columns differ in length
    /// - `TooShort` if fewer than [`MIN_PROFILE_LEN`] samples are given
    /// - `NonFinite`, `DuplicateDepth`, `NonMonotonic` from [`validate_depths`]
    pub fn new(depth: &[f64], temperature: &[f64]) -> Result<Self, ProfileError> {
        if depth.len() != temperature.len() {
            return Err(ProfileError::LengthMismatch {
                depth: depth.len(),
                temperature: temperature.len(),
            });
        }
        if depth.len() < MIN_PROFILE_LEN {
            return Err(ProfileError::TooShort {
                len: depth.len(),
                min: MIN_PROFILE_LEN,
            });
        }
        if let Some(index) = temperature.iter().position(|t| !t.is_finite()) {
            return Err(ProfileError::NonFinite { index });
        }
        validate_depths(depth)?;

        let points = depth
            .iter()
            .zip(temperature.iter())
            .map(|(&depth, &temperature)| ProfilePoint { depth, temperature })
            .collect();

        Ok(Self { points, name: None })
    }

    /// Build a profile from samples.
    pub fn from_points(points: Vec<ProfilePoint>) -> Result<Self, ProfileError> {
        let depth: Vec<f64> = points.iter().map(|p| p.depth).collect();
        let temperature: Vec<f64> = points.iter().map(|p| p.temperature).collect();
        Self::new(&depth, &temperature)
    }

    /// Attach a source identifier (file name, station id, ...).
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Source identifier, if any.
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Number of samples.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Always false for a validated profile; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Access the samples.
    pub fn points(&self) -> &[ProfilePoint] {
        &self.points
    }

    /// Depths as a vector.
    pub fn depths(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.depth).collect()
    }

    /// Temperatures as a vector.
    pub fn temperatures(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.temperature).collect()
    }

    /// (min, max) temperature.
    pub fn temperature_range(&self) -> (f64, f64) {
        self.points.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
            (lo.min(p.temperature), hi.max(p.temperature))
        })
    }

    /// True if depth values increase with sample index.
    pub fn is_increasing(&self) -> bool {
        self.points
            .windows(2)
            .next()
            .is_some_and(|pair| pair[1].depth > pair[0].depth)
    }
}

/// Check that a depth column is finite and strictly monotonic.
///
/// The direction is taken from the first pair of samples. Reported indices
/// point at the second sample of the offending pair.
pub fn validate_depths(depth: &[f64]) -> Result<(), ProfileError> {
    if let Some(index) = depth.iter().position(|d| !d.is_finite()) {
        return Err(ProfileError::NonFinite { index });
    }

    let mut direction = 0.0;
    for i in 1..depth.len() {
        let step = depth[i] - depth[i - 1];
        if step == 0.0 {
            return Err(ProfileError::DuplicateDepth { index: i });
        }
        if direction == 0.0 {
            direction = step.signum();
        } else if step.signum() != direction {
            return Err(ProfileError::NonMonotonic { index: i });
        }
    }
    Ok(())
}
