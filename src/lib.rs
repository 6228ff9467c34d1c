//! # thermocline-rs
//!
//! Thermocline detection for water-column temperature-depth profiles.
//!
//! This crate provides:
//! - Profile data model with depth validation
//! - Zero-phase Butterworth lowpass smoothing
//! - Forward-difference temperature gradient
//! - Threshold flags and longest-run thermocline selection
//! - Spreadsheet and text readers, and an export for plotting
//!
//! # Example
//!
//! ```
//! use thermocline_rs::{DetectionConfig, Profile, SmoothingMode, ThermoclineDetector};
//!
//! let depth: Vec<f64> = (0..60).map(|i| -0.5 * i as f64).collect();
//! let temp: Vec<f64> = depth.iter().map(|&z| 14.0 + 6.0 * ((z + 10.0) / 2.0).tanh()).collect();
//! let profile = Profile::new(&depth, &temp).unwrap().with_name("cast-01");
//!
//! let detector = ThermoclineDetector::new(DetectionConfig::default());
//! let result = detector.detect(&profile).unwrap();
//! println!("{}", result.report());
//!
//! let smoothed = ThermoclineDetector::new(
//!     DetectionConfig::default().with_smoothing(SmoothingMode::Lowpass),
//! )
//! .detect(&profile)
//! .unwrap();
//! assert_eq!(smoothed.gradient.len(), profile.len() - 1);
//! ```

pub mod analysis;
pub mod filter;
pub mod io;
pub mod profile;

pub use analysis::{
    DetectionConfig, DetectionError, DetectionResult, GradientError, Run, ThermoclineBoundary,
    ThermoclineDetector, ThresholdFlags, detect_boundary, forward_difference, threshold_flags,
};
pub use filter::{ButterworthLowpass, FilterError, SmoothingMode, filtfilt, smooth};
pub use io::{ProfileFileError, SheetLayout, load_profile, write_detection_file};
pub use profile::{Profile, ProfileError, ProfilePoint};
