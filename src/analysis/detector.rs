//! Thermocline detection pipeline.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::DetectionError;
use super::boundary::{Run, ThermoclineBoundary, find_runs, select_longest, threshold_flags};
use super::gradient::forward_difference;
use crate::filter::{SmoothingMode, smooth};
use crate::profile::{Profile, ProfilePoint, validate_depths};

/// Source id used in reports for unnamed profiles.
const UNNAMED_SOURCE: &str = "profile";

/// Detection settings.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DetectionConfig {
    /// Smoothing applied to temperature before differentiation
    pub smoothing: SmoothingMode,
}

impl DetectionConfig {
    /// Set the smoothing mode.
    pub fn with_smoothing(mut self, smoothing: SmoothingMode) -> Self {
        self.smoothing = smoothing;
        self
    }
}

/// Everything detection computed for one profile.
///
/// Carries the arrays a plotting tool needs: depth and temperature, the
/// gradient with its flags, and the selected boundary.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectionResult {
    /// Source identifier of the profile
    pub source: Option<String>,
    /// Smoothing that was applied
    pub smoothing: SmoothingMode,
    /// Depth column
    pub depth: Vec<f64>,
    /// Temperature as measured
    pub raw_temperature: Vec<f64>,
    /// Temperature the gradient was computed from
    pub temperature: Vec<f64>,
    /// Forward-difference gradient, one shorter than `depth`
    pub gradient: Vec<f64>,
    /// Signed mean of the gradient
    pub mean_gradient: f64,
    /// Gradient samples with `|g| >= |mean_gradient|`
    pub flags: Vec<bool>,
    /// All flagged runs in scan order
    pub runs: Vec<Run>,
    /// Selected thermocline
    pub boundary: ThermoclineBoundary,
}

impl DetectionResult {
    /// Source id for messages.
    pub fn source_id(&self) -> &str {
        self.source.as_deref().unwrap_or(UNNAMED_SOURCE)
    }

    /// Threshold magnitude.
    pub fn threshold(&self) -> f64 {
        self.mean_gradient.abs()
    }

    /// One-line human-readable report.
    pub fn report(&self) -> String {
        format!(
            "detected thermocline location in {}: {}~{} m",
            self.source_id(),
            self.boundary.top,
            self.boundary.bottom
        )
    }

    /// True if `depth` lies strictly inside the thermocline.
    pub fn contains_depth(&self, depth: f64) -> bool {
        self.boundary.contains(depth)
    }

    /// Samples strictly inside the thermocline.
    pub fn thermocline_points(&self) -> Vec<ProfilePoint> {
        self.points_where(|d| self.contains_depth(d))
    }

    /// Samples outside the thermocline, boundaries included.
    pub fn background_points(&self) -> Vec<ProfilePoint> {
        self.points_where(|d| !self.contains_depth(d))
    }

    /// (depth, gradient) pairs whose flag is set.
    pub fn flagged_gradient(&self) -> Vec<(f64, f64)> {
        self.gradient_where(true)
    }

    /// (depth, gradient) pairs whose flag is clear.
    pub fn unflagged_gradient(&self) -> Vec<(f64, f64)> {
        self.gradient_where(false)
    }

    fn points_where(&self, keep: impl Fn(f64) -> bool) -> Vec<ProfilePoint> {
        self.depth
            .iter()
            .zip(self.temperature.iter())
            .filter(|&(&d, _)| keep(d))
            .map(|(&depth, &temperature)| ProfilePoint { depth, temperature })
            .collect()
    }

    fn gradient_where(&self, flagged: bool) -> Vec<(f64, f64)> {
        self.depth
            .iter()
            .zip(self.gradient.iter())
            .zip(self.flags.iter())
            .filter(|&(_, &f)| f == flagged)
            .map(|((&d, &g), _)| (d, g))
            .collect()
    }
}

/// Runs smoothing, differentiation, thresholding and run selection.
///
/// # Example
///
/// ```
/// use thermocline_rs::analysis::{DetectionConfig, ThermoclineDetector};
/// use thermocline_rs::profile::Profile;
///
/// let profile = Profile::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[20.0, 19.0, 15.0, 10.0, 9.0])
///     .unwrap()
///     .with_name("cast");
/// let result = ThermoclineDetector::new(DetectionConfig::default())
///     .detect(&profile)
///     .unwrap();
///
/// assert_eq!((result.boundary.top, result.boundary.bottom), (1.0, 2.0));
/// assert_eq!(result.report(), "detected thermocline location in cast: 1~2 m");
/// ```
#[derive(Clone, Debug, Default)]
pub struct ThermoclineDetector {
    config: DetectionConfig,
}

impl ThermoclineDetector {
    /// Create a detector.
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    /// Active configuration.
    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Detect the thermocline in `profile`.
    ///
    /// # Errors
    /// - `Profile` if the depth column is not strictly monotonic
    /// - `Filter` if smoothing is requested on a profile too short for it
    /// - `Gradient` on degenerate depth steps
    /// - `NoThermocline` if no gradient sample reaches the threshold
    pub fn detect(&self, profile: &Profile) -> Result<DetectionResult, DetectionError> {
        let source = profile.name().map(str::to_owned);
        let depth = profile.depths();
        let raw_temperature = profile.temperatures();
        validate_depths(&depth)?;

        let temperature = smooth(self.config.smoothing, &raw_temperature)?;
        let gradient = forward_difference(&depth, &temperature)?;
        let threshold = threshold_flags(&gradient)?;
        debug!(
            source = source.as_deref().unwrap_or(UNNAMED_SOURCE),
            mean = threshold.mean,
            flagged = threshold.count(),
            samples = gradient.len(),
            "gradient thresholded"
        );

        let runs = find_runs(&depth, &threshold.flags)?;
        let Some(selected) = select_longest(&runs) else {
            warn!(
                source = source.as_deref().unwrap_or(UNNAMED_SOURCE),
                "no gradient sample reaches the mean magnitude"
            );
            return Err(DetectionError::NoThermocline);
        };
        debug!(runs = runs.len(), start = selected.start, end = selected.end, "longest run");

        let boundary = ThermoclineBoundary::from(selected);
        info!(
            source = source.as_deref().unwrap_or(UNNAMED_SOURCE),
            smoothing = %self.config.smoothing,
            top = boundary.top,
            bottom = boundary.bottom,
            "thermocline detected"
        );

        Ok(DetectionResult {
            source,
            smoothing: self.config.smoothing,
            depth,
            raw_temperature,
            temperature,
            gradient,
            mean_gradient: threshold.mean,
            flags: threshold.flags,
            runs,
            boundary,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::FilterError;
    use crate::profile::ProfileError;

    fn example_profile() -> Profile {
        Profile::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[20.0, 19.0, 15.0, 10.0, 9.0]).unwrap()
    }

    #[test]
    fn test_end_to_end_example() {
        let result = ThermoclineDetector::default().detect(&example_profile()).unwrap();

        assert_eq!(result.gradient, vec![-1.0, -4.0, -5.0, -1.0]);
        assert!((result.mean_gradient + 2.75).abs() < 1e-12);
        assert!((result.threshold() - 2.75).abs() < 1e-12);
        assert_eq!(result.flags, vec![false, true, true, false]);
        assert_eq!(result.boundary, ThermoclineBoundary { top: 1.0, bottom: 2.0 });
        assert_eq!(result.temperature, result.raw_temperature);
        assert_eq!(result.smoothing, SmoothingMode::None);
    }

    #[test]
    fn test_report_line() {
        let result = ThermoclineDetector::default()
            .detect(&example_profile().with_name("data1.xlsx"))
            .unwrap();
        assert_eq!(result.report(), "detected thermocline location in data1.xlsx: 1~2 m");

        let unnamed = ThermoclineDetector::default().detect(&example_profile()).unwrap();
        assert_eq!(unnamed.source_id(), "profile");
    }

    #[test]
    fn test_visualizer_partitions() {
        let depth: Vec<f64> = (0..6).map(|i| i as f64).collect();
        let temp = [20.0, 19.9, 15.0, 10.0, 5.0, 4.9];
        let profile = Profile::new(&depth, &temp).unwrap();
        let result = ThermoclineDetector::default().detect(&profile).unwrap();

        assert_eq!(result.boundary, ThermoclineBoundary { top: 1.0, bottom: 3.0 });

        let inside: Vec<f64> = result.thermocline_points().iter().map(|p| p.depth).collect();
        assert_eq!(inside, vec![2.0]);
        assert_eq!(result.background_points().len(), 5);

        let flagged: Vec<f64> = result.flagged_gradient().iter().map(|&(d, _)| d).collect();
        assert_eq!(flagged, vec![1.0, 2.0, 3.0]);
        assert_eq!(result.unflagged_gradient().len(), 2);
    }

    #[test]
    fn test_uniform_gradient_exact_mean() {
        // -1 °C/m: the summed mean is exactly -1, so every sample meets it
        let profile = Profile::new(&[0.0, 1.0, 2.0, 3.0], &[10.0, 9.0, 8.0, 7.0]).unwrap();
        let result = ThermoclineDetector::default().detect(&profile).unwrap();
        assert_eq!(result.boundary, ThermoclineBoundary { top: 0.0, bottom: 3.0 });
    }

    #[test]
    fn test_uniform_gradient_rounded_mean() {
        // 0.1 °C/m: each step is exactly 0.1 but the mean rounds up to
        // 0.10000000000000002, so no sample reaches it
        let profile = Profile::new(&[0.0, 10.0, 20.0, 30.0], &[0.0, 1.0, 2.0, 3.0]).unwrap();
        let err = ThermoclineDetector::default().detect(&profile).unwrap_err();
        assert_eq!(err, DetectionError::NoThermocline);
    }

    #[test]
    fn test_depth_errors_are_profile_errors() {
        let err: DetectionError = validate_depths(&[0.0, 2.0, 1.0, 3.0]).unwrap_err().into();
        assert_eq!(err, DetectionError::Profile(ProfileError::NonMonotonic { index: 2 }));
        assert_eq!(err.to_string(), "invalid profile: non-monotonic depth at sample 2");
    }

    #[test]
    fn test_smoothing_needs_long_profile() {
        let detector =
            ThermoclineDetector::new(DetectionConfig::default().with_smoothing(SmoothingMode::Lowpass));
        let err = detector.detect(&example_profile()).unwrap_err();
        assert_eq!(
            err,
            DetectionError::Filter(FilterError::SignalTooShort { len: 5, pad_len: 27 })
        );
    }

    #[test]
    fn test_smoothed_detection() {
        let depth: Vec<f64> = (0..200).map(|i| -0.2 * i as f64).collect();
        let temp: Vec<f64> = depth
            .iter()
            .map(|&z| 12.0 + 8.0 * ((z + 20.0) / 3.0).tanh())
            .collect();
        let profile = Profile::new(&depth, &temp).unwrap();

        let detector =
            ThermoclineDetector::new(DetectionConfig::default().with_smoothing(SmoothingMode::Lowpass));
        let result = detector.detect(&profile).unwrap();

        assert_eq!(result.smoothing, SmoothingMode::Lowpass);
        assert_ne!(result.temperature, result.raw_temperature);
        assert!(result.boundary.top > -20.0 && result.boundary.bottom < -20.0);
    }
}
