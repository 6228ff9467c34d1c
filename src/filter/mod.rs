//! Temperature smoothing.
//!
//! The only smoother is a zero-phase Butterworth lowpass: the signal is
//! filtered forward, then backward, so the squared magnitude response is
//! applied with no phase shift. Peaks in the temperature series stay at the
//! depths where they were measured, which keeps the gradient computed
//! afterwards aligned with the depth axis.
//!
//! # Example
//!
//! ```
//! use thermocline_rs::filter::{SmoothingMode, smooth};
//!
//! let temp: Vec<f64> = (0..100).map(|i| 20.0 - 0.1 * i as f64).collect();
//! let smoothed = smooth(SmoothingMode::Lowpass, &temp).unwrap();
//! assert_eq!(smoothed.len(), temp.len());
//!
//! let same = smooth(SmoothingMode::None, &temp).unwrap();
//! assert_eq!(same, temp);
//! ```

mod butterworth;

pub use butterworth::{Biquad, ButterworthLowpass};

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Order of the default lowpass.
pub const LOWPASS_ORDER: usize = 8;

/// Cutoff of the default lowpass as a fraction of Nyquist.
pub const LOWPASS_CUTOFF: f64 = 0.05;

/// Error type for filter design and application.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FilterError {
    /// Filter order must be at least one
    #[error("invalid filter order {0}")]
    InvalidOrder(usize),

    /// Cutoff outside (0, 1) of Nyquist
    #[error("cutoff ratio {0} must lie strictly between 0 and 1")]
    InvalidCutoff(f64),

    /// Signal shorter than the edge padding requires
    #[error("signal has {len} samples, zero-phase filtering needs more than {pad_len}")]
    SignalTooShort { len: usize, pad_len: usize },
}

/// How the temperature series is smoothed before differentiation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SmoothingMode {
    /// Pass-through
    #[default]
    None,
    /// Zero-phase 8th-order Butterworth lowpass at 0.05 of Nyquist
    Lowpass,
}

impl SmoothingMode {
    /// Name used on the command line and in exported files.
    pub fn as_str(&self) -> &'static str {
        match self {
            SmoothingMode::None => "none",
            SmoothingMode::Lowpass => "lowpass",
        }
    }
}

impl fmt::Display for SmoothingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised smoothing mode name.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unknown smoothing mode '{0}' (expected 'none' or 'lowpass')")]
pub struct ParseSmoothingModeError(String);

impl FromStr for SmoothingMode {
    type Err = ParseSmoothingModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" => Ok(SmoothingMode::None),
            "lowpass" => Ok(SmoothingMode::Lowpass),
            _ => Err(ParseSmoothingModeError(s.to_string())),
        }
    }
}

/// Apply the smoothing `mode` to a temperature series.
///
/// # Errors
/// `SignalTooShort` for [`SmoothingMode::Lowpass`] when the series has no
/// more samples than the edge padding (27 for the default filter).
pub fn smooth(mode: SmoothingMode, temperature: &[f64]) -> Result<Vec<f64>, FilterError> {
    match mode {
        SmoothingMode::None => Ok(temperature.to_vec()),
        SmoothingMode::Lowpass => {
            let lpf = ButterworthLowpass::new(LOWPASS_ORDER, LOWPASS_CUTOFF)?;
            filtfilt(&lpf, temperature)
        }
    }
}

/// Zero-phase filtering: forward pass, backward pass, edge padding removed.
///
/// Both ends are extended by [`ButterworthLowpass::pad_len`] samples using
/// an odd (point-symmetric) reflection, and each pass starts from the
/// steady state of its first sample.
pub fn filtfilt(filter: &ButterworthLowpass, signal: &[f64]) -> Result<Vec<f64>, FilterError> {
    let pad_len = filter.pad_len();
    if signal.len() <= pad_len {
        return Err(FilterError::SignalTooShort {
            len: signal.len(),
            pad_len,
        });
    }

    let extended = odd_extension(signal, pad_len);

    let mut y = filter.filter_settled(&extended);
    y.reverse();
    let mut y = filter.filter_settled(&y);
    y.reverse();

    Ok(y[pad_len..pad_len + signal.len()].to_vec())
}

/// Extend `signal` by `pad_len` samples at each end, reflecting through the
/// end points: `2*x[0] - x[i]` on the left, `2*x[n-1] - x[n-1-i]` on the right.
///
/// Requires `signal.len() > pad_len`.
pub fn odd_extension(signal: &[f64], pad_len: usize) -> Vec<f64> {
    let n = signal.len();
    let first = signal[0];
    let last = signal[n - 1];

    let mut out = Vec::with_capacity(n + 2 * pad_len);
    out.extend((1..=pad_len).rev().map(|i| 2.0 * first - signal[i]));
    out.extend_from_slice(signal);
    out.extend((1..=pad_len).map(|i| 2.0 * last - signal[n - 1 - i]));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_odd_extension() {
        let ext = odd_extension(&[1.0, 2.0, 3.0, 4.0, 5.0], 2);
        assert_eq!(ext, vec![-1.0, 0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
    }

    #[test]
    fn test_constant_sequence_unchanged() {
        let temp = vec![14.25; 473];
        let out = smooth(SmoothingMode::Lowpass, &temp).unwrap();
        assert_eq!(out.len(), temp.len());
        for y in out {
            assert!((y - 14.25).abs() < 1e-8, "got {}", y);
        }
    }

    #[test]
    fn test_slow_signal_passes_without_shift() {
        let n = 1000;
        let signal: Vec<f64> = (0..n)
            .map(|i| (std::f64::consts::PI * 0.01 * i as f64).sin())
            .collect();
        let out = smooth(SmoothingMode::Lowpass, &signal).unwrap();

        for i in 300..700 {
            assert!(
                (out[i] - signal[i]).abs() < 1e-3,
                "sample {}: {} vs {}",
                i,
                out[i],
                signal[i]
            );
        }
    }

    #[test]
    fn test_alternating_noise_removed() {
        let n = 1000;
        let signal: Vec<f64> = (0..n)
            .map(|i| 10.0 + if i % 2 == 0 { 1.0 } else { -1.0 })
            .collect();
        let out = smooth(SmoothingMode::Lowpass, &signal).unwrap();

        for y in &out[400..600] {
            assert!((y - 10.0).abs() < 1e-3, "got {}", y);
        }
    }

    #[test]
    fn test_signal_too_short() {
        let err = smooth(SmoothingMode::Lowpass, &[1.0; 27]).unwrap_err();
        assert_eq!(err, FilterError::SignalTooShort { len: 27, pad_len: 27 });
        assert!(smooth(SmoothingMode::Lowpass, &[1.0; 28]).is_ok());
    }

    #[test]
    fn test_passthrough_accepts_short_input() {
        assert_eq!(smooth(SmoothingMode::None, &[1.0, 2.0]).unwrap(), vec![1.0, 2.0]);
    }

    #[test]
    fn test_mode_parsing() {
        assert_eq!("none".parse::<SmoothingMode>().unwrap(), SmoothingMode::None);
        assert_eq!("Lowpass".parse::<SmoothingMode>().unwrap(), SmoothingMode::Lowpass);
        assert!("highpass".parse::<SmoothingMode>().is_err());
        assert_eq!(SmoothingMode::Lowpass.to_string(), "lowpass");
        assert_eq!(SmoothingMode::default(), SmoothingMode::None);
    }
}
