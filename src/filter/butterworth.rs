//! Butterworth lowpass design as a cascade of second-order sections.
//!
//! Frequencies are expressed as a fraction of the Nyquist frequency, so a
//! cutoff ratio of 0.05 means 5% of Nyquist regardless of the sample spacing.
//! The analog prototype is pre-warped and mapped with the bilinear transform
//! at a normalised sample rate of 2 (Nyquist = 1).
//!
//! Each section is scaled to unity DC gain, which keeps the steady-state
//! response of the cascade exactly equal to its input level.

use std::f64::consts::PI;

use num_complex::Complex64;

use super::FilterError;

/// Normalised sample rate: Nyquist = 1.
const SAMPLE_RATE: f64 = 2.0;

/// A single second-order section.
///
/// Transfer function: H(z) = (b0 + b1*z^-1 + b2*z^-2) / (1 + a1*z^-1 + a2*z^-2)
///
/// Evaluated in Direct Form II Transposed.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Biquad {
    /// Numerator coefficients [b0, b1, b2]
    b: [f64; 3],
    /// Denominator coefficients [a1, a2] (a0 is normalised to 1)
    a: [f64; 2],
}

impl Biquad {
    /// Create a section from its coefficients.
    pub fn new(b: [f64; 3], a: [f64; 2]) -> Self {
        Self { b, a }
    }

    /// Numerator coefficients.
    pub fn numerator(&self) -> &[f64; 3] {
        &self.b
    }

    /// Denominator coefficients (without the leading 1).
    pub fn denominator(&self) -> &[f64; 2] {
        &self.a
    }

    /// Gain at z = 1.
    pub fn dc_gain(&self) -> f64 {
        (self.b[0] + self.b[1] + self.b[2]) / (1.0 + self.a[0] + self.a[1])
    }

    /// Stability triangle: |a2| < 1 and |a1| < 1 + a2.
    pub fn is_stable(&self) -> bool {
        self.a[1].abs() < 1.0 && self.a[0].abs() < 1.0 + self.a[1]
    }

    /// Complex response at `z`.
    pub fn response(&self, z: Complex64) -> Complex64 {
        let z1 = z.inv();
        let z2 = z1 * z1;
        (self.b[0] + self.b[1] * z1 + self.b[2] * z2) / (1.0 + self.a[0] * z1 + self.a[1] * z2)
    }

    /// Filter state that a constant input `level` settles into.
    ///
    /// With this state the first output equals `level * dc_gain()`, so a
    /// filter pass starts without a start-up transient.
    pub fn steady_state(&self, level: f64) -> [f64; 2] {
        let out = level * self.dc_gain();
        let s1 = self.b[2] * level - self.a[1] * out;
        let s0 = self.b[1] * level - self.a[0] * out + s1;
        [s0, s1]
    }

    /// Run the section over `signal` in place, starting from `state`.
    pub fn process_in_place(&self, signal: &mut [f64], mut state: [f64; 2]) {
        for x in signal.iter_mut() {
            let input = *x;
            let output = self.b[0] * input + state[0];
            state[0] = self.b[1] * input - self.a[0] * output + state[1];
            state[1] = self.b[2] * input - self.a[1] * output;
            *x = output;
        }
    }
}

/// Butterworth lowpass filter.
///
/// # Example
///
/// ```
/// use thermocline_rs::filter::ButterworthLowpass;
///
/// let lpf = ButterworthLowpass::new(8, 0.05).unwrap();
/// assert_eq!(lpf.sections().len(), 4);
/// assert!(lpf.is_stable());
/// ```
#[derive(Clone, Debug)]
pub struct ButterworthLowpass {
    order: usize,
    cutoff: f64,
    sections: Vec<Biquad>,
}

impl ButterworthLowpass {
    /// Design a lowpass of the given order with cutoff as a fraction of Nyquist.
    ///
    /// # Errors
    /// - `InvalidOrder` if `order` is zero
    /// - `InvalidCutoff` unless `0 < cutoff < 1`
    pub fn new(order: usize, cutoff: f64) -> Result<Self, FilterError> {
        if order == 0 {
            return Err(FilterError::InvalidOrder(order));
        }
        if !(cutoff > 0.0 && cutoff < 1.0) {
            return Err(FilterError::InvalidCutoff(cutoff));
        }

        let wc = prewarp(cutoff);
        let k = 2.0 * SAMPLE_RATE;

        let mut sections: Vec<Biquad> = upper_half_poles(order)
            .into_iter()
            .map(|p| bilinear_pole_pair(p * wc, k))
            .collect();
        if order % 2 == 1 {
            sections.push(bilinear_real_pole(-wc, k));
        }

        Ok(Self {
            order,
            cutoff,
            sections,
        })
    }

    /// Filter order.
    pub fn order(&self) -> usize {
        self.order
    }

    /// Cutoff as a fraction of Nyquist.
    pub fn cutoff(&self) -> f64 {
        self.cutoff
    }

    /// The cascade of sections.
    pub fn sections(&self) -> &[Biquad] {
        &self.sections
    }

    /// All sections stable.
    pub fn is_stable(&self) -> bool {
        self.sections.iter().all(Biquad::is_stable)
    }

    /// Complex response at a frequency given as a fraction of Nyquist.
    pub fn frequency_response(&self, ratio: f64) -> Complex64 {
        let omega = PI * ratio;
        let z = Complex64::new(omega.cos(), omega.sin());
        self.sections
            .iter()
            .fold(Complex64::new(1.0, 0.0), |h, s| h * s.response(z))
    }

    /// Number of samples used to extend each end of the signal in
    /// [`filtfilt`](super::filtfilt): three times the transfer-function length.
    pub fn pad_len(&self) -> usize {
        3 * (self.order + 1)
    }

    /// Causal pass with zero initial state.
    pub fn filter(&self, signal: &[f64]) -> Vec<f64> {
        let mut out = signal.to_vec();
        for section in &self.sections {
            section.process_in_place(&mut out, [0.0; 2]);
        }
        out
    }

    /// Causal pass starting from the steady state of the first sample.
    pub(crate) fn filter_settled(&self, signal: &[f64]) -> Vec<f64> {
        let mut out = signal.to_vec();
        let Some(&first) = signal.first() else {
            return out;
        };

        let mut level = first;
        for section in &self.sections {
            section.process_in_place(&mut out, section.steady_state(level));
            level *= section.dc_gain();
        }
        out
    }
}

/// Pre-warp a Nyquist-relative cutoff for the bilinear transform.
fn prewarp(cutoff: f64) -> f64 {
    2.0 * SAMPLE_RATE * (PI * cutoff / SAMPLE_RATE).tan()
}

/// Analog prototype poles in the upper-left quadrant, one per conjugate pair.
fn upper_half_poles(order: usize) -> Vec<Complex64> {
    (0..order / 2)
        .map(|k| {
            let theta = PI * (2 * k + order + 1) as f64 / (2 * order) as f64;
            Complex64::new(theta.cos(), theta.sin())
        })
        .collect()
}

/// Bilinear transform of a conjugate pole pair with both zeros at z = -1.
fn bilinear_pole_pair(p: Complex64, k: f64) -> Biquad {
    let p_mag_sq = p.norm_sqr();
    let k2 = k * k;
    let d = k2 - 2.0 * k * p.re + p_mag_sq;

    let a1 = 2.0 * (p_mag_sq - k2) / d;
    let a2 = (k2 + 2.0 * k * p.re + p_mag_sq) / d;

    let g = (1.0 + a1 + a2) / 4.0;
    Biquad::new([g, 2.0 * g, g], [a1, a2])
}

/// Bilinear transform of a single real pole with its zero at z = -1.
fn bilinear_real_pole(p: f64, k: f64) -> Biquad {
    let a1 = -(k + p) / (k - p);
    let g = (1.0 + a1) / 2.0;
    Biquad::new([g, g, 0.0], [a1, 0.0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_section_count() {
        assert_eq!(ButterworthLowpass::new(8, 0.05).unwrap().sections().len(), 4);
        assert_eq!(ButterworthLowpass::new(3, 0.2).unwrap().sections().len(), 2);
        assert_eq!(ButterworthLowpass::new(1, 0.2).unwrap().sections().len(), 1);
    }

    #[test]
    fn test_sections_stable_with_unity_dc_gain() {
        for order in 1..=10 {
            let lpf = ButterworthLowpass::new(order, 0.05).unwrap();
            assert!(lpf.is_stable(), "order {} unstable", order);
            for s in lpf.sections() {
                assert!((s.dc_gain() - 1.0).abs() < 1e-12);
            }
        }
    }

    #[test]
    fn test_half_power_at_cutoff() {
        let lpf = ButterworthLowpass::new(8, 0.05).unwrap();
        let mag = lpf.frequency_response(0.05).norm();
        assert!(
            (mag - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-6,
            "|H(cutoff)| = {:.8}",
            mag
        );
    }

    #[test]
    fn test_zero_at_nyquist() {
        let lpf = ButterworthLowpass::new(8, 0.05).unwrap();
        assert!(lpf.frequency_response(1.0).norm() < 1e-10);
        assert!((lpf.frequency_response(0.0).norm() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_parameters() {
        assert_eq!(
            ButterworthLowpass::new(0, 0.05).unwrap_err(),
            FilterError::InvalidOrder(0)
        );
        assert_eq!(
            ButterworthLowpass::new(8, 1.0).unwrap_err(),
            FilterError::InvalidCutoff(1.0)
        );
        assert!(ButterworthLowpass::new(8, 0.0).is_err());
        assert!(ButterworthLowpass::new(8, f64::NAN).is_err());
    }

    #[test]
    fn test_steady_state_has_no_transient() {
        let lpf = ButterworthLowpass::new(8, 0.05).unwrap();
        let out = lpf.filter_settled(&[3.5; 64]);
        for y in out {
            assert!((y - 3.5).abs() < 1e-10);
        }
    }

    #[test]
    fn test_zero_state_step_response_settles() {
        let lpf = ButterworthLowpass::new(4, 0.1).unwrap();
        let out = lpf.filter(&[1.0; 400]);
        assert!(out[0].abs() < 0.01);
        assert!((out[399] - 1.0).abs() < 1e-6);
    }
}
