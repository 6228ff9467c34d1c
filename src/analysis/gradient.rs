//! Forward-difference gradient.

use thiserror::Error;

/// Error type for gradient computation.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GradientError {
    /// x and y differ in length
    #[error("x has {x} samples but y has {y}")]
    LengthMismatch { x: usize, y: usize },

    /// Fewer than two samples
    #[error("gradient needs at least 2 samples, got {0}")]
    TooShort(usize),

    /// x[index] == x[index + 1]
    #[error("duplicate abscissa between samples {index} and {}", .index + 1)]
    DuplicateAbscissa { index: usize },
}

/// Forward difference of `y` with respect to `x`.
///
/// Returns `g` with `g[i] = (y[i+1] - y[i]) / (x[i+1] - x[i])` and
/// `g.len() == x.len() - 1`.
///
/// # Errors
/// - `LengthMismatch` if `x.len() != y.len()`
/// - `TooShort` if fewer than two samples are given
/// - `DuplicateAbscissa` if two adjacent `x` values are equal
///
/// # Example
///
/// ```
/// use thermocline_rs::analysis::forward_difference;
///
/// let g = forward_difference(&[0.0, 1.0, 2.0, 3.0, 4.0], &[20.0, 19.0, 15.0, 10.0, 9.0]).unwrap();
/// assert_eq!(g, vec![-1.0, -4.0, -5.0, -1.0]);
/// ```
pub fn forward_difference(x: &[f64], y: &[f64]) -> Result<Vec<f64>, GradientError> {
    if x.len() != y.len() {
        return Err(GradientError::LengthMismatch {
            x: x.len(),
            y: y.len(),
        });
    }
    if x.len() < 2 {
        return Err(GradientError::TooShort(x.len()));
    }

    x.windows(2)
        .zip(y.windows(2))
        .enumerate()
        .map(|(index, (xs, ys))| {
            let dx = xs[1] - xs[0];
            if dx == 0.0 {
                return Err(GradientError::DuplicateAbscissa { index });
            }
            Ok((ys[1] - ys[0]) / dx)
        })
        .collect()
}

/// Arithmetic mean, or `None` for an empty slice.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forward_difference_formula() {
        let x = [0.0, 0.5, 2.0, 2.25];
        let y = [1.0, 2.0, -1.0, 0.0];
        let g = forward_difference(&x, &y).unwrap();

        assert_eq!(g.len(), x.len() - 1);
        for i in 0..g.len() {
            let expected = (y[i + 1] - y[i]) / (x[i + 1] - x[i]);
            assert_eq!(g[i], expected);
        }
    }

    #[test]
    fn test_decreasing_axis() {
        let g = forward_difference(&[0.0, -1.0, -3.0], &[20.0, 18.0, 10.0]).unwrap();
        assert_eq!(g, vec![2.0, 4.0]);
    }

    #[test]
    fn test_two_samples() {
        let g = forward_difference(&[1.0, 3.0], &[5.0, 6.0]).unwrap();
        assert_eq!(g, vec![0.5]);
    }

    #[test]
    fn test_errors() {
        assert_eq!(
            forward_difference(&[0.0, 1.0], &[1.0]).unwrap_err(),
            GradientError::LengthMismatch { x: 2, y: 1 }
        );
        assert_eq!(
            forward_difference(&[0.0], &[1.0]).unwrap_err(),
            GradientError::TooShort(1)
        );
        assert_eq!(
            forward_difference(&[0.0, 1.0, 1.0], &[1.0, 2.0, 3.0]).unwrap_err(),
            GradientError::DuplicateAbscissa { index: 1 }
        );
    }

    #[test]
    fn test_mean() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[-1.0, -4.0, -5.0, -1.0]), Some(-2.75));
    }
}
