//! Threshold flags, run scanning and thermocline boundary selection.
//!
//! Flag `i` belongs to the gradient interval that starts at `depth[i]`, so
//! a run of flags `i..=j` is reported as the depth pair `(depth[i], depth[j])`.
//! A run that is still open when the scan reaches the last flag is closed
//! with the last depth of the profile, see [`pair_runs`].

use serde::{Deserialize, Serialize};

use super::DetectionError;
use super::gradient::mean;

/// Gradient flags against the mean gradient magnitude.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThresholdFlags {
    /// Signed mean of the gradient
    pub mean: f64,
    /// `|g[i]| >= |mean|`
    pub flags: Vec<bool>,
}

impl ThresholdFlags {
    /// Threshold magnitude, `|mean|`.
    pub fn threshold(&self) -> f64 {
        self.mean.abs()
    }

    /// Number of flagged samples.
    pub fn count(&self) -> usize {
        self.flags.iter().filter(|&&f| f).count()
    }
}

/// Flag every gradient sample whose magnitude reaches the mean magnitude.
///
/// # Errors
/// `EmptyFlags` for an empty gradient.
pub fn threshold_flags(gradient: &[f64]) -> Result<ThresholdFlags, DetectionError> {
    let mean = mean(gradient).ok_or(DetectionError::EmptyFlags)?;
    let threshold = mean.abs();
    let flags = gradient.iter().map(|g| g.abs() >= threshold).collect();
    Ok(ThresholdFlags { mean, flags })
}

/// A contiguous run of flagged samples, as depths.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Run {
    /// Depth where the run begins in scan order
    pub start: f64,
    /// Depth where the run ends in scan order
    pub end: f64,
}

impl Run {
    /// Extent of the run in depth units, `|start - end|`.
    pub fn length(&self) -> f64 {
        (self.start - self.end).abs()
    }
}

/// Detected thermocline: the longest run.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ThermoclineBoundary {
    /// Start depth of the selected run
    pub top: f64,
    /// End depth of the selected run
    pub bottom: f64,
}

impl ThermoclineBoundary {
    /// Thickness in depth units.
    pub fn thickness(&self) -> f64 {
        (self.top - self.bottom).abs()
    }

    /// True if `depth` lies strictly between top and bottom.
    pub fn contains(&self, depth: f64) -> bool {
        let (lo, hi) = if self.top < self.bottom {
            (self.top, self.bottom)
        } else {
            (self.bottom, self.top)
        };
        lo < depth && depth < hi
    }
}

impl From<Run> for ThermoclineBoundary {
    fn from(run: Run) -> Self {
        Self {
            top: run.start,
            bottom: run.end,
        }
    }
}

/// Start and end depths recorded by [`scan_runs`], before pairing.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct RunEdges {
    pub starts: Vec<f64>,
    pub ends: Vec<f64>,
}

/// Record run starts and ends.
///
/// A start is recorded at `depth[i]` when `flags[i]` is set and either
/// `i == 0` or `flags[i - 1]` is clear. An end is recorded when `flags[i]` is
/// set and `flags[i + 1]` is clear, so a run reaching the last flag has no
/// end yet.
///
/// `depth` must hold at least `flags.len()` values.
pub fn scan_runs(depth: &[f64], flags: &[bool]) -> RunEdges {
    let mut edges = RunEdges::default();
    let n = flags.len();

    for i in 0..n {
        if !flags[i] {
            continue;
        }
        if i == 0 || !flags[i - 1] {
            edges.starts.push(depth[i]);
        }
        if i + 1 < n && !flags[i + 1] {
            edges.ends.push(depth[i]);
        }
    }
    edges
}

/// Pair starts with ends, padding an unterminated run at either boundary.
///
/// - One more end than starts: a run was already open at the first sample,
///   `first_depth` becomes its start.
/// - One more start than ends: a run is still open at the last sample,
///   `last_depth` becomes its end.
///
/// # Errors
/// `UnpairedRuns` if the counts differ by more than one.
pub fn pair_runs(
    edges: RunEdges,
    first_depth: f64,
    last_depth: f64,
) -> Result<Vec<Run>, DetectionError> {
    let RunEdges {
        mut starts,
        mut ends,
    } = edges;

    if starts.len().abs_diff(ends.len()) > 1 {
        return Err(DetectionError::UnpairedRuns {
            starts: starts.len(),
            ends: ends.len(),
        });
    }
    if starts.len() < ends.len() {
        starts.insert(0, first_depth);
    } else if starts.len() > ends.len() {
        ends.push(last_depth);
    }

    Ok(starts
        .into_iter()
        .zip(ends)
        .map(|(start, end)| Run { start, end })
        .collect())
}

/// Longest run by [`Run::length`]; the first one wins a tie.
pub fn select_longest(runs: &[Run]) -> Option<Run> {
    let mut best: Option<Run> = None;
    for run in runs {
        match best {
            Some(b) if run.length() <= b.length() => {}
            _ => best = Some(*run),
        }
    }
    best
}

/// All flagged runs as depth pairs.
///
/// `depth` is either aligned with `flags` (same length) or is the full
/// profile depth column (one longer than `flags`).
///
/// # Errors
/// - `EmptyFlags` if `flags` is empty
/// - `ShapeMismatch` if `depth` has neither length
pub fn find_runs(depth: &[f64], flags: &[bool]) -> Result<Vec<Run>, DetectionError> {
    if flags.is_empty() {
        return Err(DetectionError::EmptyFlags);
    }
    if depth.len() != flags.len() && depth.len() != flags.len() + 1 {
        return Err(DetectionError::ShapeMismatch {
            depth: depth.len(),
            flags: flags.len(),
        });
    }

    let edges = scan_runs(depth, flags);
    pair_runs(edges, depth[0], depth[depth.len() - 1])
}

/// Thermocline boundary from depths and flags.
///
/// # Errors
/// Errors of [`find_runs`], and `NoThermocline` if no flag is set.
///
/// # Example
///
/// ```
/// use thermocline_rs::analysis::detect_boundary;
///
/// let depth = [0.0, 1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0];
/// let flags = [false, false, true, true, true, false, true, false];
/// let boundary = detect_boundary(&depth, &flags).unwrap();
/// assert_eq!((boundary.top, boundary.bottom), (2.0, 4.0));
/// ```
pub fn detect_boundary(depth: &[f64], flags: &[bool]) -> Result<ThermoclineBoundary, DetectionError> {
    let runs = find_runs(depth, flags)?;
    select_longest(&runs)
        .map(ThermoclineBoundary::from)
        .ok_or(DetectionError::NoThermocline)
}
