//! Export of detection results for plotting.
//!
//! # File Format
//!
//! ```text
//! # Thermocline detection
//! # source: data1.xlsx
//! # smoothing: lowpass
//! # top: -8.5
//! # bottom: -14
//! # mean_gradient: 0.412
//! # columns: depth(m) temperature(degC) gradient(degC/m) flag
//! 0 21.3 0.2 0
//! ...
//! -40 8.1 nan -
//! ```
//!
//! The last sample has no forward difference, so its gradient is `nan` and
//! its flag `-`.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::analysis::DetectionResult;

/// Write a detection result as a column file.
pub fn write_detection_file(path: &Path, result: &DetectionResult) -> std::io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    write_detection(&mut writer, result)?;
    writer.flush()
}

/// Write a detection result to any writer.
pub fn write_detection<W: Write>(out: &mut W, result: &DetectionResult) -> std::io::Result<()> {
    writeln!(out, "# Thermocline detection")?;
    writeln!(out, "# source: {}", result.source_id())?;
    writeln!(out, "# smoothing: {}", result.smoothing)?;
    writeln!(out, "# top: {}", result.boundary.top)?;
    writeln!(out, "# bottom: {}", result.boundary.bottom)?;
    writeln!(out, "# mean_gradient: {}", result.mean_gradient)?;
    writeln!(out, "# columns: depth(m) temperature(degC) gradient(degC/m) flag")?;

    for (i, (&depth, &temperature)) in result.depth.iter().zip(result.temperature.iter()).enumerate() {
        match (result.gradient.get(i), result.flags.get(i)) {
            (Some(g), Some(&flag)) => {
                writeln!(out, "{} {} {} {}", depth, temperature, g, u8::from(flag))?
            }
            _ => writeln!(out, "{} {} nan -", depth, temperature)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ThermoclineDetector;
    use crate::profile::Profile;
    use tempfile::NamedTempFile;

    fn result() -> DetectionResult {
        let profile = Profile::new(&[0.0, 1.0, 2.0, 3.0, 4.0], &[20.0, 19.0, 15.0, 10.0, 9.0])
            .unwrap()
            .with_name("cast");
        ThermoclineDetector::default().detect(&profile).unwrap()
    }

    #[test]
    fn test_write_columns() {
        let mut buf = Vec::new();
        write_detection(&mut buf, &result()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[1], "# source: cast");
        assert_eq!(lines[2], "# smoothing: none");
        assert_eq!(lines[3], "# top: 1");
        assert_eq!(lines[4], "# bottom: 2");
        assert_eq!(lines[5], "# mean_gradient: -2.75");
        assert_eq!(&lines[7..], &["0 20 -1 0", "1 19 -4 1", "2 15 -5 1", "3 10 -1 0", "4 9 nan -"]);
    }

    #[test]
    fn test_write_file() {
        let file = NamedTempFile::new().unwrap();
        write_detection_file(file.path(), &result()).unwrap();

        let text = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(text.lines().count(), 12);
        assert!(text.ends_with("4 9 nan -\n"));
    }
}
