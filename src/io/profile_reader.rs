//! Reader for plain-text and CSV profile files.
//!
//! # File Format
//!
//! ```text
//! # name: station-07
//! # columns: depth(m) temperature(degC)
//! depth,temperature
//! 0.0,21.3
//! -0.5,21.2
//! -1.0,20.8
//! ```
//!
//! Values may be separated by commas, semicolons, tabs or spaces. A single
//! non-numeric header line is skipped.

use std::fs;
use std::path::Path;

use tracing::debug;

use super::ProfileFileError;
use crate::profile::Profile;

/// Read a profile from a text or CSV file.
///
/// The profile name is taken from a `# name:` comment, or the file name.
pub fn read_profile_file(path: &Path) -> Result<Profile, ProfileFileError> {
    let content = fs::read_to_string(path)?;
    let profile = parse_profile(&content)?;

    if profile.name().is_some() {
        return Ok(profile);
    }
    Ok(match path.file_name() {
        Some(name) => profile.with_name(name.to_string_lossy()),
        None => profile,
    })
}

/// Parse profile text.
pub fn parse_profile(content: &str) -> Result<Profile, ProfileFileError> {
    let mut name: Option<String> = None;
    let mut depth = Vec::new();
    let mut temperature = Vec::new();
    let mut header_seen = false;

    for (line_num, line) in content.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with('#') {
            let comment = line.trim_start_matches('#').trim();
            if let Some(value) = comment.strip_prefix("name:") {
                name = Some(value.trim().to_string());
            }
            continue;
        }

        let fields: Vec<&str> = line
            .split(|c: char| c == ',' || c == ';' || c.is_whitespace())
            .filter(|s| !s.is_empty())
            .collect();
        if fields.len() < 2 {
            return Err(ProfileFileError::Parse {
                line: line_num + 1,
                message: "expected: depth temperature".into(),
            });
        }

        match (fields[0].parse::<f64>(), fields[1].parse::<f64>()) {
            (Ok(d), Ok(t)) => {
                depth.push(d);
                temperature.push(t);
            }
            _ if !header_seen && depth.is_empty() => {
                header_seen = true;
            }
            _ => {
                return Err(ProfileFileError::Parse {
                    line: line_num + 1,
                    message: format!("invalid number in '{}'", line),
                });
            }
        }
    }

    if depth.is_empty() {
        return Err(ProfileFileError::EmptyProfile);
    }
    debug!(samples = depth.len(), "parsed text profile");

    let profile = Profile::new(&depth, &temperature)?;
    Ok(match name {
        Some(name) => profile.with_name(name),
        None => profile,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_whitespace_format() {
        let text = "# name: cast-3\n# columns: depth temp\n0.0 20.0\n1.0 19.0\n2.0 15.0\n";
        let profile = parse_profile(text).unwrap();

        assert_eq!(profile.name(), Some("cast-3"));
        assert_eq!(profile.depths(), vec![0.0, 1.0, 2.0]);
        assert_eq!(profile.temperatures(), vec![20.0, 19.0, 15.0]);
    }

    #[test]
    fn test_parse_csv_with_header() {
        let text = "depth,temperature\n0,20.5\n-1,20.1\n-2,18.0\n-3,12.2\n";
        let profile = parse_profile(text).unwrap();
        assert_eq!(profile.len(), 4);
        assert!((profile.temperatures()[3] - 12.2).abs() < 1e-12);
    }

    #[test]
    fn test_parse_extra_columns_ignored() {
        let text = "0.0\t20.0\t35.1\n1.0\t19.0\t35.2\n2.0\t15.0\t35.3\n";
        let profile = parse_profile(text).unwrap();
        assert_eq!(profile.temperatures(), vec![20.0, 19.0, 15.0]);
    }

    #[test]
    fn test_parse_errors() {
        let err = parse_profile("0.0 20.0\n1.0 abc\n").unwrap_err();
        assert!(matches!(err, ProfileFileError::Parse { line: 2, .. }));

        let err = parse_profile("0.0\n").unwrap_err();
        assert!(matches!(err, ProfileFileError::Parse { line: 1, .. }));

        let err = parse_profile("# only comments\n").unwrap_err();
        assert!(matches!(err, ProfileFileError::EmptyProfile));
    }

    #[test]
    fn test_invalid_profile_reported() {
        let err = parse_profile("0 20\n1 19\n1 18\n").unwrap_err();
        assert!(matches!(err, ProfileFileError::Profile(_)));
    }

    #[test]
    fn test_read_file_uses_file_name() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "0.0 20.0").unwrap();
        writeln!(file, "1.0 19.0").unwrap();
        writeln!(file, "2.0 15.0").unwrap();

        let profile = read_profile_file(file.path()).unwrap();
        let expected = file.path().file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(profile.name(), Some(expected.as_str()));
    }
}
