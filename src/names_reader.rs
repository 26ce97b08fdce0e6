use anyhow::{Context, Result};
use log::{debug, warn};
use std::{io::ErrorKind, path::Path};

/// Reads recipient names, one per line. Lines are trimmed and blank lines
/// skipped. A missing file yields no names.
pub fn read_names<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    debug!("Reading names from {}", path.display());

    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            warn!("Names file not found: {}", path.display());
            return Ok(Vec::new());
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read names file: {}", path.display()))
        }
    };

    let names = parse_names(&raw);
    debug!("Found {} names", names.len());
    Ok(names)
}

pub fn parse_names(raw: &str) -> Vec<String> {
    raw.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blank_lines_and_trims() {
        let names = parse_names("  Alice \n\n\t\nBob\r\n   Carol Danvers  \n");
        assert_eq!(names, vec!["Alice", "Bob", "Carol Danvers"]);
    }

    #[test]
    fn whitespace_only_file_has_no_names() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "   \n\n \t \n").unwrap();
        assert!(read_names(&path).unwrap().is_empty());
    }

    #[test]
    fn missing_file_has_no_names() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_names(dir.path().join("names.txt")).unwrap().is_empty());
    }

    #[test]
    fn directory_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(read_names(dir.path()).is_err());
    }

    #[test]
    fn keeps_input_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("names.txt");
        std::fs::write(&path, "Zed\nAmy\nMo").unwrap();
        assert_eq!(read_names(&path).unwrap(), vec!["Zed", "Amy", "Mo"]);
    }
}
