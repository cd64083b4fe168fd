use std::collections::BTreeSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::error::GateError;

/// The set of `city, state` entries a location field accepts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LocationRegistry {
    entries: BTreeSet<String>,
}

impl LocationRegistry {
    /// Load one location per line. Lines are trimmed; blank lines and lines
    /// that are not valid UTF-8 are skipped.
    pub fn load(path: &Path) -> Result<Self, GateError> {
        let file = File::open(path).map_err(|source| GateError::Locations {
            path: path.to_path_buf(),
            source,
        })?;

        let mut entries = BTreeSet::new();
        for (i, line) in BufReader::new(file).lines().enumerate() {
            match line {
                Ok(line) => {
                    let line = line.trim();
                    if !line.is_empty() {
                        entries.insert(line.to_string());
                    }
                }
                Err(e) => warn!(path = %path.display(), line = i + 1, error = %e, "skipping unreadable location"),
            }
        }

        debug!(path = %path.display(), count = entries.len(), "loaded locations");
        Ok(Self { entries })
    }

    pub fn from_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let entries = lines
            .into_iter()
            .map(|l| l.as_ref().trim().to_string())
            .filter(|l| !l.is_empty())
            .collect();
        Self { entries }
    }

    /// Exact match after trimming.
    pub fn contains(&self, location: &str) -> bool {
        self.entries.contains(location.trim())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn load_trims_and_skips_blanks() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid_locations.txt");
        fs::write(&path, "Austin, Texas\n\n  Kuala Lumpur, Selangor  \n   \n").unwrap();

        let registry = LocationRegistry::load(&path).unwrap();
        assert_eq!(registry.len(), 2);
        assert!(registry.contains("Kuala Lumpur, Selangor"));
        assert!(registry.contains(" Austin, Texas "));
        assert!(!registry.contains("austin, texas"));
    }

    #[test]
    fn invalid_utf8_lines_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("valid_locations.txt");
        fs::write(&path, b"Austin, Texas\n\xff\xfe\nDallas, Texas\n").unwrap();

        let registry = LocationRegistry::load(&path).unwrap();
        assert_eq!(registry.iter().collect::<Vec<_>>(), vec!["Austin, Texas", "Dallas, Texas"]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.txt");
        match LocationRegistry::load(&path) {
            Err(GateError::Locations { path: p, .. }) => assert_eq!(p, path),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn default_is_empty() {
        assert!(LocationRegistry::default().is_empty());
        assert!(!LocationRegistry::from_lines(["", "Ipoh, Perak"]).is_empty());
    }
}
