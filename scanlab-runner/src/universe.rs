//! Universe file: sector-organized ticker lists supplied by the user.
//!
//! ```toml
//! [sectors]
//! Technology = ["AAPL", "MSFT"]
//! ETFs = ["SPY", "QQQ"]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum UniverseError {
    #[error("failed to read universe file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse universe TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize universe: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("unknown sector '{0}'")]
    UnknownSector(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Universe {
    pub sectors: BTreeMap<String, Vec<String>>,
}

impl Universe {
    pub fn from_file(path: &Path) -> Result<Self, UniverseError> {
        let content = std::fs::read_to_string(path).map_err(|source| UniverseError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, UniverseError> {
        Ok(toml::from_str(content)?)
    }

    pub fn to_toml(&self) -> Result<String, UniverseError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Every ticker once, upper-cased, in sector order then listing order.
    pub fn all_tickers(&self) -> Vec<String> {
        let mut seen = BTreeSet::new();
        self.sectors
            .values()
            .flatten()
            .map(|t| t.trim().to_uppercase())
            .filter(|t| !t.is_empty() && seen.insert(t.clone()))
            .collect()
    }

    pub fn sector_tickers(&self, sector: &str) -> Result<&[String], UniverseError> {
        self.sectors
            .get(sector)
            .map(Vec::as_slice)
            .ok_or_else(|| UniverseError::UnknownSector(sector.to_string()))
    }

    pub fn sector_names(&self) -> Vec<&str> {
        self.sectors.keys().map(String::as_str).collect()
    }

    pub fn ticker_count(&self) -> usize {
        self.all_tickers().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"
        [sectors]
        Technology = ["AAPL", "msft", "NVDA"]
        ETFs = ["SPY", "QQQ", "AAPL"]
    "#;

    #[test]
    fn parses_sectors() {
        let u = Universe::from_toml(SAMPLE).unwrap();
        assert_eq!(u.sector_names(), vec!["ETFs", "Technology"]);
        assert_eq!(u.sector_tickers("ETFs").unwrap().len(), 3);
        assert!(matches!(
            u.sector_tickers("Energy"),
            Err(UniverseError::UnknownSector(_))
        ));
    }

    #[test]
    fn all_tickers_dedups_and_normalizes() {
        let u = Universe::from_toml(SAMPLE).unwrap();
        assert_eq!(
            u.all_tickers(),
            vec!["SPY", "QQQ", "AAPL", "MSFT", "NVDA"]
        );
        assert_eq!(u.ticker_count(), 5);
    }

    #[test]
    fn toml_roundtrip() {
        let u = Universe::from_toml(SAMPLE).unwrap();
        let back = Universe::from_toml(&u.to_toml().unwrap()).unwrap();
        assert_eq!(u, back);
    }

    #[test]
    fn reads_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("universe.toml");
        std::fs::write(&path, SAMPLE).unwrap();
        assert_eq!(Universe::from_file(&path).unwrap().ticker_count(), 5);
        assert!(matches!(
            Universe::from_file(&dir.path().join("missing.toml")),
            Err(UniverseError::Io { .. })
        ));
    }
}
