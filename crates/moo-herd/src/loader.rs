//! Loading cows from JSON files.
//!
//! A cow file is a JSON array of records:
//!
//! ```json
//! [
//!   {"cow_id": 1, "input_data": {"milk": {"morning": 10}, "weight": 500}},
//!   {"cow_id": "daisy", "input_data": {"milk": {"morning": 7}, "weight": 430}}
//! ]
//! ```
//!
//! Ids may be strings or numbers and are stored as strings.

use camino::Utf8Path;
use moo_core::{CowId, Record};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::{Cow, Herd, HerdError, LoadError};

/// One entry of a cow file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CowRecord {
    /// The cow's identifier.
    pub cow_id: CowId,
    /// The cow's input tree.
    pub input_data: Record,
}

impl From<CowRecord> for Cow {
    fn from(record: CowRecord) -> Self {
        Self::new(record.cow_id, record.input_data)
    }
}

/// Parses a cow file's contents.
pub fn parse_cows(json: &str) -> Result<Vec<Cow>, LoadError> {
    let records: Vec<CowRecord> = serde_json::from_str(json)?;
    Ok(records.into_iter().map(Cow::from).collect())
}

/// Reads and parses the cow file at `path`.
pub fn load_cows_from_json(path: &Utf8Path) -> Result<Vec<Cow>, LoadError> {
    let json = std::fs::read_to_string(path).map_err(|source| LoadError::Read {
        path: path.to_owned(),
        source,
    })?;
    parse_cows(&json)
}

impl Herd {
    /// Appends every cow in the file at `path`, returning how many were added.
    pub fn load_cows_from_json(&mut self, path: &Utf8Path) -> Result<usize, HerdError> {
        let cows = load_cows_from_json(path)?;
        let count = cows.len();
        self.add_cows(cows);
        info!(herd = %self.name, %path, count, "Loaded cows");
        Ok(count)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use camino::Utf8PathBuf;
    use moo_core::Value;

    use super::*;

    const COWS: &str = r#"[
        {"cow_id": 1, "input_data": {"milk": {"morning": 10, "evening": 8}, "weight": 500}},
        {"cow_id": "daisy", "input_data": {"milk": {"morning": 7, "evening": 6}, "weight": 430.5}}
    ]"#;

    #[test]
    fn test_parse_cows() {
        let cows = parse_cows(COWS).unwrap();
        assert_eq!(cows.len(), 2);
        assert_eq!(cows[0].id().as_str(), "1");
        assert_eq!(cows[1].id().as_str(), "daisy");
        assert_eq!(cows[1].input().get("weight"), Some(&Value::Float(430.5)));
        assert!(cows.iter().all(|cow| cow.result_count() == 0));
    }

    #[test]
    fn test_parse_cows_preserves_key_order() {
        let cows = parse_cows(r#"[{"cow_id": 1, "input_data": {"weight": 1, "age": 2, "milk": 3}}]"#).unwrap();
        assert_eq!(cows[0].input().keys().collect::<Vec<_>>(), ["weight", "age", "milk"]);
    }

    #[test]
    fn test_parse_cows_rejects_missing_input() {
        let err = parse_cows(r#"[{"cow_id": 1}]"#).unwrap_err();
        assert!(matches!(err, LoadError::Parse(_)));
    }

    #[test]
    fn test_herd_load_cows_from_json() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(COWS.as_bytes()).unwrap();
        let path = Utf8PathBuf::try_from(file.path().to_path_buf()).unwrap();

        let mut herd = Herd::new("Loaded");
        assert_eq!(herd.load_cows_from_json(&path).unwrap(), 2);
        assert_eq!(herd.len(), 2);
        assert!(herd.cow_by_id("daisy").is_some());
    }

    #[test]
    fn test_load_missing_file() {
        let err = load_cows_from_json(Utf8Path::new("/nonexistent/cows.json")).unwrap_err();
        assert!(matches!(err, LoadError::Read { .. }));
    }
}
