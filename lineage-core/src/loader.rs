//! Catalog loading.
//!
//! A catalog is a JSON array of distribution objects (see
//! [`RawRecord`](crate::types::RawRecord) for accepted keys). Loading
//! validates every record, so the builder only ever sees well-formed input.

use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::error::{LineageError, Result};
use crate::types::{validate_records, DistroRecord, RawRecord};

/// Parse and validate catalog text.
pub fn parse_records(content: &str) -> Result<Vec<DistroRecord>> {
    let raw: Vec<RawRecord> = serde_json::from_str(content).map_err(LineageError::Parse)?;
    validate_records(raw)
}

/// Read, parse and validate a catalog file.
pub fn load_records(path: &Path) -> Result<Vec<DistroRecord>> {
    let content = fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => LineageError::FileNotFound {
            path: path.display().to_string(),
        },
        _ => LineageError::Io(e),
    })?;

    let records = parse_records(&content)?;
    tracing::debug!("Loaded {} records from {:?}", records.len(), path);
    Ok(records)
}
