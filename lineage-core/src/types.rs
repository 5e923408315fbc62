//! Data models for distribution catalog records.
//!
//! Catalog files are loosely typed: any field may be missing, and keys come
//! either in English or in the original catalog's Spanish spelling. Records
//! are read into [`RawRecord`] and validated once into [`DistroRecord`],
//! which is what the builder consumes.

use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{LineageError, Result};

/// A catalog entry exactly as it appears on the wire.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RawRecord {
    #[serde(default, alias = "nombre")]
    pub name: Option<String>,
    #[serde(default, alias = "descripcion")]
    pub description: Option<String>,
    #[serde(default, alias = "basado_en")]
    pub derived_from: Option<String>,
    #[serde(
        default,
        alias = "fecha_lanzamiento",
        deserialize_with = "string_or_number"
    )]
    pub release_date: Option<String>,
    #[serde(default, alias = "paqueteria")]
    pub packaging: Option<String>,
    #[serde(default, alias = "filosofia")]
    pub philosophy: Option<String>,
    #[serde(default, alias = "ramas")]
    pub branches: Option<Vec<String>>,
}

/// Release dates show up both as `"1993-09-15"` and as a bare year.
fn string_or_number<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// A validated distribution record.
///
/// `name` is the primary key of the catalog. Everything except `name` and
/// `derived_from` is display metadata and passes through the builder
/// untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DistroRecord {
    pub name: String,
    pub description: Option<String>,
    pub derived_from: Option<String>,
    pub release_date: Option<String>,
    pub packaging: Option<String>,
    pub philosophy: Option<String>,
    pub branches: Vec<String>,
}

impl DistroRecord {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Builder: set the description.
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Builder: set the distribution this one derives from.
    pub fn derived_from(mut self, base: impl Into<String>) -> Self {
        self.derived_from = Some(base.into());
        self
    }

    /// Name with surrounding whitespace removed.
    pub fn key_name(&self) -> &str {
        self.name.trim()
    }

    /// The base distribution, or `None` for a root.
    ///
    /// A blank `derived_from` counts as absent.
    pub fn base(&self) -> Option<&str> {
        self.derived_from
            .as_deref()
            .map(str::trim)
            .filter(|base| !base.is_empty())
    }

    /// Validate a wire record found at `index` in its catalog.
    pub fn from_raw(index: usize, raw: RawRecord) -> Result<Self> {
        let name = match raw.name {
            Some(name) if !name.trim().is_empty() => name.trim().to_string(),
            Some(_) => return Err(LineageError::malformed(index, "name is blank")),
            None => return Err(LineageError::malformed(index, "name is missing")),
        };

        Ok(Self {
            name,
            description: raw.description.filter(|d| !d.trim().is_empty()),
            derived_from: raw
                .derived_from
                .map(|base| base.trim().to_string())
                .filter(|base| !base.is_empty()),
            release_date: raw.release_date,
            packaging: raw.packaging,
            philosophy: raw.philosophy,
            branches: raw.branches.unwrap_or_default(),
        })
    }
}

/// Validate a whole catalog, failing on the first malformed record.
pub fn validate_records(raw: Vec<RawRecord>) -> Result<Vec<DistroRecord>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, record)| DistroRecord::from_raw(index, record))
        .collect()
}
