//! Error types for lineage-core.

use thiserror::Error;

/// Result type alias for lineage-core operations.
pub type Result<T> = std::result::Result<T, LineageError>;

/// Errors that can occur while loading records or building a lineage graph.
#[derive(Error, Debug)]
pub enum LineageError {
    /// A record lacks its identifying name.
    #[error("Malformed record at index {index}: {reason}")]
    MalformedRecord {
        /// Position of the offending record in the input.
        index: usize,
        /// What is wrong with it.
        reason: String,
    },

    /// An edge points at a node that is not in the node set.
    ///
    /// The builder never produces this for valid input; seeing it means the
    /// builder itself is broken.
    #[error("Dangling edge {from} -> {to}: endpoint missing from node set")]
    DanglingEdge {
        /// Parent endpoint.
        from: String,
        /// Child endpoint.
        to: String,
    },

    /// The derivation graph contains cycles and the build was asked to reject them.
    #[error("Derivation cycle detected: {}", format_cycles(.cycles))]
    CycleDetected {
        /// Each cycle as the list of node ids taking part in it.
        cycles: Vec<Vec<String>>,
    },

    /// Catalog file does not exist.
    #[error("Catalog file not found: {path}")]
    FileNotFound {
        /// Path that was looked up.
        path: String,
    },

    /// Catalog text is not a JSON array of records.
    #[error("Catalog parse error: {0}")]
    Parse(#[source] serde_json::Error),

    /// Serialization failed while exporting or fingerprinting a graph.
    #[error("Encoding error: {0}")]
    Encode(#[source] serde_json::Error),

    /// IO error while reading the catalog.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

fn format_cycles(cycles: &[Vec<String>]) -> String {
    cycles
        .iter()
        .map(|cycle| cycle.join(" -> "))
        .collect::<Vec<_>>()
        .join("; ")
}

impl LineageError {
    pub(crate) fn malformed(index: usize, reason: impl Into<String>) -> Self {
        LineageError::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }
}
