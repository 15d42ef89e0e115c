//! Bulk import report models

use serde::{Deserialize, Serialize};

/// Why a single entry of an import file was skipped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Zero-based position in the source array
    pub index: usize,
    pub reason: String,
}

/// Outcome of a bulk import run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub total: usize,
    pub imported: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub skipped: Vec<ImportFailure>,
    /// Ids assigned to the imported rows, in file order
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub created_ids: Vec<i64>,
}
