//! Bulk import of books from a JSON file

use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use serde_json::Value;

use crate::{
    error::{AppError, AppResult},
    models::import_report::{ImportFailure, ImportSummary},
    repository::BookStore,
    validation::validate,
};

#[derive(Clone)]
pub struct ImportService {
    store: Arc<dyn BookStore>,
}

impl ImportService {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    /// Read a JSON array of book-shaped objects from `path` and insert each one.
    pub async fn import_file(&self, path: &Path) -> anyhow::Result<ImportSummary> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        let records: Vec<Value> = serde_json::from_str(&contents)
            .with_context(|| format!("{} is not a JSON array of books", path.display()))?;

        tracing::info!("Importing {} books from {}", records.len(), path.display());
        Ok(self.import_records(&records).await?)
    }

    /// Insert every valid record with the same defaults as a regular create.
    ///
    /// Records failing validation are skipped and reported; a storage failure
    /// aborts the run.
    pub async fn import_records(&self, records: &[Value]) -> AppResult<ImportSummary> {
        let mut summary = ImportSummary {
            total: records.len(),
            ..Default::default()
        };

        for (index, record) in records.iter().enumerate() {
            let fields = match validate(record, true) {
                Ok(fields) => fields,
                Err(e) => {
                    tracing::warn!("Skipping record {}: {}", index, e);
                    summary.skipped.push(ImportFailure {
                        index,
                        reason: e.code().to_string(),
                    });
                    continue;
                }
            };

            match self.store.insert(&fields).await {
                Ok(id) => {
                    summary.imported += 1;
                    summary.created_ids.push(id);
                }
                Err(AppError::Validation(e)) => summary.skipped.push(ImportFailure {
                    index,
                    reason: e.code().to_string(),
                }),
                Err(e) => return Err(e),
            }
        }

        tracing::info!(
            "Import complete: {} of {} imported, {} skipped",
            summary.imported,
            summary.total,
            summary.skipped.len()
        );
        Ok(summary)
    }
}
