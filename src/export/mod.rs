//! CRM → CSV export.
//!
//! Pages through the CRM search with a growing offset and appends each page's
//! contacts to the flat file. An empty page is the only normal end of the
//! export; non-success statuses are logged but do not stop pagination by
//! themselves (their bodies simply contain no results).

use crate::client::ApiResponse;
use crate::error::{ApiResult, ExportError, ExportResult};
use crate::metrics::Metrics;
use crate::models::crm::search_results;
use crate::models::{ContactRecord, CONTACT_FIELDS};
use std::fs;
use std::path::Path;

/// Source of paginated contact search results.
pub trait ContactSearch {
    /// Fetch the page starting at `offset` with at most `count` results.
    fn search_page(&self, offset: usize, count: usize) -> ApiResult<ApiResponse>;
}

impl<T: ContactSearch + ?Sized> ContactSearch for &T {
    fn search_page(&self, offset: usize, count: usize) -> ApiResult<ApiResponse> {
        (**self).search_page(offset, count)
    }
}

/// Totals of a finished export.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportSummary {
    /// Pages that returned at least one result
    pub pages: usize,

    /// Rows written (header excluded)
    pub records: usize,

    /// Pages answered with a non-200 status
    pub failed_pages: usize,
}

/// Drives the pagination loop for one export run.
pub struct Exporter<S> {
    source: S,
    metrics: Metrics,
}

impl<S: ContactSearch> Exporter<S> {
    pub fn new(source: S, metrics: Metrics) -> Self {
        Self { source, metrics }
    }

    /// Export matching contacts to `destination`.
    ///
    /// The file is recreated with a header row. `record_limit` is checked
    /// before each page is requested, so the last page is written whole and
    /// the total may exceed the limit by up to `page_size - 1` rows.
    pub fn export(
        &self,
        destination: &Path,
        page_size: usize,
        record_limit: Option<usize>,
    ) -> ExportResult<ExportSummary> {
        if page_size == 0 {
            return Err(ExportError::InvalidPageSize);
        }

        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let mut writer = csv::Writer::from_path(destination)?;
        writer.write_record(CONTACT_FIELDS)?;
        writer.flush()?;

        let mut summary = ExportSummary::default();
        let mut offset = 0;

        loop {
            if let Some(limit) = record_limit.filter(|l| *l > 0) {
                if summary.records >= limit {
                    tracing::info!("Reached the limit of {} records; export complete", limit);
                    break;
                }
            }

            tracing::info!("Querying offset {}...", offset);
            let response = match self.source.search_page(offset, page_size) {
                Ok(response) => response,
                Err(e) => {
                    tracing::error!("CRM search at offset {} failed: {}", offset, e);
                    break;
                }
            };

            if !response.is_ok() {
                summary.failed_pages += 1;
                tracing::warn!(
                    "CRM search at offset {} returned HTTP {}: {}",
                    offset,
                    response.status,
                    response.data
                );
            }

            let results = search_results(&response.data);
            if results.is_empty() {
                tracing::info!("No more results; export complete");
                break;
            }

            for object in &results {
                let record = ContactRecord::from_properties(&object.properties);
                writer.write_record(record.to_row())?;
            }
            writer.flush()?;

            summary.pages += 1;
            summary.records += results.len();
            self.metrics.record_records_exported(results.len());
            offset += page_size;
            tracing::info!("Total exported: {}", summary.records);
        }

        tracing::info!(
            "Export finished: {} record(s) written to {}",
            summary.records,
            destination.display()
        );
        Ok(summary)
    }
}
