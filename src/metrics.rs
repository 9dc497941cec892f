//! Run metrics for the list pipeline.
//!
//! Recording is a no-op until `init_metrics` installs the Prometheus
//! recorder. A run is a short-lived job, so instead of serving a scrape
//! endpoint the rendered exposition text is written to a file when the run
//! ends.

use crate::error::{ListError, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::fs;
use std::path::Path;
use std::sync::OnceLock;
use tracing::{info, warn};

static HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

pub const RECORDS_PARSED: &str = "list_records_parsed_total";
pub const BATCHES_SUBMITTED: &str = "list_batches_submitted_total";
pub const BATCHES_REJECTED: &str = "list_batches_rejected_total";
pub const BATCHES_FAILED: &str = "list_batches_failed_total";
pub const RECORDS_DROPPED: &str = "list_records_dropped_total";
pub const BATCH_SIZE: &str = "list_batch_size";
pub const VERIFY_DURATION: &str = "list_verify_duration_seconds";
pub const ROWS_WRITTEN: &str = "list_rows_written_total";
pub const DUPLICATES: &str = "list_duplicates_total";
pub const DELIVERABLE: &str = "list_deliverable_total";

/// Install the Prometheus recorder. Idempotent.
pub fn init_metrics() {
    if HANDLE.get().is_some() {
        return;
    }
    match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            if HANDLE.set(handle).is_err() {
                warn!("Metrics handle was already stored");
            }
            info!("Prometheus recorder installed");
        }
        Err(e) => warn!("Failed to install Prometheus recorder: {}", e),
    }
}

/// Rendered exposition text, if the recorder is installed.
pub fn render() -> Option<String> {
    HANDLE.get().map(|handle| handle.render())
}

pub fn write_snapshot(path: &Path) -> Result<()> {
    let text = render().ok_or_else(|| {
        ListError::Config("metrics snapshot requested but no recorder is installed".to_string())
    })?;
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    fs::write(path, text)?;
    info!("Wrote metrics snapshot to {}", path.display());
    Ok(())
}

pub mod pipeline {
    use super::{DELIVERABLE, DUPLICATES, RECORDS_PARSED, ROWS_WRITTEN};

    pub fn record_parsed() {
        ::metrics::counter!(RECORDS_PARSED).increment(1);
    }

    pub fn rows_written(rows: usize, duplicates: usize, deliverable: usize) {
        ::metrics::counter!(ROWS_WRITTEN).increment(rows as u64);
        ::metrics::counter!(DUPLICATES).increment(duplicates as u64);
        ::metrics::counter!(DELIVERABLE).increment(deliverable as u64);
    }
}

pub mod verification {
    use super::{BATCHES_FAILED, BATCHES_REJECTED, BATCHES_SUBMITTED, BATCH_SIZE, RECORDS_DROPPED, VERIFY_DURATION};

    pub fn batch_submitted(size: usize, duration_secs: f64) {
        ::metrics::counter!(BATCHES_SUBMITTED).increment(1);
        ::metrics::histogram!(BATCH_SIZE).record(size as f64);
        ::metrics::histogram!(VERIFY_DURATION).record(duration_secs);
    }

    pub fn batch_rejected(size: usize) {
        ::metrics::counter!(BATCHES_REJECTED).increment(1);
        ::metrics::counter!(RECORDS_DROPPED).increment(size as u64);
    }

    pub fn batch_failed() {
        ::metrics::counter!(BATCHES_FAILED).increment(1);
    }
}
