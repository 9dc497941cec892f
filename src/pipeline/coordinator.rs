use crate::app::ports::{VerificationOutcome, VerificationPort};
use crate::error::{ListError, Result};
use crate::pipeline::dedup::Deduplicator;
use crate::pipeline::merge::{merge_batch, Disposition};
use crate::pipeline::output::OutputWriter;
use crate::types::InputRecord;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::io::Write;
use std::time::Instant;
use tracing::{debug, error, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatchState {
    Empty,
    Accumulating,
    Flushing,
    Aborted,
}

/// Totals for one run of the pipeline.
#[derive(Debug, Clone, Serialize)]
pub struct RunSummary {
    pub records_read: u64,
    pub batches_submitted: u64,
    pub batches_rejected: u64,
    pub records_dropped: u64,
    pub rows_written: u64,
    pub deliverable: u64,
    pub mailable: u64,
    pub rejected: u64,
    pub duplicates: u64,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl RunSummary {
    fn new() -> Self {
        Self {
            records_read: 0,
            batches_submitted: 0,
            batches_rejected: 0,
            records_dropped: 0,
            rows_written: 0,
            deliverable: 0,
            mailable: 0,
            rejected: 0,
            duplicates: 0,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    pub fn elapsed_seconds(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}

#[derive(Debug, Clone)]
struct Abort {
    first: u64,
    last: u64,
    reason: String,
}

/// Groups records into bounded batches and drives each batch through
/// verification, merge, de-duplication and output. Batches are flushed
/// strictly in arrival order, one at a time.
pub struct BatchCoordinator<V: VerificationPort, W: Write> {
    verifier: V,
    writer: OutputWriter<W>,
    dedup: Deduplicator,
    batch: Vec<InputRecord>,
    max_batch_size: usize,
    state: BatchState,
    summary: RunSummary,
    abort: Option<Abort>,
}

impl<V: VerificationPort, W: Write> BatchCoordinator<V, W> {
    pub fn new(verifier: V, writer: OutputWriter<W>, max_batch_size: usize) -> Self {
        let max_batch_size = max_batch_size.max(1);
        Self {
            verifier,
            writer,
            dedup: Deduplicator::new(),
            batch: Vec::with_capacity(max_batch_size),
            max_batch_size,
            state: BatchState::Empty,
            summary: RunSummary::new(),
            abort: None,
        }
    }

    pub fn state(&self) -> BatchState {
        self.state
    }

    pub fn summary(&self) -> &RunSummary {
        &self.summary
    }

    /// Add a record, flushing the batch once it is full.
    pub fn push(&mut self, record: InputRecord) -> Result<()> {
        if let Some(abort) = &self.abort {
            return Err(abort_error(abort));
        }

        self.batch.push(record);
        self.summary.records_read += 1;
        self.state = BatchState::Accumulating;

        if self.batch.len() >= self.max_batch_size {
            self.flush()?;
        }
        Ok(())
    }

    /// Flush the trailing partial batch and hand back the output stream.
    pub fn finish(mut self) -> Result<(RunSummary, W)> {
        if let Some(abort) = &self.abort {
            return Err(abort_error(abort));
        }
        if !self.batch.is_empty() {
            self.flush()?;
        }
        self.writer.flush()?;
        self.summary.finished_at = Some(Utc::now());
        info!(
            "Run complete: {} records read, {} rows written, {} batches ({} rejected), {} duplicates",
            self.summary.records_read,
            self.summary.rows_written,
            self.summary.batches_submitted,
            self.summary.batches_rejected,
            self.summary.duplicates
        );
        Ok((self.summary, self.writer.into_inner()))
    }

    fn flush(&mut self) -> Result<()> {
        self.state = BatchState::Flushing;
        let batch = std::mem::take(&mut self.batch);
        let first = batch.first().map(|r| r.sequence).unwrap_or_default();
        let last = batch.last().map(|r| r.sequence).unwrap_or_default();

        debug!("Verifying records {}-{}", first, last);
        let started = Instant::now();
        let outcome = self.verifier.verify(&batch);
        self.summary.batches_submitted += 1;
        crate::metrics::verification::batch_submitted(batch.len(), started.elapsed().as_secs_f64());

        let candidates = match outcome {
            VerificationOutcome::Success(candidates) => candidates,
            VerificationOutcome::RecoverableRejection(reason) => {
                warn!(
                    "Bad batch from records {}-{}, dropping {} records ({})",
                    first,
                    last,
                    batch.len(),
                    reason
                );
                crate::metrics::verification::batch_rejected(batch.len());
                self.summary.batches_rejected += 1;
                self.summary.records_dropped += batch.len() as u64;
                self.state = BatchState::Empty;
                return Ok(());
            }
            VerificationOutcome::FatalFailure(reason) => {
                return Err(self.abort(first, last, reason));
            }
        };

        let mut merged = match merge_batch(&batch, candidates) {
            Ok(merged) => merged,
            Err(e) => return Err(self.abort(first, last, e.to_string())),
        };

        let (mut duplicates, mut deliverable) = (0, 0);
        for record in merged.iter_mut() {
            self.dedup.mark(record);
            self.writer.write_record(record)?;

            if record.is_deliverable() {
                deliverable += 1;
            }
            match record.disposition() {
                Disposition::Mailable => self.summary.mailable += 1,
                Disposition::Rejected => self.summary.rejected += 1,
                Disposition::Duplicate => duplicates += 1,
            }
        }
        self.writer.flush()?;

        self.summary.rows_written += merged.len() as u64;
        self.summary.duplicates += duplicates as u64;
        self.summary.deliverable += deliverable as u64;
        crate::metrics::pipeline::rows_written(merged.len(), duplicates, deliverable);

        self.state = BatchState::Empty;
        Ok(())
    }

    fn abort(&mut self, first: u64, last: u64, reason: String) -> ListError {
        error!("Aborting run at records {}-{}: {}", first, last, reason);
        crate::metrics::verification::batch_failed();
        // rows already written for earlier batches stay in place
        if let Err(e) = self.writer.flush() {
            warn!("Failed to flush output after abort: {}", e);
        }
        self.state = BatchState::Aborted;
        let abort = Abort { first, last, reason };
        let err = abort_error(&abort);
        self.abort = Some(abort);
        err
    }
}

fn abort_error(abort: &Abort) -> ListError {
    ListError::BatchAborted {
        first: abort.first,
        last: abort.last,
        reason: abort.reason.clone(),
    }
}
