// List processing pipeline: header analysis, parsing, batching, verification,
// merge, de-duplication and output.

pub mod coordinator;
pub mod dedup;
pub mod header;
pub mod merge;
pub mod output;
pub mod record;
pub mod wire;

pub use coordinator::{BatchCoordinator, BatchState, RunSummary};
pub use header::{analyze, HeaderAnalysis};
pub use merge::{Disposition, OutputRecord, VerifiedAddress};
pub use output::OutputWriter;

use crate::app::ports::VerificationPort;
use crate::error::Result;
use crate::types::{InputRecord, SequenceGenerator};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::Path;
use tracing::{info, instrument};

pub struct Pipeline;

impl Pipeline {
    /// Process `input` into `output`. The input is analyzed in full before
    /// the output file is created.
    #[instrument(skip_all, fields(run_id = %uuid::Uuid::new_v4(), input = %input.display()))]
    pub fn run_file<V: VerificationPort>(
        input: &Path,
        output: &Path,
        verifier: V,
        batch_size: usize,
    ) -> Result<RunSummary> {
        let analysis = header::analyze(input)?;

        let reader = BufReader::new(File::open(input)?);
        let writer = BufWriter::new(File::create(output)?);
        info!("Writing results to {}", output.display());

        let (summary, _) = Self::run(&analysis, reader, writer, verifier, batch_size)?;
        Ok(summary)
    }

    /// Stream the records of an analyzed list through the coordinator.
    /// `reader` yields the whole list, header line included.
    pub fn run<R: BufRead, W: Write, V: VerificationPort>(
        analysis: &HeaderAnalysis,
        reader: R,
        writer: W,
        verifier: V,
        batch_size: usize,
    ) -> Result<(RunSummary, W)> {
        let mut output = OutputWriter::new(writer);
        output.write_header(&analysis.columns)?;

        let mut coordinator = BatchCoordinator::new(verifier, output, batch_size);
        let mut sequences = SequenceGenerator::new();

        for line in reader.lines().skip(1) {
            let line = line?;
            let record = InputRecord::parse(&line, &analysis.headers, &mut sequences);
            coordinator.push(record)?;
        }

        coordinator.finish()
    }
}
