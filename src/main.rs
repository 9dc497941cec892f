use clap::Parser;
use list_verifier::config::Config;
use list_verifier::infra::HttpVerifier;
use list_verifier::{logging, metrics, Pipeline};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::error;

#[derive(Parser)]
#[command(name = "list_verifier")]
#[command(about = "Verify and de-duplicate a tab-delimited address list")]
#[command(version)]
struct Cli {
    /// Tab-delimited input list with a header row
    input: PathBuf,

    /// Where to write the augmented list
    output: PathBuf,

    /// TOML config file (defaults to ./config.toml when present)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Records per verification request (1-100)
    #[arg(long)]
    batch_size: Option<usize>,

    /// Write a Prometheus metrics snapshot here when the run ends
    #[arg(long)]
    metrics_file: Option<PathBuf>,
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(batch_size) = cli.batch_size {
        config.service.batch_size = batch_size;
    }
    if cli.metrics_file.is_some() {
        metrics::init_metrics();
    }

    let verifier = HttpVerifier::new(&config.service)?;
    let batch_size = config.service.effective_batch_size();

    println!("🚀 Processing {}", cli.input.display());
    let result = Pipeline::run_file(&cli.input, &cli.output, verifier, batch_size);

    if let Some(path) = &cli.metrics_file {
        if let Err(e) = metrics::write_snapshot(path) {
            error!("Failed to write metrics snapshot: {}", e);
        }
    }

    let summary = result?;
    println!("\n📊 Results for {}:", cli.input.display());
    println!("   Records read: {}", summary.records_read);
    println!(
        "   Batches: {} ({} rejected, {} records dropped)",
        summary.batches_submitted, summary.batches_rejected, summary.records_dropped
    );
    println!("   Rows written: {}", summary.rows_written);
    println!("   Mailable: {}", summary.mailable);
    println!("   Rejected: {}", summary.rejected);
    println!("   Duplicates: {}", summary.duplicates);
    if let Some(seconds) = summary.elapsed_seconds() {
        println!("   Elapsed: {:.1}s", seconds);
    }
    println!("   Output file: {}", cli.output.display());
    Ok(())
}

fn main() -> ExitCode {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("List processing failed: {:#}", e);
            eprintln!("❌ List processing failed: {:#}", e);
            ExitCode::FAILURE
        }
    }
}
