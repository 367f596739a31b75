use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "chunkgate",
    version,
    about = "Verification gate for chunked-document datasets"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Verify a chunks.json dataset (schema, structure, content fidelity)
    Verify(VerifyArgs),
}

#[derive(Args, Debug, Clone)]
pub struct VerifyArgs {
    /// Path to the chunk-dataset JSON file
    pub chunks_path: PathBuf,

    /// Raw source-document text; enables coverage and numeric checks
    #[arg(long)]
    pub source_text: Option<PathBuf>,

    /// Print every individual finding
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Write the full structured report as JSON
    #[arg(long)]
    pub export: Option<PathBuf>,

    /// Write uncapped unmatched diagnostics to a text file
    #[arg(long)]
    pub unmatched_log: Option<PathBuf>,
}
