use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use tracing::info;

use crate::cli::VerifyArgs;
use crate::model::ChunkDataset;
use crate::util::{ensure_directory, now_utc_string, sha256_file, write_json_pretty};

use super::coverage::{CoverageOutcome, check_coverage};
use super::numeric::{NumericOutcome, check_numeric};
use super::report::{
    VerificationReport, coverage_section, numeric_section, overall_pass, print_report,
    schema_section, structure_section,
};
use super::schema::verify_schema;
use super::structure::verify_structure;

/// Subdirectory created beside the input when no unmatched-log path was
/// given but unmatched items exist.
const UNMATCHED_DIR_NAME: &str = "unmatched";

pub fn run(args: VerifyArgs) -> Result<bool> {
    let dataset = load_dataset(&args.chunks_path)?;
    let json_sha256 = sha256_file(&args.chunks_path)?;
    info!(
        chunks = dataset.chunks.len(),
        file = %args.chunks_path.display(),
        "dataset loaded"
    );

    let schema = schema_section(verify_schema(&dataset.chunks));
    let structure = structure_section(verify_structure(&dataset.chunks));

    // The source text is read once and shared by both fidelity checks.
    let source_text = match &args.source_text {
        Some(path) => Some(fs::read_to_string(path).with_context(|| {
            format!("failed to read source text: {}", path.display())
        })?),
        None => None,
    };

    let coverage_outcome = source_text
        .as_deref()
        .map(|text| check_coverage(text, &dataset.chunks));
    let numeric_outcome = match source_text.as_deref() {
        Some(text) => Some(check_numeric(text, &dataset.chunks)?),
        None => None,
    };

    let coverage = coverage_outcome.as_ref().map(coverage_section);
    let numeric = numeric_outcome.as_ref().map(numeric_section);
    let passed = overall_pass(&schema, &structure, coverage.as_ref(), numeric.as_ref());

    let report = VerificationReport {
        json_file: file_name(&args.chunks_path),
        json_sha256,
        source_text_file: args.source_text.as_ref().map(|path| path.display().to_string()),
        generated_at: now_utc_string(),
        total_chunks: dataset.chunks.len(),
        overall_pass: passed,
        schema,
        structure,
        coverage,
        numeric,
    };

    print_report(&report, args.verbose);

    if let Some(export_path) = &args.export {
        write_json_pretty(export_path, &report)?;
        info!(path = %export_path.display(), "report exported");
    }

    write_unmatched_log(
        &args,
        coverage_outcome.as_ref(),
        numeric_outcome.as_ref(),
    )?;

    Ok(passed)
}

fn load_dataset(path: &Path) -> Result<ChunkDataset> {
    let raw = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_slice(&raw).with_context(|| format!("failed to parse {}", path.display()))
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

/// Writes the full, uncapped unmatched lists. Written whenever the flag is
/// given; without the flag, only when unmatched items exist, to a fixed
/// subdirectory beside the input.
fn write_unmatched_log(
    args: &VerifyArgs,
    coverage: Option<&CoverageOutcome>,
    numeric: Option<&NumericOutcome>,
) -> Result<()> {
    let unmatched_total = coverage.map_or(0, |outcome| outcome.unmatched.len())
        + numeric.map_or(0, |outcome| outcome.unmatched.len());

    let path = match &args.unmatched_log {
        Some(path) => path.clone(),
        None => {
            if unmatched_total == 0 {
                return Ok(());
            }
            default_unmatched_log_path(&args.chunks_path)
        }
    };

    let mut out = String::new();
    if let Some(outcome) = coverage {
        out.push_str(&format!(
            "unmatched coverage sentences: {}\n",
            outcome.unmatched.len()
        ));
        for item in &outcome.unmatched {
            out.push_str(&format!("  {}\t{}\n", item.fingerprint, item.preview));
        }
    }
    if let Some(outcome) = numeric {
        out.push_str(&format!(
            "unmatched numeric assertions: {}\n",
            outcome.unmatched.len()
        ));
        for item in &outcome.unmatched {
            out.push_str(&format!("  {}\t{}\n", item.raw, item.key));
        }
    }

    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    fs::write(&path, out)
        .with_context(|| format!("failed to write unmatched log: {}", path.display()))?;
    info!(
        path = %path.display(),
        entries = unmatched_total,
        "unmatched diagnostics written"
    );

    Ok(())
}

fn default_unmatched_log_path(chunks_path: &Path) -> PathBuf {
    let stem = chunks_path
        .file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_else(|| "chunks".to_string());

    chunks_path
        .parent()
        .unwrap_or_else(|| Path::new("."))
        .join(UNMATCHED_DIR_NAME)
        .join(format!("{stem}.unmatched.txt"))
}
