use serde::Serialize;

use super::coverage::{CoverageOutcome, UnmatchedSentence};
use super::numeric::{NumericOutcome, UnmatchedNumber};

pub const PASS_THRESHOLD_PERCENT: f64 = 90.0;
pub const UNMATCHED_PREVIEW_LIMIT: usize = 20;
pub const SENTENCE_PREVIEW_MAX_CHARS: usize = 80;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

impl Severity {
    pub fn marker(self) -> &'static str {
        match self {
            Self::Error => "!!",
            Self::Warning => "W ",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SchemaFinding {
    pub chunk_seq: i64,
    pub chunk_id: String,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug, Clone, Serialize)]
pub struct StructureFinding {
    #[serde(rename = "type")]
    pub error_type: &'static str,
    pub detail: String,
    pub severity: Severity,
}

/// matched / checked as a percentage, defined as 100 when nothing was
/// checkable.
pub fn percent(matched: usize, checked: usize) -> f64 {
    if checked == 0 {
        100.0
    } else {
        matched as f64 / checked as f64 * 100.0
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Truncates to a character budget for preview lists, marking the cut.
pub fn preview(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let mut out: String = text.chars().take(max_chars).collect();
    out.push('…');
    out
}

#[derive(Debug, Serialize)]
pub struct VerificationReport {
    pub json_file: String,
    pub json_sha256: String,
    pub source_text_file: Option<String>,
    pub generated_at: String,
    pub total_chunks: usize,
    pub overall_pass: bool,
    pub schema: SchemaSection,
    pub structure: StructureSection,
    pub coverage: Option<CoverageSection>,
    pub numeric: Option<NumericSection>,
}

#[derive(Debug, Serialize)]
pub struct SchemaSection {
    pub ok: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub findings: Vec<SchemaFinding>,
}

#[derive(Debug, Serialize)]
pub struct StructureSection {
    pub ok: bool,
    pub error_count: usize,
    pub warning_count: usize,
    pub findings: Vec<StructureFinding>,
}

#[derive(Debug, Serialize)]
pub struct CoverageSection {
    pub ok: bool,
    pub total_sentences: usize,
    pub skipped: usize,
    pub checked: usize,
    pub matched: usize,
    pub percent: f64,
    pub unmatched_count: usize,
    pub unmatched_preview: Vec<UnmatchedSentence>,
}

#[derive(Debug, Serialize)]
pub struct NumericSection {
    pub ok: bool,
    pub total_patterns: usize,
    pub skipped: usize,
    pub checked: usize,
    pub matched: usize,
    pub percent: f64,
    pub unmatched_count: usize,
    pub unmatched_preview: Vec<UnmatchedNumber>,
}

pub fn schema_section(findings: Vec<SchemaFinding>) -> SchemaSection {
    let error_count = findings
        .iter()
        .filter(|finding| finding.severity == Severity::Error)
        .count();
    let warning_count = findings.len() - error_count;

    SchemaSection {
        ok: error_count == 0,
        error_count,
        warning_count,
        findings,
    }
}

pub fn structure_section(findings: Vec<StructureFinding>) -> StructureSection {
    let error_count = findings
        .iter()
        .filter(|finding| finding.severity == Severity::Error)
        .count();
    let warning_count = findings.len() - error_count;

    StructureSection {
        ok: error_count == 0,
        error_count,
        warning_count,
        findings,
    }
}

pub fn coverage_section(outcome: &CoverageOutcome) -> CoverageSection {
    CoverageSection {
        ok: outcome.passed(),
        total_sentences: outcome.total_sentences,
        skipped: outcome.skipped,
        checked: outcome.checked(),
        matched: outcome.matched,
        percent: round2(outcome.percent()),
        unmatched_count: outcome.unmatched.len(),
        unmatched_preview: outcome
            .unmatched
            .iter()
            .take(UNMATCHED_PREVIEW_LIMIT)
            .cloned()
            .collect(),
    }
}

pub fn numeric_section(outcome: &NumericOutcome) -> NumericSection {
    NumericSection {
        ok: outcome.passed(),
        total_patterns: outcome.total_patterns,
        skipped: outcome.skipped,
        checked: outcome.checked(),
        matched: outcome.matched,
        percent: round2(outcome.percent()),
        unmatched_count: outcome.unmatched.len(),
        unmatched_preview: outcome
            .unmatched
            .iter()
            .take(UNMATCHED_PREVIEW_LIMIT)
            .cloned()
            .collect(),
    }
}

/// Overall pass: no error-severity schema or structure findings, and each
/// fidelity check that actually ran cleared its threshold.
pub fn overall_pass(
    schema: &SchemaSection,
    structure: &StructureSection,
    coverage: Option<&CoverageSection>,
    numeric: Option<&NumericSection>,
) -> bool {
    schema.ok
        && structure.ok
        && coverage.is_none_or(|section| section.ok)
        && numeric.is_none_or(|section| section.ok)
}

pub fn print_report(report: &VerificationReport, verbose: bool) {
    let banner = "=".repeat(60);
    println!();
    println!("{banner}");
    println!("Verification: {}", report.json_file);
    println!("{banner}");

    println!(
        "[schema]    {} - {} chunks, {} errors, {} warnings",
        ok_label(report.schema.ok),
        report.total_chunks,
        report.schema.error_count,
        report.schema.warning_count
    );
    if verbose {
        for finding in &report.schema.findings {
            println!(
                "  {} seq={} ({}): {} - {}",
                finding.severity.marker(),
                finding.chunk_seq,
                finding.chunk_id,
                finding.field,
                finding.message
            );
        }
    }

    println!(
        "[structure] {} - {} errors, {} warnings",
        ok_label(report.structure.ok),
        report.structure.error_count,
        report.structure.warning_count
    );
    if verbose {
        for finding in &report.structure.findings {
            println!(
                "  {} {}: {}",
                finding.severity.marker(),
                finding.error_type,
                finding.detail
            );
        }
    }

    match &report.coverage {
        Some(section) => {
            println!(
                "[coverage]  {} - {:.1}% ({}/{} matched, {} skipped, {} unmatched)",
                ok_label(section.ok),
                section.percent,
                section.matched,
                section.checked,
                section.skipped,
                section.unmatched_count
            );
            if verbose {
                for item in &section.unmatched_preview {
                    println!("  ?? {}", item.preview);
                }
            }
        }
        None => println!("[coverage]  skipped - no source text supplied"),
    }

    match &report.numeric {
        Some(section) => {
            println!(
                "[numeric]   {} - {:.1}% ({}/{} matched, {} skipped, {} unmatched)",
                ok_label(section.ok),
                section.percent,
                section.matched,
                section.checked,
                section.skipped,
                section.unmatched_count
            );
            if verbose {
                for item in &section.unmatched_preview {
                    println!("  ?? {} (key: {})", item.raw, item.key);
                }
            }
        }
        None => println!("[numeric]   skipped - no source text supplied"),
    }

    println!();
    println!(
        "Overall: {}",
        if report.overall_pass { "PASS" } else { "FAIL" }
    );
}

fn ok_label(ok: bool) -> &'static str {
    if ok { "OK" } else { "FAIL" }
}
