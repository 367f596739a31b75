use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde_json::Value;

use super::report::{Severity, StructureFinding};

pub const DUPLICATE_SEQ: &str = "duplicate_seq";
pub const SEQ_NOT_ZERO: &str = "seq_not_zero";
pub const SEQ_GAP: &str = "seq_gap";
pub const SPLIT_TOTAL_MISMATCH: &str = "split_total_mismatch";
pub const SPLIT_COUNT_MISMATCH: &str = "split_count_mismatch";
pub const SPLIT_INDEX_GAP: &str = "split_index_gap";
pub const SECTION_INDEX_MISMATCH: &str = "section_index_mismatch";
pub const PREV_CHUNK_ID_ERROR: &str = "prev_chunk_id_error";
pub const NEXT_CHUNK_ID_ERROR: &str = "next_chunk_id_error";
pub const PREV_CHUNK_ID_DANGLING: &str = "prev_chunk_id_dangling";
pub const NEXT_CHUNK_ID_DANGLING: &str = "next_chunk_id_dangling";

fn error(error_type: &'static str, detail: String) -> StructureFinding {
    StructureFinding {
        error_type,
        detail,
        severity: Severity::Error,
    }
}

fn warning(error_type: &'static str, detail: String) -> StructureFinding {
    StructureFinding {
        error_type,
        detail,
        severity: Severity::Warning,
    }
}

/// Checks cross-chunk invariants over the whole collection: sequence
/// contiguity, split-group completeness, section-index consistency, and the
/// prev/next traversal chain. An empty collection is vacuously valid.
pub fn verify_structure(chunks: &[Value]) -> Vec<StructureFinding> {
    let mut findings = Vec::new();
    if chunks.is_empty() {
        return findings;
    }

    check_sequence(chunks, &mut findings);
    check_split_groups(chunks, &mut findings);
    check_section_indices(chunks, &mut findings);
    check_chain(chunks, &mut findings);

    findings
}

fn chunk_seq(chunk: &Value) -> i64 {
    chunk.get("chunk_seq").and_then(Value::as_i64).unwrap_or(-1)
}

fn check_sequence(chunks: &[Value], findings: &mut Vec<StructureFinding>) {
    let mut counts: BTreeMap<i64, usize> = BTreeMap::new();
    for chunk in chunks {
        *counts.entry(chunk_seq(chunk)).or_insert(0) += 1;
    }

    // one finding per duplicated value, regardless of how often it repeats
    for (seq, count) in &counts {
        if *count > 1 {
            findings.push(error(
                DUPLICATE_SEQ,
                format!("chunk_seq={seq} occurs {count} times"),
            ));
        }
    }

    let mut seqs: Vec<i64> = chunks.iter().map(chunk_seq).collect();
    seqs.sort_unstable();
    let min = seqs[0];

    if min != 0 {
        findings.push(error(
            SEQ_NOT_ZERO,
            format!("chunk_seq starts at {min} instead of 0"),
        ));
    }

    let present: BTreeSet<i64> = seqs.iter().copied().collect();
    let missing: Vec<String> = (min..min + seqs.len() as i64)
        .filter(|value| !present.contains(value))
        .map(|value| value.to_string())
        .collect();
    if !missing.is_empty() {
        findings.push(error(
            SEQ_GAP,
            format!("missing chunk_seq values: {}", missing.join(", ")),
        ));
    }
}

fn check_split_groups(chunks: &[Value], findings: &mut Vec<StructureFinding>) {
    let mut groups: BTreeMap<String, Vec<&serde_json::Map<String, Value>>> = BTreeMap::new();

    for chunk in chunks {
        let Some(split) = chunk.get("split").and_then(Value::as_object) else {
            continue;
        };
        let group_id = split
            .get("group_id")
            .and_then(Value::as_str)
            .or_else(|| chunk.get("section_id").and_then(Value::as_str))
            .unwrap_or("?");
        groups.entry(group_id.to_string()).or_default().push(split);
    }

    for (group_id, members) in &groups {
        let totals: BTreeSet<i64> = members
            .iter()
            .filter_map(|split| split.get("split_total").and_then(Value::as_i64))
            .collect();

        if totals.len() > 1 {
            let listed: Vec<String> = totals.iter().map(|total| total.to_string()).collect();
            findings.push(error(
                SPLIT_TOTAL_MISMATCH,
                format!(
                    "group_id='{group_id}': inconsistent split_total values: {}",
                    listed.join(", ")
                ),
            ));
            continue;
        }

        let Some(total) = totals.into_iter().next() else {
            continue;
        };

        if members.len() as i64 != total {
            findings.push(error(
                SPLIT_COUNT_MISMATCH,
                format!(
                    "group_id='{group_id}': split_total={total} but group has {} members",
                    members.len()
                ),
            ));
        }

        let mut indices: Vec<i64> = members
            .iter()
            .filter_map(|split| split.get("split_index").and_then(Value::as_i64))
            .collect();
        indices.sort_unstable();
        let expected: Vec<i64> = (0..total).collect();
        if indices != expected {
            findings.push(error(
                SPLIT_INDEX_GAP,
                format!(
                    "group_id='{group_id}': split_index set {indices:?} does not equal {expected:?}"
                ),
            ));
        }
    }
}

fn check_section_indices(chunks: &[Value], findings: &mut Vec<StructureFinding>) {
    let mut sections: BTreeMap<&str, BTreeSet<i64>> = BTreeMap::new();

    for chunk in chunks {
        let Some(section_id) = chunk.get("section_id").and_then(Value::as_str) else {
            continue;
        };
        let Some(section_index) = chunk.get("section_index").and_then(Value::as_i64) else {
            continue;
        };
        sections.entry(section_id).or_default().insert(section_index);
    }

    for (section_id, indices) in &sections {
        if indices.len() > 1 {
            let listed: Vec<String> = indices.iter().map(|index| index.to_string()).collect();
            findings.push(error(
                SECTION_INDEX_MISMATCH,
                format!(
                    "section_id='{section_id}': inconsistent section_index values: {}",
                    listed.join(", ")
                ),
            ));
        }
    }
}

fn check_chain(chunks: &[Value], findings: &mut Vec<StructureFinding>) {
    let mut ordered: Vec<&Value> = chunks.iter().collect();
    ordered.sort_by_key(|chunk| chunk_seq(chunk));

    let chunk_ids: HashSet<&str> = ordered
        .iter()
        .filter_map(|chunk| chunk.get("chunk_id").and_then(Value::as_str))
        .collect();

    for (position, chunk) in ordered.iter().enumerate() {
        let chunk_id = chunk.get("chunk_id").and_then(Value::as_str).unwrap_or("?");
        let prev = chunk.get("prev_chunk_id").unwrap_or(&Value::Null);
        let next = chunk.get("next_chunk_id").unwrap_or(&Value::Null);

        if position == 0 && !prev.is_null() {
            findings.push(warning(
                PREV_CHUNK_ID_ERROR,
                format!("first chunk ({chunk_id}) has non-null prev_chunk_id: {prev}"),
            ));
        }
        if position == ordered.len() - 1 && !next.is_null() {
            findings.push(warning(
                NEXT_CHUNK_ID_ERROR,
                format!("last chunk ({chunk_id}) has non-null next_chunk_id: {next}"),
            ));
        }

        if !prev.is_null() {
            let resolves = prev
                .as_str()
                .is_some_and(|target| chunk_ids.contains(target));
            if !resolves {
                findings.push(error(
                    PREV_CHUNK_ID_DANGLING,
                    format!("prev_chunk_id {prev} of {chunk_id} does not name an existing chunk"),
                ));
            }
        }
        if !next.is_null() {
            let resolves = next
                .as_str()
                .is_some_and(|target| chunk_ids.contains(target));
            if !resolves {
                findings.push(error(
                    NEXT_CHUNK_ID_DANGLING,
                    format!("next_chunk_id {next} of {chunk_id} does not name an existing chunk"),
                ));
            }
        }
    }
}
