use serde_json::Value;

use super::report::{SchemaFinding, Severity};
use crate::model::{ChunkType, EntityType, ReferenceType, RelationType, json_type_name};

const REQUIRED_CHUNK_FIELDS: [&str; 23] = [
    "id",
    "chunk_id",
    "doc_id",
    "section_index",
    "chunk_seq",
    "section_id",
    "chunk_type",
    "section_path",
    "section_title",
    "page_start",
    "page_end",
    "locators",
    "context_prefix",
    "text",
    "split",
    "prev_chunk_id",
    "next_chunk_id",
    "images",
    "tables",
    "tables_data",
    "references",
    "equations",
    "keywords",
];

const REQUIRED_SPAN_FIELDS: [&str; 5] = [
    "source_pdf",
    "pdf_page_start",
    "pdf_page_end",
    "doc_page_start",
    "doc_page_end",
];

const REQUIRED_SPLIT_FIELDS: [&str; 4] = ["group_id", "split_index", "split_total", "logical_range"];

const REQUIRED_REFERENCE_FIELDS: [&str; 2] = ["target", "type"];

const REQUIRED_ENTITY_FIELDS: [&str; 3] = ["mention", "canonical", "type"];

const REQUIRED_TABLE_DATA_FIELDS: [&str; 3] = ["title", "columns", "rows"];

const REQUIRED_EQUATION_FIELDS: [&str; 3] = ["name", "symbol", "expression"];

struct ChunkContext<'a> {
    seq: i64,
    chunk_id: &'a str,
}

impl ChunkContext<'_> {
    fn finding(
        &self,
        severity: Severity,
        field: impl Into<String>,
        message: impl Into<String>,
    ) -> SchemaFinding {
        SchemaFinding {
            chunk_seq: self.seq,
            chunk_id: self.chunk_id.to_string(),
            field: field.into(),
            message: message.into(),
            severity,
        }
    }

    fn error(&self, field: impl Into<String>, message: impl Into<String>) -> SchemaFinding {
        self.finding(Severity::Error, field, message)
    }

    fn warning(&self, field: impl Into<String>, message: impl Into<String>) -> SchemaFinding {
        self.finding(Severity::Warning, field, message)
    }
}

/// Checks every chunk against the schema contract: required fields, closed
/// value sets, the shape of nested containers, and derived page fields.
pub fn verify_schema(chunks: &[Value]) -> Vec<SchemaFinding> {
    let mut findings = Vec::new();

    for chunk in chunks {
        let Some(object) = chunk.as_object() else {
            findings.push(SchemaFinding {
                chunk_seq: -1,
                chunk_id: "?".to_string(),
                field: "chunk".to_string(),
                message: format!("must be an object, got {}", json_type_name(chunk)),
                severity: Severity::Error,
            });
            continue;
        };

        let ctx = ChunkContext {
            seq: object.get("chunk_seq").and_then(Value::as_i64).unwrap_or(-1),
            chunk_id: object.get("chunk_id").and_then(Value::as_str).unwrap_or("?"),
        };

        for field in REQUIRED_CHUNK_FIELDS {
            if !object.contains_key(field) {
                findings.push(ctx.error(field, "missing required field"));
            }
        }

        check_chunk_type(&ctx, object, &mut findings);
        check_locators(&ctx, object, &mut findings);
        check_derived_pages(&ctx, object, &mut findings);
        check_split(&ctx, object, &mut findings);
        check_references(&ctx, object, &mut findings);
        check_section_path(&ctx, object, &mut findings);
        check_keywords(&ctx, object, &mut findings);
        check_text(&ctx, object, &mut findings);
        check_entity_list(&ctx, object, "domain_entities", &mut findings);
        check_entity_list(&ctx, object, "ontology_keywords", &mut findings);
        check_advisory_extensions(&ctx, object, &mut findings);
        check_tables_data(&ctx, object, &mut findings);
        check_equations(&ctx, object, &mut findings);
    }

    findings
}

fn check_chunk_type(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    match object.get("chunk_type") {
        None => {}
        Some(Value::String(value)) => {
            if ChunkType::parse(value).is_none() {
                findings.push(ctx.error(
                    "chunk_type",
                    format!(
                        "invalid value: '{value}' (allowed: {})",
                        ChunkType::ALL.join(", ")
                    ),
                ));
            } else if value == "table" && !object.contains_key("table_oversized") {
                findings.push(ctx.warning(
                    "table_oversized",
                    "table chunk is missing the table_oversized field",
                ));
            }
        }
        Some(other) => {
            findings.push(ctx.error(
                "chunk_type",
                format!("must be a string, got {}", json_type_name(other)),
            ));
        }
    }
}

fn check_locators(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    let Some(locators) = object.get("locators") else {
        return;
    };

    let Some(locators) = locators.as_object() else {
        findings.push(ctx.error(
            "locators",
            format!("must be an object, got {}", json_type_name(locators)),
        ));
        return;
    };

    let Some(spans) = locators.get("spans") else {
        findings.push(ctx.error("locators.spans", "missing spans array"));
        return;
    };

    let spans_ok = spans
        .as_array()
        .is_some_and(|entries| !entries.is_empty());
    if !spans_ok {
        findings.push(ctx.error("locators.spans", "must be a non-empty array"));
        return;
    }

    for (index, span) in spans.as_array().into_iter().flatten().enumerate() {
        let Some(span) = span.as_object() else {
            findings.push(ctx.error(
                format!("locators.spans[{index}]"),
                format!("must be an object, got {}", json_type_name(span)),
            ));
            continue;
        };
        for field in REQUIRED_SPAN_FIELDS {
            if !span.contains_key(field) {
                findings.push(ctx.error(
                    format!("locators.spans[{index}].{field}"),
                    "missing required field",
                ));
            }
        }
    }
}

fn check_derived_pages(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    let spans = object
        .get("locators")
        .and_then(Value::as_object)
        .and_then(|locators| locators.get("spans"))
        .and_then(Value::as_array);
    let Some(spans) = spans else {
        return;
    };

    let starts: Vec<i64> = spans
        .iter()
        .filter_map(|span| span.get("doc_page_start").and_then(Value::as_i64))
        .collect();
    let ends: Vec<i64> = spans
        .iter()
        .filter_map(|span| span.get("doc_page_end").and_then(Value::as_i64))
        .collect();

    if let (Some(expected), Some(actual)) = (
        starts.iter().min().copied(),
        object.get("page_start").and_then(Value::as_i64),
    ) {
        if actual != expected {
            findings.push(ctx.error(
                "page_start",
                format!(
                    "derived mismatch: page_start={actual}, min(spans.doc_page_start)={expected}"
                ),
            ));
        }
    }

    if let (Some(expected), Some(actual)) = (
        ends.iter().max().copied(),
        object.get("page_end").and_then(Value::as_i64),
    ) {
        if actual != expected {
            findings.push(ctx.error(
                "page_end",
                format!("derived mismatch: page_end={actual}, max(spans.doc_page_end)={expected}"),
            ));
        }
    }
}

fn check_split(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    // split is the one optional substructure whose contract allows null.
    match object.get("split") {
        None | Some(Value::Null) => {}
        Some(Value::Object(split)) => {
            for field in REQUIRED_SPLIT_FIELDS {
                if !split.contains_key(field) {
                    findings.push(ctx.error(format!("split.{field}"), "missing required field"));
                }
            }
            if let (Some(index), Some(total)) = (
                split.get("split_index").and_then(Value::as_i64),
                split.get("split_total").and_then(Value::as_i64),
            ) {
                if index < 0 || index >= total {
                    findings.push(ctx.error(
                        "split.split_index",
                        format!("out of range: split_index={index}, split_total={total}"),
                    ));
                }
            }
        }
        Some(other) => {
            findings.push(ctx.error(
                "split",
                format!("must be an object or null, got {}", json_type_name(other)),
            ));
        }
    }
}

fn check_references(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    let Some(references) = object.get("references") else {
        return;
    };

    let Some(references) = references.as_array() else {
        findings.push(ctx.error(
            "references",
            format!("must be an array, got {}", json_type_name(references)),
        ));
        return;
    };

    for (index, reference) in references.iter().enumerate() {
        let Some(reference) = reference.as_object() else {
            findings.push(ctx.error(
                format!("references[{index}]"),
                format!("must be an object, got {}", json_type_name(reference)),
            ));
            continue;
        };

        for field in REQUIRED_REFERENCE_FIELDS {
            if !reference.contains_key(field) {
                findings.push(ctx.error(
                    format!("references[{index}].{field}"),
                    "missing required field",
                ));
            }
        }

        if let Some(ref_type) = reference.get("type").and_then(Value::as_str) {
            if ReferenceType::parse(ref_type).is_none() {
                findings.push(ctx.error(
                    format!("references[{index}].type"),
                    format!(
                        "invalid value: '{ref_type}' (allowed: {})",
                        ReferenceType::ALL.join(", ")
                    ),
                ));
            }
        }

        // relation stays null until post-processing fills it in, so null is
        // fine and unknown values are only advisory.
        match reference.get("relation") {
            None | Some(Value::Null) => {}
            Some(Value::String(relation)) => {
                if RelationType::parse(relation).is_none() {
                    findings.push(ctx.warning(
                        format!("references[{index}].relation"),
                        format!(
                            "invalid value: '{relation}' (allowed: {})",
                            RelationType::ALL.join(", ")
                        ),
                    ));
                }
            }
            Some(other) => {
                findings.push(ctx.warning(
                    format!("references[{index}].relation"),
                    format!("must be a string or null, got {}", json_type_name(other)),
                ));
            }
        }

        if let Some(target_norm) = reference.get("target_norm").and_then(Value::as_object) {
            let null_keys: Vec<&str> = target_norm
                .iter()
                .filter(|(_, value)| value.is_null())
                .map(|(key, _)| key.as_str())
                .collect();
            if !null_keys.is_empty() {
                findings.push(ctx.warning(
                    format!("references[{index}].target_norm"),
                    format!(
                        "null values not allowed; drop these keys instead: {}",
                        null_keys.join(", ")
                    ),
                ));
            }
        }
    }
}

fn check_section_path(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    if let Some(section_path) = object.get("section_path") {
        let ok = section_path
            .as_array()
            .is_some_and(|entries| !entries.is_empty());
        if !ok {
            findings.push(ctx.error("section_path", "must be a non-empty array"));
        }
    }
}

fn check_keywords(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    match object.get("keywords") {
        None => {}
        Some(Value::Array(keywords)) => {
            if keywords.is_empty() {
                findings.push(ctx.warning("keywords", "keyword list is empty"));
            }
        }
        Some(other) => {
            findings.push(ctx.error(
                "keywords",
                format!("must be an array, got {}", json_type_name(other)),
            ));
        }
    }
}

fn check_text(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    if let Some(text) = object.get("text") {
        let ok = text.as_str().is_some_and(|value| !value.trim().is_empty());
        if !ok {
            findings.push(ctx.error("text", "must be a non-empty string"));
        }
    }

    // embedding was retired from the chunk schema; vectors live in their own
    // collection now.
    if object.contains_key("embedding") {
        findings.push(ctx.warning(
            "embedding",
            "retired field; store embeddings in a separate collection",
        ));
    }
}

fn check_entity_list(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    field_name: &str,
    findings: &mut Vec<SchemaFinding>,
) {
    let Some(entities) = object.get(field_name) else {
        return;
    };

    let Some(entities) = entities.as_array() else {
        findings.push(ctx.warning(
            field_name,
            format!("must be an array, got {}", json_type_name(entities)),
        ));
        return;
    };

    for (index, entity) in entities.iter().enumerate() {
        let Some(entity) = entity.as_object() else {
            findings.push(ctx.warning(
                format!("{field_name}[{index}]"),
                format!("must be an object, got {}", json_type_name(entity)),
            ));
            continue;
        };

        for field in REQUIRED_ENTITY_FIELDS {
            if !entity.contains_key(field) {
                findings.push(ctx.warning(
                    format!("{field_name}[{index}].{field}"),
                    "missing required field",
                ));
            }
        }

        if let Some(entity_type) = entity.get("type").and_then(Value::as_str) {
            if EntityType::parse(entity_type).is_none() {
                findings.push(ctx.warning(
                    format!("{field_name}[{index}].type"),
                    format!(
                        "invalid value: '{entity_type}' (allowed: {})",
                        EntityType::ALL.join(", ")
                    ),
                ));
            }
        }
    }
}

fn check_advisory_extensions(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    if let Some(applicability) = object.get("applicability") {
        if !applicability.is_object() && !applicability.is_null() {
            findings.push(ctx.warning(
                "applicability",
                format!(
                    "must be an object or null, got {}",
                    json_type_name(applicability)
                ),
            ));
        }
    }

    if let Some(normative_values) = object.get("normative_values") {
        if !normative_values.is_array() && !normative_values.is_null() {
            findings.push(ctx.warning(
                "normative_values",
                format!("must be an array, got {}", json_type_name(normative_values)),
            ));
        }
    }
}

fn check_tables_data(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    match object.get("tables_data") {
        None => {}
        Some(Value::Null) => {
            findings.push(ctx.warning(
                "tables_data",
                "use an empty object {} instead of null",
            ));
        }
        Some(Value::Object(tables)) => {
            for (name, table) in tables {
                let Some(table) = table.as_object() else {
                    findings.push(ctx.error(
                        format!("tables_data.{name}"),
                        format!("must be an object, got {}", json_type_name(table)),
                    ));
                    continue;
                };
                for field in REQUIRED_TABLE_DATA_FIELDS {
                    if !table.contains_key(field) {
                        findings.push(ctx.error(
                            format!("tables_data.{name}.{field}"),
                            "missing required field",
                        ));
                    }
                }
            }
        }
        Some(other) => {
            findings.push(ctx.error(
                "tables_data",
                format!("must be an object, got {}", json_type_name(other)),
            ));
        }
    }
}

fn check_equations(
    ctx: &ChunkContext,
    object: &serde_json::Map<String, Value>,
    findings: &mut Vec<SchemaFinding>,
) {
    match object.get("equations") {
        None => {}
        Some(Value::Null) => {
            findings.push(ctx.warning("equations", "use an empty array [] instead of null"));
        }
        Some(Value::Array(equations)) => {
            for (index, equation) in equations.iter().enumerate() {
                let Some(equation) = equation.as_object() else {
                    findings.push(ctx.error(
                        format!("equations[{index}]"),
                        format!("must be an object, got {}", json_type_name(equation)),
                    ));
                    continue;
                };
                for field in REQUIRED_EQUATION_FIELDS {
                    if !equation.contains_key(field) {
                        findings.push(ctx.error(
                            format!("equations[{index}].{field}"),
                            "missing required field",
                        ));
                    }
                }
            }
        }
        Some(other) => {
            findings.push(ctx.error(
                "equations",
                format!("must be an array, got {}", json_type_name(other)),
            ));
        }
    }
}
