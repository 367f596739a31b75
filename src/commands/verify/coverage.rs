use std::collections::HashSet;

use serde::Serialize;
use serde_json::Value;

use super::report::{PASS_THRESHOLD_PERCENT, SENTENCE_PREVIEW_MAX_CHARS, percent, preview};
use crate::text::{segment_sentences, tokenize};

/// Sentences shorter than this many tokens carry too little signal to
/// fingerprint and are skipped.
pub const MIN_SENTENCE_TOKENS: usize = 5;

/// Number of trailing tokens concatenated into a sentence fingerprint. A
/// short trailing anchor tolerates the reflow and hyphenation noise that
/// source-text extraction introduces, where exact full-sentence equality
/// would not.
pub const FINGERPRINT_TOKENS: usize = 5;

#[derive(Debug, Clone, Serialize)]
pub struct UnmatchedSentence {
    pub preview: String,
    pub fingerprint: String,
}

#[derive(Debug, Default)]
pub struct CoverageOutcome {
    pub total_sentences: usize,
    pub skipped: usize,
    pub matched: usize,
    pub unmatched: Vec<UnmatchedSentence>,
}

impl CoverageOutcome {
    pub fn checked(&self) -> usize {
        self.total_sentences - self.skipped
    }

    pub fn percent(&self) -> f64 {
        percent(self.matched, self.checked())
    }

    pub fn passed(&self) -> bool {
        self.percent() >= PASS_THRESHOLD_PERCENT
    }
}

/// Verifies that every source sentence's trailing-token fingerprint is
/// recoverable from the chunked output. Identical fingerprints are checked
/// once; repeats count as skipped (headers and boilerplate recur).
pub fn check_coverage(source_text: &str, chunks: &[Value]) -> CoverageOutcome {
    let corpus_fingerprint: String = tokenize(&chunk_corpus(chunks).to_lowercase()).concat();

    let mut outcome = CoverageOutcome::default();
    let mut seen: HashSet<String> = HashSet::new();

    for sentence in segment_sentences(source_text) {
        outcome.total_sentences += 1;

        let tokens = tokenize(&sentence.to_lowercase());
        if tokens.len() < MIN_SENTENCE_TOKENS {
            outcome.skipped += 1;
            continue;
        }

        let fingerprint = tokens[tokens.len() - FINGERPRINT_TOKENS..].concat();
        if !seen.insert(fingerprint.clone()) {
            outcome.skipped += 1;
            continue;
        }

        if corpus_fingerprint.contains(&fingerprint) {
            outcome.matched += 1;
        } else {
            outcome.unmatched.push(UnmatchedSentence {
                preview: preview(&sentence, SENTENCE_PREVIEW_MAX_CHARS),
                fingerprint,
            });
        }
    }

    outcome
}

/// The chunk-side search corpus: every chunk's text plus every entry of its
/// section_path (headings often survive only there).
pub fn chunk_corpus(chunks: &[Value]) -> String {
    let mut parts: Vec<&str> = Vec::new();

    for chunk in chunks {
        if let Some(text) = chunk.get("text").and_then(Value::as_str) {
            parts.push(text);
        }
        if let Some(path) = chunk.get("section_path").and_then(Value::as_array) {
            for entry in path {
                if let Some(title) = entry.as_str() {
                    parts.push(title);
                }
            }
        }
    }

    parts.join("\n")
}
