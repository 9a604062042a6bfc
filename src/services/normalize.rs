// src/services/normalize.rs

//! Candidate normalization and per-cycle deduplication.

use std::collections::HashSet;

use crate::models::Candidate;

/// Collapse extractor output into an ordered list of unique candidates.
///
/// The markup set is a strict fallback, consulted only when the structured
/// set is empty. Within the chosen set the first occurrence of a dedupe
/// key wins; input order is preserved, so the output is deterministic for
/// deterministic input.
pub fn normalize(structured: Vec<Candidate>, markup: Vec<Candidate>) -> Vec<Candidate> {
    let source = if structured.is_empty() {
        markup
    } else {
        structured
    };
    dedupe(source)
}

fn dedupe(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let mut seen = HashSet::new();
    let mut unique = Vec::new();
    for candidate in candidates {
        if seen.insert(candidate.dedupe_key().to_string()) {
            unique.push(candidate);
        }
    }
    unique
}
