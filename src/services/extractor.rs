// src/services/extractor.rs

//! Page-level candidate extraction.
//!
//! Ties the two extraction strategies together: structured data islands
//! first, the markup scan only when they yield nothing.

use log::{debug, info};
use scraper::Html;

use crate::models::Candidate;

use super::normalize::normalize;
use super::{markup, structured};

/// Extract all unique pin candidates from a fetched page.
pub fn extract_candidates(raw: &str) -> Vec<Candidate> {
    let document = Html::parse_document(raw);

    let structured = structured::extract(&document);
    let markup = if structured.is_empty() {
        debug!("data islands yielded no pins, falling back to <img> scan");
        markup::extract(&document)
    } else {
        Vec::new()
    };

    let candidates = normalize(structured, markup);
    info!("found {} unique pin candidates", candidates.len());
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_structured_takes_precedence_over_markup() {
        let data = json!({"id": "s1", "images": {"orig": {"url": "https://x.example/s.jpg"}}});
        let raw = format!(
            r#"<html><body>
            <script id="__PWS_DATA__">{data}</script>
            <img src="https://i.pinimg.com/236x/ab/cd.jpg">
            </body></html>"#
        );

        let candidates = extract_candidates(&raw);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "s1");
    }

    #[test]
    fn test_markup_fallback_when_no_structured_data() {
        let raw = r#"<html><body><img src="https://i.pinimg.com/236x/ab/cd.jpg"></body></html>"#;

        let candidates = extract_candidates(raw);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].id, "cd");
        assert_eq!(candidates[0].url, "https://i.pinimg.com/736x/ab/cd.jpg");
    }

    #[test]
    fn test_duplicate_records_collapse() {
        let data = json!([
            {"id": "1", "images": {"orig": {"url": "https://x.example/a.jpg"}}},
            {"id": "1", "images": {"orig": {"url": "https://x.example/b.jpg"}}}
        ]);
        let raw = format!(
            r#"<html><body><script id="__PWS_DATA__">{data}</script></body></html>"#
        );

        let candidates = extract_candidates(&raw);
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].url, "https://x.example/a.jpg");
    }

    #[test]
    fn test_empty_page_yields_nothing() {
        assert!(extract_candidates("<html><body></body></html>").is_empty());
    }
}
