// src/services/structured.rs

//! Structured-data extractor.
//!
//! The search page embeds JSON data islands in `<script>` elements named
//! `__PWS_DATA__` / `__PWS_INITIAL_PROPS__`. Pin records can sit at any
//! depth inside them, so extraction is a full recursive walk of the parsed
//! value graph. Extraction is best-effort: malformed blocks and records
//! are skipped, never fatal.

use std::sync::OnceLock;

use log::debug;
use regex::Regex;
use scraper::{Html, Selector};
use serde_json::{Map, Value};

use crate::error::Result;
use crate::models::Candidate;

/// Resolution variant keys in preference order.
const RESOLUTION_KEYS: [&str; 4] = ["orig", "1200x", "736x", "474x"];

fn script_id_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"__PWS_(DATA|INITIAL_PROPS)__").expect("valid script id pattern")
    })
}

/// Extract pin candidates from the page's embedded data islands.
///
/// A block that fails to parse is skipped without affecting the others.
pub fn extract(document: &Html) -> Vec<Candidate> {
    let selector = Selector::parse("script").expect("valid selector");
    let mut found = Vec::new();

    for script in document.select(&selector) {
        let Some(id) = script.value().attr("id") else {
            continue;
        };
        if !script_id_pattern().is_match(id) {
            continue;
        }

        let raw: String = script.text().collect();
        match parse_block(&raw) {
            Ok(data) => walk(&data, &mut found),
            Err(error) => debug!("skipping unparseable data island {id}: {error}"),
        }
    }

    found
}

fn parse_block(raw: &str) -> Result<Value> {
    Ok(serde_json::from_str(raw)?)
}

/// Recursive traversal over the dynamic value graph, collecting every
/// record that matches the pin shape.
fn walk(value: &Value, found: &mut Vec<Candidate>) {
    match value {
        Value::Object(map) => {
            if looks_like_pin(map) {
                // Promoted records are advertising: drop the record and
                // everything nested under it.
                if is_truthy(map.get("is_promoted")) {
                    return;
                }
                if let Some(candidate) = candidate_from_record(map) {
                    found.push(candidate);
                }
            }
            for child in map.values() {
                walk(child, found);
            }
        }
        Value::Array(items) => {
            for item in items {
                walk(item, found);
            }
        }
        _ => {}
    }
}

/// Shape signature of a pin record: an identifier plus a dictionary of
/// resolution-keyed image variants.
fn looks_like_pin(map: &Map<String, Value>) -> bool {
    map.contains_key("id") && map.get("images").is_some_and(Value::is_object)
}

fn candidate_from_record(map: &Map<String, Value>) -> Option<Candidate> {
    let id = match map.get("id")? {
        Value::String(id) => id.clone(),
        Value::Number(id) => id.to_string(),
        _ => return None,
    };

    let images = map.get("images")?.as_object()?;
    let variant = RESOLUTION_KEYS.iter().find_map(|key| images.get(*key))?;
    let url = variant.get("url")?.as_str()?.to_string();

    let description = map
        .get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Some(Candidate {
        id,
        url,
        description,
        is_promoted: false,
    })
}

fn is_truthy(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => false,
        Some(Value::Bool(flag)) => *flag,
        Some(Value::Number(number)) => number.as_f64().is_some_and(|n| n != 0.0),
        Some(Value::String(text)) => !text.is_empty(),
        Some(Value::Array(items)) => !items.is_empty(),
        Some(Value::Object(map)) => !map.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn page_with_island(id: &str, body: &str) -> Html {
        Html::parse_document(&format!(
            r#"<html><body><script id="{id}">{body}</script></body></html>"#
        ))
    }

    #[test]
    fn test_extracts_pin_from_nested_data() {
        let data = json!({
            "props": {
                "pins": [
                    {
                        "id": "123",
                        "description": "sunset",
                        "images": {"orig": {"url": "https://x.example/orig.jpg"}}
                    }
                ]
            }
        });
        let document = page_with_island("__PWS_DATA__", &data.to_string());

        let found = extract(&document);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "123");
        assert_eq!(found[0].url, "https://x.example/orig.jpg");
        assert_eq!(found[0].description, "sunset");
        assert!(!found[0].is_promoted);
    }

    #[test]
    fn test_promoted_record_is_excluded() {
        let data = json!([
            {
                "id": "keep",
                "is_promoted": false,
                "images": {"orig": {"url": "https://x.example/orig.jpg"}}
            },
            {
                "id": "drop",
                "is_promoted": true,
                "images": {"orig": {"url": "https://x.example/orig.jpg"}}
            }
        ]);
        let document = page_with_island("__PWS_DATA__", &data.to_string());

        let found = extract(&document);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "keep");
    }

    #[test]
    fn test_resolution_preference_order() {
        let data = json!({
            "id": "1",
            "images": {
                "474x": {"url": "https://x.example/474.jpg"},
                "1200x": {"url": "https://x.example/1200.jpg"}
            }
        });
        let document = page_with_island("__PWS_INITIAL_PROPS__", &data.to_string());

        let found = extract(&document);
        assert_eq!(found[0].url, "https://x.example/1200.jpg");
    }

    #[test]
    fn test_record_without_known_resolution_is_skipped() {
        let data = json!({
            "id": "1",
            "images": {"60x60": {"url": "https://x.example/60.jpg"}}
        });
        let document = page_with_island("__PWS_DATA__", &data.to_string());

        assert!(extract(&document).is_empty());
    }

    #[test]
    fn test_unparseable_block_does_not_abort_others() {
        let html = format!(
            r#"<html><body>
            <script id="__PWS_INITIAL_PROPS__">{{not json</script>
            <script id="__PWS_DATA__">{}</script>
            </body></html>"#,
            json!({"id": "9", "images": {"orig": {"url": "https://x.example/a.jpg"}}})
        );
        let document = Html::parse_document(&html);

        let found = extract(&document);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, "9");
    }

    #[test]
    fn test_unrelated_scripts_are_ignored() {
        let data = json!({"id": "1", "images": {"orig": {"url": "https://x.example/a.jpg"}}});
        let document = page_with_island("analytics", &data.to_string());

        assert!(extract(&document).is_empty());
    }

    #[test]
    fn test_numeric_id_is_accepted() {
        let data = json!({"id": 42, "images": {"orig": {"url": "https://x.example/a.jpg"}}});
        let document = page_with_island("__PWS_DATA__", &data.to_string());

        let found = extract(&document);
        assert_eq!(found[0].id, "42");
    }

    #[test]
    fn test_malformed_variant_is_skipped() {
        let data = json!({"id": "1", "images": {"orig": {"width": 640}}});
        let document = page_with_island("__PWS_DATA__", &data.to_string());

        assert!(extract(&document).is_empty());
    }

    #[test]
    fn test_is_truthy() {
        assert!(is_truthy(Some(&json!(true))));
        assert!(is_truthy(Some(&json!(1))));
        assert!(is_truthy(Some(&json!("yes"))));
        assert!(!is_truthy(Some(&json!(false))));
        assert!(!is_truthy(Some(&json!(0))));
        assert!(!is_truthy(Some(&json!(""))));
        assert!(!is_truthy(Some(&Value::Null)));
        assert!(!is_truthy(None));
    }
}
