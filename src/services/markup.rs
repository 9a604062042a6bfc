// src/services/markup.rs

//! Markup fallback extractor.
//!
//! Used only when the structured extractor comes back empty: scans every
//! `<img>` element for media-host URLs, filtering out icons and UI chrome.

use rand::Rng;
use scraper::{Html, Selector};

use crate::models::Candidate;
use crate::utils::url::{filename_stem, is_icon_url, is_media_url, upgrade_resolution};

/// Extract pin candidates from rendered image elements.
pub fn extract(document: &Html) -> Vec<Candidate> {
    let selector = Selector::parse("img").expect("valid selector");
    let mut items = Vec::new();

    for element in document.select(&selector) {
        let Some(src) = element.value().attr("src") else {
            continue;
        };
        if !is_media_url(src) || is_icon_url(src) {
            continue;
        }

        let id = filename_stem(src).unwrap_or_else(pseudo_id);
        let description = element.value().attr("alt").unwrap_or_default().to_string();

        items.push(Candidate {
            id,
            url: upgrade_resolution(src),
            description,
            // Markup carries no sponsorship signal.
            is_promoted: false,
        });
    }

    items
}

/// Random fallback identifier for locators without a usable filename stem.
///
/// Not stable across cycles: the same image can be picked up again under a
/// fresh id if its locator never yields a stem.
fn pseudo_id() -> String {
    format!("pseudo_{}", rand::thread_rng().gen_range(1_000_000..10_000_000))
}
