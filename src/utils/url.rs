// src/utils/url.rs

//! URL helpers for the media host.

/// Domain that hosts actual pin images.
pub const MEDIA_HOST: &str = "pinimg.com";

/// Path markers that identify icons and UI chrome rather than content.
const ICON_SIZE_MARKERS: [&str; 3] = ["30x30", "75x75", "20x20"];

/// Whether a resource locator points at the media host.
pub fn is_media_url(src: &str) -> bool {
    src.contains(MEDIA_HOST)
}

/// Whether a resource locator carries a known tiny-dimension marker.
pub fn is_icon_url(src: &str) -> bool {
    ICON_SIZE_MARKERS.iter().any(|marker| src.contains(marker))
}

/// Rewrite a known low-resolution path segment to the 736-wide variant.
///
/// URLs without a known low-resolution token are returned unchanged, so
/// the rewrite is idempotent on already-upgraded URLs.
pub fn upgrade_resolution(src: &str) -> String {
    if src.contains("/236x/") {
        src.replace("/236x/", "/736x/")
    } else if src.contains("/474x/") {
        src.replace("/474x/", "/736x/")
    } else {
        src.to_string()
    }
}

/// Extract the filename stem from the locator's final path segment
/// (`…/ab/cd.jpg` → `cd`).
pub fn filename_stem(src: &str) -> Option<String> {
    let parsed = url::Url::parse(src).ok()?;
    let last = parsed.path_segments()?.next_back()?;
    let stem = last.split('.').next()?;
    if stem.is_empty() {
        None
    } else {
        Some(stem.to_string())
    }
}
