//! Display-width measurement and grapheme-safe ellipsizing.
//!
//! Column auto-sizing and owner-drawn cell rendering both measure text in
//! terminal cells, not bytes or chars. Truncation never splits a grapheme
//! cluster.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

/// Display width of a string in terminal cells.
pub fn string_width(text: &str) -> i32 {
    UnicodeWidthStr::width(text) as i32
}

/// Display width of a single grapheme cluster.
fn grapheme_width(grapheme: &str) -> i32 {
    UnicodeWidthStr::width(grapheme) as i32
}

/// Ellipsize `text` to fit within `max_width` cells.
///
/// Returns the text unchanged when it fits. Otherwise truncates at a
/// grapheme boundary and appends `…`, whose one-cell width is accounted
/// for. A zero or negative width yields an empty string.
pub fn ellipsize(text: &str, max_width: i32) -> String {
    if max_width <= 0 {
        return String::new();
    }
    if string_width(text) <= max_width {
        return text.to_string();
    }
    if max_width == 1 {
        return "…".to_string();
    }

    let target = max_width - 1;
    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let gw = grapheme_width(grapheme);
        if used + gw > target {
            break;
        }
        out.push_str(grapheme);
        used += gw;
    }
    out.push('…');
    out
}

/// Hard-clip `text` to `max_width` cells with no ellipsis marker.
pub fn clip(text: &str, max_width: i32) -> String {
    if max_width <= 0 {
        return String::new();
    }
    if string_width(text) <= max_width {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut used = 0;
    for grapheme in text.graphemes(true) {
        let gw = grapheme_width(grapheme);
        if used + gw > max_width {
            break;
        }
        out.push_str(grapheme);
        used += gw;
    }
    out
}
