//! Utility helpers for sanitizing admin-entered text and coercing counts.

use std::collections::HashSet;

use once_cell::sync::Lazy;

/// Sanitizer with an empty allowlist: every tag is stripped, script and
/// style contents are dropped entirely, text survives.
static TAG_STRIPPER: Lazy<ammonia::Builder<'static>> = Lazy::new(|| {
    let mut builder = ammonia::Builder::default();
    builder.tags(HashSet::new());
    builder
});

/// Reduce free-form admin input to a single line of plain text.
///
/// Markup is stripped (not escaped), whitespace runs collapse to one
/// space, and the result is trimmed.
pub fn sanitize_text(input: &str) -> String {
    let stripped = TAG_STRIPPER.clean(input).to_string();
    let decoded = decode_basic_entities(&stripped);

    let mut out = String::with_capacity(decoded.len());
    let mut pending_space = false;
    for ch in decoded.chars() {
        if ch.is_whitespace() {
            pending_space = !out.is_empty();
        } else {
            if pending_space {
                out.push(' ');
                pending_space = false;
            }
            out.push(ch);
        }
    }
    out
}

/// Undo the entity escaping the sanitizer applies to text nodes.
///
/// The stripped output is plain text destined for re-escaping at render
/// time; leaving it encoded here would double-escape. Only the entities
/// the serializer emits are handled. `&amp;` must be decoded last.
fn decode_basic_entities(input: &str) -> String {
    input
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Coerce free-form count input to a non-negative integer.
///
/// Accepts integer or decimal text, takes the absolute value, truncates
/// decimals, and maps anything unparseable to zero.
pub fn coerce_count(raw: &str) -> u32 {
    let trimmed = raw.trim();
    if let Ok(value) = trimmed.parse::<i64>() {
        return value.unsigned_abs().min(u64::from(u32::MAX)) as u32;
    }
    if let Ok(value) = trimmed.parse::<f64>()
        && value.is_finite()
    {
        return value.trunc().abs().min(f64::from(u32::MAX)) as u32;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::{coerce_count, sanitize_text};

    #[test]
    fn sanitize_passes_plain_text_through() {
        assert_eq!(sanitize_text("Latest Posts"), "Latest Posts");
    }

    #[test]
    fn sanitize_strips_markup() {
        assert_eq!(sanitize_text("<b>Latest</b> Posts"), "Latest Posts");
        assert_eq!(
            sanitize_text("<a href=\"https://example.com\">Latest</a>"),
            "Latest"
        );
    }

    #[test]
    fn sanitize_drops_script_content() {
        assert_eq!(sanitize_text("Hi<script>alert(1)</script> there"), "Hi there");
    }

    #[test]
    fn sanitize_keeps_ampersands_unencoded() {
        assert_eq!(sanitize_text("Tom & Jerry"), "Tom & Jerry");
        assert_eq!(sanitize_text("a < b"), "a < b");
    }

    #[test]
    fn sanitize_collapses_whitespace() {
        assert_eq!(sanitize_text("  Latest \n\t Posts  "), "Latest Posts");
        assert_eq!(sanitize_text("   "), "");
    }

    #[test]
    fn coerce_parses_integers() {
        assert_eq!(coerce_count("3"), 3);
        assert_eq!(coerce_count(" 7 "), 7);
        assert_eq!(coerce_count("0"), 0);
    }

    #[test]
    fn coerce_takes_absolute_value() {
        assert_eq!(coerce_count("-4"), 4);
        assert_eq!(coerce_count("-4.5"), 4);
    }

    #[test]
    fn coerce_truncates_decimals() {
        assert_eq!(coerce_count("3.9"), 3);
    }

    #[test]
    fn coerce_maps_garbage_to_zero() {
        assert_eq!(coerce_count(""), 0);
        assert_eq!(coerce_count("abc"), 0);
        assert_eq!(coerce_count("3abc"), 0);
        assert_eq!(coerce_count("NaN"), 0);
    }
}
