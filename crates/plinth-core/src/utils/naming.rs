//! Identifier and case conventions.
//!
//! Extension identifiers are backslash separated paths such as
//! `Extensions\Module\Banner\Banner`: root namespace, type, package name and
//! entry name. A leading separator is tolerated everywhere and stripped before
//! comparison.

/// Separator between identifier segments.
pub const SEPARATOR: char = '\\';

/// Strip leading/trailing separators and surrounding whitespace.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier
        .trim()
        .trim_matches(|c| c == SEPARATOR || c == '/')
        .to_string()
}

/// Join non-empty segments with the identifier separator.
pub fn join_identifier<S: AsRef<str>>(segments: &[S]) -> String {
    segments
        .iter()
        .map(|s| normalize_identifier(s.as_ref()))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(&SEPARATOR.to_string())
}

/// Trailing segment of an identifier (the "class" short name).
pub fn class_basename(identifier: &str) -> &str {
    let trimmed = identifier.trim_end_matches(SEPARATOR);
    match trimmed.rfind(SEPARATOR) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// Everything before the trailing segment, if there is one.
pub fn namespace_of(identifier: &str) -> Option<String> {
    let normalized = normalize_identifier(identifier);
    normalized
        .rfind(SEPARATOR)
        .map(|idx| normalized[..idx].to_string())
}

/// Convert `BannerSlider`, `banner-slider` or `Banner Slider` into `banner_slider`.
pub fn snake_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 4);
    let mut prev_lower_or_digit = false;

    for ch in value.trim().chars() {
        if ch.is_alphanumeric() {
            if ch.is_uppercase() {
                if prev_lower_or_digit && !out.ends_with('_') {
                    out.push('_');
                }
                out.extend(ch.to_lowercase());
                prev_lower_or_digit = false;
            } else {
                out.push(ch);
                prev_lower_or_digit = true;
            }
        } else {
            if !out.is_empty() && !out.ends_with('_') {
                out.push('_');
            }
            prev_lower_or_digit = false;
        }
    }

    out.trim_end_matches('_').to_string()
}

/// Lower-case slug: runs of anything that is not ASCII alphanumeric collapse
/// into a single `separator`.
pub fn slugify(value: &str, separator: char) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with(separator) {
            out.push(separator);
        }
    }
    out.trim_end_matches(separator).to_string()
}

/// Upper-case the first letter of every word, keeping the rest as written.
///
/// Type directories on disk are title-cased to obtain the type name, so
/// `module` and `Module` both map to `Module`.
pub fn title_case(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut at_word_start = true;
    for ch in value.chars() {
        if ch.is_whitespace() || ch == '_' || ch == '-' {
            out.push(ch);
            at_word_start = true;
        } else if at_word_start {
            out.extend(ch.to_uppercase());
            at_word_start = false;
        } else {
            out.push(ch);
        }
    }
    out
}
