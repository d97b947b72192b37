// this_file: backends/mailglyph-core/src/utils.rs

//! Utility functions for the mailglyph renderer.

use crate::FontCategory;

/// Parse the leading decimal number of a CSS-ish length such as `"24px"`.
///
/// Mirrors `parseFloat`: leading whitespace is skipped, trailing garbage is
/// ignored, and `None` is returned when no digits lead the string.
pub fn parse_leading_number(value: &str) -> Option<f64> {
    let trimmed = value.trim_start();
    let bytes = trimmed.as_bytes();
    let mut end = 0;
    if matches!(bytes.first(), Some(b'+') | Some(b'-')) {
        end += 1;
    }
    let mut digits = 0;
    while end < bytes.len() && bytes[end].is_ascii_digit() {
        end += 1;
        digits += 1;
    }
    if end < bytes.len() && bytes[end] == b'.' {
        let mut frac_end = end + 1;
        let mut frac_digits = 0;
        while frac_end < bytes.len() && bytes[frac_end].is_ascii_digit() {
            frac_end += 1;
            frac_digits += 1;
        }
        if frac_digits > 0 || digits > 0 {
            end = frac_end;
            digits += frac_digits;
        }
    }
    if digits == 0 {
        return None;
    }
    if end < bytes.len() && matches!(bytes[end], b'e' | b'E') {
        let mut exp_end = end + 1;
        if matches!(bytes.get(exp_end), Some(b'+') | Some(b'-')) {
            exp_end += 1;
        }
        let exp_start = exp_end;
        while exp_end < bytes.len() && bytes[exp_end].is_ascii_digit() {
            exp_end += 1;
        }
        if exp_end > exp_start {
            end = exp_end;
        }
    }
    trimmed[..end].parse().ok()
}

/// Round half up (towards positive infinity), like `Math.round`.
pub fn round_half_up(value: f64) -> f64 {
    (value + 0.5).floor()
}

/// Format a number the way a browser prints it in inline styles: `12`, `12.5`,
/// `0.3333333333333333`. Fractions use the shortest round-trip form.
pub fn format_css_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() < 1e15 {
        format!("{}", value as i64)
    } else {
        format!("{value}")
    }
}

/// Font directories for one location class on the current platform.
///
/// Entries may contain `~`; callers expand them.
pub fn font_dirs(category: FontCategory) -> Vec<String> {
    #[cfg(target_os = "macos")]
    {
        match category {
            FontCategory::User => vec!["~/Library/Fonts".to_string()],
            FontCategory::Local => vec!["/Library/Fonts".to_string()],
            FontCategory::Network => vec!["/Network/Library/Fonts".to_string()],
            FontCategory::System => vec!["/System/Library/Fonts".to_string()],
        }
    }

    #[cfg(target_os = "windows")]
    {
        match category {
            FontCategory::User => vec!["~\\AppData\\Local\\Microsoft\\Windows\\Fonts".to_string()],
            FontCategory::Local | FontCategory::Network => vec![],
            FontCategory::System => vec!["C:\\Windows\\Fonts".to_string()],
        }
    }

    #[cfg(target_os = "linux")]
    {
        match category {
            FontCategory::User => vec!["~/.fonts".to_string(), "~/.local/share/fonts".to_string()],
            FontCategory::Local => vec!["/usr/local/share/fonts".to_string()],
            FontCategory::Network => vec![],
            FontCategory::System => vec!["/usr/share/fonts".to_string()],
        }
    }

    #[cfg(not(any(target_os = "macos", target_os = "windows", target_os = "linux")))]
    {
        let _ = category;
        vec![]
    }
}
