//! Portable file naming for saved images

/// Longest stem we emit, in characters
pub const MAX_STEM_CHARS: usize = 120;

/// Names Windows refuses regardless of extension
const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL",
    "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8", "COM9",
    "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

const FORBIDDEN: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// Turn a display name into a file stem that is valid on every desktop OS.
///
/// Forbidden and control characters become `_`, reserved device names get a
/// leading `_`, trailing dots/spaces are dropped and the result is capped at
/// [`MAX_STEM_CHARS`].
pub fn sanitize_file_stem(name: &str) -> String {
    let mut result: String = name
        .trim()
        .chars()
        .map(|c| if FORBIDDEN.contains(&c) || c.is_control() { '_' } else { c })
        .take(MAX_STEM_CHARS)
        .collect();

    while result.ends_with('.') || result.ends_with(' ') {
        result.pop();
    }

    if RESERVED_NAMES.iter().any(|r| r.eq_ignore_ascii_case(&result)) {
        result.insert(0, '_');
    }

    if result.is_empty() {
        result = "image".to_string();
    }

    result
}

/// Strip the last extension from a file name (`a.b.png` → `a.b`).
///
/// Names without a dot, whose only dot is leading, or that end in a dot are
/// returned as-is.
pub fn strip_extension(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx > 0 && idx + 1 < file_name.len() && !file_name[idx + 1..].contains(['/', '\\']) => {
            &file_name[..idx]
        }
        _ => file_name,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_forbidden_chars() {
        assert_eq!(sanitize_file_stem("City: Lights?"), "City_ Lights_");
        assert_eq!(sanitize_file_stem("a/b\\c"), "a_b_c");
    }

    #[test]
    fn test_reserved_and_trailing() {
        assert_eq!(sanitize_file_stem("con"), "_con");
        assert_eq!(sanitize_file_stem("sunset. "), "sunset");
        assert_eq!(sanitize_file_stem("   "), "image");
    }

    #[test]
    fn test_length_cap() {
        let long = "x".repeat(500);
        assert_eq!(sanitize_file_stem(&long).chars().count(), MAX_STEM_CHARS);
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("beach.jpg"), "beach");
        assert_eq!(strip_extension("archive.tar.png"), "archive.tar");
        assert_eq!(strip_extension("README"), "README");
        assert_eq!(strip_extension(".hidden"), ".hidden");
        assert_eq!(strip_extension("foo."), "foo.");
        assert_eq!(strip_extension("a..png"), "a.");
    }
}
