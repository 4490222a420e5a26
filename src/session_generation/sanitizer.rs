//! Filesystem-safe names for labs and nodes.

/// Characters that cannot appear in a session file or directory name.
pub const INVALID_CHARS: [char; 9] = ['<', '>', ':', '"', '/', '\\', '|', '?', '*'];

/// Replaces every character from `invalid` with `_`, then trims surrounding
/// whitespace. The caller keeps the original name for in-content use.
pub fn sanitize_with(name: &str, invalid: &[char]) -> String {
    name.chars()
        .map(|c| if invalid.contains(&c) { '_' } else { c })
        .collect::<String>()
        .trim()
        .to_string()
}

/// [`sanitize_with`] over the fixed [`INVALID_CHARS`] set.
pub fn sanitize(name: &str) -> String {
    sanitize_with(name, &INVALID_CHARS)
}

/// A display name paired with its filesystem form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedName {
    pub original: String,
    pub sanitized: String,
}

impl SanitizedName {
    pub fn new(original: &str) -> Self {
        Self {
            original: original.to_string(),
            sanitized: sanitize(original),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replaces_every_invalid_char() {
        let out = sanitize(r#"a<b>c:d"e/f\g|h?i*j"#);
        assert_eq!(out, "a_b_c_d_e_f_g_h_i_j");
        assert!(!out.chars().any(|c| INVALID_CHARS.contains(&c)));
    }

    #[test]
    fn test_clean_name_is_only_trimmed() {
        assert_eq!(sanitize("  Core Router 1 "), "Core Router 1");
        assert_eq!(sanitize("R1"), "R1");
    }

    #[test]
    fn test_lab_title_with_colon() {
        assert_eq!(sanitize("Lab: 1"), "Lab_ 1");
        assert_eq!(sanitize("Core/1"), "Core_1");
    }

    #[test]
    fn test_replacement_happens_before_trim() {
        // A trailing invalid char becomes '_' and therefore survives the trim.
        assert_eq!(sanitize(" edge? "), "edge_");
    }

    #[test]
    fn test_idempotent() {
        for name in ["Lab: 1", " a/b ", "x*y?z", "", "   ", "plain", "\"quoted\""] {
            let once = sanitize(name);
            assert_eq!(sanitize(&once), once, "not idempotent for {:?}", name);
        }
    }

    #[test]
    fn test_custom_invalid_set() {
        assert_eq!(sanitize_with("a-b c", &['-']), "a_b c");
    }

    #[test]
    fn test_sanitized_name_keeps_original() {
        let name = SanitizedName::new("Core/1");
        assert_eq!(name.original, "Core/1");
        assert_eq!(name.sanitized, "Core_1");
    }
}
