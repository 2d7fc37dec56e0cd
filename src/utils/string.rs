//! String utility functions for safe UTF-8 text manipulation

/// Safely truncate a string at a character boundary, adding ellipsis if truncated.
///
/// Unlike naive byte slicing (`&s[..n]`), this never slices in the middle of a
/// multi-byte UTF-8 character, which would panic. German text is full of them.
///
/// # Examples
/// ```
/// use lingocast_core::utils::string::truncate_at_char_boundary;
///
/// assert_eq!(truncate_at_char_boundary("hello world", 5), "hello...");
/// assert_eq!(truncate_at_char_boundary("hello", 10), "hello");
/// assert_eq!(truncate_at_char_boundary("Grüße aus Köln", 4), "Grüß...");
/// ```
pub fn truncate_at_char_boundary(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((byte_idx, _)) => format!("{}...", &s[..byte_idx]),
    }
}

/// Lowercase ASCII slug for file names and URLs.
///
/// Common German letters are transliterated (`ä` → `ae`, `ß` → `ss`); every
/// other non-alphanumeric run collapses into a single `-`. The result is cut
/// to `max_len` bytes without leaving a trailing dash.
pub fn slugify(s: &str, max_len: usize) -> String {
    let mut slug = String::with_capacity(s.len());
    let mut pending_dash = false;

    for c in s.chars() {
        let mapped: Option<&str> = match c {
            'ä' | 'Ä' => Some("ae"),
            'ö' | 'Ö' => Some("oe"),
            'ü' | 'Ü' => Some("ue"),
            'ß' => Some("ss"),
            _ => None,
        };

        if let Some(replacement) = mapped {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push_str(replacement);
        } else if c.is_ascii_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.push(c.to_ascii_lowercase());
        } else {
            pending_dash = true;
        }
    }

    if slug.len() > max_len {
        slug.truncate(max_len);
    }
    slug.trim_end_matches('-').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_ascii_short() {
        assert_eq!(truncate_at_char_boundary("hello", 10), "hello");
    }

    #[test]
    fn test_truncate_ascii_exact() {
        assert_eq!(truncate_at_char_boundary("hello", 5), "hello");
    }

    #[test]
    fn test_truncate_ascii_long() {
        assert_eq!(truncate_at_char_boundary("hello world", 5), "hello...");
    }

    #[test]
    fn test_truncate_empty() {
        assert_eq!(truncate_at_char_boundary("", 5), "");
    }

    #[test]
    fn test_truncate_umlauts() {
        // 'ü' and 'ß' are 2 bytes each in UTF-8
        let text = "Grüße aus Köln";
        let result = truncate_at_char_boundary(text, 4);
        assert_eq!(result, "Grüß...");

        assert!(result.is_char_boundary(result.len()));
    }

    #[test]
    fn test_truncate_long_article_text() {
        let text = "Übermäßig ".repeat(100);
        let result = truncate_at_char_boundary(&text, 205);
        assert_eq!(result.chars().count(), 208);
        assert!(result.ends_with("..."));
    }

    #[test]
    fn test_slugify_basic() {
        assert_eq!(slugify("Die Lage in Europa", 60), "die-lage-in-europa");
    }

    #[test]
    fn test_slugify_transliterates_german() {
        assert_eq!(slugify("Größere Büros für Ärzte", 60), "groessere-bueros-fuer-aerzte");
    }

    #[test]
    fn test_slugify_collapses_punctuation() {
        assert_eq!(slugify("  --Hallo,   Welt!!  ", 60), "hallo-welt");
    }

    #[test]
    fn test_slugify_respects_max_len() {
        let slug = slugify("Ein sehr langer Titel über nichts", 12);
        assert_eq!(slug, "ein-sehr-lan");
        assert!(slug.len() <= 12);
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify("???", 60), "");
    }
}
