//! Relevance fragments for search results.
//!
//! A fragment is a window of the stored text around the first occurrence of
//! the search term, with ellipsis markers on whichever edges were clipped.
//! All offsets are counted in characters, never bytes, so multi-byte text
//! can never split a code point.

/// Characters kept on each side of the matched term.
const CONTEXT_CHARS: usize = 100;

/// Length of the fallback summary (including its ellipsis).
const SUMMARY_CHARS: usize = 200;

/// Window of `text` around the first case-insensitive occurrence of `term`.
///
/// Falls back to [`summary`] when the term is empty, or (defensively) when
/// it cannot be located even though the store matched it.
pub fn relevance_fragment(text: &str, term: &str) -> String {
    let term = term.trim();
    if term.is_empty() {
        return summary(text);
    }

    let chars: Vec<char> = text.chars().collect();
    let Some((match_start, match_len)) = find_case_insensitive(&chars, term) else {
        return summary(text);
    };

    let begin = match_start.saturating_sub(CONTEXT_CHARS);
    let end = (match_start + match_len + CONTEXT_CHARS).min(chars.len());

    let mut fragment: String = chars[begin..end].iter().collect();
    if begin > 0 {
        fragment.insert_str(0, "...");
    }
    if end < chars.len() {
        fragment.push_str("...");
    }
    fragment
}

/// First 200 characters of `text`, ellipsis-terminated when truncated.
pub fn summary(text: &str) -> String {
    let total = text.chars().count();
    if total <= SUMMARY_CHARS {
        return text.to_string();
    }
    let head: String = text.chars().take(SUMMARY_CHARS - 3).collect();
    format!("{head}...")
}

/// Locate `needle` in `haystack` ignoring case.
///
/// Returns the character offset and the matched length in haystack
/// characters. Case folding is done per character so offsets in the folded
/// text line up with the original.
fn find_case_insensitive(haystack: &[char], needle: &str) -> Option<(usize, usize)> {
    let folded: Vec<char> = haystack.iter().map(fold_char).collect();
    let needle: Vec<char> = needle.chars().map(|c| fold_char(&c)).collect();
    if needle.is_empty() || needle.len() > folded.len() {
        return None;
    }
    folded
        .windows(needle.len())
        .position(|window| window == needle.as_slice())
        .map(|start| (start, needle.len()))
}

fn fold_char(c: &char) -> char {
    c.to_lowercase().next().unwrap_or(*c)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fragment_in_the_middle_is_clipped_on_both_sides() {
        // 250 chars with the term at offset 150
        let mut text = "a".repeat(150);
        text.push_str("clave");
        text.push_str(&"b".repeat(95));
        assert_eq!(text.chars().count(), 250);

        let fragment = relevance_fragment(&text, "clave");
        // 150 - 100 > 0: leading ellipsis
        assert!(fragment.starts_with("..."));
        // 150 + 5 + 100 >= 250: window reaches the end, no trailing ellipsis
        assert!(!fragment.ends_with("..."));
        assert!(fragment.contains("clave"));
    }

    #[test]
    fn fragment_is_clipped_on_the_right_when_text_continues() {
        let mut text = "clave".to_string();
        text.push_str(&"x".repeat(300));

        let fragment = relevance_fragment(&text, "clave");
        assert!(fragment.starts_with("clave"));
        assert!(fragment.ends_with("..."));
        // term (5) + 100 of context + trailing marker
        assert_eq!(fragment.chars().count(), 5 + 100 + 3);
    }

    #[test]
    fn fragment_of_short_text_has_no_markers() {
        let fragment = relevance_fragment("el documento habla de la clave secreta", "clave");
        assert_eq!(fragment, "el documento habla de la clave secreta");
    }

    #[test]
    fn match_is_case_insensitive() {
        let fragment = relevance_fragment("Contenido diferente", "contenido");
        assert!(fragment.starts_with("Contenido"));
    }

    #[test]
    fn missing_term_falls_back_to_summary() {
        let text = "palabras que no incluyen el término buscado ".repeat(10);
        let fragment = relevance_fragment(&text, "zzzz");
        assert_eq!(fragment, summary(&text));
        assert!(fragment.ends_with("..."));
    }

    #[test]
    fn empty_term_falls_back_to_summary() {
        assert_eq!(relevance_fragment("texto corto", "   "), "texto corto");
    }

    #[test]
    fn summary_is_verbatim_when_short() {
        assert_eq!(summary("breve"), "breve");
    }

    #[test]
    fn summary_truncates_to_200_chars() {
        let text = "x".repeat(500);
        let s = summary(&text);
        assert_eq!(s.chars().count(), 200);
        assert!(s.ends_with("..."));
    }

    #[test]
    fn multibyte_text_never_splits_characters() {
        let mut text = "ñ".repeat(150);
        text.push_str("clave");
        text.push_str(&"é".repeat(150));

        let fragment = relevance_fragment(&text, "CLAVE");
        assert!(fragment.starts_with("..."));
        assert!(fragment.ends_with("..."));
        assert!(fragment.contains("clave"));
        // 100 + 5 + 100 plus both markers
        assert_eq!(fragment.chars().count(), 205 + 6);
    }

    #[test]
    fn accented_terms_match_case_insensitively() {
        let fragment = relevance_fragment("ANÁLISIS de sangre", "análisis");
        assert!(fragment.contains("ANÁLISIS"));
    }
}
