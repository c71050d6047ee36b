/// The first `max_chars` characters of `s`.
pub fn truncate_to_chars(s: &str, max_chars: usize) -> &str {
    match s.char_indices().nth(max_chars) {
        Some((end, _)) => &s[..end],
        None => s,
    }
}

/// Strip markdown code fences (```json ... ```) from a model response.
pub fn strip_code_blocks(response: &str) -> &str {
    response
        .trim()
        .trim_start_matches("```json")
        .trim_start_matches("```JSON")
        .trim_start_matches("```")
        .trim_end_matches("```")
        .trim()
}

/// Locate the outermost JSON object in a response that may carry prose
/// around it. Returns `None` when no `{ ... }` span exists.
pub fn extract_json_block(response: &str) -> Option<&str> {
    let stripped = strip_code_blocks(response);
    let start = stripped.find('{')?;
    let end = stripped.rfind('}')?;
    (end > start).then(|| &stripped[start..=end])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn truncates_by_characters_not_bytes() {
        assert_eq!(truncate_to_chars("Café au lait", 4), "Café");
        assert_eq!(truncate_to_chars("種子の特許", 2), "種子");
    }

    #[test]
    fn short_strings_are_untouched() {
        assert_eq!(truncate_to_chars("seed", 100), "seed");
        assert_eq!(truncate_to_chars("seed", 4), "seed");
    }

    #[test]
    fn strips_fences() {
        assert_eq!(strip_code_blocks("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_blocks("```\n{}\n```"), "{}");
        assert_eq!(strip_code_blocks("  {}  "), "{}");
    }

    #[test]
    fn finds_json_inside_prose() {
        let raw = "Here is the analysis:\n{\"classification\": \"Health\"}\nHope this helps.";
        assert_eq!(
            extract_json_block(raw),
            Some("{\"classification\": \"Health\"}")
        );
    }

    #[test]
    fn no_json_block() {
        assert_eq!(extract_json_block("no braces at all"), None);
        assert_eq!(extract_json_block("} backwards {"), None);
    }
}
