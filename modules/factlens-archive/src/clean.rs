/// Extracted text shorter than this is navigation chrome, not an article.
pub const MIN_CONTENT_CHARS: usize = 100;

/// Collapse whitespace and bound the length of extracted article text.
///
/// Returns an empty string when the text is too short to be an article.
/// Longer text is cut at `max_chars` characters and `...` appended.
pub fn clean_content(text: &str, max_chars: usize) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");

    let char_count = collapsed.chars().count();
    if char_count < MIN_CONTENT_CHARS {
        return String::new();
    }
    if char_count <= max_chars {
        return collapsed;
    }

    let cut = collapsed
        .char_indices()
        .nth(max_chars)
        .map(|(i, _)| i)
        .unwrap_or(collapsed.len());
    format!("{}...", collapsed[..cut].trim_end())
}
