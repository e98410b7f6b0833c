// Text helpers shared by the scorer and the session.

/// Length of the trimmed text in characters, not bytes.
pub(crate) fn trimmed_len(text: &str) -> usize {
    text.trim().chars().count()
}

/// First keyword found as a case-insensitive substring of `haystack_lower`.
/// `haystack_lower` must already be lowercased. Empty keywords never match.
pub(crate) fn find_keyword<'a>(haystack_lower: &str, keywords: &'a [String]) -> Option<&'a str> {
    keywords
        .iter()
        .filter(|k| !k.trim().is_empty())
        .find(|k| haystack_lower.contains(&k.to_lowercase()))
        .map(String::as_str)
}

/// Words longer than three characters, stripped of surrounding punctuation.
pub(crate) fn significant_words(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|w| w.chars().count() > 3)
}
