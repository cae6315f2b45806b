//! Text normalization helpers shared by the matcher and the extractors.

/// Collapse every whitespace run to a single space and trim both ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Lower-case key used for keyword matching.
pub fn to_match_key(text: &str) -> String {
    text.to_lowercase()
}

/// Lower-case the input, then upper-case the first character of every
/// space-separated token.
pub fn title_case_name(text: &str) -> String {
    text.to_lowercase()
        .split(' ')
        .filter(|part| !part.is_empty())
        .map(capitalize_first)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Upper-case the first character and leave the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn whitespace_collapses_and_trims() {
        assert_eq!(normalize_whitespace("  amit   kumar  "), "amit kumar");
        assert_eq!(normalize_whitespace("a\t\tb\nc"), "a b c");
        assert_eq!(normalize_whitespace(" \n\t "), "");
    }

    #[test]
    fn match_key_is_lowercase() {
        assert_eq!(to_match_key("Fees KITNI hai?"), "fees kitni hai?");
    }

    #[test]
    fn title_case_handles_mixed_case() {
        assert_eq!(title_case_name("rITA vERMA"), "Rita Verma");
        assert_eq!(title_case_name("o'brien d.souza"), "O'brien D.souza");
    }

    #[test]
    fn title_case_leaves_devanagari_alone() {
        assert_eq!(title_case_name("अमित कुमार"), "अमित कुमार");
    }

    #[test]
    fn capitalize_first_only_touches_first_char() {
        assert_eq!(capitalize_first("baal girna"), "Baal girna");
        assert_eq!(capitalize_first("dard BAHUT"), "Dard BAHUT");
        assert_eq!(capitalize_first(""), "");
    }
}
