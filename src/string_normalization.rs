use unidecode::unidecode;

/// Canonical lookup key for a track display name ("Artist - Title").
///
/// Transliterates to ASCII, lowercases, strips wrapping quotes and collapses
/// runs of whitespace, so that "  Björk – Jóga " and "bjork - joga" meet.
pub fn normalize_track_name(input: &str) -> String {
    let ascii = unidecode(input).to_lowercase();
    ascii
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .split_whitespace()
        .collect::<Vec<&str>>()
        .join(" ")
}
